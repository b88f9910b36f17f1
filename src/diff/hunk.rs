use std::cmp::{max, min};
use std::fmt;
use std::mem;

use crate::align::{Opcode, Tag};

/// A span of lines on one side of a hunk, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkRange {
    pub start: usize,
    pub len: usize,
}

impl fmt::Display for HunkRange {
    /// Formats as in a hunk header: an empty range names the line before it
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.len {
            0 => write!(f, "{},0", self.start),
            1 => write!(f, "{}", self.start + 1),
            n => write!(f, "{},{}", self.start + 1, n),
        }
    }
}

/// A single line within a hunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkLine<'a> {
    Context(&'a str),
    Delete(&'a str),
    Insert(&'a str),
}

/// A single hunk of a unified diff
#[derive(Debug, PartialEq, Eq)]
pub struct Hunk<'a> {
    pub old: HunkRange,
    pub new: HunkRange,
    pub lines: Vec<HunkLine<'a>>,
}

impl<'a> Hunk<'a> {
    /// Build a hunk from one group of opcodes
    fn from_group(group: &[Opcode], old: &[&'a str], new: &[&'a str]) -> Option<Self> {
        let (first, last) = (group.first()?, group.last()?);

        let mut lines = Vec::new();
        for op in group {
            match op.tag {
                Tag::Equal => lines.extend(old[op.old.clone()].iter().copied().map(HunkLine::Context)),
                Tag::Delete => lines.extend(old[op.old.clone()].iter().copied().map(HunkLine::Delete)),
                Tag::Insert => lines.extend(new[op.new.clone()].iter().copied().map(HunkLine::Insert)),
                Tag::Replace => {
                    lines.extend(old[op.old.clone()].iter().copied().map(HunkLine::Delete));
                    lines.extend(new[op.new.clone()].iter().copied().map(HunkLine::Insert));
                }
            }
        }

        Some(Hunk {
            old: HunkRange {
                start: first.old.start,
                len: last.old.end - first.old.start,
            },
            new: HunkRange {
                start: first.new.start,
                len: last.new.end - first.new.start,
            },
            lines,
        })
    }
}

impl fmt::Display for Hunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@@ -{} +{} @@", self.old, self.new)?;

        for line in &self.lines {
            match line {
                HunkLine::Context(content) => writeln!(f, " {}", content)?,
                HunkLine::Delete(content) => writeln!(f, "-{}", content)?,
                HunkLine::Insert(content) => writeln!(f, "+{}", content)?,
            }
        }

        Ok(())
    }
}

/// Split opcodes into groups of nearby changes with up to `context` equal
/// lines on each side.
///
/// An equal run longer than `2 * context` separates two groups. Groups with
/// no change are dropped.
pub(crate) fn group_opcodes(opcodes: &[Opcode], context: usize) -> Vec<Vec<Opcode>> {
    let mut codes = opcodes.to_vec();

    if let Some(first) = codes.first_mut().filter(|op| op.tag == Tag::Equal) {
        first.old.start = max(first.old.start, first.old.end.saturating_sub(context));
        first.new.start = max(first.new.start, first.new.end.saturating_sub(context));
    }
    if let Some(last) = codes.last_mut().filter(|op| op.tag == Tag::Equal) {
        last.old.end = min(last.old.end, last.old.start.saturating_add(context));
        last.new.end = min(last.new.end, last.new.start.saturating_add(context));
    }

    let mut groups = Vec::new();
    let mut group = Vec::new();

    for mut op in codes {
        if op.tag == Tag::Equal && op.old.len() > context.saturating_mul(2) {
            group.push(Opcode::new(
                Tag::Equal,
                op.old.start..min(op.old.end, op.old.start + context),
                op.new.start..min(op.new.end, op.new.start + context),
            ));
            groups.push(mem::take(&mut group));

            op.old.start = max(op.old.start, op.old.end - context);
            op.new.start = max(op.new.start, op.new.end - context);
        }
        group.push(op);
    }

    if group.iter().any(|op| op.tag != Tag::Equal) {
        groups.push(group);
    }

    groups
}

/// Hunks for a unified rendering of the aligned lines
pub(crate) fn build_hunks<'a>(
    opcodes: &[Opcode],
    old: &[&'a str],
    new: &[&'a str],
    context: usize,
) -> Vec<Hunk<'a>> {
    group_opcodes(opcodes, context)
        .iter()
        .filter_map(|group| Hunk::from_group(group, old, new))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::align::align;
    use similar_asserts::assert_eq;

    fn render(old: &[&str], new: &[&str], context: usize) -> String {
        build_hunks(&align(old, new), old, new, context)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    const TEN: [&str; 10] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"];
    const TEN_CHANGED: [&str; 10] = ["1", "two", "3", "4", "5", "6", "7", "8", "nine", "10"];

    #[test]
    fn render_pure_insertion() {
        let hunk = Hunk {
            old: HunkRange { start: 10, len: 0 },
            new: HunkRange { start: 10, len: 1 },
            lines: vec![HunkLine::Insert("new line here")],
        };
        assert_eq!(hunk.to_string(), "@@ -10,0 +11 @@\n+new line here\n");
    }

    #[test]
    fn render_pure_deletion() {
        let hunk = Hunk {
            old: HunkRange { start: 9, len: 1 },
            new: HunkRange { start: 9, len: 0 },
            lines: vec![HunkLine::Delete("old line removed")],
        };
        assert_eq!(hunk.to_string(), "@@ -10 +9,0 @@\n-old line removed\n");
    }

    #[test]
    fn render_replacement_with_context() {
        let hunk = Hunk {
            old: HunkRange { start: 0, len: 3 },
            new: HunkRange { start: 0, len: 4 },
            lines: vec![
                HunkLine::Context("a"),
                HunkLine::Delete("b"),
                HunkLine::Insert("x"),
                HunkLine::Insert("y"),
                HunkLine::Context("c"),
            ],
        };
        assert_eq!(hunk.to_string(), "@@ -1,3 +1,4 @@\n a\n-b\n+x\n+y\n c\n");
    }

    #[test]
    fn render_empty_line_content() {
        let hunk = Hunk {
            old: HunkRange { start: 10, len: 0 },
            new: HunkRange { start: 10, len: 3 },
            lines: vec![
                HunkLine::Insert("first"),
                HunkLine::Insert(""),
                HunkLine::Insert("third"),
            ],
        };
        assert_eq!(hunk.to_string(), "@@ -10,0 +11,3 @@\n+first\n+\n+third\n");
    }

    #[test]
    fn render_content_with_diff_markers() {
        let hunk = Hunk {
            old: HunkRange { start: 5, len: 0 },
            new: HunkRange { start: 5, len: 3 },
            lines: vec![
                HunkLine::Insert("+++ starts with plus"),
                HunkLine::Insert("--- starts with minus"),
                HunkLine::Insert("@@ looks like a header"),
            ],
        };
        assert_eq!(
            hunk.to_string(),
            "@@ -5,0 +6,3 @@\n++++ starts with plus\n+--- starts with minus\n+@@ looks like a header\n"
        );
    }

    #[test]
    fn distant_changes_split_into_hunks() {
        insta::assert_snapshot!(render(&TEN, &TEN_CHANGED, 1), @r"
@@ -1,3 +1,3 @@
 1
-2
+two
 3
@@ -8,3 +8,3 @@
 8
-9
+nine
 10
");
    }

    #[test]
    fn close_changes_merge_into_one_hunk() {
        // Six equal lines between changes, exactly twice the context
        let rendered = render(&TEN, &TEN_CHANGED, 3);
        assert_eq!(rendered.matches("@@ -").count(), 1);
        assert!(rendered.starts_with("@@ -1,10 +1,10 @@\n"));
    }

    #[test]
    fn zero_context_keeps_only_changes() {
        assert_eq!(
            render(&TEN, &TEN_CHANGED, 0),
            "@@ -2 +2 @@\n-2\n+two\n@@ -9 +9 @@\n-9\n+nine\n"
        );
    }

    #[test]
    fn zero_context_insertion_names_preceding_line() {
        assert_eq!(render(&["a", "b"], &["a", "x", "b"], 0), "@@ -1,0 +2 @@\n+x\n");
    }

    #[test]
    fn insertion_into_empty_text() {
        assert_eq!(render(&[], &["a", "b"], 3), "@@ -0,0 +1,2 @@\n+a\n+b\n");
    }

    #[test]
    fn context_is_trimmed_at_edges() {
        let old = ["1", "2", "3", "4", "5", "6"];
        let new = ["1", "2", "3", "4", "5", "six"];
        assert_eq!(
            render(&old, &new, 2),
            "@@ -4,3 +4,3 @@\n 4\n 5\n-6\n+six\n"
        );
    }

    #[test]
    fn identical_lines_have_no_groups() {
        let lines = ["a", "b"];
        assert!(group_opcodes(&align(&lines, &lines), 3).is_empty());
        assert!(group_opcodes(&[], 3).is_empty());
    }

    #[test]
    fn huge_context_does_not_overflow() {
        assert_eq!(
            render(&["a", "b"], &["a", "c"], usize::MAX),
            "@@ -1,2 +1,2 @@\n a\n-b\n+c\n"
        );
    }
}
