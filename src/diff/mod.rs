//! Structured comparison results.
//!
//! [`format`] walks the aligned opcodes to build one [`DiffLine`] row per
//! line pairing, renders the unified diff and derives the [`DiffStats`].
//! The resulting [`DiffResult`] is immutable.

pub mod hunk;
pub mod side_by_side;
pub mod unified;

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::align::{Opcode, Tag};
use crate::{DiffOptions, FormatError};
use side_by_side::SideBySide;
use unified::UnifiedDiff;

/// Classification of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffType {
    Equal,
    Insert,
    Delete,
    Replace,
}

impl DiffType {
    pub fn as_str(self) -> &'static str {
        match self {
            DiffType::Equal => "equal",
            DiffType::Insert => "insert",
            DiffType::Delete => "delete",
            DiffType::Replace => "replace",
        }
    }
}

impl fmt::Display for DiffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the side-by-side comparison.
///
/// - `Equal` rows carry both sides.
/// - `Insert` rows carry only the right side, `Delete` rows only the left.
/// - `Replace` rows carry at least one side.
///
/// An absent side has no line number and empty content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    /// 1-based line number in the left text
    pub line_num_left: Option<NonZeroU32>,
    /// 1-based line number in the right text
    pub line_num_right: Option<NonZeroU32>,
    pub content_left: String,
    pub content_right: String,
    pub diff_type: DiffType,
}

impl DiffLine {
    fn equal(left: NonZeroU32, right: NonZeroU32, content_left: &str, content_right: &str) -> Self {
        Self {
            line_num_left: Some(left),
            line_num_right: Some(right),
            content_left: content_left.to_string(),
            content_right: content_right.to_string(),
            diff_type: DiffType::Equal,
        }
    }

    fn delete(left: NonZeroU32, content: &str) -> Self {
        Self {
            line_num_left: Some(left),
            line_num_right: None,
            content_left: content.to_string(),
            content_right: String::new(),
            diff_type: DiffType::Delete,
        }
    }

    fn insert(right: NonZeroU32, content: &str) -> Self {
        Self {
            line_num_left: None,
            line_num_right: Some(right),
            content_left: String::new(),
            content_right: content.to_string(),
            diff_type: DiffType::Insert,
        }
    }

    fn replace(left: Option<(NonZeroU32, &str)>, right: Option<(NonZeroU32, &str)>) -> Self {
        Self {
            line_num_left: left.map(|(n, _)| n),
            line_num_right: right.map(|(n, _)| n),
            content_left: left.map(|(_, c)| c.to_string()).unwrap_or_default(),
            content_right: right.map(|(_, c)| c.to_string()).unwrap_or_default(),
            diff_type: DiffType::Replace,
        }
    }

    /// Whether this row pairs a left line
    pub fn has_left(&self) -> bool {
        self.line_num_left.is_some()
    }

    /// Whether this row pairs a right line
    pub fn has_right(&self) -> bool {
        self.line_num_right.is_some()
    }
}

/// Change counts derived from the rows of a comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// `Insert` rows
    pub additions: usize,
    /// `Delete` rows
    pub deletions: usize,
    /// `Replace` rows
    pub modifications: usize,
    /// All rows
    pub total_lines: usize,
}

impl DiffStats {
    pub fn from_lines(lines: &[DiffLine]) -> Self {
        lines.iter().fold(
            DiffStats {
                total_lines: lines.len(),
                ..DiffStats::default()
            },
            |mut stats, line| {
                match line.diff_type {
                    DiffType::Insert => stats.additions += 1,
                    DiffType::Delete => stats.deletions += 1,
                    DiffType::Replace => stats.modifications += 1,
                    DiffType::Equal => {}
                }
                stats
            },
        )
    }

    /// Whether any row differs
    pub fn has_changes(&self) -> bool {
        self.additions + self.deletions + self.modifications > 0
    }
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Changes: +{} -{} ~{} (Total: {} lines)",
            self.additions, self.deletions, self.modifications, self.total_lines
        )
    }
}

/// Rendering of a [`DiffResult`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    /// Two-column table with line numbers
    #[default]
    SideBySide,
    /// Unified diff text
    Unified,
    /// One-line change summary
    Stats,
}

/// The outcome of one comparison.
///
/// Stats always match the rows: they are computed at construction, and
/// explicitly supplied stats are only accepted when they agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    lines: Vec<DiffLine>,
    stats: DiffStats,
    unified_diff: String,
}

impl DiffResult {
    pub fn new(lines: Vec<DiffLine>, unified_diff: String) -> Self {
        let stats = DiffStats::from_lines(&lines);
        Self {
            lines,
            stats,
            unified_diff,
        }
    }

    /// Build a result with precomputed stats.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvariantViolation`] if `stats` differ from the
    /// counts of `lines`.
    pub fn with_stats(
        lines: Vec<DiffLine>,
        stats: DiffStats,
        unified_diff: String,
    ) -> Result<Self, FormatError> {
        let result = Self::new(lines, unified_diff);
        if result.stats != stats {
            return Err(FormatError::InvariantViolation {
                message: format!(
                    "supplied stats ({stats}) disagree with rows ({})",
                    result.stats
                ),
            });
        }
        Ok(result)
    }

    /// Rows in document order
    pub fn lines(&self) -> &[DiffLine] {
        &self.lines
    }

    pub fn stats(&self) -> DiffStats {
        self.stats
    }

    pub fn unified_diff(&self) -> &str {
        &self.unified_diff
    }

    /// Whether both texts had the same lines
    pub fn is_identical(&self) -> bool {
        !self.stats.has_changes()
    }

    /// Render the result as text
    pub fn render(&self, view: View) -> String {
        match view {
            View::SideBySide => SideBySide::new(&self.lines).to_string(),
            View::Unified => self.unified_diff.clone(),
            View::Stats => format!("{}\n", self.stats),
        }
    }
}

/// Build the full result for aligned line sequences.
///
/// Fails with [`FormatError::InvariantViolation`] if the opcodes leave a gap,
/// overlap, run past either input or pair unequal lines as `equal`.
pub(crate) fn format(
    opcodes: &[Opcode],
    old: &[&str],
    new: &[&str],
    options: &DiffOptions,
) -> Result<DiffResult, FormatError> {
    validate_opcodes(opcodes, old.len(), new.len())?;

    let lines = side_by_side_rows(opcodes, old, new)?;
    let unified = UnifiedDiff::new(
        &options.from_label,
        &options.to_label,
        hunk::build_hunks(opcodes, old, new, options.context_lines),
    );
    let result = DiffResult::new(lines, unified.to_string());

    debug!(
        rows = result.lines.len(),
        hunks = unified.hunks.len(),
        stats = %result.stats,
        "formatted diff"
    );

    Ok(result)
}

/// Check that opcodes partition both inputs with tags matching their ranges
fn validate_opcodes(opcodes: &[Opcode], old_len: usize, new_len: usize) -> Result<(), FormatError> {
    let violation = |message: String| Err(FormatError::InvariantViolation { message });
    let (mut i, mut j) = (0, 0);

    for (n, op) in opcodes.iter().enumerate() {
        if op.old.start != i || op.new.start != j {
            return violation(format!(
                "opcode {n} starts at ({}, {}) but previous coverage ends at ({i}, {j})",
                op.old.start, op.new.start
            ));
        }
        if op.old.end < op.old.start || op.new.end < op.new.start {
            return violation(format!("opcode {n} has a reversed range"));
        }

        let shape_ok = match op.tag {
            Tag::Equal => op.old.len() == op.new.len(),
            Tag::Delete => !op.old.is_empty() && op.new.is_empty(),
            Tag::Insert => op.old.is_empty() && !op.new.is_empty(),
            Tag::Replace => !(op.old.is_empty() && op.new.is_empty()),
        };
        if !shape_ok {
            return violation(format!(
                "opcode {n} tagged {:?} spans {:?} and {:?}",
                op.tag, op.old, op.new
            ));
        }

        i = op.old.end;
        j = op.new.end;
    }

    if i != old_len || j != new_len {
        return violation(format!(
            "opcodes cover ({i}, {j}) lines but inputs have ({old_len}, {new_len})"
        ));
    }

    Ok(())
}

/// 1-based line number for a 0-based index
fn line_number(index: usize) -> Result<NonZeroU32, FormatError> {
    u32::try_from(index + 1)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| FormatError::InvariantViolation {
            message: format!("line index {index} does not fit a line number"),
        })
}

/// Expand validated opcodes into one row per line pairing
fn side_by_side_rows(
    opcodes: &[Opcode],
    old: &[&str],
    new: &[&str],
) -> Result<Vec<DiffLine>, FormatError> {
    let mut rows = Vec::with_capacity(old.len().max(new.len()));

    for op in opcodes {
        match op.tag {
            Tag::Equal => {
                for (i, j) in op.old.clone().zip(op.new.clone()) {
                    if old[i] != new[j] {
                        return Err(FormatError::InvariantViolation {
                            message: format!(
                                "equal opcode pairs differing lines {} and {}",
                                i + 1,
                                j + 1
                            ),
                        });
                    }
                    rows.push(DiffLine::equal(line_number(i)?, line_number(j)?, old[i], new[j]));
                }
            }
            Tag::Delete => {
                for i in op.old.clone() {
                    rows.push(DiffLine::delete(line_number(i)?, old[i]));
                }
            }
            Tag::Insert => {
                for j in op.new.clone() {
                    rows.push(DiffLine::insert(line_number(j)?, new[j]));
                }
            }
            Tag::Replace => {
                // Sides are zipped by position, not by similarity
                for k in 0..op.old.len().max(op.new.len()) {
                    let left = match op.old.start + k {
                        i if i < op.old.end => Some((line_number(i)?, old[i])),
                        _ => None,
                    };
                    let right = match op.new.start + k {
                        j if j < op.new.end => Some((line_number(j)?, new[j])),
                        _ => None,
                    };
                    rows.push(DiffLine::replace(left, right));
                }
            }
        }
    }

    Ok(rows)
}
