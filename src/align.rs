//! Line alignment.
//!
//! Finds the longest run of lines common to both sides, then repeats the
//! search on the regions before and after it until no common line is left.
//! The matched runs become `equal` opcodes and the gaps between them become
//! `delete`, `insert` or `replace` opcodes.
//!
//! # Invariants
//!
//! - Opcodes cover `0..old.len()` and `0..new.len()` contiguously, in order.
//! - No two non-equal opcodes are adjacent: a gap with lines on both sides is
//!   a single `replace`.

use std::collections::HashMap;
use std::iter;
use std::ops::Range;

use tracing::trace;

/// Classification of an opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tag {
    Equal,
    Delete,
    Insert,
    Replace,
}

impl Tag {
    /// The tag describing a changed region with the given ranges
    fn for_change(old: &Range<usize>, new: &Range<usize>) -> Self {
        match (old.is_empty(), new.is_empty()) {
            (false, true) => Tag::Delete,
            (true, false) => Tag::Insert,
            _ => Tag::Replace,
        }
    }
}

/// Lines `old` of the left text correspond to lines `new` of the right text
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Opcode {
    pub tag: Tag,
    pub old: Range<usize>,
    pub new: Range<usize>,
}

impl Opcode {
    pub fn new(tag: Tag, old: Range<usize>, new: Range<usize>) -> Self {
        Self { tag, old, new }
    }
}

/// A run of `len` identical lines starting at `old` and `new`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Block {
    old: usize,
    new: usize,
    len: usize,
}

/// Align two line sequences into a contiguous list of opcodes
pub(crate) fn align(old: &[&str], new: &[&str]) -> Vec<Opcode> {
    let blocks = matching_blocks(old, new);
    trace!(blocks = blocks.len(), "found matching blocks");
    coalesce(raw_opcodes(&blocks, old.len(), new.len()))
}

/// Positions of every distinct line on the right side, ascending
fn index_lines<'a>(lines: &[&'a str]) -> HashMap<&'a str, Vec<usize>> {
    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (j, &line) in lines.iter().enumerate() {
        index.entry(line).or_default().push(j);
    }
    index
}

/// Longest common run within the given ranges.
///
/// Among runs of equal length the one starting earliest on the left wins,
/// then the one starting earliest on the right. A zero-length block means the
/// ranges share no line.
fn longest_match(
    old: &[&str],
    index: &HashMap<&str, Vec<usize>>,
    old_range: Range<usize>,
    new_range: Range<usize>,
) -> Block {
    let mut best = Block {
        old: old_range.start,
        new: new_range.start,
        len: 0,
    };

    // Length of the common run ending at each right-hand position, for the
    // previous left-hand line
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

    for i in old_range {
        let mut next: HashMap<usize, usize> = HashMap::new();

        if let Some(positions) = index.get(old[i]) {
            let first = positions.partition_point(|&j| j < new_range.start);
            for &j in &positions[first..] {
                if j >= new_range.end {
                    break;
                }

                let len = j
                    .checked_sub(1)
                    .and_then(|prev| run_ending_at.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next.insert(j, len);

                if len > best.len {
                    best = Block {
                        old: i + 1 - len,
                        new: j + 1 - len,
                        len,
                    };
                }
            }
        }

        run_ending_at = next;
    }

    best
}

/// All matching blocks, sorted and with touching blocks merged.
///
/// Pending regions live on an explicit stack so deeply nested matches cannot
/// exhaust the call stack.
fn matching_blocks(old: &[&str], new: &[&str]) -> Vec<Block> {
    let index = index_lines(new);
    let mut pending = vec![(0..old.len(), 0..new.len())];
    let mut blocks = Vec::new();

    while let Some((old_range, new_range)) = pending.pop() {
        let block = longest_match(old, &index, old_range.clone(), new_range.clone());
        if block.len == 0 {
            continue;
        }

        if old_range.start < block.old && new_range.start < block.new {
            pending.push((old_range.start..block.old, new_range.start..block.new));
        }

        let old_after = block.old + block.len;
        let new_after = block.new + block.len;
        if old_after < old_range.end && new_after < new_range.end {
            pending.push((old_after..old_range.end, new_after..new_range.end));
        }

        blocks.push(block);
    }

    blocks.sort_unstable();

    let mut merged: Vec<Block> = Vec::with_capacity(blocks.len());
    for block in blocks {
        match merged.last_mut() {
            Some(last) if last.old + last.len == block.old && last.new + last.len == block.new => {
                last.len += block.len;
            }
            _ => merged.push(block),
        }
    }

    merged
}

/// Opcodes for the blocks and the gaps between them.
///
/// Each gap yields a separate `delete` and `insert`; [`coalesce`] joins them.
fn raw_opcodes(blocks: &[Block], old_len: usize, new_len: usize) -> Vec<Opcode> {
    let sentinel = Block {
        old: old_len,
        new: new_len,
        len: 0,
    };

    let mut opcodes = Vec::with_capacity(blocks.len() * 3 + 2);
    let (mut i, mut j) = (0, 0);

    for block in blocks.iter().chain(iter::once(&sentinel)) {
        if i < block.old {
            opcodes.push(Opcode::new(Tag::Delete, i..block.old, j..j));
        }
        if j < block.new {
            opcodes.push(Opcode::new(Tag::Insert, block.old..block.old, j..block.new));
        }
        if block.len > 0 {
            opcodes.push(Opcode::new(
                Tag::Equal,
                block.old..block.old + block.len,
                block.new..block.new + block.len,
            ));
        }

        i = block.old + block.len;
        j = block.new + block.len;
    }

    opcodes
}

/// Merge every run of adjacent non-equal opcodes into one.
///
/// Deletions and insertions with no equal block between them form a
/// replacement rather than independent changes.
fn coalesce(raw: Vec<Opcode>) -> Vec<Opcode> {
    let mut opcodes: Vec<Opcode> = Vec::with_capacity(raw.len());

    for op in raw {
        match opcodes.last_mut() {
            Some(last) if last.tag != Tag::Equal && op.tag != Tag::Equal => {
                last.old.end = op.old.end;
                last.new.end = op.new.end;
                last.tag = Tag::for_change(&last.old, &last.new);
            }
            _ => opcodes.push(op),
        }
    }

    opcodes
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn op(tag: Tag, old: Range<usize>, new: Range<usize>) -> Opcode {
        Opcode::new(tag, old, new)
    }

    #[test]
    fn identical_lines_are_one_equal() {
        let lines = ["a", "b", "c"];
        assert_eq!(align(&lines, &lines), vec![op(Tag::Equal, 0..3, 0..3)]);
    }

    #[test]
    fn both_empty_yield_nothing() {
        assert!(align(&[], &[]).is_empty());
    }

    #[test]
    fn one_side_empty_is_pure_insert_or_delete() {
        assert_eq!(align(&[], &["a", "b"]), vec![op(Tag::Insert, 0..0, 0..2)]);
        assert_eq!(align(&["a", "b"], &[]), vec![op(Tag::Delete, 0..2, 0..0)]);
    }

    #[test]
    fn disjoint_lines_are_one_replace() {
        assert_eq!(
            align(&["a", "b"], &["x", "y", "z"]),
            vec![op(Tag::Replace, 0..2, 0..3)]
        );
    }

    #[test]
    fn changed_middle_line_is_replace() {
        assert_eq!(
            align(&["a", "b", "c"], &["a", "x", "c"]),
            vec![
                op(Tag::Equal, 0..1, 0..1),
                op(Tag::Replace, 1..2, 1..2),
                op(Tag::Equal, 2..3, 2..3),
            ]
        );
    }

    #[test]
    fn appended_line_is_insert() {
        assert_eq!(
            align(&["a", "b"], &["a", "b", "c"]),
            vec![op(Tag::Equal, 0..2, 0..2), op(Tag::Insert, 2..2, 2..3)]
        );
    }

    #[test]
    fn removed_line_is_delete() {
        assert_eq!(
            align(&["a", "b", "c"], &["a", "c"]),
            vec![
                op(Tag::Equal, 0..1, 0..1),
                op(Tag::Delete, 1..2, 1..1),
                op(Tag::Equal, 2..3, 1..2),
            ]
        );
    }

    #[test]
    fn longest_block_wins_over_earlier_short_one() {
        let old = ["x", "a", "b", "c"];
        let new = ["a", "b", "c", "x"];
        assert_eq!(
            align(&old, &new),
            vec![
                op(Tag::Delete, 0..1, 0..0),
                op(Tag::Equal, 1..4, 0..3),
                op(Tag::Insert, 4..4, 3..4),
            ]
        );
    }

    #[test]
    fn ties_prefer_leftmost_match() {
        // "x" at old 0 matches new 1 before "y" gets a chance
        assert_eq!(
            align(&["x", "y"], &["y", "x"]),
            vec![
                op(Tag::Insert, 0..0, 0..1),
                op(Tag::Equal, 0..1, 1..2),
                op(Tag::Delete, 1..2, 2..2),
            ]
        );
    }

    #[test]
    fn ties_prefer_earliest_right_position() {
        let block = longest_match(
            &["a"],
            &index_lines(&["a", "a", "a"]),
            0..1,
            0..3,
        );
        assert_eq!(block, Block { old: 0, new: 0, len: 1 });
    }

    #[test]
    fn longest_match_respects_range_bounds() {
        let new = ["a", "b", "a", "b"];
        let block = longest_match(&["a", "b"], &index_lines(&new), 0..2, 1..4);
        assert_eq!(block, Block { old: 0, new: 2, len: 2 });
    }

    #[test]
    fn repeated_lines_prefer_longest_block() {
        let old = ["a", "a", "b"];
        let new = ["a", "b", "a", "b"];
        assert_eq!(
            align(&old, &new),
            vec![
                op(Tag::Delete, 0..1, 0..0),
                op(Tag::Equal, 1..3, 0..2),
                op(Tag::Insert, 3..3, 2..4),
            ]
        );
    }

    #[test]
    fn coalesce_joins_delete_and_insert() {
        let raw = vec![
            op(Tag::Delete, 0..2, 0..0),
            op(Tag::Insert, 2..2, 0..1),
            op(Tag::Equal, 2..3, 1..2),
            op(Tag::Insert, 3..3, 2..4),
            op(Tag::Delete, 3..4, 4..4),
        ];
        assert_eq!(
            coalesce(raw),
            vec![
                op(Tag::Replace, 0..2, 0..1),
                op(Tag::Equal, 2..3, 1..2),
                op(Tag::Replace, 3..4, 2..4),
            ]
        );
    }

    #[test]
    fn coalesce_keeps_lone_changes() {
        let raw = vec![op(Tag::Equal, 0..1, 0..1), op(Tag::Delete, 1..2, 1..1)];
        assert_eq!(coalesce(raw.clone()), raw);
    }

    #[test]
    fn many_small_matches_do_not_recurse() {
        // Every other line differs, producing thousands of pending regions
        let old: Vec<String> = (0..2000).map(|i| format!("line {i}")).collect();
        let new: Vec<String> = (0..2000)
            .map(|i| {
                if i % 2 == 0 {
                    format!("line {i}")
                } else {
                    format!("changed {i}")
                }
            })
            .collect();
        let old: Vec<&str> = old.iter().map(String::as_str).collect();
        let new: Vec<&str> = new.iter().map(String::as_str).collect();

        let opcodes = align(&old, &new);
        assert_eq!(opcodes.len(), 2000);
        assert!(
            opcodes
                .iter()
                .all(|o| matches!(o.tag, Tag::Equal | Tag::Replace))
        );
    }
}
