//! Two-column text rendering of comparison rows.
//!
//! Each row becomes `NUM | LEFT | NUM | RIGHT`, with line numbers
//! right-aligned in four columns and the left content padded to a fixed
//! width. Absent sides render as blanks. This is the text a host stores
//! when it saves a comparison result.

use std::fmt;

use super::DiffLine;

/// Characters of content shown per side
pub const COLUMN_WIDTH: usize = 80;

/// Side-by-side table over a slice of rows
#[derive(Debug, Clone, Copy)]
pub struct SideBySide<'a> {
    rows: &'a [DiffLine],
    width: usize,
}

impl<'a> SideBySide<'a> {
    pub fn new(rows: &'a [DiffLine]) -> Self {
        Self {
            rows,
            width: COLUMN_WIDTH,
        }
    }

    /// Use a different content width for both columns
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// The longest prefix of `s` holding at most `max` characters
fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

impl fmt::Display for SideBySide<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows {
            let left_num = row.line_num_left.map(|n| n.to_string()).unwrap_or_default();
            let right_num = row.line_num_right.map(|n| n.to_string()).unwrap_or_default();

            writeln!(
                f,
                "{:>4} | {:<width$} | {:>4} | {}",
                left_num,
                truncate(&row.content_left, self.width),
                right_num,
                truncate(&row.content_right, self.width),
                width = self.width
            )?;
        }

        Ok(())
    }
}
