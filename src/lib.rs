//! Line-level comparison of two text blocks.
//!
//! A comparison aligns the lines of both inputs, classifies every line as
//! equal, inserted, deleted or replaced, and renders the outcome as a
//! unified diff, a side-by-side table and a one-line change summary.
//!
//! ```
//! let result = diff_marker::compute_diff("a\nb\nc", "a\nx\nc", 3)?;
//! assert_eq!(
//!     result.stats().to_string(),
//!     "Changes: +0 -0 ~1 (Total: 3 lines)"
//! );
//! assert!(result.unified_diff().contains("-b\n+x\n"));
//! # Ok::<(), diff_marker::DiffError>(())
//! ```

use error_set::error_set;
use tracing::{debug, warn};

mod align;
pub mod diff;
mod options;

pub use diff::side_by_side::SideBySide;
pub use diff::{DiffLine, DiffResult, DiffStats, DiffType, View};
pub use options::{DEFAULT_CONTEXT_LINES, DEFAULT_MAX_INPUT_CHARS, DiffOptions};

error_set! {
    /// Top-level error for diff-marker operations
    DiffError := {
        /// An input holds more characters than the configured ceiling
        #[display("{label} is {len} characters, exceeding the limit of {limit}")]
        InputTooLarge { label: String, len: usize, limit: usize },
    } || FormatError || ConfigError

    /// Consistency failures detected while formatting a comparison
    FormatError := {
        #[display("Diff invariant violated: {message}")]
        InvariantViolation { message: String },
    }

    /// Errors from loading diff options
    ConfigError := {
        #[display("Invalid diff options: {message}")]
        InvalidConfig { message: String },
    }
}

/// Compare two texts with default options and the given context size.
///
/// # Errors
///
/// Returns [`DiffError::InputTooLarge`] when either text exceeds
/// [`DEFAULT_MAX_INPUT_CHARS`] characters.
pub fn compute_diff(
    text_a: &str,
    text_b: &str,
    context_lines: usize,
) -> Result<DiffResult, DiffError> {
    DiffMarker::new(DiffOptions::default().with_context_lines(context_lines)).compare(text_a, text_b)
}

/// Main interface for text comparisons
#[derive(Debug, Clone, Default)]
pub struct DiffMarker {
    options: DiffOptions,
}

impl DiffMarker {
    /// Create a comparer with the given options
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Compare two text blocks line by line.
    ///
    /// Both inputs are checked against the size ceiling before any splitting
    /// or alignment happens.
    ///
    /// # Examples
    /// ```
    /// # use diff_marker::{DiffMarker, DiffOptions, DiffType};
    /// let marker = DiffMarker::new(DiffOptions::default().with_labels("old", "new"));
    /// let result = marker.compare("a\nb", "a\nb\nc").unwrap();
    /// assert_eq!(result.lines()[2].diff_type, DiffType::Insert);
    /// assert!(result.unified_diff().starts_with("--- old\n+++ new\n"));
    /// ```
    pub fn compare(&self, text_a: &str, text_b: &str) -> Result<DiffResult, DiffError> {
        self.check_size(&self.options.from_label, text_a)?;
        self.check_size(&self.options.to_label, text_b)?;

        let old: Vec<&str> = text_a.lines().collect();
        let new: Vec<&str> = text_b.lines().collect();

        let opcodes = align::align(&old, &new);
        debug!(
            old_lines = old.len(),
            new_lines = new.len(),
            opcodes = opcodes.len(),
            "aligned inputs"
        );

        Ok(diff::format(&opcodes, &old, &new, &self.options)?)
    }

    fn check_size(&self, label: &str, text: &str) -> Result<(), DiffError> {
        let limit = self.options.max_input_chars;
        // A string never holds more chars than bytes
        if text.len() <= limit {
            return Ok(());
        }

        let len = text.chars().count();
        if len > limit {
            warn!(label, len, limit, "rejecting oversized input");
            return Err(DiffError::InputTooLarge {
                label: label.to_string(),
                len,
                limit,
            });
        }

        Ok(())
    }
}
