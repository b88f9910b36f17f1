use super::hunk::Hunk;
use std::fmt;

/// A complete unified diff between two labelled texts.
///
/// Renders the `---`/`+++` header followed by every hunk. The header is
/// written even when there are no hunks.
#[derive(Debug, PartialEq, Eq)]
pub struct UnifiedDiff<'a> {
    /// Label of the left text (`--- label`)
    pub from_label: &'a str,
    /// Label of the right text (`+++ label`)
    pub to_label: &'a str,
    pub hunks: Vec<Hunk<'a>>,
}

impl<'a> UnifiedDiff<'a> {
    pub fn new(from_label: &'a str, to_label: &'a str, hunks: Vec<Hunk<'a>>) -> Self {
        Self {
            from_label,
            to_label,
            hunks,
        }
    }
}

impl fmt::Display for UnifiedDiff<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {}", self.from_label)?;
        writeln!(f, "+++ {}", self.to_label)?;

        for hunk in &self.hunks {
            write!(f, "{}", hunk)?;
        }

        Ok(())
    }
}
