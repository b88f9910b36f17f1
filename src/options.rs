use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Lines of unchanged context kept around each change in unified output
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// Largest input, in characters, a comparison accepts
pub const DEFAULT_MAX_INPUT_CHARS: usize = 1_000_000;

/// Settings for a comparison.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```
/// # use diff_marker::DiffOptions;
/// let options = DiffOptions::from_toml_str("context_lines = 1").unwrap();
/// assert_eq!(options.context_lines, 1);
/// assert_eq!(options.from_label, "Text 1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffOptions {
    /// Unchanged lines shown around each change in unified output
    pub context_lines: usize,
    /// Size ceiling applied to each input before any work starts
    pub max_input_chars: usize,
    /// Label on the `---` line of unified output
    pub from_label: String,
    /// Label on the `+++` line of unified output
    pub to_label: String,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            from_label: "Text 1".to_string(),
            to_label: "Text 2".to_string(),
        }
    }
}

impl DiffOptions {
    #[must_use]
    pub fn with_context_lines(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }

    #[must_use]
    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    #[must_use]
    pub fn with_labels(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.from_label = from.into();
        self.to_label = to.into();
        self
    }

    /// Parse options from TOML text, filling unset keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] for malformed TOML, unknown keys
    /// or values of the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::InvalidConfig {
            message: e.to_string(),
        })
    }
}
