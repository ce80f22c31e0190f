//! Immutable inference settings shared by every stage of a run.

use crate::cli::InferenceArgs;

pub const DEFAULT_NULL_MARKER: &str = "\\N";
pub const DEFAULT_MAX_TRACKED_VALUES: usize = 1_000_000;
pub const DEFAULT_OUTPUT_NAME: &str = "mysql_load.sql";

/// Separator, quote and escape characters. `None` is the "no character"
/// setting: it disables the feature in the reader and renders as an empty
/// string in the generated load statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub separator: Option<u8>,
    pub quote: Option<u8>,
    pub escape: Option<u8>,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            separator: Some(b','),
            quote: Some(b'"'),
            escape: Some(b'\\'),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub dialect: Dialect,
    pub first_row_is_header: bool,
    pub utf8: bool,
    pub detect_unique_keys: bool,
    pub max_tracked_values: usize,
    pub blanks_are_null: bool,
    pub reject_leading_zero_integers: bool,
    pub null_marker: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            first_row_is_header: true,
            utf8: false,
            detect_unique_keys: false,
            max_tracked_values: DEFAULT_MAX_TRACKED_VALUES,
            blanks_are_null: true,
            reject_leading_zero_integers: false,
            null_marker: DEFAULT_NULL_MARKER.to_string(),
        }
    }
}

impl InferenceConfig {
    pub fn from_args(args: &InferenceArgs) -> Self {
        Self {
            dialect: Dialect {
                separator: args.separator.0,
                quote: args.quote.0,
                escape: args.escape.0,
            },
            first_row_is_header: !args.generated_names,
            utf8: args.utf8,
            detect_unique_keys: args.unique_keys,
            max_tracked_values: args.max_tracked_values,
            blanks_are_null: !args.blanks_not_null,
            reject_leading_zero_integers: args.no_leading_zero_integers,
            null_marker: args.null_marker.clone(),
        }
    }

    /// Whether a trimmed field stands for SQL NULL.
    pub fn is_null(&self, value: &str) -> bool {
        value == self.null_marker || (self.blanks_are_null && value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_marker_and_blanks_are_null_by_default() {
        let config = InferenceConfig::default();
        assert!(config.is_null("\\N"));
        assert!(config.is_null(""));
        assert!(!config.is_null("N"));
    }

    #[test]
    fn blanks_can_be_treated_as_values() {
        let config = InferenceConfig {
            blanks_are_null: false,
            ..InferenceConfig::default()
        };
        assert!(!config.is_null(""));
        assert!(config.is_null("\\N"));
    }
}
