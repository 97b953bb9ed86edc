//! Evaluator configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Largest accepted `display_digits`.
pub const MAX_DISPLAY_DIGITS: usize = 64;

/// Largest accepted `suggestion_distance`.
pub const MAX_SUGGESTION_DISTANCE: usize = 8;

/// Knobs for diagnostics and value rendering.
///
/// None of these settings change evaluation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Maximum number of "did you mean" names attached to a diagnostic.
    pub suggestion_limit: usize,
    /// Maximum edit distance for a name to count as a suggestion.
    pub suggestion_distance: usize,
    /// Fractional digits when rendering non-terminating magnitudes.
    pub display_digits: usize,
}

impl EvalConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display_digits == 0 || self.display_digits > MAX_DISPLAY_DIGITS {
            return Err(ConfigError::DisplayDigits {
                value: self.display_digits,
                max: MAX_DISPLAY_DIGITS,
            });
        }
        if self.suggestion_distance > MAX_SUGGESTION_DISTANCE {
            return Err(ConfigError::SuggestionDistance {
                value: self.suggestion_distance,
                max: MAX_SUGGESTION_DISTANCE,
            });
        }
        Ok(())
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            suggestion_limit: 3,
            suggestion_distance: 2,
            display_digits: 12,
        }
    }
}
