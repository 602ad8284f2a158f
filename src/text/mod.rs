//! # Text Transforms
//!
//! Pure string functions behind the text endpoints. No state, no I/O.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for text transforms
pub type TextResult<T> = Result<T, TextError>;

/// Input validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("Text field is required.")]
    MissingText,

    #[error("duplication_factor must not be negative, got {0}")]
    NegativeDuplication(i64),

    #[error("duplication_factor {0} exceeds maximum {1}")]
    DuplicationTooLarge(i64, u32),

    #[error("capitalization must be UPPER or LOWER, got '{0}'")]
    InvalidCapitalization(String),
}

/// Recasing applied before repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capitalization {
    Upper,
    Lower,
}

impl Capitalization {
    pub fn apply(self, text: &str) -> String {
        match self {
            Capitalization::Upper => text.to_uppercase(),
            Capitalization::Lower => text.to_lowercase(),
        }
    }
}

impl FromStr for Capitalization {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPPER" => Ok(Capitalization::Upper),
            "LOWER" => Ok(Capitalization::Lower),
            other => Err(TextError::InvalidCapitalization(other.to_string())),
        }
    }
}

/// Limits for the text endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextConfig {
    /// Largest accepted duplication factor (default: 10000)
    #[serde(default = "default_max_duplication_factor")]
    pub max_duplication_factor: u32,
}

fn default_max_duplication_factor() -> u32 {
    10_000
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            max_duplication_factor: default_max_duplication_factor(),
        }
    }
}

/// Upper-case the text. Only a missing value is an error.
pub fn uppercase(text: Option<&str>) -> TextResult<String> {
    text.map(str::to_uppercase).ok_or(TextError::MissingText)
}

/// Optionally recase `text`, then repeat it `duplication_factor` times
/// (default 1) by plain concatenation.
///
/// Missing or empty text is rejected, as are negative factors and factors
/// above `config.max_duplication_factor`.
pub fn process_text(
    text: Option<&str>,
    duplication_factor: Option<i64>,
    capitalization: Option<Capitalization>,
    config: &TextConfig,
) -> TextResult<String> {
    let text = match text {
        Some(t) if !t.is_empty() => t,
        _ => return Err(TextError::MissingText),
    };

    let factor = duplication_factor.unwrap_or(1);
    if factor < 0 {
        return Err(TextError::NegativeDuplication(factor));
    }
    if factor > i64::from(config.max_duplication_factor) {
        return Err(TextError::DuplicationTooLarge(
            factor,
            config.max_duplication_factor,
        ));
    }

    let recased = match capitalization {
        Some(c) => c.apply(text),
        None => text.to_string(),
    };

    Ok(recased.repeat(factor as usize))
}
