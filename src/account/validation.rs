//! Input validation for account profiles
//!
//! `PersonName` keeps its field private so a profile can only be built from
//! names that passed the length rule.

use std::fmt;

/// Name length limit, counted in characters (not bytes)
pub const MAX_NAME_CHARS: usize = 3;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must not exceed {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Validated first or last name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    /// # Validation Rules
    /// - Must not be empty
    /// - At most [`MAX_NAME_CHARS`] characters
    pub fn new(field: &'static str, value: &str) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::Required { field });
        }
        let actual = value.chars().count();
        if actual > MAX_NAME_CHARS {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_NAME_CHARS,
                actual,
            });
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
