//! Validation error types

use std::fmt;

use super::messages;

/// Validation error for request input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required value absent or blank
    Missing { field: &'static str },

    /// Value expected to be a positive integer id
    NotNumeric { field: &'static str, value: String },

    /// Value outside the accepted set
    InvalidVariant { field: &'static str, value: String },

    /// Query string or body could not be decoded
    Malformed { field: &'static str, detail: String },
}

impl ValidationError {
    /// Response message sent to the client for this error.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Missing { .. } => messages::NULL_VALUE,
            Self::NotNumeric { .. } | Self::InvalidVariant { .. } | Self::Malformed { .. } => {
                messages::OUT_OF_VALUE
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { field } => write!(f, "{} is required", field),
            Self::NotNumeric { field, value } => {
                write!(f, "{} must be a positive integer, got '{}'", field, value)
            }
            Self::InvalidVariant { field, value } => {
                write!(f, "invalid {} value: '{}'", field, value)
            }
            Self::Malformed { field, detail } => write!(f, "malformed {}: {}", field, detail),
        }
    }
}

impl std::error::Error for ValidationError {}
