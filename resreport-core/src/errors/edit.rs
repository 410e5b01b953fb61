//! Edit error types
//!
//! Raised when an edit delta coming back from the render surface cannot be
//! turned into a typed cell edit. Edits that parse but do not apply (unknown
//! row, read-only column) are reported as skipped outcomes, not errors.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// The named view does not exist
    #[error("Unknown view: {0}")]
    UnknownView(String),

    /// The named field is not a column of the reservation table
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// The value does not fit the declared column type
    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl EditError {
    /// Every edit error comes from caller input
    pub fn is_client_error(&self) -> bool {
        true
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EditError::UnknownView(_) => "UNKNOWN_VIEW",
            EditError::UnknownField(_) => "UNKNOWN_FIELD",
            EditError::InvalidValue { .. } => "INVALID_VALUE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_message() {
        let err = EditError::InvalidValue {
            field: "net_price".to_string(),
            value: "abc".to_string(),
            reason: "not a number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value 'abc' for net_price: not a number"
        );
        assert_eq!(err.error_code(), "INVALID_VALUE");
    }
}
