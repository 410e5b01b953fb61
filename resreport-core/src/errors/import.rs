//! Import error types
//!
//! Failures raised while turning an uploaded spreadsheet into the canonical
//! reservation table. Per-cell coercion problems are not errors; they are
//! collected in a [`crate::normalize::CoercionReport`] instead.
//!
//! # Examples
//!
//! ```rust
//! use resreport::errors::ImportError;
//!
//! let err = ImportError::MissingColumns(vec!["Profit".to_string()]);
//! assert_eq!(err.error_code(), "MISSING_COLUMNS");
//! assert!(err.is_client_error());
//! ```

use thiserror::Error;

/// Errors that stop an upload from producing a table
#[derive(Error, Debug)]
pub enum ImportError {
    /// None of the scanned rows contains every required column name
    #[error("Header row not found in the first {scanned} rows")]
    HeaderNotFound { scanned: usize },

    /// Header located, but some required columns are absent after trimming
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// File extension is not a supported spreadsheet format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The spreadsheet container could not be parsed
    #[error("Invalid spreadsheet: {0}")]
    Workbook(String),

    /// The workbook has no worksheet to read
    #[error("Workbook contains no worksheets")]
    EmptyWorkbook,

    /// IO error while reading the upload
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// Check if the failure is caused by the uploaded file itself
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ImportError::HeaderNotFound { .. }
                | ImportError::MissingColumns(_)
                | ImportError::UnsupportedFormat(_)
                | ImportError::Workbook(_)
                | ImportError::EmptyWorkbook
        )
    }

    /// Names of the required columns that were not found, if that is the failure
    pub fn missing_columns(&self) -> Option<&[String]> {
        match self {
            ImportError::MissingColumns(columns) => Some(columns),
            _ => None,
        }
    }

    /// Suggestion shown to the user next to the failure message
    pub fn hint(&self) -> &'static str {
        match self {
            ImportError::HeaderNotFound { .. } => {
                "Check that the file contains the correct column names within its first rows."
            }
            ImportError::MissingColumns(_) => {
                "Check that the column names in the file match the required names exactly."
            }
            ImportError::UnsupportedFormat(_) => "Upload an .xlsx or .xls file.",
            _ => "Please check that the file is a valid, non-empty spreadsheet.",
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ImportError::HeaderNotFound { .. } => "HEADER_NOT_FOUND",
            ImportError::MissingColumns(_) => "MISSING_COLUMNS",
            ImportError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            ImportError::Workbook(_) => "INVALID_SPREADSHEET",
            ImportError::EmptyWorkbook => "EMPTY_WORKBOOK",
            ImportError::Io(_) => "IO_ERROR",
        }
    }
}
