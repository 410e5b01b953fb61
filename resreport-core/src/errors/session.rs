use thiserror::Error;

use super::{ExportError, ImportError};

/// Errors surfaced by a session interaction
#[derive(Error, Debug)]
pub enum SessionError {
    /// No file has been uploaded successfully in this session
    #[error("No reservation table loaded; upload a file first")]
    NoTable,

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl SessionError {
    pub fn is_client_error(&self) -> bool {
        match self {
            SessionError::NoTable => true,
            SessionError::Import(err) => err.is_client_error(),
            SessionError::Export(err) => err.is_client_error(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SessionError::NoTable => "NO_TABLE",
            SessionError::Import(err) => err.error_code(),
            SessionError::Export(err) => err.error_code(),
        }
    }

    /// Suggestion shown to the user next to the failure message
    pub fn hint(&self) -> &'static str {
        match self {
            SessionError::NoTable => "Upload an .xlsx or .xls reservation export.",
            SessionError::Import(err) => err.hint(),
            SessionError::Export(_) => {
                "Please check that the file is a valid, non-empty spreadsheet."
            }
        }
    }
}
