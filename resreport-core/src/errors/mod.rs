//! Domain-specific error types for resreport-core
//!
//! # Error Categories
//!
//! - **ImportError**: header discovery, required columns, unreadable workbooks
//! - **EditError**: edit deltas that do not parse into typed cell edits
//! - **ExportError**: report workbook generation
//! - **ConfigError**: report configuration files
//! - **SessionError**: interaction-level failures, wrapping the above
//!
//! Per-cell coercion failures are deliberately absent from this list: they
//! never escalate and are reported as data by the normalizer.
//!
//! # Examples
//!
//! ```rust
//! use resreport::errors::{ImportError, SessionError};
//!
//! let err: SessionError = ImportError::HeaderNotFound { scanned: 10 }.into();
//! assert_eq!(err.error_code(), "HEADER_NOT_FOUND");
//! ```

pub mod config;
pub mod edit;
pub mod export;
pub mod import;
pub mod session;

pub use config::ConfigError;
pub use edit::EditError;
pub use export::ExportError;
pub use import::ImportError;
pub use session::SessionError;

/// Result type alias for import operations
pub type ImportResult<T> = Result<T, ImportError>;

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for session interactions
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_result_alias() {
        let result: ImportResult<()> = Err(ImportError::EmptyWorkbook);
        assert!(result.is_err());
    }

    #[test]
    fn test_session_error_wraps_import_error() {
        let err = SessionError::from(ImportError::MissingColumns(vec!["Agency".to_string()]));
        assert_eq!(err.error_code(), "MISSING_COLUMNS");
        assert_eq!(err.to_string(), "Missing required columns: Agency");
    }

    #[test]
    fn test_no_table_hint() {
        let err = SessionError::NoTable;
        assert_eq!(err.error_code(), "NO_TABLE");
        assert!(err.hint().contains(".xlsx"));
        assert!(err.is_client_error());
    }
}
