use thiserror::Error;

/// Report export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// The xlsx writer rejected a sheet, cell or the final save
    #[error("Export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl ExportError {
    pub fn is_client_error(&self) -> bool {
        false
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ExportError::Xlsx(_) => "EXPORT_FAILED",
        }
    }
}
