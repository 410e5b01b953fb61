pub mod to_xlsx;

use serde::Serialize;

pub use to_xlsx::build_report;

pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const DEFAULT_FILE_NAME: &str = "reservation_analysis.xlsx";

pub const SHEET_DATA: &str = "Analyzed Data";
pub const SHEET_KPIS: &str = "Key Metrics (KPI)";
pub const SHEET_PROFIT_BY_DESTINATION: &str = "Profit by Destination";
pub const SHEET_TOP_HOTELS: &str = "Top Hotels";
pub const SHEET_PROFIT_BY_PACKAGE_TYPE: &str = "Profit by Package Type";
pub const SHEET_PROFIT_BY_AUTHOR: &str = "Profit by Author";

/// A generated report, held in memory until the caller decides where it goes
#[derive(Serialize, Clone, PartialEq)]
pub struct ReportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ReportArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportArtifact")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}
