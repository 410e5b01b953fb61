use serde::Serialize;
use tracing::info;

use crate::columns::required_column_names;
use crate::data_loader::{read_first_sheet, SpreadsheetFormat};
use crate::errors::ImportResult;
use crate::normalize::{normalize, CoercionReport};
use crate::schema::{locate_table, HEADER_SCAN_ROWS};
use crate::table::ReservationTable;

/// Knobs of the upload pipeline
#[derive(Clone, Debug, PartialEq)]
pub struct ImportSettings {
    pub required_columns: Vec<String>,
    pub header_scan_rows: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            required_columns: required_column_names(),
            header_scan_rows: HEADER_SCAN_ROWS,
        }
    }
}

/// Header position found during an upload
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderLocation {
    pub index: usize,
}

impl HeaderLocation {
    /// 1-based row number as a spreadsheet shows it
    pub fn display_row(&self) -> usize {
        self.index + 1
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportOutcome {
    pub table: ReservationTable,
    pub header: HeaderLocation,
    pub report: CoercionReport,
}

/// Header discovery and column check without building records
pub fn inspect_header(
    bytes: &[u8],
    format: SpreadsheetFormat,
    settings: &ImportSettings,
) -> ImportResult<HeaderLocation> {
    let grid = read_first_sheet(bytes, format)?;
    let located = locate_table(&grid, &settings.required_columns, settings.header_scan_rows)?;
    Ok(HeaderLocation {
        index: located.header_row_index,
    })
}

/// Run an uploaded file through header discovery, the column check and
/// normalization
pub fn import_reservations(
    bytes: &[u8],
    format: SpreadsheetFormat,
    settings: &ImportSettings,
) -> ImportResult<ImportOutcome> {
    let grid = read_first_sheet(bytes, format)?;
    let located = locate_table(&grid, &settings.required_columns, settings.header_scan_rows)?;
    let header = HeaderLocation {
        index: located.header_row_index,
    };
    info!("Header found on row {}", header.display_row());

    let normalized = normalize(&located);
    let report = normalized.report.clone();
    let table = ReservationTable::new(header.index, normalized);

    Ok(ImportOutcome {
        table,
        header,
        report,
    })
}
