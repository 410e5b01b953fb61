//! Header discovery and required-column verification.
//!
//! Exports often carry banner rows (agency name, report period) above the
//! real header. The header is the first row within the scan window whose
//! trimmed cell texts contain every required column name.

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::data_loader::SheetGrid;
use crate::errors::{ImportError, ImportResult};
use crate::record::CellValue;

/// Number of candidate header rows scanned from the top of the sheet
pub const HEADER_SCAN_ROWS: usize = 10;

/// Rows below a discovered header, with column names trimmed
#[derive(Clone, Debug, PartialEq)]
pub struct LocatedTable {
    /// 0-based sheet row holding the header
    pub header_row_index: usize,
    pub headers: Vec<String>,
    /// Non-blank data rows as `(sheet row, cells)`
    pub rows: Vec<(usize, Vec<CellValue>)>,
}

impl LocatedTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

fn header_text(cell: &CellValue) -> String {
    cell.to_string().trim().to_string()
}

fn is_blank(row: &[CellValue]) -> bool {
    row.iter().all(CellValue::is_empty)
}

/// Return the first row index in `0..max_rows` whose cells contain every
/// required column name. Empty rows are skipped but still count toward the
/// window.
pub fn find_header_row(
    grid: &SheetGrid,
    required_columns: &[String],
    max_rows: usize,
) -> ImportResult<usize> {
    for index in 0..max_rows {
        let Some(row) = grid.row(index) else {
            debug!("Row {} is beyond the end of the sheet", index);
            break;
        };
        if is_blank(row) {
            debug!("Skipping empty candidate header row {}", index);
            continue;
        }

        let cells: HashSet<String> = row.iter().map(header_text).collect();
        if required_columns
            .iter()
            .all(|col| cells.contains(col.trim()))
        {
            info!("Header found at row {}", index);
            return Ok(index);
        }
    }

    warn!("No header row found in the first {} rows", max_rows);
    Err(ImportError::HeaderNotFound { scanned: max_rows })
}

/// Confirm every required column is present, enumerating all that are not
pub fn verify_required_columns(headers: &[String], required_columns: &[String]) -> ImportResult<()> {
    let columns: HashSet<&str> = headers.iter().map(|h| h.trim()).collect();
    let missing: Vec<String> = required_columns
        .iter()
        .map(|c| c.trim())
        .filter(|c| !columns.contains(c))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        for column in &missing {
            warn!("Missing required column '{}'", column);
        }
        Err(ImportError::MissingColumns(missing))
    }
}

/// Load the table under the header row: trim the column names, check the
/// required set, and keep every non-blank row below.
pub fn load_with_header(
    grid: &SheetGrid,
    header_row_index: usize,
    required_columns: &[String],
) -> ImportResult<LocatedTable> {
    let header_row = grid.row(header_row_index).unwrap_or(&[]);
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let name = header_text(cell);
            if name.is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                name
            }
        })
        .collect();

    verify_required_columns(&headers, required_columns)?;

    let rows: Vec<(usize, Vec<CellValue>)> = grid
        .rows()
        .skip(header_row_index + 1)
        .filter(|(_, row)| !is_blank(row))
        .map(|(index, row)| (index, row.to_vec()))
        .collect();

    info!(
        "Loaded {} data rows below header row {}",
        rows.len(),
        header_row_index
    );

    Ok(LocatedTable {
        header_row_index,
        headers,
        rows,
    })
}

/// Header discovery followed by the post-load column check
pub fn locate_table(
    grid: &SheetGrid,
    required_columns: &[String],
    max_rows: usize,
) -> ImportResult<LocatedTable> {
    let header_row_index = find_header_row(grid, required_columns, max_rows)?;
    load_with_header(grid, header_row_index, required_columns)
}
