use calamine::{open_workbook_from_rs, Data, Range, Reader, Xls, Xlsx};
use chrono::NaiveDateTime;
use std::fmt::{Display, Formatter};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, error, info};

use crate::errors::{ImportError, ImportResult};
use crate::record::CellValue;

/// Spreadsheet containers accepted for upload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Office Open XML workbook (zip based)
    Xlsx,
    /// Legacy BIFF workbook
    Xls,
}

impl SpreadsheetFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "xlsx" => Some(SpreadsheetFormat::Xlsx),
            "xls" => Some(SpreadsheetFormat::Xls),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> ImportResult<Self> {
        let extension = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or("");
        Self::from_extension(extension).ok_or_else(|| {
            error!("Unsupported extension '{}' for {}", extension, path.display());
            ImportError::UnsupportedFormat(path.display().to_string())
        })
    }
}

impl Display for SpreadsheetFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SpreadsheetFormat::Xlsx => write!(f, "XLSX"),
            SpreadsheetFormat::Xls => write!(f, "XLS"),
        }
    }
}

/// The first worksheet of a workbook as absolute rows.
///
/// Row `i` of the grid is row `i` of the sheet, including leading empty rows
/// the reader's used range would otherwise hide.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SheetGrid {
    rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = (usize, &[CellValue])> {
        self.rows.iter().map(Vec::as_slice).enumerate()
    }
}

/// Read the first worksheet of an in-memory workbook
pub fn read_first_sheet(bytes: &[u8], format: SpreadsheetFormat) -> ImportResult<SheetGrid> {
    info!("Reading {} workbook with {} bytes", format, bytes.len());

    let cursor = Cursor::new(bytes);
    let range = match format {
        SpreadsheetFormat::Xlsx => {
            let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor).map_err(|e| {
                error!("Failed to open XLSX: {:?}", e);
                ImportError::Workbook(format!("{:?}", e))
            })?;
            first_range(&mut workbook)?
        }
        SpreadsheetFormat::Xls => {
            let mut workbook: Xls<_> = open_workbook_from_rs(cursor).map_err(|e| {
                error!("Failed to open XLS: {:?}", e);
                ImportError::Workbook(format!("{:?}", e))
            })?;
            first_range(&mut workbook)?
        }
    };

    debug!("Sheet dimensions: {}x{}", range.height(), range.width());
    Ok(range_to_grid(&range))
}

fn first_range<RS, R>(workbook: &mut R) -> ImportResult<Range<Data>>
where
    RS: Read + Seek,
    R: Reader<RS>,
{
    match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => Ok(range),
        Some(Err(e)) => Err(ImportError::Workbook(format!("{:?}", e))),
        None => Err(ImportError::EmptyWorkbook),
    }
}

fn range_to_grid(range: &Range<Data>) -> SheetGrid {
    let leading_rows = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); leading_rows];
    rows.extend(
        range
            .rows()
            .map(|row| row.iter().map(cell_value).collect::<Vec<_>>()),
    );
    SheetGrid::new(rows)
}

pub(crate) fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(CellValue::DateTime)
            .unwrap_or_else(|_| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension_is_case_insensitive() {
        assert_eq!(
            SpreadsheetFormat::from_extension("XLSX"),
            Some(SpreadsheetFormat::Xlsx)
        );
        assert_eq!(
            SpreadsheetFormat::from_extension("xls"),
            Some(SpreadsheetFormat::Xls)
        );
        assert_eq!(SpreadsheetFormat::from_extension("csv"), None);
    }

    #[test]
    fn format_from_path_rejects_other_files() {
        let err = SpreadsheetFormat::from_path(Path::new("bookings.ods")).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
        assert_eq!(
            SpreadsheetFormat::from_path(Path::new("/tmp/Export.xlsx")).unwrap(),
            SpreadsheetFormat::Xlsx
        );
    }

    #[test]
    fn cell_value_maps_empty_strings_to_empty() {
        assert_eq!(cell_value(&Data::String(String::new())), CellValue::Empty);
        assert_eq!(cell_value(&Data::Int(4)), CellValue::Number(4.0));
        assert_eq!(
            cell_value(&Data::String("Sarajevo".to_string())),
            CellValue::Text("Sarajevo".to_string())
        );
    }

    #[test]
    fn garbage_bytes_are_a_workbook_error() {
        let err = read_first_sheet(b"not a workbook", SpreadsheetFormat::Xlsx).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SPREADSHEET");
    }
}
