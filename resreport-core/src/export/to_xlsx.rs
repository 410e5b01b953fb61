use indexmap::IndexMap;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::{debug, info};

use super::*;
use crate::aggregate::{Aggregates, GroupRow};
use crate::errors::ExportResult;
use crate::record::{CellValue, ReservationRecord};
use crate::table::{data_row, ReservationTable};

const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
const AMOUNT_FORMAT: &str = "#,##0.00";

struct Formats {
    header: Format,
    datetime: Format,
    amount: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            datetime: Format::new().set_num_format(DATETIME_FORMAT),
            amount: Format::new().set_num_format(AMOUNT_FORMAT),
        }
    }
}

fn write_header(worksheet: &mut Worksheet, headers: &[&str], formats: &Formats) -> ExportResult<()> {
    for (col_idx, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, *header, &formats.header)?;
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    formats: &Formats,
) -> ExportResult<()> {
    match cell {
        CellValue::Empty => {}
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::DateTime(dt) => {
            worksheet.write_datetime_with_format(row, col, dt, &formats.datetime)?;
        }
        CellValue::Error(e) => {
            worksheet.write_string(row, col, format!("#{}", e))?;
        }
    }
    Ok(())
}

fn write_data_sheet(
    workbook: &mut Workbook,
    table: &ReservationTable,
    rows: &[&ReservationRecord],
    formats: &Formats,
) -> ExportResult<()> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_DATA)?;

    let headers = table.data_headers();
    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    write_header(worksheet, &header_refs, formats)?;

    for (row_idx, record) in rows.iter().enumerate() {
        for (col_idx, cell) in data_row(record).iter().enumerate() {
            write_cell(worksheet, row_idx as u32 + 1, col_idx as u16, cell, formats)?;
        }
    }
    debug!("Wrote {} rows to sheet {}", rows.len(), SHEET_DATA);
    Ok(())
}

fn write_kpi_sheet(
    workbook: &mut Workbook,
    kpi_summary: &IndexMap<String, String>,
    formats: &Formats,
) -> ExportResult<()> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_KPIS)?;
    write_header(worksheet, &["Metric", "Value"], formats)?;
    for (row_idx, (label, value)) in kpi_summary.iter().enumerate() {
        let row = row_idx as u32 + 1;
        worksheet.write_string(row, 0, label)?;
        worksheet.write_string(row, 1, value)?;
    }
    Ok(())
}

trait SheetValue {
    fn write(&self, worksheet: &mut Worksheet, row: u32, formats: &Formats) -> ExportResult<()>;
}

impl SheetValue for Decimal {
    fn write(&self, worksheet: &mut Worksheet, row: u32, formats: &Formats) -> ExportResult<()> {
        worksheet.write_number_with_format(
            row,
            1,
            self.to_f64().unwrap_or_default(),
            &formats.amount,
        )?;
        Ok(())
    }
}

impl SheetValue for usize {
    fn write(&self, worksheet: &mut Worksheet, row: u32, _formats: &Formats) -> ExportResult<()> {
        worksheet.write_number(row, 1, *self as f64)?;
        Ok(())
    }
}

fn write_group_sheet<V: SheetValue>(
    workbook: &mut Workbook,
    name: &str,
    headers: [&str; 2],
    groups: &[GroupRow<V>],
    formats: &Formats,
) -> ExportResult<()> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name)?;
    write_header(worksheet, &headers, formats)?;
    for (row_idx, group) in groups.iter().enumerate() {
        let row = row_idx as u32 + 1;
        worksheet.write_string(row, 0, &group.key)?;
        group.value.write(worksheet, row, formats)?;
    }
    debug!("Wrote {} rows to sheet {}", groups.len(), name);
    Ok(())
}

/// Build the multi-sheet analysis workbook.
///
/// The row data and KPI sheets are always present. The four summary sheets
/// follow only when `rows` is non-empty, and always carry the full, untruncated
/// aggregates.
pub fn build_report(
    table: &ReservationTable,
    rows: &[&ReservationRecord],
    kpi_summary: &IndexMap<String, String>,
    aggregates: &Aggregates,
    file_name: &str,
) -> ExportResult<ReportArtifact> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    write_data_sheet(&mut workbook, table, rows, &formats)?;
    write_kpi_sheet(&mut workbook, kpi_summary, &formats)?;

    if !rows.is_empty() {
        write_group_sheet(
            &mut workbook,
            SHEET_PROFIT_BY_DESTINATION,
            ["Arrival City", "Profit"],
            &aggregates.profit_by_destination,
            &formats,
        )?;
        write_group_sheet(
            &mut workbook,
            SHEET_TOP_HOTELS,
            ["Hotel", "Reservations"],
            &aggregates.reservations_by_hotel,
            &formats,
        )?;
        write_group_sheet(
            &mut workbook,
            SHEET_PROFIT_BY_PACKAGE_TYPE,
            ["Package Type", "Profit"],
            &aggregates.profit_by_package_type,
            &formats,
        )?;
        write_group_sheet(
            &mut workbook,
            SHEET_PROFIT_BY_AUTHOR,
            ["Author", "Profit"],
            &aggregates.profit_by_author,
            &formats,
        )?;
    }

    let bytes = workbook.save_to_buffer()?;
    info!(
        "Generated report '{}' with {} data rows ({} bytes)",
        file_name,
        rows.len(),
        bytes.len()
    );

    Ok(ReportArtifact {
        file_name: file_name.to_string(),
        mime_type: XLSX_MIME_TYPE,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{compute_aggregates, compute_kpis};
    use crate::format::kpi_summary;
    use crate::normalize::{CoercionReport, Normalized};
    use crate::record::RowId;

    fn table() -> ReservationTable {
        let mut r = ReservationRecord::new(RowId(0));
        r.arrival_city = Some("Antalya".to_string());
        r.net_price = Decimal::from(100);
        r.agency_amount_to_pay = Decimal::from(150);
        r.begin_date = chrono::NaiveDate::from_ymd_opt(2024, 3, 10)
            .and_then(|d| d.and_hms_opt(0, 0, 0));
        r.include = true;
        ReservationTable::new(
            0,
            Normalized {
                records: vec![r],
                extra_columns: Vec::new(),
                report: CoercionReport::default(),
            },
        )
    }

    #[test]
    fn report_is_a_zip_container_with_metadata() {
        let table = table();
        let rows: Vec<&ReservationRecord> = table.records().iter().collect();
        let kpis = compute_kpis(&rows);
        let artifact = build_report(
            &table,
            &rows,
            &kpi_summary(&kpis, "BAM"),
            &compute_aggregates(&rows),
            DEFAULT_FILE_NAME,
        )
        .unwrap();
        assert_eq!(artifact.file_name, "reservation_analysis.xlsx");
        assert_eq!(artifact.mime_type, XLSX_MIME_TYPE);
        assert_eq!(&artifact.bytes[..2], b"PK");
    }

    #[test]
    fn empty_subset_still_produces_a_report() {
        let table = table();
        let artifact = build_report(
            &table,
            &[],
            &kpi_summary(&compute_kpis(&[]), "BAM"),
            &Aggregates::default(),
            "empty.xlsx",
        )
        .unwrap();
        assert!(!artifact.bytes.is_empty());
        assert!(format!("{:?}", artifact).contains("empty.xlsx"));
    }
}
