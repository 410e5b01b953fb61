use calamine::{open_workbook_from_rs, Data, DataType, Reader, Xlsx};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::io::Cursor;

use resreport::data_loader::{read_first_sheet, SpreadsheetFormat};
use resreport::export::{
    SHEET_DATA, SHEET_KPIS, SHEET_PROFIT_BY_AUTHOR, SHEET_PROFIT_BY_DESTINATION,
    SHEET_PROFIT_BY_PACKAGE_TYPE, SHEET_TOP_HOTELS, XLSX_MIME_TYPE,
};
use resreport::filter::AnalysisFilter;
use resreport::record::CellValue;
use resreport::{ReportConfig, Session};
use resreport_test_utils::{ReservationRow, WorkbookFixture};

fn row(no: &str, city: &str, author: &str, agency_to_pay: f64) -> ReservationRow {
    let mut r = ReservationRow::new(no);
    r.arrival_city = Some(city.to_string());
    r.author = Some(author.to_string());
    r.net_price = 100.0;
    r.agency_amount_to_pay = agency_to_pay;
    r
}

fn loaded_session() -> Session {
    let bytes = WorkbookFixture::new(vec![
        row("R-1", "Antalya", "Amra", 400.0),
        row("R-2", "Hurghada", "Emir", 200.0),
        row("R-3", "Sharm", "Amra", 300.0),
    ])
    .to_xlsx()
    .unwrap();
    let mut session = Session::new(ReportConfig::default());
    session
        .upload("export.xlsx", &bytes, SpreadsheetFormat::Xlsx)
        .unwrap();
    session
}

fn open(bytes: &[u8]) -> Xlsx<Cursor<&[u8]>> {
    open_workbook_from_rs(Cursor::new(bytes)).expect("report should open")
}

#[test]
fn test_report_sheets_in_order() {
    let artifact = loaded_session().export(&AnalysisFilter::default()).unwrap();
    assert_eq!(artifact.mime_type, XLSX_MIME_TYPE);
    assert_eq!(artifact.file_name, "reservation_analysis.xlsx");

    let workbook = open(&artifact.bytes);
    assert_eq!(
        workbook.sheet_names(),
        vec![
            SHEET_DATA,
            SHEET_KPIS,
            SHEET_PROFIT_BY_DESTINATION,
            SHEET_TOP_HOTELS,
            SHEET_PROFIT_BY_PACKAGE_TYPE,
            SHEET_PROFIT_BY_AUTHOR,
        ]
    );
}

#[test]
fn test_profit_by_destination_sheet_is_descending() {
    let artifact = loaded_session().export(&AnalysisFilter::default()).unwrap();
    let mut workbook = open(&artifact.bytes);
    let range = workbook
        .worksheet_range(SHEET_PROFIT_BY_DESTINATION)
        .unwrap();
    let rows: Vec<(String, f64)> = range
        .rows()
        .skip(1)
        .map(|r| (r[0].to_string(), r[1].as_f64().unwrap_or_default()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Antalya".to_string(), 300.0),
            ("Sharm".to_string(), 200.0),
            ("Hurghada".to_string(), 100.0),
        ]
    );
}

#[test]
fn test_kpi_sheet_holds_formatted_values() {
    let artifact = loaded_session().export(&AnalysisFilter::default()).unwrap();
    let mut workbook = open(&artifact.bytes);
    let range = workbook.worksheet_range(SHEET_KPIS).unwrap();
    let pairs: Vec<(String, String)> = range
        .rows()
        .map(|r| (r[0].to_string(), r[1].to_string()))
        .collect();
    assert_eq!(pairs[0], ("Metric".to_string(), "Value".to_string()));
    assert_eq!(pairs[2], ("Total profit".to_string(), "600.00 BAM".to_string()));
    assert_eq!(pairs[3], ("Number of reservations".to_string(), "3".to_string()));
}

#[test]
fn test_empty_subset_keeps_only_data_and_kpi_sheets() {
    let filter = AnalysisFilter {
        destinations: Some(BTreeSet::from(["Reykjavik".to_string()])),
        ..Default::default()
    };
    let artifact = loaded_session().export(&filter).unwrap();
    let mut workbook = open(&artifact.bytes);
    assert_eq!(workbook.sheet_names(), vec![SHEET_DATA, SHEET_KPIS]);

    let data = workbook.worksheet_range(SHEET_DATA).unwrap();
    assert_eq!(data.height(), 1);
    let kpis = workbook.worksheet_range(SHEET_KPIS).unwrap();
    assert_eq!(
        kpis.get_value((4, 1)),
        Some(&Data::String("0.00 BAM".to_string()))
    );
}

#[test]
fn test_data_sheet_reads_back_through_the_loader() {
    let artifact = loaded_session().export(&AnalysisFilter::default()).unwrap();
    let grid = read_first_sheet(&artifact.bytes, SpreadsheetFormat::Xlsx).unwrap();
    let header = grid.row(0).unwrap();
    assert_eq!(header[0], CellValue::Text("Reservation No".to_string()));
    assert_eq!(header[22], CellValue::Text("Total Pax".to_string()));
    assert_eq!(header[23], CellValue::Text("Include in Analysis".to_string()));

    let first = grid.row(1).unwrap();
    assert_eq!(first[0], CellValue::Text("R-1".to_string()));
    let begin = NaiveDate::from_ymd_opt(2024, 3, 10)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(first[6], CellValue::DateTime(begin));
    assert_eq!(first[21], CellValue::Number(300.0));
    assert_eq!(first[23], CellValue::Bool(true));
    assert_eq!(grid.height(), 4);
}
