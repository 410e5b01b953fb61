//! Type coercion and defaulting for located export rows.
//!
//! Coercion is lenient: a cell that cannot be read as its column's type is
//! recorded as a [`CoercionIssue`] and then defaulted (0 for amounts and
//! counts, absent for dates). Nothing here returns an error.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::columns::Column;
use crate::record::{CellValue, PackageType, ReservationRecord, RowId};
use crate::schema::LocatedTable;

static EMPTY_CELL: CellValue = CellValue::Empty;

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y"];

/// Largest serial number Excel can display as a date (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Outcome of reading one cell as a typed value
#[derive(Clone, Debug, PartialEq)]
pub enum Coerced<T> {
    Value(T),
    /// The cell was empty; defaulted without a diagnostic
    Missing,
    /// The cell held something that is not a `T`
    Failed,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CoercionKind {
    Monetary,
    Count,
    Date,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CoercionIssue {
    pub row_id: RowId,
    /// 0-based sheet row the value came from
    pub sheet_row: usize,
    pub column: Column,
    pub raw: String,
    pub kind: CoercionKind,
}

/// Diagnostics of one normalization run
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct CoercionReport {
    pub issues: Vec<CoercionIssue>,
    /// Rows whose supplied profit disagreed with the derived value
    pub profit_overrides: usize,
}

impl CoercionReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues_for(&self, column: Column) -> impl Iterator<Item = &CoercionIssue> {
        self.issues.iter().filter(move |i| i.column == column)
    }
}

/// Canonical records plus everything needed to audit how they were built
#[derive(Clone, Debug, PartialEq)]
pub struct Normalized {
    pub records: Vec<ReservationRecord>,
    pub extra_columns: Vec<String>,
    pub report: CoercionReport,
}

/// Largest magnitude accepted for a monetary cell or edit, 10^15. Sums of
/// accepted amounts stay far from the `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

fn bounded(value: Decimal) -> Coerced<Decimal> {
    if value.abs() > MAX_AMOUNT {
        Coerced::Failed
    } else {
        Coerced::Value(value)
    }
}

pub fn coerce_decimal(cell: &CellValue) -> Coerced<Decimal> {
    match cell {
        CellValue::Empty => Coerced::Missing,
        CellValue::Number(n) => Decimal::from_f64(*n)
            .map(bounded)
            .unwrap_or(Coerced::Failed),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Coerced::Missing;
            }
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map(bounded)
                .unwrap_or(Coerced::Failed)
        }
        _ => Coerced::Failed,
    }
}

fn count_from_f64(n: f64) -> Coerced<u32> {
    if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 {
        Coerced::Value(n as u32)
    } else {
        Coerced::Failed
    }
}

pub fn coerce_count(cell: &CellValue) -> Coerced<u32> {
    match cell {
        CellValue::Empty => Coerced::Missing,
        CellValue::Number(n) => count_from_f64(*n),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Coerced::Missing;
            }
            match trimmed.parse::<u32>() {
                Ok(n) => Coerced::Value(n),
                Err(_) => trimmed
                    .parse::<f64>()
                    .map(count_from_f64)
                    .unwrap_or(Coerced::Failed),
            }
        }
        _ => Coerced::Failed,
    }
}

fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim().trim_end_matches('.');
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn coerce_datetime(cell: &CellValue) -> Coerced<NaiveDateTime> {
    match cell {
        CellValue::Empty => Coerced::Missing,
        CellValue::DateTime(dt) => Coerced::Value(*dt),
        CellValue::Number(n) => excel_serial_to_datetime(*n)
            .map(Coerced::Value)
            .unwrap_or(Coerced::Failed),
        CellValue::Text(s) if s.trim().is_empty() => Coerced::Missing,
        CellValue::Text(s) => parse_datetime_text(s)
            .map(Coerced::Value)
            .unwrap_or(Coerced::Failed),
        _ => Coerced::Failed,
    }
}

/// Descriptive cells keep their text; integral numbers lose the `.0`
pub fn coerce_text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Empty | CellValue::Error(_) => None,
        CellValue::Text(s) => Some(s.clone()),
        CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
            Some(format!("{}", *n as i64))
        }
        CellValue::Number(n) => Some(n.to_string()),
        CellValue::Bool(b) => Some(b.to_string()),
        CellValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
    }
}

struct RowContext<'a> {
    cells: &'a [CellValue],
    positions: &'a HashMap<Column, usize>,
    row_id: RowId,
    sheet_row: usize,
    issues: &'a mut Vec<CoercionIssue>,
}

impl<'a> RowContext<'a> {
    fn cell(&self, column: Column) -> &'a CellValue {
        self.positions
            .get(&column)
            .and_then(|&idx| self.cells.get(idx))
            .unwrap_or(&EMPTY_CELL)
    }

    fn fail(&mut self, column: Column, kind: CoercionKind) {
        let raw = self.cell(column).to_string();
        debug!(
            "Row {} column '{}': cannot read '{}' as {:?}",
            self.sheet_row, column, raw, kind
        );
        self.issues.push(CoercionIssue {
            row_id: self.row_id,
            sheet_row: self.sheet_row,
            column,
            raw,
            kind,
        });
    }

    fn money(&mut self, column: Column) -> Decimal {
        match coerce_decimal(self.cell(column)) {
            Coerced::Value(v) => v,
            Coerced::Missing => Decimal::ZERO,
            Coerced::Failed => {
                self.fail(column, CoercionKind::Monetary);
                Decimal::ZERO
            }
        }
    }

    fn count(&mut self, column: Column) -> u32 {
        match coerce_count(self.cell(column)) {
            Coerced::Value(v) => v,
            Coerced::Missing => 0,
            Coerced::Failed => {
                self.fail(column, CoercionKind::Count);
                0
            }
        }
    }

    fn date(&mut self, column: Column) -> Option<NaiveDateTime> {
        match coerce_datetime(self.cell(column)) {
            Coerced::Value(v) => Some(v),
            Coerced::Missing => None,
            Coerced::Failed => {
                self.fail(column, CoercionKind::Date);
                None
            }
        }
    }

    fn text(&self, column: Column) -> Option<String> {
        coerce_text(self.cell(column))
    }
}

/// Build canonical records from a located table.
///
/// Re-running on a table rebuilt from the output yields the same records:
/// every coercion is a no-op on an already typed value and the derived
/// columns are never read back.
pub fn normalize(table: &LocatedTable) -> Normalized {
    let mut positions: HashMap<Column, usize> = HashMap::new();
    let mut extra_positions: Vec<usize> = Vec::new();
    for (idx, header) in table.headers.iter().enumerate() {
        match Column::from_header(header) {
            Some(Column::TotalPax) | Some(Column::Include) => {
                debug!("Dropping derived column '{}' from the upload", header);
            }
            Some(column) if !positions.contains_key(&column) => {
                positions.insert(column, idx);
            }
            _ => extra_positions.push(idx),
        }
    }
    let extra_columns: Vec<String> = extra_positions
        .iter()
        .map(|&idx| table.headers[idx].clone())
        .collect();

    let mut report = CoercionReport::default();
    let mut records = Vec::with_capacity(table.rows.len());

    for (position, (sheet_row, cells)) in table.rows.iter().enumerate() {
        let row_id = RowId(position);
        let mut row = RowContext {
            cells,
            positions: &positions,
            row_id,
            sheet_row: *sheet_row,
            issues: &mut report.issues,
        };

        let mut record = ReservationRecord::new(row_id);
        record.reservation_no = row.text(Column::ReservationNo);
        record.arrival_city = row.text(Column::ArrivalCity);
        record.hotel_name = row.text(Column::HotelName);
        record.author = row.text(Column::Author);
        record.payment = row.text(Column::Payment);
        record.agency = row.text(Column::Agency);
        record.package = row.text(Column::Package);
        record.price_list = row.text(Column::PriceList);
        record.package_type = PackageType::from_raw(row.text(Column::PackageType).as_deref());

        record.create_date = row.date(Column::CreateDate);
        record.begin_date = row.date(Column::BeginDate);
        record.end_date = row.date(Column::EndDate);

        record.night = row.count(Column::Night);
        record.adult = row.count(Column::Adult);
        record.child = row.count(Column::Child);
        record.infant = row.count(Column::Infant);

        record.net_price = row.money(Column::NetPrice);
        record.sale_price = row.money(Column::SalePrice);
        record.agency_payment = row.money(Column::AgencyPayment);
        record.passenger_amount_to_pay = row.money(Column::PassengerAmountToPay);
        record.agency_amount_to_pay = row.money(Column::AgencyAmountToPay);

        let supplied_profit = row.money(Column::Profit);
        if supplied_profit != record.profit() {
            report.profit_overrides += 1;
        }

        record.include = record.has_prices();
        record.extras = extra_positions
            .iter()
            .map(|&idx| cells.get(idx).cloned().unwrap_or(CellValue::Empty))
            .collect();

        records.push(record);
    }

    if report.is_clean() {
        info!("Normalized {} reservations", records.len());
    } else {
        warn!(
            "Normalized {} reservations; {} cells could not be read and were defaulted",
            records.len(),
            report.issues.len()
        );
    }
    if report.profit_overrides > 0 {
        debug!(
            "Recomputed profit differs from the supplied value on {} rows",
            report.profit_overrides
        );
    }

    Normalized {
        records,
        extra_columns,
        report,
    }
}
