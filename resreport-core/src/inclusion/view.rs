use serde::Serialize;
use serde_json::{json, Value};

use super::ViewKind;
use crate::columns::Column;
use crate::record::{CellValue, ReservationRecord, RowId};
use crate::table::{column_cell, ReservationTable};

/// How the render surface should present and edit a column
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Checkbox,
    Text,
    Number,
    Integer,
    DateTime,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ColumnSpec {
    pub column: Column,
    pub key: &'static str,
    pub label: String,
    pub kind: ColumnKind,
    /// printf-style display format, e.g. `%.2f`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    pub editable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    /// Value a newly ticked cell starts from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ViewRow {
    pub row_id: RowId,
    /// One cell per entry of [`EditableView::columns`]
    pub cells: Vec<Value>,
}

/// A projection of the reservation table for display and editing
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EditableView {
    pub kind: ViewKind,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<ViewRow>,
}

impl EditableView {
    pub fn row(&self, row_id: RowId) -> Option<&ViewRow> {
        self.rows.iter().find(|r| r.row_id == row_id)
    }

    pub fn column_position(&self, column: Column) -> Option<usize> {
        self.columns.iter().position(|c| c.column == column)
    }

    /// Cell of `column` in the row `row_id`, if both are part of the view
    pub fn cell(&self, row_id: RowId, column: Column) -> Option<&Value> {
        let idx = self.column_position(column)?;
        self.row(row_id)?.cells.get(idx)
    }
}

fn label(column: Column, currency: &str) -> String {
    match column {
        Column::Include => "Include".to_string(),
        Column::ArrivalCity => "Destination".to_string(),
        Column::HotelName => "Hotel".to_string(),
        Column::CreateDate => "Created".to_string(),
        c if Column::MONETARY.contains(&c) => format!("{} ({})", c.header(), currency),
        c => c.header().to_string(),
    }
}

fn kind(column: Column) -> ColumnKind {
    match column {
        Column::Include => ColumnKind::Checkbox,
        c if Column::MONETARY.contains(&c) => ColumnKind::Number,
        c if Column::COUNTS.contains(&c) || c == Column::TotalPax => ColumnKind::Integer,
        c if Column::DATES.contains(&c) => ColumnKind::DateTime,
        _ => ColumnKind::Text,
    }
}

fn column_spec(view: ViewKind, column: Column, currency: &str) -> ColumnSpec {
    let kind = kind(column);
    let editable = view.is_editable(column);
    let is_missing_price = view == ViewKind::MissingPrice;

    ColumnSpec {
        column,
        key: column.key(),
        label: label(column, currency),
        kind,
        format: (kind == ColumnKind::Number).then_some("%.2f"),
        editable,
        min_value: (is_missing_price && editable && kind == ColumnKind::Number).then_some(0.0),
        default: (is_missing_price && column == Column::Include).then(|| json!(false)),
    }
}

fn cell_json(cell: CellValue) -> Value {
    match cell {
        CellValue::Empty => Value::Null,
        CellValue::Text(s) | CellValue::Error(s) => Value::String(s),
        CellValue::Number(n) => json!(n),
        CellValue::Bool(b) => Value::Bool(b),
        CellValue::DateTime(dt) => Value::String(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
    }
}

fn view_row(record: &ReservationRecord, columns: &[Column]) -> ViewRow {
    ViewRow {
        row_id: record.row_id,
        cells: columns
            .iter()
            .map(|&c| match c {
                Column::Adult | Column::Child | Column::Infant | Column::TotalPax => {
                    match column_cell(record, c) {
                        CellValue::Number(n) => json!(n as u64),
                        other => cell_json(other),
                    }
                }
                _ => cell_json(column_cell(record, c)),
            })
            .collect(),
    }
}

fn build_view<'a>(
    view: ViewKind,
    records: impl Iterator<Item = &'a ReservationRecord>,
    currency: &str,
) -> EditableView {
    let columns = view.columns();
    EditableView {
        kind: view,
        columns: columns
            .iter()
            .map(|&c| column_spec(view, c, currency))
            .collect(),
        rows: records.map(|r| view_row(r, columns)).collect(),
    }
}

/// Every row of the table
pub fn main_view(table: &ReservationTable, currency: &str) -> EditableView {
    build_view(ViewKind::Main, table.records().iter(), currency)
}

/// Rows with a zero net price or agency amount to pay, as of now
pub fn missing_price_view(table: &ReservationTable, currency: &str) -> EditableView {
    build_view(
        ViewKind::MissingPrice,
        table.records().iter().filter(|r| r.is_missing_price()),
        currency,
    )
}
