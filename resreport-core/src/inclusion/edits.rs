use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{debug, info};

use super::ViewKind;
use crate::columns::Column;
use crate::errors::EditError;
use crate::normalize::MAX_AMOUNT;
use crate::record::{ReservationRecord, RowId};
use crate::table::ReservationTable;

/// A typed new value for one editable cell
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum CellEdit {
    Include(bool),
    NetPrice(Decimal),
    AgencyAmountToPay(Decimal),
    SalePrice(Decimal),
    Adult(u32),
    Child(u32),
    Infant(u32),
}

fn invalid(column: Column, value: &str, reason: &str) -> EditError {
    EditError::InvalidValue {
        field: column.key().to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_bool(column: Column, value: &str) -> Result<bool, EditError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "x" => Ok(true),
        "false" | "0" | "no" | "n" | "" => Ok(false),
        _ => Err(invalid(column, value, "expected true or false")),
    }
}

fn parse_amount(column: Column, value: &str) -> Result<Decimal, EditError> {
    let trimmed = value.trim();
    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| invalid(column, value, "expected a decimal amount"))?;
    if amount.abs() > MAX_AMOUNT {
        return Err(invalid(column, value, "amount is out of range"));
    }
    Ok(amount)
}

fn parse_count(column: Column, value: &str) -> Result<u32, EditError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid(column, value, "expected a non-negative whole number"))
}

impl CellEdit {
    pub fn column(&self) -> Column {
        match self {
            CellEdit::Include(_) => Column::Include,
            CellEdit::NetPrice(_) => Column::NetPrice,
            CellEdit::AgencyAmountToPay(_) => Column::AgencyAmountToPay,
            CellEdit::SalePrice(_) => Column::SalePrice,
            CellEdit::Adult(_) => Column::Adult,
            CellEdit::Child(_) => Column::Child,
            CellEdit::Infant(_) => Column::Infant,
        }
    }

    /// Parse a field name (snake-case key or export header) and a raw value.
    ///
    /// Known columns that are never editable are rejected here; whether a
    /// column is editable in a particular view is decided when applying.
    pub fn parse(field: &str, value: &str) -> Result<Self, EditError> {
        let column = Column::from_key(field)
            .or_else(|| Column::from_header(field))
            .ok_or_else(|| EditError::UnknownField(field.trim().to_string()))?;

        match column {
            Column::Include => parse_bool(column, value).map(CellEdit::Include),
            Column::NetPrice => parse_amount(column, value).map(CellEdit::NetPrice),
            Column::AgencyAmountToPay => {
                parse_amount(column, value).map(CellEdit::AgencyAmountToPay)
            }
            Column::SalePrice => parse_amount(column, value).map(CellEdit::SalePrice),
            Column::Adult => parse_count(column, value).map(CellEdit::Adult),
            Column::Child => parse_count(column, value).map(CellEdit::Child),
            Column::Infant => parse_count(column, value).map(CellEdit::Infant),
            other => Err(invalid(other, value, "column is read-only")),
        }
    }

    fn apply_to(&self, record: &mut ReservationRecord) {
        match *self {
            CellEdit::Include(v) => record.include = v,
            CellEdit::NetPrice(v) => record.net_price = v,
            CellEdit::AgencyAmountToPay(v) => record.agency_amount_to_pay = v,
            CellEdit::SalePrice(v) => record.sale_price = v,
            CellEdit::Adult(v) => record.adult = v,
            CellEdit::Child(v) => record.child = v,
            CellEdit::Infant(v) => record.infant = v,
        }
    }
}

/// One edited cell coming back from a view
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RowEdit {
    pub row_id: RowId,
    #[serde(flatten)]
    pub edit: CellEdit,
}

impl RowEdit {
    pub fn new(row_id: RowId, edit: CellEdit) -> Self {
        Self { row_id, edit }
    }
}

/// Result of applying a single edit
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApplyOutcome {
    Applied { message: String },
    Skipped { reason: String },
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

/// Apply edits from one view to the table, in order.
///
/// Profit and total passengers are derived on read, so they reflect every
/// applied edit without a separate recompute step. For the missing-price
/// view the subset is fixed when this call starts: an edit that prices a row
/// does not stop later edits to the same row in the same batch.
pub fn apply_edits(
    table: &mut ReservationTable,
    view: ViewKind,
    edits: &[RowEdit],
) -> Vec<ApplyOutcome> {
    let subset: Option<HashSet<RowId>> = match view {
        ViewKind::Main => None,
        ViewKind::MissingPrice => Some(table.missing_price_ids().into_iter().collect()),
    };

    let outcomes: Vec<ApplyOutcome> = edits
        .iter()
        .map(|edit| {
            let column = edit.edit.column();
            debug!("Applying {} edit on row {} ({})", view, edit.row_id, column);

            if !view.is_editable(column) {
                return ApplyOutcome::Skipped {
                    reason: format!("Column '{}' is read-only in the {} view", column, view),
                };
            }
            if subset.as_ref().is_some_and(|s| !s.contains(&edit.row_id)) {
                return ApplyOutcome::Skipped {
                    reason: format!("Row {} is not missing a price", edit.row_id),
                };
            }
            let Some(record) = table.get_mut(edit.row_id) else {
                return ApplyOutcome::Skipped {
                    reason: format!("Row {} not found", edit.row_id),
                };
            };

            edit.edit.apply_to(record);
            ApplyOutcome::Applied {
                message: format!("Updated {} of row {}", column, edit.row_id),
            }
        })
        .collect();

    let applied = outcomes.iter().filter(|o| o.is_applied()).count();
    info!(
        "Applied {} of {} {} view edits",
        applied,
        outcomes.len(),
        view
    );
    outcomes
}

/// Outcomes of one reconciliation cycle, per view
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct ReconcileOutcome {
    pub main: Vec<ApplyOutcome>,
    pub missing_price: Vec<ApplyOutcome>,
}

impl ReconcileOutcome {
    pub fn applied_count(&self) -> usize {
        self.main
            .iter()
            .chain(&self.missing_price)
            .filter(|o| o.is_applied())
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ApplyOutcome> {
        self.main
            .iter()
            .chain(&self.missing_price)
            .filter(|o| !o.is_applied())
    }
}

/// Fold both views' edits into the table: main view first, then the
/// missing-price view against the subset as it stands after the main edits.
pub fn reconcile(
    table: &mut ReservationTable,
    main_edits: &[RowEdit],
    missing_price_edits: &[RowEdit],
) -> ReconcileOutcome {
    let main = apply_edits(table, ViewKind::Main, main_edits);
    let missing_price = apply_edits(table, ViewKind::MissingPrice, missing_price_edits);
    ReconcileOutcome {
        main,
        missing_price,
    }
}
