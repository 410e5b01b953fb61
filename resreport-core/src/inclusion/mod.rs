//! Editable projections of the reservation table and the reconciliation of
//! their edits back into it.
//!
//! Two views exist: the main view over every row, and the missing-price view
//! over rows whose net price or agency amount to pay is zero. Both are
//! read-only projections; edits come back as [`RowEdit`] deltas keyed by
//! [`RowId`](crate::record::RowId) and are applied in place.
//!
//! Within one interaction, main-view edits are always applied before
//! missing-price edits, and the missing-price subset is taken after the main
//! edits landed. A price corrected in the main view therefore takes its row
//! out of the missing-price subset in the same cycle.

pub mod edits;
pub mod view;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::columns::Column;
use crate::errors::EditError;

pub use edits::{apply_edits, reconcile, ApplyOutcome, CellEdit, ReconcileOutcome, RowEdit};
pub use view::{
    main_view, missing_price_view, ColumnKind, ColumnSpec, EditableView, ViewRow,
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Main,
    MissingPrice,
}

impl ViewKind {
    /// Columns shown by the view, in display order
    pub fn columns(self) -> &'static [Column] {
        match self {
            ViewKind::Main => &[
                Column::Include,
                Column::ReservationNo,
                Column::ArrivalCity,
                Column::HotelName,
                Column::Author,
                Column::CreateDate,
                Column::NetPrice,
                Column::AgencyAmountToPay,
                Column::SalePrice,
                Column::Adult,
                Column::Child,
                Column::Infant,
                Column::TotalPax,
                Column::Profit,
            ],
            ViewKind::MissingPrice => &[
                Column::Include,
                Column::ReservationNo,
                Column::ArrivalCity,
                Column::HotelName,
                Column::Author,
                Column::CreateDate,
                Column::NetPrice,
                Column::AgencyAmountToPay,
                Column::SalePrice,
                Column::Profit,
            ],
        }
    }

    pub fn is_editable(self, column: Column) -> bool {
        match column {
            Column::Include | Column::NetPrice | Column::AgencyAmountToPay | Column::SalePrice => {
                true
            }
            Column::Adult | Column::Child | Column::Infant => self == ViewKind::Main,
            _ => false,
        }
    }
}

impl Display for ViewKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewKind::Main => write!(f, "main"),
            ViewKind::MissingPrice => write!(f, "missing"),
        }
    }
}

impl FromStr for ViewKind {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" => Ok(ViewKind::Main),
            "missing" | "missing_price" | "missing-price" => Ok(ViewKind::MissingPrice),
            other => Err(EditError::UnknownView(other.to_string())),
        }
    }
}
