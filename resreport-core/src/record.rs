use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Position of a record in the canonical table.
///
/// Assigned once at load and never reused; records are never deleted, so the
/// id stays valid for the lifetime of the table. Reservation numbers are not
/// guaranteed unique in exports, which is why edits are keyed on this instead.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RowId(pub usize);

impl Display for RowId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PackageType {
    #[default]
    Group,
    Individual,
    Other(String),
}

impl PackageType {
    /// Absent values become `Group`, the exact literal `individual` becomes
    /// `Individual`, everything else passes through.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None => PackageType::Group,
            Some("individual") => PackageType::Individual,
            // already-normalized labels, so a second pass changes nothing
            Some("Individual") => PackageType::Individual,
            Some("Group") => PackageType::Group,
            Some(other) => PackageType::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PackageType::Group => "Group",
            PackageType::Individual => "Individual",
            PackageType::Other(label) => label,
        }
    }
}

impl Display for PackageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for PackageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A spreadsheet cell, detached from the reader that produced it
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Error(e) => write!(f, "#{}", e),
        }
    }
}

/// One normalized reservation.
///
/// Profit and total passengers are not stored: they are derived from their
/// operands on every read, so no edit can leave them stale.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ReservationRecord {
    pub row_id: RowId,
    pub reservation_no: Option<String>,
    pub arrival_city: Option<String>,
    pub hotel_name: Option<String>,
    pub author: Option<String>,
    pub payment: Option<String>,
    pub agency: Option<String>,
    pub package: Option<String>,
    pub price_list: Option<String>,
    pub package_type: PackageType,
    pub create_date: Option<NaiveDateTime>,
    pub begin_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub night: u32,
    pub adult: u32,
    pub child: u32,
    pub infant: u32,
    pub net_price: Decimal,
    pub sale_price: Decimal,
    pub agency_payment: Decimal,
    pub passenger_amount_to_pay: Decimal,
    pub agency_amount_to_pay: Decimal,
    pub include: bool,
    /// Cells of columns the export carried beyond the required set, aligned
    /// with [`crate::table::ReservationTable::extra_columns`]
    pub extras: Vec<CellValue>,
}

impl ReservationRecord {
    pub fn new(row_id: RowId) -> Self {
        Self {
            row_id,
            reservation_no: None,
            arrival_city: None,
            hotel_name: None,
            author: None,
            payment: None,
            agency: None,
            package: None,
            price_list: None,
            package_type: PackageType::default(),
            create_date: None,
            begin_date: None,
            end_date: None,
            night: 0,
            adult: 0,
            child: 0,
            infant: 0,
            net_price: Decimal::ZERO,
            sale_price: Decimal::ZERO,
            agency_payment: Decimal::ZERO,
            passenger_amount_to_pay: Decimal::ZERO,
            agency_amount_to_pay: Decimal::ZERO,
            include: false,
            extras: Vec::new(),
        }
    }

    pub fn profit(&self) -> Decimal {
        self.agency_amount_to_pay.saturating_sub(self.net_price)
    }

    pub fn total_pax(&self) -> u32 {
        self.adult
            .saturating_add(self.child)
            .saturating_add(self.infant)
    }

    /// Both prices are known; the initial value of the inclusion flag
    pub fn has_prices(&self) -> bool {
        self.net_price > Decimal::ZERO && self.agency_amount_to_pay > Decimal::ZERO
    }

    /// Member of the missing-price subset
    pub fn is_missing_price(&self) -> bool {
        self.net_price.is_zero() || self.agency_amount_to_pay.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_type_defaults_absent_to_group() {
        assert_eq!(PackageType::from_raw(None), PackageType::Group);
    }

    #[test]
    fn package_type_maps_lowercase_individual_only() {
        assert_eq!(
            PackageType::from_raw(Some("individual")),
            PackageType::Individual
        );
        assert_eq!(
            PackageType::from_raw(Some("INDIVIDUAL")),
            PackageType::Other("INDIVIDUAL".to_string())
        );
        assert_eq!(PackageType::from_raw(Some("Charter")).label(), "Charter");
    }

    #[test]
    fn package_type_labels_map_back_to_themselves() {
        for package_type in [PackageType::Group, PackageType::Individual] {
            assert_eq!(PackageType::from_raw(Some(package_type.label())), package_type);
        }
        assert_eq!(
            PackageType::from_raw(Some("group")),
            PackageType::Other("group".to_string())
        );
    }

    #[test]
    fn derived_fields_follow_operands() {
        let mut record = ReservationRecord::new(RowId(0));
        record.net_price = Decimal::from(100);
        record.agency_amount_to_pay = Decimal::from(150);
        record.adult = 2;
        record.child = 1;
        assert_eq!(record.profit(), Decimal::from(50));
        assert_eq!(record.total_pax(), 3);

        record.net_price = Decimal::from(175);
        assert_eq!(record.profit(), Decimal::from(-25));
    }

    #[test]
    fn missing_price_when_either_operand_is_zero() {
        let mut record = ReservationRecord::new(RowId(3));
        record.net_price = Decimal::from(10);
        assert!(record.is_missing_price());
        assert!(!record.has_prices());
        record.agency_amount_to_pay = Decimal::from(12);
        assert!(!record.is_missing_price());
        assert!(record.has_prices());
    }
}
