use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::columns::Column;
use crate::normalize::Normalized;
use crate::record::{CellValue, ReservationRecord, RowId};

/// The single source of truth for one uploaded file.
///
/// Created once per successful upload and mutated in place by every
/// interaction afterwards. Records are never removed; only their editable
/// fields and inclusion flags change.
#[derive(Clone, Debug, PartialEq)]
pub struct ReservationTable {
    header_row_index: usize,
    extra_columns: Vec<String>,
    records: Vec<ReservationRecord>,
}

/// Known values per categorical dimension, sorted and de-duplicated
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct FilterOptions {
    pub destinations: BTreeSet<String>,
    pub hotels: BTreeSet<String>,
    pub authors: BTreeSet<String>,
    pub agencies: BTreeSet<String>,
    pub package_types: BTreeSet<String>,
}

impl ReservationTable {
    pub fn new(header_row_index: usize, normalized: Normalized) -> Self {
        Self {
            header_row_index,
            extra_columns: normalized.extra_columns,
            records: normalized.records,
        }
    }

    pub fn header_row_index(&self) -> usize {
        self.header_row_index
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn records(&self) -> &[ReservationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, row_id: RowId) -> Option<&ReservationRecord> {
        self.records.get(row_id.0)
    }

    pub(crate) fn get_mut(&mut self, row_id: RowId) -> Option<&mut ReservationRecord> {
        self.records.get_mut(row_id.0)
    }

    /// Rows whose net price or agency amount to pay is zero, in table order
    pub fn missing_price_ids(&self) -> Vec<RowId> {
        self.records
            .iter()
            .filter(|r| r.is_missing_price())
            .map(|r| r.row_id)
            .collect()
    }

    pub fn included_count(&self) -> usize {
        self.records.iter().filter(|r| r.include).count()
    }

    pub fn filter_options(&self) -> FilterOptions {
        let mut options = FilterOptions::default();
        for record in &self.records {
            if let Some(city) = &record.arrival_city {
                options.destinations.insert(city.clone());
            }
            if let Some(hotel) = &record.hotel_name {
                options.hotels.insert(hotel.clone());
            }
            if let Some(author) = &record.author {
                options.authors.insert(author.clone());
            }
            if let Some(agency) = &record.agency {
                options.agencies.insert(agency.clone());
            }
            options
                .package_types
                .insert(record.package_type.label().to_string());
        }
        options
    }

    /// Earliest and latest known begin date, or `None` when no row has one
    pub fn begin_date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self
            .records
            .iter()
            .filter_map(|r| r.begin_date.map(|d| d.date()));
        let first = dates.next()?;
        Some(dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d))))
    }

    /// Column headers of a full data row: the required columns, the derived
    /// columns, then any extra columns the upload carried
    pub fn data_headers(&self) -> Vec<String> {
        Column::REQUIRED
            .iter()
            .chain([Column::TotalPax, Column::Include].iter())
            .map(|c| c.header().to_string())
            .chain(self.extra_columns.iter().cloned())
            .collect()
    }
}

fn text_cell(value: &Option<String>) -> CellValue {
    value
        .as_ref()
        .map(|s| CellValue::Text(s.clone()))
        .unwrap_or(CellValue::Empty)
}

fn money_cell(value: Decimal) -> CellValue {
    CellValue::Number(value.to_f64().unwrap_or_default())
}

fn date_cell(value: &Option<NaiveDateTime>) -> CellValue {
    value.map(CellValue::DateTime).unwrap_or(CellValue::Empty)
}

/// The value of one column of a record, derived columns included
pub fn column_cell(record: &ReservationRecord, column: Column) -> CellValue {
    match column {
        Column::ReservationNo => text_cell(&record.reservation_no),
        Column::ArrivalCity => text_cell(&record.arrival_city),
        Column::HotelName => text_cell(&record.hotel_name),
        Column::Author => text_cell(&record.author),
        Column::Payment => text_cell(&record.payment),
        Column::Agency => text_cell(&record.agency),
        Column::BeginDate => date_cell(&record.begin_date),
        Column::Package => text_cell(&record.package),
        Column::PriceList => text_cell(&record.price_list),
        Column::EndDate => date_cell(&record.end_date),
        Column::Night => CellValue::Number(record.night as f64),
        Column::Adult => CellValue::Number(record.adult as f64),
        Column::Child => CellValue::Number(record.child as f64),
        Column::Infant => CellValue::Number(record.infant as f64),
        Column::NetPrice => money_cell(record.net_price),
        Column::SalePrice => money_cell(record.sale_price),
        Column::AgencyPayment => money_cell(record.agency_payment),
        Column::CreateDate => date_cell(&record.create_date),
        Column::PassengerAmountToPay => money_cell(record.passenger_amount_to_pay),
        Column::AgencyAmountToPay => money_cell(record.agency_amount_to_pay),
        Column::PackageType => CellValue::Text(record.package_type.label().to_string()),
        Column::Profit => money_cell(record.profit()),
        Column::TotalPax => CellValue::Number(record.total_pax() as f64),
        Column::Include => CellValue::Bool(record.include),
    }
}

/// One record as cells aligned with [`ReservationTable::data_headers`]
pub fn data_row(record: &ReservationRecord) -> Vec<CellValue> {
    Column::REQUIRED
        .iter()
        .chain([Column::TotalPax, Column::Include].iter())
        .map(|&column| column_cell(record, column))
        .chain(record.extras.iter().cloned())
        .collect()
}
