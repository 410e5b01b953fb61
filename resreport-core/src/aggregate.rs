//! KPIs and grouped summaries over the working subset.
//!
//! Descending aggregates break ties by key so repeated runs over the same
//! rows produce identical tables. Rows without a value for the grouping key
//! are left out of that grouping only.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::filter::{working_subset, AnalysisFilter};
use crate::record::ReservationRecord;
use crate::table::ReservationTable;

/// Scalar metrics of a working subset
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct Kpis {
    pub total_sales: Decimal,
    pub total_profit: Decimal,
    pub num_reservations: usize,
    /// Zero when there are no reservations
    pub avg_profit_per_reservation: Decimal,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct GroupRow<V> {
    pub key: String,
    pub value: V,
}

impl<V> GroupRow<V> {
    fn new(key: impl Into<String>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct Aggregates {
    pub profit_by_destination: Vec<GroupRow<Decimal>>,
    /// Ordered by package type label
    pub profit_by_package_type: Vec<GroupRow<Decimal>>,
    pub profit_by_author: Vec<GroupRow<Decimal>>,
    pub profit_by_agency: Vec<GroupRow<Decimal>>,
    pub reservations_by_hotel: Vec<GroupRow<usize>>,
    pub nights_by_hotel: Vec<GroupRow<u64>>,
    /// Ordered by passenger count ascending
    pub reservations_by_pax: Vec<GroupRow<usize>>,
    /// Chronological, keyed `YYYY-MM`, months without rows included as zero
    pub profit_by_month: Vec<GroupRow<Decimal>>,
}

impl Aggregates {
    pub fn is_empty(&self) -> bool {
        self.profit_by_destination.is_empty()
            && self.profit_by_package_type.is_empty()
            && self.profit_by_author.is_empty()
            && self.profit_by_agency.is_empty()
            && self.reservations_by_hotel.is_empty()
            && self.nights_by_hotel.is_empty()
            && self.reservations_by_pax.is_empty()
            && self.profit_by_month.is_empty()
    }
}

/// KPIs and aggregates of one filter selection
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct Analysis {
    pub kpis: Kpis,
    pub aggregates: Aggregates,
}

impl Analysis {
    pub fn has_data(&self) -> bool {
        self.kpis.num_reservations > 0
    }
}

/// Addition that clamps at the type's bounds instead of panicking
trait Accumulate: Copy + Default {
    fn accumulate(self, other: Self) -> Self;
}

impl Accumulate for Decimal {
    fn accumulate(self, other: Self) -> Self {
        self.saturating_add(other)
    }
}

impl Accumulate for usize {
    fn accumulate(self, other: Self) -> Self {
        self.saturating_add(other)
    }
}

impl Accumulate for u64 {
    fn accumulate(self, other: Self) -> Self {
        self.saturating_add(other)
    }
}

fn total<V: Accumulate>(values: impl Iterator<Item = V>) -> V {
    values.fold(V::default(), V::accumulate)
}

pub fn compute_kpis(rows: &[&ReservationRecord]) -> Kpis {
    let total_sales = total(rows.iter().map(|r| r.sale_price));
    let total_profit = total(rows.iter().map(|r| r.profit()));
    let num_reservations = rows.len();
    let avg_profit_per_reservation = if num_reservations == 0 {
        Decimal::ZERO
    } else {
        total_profit / Decimal::from(num_reservations)
    };

    Kpis {
        total_sales,
        total_profit,
        num_reservations,
        avg_profit_per_reservation,
    }
}

fn sum_by<'a, V, K, F>(rows: &[&'a ReservationRecord], key: K, value: F) -> BTreeMap<String, V>
where
    V: Accumulate,
    K: Fn(&'a ReservationRecord) -> Option<&'a str>,
    F: Fn(&ReservationRecord) -> V,
{
    let mut groups: BTreeMap<String, V> = BTreeMap::new();
    for &row in rows {
        if let Some(k) = key(row) {
            let sum = groups.entry(k.to_string()).or_default();
            *sum = sum.accumulate(value(row));
        }
    }
    groups
}

fn descending<V: Ord + Copy>(groups: BTreeMap<String, V>) -> Vec<GroupRow<V>> {
    let mut rows: Vec<GroupRow<V>> = groups
        .into_iter()
        .map(|(key, value)| GroupRow::new(key, value))
        .collect();
    // stable: equal values keep key order
    rows.sort_by(|a, b| b.value.cmp(&a.value));
    rows
}

fn ascending<V>(groups: BTreeMap<String, V>) -> Vec<GroupRow<V>> {
    groups
        .into_iter()
        .map(|(key, value)| GroupRow::new(key, value))
        .collect()
}

fn month_start(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
}

fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}

fn profit_by_month(rows: &[&ReservationRecord]) -> Vec<GroupRow<Decimal>> {
    let mut months: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for row in rows {
        if let Some(month) = row.begin_date.and_then(|d| month_start(d.date())) {
            let sum = months.entry(month).or_default();
            *sum = sum.accumulate(row.profit());
        }
    }

    let (Some(&first), Some(&last)) = (months.keys().next(), months.keys().next_back()) else {
        return Vec::new();
    };

    let mut series = Vec::new();
    let mut cursor = Some(first);
    while let Some(month) = cursor.filter(|m| *m <= last) {
        let profit = months.get(&month).copied().unwrap_or(Decimal::ZERO);
        series.push(GroupRow::new(month.format("%Y-%m").to_string(), profit));
        cursor = next_month(month);
    }
    series
}

fn reservations_by_pax(rows: &[&ReservationRecord]) -> Vec<GroupRow<usize>> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.total_pax()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(pax, count)| GroupRow::new(pax.to_string(), count))
        .collect()
}

pub fn compute_aggregates(rows: &[&ReservationRecord]) -> Aggregates {
    if rows.is_empty() {
        return Aggregates::default();
    }

    let profit = |r: &ReservationRecord| r.profit();

    Aggregates {
        profit_by_destination: descending(sum_by(rows, |r| r.arrival_city.as_deref(), profit)),
        profit_by_package_type: ascending(sum_by(rows, |r| Some(r.package_type.label()), profit)),
        profit_by_author: descending(sum_by(rows, |r| r.author.as_deref(), profit)),
        profit_by_agency: descending(sum_by(rows, |r| r.agency.as_deref(), profit)),
        reservations_by_hotel: descending(sum_by(rows, |r| r.hotel_name.as_deref(), |_| 1usize)),
        nights_by_hotel: descending(sum_by(
            rows,
            |r| r.hotel_name.as_deref(),
            |r| u64::from(r.night),
        )),
        reservations_by_pax: reservations_by_pax(rows),
        profit_by_month: profit_by_month(rows),
    }
}

/// Filter the table and compute everything the dashboard and report need
pub fn analyze(table: &ReservationTable, filter: &AnalysisFilter) -> Analysis {
    let rows = working_subset(table, filter);
    debug!(
        "Analyzing {} of {} reservations ({} included)",
        rows.len(),
        table.len(),
        table.included_count()
    );
    Analysis {
        kpis: compute_kpis(&rows),
        aggregates: compute_aggregates(&rows),
    }
}
