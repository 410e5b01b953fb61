use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::record::ReservationRecord;
use crate::table::ReservationTable;

/// Inclusive begin-date window, compared at day granularity
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Period label as shown above the dashboard
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%d.%m.%Y."),
            self.end.format("%d.%m.%Y.")
        )
    }
}

/// User-selected narrowing of the included rows.
///
/// Each categorical dimension is an allow-set. `None` leaves the dimension
/// unfiltered; `Some` of an empty set lets no row through. A row with no
/// value for a filtered dimension never matches.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AnalysisFilter {
    pub destinations: Option<BTreeSet<String>>,
    pub hotels: Option<BTreeSet<String>>,
    pub authors: Option<BTreeSet<String>>,
    pub agencies: Option<BTreeSet<String>>,
    pub package_types: Option<BTreeSet<String>>,
    pub date_range: Option<DateRange>,
}

fn allows(allow_set: &Option<BTreeSet<String>>, value: Option<&str>) -> bool {
    match allow_set {
        None => true,
        Some(set) => value.is_some_and(|v| set.contains(v)),
    }
}

impl AnalysisFilter {
    pub fn is_unfiltered(&self) -> bool {
        *self == AnalysisFilter::default()
    }

    /// Take every dimension set here and fall back to `base` for the rest
    pub fn over(&self, base: AnalysisFilter) -> AnalysisFilter {
        AnalysisFilter {
            destinations: self.destinations.clone().or(base.destinations),
            hotels: self.hotels.clone().or(base.hotels),
            authors: self.authors.clone().or(base.authors),
            agencies: self.agencies.clone().or(base.agencies),
            package_types: self.package_types.clone().or(base.package_types),
            date_range: self.date_range.or(base.date_range),
        }
    }

    pub fn matches(&self, record: &ReservationRecord) -> bool {
        let in_range = match &self.date_range {
            None => true,
            Some(range) => record
                .begin_date
                .is_some_and(|d| range.contains(d.date())),
        };

        in_range
            && allows(&self.destinations, record.arrival_city.as_deref())
            && allows(&self.hotels, record.hotel_name.as_deref())
            && allows(&self.authors, record.author.as_deref())
            && allows(&self.agencies, record.agency.as_deref())
            && allows(&self.package_types, Some(record.package_type.label()))
    }
}

/// Included rows that pass the filter, in table order
pub fn working_subset<'a>(
    table: &'a ReservationTable,
    filter: &AnalysisFilter,
) -> Vec<&'a ReservationRecord> {
    table
        .records()
        .iter()
        .filter(|r| r.include && filter.matches(r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{PackageType, RowId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(city: Option<&str>, begin: Option<NaiveDate>) -> ReservationRecord {
        let mut r = ReservationRecord::new(RowId(0));
        r.arrival_city = city.map(str::to_string);
        r.begin_date = begin.map(|d| d.and_hms_opt(23, 59, 0).unwrap());
        r.include = true;
        r
    }

    fn set(values: &[&str]) -> Option<BTreeSet<String>> {
        Some(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn set_dimensions_override_the_base() {
        let base = AnalysisFilter {
            destinations: set(&["Antalya", "Hurghada"]),
            hotels: set(&["Rixos"]),
            date_range: Some(DateRange::new(date(2024, 1, 1), date(2024, 12, 31))),
            ..Default::default()
        };
        let chosen = AnalysisFilter {
            destinations: set(&[]),
            ..Default::default()
        };
        let merged = chosen.over(base.clone());
        assert_eq!(merged.destinations, set(&[]));
        assert_eq!(merged.hotels, base.hotels);
        assert_eq!(merged.authors, None);
        assert_eq!(merged.date_range, base.date_range);
    }

    #[test]
    fn default_filter_matches_everything() {
        let filter = AnalysisFilter::default();
        assert!(filter.is_unfiltered());
        assert!(filter.matches(&record(None, None)));
    }

    #[test]
    fn empty_allow_set_rejects_all_rows() {
        let filter = AnalysisFilter {
            destinations: set(&[]),
            ..Default::default()
        };
        assert!(!filter.matches(&record(Some("Antalya"), None)));
    }

    #[test]
    fn absent_value_fails_active_allow_set() {
        let filter = AnalysisFilter {
            destinations: set(&["Antalya"]),
            ..Default::default()
        };
        assert!(filter.matches(&record(Some("Antalya"), None)));
        assert!(!filter.matches(&record(None, None)));
    }

    #[test]
    fn date_range_is_inclusive_by_day() {
        let filter = AnalysisFilter {
            date_range: Some(DateRange::new(date(2024, 3, 1), date(2024, 3, 10))),
            ..Default::default()
        };
        assert!(filter.matches(&record(None, Some(date(2024, 3, 10)))));
        assert!(filter.matches(&record(None, Some(date(2024, 3, 1)))));
        assert!(!filter.matches(&record(None, Some(date(2024, 3, 11)))));
        assert!(!filter.matches(&record(None, None)));
    }

    #[test]
    fn package_type_filter_uses_labels() {
        let filter = AnalysisFilter {
            package_types: set(&["Individual"]),
            ..Default::default()
        };
        let mut individual = record(None, None);
        individual.package_type = PackageType::Individual;
        assert!(filter.matches(&individual));
        assert!(!filter.matches(&record(None, None)));
    }

    #[test]
    fn period_label_uses_dotted_dates() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 4, 5));
        assert_eq!(range.label(), "01.03.2024. - 05.04.2024.");
    }
}
