use std::collections::BTreeSet;

use resreport::aggregate::analyze;
use resreport::data_loader::SpreadsheetFormat;
use resreport::filter::AnalysisFilter;
use resreport::inclusion::{CellEdit, RowEdit};
use resreport::record::RowId;
use resreport::session::{Dashboard, Interaction};
use resreport::{ReportConfig, Session};
use resreport_test_utils::{ReservationRow, WorkbookFixture};
use rust_decimal::Decimal;

fn unpriced(no: &str) -> ReservationRow {
    let mut row = ReservationRow::new(no);
    row.net_price = 0.0;
    row.agency_amount_to_pay = 0.0;
    row
}

fn session_with(rows: Vec<ReservationRow>) -> Session {
    let bytes = WorkbookFixture::new(rows).to_xlsx().unwrap();
    let mut session = Session::new(ReportConfig::default());
    session
        .upload("export.xlsx", &bytes, SpreadsheetFormat::Xlsx)
        .unwrap();
    session
}

#[test]
fn test_upload_summary_counts() {
    let bytes = WorkbookFixture::new(vec![ReservationRow::new("R-1"), unpriced("R-2")])
        .with_banner(&["Agency export"])
        .to_xlsx()
        .unwrap();
    let mut session = Session::default();
    let summary = session
        .upload("bookings.xlsx", &bytes, SpreadsheetFormat::Xlsx)
        .unwrap();
    assert_eq!(summary.header_row_index, 1);
    assert_eq!(summary.header_row_number, 2);
    assert_eq!(summary.row_count, 2);
    assert_eq!(summary.included_count, 1);
    assert_eq!(summary.missing_price_count, 1);
    assert!(summary.coercion.is_clean());
    assert_eq!(session.source_name(), Some("bookings.xlsx"));
}

#[test]
fn test_main_view_price_fix_removes_row_from_missing_price_view() {
    let mut session = session_with(vec![ReservationRow::new("R-1"), unpriced("R-2")]);
    assert_eq!(session.missing_price_view().unwrap().rows.len(), 1);

    let outcome = session
        .interact(&Interaction {
            main_edits: vec![
                RowEdit::new(RowId(1), CellEdit::NetPrice(Decimal::from(80))),
                RowEdit::new(RowId(1), CellEdit::AgencyAmountToPay(Decimal::from(95))),
                RowEdit::new(RowId(1), CellEdit::Include(true)),
            ],
            ..Default::default()
        })
        .unwrap();

    assert_eq!(outcome.missing_price_count, 0);
    assert!(session.missing_price_view().unwrap().rows.is_empty());
    match outcome.dashboard {
        Dashboard::Ready { kpis, .. } => {
            assert_eq!(kpis.num_reservations, 2);
            assert_eq!(kpis.total_profit, Decimal::from(65));
        }
        Dashboard::NoMatchingData => panic!("expected data"),
    }
}

#[test]
fn test_edits_persist_across_interactions_and_filters() {
    let mut session = session_with(vec![ReservationRow::new("R-1"), unpriced("R-2")]);
    let only_elsewhere = AnalysisFilter {
        destinations: Some(BTreeSet::from(["Hurghada".to_string()])),
        ..Default::default()
    };

    let outcome = session
        .interact(&Interaction {
            filter: only_elsewhere.clone(),
            missing_price_edits: vec![
                RowEdit::new(RowId(1), CellEdit::NetPrice(Decimal::from(10))),
                RowEdit::new(RowId(1), CellEdit::AgencyAmountToPay(Decimal::from(30))),
            ],
            ..Default::default()
        })
        .unwrap();
    assert_eq!(outcome.dashboard, Dashboard::NoMatchingData);
    assert_eq!(outcome.edits.applied_count(), 2);

    let record = session.table().unwrap().get(RowId(1)).unwrap();
    assert_eq!(record.profit(), Decimal::from(20));
    assert!(!record.include);

    let outcome = session.interact(&Interaction::default()).unwrap();
    assert!(matches!(outcome.dashboard, Dashboard::Ready { .. }));
    assert_eq!(outcome.missing_price_count, 0);
}

#[test]
fn test_no_matching_data_for_unknown_destination() {
    let mut session = session_with(vec![ReservationRow::new("R-1")]);
    let outcome = session
        .interact(&Interaction {
            filter: AnalysisFilter {
                destinations: Some(BTreeSet::from(["Nowhere".to_string()])),
                ..Default::default()
            },
            export: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(outcome.dashboard, Dashboard::NoMatchingData);
    let report = outcome.report.expect("report requested");
    assert!(!report.bytes.is_empty());
}

#[test]
fn test_default_filter_selects_all_known_values() {
    let mut second = ReservationRow::new("R-2");
    second.arrival_city = Some("Hurghada".to_string());
    second.begin_date = chrono::NaiveDate::from_ymd_opt(2024, 7, 1);
    let mut session = session_with(vec![ReservationRow::new("R-1"), second]);

    let filter = session.default_filter().unwrap();
    assert_eq!(
        filter.destinations,
        Some(BTreeSet::from(["Antalya".to_string(), "Hurghada".to_string()]))
    );
    assert_eq!(
        filter.date_range.map(|r| r.label()).as_deref(),
        Some("10.03.2024. - 01.07.2024.")
    );

    let outcome = session
        .interact(&Interaction {
            filter,
            ..Default::default()
        })
        .unwrap();
    match outcome.dashboard {
        Dashboard::Ready { kpis, charts, .. } => {
            assert_eq!(kpis.num_reservations, 2);
            assert_eq!(charts.len(), 7);
        }
        Dashboard::NoMatchingData => panic!("expected data"),
    }
}

#[test]
fn test_new_upload_replaces_table() {
    let mut session = session_with(vec![ReservationRow::new("R-1"), unpriced("R-2")]);
    session
        .interact(&Interaction {
            main_edits: vec![RowEdit::new(RowId(0), CellEdit::Include(false))],
            ..Default::default()
        })
        .unwrap();
    assert_eq!(session.table().unwrap().included_count(), 0);

    let bytes = WorkbookFixture::new(vec![ReservationRow::new("R-9")])
        .to_xlsx()
        .unwrap();
    session
        .upload("second.xlsx", &bytes, SpreadsheetFormat::Xlsx)
        .unwrap();
    assert_eq!(session.table().unwrap().len(), 1);
    assert_eq!(session.table().unwrap().included_count(), 1);
}

#[test]
fn test_configured_filter_starts_from_known_values() {
    let mut undated = ReservationRow::new("R-2");
    undated.arrival_city = None;
    undated.begin_date = None;
    let mut session = session_with(vec![ReservationRow::new("R-1"), undated]);

    let unfiltered = session
        .interact(&Interaction {
            filter: ReportConfig::default().filters,
            ..Default::default()
        })
        .unwrap();
    match unfiltered.dashboard {
        Dashboard::Ready { kpis, .. } => assert_eq!(kpis.num_reservations, 2),
        Dashboard::NoMatchingData => panic!("expected data"),
    }

    let filter = session.configured_filter().unwrap();
    assert!(session.date_filter_available().unwrap());
    let outcome = session
        .interact(&Interaction {
            filter,
            ..Default::default()
        })
        .unwrap();
    match outcome.dashboard {
        Dashboard::Ready { kpis, .. } => assert_eq!(kpis.num_reservations, 1),
        Dashboard::NoMatchingData => panic!("expected data"),
    }
}

#[test]
fn test_configured_dimensions_override_defaults() {
    let mut second = ReservationRow::new("R-2");
    second.arrival_city = Some("Hurghada".to_string());
    let mut config = ReportConfig::default();
    config.filters.destinations = Some(BTreeSet::from(["Hurghada".to_string()]));

    let bytes = WorkbookFixture::new(vec![ReservationRow::new("R-1"), second])
        .to_xlsx()
        .unwrap();
    let mut session = Session::new(config);
    session
        .upload("export.xlsx", &bytes, SpreadsheetFormat::Xlsx)
        .unwrap();

    let filter = session.configured_filter().unwrap();
    assert_eq!(
        filter.destinations,
        Some(BTreeSet::from(["Hurghada".to_string()]))
    );
    assert_eq!(
        filter.hotels,
        Some(BTreeSet::from(["Rixos Premium".to_string()]))
    );
    assert!(filter.date_range.is_some());
}

#[test]
fn test_date_filter_unavailable_without_begin_dates() {
    let mut undated = ReservationRow::new("R-1");
    undated.begin_date = None;
    let session = session_with(vec![undated]);
    assert!(!session.date_filter_available().unwrap());
    let filter = session.configured_filter().unwrap();
    assert_eq!(filter.date_range, None);
}

#[test]
fn test_unmatched_destination_yields_empty_analysis() {
    let session = session_with(vec![ReservationRow::new("R-1"), ReservationRow::new("R-2")]);
    let filter = AnalysisFilter {
        destinations: Some(BTreeSet::from(["Reykjavik".to_string()])),
        ..Default::default()
    };
    let analysis = analyze(session.table().unwrap(), &filter);
    assert_eq!(analysis.kpis.num_reservations, 0);
    assert_eq!(analysis.kpis.avg_profit_per_reservation, Decimal::ZERO);
    assert_eq!(analysis.kpis.total_profit, Decimal::ZERO);
    assert!(analysis.aggregates.is_empty());
    assert!(!analysis.has_data());
}
