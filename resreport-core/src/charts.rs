//! Ready-to-plot series handed to the render surface.
//!
//! The render surface draws these as they are; truncation to the top
//! entries happens here and never in the exported report.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::{Aggregates, GroupRow};

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ChartSeries {
    pub id: &'static str,
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ChartPoint>,
}

fn decimal_points(rows: &[GroupRow<Decimal>], limit: Option<usize>) -> Vec<ChartPoint> {
    rows.iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|g| ChartPoint {
            label: g.key.clone(),
            value: g.value.to_f64().unwrap_or_default(),
        })
        .collect()
}

fn count_points<V: Copy>(
    rows: &[GroupRow<V>],
    limit: Option<usize>,
    as_f64: impl Fn(V) -> f64,
) -> Vec<ChartPoint> {
    rows.iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|g| ChartPoint {
            label: g.key.clone(),
            value: as_f64(g.value),
        })
        .collect()
}

fn series(
    id: &'static str,
    title: String,
    kind: ChartKind,
    x_label: &str,
    y_label: &str,
    points: Vec<ChartPoint>,
) -> ChartSeries {
    ChartSeries {
        id,
        title,
        kind,
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        points,
    }
}

/// Dashboard charts in display order
pub fn build_charts(aggregates: &Aggregates, top_n: usize, currency: &str) -> Vec<ChartSeries> {
    let profit_axis = format!("Total profit ({})", currency);
    let top = Some(top_n);

    vec![
        series(
            "profit_by_month",
            "Monthly profit".to_string(),
            ChartKind::Line,
            "Month",
            &profit_axis,
            decimal_points(&aggregates.profit_by_month, None),
        ),
        series(
            "profit_by_destination",
            format!("Top {} destinations by profit", top_n),
            ChartKind::Bar,
            "Destination",
            &profit_axis,
            decimal_points(&aggregates.profit_by_destination, top),
        ),
        series(
            "nights_by_hotel",
            format!("Top {} hotels by nights", top_n),
            ChartKind::Bar,
            "Hotel",
            "Nights",
            count_points(&aggregates.nights_by_hotel, top, |n| n as f64),
        ),
        series(
            "profit_by_package_type",
            "Profit share by package type".to_string(),
            ChartKind::Pie,
            "Package type",
            &profit_axis,
            decimal_points(&aggregates.profit_by_package_type, None),
        ),
        series(
            "reservations_by_pax",
            "Reservations by number of passengers".to_string(),
            ChartKind::Bar,
            "Passengers",
            "Reservations",
            count_points(&aggregates.reservations_by_pax, None, |n| n as f64),
        ),
        series(
            "profit_by_agency",
            format!("Top {} agencies by profit", top_n),
            ChartKind::Bar,
            "Agency",
            &profit_axis,
            decimal_points(&aggregates.profit_by_agency, top),
        ),
        series(
            "profit_by_author",
            format!("Top {} authors by profit", top_n),
            ChartKind::Bar,
            "Author",
            &profit_axis,
            decimal_points(&aggregates.profit_by_author, top),
        ),
    ]
}
