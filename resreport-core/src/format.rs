use indexmap::IndexMap;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::aggregate::Kpis;

const DECIMAL_PLACES: u32 = 2;

pub const LABEL_TOTAL_SALES: &str = "Total revenue";
pub const LABEL_TOTAL_PROFIT: &str = "Total profit";
pub const LABEL_NUM_RESERVATIONS: &str = "Number of reservations";
pub const LABEL_AVG_PROFIT: &str = "Average profit per reservation";

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// `1234567.891` becomes `1,234,567.89`
pub fn format_decimal(value: Decimal) -> String {
    let rounded =
        value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
}

pub fn format_amount(value: Decimal, currency: &str) -> String {
    format!("{} {}", format_decimal(value), currency)
}

/// KPI label to display string, in dashboard order
pub fn kpi_summary(kpis: &Kpis, currency: &str) -> IndexMap<String, String> {
    let mut summary = IndexMap::new();
    summary.insert(
        LABEL_TOTAL_SALES.to_string(),
        format_amount(kpis.total_sales, currency),
    );
    summary.insert(
        LABEL_TOTAL_PROFIT.to_string(),
        format_amount(kpis.total_profit, currency),
    );
    summary.insert(
        LABEL_NUM_RESERVATIONS.to_string(),
        kpis.num_reservations.to_string(),
    );
    summary.insert(
        LABEL_AVG_PROFIT.to_string(),
        format_amount(kpis.avg_profit_per_reservation, currency),
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_are_grouped_and_rounded() {
        assert_eq!(
            format_amount(Decimal::new(1234567891, 3), "BAM"),
            "1,234,567.89 BAM"
        );
        assert_eq!(format_decimal(Decimal::new(5, 3)), "0.01");
        assert_eq!(format_decimal(Decimal::from(100)), "100.00");
        assert_eq!(format_decimal(Decimal::from(-1500)), "-1,500.00");
        assert_eq!(format_decimal(Decimal::new(-4, 3)), "0.00");
    }

    #[test]
    fn summary_keeps_dashboard_order() {
        let kpis = Kpis {
            total_sales: Decimal::from(2500),
            total_profit: Decimal::from(50),
            num_reservations: 1,
            avg_profit_per_reservation: Decimal::from(50),
        };
        let summary = kpi_summary(&kpis, "BAM");
        let labels: Vec<&str> = summary.keys().map(String::as_str).collect();
        assert_eq!(
            labels,
            vec![
                LABEL_TOTAL_SALES,
                LABEL_TOTAL_PROFIT,
                LABEL_NUM_RESERVATIONS,
                LABEL_AVG_PROFIT
            ]
        );
        assert_eq!(summary[LABEL_TOTAL_SALES], "2,500.00 BAM");
        assert_eq!(summary[LABEL_NUM_RESERVATIONS], "1");
    }
}
