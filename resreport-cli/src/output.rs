use resreport::inclusion::ApplyOutcome;
use resreport::session::{Dashboard, InteractionOutcome, UploadSummary};

pub fn print_upload_summary(summary: &UploadSummary) {
    println!("Loaded {}", summary.source_name);
    println!("Header found on row {}", summary.header_row_number);
    println!(
        "{} reservations, {} included, {} missing a price",
        summary.row_count, summary.included_count, summary.missing_price_count
    );
    if !summary.coercion.is_clean() {
        println!(
            "{} cells could not be read and were defaulted",
            summary.coercion.issues.len()
        );
    }
}

pub fn print_outcome(outcome: &InteractionOutcome) {
    for result in outcome.edits.main.iter().chain(&outcome.edits.missing_price) {
        match result {
            ApplyOutcome::Applied { message } => println!("  {}", message),
            ApplyOutcome::Skipped { reason } => println!("  skipped: {}", reason),
        }
    }

    match &outcome.dashboard {
        Dashboard::NoMatchingData => {
            println!("No reservations match the selected filters.");
        }
        Dashboard::Ready {
            kpi_summary,
            period,
            ..
        } => {
            if let Some(period) = period {
                println!("Period: {}", period);
            }
            let width = kpi_summary.keys().map(|k| k.len()).max().unwrap_or(0);
            for (label, value) in kpi_summary {
                println!("{:<width$}  {}", label, value, width = width);
            }
        }
    }

    if outcome.missing_price_count > 0 {
        println!(
            "{} reservations are still missing a price",
            outcome.missing_price_count
        );
    }
}
