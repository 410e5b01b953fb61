//! The per-user session owning the canonical reservation table.
//!
//! A session starts empty. The first successful upload creates the table;
//! every later interaction mutates that same table in place until another
//! file is uploaded. An upload that fails leaves the session without a
//! table, so stale data is never analyzed against a broken file.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::{analyze, Aggregates, Kpis};
use crate::charts::{build_charts, ChartSeries};
use crate::config::ReportConfig;
use crate::data_loader::SpreadsheetFormat;
use crate::errors::{SessionError, SessionResult};
use crate::export::{build_report, ReportArtifact};
use crate::filter::{working_subset, AnalysisFilter, DateRange};
use crate::format::kpi_summary;
use crate::import::import_reservations;
use crate::inclusion::{main_view, missing_price_view, reconcile, EditableView, ReconcileOutcome, RowEdit};
use crate::normalize::CoercionReport;
use crate::table::{FilterOptions, ReservationTable};

/// What a successful upload produced
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct UploadSummary {
    pub source_name: String,
    /// 0-based sheet row of the header
    pub header_row_index: usize,
    /// The same row, 1-based
    pub header_row_number: usize,
    pub row_count: usize,
    pub included_count: usize,
    pub missing_price_count: usize,
    pub coercion: CoercionReport,
}

/// Everything the render surface sends back in one cycle
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Interaction {
    pub filter: AnalysisFilter,
    pub main_edits: Vec<RowEdit>,
    pub missing_price_edits: Vec<RowEdit>,
    pub export: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Dashboard {
    /// The filters leave no included rows; nothing meaningful to chart
    NoMatchingData,
    Ready {
        kpis: Kpis,
        kpi_summary: IndexMap<String, String>,
        aggregates: Aggregates,
        charts: Vec<ChartSeries>,
        period: Option<String>,
    },
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct InteractionOutcome {
    pub edits: ReconcileOutcome,
    pub dashboard: Dashboard,
    pub missing_price_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportArtifact>,
}

#[derive(Debug, Default)]
pub struct Session {
    config: ReportConfig,
    source_name: Option<String>,
    table: Option<ReservationTable>,
}

impl Session {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            source_name: None,
            table: None,
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn has_table(&self) -> bool {
        self.table.is_some()
    }

    /// Replace the session table with one built from `bytes`
    pub fn upload(
        &mut self,
        name: &str,
        bytes: &[u8],
        format: SpreadsheetFormat,
    ) -> SessionResult<UploadSummary> {
        self.table = None;
        self.source_name = None;

        let outcome = import_reservations(bytes, format, &self.config.import_settings())
            .inspect_err(|e| warn!("Upload of '{}' failed: {}", name, e))?;

        let table = outcome.table;
        let summary = UploadSummary {
            source_name: name.to_string(),
            header_row_index: outcome.header.index,
            header_row_number: outcome.header.display_row(),
            row_count: table.len(),
            included_count: table.included_count(),
            missing_price_count: table.missing_price_ids().len(),
            coercion: outcome.report,
        };
        info!(
            "Loaded '{}': {} reservations, {} included, {} missing a price",
            name, summary.row_count, summary.included_count, summary.missing_price_count
        );

        self.source_name = Some(name.to_string());
        self.table = Some(table);
        Ok(summary)
    }

    pub fn table(&self) -> SessionResult<&ReservationTable> {
        self.table.as_ref().ok_or(SessionError::NoTable)
    }

    fn table_mut(&mut self) -> SessionResult<&mut ReservationTable> {
        self.table.as_mut().ok_or(SessionError::NoTable)
    }

    pub fn filter_options(&self) -> SessionResult<FilterOptions> {
        Ok(self.table()?.filter_options())
    }

    /// Every known value selected and the full begin-date span; no date
    /// range when no row has a begin date
    pub fn default_filter(&self) -> SessionResult<AnalysisFilter> {
        let table = self.table()?;
        let options = table.filter_options();
        Ok(AnalysisFilter {
            destinations: Some(options.destinations),
            hotels: Some(options.hotels),
            authors: Some(options.authors),
            agencies: Some(options.agencies),
            package_types: Some(options.package_types),
            date_range: table
                .begin_date_bounds()
                .map(|(start, end)| DateRange::new(start, end)),
        })
    }

    /// The configured filter laid over [`Session::default_filter`]: any
    /// dimension the configuration leaves unset starts at every known value
    pub fn configured_filter(&self) -> SessionResult<AnalysisFilter> {
        let filter = self.config.filters.over(self.default_filter()?);
        if !self.date_filter_available()? {
            warn!("No reservation has a begin date; the date filter is unavailable");
        }
        Ok(filter)
    }

    /// False when no row has a begin date to bound a date range
    pub fn date_filter_available(&self) -> SessionResult<bool> {
        Ok(self.table()?.begin_date_bounds().is_some())
    }

    pub fn main_view(&self) -> SessionResult<EditableView> {
        Ok(main_view(self.table()?, &self.config.report.currency))
    }

    pub fn missing_price_view(&self) -> SessionResult<EditableView> {
        Ok(missing_price_view(
            self.table()?,
            &self.config.report.currency,
        ))
    }

    /// Process one interaction cycle: fold in the main-view edits, then the
    /// missing-price edits, then analyze the filtered subset and build the
    /// report if asked to.
    pub fn interact(&mut self, interaction: &Interaction) -> SessionResult<InteractionOutcome> {
        let edits = reconcile(
            self.table_mut()?,
            &interaction.main_edits,
            &interaction.missing_price_edits,
        );
        for skipped in edits.skipped() {
            warn!("Edit not applied: {:?}", skipped);
        }

        let table = self.table()?;
        let dashboard = self.dashboard(table, &interaction.filter);
        let report = if interaction.export {
            Some(self.export(&interaction.filter)?)
        } else {
            None
        };

        Ok(InteractionOutcome {
            edits,
            dashboard,
            missing_price_count: table.missing_price_ids().len(),
            report,
        })
    }

    fn dashboard(&self, table: &ReservationTable, filter: &AnalysisFilter) -> Dashboard {
        let analysis = analyze(table, filter);
        if !analysis.has_data() {
            warn!("No reservations match the selected filters");
            return Dashboard::NoMatchingData;
        }

        let report = &self.config.report;
        let period = filter
            .date_range
            .or_else(|| {
                table
                    .begin_date_bounds()
                    .map(|(start, end)| DateRange::new(start, end))
            })
            .map(|range| range.label());

        Dashboard::Ready {
            kpi_summary: kpi_summary(&analysis.kpis, &report.currency),
            charts: build_charts(&analysis.aggregates, report.chart_top_n, &report.currency),
            kpis: analysis.kpis,
            aggregates: analysis.aggregates,
            period,
        }
    }

    /// Build the report workbook for the current table and `filter`
    pub fn export(&self, filter: &AnalysisFilter) -> SessionResult<ReportArtifact> {
        let table = self.table()?;
        let rows = working_subset(table, filter);
        let analysis = analyze(table, filter);
        let summary = kpi_summary(&analysis.kpis, &self.config.report.currency);
        Ok(build_report(
            table,
            &rows,
            &summary,
            &analysis.aggregates,
            &self.config.report.file_name,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_has_no_table() {
        let mut session = Session::new(ReportConfig::default());
        assert!(!session.has_table());
        assert!(matches!(session.main_view(), Err(SessionError::NoTable)));
        assert!(matches!(
            session.interact(&Interaction::default()),
            Err(SessionError::NoTable)
        ));
    }

    #[test]
    fn failed_upload_reports_hint_and_clears_table() {
        let mut session = Session::default();
        let err = session
            .upload("broken.xlsx", b"definitely not a zip", SpreadsheetFormat::Xlsx)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SPREADSHEET");
        assert!(err.hint().contains("valid, non-empty spreadsheet"));
        assert!(!session.has_table());
        assert_eq!(session.source_name(), None);
    }
}
