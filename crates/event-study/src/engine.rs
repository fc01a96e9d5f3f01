use std::fs::File;
use std::path::Path;

use core_types::WindowRow;
use event_catalog::build_event_catalog;
use panel::DataContext;
use polars::prelude::*;
use tracing::info;

use crate::aggregator;
use crate::aligner;
use crate::error::StudyError;
use crate::query::StudyRequest;
use crate::report::{StudyReport, StudySummary};

/// A stateless orchestrator for one event-study request.
///
/// Owns no data: every run borrows a read-only context and a pre-built
/// catalog, so concurrent sessions can share both freely.
#[derive(Debug, Default)]
pub struct StudyEngine {}

impl StudyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the filter, alignment, and aggregation stages for one request.
    ///
    /// An empty filter chain is not an error: the result carries zeroed
    /// summary counts and empty tables, the caller's "no events" state.
    /// A zero window radius is rejected before any work happens.
    pub fn run(
        &self,
        ctx: &DataContext,
        catalog: &DataFrame,
        request: &StudyRequest,
    ) -> Result<StudyOutput, StudyError> {
        if request.window == 0 {
            return Err(StudyError::InvalidWindow(request.window));
        }

        let events = request.filter.apply(catalog)?;
        if events.height() == 0 {
            info!("no events survived the filter chain");
            return StudyOutput::empty();
        }

        let aligned =
            aligner::align_windows(&events, ctx.panel(), request.window, request.anchor)?;
        let stats = aggregator::per_offset_stats(&aligned.rows)?;
        let car = aggregator::car_series(&stats, request.confidence);

        let summary = StudySummary {
            requested_events: aligned.requested_events,
            matched_events: aligned.matched_events,
            window_rows: aligned.rows.height(),
            min_rows_per_offset: stats.iter().map(|s| s.n).min().unwrap_or(0),
            max_rows_per_offset: stats.iter().map(|s| s.n).max().unwrap_or(0),
        };
        info!(
            requested = summary.requested_events,
            matched = summary.matched_events,
            rows = summary.window_rows,
            "event study complete"
        );

        Ok(StudyOutput {
            windows: aligned.rows,
            report: StudyReport { summary, stats, car },
        })
    }
}

/// Tidy window rows plus the aggregate report for one run.
#[derive(Debug, Clone)]
pub struct StudyOutput {
    /// Columns: ticker, event_type, event_date, date, rel_day, logret.
    pub windows: DataFrame,
    pub report: StudyReport,
}

impl StudyOutput {
    fn empty() -> Result<Self, StudyError> {
        let windows = DataFrame::new(vec![
            Series::new_empty("ticker", &DataType::String),
            Series::new_empty("event_type", &DataType::String),
            Series::new_empty("event_date", &DataType::Date),
            Series::new_empty("date", &DataType::Date),
            Series::new_empty("rel_day", &DataType::Int32),
            Series::new_empty("logret", &DataType::Float64),
        ])?;
        Ok(Self {
            windows,
            report: StudyReport {
                summary: StudySummary {
                    requested_events: 0,
                    matched_events: 0,
                    window_rows: 0,
                    min_rows_per_offset: 0,
                    max_rows_per_offset: 0,
                },
                stats: Vec::new(),
                car: Vec::new(),
            },
        })
    }

    /// The window rows as typed records.
    pub fn window_rows(&self) -> Result<Vec<WindowRow>, StudyError> {
        aligner::collect_window_rows(&self.windows)
    }

    /// Writes the tidy window rows as delimited text, one row per
    /// (event, offset) pair, in the engine's deterministic order.
    pub fn export_csv(&self, path: impl AsRef<Path>) -> Result<(), StudyError> {
        let mut file = File::create(path)?;
        let mut df = self.windows.clone();
        CsvWriter::new(&mut file).finish(&mut df)?;
        Ok(())
    }
}

/// A data context paired with the catalog derived from it.
///
/// This is the handle the presentation layer holds: build it once at
/// startup (or per session for remote-backed panels) and run any number of
/// read-only study requests against it.
#[derive(Debug, Clone)]
pub struct StudySession {
    ctx: DataContext,
    catalog: DataFrame,
}

impl StudySession {
    /// Derives the event catalog for `ctx` and pairs the two up.
    pub fn open(ctx: DataContext) -> Result<Self, StudyError> {
        let catalog = build_event_catalog(&ctx)?;
        info!(events = catalog.height(), "study session opened");
        Ok(Self { ctx, catalog })
    }

    pub fn context(&self) -> &DataContext {
        &self.ctx
    }

    pub fn catalog(&self) -> &DataFrame {
        &self.catalog
    }

    /// Distinct event-type labels available to filter on.
    pub fn event_type_choices(&self) -> Result<Vec<String>, StudyError> {
        Ok(event_catalog::event_type_choices(&self.catalog)?)
    }

    pub fn run(&self, request: &StudyRequest) -> Result<StudyOutput, StudyError> {
        StudyEngine::new().run(&self.ctx, &self.catalog, request)
    }
}
