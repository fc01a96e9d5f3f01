use chrono::NaiveDate;
use core_types::{AnchorPolicy, ConfidencePolicy};
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub dataset: Dataset,
    pub study: StudyDefaults,
}

/// Where the daily panel is loaded from.
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    /// Path to the enriched daily panel in Parquet format.
    pub parquet_path: String,
}

/// Default event-study parameters. Each one can be overridden per run from
/// the command line; these only fill the gaps.
#[derive(Debug, Clone, Deserialize)]
pub struct StudyDefaults {
    /// Window radius k in trading days: a study covers offsets -k..=+k.
    pub window: u32,
    /// Confidence-band formula applied to the CAR series.
    #[serde(default)]
    pub confidence: ConfidencePolicy,
    /// How event dates missing from the panel are anchored.
    #[serde(default)]
    pub anchor: AnchorPolicy,
    /// Default inclusive lower bound on event dates.
    pub start_date: Option<NaiveDate>,
    /// Default inclusive upper bound on event dates.
    pub end_date: Option<NaiveDate>,
}
