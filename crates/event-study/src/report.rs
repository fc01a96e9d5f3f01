use serde::{Deserialize, Serialize};

/// Per-relative-day aggregate statistics across all matched events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetStats {
    pub rel_day: i32,
    /// Mean log return at this offset (0.0 when no sample exists).
    pub mean: f64,
    pub median: f64,
    /// Non-null return sample size at this offset. Counts differ across
    /// offsets when windows are clipped at a ticker's data boundary.
    pub n: u32,
    /// Sample standard deviation (ddof 1); 0.0 when n < 2.
    pub std_dev: f64,
    /// `std_dev / sqrt(max(n, 1))`; the clamp keeps an empty offset from
    /// injecting NaN into the CAR band while `n` itself stays truthful.
    pub std_err: f64,
}

/// One point of the cumulative abnormal return series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarPoint {
    pub rel_day: i32,
    /// Prefix sum of per-offset mean log returns, ascending by offset.
    pub car: f64,
    pub lower: f64,
    pub upper: f64,
    /// Sample size backing this offset's mean.
    pub n: u32,
    /// `expm1(car)`: the approximate simple-return equivalent.
    pub car_pct: f64,
}

/// Run bookkeeping the presentation layer must surface verbatim: silent
/// anchor losses and boundary clipping are visible here, not hidden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySummary {
    /// Events that survived the filter chain.
    pub requested_events: usize,
    /// Events that resolved to a trading-day anchor.
    pub matched_events: usize,
    /// Total tidy rows across all windows.
    pub window_rows: usize,
    /// Smallest per-offset sample count; a spread against the max reveals
    /// clipped windows.
    pub min_rows_per_offset: u32,
    pub max_rows_per_offset: u32,
}

impl StudySummary {
    /// The explicit "no events" state.
    pub fn is_empty(&self) -> bool {
        self.window_rows == 0
    }
}

/// The full aggregate output of one study run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyReport {
    pub summary: StudySummary,
    pub stats: Vec<OffsetStats>,
    pub car: Vec<CarPoint>,
}
