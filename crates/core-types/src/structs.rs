use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enums::EventType;

/// One row of the cleaned daily panel, as delivered by the dataset loader.
///
/// The per-ticker trading-day index is deliberately not a field here: it is
/// assigned as a `tidx` column when observations enter a data context, and
/// only exists relative to the full set of rows loaded for that ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    pub ticker: String,
    pub date: NaiveDate,
    pub close: Option<f64>,
    /// Daily log return `ln(close_t / close_{t-1})`; null on a ticker's
    /// first row. Derived from `close` when the source omits it.
    pub log_return: Option<f64>,
    pub sector: Option<String>,
    /// SEC filing form filed on this exact date, if any (e.g. "10-Q").
    pub filing_form: Option<String>,
    pub is_split_day: bool,
    pub is_reverse_split_day: bool,
}

/// One canonical event derived from the daily panel.
///
/// Derived deterministically from the current panel on each query and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub ticker: String,
    pub date: NaiveDate,
    pub event_type: EventType,
    pub sector: Option<String>,
    /// Number of distinct event types recorded for this (ticker, date).
    pub n_events: u32,
    /// `n_events > 1`: a same-day co-occurrence of different event types.
    /// Always computed from `n_events`, never stored independently.
    pub is_overlap: bool,
}

/// One tidy row of an aligned event window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRow {
    pub ticker: String,
    pub event_type: EventType,
    pub event_date: NaiveDate,
    /// The real calendar date this offset resolved to.
    pub date: NaiveDate,
    /// Trading-day offset from the event anchor, in [-k, +k].
    pub rel_day: i32,
    /// Null only where the panel itself has no return (e.g. a ticker's
    /// first trading day).
    pub log_return: Option<f64>,
}
