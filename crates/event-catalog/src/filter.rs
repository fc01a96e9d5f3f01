use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Caller-supplied predicates applied to the event catalog before window
/// alignment. Empty sets mean "no filter on that dimension"; the predicates
/// are a plain conjunction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    /// Event-type labels to keep (e.g. "10-Q", "SPLIT").
    pub event_types: Vec<String>,
    /// Inclusive lower bound on the event date.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the event date.
    pub end_date: Option<NaiveDate>,
    pub sectors: Vec<String>,
    /// Ticker allowlist for the per-ticker study variant.
    pub tickers: Vec<String>,
    /// Drop every record of a same-day co-occurrence, not just the extras.
    pub exclude_overlaps: bool,
}

impl EventFilter {
    pub fn apply(&self, catalog: &DataFrame) -> Result<DataFrame, CatalogError> {
        let mut lf = catalog.clone().lazy();

        if let Some(lo) = self.start_date {
            lf = lf.filter(col("date").gt_eq(lit(lo)));
        }
        if let Some(hi) = self.end_date {
            lf = lf.filter(col("date").lt_eq(lit(hi)));
        }
        if !self.event_types.is_empty() {
            lf = lf.filter(
                col("event_type")
                    .is_in(lit(Series::new("event_types", self.event_types.clone()))),
            );
        }
        if !self.sectors.is_empty() {
            lf = lf
                .filter(col("sector").is_in(lit(Series::new("sectors", self.sectors.clone()))));
        }
        if !self.tickers.is_empty() {
            let tickers: Vec<String> =
                self.tickers.iter().map(|t| t.trim().to_uppercase()).collect();
            lf = lf.filter(col("ticker").is_in(lit(Series::new("tickers", tickers))));
        }
        if self.exclude_overlaps {
            lf = lf.filter(col("is_overlap").eq(lit(false)));
        }

        Ok(lf.collect()?)
    }
}
