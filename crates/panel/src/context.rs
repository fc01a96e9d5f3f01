use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use core_types::DailyObservation;
use polars::prelude::*;
use tracing::info;

use crate::error::PanelError;
use crate::indexer;

/// Read-only handle to the indexed daily panel for one session.
///
/// Construct it once, then pass it by reference into every query. Nothing
/// here mutates after construction.
#[derive(Debug, Clone)]
pub struct DataContext {
    panel: DataFrame,
}

impl DataContext {
    /// Builds a context from typed observation rows, as delivered by the
    /// dataset loader.
    ///
    /// Rows may arrive in any order. When no row carries a log return the
    /// column is derived from `close` instead.
    pub fn from_observations(rows: &[DailyObservation]) -> Result<Self, PanelError> {
        let mut tickers = Vec::with_capacity(rows.len());
        let mut dates = Vec::with_capacity(rows.len());
        let mut closes = Vec::with_capacity(rows.len());
        let mut logrets = Vec::with_capacity(rows.len());
        let mut sectors: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut forms: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut splits = Vec::with_capacity(rows.len());
        let mut rsplits = Vec::with_capacity(rows.len());

        for row in rows {
            tickers.push(row.ticker.trim().to_uppercase());
            dates.push(row.date);
            closes.push(row.close);
            logrets.push(row.log_return);
            sectors.push(row.sector.clone());
            forms.push(row.filing_form.clone());
            splits.push(row.is_split_day);
            rsplits.push(row.is_reverse_split_day);
        }

        let mut columns = vec![
            Series::new("ticker", tickers),
            DateChunked::from_naive_date("date", dates).into_series(),
            Series::new("close", closes),
        ];
        // only materialize logret if the loader supplied any; otherwise the
        // indexer derives it from close
        if logrets.iter().any(|v| v.is_some()) {
            columns.push(Series::new("logret", logrets));
        }
        columns.push(Series::new("sector", sectors));
        columns.push(Series::new("filing_form", forms));
        columns.push(Series::new("is_split_day", splits));
        columns.push(Series::new("is_reverse_split_day", rsplits));

        let panel = indexer::index_panel(DataFrame::new(columns)?)?;
        info!(rows = panel.height(), "daily panel indexed");
        Ok(Self { panel })
    }

    /// Loads and indexes a panel from a Parquet file.
    ///
    /// Source I/O and decode failures propagate as errors; they are never
    /// collapsed into an empty context.
    pub fn from_parquet(path: impl AsRef<Path>) -> Result<Self, PanelError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let df = ParquetReader::new(file).finish()?;
        info!(path = %path.display(), rows = df.height(), "panel source loaded");

        let panel = indexer::index_panel(normalize(df)?)?;
        Ok(Self { panel })
    }

    /// The indexed panel: one row per (ticker, date), sorted, with `tidx`.
    pub fn panel(&self) -> &DataFrame {
        &self.panel
    }

    pub fn height(&self) -> usize {
        self.panel.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.panel.get_column_names().contains(&name)
    }

    /// Inclusive (min, max) calendar dates present in the panel.
    pub fn date_bounds(&self) -> Result<Option<(NaiveDate, NaiveDate)>, PanelError> {
        let dates = self.panel.column("date")?.date()?;
        let mut lo: Option<NaiveDate> = None;
        let mut hi: Option<NaiveDate> = None;
        for d in dates.as_date_iter().flatten() {
            lo = Some(lo.map_or(d, |v| v.min(d)));
            hi = Some(hi.map_or(d, |v| v.max(d)));
        }
        Ok(lo.zip(hi))
    }

    /// Distinct non-empty sectors, sorted for stable selector lists.
    pub fn sector_choices(&self) -> Result<Vec<String>, PanelError> {
        if !self.has_column("sector") {
            return Ok(Vec::new());
        }
        let sectors = self.panel.column("sector")?.str()?;
        let unique: BTreeSet<String> = sectors
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Ok(unique.into_iter().collect())
    }

    /// Distinct tickers, sorted for stable selector lists.
    pub fn ticker_choices(&self) -> Result<Vec<String>, PanelError> {
        let tickers = self.panel.column("ticker")?.str()?;
        let unique: BTreeSet<String> =
            tickers.into_iter().flatten().map(str::to_string).collect();
        Ok(unique.into_iter().collect())
    }
}

/// Normalizes a raw source frame: required columns present, tickers
/// uppercased, dtypes coerced to what the rest of the engine expects.
fn normalize(df: DataFrame) -> Result<DataFrame, PanelError> {
    for required in ["ticker", "date"] {
        if !df.get_column_names().contains(&required) {
            return Err(PanelError::MissingColumn(required.to_string()));
        }
    }

    let names: Vec<String> =
        df.get_column_names().iter().map(|s| s.to_string()).collect();
    let has = |name: &str| names.iter().any(|n| n == name);

    let mut exprs = vec![
        col("ticker").cast(DataType::String).str().to_uppercase().alias("ticker"),
        col("date").cast(DataType::Date).alias("date"),
    ];
    if has("close") {
        exprs.push(col("close").cast(DataType::Float64));
    }
    if has("logret") {
        exprs.push(col("logret").cast(DataType::Float64));
    }
    if has("sector") {
        exprs.push(col("sector").cast(DataType::String));
    }
    if has("filing_form") {
        exprs.push(col("filing_form").cast(DataType::String));
    }
    for flag in ["is_split_day", "is_reverse_split_day"] {
        if has(flag) {
            exprs.push(col(flag).cast(DataType::Boolean));
        }
    }

    Ok(df.lazy().select(exprs).collect()?)
}
