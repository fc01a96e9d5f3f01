use std::collections::BTreeSet;

use chrono::NaiveDate;
use core_types::{EventRecord, EventType};
use panel::DataContext;
use polars::prelude::*;
use tracing::debug;

use crate::error::CatalogError;

/// Builds the canonical long event table from the indexed panel.
///
/// One row per distinct (ticker, date, event_type): filing rows keep their
/// form label, split flags become the synthetic "SPLIT" / "REVERSE_SPLIT"
/// labels. Sector is attached from a de-duplicated panel slice (first match
/// wins), and same-day co-occurrences are counted into `n_events` with
/// `is_overlap = n_events > 1`. Output order is not significant; downstream
/// consumers impose their own.
pub fn build_event_catalog(ctx: &DataContext) -> Result<DataFrame, CatalogError> {
    let panel = ctx.panel();

    let mut parts: Vec<LazyFrame> = Vec::new();
    if ctx.has_column("filing_form") {
        parts.push(
            panel
                .clone()
                .lazy()
                .filter(col("filing_form").is_not_null())
                .select([col("ticker"), col("date"), col("filing_form").alias("event_type")]),
        );
    }
    if ctx.has_column("is_split_day") {
        parts.push(
            panel
                .clone()
                .lazy()
                .filter(col("is_split_day"))
                .select([col("ticker"), col("date"), lit("SPLIT").alias("event_type")]),
        );
    }
    if ctx.has_column("is_reverse_split_day") {
        parts.push(
            panel
                .clone()
                .lazy()
                .filter(col("is_reverse_split_day"))
                .select([col("ticker"), col("date"), lit("REVERSE_SPLIT").alias("event_type")]),
        );
    }

    if parts.is_empty() {
        return Ok(empty_catalog()?);
    }

    let events =
        concat(parts, UnionArgs::default())?.unique(None, UniqueKeepStrategy::First);

    // attach sector from a minimal de-duplicated slice; first match wins
    let events = if ctx.has_column("sector") {
        let sector_slice = panel
            .clone()
            .lazy()
            .select([col("ticker"), col("date"), col("sector")])
            .unique(
                Some(vec!["ticker".to_string(), "date".to_string()]),
                UniqueKeepStrategy::First,
            );
        events.join(
            sector_slice,
            [col("ticker"), col("date")],
            [col("ticker"), col("date")],
            JoinArgs::new(JoinType::Left),
        )
    } else {
        events.with_column(lit(NULL).cast(DataType::String).alias("sector"))
    };

    // same-day co-occurrence count per (ticker, date)
    let counts = events
        .clone()
        .group_by([col("ticker"), col("date")])
        .agg([col("event_type").count().alias("n_events")]);

    let catalog = events
        .join(
            counts,
            [col("ticker"), col("date")],
            [col("ticker"), col("date")],
            JoinArgs::new(JoinType::Left),
        )
        .with_column(col("n_events").gt(lit(1)).alias("is_overlap"))
        .collect()?;

    debug!(events = catalog.height(), "event catalog built");
    Ok(catalog)
}

fn empty_catalog() -> Result<DataFrame, PolarsError> {
    DataFrame::new(vec![
        Series::new_empty("ticker", &DataType::String),
        Series::new_empty("date", &DataType::Date),
        Series::new_empty("event_type", &DataType::String),
        Series::new_empty("sector", &DataType::String),
        Series::new_empty("n_events", &DataType::UInt32),
        Series::new_empty("is_overlap", &DataType::Boolean),
    ])
}

/// Converts a catalog frame into typed records, e.g. for serialization.
pub fn catalog_to_records(catalog: &DataFrame) -> Result<Vec<EventRecord>, CatalogError> {
    let tickers = catalog.column("ticker")?.str()?;
    let types = catalog.column("event_type")?.str()?;
    let sectors = catalog.column("sector")?.str()?;
    let n_events = catalog.column("n_events")?.u32()?;
    let overlaps = catalog.column("is_overlap")?.bool()?;
    let dates: Vec<Option<NaiveDate>> =
        catalog.column("date")?.date()?.as_date_iter().collect();

    let mut out = Vec::with_capacity(catalog.height());
    for i in 0..catalog.height() {
        let Some(date) = dates[i] else { continue };
        out.push(EventRecord {
            ticker: tickers.get(i).unwrap_or("").to_string(),
            date,
            event_type: EventType::from_label(types.get(i).unwrap_or("")),
            sector: sectors.get(i).map(str::to_string),
            n_events: n_events.get(i).unwrap_or(1),
            is_overlap: overlaps.get(i).unwrap_or(false),
        });
    }
    Ok(out)
}

/// Distinct event-type labels in the catalog, sorted for selector lists.
pub fn event_type_choices(catalog: &DataFrame) -> Result<Vec<String>, CatalogError> {
    let types = catalog.column("event_type")?.str()?;
    let unique: BTreeSet<String> = types.into_iter().flatten().map(str::to_string).collect();
    Ok(unique.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::DailyObservation;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn obs(ticker: &str, date: NaiveDate) -> DailyObservation {
        DailyObservation {
            ticker: ticker.to_string(),
            date,
            close: None,
            log_return: Some(0.0),
            sector: Some("Tech".to_string()),
            filing_form: None,
            is_split_day: false,
            is_reverse_split_day: false,
        }
    }

    fn fixture() -> DataContext {
        let mut rows = Vec::new();
        // AAA: filing and a forward split on the same day
        let mut overlap = obs("AAA", day(8));
        overlap.filing_form = Some("10-Q".to_string());
        overlap.is_split_day = true;
        rows.push(obs("AAA", day(7)));
        rows.push(overlap);
        rows.push(obs("AAA", day(9)));
        // BBB: a lone filing
        let mut filing = obs("BBB", day(8));
        filing.filing_form = Some("8-K".to_string());
        filing.sector = Some("Health".to_string());
        rows.push(filing);
        // CCC: a reverse split
        let mut rsplit = obs("CCC", day(9));
        rsplit.is_reverse_split_day = true;
        rows.push(rsplit);
        DataContext::from_observations(&rows).unwrap()
    }

    #[test]
    fn same_day_filing_and_split_both_flag_as_overlap() {
        let catalog = build_event_catalog(&fixture()).unwrap();
        let records = catalog_to_records(&catalog).unwrap();

        let aaa: Vec<&EventRecord> =
            records.iter().filter(|r| r.ticker == "AAA").collect();
        assert_eq!(aaa.len(), 2);
        for record in aaa {
            assert_eq!(record.n_events, 2);
            assert!(record.is_overlap);
        }
    }

    #[test]
    fn lone_events_are_not_overlapping() {
        let catalog = build_event_catalog(&fixture()).unwrap();
        let records = catalog_to_records(&catalog).unwrap();

        let bbb = records.iter().find(|r| r.ticker == "BBB").unwrap();
        assert_eq!(bbb.event_type, EventType::Filing("8-K".to_string()));
        assert_eq!(bbb.n_events, 1);
        assert!(!bbb.is_overlap);

        let ccc = records.iter().find(|r| r.ticker == "CCC").unwrap();
        assert_eq!(ccc.event_type, EventType::ReverseSplit);
    }

    #[test]
    fn sector_is_attached_from_the_panel() {
        let catalog = build_event_catalog(&fixture()).unwrap();
        let records = catalog_to_records(&catalog).unwrap();
        let bbb = records.iter().find(|r| r.ticker == "BBB").unwrap();
        assert_eq!(bbb.sector.as_deref(), Some("Health"));
    }

    #[test]
    fn exact_duplicate_tuples_collapse() {
        // a filing labeled "SPLIT" on a split day collapses into one record
        let mut row = obs("DDD", day(10));
        row.filing_form = Some("SPLIT".to_string());
        row.is_split_day = true;
        let ctx = DataContext::from_observations(&[obs("DDD", day(9)), row]).unwrap();

        let catalog = build_event_catalog(&ctx).unwrap();
        let records = catalog_to_records(&catalog).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event_type, EventType::Split);
        assert_eq!(records[0].n_events, 1);
        assert!(!records[0].is_overlap);
    }

    #[test]
    fn event_type_choices_are_sorted_and_distinct() {
        let catalog = build_event_catalog(&fixture()).unwrap();
        let choices = event_type_choices(&catalog).unwrap();
        assert_eq!(
            choices,
            vec!["10-Q".to_string(), "8-K".to_string(), "REVERSE_SPLIT".to_string(), "SPLIT".to_string()]
        );
    }
}
