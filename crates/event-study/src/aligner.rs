use chrono::NaiveDate;
use core_types::{AnchorPolicy, EventType, WindowRow};
use polars::prelude::*;
use tracing::debug;

use crate::error::StudyError;

/// Window rows plus the match bookkeeping the caller must surface.
#[derive(Debug, Clone)]
pub struct AlignedWindows {
    /// Tidy rows: ticker, event_type, event_date, date, rel_day, logret.
    pub rows: DataFrame,
    /// Events that survived the filter chain and entered anchor resolution.
    pub requested_events: usize,
    /// Events whose date resolved to a trading-day anchor.
    pub matched_events: usize,
}

/// Builds ±k trading-day windows around every event in the filtered catalog.
///
/// Anchors resolve per `policy`, offsets expand as a cross product, and the
/// final join back to the panel prunes offsets that fall outside a ticker's
/// history, so per-offset sample counts may be unequal near data
/// boundaries. Rows come back in a fixed (ticker, event_date, event_type,
/// date) order so exports and aggregates are reproducible across runs.
pub fn align_windows(
    events: &DataFrame,
    panel: &DataFrame,
    window: u32,
    policy: AnchorPolicy,
) -> Result<AlignedWindows, StudyError> {
    let offsets = offset_frame(window)?;
    let requested_events = events.height();

    let anchored = resolve_anchors(events, panel, policy)?;
    let matched_events = anchored.height();
    if matched_events < requested_events {
        debug!(
            requested = requested_events,
            matched = matched_events,
            "events dropped during anchor resolution"
        );
    }

    // cross product: every anchored event against every offset
    let expanded = anchored
        .lazy()
        .cross_join(offsets.lazy())
        .with_column((col("event_tidx") + col("rel_day").cast(DataType::Int64)).alias("tidx"));

    // value resolution: fetch the real calendar date and return; offsets
    // beyond the ticker's history drop out of the inner join here
    let base = panel
        .clone()
        .lazy()
        .select([col("ticker"), col("tidx"), col("date"), col("logret")]);
    let rows = expanded
        .join(
            base,
            [col("ticker"), col("tidx")],
            [col("ticker"), col("tidx")],
            JoinArgs::new(JoinType::Inner),
        )
        .select([
            col("ticker"),
            col("event_type"),
            col("event_date"),
            col("date"),
            col("rel_day"),
            col("logret"),
        ])
        .collect()?
        .sort(
            ["ticker", "event_date", "event_type", "date"],
            vec![false, false, false, false],
            false,
        )?;

    Ok(AlignedWindows {
        rows,
        requested_events,
        matched_events,
    })
}

/// Maps each event to its ticker's trading-day index.
///
/// `ExactMatch` joins on the exact (ticker, date) pair and drops events with
/// no matching panel row. `NextTradingDay` instead rolls such events forward
/// to the ticker's next available trading day.
pub fn resolve_anchors(
    events: &DataFrame,
    panel: &DataFrame,
    policy: AnchorPolicy,
) -> Result<DataFrame, StudyError> {
    let events = events
        .clone()
        .lazy()
        .select([col("ticker"), col("date").alias("event_date"), col("event_type")])
        .collect()?;
    let anchors = panel
        .clone()
        .lazy()
        .select([col("ticker"), col("date"), col("tidx")])
        .collect()?;

    let anchored = match policy {
        AnchorPolicy::ExactMatch => events
            .lazy()
            .join(
                anchors.lazy(),
                [col("ticker"), col("event_date")],
                [col("ticker"), col("date")],
                JoinArgs::new(JoinType::Inner),
            )
            .select([
                col("ticker"),
                col("event_date"),
                col("event_type"),
                col("tidx").alias("event_tidx"),
            ])
            .collect()?,
        // the smallest tidx on or after the event date is the next trading
        // day; events past the end of their ticker's history drop out
        AnchorPolicy::NextTradingDay => events
            .lazy()
            .join(
                anchors.lazy(),
                [col("ticker")],
                [col("ticker")],
                JoinArgs::new(JoinType::Inner),
            )
            .filter(col("date").gt_eq(col("event_date")))
            .group_by([col("ticker"), col("event_date"), col("event_type")])
            .agg([col("tidx").min().alias("event_tidx")])
            .collect()?,
    };

    Ok(anchored)
}

/// The contiguous offset column -k..=+k used for the window cross product.
pub fn offset_frame(window: u32) -> Result<DataFrame, StudyError> {
    if window == 0 {
        return Err(StudyError::InvalidWindow(window));
    }
    let k = window as i32;
    let offsets: Vec<i32> = (-k..=k).collect();
    Ok(df!("rel_day" => offsets)?)
}

/// Converts aligned window rows into typed records.
pub fn collect_window_rows(rows: &DataFrame) -> Result<Vec<WindowRow>, StudyError> {
    let tickers = rows.column("ticker")?.str()?;
    let types = rows.column("event_type")?.str()?;
    let rel_days = rows.column("rel_day")?.i32()?;
    let logrets = rows.column("logret")?.f64()?;
    let event_dates: Vec<Option<NaiveDate>> =
        rows.column("event_date")?.date()?.as_date_iter().collect();
    let dates: Vec<Option<NaiveDate>> =
        rows.column("date")?.date()?.as_date_iter().collect();

    let mut out = Vec::with_capacity(rows.height());
    for i in 0..rows.height() {
        let (Some(event_date), Some(date)) = (event_dates[i], dates[i]) else {
            continue;
        };
        out.push(WindowRow {
            ticker: tickers.get(i).unwrap_or("").to_string(),
            event_type: EventType::from_label(types.get(i).unwrap_or("")),
            event_date,
            date,
            rel_day: rel_days.get(i).unwrap_or(0),
            log_return: logrets.get(i),
        });
    }
    Ok(out)
}
