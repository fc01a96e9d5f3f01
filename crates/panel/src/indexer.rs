use polars::prelude::*;

use crate::error::PanelError;

/// Sorts the panel by (ticker, date) and annotates every row with a dense,
/// ticker-local trading-day index.
///
/// This is the single entry point for turning a raw observation table into
/// the indexed panel: it sorts, derives log returns when the source lacks
/// them, and assigns `tidx`. Idempotent for a fixed input set.
pub fn index_panel(df: DataFrame) -> Result<DataFrame, PanelError> {
    let df = df.sort(["ticker", "date"], vec![false, false], false)?;
    let df = ensure_log_returns(df)?;
    assign_trading_index(df)
}

/// Assigns each ticker a 0-based `tidx` column by enumerating its rows.
///
/// Expects (ticker, date)-sorted input. Calendar gaps are deliberately
/// ignored: a Friday-to-Monday jump gets consecutive indices, so downstream
/// windows are measured in trading days rather than calendar days.
pub fn assign_trading_index(df: DataFrame) -> Result<DataFrame, PanelError> {
    let tidx = {
        let tickers = df.column("ticker")?.str()?;
        let mut out: Vec<i64> = Vec::with_capacity(df.height());
        let mut prev: Option<&str> = None;
        let mut next = 0i64;
        for opt in tickers.into_iter() {
            let ticker =
                opt.ok_or_else(|| PanelError::Schema("null ticker in panel".to_string()))?;
            if prev != Some(ticker) {
                next = 0;
                prev = Some(ticker);
            }
            out.push(next);
            next += 1;
        }
        out
    };

    let mut df = df;
    df.with_column(Series::new("tidx", tidx))?;
    Ok(df)
}

/// Makes sure the panel carries a `logret` column, deriving
/// `ln(close_t / close_{t-1})` per ticker from `close` when it does not.
///
/// Expects (ticker, date)-sorted input; the first row of each ticker gets a
/// null return.
pub fn ensure_log_returns(df: DataFrame) -> Result<DataFrame, PanelError> {
    let names = df.get_column_names();
    if names.contains(&"logret") {
        return Ok(df);
    }
    if !names.contains(&"close") {
        return Err(PanelError::MissingColumn(
            "logret (or close to derive it from)".to_string(),
        ));
    }

    let logret = {
        let tickers = df.column("ticker")?.str()?;
        let closes = df.column("close")?.f64()?;
        let mut out: Vec<Option<f64>> = Vec::with_capacity(df.height());
        let mut prev_ticker: Option<&str> = None;
        let mut prev_close: Option<f64> = None;
        for (ticker, close) in tickers.into_iter().zip(closes.into_iter()) {
            let same_ticker = ticker.is_some() && ticker == prev_ticker;
            let value = match (same_ticker, prev_close, close) {
                (true, Some(prev), Some(cur)) if prev > 0.0 && cur > 0.0 => {
                    Some((cur / prev).ln())
                }
                _ => None,
            };
            out.push(value);
            prev_ticker = ticker;
            prev_close = close;
        }
        out
    };

    let mut df = df;
    df.with_column(Series::new("logret", logret))?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn raw_panel() -> DataFrame {
        // deliberately unsorted, two tickers interleaved
        let tickers = vec!["BBB", "AAA", "BBB", "AAA", "AAA"];
        let dates = vec![day(12), day(11), day(10), day(10), day(12)];
        let closes = vec![Some(50.0), Some(110.0), Some(48.0), Some(100.0), Some(121.0)];
        DataFrame::new(vec![
            Series::new("ticker", tickers),
            DateChunked::from_naive_date("date", dates).into_series(),
            Series::new("close", closes),
        ])
        .unwrap()
    }

    #[test]
    fn tidx_starts_at_zero_and_is_contiguous_per_ticker() {
        let indexed = index_panel(raw_panel()).unwrap();
        let tickers = indexed.column("ticker").unwrap().str().unwrap();
        let tidx = indexed.column("tidx").unwrap().i64().unwrap();

        let mut prev: Option<(&str, i64)> = None;
        for i in 0..indexed.height() {
            let ticker = tickers.get(i).unwrap();
            let idx = tidx.get(i).unwrap();
            match prev {
                Some((p, pidx)) if p == ticker => assert_eq!(idx, pidx + 1),
                _ => assert_eq!(idx, 0),
            }
            prev = Some((ticker, idx));
        }
    }

    #[test]
    fn calendar_gaps_get_consecutive_indices() {
        // AAA has rows on the 10th, 11th, 12th; the gap to BBB's 10th does
        // not matter, and a weekend-sized gap within a ticker would not either.
        let indexed = index_panel(raw_panel()).unwrap();
        let aaa = indexed
            .clone()
            .lazy()
            .filter(col("ticker").eq(lit("AAA")))
            .collect()
            .unwrap();
        let tidx: Vec<i64> = aaa
            .column("tidx")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(tidx, vec![0, 1, 2]);
    }

    #[test]
    fn log_returns_derived_from_close_when_missing() {
        let indexed = index_panel(raw_panel()).unwrap();
        let aaa = indexed
            .lazy()
            .filter(col("ticker").eq(lit("AAA")))
            .collect()
            .unwrap();
        let logret = aaa.column("logret").unwrap().f64().unwrap();

        // first row per ticker has no previous close
        assert!(logret.get(0).is_none());
        assert!((logret.get(1).unwrap() - (110.0f64 / 100.0).ln()).abs() < 1e-12);
        assert!((logret.get(2).unwrap() - (121.0f64 / 110.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn existing_log_returns_are_left_alone() {
        let df = DataFrame::new(vec![
            Series::new("ticker", vec!["AAA", "AAA"]),
            DateChunked::from_naive_date("date", vec![day(10), day(11)]).into_series(),
            Series::new("close", vec![Some(100.0), Some(110.0)]),
            Series::new("logret", vec![None, Some(0.5)]),
        ])
        .unwrap();
        let indexed = index_panel(df).unwrap();
        let logret = indexed.column("logret").unwrap().f64().unwrap();
        assert_eq!(logret.get(1), Some(0.5));
    }

    #[test]
    fn reindexing_is_idempotent() {
        let once = index_panel(raw_panel()).unwrap();
        let twice = index_panel(once.clone()).unwrap();
        assert_eq!(once.height(), twice.height());
        let a: Vec<i64> =
            once.column("tidx").unwrap().i64().unwrap().into_iter().flatten().collect();
        let b: Vec<i64> =
            twice.column("tidx").unwrap().i64().unwrap().into_iter().flatten().collect();
        assert_eq!(a, b);
    }
}
