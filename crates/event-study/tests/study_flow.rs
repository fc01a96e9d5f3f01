//! End-to-end flow from typed observations through a session to a report.

use chrono::NaiveDate;
use core_types::{AnchorPolicy, ConfidencePolicy, DailyObservation};
use event_catalog::EventFilter;
use event_study::{StudyError, StudyRequest, StudySession};
use panel::DataContext;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

fn obs(ticker: &str, date: NaiveDate, logret: Option<f64>) -> DailyObservation {
    DailyObservation {
        ticker: ticker.to_string(),
        date,
        close: None,
        log_return: logret,
        sector: Some("Tech".to_string()),
        filing_form: None,
        is_split_day: false,
        is_reverse_split_day: false,
    }
}

/// AAA carries returns 0.01, -0.02, 0.03, 0.00, 0.01 on five consecutive
/// trading days (Mon 2025-01-06 .. Fri 2025-01-10) with a 10-Q filed on the
/// middle day; BBB adds an overlapping filing+split pair.
fn session() -> StudySession {
    let returns = [0.01, -0.02, 0.03, 0.00, 0.01];
    let mut rows: Vec<DailyObservation> = returns
        .iter()
        .enumerate()
        .map(|(i, r)| obs("AAA", day(6 + i as u32), Some(*r)))
        .collect();
    rows[2].filing_form = Some("10-Q".to_string());

    for i in 0..5 {
        let mut row = obs("BBB", day(6 + i as u32), Some(0.001 * i as f64));
        if i == 2 {
            row.filing_form = Some("8-K".to_string());
            row.is_split_day = true;
        }
        rows.push(row);
    }

    let ctx = DataContext::from_observations(&rows).unwrap();
    StudySession::open(ctx).unwrap()
}

#[test]
fn single_event_study_reproduces_the_raw_returns() {
    let session = session();
    let request = StudyRequest::new(
        EventFilter {
            event_types: vec!["10-Q".to_string()],
            ..EventFilter::default()
        },
        1,
    );
    let output = session.run(&request).unwrap();
    let report = &output.report;

    assert_eq!(report.summary.requested_events, 1);
    assert_eq!(report.summary.matched_events, 1);
    assert_eq!(report.summary.window_rows, 3);
    assert_eq!(report.summary.min_rows_per_offset, 1);
    assert_eq!(report.summary.max_rows_per_offset, 1);

    let offsets: Vec<i32> = report.stats.iter().map(|s| s.rel_day).collect();
    assert_eq!(offsets, vec![-1, 0, 1]);
    let means: Vec<f64> = report.stats.iter().map(|s| s.mean).collect();
    assert_eq!(means, vec![-0.02, 0.03, 0.00]);
    for s in &report.stats {
        assert_eq!(s.n, 1);
    }

    let car: Vec<f64> = report.car.iter().map(|c| c.car).collect();
    assert!((car[0] - (-0.02)).abs() < 1e-12);
    assert!((car[1] - 0.01).abs() < 1e-12);
    assert!((car[2] - 0.01).abs() < 1e-12);

    for point in &report.car {
        assert!((point.car_pct - (point.car.exp() - 1.0)).abs() < 1e-12);
    }
}

#[test]
fn day_zero_rows_carry_the_event_date() {
    let session = session();
    let request = StudyRequest::new(
        EventFilter {
            event_types: vec!["10-Q".to_string()],
            ..EventFilter::default()
        },
        2,
    );
    let output = session.run(&request).unwrap();
    let rows = output.window_rows().unwrap();
    let zero = rows.iter().find(|r| r.rel_day == 0).unwrap();
    assert_eq!(zero.date, zero.event_date);
}

#[test]
fn overlap_exclusion_empties_the_co_occurring_pair() {
    let session = session();
    let request = StudyRequest::new(
        EventFilter {
            tickers: vec!["BBB".to_string()],
            exclude_overlaps: true,
            ..EventFilter::default()
        },
        1,
    );
    let output = session.run(&request).unwrap();
    assert!(output.report.summary.is_empty());
    assert_eq!(output.report.summary.requested_events, 0);
    assert_eq!(output.windows.height(), 0);
}

#[test]
fn unmatched_filters_yield_the_no_events_state_not_an_error() {
    let session = session();
    let request = StudyRequest::new(
        EventFilter {
            event_types: vec!["S-1".to_string()],
            ..EventFilter::default()
        },
        5,
    );
    let output = session.run(&request).unwrap();
    assert!(output.report.summary.is_empty());
    assert!(output.report.stats.is_empty());
    assert!(output.report.car.is_empty());
}

#[test]
fn zero_window_is_rejected_up_front() {
    let session = session();
    let request = StudyRequest::new(EventFilter::default(), 0);
    assert!(matches!(
        session.run(&request),
        Err(StudyError::InvalidWindow(0))
    ));
}

#[test]
fn per_ticker_variant_only_sees_its_tickers() {
    let session = session();
    let request = StudyRequest::new(
        EventFilter {
            tickers: vec!["bbb".to_string()],
            ..EventFilter::default()
        },
        1,
    );
    let output = session.run(&request).unwrap();
    let rows = output.window_rows().unwrap();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|r| r.ticker == "BBB"));
    // the overlapping pair contributes two events anchored on the same day
    assert_eq!(output.report.summary.matched_events, 2);
}

#[test]
fn policies_are_selectable_per_request() {
    let session = session();
    let mut request = StudyRequest::new(
        EventFilter {
            event_types: vec!["10-Q".to_string()],
            ..EventFilter::default()
        },
        1,
    );
    request.anchor = AnchorPolicy::NextTradingDay;
    request.confidence = ConfidencePolicy::Naive;

    // with every event date on a trading day, roll-forward matches exactly
    let output = session.run(&request).unwrap();
    assert_eq!(output.report.summary.matched_events, 1);

    // n = 1 everywhere, so both band policies collapse onto CAR
    for point in &output.report.car {
        assert_eq!(point.lower, point.car);
        assert_eq!(point.upper, point.car);
    }
}
