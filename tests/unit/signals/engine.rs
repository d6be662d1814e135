//! Unit tests for per-indicator reconciliation

use chrono::NaiveDate;
use trendwatch::error::{FetchError, MathError};
use trendwatch::models::{DataPoint, IndicatorSeries, IndicatorState, SeriesMetadata};
use trendwatch::signals::engine::{IndicatorParams, OutcomeStatus, SignalEngine};

const ID: u32 = 6105;
const PARAMS: IndicatorParams = IndicatorParams {
    threshold: 10.0,
    n_periods: 3,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn series(points: &[(u32, f64)]) -> IndicatorSeries {
    IndicatorSeries::new(
        ID,
        points.iter().map(|(d, v)| DataPoint::new(day(*d), *v)).collect(),
    )
    .with_metadata(SeriesMetadata {
        name: "DRAM Spot".to_string(),
        unit: "USD".to_string(),
        freq: "D".to_string(),
    })
}

fn seeded_state() -> IndicatorState {
    let outcome = SignalEngine::reconcile(
        ID,
        Ok(series(&[(1, 100.0), (2, 102.0), (3, 104.0)])),
        None,
        PARAMS,
        4,
    );
    outcome.state.expect("seeded state")
}

#[test]
fn test_first_run_seeds_without_alerting() {
    let outcome = SignalEngine::reconcile(
        ID,
        Ok(series(&[(1, 1.0), (2, 2.0), (3, 50.0), (4, 5000.0), (5, 900000.0)])),
        None,
        PARAMS,
        4,
    );

    assert_eq!(outcome.status, OutcomeStatus::Seeded);
    assert!(outcome.results.is_empty());
    let state = outcome.state.unwrap();
    assert_eq!(state.last_check_date, day(5));
    assert_eq!(state.history.len(), 4);
    assert_eq!(state.history.first().unwrap().date, day(2));
    assert_eq!(state.metadata.name, "DRAM Spot");
}

#[test]
fn test_unchanged_latest_date_is_no_new_data() {
    let prior = seeded_state();
    let outcome = SignalEngine::reconcile(
        ID,
        Ok(series(&[(1, 100.0), (2, 102.0), (3, 104.0)])),
        Some(prior.clone()),
        PARAMS,
        4,
    );

    assert_eq!(outcome.status, OutcomeStatus::NoNewData);
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.state, Some(prior));
}

#[test]
fn test_older_fetch_never_regresses_state() {
    let prior = seeded_state();
    let outcome = SignalEngine::reconcile(
        ID,
        Ok(series(&[(1, 100.0), (2, 250.0)])),
        Some(prior.clone()),
        PARAMS,
        4,
    );

    assert_eq!(
        outcome.status,
        OutcomeStatus::Regressed {
            fetched: day(2),
            stored: day(3)
        }
    );
    assert_eq!(outcome.state, Some(prior));
    assert!(outcome.results.is_empty());
}

#[test]
fn test_new_datapoint_above_threshold_triggers() {
    let outcome = SignalEngine::reconcile(
        ID,
        Ok(series(&[(1, 100.0), (2, 102.0), (3, 104.0), (4, 130.0)])),
        Some(seeded_state()),
        PARAMS,
        4,
    );

    assert_eq!(outcome.status, OutcomeStatus::NewData { count: 1 });
    let result = outcome.latest_result().unwrap();
    assert!(result.triggered);
    assert!((result.statistic - 21.007).abs() < 0.01);
    assert_eq!(result.value, 130.0);
    assert_eq!(result.date, day(4));
    assert_eq!(result.unit, "USD");

    let state = outcome.state.unwrap();
    assert_eq!(state.last_check_date, day(4));
    assert_eq!(state.history.last().unwrap().value, 130.0);
}

#[test]
fn test_new_datapoint_below_threshold_does_not_trigger() {
    let outcome = SignalEngine::reconcile(
        ID,
        Ok(series(&[(1, 100.0), (2, 102.0), (3, 104.0), (4, 106.0)])),
        Some(seeded_state()),
        PARAMS,
        4,
    );

    assert!(outcome.has_new_data());
    assert_eq!(outcome.triggered().count(), 0);
    assert_eq!(outcome.results.len(), 1);
}

#[test]
fn test_backlog_is_processed_in_order() {
    let outcome = SignalEngine::reconcile(
        ID,
        Ok(series(&[
            (1, 100.0),
            (2, 102.0),
            (3, 104.0),
            (4, 106.0),
            (5, 160.0),
        ])),
        Some(seeded_state()),
        PARAMS,
        4,
    );

    assert_eq!(outcome.status, OutcomeStatus::NewData { count: 2 });
    let dates: Vec<_> = outcome.results.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![day(4), day(5)]);
    assert!(!outcome.results[0].triggered);
    assert!(outcome.results[1].triggered);
    assert_eq!(outcome.state.unwrap().last_check_date, day(5));
}

#[test]
fn test_history_never_exceeds_cap() {
    let mut state = seeded_state();
    let mut points: Vec<(u32, f64)> = vec![(1, 100.0), (2, 102.0), (3, 104.0)];

    for d in 4..=28 {
        points.push((d, 100.0 + d as f64));
        let outcome = SignalEngine::reconcile(ID, Ok(series(&points)), Some(state), PARAMS, 4);
        state = outcome.state.unwrap();
        assert!(state.history.len() <= 4);
        assert_eq!(state.last_check_date, day(d));
        assert!(state.history.windows(2).all(|w| w[0].date < w[1].date));
    }
}

#[test]
fn test_cap_is_raised_to_fit_lookback() {
    let outcome = SignalEngine::reconcile(
        ID,
        Ok(series(&[(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0), (5, 5.0)])),
        None,
        PARAMS,
        1,
    );
    assert_eq!(outcome.state.unwrap().history.len(), 4);
}

#[test]
fn test_fetch_failure_keeps_prior_state() {
    let prior = seeded_state();
    let outcome = SignalEngine::reconcile(
        ID,
        Err(FetchError::Other("connection reset".to_string())),
        Some(prior.clone()),
        PARAMS,
        4,
    );

    assert!(outcome.is_failure());
    assert!(!outcome.is_available());
    assert_eq!(outcome.state, Some(prior));
}

#[test]
fn test_empty_series_is_soft_failure() {
    let outcome = SignalEngine::reconcile(ID, Ok(series(&[])), None, PARAMS, 4);
    assert_eq!(outcome.status, OutcomeStatus::Empty);
    assert!(outcome.state.is_none());
}

#[test]
fn test_non_positive_value_is_skipped_but_recorded() {
    let outcome = SignalEngine::reconcile(
        ID,
        Ok(series(&[(1, 100.0), (2, 102.0), (3, 104.0), (4, -1.0)])),
        Some(seeded_state()),
        PARAMS,
        4,
    );

    assert!(outcome.results.is_empty());
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].reason, MathError::InvalidValue(-1.0));
    assert_eq!(outcome.state.unwrap().last_check_date, day(4));
}

#[test]
fn test_short_history_is_not_yet_computable() {
    let seeded = SignalEngine::reconcile(ID, Ok(series(&[(1, 100.0)])), None, PARAMS, 4)
        .state
        .unwrap();
    let outcome = SignalEngine::reconcile(
        ID,
        Ok(series(&[(1, 100.0), (2, 300.0)])),
        Some(seeded),
        PARAMS,
        4,
    );

    assert!(outcome.results.is_empty());
    assert!(matches!(
        outcome.skipped[0].reason,
        MathError::InsufficientHistory { .. }
    ));
}
