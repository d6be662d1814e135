//! Unit tests for growth-rate math

use trendwatch::error::MathError;
use trendwatch::models::Threshold;
use trendwatch::signals::math::{
    abs_growth_diff, average_growth_rate, composite_avg, growth_diff_between, growth_rate, ratio,
    weighted_avg,
};

fn approx(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

#[test]
fn test_growth_rate_is_log_difference() {
    let r = growth_rate(110.0, 100.0).unwrap();
    assert!(approx(r, (1.1f64).ln(), 1e-12));
}

#[test]
fn test_growth_rate_rejects_non_positive_values() {
    assert_eq!(growth_rate(0.0, 10.0), Err(MathError::InvalidValue(0.0)));
    assert_eq!(growth_rate(10.0, -2.0), Err(MathError::InvalidValue(-2.0)));
}

#[test]
fn test_average_growth_rate_spans_previous_n_periods() {
    // P_{t-3} = 100, P_{t-1} = 121, so r̄_3 = ln(1.21) / 3
    let window = [100.0, 110.0, 121.0, 130.0];
    let r_bar = average_growth_rate(&window, 3).unwrap();
    assert!(approx(r_bar, (1.21f64).ln() / 3.0, 1e-12));
}

#[test]
fn test_insufficient_history() {
    let window = [10.0, 11.0, 12.0];
    assert_eq!(
        abs_growth_diff(&window, 3),
        Err(MathError::InsufficientHistory {
            needed: 4,
            available: 3
        })
    );
    assert!(matches!(
        abs_growth_diff(&window, 0),
        Err(MathError::InsufficientHistory { .. })
    ));
}

#[test]
fn test_accelerating_series_stays_below_threshold() {
    // P_t = 15.13, P_{t-1} = 10.69, P_{t-3} = 4.11, n = 3; P_{t-2} does not enter.
    let window = [4.11, 7.5, 10.69, 15.13];
    let diff = abs_growth_diff(&window, 3).unwrap();
    assert!(approx(diff, 2.874, 0.05), "diff = {}", diff);
    assert!(!Threshold::Scalar(10.0).is_crossed(diff));
}

#[test]
fn test_abs_growth_diff_sign_follows_direction() {
    let up = abs_growth_diff(&[100.0, 102.0, 104.0, 130.0], 3).unwrap();
    let down = abs_growth_diff(&[100.0, 102.0, 104.0, 80.0], 3).unwrap();
    assert!(approx(up, 21.007, 0.01), "up = {}", up);
    assert!(down < 0.0);
}

#[test]
fn test_abs_growth_diff_skips_non_positive_history() {
    let window = [0.0, 1.0, 2.0, 3.0];
    assert_eq!(abs_growth_diff(&window, 3), Err(MathError::InvalidValue(0.0)));
}

#[test]
fn test_growth_diff_between() {
    assert!(approx(growth_diff_between(12.5, -3.0), 15.5, 1e-12));
    assert!(approx(growth_diff_between(-3.0, 12.5), -15.5, 1e-12));
}

#[test]
fn test_ratio() {
    assert!(approx(ratio(3.0, 2.0).unwrap(), 1.5, 1e-12));
    assert_eq!(ratio(3.0, 0.0), Err(MathError::InvalidValue(0.0)));
}

#[test]
fn test_composite_avg() {
    assert!(approx(composite_avg(&[10.0, -4.0, 3.0]).unwrap(), 3.0, 1e-12));
    assert_eq!(composite_avg(&[]), Err(MathError::EmptyInput));
}

#[test]
fn test_weighted_avg_matches_weighted_sum() {
    let diff_199 = 24.0;
    let diff_273 = -6.5;
    let result = weighted_avg(&[diff_199, diff_273], &[0.6, 0.4]).unwrap();
    assert!(approx(result, 0.6 * diff_199 + 0.4 * diff_273, 1e-12));
}

#[test]
fn test_weighted_avg_is_order_independent() {
    let forward = weighted_avg(&[24.0, -6.5], &[0.6, 0.4]).unwrap();
    let reversed = weighted_avg(&[-6.5, 24.0], &[0.4, 0.6]).unwrap();
    assert!(approx(forward, reversed, 1e-12));
}

#[test]
fn test_weighted_avg_normalizes_by_total_weight() {
    let result = weighted_avg(&[10.0, 20.0], &[3.0, 1.0]).unwrap();
    assert!(approx(result, 12.5, 1e-12));
}

#[test]
fn test_weighted_avg_rejects_mismatched_weights() {
    assert_eq!(
        weighted_avg(&[1.0, 2.0], &[1.0]),
        Err(MathError::WeightCountMismatch {
            indicators: 2,
            weights: 1
        })
    );
    assert_eq!(
        weighted_avg(&[1.0], &[0.5, 0.5]),
        Err(MathError::WeightCountMismatch {
            indicators: 1,
            weights: 2
        })
    );
    assert_eq!(weighted_avg(&[1.0, 2.0], &[0.5, -0.5]), Err(MathError::ZeroWeightSum));
}

#[test]
fn test_threshold_band() {
    let band = Threshold::Band { min: 0.8, max: 1.2 };
    assert!(!band.is_crossed(1.0));
    assert!(band.is_crossed(0.5));
    assert!(band.is_crossed(1.3));
    assert!(Threshold::Scalar(10.0).is_crossed(-10.5));
    assert!(!Threshold::Scalar(10.0).is_crossed(10.0));
}
