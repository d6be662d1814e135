//! Growth-rate statistics
//!
//! All statistics are expressed in percentage points: the fractional log
//! difference `r_t - r̄_n` is only an intermediate value and is always scaled
//! by 100 before it leaves this module. Absolute (not relative) differences
//! keep the scale stable when the historical average approaches zero.
//!
//! A `window` is a chronological slice of values whose last element is the
//! current datapoint `P_t`.

use crate::error::MathError;

/// `ln(p_now) - ln(p_prev)`
pub fn growth_rate(p_now: f64, p_prev: f64) -> Result<f64, MathError> {
    Ok(checked_ln(p_now)? - checked_ln(p_prev)?)
}

/// Average single-period growth over the `n` periods ending at `P_{t-1}`:
/// `r̄_n = (1/n) × [ln(P_{t-1}) - ln(P_{t-n})]`.
///
/// Needs `n + 1` values (current plus `n` prior).
pub fn average_growth_rate(window: &[f64], n: usize) -> Result<f64, MathError> {
    require_history(window, n)?;
    let len = window.len();
    let p_prev = window[len - 2];
    let p_t_minus_n = window[len - 1 - n];

    Ok(growth_rate(p_prev, p_t_minus_n)? / n as f64)
}

/// Single-indicator statistic: `(r_t - r̄_n) × 100`
pub fn abs_growth_diff(window: &[f64], n: usize) -> Result<f64, MathError> {
    require_history(window, n)?;
    let len = window.len();
    let r_t = growth_rate(window[len - 1], window[len - 2])?;
    let r_bar = average_growth_rate(window, n)?;

    Ok((r_t - r_bar) * 100.0)
}

/// Divergence of two indicators' statistics, `a - b`, in percentage points.
pub fn growth_diff_between(a: f64, b: f64) -> f64 {
    a - b
}

/// Level comparison of two latest values.
pub fn ratio(a_value: f64, b_value: f64) -> Result<f64, MathError> {
    if b_value == 0.0 || !b_value.is_finite() {
        return Err(MathError::InvalidValue(b_value));
    }
    let quotient = a_value / b_value;
    if !quotient.is_finite() {
        return Err(MathError::InvalidValue(a_value));
    }
    Ok(quotient)
}

/// Unweighted mean of several statistics.
pub fn composite_avg(statistics: &[f64]) -> Result<f64, MathError> {
    if statistics.is_empty() {
        return Err(MathError::EmptyInput);
    }
    Ok(statistics.iter().sum::<f64>() / statistics.len() as f64)
}

/// Weighted mean `Σ wᵢxᵢ / Σ wᵢ`. Weights that already sum to 1 give the
/// plain weighted sum.
pub fn weighted_avg(statistics: &[f64], weights: &[f64]) -> Result<f64, MathError> {
    if statistics.len() != weights.len() {
        return Err(MathError::WeightCountMismatch {
            indicators: statistics.len(),
            weights: weights.len(),
        });
    }
    if statistics.is_empty() {
        return Err(MathError::EmptyInput);
    }

    let total_weight: f64 = weights.iter().sum();
    if total_weight.abs() < f64::EPSILON {
        return Err(MathError::ZeroWeightSum);
    }

    let weighted_sum: f64 = statistics
        .iter()
        .zip(weights)
        .map(|(value, weight)| value * weight)
        .sum();

    Ok(weighted_sum / total_weight)
}

fn checked_ln(value: f64) -> Result<f64, MathError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(MathError::InvalidValue(value));
    }
    Ok(value.ln())
}

fn require_history(window: &[f64], n: usize) -> Result<(), MathError> {
    let needed = n.max(1) + 1;
    if n == 0 || window.len() < needed {
        return Err(MathError::InsufficientHistory {
            needed,
            available: window.len(),
        });
    }
    Ok(())
}
