//! Scalar indicators over a slice of closing prices.
//!
//! Every function takes closes in date order and returns the value as of the
//! last close. Short inputs produce a documented neutral value rather than
//! an error; NaN inputs propagate so the signal layer can detect them.

pub mod ema;
pub mod macd;
pub mod momentum;
pub mod range;
pub mod regression;
pub mod rsi;
pub mod sma;
pub mod volatility;

pub use ema::{ema_of_series, last_ema};
pub use macd::{simplified_macd, MacdValues};
pub use momentum::three_point_momentum_pct;
pub use range::{position_in_range, support_resistance};
pub use regression::least_squares_slope;
pub use rsi::rsi;
pub use sma::{moving_averages, trailing_mean, MA_WINDOWS};
pub use volatility::{annualize, pct_returns, return_volatility, ANNUALIZATION_FACTOR};

/// Arithmetic mean; 0.0 for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1); 0.0 for fewer than two values.
pub(crate) fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Population standard deviation (n); 0.0 for an empty slice.
pub(crate) fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Last `n` values of a slice (all of it when shorter).
pub(crate) fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_std_edge_cases() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(sample_std_dev(&[5.0]), 0.0);
        assert_eq!(population_std_dev(&[]), 0.0);
    }

    #[test]
    fn std_variants_differ_by_denominator() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_approx(population_std_dev(&v), 2.0, DEFAULT_EPSILON);
        assert_approx(sample_std_dev(&v), (32.0_f64 / 7.0).sqrt(), DEFAULT_EPSILON);
    }

    #[test]
    fn tail_clips_to_length() {
        let v = [1.0, 2.0, 3.0];
        assert_eq!(tail(&v, 2), &[2.0, 3.0]);
        assert_eq!(tail(&v, 10), &[1.0, 2.0, 3.0]);
    }
}
