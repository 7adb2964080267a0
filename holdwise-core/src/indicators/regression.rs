//! Ordinary least-squares slope of a price series against its index.

use super::mean;

/// Slope in price units per period; 0.0 for fewer than two points.
pub fn least_squares_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }

    if den == 0.0 {
        return 0.0;
    }
    num / den
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn perfect_line() {
        assert_approx(least_squares_slope(&[1.0, 3.0, 5.0, 7.0]), 2.0, DEFAULT_EPSILON);
        assert_approx(least_squares_slope(&[10.0, 9.0, 8.0]), -1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_and_short() {
        assert_eq!(least_squares_slope(&[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(least_squares_slope(&[5.0]), 0.0);
        assert_eq!(least_squares_slope(&[]), 0.0);
    }

    #[test]
    fn noisy_series_slope() {
        // y = 1, 2, 2, 4 → x̄ = 1.5, ȳ = 2.25
        // num = (-1.5)(-1.25) + (-0.5)(-0.25) + (0.5)(-0.25) + (1.5)(1.75) = 4.5, den = 5
        assert_approx(least_squares_slope(&[1.0, 2.0, 2.0, 4.0]), 0.9, DEFAULT_EPSILON);
    }
}
