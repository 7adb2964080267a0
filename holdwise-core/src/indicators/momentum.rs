//! Three-versus-three momentum.
//!
//! momentum% = (mean(last 3) - mean(preceding 3)) / mean(preceding 3) × 100
//! Needs at least six closes.

use super::mean;

pub const MOMENTUM_MIN_POINTS: usize = 6;

/// `None` with fewer than six closes or a non-positive earlier mean.
pub fn three_point_momentum_pct(closes: &[f64]) -> Option<f64> {
    let n = closes.len();
    if n < MOMENTUM_MIN_POINTS {
        return None;
    }
    let recent = mean(&closes[n - 3..]);
    let earlier = mean(&closes[n - 6..n - 3]);
    if earlier <= 0.0 {
        return None;
    }
    Some((recent - earlier) / earlier * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn known_value() {
        // earlier mean 100, recent mean 110 → +10%
        let closes = [99.0, 100.0, 101.0, 109.0, 110.0, 111.0];
        assert_approx(three_point_momentum_pct(&closes).unwrap(), 10.0, DEFAULT_EPSILON);
    }

    #[test]
    fn uses_last_six_only() {
        let closes = [1.0, 1.0, 99.0, 100.0, 101.0, 89.0, 90.0, 91.0];
        assert_approx(three_point_momentum_pct(&closes).unwrap(), -10.0, DEFAULT_EPSILON);
    }

    #[test]
    fn needs_six_points() {
        assert_eq!(three_point_momentum_pct(&[1.0, 2.0, 3.0, 4.0, 5.0]), None);
    }
}
