//! Support / resistance from the recent trading range.

use super::tail;

pub const RANGE_WINDOW: usize = 10;

/// (min, max) of the last `min(window, len)` closes; `None` when empty.
pub fn support_resistance(closes: &[f64], window: usize) -> Option<(f64, f64)> {
    let recent = tail(closes, window);
    if recent.is_empty() {
        return None;
    }
    let support = recent.iter().copied().fold(f64::INFINITY, f64::min);
    let resistance = recent.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((support, resistance))
}

/// Where `price` sits between support (0.0) and resistance (1.0).
///
/// 0.5 for a degenerate range; clamped when price is outside the range.
pub fn position_in_range(price: f64, support: f64, resistance: f64) -> f64 {
    let width = resistance - support;
    if width == 0.0 {
        return 0.5;
    }
    ((price - support) / width).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn range_uses_trailing_window() {
        let closes: Vec<f64> = (1..=15).map(f64::from).collect();
        assert_eq!(support_resistance(&closes, RANGE_WINDOW), Some((6.0, 15.0)));
        assert_eq!(support_resistance(&[3.0, 1.0], RANGE_WINDOW), Some((1.0, 3.0)));
        assert_eq!(support_resistance(&[], RANGE_WINDOW), None);
    }

    #[test]
    fn position_in_range_bounds() {
        assert_approx(position_in_range(15.0, 10.0, 20.0), 0.5, DEFAULT_EPSILON);
        assert_eq!(position_in_range(25.0, 10.0, 20.0), 1.0);
        assert_eq!(position_in_range(5.0, 10.0, 20.0), 0.0);
        assert_eq!(position_in_range(12.0, 10.0, 10.0), 0.5);
    }
}
