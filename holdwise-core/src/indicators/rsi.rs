//! Relative Strength Index (RSI) as of the last close.
//!
//! Uses simple (not Wilder-smoothed) averages of the trailing `period` deltas.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Edge cases: fewer than period + 1 closes → 50 (neutral); avg_loss == 0 → 100.

use super::tail;

pub const DEFAULT_RSI_PERIOD: usize = 14;

pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return 50.0;
    }

    let window = tail(closes, period + 1);
    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in window.windows(2) {
        let change = pair[1] - pair[0];
        if change.is_nan() {
            return f64::NAN;
        }
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}
