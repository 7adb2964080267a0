//! Return volatility: standard deviation of period-over-period % returns.

use super::{sample_std_dev, tail};

/// Trading periods per year used to annualize a per-period volatility.
pub const ANNUALIZATION_FACTOR: f64 = 252.0;

/// Period-over-period returns in percent units (5.0 = +5%).
///
/// A non-positive previous close yields a 0.0 return for that step.
pub fn pct_returns(closes: &[f64]) -> Vec<f64> {
    if closes.len() < 2 {
        return Vec::new();
    }
    closes
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 {
                (w[1] - w[0]) / w[0] * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Sample std-dev of % returns across the last `window` closes.
///
/// 0.0 when fewer than three closes are available (one return has no spread).
pub fn return_volatility(closes: &[f64], window: usize) -> f64 {
    let recent = tail(closes, window.max(2));
    if recent.len() < 3 {
        return 0.0;
    }
    sample_std_dev(&pct_returns(recent))
}

/// Per-period volatility scaled to a yearly figure (× √252).
pub fn annualize(volatility: f64) -> f64 {
    volatility * ANNUALIZATION_FACTOR.sqrt()
}
