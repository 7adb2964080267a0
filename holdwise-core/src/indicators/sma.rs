//! Simple moving averages over trailing windows.
//!
//! Windows longer than the series are clipped to the series length, so a
//! two-point series still reports an "sma_20" (the mean of both points).

use std::collections::BTreeMap;

use super::{mean, tail};

/// Trailing windows reported in every signal bundle.
pub const MA_WINDOWS: [usize; 5] = [3, 5, 7, 10, 20];

/// Mean of the last `min(period, len)` closes. NaN for an empty slice.
pub fn trailing_mean(closes: &[f64], period: usize) -> f64 {
    if closes.is_empty() || period == 0 {
        return f64::NAN;
    }
    mean(tail(closes, period))
}

/// Moving averages keyed `sma_{k}` for each of [`MA_WINDOWS`].
///
/// Empty for an empty series.
pub fn moving_averages(closes: &[f64]) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    if closes.is_empty() {
        return out;
    }
    for k in MA_WINDOWS {
        out.insert(format!("sma_{k}"), trailing_mean(closes, k));
    }
    out
}
