//! Simplified MACD.
//!
//! MACD line = EMA(12) - EMA(26) of closes.
//! The signal line is approximated as 0.9 × MACD line rather than an EMA(9)
//! of the MACD series, so the histogram is always 0.1 × MACD and its sign
//! follows the MACD line. Fewer than 26 closes → all zeros, neutral bias.

use serde::{Deserialize, Serialize};

use super::last_ema;

pub const FAST_PERIOD: usize = 12;
pub const SLOW_PERIOD: usize = 26;
pub const SIGNAL_RATIO: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MacdBias {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MacdValues {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
    pub bias: MacdBias,
}

pub fn simplified_macd(closes: &[f64]) -> MacdValues {
    let (Some(fast), Some(slow)) = (last_ema(closes, FAST_PERIOD), last_ema(closes, SLOW_PERIOD)) else {
        return MacdValues::default();
    };

    let line = fast - slow;
    let signal = line * SIGNAL_RATIO;
    let histogram = line - signal;
    let bias = if histogram > 0.0 {
        MacdBias::Bullish
    } else if histogram < 0.0 {
        MacdBias::Bearish
    } else {
        MacdBias::Neutral
    };

    MacdValues {
        line,
        signal,
        histogram,
        bias,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn short_series_is_neutral() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        assert_eq!(simplified_macd(&closes), MacdValues::default());
    }

    #[test]
    fn rising_series_is_bullish() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let m = simplified_macd(&closes);
        assert!(m.line > 0.0);
        assert_approx(m.signal, m.line * 0.9, 1e-12);
        assert_approx(m.histogram, m.line * 0.1, 1e-9);
        assert_eq!(m.bias, MacdBias::Bullish);
    }

    #[test]
    fn falling_series_is_bearish() {
        let closes: Vec<f64> = (0..40).map(|i| 200.0 - i as f64).collect();
        assert_eq!(simplified_macd(&closes).bias, MacdBias::Bearish);
    }

    #[test]
    fn flat_series_is_neutral() {
        let closes = vec![50.0; 30];
        let m = simplified_macd(&closes);
        assert_eq!(m.line, 0.0);
        assert_eq!(m.bias, MacdBias::Neutral);
    }
}
