//! Technical signal computer: one price series in, one signal bundle out.
//!
//! Signals are recomputed on every analysis and never cached. Series with
//! fewer than three points yield the neutral bundle. A numeric failure inside
//! one ticker (non-finite input or output) is reported as [`SignalError`];
//! [`compute_all`] logs it and substitutes the neutral bundle so the rest of
//! the batch is unaffected.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::config::SignalProfile;
use crate::domain::{Position, PriceSeries};
use crate::indicators::{
    annualize, least_squares_slope, moving_averages, position_in_range, return_volatility, rsi,
    simplified_macd, support_resistance, tail, three_point_momentum_pct, MacdValues,
};
use crate::indicators::range::RANGE_WINDOW;
use crate::indicators::rsi::DEFAULT_RSI_PERIOD;

/// Fewer points than this yields the neutral bundle.
pub const MIN_SIGNAL_POINTS: usize = 3;

/// Points used for the short-term momentum regression.
const SHORT_TERM_WINDOW: usize = 5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    #[error("current price {0} is not a positive finite number")]
    InvalidCurrentPrice(f64),
    #[error("close at index {index} is not finite")]
    NonFiniteClose { index: usize },
    #[error("indicator `{0}` produced a non-finite value")]
    NonFiniteResult(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    #[default]
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Momentum {
    fn from_value(value: f64, band: f64) -> Self {
        if value > band {
            Self::Positive
        } else if value < -band {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

/// Per-ticker bundle of technical indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSignals {
    pub data_points: usize,
    /// True when the bundle is the neutral fallback.
    pub insufficient_data: bool,
    pub trend: TrendDirection,
    pub trend_slope: f64,
    pub momentum: Momentum,
    /// Three-versus-three momentum in percent; `None` below six points.
    pub momentum_pct: Option<f64>,
    /// Sign of the five-point regression slope.
    pub short_term_momentum: Momentum,
    /// Std-dev of % returns over the profile's window.
    pub volatility: f64,
    pub annualized_volatility: f64,
    pub moving_averages: BTreeMap<String, f64>,
    pub support: f64,
    pub resistance: f64,
    pub position_in_range: f64,
    pub rsi: f64,
    pub macd: MacdValues,
}

impl TechnicalSignals {
    /// Neutral bundle: flat, no momentum, zero volatility, RSI 50, range centred on price.
    pub fn neutral(current_price: f64, data_points: usize) -> Self {
        Self {
            data_points,
            insufficient_data: true,
            trend: TrendDirection::Flat,
            trend_slope: 0.0,
            momentum: Momentum::Neutral,
            momentum_pct: None,
            short_term_momentum: Momentum::Neutral,
            volatility: 0.0,
            annualized_volatility: 0.0,
            moving_averages: BTreeMap::new(),
            support: current_price,
            resistance: current_price,
            position_in_range: 0.5,
            rsi: 50.0,
            macd: MacdValues::default(),
        }
    }
}

/// Compute the signal bundle for one ticker.
pub fn compute_signals(
    series: &PriceSeries,
    current_price: f64,
    profile: &SignalProfile,
) -> Result<TechnicalSignals, SignalError> {
    if !current_price.is_finite() || current_price <= 0.0 {
        return Err(SignalError::InvalidCurrentPrice(current_price));
    }

    let closes = series.closes();
    if let Some(index) = closes.iter().position(|c| !c.is_finite()) {
        return Err(SignalError::NonFiniteClose { index });
    }
    if closes.len() < MIN_SIGNAL_POINTS {
        return Ok(TechnicalSignals::neutral(current_price, closes.len()));
    }

    let trend_slope = least_squares_slope(tail(&closes, profile.trend_window));
    let trend = if trend_slope > profile.trend_threshold {
        TrendDirection::Up
    } else if trend_slope < -profile.trend_threshold {
        TrendDirection::Down
    } else {
        TrendDirection::Flat
    };

    let momentum_pct = three_point_momentum_pct(&closes);
    let momentum = momentum_pct
        .map(|m| Momentum::from_value(m, profile.momentum_band_pct))
        .unwrap_or_default();
    let short_term_momentum =
        Momentum::from_value(least_squares_slope(tail(&closes, SHORT_TERM_WINDOW)), 0.0);

    let volatility = return_volatility(&closes, profile.volatility_window);
    let (support, resistance) =
        support_resistance(&closes, RANGE_WINDOW).unwrap_or((current_price, current_price));

    let signals = TechnicalSignals {
        data_points: closes.len(),
        insufficient_data: false,
        trend,
        trend_slope,
        momentum,
        momentum_pct,
        short_term_momentum,
        volatility,
        annualized_volatility: annualize(volatility),
        moving_averages: moving_averages(&closes),
        support,
        resistance,
        position_in_range: position_in_range(current_price, support, resistance),
        rsi: rsi(&closes, DEFAULT_RSI_PERIOD),
        macd: simplified_macd(&closes),
    };
    check_finite(&signals)?;
    Ok(signals)
}

fn check_finite(s: &TechnicalSignals) -> Result<(), SignalError> {
    let scalars = [
        ("trend_slope", s.trend_slope),
        ("volatility", s.volatility),
        ("support", s.support),
        ("resistance", s.resistance),
        ("position_in_range", s.position_in_range),
        ("rsi", s.rsi),
        ("macd", s.macd.line),
        ("momentum", s.momentum_pct.unwrap_or(0.0)),
    ];
    for (name, value) in scalars {
        if !value.is_finite() {
            return Err(SignalError::NonFiniteResult(name));
        }
    }
    if s.moving_averages.values().any(|v| !v.is_finite()) {
        return Err(SignalError::NonFiniteResult("moving_averages"));
    }
    Ok(())
}

/// Signals for one ticker, falling back to the neutral bundle on failure.
pub fn signals_or_neutral(
    ticker: &str,
    series: Option<&PriceSeries>,
    current_price: f64,
    profile: &SignalProfile,
) -> TechnicalSignals {
    let Some(series) = series else {
        tracing::debug!(ticker, "no price history; using neutral signals");
        return TechnicalSignals::neutral(current_price, 0);
    };
    match compute_signals(series, current_price, profile) {
        Ok(signals) => signals,
        Err(err) => {
            tracing::warn!(ticker, error = %err, "signal computation failed; using neutral signals");
            TechnicalSignals::neutral(current_price, series.len())
        }
    }
}

/// Signals for every position, keyed by ticker.
pub fn compute_all(
    positions: &[Position],
    history: &HashMap<String, PriceSeries>,
    profile: &SignalProfile,
) -> HashMap<String, TechnicalSignals> {
    positions
        .iter()
        .map(|p| {
            let signals =
                signals_or_neutral(&p.ticker, history.get(&p.ticker), p.current_price, profile);
            (p.ticker.clone(), signals)
        })
        .collect()
}
