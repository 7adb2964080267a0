//! Position classifier and risk scorer.
//!
//! Fills in the two computed fields of each position: its share of total
//! invested value and a 0–10 risk score driven by holding age, P&L, and the
//! historical volatility over the bucket's lookback.

use std::collections::HashMap;

use crate::config::PolicyConfig;
use crate::domain::{Position, PriceSeries, TimeframeBucket};
use crate::indicators::return_volatility;

pub const BASE_RISK_SCORE: f64 = 5.0;
pub const MAX_RISK_SCORE: f64 = 10.0;

/// Copy of `positions` with `position_size_pct` and `risk_score` filled in.
pub fn classify_positions(
    positions: &[Position],
    history: &HashMap<String, PriceSeries>,
    policy: &PolicyConfig,
) -> Vec<Position> {
    let total: f64 = positions.iter().map(|p| p.current_value).sum();

    positions
        .iter()
        .map(|p| {
            let mut classified = p.clone();
            classified.position_size_pct = size_fraction(p.current_value, total);
            let volatility = lookback_volatility(p, history.get(&p.ticker));
            classified.risk_score = risk_score(p, volatility, policy.high_volatility_pct);
            classified
        })
        .collect()
}

/// Share of `total`; 0.0 when the total is not positive.
pub fn size_fraction(value: f64, total: f64) -> f64 {
    if total > 0.0 {
        value / total
    } else {
        0.0
    }
}

/// Return volatility (percent) over the bucket's calendar-day lookback.
///
/// 0.0 without history or when the result is not finite.
pub fn lookback_volatility(position: &Position, series: Option<&PriceSeries>) -> f64 {
    let Some(series) = series else {
        return 0.0;
    };
    let closes = series.closes_within_days(position.bucket().volatility_lookback_days());
    let volatility = return_volatility(&closes, closes.len());
    if volatility.is_finite() {
        volatility
    } else {
        tracing::warn!(ticker = %position.ticker, "lookback volatility is not finite; ignoring");
        0.0
    }
}

/// Risk score in [0, 10].
pub fn risk_score(position: &Position, volatility_pct: f64, high_volatility_pct: f64) -> f64 {
    let pnl = position.unrealized_pnl_pct;
    let mut score = BASE_RISK_SCORE;

    match position.bucket() {
        TimeframeBucket::New => {
            if pnl.abs() > 8.0 {
                score += 2.0;
            }
            if position.days_held == 0 {
                score += 1.0;
            }
        }
        TimeframeBucket::Established => {
            if pnl < -10.0 {
                score += 1.5;
            }
            if pnl > 20.0 {
                score += 0.5;
            }
        }
        TimeframeBucket::Mature => {
            if pnl < -25.0 {
                score += 2.0;
            }
            if pnl > 50.0 {
                score += 1.0;
            }
        }
    }

    if volatility_pct > high_volatility_pct {
        score += 1.0;
    }

    score.clamp(0.0, MAX_RISK_SCORE)
}
