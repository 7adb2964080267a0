//! Stop-loss generator.
//!
//! Three triggers, checked in order; the first that matches wins:
//! - **Hard**: P&L at or below the bucket's stop-loss threshold.
//! - **Same-day**: held at most one day and already down 5% or more. Bucket independent.
//! - **Soft**: momentum negative and P&L at or below 70% of the threshold.
//!
//! A stop-loss always sells the whole holding.

use super::{check_position, evaluate_each, GeneratorError, GeneratorInput};
use crate::domain::{Action, Position, Recommendation, RiskLevel, StopTrigger};
use crate::signals::{Momentum, TechnicalSignals};

pub const HARD_STOP_CONFIDENCE: f64 = 90.0;
pub const SAME_DAY_STOP_CONFIDENCE: f64 = 90.0;
pub const SOFT_STOP_CONFIDENCE: f64 = 75.0;

/// Loss (percent) that triggers the same-day stop.
pub const SAME_DAY_LOSS_PCT: f64 = -5.0;
const SAME_DAY_MAX_DAYS: u32 = 1;
const SOFT_STOP_RATIO: f64 = 0.7;

pub fn generate(input: &GeneratorInput<'_>) -> Vec<Recommendation> {
    evaluate_each(
        "stop_loss",
        input.positions,
        |p| p.ticker.as_str(),
        |p| evaluate(p, &input.signals_for(p), input),
    )
}

fn evaluate(
    position: &Position,
    signals: &TechnicalSignals,
    input: &GeneratorInput<'_>,
) -> Result<Option<Recommendation>, GeneratorError> {
    check_position(position)?;
    let bucket = position.bucket();
    let threshold = -input.config.policy.bucket(bucket).stop_loss_pct;
    let pnl = position.unrealized_pnl_pct;

    let (trigger, confidence, reason) = if pnl <= threshold {
        (
            StopTrigger::Hard,
            HARD_STOP_CONFIDENCE,
            format!(
                "{} position down {:.1}%, at or beyond the {:.1}% stop-loss",
                bucket.label(),
                pnl,
                threshold
            ),
        )
    } else if position.days_held <= SAME_DAY_MAX_DAYS && pnl <= SAME_DAY_LOSS_PCT {
        (
            StopTrigger::SameDay,
            SAME_DAY_STOP_CONFIDENCE,
            format!(
                "held {} day(s) and already down {:.1}%",
                position.days_held, pnl
            ),
        )
    } else if signals.momentum == Momentum::Negative && pnl <= SOFT_STOP_RATIO * threshold {
        (
            StopTrigger::Soft,
            SOFT_STOP_CONFIDENCE,
            format!(
                "down {:.1}% with negative momentum, nearing the {:.1}% stop-loss",
                pnl, threshold
            ),
        )
    } else {
        return Ok(None);
    };

    let price = position.current_price;
    let stop_price = stop_price(price, signals.support, threshold);

    Ok(Some(
        Recommendation::new(
            &position.ticker,
            Action::SellStopLoss { trigger },
            position.shares,
            price,
            confidence,
            RiskLevel::from_position_score(position.risk_score),
        )
        .with_reason(reason)
        .with_reason(format!("risk score {:.1}/10", position.risk_score))
        .with_stop_loss(stop_price),
    ))
}

/// Support when it sits below the price (but never looser than the
/// threshold), otherwise the current price.
pub fn stop_price(price: f64, support: f64, threshold_pct: f64) -> f64 {
    if support < price {
        support.max(price * (1.0 + threshold_pct / 100.0))
    } else {
        price
    }
}
