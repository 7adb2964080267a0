//! Tactical averaging-down generator.
//!
//! Adds to a young position that has dipped a little and is already turning
//! back up. The add is capped both as a fraction of held shares and in cash.

use super::{check_position, evaluate_each, GeneratorError, GeneratorInput};
use crate::domain::{Action, Position, Recommendation, RiskLevel};
use crate::signals::{Momentum, TechnicalSignals};

const AVERAGING_DOWN_CONFIDENCE: f64 = 65.0;

pub fn generate(input: &GeneratorInput<'_>) -> Vec<Recommendation> {
    evaluate_each(
        "averaging_down",
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
    let policy = &input.config.policy.averaging_down;
    let pnl = position.unrealized_pnl_pct;

    let in_window = position.days_held <= policy.max_days_held
        && pnl > policy.loss_floor_pct
        && pnl < policy.loss_ceiling_pct;
    if !in_window || signals.momentum != Momentum::Positive {
        return Ok(None);
    }

    let price = position.current_price;
    let by_holding = position.shares * policy.max_add_fraction;
    let by_cash = policy.cash_ceiling / price;
    let shares = by_holding.min(by_cash).floor();
    if shares < 1.0 {
        return Ok(None);
    }

    Ok(Some(
        Recommendation::new(
            &position.ticker,
            Action::BuyAveragingDown {
                added_fraction: shares / position.shares,
            },
            shares,
            price,
            AVERAGING_DOWN_CONFIDENCE,
            RiskLevel::from_position_score(position.risk_score),
        )
        .with_reason(format!(
            "down {pnl:.1}% after {} day(s) with momentum turning positive",
            position.days_held
        ))
        .with_reason(format!("add capped at {:.2} in cash", policy.cash_ceiling)),
    ))
}
