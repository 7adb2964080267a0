//! New-position generator.
//!
//! Sizes buys for externally ranked candidates. Nothing is proposed when cash
//! is below the policy minimum. Candidates under the confidence floor, and
//! tickers already held, are skipped.
//!
//! Budget per candidate is `min(cash × max_size, max_amount)`; every candidate
//! is sized against the same cash figure. The limit enforcer later charges
//! them against a running budget.

use std::collections::HashSet;

use super::{evaluate_each, GeneratorError, GeneratorInput};
use crate::domain::{Action, BuyCandidate, Recommendation, RiskLevel};

pub fn generate(input: &GeneratorInput<'_>) -> Vec<Recommendation> {
    let policy = &input.config.policy.new_position;
    if input.cash < policy.min_cash {
        tracing::debug!(
            cash = input.cash,
            min_cash = policy.min_cash,
            "not enough cash for new positions"
        );
        return Vec::new();
    }

    let held: HashSet<&str> = input.positions.iter().map(|p| p.ticker.as_str()).collect();
    let eligible: Vec<&BuyCandidate> = input
        .candidates
        .iter()
        .filter(|c| c.confidence >= policy.min_confidence && !held.contains(c.ticker.as_str()))
        .collect();

    evaluate_each(
        "new_position",
        &eligible,
        |c| c.ticker.as_str(),
        |c| evaluate(c, input),
    )
}

fn evaluate(
    candidate: &BuyCandidate,
    input: &GeneratorInput<'_>,
) -> Result<Option<Recommendation>, GeneratorError> {
    let price = candidate.price;
    if !price.is_finite() {
        return Err(GeneratorError::NonFinite { field: "price", value: price });
    }
    if price <= 0.0 {
        return Err(GeneratorError::NonPositivePrice(price));
    }

    let policy = &input.config.policy;
    let np = &policy.new_position;
    let budget = (input.cash * np.max_size).min(np.max_amount);
    let shares = (budget / price).floor();
    if shares < 1.0 {
        return Ok(None);
    }

    let mut rec = Recommendation::new(
        &candidate.ticker,
        Action::BuyInitial { budget },
        shares,
        price,
        candidate.confidence,
        RiskLevel::Moderate,
    );
    for reason in &candidate.reasons {
        rec = rec.with_reason(reason.clone());
    }
    Ok(Some(
        rec.with_reason(format!(
            "budget {budget:.2} ({:.0}% of cash, capped at {:.2})",
            np.max_size * 100.0,
            np.max_amount
        ))
        .with_stop_loss(price * (1.0 - np.stop_loss_pct / 100.0))
        .with_take_profit(price * (1.0 + policy.new.profit_taking_pct / 100.0))
        .with_max_position_size(budget),
    ))
}
