//! Risk-limit enforcer.
//!
//! Runs over the consolidated list in order. Buys are charged against a
//! running cash budget and checked against the new-position size cap; each
//! clamp appends a reason. Buys shrunk to zero shares are dropped. Sells pass
//! through untouched.

use crate::config::PolicyConfig;
use crate::domain::Recommendation;

/// Clamp buys to available cash and the position-size cap.
///
/// `total_value` is the portfolio value (positions plus cash) before any of
/// the recommendations are applied.
pub fn enforce_limits(
    recommendations: Vec<Recommendation>,
    cash: f64,
    total_value: f64,
    policy: &PolicyConfig,
) -> Vec<Recommendation> {
    let max_size = policy.new_position.max_size;
    let mut remaining = cash.max(0.0);
    let mut out = Vec::with_capacity(recommendations.len());

    for mut rec in recommendations {
        if !rec.action.is_buy() {
            out.push(rec);
            continue;
        }

        let price = rec.target_price;
        if !(price.is_finite() && price > 0.0) {
            tracing::warn!(ticker = %rec.ticker, price, "dropping buy without a usable price");
            continue;
        }

        if rec.notional() > remaining {
            let shares = (remaining / price).floor();
            rec.reasons.push(format!(
                "reduced from {} to {} shares to fit available cash {:.2}",
                rec.suggested_shares, shares, remaining
            ));
            rec.suggested_shares = shares;
        }

        if total_value > 0.0 {
            let implied = rec.notional() / total_value;
            if implied > max_size {
                let shares = (max_size * total_value / price).floor();
                rec.reasons.push(format!(
                    "reduced from {} to {} shares: {:.1}% of the portfolio exceeds the {:.1}% cap",
                    rec.suggested_shares,
                    shares,
                    implied * 100.0,
                    max_size * 100.0
                ));
                rec.suggested_shares = shares;
            }
        }

        if rec.suggested_shares < 1.0 {
            tracing::debug!(ticker = %rec.ticker, "buy reduced to zero shares; dropped");
            continue;
        }
        remaining -= rec.notional();
        out.push(rec);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, RiskLevel, StopTrigger};

    fn buy(ticker: &str, shares: f64, price: f64) -> Recommendation {
        Recommendation::new(
            ticker,
            Action::BuyInitial { budget: shares * price },
            shares,
            price,
            85.0,
            RiskLevel::Moderate,
        )
    }

    #[test]
    fn buys_share_a_running_cash_budget() {
        let recs = vec![buy("A", 30.0, 100.0), buy("B", 30.0, 100.0)];
        let out = enforce_limits(recs, 5_000.0, 1_000_000.0, &PolicyConfig::default());
        assert_eq!(out[0].suggested_shares, 30.0);
        assert_eq!(out[1].suggested_shares, 20.0);
        assert_eq!(out[1].reasons.len(), 1);
        let spent: f64 = out.iter().map(|r| r.notional()).sum();
        assert!(spent <= 5_000.0);
    }

    #[test]
    fn size_cap_shrinks_oversized_buy() {
        // 50 × 100 = 5,000 of a 20,000 portfolio is 25%, cap 10%.
        let out = enforce_limits(vec![buy("A", 50.0, 100.0)], 10_000.0, 20_000.0, &PolicyConfig::default());
        assert_eq!(out[0].suggested_shares, 20.0);
        assert!(out[0].reasons.last().unwrap().contains("cap"));
    }

    #[test]
    fn exhausted_cash_drops_buys_and_keeps_sells() {
        let sell = Recommendation::new(
            "S",
            Action::SellStopLoss { trigger: StopTrigger::Hard },
            10.0,
            50.0,
            90.0,
            RiskLevel::High,
        );
        let out = enforce_limits(
            vec![sell.clone(), buy("A", 10.0, 100.0)],
            50.0,
            100_000.0,
            &PolicyConfig::default(),
        );
        assert_eq!(out, vec![sell]);
    }

    #[test]
    fn unclamped_buy_has_no_extra_reason() {
        let out = enforce_limits(vec![buy("A", 5.0, 100.0)], 10_000.0, 100_000.0, &PolicyConfig::default());
        assert!(out[0].reasons.is_empty());
    }
}
