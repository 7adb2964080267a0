//! Recommendation generators.
//!
//! Five independent rules, each a plain function with the same signature:
//! [`GeneratorInput`] in, `Vec<Recommendation>` out. They never see each
//! other's output and may all fire for the same ticker; the consolidator
//! decides which one wins.
//!
//! # Failure isolation
//! Each rule evaluates one position (or candidate) at a time. An item that
//! fails with [`GeneratorError`] is logged and skipped; the remaining items
//! are still evaluated.

pub mod averaging_down;
pub mod new_position;
pub mod profit_taking;
pub mod rebalance;
pub mod stop_loss;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::domain::{BuyCandidate, Position, Recommendation};
use crate::signals::TechnicalSignals;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeneratorError {
    #[error("field `{field}` is not a finite number ({value})")]
    NonFinite { field: &'static str, value: f64 },
    #[error("price must be > 0 (got {0})")]
    NonPositivePrice(f64),
}

/// Everything a generator may look at. Borrowed, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorInput<'a> {
    pub positions: &'a [Position],
    pub signals: &'a HashMap<String, TechnicalSignals>,
    pub config: &'a EngineConfig,
    pub cash: f64,
    pub candidates: &'a [BuyCandidate],
}

impl<'a> GeneratorInput<'a> {
    /// Signals for a ticker, or the neutral bundle when none were computed.
    pub fn signals_for(&self, position: &Position) -> TechnicalSignals {
        self.signals
            .get(&position.ticker)
            .cloned()
            .unwrap_or_else(|| TechnicalSignals::neutral(position.current_price, 0))
    }
}

/// Uniform generator signature.
pub type Generator = fn(&GeneratorInput<'_>) -> Vec<Recommendation>;

/// Output of every generator, kept apart for priority-ordered consolidation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorOutputs {
    pub stop_loss: Vec<Recommendation>,
    pub profit_taking: Vec<Recommendation>,
    pub averaging_down: Vec<Recommendation>,
    pub rebalance: Vec<Recommendation>,
    pub new_positions: Vec<Recommendation>,
}

impl GeneratorOutputs {
    pub fn total(&self) -> usize {
        self.stop_loss.len()
            + self.profit_taking.len()
            + self.averaging_down.len()
            + self.rebalance.len()
            + self.new_positions.len()
    }
}

/// Run all five generators over the same input.
pub fn run_all(input: &GeneratorInput<'_>) -> GeneratorOutputs {
    GeneratorOutputs {
        stop_loss: stop_loss::generate(input),
        profit_taking: profit_taking::generate(input),
        averaging_down: averaging_down::generate(input),
        rebalance: rebalance::generate(input),
        new_positions: new_position::generate(input),
    }
}

/// Evaluate each item, keeping hits and logging failures.
pub(crate) fn evaluate_each<T>(
    generator: &'static str,
    items: &[T],
    ticker_of: impl Fn(&T) -> &str,
    mut evaluate: impl FnMut(&T) -> Result<Option<Recommendation>, GeneratorError>,
) -> Vec<Recommendation> {
    let mut out = Vec::new();
    for item in items {
        let ticker = ticker_of(item);
        match evaluate(item).and_then(|rec| rec.map(ensure_finite).transpose()) {
            Ok(Some(rec)) => {
                tracing::debug!(
                    generator,
                    ticker,
                    action = rec.action.label(),
                    shares = rec.suggested_shares,
                    confidence = rec.confidence,
                    "recommendation generated"
                );
                out.push(rec);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(generator, ticker, error = %err, "skipping item after evaluation failure");
            }
        }
    }
    out
}

/// Reject recommendations carrying NaN or infinite numbers.
fn ensure_finite(rec: Recommendation) -> Result<Recommendation, GeneratorError> {
    let fields = [
        ("suggested_shares", Some(rec.suggested_shares)),
        ("target_price", Some(rec.target_price)),
        ("confidence", Some(rec.confidence)),
        ("stop_loss_price", rec.stop_loss_price),
        ("take_profit_price", rec.take_profit_price),
        ("max_position_size", rec.max_position_size),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            if !value.is_finite() {
                return Err(GeneratorError::NonFinite { field, value });
            }
        }
    }
    Ok(rec)
}

/// Reject positions whose price cannot anchor a recommendation.
pub(crate) fn check_position(position: &Position) -> Result<(), GeneratorError> {
    if !position.current_price.is_finite() {
        return Err(GeneratorError::NonFinite {
            field: "current_price",
            value: position.current_price,
        });
    }
    if position.current_price <= 0.0 {
        return Err(GeneratorError::NonPositivePrice(position.current_price));
    }
    if !position.unrealized_pnl_pct.is_finite() {
        return Err(GeneratorError::NonFinite {
            field: "unrealized_pnl_pct",
            value: position.unrealized_pnl_pct,
        });
    }
    Ok(())
}

/// Shares to sell for a fraction of a holding.
///
/// Whole shares for holdings of one share or more (at least one, never more
/// than held); fractional holdings below one share are sold proportionally.
pub(crate) fn sell_shares(fraction: f64, held: f64) -> f64 {
    let raw = held * fraction.clamp(0.0, 1.0);
    if held < 1.0 {
        return raw.min(held);
    }
    raw.floor().max(1.0).min(held)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, RiskLevel};

    #[test]
    fn sell_shares_rounds_down_within_holding() {
        assert_eq!(sell_shares(0.3, 100.0), 30.0);
        assert_eq!(sell_shares(0.3, 7.0), 2.0);
        assert_eq!(sell_shares(0.01, 7.0), 1.0);
        assert_eq!(sell_shares(1.0, 7.0), 7.0);
        assert_eq!(sell_shares(2.0, 7.0), 7.0);
        assert!((sell_shares(0.5, 0.4) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn evaluate_each_skips_failures() {
        let items = ["OK", "BAD", "OK2"];
        let out = evaluate_each("test", &items, |t| *t, |t| {
            if *t == "BAD" {
                Err(GeneratorError::NonPositivePrice(0.0))
            } else {
                Ok(Some(Recommendation::new(*t, Action::Hold, 0.0, 1.0, 50.0, RiskLevel::Low)))
            }
        });
        let tickers: Vec<&str> = out.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["OK", "OK2"]);
    }

    #[test]
    fn evaluate_each_rejects_non_finite_output() {
        let out = evaluate_each("test", &["X"], |t| *t, |t| {
            Ok(Some(Recommendation::new(*t, Action::Hold, 1.0, f64::INFINITY, 50.0, RiskLevel::Low)))
        });
        assert!(out.is_empty());
    }
}
