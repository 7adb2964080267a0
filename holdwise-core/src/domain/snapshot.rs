//! Portfolio snapshot supplied by the caller, and its boundary validation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::Position;

/// Positions plus available cash, as handed over by the scraping collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub positions: Vec<Position>,
    pub cash: f64,
}

/// Rejected snapshot. This is the only condition that stops an analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("position #{index} has an empty ticker")]
    EmptyTicker { index: usize },

    #[error("position #{index} ticker {ticker:?} has surrounding whitespace")]
    PaddedTicker { index: usize, ticker: String },

    #[error("{ticker}: shares must be > 0 (got {shares})")]
    NonPositiveShares { ticker: String, shares: f64 },

    #[error("{ticker}: field `{field}` is not a finite number")]
    NonFinite { ticker: String, field: &'static str },

    #[error("{ticker}: current_price must be > 0 (got {price})")]
    NonPositivePrice { ticker: String, price: f64 },

    #[error("duplicate ticker {0}")]
    DuplicateTicker(String),

    #[error("cash must be finite and >= 0 (got {0})")]
    InvalidCash(f64),
}

impl PortfolioSnapshot {
    pub fn new(positions: Vec<Position>, cash: f64) -> Self {
        Self { positions, cash }
    }

    /// Fail fast on malformed input before any analysis runs.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if !self.cash.is_finite() || self.cash < 0.0 {
            return Err(SnapshotError::InvalidCash(self.cash));
        }

        let mut seen = HashSet::with_capacity(self.positions.len());
        for (index, p) in self.positions.iter().enumerate() {
            let ticker = p.ticker.trim();
            if ticker.is_empty() {
                return Err(SnapshotError::EmptyTicker { index });
            }
            // Tickers key the price history, so they must match it exactly.
            if ticker.len() != p.ticker.len() {
                return Err(SnapshotError::PaddedTicker {
                    index,
                    ticker: p.ticker.clone(),
                });
            }

            let numeric = [
                ("shares", p.shares),
                ("average_cost", p.average_cost),
                ("current_price", p.current_price),
                ("current_value", p.current_value),
                ("unrealized_pnl", p.unrealized_pnl),
                ("unrealized_pnl_pct", p.unrealized_pnl_pct),
            ];
            for (field, value) in numeric {
                if !value.is_finite() {
                    return Err(SnapshotError::NonFinite {
                        ticker: ticker.to_string(),
                        field,
                    });
                }
            }

            if p.shares <= 0.0 {
                return Err(SnapshotError::NonPositiveShares {
                    ticker: ticker.to_string(),
                    shares: p.shares,
                });
            }
            if p.current_price <= 0.0 {
                return Err(SnapshotError::NonPositivePrice {
                    ticker: ticker.to_string(),
                    price: p.current_price,
                });
            }
            if !seen.insert(ticker.to_string()) {
                return Err(SnapshotError::DuplicateTicker(ticker.to_string()));
            }
        }

        Ok(())
    }

    pub fn invested_value(&self) -> f64 {
        self.positions.iter().map(|p| p.current_value).sum()
    }

    pub fn total_value(&self) -> f64 {
        self.invested_value() + self.cash
    }
}

/// Test helper.
#[cfg(test)]
pub fn make_position(ticker: &str, shares: f64, average_cost: f64, current_price: f64, days_held: u32) -> Position {
    Position::new(ticker, shares, average_cost, current_price, days_held)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_snapshot_passes() {
        let snap = PortfolioSnapshot::new(
            vec![make_position("AAA", 10.0, 100.0, 110.0, 5), make_position("BBB", 5.0, 50.0, 45.0, 40)],
            1_000.0,
        );
        assert!(snap.validate().is_ok());
        assert_eq!(snap.invested_value(), 1_100.0 + 225.0);
    }

    #[test]
    fn rejects_duplicate_tickers() {
        let snap = PortfolioSnapshot::new(
            vec![make_position("AAA", 10.0, 100.0, 110.0, 5), make_position("AAA", 1.0, 100.0, 110.0, 5)],
            0.0,
        );
        assert_eq!(snap.validate(), Err(SnapshotError::DuplicateTicker("AAA".into())));
    }

    #[test]
    fn rejects_zero_shares_and_nan() {
        let mut p = make_position("AAA", 10.0, 100.0, 110.0, 5);
        p.shares = 0.0;
        let snap = PortfolioSnapshot::new(vec![p], 0.0);
        assert!(matches!(snap.validate(), Err(SnapshotError::NonPositiveShares { .. })));

        let mut p = make_position("AAA", 10.0, 100.0, 110.0, 5);
        p.unrealized_pnl_pct = f64::NAN;
        let snap = PortfolioSnapshot::new(vec![p], 0.0);
        assert!(matches!(
            snap.validate(),
            Err(SnapshotError::NonFinite { field: "unrealized_pnl_pct", .. })
        ));
    }

    #[test]
    fn rejects_negative_cash_and_blank_ticker() {
        let snap = PortfolioSnapshot::new(vec![], -1.0);
        assert_eq!(snap.validate(), Err(SnapshotError::InvalidCash(-1.0)));

        let snap = PortfolioSnapshot::new(vec![make_position("  ", 1.0, 1.0, 1.0, 0)], 0.0);
        assert_eq!(snap.validate(), Err(SnapshotError::EmptyTicker { index: 0 }));
    }

    #[test]
    fn rejects_padded_ticker() {
        let snap = PortfolioSnapshot::new(
            vec![make_position("AAA", 1.0, 1.0, 1.0, 0), make_position(" BBB", 1.0, 1.0, 1.0, 0)],
            0.0,
        );
        assert_eq!(
            snap.validate(),
            Err(SnapshotError::PaddedTicker { index: 1, ticker: " BBB".into() })
        );
    }
}
