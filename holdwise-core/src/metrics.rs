//! Portfolio metrics and risk assessment: pure functions of positions and cash.
//!
//! Metrics describe the snapshot as it is; they never look at the
//! recommendations. The risk assessment scores a handful of structural
//! problems and pairs each one with a plain-language factor and a suggested
//! action.

use serde::{Deserialize, Serialize};

use crate::classify::size_fraction;
use crate::config::PolicyConfig;
use crate::domain::{Position, RiskLevel, TimeframeBucket};
use crate::indicators::{mean, population_std_dev};

/// P&L (percent) above this counts as a winner, below its negative as a loser.
pub const BREAKEVEN_BAND_PCT: f64 = 0.5;
/// Days over which the adjusted Sharpe ratio is normalized.
const SHARPE_NORMALIZATION_DAYS: f64 = 7.0;

pub const CONCENTRATION_LIMIT: f64 = 0.3;
pub const MIN_CASH_FRACTION: f64 = 0.2;
/// Positions held this many days or fewer are "ultra-new".
pub const ULTRA_NEW_MAX_DAYS: u32 = 1;
const ULTRA_NEW_COUNT_LIMIT: usize = 3;
const BIG_LOSER_PCT: f64 = -10.0;

/// Aggregate statistics for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub total_value: f64,
    pub invested_value: f64,
    pub cash: f64,
    pub total_pnl: f64,
    /// Cash as a fraction of total value.
    pub cash_fraction: f64,
    /// Herfindahl index of position weights (1.0 = single position).
    pub concentration: f64,
    pub adjusted_sharpe: f64,
    pub position_count: usize,
    pub winners: usize,
    pub losers: usize,
    pub breakeven: usize,
    pub average_days_held: f64,
}

impl PortfolioMetrics {
    pub fn compute(positions: &[Position], cash: f64) -> Self {
        let invested_value: f64 = positions.iter().map(|p| p.current_value).sum();
        let total_value = invested_value + cash;
        let pnl_pcts: Vec<f64> = positions.iter().map(|p| p.unrealized_pnl_pct).collect();
        let average_days_held = mean(&positions.iter().map(|p| p.days_held as f64).collect::<Vec<_>>());

        Self {
            total_value,
            invested_value,
            cash,
            total_pnl: positions.iter().map(|p| p.unrealized_pnl).sum(),
            cash_fraction: size_fraction(cash, total_value),
            concentration: concentration(positions),
            adjusted_sharpe: adjusted_sharpe(&pnl_pcts, average_days_held),
            position_count: positions.len(),
            winners: pnl_pcts.iter().filter(|&&p| p > BREAKEVEN_BAND_PCT).count(),
            losers: pnl_pcts.iter().filter(|&&p| p < -BREAKEVEN_BAND_PCT).count(),
            breakeven: pnl_pcts
                .iter()
                .filter(|&&p| (-BREAKEVEN_BAND_PCT..=BREAKEVEN_BAND_PCT).contains(&p))
                .count(),
            average_days_held,
        }
    }
}

/// Σ w² over position weights by current value; 0.0 with nothing invested.
pub fn concentration(positions: &[Position]) -> f64 {
    let invested: f64 = positions.iter().map(|p| p.current_value).sum();
    positions
        .iter()
        .map(|p| size_fraction(p.current_value, invested).powi(2))
        .sum()
}

/// Mean over population std-dev of position P&L percentages.
///
/// Scaled down by `average_days / 7` when positions are younger than a week on
/// average. 0.0 when the std-dev is zero.
pub fn adjusted_sharpe(pnl_pcts: &[f64], average_days_held: f64) -> f64 {
    let std = population_std_dev(pnl_pcts);
    if std < 1e-12 {
        return 0.0;
    }
    let ratio = mean(pnl_pcts) / std;
    if average_days_held < SHARPE_NORMALIZATION_DAYS {
        ratio * average_days_held / SHARPE_NORMALIZATION_DAYS
    } else {
        ratio
    }
}

/// Portfolio-level risk narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub score: u32,
    pub factors: Vec<String>,
    pub suggested_actions: Vec<String>,
}

impl RiskAssessment {
    fn add(&mut self, points: u32, factor: String, action: String) {
        self.score += points;
        self.factors.push(factor);
        self.suggested_actions.push(action);
    }
}

/// Score structural risks of the portfolio.
///
/// `positions` must already carry `position_size_pct` from the classifier.
pub fn assess_risk(
    positions: &[Position],
    metrics: &PortfolioMetrics,
    policy: &PolicyConfig,
) -> RiskAssessment {
    let mut risk = RiskAssessment {
        level: RiskLevel::Low,
        score: 0,
        factors: Vec::new(),
        suggested_actions: Vec::new(),
    };

    if metrics.concentration > CONCENTRATION_LIMIT {
        risk.add(
            2,
            format!("high concentration (HHI {:.2})", metrics.concentration),
            "spread capital across more positions".to_string(),
        );
    }

    let ultra_new = positions
        .iter()
        .filter(|p| p.days_held <= ULTRA_NEW_MAX_DAYS)
        .count();
    if ultra_new >= ULTRA_NEW_COUNT_LIMIT {
        risk.add(
            2,
            format!("{ultra_new} positions opened within the last day"),
            "pause new entries until recent positions settle".to_string(),
        );
    }

    let new_max = policy.new.max_position_size;
    let oversized_new: Vec<&str> = positions
        .iter()
        .filter(|p| p.bucket() == TimeframeBucket::New && p.position_size_pct > new_max)
        .map(|p| p.ticker.as_str())
        .collect();
    if !oversized_new.is_empty() {
        risk.add(
            1,
            format!(
                "new positions above the {:.0}% size limit: {}",
                new_max * 100.0,
                oversized_new.join(", ")
            ),
            "scale new positions back to the size limit".to_string(),
        );
    }

    for p in positions
        .iter()
        .filter(|p| p.bucket() != TimeframeBucket::Mature && p.unrealized_pnl_pct <= BIG_LOSER_PCT)
    {
        risk.add(
            1,
            format!(
                "{} {} position down {:.1}%",
                p.ticker,
                p.bucket().label(),
                p.unrealized_pnl_pct
            ),
            format!("review the stop-loss on {}", p.ticker),
        );
    }

    // Nothing to hold in reserve when the portfolio is worth nothing.
    if metrics.total_value > 0.0 && metrics.cash_fraction < MIN_CASH_FRACTION {
        risk.add(
            1,
            format!("low cash reserve ({:.1}%)", metrics.cash_fraction * 100.0),
            "rebuild cash to at least 20% of the portfolio".to_string(),
        );
    }

    risk.level = RiskLevel::from_portfolio_score(risk.score);
    risk
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_positions;
    use crate::domain::snapshot::make_position;
    use crate::indicators::assert_approx;
    use std::collections::HashMap;

    #[test]
    fn basic_totals() {
        let positions = vec![
            make_position("A", 10.0, 100.0, 110.0, 10),
            make_position("B", 10.0, 100.0, 90.0, 10),
            make_position("C", 10.0, 100.0, 100.2, 10),
        ];
        let m = PortfolioMetrics::compute(&positions, 3_002.0);
        assert_approx(m.invested_value, 3_002.0, 1e-9);
        assert_approx(m.total_value, 6_004.0, 1e-9);
        assert_approx(m.cash_fraction, 0.5, 1e-12);
        assert_approx(m.total_pnl, 2.0, 1e-9);
        assert_eq!((m.winners, m.losers, m.breakeven), (1, 1, 1));
        assert_approx(m.average_days_held, 10.0, 1e-12);
    }

    #[test]
    fn concentration_of_equal_weights() {
        let positions: Vec<Position> = (0..4)
            .map(|i| make_position(&format!("T{i}"), 10.0, 100.0, 100.0, 10))
            .collect();
        assert_approx(concentration(&positions), 0.25, 1e-12);
        assert_eq!(concentration(&[]), 0.0);
    }

    #[test]
    fn sharpe_is_scaled_for_young_portfolios() {
        let pnl = [10.0, -10.0, 20.0];
        let full = adjusted_sharpe(&pnl, 10.0);
        assert!(full > 0.0);
        assert_approx(adjusted_sharpe(&pnl, 3.5), full * 0.5, 1e-12);
        assert_eq!(adjusted_sharpe(&[5.0, 5.0], 10.0), 0.0);
    }

    #[test]
    fn empty_portfolio_is_calm() {
        let m = PortfolioMetrics::compute(&[], 10_000.0);
        assert_eq!(m.concentration, 0.0);
        assert_eq!(m.cash_fraction, 1.0);
        let risk = assess_risk(&[], &m, &PolicyConfig::default());
        assert_eq!(risk.level, RiskLevel::Low);
        assert_eq!(risk.score, 0);
        assert!(risk.factors.is_empty());
    }

    #[test]
    fn worthless_portfolio_has_no_cash_factor() {
        let m = PortfolioMetrics::compute(&[], 0.0);
        assert_eq!(m.total_value, 0.0);
        let risk = assess_risk(&[], &m, &PolicyConfig::default());
        assert_eq!(risk.score, 0);
        assert!(risk.factors.is_empty());
    }

    #[test]
    fn stacked_risks_reach_very_high() {
        // Three fresh positions, one dominant and one deep loser, almost no cash.
        let raw = vec![
            make_position("BIG", 100.0, 100.0, 100.0, 0),
            make_position("LOSS", 10.0, 100.0, 85.0, 1),
            make_position("TINY", 1.0, 100.0, 101.0, 1),
        ];
        let policy = PolicyConfig::default();
        let positions = classify_positions(&raw, &HashMap::new(), &policy);
        let m = PortfolioMetrics::compute(&positions, 100.0);
        let risk = assess_risk(&positions, &m, &policy);
        // concentration 2 + ultra-new 2 + oversized new 1 + loser 1 + low cash 1
        assert_eq!(risk.score, 7);
        assert_eq!(risk.level, RiskLevel::High);
        assert_eq!(risk.factors.len(), 5);
        assert_eq!(risk.factors.len(), risk.suggested_actions.len());
    }

    #[test]
    fn mature_losers_are_not_flagged() {
        let positions = vec![make_position("OLD", 10.0, 100.0, 70.0, 90)];
        let m = PortfolioMetrics::compute(&positions, 10_000.0);
        let risk = assess_risk(&positions, &m, &PolicyConfig::default());
        assert!(risk.factors.iter().all(|f| !f.contains("OLD")));
    }
}
