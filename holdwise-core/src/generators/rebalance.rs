//! Rebalancing generator.
//!
//! Fires when a position's weight exceeds its bucket's max size by more than
//! the rebalance tolerance, and sells enough to bring it back to the max.
//! Young winners in a strong up-trend are left alone.

use super::{check_position, evaluate_each, sell_shares, GeneratorError, GeneratorInput};
use crate::domain::{Action, Position, Recommendation, RiskLevel};
use crate::signals::{TechnicalSignals, TrendDirection};

const REBALANCE_CONFIDENCE: f64 = 75.0;
/// Confidence penalty when trimming a large winner.
const BIG_WINNER_PENALTY: f64 = 10.0;
const BIG_WINNER_PCT: f64 = 20.0;

const PROTECTED_MAX_DAYS: u32 = 7;
const PROTECTED_MIN_GAIN_PCT: f64 = 5.0;

pub fn generate(input: &GeneratorInput<'_>) -> Vec<Recommendation> {
    evaluate_each(
        "rebalance",
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
    let policy = &input.config.policy;
    let bucket = position.bucket();
    let max_size = policy.bucket(bucket).max_position_size;
    let size = position.position_size_pct;
    let pnl = position.unrealized_pnl_pct;

    if size <= max_size + policy.rebalance_tolerance {
        return Ok(None);
    }

    let strong_trend = signals.trend == TrendDirection::Up
        && signals.trend_slope.abs() > input.config.profile.strong_trend_slope;
    if position.days_held <= PROTECTED_MAX_DAYS && pnl > PROTECTED_MIN_GAIN_PCT && strong_trend {
        tracing::debug!(
            ticker = %position.ticker,
            size,
            "oversized but young and trending up; not rebalancing"
        );
        return Ok(None);
    }

    let fraction = (size - max_size) / size;
    let mut confidence = REBALANCE_CONFIDENCE;
    if pnl > BIG_WINNER_PCT {
        confidence -= BIG_WINNER_PENALTY;
    }

    Ok(Some(
        Recommendation::new(
            &position.ticker,
            Action::SellRebalance {
                current_weight: size,
                target_weight: max_size,
            },
            sell_shares(fraction, position.shares),
            position.current_price,
            confidence,
            RiskLevel::from_position_score(position.risk_score),
        )
        .with_reason(format!(
            "weight {:.1}% exceeds the {:.1}% {} limit",
            size * 100.0,
            max_size * 100.0,
            bucket.label()
        ))
        .with_reason(format!("trim {:.1}% of the holding", fraction * 100.0)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::snapshot::make_position;
    use crate::generators::test_support::{signal_map, signals};
    use crate::indicators::assert_approx;
    use crate::signals::Momentum;

    fn sized(ticker: &str, shares: f64, cost: f64, price: f64, days: u32, size: f64) -> Position {
        let mut p = make_position(ticker, shares, cost, price, days);
        p.position_size_pct = size;
        p
    }

    fn run(position: Position, s: TechnicalSignals) -> Vec<Recommendation> {
        let config = EngineConfig::default();
        let map = signal_map(vec![(position.ticker.as_str(), s)]);
        let positions = [position];
        let input = GeneratorInput {
            positions: &positions,
            signals: &map,
            config: &config,
            cash: 0.0,
            candidates: &[],
        };
        generate(&input)
    }

    #[test]
    fn oversized_established_position_is_trimmed_to_max() {
        // 22% weight vs 15% max + 5% tolerance, up 3%, flat trend.
        let p = sized("A", 100.0, 100.0, 103.0, 15, 0.22);
        let recs = run(p, signals(103.0, TrendDirection::Flat, 0.0, Momentum::Neutral));
        assert_eq!(recs.len(), 1);
        let rec = &recs[0];
        match rec.action {
            Action::SellRebalance { current_weight, target_weight } => {
                assert_approx(current_weight, 0.22, 1e-12);
                assert_approx(target_weight, 0.15, 1e-12);
            }
            ref other => panic!("unexpected action {other:?}"),
        }
        // 7/22 of 100 shares, rounded down.
        assert_eq!(rec.suggested_shares, 31.0);
        assert_eq!(rec.confidence, 75.0);
        let remaining_weight = 0.22 * (100.0 - rec.suggested_shares) / 100.0;
        assert!((remaining_weight - 0.15).abs() < 0.01);
    }

    #[test]
    fn within_tolerance_is_left_alone() {
        let p = sized("A", 100.0, 100.0, 103.0, 15, 0.19);
        assert!(run(p, signals(103.0, TrendDirection::Flat, 0.0, Momentum::Neutral)).is_empty());
    }

    #[test]
    fn young_strong_winner_is_protected() {
        let p = sized("A", 100.0, 100.0, 110.0, 3, 0.30);
        let s = signals(110.0, TrendDirection::Up, 150.0, Momentum::Positive);
        assert!(run(p.clone(), s).is_empty());

        let weak = signals(110.0, TrendDirection::Up, 60.0, Momentum::Positive);
        assert_eq!(run(p, weak).len(), 1);
    }

    #[test]
    fn big_winner_lowers_confidence() {
        let p = sized("A", 100.0, 100.0, 150.0, 60, 0.40);
        let recs = run(p, signals(150.0, TrendDirection::Flat, 0.0, Momentum::Neutral));
        assert_eq!(recs[0].confidence, 65.0);
    }
}
