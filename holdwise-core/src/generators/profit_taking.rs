//! Profit-taking generator.
//!
//! Only positions up more than 5% are considered.
//! - At or above the bucket target: sell 30% while the move is still running
//!   (momentum positive and trend up), otherwise sell 50%. Negative momentum
//!   raises confidence.
//! - Between 70% of the target and the target, with price within 2% of
//!   resistance on either side: sell 25%. A price well past resistance is a
//!   breakout and does not qualify.

use super::{check_position, evaluate_each, sell_shares, GeneratorError, GeneratorInput};
use crate::domain::{Action, Position, ProfitTrigger, Recommendation, RiskLevel};
use crate::signals::{Momentum, TechnicalSignals, TrendDirection};

/// Gains at or below this never trigger profit-taking.
pub const MIN_GAIN_PCT: f64 = 5.0;

const RUNNING_FRACTION: f64 = 0.30;
const TARGET_FRACTION: f64 = 0.50;
const RESISTANCE_FRACTION: f64 = 0.25;

const TARGET_CONFIDENCE: f64 = 70.0;
const NEGATIVE_MOMENTUM_BONUS: f64 = 15.0;
const RESISTANCE_CONFIDENCE: f64 = 60.0;

const APPROACH_RATIO: f64 = 0.7;
/// Price within this fraction of resistance counts as pressing on it.
const RESISTANCE_PROXIMITY: f64 = 0.02;

pub fn generate(input: &GeneratorInput<'_>) -> Vec<Recommendation> {
    evaluate_each(
        "profit_taking",
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
    let pnl = position.unrealized_pnl_pct;
    if pnl <= MIN_GAIN_PCT {
        return Ok(None);
    }

    let bucket = position.bucket();
    let target = input.config.policy.bucket(bucket).profit_taking_pct;
    let price = position.current_price;

    let (fraction, trigger, confidence, reason) = if pnl >= target {
        let running = signals.momentum == Momentum::Positive && signals.trend == TrendDirection::Up;
        if running {
            (
                RUNNING_FRACTION,
                ProfitTrigger::Target,
                TARGET_CONFIDENCE,
                format!(
                    "up {pnl:.1}%, past the {target:.0}% {} target; trend still up, trimming lightly",
                    bucket.label()
                ),
            )
        } else {
            let mut confidence = TARGET_CONFIDENCE;
            if signals.momentum == Momentum::Negative {
                confidence += NEGATIVE_MOMENTUM_BONUS;
            }
            (
                TARGET_FRACTION,
                ProfitTrigger::Target,
                confidence,
                format!(
                    "up {pnl:.1}%, past the {target:.0}% {} target",
                    bucket.label()
                ),
            )
        }
    } else if pnl >= APPROACH_RATIO * target
        && !signals.insufficient_data
        && (price - signals.resistance).abs() <= RESISTANCE_PROXIMITY * signals.resistance
    {
        (
            RESISTANCE_FRACTION,
            ProfitTrigger::ApproachResistance,
            RESISTANCE_CONFIDENCE,
            format!(
                "up {pnl:.1}% and within 2% of resistance at {:.2}",
                signals.resistance
            ),
        )
    } else {
        return Ok(None);
    };

    let mut rec = Recommendation::new(
        &position.ticker,
        Action::SellProfitTaking { fraction, trigger },
        sell_shares(fraction, position.shares),
        price,
        confidence,
        RiskLevel::from_position_score(position.risk_score),
    )
    .with_reason(reason);
    if signals.momentum == Momentum::Negative {
        rec = rec.with_reason("momentum turning negative");
    }
    Ok(Some(rec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::snapshot::make_position;
    use crate::generators::test_support::{signal_map, signals};

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
    fn mature_winner_with_fading_momentum_sells_half() {
        // Up 45% against the 40% mature target.
        let p = make_position("A", 100.0, 100.0, 145.0, 40);
        let recs = run(p, signals(145.0, TrendDirection::Flat, 0.0, Momentum::Negative));
        assert_eq!(recs.len(), 1);
        let rec = &recs[0];
        assert_eq!(
            rec.action,
            Action::SellProfitTaking { fraction: 0.5, trigger: ProfitTrigger::Target }
        );
        assert_eq!(rec.suggested_shares, 50.0);
        assert!(rec.confidence >= 85.0);
    }

    #[test]
    fn running_winner_sells_less() {
        let p = make_position("A", 100.0, 100.0, 130.0, 10);
        let recs = run(p, signals(130.0, TrendDirection::Up, 150.0, Momentum::Positive));
        assert_eq!(recs[0].suggested_shares, 30.0);
        assert_eq!(recs[0].confidence, 70.0);
    }

    #[test]
    fn approaching_resistance_trims_a_quarter() {
        // Established target 25%; 20% gain is past 70% of it.
        let p = make_position("A", 100.0, 100.0, 120.0, 10);
        let mut s = signals(120.0, TrendDirection::Flat, 0.0, Momentum::Neutral);
        s.resistance = 121.0;
        let recs = run(p.clone(), s.clone());
        assert_eq!(
            recs[0].action,
            Action::SellProfitTaking { fraction: 0.25, trigger: ProfitTrigger::ApproachResistance }
        );
        assert_eq!(recs[0].suggested_shares, 25.0);

        s.resistance = 130.0;
        assert!(run(p, s).is_empty());
    }

    #[test]
    fn price_far_above_resistance_is_not_an_approach() {
        // Snapshot price newer than the history: 20% past the last high.
        let p = make_position("A", 100.0, 100.0, 120.0, 10);
        let mut s = signals(120.0, TrendDirection::Flat, 0.0, Momentum::Neutral);
        s.resistance = 100.0;
        assert!(run(p.clone(), s.clone()).is_empty());

        // Just above resistance still counts.
        s.resistance = 118.0;
        assert_eq!(run(p, s)[0].suggested_shares, 25.0);
    }

    #[test]
    fn neutral_fallback_never_counts_as_resistance() {
        let p = make_position("A", 100.0, 100.0, 120.0, 10);
        let s = TechnicalSignals::neutral(120.0, 0);
        assert!(run(p, s).is_empty());
    }

    #[test]
    fn small_gains_are_ignored() {
        let p = make_position("A", 100.0, 100.0, 105.0, 1);
        assert!(run(p, signals(105.0, TrendDirection::Flat, 0.0, Momentum::Negative)).is_empty());
    }
}
