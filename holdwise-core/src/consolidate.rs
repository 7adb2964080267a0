//! Consolidator: one recommendation per ticker, chosen by priority.
//!
//! Tiers, highest first:
//! 1. stop-losses with confidence >= 90
//! 2. profit-taking with confidence >= 80
//! 3. remaining stop-losses
//! 4. remaining profit-taking
//! 5. tactical averaging-down
//! 6. rebalancing
//! 7. new positions
//!
//! Within a tier, generator order is kept. The first recommendation seen for a
//! ticker wins; later ones are dropped, never merged.

use std::collections::HashSet;

use crate::domain::Recommendation;
use crate::generators::GeneratorOutputs;

pub const URGENT_STOP_CONFIDENCE: f64 = 90.0;
pub const URGENT_PROFIT_CONFIDENCE: f64 = 80.0;

/// Flatten generator output into the final priority-ordered list.
pub fn consolidate(outputs: GeneratorOutputs) -> Vec<Recommendation> {
    let GeneratorOutputs {
        stop_loss,
        profit_taking,
        averaging_down,
        rebalance,
        new_positions,
    } = outputs;

    let (urgent_stops, other_stops): (Vec<_>, Vec<_>) = stop_loss
        .into_iter()
        .partition(|r| r.confidence >= URGENT_STOP_CONFIDENCE);
    let (urgent_profits, other_profits): (Vec<_>, Vec<_>) = profit_taking
        .into_iter()
        .partition(|r| r.confidence >= URGENT_PROFIT_CONFIDENCE);

    let tiers = [
        urgent_stops,
        urgent_profits,
        other_stops,
        other_profits,
        averaging_down,
        rebalance,
        new_positions,
    ];

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for rec in tiers.into_iter().flatten() {
        if seen.insert(rec.ticker.clone()) {
            out.push(rec);
        } else {
            tracing::debug!(
                ticker = %rec.ticker,
                action = rec.action.label(),
                "dropping lower-priority duplicate"
            );
        }
    }
    out
}
