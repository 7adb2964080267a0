//! Engine: one call from snapshot to report.
//!
//! Pipeline: validate → classify → signals → generators → consolidate →
//! enforce limits, with metrics and the risk narrative computed from the
//! classified positions alongside. Pure and synchronous; identical inputs
//! give identical reports, down to the fingerprint.

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::classify_positions;
use crate::config::{ConfigError, EngineConfig};
use crate::consolidate::consolidate;
use crate::domain::{BuyCandidate, PortfolioSnapshot, Position, PriceSeries, Recommendation, SnapshotError};
use crate::generators::{run_all, GeneratorInput};
use crate::limits::enforce_limits;
use crate::metrics::{assess_risk, PortfolioMetrics, RiskAssessment};
use crate::signals::{compute_all, TechnicalSignals};

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("fingerprint serialization failed: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Everything one analysis consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub snapshot: PortfolioSnapshot,
    /// Price history keyed by ticker. Missing tickers get neutral signals.
    #[serde(default)]
    pub history: HashMap<String, PriceSeries>,
    #[serde(default)]
    pub candidates: Vec<BuyCandidate>,
}

impl AnalysisInput {
    pub fn new(snapshot: PortfolioSnapshot) -> Self {
        Self {
            snapshot,
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: HashMap<String, PriceSeries>) -> Self {
        self.history = history;
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<BuyCandidate>) -> Self {
        self.candidates = candidates;
        self
    }
}

/// Result of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Final recommendations in priority order, one per ticker.
    pub recommendations: Vec<Recommendation>,
    /// Positions with weight and risk score filled in.
    pub positions: Vec<Position>,
    pub metrics: PortfolioMetrics,
    pub risk: RiskAssessment,
    pub signals: BTreeMap<String, TechnicalSignals>,
    /// Recommendations produced before consolidation.
    pub generated: usize,
    /// BLAKE3 hex digest of the canonical input and configuration.
    pub fingerprint: String,
}

/// Run the full pipeline over one snapshot.
pub fn analyze(input: &AnalysisInput, config: &EngineConfig) -> Result<AnalysisReport, AnalyzeError> {
    config.validate()?;
    input.snapshot.validate()?;

    let snapshot = &input.snapshot;
    let policy = &config.policy;
    let positions = classify_positions(&snapshot.positions, &input.history, policy);
    let signals = compute_all(&positions, &input.history, &config.profile);

    let generator_input = GeneratorInput {
        positions: &positions,
        signals: &signals,
        config,
        cash: snapshot.cash,
        candidates: &input.candidates,
    };
    let outputs = run_all(&generator_input);
    let generated = outputs.total();

    let recommendations = enforce_limits(
        consolidate(outputs),
        snapshot.cash,
        snapshot.total_value(),
        policy,
    );

    let metrics = PortfolioMetrics::compute(&positions, snapshot.cash);
    let risk = assess_risk(&positions, &metrics, policy);
    let fingerprint = fingerprint(input, config)?;

    tracing::info!(
        positions = positions.len(),
        generated,
        recommendations = recommendations.len(),
        risk = risk.level.label(),
        fingerprint = %&fingerprint[..12],
        "analysis complete"
    );

    Ok(AnalysisReport {
        recommendations,
        positions,
        metrics,
        risk,
        signals: signals.into_iter().collect(),
        generated,
        fingerprint,
    })
}

/// Analyze independent inputs in parallel. Results keep input order.
pub fn analyze_batch(
    inputs: &[AnalysisInput],
    config: &EngineConfig,
) -> Vec<Result<AnalysisReport, AnalyzeError>> {
    inputs.par_iter().map(|input| analyze(input, config)).collect()
}

/// Deterministic BLAKE3 digest of input and configuration.
///
/// Serializing through `serde_json::Value` sorts map keys, so the digest does
/// not depend on `HashMap` iteration order.
pub fn fingerprint(input: &AnalysisInput, config: &EngineConfig) -> Result<String, AnalyzeError> {
    let canonical = serde_json::json!({
        "input": serde_json::to_value(input)?,
        "config": serde_json::to_value(config)?,
    });
    let hash = blake3::hash(canonical.to_string().as_bytes());
    Ok(hash.to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::series_from_closes;
    use crate::domain::snapshot::make_position;
    use crate::domain::Action;

    fn sample_input() -> AnalysisInput {
        let snapshot = PortfolioSnapshot::new(
            vec![
                make_position("FRESH", 40.0, 100.0, 94.0, 1),
                make_position("STEADY", 20.0, 50.0, 51.0, 20),
            ],
            20_000.0,
        );
        let mut history = HashMap::new();
        history.insert("FRESH".to_string(), series_from_closes(&[100.0, 98.0, 96.0, 94.0]));
        history.insert("STEADY".to_string(), series_from_closes(&[50.0, 50.5, 51.0]));
        AnalysisInput::new(snapshot).with_history(history)
    }

    #[test]
    fn pipeline_produces_stop_for_fresh_loser() {
        let report = analyze(&sample_input(), &EngineConfig::default()).unwrap();
        let fresh = report
            .recommendations
            .iter()
            .find(|r| r.ticker == "FRESH")
            .unwrap();
        assert!(matches!(fresh.action, Action::SellStopLoss { .. }));
        assert_eq!(fresh.suggested_shares, 40.0);
        assert_eq!(report.positions.len(), 2);
        assert_eq!(report.signals.len(), 2);
    }

    #[test]
    fn fingerprint_is_stable_and_config_sensitive() {
        let input = sample_input();
        let a = analyze(&input, &EngineConfig::default()).unwrap();
        let b = analyze(&input.clone(), &EngineConfig::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.fingerprint.len(), 64);

        let short = EngineConfig::default().with_profile(crate::config::ProfileKind::ShortHorizon);
        assert_ne!(fingerprint(&input, &short).unwrap(), a.fingerprint);
    }

    #[test]
    fn invalid_snapshot_is_rejected() {
        let mut input = sample_input();
        input.snapshot.cash = -1.0;
        assert!(matches!(
            analyze(&input, &EngineConfig::default()),
            Err(AnalyzeError::Snapshot(_))
        ));
    }

    #[test]
    fn batch_keeps_order() {
        let mut bad = sample_input();
        bad.snapshot.positions[0].shares = 0.0;
        let results = analyze_batch(&[sample_input(), bad], &EngineConfig::default());
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
