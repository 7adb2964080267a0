//! Holdwise Core: rule-based portfolio recommendation engine.
//!
//! This crate turns a snapshot of held positions, per-ticker price history,
//! and available cash into a prioritized, risk-bounded list of trade
//! recommendations:
//! - Domain types (positions, price series, candidates, recommendations)
//! - Technical indicators and the per-ticker signal bundle
//! - Position classifier and risk scorer
//! - Five independent recommendation generators
//! - Priority-ordered consolidation and risk-limit enforcement
//! - Portfolio metrics and risk narrative
//!
//! Everything here is pure computation: no I/O, no clocks, no randomness.

pub mod classify;
pub mod config;
pub mod consolidate;
pub mod domain;
pub mod engine;
pub mod generators;
pub mod indicators;
pub mod limits;
pub mod metrics;
pub mod signals;

pub use config::{EngineConfig, PolicyConfig, ProfileKind, SignalProfile};
pub use engine::{analyze, analyze_batch, AnalysisInput, AnalysisReport, AnalyzeError};
