//! Recommendation: the engine's unit of output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a stop-loss fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopTrigger {
    /// Loss reached the bucket's stop-loss threshold.
    Hard,
    /// Fresh position already down 5% or more.
    SameDay,
    /// Negative momentum with the loss at 70% of the threshold.
    Soft,
}

/// Why profit-taking fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitTrigger {
    /// Gain reached the bucket threshold.
    Target,
    /// Gain close to the threshold with price pressing on resistance.
    ApproachResistance,
}

/// Trade action with its action-specific payload.
///
/// Serialized with an explicit `kind` tag, e.g. `{"kind":"sell-stop-loss","trigger":"hard"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Action {
    BuyInitial { budget: f64 },
    BuyAveragingDown { added_fraction: f64 },
    BuyMomentum,
    SellProfitTaking { fraction: f64, trigger: ProfitTrigger },
    SellStopLoss { trigger: StopTrigger },
    SellRebalance { current_weight: f64, target_weight: f64 },
    SellTrailingStop { trail_pct: f64 },
    Hold,
    ReducePosition { fraction: f64 },
}

impl Action {
    pub fn is_buy(&self) -> bool {
        matches!(
            self,
            Self::BuyInitial { .. } | Self::BuyAveragingDown { .. } | Self::BuyMomentum
        )
    }

    pub fn is_sell(&self) -> bool {
        matches!(
            self,
            Self::SellProfitTaking { .. }
                | Self::SellStopLoss { .. }
                | Self::SellRebalance { .. }
                | Self::SellTrailingStop { .. }
                | Self::ReducePosition { .. }
        )
    }

    /// Stable kebab-case name, identical to the serialized tag.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BuyInitial { .. } => "buy-initial",
            Self::BuyAveragingDown { .. } => "buy-averaging-down",
            Self::BuyMomentum => "buy-momentum",
            Self::SellProfitTaking { .. } => "sell-profit-taking",
            Self::SellStopLoss { .. } => "sell-stop-loss",
            Self::SellRebalance { .. } => "sell-rebalance",
            Self::SellTrailingStop { .. } => "sell-trailing-stop",
            Self::Hold => "hold",
            Self::ReducePosition { .. } => "reduce-position",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Four-level risk label shared by recommendations and the portfolio narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    /// Label for a single position's 0–10 risk score.
    pub fn from_position_score(score: f64) -> Self {
        if score >= 8.0 {
            Self::VeryHigh
        } else if score >= 6.5 {
            Self::High
        } else if score >= 4.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Label for an accumulated portfolio risk score (fixed bands).
    pub fn from_portfolio_score(score: u32) -> Self {
        match score {
            s if s >= 8 => Self::VeryHigh,
            s if s >= 5 => Self::High,
            s if s >= 3 => Self::Moderate,
            _ => Self::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::VeryHigh => "very-high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One trade recommendation for one ticker.
///
/// Created by exactly one generator. Only the risk-limit enforcer mutates it
/// afterwards, and it records a reason each time it shrinks `suggested_shares`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub ticker: String,
    pub action: Action,
    pub suggested_shares: f64,
    pub target_price: f64,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub risk_assessment: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_position_size: Option<f64>,
}

impl Recommendation {
    /// Confidence is clamped to [0, 100] and shares to >= 0.
    pub fn new(
        ticker: impl Into<String>,
        action: Action,
        suggested_shares: f64,
        target_price: f64,
        confidence: f64,
        risk_assessment: RiskLevel,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            action,
            suggested_shares: suggested_shares.max(0.0),
            target_price,
            confidence: confidence.clamp(0.0, 100.0),
            reasons: Vec::new(),
            risk_assessment,
            stop_loss_price: None,
            take_profit_price: None,
            max_position_size: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }

    pub fn with_stop_loss(mut self, price: f64) -> Self {
        self.stop_loss_price = Some(price);
        self
    }

    pub fn with_take_profit(mut self, price: f64) -> Self {
        self.take_profit_price = Some(price);
        self
    }

    pub fn with_max_position_size(mut self, size: f64) -> Self {
        self.max_position_size = Some(size);
        self
    }

    /// Cash needed to fill this recommendation at its target price.
    pub fn notional(&self) -> f64 {
        self.suggested_shares * self.target_price
    }
}
