//! Engine configuration: policy tables and signal profiles.
//!
//! The configuration is an immutable value handed to every generator call.
//! It is stored as TOML; every field has a default, so a partial file only
//! overrides what it names.
//!
//! Percent fields (`*_pct`) are in percent units (8.0 = 8%). Size fields are
//! fractions (0.15 = 15% of the portfolio).

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::domain::TimeframeBucket;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

/// Stop-loss, profit-taking, and size limits for one timeframe bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketPolicy {
    pub stop_loss_pct: f64,
    pub profit_taking_pct: f64,
    pub max_position_size: f64,
}

/// A `[policy.<bucket>]` table as written; absent fields keep the bucket default.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct BucketOverride {
    stop_loss_pct: Option<f64>,
    profit_taking_pct: Option<f64>,
    max_position_size: Option<f64>,
}

impl BucketOverride {
    fn apply(self, base: BucketPolicy) -> BucketPolicy {
        BucketPolicy {
            stop_loss_pct: self.stop_loss_pct.unwrap_or(base.stop_loss_pct),
            profit_taking_pct: self.profit_taking_pct.unwrap_or(base.profit_taking_pct),
            max_position_size: self.max_position_size.unwrap_or(base.max_position_size),
        }
    }
}

/// Sizing rules for positions opened from the external candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewPositionPolicy {
    /// Fraction of available cash one new position may use.
    pub max_size: f64,
    /// Absolute cash cap per new position.
    pub max_amount: f64,
    pub stop_loss_pct: f64,
    /// No new positions below this much cash.
    pub min_cash: f64,
    /// Candidates below this confidence are ignored.
    pub min_confidence: f64,
}

impl Default for NewPositionPolicy {
    fn default() -> Self {
        Self {
            max_size: 0.10,
            max_amount: 10_000.0,
            stop_loss_pct: 8.0,
            min_cash: 5_000.0,
            min_confidence: 80.0,
        }
    }
}

/// Tactical averaging-down window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AveragingDownPolicy {
    pub max_days_held: u32,
    /// Loss must be strictly above this (e.g. -8.0)...
    pub loss_floor_pct: f64,
    /// ...and strictly below this (e.g. -3.0).
    pub loss_ceiling_pct: f64,
    /// Largest add as a fraction of held shares.
    pub max_add_fraction: f64,
    /// Largest add in cash terms.
    pub cash_ceiling: f64,
}

impl Default for AveragingDownPolicy {
    fn default() -> Self {
        Self {
            max_days_held: 7,
            loss_floor_pct: -8.0,
            loss_ceiling_pct: -3.0,
            max_add_fraction: 0.20,
            cash_ceiling: 2_000.0,
        }
    }
}

/// Risk policy tables, one row per timeframe bucket plus generator limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PolicyFile")]
pub struct PolicyConfig {
    pub new: BucketPolicy,
    pub established: BucketPolicy,
    pub mature: BucketPolicy,
    /// Slack above a bucket's max size before rebalancing fires.
    pub rebalance_tolerance: f64,
    /// Historical volatility (percent) above which a position's risk score rises.
    pub high_volatility_pct: f64,
    pub new_position: NewPositionPolicy,
    pub averaging_down: AveragingDownPolicy,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            new: BucketPolicy {
                stop_loss_pct: 8.0,
                profit_taking_pct: 15.0,
                max_position_size: 0.10,
            },
            established: BucketPolicy {
                stop_loss_pct: 12.0,
                profit_taking_pct: 25.0,
                max_position_size: 0.15,
            },
            mature: BucketPolicy {
                stop_loss_pct: 20.0,
                profit_taking_pct: 40.0,
                max_position_size: 0.20,
            },
            rebalance_tolerance: 0.05,
            high_volatility_pct: 10.0,
            new_position: NewPositionPolicy::default(),
            averaging_down: AveragingDownPolicy::default(),
        }
    }
}

/// The `[policy]` table as written. Bucket rows are merged field by field
/// over that bucket's own defaults.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct PolicyFile {
    new: BucketOverride,
    established: BucketOverride,
    mature: BucketOverride,
    rebalance_tolerance: Option<f64>,
    high_volatility_pct: Option<f64>,
    new_position: NewPositionPolicy,
    averaging_down: AveragingDownPolicy,
}

impl From<PolicyFile> for PolicyConfig {
    fn from(file: PolicyFile) -> Self {
        let base = Self::default();
        Self {
            new: file.new.apply(base.new),
            established: file.established.apply(base.established),
            mature: file.mature.apply(base.mature),
            rebalance_tolerance: file.rebalance_tolerance.unwrap_or(base.rebalance_tolerance),
            high_volatility_pct: file.high_volatility_pct.unwrap_or(base.high_volatility_pct),
            new_position: file.new_position,
            averaging_down: file.averaging_down,
        }
    }
}

impl PolicyConfig {
    /// Policy row for a bucket.
    pub fn bucket(&self, bucket: TimeframeBucket) -> &BucketPolicy {
        match bucket {
            TimeframeBucket::New => &self.new,
            TimeframeBucket::Established => &self.established,
            TimeframeBucket::Mature => &self.mature,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, row) in [
            ("new", &self.new),
            ("established", &self.established),
            ("mature", &self.mature),
        ] {
            positive(&format!("{name}.stop_loss_pct"), row.stop_loss_pct)?;
            positive(&format!("{name}.profit_taking_pct"), row.profit_taking_pct)?;
            fraction(&format!("{name}.max_position_size"), row.max_position_size)?;
        }
        non_negative("rebalance_tolerance", self.rebalance_tolerance)?;
        positive("high_volatility_pct", self.high_volatility_pct)?;

        let np = &self.new_position;
        fraction("new_position.max_size", np.max_size)?;
        positive("new_position.max_amount", np.max_amount)?;
        positive("new_position.stop_loss_pct", np.stop_loss_pct)?;
        non_negative("new_position.min_cash", np.min_cash)?;
        if !(0.0..=100.0).contains(&np.min_confidence) {
            return Err(invalid("new_position.min_confidence", "must be within 0..=100"));
        }

        let ad = &self.averaging_down;
        if ad.loss_floor_pct >= ad.loss_ceiling_pct {
            return Err(invalid(
                "averaging_down.loss_floor_pct",
                "must be below averaging_down.loss_ceiling_pct",
            ));
        }
        fraction("averaging_down.max_add_fraction", ad.max_add_fraction)?;
        non_negative("averaging_down.cash_ceiling", ad.cash_ceiling)?;
        Ok(())
    }
}

/// Named signal profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileKind {
    /// Tighter thresholds for callers reviewing positions held a few days.
    ShortHorizon,
    /// Looser thresholds for a general portfolio review.
    #[default]
    General,
}

impl ProfileKind {
    pub fn profile(&self) -> SignalProfile {
        match self {
            Self::ShortHorizon => SignalProfile::short_horizon(),
            Self::General => SignalProfile::general(),
        }
    }
}

/// Thresholds used by the technical signal computer.
///
/// Slopes are in price units per period, so they are on the caller's price scale.
/// In TOML, `kind` selects the base thresholds and any other field overrides them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProfileFile")]
pub struct SignalProfile {
    pub kind: ProfileKind,
    /// Points used for the trend regression.
    pub trend_window: usize,
    /// |slope| above this classifies the trend as up/down.
    pub trend_threshold: f64,
    /// Momentum % beyond ± this band is positive/negative.
    pub momentum_band_pct: f64,
    /// Points used for return volatility.
    pub volatility_window: usize,
    /// Slope above which a young winner is protected from rebalancing.
    pub strong_trend_slope: f64,
}

impl SignalProfile {
    pub fn short_horizon() -> Self {
        Self {
            kind: ProfileKind::ShortHorizon,
            trend_window: 5,
            trend_threshold: 50.0,
            momentum_band_pct: 1.0,
            volatility_window: 5,
            strong_trend_slope: 100.0,
        }
    }

    pub fn general() -> Self {
        Self {
            kind: ProfileKind::General,
            trend_window: 10,
            trend_threshold: 100.0,
            momentum_band_pct: 2.0,
            volatility_window: 10,
            strong_trend_slope: 100.0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trend_window < 2 {
            return Err(invalid("profile.trend_window", "must be >= 2"));
        }
        if self.volatility_window < 3 {
            return Err(invalid("profile.volatility_window", "must be >= 3"));
        }
        non_negative("profile.trend_threshold", self.trend_threshold)?;
        non_negative("profile.momentum_band_pct", self.momentum_band_pct)?;
        non_negative("profile.strong_trend_slope", self.strong_trend_slope)?;
        Ok(())
    }
}

impl Default for SignalProfile {
    fn default() -> Self {
        Self::general()
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct ProfileFile {
    kind: ProfileKind,
    trend_window: Option<usize>,
    trend_threshold: Option<f64>,
    momentum_band_pct: Option<f64>,
    volatility_window: Option<usize>,
    strong_trend_slope: Option<f64>,
}

impl From<ProfileFile> for SignalProfile {
    fn from(file: ProfileFile) -> Self {
        let base = file.kind.profile();
        Self {
            kind: file.kind,
            trend_window: file.trend_window.unwrap_or(base.trend_window),
            trend_threshold: file.trend_threshold.unwrap_or(base.trend_threshold),
            momentum_band_pct: file.momentum_band_pct.unwrap_or(base.momentum_band_pct),
            volatility_window: file.volatility_window.unwrap_or(base.volatility_window),
            strong_trend_slope: file.strong_trend_slope.unwrap_or(base.strong_trend_slope),
        }
    }
}

/// Everything the engine needs besides the data itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub policy: PolicyConfig,
    pub profile: SignalProfile,
}

impl EngineConfig {
    pub fn with_profile(mut self, kind: ProfileKind) -> Self {
        self.profile = kind.profile();
        self
    }

    /// Load and validate a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        self.profile.validate()
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be > 0 (got {value})")))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be >= 0 (got {value})")))
    }
}

fn fraction(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be within (0, 1] (got {value})")))
    }
}
