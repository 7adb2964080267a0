use serde::{Deserialize, Serialize};

/// Holding-age classification that selects which policy row applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeframeBucket {
    /// Held three days or less.
    New,
    /// Held four to thirty days.
    Established,
    /// Held more than thirty days.
    Mature,
}

impl TimeframeBucket {
    pub fn from_days_held(days_held: u32) -> Self {
        match days_held {
            0..=3 => Self::New,
            4..=30 => Self::Established,
            _ => Self::Mature,
        }
    }

    /// Calendar-day lookback used for this bucket's historical volatility.
    pub fn volatility_lookback_days(&self) -> i64 {
        match self {
            Self::New => 7,
            Self::Established => 30,
            Self::Mature => 90,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Established => "established",
            Self::Mature => "mature",
        }
    }
}

/// A held position for the duration of one analysis call.
///
/// `unrealized_pnl_pct` is in percent units (-6.0 means -6%).
/// `position_size_pct` is a fraction of total invested value (0.22 means 22%)
/// and, like `risk_score`, is filled in by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub shares: f64,
    pub average_cost: f64,
    pub current_price: f64,
    pub current_value: f64,
    pub unrealized_pnl: f64,
    pub unrealized_pnl_pct: f64,
    pub days_held: u32,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub position_size_pct: f64,
    #[serde(default)]
    pub risk_score: f64,
}

impl Position {
    /// Position with value and P&L fields derived from shares, cost, and price.
    pub fn new(
        ticker: impl Into<String>,
        shares: f64,
        average_cost: f64,
        current_price: f64,
        days_held: u32,
    ) -> Self {
        let current_value = shares * current_price;
        let unrealized_pnl = current_value - shares * average_cost;
        let unrealized_pnl_pct = if average_cost > 0.0 {
            (current_price - average_cost) / average_cost * 100.0
        } else {
            0.0
        };
        Self {
            ticker: ticker.into(),
            shares,
            average_cost,
            current_price,
            current_value,
            unrealized_pnl,
            unrealized_pnl_pct,
            days_held,
            sector: None,
            position_size_pct: 0.0,
            risk_score: 0.0,
        }
    }

    pub fn bucket(&self) -> TimeframeBucket {
        TimeframeBucket::from_days_held(self.days_held)
    }
}
