use serde::{Deserialize, Serialize};

/// Externally ranked buy idea fed to new-position sourcing.
///
/// `confidence` uses the same 0–100 scale as recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyCandidate {
    pub ticker: String,
    pub price: f64,
    pub confidence: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
}
