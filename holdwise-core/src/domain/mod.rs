//! Domain types for Holdwise

pub mod candidate;
pub mod position;
pub mod price;
pub mod recommendation;
pub mod snapshot;

pub use candidate::BuyCandidate;
pub use position::{Position, TimeframeBucket};
pub use price::{PricePoint, PriceSeries};
pub use recommendation::{Action, ProfitTrigger, Recommendation, RiskLevel, StopTrigger};
pub use snapshot::{PortfolioSnapshot, SnapshotError};
