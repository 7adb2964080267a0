//! Price history: the only market data the engine sees.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single closing price for one ticker on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Ascending sequence of closing prices for one ticker.
///
/// May be empty or very short. Every consumer must degrade to neutral
/// values instead of failing when there are too few points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting by date so callers may pass points in any order.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closing prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Closes dated within `days` calendar days of the last point (inclusive).
    ///
    /// Returns an empty vector for an empty series.
    pub fn closes_within_days(&self, days: i64) -> Vec<f64> {
        let Some(last) = self.last_date() else {
            return Vec::new();
        };
        let cutoff = last - Duration::days(days);
        self.points
            .iter()
            .filter(|p| p.date >= cutoff)
            .map(|p| p.close)
            .collect()
    }
}

impl PriceSeries {
    /// One close per calendar day starting at `start`.
    pub fn from_daily_closes(start: NaiveDate, closes: &[f64]) -> Self {
        Self::new(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| PricePoint::new(start + Duration::days(i as i64), c))
                .collect(),
        )
    }
}

impl From<Vec<PricePoint>> for PriceSeries {
    fn from(points: Vec<PricePoint>) -> Self {
        Self::new(points)
    }
}

/// Build a daily series from closes, starting 2024-01-02. Test helper.
#[cfg(test)]
pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    PriceSeries::from_daily_closes(base, closes)
}
