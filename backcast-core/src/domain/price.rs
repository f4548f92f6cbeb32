//! Close-price series and the return sample derived from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One close price on one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Date-ordered, null-free close prices.
///
/// Invariants (checked at construction): at least one point, strictly
/// increasing dates, every price finite and > 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::unavailable("No closing prices available"));
        }
        for (i, p) in points.iter().enumerate() {
            if !p.price.is_finite() || p.price <= 0.0 {
                return Err(Error::invalid(format!(
                    "price at {} must be positive and finite, got {}",
                    p.date, p.price
                )));
            }
            if i > 0 && points[i - 1].date >= p.date {
                return Err(Error::invalid(format!(
                    "dates must be strictly increasing ({} then {})",
                    points[i - 1].date, p.date
                )));
            }
        }
        Ok(Self { points })
    }

    /// Build a series from parallel date/price slices.
    pub fn from_parts(dates: &[NaiveDate], prices: &[f64]) -> Result<Self> {
        if dates.len() != prices.len() {
            return Err(Error::invalid(format!(
                "date/price length mismatch: {} dates, {} prices",
                dates.len(),
                prices.len()
            )));
        }
        Self::new(
            dates
                .iter()
                .zip(prices)
                .map(|(&date, &price)| PricePoint { date, price })
                .collect(),
        )
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first(&self) -> PricePoint {
        self.points[0]
    }

    pub fn last(&self) -> PricePoint {
        self.points[self.points.len() - 1]
    }

    /// Single-period simple returns `(p[t] - p[t-1]) / p[t-1]`.
    pub fn returns(&self) -> ReturnSample {
        ReturnSample::new(
            self.points
                .windows(2)
                .map(|w| (w[1].price - w[0].price) / w[0].price)
                .collect(),
        )
    }
}

/// Historical simple returns used to calibrate path generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSample {
    returns: Vec<f64>,
}

impl ReturnSample {
    pub fn new(returns: Vec<f64>) -> Self {
        Self { returns }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.returns
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    pub fn mean(&self) -> f64 {
        if self.returns.is_empty() {
            return 0.0;
        }
        self.returns.iter().sum::<f64>() / self.returns.len() as f64
    }

    /// Sample standard deviation (n - 1 denominator); 0 with fewer than two returns.
    pub fn std_dev(&self) -> f64 {
        let n = self.returns.len();
        if n < 2 {
            return 0.0;
        }
        let mean = self.mean();
        let var = self.returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    }
}
