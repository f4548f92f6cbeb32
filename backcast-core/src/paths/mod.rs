//! Synthetic future price paths.
//!
//! Both generators draw `horizon_days` daily returns, compound them from the
//! initial price and stamp the result with consecutive business days. The
//! random source is passed in, so a seeded RNG reproduces the path exactly.

pub mod bootstrap;
pub mod calendar;
pub mod forward;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{PricePoint, PriceSeries, ReturnSample};
use crate::error::{Error, Result};

/// Return-generation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathGenerator {
    /// Resample observed returns with replacement.
    HistoricalBootstrap,
    /// Normal returns with the observed mean and volatility.
    #[serde(rename = "forward_sim")]
    ForwardSimulation,
}

impl PathGenerator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HistoricalBootstrap => "historical_bootstrap",
            Self::ForwardSimulation => "forward_sim",
        }
    }
}

impl fmt::Display for PathGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathGenerator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "historical_bootstrap" => Ok(Self::HistoricalBootstrap),
            "forward_sim" => Ok(Self::ForwardSimulation),
            _ => Err(Error::invalid(
                "Invalid mode. Use 'historical_bootstrap' or 'forward_sim'",
            )),
        }
    }
}

/// Generate one synthetic path of `horizon_days + 1` prices.
///
/// The first point is `initial_price` on the first business day at or after
/// `start`. Fails if a drawn return drives the price to zero or below.
pub fn generate_path<R: Rng + ?Sized>(
    generator: PathGenerator,
    sample: &ReturnSample,
    horizon_days: usize,
    initial_price: f64,
    start: NaiveDate,
    rng: &mut R,
) -> Result<PriceSeries> {
    if sample.is_empty() {
        return Err(Error::EmptyReturnSample);
    }
    if horizon_days == 0 {
        return Err(Error::invalid("horizon_days must be at least 1"));
    }
    if !initial_price.is_finite() || initial_price <= 0.0 {
        return Err(Error::invalid(format!(
            "initial price must be positive and finite, got {initial_price}"
        )));
    }

    let returns = match generator {
        PathGenerator::HistoricalBootstrap => {
            bootstrap::draw_returns(sample.as_slice(), horizon_days, rng)
        }
        PathGenerator::ForwardSimulation => forward::draw_returns(sample, horizon_days, rng)?,
    };

    compound(&returns, initial_price, start)
}

/// Compound `returns` from `initial_price` onto a business-day calendar.
pub fn compound(returns: &[f64], initial_price: f64, start: NaiveDate) -> Result<PriceSeries> {
    let dates = calendar::business_days(start, returns.len() + 1);

    let mut price = initial_price;
    let mut points = Vec::with_capacity(dates.len());
    points.push(PricePoint::new(dates[0], price));
    for (step, (r, &date)) in returns.iter().zip(&dates[1..]).enumerate() {
        price *= 1.0 + r;
        if !price.is_finite() || price <= 0.0 {
            return Err(Error::invalid(format!(
                "simulated price became non-positive at step {}",
                step + 1
            )));
        }
        points.push(PricePoint::new(date, price));
    }
    PriceSeries::new(points)
}
