//! Request payloads and their validation.
//!
//! Payloads arrive as loose JSON (any field may be missing or of the wrong
//! shape). Validation turns them into fully typed runs or fails with the
//! exact message the caller is shown.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use backcast_core::domain::{Frequency, StrategyKind, StrategyParameters};
use backcast_core::paths::PathGenerator;
use backcast_core::strategies::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use backcast_core::{Error, Result};

/// Upper bound on trials per simulation request.
pub const MAX_SIMULATIONS: usize = 10_000;

/// Trading days per year used to convert `horizon_years`.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Longest simulated horizon: 50 years of trading days.
pub const MAX_HORIZON_DAYS: usize = 12_600;

/// A number that may arrive as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<f64> for Amount {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

/// Direct backtest payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestRequest {
    pub ticker: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub capital: Option<Amount>,
    /// Strategy type tag; Buy & Hold when absent.
    pub strategy: Option<String>,
    pub short_window: Option<usize>,
    pub long_window: Option<usize>,
    pub frequency: Option<String>,
    pub contribution: Option<Amount>,
    pub target_growth_rate: Option<f64>,
    pub entry_price: Option<f64>,
    pub exit_price: Option<f64>,
    pub position_percent: Option<f64>,
    pub commission_dollars: Option<f64>,
}

/// A backtest request that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedBacktest {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub capital: f64,
    pub params: StrategyParameters,
}

impl BacktestRequest {
    pub fn validate(&self) -> Result<ValidatedBacktest> {
        let capital = self
            .capital
            .as_ref()
            .and_then(Amount::value)
            .filter(|c| c.is_finite() && *c > 0.0)
            .ok_or_else(|| Error::invalid("Invalid capital amount"))?;

        let contribution = match &self.contribution {
            None => None,
            Some(raw) => Some(
                raw.value()
                    .filter(|c| c.is_finite() && *c > 0.0)
                    .ok_or_else(|| Error::invalid("Invalid contribution amount"))?,
            ),
        };

        let ticker = self
            .ticker
            .as_deref()
            .map(|t| t.trim().to_ascii_uppercase())
            .unwrap_or_default();
        let start_raw = self.start_date.as_deref().unwrap_or_default().trim();
        let end_raw = self.end_date.as_deref().unwrap_or_default().trim();
        if ticker.is_empty() || start_raw.is_empty() || end_raw.is_empty() {
            return Err(Error::invalid("Missing required fields"));
        }

        let (start_date, end_date) = match (parse_date(start_raw), parse_date(end_raw)) {
            (Some(s), Some(e)) => (s, e),
            _ => return Err(Error::invalid("Invalid date format. Use YYYY-MM-DD")),
        };
        if start_date >= end_date {
            return Err(Error::invalid("Start date must be before end date"));
        }

        let kind = match self.strategy.as_deref() {
            None => StrategyKind::BuyHold,
            Some(s) => s.parse()?,
        };
        let frequency = || -> Result<Frequency> {
            self.frequency
                .as_deref()
                .map(str::parse::<Frequency>)
                .transpose()
                .map(Option::unwrap_or_default)
        };

        let params = match kind {
            StrategyKind::BuyHold => StrategyParameters::BuyHold,
            StrategyKind::BuyHoldAdvanced => StrategyParameters::BuyHoldAdvanced {
                entry_price: self.entry_price,
                exit_price: self.exit_price,
                position_percent: self.position_percent.unwrap_or(100.0),
                commission_dollars: self.commission_dollars.unwrap_or(0.0),
            },
            StrategyKind::SmaCrossover => StrategyParameters::SmaCrossover {
                short_window: self.short_window.unwrap_or(DEFAULT_SHORT_WINDOW),
                long_window: self.long_window.unwrap_or(DEFAULT_LONG_WINDOW),
            },
            StrategyKind::Dca => StrategyParameters::Dca {
                frequency: frequency()?,
                contribution,
            },
            StrategyKind::ValueAveraging => StrategyParameters::ValueAveraging {
                frequency: frequency()?,
                target_growth_rate: self.target_growth_rate,
            },
        };
        params.validate()?;

        Ok(ValidatedBacktest {
            ticker,
            start_date,
            end_date,
            capital,
            params,
        })
    }
}

/// `YYYY-MM-DD`, or an ISO date-time whose date part is used.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Monte Carlo payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloRequest {
    pub strategy_id: Option<String>,
    pub user_id: Option<String>,
    pub mode: Option<String>,
    pub horizon_days: Option<i64>,
    pub horizon_years: Option<f64>,
    pub num_simulations: Option<i64>,
    /// Overrides the configured master seed.
    pub seed: Option<u64>,
}

/// A simulation request that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloRun {
    pub strategy_id: String,
    pub user_id: Option<String>,
    pub mode: PathGenerator,
    pub horizon_days: usize,
    pub num_simulations: usize,
    pub seed: Option<u64>,
}

impl MonteCarloRequest {
    /// Validate the payload. `default_num_simulations` applies when the
    /// request leaves the count out.
    pub fn validate(&self, default_num_simulations: usize) -> Result<MonteCarloRun> {
        let strategy_id = self
            .strategy_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::invalid("Missing required fields"))?
            .to_string();

        let mode: PathGenerator = self
            .mode
            .as_deref()
            .ok_or_else(|| Error::invalid("Missing required fields"))?
            .parse()?;

        let horizon_days = match (self.horizon_days, self.horizon_years) {
            (Some(days), None) => days,
            (None, Some(years)) => {
                if !years.is_finite() || years <= 0.0 {
                    return Err(Error::invalid("horizon_years must be a positive number"));
                }
                let days = (years * TRADING_DAYS_PER_YEAR).round();
                // Range-check before the cast, which would saturate.
                if days > MAX_HORIZON_DAYS as f64 {
                    return Err(horizon_too_long());
                }
                days as i64
            }
            _ => {
                return Err(Error::invalid(
                    "Provide exactly one of horizon_days or horizon_years",
                ))
            }
        };
        if horizon_days < 1 {
            return Err(Error::invalid("Horizon must be at least 1 trading day"));
        }
        if horizon_days > MAX_HORIZON_DAYS as i64 {
            return Err(horizon_too_long());
        }

        let num_simulations = self
            .num_simulations
            .unwrap_or(default_num_simulations as i64);
        if !(1..=MAX_SIMULATIONS as i64).contains(&num_simulations) {
            return Err(Error::invalid(format!(
                "num_simulations must be between 1 and {MAX_SIMULATIONS}"
            )));
        }

        Ok(MonteCarloRun {
            strategy_id,
            user_id: self
                .user_id
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(String::from),
            mode,
            horizon_days: horizon_days as usize,
            num_simulations: num_simulations as usize,
            seed: self.seed,
        })
    }
}

fn horizon_too_long() -> Error {
    Error::invalid(format!(
        "Horizon must be at most {MAX_HORIZON_DAYS} trading days"
    ))
}
