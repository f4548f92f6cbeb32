//! Monte Carlo replay of a saved strategy over synthetic futures.
//!
//! A run moves through four stages: validate the request and the stored
//! strategy, calibrate a return sample from history, simulate independent
//! trials in parallel, then aggregate terminal capitals. Each trial owns its
//! RNG, derived from the master seed, the strategy id and the trial index,
//! so results do not depend on thread count or scheduling.

use chrono::{Local, Months, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use backcast_core::data::extract_close_series;
use backcast_core::domain::{PriceSeries, ReturnSample, StrategyKind, StrategyParameters};
use backcast_core::paths::{generate_path, PathGenerator};
use backcast_core::rng::RngHierarchy;
use backcast_core::stats::{summarize, Percentiles};
use backcast_core::{strategies, Error};

use crate::config::{ConfigError, MonteCarloConfig};
use crate::error::RunError;
use crate::provider::PriceProvider;
use crate::repository::{RepoError, StoredStrategy, StrategyRepository};
use crate::request::{MonteCarloRequest, MonteCarloRun};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McStatistics {
    pub mean_final_capital: f64,
    pub std_final_capital: f64,
    pub min_final_capital: f64,
    pub max_final_capital: f64,
    pub percentiles: Percentiles,
    pub return_percentiles: Percentiles,
    /// Percent of trials ending below the initial capital.
    pub probability_of_loss: f64,
}

/// Preview of individual outcomes, in trial order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub final_capitals: Vec<f64>,
    pub returns: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub strategy_id: String,
    pub strategy_type: StrategyKind,
    pub ticker: String,
    pub initial_capital: f64,
    pub mode: PathGenerator,
    pub horizon_days: usize,
    pub num_simulations: usize,
    pub successful_simulations: usize,
    pub seed: u64,
    pub statistics: McStatistics,
    pub distribution: Distribution,
}

/// Everything the simulation stage needs, resolved during validation.
#[derive(Debug, Clone)]
struct Plan {
    run: MonteCarloRun,
    stored: StoredStrategy,
    ticker: String,
    capital: f64,
    params: StrategyParameters,
}

/// Calibrated return sample and the price paths start from.
#[derive(Debug, Clone)]
struct Calibration {
    sample: ReturnSample,
    initial_price: f64,
}

pub struct MonteCarloEngine<'a> {
    provider: &'a dyn PriceProvider,
    repository: &'a dyn StrategyRepository,
    config: MonteCarloConfig,
    today: NaiveDate,
}

impl<'a> MonteCarloEngine<'a> {
    pub fn new(
        provider: &'a dyn PriceProvider,
        repository: &'a dyn StrategyRepository,
        config: MonteCarloConfig,
    ) -> Self {
        Self {
            provider,
            repository,
            config,
            today: Local::now().date_naive(),
        }
    }

    /// Pin the reference date used for calibration windows and path starts.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn run(&self, request: &MonteCarloRequest) -> Result<MonteCarloResult, RunError> {
        let plan = self.validate(request)?;
        let calibration = self.calibrate(&plan)?;
        let seed = plan.run.seed.unwrap_or(self.config.seed);
        let outcomes = self.simulate(&plan, &calibration, seed)?;
        self.aggregate(&plan, seed, &outcomes)
    }

    fn validate(&self, request: &MonteCarloRequest) -> Result<Plan, RunError> {
        let run = request.validate(self.config.default_num_simulations)?;
        let stored = self.repository.get(&run.strategy_id)?;

        // A strategy owned by someone else is indistinguishable from a missing one.
        if let Some(user) = &run.user_id {
            if !stored.is_owned_by(user) {
                return Err(RepoError::NotFound {
                    strategy_id: run.strategy_id.clone(),
                }
                .into());
            }
        }

        let kind = stored.kind()?;
        if !kind.is_monte_carlo_eligible() {
            return Err(Error::invalid(format!(
                "Monte Carlo simulation is not supported for strategy type '{kind}'"
            ))
            .into());
        }

        let capital = stored.money_invested;
        if !capital.is_finite() || capital <= 0.0 {
            return Err(Error::invalid("Invalid capital amount").into());
        }

        let params = replay_parameters(stored.parameters()?);
        let ticker = stored.ticker();
        info!(
            strategy_id = %run.strategy_id,
            strategy = %kind,
            ticker = %ticker,
            mode = %run.mode,
            horizon_days = run.horizon_days,
            num_simulations = run.num_simulations,
            "monte carlo run validated"
        );

        Ok(Plan {
            run,
            stored,
            ticker,
            capital,
            params,
        })
    }

    fn calibrate(&self, plan: &Plan) -> Result<Calibration, RunError> {
        let (series, initial_price) = match plan.run.mode {
            PathGenerator::ForwardSimulation => {
                let series = self.trailing_series(&plan.ticker)?;
                let price = series.last().price;
                (series, price)
            }
            PathGenerator::HistoricalBootstrap => {
                let series = match self.fetch_series(
                    &plan.ticker,
                    plan.stored.start_date,
                    plan.stored.end_date,
                ) {
                    Ok(s) => s,
                    Err(e) => {
                        warn!(
                            ticker = %plan.ticker,
                            error = %e,
                            "stored range unavailable, calibrating on trailing window"
                        );
                        self.trailing_series(&plan.ticker)?
                    }
                };
                let price = series.first().price;
                (series, price)
            }
        };

        let required = self.config.min_calibration_points;
        if series.len() < required {
            return Err(Error::InsufficientData {
                required,
                available: series.len(),
            }
            .into());
        }

        let sample = series.returns();
        if sample.is_empty() {
            return Err(Error::EmptyReturnSample.into());
        }
        debug!(
            points = series.len(),
            mean = sample.mean(),
            std_dev = sample.std_dev(),
            initial_price,
            "calibrated"
        );
        Ok(Calibration {
            sample,
            initial_price,
        })
    }

    fn trailing_series(&self, ticker: &str) -> Result<PriceSeries, RunError> {
        let months = Months::new(12 * self.config.calibration_years);
        let start = self.today.checked_sub_months(months).ok_or_else(|| {
            Error::invalid(format!(
                "calibration window of {} years is out of range",
                self.config.calibration_years
            ))
        })?;
        self.fetch_series(ticker, start, self.today)
    }

    fn fetch_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, RunError> {
        let table = self.provider.fetch(ticker, start, end)?;
        Ok(extract_close_series(Some(&table), ticker)?)
    }

    /// Run every trial. Failed trials yield `None` and are excluded later.
    fn simulate(
        &self,
        plan: &Plan,
        calibration: &Calibration,
        seed: u64,
    ) -> Result<Vec<Option<f64>>, RunError> {
        let rngs = RngHierarchy::new(seed);
        let trial = |i: usize| -> Option<f64> {
            let mut rng = rngs.rng_for(&plan.run.strategy_id, i as u64);
            let outcome = generate_path(
                plan.run.mode,
                &calibration.sample,
                plan.run.horizon_days,
                calibration.initial_price,
                self.today,
                &mut rng,
            )
            .and_then(|path| strategies::evaluate(&path, &plan.params, plan.capital))
            .map(|r| r.terminal_capital());

            match outcome {
                Ok(capital) if capital.is_finite() => Some(capital),
                Ok(capital) => {
                    debug!(trial = i, capital, "trial skipped: non-finite outcome");
                    None
                }
                Err(e) => {
                    debug!(trial = i, error = %e, "trial skipped");
                    None
                }
            }
        };

        let n = plan.run.num_simulations;
        let outcomes: Vec<Option<f64>> = match self.config.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| ConfigError::Invalid(format!("thread pool: {e}")))?;
                pool.install(|| (0..n).into_par_iter().map(trial).collect())
            }
            None => (0..n).into_par_iter().map(trial).collect(),
        };
        Ok(outcomes)
    }

    fn aggregate(
        &self,
        plan: &Plan,
        seed: u64,
        outcomes: &[Option<f64>],
    ) -> Result<MonteCarloResult, RunError> {
        let capitals: Vec<f64> = outcomes.iter().flatten().copied().collect();
        let skipped = outcomes.len() - capitals.len();
        if skipped > 0 {
            warn!(
                skipped,
                total = outcomes.len(),
                "some simulations produced no outcome"
            );
        }

        let summary = summarize(&capitals, plan.capital, self.config.preview_len)?;
        info!(
            successful = summary.count,
            mean = summary.mean,
            probability_of_loss = summary.probability_of_loss,
            "monte carlo run complete"
        );

        Ok(MonteCarloResult {
            strategy_id: plan.run.strategy_id.clone(),
            strategy_type: plan.params.kind(),
            ticker: plan.ticker.clone(),
            initial_capital: plan.capital,
            mode: plan.run.mode,
            horizon_days: plan.run.horizon_days,
            num_simulations: plan.run.num_simulations,
            successful_simulations: summary.count,
            seed,
            statistics: McStatistics {
                mean_final_capital: summary.mean,
                std_final_capital: summary.std_dev,
                min_final_capital: summary.min,
                max_final_capital: summary.max,
                percentiles: summary.percentiles,
                return_percentiles: summary.return_percentiles,
                probability_of_loss: summary.probability_of_loss,
            },
            distribution: Distribution {
                final_capitals: summary.preview_capitals,
                returns: summary.preview_returns,
            },
        })
    }
}

/// Parameters used on synthetic paths. Absolute entry/exit prices refer to
/// historical levels, so the advanced buy & hold replays without them.
fn replay_parameters(params: StrategyParameters) -> StrategyParameters {
    match params {
        StrategyParameters::BuyHoldAdvanced {
            position_percent,
            commission_dollars,
            ..
        } => StrategyParameters::BuyHoldAdvanced {
            entry_price: None,
            exit_price: None,
            position_percent,
            commission_dollars,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_drops_absolute_prices() {
        let params = StrategyParameters::BuyHoldAdvanced {
            entry_price: Some(400.0),
            exit_price: Some(500.0),
            position_percent: 50.0,
            commission_dollars: 1.0,
        };
        assert_eq!(
            replay_parameters(params),
            StrategyParameters::BuyHoldAdvanced {
                entry_price: None,
                exit_price: None,
                position_percent: 50.0,
                commission_dollars: 1.0,
            }
        );
    }

    #[test]
    fn replay_keeps_other_parameters() {
        let params = StrategyParameters::SmaCrossover {
            short_window: 5,
            long_window: 20,
        };
        assert_eq!(replay_parameters(params.clone()), params);
    }
}
