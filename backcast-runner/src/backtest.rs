//! Direct backtest: validate, fetch, extract, evaluate.

use serde::Serialize;
use tracing::{debug, info};

use backcast_core::data::extract_close_series;
use backcast_core::domain::BacktestResult;
use backcast_core::strategies;

use crate::error::RunError;
use crate::provider::PriceProvider;
use crate::request::{BacktestRequest, ValidatedBacktest};

/// A completed backtest and the request it answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub request: ValidatedBacktest,
    pub result: BacktestResult,
}

/// Run one backtest against historical prices from `provider`.
pub fn run_backtest(
    provider: &dyn PriceProvider,
    request: &BacktestRequest,
) -> Result<BacktestReport, RunError> {
    let validated = request.validate()?;
    run_validated(provider, validated)
}

/// Run a backtest whose request is already validated.
pub fn run_validated(
    provider: &dyn PriceProvider,
    request: ValidatedBacktest,
) -> Result<BacktestReport, RunError> {
    info!(
        ticker = %request.ticker,
        strategy = %request.params.kind(),
        start = %request.start_date,
        end = %request.end_date,
        provider = provider.name(),
        "running backtest"
    );

    let table = provider.fetch(&request.ticker, request.start_date, request.end_date)?;
    let series = extract_close_series(Some(&table), &request.ticker)?;
    debug!(points = series.len(), "price series extracted");

    let result = strategies::evaluate(&series, &request.params, request.capital)?;
    info!(
        final_value = result.final_value,
        total_return_pct = result.total_return_pct,
        "backtest complete"
    );

    Ok(BacktestReport { request, result })
}
