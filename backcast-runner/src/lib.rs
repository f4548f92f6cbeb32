//! Backcast Runner: request handling and orchestration on top of `backcast-core`.
//!
//! - Price providers (Yahoo Finance, local CSV, in-memory)
//! - Saved-strategy repository
//! - Request validation and the response envelope
//! - Direct backtests and Monte Carlo simulation
//! - JSON/CSV artifact export

pub mod backtest;
pub mod config;
pub mod csv_provider;
pub mod error;
pub mod export;
pub mod monte_carlo;
pub mod provider;
pub mod repository;
pub mod request;
pub mod response;
pub mod yahoo;

pub use backtest::{run_backtest, run_validated, BacktestReport};
pub use config::{BackcastConfig, ConfigError, DataConfig, MonteCarloConfig, ProviderKind};
pub use csv_provider::CsvProvider;
pub use error::RunError;
pub use monte_carlo::{Distribution, McStatistics, MonteCarloEngine, MonteCarloResult};
pub use provider::{DataError, PriceProvider, StaticProvider};
pub use repository::{
    InMemoryRepository, JsonFileRepository, RepoError, StoredStrategy, StrategyMetadata,
    StrategyRepository,
};
pub use request::{BacktestRequest, MonteCarloRequest, MAX_HORIZON_DAYS, MAX_SIMULATIONS};
pub use response::{round_monte_carlo, ApiResponse, BacktestPayload};
pub use yahoo::YahooProvider;

/// Build the price provider named by the config.
pub fn build_provider(config: &DataConfig) -> Result<Box<dyn PriceProvider>, DataError> {
    Ok(match config.provider {
        ProviderKind::Yahoo => Box::new(YahooProvider::new()?),
        ProviderKind::Csv => Box::new(CsvProvider::new(&config.csv_dir)),
    })
}
