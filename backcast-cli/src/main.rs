//! Backcast CLI: backtest and Monte Carlo commands.
//!
//! Commands:
//! - `backtest` runs one strategy over historical prices
//! - `montecarlo` replays a saved strategy over synthetic futures
//! - `config` prints the effective configuration as TOML
//! - `strategies` lists the strategy types and their Monte Carlo eligibility
//!
//! Results are printed to stdout as a JSON envelope
//! (`{"status": "success", "data": ...}` or `{"status": "error", "message": ...}`).
//! Logs go to stderr; set `RUST_LOG` to change the level.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use backcast_core::domain::StrategyKind;
use backcast_runner::export::{
    export_distribution_csv, export_equity_csv, export_json, write_artifact,
};
use backcast_runner::request::Amount;
use backcast_runner::{
    build_provider, round_monte_carlo, run_backtest, ApiResponse, BackcastConfig,
    BacktestPayload, BacktestRequest, JsonFileRepository, MonteCarloEngine, MonteCarloRequest,
    RunError,
};

#[derive(Parser)]
#[command(
    name = "backcast",
    about = "Backcast: strategy backtests and Monte Carlo outcome projection"
)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a strategy over historical prices.
    Backtest {
        /// Read the request from a JSON file instead of flags.
        #[arg(long, conflicts_with_all = ["ticker", "start", "end", "capital"])]
        request: Option<PathBuf>,

        #[arg(long)]
        ticker: Option<String>,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        capital: Option<String>,

        /// buy_hold, buy_hold_markers, simple_moving_average_crossover, dca, value_averaging.
        #[arg(long, default_value = "buy_hold")]
        strategy: String,

        #[arg(long)]
        short_window: Option<usize>,

        #[arg(long)]
        long_window: Option<usize>,

        /// weekly, biweekly or monthly.
        #[arg(long)]
        frequency: Option<String>,

        #[arg(long)]
        contribution: Option<String>,

        #[arg(long)]
        target_growth_rate: Option<f64>,

        #[arg(long)]
        entry_price: Option<f64>,

        #[arg(long)]
        exit_price: Option<f64>,

        #[arg(long)]
        position_percent: Option<f64>,

        #[arg(long)]
        commission: Option<f64>,

        /// Also write the full-precision result as a JSON artifact.
        #[arg(long)]
        json_out: Option<PathBuf>,

        /// Also write the equity curve as CSV.
        #[arg(long)]
        csv_out: Option<PathBuf>,
    },
    /// Replay a saved strategy over simulated price paths.
    Montecarlo {
        #[arg(long)]
        strategy_id: String,

        /// Only run if the strategy belongs to this user.
        #[arg(long)]
        user_id: Option<String>,

        /// historical_bootstrap or forward_sim.
        #[arg(long, default_value = "historical_bootstrap")]
        mode: String,

        #[arg(long, conflicts_with = "horizon_years")]
        horizon_days: Option<i64>,

        #[arg(long)]
        horizon_years: Option<f64>,

        /// Number of trials. Defaults to the configured value.
        #[arg(long)]
        simulations: Option<i64>,

        /// Master seed. Defaults to the configured value.
        #[arg(long)]
        seed: Option<u64>,

        /// Saved-strategy JSON file. Overrides the configured path.
        #[arg(long)]
        strategies: Option<PathBuf>,

        #[arg(long)]
        json_out: Option<PathBuf>,

        /// Also write the previewed outcomes as CSV.
        #[arg(long)]
        csv_out: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML.
    Config,
    /// List the supported strategy types as JSON.
    Strategies,
}

/// One row of the `strategies` listing.
#[derive(Debug, Serialize)]
struct StrategyInfo {
    strategy: &'static str,
    label: &'static str,
    monte_carlo: bool,
}

fn strategy_catalog() -> Vec<StrategyInfo> {
    StrategyKind::ALL
        .iter()
        .map(|k| StrategyInfo {
            strategy: k.as_str(),
            label: k.label(),
            monte_carlo: k.is_monte_carlo_eligible(),
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Backtest {
            request,
            ticker,
            start,
            end,
            capital,
            strategy,
            short_window,
            long_window,
            frequency,
            contribution,
            target_growth_rate,
            entry_price,
            exit_price,
            position_percent,
            commission,
            json_out,
            csv_out,
        } => {
            let request = match request {
                Some(path) => read_json(&path)?,
                None => BacktestRequest {
                    ticker,
                    start_date: start,
                    end_date: end,
                    capital: capital.map(Amount::Text),
                    strategy: Some(strategy),
                    short_window,
                    long_window,
                    frequency,
                    contribution: contribution.map(Amount::Text),
                    target_growth_rate,
                    entry_price,
                    exit_price,
                    position_percent,
                    commission_dollars: commission,
                },
            };
            run_backtest_cmd(&config, &request, json_out, csv_out)
        }
        Commands::Montecarlo {
            strategy_id,
            user_id,
            mode,
            horizon_days,
            horizon_years,
            simulations,
            seed,
            strategies,
            json_out,
            csv_out,
        } => {
            let request = MonteCarloRequest {
                strategy_id: Some(strategy_id),
                user_id,
                mode: Some(mode),
                horizon_days,
                horizon_years,
                num_simulations: simulations,
                seed,
            };
            let store = strategies.unwrap_or_else(|| config.strategies.path.clone());
            run_monte_carlo_cmd(&config, &store, &request, json_out, csv_out)
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Commands::Strategies => {
            println!("{}", serde_json::to_string_pretty(&strategy_catalog())?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<BackcastConfig> {
    match path {
        Some(p) => Ok(BackcastConfig::from_file(p)?),
        None => Ok(BackcastConfig::default()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn run_backtest_cmd(
    config: &BackcastConfig,
    request: &BacktestRequest,
    json_out: Option<PathBuf>,
    csv_out: Option<PathBuf>,
) -> Result<()> {
    let provider = build_provider(&config.data).map_err(RunError::from);
    let outcome = provider.and_then(|p| run_backtest(p.as_ref(), request));

    if let Ok(report) = &outcome {
        if let Some(path) = json_out {
            write_artifact(&path, &export_json("backtest", &report.result)?)?;
            info!(path = %path.display(), "wrote backtest artifact");
        }
        if let Some(path) = csv_out {
            write_artifact(&path, &export_equity_csv(&report.result)?)?;
            info!(path = %path.display(), "wrote equity curve");
        }
    }

    respond(outcome.map(|r| BacktestPayload::from(&r)))
}

fn run_monte_carlo_cmd(
    config: &BackcastConfig,
    store: &Path,
    request: &MonteCarloRequest,
    json_out: Option<PathBuf>,
    csv_out: Option<PathBuf>,
) -> Result<()> {
    let repository = JsonFileRepository::open(store).map_err(RunError::from);
    let provider = build_provider(&config.data).map_err(RunError::from);

    let outcome = match (provider, repository) {
        (Ok(p), Ok(repo)) => {
            MonteCarloEngine::new(p.as_ref(), &repo, config.monte_carlo.clone()).run(request)
        }
        (Err(e), _) | (_, Err(e)) => Err(e),
    };

    if let Ok(result) = &outcome {
        if let Some(path) = json_out {
            write_artifact(&path, &export_json("monte_carlo", result)?)?;
            info!(path = %path.display(), "wrote monte carlo artifact");
        }
        if let Some(path) = csv_out {
            write_artifact(&path, &export_distribution_csv(result)?)?;
            info!(path = %path.display(), "wrote outcome distribution");
        }
    }

    respond(outcome.map(|r| round_monte_carlo(&r)))
}

/// Print the envelope; exit non-zero on failure.
fn respond<T: Serialize>(outcome: std::result::Result<T, RunError>) -> Result<()> {
    if let Err(e) = &outcome {
        error!(category = e.category(), "{e}");
    }
    let response = ApiResponse::from_result(outcome);
    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_every_strategy_tag() {
        let catalog = strategy_catalog();
        assert_eq!(catalog.len(), StrategyKind::ALL.len());
        for info in &catalog {
            let kind: StrategyKind = info.strategy.parse().unwrap();
            assert_eq!(info.monte_carlo, kind != StrategyKind::BuyHold);
        }
    }

    #[test]
    fn strategies_subcommand_parses() {
        let cli = Cli::try_parse_from(["backcast", "strategies"]).unwrap();
        assert!(matches!(cli.command, Commands::Strategies));
    }
}
