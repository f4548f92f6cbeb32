//! Artifact export: JSON with a schema version, CSV for spreadsheets.
//!
//! JSON artifacts wrap the payload in `{"schema_version": N, "kind": ..., "payload": ...}`.
//! Unknown versions are rejected on load.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use backcast_core::domain::{BacktestResult, PointDetail};

use crate::monte_carlo::MonteCarloResult;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact<T> {
    pub schema_version: u32,
    pub kind: String,
    pub payload: T,
}

/// Serialize a payload as a versioned JSON artifact.
pub fn export_json<T: Serialize>(kind: &str, payload: &T) -> Result<String> {
    let artifact = Artifact {
        schema_version: SCHEMA_VERSION,
        kind: kind.to_string(),
        payload,
    };
    serde_json::to_string_pretty(&artifact)
        .with_context(|| format!("failed to serialize {kind} artifact"))
}

/// Load a versioned JSON artifact of the expected kind.
pub fn import_json<T: DeserializeOwned>(kind: &str, json: &str) -> Result<T> {
    let artifact: Artifact<T> = serde_json::from_str(json)
        .with_context(|| format!("failed to deserialize {kind} artifact"))?;
    if artifact.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            artifact.schema_version,
            SCHEMA_VERSION
        );
    }
    if artifact.kind != kind {
        bail!("expected a {kind} artifact, found {}", artifact.kind);
    }
    Ok(artifact.payload)
}

/// Equity curve as CSV: date, price, value and the strategy's per-point fields.
pub fn export_equity_csv(result: &BacktestResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "price", "value", "shares", "signal", "contributed", "target"])?;

    for p in &result.series {
        let (shares, signal, contributed, target) = match p.detail {
            PointDetail::Advanced { shares, is_entry, is_exit, .. } => {
                let signal = if is_entry { 1 } else if is_exit { 2 } else { 0 };
                (Some(shares), Some(signal), None, None)
            }
            PointDetail::Crossover { signal, .. } => (None, Some(signal), None, None),
            PointDetail::Contribution {
                shares,
                contributed,
                target,
                signal,
            } => (Some(shares), Some(signal), Some(contributed), target),
            PointDetail::None {} => (None, None, None, None),
        };
        wtr.write_record([
            p.date.to_string(),
            format!("{:.6}", p.price),
            format!("{:.6}", p.value),
            shares.map(|v| format!("{v:.6}")).unwrap_or_default(),
            signal.map(|v| v.to_string()).unwrap_or_default(),
            contributed.map(|v| format!("{v:.6}")).unwrap_or_default(),
            target.map(|v| format!("{v:.6}")).unwrap_or_default(),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Previewed Monte Carlo outcomes as CSV, one row per trial.
pub fn export_distribution_csv(result: &MonteCarloResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["trial", "final_capital", "return_pct"])?;
    let d = &result.distribution;
    for (i, (capital, ret)) in d.final_capitals.iter().zip(&d.returns).enumerate() {
        wtr.write_record([i.to_string(), format!("{capital:.6}"), format!("{ret:.6}")])?;
    }
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Write `content` to `path`, creating parent directories.
pub fn write_artifact(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use backcast_core::domain::{BacktestSummary, EquityCurvePoint, StrategyKind};
    use chrono::NaiveDate;

    fn result() -> BacktestResult {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        BacktestResult {
            kind: StrategyKind::Dca,
            initial_capital: 100.0,
            final_value: 110.0,
            total_return_pct: 10.0,
            uninvested_cash: 0.0,
            summary: BacktestSummary::BuyHold {
                buy_price: 10.0,
                sell_price: 11.0,
            },
            series: vec![EquityCurvePoint {
                date: d,
                price: 10.0,
                value: 100.0,
                detail: PointDetail::Contribution {
                    shares: 10.0,
                    contributed: 100.0,
                    target: None,
                    signal: 1,
                },
            }],
        }
    }

    #[test]
    fn json_artifact_round_trips() {
        let json = export_json("backtest", &result()).unwrap();
        assert!(json.contains("\"schema_version\": 1"));
        let back: BacktestResult = import_json("backtest", &json).unwrap();
        assert_eq!(back, result());
    }

    #[test]
    fn rejects_future_schema_and_wrong_kind() {
        let json = export_json("backtest", &result()).unwrap();
        assert!(import_json::<BacktestResult>("monte_carlo", &json).is_err());
        let future = json.replace("\"schema_version\": 1", "\"schema_version\": 99");
        let err = import_json::<BacktestResult>("backtest", &future).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn equity_csv_has_header_and_rows() {
        let csv = export_equity_csv(&result()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,price,value,shares,signal,contributed,target");
        assert_eq!(
            lines[1],
            "2024-01-02,10.000000,100.000000,10.000000,1,100.000000,"
        );
    }

    #[test]
    fn write_artifact_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/run.json");
        write_artifact(&path, "{}").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
    }
}
