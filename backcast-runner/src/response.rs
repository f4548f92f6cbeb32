//! Response envelope and display rounding.
//!
//! Results stay at full precision inside the runner. Money, percentages and
//! indicator values are rounded to 2 decimals here, and buy/sell prices to 4.

use serde::{Deserialize, Serialize};

use backcast_core::domain::{
    BacktestResult, BacktestSummary, EquityCurvePoint, PointDetail, StrategyKind,
};

use crate::backtest::BacktestReport;
use crate::error::RunError;
use crate::monte_carlo::MonteCarloResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// `{"status": "success", "data": ...}` or `{"status": "error", "message": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error taxonomy name, present on failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            data: Some(data),
            message: None,
            error_type: None,
        }
    }

    pub fn error(err: &RunError) -> Self {
        Self {
            status: Status::Error,
            data: None,
            message: Some(err.to_string()),
            error_type: Some(err.category().to_string()),
        }
    }

    pub fn from_result(result: Result<T, RunError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::error(&e),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Rounded backtest payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestPayload {
    pub ticker: String,
    pub strategy: StrategyKind,
    pub start_date: String,
    pub end_date: String,
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return_pct: f64,
    pub uninvested_cash: f64,
    #[serde(flatten)]
    pub summary: BacktestSummary,
    pub series: Vec<EquityCurvePoint>,
}

impl From<&BacktestReport> for BacktestPayload {
    fn from(report: &BacktestReport) -> Self {
        let r = &report.result;
        Self {
            ticker: report.request.ticker.clone(),
            strategy: r.kind,
            start_date: report.request.start_date.to_string(),
            end_date: report.request.end_date.to_string(),
            initial_capital: round2(r.initial_capital),
            final_value: round2(r.final_value),
            total_return_pct: round2(r.total_return_pct),
            uninvested_cash: round2(r.uninvested_cash),
            summary: round_summary(&r.summary),
            series: round_series(r),
        }
    }
}

fn round_summary(summary: &BacktestSummary) -> BacktestSummary {
    match *summary {
        BacktestSummary::BuyHold {
            buy_price,
            sell_price,
        } => BacktestSummary::BuyHold {
            buy_price: round4(buy_price),
            sell_price: round4(sell_price),
        },
        BacktestSummary::Advanced {
            entry_price,
            exit_price,
            shares,
            invested,
            commission_total,
            net_pnl,
        } => BacktestSummary::Advanced {
            entry_price: round4(entry_price),
            exit_price: round4(exit_price),
            shares: round4(shares),
            invested: round2(invested),
            commission_total: round2(commission_total),
            net_pnl: round2(net_pnl),
        },
        BacktestSummary::Crossover { .. } => summary.clone(),
        BacktestSummary::Contribution {
            frequency,
            contribution,
            total_contributed,
            buy_dates,
            growth_rate,
        } => BacktestSummary::Contribution {
            frequency,
            contribution: round2(contribution),
            total_contributed: round2(total_contributed),
            buy_dates,
            growth_rate,
        },
    }
}

fn round_series(result: &BacktestResult) -> Vec<EquityCurvePoint> {
    result
        .series
        .iter()
        .map(|p| EquityCurvePoint {
            date: p.date,
            price: round2(p.price),
            value: round2(p.value),
            detail: match p.detail {
                PointDetail::Advanced {
                    shares,
                    is_entry,
                    is_exit,
                } => PointDetail::Advanced {
                    shares: round4(shares),
                    is_entry,
                    is_exit,
                },
                PointDetail::Crossover {
                    short_ma,
                    long_ma,
                    signal,
                    position,
                } => PointDetail::Crossover {
                    short_ma: short_ma.map(round2),
                    long_ma: long_ma.map(round2),
                    signal,
                    position,
                },
                PointDetail::Contribution {
                    shares,
                    contributed,
                    target,
                    signal,
                } => PointDetail::Contribution {
                    shares: round4(shares),
                    contributed: round2(contributed),
                    target: target.map(round2),
                    signal,
                },
                PointDetail::None {} => PointDetail::None {},
            },
        })
        .collect()
}

/// Copy of a simulation result with every reported figure at 2 decimals.
pub fn round_monte_carlo(result: &MonteCarloResult) -> MonteCarloResult {
    let mut out = result.clone();
    out.initial_capital = round2(out.initial_capital);

    let s = &mut out.statistics;
    s.mean_final_capital = round2(s.mean_final_capital);
    s.std_final_capital = round2(s.std_final_capital);
    s.min_final_capital = round2(s.min_final_capital);
    s.max_final_capital = round2(s.max_final_capital);
    s.percentiles = s.percentiles.map(round2);
    s.return_percentiles = s.return_percentiles.map(round2);
    s.probability_of_loss = round2(s.probability_of_loss);

    let d = &mut out.distribution;
    d.final_capitals.iter_mut().for_each(|v| *v = round2(*v));
    d.returns.iter_mut().for_each(|v| *v = round2(*v));
    out
}
