//! Evaluator output: the equity curve and its summary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::strategy::{Frequency, StrategyKind};

/// Strategy-specific fields carried on each equity curve point.
///
/// Flattened into the point, so the fields sit beside `date`/`price`/`value`.
/// `None` is last: it accepts any map and must only match when nothing else does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointDetail {
    Advanced {
        shares: f64,
        is_entry: bool,
        is_exit: bool,
    },
    Crossover {
        short_ma: Option<f64>,
        long_ma: Option<f64>,
        signal: u8,
        position: u8,
    },
    Contribution {
        shares: f64,
        contributed: f64,
        target: Option<f64>,
        signal: u8,
    },
    None {},
}

/// One point of an equity curve, aligned with one input price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityCurvePoint {
    pub date: NaiveDate,
    pub price: f64,
    /// Cumulative portfolio value.
    pub value: f64,
    #[serde(flatten)]
    pub detail: PointDetail,
}

/// Extra per-strategy figures reported alongside the curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BacktestSummary {
    BuyHold {
        buy_price: f64,
        sell_price: f64,
    },
    Advanced {
        entry_price: f64,
        exit_price: f64,
        shares: f64,
        invested: f64,
        commission_total: f64,
        net_pnl: f64,
    },
    Crossover {
        short_window: usize,
        long_window: usize,
    },
    Contribution {
        frequency: Frequency,
        contribution: f64,
        total_contributed: f64,
        buy_dates: usize,
        growth_rate: Option<f64>,
    },
}

/// Complete result of one evaluation. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub kind: StrategyKind,
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return_pct: f64,
    /// Capital never deployed (DCA / Value Averaging); 0 otherwise.
    pub uninvested_cash: f64,
    pub summary: BacktestSummary,
    pub series: Vec<EquityCurvePoint>,
}

impl BacktestResult {
    /// Portfolio value plus idle cash at the final step.
    pub fn terminal_capital(&self) -> f64 {
        self.final_value + self.uninvested_cash
    }

    pub fn equity_values(&self) -> Vec<f64> {
        self.series.iter().map(|p| p.value).collect()
    }
}

/// Percentage change of `value` over `base`; 0 when `base` is 0.
pub fn pct_change(value: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        (value - base) / base * 100.0
    }
}
