//! Simple Moving Average crossover.
//!
//! Long when the short mean is above the long mean, flat otherwise. The
//! position held over bar `t` is the signal computed at bar `t - 1`, so a
//! signal never trades on the close that produced it.

use crate::domain::{
    pct_change, BacktestResult, BacktestSummary, EquityCurvePoint, PointDetail, PriceSeries,
    StrategyKind,
};
use crate::error::{Error, Result};
use crate::indicators::sma;

/// Raw crossover signal: 1 where `short[t] > long[t]`, else 0 (NaN compares false).
pub fn crossover_signal(prices: &[f64], short_window: usize, long_window: usize) -> Vec<u8> {
    let short = sma(prices, short_window);
    let long = sma(prices, long_window);
    short
        .iter()
        .zip(&long)
        .map(|(s, l)| u8::from(s > l))
        .collect()
}

pub fn evaluate(
    series: &PriceSeries,
    capital: f64,
    short_window: usize,
    long_window: usize,
) -> Result<BacktestResult> {
    if series.len() < long_window {
        return Err(Error::InsufficientData {
            required: long_window,
            available: series.len(),
        });
    }

    let prices = series.prices();
    let short = sma(&prices, short_window);
    let long = sma(&prices, long_window);
    let signal = crossover_signal(&prices, short_window, long_window);
    if signal.len() != prices.len() {
        return Err(Error::invalid("signal length does not match price series"));
    }

    let mut equity = capital;
    let mut curve = Vec::with_capacity(prices.len());

    for (t, point) in series.points().iter().enumerate() {
        let position = if t == 0 { 0 } else { signal[t - 1] };
        if t > 0 {
            let daily_return = prices[t] / prices[t - 1] - 1.0;
            equity *= 1.0 + daily_return * f64::from(position);
        }
        curve.push(EquityCurvePoint {
            date: point.date,
            price: point.price,
            value: equity,
            detail: PointDetail::Crossover {
                short_ma: finite(short[t]),
                long_ma: finite(long[t]),
                signal: signal[t],
                position,
            },
        });
    }

    Ok(BacktestResult {
        kind: StrategyKind::SmaCrossover,
        initial_capital: capital,
        final_value: equity,
        total_return_pct: pct_change(equity, capital),
        uninvested_cash: 0.0,
        summary: BacktestSummary::Crossover {
            short_window,
            long_window,
        },
        series: curve,
    })
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}
