//! Buy & Hold with position sizing and a flat round-trip commission.
//!
//! Entry and exit prices default to the series endpoints. Only
//! `position_percent` of capital is deployed; the rest stays as cash. The
//! commission is charged once at entry and once at exit.

use crate::domain::{
    pct_change, BacktestResult, BacktestSummary, EquityCurvePoint, PointDetail, PriceSeries,
    StrategyKind,
};

pub fn evaluate(
    series: &PriceSeries,
    capital: f64,
    entry_price: Option<f64>,
    exit_price: Option<f64>,
    position_percent: f64,
    commission_dollars: f64,
) -> BacktestResult {
    let entry = entry_price.unwrap_or(series.first().price);
    let exit = exit_price.unwrap_or(series.last().price);

    let invested = capital * position_percent / 100.0;
    let shares = invested / entry;
    let commission_total = 2.0 * commission_dollars;
    let net_pnl = shares * (exit - entry) - commission_total;
    let final_value = capital + net_pnl;

    // Cash after buying and paying the entry commission.
    let cash = capital - invested - commission_dollars;
    let last = series.len() - 1;

    let curve = series
        .points()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let value = if i == last {
                final_value
            } else {
                cash + shares * p.price
            };
            EquityCurvePoint {
                date: p.date,
                price: p.price,
                value,
                detail: PointDetail::Advanced {
                    shares,
                    is_entry: i == 0,
                    is_exit: i == last,
                },
            }
        })
        .collect();

    BacktestResult {
        kind: StrategyKind::BuyHoldAdvanced,
        initial_capital: capital,
        final_value,
        total_return_pct: pct_change(final_value, capital),
        uninvested_cash: 0.0,
        summary: BacktestSummary::Advanced {
            entry_price: entry,
            exit_price: exit,
            shares,
            invested,
            commission_total,
            net_pnl,
        },
        series: curve,
    }
}
