//! Buy & Hold: invest everything at the first close, hold to the last.

use crate::domain::{
    pct_change, BacktestResult, BacktestSummary, EquityCurvePoint, PointDetail, PriceSeries,
    StrategyKind,
};

pub fn evaluate(series: &PriceSeries, capital: f64) -> BacktestResult {
    let buy_price = series.first().price;
    let sell_price = series.last().price;
    let shares = if buy_price > 0.0 { capital / buy_price } else { 0.0 };

    let curve = series
        .points()
        .iter()
        .map(|p| EquityCurvePoint {
            date: p.date,
            price: p.price,
            value: shares * p.price,
            detail: PointDetail::None {},
        })
        .collect();

    let final_value = shares * sell_price;

    BacktestResult {
        kind: StrategyKind::BuyHold,
        initial_capital: capital,
        final_value,
        total_return_pct: pct_change(final_value, capital),
        uninvested_cash: 0.0,
        summary: BacktestSummary::BuyHold {
            buy_price,
            sell_price,
        },
        series: curve,
    }
}
