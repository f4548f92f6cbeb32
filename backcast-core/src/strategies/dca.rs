//! Dollar-Cost Averaging: a fixed contribution on every scheduled buy date
//! until the capital is exhausted.

use super::schedule::buy_date_indices;
use crate::domain::{
    pct_change, BacktestResult, BacktestSummary, EquityCurvePoint, Frequency, PointDetail,
    PriceSeries, StrategyKind,
};
use crate::error::{Error, Result};

pub fn evaluate(
    series: &PriceSeries,
    capital: f64,
    frequency: Frequency,
    contribution: Option<f64>,
) -> Result<BacktestResult> {
    let buy_dates = buy_date_indices(series, frequency);
    if buy_dates.is_empty() {
        return Err(Error::NoValidBuyDates);
    }

    let contribution = contribution.unwrap_or(capital / buy_dates.len() as f64);

    let mut total_contributed = 0.0_f64;
    let mut total_shares = 0.0_f64;
    let mut next_buy = buy_dates.iter().peekable();
    let mut curve = Vec::with_capacity(series.len());

    for (i, point) in series.points().iter().enumerate() {
        let is_buy_date = next_buy.next_if(|&&b| b == i).is_some();

        if is_buy_date && total_contributed < capital {
            let amount = contribution.min(capital - total_contributed);
            total_shares += amount / point.price;
            total_contributed += amount;
        }

        curve.push(EquityCurvePoint {
            date: point.date,
            price: point.price,
            value: total_shares * point.price,
            detail: PointDetail::Contribution {
                shares: total_shares,
                contributed: total_contributed,
                target: None,
                signal: u8::from(is_buy_date),
            },
        });
    }

    let final_value = curve.last().map(|p| p.value).unwrap_or(0.0);

    Ok(BacktestResult {
        kind: StrategyKind::Dca,
        initial_capital: capital,
        final_value,
        total_return_pct: pct_change(final_value, total_contributed),
        uninvested_cash: (capital - total_contributed).max(0.0),
        summary: BacktestSummary::Contribution {
            frequency,
            contribution,
            total_contributed,
            buy_dates: buy_dates.len(),
            growth_rate: None,
        },
        series: curve,
    })
}
