//! Value Averaging (buy-only variant).
//!
//! Each buy date has a target portfolio value
//! `initial_target × (1 + g)^k` with `initial_target = capital / n_buy_dates`.
//! The shortfall against the target is bought, capped by remaining capital.
//! When the portfolio is above target nothing is sold.

use super::schedule::buy_date_indices;
use crate::domain::{
    pct_change, BacktestResult, BacktestSummary, EquityCurvePoint, Frequency, PointDetail,
    PriceSeries, StrategyKind,
};
use crate::error::{Error, Result};

/// Growth per period when the caller gives none and there is more than one period.
pub const DEFAULT_GROWTH_RATE: f64 = 0.01;

pub fn evaluate(
    series: &PriceSeries,
    capital: f64,
    frequency: Frequency,
    target_growth_rate: Option<f64>,
) -> Result<BacktestResult> {
    let buy_dates = buy_date_indices(series, frequency);
    if buy_dates.is_empty() {
        return Err(Error::NoValidBuyDates);
    }

    let periods = buy_dates.len();
    let growth_rate = target_growth_rate.unwrap_or(if periods > 1 {
        DEFAULT_GROWTH_RATE
    } else {
        0.0
    });
    let initial_target = capital / periods as f64;

    let mut total_contributed = 0.0_f64;
    let mut total_shares = 0.0_f64;
    let mut period_index = 0_i32;
    let mut next_buy = buy_dates.iter().peekable();
    let mut curve = Vec::with_capacity(series.len());

    for (i, point) in series.points().iter().enumerate() {
        let is_buy_date = next_buy.next_if(|&&b| b == i).is_some();
        let mut target = None;

        if is_buy_date {
            let goal = initial_target * (1.0 + growth_rate).powi(period_index);
            period_index += 1;
            target = Some(goal);

            let current = total_shares * point.price;
            let shortfall = (goal - current).max(0.0);
            let amount = shortfall.min(capital - total_contributed).max(0.0);
            if amount > 0.0 {
                total_shares += amount / point.price;
                total_contributed += amount;
            }
        }

        curve.push(EquityCurvePoint {
            date: point.date,
            price: point.price,
            value: total_shares * point.price,
            detail: PointDetail::Contribution {
                shares: total_shares,
                contributed: total_contributed,
                target,
                signal: u8::from(is_buy_date),
            },
        });
    }

    let final_value = curve.last().map(|p| p.value).unwrap_or(0.0);
    let uninvested_cash = (capital - total_contributed).max(0.0);

    Ok(BacktestResult {
        kind: StrategyKind::ValueAveraging,
        initial_capital: capital,
        final_value,
        total_return_pct: pct_change(final_value + uninvested_cash, capital),
        uninvested_cash,
        summary: BacktestSummary::Contribution {
            frequency,
            contribution: initial_target,
            total_contributed,
            buy_dates: periods,
            growth_rate: Some(growth_rate),
        },
        series: curve,
    })
}
