//! Strategy evaluators.
//!
//! Every evaluator replays a [`PriceSeries`] through one trading rule and
//! returns a [`BacktestResult`]. Evaluators are pure: the series is never
//! mutated and the same inputs always give the same curve. The same entry
//! point serves direct backtests and Monte Carlo replays on synthetic paths.

pub mod buy_hold;
pub mod buy_hold_advanced;
pub mod dca;
pub mod schedule;
pub mod sma_crossover;
pub mod value_averaging;

use crate::domain::{BacktestResult, PriceSeries, StrategyParameters};
use crate::error::{Error, Result};

/// Default SMA windows for requests that omit them.
pub const DEFAULT_SHORT_WINDOW: usize = 100;
pub const DEFAULT_LONG_WINDOW: usize = 250;

/// Evaluate `params` against `series` with `capital` starting funds.
pub fn evaluate(
    series: &PriceSeries,
    params: &StrategyParameters,
    capital: f64,
) -> Result<BacktestResult> {
    if !capital.is_finite() || capital <= 0.0 {
        return Err(Error::invalid("Invalid capital amount"));
    }
    params.validate()?;

    match *params {
        StrategyParameters::BuyHold => Ok(buy_hold::evaluate(series, capital)),
        StrategyParameters::BuyHoldAdvanced {
            entry_price,
            exit_price,
            position_percent,
            commission_dollars,
        } => Ok(buy_hold_advanced::evaluate(
            series,
            capital,
            entry_price,
            exit_price,
            position_percent,
            commission_dollars,
        )),
        StrategyParameters::SmaCrossover {
            short_window,
            long_window,
        } => sma_crossover::evaluate(series, capital, short_window, long_window),
        StrategyParameters::Dca {
            frequency,
            contribution,
        } => dca::evaluate(series, capital, frequency, contribution),
        StrategyParameters::ValueAveraging {
            frequency,
            target_growth_rate,
        } => value_averaging::evaluate(series, capital, frequency, target_growth_rate),
    }
}

/// Series on consecutive calendar days starting 2024-01-01.
#[cfg(test)]
pub(crate) fn test_series(prices: &[f64]) -> PriceSeries {
    use crate::domain::PricePoint;
    use chrono::{Duration, NaiveDate};

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    PriceSeries::new(
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(start + Duration::days(i as i64), p))
            .collect(),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, StrategyKind};

    #[test]
    fn rejects_non_positive_capital() {
        let series = test_series(&[1.0, 2.0]);
        for capital in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = evaluate(&series, &StrategyParameters::BuyHold, capital).unwrap_err();
            assert_eq!(err, Error::invalid("Invalid capital amount"));
        }
    }

    #[test]
    fn equal_windows_rejected_before_evaluation() {
        let series = test_series(&[1.0, 2.0, 3.0]);
        let params = StrategyParameters::SmaCrossover {
            short_window: 2,
            long_window: 2,
        };
        assert!(matches!(
            evaluate(&series, &params, 100.0),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn dispatch_matches_kind() {
        let series = test_series(&(1..=60).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let cases = [
            StrategyParameters::BuyHold,
            StrategyParameters::BuyHoldAdvanced {
                entry_price: None,
                exit_price: None,
                position_percent: 50.0,
                commission_dollars: 1.0,
            },
            StrategyParameters::SmaCrossover {
                short_window: 5,
                long_window: 20,
            },
            StrategyParameters::Dca {
                frequency: Frequency::Weekly,
                contribution: None,
            },
            StrategyParameters::ValueAveraging {
                frequency: Frequency::Weekly,
                target_growth_rate: None,
            },
        ];
        for params in &cases {
            let r = evaluate(&series, params, 1000.0).unwrap();
            assert_eq!(r.kind, params.kind());
            assert_eq!(r.series.len(), series.len());
        }
        assert_eq!(cases.len(), StrategyKind::ALL.len());
    }

    #[test]
    fn evaluation_does_not_mutate_input() {
        let series = test_series(&[10.0, 12.0, 9.0, 11.0]);
        let before = series.clone();
        let _ = evaluate(&series, &StrategyParameters::BuyHold, 100.0).unwrap();
        assert_eq!(series, before);
    }
}
