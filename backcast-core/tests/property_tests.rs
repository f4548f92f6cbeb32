//! Property tests for evaluator, generator and aggregator invariants.
//!
//! Uses proptest to verify:
//! 1. Buy & Hold final value equals capital × last / first
//! 2. DCA never contributes more than the capital
//! 3. Synthetic paths have horizon + 1 points and start at the initial price
//! 4. Outcome statistics do not depend on trial order

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use backcast_core::domain::{Frequency, PointDetail, PriceSeries, ReturnSample, StrategyParameters};
use backcast_core::paths::{generate_path, PathGenerator};
use backcast_core::stats::summarize;
use backcast_core::strategies::evaluate;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_prices(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..500.0_f64, 1..max_len)
}

fn arb_capital() -> impl Strategy<Value = f64> {
    (100.0..1_000_000.0_f64).prop_map(|c| (c * 100.0).round() / 100.0)
}

fn daily_series(prices: &[f64]) -> PriceSeries {
    let base = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let dates: Vec<NaiveDate> = (0..prices.len())
        .map(|i| base + Duration::days(i as i64))
        .collect();
    PriceSeries::from_parts(&dates, prices).unwrap()
}

// ── 1. Buy & Hold ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn buy_hold_final_is_price_ratio(prices in arb_prices(200), capital in arb_capital()) {
        let series = daily_series(&prices);
        let r = evaluate(&series, &StrategyParameters::BuyHold, capital).unwrap();
        let expected = capital * prices[prices.len() - 1] / prices[0];
        prop_assert!((r.final_value - expected).abs() <= 1e-9 * expected.max(1.0));
        prop_assert_eq!(r.series.len(), prices.len());
    }
}

// ── 2. DCA budget ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn dca_contributions_bounded_by_capital(
        prices in prop::collection::vec(1.0..500.0_f64, 40..400),
        capital in arb_capital(),
        contribution in prop::option::of(10.0..50_000.0_f64),
        freq in prop::sample::select(vec![Frequency::Weekly, Frequency::Biweekly, Frequency::Monthly]),
    ) {
        let series = daily_series(&prices);
        let params = StrategyParameters::Dca { frequency: freq, contribution };
        let r = match evaluate(&series, &params, capital) {
            Ok(r) => r,
            // Short monthly spans can hold no month end.
            Err(backcast_core::Error::NoValidBuyDates) => return Ok(()),
            Err(e) => return Err(TestCaseError::fail(e.to_string())),
        };
        let mut last = 0.0;
        for p in &r.series {
            if let PointDetail::Contribution { contributed, .. } = p.detail {
                prop_assert!(contributed <= capital * (1.0 + 1e-12));
                prop_assert!(contributed >= last);
                last = contributed;
            }
        }
        prop_assert!(r.uninvested_cash >= 0.0);
    }
}

// ── 3. Path shape ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn path_shape(
        returns in prop::collection::vec(-0.05..0.05_f64, 1..50),
        horizon in 1usize..400,
        initial in 1.0..1000.0_f64,
        seed in any::<u64>(),
        bootstrap in any::<bool>(),
    ) {
        let generator = if bootstrap {
            PathGenerator::HistoricalBootstrap
        } else {
            PathGenerator::ForwardSimulation
        };
        let sample = ReturnSample::new(returns);
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        match generate_path(generator, &sample, horizon, initial, start, &mut rng) {
            Ok(path) => {
                prop_assert_eq!(path.len(), horizon + 1);
                prop_assert_eq!(path.first().price, initial);
            }
            // Forward draws may occasionally cross zero; that is a skipped trial.
            Err(backcast_core::Error::InvalidInput(_)) if !bootstrap => {}
            Err(e) => return Err(TestCaseError::fail(e.to_string())),
        }
    }
}

// ── 4. Order invariance ──────────────────────────────────────────────

proptest! {
    #[test]
    fn statistics_are_order_invariant(
        (values, shuffled) in prop::collection::vec(1.0..5_000.0_f64, 1..200)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
    ) {
        let a = summarize(&values, 1000.0, 0).unwrap();
        let b = summarize(&shuffled, 1000.0, 0).unwrap();
        prop_assert_eq!(a.percentiles, b.percentiles);
        prop_assert_eq!(a.return_percentiles, b.return_percentiles);
        prop_assert_eq!(a.min, b.min);
        prop_assert_eq!(a.max, b.max);
        prop_assert_eq!(a.probability_of_loss, b.probability_of_loss);
        prop_assert!((a.mean - b.mean).abs() < 1e-9 * a.mean.abs().max(1.0));
        prop_assert!((a.std_dev - b.std_dev).abs() < 1e-6);
    }
}
