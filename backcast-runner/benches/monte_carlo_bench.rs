//! Criterion benchmarks for the Monte Carlo hot loops.
//!
//! Run with: `cargo bench -p backcast-runner`
//!
//! - Path generation per mode
//! - Strategy replay on a synthetic path
//! - Outcome aggregation
//! - A full engine run against an in-memory provider

use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use backcast_core::domain::{Frequency, ReturnSample, StrategyParameters};
use backcast_core::paths::{generate_path, PathGenerator};
use backcast_core::rng::RngHierarchy;
use backcast_core::stats::summarize;
use backcast_core::strategies;
use backcast_runner::{
    InMemoryRepository, MonteCarloConfig, MonteCarloEngine, MonteCarloRequest, StaticProvider,
    StoredStrategy, StrategyMetadata,
};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
}

fn sample(len: usize) -> ReturnSample {
    ReturnSample::new(
        (0..len)
            .map(|i| 0.0004 + 0.01 * ((i as f64) * 0.37).sin())
            .collect(),
    )
}

fn bench_path_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_generation");
    let sample = sample(1260);
    let rngs = RngHierarchy::new(42);

    for mode in [PathGenerator::HistoricalBootstrap, PathGenerator::ForwardSimulation] {
        for horizon in [21usize, 252, 1260] {
            group.bench_with_input(
                BenchmarkId::new(mode.as_str(), horizon),
                &horizon,
                |b, &h| {
                    let mut rng = rngs.rng_for("bench", 0);
                    b.iter(|| {
                        let _ = generate_path(mode, black_box(&sample), h, 100.0, start(), &mut rng);
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_strategy_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategy_replay");
    let mut rng = RngHierarchy::new(7).rng_for("bench", 0);
    let path = generate_path(
        PathGenerator::HistoricalBootstrap,
        &sample(1260),
        252,
        100.0,
        start(),
        &mut rng,
    )
    .unwrap();

    let cases = [
        ("dca_monthly", StrategyParameters::Dca {
            frequency: Frequency::Monthly,
            contribution: None,
        }),
        ("value_averaging_weekly", StrategyParameters::ValueAveraging {
            frequency: Frequency::Weekly,
            target_growth_rate: None,
        }),
        ("sma_20_50", StrategyParameters::SmaCrossover {
            short_window: 20,
            long_window: 50,
        }),
    ];
    for (name, params) in cases {
        group.bench_function(name, |b| {
            b.iter(|| {
                let _ = strategies::evaluate(black_box(&path), &params, 10_000.0);
            });
        });
    }
    group.finish();
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");
    for size in [100usize, 1000, 10_000] {
        let capitals: Vec<f64> = (0..size)
            .map(|i| 10_000.0 + ((i * 7919) % 1000) as f64)
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &capitals, |b, caps| {
            b.iter(|| {
                let _ = summarize(black_box(caps), 10_000.0, 100);
            });
        });
    }
    group.finish();
}

fn bench_engine_run(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
    let first = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let days = (today - first).num_days() as u64;
    let (dates, closes): (Vec<NaiveDate>, Vec<f64>) = (0..=days)
        .map(|i| {
            let t = i as f64;
            (first + Days::new(i), 100.0 * (1.0 + 0.0003 * t) * (1.0 + 0.01 * (t * 0.7).sin()))
        })
        .unzip();
    let provider = StaticProvider::new().with_closes("SPY", dates, closes);
    let repo = InMemoryRepository::new().with(StoredStrategy {
        strategy_id: "bench".into(),
        user_id: "u".into(),
        ticker_name: "SPY".into(),
        strategy_type: "dca".into(),
        money_invested: 10_000.0,
        start_date: first,
        end_date: today,
        metadata: StrategyMetadata::default(),
    });
    let engine = MonteCarloEngine::new(&provider, &repo, MonteCarloConfig::default()).with_today(today);

    let mut group = c.benchmark_group("engine_run");
    group.sample_size(10);
    for sims in [100i64, 1000] {
        let request = MonteCarloRequest {
            strategy_id: Some("bench".into()),
            mode: Some("historical_bootstrap".into()),
            horizon_days: Some(252),
            num_simulations: Some(sims),
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(sims), &request, |b, req| {
            b.iter(|| {
                let _ = engine.run(black_box(req));
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_path_generation,
    bench_strategy_replay,
    bench_summarize,
    bench_engine_run
);

criterion_main!(benches);
