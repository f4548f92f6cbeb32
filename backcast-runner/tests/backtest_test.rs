//! End-to-end backtests through the CSV provider and the response envelope.

use std::fs;

use backcast_runner::{
    run_backtest, ApiResponse, BacktestPayload, BacktestRequest, CsvProvider, RunError,
};
use backcast_runner::request::Amount;

/// Two weeks of weekday closes for SPY in January 2024.
const SPY_CSV: &str = "\
Date,Open,High,Low,Close,Volume
2024-01-02,100,101,99,100.00,1000
2024-01-03,100,101,99,101.50,1000
2024-01-04,100,101,99,99.25,1000
2024-01-05,100,101,99,102.00,1000
2024-01-08,100,101,99,103.10,1000
2024-01-09,100,101,99,104.00,1000
2024-01-10,100,101,99,103.33,1000
2024-01-11,100,101,99,105.00,1000
2024-01-12,100,101,99,106.25,1000
2024-01-16,100,101,99,107.00,1000
";

fn provider() -> (tempfile::TempDir, CsvProvider) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("SPY.csv"), SPY_CSV).unwrap();
    let provider = CsvProvider::new(dir.path());
    (dir, provider)
}

fn request(strategy: &str) -> BacktestRequest {
    BacktestRequest {
        ticker: Some("spy".into()),
        start_date: Some("2024-01-01".into()),
        end_date: Some("2024-01-31".into()),
        capital: Some(Amount::Number(1000.0)),
        strategy: Some(strategy.into()),
        ..Default::default()
    }
}

fn envelope(result: Result<BacktestPayload, RunError>) -> serde_json::Value {
    serde_json::to_value(ApiResponse::from_result(result)).unwrap()
}

#[test]
fn buy_and_hold_payload_is_rounded() {
    let (_dir, provider) = provider();
    let report = run_backtest(&provider, &request("buy_hold")).unwrap();
    let payload = BacktestPayload::from(&report);

    assert_eq!(payload.ticker, "SPY");
    assert_eq!(payload.series.len(), 10);
    assert_eq!(payload.final_value, 1070.0);
    assert_eq!(payload.total_return_pct, 7.0);

    let json = envelope(Ok(payload));
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["buy_price"], 100.0);
    assert_eq!(json["data"]["sell_price"], 107.0);
    assert_eq!(
        json["data"]["series"][0],
        serde_json::json!({"date": "2024-01-02", "price": 100.0, "value": 1000.0})
    );
}

#[test]
fn weekly_dca_buys_each_week() {
    let (_dir, provider) = provider();
    let mut req = request("dca");
    req.frequency = Some("weekly".into());
    let report = run_backtest(&provider, &req).unwrap();

    let buys = report
        .result
        .series
        .iter()
        .filter(|p| {
            matches!(
                p.detail,
                backcast_core::domain::PointDetail::Contribution { signal: 1, .. }
            )
        })
        .count();
    // Sundays 7th and 14th map to the 5th and the 12th.
    assert_eq!(buys, 2);

    let json = envelope(Ok(BacktestPayload::from(&report)));
    let first_buy = &json["data"]["series"][3];
    assert_eq!(first_buy["signal"], 1);
    assert!(first_buy["shares"].as_f64().unwrap() > 0.0);
    assert!(report.result.uninvested_cash.abs() < 1e-9);
}

#[test]
fn crossover_needs_long_window_of_data() {
    let (_dir, provider) = provider();
    let mut req = request("simple_moving_average_crossover");
    req.short_window = Some(3);
    req.long_window = Some(20);
    let err = run_backtest(&provider, &req).unwrap_err();
    assert_eq!(err.category(), "InsufficientData");

    req.long_window = Some(5);
    assert!(run_backtest(&provider, &req).is_ok());
}

#[test]
fn errors_become_error_envelopes() {
    let (_dir, provider) = provider();
    let mut req = request("buy_hold");
    req.start_date = Some("2024-02-01".into());
    let json = envelope(run_backtest(&provider, &req).map(|r| BacktestPayload::from(&r)));
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "Start date must be before end date");
    assert!(json.get("data").is_none());

    let mut req = request("buy_hold");
    req.start_date = Some("2023-01-01".into());
    req.end_date = Some("2023-06-01".into());
    let json = envelope(run_backtest(&provider, &req).map(|r| BacktestPayload::from(&r)));
    assert_eq!(json["error_type"], "DataUnavailable");
}

#[test]
fn unsupported_strategy_is_rejected() {
    let (_dir, provider) = provider();
    let err = run_backtest(&provider, &request("martingale")).unwrap_err();
    assert_eq!(err.to_string(), "Unsupported strategy type: martingale");
}
