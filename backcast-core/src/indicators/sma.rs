//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

/// Rolling mean over `period` values. Entries before the window fills are NaN.
///
/// The value at index `t` reads only `values[t + 1 - period..=t]`.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "SMA period must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period {
        return result;
    }

    let mut sum: f64 = values[..period].iter().sum();
    result[period - 1] = sum / period as f64;

    // Roll the window forward
    for i in period..n {
        sum += values[i] - values[i - period];
        result[i] = sum / period as f64;
    }

    result
}
