//! Outcome statistics over Monte Carlo terminal capitals.
//!
//! All figures are full precision; rounding happens at the response boundary.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of outcomes kept for the distribution preview.
pub const DEFAULT_PREVIEW_LEN: usize = 100;

/// The five reported percentiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

impl Percentiles {
    /// Percentiles of an ascending slice.
    pub fn from_sorted(sorted: &[f64]) -> Self {
        Self {
            p10: percentile_sorted(sorted, 10.0),
            p25: percentile_sorted(sorted, 25.0),
            p50: percentile_sorted(sorted, 50.0),
            p75: percentile_sorted(sorted, 75.0),
            p90: percentile_sorted(sorted, 90.0),
        }
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            p10: f(self.p10),
            p25: f(self.p25),
            p50: f(self.p50),
            p75: f(self.p75),
            p90: f(self.p90),
        }
    }
}

/// Distribution summary of terminal capitals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Percentiles,
    /// Percentiles of `(capital - initial) / initial × 100`.
    pub return_percentiles: Percentiles,
    /// Share of outcomes strictly below the initial capital, in percent.
    pub probability_of_loss: f64,
    /// Leading outcomes in trial order.
    pub preview_capitals: Vec<f64>,
    pub preview_returns: Vec<f64>,
}

/// Summarize terminal capitals against the initial capital.
pub fn summarize(
    terminal_capitals: &[f64],
    initial_capital: f64,
    preview_len: usize,
) -> Result<OutcomeSummary> {
    if terminal_capitals.is_empty() {
        return Err(Error::NoValidSimulations);
    }
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(Error::invalid("Invalid capital amount"));
    }

    let n = terminal_capitals.len();
    let to_return = |c: f64| (c - initial_capital) / initial_capital * 100.0;

    let mut sorted = terminal_capitals.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let variance = sorted.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n as f64;
    let losses = sorted.iter().filter(|&&c| c < initial_capital).count();

    // Return is monotone in capital, so the capital order is also the return order.
    let sorted_returns: Vec<f64> = sorted.iter().map(|&c| to_return(c)).collect();

    let preview_capitals: Vec<f64> = terminal_capitals.iter().take(preview_len).copied().collect();
    let preview_returns = preview_capitals.iter().map(|&c| to_return(c)).collect();

    Ok(OutcomeSummary {
        count: n,
        mean,
        std_dev: variance.sqrt(),
        min: sorted[0],
        max: sorted[n - 1],
        percentiles: Percentiles::from_sorted(&sorted),
        return_percentiles: Percentiles::from_sorted(&sorted_returns),
        probability_of_loss: losses as f64 / n as f64 * 100.0,
        preview_capitals,
        preview_returns,
    })
}

/// Percentile (0 to 100) of an ascending slice, linear between closest ranks.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_no_valid_simulations() {
        assert_eq!(
            summarize(&[], 1000.0, 100).unwrap_err(),
            Error::NoValidSimulations
        );
    }

    #[test]
    fn single_outcome_collapses_percentiles() {
        let s = summarize(&[1100.0], 1000.0, 100).unwrap();
        let p = s.percentiles;
        assert!([p.p10, p.p25, p.p50, p.p75, p.p90].iter().all(|&v| v == 1100.0));
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.probability_of_loss, 0.0);
        assert!((s.return_percentiles.p50 - 10.0).abs() < 1e-12);

        let s = summarize(&[900.0], 1000.0, 100).unwrap();
        assert_eq!(s.probability_of_loss, 100.0);
    }

    #[test]
    fn percentiles_interpolate_linearly() {
        let values: Vec<f64> = (1..=11).map(|v| v as f64 * 10.0).collect();
        let s = summarize(&values, 50.0, 100).unwrap();
        assert!((s.percentiles.p10 - 20.0).abs() < 1e-9);
        assert!((s.percentiles.p50 - 60.0).abs() < 1e-9);
        assert!((s.percentiles.p90 - 100.0).abs() < 1e-9);

        // Four values: rank for p25 is 0.75.
        assert!((percentile_sorted(&[0.0, 4.0, 8.0, 12.0], 25.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn population_std_and_loss_share() {
        let s = summarize(&[900.0, 1100.0, 1000.0, 800.0], 1000.0, 100).unwrap();
        assert!((s.mean - 950.0).abs() < 1e-9);
        // deviations -50, 150, 50, -150 → var 12500
        assert!((s.std_dev - 12_500.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(s.min, 800.0);
        assert_eq!(s.max, 1100.0);
        // Equal to initial is not a loss.
        assert!((s.probability_of_loss - 50.0).abs() < 1e-12);
    }

    #[test]
    fn preview_keeps_trial_order_and_caps_length() {
        let values: Vec<f64> = (0..250).map(|i| 1000.0 + (i % 7) as f64).collect();
        let s = summarize(&values, 1000.0, 100).unwrap();
        assert_eq!(s.preview_capitals.len(), 100);
        assert_eq!(s.preview_capitals[..], values[..100]);
        assert_eq!(s.preview_returns.len(), 100);
        assert!((s.preview_returns[1] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn percentiles_are_ordered() {
        let values = [5.0, 1.0, 9.0, 3.0, 7.0, 2.0];
        let p = summarize(&values, 4.0, 10).unwrap().percentiles;
        assert!(p.p10 <= p.p25 && p.p25 <= p.p50 && p.p50 <= p.p75 && p.p75 <= p.p90);
    }
}
