//! Historical bootstrap: i.i.d. resampling of observed daily returns.

use rand::Rng;

/// Draw `horizon_days` returns uniformly with replacement from `sample`.
///
/// `sample` must be non-empty; the caller checks.
pub fn draw_returns<R: Rng + ?Sized>(sample: &[f64], horizon_days: usize, rng: &mut R) -> Vec<f64> {
    (0..horizon_days)
        .map(|_| sample[rng.gen_range(0..sample.len())])
        .collect()
}
