//! Forward simulation: i.i.d. normal daily returns with the sample's mean and
//! sample standard deviation.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::domain::ReturnSample;
use crate::error::{Error, Result};

pub fn draw_returns<R: Rng + ?Sized>(
    sample: &ReturnSample,
    horizon_days: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let mean = sample.mean();
    let std_dev = sample.std_dev();
    let normal = Normal::new(mean, std_dev).map_err(|e| {
        Error::invalid(format!(
            "cannot build normal distribution (mean {mean}, std {std_dev}): {e}"
        ))
    })?;
    Ok((0..horizon_days).map(|_| normal.sample(rng)).collect())
}
