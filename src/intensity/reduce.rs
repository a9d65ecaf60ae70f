use anyhow::Result;
use rayon::prelude::*;

/// Evaluate `f` for every row, optionally on the rayon pool. Results keep row order.
pub(crate) fn evaluate<F>(len: usize, parallel: bool, f: F) -> Result<Vec<f64>>
where
    F: Fn(usize) -> Result<f64> + Sync + Send,
{
    if parallel {
        (0..len).into_par_iter().map(f).collect()
    } else {
        (0..len).map(f).collect()
    }
}

/// Mean of the non-NaN values; NaN if there are none.
pub(crate) fn nan_mean(values: &[f64]) -> f64 {
    let (sum, count) = values.iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}

/// Population standard deviation of the non-NaN values; NaN if there are none.
pub(crate) fn nan_std(values: &[f64]) -> f64 {
    let mean = nan_mean(values);
    if mean.is_nan() { return f64::NAN }
    let (sq, count) = values.iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sq, count), v| (sq + (v - mean) * (v - mean), count + 1));
    (sq / count as f64).sqrt()
}
