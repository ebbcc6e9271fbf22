//! Summary statistics over flat slices.
//!
//! All functions return `None` for empty input instead of `NaN`, so callers
//! decide how an empty dataset is reported.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`, not `n - 1`).
pub fn population_std(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    let var = values.iter().map(|v| (v - mu) * (v - mu)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Root mean square of the values.
pub fn rmse(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let ms = values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64;
    Some(ms.sqrt())
}

/// Largest absolute value.
pub fn max_abs(values: &[f64]) -> Option<f64> {
    values.iter().map(|v| v.abs()).reduce(f64::max)
}

/// Element-wise `a - b`; the shorter length wins.
pub fn diff(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}
