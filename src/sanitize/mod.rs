use crate::types::{Precision, ROW_SUM_TOLERANCE};

/// Whether any entry is NaN or infinite
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// Plain running sum
pub fn naive_sum(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc, &v| acc + v)
}

/// Kahan compensated summation
pub fn kahan_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;
    for &v in values {
        let y = v - correction;
        let t = sum + y;
        correction = (t - sum) - y;
        sum = t;
    }
    sum
}

pub fn row_sum(values: &[f64], precision: Precision) -> f64 {
    match precision {
        Precision::Standard => naive_sum(values),
        Precision::Compensated => kahan_sum(values),
    }
}

/// Rescale `row` in place into a probability distribution.
///
/// Returns `false` when the row carried no usable mass; the row is then
/// replaced by the uniform distribution.
pub fn normalize_row(row: &mut [f64], precision: Precision) -> bool {
    if row.is_empty() {
        return true;
    }

    let total = row_sum(row, precision);
    if !total.is_finite() || total <= 0.0 || has_invalid_values(row) {
        let uniform = 1.0 / row.len() as f64;
        row.iter_mut().for_each(|v| *v = uniform);
        return false;
    }

    for v in row.iter_mut() {
        *v /= total;
    }
    true
}

/// Non-negative entries summing to one within tolerance
pub fn is_stochastic(row: &[f64]) -> bool {
    !has_invalid_values(row)
        && row.iter().all(|&v| v >= 0.0)
        && (kahan_sum(row) - 1.0).abs() <= ROW_SUM_TOLERANCE
}
