//! Resampling and Savitzky-Golay smoothing for drawn bands.
//!
//! Each output point is the value at that point of the least-squares quadratic
//! through the `window` samples around it. Near the ends the window is pinned
//! to the first or last `window` samples instead of being padded.

use nalgebra::{DMatrix, DVector};

use crate::error::{ErrorKind, PlotError};

/// Piecewise-linear interpolation of `(xs, ys)` at each of `at`.
///
/// `xs` must be strictly increasing; queries outside it are clamped to the
/// end values.
pub fn interp_linear(xs: &[f64], ys: &[f64], at: &[f64]) -> Vec<f64> {
    if xs.len() < 2 {
        let only = ys.first().copied().unwrap_or(f64::NAN);
        return vec![only; at.len()];
    }
    at.iter()
        .map(|&t| {
            let hi = xs.partition_point(|&x| x <= t).clamp(1, xs.len() - 1);
            let lo = hi - 1;
            if t <= xs[lo] {
                return ys[lo];
            }
            if t >= xs[hi] {
                return ys[hi];
            }
            let w = (t - xs[lo]) / (xs[hi] - xs[lo]);
            ys[lo] + w * (ys[hi] - ys[lo])
        })
        .collect()
}

/// Quadratic Savitzky-Golay filter over an odd `window` of at least 3 samples.
pub fn savgol_quadratic(values: &[f64], window: usize) -> Result<Vec<f64>, PlotError> {
    if window < 3 || window % 2 == 0 {
        return Err(PlotError::new(
            ErrorKind::InvalidInput,
            format!("Smoothing window must be odd and at least 3, got {window}."),
        ));
    }
    let n = values.len();
    if n < window {
        return Err(PlotError::new(
            ErrorKind::Shape,
            format!("Cannot smooth {n} values with a window of {window}."),
        ));
    }

    let half = window / 2;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let start = i.saturating_sub(half).min(n - window);
        // Offsets are centred on `i` (and scaled to the half-window), so the
        // fitted constant term is the value at `i`.
        let design = DMatrix::from_fn(window, 3, |r, c| {
            (((start + r) as f64 - i as f64) / half as f64).powi(c as i32)
        });
        let y = DVector::from_column_slice(&values[start..start + window]);
        let coef = design.svd(true, true).solve(&y, 1e-12).map_err(|e| {
            PlotError::new(ErrorKind::InvalidInput, format!("Smoothing fit failed: {e}"))
        })?;
        out.push(coef[0]);
    }
    Ok(out)
}
