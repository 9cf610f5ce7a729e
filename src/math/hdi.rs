//! Highest density interval of a sample.
//!
//! For `n` sorted samples and probability `p`, every window of `k = floor(p * n)`
//! consecutive gaps holds (at least) `p` of the mass. The HDI is the narrowest
//! such window:
//!
//! ```text
//! i* = argmin_i  sorted[i + k] - sorted[i],   i in 0..n-k
//! HDI = (sorted[i*], sorted[i* + k])
//! ```
//!
//! Ties resolve to the leftmost window.

use crate::error::{ErrorKind, PlotError};

/// Probability mass used when no explicit value is given.
pub const DEFAULT_HDI_PROB: f64 = 0.94;

/// Compute the highest density interval of `samples` at probability `prob`.
pub fn hdi(samples: &[f64], prob: f64) -> Result<(f64, f64), PlotError> {
    if !(prob > 0.0 && prob <= 1.0) {
        return Err(PlotError::new(
            ErrorKind::InvalidInput,
            format!("HDI probability must be in (0, 1], got {prob}."),
        ));
    }
    if samples.is_empty() {
        return Err(PlotError::new(ErrorKind::InvalidInput, "Cannot compute an HDI of zero samples."));
    }
    if samples.iter().any(|v| !v.is_finite()) {
        return Err(PlotError::new(ErrorKind::InvalidInput, "HDI samples must be finite."));
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let k = ((prob * n as f64).floor() as usize).min(n - 1);

    let mut best = 0usize;
    let mut best_width = f64::INFINITY;
    for i in 0..n - k {
        let width = sorted[i + k] - sorted[i];
        if width < best_width {
            best_width = width;
            best = i;
        }
    }

    Ok((sorted[best], sorted[best + k]))
}

/// Column labels for the HDI bounds at `prob` (`0.94` -> `hdi_3%`, `hdi_97%`).
pub fn hdi_labels(prob: f64) -> (String, String) {
    let lower = (1.0 - prob) / 2.0 * 100.0;
    let upper = 100.0 - lower;
    (format!("hdi_{}%", fmt_percent(lower)), format!("hdi_{}%", fmt_percent(upper)))
}

fn fmt_percent(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_grid_interval() {
        let samples: Vec<f64> = (0..100).map(f64::from).collect();
        let (lo, hi) = hdi(&samples, 0.9).unwrap();
        assert_eq!((lo, hi), (0.0, 90.0));
    }

    #[test]
    fn picks_narrowest_window_for_skewed_samples() {
        // Mass concentrated near zero with a long right tail.
        let mut samples = vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];
        samples.extend([5.0, 50.0]);
        let (lo, hi) = hdi(&samples, 0.7).unwrap();
        assert_eq!((lo, hi), (0.0, 0.7));
    }

    #[test]
    fn order_of_input_does_not_matter() {
        let a = [3.0, 1.0, 2.0, 10.0, 2.5, 1.5];
        let mut b = a;
        b.reverse();
        assert_eq!(hdi(&a, 0.5).unwrap(), hdi(&b, 0.5).unwrap());
    }

    #[test]
    fn rejects_bad_inputs() {
        assert_eq!(hdi(&[], 0.9).unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(hdi(&[1.0], 0.0).unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(hdi(&[1.0, f64::NAN], 0.5).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn single_sample_collapses() {
        assert_eq!(hdi(&[4.2], 0.94).unwrap(), (4.2, 4.2));
    }

    #[test]
    fn labels_use_percent_bounds() {
        assert_eq!(hdi_labels(0.94), ("hdi_3%".to_string(), "hdi_97%".to_string()));
        assert_eq!(hdi_labels(0.95), ("hdi_2.5%".to_string(), "hdi_97.5%".to_string()));
    }
}
