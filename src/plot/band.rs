//! Credible-interval bands built from stacked posterior samples.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, PlotError};
use crate::math::{hdi, interp_linear, linspace, savgol_quadratic};

/// Resampling grid and filter window used when drawing smoothed bands.
pub const SMOOTH_POINTS: usize = 200;
pub const SMOOTH_WINDOW: usize = 55;

/// Lower/upper HDI bounds at a set of x positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HdiBand {
    pub prob: f64,
    pub x: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl HdiBand {
    /// One interval per row of `samples` (shape `(position, sample)`).
    pub fn from_rows(x: &[f64], samples: &DMatrix<f64>, prob: f64) -> Result<Self, PlotError> {
        if samples.nrows() != x.len() {
            return Err(PlotError::new(
                ErrorKind::Shape,
                format!("{} x positions but {} sample rows.", x.len(), samples.nrows()),
            ));
        }
        let mut lower = Vec::with_capacity(x.len());
        let mut upper = Vec::with_capacity(x.len());
        for row in samples.row_iter() {
            let values: Vec<f64> = row.iter().copied().collect();
            let (lo, hi) = hdi(&values, prob)?;
            lower.push(lo);
            upper.push(hi);
        }
        Ok(Self {
            prob,
            x: x.to_vec(),
            lower,
            upper,
        })
    }

    /// One interval per position, pooling that position's samples over blocks.
    ///
    /// Each block is one group's `(position, sample)` matrix; row `k` of every
    /// block contributes to the interval at `x[k]`.
    pub fn pooled(x: &[f64], blocks: &[DMatrix<f64>], prob: f64) -> Result<Self, PlotError> {
        if let Some(bad) = blocks.iter().find(|b| b.nrows() != x.len()) {
            return Err(PlotError::new(
                ErrorKind::Shape,
                format!("Group block has {} rows, expected {}.", bad.nrows(), x.len()),
            ));
        }
        let mut lower = Vec::with_capacity(x.len());
        let mut upper = Vec::with_capacity(x.len());
        for k in 0..x.len() {
            let values: Vec<f64> = blocks.iter().flat_map(|b| b.row(k).iter().copied().collect::<Vec<_>>()).collect();
            let (lo, hi) = hdi(&values, prob)?;
            lower.push(lo);
            upper.push(hi);
        }
        Ok(Self {
            prob,
            x: x.to_vec(),
            lower,
            upper,
        })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Closed outline for filling: upper bound left to right, then lower bound back.
    pub fn outline(&self) -> Vec<(f64, f64)> {
        let mut order: Vec<usize> = (0..self.x.len()).collect();
        order.sort_by(|&a, &b| self.x[a].total_cmp(&self.x[b]));

        let mut out = Vec::with_capacity(2 * order.len());
        out.extend(order.iter().map(|&i| (self.x[i], self.upper[i])));
        out.extend(order.iter().rev().map(|&i| (self.x[i], self.lower[i])));
        out
    }

    /// Band resampled onto `n_points` evenly spaced x values, then smoothed.
    ///
    /// Positions sharing an x value are merged by averaging their bounds
    /// first. Bands with fewer than two distinct x values come back as is.
    /// The window shrinks to fit short grids.
    pub fn smoothed(&self, n_points: usize, window: usize) -> Result<HdiBand, PlotError> {
        let (xs, lower, upper) = self.merged();
        if xs.len() < 2 || n_points < 3 {
            return Ok(self.clone());
        }
        let mut window = window.min(n_points);
        if window % 2 == 0 {
            window -= 1;
        }

        let grid = linspace(xs[0], xs[xs.len() - 1], n_points);
        let lower = savgol_quadratic(&interp_linear(&xs, &lower, &grid), window)?;
        let upper = savgol_quadratic(&interp_linear(&xs, &upper, &grid), window)?;
        Ok(HdiBand {
            prob: self.prob,
            x: grid,
            lower,
            upper,
        })
    }

    /// Distinct x values in ascending order with mean bounds per value.
    fn merged(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let mut order: Vec<usize> = (0..self.x.len()).collect();
        order.sort_by(|&a, &b| self.x[a].total_cmp(&self.x[b]));

        let (mut xs, mut lower, mut upper) = (Vec::new(), Vec::new(), Vec::new());
        let mut start = 0;
        while start < order.len() {
            let x = self.x[order[start]];
            let end = start + order[start..].iter().take_while(|&&i| self.x[i] == x).count();
            let group = &order[start..end];
            let n = group.len() as f64;
            xs.push(x);
            lower.push(group.iter().map(|&i| self.lower[i]).sum::<f64>() / n);
            upper.push(group.iter().map(|&i| self.upper[i]).sum::<f64>() / n);
            start = end;
        }
        (xs, lower, upper)
    }

    /// `(min lower, max upper)` over all positions.
    pub fn y_extent(&self) -> Option<(f64, f64)> {
        let lo = self.lower.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = self.upper.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (lo <= hi).then_some((lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_become_intervals() {
        // Two positions, 10 samples each.
        let samples = DMatrix::from_fn(2, 10, |r, c| (r * 100 + c) as f64);
        let band = HdiBand::from_rows(&[0.0, 1.0], &samples, 0.5).unwrap();
        assert_eq!(band.lower, vec![0.0, 100.0]);
        assert_eq!(band.upper, vec![5.0, 105.0]);
    }

    #[test]
    fn pooled_combines_blocks_per_position() {
        let a = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 10.0, 11.0]);
        let b = DMatrix::from_row_slice(2, 2, &[2.0, 3.0, 12.0, 13.0]);
        let band = HdiBand::pooled(&[0.0, 1.0], &[a, b], 1.0).unwrap();
        assert_eq!(band.lower, vec![0.0, 10.0]);
        assert_eq!(band.upper, vec![3.0, 13.0]);
    }

    #[test]
    fn pooled_rejects_uneven_groups() {
        let a = DMatrix::from_row_slice(2, 1, &[0.0, 1.0]);
        let b = DMatrix::from_row_slice(1, 1, &[0.0]);
        let err = HdiBand::pooled(&[0.0, 1.0], &[a, b], 0.68).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn outline_is_sorted_by_x() {
        let band = HdiBand {
            prob: 0.9,
            x: vec![2.0, 0.0, 1.0],
            lower: vec![20.0, 0.0, 10.0],
            upper: vec![21.0, 1.0, 11.0],
        };
        assert_eq!(
            band.outline(),
            vec![(0.0, 1.0), (1.0, 11.0), (2.0, 21.0), (2.0, 20.0), (1.0, 10.0), (0.0, 0.0)]
        );
        assert_eq!(band.y_extent(), Some((0.0, 21.0)));
    }

    #[test]
    fn smoothing_merges_repeated_x_onto_a_regular_grid() {
        // Two observations per day with different bounds; the merged band is linear.
        let band = HdiBand {
            prob: 0.94,
            x: vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0],
            lower: vec![0.0, 9.0, 19.0, 2.0, 11.0, 19.0],
            upper: vec![5.0, 15.0, 25.0, 5.0, 15.0, 25.0],
        };
        let smooth = band.smoothed(SMOOTH_POINTS, SMOOTH_WINDOW).unwrap();
        assert_eq!(smooth.len(), SMOOTH_POINTS);
        assert_eq!(smooth.x[0], 0.0);
        assert_eq!(smooth.x[SMOOTH_POINTS - 1], 2.0);
        assert!(smooth.x.windows(2).all(|w| w[0] < w[1]));
        for (i, &x) in smooth.x.iter().enumerate() {
            assert!((smooth.lower[i] - (1.0 + 9.0 * x)).abs() < 1e-6, "lower at {x}");
            assert!((smooth.upper[i] - (5.0 + 10.0 * x)).abs() < 1e-6, "upper at {x}");
        }
    }

    #[test]
    fn smoothing_a_single_position_is_a_no_op() {
        let band = HdiBand {
            prob: 0.94,
            x: vec![3.0, 3.0],
            lower: vec![1.0, 2.0],
            upper: vec![4.0, 5.0],
        };
        assert_eq!(band.smoothed(SMOOTH_POINTS, SMOOTH_WINDOW).unwrap(), band);
    }
}
