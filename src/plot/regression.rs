//! Scatter + posterior-mean regression line + HDI band.
//!
//! The chart is computed up front into a [`RegressionPlot`]; rendering
//! (`to_svg_string`, `save_svg`, the terminal widget) only draws it.
//!
//! The line uses the posterior means of `Intercept` and of the slope variable
//! named after the predictor column:
//!
//! ```text
//! y(x) = mean(Intercept) + mean(slope) * x,   x in linspace(min x, max x, n_draws)
//! ```

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PlotConfig;
use crate::domain::{ObservationTable, Posterior, unique_values};
use crate::error::{ErrorKind, PlotError};
use crate::math::{linspace, min_max};
use crate::plot::band::HdiBand;
use crate::plot::render::{DrawResult, Palette, draw_band, draw_markers, pad_range, render_svg, write_svg};
use crate::summary::INTERCEPT_ROW;

/// Render-ready regression chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionPlot {
    pub x_label: String,
    pub y_label: String,
    /// Observed `(x, y)` pairs.
    pub points: Vec<(f64, f64)>,
    /// Posterior-mean regression line over the predictor range.
    pub line: Vec<(f64, f64)>,
    pub intercept: f64,
    pub slope: f64,
    pub band: Option<HdiBand>,
}

/// Build a regression chart with the default configuration.
///
/// - `x_key` / `y_key`: predictor and response columns; `x_key` is also the
///   slope's posterior variable.
/// - `random_factor`: optional grouping column for the pooled band.
/// - `add_hdi`: draw the band from `{y_key}_mean`.
pub fn plot_linear_regression(
    df: &ObservationTable,
    fitted: &Posterior,
    x_key: &str,
    y_key: &str,
    random_factor: Option<&str>,
    add_hdi: bool,
) -> Result<RegressionPlot, PlotError> {
    plot_linear_regression_with(df, fitted, x_key, y_key, random_factor, add_hdi, &PlotConfig::default())
}

/// Same as [`plot_linear_regression`], with explicit interval probabilities.
pub fn plot_linear_regression_with(
    df: &ObservationTable,
    fitted: &Posterior,
    x_key: &str,
    y_key: &str,
    random_factor: Option<&str>,
    add_hdi: bool,
    config: &PlotConfig,
) -> Result<RegressionPlot, PlotError> {
    let x = df.numeric(x_key)?;
    let y = df.numeric(y_key)?;
    let (x_min, x_max) = min_max(x).ok_or_else(|| {
        PlotError::new(
            ErrorKind::InvalidInput,
            format!("Column `{x_key}` has no finite values."),
        )
    })?;

    let intercept = fitted.variable(INTERCEPT_ROW)?.mean();
    let slope = fitted.variable(x_key)?.mean();
    log::debug!("regression {y_key} ~ {x_key}: intercept={intercept:.4}, slope={slope:.4}");

    let line = linspace(x_min, x_max, fitted.n_draws())
        .into_iter()
        .map(|v| (v, intercept + slope * v))
        .collect();
    let points = x.iter().copied().zip(y.iter().copied()).collect();

    let band = if add_hdi {
        let band = match random_factor {
            None => observation_band(df, fitted, x, y_key, config.hdi_prob)?,
            Some(group) => grouped_band(df, fitted, x, y_key, group, config.grouped_hdi_prob)?,
        };
        log::debug!("band: {} positions at prob={}", band.len(), band.prob);
        Some(band)
    } else {
        None
    };

    Ok(RegressionPlot {
        x_label: x_key.to_string(),
        y_label: y_key.to_string(),
        points,
        line,
        intercept,
        slope,
        band,
    })
}

fn mean_response(
    df: &ObservationTable,
    fitted: &Posterior,
    y_key: &str,
) -> Result<nalgebra::DMatrix<f64>, PlotError> {
    let name = format!("{y_key}_mean");
    let var = fitted.variable(&name)?;
    if var.n_elems() != df.n_rows() {
        return Err(PlotError::new(
            ErrorKind::Shape,
            format!(
                "`{name}` has {} elements but the table has {} rows.",
                var.n_elems(),
                df.n_rows()
            ),
        ));
    }
    Ok(var.stacked())
}

/// Per-observation band drawn at each observation's own x.
fn observation_band(
    df: &ObservationTable,
    fitted: &Posterior,
    x: &[f64],
    y_key: &str,
    prob: f64,
) -> Result<HdiBand, PlotError> {
    let samples = mean_response(df, fitted, y_key)?;
    HdiBand::from_rows(x, &samples, prob)
}

/// One band over the distinct x values, pooling every group's samples.
///
/// Each group must have one row per distinct x, in the same order.
fn grouped_band(
    df: &ObservationTable,
    fitted: &Posterior,
    x: &[f64],
    y_key: &str,
    group: &str,
    prob: f64,
) -> Result<HdiBand, PlotError> {
    let samples = mean_response(df, fitted, y_key)?;
    let x_unique = unique_values(x);

    let mut blocks = Vec::new();
    for label in df.unique_labels(group)? {
        let idx = df.rows_matching(group, &label)?;
        if idx.len() != x_unique.len() {
            return Err(PlotError::new(
                ErrorKind::Shape,
                format!(
                    "Group `{label}` has {} rows but there are {} distinct x values.",
                    idx.len(),
                    x_unique.len()
                ),
            ));
        }
        blocks.push(samples.select_rows(idx.iter()));
    }
    log::trace!("pooling {} groups of `{group}`", blocks.len());

    HdiBand::pooled(&x_unique, &blocks, prob)
}

impl RegressionPlot {
    /// Padded x bounds covering points and line.
    pub fn x_bounds(&self) -> (f64, f64) {
        let xs: Vec<f64> = self.points.iter().chain(&self.line).map(|p| p.0).collect();
        let (lo, hi) = min_max(&xs).unwrap_or((0.0, 1.0));
        pad_range(lo, hi, 0.05)
    }

    /// Padded y bounds covering points, line and band.
    pub fn y_bounds(&self) -> (f64, f64) {
        let mut ys: Vec<f64> = self.points.iter().chain(&self.line).map(|p| p.1).collect();
        if let Some((lo, hi)) = self.band.as_ref().and_then(HdiBand::y_extent) {
            ys.extend([lo, hi]);
        }
        let (lo, hi) = min_max(&ys).unwrap_or((0.0, 1.0));
        pad_range(lo, hi, 0.05)
    }

    /// Draw onto any Plotters drawing area (SVG file, string, terminal).
    pub fn draw_on<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        config: &PlotConfig,
    ) -> Result<(), PlotError> {
        let palette = Palette::from_config(config)?;
        self.draw_chart(root, &palette, config).map_err(PlotError::render)
    }

    pub(crate) fn draw_chart<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        palette: &Palette,
        config: &PlotConfig,
    ) -> DrawResult<DB> {
        let (x0, x1) = self.x_bounds();
        let (y0, y1) = self.y_bounds();

        root.fill(&palette.background)?;

        let mut chart = ChartBuilder::on(root)
            .margin(config.margin)
            .x_label_area_size(config.x_label_area)
            .y_label_area_size(config.y_label_area)
            .build_cartesian_2d(x0..x1, y0..y1)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_desc(&self.x_label)
            .y_desc(&self.y_label)
            .x_labels(5)
            .y_labels(5)
            .label_style(("sans-serif", f64::from(config.font_size)).into_font().color(&palette.foreground))
            .axis_style(&palette.foreground)
            .draw()?;

        // Band first so the points and line stay visible on top of it.
        if let Some(band) = &self.band {
            draw_band(&mut chart, band, palette.band, config.band_alpha, config.smooth_band)?;
        }

        draw_markers(&mut chart, &self.points, palette.point, config.point_alpha, None, config)?;

        chart.draw_series(LineSeries::new(
            self.line.iter().copied(),
            palette.line.stroke_width(config.line_width),
        ))?;

        Ok(())
    }

    /// Render to an SVG document of `config.width` x `config.height` pixels.
    pub fn to_svg_string(&self, config: &PlotConfig) -> Result<String, PlotError> {
        render_svg((config.width, config.height), |root| self.draw_on(root, config))
    }

    /// Render and write an SVG file.
    pub fn save_svg(&self, path: &Path, config: &PlotConfig) -> Result<(), PlotError> {
        let svg = self.to_svg_string(config)?;
        write_svg(path, &svg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PosteriorVariable;

    /// Two groups x three days; `y_mean` draws are spread around the row's y.
    fn fixture() -> (ObservationTable, Posterior) {
        let df = ObservationTable::new()
            .with_numeric("Days", vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0])
            .unwrap()
            .with_numeric("y", vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0])
            .unwrap()
            .with_text(
                "Subject",
                ["a", "a", "a", "b", "b", "b"].iter().map(|s| s.to_string()).collect(),
            )
            .unwrap();

        let n_chains = 2;
        let n_draws = 5;
        let intercept = PosteriorVariable::scalar(vec![vec![1.0; n_draws], vec![2.0; n_draws]]).unwrap();
        let slope = PosteriorVariable::scalar(vec![vec![2.0; n_draws], vec![2.0; n_draws]]).unwrap();

        let y = df.numeric("y").unwrap().to_vec();
        let mut values = Vec::new();
        for chain in 0..n_chains {
            for draw in 0..n_draws {
                for &yi in &y {
                    values.push(yi + (draw as f64 - 2.0) * 0.1 + chain as f64 * 0.01);
                }
            }
        }
        let y_mean = PosteriorVariable::new(n_chains, n_draws, y.len(), values).unwrap();

        let post = Posterior::new()
            .with_variable("Intercept", intercept)
            .unwrap()
            .with_variable("Days", slope)
            .unwrap()
            .with_variable("y_mean", y_mean)
            .unwrap();
        (df, post)
    }

    #[test]
    fn line_endpoints_follow_posterior_means() {
        let (df, post) = fixture();
        let plot = plot_linear_regression(&df, &post, "Days", "y", None, false).unwrap();

        assert!((plot.intercept - 1.5).abs() < 1e-12);
        assert!((plot.slope - 2.0).abs() < 1e-12);
        // One line point per draw.
        assert_eq!(plot.line.len(), 5);
        let first = plot.line[0];
        let last = plot.line[plot.line.len() - 1];
        assert_eq!(first.0, 0.0);
        assert_eq!(last.0, 2.0);
        assert!((first.1 - (plot.intercept + plot.slope * 0.0)).abs() < 1e-12);
        assert!((last.1 - (plot.intercept + plot.slope * 2.0)).abs() < 1e-12);
        assert!(plot.band.is_none());
        assert_eq!(plot.points.len(), 6);
    }

    #[test]
    fn ungrouped_band_has_one_interval_per_observation() {
        let (df, post) = fixture();
        let plot = plot_linear_regression(&df, &post, "Days", "y", None, true).unwrap();
        let band = plot.band.unwrap();
        assert_eq!(band.prob, 0.94);
        assert_eq!(band.len(), 6);
        for (i, yi) in [1.0, 3.0, 5.0, 2.0, 4.0, 6.0].iter().enumerate() {
            assert!(band.lower[i] <= *yi && *yi <= band.upper[i] + 0.01, "row {i}");
        }
    }

    #[test]
    fn grouped_band_pools_groups_per_distinct_x() {
        let (df, post) = fixture();
        let plot = plot_linear_regression(&df, &post, "Days", "y", Some("Subject"), true).unwrap();
        let band = plot.band.unwrap();
        assert_eq!(band.prob, 0.68);
        assert_eq!(band.x, vec![0.0, 1.0, 2.0]);
        // Day 0 pools rows 0 (y=1) and 3 (y=2): the interval sits between them.
        assert!(band.lower[0] >= 0.7 && band.upper[0] <= 2.3);
        assert!(band.lower[2] >= 4.7 && band.upper[2] <= 6.3);
    }

    #[test]
    fn uneven_groups_are_a_shape_error() {
        let (_, post) = fixture();
        let df = ObservationTable::new()
            .with_numeric("Days", vec![0.0, 1.0, 2.0, 0.0, 1.0, 0.0])
            .unwrap()
            .with_numeric("y", vec![1.0; 6])
            .unwrap()
            .with_text("Subject", ["a", "a", "a", "b", "b", "c"].iter().map(|s| s.to_string()).collect())
            .unwrap();
        let err = plot_linear_regression(&df, &post, "Days", "y", Some("Subject"), true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn missing_inputs_surface_as_errors() {
        let (df, post) = fixture();
        let err = plot_linear_regression(&df, &post, "Hours", "y", None, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingColumn);
        let err = plot_linear_regression(&df, &post, "Days", "y", Some("Site"), true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingColumn);

        let no_mean = Posterior::new()
            .with_variable("Intercept", post.variable("Intercept").unwrap().clone())
            .unwrap()
            .with_variable("Days", post.variable("Days").unwrap().clone())
            .unwrap();
        let err = plot_linear_regression(&df, &no_mean, "Days", "y", None, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingVariable);
        assert!(err.to_string().contains("y_mean"));
    }

    #[test]
    fn renders_svg_document() {
        let (df, post) = fixture();
        let plot = plot_linear_regression(&df, &post, "Days", "y", None, true).unwrap();
        let svg = plot.to_svg_string(&PlotConfig::default()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("polygon"));
        assert!(svg.contains("circle"));
        assert!(svg.contains("Days"));
    }

    fn polygon_vertices(svg: &str) -> usize {
        let start = svg.find("<polygon").expect("band polygon");
        let tag = &svg[start..];
        let end = tag.find('>').expect("closed tag");
        tag[..end].matches(',').count()
    }

    #[test]
    fn band_is_resampled_only_when_smoothing() {
        let (df, post) = fixture();
        let plot = plot_linear_regression(&df, &post, "Days", "y", None, true).unwrap();

        let raw = PlotConfig {
            smooth_band: false,
            ..PlotConfig::default()
        };
        let raw_vertices = polygon_vertices(&plot.to_svg_string(&raw).unwrap());
        let smooth_vertices = polygon_vertices(&plot.to_svg_string(&PlotConfig::default()).unwrap());
        assert!(raw_vertices <= 12, "{raw_vertices}");
        assert!(smooth_vertices > 100, "{smooth_vertices}");
    }
}
