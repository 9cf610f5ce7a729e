//! Per-subject small multiples for the sleep-deprivation study.
//!
//! This chart only fits the `sleepstudy` layout: 18 subjects observed on days
//! 0..=9, with columns `Subject`, `Days` and `Reaction`, and a posterior
//! variable `Reaction_mean` holding one element per row.
//!
//! Each panel shows the subject's raw reaction times, the HDI band of the
//! posterior mean response and the posterior mean response itself.

use std::path::Path;

use nalgebra::DMatrix;
use plotters::coord::Shift;
use plotters::coord::combinators::WithKeyPoints;
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PlotConfig;
use crate::domain::{ObservationTable, Posterior};
use crate::error::{ErrorKind, PlotError};
use crate::math::min_max;
use crate::plot::band::HdiBand;
use crate::plot::render::{DrawResult, Palette, draw_band, draw_markers, pad_range, render_svg, write_svg};

pub const SUBJECT_COLUMN: &str = "Subject";
pub const DAYS_COLUMN: &str = "Days";
pub const REACTION_COLUMN: &str = "Reaction";
pub const REACTION_MEAN_VAR: &str = "Reaction_mean";

pub const GRID_ROWS: usize = 2;
pub const GRID_COLS: usize = 9;
pub const X_TICKS: [f64; 5] = [0.0, 2.0, 4.0, 6.0, 8.0];
pub const X_LABEL: &str = "Days";
pub const Y_LABEL: &str = "Reaction time (ms)";

/// Figure size in inches and resolution.
pub const FIGURE_INCHES: (f64, f64) = (16.0, 7.5);
pub const FIGURE_DPI: f64 = 300.0;

/// Subplot margins as figure fractions (left, right, bottom, top).
const SUBPLOT_LEFT: f64 = 0.075;
const SUBPLOT_RIGHT: f64 = 0.975;
const SUBPLOT_BOTTOM: f64 = 0.075;
const SUBPLOT_TOP: f64 = 0.925;

const TITLE_POINTS: f64 = 14.0;

/// One subject's panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectPanel {
    pub subject: String,
    /// Observed `(day, reaction)` pairs.
    pub points: Vec<(f64, f64)>,
    /// Posterior mean response per observation, in row order.
    pub mean_line: Vec<(f64, f64)>,
    pub band: HdiBand,
}

impl SubjectPanel {
    pub fn title(&self) -> String {
        format!("Subject: {}", self.subject)
    }
}

/// Render-ready 2 x 9 grid with shared axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectGridPlot {
    pub rows: usize,
    pub cols: usize,
    pub panels: Vec<SubjectPanel>,
    pub x_ticks: Vec<f64>,
    pub x_label: String,
    pub y_label: String,
    pub x_bounds: (f64, f64),
    pub y_bounds: (f64, f64),
}

/// Build the sleep-study grid with the default HDI probability.
pub fn plot_individual_sleep_data(sleepstudy: &ObservationTable, fitted: &Posterior) -> Result<SubjectGridPlot, PlotError> {
    plot_individual_sleep_data_with(sleepstudy, fitted, &PlotConfig::default())
}

pub fn plot_individual_sleep_data_with(
    sleepstudy: &ObservationTable,
    fitted: &Posterior,
    config: &PlotConfig,
) -> Result<SubjectGridPlot, PlotError> {
    let days = sleepstudy.numeric(DAYS_COLUMN)?;
    let reaction = sleepstudy.numeric(REACTION_COLUMN)?;
    let subjects = sleepstudy.unique_labels(SUBJECT_COLUMN)?;

    let capacity = GRID_ROWS * GRID_COLS;
    if subjects.len() > capacity {
        return Err(PlotError::new(
            ErrorKind::Shape,
            format!("{} subjects do not fit a {GRID_ROWS}x{GRID_COLS} grid.", subjects.len()),
        ));
    }

    let mean_var = fitted.variable(REACTION_MEAN_VAR)?;
    if mean_var.n_elems() != sleepstudy.n_rows() {
        return Err(PlotError::new(
            ErrorKind::Shape,
            format!(
                "`{REACTION_MEAN_VAR}` has {} elements but the table has {} rows.",
                mean_var.n_elems(),
                sleepstudy.n_rows()
            ),
        ));
    }
    let reaction_mean = mean_var.stacked();

    let mut panels = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let idx = sleepstudy.rows_matching(SUBJECT_COLUMN, &subject)?;
        let x: Vec<f64> = idx.iter().map(|&i| days[i]).collect();
        let points = idx.iter().map(|&i| (days[i], reaction[i])).collect();

        let block: DMatrix<f64> = reaction_mean.select_rows(idx.iter());
        let band = HdiBand::from_rows(&x, &block, config.hdi_prob)?;
        let mean_line = x
            .iter()
            .zip(block.row_iter())
            .map(|(&d, row)| (d, row.mean()))
            .collect();

        panels.push(SubjectPanel {
            subject,
            points,
            mean_line,
            band,
        });
    }
    log::debug!("sleep grid: {} subject panels", panels.len());

    let (x_bounds, y_bounds) = shared_bounds(&panels);
    Ok(SubjectGridPlot {
        rows: GRID_ROWS,
        cols: GRID_COLS,
        panels,
        x_ticks: X_TICKS.to_vec(),
        x_label: X_LABEL.to_string(),
        y_label: Y_LABEL.to_string(),
        x_bounds,
        y_bounds,
    })
}

/// Shared axes over every panel.
///
/// The x range always spans the fixed ticks, and is padded so the default
/// tick spacing of a 5-label axis lands on them.
fn shared_bounds(panels: &[SubjectPanel]) -> ((f64, f64), (f64, f64)) {
    let mut xs: Vec<f64> = X_TICKS.to_vec();
    let mut ys = Vec::new();
    for p in panels {
        xs.extend(p.points.iter().map(|q| q.0));
        ys.extend(p.points.iter().chain(&p.mean_line).map(|q| q.1));
        if let Some((lo, hi)) = p.band.y_extent() {
            ys.extend([lo, hi]);
        }
    }
    let (x_lo, x_hi) = min_max(&xs).unwrap_or((0.0, 9.0));
    let (y_lo, y_hi) = min_max(&ys).unwrap_or((0.0, 1.0));
    ((x_lo - 0.5, x_hi + 0.5), pad_range(y_lo, y_hi, 0.05))
}

fn points_to_pixels(points: f64) -> f64 {
    points * FIGURE_DPI / 72.0
}

impl SubjectGridPlot {
    /// Full-resolution pixel size (`16 x 7.5` inches at 300 dpi).
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (FIGURE_INCHES.0 * FIGURE_DPI).round() as u32,
            (FIGURE_INCHES.1 * FIGURE_DPI).round() as u32,
        )
    }

    pub fn draw_on<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        config: &PlotConfig,
    ) -> Result<(), PlotError> {
        let palette = Palette::from_config(config)?;
        self.draw_grid(root, &palette, config).map_err(PlotError::render)
    }

    fn draw_grid<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        palette: &Palette,
        config: &PlotConfig,
    ) -> DrawResult<DB> {
        let (w, h) = root.dim_in_pixel();
        let (w, h) = (f64::from(w), f64::from(h));
        let font_px = points_to_pixels(TITLE_POINTS);

        root.fill(&palette.background)?;

        // Figure-level axis labels.
        let label_font = FontDesc::new(FontFamily::SansSerif, font_px, FontStyle::Normal);
        root.draw_text(
            &self.x_label,
            &label_font.color(&palette.foreground),
            ((0.5 * w) as i32, (h * 0.98 - font_px) as i32),
        )?;
        root.draw_text(
            &self.y_label,
            &label_font
                .transform(FontTransform::Rotate270)
                .color(&palette.foreground),
            ((0.03 * w) as i32, (0.5 * h) as i32),
        )?;

        let inner = root.margin(
            ((1.0 - SUBPLOT_TOP) * h) as i32,
            (SUBPLOT_BOTTOM * h) as i32,
            (SUBPLOT_LEFT * w) as i32,
            ((1.0 - SUBPLOT_RIGHT) * w) as i32,
        );
        let areas = inner.split_evenly((self.rows, self.cols));

        let (x0, x1) = self.x_bounds;
        let (y0, y1) = self.y_bounds;
        let tick_font = font_px * 0.7;

        for (i, (area, panel)) in areas.iter().zip(&self.panels).enumerate() {
            let first_col = i % self.cols == 0;
            let last_row = i / self.cols == self.rows - 1;

            let mut chart = ChartBuilder::on(area)
                .caption(
                    panel.title(),
                    FontDesc::new(FontFamily::SansSerif, font_px, FontStyle::Normal),
                )
                .margin(4)
                .x_label_area_size(if last_row { (tick_font * 1.6) as u32 } else { 0 })
                .y_label_area_size(if first_col { (tick_font * 2.8) as u32 } else { 0 })
                .build_cartesian_2d(DayAxis((x0..x1).with_key_points(self.x_ticks.clone())), y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(self.x_ticks.len())
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_labels(5)
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(
                    FontDesc::new(FontFamily::SansSerif, tick_font, FontStyle::Normal)
                        .color(&palette.foreground),
                )
                .axis_style(&palette.foreground)
                .draw()?;

            draw_markers(
                &mut chart,
                &panel.points,
                palette.panel,
                config.panel_point_alpha,
                Some(palette.foreground),
                config,
            )?;
            draw_band(&mut chart, &panel.band, palette.panel, config.band_alpha, config.smooth_band)?;
            chart.draw_series(LineSeries::new(
                panel.mean_line.iter().copied(),
                palette.panel.stroke_width(config.line_width.clamp(1, 2)),
            ))?;
        }

        Ok(())
    }

    pub fn to_svg_string(&self, config: &PlotConfig) -> Result<String, PlotError> {
        render_svg(self.pixel_size(), |root| self.draw_on(root, config))
    }

    pub fn save_svg(&self, path: &Path, config: &PlotConfig) -> Result<(), PlotError> {
        let svg = self.to_svg_string(config)?;
        write_svg(path, &svg)
    }
}

/// Day axis with fixed key points. `WithKeyPoints<RangedCoordf64>` has no
/// `ValueFormatter` impl in plotters 0.3, which `configure_mesh` requires, so
/// this wrapper delegates to it and opts into default formatting.
struct DayAxis(WithKeyPoints<RangedCoordf64>);

impl Ranged for DayAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.0.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        self.0.key_points(hint)
    }

    fn range(&self) -> std::ops::Range<f64> {
        self.0.range()
    }
}
