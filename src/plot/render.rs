//! Drawing helpers shared by the chart types.

use std::path::Path;

use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::config::{MarkerKind, PlotConfig, parse_hex_color};
use crate::error::{ErrorKind, PlotError};
use crate::plot::band::{HdiBand, SMOOTH_POINTS, SMOOTH_WINDOW};

/// Chart with an `f64` value axis; the x axis may carry fixed key points.
pub(crate) type Chart<'a, DB, X = RangedCoordf64> = ChartContext<'a, DB, Cartesian2d<X, RangedCoordf64>>;

/// Backend-native drawing result; converted to [`PlotError`] at the public edge.
pub(crate) type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Parsed colours of a [`PlotConfig`].
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: RGBColor,
    pub foreground: RGBColor,
    pub point: RGBColor,
    pub line: RGBColor,
    pub band: RGBColor,
    pub panel: RGBColor,
}

impl Palette {
    pub fn from_config(config: &PlotConfig) -> Result<Self, PlotError> {
        Ok(Self {
            background: parse_hex_color(&config.background)?,
            foreground: parse_hex_color(&config.foreground)?,
            point: parse_hex_color(&config.point_color)?,
            line: parse_hex_color(&config.line_color)?,
            band: parse_hex_color(&config.band_color)?,
            panel: parse_hex_color(&config.panel_color)?,
        })
    }
}

/// Widen `[min, max]` by `frac` of its span on both sides.
///
/// A zero-width range gets a fixed half-unit margin so axes stay drawable.
pub(crate) fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    if span < 1e-12 {
        return (min - 0.5, max + 0.5);
    }
    let pad = span * frac;
    (min - pad, max + pad)
}

/// Fill the region between the band's lower and upper bounds.
///
/// With `smooth`, the outline follows [`HdiBand::smoothed`]; a band that
/// cannot be smoothed is drawn as is.
pub(crate) fn draw_band<DB: DrawingBackend, X: Ranged<ValueType = f64>>(
    chart: &mut Chart<'_, DB, X>,
    band: &HdiBand,
    color: RGBColor,
    alpha: f64,
    smooth: bool,
) -> DrawResult<DB> {
    if band.len() < 2 {
        log::debug!("skipping band with {} positions", band.len());
        return Ok(());
    }
    let outline = if smooth {
        match band.smoothed(SMOOTH_POINTS, SMOOTH_WINDOW) {
            Ok(smoothed) => smoothed.outline(),
            Err(err) => {
                log::warn!("drawing unsmoothed band: {err}");
                band.outline()
            }
        }
    } else {
        band.outline()
    };
    chart.draw_series(std::iter::once(Polygon::new(
        outline,
        color.mix(alpha).filled(),
    )))?;
    Ok(())
}

/// Scatter markers in the configured style, with an optional outline colour.
pub(crate) fn draw_markers<DB: DrawingBackend, X: Ranged<ValueType = f64>>(
    chart: &mut Chart<'_, DB, X>,
    points: &[(f64, f64)],
    color: RGBColor,
    alpha: f64,
    edge: Option<RGBColor>,
    config: &PlotConfig,
) -> DrawResult<DB> {
    match config.marker {
        MarkerKind::Circle => {
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|&p| Circle::new(p, config.point_radius, color.mix(alpha).filled())),
                )?;
            if let Some(edge) = edge {
                chart
                    .draw_series(
                        points
                            .iter()
                            .map(|&p| Circle::new(p, config.point_radius, edge.stroke_width(1))),
                    )?;
            }
        }
        MarkerKind::Pixel => {
            chart.draw_series(points.iter().map(|&p| Pixel::new(p, color)))?;
        }
    }
    Ok(())
}

/// Render into an in-memory SVG document.
pub(crate) fn render_svg<F>(size: (u32, u32), draw: F) -> Result<String, PlotError>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> Result<(), PlotError>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw(&root)?;
        root.present().map_err(PlotError::render)?;
    }
    Ok(svg)
}

pub(crate) fn write_svg(path: &Path, svg: &str) -> Result<(), PlotError> {
    std::fs::write(path, svg).map_err(|e| {
        PlotError::new(
            ErrorKind::Io,
            format!("Failed to write SVG '{}': {e}", path.display()),
        )
    })?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
