//! Plotters-powered regression chart widget for Ratatui.
//!
//! The same `RegressionPlot::draw_chart` used for SVG output draws here through
//! `plotters-ratatui-backend`, so terminal and file output never diverge.

use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::config::PlotConfig;
use crate::plot::RegressionPlot;
use crate::plot::render::Palette;

/// Minimum area (columns, rows) Plotters can lay a chart out in.
const MIN_WIDTH: u16 = 20;
const MIN_HEIGHT: u16 = 8;

/// Render-only view of a [`RegressionPlot`].
///
/// Use [`PlotConfig::terminal`] for a palette and layout suited to terminal
/// cells; circle markers are replaced by single pixels there.
pub struct RegressionChartWidget<'a> {
    pub plot: &'a RegressionPlot,
    pub config: &'a PlotConfig,
}

impl<'a> RegressionChartWidget<'a> {
    pub fn new(plot: &'a RegressionPlot, config: &'a PlotConfig) -> Self {
        Self { plot, config }
    }
}

impl<'a> Widget for RegressionChartWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Label areas alone need most of a tiny rect.
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            let hint = format!("Regression chart needs {MIN_WIDTH}x{MIN_HEIGHT} cells");
            buf.set_string(area.x, area.y, hint, Style::default().fg(Color::Yellow));
            return;
        }

        let palette = match Palette::from_config(self.config) {
            Ok(palette) => palette,
            Err(err) => {
                buf.set_string(area.x, area.y, err.to_string(), Style::default().fg(Color::Red));
                return;
            }
        };

        let plot = self.plot;
        let config = self.config;
        let widget = widget_fn(move |root| {
            plot.draw_chart(&root, &palette, config)?;
            Ok(())
        });

        widget.render(area, buf);
    }
}
