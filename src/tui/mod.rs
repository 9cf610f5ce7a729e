//! Terminal rendering of regression charts.
//!
//! Charts are drawn with Plotters into a Ratatui buffer, so a caller with its
//! own terminal loop can place a [`RegressionChartWidget`] in any layout.

mod chart;

pub use chart::RegressionChartWidget;
