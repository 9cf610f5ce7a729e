//! `posterior-plots` library crate.
//!
//! Charts for Bayesian regression fits: observations against the posterior-mean
//! regression line with an HDI band, and a per-subject grid for the sleep
//! study. Charts render to SVG or into a Ratatui buffer.
//!
//! - `domain`: observation tables and posterior draws
//! - `summary`: posterior summaries and random-effect coefficient helpers
//! - `plot`: chart builders and renderers

pub mod config;
pub mod domain;
pub mod error;
pub mod math;
pub mod plot;
pub mod summary;
pub mod tui;

pub use plot::{plot_individual_sleep_data, plot_linear_regression};
pub use summary::{get_coefs, get_intercepts};
