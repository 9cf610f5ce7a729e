//! Plot configuration: interval probabilities, palette and output size.
//!
//! Defaults reproduce the look of the notebook figures these charts replace:
//! navy semi-transparent observations, a thick charcoal regression line and a
//! grey HDI band.

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, PlotError};
use crate::math::DEFAULT_HDI_PROB;

/// Interval probability used for the pooled band of a grouped regression.
pub const GROUPED_HDI_PROB: f64 = 0.68;

const ENV_WIDTH: &str = "POSTERIOR_PLOTS_WIDTH";
const ENV_HEIGHT: &str = "POSTERIOR_PLOTS_HEIGHT";
const ENV_HDI_PROB: &str = "POSTERIOR_PLOTS_HDI_PROB";

/// How observation markers are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    /// Filled circles (SVG output).
    Circle,
    /// Single pixels; terminal backends scale circle radii badly.
    Pixel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// SVG size in pixels for single-panel charts.
    pub width: u32,
    pub height: u32,

    /// HDI probability for per-observation bands.
    pub hdi_prob: f64,
    /// HDI probability for the pooled band of a grouped regression.
    pub grouped_hdi_prob: f64,

    /// Colours as `#rrggbb`.
    pub background: String,
    pub foreground: String,
    pub point_color: String,
    pub line_color: String,
    pub band_color: String,
    /// Colour of the per-subject panels.
    pub panel_color: String,

    pub point_alpha: f64,
    pub panel_point_alpha: f64,
    pub band_alpha: f64,
    /// Resample and smooth bands before filling them.
    pub smooth_band: bool,
    pub point_radius: u32,
    pub line_width: u32,
    pub marker: MarkerKind,

    /// Chart layout in backend pixels (terminal cells for the widget).
    pub margin: u32,
    pub x_label_area: u32,
    pub y_label_area: u32,
    pub font_size: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            hdi_prob: DEFAULT_HDI_PROB,
            grouped_hdi_prob: GROUPED_HDI_PROB,
            background: "#ffffff".to_string(),
            foreground: "#000000".to_string(),
            point_color: "#0f4c81".to_string(),
            line_color: "#333333".to_string(),
            band_color: "#777777".to_string(),
            panel_color: "#1f77b4".to_string(),
            point_alpha: 0.5,
            panel_point_alpha: 0.7,
            band_alpha: 0.5,
            smooth_band: true,
            point_radius: 4,
            line_width: 3,
            marker: MarkerKind::Circle,
            margin: 10,
            x_label_area: 40,
            y_label_area: 50,
            font_size: 14,
        }
    }
}

impl PlotConfig {
    /// High-contrast palette for terminal rendering.
    pub fn terminal() -> Self {
        Self {
            background: "#000000".to_string(),
            foreground: "#ffffff".to_string(),
            point_color: "#ffffff".to_string(),
            line_color: "#00ffff".to_string(),
            band_color: "#808080".to_string(),
            point_alpha: 1.0,
            band_alpha: 1.0,
            line_width: 1,
            marker: MarkerKind::Pixel,
            // Terminal cells are low-res, so keep label areas compact.
            margin: 1,
            x_label_area: 3,
            y_label_area: 6,
            font_size: 10,
            ..Self::default()
        }
    }

    /// Defaults overridden by the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, PlotError> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        if let Some(width) = env_parse::<u32>(ENV_WIDTH)? {
            config.width = width;
        }
        if let Some(height) = env_parse::<u32>(ENV_HEIGHT)? {
            config.height = height;
        }
        if let Some(prob) = env_parse::<f64>(ENV_HDI_PROB)? {
            config.hdi_prob = prob;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PlotError> {
        if self.width == 0 || self.height == 0 {
            return Err(PlotError::new(ErrorKind::InvalidInput, "Plot size must be non-zero."));
        }
        for (name, prob) in [("hdi_prob", self.hdi_prob), ("grouped_hdi_prob", self.grouped_hdi_prob)] {
            if !(prob > 0.0 && prob <= 1.0) {
                return Err(PlotError::new(
                    ErrorKind::InvalidInput,
                    format!("`{name}` must be in (0, 1], got {prob}."),
                ));
            }
        }
        for color in [
            &self.background,
            &self.foreground,
            &self.point_color,
            &self.line_color,
            &self.band_color,
            &self.panel_color,
        ] {
            parse_hex_color(color)?;
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, PlotError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            PlotError::new(ErrorKind::InvalidInput, format!("Invalid {key}='{raw}': {e}"))
        }),
        Err(_) => Ok(None),
    }
}

/// Parse `#rrggbb` (leading `#` optional).
pub fn parse_hex_color(hex: &str) -> Result<RGBColor, PlotError> {
    let digits = hex.trim().trim_start_matches('#');
    let invalid = || PlotError::new(ErrorKind::InvalidInput, format!("Invalid colour '{hex}', expected #rrggbb."));
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_parses() {
        let config = PlotConfig::default();
        config.validate().unwrap();
        assert_eq!(parse_hex_color(&config.point_color).unwrap(), RGBColor(0x0f, 0x4c, 0x81));
        assert_eq!(config.hdi_prob, 0.94);
        assert_eq!(config.grouped_hdi_prob, 0.68);
        PlotConfig::terminal().validate().unwrap();
    }

    #[test]
    fn rejects_malformed_colours_and_probabilities() {
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("#zz0000").is_err());
        let config = PlotConfig {
            hdi_prob: 1.5,
            ..PlotConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: PlotConfig = serde_json::from_str(r#"{"width": 800, "marker": "pixel"}"#).unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 480);
        assert_eq!(config.marker, MarkerKind::Pixel);
        assert!(config.smooth_band);
    }
}
