//! Editor configuration.

use crate::color::RgbF;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Zoom bounds must be finite with 0 < min_scale <= max_scale (got {min}..{max})")]
    ScaleBounds { min: f64, max: f64 },
    #[error("Zoom step must be finite and positive (got {0})")]
    ScaleStep(f64),
}

/// Color and stroke width applied to new annotations of one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolPreset {
    pub color: String,
    pub stroke_width: f64,
}

impl ToolPreset {
    pub fn new(color: &str, stroke_width: f64) -> Self {
        Self {
            color: color.to_string(),
            stroke_width,
        }
    }
}

/// Tunables for the annotation editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Smallest zoom factor.
    pub min_scale: f64,
    /// Largest zoom factor.
    pub max_scale: f64,
    /// Zoom in/out increment.
    pub scale_step: f64,
    pub pencil: ToolPreset,
    pub highlight: ToolPreset,
    pub rectangle: ToolPreset,
    pub eraser: ToolPreset,
    /// Text color for new text marks.
    pub text_color: String,
    /// On-screen font size of new text, in device pixels.
    pub base_font_size: f64,
    /// Fill used for highlights in exported documents.
    pub highlight_export_color: RgbF,
    /// Opacity of exported highlights.
    pub highlight_export_opacity: f32,
    /// Dash pattern of the eraser preview outline, in document units.
    pub eraser_dash: [f64; 2],
    /// Outline color of the eraser preview.
    pub eraser_preview_color: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 3.0,
            scale_step: 0.2,
            pencil: ToolPreset::new("#ff0000", 2.0),
            highlight: ToolPreset::new("rgba(255, 255, 0, 0.4)", 20.0),
            rectangle: ToolPreset::new("#3b82f6", 2.0),
            eraser: ToolPreset::new("#ff0000", 2.0),
            text_color: "#000000".to_string(),
            base_font_size: 16.0,
            highlight_export_color: RgbF::new(1.0, 1.0, 0.4),
            highlight_export_opacity: 0.4,
            eraser_dash: [5.0, 5.0],
            eraser_preview_color: "#ff0000".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config; missing keys keep defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the zoom settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.min_scale, self.max_scale);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(ConfigError::ScaleBounds { min, max });
        }
        if !(self.scale_step.is_finite() && self.scale_step > 0.0) {
            return Err(ConfigError::ScaleStep(self.scale_step));
        }
        Ok(())
    }

    /// Clamp a zoom factor to the configured bounds.
    ///
    /// Never panics; with inverted bounds `max_scale` wins.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.max(self.min_scale).min(self.max_scale)
    }
}
