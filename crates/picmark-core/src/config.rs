//! Annotator configuration.

use crate::error::{AnnotatorError, AnnotatorResult};
use crate::interaction::CreateOptions;
use crate::shapes::AnnotationStyle;
use crate::stage::DEFAULT_SCROLL_SPEED;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Annotator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Scale change per unit of wheel delta.
    pub scroll_speed: f64,
    /// Gap between the selected shape and the comment input below it, in
    /// device pixels.
    pub margin_with_input: f64,
    /// New rectangles with |width| or |height| below this (image units) are
    /// dropped on release.
    pub min_annotation_size: f64,
    /// Size `[width, height]` given to a click that would otherwise create an
    /// undersized rectangle.
    pub default_annotation_size: Option<[f64; 2]>,
    pub style: AnnotationStyle,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            scroll_speed: DEFAULT_SCROLL_SPEED,
            margin_with_input: 10.0,
            min_annotation_size: 1.0,
            default_annotation_size: None,
            style: AnnotationStyle::default(),
        }
    }
}

impl AnnotatorConfig {
    /// Parse and validate a JSON configuration. Missing fields take their
    /// defaults.
    pub fn from_json_str(json: &str) -> AnnotatorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AnnotatorResult<()> {
        if !self.scroll_speed.is_finite() || self.scroll_speed < 0.0 {
            return Err(AnnotatorError::InvalidConfig(format!(
                "scroll_speed must be a non-negative number, got {}",
                self.scroll_speed
            )));
        }
        if self.min_annotation_size.is_nan() || self.min_annotation_size < 0.0 {
            return Err(AnnotatorError::InvalidConfig(format!(
                "min_annotation_size must be non-negative, got {}",
                self.min_annotation_size
            )));
        }
        if self.style.transformer_size.is_nan() || self.style.transformer_size <= 0.0 {
            return Err(AnnotatorError::InvalidConfig(format!(
                "style.transformer_size must be positive, got {}",
                self.style.transformer_size
            )));
        }
        if let Some([w, h]) = self.default_annotation_size {
            if w.is_nan() || h.is_nan() || w <= 0.0 || h <= 0.0 {
                return Err(AnnotatorError::InvalidConfig(format!(
                    "default_annotation_size must be positive, got [{w}, {h}]"
                )));
            }
        }
        Ok(())
    }

    /// Creation parameters at the given stage scale.
    pub fn create_options(&self, scale: f64) -> CreateOptions {
        CreateOptions {
            min_size: self.min_annotation_size,
            default_size: self
                .default_annotation_size
                .map(|[w, h]| Size::new(w, h)),
            scale,
        }
    }
}
