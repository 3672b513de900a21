//! Types shared by the surface implementations.

use kurbo::{Affine, Size, Vec2};
use picmark_core::shapes::SerializableColor;
use serde::Serialize;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Image decode failed: {0}")]
    ImageDecode(#[from] image::ImageError),
    #[error("Unknown image: {0}")]
    UnknownImage(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Decode an encoded image (PNG, JPEG or WebP) far enough to learn its
/// natural size.
pub fn decode_image_size(bytes: &[u8]) -> RenderResult<Size> {
    let decoded = image::load_from_memory(bytes)?;
    Ok(Size::new(decoded.width() as f64, decoded.height() as f64))
}

/// Drop shadow applied to strokes and fills.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shadow {
    pub blur: f64,
    pub color: SerializableColor,
}

/// Transform and shadow, saved and restored as a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub transform: Affine,
    pub shadow: Option<Shadow>,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            shadow: None,
        }
    }
}

/// Save/restore stack with canvas-style transform composition: each call
/// composes on the right, so later calls apply to geometry first.
#[derive(Debug, Clone, Default)]
pub struct StateStack {
    current: DrawState,
    saved: Vec<DrawState>,
}

impl StateStack {
    pub fn current(&self) -> &DrawState {
        &self.current
    }

    pub fn transform(&self) -> Affine {
        self.current.transform
    }

    pub fn shadow(&self) -> Option<Shadow> {
        self.current.shadow
    }

    /// Number of unmatched saves.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    pub fn restore(&mut self) {
        match self.saved.pop() {
            Some(state) => self.current = state,
            None => log::warn!("restore without matching save"),
        }
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.current.transform *= Affine::translate(offset);
    }

    pub fn rotate(&mut self, radians: f64) {
        self.current.transform *= Affine::rotate(radians);
    }

    pub fn scale(&mut self, factor: f64) {
        self.current.transform *= Affine::scale(factor);
    }

    /// Set the shadow; a non-positive blur turns it off.
    pub fn set_shadow(&mut self, blur: f64, color: SerializableColor) {
        self.current.shadow = (blur > 0.0).then_some(Shadow { blur, color });
    }

    /// Drop every saved state and return to identity.
    pub fn reset(&mut self) {
        if !self.saved.is_empty() {
            log::warn!("resetting with {} unmatched saves", self.saved.len());
        }
        *self = Self::default();
    }
}
