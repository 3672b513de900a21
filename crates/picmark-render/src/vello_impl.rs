//! Vello-based surface implementation.

use crate::renderer::{RenderResult, RendererError, StateStack};
use kurbo::{Affine, Rect, Size, Stroke, Vec2};
use peniko::{Color, Fill};
use picmark_core::surface::Surface;
use std::collections::HashMap;
use std::sync::Arc;
use vello::Scene;

/// Surface that builds a vello [`Scene`] for GPU rasterization.
pub struct VelloSurface {
    /// The Vello scene being built.
    scene: Scene,
    state: StateStack,
    /// Decoded images keyed by source, so frames never re-decode.
    image_cache: HashMap<String, peniko::ImageData>,
}

impl Default for VelloSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloSurface {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            state: StateStack::default(),
            image_cache: HashMap::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take the built scene, leaving an empty one behind.
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// Decode an encoded image and cache it under `source`. Returns the
    /// natural size, which the host passes on to `Annotator::image_ready`.
    pub fn insert_image(&mut self, source: impl Into<String>, bytes: &[u8]) -> RenderResult<Size> {
        let source = source.into();
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        let image_data = peniko::ImageData {
            data: peniko::Blob::new(Arc::new(rgba.into_vec())),
            format: peniko::ImageFormat::Rgba8,
            width,
            height,
            alpha_type: peniko::ImageAlphaType::Alpha,
        };
        log::debug!("cached image {source} ({width}x{height})");
        self.image_cache.insert(source, image_data);
        Ok(Size::new(width as f64, height as f64))
    }

    pub fn has_image(&self, source: &str) -> bool {
        self.image_cache.contains_key(source)
    }

    /// Natural size of a cached image.
    pub fn image_size(&self, source: &str) -> RenderResult<Size> {
        self.image_cache
            .get(source)
            .map(|data| Size::new(data.width as f64, data.height as f64))
            .ok_or_else(|| RendererError::UnknownImage(source.to_string()))
    }

    pub fn remove_image(&mut self, source: &str) -> bool {
        self.image_cache.remove(source).is_some()
    }

    fn draw_shadow(&mut self, rect: Rect) {
        if let Some(shadow) = self.state.shadow() {
            self.scene.draw_blurred_rounded_rect(
                self.state.transform(),
                rect,
                shadow.color.into(),
                0.0,
                shadow.blur / 2.0,
            );
        }
    }
}

impl Surface for VelloSurface {
    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        self.state.restore();
    }

    fn translate(&mut self, offset: Vec2) {
        self.state.translate(offset);
    }

    fn rotate(&mut self, radians: f64) {
        self.state.rotate(radians);
    }

    fn scale(&mut self, factor: f64) {
        self.state.scale(factor);
    }

    /// A vello scene has no partial clear; clearing starts a new frame.
    fn clear(&mut self, _region: Rect) {
        self.scene.reset();
        self.state.reset();
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) {
        let rect = rect.abs();
        self.draw_shadow(rect);
        self.scene.stroke(
            &Stroke::new(line_width),
            self.state.transform(),
            color,
            None,
            &rect,
        );
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let rect = rect.abs();
        self.draw_shadow(rect);
        self.scene
            .fill(Fill::NonZero, self.state.transform(), color, None, &rect);
    }

    fn set_shadow(&mut self, blur: f64, color: Color) {
        self.state.set_shadow(blur, color.into());
    }

    fn draw_image(&mut self, source: &str, dest: Rect) {
        let Some(image_data) = self.image_cache.get(source) else {
            log::debug!("skipping draw of uncached image {source}");
            return;
        };
        let dest = dest.abs();
        let scale_x = dest.width() / image_data.width as f64;
        let scale_y = dest.height() / image_data.height as f64;

        let image_transform = self.state.transform()
            * Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(scale_x, scale_y);

        self.scene.draw_image(&image_data.clone().into(), image_transform);
    }
}
