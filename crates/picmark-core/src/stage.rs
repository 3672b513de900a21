//! Stage module for pan/zoom transforms.

use crate::shapes::Mark;
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed scale.
pub const MIN_SCALE: f64 = 0.1;
/// Largest allowed scale.
pub const MAX_SCALE: f64 = 10.0;
/// Default scale change per unit of wheel delta.
pub const DEFAULT_SCROLL_SPEED: f64 = 0.0005;

/// Pan/zoom state mapping image space to device space.
///
/// `device = image * scale + origin`. The scale is kept inside
/// [`MIN_SCALE`, `MAX_SCALE`] by every constructor and mutator, so the
/// inverse mapping never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageState {
    scale: f64,
    origin: Vec2,
}

impl Default for StageState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            origin: Vec2::ZERO,
        }
    }
}

impl StageState {
    /// Create a state, clamping the scale into range.
    pub fn new(scale: f64, origin: Vec2) -> Self {
        Self {
            scale: clamp_scale(scale),
            origin,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Get the affine transform for rendering (image to device).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.origin) * Affine::scale(self.scale)
    }

    /// Get the inverse transform for input handling (device to image).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.origin)
    }

    /// Convert a device point (pointer offset) to image coordinates.
    pub fn to_image_space(&self, device: Point) -> Point {
        Point::new(
            (device.x - self.origin.x) / self.scale,
            (device.y - self.origin.y) / self.scale,
        )
    }

    /// Convert an image point to device coordinates.
    pub fn to_device_point(&self, image: Point) -> Point {
        Point::new(
            image.x * self.scale + self.origin.x,
            image.y * self.scale + self.origin.y,
        )
    }

    /// Convert a mark to its device-space rectangle. The sign of the size
    /// is preserved.
    pub fn to_device_space(&self, mark: &Mark) -> Mark {
        let origin = self.to_device_point(mark.origin());
        Mark::new(
            origin.x,
            origin.y,
            mark.width * self.scale,
            mark.height * self.scale,
        )
    }
}

fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Stage controller: owns the [`StageState`] and the pending-repaint flag.
#[derive(Debug, Clone)]
pub struct Stage {
    state: StageState,
    /// Scale change per unit of wheel delta.
    pub scroll_speed: f64,
    repaint_pending: bool,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_SPEED)
    }
}

impl Stage {
    pub fn new(scroll_speed: f64) -> Self {
        Self {
            state: StageState::default(),
            scroll_speed,
            repaint_pending: false,
        }
    }

    /// Current transform state.
    pub fn state(&self) -> &StageState {
        &self.state
    }

    /// Replace the state (scale is clamped).
    pub fn set_state(&mut self, state: StageState) {
        self.state = StageState::new(state.scale, state.origin);
        self.request_repaint();
    }

    /// Zoom around the pointer. Returns `true` if the state changed.
    ///
    /// The new scale and both origin components are computed before the
    /// repaint is requested, so a repaint never sees a half-updated state.
    pub fn on_wheel(&mut self, pointer: Point, delta_y: f64) -> bool {
        if !delta_y.is_finite() {
            log::debug!("ignoring non-finite wheel delta {delta_y}");
            return false;
        }
        let old = self.state;
        let new_scale = clamp_scale(old.scale + delta_y * self.scroll_speed);
        if (new_scale - old.scale).abs() < f64::EPSILON {
            return false;
        }

        let origin = Vec2::new(
            pointer.x - ((pointer.x - old.origin.x) / old.scale) * new_scale,
            pointer.y - ((pointer.y - old.origin.y) / old.scale) * new_scale,
        );
        let next = StageState {
            scale: new_scale,
            origin,
        };

        log::debug!(
            "zoom {:.3} -> {:.3} around ({:.1}, {:.1})",
            old.scale,
            new_scale,
            pointer.x,
            pointer.y
        );
        self.state = next;
        self.request_repaint();
        true
    }

    /// Fit an image of natural size `image` into `viewport`, centering it
    /// along the axis with slack. Returns `false`, leaving the state as it
    /// was, when either size has no area.
    pub fn fit_image(&mut self, image: Size, viewport: Size) -> bool {
        let image_ratio = image.height / image.width;
        let viewport_ratio = viewport.height / viewport.width;
        if !image_ratio.is_finite() || !viewport_ratio.is_finite() || viewport.is_zero_area() {
            log::debug!("skipping fit for degenerate size {image:?} in {viewport:?}");
            return false;
        }

        self.state = if image_ratio < viewport_ratio {
            let scale = clamp_scale(viewport.width / image.width);
            StageState {
                scale,
                origin: Vec2::new(0.0, (viewport.height - scale * image.height) / 2.0),
            }
        } else {
            let scale = clamp_scale(viewport.height / image.height);
            StageState {
                scale,
                origin: Vec2::new((viewport.width - scale * image.width) / 2.0, 0.0),
            }
        };
        self.request_repaint();
        true
    }

    /// Reset to scale 1 at the origin.
    pub fn reset(&mut self) {
        self.state = StageState::default();
        self.request_repaint();
    }

    /// Ask for a repaint on the next frame.
    pub fn request_repaint(&mut self) {
        self.repaint_pending = true;
    }

    pub fn repaint_pending(&self) -> bool {
        self.repaint_pending
    }

    /// Consume the pending repaint request.
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.repaint_pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_default_stage() {
        let stage = Stage::default();
        assert!((stage.state().scale() - 1.0).abs() < f64::EPSILON);
        assert_eq!(stage.state().origin(), Vec2::ZERO);
        assert!(!stage.repaint_pending());
    }

    #[test]
    fn test_to_image_space_with_origin_and_scale() {
        let state = StageState::new(2.0, Vec2::new(50.0, 100.0));
        let image = state.to_image_space(Point::new(150.0, 300.0));
        assert!((image.x - 50.0).abs() < EPS);
        assert!((image.y - 100.0).abs() < EPS);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let states = [
            StageState::new(1.5, Vec2::new(30.0, -20.0)),
            StageState::new(0.1, Vec2::new(-1000.0, 7.5)),
            StageState::new(10.0, Vec2::new(0.25, 999.0)),
        ];
        let marks = [
            Mark::new(123.0, 456.0, 40.0, 25.0),
            Mark::new(-3.5, 0.0, 0.5, 1200.0),
            Mark::new(0.0, 0.0, -8.0, 3.0),
        ];
        for state in states {
            for mark in marks {
                let device = state.to_device_space(&mark);
                assert!((device.width - mark.width * state.scale()).abs() < 1e-6);
                assert!((device.height - mark.height * state.scale()).abs() < 1e-6);

                let corner = state.to_image_space(device.origin());
                assert!((corner.x - mark.x).abs() < EPS);
                assert!((corner.y - mark.y).abs() < EPS);
                let far = state.to_image_space(Point::new(
                    device.x + device.width,
                    device.y + device.height,
                ));
                assert!((far.x - (mark.x + mark.width)).abs() < 1e-6);
                assert!((far.y - (mark.y + mark.height)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_affine_matches_point_mapping() {
        let state = StageState::new(3.0, Vec2::new(12.0, -4.0));
        let p = Point::new(7.0, 9.0);
        let a = state.transform() * p;
        let b = state.to_device_point(p);
        assert!((a - b).hypot() < EPS);
        let back = state.inverse_transform() * a;
        assert!((back - p).hypot() < EPS);
    }

    #[test]
    fn test_device_space_preserves_negative_size() {
        let state = StageState::new(2.0, Vec2::new(1.0, 1.0));
        let device = state.to_device_space(&Mark::new(10.0, 10.0, -5.0, -4.0));
        assert_eq!(device, Mark::new(21.0, 21.0, -10.0, -8.0));
    }

    #[test]
    fn test_wheel_clamps_scale() {
        let mut stage = Stage::default();
        stage.on_wheel(Point::new(10.0, 10.0), 1.0e9);
        assert_eq!(stage.state().scale(), MAX_SCALE);

        stage.on_wheel(Point::new(10.0, 10.0), -1.0e9);
        assert_eq!(stage.state().scale(), MIN_SCALE);
    }

    #[test]
    fn test_wheel_at_bound_is_noop() {
        let mut stage = Stage::default();
        stage.set_state(StageState::new(MAX_SCALE, Vec2::new(3.0, 4.0)));
        stage.take_repaint();
        assert!(!stage.on_wheel(Point::new(50.0, 50.0), 100.0));
        assert!(!stage.repaint_pending());
    }

    #[test]
    fn test_wheel_ignores_non_finite_delta() {
        let mut stage = Stage::default();
        let before = StageState::new(2.5, Vec2::new(-10.0, 6.0));
        stage.set_state(before);
        stage.take_repaint();
        for delta in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(!stage.on_wheel(Point::new(40.0, 40.0), delta));
        }
        assert_eq!(*stage.state(), before);
        assert!(!stage.repaint_pending());
    }

    #[test]
    fn test_zoom_keeps_point_under_cursor() {
        let mut stage = Stage::default();
        stage.set_state(StageState::new(1.3, Vec2::new(-40.0, 25.0)));
        let pointer = Point::new(321.0, 123.0);

        for delta in [120.0, -300.0, 4000.0, -1.0e6] {
            let before = stage.state().to_image_space(pointer);
            stage.on_wheel(pointer, delta);
            let after = stage.state().to_image_space(pointer);
            assert!((before.x - after.x).abs() < 1e-6);
            assert!((before.y - after.y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_wheel_requests_single_repaint() {
        let mut stage = Stage::default();
        stage.on_wheel(Point::ZERO, 100.0);
        stage.on_wheel(Point::ZERO, 100.0);
        assert!(stage.take_repaint());
        assert!(!stage.take_repaint());
    }

    #[test]
    fn test_fit_wide_image_centres_vertically() {
        let mut stage = Stage::default();
        stage.fit_image(Size::new(400.0, 100.0), Size::new(200.0, 200.0));
        let state = stage.state();
        assert!((state.scale() - 0.5).abs() < EPS);
        assert!((state.origin().x - 0.0).abs() < EPS);
        assert!((state.origin().y - 75.0).abs() < EPS);
    }

    #[test]
    fn test_fit_tall_image_centres_horizontally() {
        let mut stage = Stage::default();
        stage.fit_image(Size::new(100.0, 400.0), Size::new(200.0, 200.0));
        let state = stage.state();
        assert!((state.scale() - 0.5).abs() < EPS);
        assert!((state.origin().x - 75.0).abs() < EPS);
        assert!((state.origin().y - 0.0).abs() < EPS);
    }

    #[test]
    fn test_fit_ignores_empty_image() {
        let mut stage = Stage::default();
        assert!(!stage.fit_image(Size::ZERO, Size::new(200.0, 200.0)));
        assert_eq!(*stage.state(), StageState::default());
    }

    #[test]
    fn test_fit_waits_for_viewport_area() {
        let mut stage = Stage::default();
        assert!(!stage.fit_image(Size::new(800.0, 300.0), Size::ZERO));
        assert!(!stage.fit_image(Size::new(800.0, 300.0), Size::new(400.0, 0.0)));
        assert_eq!(*stage.state(), StageState::default());
        assert!(stage.fit_image(Size::new(800.0, 300.0), Size::new(400.0, 300.0)));
        assert!((stage.state().scale() - 0.5).abs() < EPS);
    }

    #[test]
    fn test_new_clamps_scale() {
        assert_eq!(StageState::new(0.0, Vec2::ZERO).scale(), MIN_SCALE);
        assert_eq!(StageState::new(50.0, Vec2::ZERO).scale(), MAX_SCALE);
    }
}
