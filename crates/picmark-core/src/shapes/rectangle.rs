//! Rectangle annotation shape.

use super::{Annotation, AnnotationStyle, Mark, MarkAdjust, ShapeTrait};
use crate::stage::StageState;
use crate::surface::Surface;
use kurbo::{Point, Size, Vec2};

/// A rectangular annotation mark.
#[derive(Debug, Clone)]
pub struct RectShape {
    annotation: Annotation,
    /// Pointer offset from the mark origin; only set while a drag is active.
    drag_offset: Option<Vec2>,
}

impl RectShape {
    /// Wrap an annotation.
    pub fn new(annotation: Annotation) -> Self {
        Self {
            annotation,
            drag_offset: None,
        }
    }

    pub fn drag_offset(&self) -> Option<Vec2> {
        self.drag_offset
    }
}

impl ShapeTrait for RectShape {
    fn id(&self) -> &str {
        &self.annotation.id
    }

    fn on_drag_start(&mut self, point: Point) {
        self.drag_offset = Some(point - self.annotation.mark.origin());
    }

    fn on_drag(&mut self, point: Point) {
        let Some(offset) = self.drag_offset else {
            log::debug!("drag on {} without drag start", self.annotation.id);
            return;
        };
        let origin = point - offset;
        self.annotation.mark.x = origin.x;
        self.annotation.mark.y = origin.y;
    }

    fn on_drag_end(&mut self) {
        self.drag_offset = None;
    }

    fn check_boundary(&self, point: Point) -> bool {
        self.annotation.mark.contains_strict(point)
    }

    fn paint(
        &self,
        surface: &mut dyn Surface,
        stage: &StageState,
        selected: bool,
        degrees: f64,
        frame: Size,
        style: &AnnotationStyle,
    ) -> Mark {
        let device = stage.to_device_space(&self.annotation.mark);
        let rect = device.as_raw_rect();

        surface.save();
        surface.set_shadow(style.shadow_blur, style.shape_shadow.into());

        if degrees != 0.0 {
            let center = Vec2::new(frame.width / 2.0, frame.height / 2.0);
            surface.translate(center);
            surface.rotate(degrees.to_radians());
            surface.translate(-center);
        }

        surface.stroke_rect(rect, style.shape_stroke.into(), style.line_width);

        let background = if selected {
            style.shape_background
        } else {
            style.init_shape_background
        };
        surface.fill_rect(rect, background.into());

        surface.restore();

        device
    }

    fn adjust_mark(&mut self, adjust: MarkAdjust) {
        self.annotation.mark = self.annotation.mark.adjusted(adjust);
    }

    fn set_comment(&mut self, comment: &str) {
        self.annotation.comment = Some(comment.to_string());
    }

    fn equal(&self, annotation: &Annotation) -> bool {
        let ours = &self.annotation;
        annotation.id == ours.id
            && annotation.comment == ours.comment
            && annotation.mark.x == ours.mark.x
            && annotation.mark.y == ours.mark.y
            && annotation.mark.width == ours.mark.width
            && annotation.mark.height == ours.mark.height
    }

    fn annotation(&self) -> &Annotation {
        &self.annotation
    }
}
