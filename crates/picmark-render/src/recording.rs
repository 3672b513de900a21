//! Surface that records draw commands instead of rasterizing them.

use crate::renderer::{Shadow, StateStack};
use kurbo::{Affine, Rect, Vec2};
use peniko::Color;
use picmark_core::shapes::SerializableColor;
use picmark_core::surface::Surface;
use serde::Serialize;

/// One recorded draw call. Rects are normalized and given in the local
/// space of `transform`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        rect: Rect,
    },
    StrokeRect {
        rect: Rect,
        transform: Affine,
        color: SerializableColor,
        line_width: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        shadow: Option<Shadow>,
    },
    FillRect {
        rect: Rect,
        transform: Affine,
        color: SerializableColor,
        #[serde(skip_serializing_if = "Option::is_none")]
        shadow: Option<Shadow>,
    },
    Image {
        source: String,
        dest: Rect,
        transform: Affine,
    },
}

/// Records every draw call, for tests and headless replays.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    state: StateStack,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of `save` calls not yet restored.
    pub fn depth(&self) -> usize {
        self.state.depth()
    }
}

impl Surface for RecordingSurface {
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

    fn clear(&mut self, region: Rect) {
        self.commands.push(DrawCommand::Clear { rect: region.abs() });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) {
        self.commands.push(DrawCommand::StrokeRect {
            rect: rect.abs(),
            transform: self.state.transform(),
            color: color.into(),
            line_width,
            shadow: self.state.shadow(),
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            rect: rect.abs(),
            transform: self.state.transform(),
            color: color.into(),
            shadow: self.state.shadow(),
        });
    }

    fn set_shadow(&mut self, blur: f64, color: Color) {
        self.state.set_shadow(blur, color.into());
    }

    fn draw_image(&mut self, source: &str, dest: Rect) {
        self.commands.push(DrawCommand::Image {
            source: source.to_string(),
            dest: dest.abs(),
            transform: self.state.transform(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use picmark_core::shapes::{Annotation, Mark};
    use picmark_core::{Annotator, AnnotatorConfig};

    fn annotator() -> Annotator {
        let mut annotator = Annotator::new(AnnotatorConfig::default(), ()).unwrap();
        annotator.set_viewport(Size::new(200.0, 100.0));
        annotator.set_annotations(&[
            Annotation::new("a", Mark::new(10.0, 10.0, 20.0, 20.0)),
            Annotation::new("b", Mark::new(50.0, 10.0, -20.0, 20.0)),
        ]);
        annotator
    }

    #[test]
    fn test_paint_leaves_stack_balanced() {
        let mut annotator = annotator();
        annotator.set_selected_id(Some("a")).unwrap();
        annotator.set_image("photo.png");
        annotator.image_ready("photo.png", Size::new(400.0, 200.0));
        annotator.set_degrees(30.0);

        let mut surface = RecordingSurface::new();
        annotator.paint(&mut surface);
        assert_eq!(surface.depth(), 0);
        assert!(matches!(surface.commands()[0], DrawCommand::Clear { .. }));
    }

    #[test]
    fn test_flipped_rect_recorded_normalized() {
        let mut annotator = annotator();
        let mut surface = RecordingSurface::new();
        annotator.paint(&mut surface);

        let strokes: Vec<_> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokeRect { rect, shadow, .. } => Some((*rect, *shadow)),
                _ => None,
            })
            .collect();
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[1].0, Rect::new(30.0, 10.0, 50.0, 30.0));
        assert!(strokes[1].1.is_some());
    }

    #[test]
    fn test_unselected_annotations_draw_no_handles() {
        let mut annotator = annotator();
        let mut surface = RecordingSurface::new();
        annotator.paint(&mut surface);
        let fills = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
            .count();
        assert_eq!(fills, 2);
    }

    #[test]
    fn test_image_uses_stage_transform() {
        let mut annotator = annotator();
        annotator.set_image("photo.png");
        annotator.image_ready("photo.png", Size::new(400.0, 200.0));

        let mut surface = RecordingSurface::new();
        annotator.paint(&mut surface);
        // 400x200 into 200x100 fits at scale 0.5.
        let image = surface
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::Image { dest, transform, .. } => Some((*dest, *transform)),
                _ => None,
            })
            .unwrap();
        assert_eq!(image.1, Affine::IDENTITY);
        assert!((image.0.width() - 200.0).abs() < 1e-9);
        assert!((image.0.height() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_commands_serialize_with_op_tag() {
        let mut surface = RecordingSurface::new();
        surface.clear(Rect::new(0.0, 0.0, 10.0, 10.0));
        let json = serde_json::to_value(surface.commands()).unwrap();
        assert_eq!(json[0]["op"], "clear");
    }
}
