//! Annotation data and the shapes that edit it.

mod rectangle;

pub use rectangle::RectShape;

use crate::stage::StageState;
use crate::surface::Surface;
use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for annotations (assigned by the host, or a UUID for
/// annotations created interactively).
pub type AnnotationId = String;

/// Generate an id for a newly drawn annotation.
pub fn new_annotation_id() -> AnnotationId {
    Uuid::new_v4().to_string()
}

/// Rectangle geometry of one annotation, in image space.
///
/// Width and height may be negative while a rectangle is being dragged out
/// towards the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Mark {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Mark {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top-left corner as stored (not normalized).
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The same rectangle with non-negative width and height.
    pub fn normalized(&self) -> Self {
        let x = self.x.min(self.x + self.width);
        let y = self.y.min(self.y + self.height);
        Self::new(x, y, self.width.abs(), self.height.abs())
    }

    /// Get the mark as a normalized kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height).abs()
    }

    /// Get the mark as a kurbo Rect without normalizing, so a flipped mark
    /// keeps x0 > x1 (or y0 > y1).
    pub fn as_raw_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Build a mark spanning two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self::new(
            p1.x.min(p2.x),
            p1.y.min(p2.y),
            (p2.x - p1.x).abs(),
            (p2.y - p1.y).abs(),
        )
    }

    /// Strict containment in both directions: a point exactly on an edge is
    /// outside, and flipped marks are handled without normalizing.
    pub fn contains_strict(&self, point: Point) -> bool {
        let (x0, x1) = (self.x, self.x + self.width);
        let (y0, y1) = (self.y, self.y + self.height);
        let inside_x = (point.x > x0 && point.x < x1) || (point.x < x0 && point.x > x1);
        let inside_y = (point.y > y0 && point.y < y1) || (point.y < y0 && point.y > y1);
        inside_x && inside_y
    }

    /// Merge a partial adjustment over this mark.
    pub fn adjusted(&self, adjust: MarkAdjust) -> Self {
        Self {
            x: adjust.x.unwrap_or(self.x),
            y: adjust.y.unwrap_or(self.y),
            width: adjust.width.unwrap_or(self.width),
            height: adjust.height.unwrap_or(self.height),
        }
    }
}

/// A partial mark update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkAdjust {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl MarkAdjust {
    /// Adjust only the size.
    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// Replace every field.
    pub fn all(mark: Mark) -> Self {
        Self {
            x: Some(mark.x),
            y: Some(mark.y),
            width: Some(mark.width),
            height: Some(mark.height),
        }
    }
}

/// Shape discriminator. Only rectangles are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnnotationKind {
    #[default]
    #[serde(rename = "RECT")]
    Rect,
}

/// One annotation: a mark plus its id and optional comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub mark: Mark,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: AnnotationKind,
}

impl Annotation {
    pub fn new(id: impl Into<AnnotationId>, mark: Mark) -> Self {
        Self {
            id: id.into(),
            mark,
            comment: None,
            kind: AnnotationKind::Rect,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Visual style shared by every annotation and the resize handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationStyle {
    /// Padding around the comment label.
    pub padding: f64,
    /// Border width of annotation rectangles.
    pub line_width: f64,
    /// Blur radius of the rectangle shadow.
    pub shadow_blur: f64,
    pub font_size: f64,
    pub font_color: SerializableColor,
    pub font_background: SerializableColor,
    pub font_family: String,
    /// Fill of the selected annotation.
    pub shape_background: SerializableColor,
    /// Border color.
    pub shape_stroke: SerializableColor,
    pub shape_shadow: SerializableColor,
    /// Fill of the resize handles.
    pub transformer_background: SerializableColor,
    /// Side length of a resize handle, in device pixels.
    pub transformer_size: f64,
    /// Fill of annotations that are not selected.
    pub init_shape_background: SerializableColor,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            padding: 5.0,
            line_width: 2.0,
            shadow_blur: 10.0,
            font_size: 12.0,
            font_color: SerializableColor::opaque(0x21, 0x25, 0x29),
            font_background: SerializableColor::opaque(0xf8, 0xf9, 0xfa),
            font_family: "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, \
                          Oxygen-Sans, Ubuntu, Cantarell, 'Helvetica Neue', Helvetica, \
                          Arial, sans-serif"
                .to_string(),
            shape_background: SerializableColor::new(233, 236, 239, 51),
            shape_stroke: SerializableColor::opaque(0xf8, 0xf9, 0xfa),
            shape_shadow: SerializableColor::new(73, 80, 87, 89),
            transformer_background: SerializableColor::opaque(0x5c, 0x7c, 0xfa),
            transformer_size: 10.0,
            init_shape_background: SerializableColor::new(135, 149, 150, 77),
        }
    }
}

/// Common behavior of annotation shapes.
pub trait ShapeTrait {
    /// Id of the wrapped annotation.
    fn id(&self) -> &str;

    /// Record the offset between the pointer and the mark origin.
    fn on_drag_start(&mut self, point: Point);

    /// Move the mark so the recorded offset is kept under the pointer.
    fn on_drag(&mut self, point: Point);

    /// End the drag and forget the recorded offset.
    fn on_drag_end(&mut self);

    /// Whether the point lies strictly inside the mark.
    fn check_boundary(&self, point: Point) -> bool;

    /// Paint the shape and return its device-space rect.
    ///
    /// `frame` is the size of the region whose centre rotation pivots
    /// around.
    fn paint(
        &self,
        surface: &mut dyn Surface,
        stage: &StageState,
        selected: bool,
        degrees: f64,
        frame: Size,
        style: &AnnotationStyle,
    ) -> Mark;

    /// Merge a partial mark update.
    fn adjust_mark(&mut self, adjust: MarkAdjust);

    fn set_comment(&mut self, comment: &str);

    /// Structural comparison on id, comment and the four mark fields.
    fn equal(&self, annotation: &Annotation) -> bool;

    /// The annotation this shape edits.
    fn annotation(&self) -> &Annotation;
}

/// An annotation shape (enum wrapper for all variants).
#[derive(Debug, Clone)]
pub enum Shape {
    Rect(RectShape),
}

impl Shape {
    /// Build the shape matching an annotation's kind.
    pub fn from_annotation(annotation: Annotation) -> Self {
        match annotation.kind {
            AnnotationKind::Rect => Shape::Rect(RectShape::new(annotation)),
        }
    }

    pub fn mark(&self) -> Mark {
        self.annotation().mark
    }

    /// Rewrite the mark with non-negative size.
    pub fn normalize(&mut self) {
        let normalized = self.mark().normalized();
        self.adjust_mark(MarkAdjust::all(normalized));
    }

    /// Offset recorded by the last drag start, if a drag is active.
    pub fn drag_offset(&self) -> Option<Vec2> {
        match self {
            Shape::Rect(r) => r.drag_offset(),
        }
    }
}

impl ShapeTrait for Shape {
    fn id(&self) -> &str {
        match self {
            Shape::Rect(r) => r.id(),
        }
    }

    fn on_drag_start(&mut self, point: Point) {
        match self {
            Shape::Rect(r) => r.on_drag_start(point),
        }
    }

    fn on_drag(&mut self, point: Point) {
        match self {
            Shape::Rect(r) => r.on_drag(point),
        }
    }

    fn on_drag_end(&mut self) {
        match self {
            Shape::Rect(r) => r.on_drag_end(),
        }
    }

    fn check_boundary(&self, point: Point) -> bool {
        match self {
            Shape::Rect(r) => r.check_boundary(point),
        }
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
        match self {
            Shape::Rect(r) => r.paint(surface, stage, selected, degrees, frame, style),
        }
    }

    fn adjust_mark(&mut self, adjust: MarkAdjust) {
        match self {
            Shape::Rect(r) => r.adjust_mark(adjust),
        }
    }

    fn set_comment(&mut self, comment: &str) {
        match self {
            Shape::Rect(r) => r.set_comment(comment),
        }
    }

    fn equal(&self, annotation: &Annotation) -> bool {
        match self {
            Shape::Rect(r) => r.equal(annotation),
        }
    }

    fn annotation(&self) -> &Annotation {
        match self {
            Shape::Rect(r) => r.annotation(),
        }
    }
}
