//! Drawing surface abstraction.

use kurbo::{Rect, Vec2};
use peniko::Color;

/// A 2D drawing surface the annotator paints through.
///
/// The host owns the actual canvas (a vello scene, a command recorder, a
/// browser context). Transform calls compose onto the current transform,
/// and `save`/`restore` push and pop that transform together with any
/// shadow state.
///
/// Rects passed in may have negative width or height; implementations are
/// expected to normalize them.
pub trait Surface {
    /// Push the current transform and shadow state.
    fn save(&mut self);

    /// Pop the last saved transform and shadow state.
    fn restore(&mut self);

    /// Compose a translation onto the current transform.
    fn translate(&mut self, offset: Vec2);

    /// Compose a rotation (in radians) onto the current transform.
    fn rotate(&mut self, radians: f64);

    /// Compose a uniform scale onto the current transform.
    fn scale(&mut self, factor: f64);

    /// Clear a region to transparent.
    fn clear(&mut self, region: Rect);

    /// Stroke the outline of a rectangle.
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64);

    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Set the drop shadow applied to subsequent strokes and fills.
    fn set_shadow(&mut self, _blur: f64, _color: Color) {}

    /// Draw the decoded raster identified by `source` into `dest`.
    fn draw_image(&mut self, source: &str, dest: Rect);
}
