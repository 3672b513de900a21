//! Resize handles for the selected annotation.

use crate::shapes::{AnnotationId, AnnotationStyle, Mark, MarkAdjust, Shape, ShapeTrait};
use crate::stage::StageState;
use crate::surface::Surface;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Type of resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Corner(Corner),
    Edge(Edge),
}

impl HandleKind {
    /// All handles, corners first. Hit-testing follows this order.
    pub const ALL: [HandleKind; 8] = [
        HandleKind::Corner(Corner::TopLeft),
        HandleKind::Corner(Corner::TopRight),
        HandleKind::Corner(Corner::BottomLeft),
        HandleKind::Corner(Corner::BottomRight),
        HandleKind::Edge(Edge::Top),
        HandleKind::Edge(Edge::Right),
        HandleKind::Edge(Edge::Bottom),
        HandleKind::Edge(Edge::Left),
    ];

    /// Which sides of the rectangle this handle moves, as
    /// `(left, top, right, bottom)`.
    fn moved_sides(self) -> (bool, bool, bool, bool) {
        match self {
            HandleKind::Corner(Corner::TopLeft) => (true, true, false, false),
            HandleKind::Corner(Corner::TopRight) => (false, true, true, false),
            HandleKind::Corner(Corner::BottomLeft) => (true, false, false, true),
            HandleKind::Corner(Corner::BottomRight) => (false, false, true, true),
            HandleKind::Edge(Edge::Top) => (false, true, false, false),
            HandleKind::Edge(Edge::Right) => (false, false, true, false),
            HandleKind::Edge(Edge::Bottom) => (false, false, false, true),
            HandleKind::Edge(Edge::Left) => (true, false, false, false),
        }
    }

    /// Position of this handle on a normalized rect.
    fn position(self, bounds: Rect) -> Point {
        let center = bounds.center();
        match self {
            HandleKind::Corner(Corner::TopLeft) => Point::new(bounds.x0, bounds.y0),
            HandleKind::Corner(Corner::TopRight) => Point::new(bounds.x1, bounds.y0),
            HandleKind::Corner(Corner::BottomLeft) => Point::new(bounds.x0, bounds.y1),
            HandleKind::Corner(Corner::BottomRight) => Point::new(bounds.x1, bounds.y1),
            HandleKind::Edge(Edge::Top) => Point::new(center.x, bounds.y0),
            HandleKind::Edge(Edge::Right) => Point::new(bounds.x1, center.y),
            HandleKind::Edge(Edge::Bottom) => Point::new(center.x, bounds.y1),
            HandleKind::Edge(Edge::Left) => Point::new(bounds.x0, center.y),
        }
    }
}

/// A resize handle with its centre in image coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in image coordinates) lies within the square of
    /// side `side` centred on this handle. Edges count as hits.
    pub fn hit_test(&self, point: Point, side: f64) -> bool {
        let half = side / 2.0;
        (point.x - self.position.x).abs() <= half && (point.y - self.position.y).abs() <= half
    }
}

/// An in-progress handle drag.
#[derive(Debug, Clone, Copy)]
struct ResizeGesture {
    handle: HandleKind,
    /// Normalized mark at drag start; the sides not moved by `handle` stay
    /// anchored here.
    frame: Rect,
}

/// Resize-handle overlay bound to one selected shape.
///
/// A transformer is tied to a single shape id; selecting a different shape
/// builds a fresh one.
#[derive(Debug, Clone)]
pub struct Transformer {
    shape_id: AnnotationId,
    /// Handle side length in device pixels.
    handle_size: f64,
    gesture: Option<ResizeGesture>,
}

impl Transformer {
    pub fn new(shape_id: impl Into<AnnotationId>, handle_size: f64) -> Self {
        Self {
            shape_id: shape_id.into(),
            handle_size,
            gesture: None,
        }
    }

    pub fn shape_id(&self) -> &str {
        &self.shape_id
    }

    pub fn handle_size(&self) -> f64 {
        self.handle_size
    }

    /// Handle currently being dragged, if any.
    pub fn engaged(&self) -> Option<HandleKind> {
        self.gesture.map(|g| g.handle)
    }

    /// Handles for a mark, corners first.
    pub fn handles(&self, mark: &Mark) -> [Handle; 8] {
        let bounds = mark.as_rect();
        HandleKind::ALL.map(|kind| Handle::new(kind.position(bounds), kind))
    }

    /// Find which handle (if any) is under an image-space point. Handles keep
    /// a constant device size, so their image-space side shrinks as `scale`
    /// grows.
    pub fn check_boundary(&self, point: Point, mark: &Mark, scale: f64) -> Option<HandleKind> {
        let side = self.handle_size / scale;
        self.handles(mark)
            .into_iter()
            .find(|handle| handle.hit_test(point, side))
            .map(|handle| handle.kind)
    }

    /// Engage the handle under `point`. Returns `false` if none was hit.
    pub fn on_drag_start(&mut self, point: Point, mark: &Mark, scale: f64) -> bool {
        match self.check_boundary(point, mark, scale) {
            Some(handle) => {
                self.gesture = Some(ResizeGesture {
                    handle,
                    frame: mark.as_rect(),
                });
                true
            }
            None => false,
        }
    }

    /// Resize `shape` so the engaged handle follows `point`.
    ///
    /// The sides the handle does not move stay where they were at drag start.
    /// Dragging past the anchor flips the rectangle, which is re-normalized so
    /// width and height stay non-negative. Returns `false` when no handle is
    /// engaged.
    pub fn on_drag(&self, point: Point, shape: &mut Shape) -> bool {
        let Some(gesture) = self.gesture else {
            return false;
        };
        let (left, top, right, bottom) = gesture.handle.moved_sides();
        let frame = gesture.frame;

        let x0 = if left { point.x } else { frame.x0 };
        let y0 = if top { point.y } else { frame.y0 };
        let x1 = if right { point.x } else { frame.x1 };
        let y1 = if bottom { point.y } else { frame.y1 };

        let mark = Mark::from_corners(Point::new(x0, y0), Point::new(x1, y1));
        shape.adjust_mark(MarkAdjust::all(mark));
        true
    }

    /// Release the engaged handle.
    pub fn on_drag_end(&mut self) {
        self.gesture = None;
    }

    /// Paint the handles at a constant device size.
    pub fn paint(
        &self,
        surface: &mut dyn Surface,
        stage: &StageState,
        shape: &Shape,
        style: &AnnotationStyle,
    ) {
        let half = self.handle_size / 2.0;
        surface.save();
        for handle in self.handles(&shape.mark()) {
            let center = stage.to_device_point(handle.position);
            let rect = Rect::new(
                center.x - half,
                center.y - half,
                center.x + half,
                center.y + half,
            );
            surface.fill_rect(rect, style.transformer_background.into());
        }
        surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Annotation;

    fn shape(x: f64, y: f64, w: f64, h: f64) -> Shape {
        Shape::from_annotation(Annotation::new("a", Mark::new(x, y, w, h)))
    }

    #[test]
    fn test_handle_positions() {
        let t = Transformer::new("a", 10.0);
        let handles = t.handles(&Mark::new(10.0, 20.0, 100.0, 50.0));
        let find = |kind| handles.iter().find(|h| h.kind == kind).unwrap().position;
        assert_eq!(find(HandleKind::Corner(Corner::TopLeft)), Point::new(10.0, 20.0));
        assert_eq!(find(HandleKind::Corner(Corner::BottomRight)), Point::new(110.0, 70.0));
        assert_eq!(find(HandleKind::Edge(Edge::Top)), Point::new(60.0, 20.0));
        assert_eq!(find(HandleKind::Edge(Edge::Left)), Point::new(10.0, 45.0));
    }

    #[test]
    fn test_handles_of_flipped_mark_are_normalized() {
        let t = Transformer::new("a", 10.0);
        let handles = t.handles(&Mark::new(110.0, 70.0, -100.0, -50.0));
        assert_eq!(handles[0].kind, HandleKind::Corner(Corner::TopLeft));
        assert_eq!(handles[0].position, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_hit_test_scales_with_zoom() {
        let t = Transformer::new("a", 10.0);
        let mark = Mark::new(0.0, 0.0, 100.0, 100.0);
        // Side 10 at scale 1: 4 units away is a hit.
        assert_eq!(
            t.check_boundary(Point::new(104.0, 104.0), &mark, 1.0),
            Some(HandleKind::Corner(Corner::BottomRight))
        );
        // Side 2.5 at scale 4: the same point misses.
        assert_eq!(t.check_boundary(Point::new(104.0, 104.0), &mark, 4.0), None);
        assert_eq!(t.check_boundary(Point::new(50.0, 50.0), &mark, 1.0), None);
    }

    #[test]
    fn test_top_left_resize_keeps_bottom_right() {
        let mut t = Transformer::new("a", 10.0);
        let mut s = shape(10.0, 10.0, 50.0, 30.0);
        assert!(t.on_drag_start(Point::new(10.0, 10.0), &s.mark(), 1.0));
        assert_eq!(t.engaged(), Some(HandleKind::Corner(Corner::TopLeft)));

        assert!(t.on_drag(Point::new(0.0, 5.0), &mut s));
        assert_eq!(s.mark(), Mark::new(0.0, 5.0, 60.0, 35.0));
    }

    #[test]
    fn test_edge_resize_moves_one_side() {
        let mut t = Transformer::new("a", 10.0);
        let mut s = shape(10.0, 10.0, 50.0, 30.0);
        assert!(t.on_drag_start(Point::new(60.0, 25.0), &s.mark(), 1.0));
        assert_eq!(t.engaged(), Some(HandleKind::Edge(Edge::Right)));

        t.on_drag(Point::new(80.0, 999.0), &mut s);
        assert_eq!(s.mark(), Mark::new(10.0, 10.0, 70.0, 30.0));
    }

    #[test]
    fn test_drag_past_anchor_flips_and_normalizes() {
        let mut t = Transformer::new("a", 10.0);
        let mut s = shape(10.0, 10.0, 50.0, 30.0);
        t.on_drag_start(Point::new(10.0, 10.0), &s.mark(), 1.0);

        t.on_drag(Point::new(100.0, 60.0), &mut s);
        assert_eq!(s.mark(), Mark::new(60.0, 40.0, 40.0, 20.0));
    }

    #[test]
    fn test_drag_without_engaged_handle() {
        let mut t = Transformer::new("a", 10.0);
        let mut s = shape(10.0, 10.0, 50.0, 30.0);
        assert!(!t.on_drag_start(Point::new(30.0, 25.0), &s.mark(), 1.0));
        assert!(!t.on_drag(Point::new(0.0, 0.0), &mut s));
        assert_eq!(s.mark(), Mark::new(10.0, 10.0, 50.0, 30.0));

        t.on_drag_start(Point::new(10.0, 10.0), &s.mark(), 1.0);
        t.on_drag_end();
        assert_eq!(t.engaged(), None);
    }
}
