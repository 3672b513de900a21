//! Ordered shape collection with single selection.

use crate::shapes::{Annotation, Shape, ShapeTrait};
use crate::transformer::Transformer;
use kurbo::Point;

/// All shapes of the widget in external order, plus the selection and the
/// transformer bound to it.
///
/// At most one shape is selected, and the transformer (if any) always
/// belongs to the selected shape.
#[derive(Debug, Clone)]
pub struct ShapeCollection {
    shapes: Vec<Shape>,
    selected: Option<String>,
    transformer: Option<Transformer>,
    /// Handle side length for newly built transformers.
    handle_size: f64,
}

impl ShapeCollection {
    pub fn new(handle_size: f64) -> Self {
        Self {
            shapes: Vec::new(),
            selected: None,
            transformer: None,
            handle_size,
        }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Shapes in collection order (back to front).
    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.shapes.iter().position(|shape| shape.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|shape| shape.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Append a shape on top.
    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Remove a shape, dropping the selection if it pointed at it.
    pub fn remove(&mut self, id: &str) -> Option<Shape> {
        let index = self.position(id)?;
        if self.selected.as_deref() == Some(id) {
            self.clear_selection();
        }
        Some(self.shapes.remove(index))
    }

    /// Replace every shape. The selection survives only if its id is still
    /// present.
    pub(crate) fn replace_all(&mut self, shapes: Vec<Shape>) {
        self.shapes = shapes;
        if let Some(id) = self.selected.clone() {
            if !self.contains(&id) {
                self.clear_selection();
            }
        }
    }

    pub(crate) fn take_shapes(&mut self) -> Vec<Shape> {
        std::mem::take(&mut self.shapes)
    }

    /// Topmost shape strictly containing `point`. Later shapes are drawn on
    /// top, so the search runs back to front.
    pub fn hit_test(&self, point: Point) -> Option<String> {
        self.shapes
            .iter()
            .rev()
            .find(|shape| shape.check_boundary(point))
            .map(|shape| shape.id().to_string())
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// Select a shape. Returns `true` if the selection changed.
    ///
    /// A new transformer is built whenever the selected id differs from the
    /// current transformer's shape.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        let needs_transformer = self
            .transformer
            .as_ref()
            .is_none_or(|t| t.shape_id() != id);
        if needs_transformer {
            self.transformer = Some(Transformer::new(id, self.handle_size));
        }
        if self.selected.as_deref() == Some(id) {
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    /// Clear the selection. Returns `true` if something was selected.
    pub fn clear_selection(&mut self) -> bool {
        self.transformer = None;
        self.selected.take().is_some()
    }

    pub fn transformer(&self) -> Option<&Transformer> {
        self.transformer.as_ref()
    }

    /// Split borrow of the transformer and the selected shape, for resizing.
    pub fn transformer_and_selected_mut(&mut self) -> Option<(&mut Transformer, &mut Shape)> {
        let id = self.selected.as_deref()?;
        let shape = self.shapes.iter_mut().find(|shape| shape.id() == id)?;
        let transformer = self.transformer.as_mut()?;
        Some((transformer, shape))
    }

    /// Snapshot of every annotation in collection order.
    pub fn annotations(&self) -> Vec<Annotation> {
        self.shapes
            .iter()
            .map(|shape| shape.annotation().clone())
            .collect()
    }
}
