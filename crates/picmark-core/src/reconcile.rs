//! Keyed reconciliation of external annotation data into the shape
//! collection.

use crate::collection::ShapeCollection;
use crate::shapes::{Annotation, AnnotationId, Shape, ShapeTrait};
use std::collections::{HashMap, HashSet};

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Ids present in the incoming data but not in the collection.
    pub added: Vec<AnnotationId>,
    /// Ids dropped from the collection.
    pub removed: Vec<AnnotationId>,
    /// Ids whose geometry or comment differed.
    pub updated: Vec<AnnotationId>,
    /// Number of shapes kept as they were.
    pub unchanged: usize,
    /// Whether surviving shapes changed relative order.
    pub reordered: bool,
    /// Whether the selected id was removed (and the selection cleared).
    pub selection_cleared: bool,
}

impl ReconcileReport {
    /// `true` if the collection already matched the incoming data.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty() && !self.reordered
    }
}

/// Bring `shapes` in line with `incoming`, which is authoritative.
///
/// The collection is rebuilt in incoming order. Shapes whose annotation is
/// unchanged are reused as-is (keeping any transient drag state), changed
/// ones take the incoming annotation, and ids that appear more than once
/// keep only their first occurrence.
pub fn reconcile(shapes: &mut ShapeCollection, incoming: &[Annotation]) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let selected_before = shapes.selected_id().map(str::to_string);

    let old_order: Vec<AnnotationId> = shapes.iter().map(|s| s.id().to_string()).collect();
    let mut existing: HashMap<AnnotationId, Shape> = shapes
        .take_shapes()
        .into_iter()
        .map(|shape| (shape.id().to_string(), shape))
        .collect();

    let mut seen = HashSet::new();
    let mut rebuilt = Vec::with_capacity(incoming.len());
    for annotation in incoming {
        if !seen.insert(annotation.id.clone()) {
            log::warn!("ignoring duplicate annotation id {}", annotation.id);
            continue;
        }
        match existing.remove(&annotation.id) {
            Some(shape) if shape.equal(annotation) => {
                report.unchanged += 1;
                rebuilt.push(shape);
            }
            Some(_) => {
                report.updated.push(annotation.id.clone());
                rebuilt.push(Shape::from_annotation(annotation.clone()));
            }
            None => {
                report.added.push(annotation.id.clone());
                rebuilt.push(Shape::from_annotation(annotation.clone()));
            }
        }
    }

    report.removed = old_order
        .iter()
        .filter(|id| existing.contains_key(*id))
        .cloned()
        .collect();

    let old_ids: HashSet<&str> = old_order.iter().map(String::as_str).collect();
    let survivors_before = old_order
        .iter()
        .map(String::as_str)
        .filter(|id| seen.contains(*id));
    let survivors_after = rebuilt
        .iter()
        .map(|s| s.id())
        .filter(|id| old_ids.contains(id));
    report.reordered = survivors_before.ne(survivors_after);

    shapes.replace_all(rebuilt);
    report.selection_cleared = selected_before.is_some() && shapes.selected_id().is_none();

    if !report.is_noop() {
        log::debug!(
            "reconciled annotations: +{} -{} ~{} ={}",
            report.added.len(),
            report.removed.len(),
            report.updated.len(),
            report.unchanged
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Mark;

    fn ann(id: &str, x: f64) -> Annotation {
        Annotation::new(id, Mark::new(x, 0.0, 10.0, 10.0))
    }

    fn collection(items: &[Annotation]) -> ShapeCollection {
        let mut shapes = ShapeCollection::new(10.0);
        for a in items {
            shapes.push(Shape::from_annotation(a.clone()));
        }
        shapes
    }

    #[test]
    fn test_identical_data_is_noop() {
        let data = vec![ann("a", 0.0), ann("b", 20.0)];
        let mut shapes = collection(&data);
        let report = reconcile(&mut shapes, &data);
        assert!(report.is_noop());
        assert_eq!(report.unchanged, 2);
        assert_eq!(shapes.annotations(), data);
    }

    #[test]
    fn test_add_remove_update() {
        let mut shapes = collection(&[ann("a", 0.0), ann("b", 20.0), ann("c", 40.0)]);
        let incoming = vec![ann("a", 5.0), ann("c", 40.0), ann("d", 60.0)];
        let report = reconcile(&mut shapes, &incoming);

        assert_eq!(report.added, vec!["d"]);
        assert_eq!(report.removed, vec!["b"]);
        assert_eq!(report.updated, vec!["a"]);
        assert_eq!(report.unchanged, 1);
        assert!(!report.reordered);
        assert_eq!(shapes.annotations(), incoming);
    }

    #[test]
    fn test_comment_only_edit_is_update() {
        let mut shapes = collection(&[ann("a", 0.0)]);
        let report = reconcile(&mut shapes, &[ann("a", 0.0).with_comment("cat")]);
        assert_eq!(report.updated, vec!["a"]);
        assert_eq!(
            shapes.get("a").unwrap().annotation().comment.as_deref(),
            Some("cat")
        );
    }

    #[test]
    fn test_reorder_detected() {
        let mut shapes = collection(&[ann("a", 0.0), ann("b", 20.0)]);
        let report = reconcile(&mut shapes, &[ann("b", 20.0), ann("a", 0.0)]);
        assert!(report.reordered);
        assert!(!report.is_noop());
        let ids: Vec<_> = shapes.annotations().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_removing_selected_clears_selection() {
        let mut shapes = collection(&[ann("a", 0.0), ann("b", 20.0)]);
        shapes.select("a");
        let report = reconcile(&mut shapes, &[ann("b", 20.0)]);
        assert!(report.selection_cleared);
        assert_eq!(shapes.selected_id(), None);
    }

    #[test]
    fn test_selection_survives_update() {
        let mut shapes = collection(&[ann("a", 0.0)]);
        shapes.select("a");
        let report = reconcile(&mut shapes, &[ann("a", 3.0)]);
        assert!(!report.selection_cleared);
        assert_eq!(shapes.selected_id(), Some("a"));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let mut shapes = ShapeCollection::new(10.0);
        let report = reconcile(&mut shapes, &[ann("a", 0.0), ann("a", 99.0)]);
        assert_eq!(report.added, vec!["a"]);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes.get("a").unwrap().mark().x, 0.0);
    }
}
