//! Pointer interaction state machine.
//!
//! Pointer events arrive in image space. Each event is folded into the
//! current [`InteractionState`] by [`transition`], which mutates the shape
//! collection and reports what happened as a list of [`Effect`]s. The owner
//! turns effects into listener callbacks and repaints.

use crate::collection::ShapeCollection;
use crate::shapes::{Annotation, AnnotationId, Mark, MarkAdjust, Shape, ShapeTrait, new_annotation_id};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Pointer event in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    Leave,
}

/// What the owner must do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Geometry changed; the full annotation list should be re-emitted.
    Changed,
    /// The selection changed to this id (or to nothing).
    SelectionChanged(Option<AnnotationId>),
    /// A new annotation was created and kept.
    Finished(Annotation),
}

/// Current interaction mode.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    /// No button held.
    #[default]
    Idle,
    /// A new rectangle is being dragged out from `anchor`.
    Creating { id: AnnotationId, anchor: Point },
    /// Pressed on a shape but not moved yet: either a click-select or the
    /// start of a drag.
    AwaitingRelease { id: AnnotationId },
    /// An existing shape is being moved.
    Dragging { id: AnnotationId },
    /// A handle of the selected shape's transformer is being dragged.
    Resizing { id: AnnotationId },
}

impl InteractionState {
    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self, InteractionState::Idle)
    }

    /// Id of the shape the current gesture operates on.
    pub fn target(&self) -> Option<&str> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Creating { id, .. }
            | InteractionState::AwaitingRelease { id }
            | InteractionState::Dragging { id }
            | InteractionState::Resizing { id } => Some(id),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Creating { .. } => "creating",
            InteractionState::AwaitingRelease { .. } => "awaiting-release",
            InteractionState::Dragging { .. } => "dragging",
            InteractionState::Resizing { .. } => "resizing",
        }
    }
}

/// Parameters for drawing new annotations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreateOptions {
    /// Rectangles with |width| or |height| below this are dropped on release.
    pub min_size: f64,
    /// If set, a click that produces an undersized rectangle creates one of
    /// this size at the click position instead of dropping it.
    pub default_size: Option<Size>,
    /// Current stage scale, for sizing transformer handles in image space.
    pub scale: f64,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            min_size: 1.0,
            default_size: None,
            scale: 1.0,
        }
    }
}

/// Apply one pointer event to the state machine.
pub fn transition(
    state: InteractionState,
    event: PointerEvent,
    shapes: &mut ShapeCollection,
    options: &CreateOptions,
) -> (InteractionState, Vec<Effect>) {
    let mut effects = Vec::new();
    let from = state.name();
    let next = match event {
        PointerEvent::Down(point) => {
            // A press with a gesture still open (e.g. a lost release) closes
            // that gesture first.
            if state.is_active() {
                end_gesture(state, shapes, options, false, &mut effects);
            }
            pointer_down(point, shapes, options, &mut effects)
        }
        PointerEvent::Move(point) => pointer_move(state, point, shapes, &mut effects),
        PointerEvent::Up => end_gesture(state, shapes, options, true, &mut effects),
        PointerEvent::Leave => end_gesture(state, shapes, options, false, &mut effects),
    };
    if from != next.name() {
        log::debug!("interaction {} -> {}", from, next.name());
    }
    (next, effects)
}

fn pointer_down(
    point: Point,
    shapes: &mut ShapeCollection,
    options: &CreateOptions,
    effects: &mut Vec<Effect>,
) -> InteractionState {
    // Handles of the current selection win over everything else.
    if let Some((transformer, shape)) = shapes.transformer_and_selected_mut() {
        let mark = shape.mark();
        if transformer.on_drag_start(point, &mark, options.scale) {
            return InteractionState::Resizing {
                id: shape.id().to_string(),
            };
        }
    }

    if let Some(id) = shapes.hit_test(point) {
        if shapes.select(&id) {
            effects.push(Effect::SelectionChanged(Some(id.clone())));
        }
        if let Some(shape) = shapes.get_mut(&id) {
            shape.on_drag_start(point);
        }
        return InteractionState::AwaitingRelease { id };
    }

    let id = new_annotation_id();
    let mark = Mark::new(point.x, point.y, 0.0, 0.0);
    shapes.push(Shape::from_annotation(Annotation::new(id.clone(), mark)));
    shapes.select(&id);
    effects.push(Effect::SelectionChanged(Some(id.clone())));
    effects.push(Effect::Changed);
    InteractionState::Creating { id, anchor: point }
}

fn pointer_move(
    state: InteractionState,
    point: Point,
    shapes: &mut ShapeCollection,
    effects: &mut Vec<Effect>,
) -> InteractionState {
    match state {
        InteractionState::Idle => InteractionState::Idle,
        InteractionState::AwaitingRelease { id } | InteractionState::Dragging { id } => {
            if let Some(shape) = shapes.get_mut(&id) {
                shape.on_drag(point);
                effects.push(Effect::Changed);
            }
            InteractionState::Dragging { id }
        }
        InteractionState::Resizing { id } => {
            if let Some((transformer, shape)) = shapes.transformer_and_selected_mut() {
                if transformer.on_drag(point, shape) {
                    effects.push(Effect::Changed);
                }
            }
            InteractionState::Resizing { id }
        }
        InteractionState::Creating { id, anchor } => {
            if let Some(shape) = shapes.get_mut(&id) {
                shape.adjust_mark(MarkAdjust::size(point.x - anchor.x, point.y - anchor.y));
                effects.push(Effect::Changed);
            }
            InteractionState::Creating { id, anchor }
        }
    }
}

/// Close the current gesture. `release` is `true` for a pointer-up and
/// `false` for a leave (or an implicit close), which never finishes a
/// creation.
fn end_gesture(
    state: InteractionState,
    shapes: &mut ShapeCollection,
    options: &CreateOptions,
    release: bool,
    effects: &mut Vec<Effect>,
) -> InteractionState {
    match state {
        InteractionState::Idle => {}
        InteractionState::AwaitingRelease { id } | InteractionState::Dragging { id } => {
            if let Some(shape) = shapes.get_mut(&id) {
                shape.on_drag_end();
            }
        }
        InteractionState::Resizing { .. } => {
            if let Some((transformer, _)) = shapes.transformer_and_selected_mut() {
                transformer.on_drag_end();
            }
        }
        InteractionState::Creating { id, anchor } => {
            finish_creation(&id, anchor, shapes, options, release, effects);
        }
    }
    InteractionState::Idle
}

fn finish_creation(
    id: &str,
    anchor: Point,
    shapes: &mut ShapeCollection,
    options: &CreateOptions,
    release: bool,
    effects: &mut Vec<Effect>,
) {
    let Some(shape) = shapes.get_mut(id) else {
        return;
    };

    let mark = shape.mark();
    let undersized = mark.width.abs() < options.min_size || mark.height.abs() < options.min_size;

    let keep = match (release, undersized, options.default_size) {
        (false, _, _) => false,
        (true, false, _) => {
            shape.normalize();
            true
        }
        (true, true, Some(size)) => {
            shape.adjust_mark(MarkAdjust::all(Mark::new(
                anchor.x,
                anchor.y,
                size.width,
                size.height,
            )));
            true
        }
        (true, true, None) => false,
    };

    if keep {
        let annotation = shape.annotation().clone();
        effects.push(Effect::Changed);
        effects.push(Effect::Finished(annotation));
        return;
    }

    log::debug!("discarding new annotation {id} ({mark:?})");
    shapes.remove(id);
    effects.push(Effect::SelectionChanged(None));
    effects.push(Effect::Changed);
}
