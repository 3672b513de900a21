//! The annotator widget: stage, shapes and interaction behind one API.

use crate::collection::ShapeCollection;
use crate::config::AnnotatorConfig;
use crate::error::{AnnotatorError, AnnotatorResult};
use crate::interaction::{Effect, InteractionState, PointerEvent, transition};
use crate::reconcile::{ReconcileReport, reconcile};
use crate::shapes::{Annotation, ShapeTrait};
use crate::stage::Stage;
use crate::surface::Surface;
use kurbo::{Point, Rect, Size, Vec2};

/// Callbacks from the annotator to its host.
///
/// Every method has an empty default, so hosts implement only what they
/// need.
pub trait AnnotatorListener {
    /// Fired after every geometry or comment change with the full list, in
    /// collection order.
    fn on_change(&mut self, _annotations: &[Annotation]) {}

    /// Fired when the user changes the selection.
    fn on_select(&mut self, _id: Option<&str>) {}

    /// Fired once for each newly drawn annotation that was kept.
    fn on_finish(&mut self, _annotation: &Annotation) {}
}

impl AnnotatorListener for () {}

/// Where the host should place the comment input for the selected
/// annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentOverlay {
    pub annotation_id: String,
    /// Top-left corner of the input, in device pixels.
    pub position: Point,
    pub comment: String,
}

/// Result of a paint pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaintOutcome {
    pub overlay: Option<CommentOverlay>,
    pub shapes_painted: usize,
    pub image_drawn: bool,
}

#[derive(Debug, Clone, Default)]
struct ImageState {
    source: Option<String>,
    /// Natural size, known once the host reports the image as loaded.
    natural_size: Option<Size>,
    /// Loaded while the viewport was empty; fit once it has a size.
    pending_fit: bool,
}

/// Interactive image annotator.
pub struct Annotator<L: AnnotatorListener = ()> {
    config: AnnotatorConfig,
    stage: Stage,
    shapes: ShapeCollection,
    interaction: InteractionState,
    viewport: Size,
    image: ImageState,
    degrees: f64,
    overlay: Option<CommentOverlay>,
    listener: L,
}

impl<L: AnnotatorListener> Annotator<L> {
    /// Create an annotator. The configuration is validated first.
    pub fn new(config: AnnotatorConfig, listener: L) -> AnnotatorResult<Self> {
        config.validate()?;
        Ok(Self {
            stage: Stage::new(config.scroll_speed),
            shapes: ShapeCollection::new(config.style.transformer_size),
            config,
            interaction: InteractionState::Idle,
            viewport: Size::ZERO,
            image: ImageState::default(),
            degrees: 0.0,
            overlay: None,
            listener,
        })
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn shapes(&self) -> &ShapeCollection {
        &self.shapes
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    /// Snapshot of all annotations in collection order.
    pub fn annotations(&self) -> Vec<Annotation> {
        self.shapes.annotations()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.shapes.selected_id()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    /// Natural image size, once loaded.
    pub fn image_size(&self) -> Option<Size> {
        self.image.natural_size
    }

    /// Comment input placement from the last paint.
    pub fn comment_overlay(&self) -> Option<&CommentOverlay> {
        self.overlay.as_ref()
    }

    pub fn needs_repaint(&self) -> bool {
        self.stage.repaint_pending()
    }

    /// Consume the pending repaint request.
    pub fn take_repaint(&mut self) -> bool {
        self.stage.take_repaint()
    }

    // --- pointer input (device coordinates) ---

    pub fn pointer_down(&mut self, device: Point) {
        let point = self.stage.state().to_image_space(device);
        self.dispatch(PointerEvent::Down(point));
    }

    pub fn pointer_move(&mut self, device: Point) {
        let point = self.stage.state().to_image_space(device);
        self.dispatch(PointerEvent::Move(point));
    }

    pub fn pointer_up(&mut self) {
        self.dispatch(PointerEvent::Up);
    }

    pub fn pointer_leave(&mut self) {
        self.dispatch(PointerEvent::Leave);
    }

    /// Zoom around the pointer. Returns `true` if the stage changed.
    pub fn wheel(&mut self, device: Point, delta_y: f64) -> bool {
        self.stage.on_wheel(device, delta_y)
    }

    fn dispatch(&mut self, event: PointerEvent) {
        let options = self.config.create_options(self.stage.state().scale());
        let state = std::mem::take(&mut self.interaction);
        let (next, effects) = transition(state, event, &mut self.shapes, &options);
        self.interaction = next;
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Changed => self.notify_change(),
                Effect::SelectionChanged(id) => {
                    self.listener.on_select(id.as_deref());
                    self.stage.request_repaint();
                }
                Effect::Finished(annotation) => self.listener.on_finish(&annotation),
            }
        }
    }

    fn notify_change(&mut self) {
        let annotations = self.shapes.annotations();
        self.listener.on_change(&annotations);
        self.stage.request_repaint();
    }

    // --- external data ---

    /// Sync the external annotation list, which wins over local state.
    pub fn set_annotations(&mut self, incoming: &[Annotation]) -> ReconcileReport {
        let target_replaced = self.interaction.target().is_some_and(|id| {
            let incoming = incoming.iter().find(|a| a.id == id);
            match (self.shapes.get(id), incoming) {
                (Some(shape), Some(annotation)) => !shape.equal(annotation),
                _ => true,
            }
        });
        if target_replaced {
            log::debug!("external update replaces the shape under the pointer");
            self.cancel_gesture();
        }

        let report = reconcile(&mut self.shapes, incoming);
        if report.selection_cleared {
            self.listener.on_select(None);
        }
        if !report.is_noop() {
            self.notify_change();
        }
        report
    }

    /// Set the selection from the host. This is one-way: the annotator
    /// repaints but does not call `on_select` back. Returns `true` if the
    /// selection changed.
    ///
    /// A gesture on a shape other than the new selection is closed first,
    /// as if the pointer had left.
    pub fn set_selected_id(&mut self, id: Option<&str>) -> AnnotatorResult<bool> {
        if let Some(id) = id {
            if !self.shapes.contains(id) {
                return Err(AnnotatorError::UnknownAnnotation(id.to_string()));
            }
        }
        if self.interaction.target().is_some_and(|target| Some(target) != id) {
            self.cancel_gesture();
        }
        let changed = match id {
            Some(id) => self.shapes.select(id),
            None => self.shapes.clear_selection(),
        };
        if changed {
            self.stage.request_repaint();
        }
        Ok(changed)
    }

    /// Close any open gesture the way a pointer leave does: drag offsets
    /// and engaged handles are released, and an unfinished rectangle is
    /// dropped.
    fn cancel_gesture(&mut self) {
        if self.interaction.is_active() {
            self.dispatch(PointerEvent::Leave);
        }
    }

    /// Delete the selected annotation.
    pub fn delete_selected(&mut self) -> Option<Annotation> {
        let id = self.shapes.selected_id()?.to_string();
        if self.interaction.target() == Some(id.as_str()) {
            self.interaction = InteractionState::Idle;
        }
        let removed = self.shapes.remove(&id)?;
        self.overlay = None;
        self.listener.on_select(None);
        self.notify_change();
        Some(removed.annotation().clone())
    }

    /// Set the comment of the selected annotation.
    pub fn set_comment(&mut self, comment: &str) -> AnnotatorResult<()> {
        let id = self
            .shapes
            .selected_id()
            .map(str::to_string)
            .ok_or(AnnotatorError::NothingSelected)?;
        let shape = self
            .shapes
            .get_mut(&id)
            .ok_or_else(|| AnnotatorError::UnknownAnnotation(id.clone()))?;
        shape.set_comment(comment);
        if let Some(overlay) = self.overlay.as_mut().filter(|o| o.annotation_id == id) {
            overlay.comment = comment.to_string();
        }
        self.notify_change();
        Ok(())
    }

    // --- image and viewport ---

    /// Signal that the image source changed. Drawing stops until the host
    /// reports the new image as ready.
    pub fn set_image(&mut self, source: impl Into<String>) {
        let source = source.into();
        if self.image.source.as_deref() == Some(source.as_str()) {
            return;
        }
        self.image = ImageState {
            source: Some(source),
            natural_size: None,
            pending_fit: false,
        };
        self.stage.request_repaint();
    }

    /// Signal that `source` finished loading with the given natural size.
    /// The stage is fitted so the whole image is visible. Before the
    /// viewport has a size, the fit waits for the next `set_viewport`.
    pub fn image_ready(&mut self, source: &str, natural_size: Size) {
        if self.image.source.as_deref() != Some(source) {
            log::debug!("ignoring load of stale image {source}");
            return;
        }
        self.image.natural_size = Some(natural_size);
        self.image.pending_fit = !self.stage.fit_image(natural_size, self.viewport);
        self.stage.request_repaint();
    }

    /// Resize the viewport. The stage is left alone unless an image is
    /// still waiting for its load-time fit.
    pub fn set_viewport(&mut self, size: Size) {
        if self.viewport == size {
            return;
        }
        self.viewport = size;
        if let (true, Some(natural)) = (self.image.pending_fit, self.image.natural_size) {
            self.image.pending_fit = !self.stage.fit_image(natural, size);
        }
        self.stage.request_repaint();
    }

    /// Set the presentation rotation in degrees. Stored geometry is not
    /// rotated.
    pub fn set_degrees(&mut self, degrees: f64) {
        if self.degrees != degrees {
            self.degrees = degrees;
            self.stage.request_repaint();
        }
    }

    // --- painting ---

    /// Paint the image, every shape and the transformer of the selected
    /// shape, and clear the pending repaint.
    pub fn paint(&mut self, surface: &mut dyn Surface) -> PaintOutcome {
        surface.clear(Rect::from_origin_size(Point::ZERO, self.viewport));
        let image_drawn = self.paint_image(surface);

        let stage = *self.stage.state();
        let style = &self.config.style;
        let frame = self.image.natural_size.unwrap_or(Size::ZERO);

        let mut overlay = None;
        let mut shapes_painted = 0;
        for shape in self.shapes.iter() {
            let selected = self.shapes.is_selected(shape.id());
            let device = shape.paint(surface, &stage, selected, self.degrees, frame, style);
            shapes_painted += 1;

            if selected {
                if let Some(transformer) = self.shapes.transformer() {
                    transformer.paint(surface, &stage, shape, style);
                }
                overlay = Some(CommentOverlay {
                    annotation_id: shape.id().to_string(),
                    position: Point::new(
                        device.x,
                        device.y + device.height + self.config.margin_with_input,
                    ),
                    comment: shape.annotation().comment.clone().unwrap_or_default(),
                });
            }
        }

        self.overlay = overlay.clone();
        self.stage.take_repaint();
        PaintOutcome {
            overlay,
            shapes_painted,
            image_drawn,
        }
    }

    fn paint_image(&self, surface: &mut dyn Surface) -> bool {
        let (Some(source), Some(natural)) = (&self.image.source, self.image.natural_size) else {
            return false;
        };
        let stage = self.stage.state();
        let origin = stage.origin();

        if self.degrees != 0.0 {
            let half_image = Vec2::new(natural.width / 2.0, natural.height / 2.0);
            surface.save();
            surface.translate(Vec2::new(self.viewport.width / 2.0, self.viewport.height / 2.0));
            surface.scale(stage.scale());
            surface.rotate(self.degrees.to_radians());
            surface.translate(-(half_image + origin));
            surface.draw_image(source, Rect::from_origin_size(origin.to_point(), natural));
            surface.restore();
        } else {
            let size = Size::new(natural.width * stage.scale(), natural.height * stage.scale());
            surface.draw_image(source, Rect::from_origin_size(origin.to_point(), size));
        }
        true
    }
}
