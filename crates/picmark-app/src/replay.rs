//! Replays a [`Session`] against an [`Annotator`].

use crate::session::{ImageSpec, Session, SessionEvent};
use anyhow::{Context, Result};
use kurbo::{Point, Size};
use picmark_core::{Annotation, Annotator, AnnotatorListener};
use picmark_render::{DrawCommand, RecordingSurface, decode_image_size};
use serde::Serialize;

/// One listener callback, in firing order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "callback", rename_all = "snake_case")]
pub enum Callback {
    Change { count: usize },
    Select { id: Option<String> },
    Finish { annotation: Annotation },
}

/// Listener that logs every callback.
#[derive(Debug, Default)]
pub struct CallbackLog {
    pub callbacks: Vec<Callback>,
}

impl AnnotatorListener for CallbackLog {
    fn on_change(&mut self, annotations: &[Annotation]) {
        self.callbacks.push(Callback::Change {
            count: annotations.len(),
        });
    }

    fn on_select(&mut self, id: Option<&str>) {
        self.callbacks.push(Callback::Select {
            id: id.map(str::to_string),
        });
    }

    fn on_finish(&mut self, annotation: &Annotation) {
        self.callbacks.push(Callback::Finish {
            annotation: annotation.clone(),
        });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageOutput {
    pub scale: f64,
    pub origin: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayOutput {
    pub annotation_id: String,
    pub left: f64,
    pub top: f64,
    pub comment: String,
}

/// Final state after a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutput {
    pub annotations: Vec<Annotation>,
    pub selected_id: Option<String>,
    pub stage: StageOutput,
    pub overlay: Option<OverlayOutput>,
    /// Repaints performed, one per event that requested any.
    pub frames: usize,
    pub callbacks: Vec<Callback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<DrawCommand>>,
}

fn image_size(image: &ImageSpec, session: &Session) -> Result<Size> {
    if let (Some(width), Some(height)) = (image.width, image.height) {
        return Ok(Size::new(width, height));
    }
    let path = session.base_dir.join(&image.source);
    let bytes = std::fs::read(&path)
        .with_context(|| format!("failed to read image {}", path.display()))?;
    decode_image_size(&bytes).with_context(|| format!("failed to decode image {}", path.display()))
}

fn point([x, y]: [f64; 2]) -> Point {
    Point::new(x, y)
}

/// Run every event of `session`, painting after each one that asks for a
/// repaint. With `record_commands`, the draw commands of the last frame are
/// returned too.
pub fn replay(session: &Session, record_commands: bool) -> Result<ReplayOutput> {
    let mut annotator = Annotator::new(session.config.clone(), CallbackLog::default())?;
    annotator.set_viewport(Size::new(session.viewport[0], session.viewport[1]));
    annotator.set_degrees(session.degrees);
    annotator.set_annotations(&session.annotations);
    if let Some(id) = session.selected_id.as_deref() {
        annotator.set_selected_id(Some(id))?;
    }
    if let Some(image) = &session.image {
        let size = image_size(image, session)?;
        annotator.set_image(image.source.clone());
        annotator.image_ready(&image.source, size);
    }
    // Setup callbacks are echoes of the session's own data.
    annotator.listener_mut().callbacks.clear();

    let mut surface = RecordingSurface::new();
    let mut frames = 0;
    let mut paint = |annotator: &mut Annotator<CallbackLog>, surface: &mut RecordingSurface| {
        if annotator.needs_repaint() {
            surface.take_commands();
            annotator.paint(surface);
            frames += 1;
        }
    };
    paint(&mut annotator, &mut surface);

    for (index, event) in session.events.iter().enumerate() {
        log::debug!("event {index}: {event:?}");
        match event {
            SessionEvent::Down(p) => annotator.pointer_down(point(*p)),
            SessionEvent::Move(p) => annotator.pointer_move(point(*p)),
            SessionEvent::Up => annotator.pointer_up(),
            SessionEvent::Leave => annotator.pointer_leave(),
            SessionEvent::Wheel { at, delta_y } => {
                annotator.wheel(point(*at), *delta_y);
            }
            SessionEvent::Delete => {
                if annotator.delete_selected().is_none() {
                    log::warn!("event {index}: delete with nothing selected");
                }
            }
            SessionEvent::Comment(text) => {
                if let Err(err) = annotator.set_comment(text) {
                    log::warn!("event {index}: {err}");
                }
            }
            SessionEvent::Select(id) => {
                annotator
                    .set_selected_id(id.as_deref())
                    .with_context(|| format!("event {index}"))?;
            }
            SessionEvent::SetAnnotations(annotations) => {
                annotator.set_annotations(annotations);
            }
            SessionEvent::Degrees(degrees) => annotator.set_degrees(*degrees),
        }
        paint(&mut annotator, &mut surface);
    }

    let state = annotator.stage().state();
    let stage = StageOutput {
        scale: state.scale(),
        origin: [state.origin().x, state.origin().y],
    };
    let overlay = annotator.comment_overlay().map(|o| OverlayOutput {
        annotation_id: o.annotation_id.clone(),
        left: o.position.x,
        top: o.position.y,
        comment: o.comment.clone(),
    });

    Ok(ReplayOutput {
        annotations: annotator.annotations(),
        selected_id: annotator.selected_id().map(str::to_string),
        stage,
        overlay,
        frames,
        callbacks: std::mem::take(&mut annotator.listener_mut().callbacks),
        commands: record_commands.then(|| surface.take_commands()),
    })
}
