//! PicMark Core Library
//!
//! Platform-agnostic core of the PicMark image annotator: rectangle
//! annotations over a pannable, zoomable image.

pub mod annotator;
pub mod collection;
pub mod config;
pub mod error;
pub mod interaction;
pub mod reconcile;
pub mod shapes;
pub mod stage;
pub mod surface;
pub mod transformer;

pub use annotator::{Annotator, AnnotatorListener, CommentOverlay, PaintOutcome};
pub use collection::ShapeCollection;
pub use config::AnnotatorConfig;
pub use error::{AnnotatorError, AnnotatorResult};
pub use interaction::{CreateOptions, Effect, InteractionState, PointerEvent};
pub use reconcile::{ReconcileReport, reconcile};
pub use shapes::{Annotation, AnnotationId, AnnotationKind, AnnotationStyle, Mark, MarkAdjust, Shape, ShapeTrait};
pub use stage::{Stage, StageState, MAX_SCALE, MIN_SCALE};
pub use surface::Surface;
pub use transformer::{Corner, Edge, Handle, HandleKind, Transformer};
