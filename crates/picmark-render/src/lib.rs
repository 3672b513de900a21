//! PicMark Render Library
//!
//! Drawing surfaces for the annotator core. The default build includes a
//! Vello surface; the recording surface is always available.

mod recording;
mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use recording::{DrawCommand, RecordingSurface};
pub use renderer::{DrawState, RenderResult, RendererError, Shadow, StateStack, decode_image_size};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloSurface;
