//! PicMark Application
//!
//! Headless replay of scripted annotation sessions.

pub mod replay;
pub mod session;

pub use replay::{Callback, CallbackLog, ReplayOutput, replay};
pub use session::{ImageSpec, Session, SessionEvent};
