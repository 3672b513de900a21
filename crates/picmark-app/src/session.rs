//! Scripted annotation sessions loaded from JSON.

use anyhow::{Context, Result};
use picmark_core::{Annotation, AnnotatorConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The image shown under the annotations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageSpec {
    pub source: String,
    /// Natural size. When absent, `source` is read as a file relative to
    /// the session file and decoded to learn it.
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// One scripted input. Pointer positions are device pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    Down([f64; 2]),
    Move([f64; 2]),
    Up,
    Leave,
    Wheel { at: [f64; 2], delta_y: f64 },
    Delete,
    Comment(String),
    /// Host-driven selection change.
    Select(Option<String>),
    /// Replace the annotation list from the host side.
    SetAnnotations(Vec<Annotation>),
    Degrees(f64),
}

/// A replayable session.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub config: AnnotatorConfig,
    pub viewport: [f64; 2],
    #[serde(default)]
    pub image: Option<ImageSpec>,
    #[serde(default)]
    pub degrees: f64,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub selected_id: Option<String>,
    #[serde(default)]
    pub events: Vec<SessionEvent>,
    /// Directory that relative image paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Session {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let session: Self = serde_json::from_str(json).context("invalid session file")?;
        session
            .config
            .validate()
            .context("invalid annotator config in session")?;
        Ok(session)
    }

    /// Load a session file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut session = Self::from_json_str(&json)
            .with_context(|| format!("failed to load session {}", path.display()))?;
        session.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(session)
    }
}
