//! Headless sessions: a JSON task describing the image and its labels, and a JSON
//! script of input steps replayed through an [`AnnotationSession`].

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::annotation::{ExistingAnnotation, LabelSource};
use crate::config::AppConfig;
use crate::geometry::{ImageBounds, ScreenPoint};
use crate::input::{ShortcutKey, ShortcutModifiers};
use crate::session::AnnotationSession;
use crate::state::PointerEvent;
use crate::sync::SyncResult;
use crate::view::ViewAdapter;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read image size from {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("task has neither an image path nor an explicit width and height")]
    MissingImageSize,
}

pub type ReplayResult<T> = std::result::Result<T, ReplayError>;

/// One image to annotate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReplayTask {
    /// Resolved against the task file's directory when relative.
    pub image: Option<PathBuf>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub labels: LabelSource,
    pub annotations: Vec<ExistingAnnotation>,
    pub save_url: Option<String>,
    pub csrf_token: Option<String>,
    pub auto_next: Option<bool>,
}

impl ReplayTask {
    pub fn load(path: &Path) -> ReplayResult<Self> {
        read_json(path)
    }

    /// Explicit size wins; otherwise the image header is read.
    pub fn image_bounds(&self, base_dir: &Path) -> ReplayResult<ImageBounds> {
        if let (Some(width), Some(height)) = (self.width, self.height) {
            return Ok(ImageBounds::new(width, height));
        }
        let image = self.image.as_ref().ok_or(ReplayError::MissingImageSize)?;
        let path = if image.is_absolute() {
            image.clone()
        } else {
            base_dir.join(image)
        };
        ImageBounds::from_image_file(&path).map_err(|source| ReplayError::Image { path, source })
    }

    /// `config` with this task's endpoint, token and auto-next settings layered on top.
    pub fn effective_config(&self, config: &AppConfig) -> AppConfig {
        let mut merged = config.clone();
        if let Some(save_url) = self.save_url.clone() {
            merged.save_url = Some(save_url);
        }
        if let Some(csrf_token) = self.csrf_token.clone() {
            merged.csrf_token = Some(csrf_token);
        }
        if let Some(auto_next) = self.auto_next {
            merged.auto_next = auto_next;
        }
        merged
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReplayStep {
    PointerDown {
        x: f64,
        y: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    PointerLeave,
    Key {
        key: ShortcutKey,
        #[serde(default)]
        modifiers: ShortcutModifiers,
    },
    AssignLabel {
        label_id: u64,
    },
    AbandonLabel,
    /// Selection from outside the canvas, such as an annotation list.
    Select {
        id: u64,
    },
    Deselect,
    Relabel {
        label_id: u64,
    },
    DeleteSelected,
    ClearAll,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    /// Save and wait for the result.
    Save,
}

pub fn load_script(path: &Path) -> ReplayResult<Vec<ReplayStep>> {
    read_json(path)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> ReplayResult<T> {
    let contents = std::fs::read_to_string(path).map_err(|source| ReplayError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ReplayError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Feeds `steps` through `session` in order. Rejected steps are logged and skipped.
pub fn replay<V: ViewAdapter>(session: &mut AnnotationSession<V>, steps: &[ReplayStep]) {
    for (index, step) in steps.iter().enumerate() {
        tracing::debug!(index, ?step, "replay step");
        match step {
            ReplayStep::PointerDown { x, y } => {
                session.handle_pointer(PointerEvent::Down(ScreenPoint::new(*x, *y)))
            }
            ReplayStep::PointerMove { x, y } => {
                session.handle_pointer(PointerEvent::Move(ScreenPoint::new(*x, *y)))
            }
            ReplayStep::PointerUp { x, y } => {
                session.handle_pointer(PointerEvent::Up(ScreenPoint::new(*x, *y)))
            }
            ReplayStep::PointerLeave => session.handle_pointer(PointerEvent::Leave),
            ReplayStep::Key { key, modifiers } => {
                if session.handle_key(*key, *modifiers).is_none() {
                    tracing::debug!(index, ?key, "key has no action here");
                }
                finish_pending_save(session);
            }
            ReplayStep::AssignLabel { label_id } => {
                if let Err(err) = session.assign_label(*label_id) {
                    tracing::warn!(index, %err, "replay step skipped");
                }
            }
            ReplayStep::AbandonLabel => {
                session.abandon_label();
            }
            ReplayStep::Select { id } => {
                if !session.select(*id) {
                    tracing::debug!(index, id, "selection unchanged");
                }
            }
            ReplayStep::Deselect => {
                session.deselect();
            }
            ReplayStep::Relabel { label_id } => {
                if let Err(err) = session.relabel_selected(*label_id) {
                    tracing::warn!(index, %err, "replay step skipped");
                }
            }
            ReplayStep::DeleteSelected => {
                session.delete_selected();
            }
            ReplayStep::ClearAll => {
                session.clear_all();
            }
            ReplayStep::ZoomIn => {
                session.zoom_in();
            }
            ReplayStep::ZoomOut => {
                session.zoom_out();
            }
            ReplayStep::ResetZoom => {
                session.reset_zoom();
            }
            ReplayStep::Save => {
                if let Err(err) = save_and_wait(session) {
                    tracing::warn!(index, %err, "replay save did not succeed");
                }
            }
        }
    }
}

/// Starts a save and blocks for its result.
pub fn save_and_wait<V: ViewAdapter>(session: &mut AnnotationSession<V>) -> SyncResult<()> {
    session.save()?;
    session.wait_for_save().unwrap_or(Ok(()))
}

// A save started by a shortcut completes before the next step runs.
fn finish_pending_save<V: ViewAdapter>(session: &mut AnnotationSession<V>) {
    if let Some(Err(err)) = session.wait_for_save() {
        tracing::warn!(%err, "replay save did not succeed");
    }
}
