pub mod annotation;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod label;
pub mod logging;
pub mod replay;
pub mod session;
pub mod state;
pub mod sync;
pub mod view;
pub mod viewport;

use std::path::Path;

pub use error::{AppError, AppResult};
pub use session::{AnnotationSession, SessionBuilder};

use replay::ReplayTask;
use view::TracingView;

/// Result of a headless replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub annotations: usize,
    pub saved: bool,
}

/// Entrypoint used by the CLI: replays `script_path` against the task at `task_path`
/// and saves when the session ends with unsaved edits.
pub fn run(task_path: &Path, script_path: Option<&Path>) -> AppResult<ReplaySummary> {
    logging::init();
    tracing::info!(task = %task_path.display(), "starting boxmark");

    let task = ReplayTask::load(task_path)?;
    let base_dir = task_path.parent().unwrap_or_else(|| Path::new("."));
    let bounds = task.image_bounds(base_dir)?;
    let config = task.effective_config(&config::load_app_config());
    let steps = match script_path {
        Some(path) => replay::load_script(path)?,
        None => Vec::new(),
    };

    let mut session = AnnotationSession::builder()
        .view(TracingView::new(true))
        .image_bounds(bounds)
        .labels(task.labels)
        .existing(task.annotations)
        .config(&config)
        .build()?;

    replay::replay(&mut session, &steps);

    let mut saved = false;
    if session.is_dirty() {
        tracing::info!("session ended with unsaved edits; saving");
        replay::save_and_wait(&mut session)?;
        saved = true;
    }

    let summary = ReplaySummary {
        steps: steps.len(),
        annotations: session.annotations().len(),
        saved,
    };
    tracing::info!(?summary, "replay complete");
    Ok(summary)
}
