//! Observer seam between the engine and whatever draws it.

use crate::annotation::{Annotation, LabelCounts};
use crate::geometry::Rect;
use crate::label::PendingAnnotation;
use crate::sync::SaveState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    Previous,
    Next,
}

/// Everything the engine reports to its view, in the order it happens.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    AnnotationCreated(Annotation),
    AnnotationUpdated(Annotation),
    AnnotationRemoved(Annotation),
    SelectionChanged(Option<u64>),
    LabelCountsChanged(LabelCounts),
    SaveStateChanged {
        state: SaveState,
        message: Option<String>,
    },
    /// Rubber-band rectangle of an in-progress draw.
    DraftChanged(Rect),
    DraftDiscarded,
    /// Open the label picker for a freshly drawn rectangle.
    LabelRequested(PendingAnnotation),
    /// Close the label picker; the pending rectangle was committed or abandoned.
    LabelRequestClosed,
    ZoomChanged(f64),
    NavigationRequested(NavigationDirection),
}

pub trait ViewAdapter {
    fn notify(&mut self, event: EngineEvent);
    /// Blocking, user-visible message.
    fn alert(&mut self, message: &str);
    fn confirm_clear_all(&mut self) -> bool;
}

/// View that renders nothing and writes every event to the log.
#[derive(Debug, Clone, Default)]
pub struct TracingView {
    confirm_clear: bool,
}

impl TracingView {
    pub const fn new(confirm_clear: bool) -> Self {
        Self { confirm_clear }
    }
}

impl ViewAdapter for TracingView {
    fn notify(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::AnnotationCreated(annotation) => tracing::info!(
                id = annotation.id,
                label = annotation.label_name.as_deref().unwrap_or("-"),
                rect = %annotation.rect.summary(),
                "annotation created"
            ),
            EngineEvent::AnnotationUpdated(annotation) => tracing::debug!(
                id = annotation.id,
                rect = %annotation.rect.summary(),
                "annotation updated"
            ),
            EngineEvent::AnnotationRemoved(annotation) => {
                tracing::info!(id = annotation.id, "annotation removed")
            }
            EngineEvent::SelectionChanged(selected) => {
                tracing::debug!(?selected, "selection changed")
            }
            EngineEvent::LabelCountsChanged(counts) => {
                tracing::debug!(total = counts.total, "label counts changed")
            }
            EngineEvent::SaveStateChanged { state, message } => {
                tracing::info!(state = state.as_str(), ?message, "save state changed")
            }
            EngineEvent::DraftChanged(rect) => {
                tracing::trace!(rect = %rect.summary(), "draft changed")
            }
            EngineEvent::DraftDiscarded => tracing::trace!("draft discarded"),
            EngineEvent::LabelRequested(pending) => {
                tracing::info!(rect = %pending.rect.summary(), "label requested")
            }
            EngineEvent::LabelRequestClosed => tracing::debug!("label request closed"),
            EngineEvent::ZoomChanged(scale) => tracing::debug!(scale, "zoom changed"),
            EngineEvent::NavigationRequested(direction) => {
                tracing::info!(?direction, "navigation requested")
            }
        }
    }

    fn alert(&mut self, message: &str) {
        tracing::warn!("{message}");
    }

    fn confirm_clear_all(&mut self) -> bool {
        self.confirm_clear
    }
}
