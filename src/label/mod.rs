use crate::annotation::{AnnotationStore, LabelSource};
use crate::geometry::Rect;
use thiserror::Error;

pub type LabelResult<T> = std::result::Result<T, LabelError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("label {id} is not in the label source")]
    UnknownLabel { id: u64 },
    #[error("no annotation is waiting for a label")]
    NoPendingAnnotation,
}

/// A drawn rectangle waiting for its label. Not part of the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingAnnotation {
    pub rect: Rect,
}

#[derive(Debug, Default)]
pub struct LabelFlow {
    pending: Option<PendingAnnotation>,
}

impl LabelFlow {
    pub fn new() -> Self {
        Self { pending: None }
    }

    pub fn pending(&self) -> Option<&PendingAnnotation> {
        self.pending.as_ref()
    }

    pub fn is_awaiting_label(&self) -> bool {
        self.pending.is_some()
    }

    /// Holds `rect` until a label is chosen. A previous pending rectangle is replaced.
    pub fn begin(&mut self, rect: Rect) -> PendingAnnotation {
        if self.pending.is_some() {
            tracing::debug!("replacing pending annotation");
        }
        let pending = PendingAnnotation { rect };
        self.pending = Some(pending);
        pending
    }

    /// Commits the pending rectangle with `label_id`, returning the new annotation id.
    ///
    /// An unknown label leaves the pending rectangle in place so another choice can be made.
    pub fn commit(
        &mut self,
        label_id: u64,
        labels: &LabelSource,
        store: &mut AnnotationStore,
    ) -> LabelResult<u64> {
        let pending = self.pending.ok_or(LabelError::NoPendingAnnotation)?;
        let label = labels
            .get(label_id)
            .ok_or(LabelError::UnknownLabel { id: label_id })?;
        self.pending = None;
        let id = store.insert(pending.rect, label);
        tracing::debug!(id, label_id, "committed pending annotation");
        Ok(id)
    }

    /// Discards the pending rectangle without touching the store.
    pub fn abandon(&mut self) -> Option<PendingAnnotation> {
        let pending = self.pending.take();
        if pending.is_some() {
            tracing::debug!("pending annotation abandoned");
        }
        pending
    }
}

/// Replaces the label of the selected annotation in place.
///
/// Returns the relabeled id, or `Ok(None)` when nothing is selected.
pub fn relabel_selected(
    label_id: u64,
    labels: &LabelSource,
    store: &mut AnnotationStore,
) -> LabelResult<Option<u64>> {
    let Some(id) = store.selected_id() else {
        return Ok(None);
    };
    let label = labels
        .get(label_id)
        .ok_or(LabelError::UnknownLabel { id: label_id })?;
    Ok(store.relabel(id, label).map(|annotation| annotation.id))
}
