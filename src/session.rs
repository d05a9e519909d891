//! One editing session over one image: the object every input handler is given.

use std::sync::Arc;

use thiserror::Error;

use crate::annotation::{Annotation, AnnotationStore, ExistingAnnotation, LabelCounts, LabelSource};
use crate::config::AppConfig;
use crate::geometry::{ImageBounds, ScreenPoint};
use crate::input::{resolve_shortcut, InputContext, ShortcutAction, ShortcutKey, ShortcutModifiers};
use crate::label::{self, LabelFlow, LabelResult, PendingAnnotation};
use crate::state::{CanvasContext, InteractionEffect, InteractionMachine, InteractionState, PointerEvent};
use crate::sync::{HttpSaveTransport, SavePayload, SaveState, SaveTransport, SyncClient, SyncError, SyncResult};
use crate::view::{EngineEvent, NavigationDirection, ViewAdapter};
use crate::viewport::Viewport;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("missing required session elements: {}", .missing.join(", "))]
    MissingElements { missing: Vec<&'static str> },
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

pub struct SessionBuilder<V> {
    view: Option<V>,
    bounds: Option<ImageBounds>,
    labels: LabelSource,
    existing: Vec<ExistingAnnotation>,
    transport: Option<Arc<dyn SaveTransport>>,
    auto_next: bool,
}

impl<V: ViewAdapter> Default for SessionBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: ViewAdapter> SessionBuilder<V> {
    pub fn new() -> Self {
        Self {
            view: None,
            bounds: None,
            labels: LabelSource::default(),
            existing: Vec::new(),
            transport: None,
            auto_next: false,
        }
    }

    pub fn view(mut self, view: V) -> Self {
        self.view = Some(view);
        self
    }

    pub fn image_bounds(mut self, bounds: ImageBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn labels(mut self, labels: LabelSource) -> Self {
        self.labels = labels;
        self
    }

    /// Annotations already stored for this image; ids are assigned in order.
    pub fn existing(mut self, existing: Vec<ExistingAnnotation>) -> Self {
        self.existing = existing;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn SaveTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn auto_next(mut self, auto_next: bool) -> Self {
        self.auto_next = auto_next;
        self
    }

    /// Applies `auto_next` and, when a save endpoint is configured, an HTTP transport.
    pub fn config(mut self, config: &AppConfig) -> Self {
        self.auto_next = config.auto_next;
        if let Some(endpoint) = config.save_endpoint() {
            match HttpSaveTransport::new(endpoint, config.csrf_token.clone()) {
                Ok(transport) => self.transport = Some(Arc::new(transport)),
                Err(err) => tracing::warn!(%err, "ignoring configured save endpoint"),
            }
        }
        self
    }

    pub fn build(self) -> SessionResult<AnnotationSession<V>> {
        let bounds = self.bounds.filter(|bounds| !bounds.is_empty());
        let mut missing = Vec::new();
        if self.view.is_none() {
            missing.push("view");
        }
        if bounds.is_none() {
            missing.push("image bounds");
        }
        if self.transport.is_none() {
            missing.push("save endpoint");
        }

        let (Some(view), Some(bounds), Some(transport)) = (self.view, bounds, self.transport) else {
            tracing::error!(?missing, "annotation session setup aborted");
            return Err(SessionError::MissingElements { missing });
        };

        let mut store = AnnotationStore::new();
        store.hydrate(self.existing, bounds);
        let sync = SyncClient::new(transport, store.revision());

        let mut session = AnnotationSession {
            view,
            store,
            labels: self.labels,
            bounds,
            viewport: Viewport::new(),
            machine: InteractionMachine::new(),
            label_flow: LabelFlow::new(),
            sync,
            auto_next: self.auto_next,
        };
        for annotation in session.store.annotations().to_vec() {
            session.view.notify(EngineEvent::AnnotationCreated(annotation));
        }
        session.publish_label_counts();

        tracing::info!(
            width = bounds.width,
            height = bounds.height,
            annotations = session.store.len(),
            labels = session.labels.len(),
            "annotation session ready"
        );
        Ok(session)
    }
}

pub struct AnnotationSession<V> {
    view: V,
    store: AnnotationStore,
    labels: LabelSource,
    bounds: ImageBounds,
    viewport: Viewport,
    machine: InteractionMachine,
    label_flow: LabelFlow,
    sync: SyncClient,
    auto_next: bool,
}

impl<V: ViewAdapter> AnnotationSession<V> {
    pub fn builder() -> SessionBuilder<V> {
        SessionBuilder::new()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.store.annotations()
    }

    pub fn labels(&self) -> &LabelSource {
        &self.labels
    }

    pub fn image_bounds(&self) -> ImageBounds {
        self.bounds
    }

    pub fn selected_id(&self) -> Option<u64> {
        self.store.selected_id()
    }

    pub fn interaction(&self) -> InteractionState {
        self.machine.state()
    }

    pub fn pending(&self) -> Option<&PendingAnnotation> {
        self.label_flow.pending()
    }

    pub fn scale(&self) -> f64 {
        self.viewport.scale()
    }

    pub fn save_state(&self) -> SaveState {
        self.sync.state()
    }

    pub fn is_dirty(&self) -> bool {
        self.sync.is_dirty(self.store.revision())
    }

    /// Whether leaving now would lose edits and the user should be asked first.
    pub fn should_confirm_leave(&self) -> bool {
        self.is_dirty()
    }

    pub fn label_counts(&self) -> LabelCounts {
        self.store.label_counts(&self.labels)
    }

    /// Rounded image-space coordinate under `point`, for a cursor readout.
    pub fn cursor_position(&self, point: ScreenPoint) -> (i64, i64) {
        self.viewport.to_image_space(point).rounded()
    }

    pub fn set_container_origin(&mut self, origin: ScreenPoint) {
        self.viewport.set_origin(origin);
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        if self.label_flow.is_awaiting_label() {
            tracing::debug!(?event, "pointer input ignored while label is pending");
            return;
        }

        let ctx = CanvasContext {
            store: &mut self.store,
            bounds: self.bounds,
            handle_radius: self.viewport.handle_radius(),
        };
        let effects = match event {
            PointerEvent::Down(point) => self
                .machine
                .pointer_down(self.viewport.to_image_space(point), ctx),
            PointerEvent::Move(point) => self
                .machine
                .pointer_move(self.viewport.to_image_space(point), ctx),
            PointerEvent::Up(point) => self
                .machine
                .pointer_up(self.viewport.to_image_space(point), ctx),
            PointerEvent::Leave => self.machine.pointer_leave(),
        };
        self.apply_effects(effects);
    }

    fn apply_effects(&mut self, effects: Vec<InteractionEffect>) {
        for effect in effects {
            match effect {
                InteractionEffect::SelectionChanged(selected) => {
                    self.view.notify(EngineEvent::SelectionChanged(selected));
                }
                InteractionEffect::DraftChanged(rect) => {
                    self.view.notify(EngineEvent::DraftChanged(rect));
                }
                InteractionEffect::DraftDiscarded => self.view.notify(EngineEvent::DraftDiscarded),
                InteractionEffect::DrawCompleted(rect) => {
                    let pending = self.label_flow.begin(rect);
                    self.view.notify(EngineEvent::LabelRequested(pending));
                }
                InteractionEffect::AnnotationUpdated(id) => {
                    if let Some(annotation) = self.store.get(id) {
                        self.view
                            .notify(EngineEvent::AnnotationUpdated(annotation.clone()));
                    }
                }
            }
        }
    }

    /// Resolves and performs a keyboard shortcut, returning the action taken.
    pub fn handle_key(
        &mut self,
        key: ShortcutKey,
        modifiers: ShortcutModifiers,
    ) -> Option<ShortcutAction> {
        let context = InputContext {
            label_dialog_open: self.label_flow.is_awaiting_label(),
        };
        let action = resolve_shortcut(key, modifiers, context)?;
        tracing::debug!(?key, ?action, "shortcut");

        match action {
            ShortcutAction::DeleteSelection => {
                self.delete_selected();
            }
            ShortcutAction::Cancel => self.cancel(),
            ShortcutAction::Save => {
                if let Err(err) = self.save() {
                    tracing::debug!(%err, "save shortcut not performed");
                }
            }
            ShortcutAction::ZoomIn => {
                self.zoom_in();
            }
            ShortcutAction::ZoomOut => {
                self.zoom_out();
            }
            ShortcutAction::ResetZoom => {
                self.reset_zoom();
            }
            ShortcutAction::NavigatePrevious => self.navigate(NavigationDirection::Previous),
            ShortcutAction::NavigateNext => self.navigate(NavigationDirection::Next),
            ShortcutAction::CancelLabel => {
                self.abandon_label();
            }
        }
        Some(action)
    }

    /// Ends any gesture (a draft is discarded, applied geometry stays) and clears the selection.
    pub fn cancel(&mut self) {
        let effects = self.machine.cancel();
        self.apply_effects(effects);
        self.deselect();
    }

    /// Selects `id`, e.g. from a list view. Stale or already-selected ids do nothing.
    pub fn select(&mut self, id: u64) -> bool {
        let changed = self.store.select(id);
        if changed {
            self.view.notify(EngineEvent::SelectionChanged(Some(id)));
        }
        changed
    }

    pub fn deselect(&mut self) -> bool {
        let changed = self.store.deselect();
        if changed {
            self.view.notify(EngineEvent::SelectionChanged(None));
        }
        changed
    }

    pub fn navigate(&mut self, direction: NavigationDirection) {
        self.view.notify(EngineEvent::NavigationRequested(direction));
    }

    /// Commits the pending rectangle with the chosen label.
    pub fn assign_label(&mut self, label_id: u64) -> LabelResult<u64> {
        let id = match self.label_flow.commit(label_id, &self.labels, &mut self.store) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(%err, "label assignment rejected");
                return Err(err);
            }
        };
        self.view.notify(EngineEvent::LabelRequestClosed);
        if let Some(annotation) = self.store.get(id) {
            self.view
                .notify(EngineEvent::AnnotationCreated(annotation.clone()));
        }
        self.publish_label_counts();
        Ok(id)
    }

    pub fn abandon_label(&mut self) -> Option<PendingAnnotation> {
        let pending = self.label_flow.abandon()?;
        self.view.notify(EngineEvent::LabelRequestClosed);
        Some(pending)
    }

    /// Changes the label of the selected annotation; `Ok(None)` without a selection.
    pub fn relabel_selected(&mut self, label_id: u64) -> LabelResult<Option<u64>> {
        let relabeled = label::relabel_selected(label_id, &self.labels, &mut self.store)
            .inspect_err(|err| tracing::warn!(%err, "relabel rejected"))?;
        if let Some(annotation) = relabeled.and_then(|id| self.store.get(id)) {
            self.view
                .notify(EngineEvent::AnnotationUpdated(annotation.clone()));
            self.publish_label_counts();
        }
        Ok(relabeled)
    }

    pub fn delete_selected(&mut self) -> Option<Annotation> {
        let id = self.store.selected_id()?;
        let removed = self.store.remove(id)?;
        tracing::debug!(id, "deleted selected annotation");
        self.view.notify(EngineEvent::SelectionChanged(None));
        self.view
            .notify(EngineEvent::AnnotationRemoved(removed.clone()));
        self.publish_label_counts();
        Some(removed)
    }

    /// Removes every annotation once the view confirms. Returns whether it did.
    pub fn clear_all(&mut self) -> bool {
        if !self.view.confirm_clear_all() {
            tracing::debug!("clear all declined");
            return false;
        }

        let effects = self.machine.pointer_leave();
        self.apply_effects(effects);
        let had_selection = self.store.selected_id().is_some();
        let removed = self.store.clear();
        tracing::info!(count = removed.len(), "cleared all annotations");
        if had_selection {
            self.view.notify(EngineEvent::SelectionChanged(None));
        }
        for annotation in removed {
            self.view.notify(EngineEvent::AnnotationRemoved(annotation));
        }
        self.publish_label_counts();
        true
    }

    pub fn zoom_in(&mut self) -> f64 {
        let scale = self.viewport.zoom_in();
        self.view.notify(EngineEvent::ZoomChanged(scale));
        scale
    }

    pub fn zoom_out(&mut self) -> f64 {
        let scale = self.viewport.zoom_out();
        self.view.notify(EngineEvent::ZoomChanged(scale));
        scale
    }

    pub fn reset_zoom(&mut self) -> f64 {
        let scale = self.viewport.reset();
        self.view.notify(EngineEvent::ZoomChanged(scale));
        scale
    }

    /// Starts saving a snapshot of the current annotations.
    ///
    /// Edits made while the save is in flight stay dirty after it succeeds.
    pub fn save(&mut self) -> SyncResult<()> {
        let payload = SavePayload::from_store(&self.store);
        self.sync.begin(payload, self.store.revision())?;
        self.view.notify(EngineEvent::SaveStateChanged {
            state: SaveState::Saving,
            message: None,
        });
        Ok(())
    }

    /// Delivers the in-flight save's result if it has arrived.
    pub fn poll_save(&mut self) -> Option<SyncResult<()>> {
        let outcome = self.sync.poll()?;
        self.finish_save(&outcome);
        Some(outcome)
    }

    /// Blocks until the in-flight save completes.
    pub fn wait_for_save(&mut self) -> Option<SyncResult<()>> {
        let outcome = self.sync.wait()?;
        self.finish_save(&outcome);
        Some(outcome)
    }

    fn finish_save(&mut self, outcome: &SyncResult<()>) {
        match outcome {
            Ok(()) => {
                self.view.notify(EngineEvent::SaveStateChanged {
                    state: SaveState::Saved,
                    message: None,
                });
                if self.auto_next {
                    self.navigate(NavigationDirection::Next);
                }
            }
            Err(err) => {
                let message = err.to_string();
                self.view.notify(EngineEvent::SaveStateChanged {
                    state: SaveState::Failed,
                    message: Some(message.clone()),
                });
                let alert = match err {
                    SyncError::Rejected { .. } => format!("save failed: {message}"),
                    _ => format!("error while saving annotations: {message}"),
                };
                self.view.alert(&alert);
            }
        }
    }

    fn publish_label_counts(&mut self) {
        let counts = self.label_counts();
        self.view.notify(EngineEvent::LabelCountsChanged(counts));
    }
}
