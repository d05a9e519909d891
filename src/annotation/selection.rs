use super::*;

impl AnnotationStore {
    pub fn selected_id(&self) -> Option<u64> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Annotation> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Returns `true` when the selection changed.
    ///
    /// Selecting the current selection or an id that is no longer stored does nothing.
    pub fn select(&mut self, id: u64) -> bool {
        if self.selected == Some(id) {
            return false;
        }
        if self.get(id).is_none() {
            tracing::debug!(id, "ignoring selection of missing annotation");
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// Returns `true` when something was selected before.
    pub fn deselect(&mut self) -> bool {
        self.selected.take().is_some()
    }
}
