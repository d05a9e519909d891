use super::*;
use crate::geometry::{self, Handle, ImageBounds, ImagePoint, Rect};

impl AnnotationStore {
    /// Loads pre-existing annotations, assigning ids in encounter order.
    ///
    /// Hydration is not an edit: the revision is left untouched.
    pub fn hydrate(
        &mut self,
        existing: impl IntoIterator<Item = ExistingAnnotation>,
        bounds: ImageBounds,
    ) -> Vec<u64> {
        let mut ids = Vec::new();
        for item in existing {
            let id = self.allocate_id();
            let mut annotation = item.into_annotation(id);
            let fitted = geometry::fit(annotation.rect, bounds);
            if fitted != annotation.rect {
                tracing::debug!(id, from = ?annotation.rect, to = ?fitted, "hydrated annotation fitted into image");
                annotation.rect = fitted;
            }
            self.annotations.push(annotation);
            ids.push(id);
        }
        ids
    }

    pub fn insert(&mut self, rect: Rect, label: &Label) -> u64 {
        let id = self.allocate_id();
        let mut annotation = Annotation::new(id, rect);
        annotation.apply_label(label);
        self.annotations.push(annotation);
        self.bump_revision();
        id
    }

    pub fn move_by(
        &mut self,
        id: u64,
        delta_x: f64,
        delta_y: f64,
        bounds: ImageBounds,
    ) -> Option<&Annotation> {
        let annotation = self.find_mut(id)?;
        annotation.rect = geometry::apply_drag(annotation.rect, delta_x, delta_y, bounds);
        self.bump_revision();
        self.get(id)
    }

    /// Returns the handle that stays under the cursor after any flip.
    pub fn resize(
        &mut self,
        id: u64,
        handle: Handle,
        cursor: ImagePoint,
        bounds: ImageBounds,
    ) -> Option<Handle> {
        let annotation = self.find_mut(id)?;
        let (rect, active) = geometry::apply_resize(annotation.rect, handle, cursor, bounds);
        annotation.rect = rect;
        self.bump_revision();
        Some(active)
    }

    pub fn relabel(&mut self, id: u64, label: &Label) -> Option<&Annotation> {
        let annotation = self.find_mut(id)?;
        annotation.apply_label(label);
        self.bump_revision();
        self.get(id)
    }

    pub fn remove(&mut self, id: u64) -> Option<Annotation> {
        let index = self
            .annotations
            .iter()
            .position(|annotation| annotation.id == id)?;
        let removed = self.annotations.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.bump_revision();
        Some(removed)
    }

    /// Empties the collection. Counts as an edit even when already empty.
    pub fn clear(&mut self) -> Vec<Annotation> {
        self.selected = None;
        self.bump_revision();
        std::mem::take(&mut self.annotations)
    }
}
