//! Ordered annotation collection with id allocation, selection and a mutation
//! revision used for dirty tracking.

mod model;
mod operations;
mod query;
mod selection;

pub use model::{Annotation, ExistingAnnotation, Label, LabelCount, LabelCounts, LabelSource};
pub use query::Hit;

#[derive(Debug, Clone)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    next_id: u64,
    selected: Option<u64>,
    revision: u64,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self {
            annotations: Vec::new(),
            next_id: 1,
            selected: None,
            revision: 0,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn find_mut(&mut self, id: u64) -> Option<&mut Annotation> {
        self.annotations
            .iter_mut()
            .find(|annotation| annotation.id == id)
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Increases on every mutation of annotation data; selection does not count.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}
