use super::*;
use crate::geometry::{Handle, ImagePoint};

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Handle { id: u64, handle: Handle },
    Body { id: u64 },
}

impl Hit {
    pub const fn id(self) -> u64 {
        match self {
            Self::Handle { id, .. } | Self::Body { id } => id,
        }
    }
}

impl AnnotationStore {
    pub fn get(&self, id: u64) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|annotation| annotation.id == id)
    }

    /// Topmost annotation under `point`; handles win over bodies of the same box.
    pub fn hit_test(&self, point: ImagePoint, handle_radius: f64) -> Option<Hit> {
        self.annotations.iter().rev().find_map(|annotation| {
            if let Some(handle) = annotation.rect.handle_at(point, handle_radius) {
                return Some(Hit::Handle {
                    id: annotation.id,
                    handle,
                });
            }
            annotation
                .rect
                .contains(point)
                .then_some(Hit::Body { id: annotation.id })
        })
    }

    /// Per-label counts in label-source order. Annotations whose label is not in
    /// `labels` only contribute to the total.
    pub fn label_counts(&self, labels: &LabelSource) -> LabelCounts {
        let per_label = labels
            .iter()
            .map(|label| LabelCount {
                label_id: label.id,
                count: self
                    .annotations
                    .iter()
                    .filter(|annotation| annotation.label_id == Some(label.id))
                    .count(),
            })
            .collect();
        LabelCounts {
            per_label,
            total: self.annotations.len(),
        }
    }
}
