use serde::{Deserialize, Serialize};

use crate::annotation::{Annotation, AnnotationStore};

pub const SUCCESS_STATUS: &str = "success";

/// Body of a save request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavePayload {
    pub annotations: Vec<SavedAnnotation>,
}

impl SavePayload {
    pub fn from_store(store: &AnnotationStore) -> Self {
        Self {
            annotations: store
                .annotations()
                .iter()
                .map(SavedAnnotation::from)
                .collect(),
        }
    }
}

/// Minimal wire form of an annotation: label reference and rounded geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedAnnotation {
    pub label_id: Option<u64>,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl From<&Annotation> for SavedAnnotation {
    fn from(annotation: &Annotation) -> Self {
        let rect = annotation.rect;
        Self {
            label_id: annotation.label_id,
            x: rect.x.round() as i64,
            y: rect.y.round() as i64,
            width: rect.width.round() as i64,
            height: rect.height.round() as i64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SaveResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl SaveResponse {
    pub fn success() -> Self {
        Self {
            status: SUCCESS_STATUS.to_string(),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// Human-readable reason for a failed save.
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("server returned status \"{}\"", self.status))
    }
}
