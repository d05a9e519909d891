use serde::{Deserialize, Serialize};

use crate::geometry::{ImagePoint, Rect};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: u64,
    pub name: String,
    pub color: String,
}

impl Label {
    pub fn new(id: u64, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Ordered, read-only set of labels an annotation may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<Label>")]
pub struct LabelSource {
    labels: Vec<Label>,
}

impl From<Vec<Label>> for LabelSource {
    fn from(labels: Vec<Label>) -> Self {
        Self::new(labels)
    }
}

impl LabelSource {
    /// Keeps the first label for each id, preserving order.
    pub fn new(labels: Vec<Label>) -> Self {
        let mut unique: Vec<Label> = Vec::with_capacity(labels.len());
        for label in labels {
            if unique.iter().any(|existing| existing.id == label.id) {
                tracing::warn!(label_id = label.id, "duplicate label id ignored");
                continue;
            }
            unique.push(label);
        }
        Self { labels: unique }
    }

    pub fn get(&self, id: u64) -> Option<&Label> {
        self.labels.iter().find(|label| label.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: u64,
    pub rect: Rect,
    pub label_id: Option<u64>,
    pub label_name: Option<String>,
    pub label_color: Option<String>,
}

impl Annotation {
    pub fn new(id: u64, rect: Rect) -> Self {
        Self {
            id,
            rect,
            label_id: None,
            label_name: None,
            label_color: None,
        }
    }

    pub fn apply_label(&mut self, label: &Label) {
        self.label_id = Some(label.id);
        self.label_name = Some(label.name.clone());
        self.label_color = Some(label.color.clone());
    }

    pub fn is_labeled(&self) -> bool {
        self.label_id.is_some()
    }
}

/// Annotation supplied at load time; ids are assigned by the store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExistingAnnotation {
    #[serde(default)]
    pub label_id: Option<u64>,
    #[serde(default)]
    pub label_name: Option<String>,
    #[serde(default)]
    pub label_color: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ExistingAnnotation {
    pub(crate) fn into_annotation(self, id: u64) -> Annotation {
        Annotation {
            id,
            // Negative extents describe the box from its opposite corner.
            rect: Rect::from_corners(
                ImagePoint::new(self.x, self.y),
                ImagePoint::new(self.x + self.width, self.y + self.height),
            ),
            label_id: self.label_id,
            label_name: self.label_name,
            label_color: self.label_color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelCount {
    pub label_id: u64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelCounts {
    pub per_label: Vec<LabelCount>,
    pub total: usize,
}

impl LabelCounts {
    pub fn count_for(&self, label_id: u64) -> usize {
        self.per_label
            .iter()
            .find(|entry| entry.label_id == label_id)
            .map_or(0, |entry| entry.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_source_drops_duplicate_ids_and_keeps_order() {
        let source = LabelSource::new(vec![
            Label::new(2, "dog", "#00ff00"),
            Label::new(1, "cat", "#ff0000"),
            Label::new(2, "wolf", "#0000ff"),
        ]);
        assert_eq!(source.len(), 2);
        let names = source.iter().map(|label| label.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["dog", "cat"]);
        assert_eq!(source.get(2).map(|label| label.name.as_str()), Some("dog"));
    }

    #[test]
    fn label_source_deserializes_from_plain_array() {
        let source: LabelSource =
            serde_json::from_str(r##"[{"id":7,"name":"car","color":"#123456"}]"##)
                .expect("label array should parse");
        assert_eq!(source.get(7), Some(&Label::new(7, "car", "#123456")));
    }

    #[test]
    fn existing_annotation_parses_without_label_fields() {
        let existing: ExistingAnnotation =
            serde_json::from_str(r#"{"x":1,"y":2,"width":3,"height":4}"#)
                .expect("unlabeled annotation should parse");
        let annotation = existing.into_annotation(9);
        assert_eq!(annotation.id, 9);
        assert_eq!(annotation.rect, Rect::new(1.0, 2.0, 3.0, 4.0));
        assert!(!annotation.is_labeled());
    }

    #[test]
    fn negative_extents_are_measured_from_the_opposite_corner() {
        let existing: ExistingAnnotation =
            serde_json::from_str(r#"{"x":50,"y":30,"width":-10,"height":-20}"#)
                .expect("annotation with negative extents should parse");
        let annotation = existing.into_annotation(1);
        assert_eq!(annotation.rect, Rect::new(40.0, 10.0, 10.0, 20.0));
    }
}
