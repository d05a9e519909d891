use crate::geometry::{Handle, ImagePoint, Rect};

/// Pointer gesture in progress. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Drawing {
        origin: ImagePoint,
        current: ImagePoint,
    },
    Dragging {
        id: u64,
        last: ImagePoint,
    },
    Resizing {
        id: u64,
        handle: Handle,
    },
}

impl InteractionState {
    pub const fn kind(&self) -> InteractionKind {
        match self {
            Self::Idle => InteractionKind::Idle,
            Self::Drawing { .. } => InteractionKind::Drawing,
            Self::Dragging { .. } => InteractionKind::Dragging,
            Self::Resizing { .. } => InteractionKind::Resizing,
        }
    }

    /// Rectangle being drawn, if any.
    pub fn draft(&self) -> Option<Rect> {
        match *self {
            Self::Drawing { origin, current } => Some(Rect::from_corners(origin, current)),
            _ => None,
        }
    }

    pub const fn target_id(&self) -> Option<u64> {
        match *self {
            Self::Dragging { id, .. } | Self::Resizing { id, .. } => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Idle,
    Drawing,
    Dragging,
    Resizing,
}
