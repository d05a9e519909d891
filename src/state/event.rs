use crate::geometry::{Rect, ScreenPoint};

/// Raw pointer input in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(ScreenPoint),
    Move(ScreenPoint),
    Up(ScreenPoint),
    Leave,
}

/// Side effect of feeding one pointer event through the interaction machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEffect {
    SelectionChanged(Option<u64>),
    DraftChanged(Rect),
    DraftDiscarded,
    /// A draw gesture large enough to become a pending annotation.
    DrawCompleted(Rect),
    AnnotationUpdated(u64),
}
