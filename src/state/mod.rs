pub mod event;
pub mod machine;
pub mod model;

pub use event::{InteractionEffect, PointerEvent};
pub use machine::{CanvasContext, InteractionMachine};
pub use model::{InteractionKind, InteractionState};
