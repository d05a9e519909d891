use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutKey {
    Character(char),
    Delete,
    Escape,
    ArrowLeft,
    ArrowRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ShortcutModifiers {
    pub ctrl: bool,
    /// Cmd on macOS; accepted wherever ctrl is.
    pub meta: bool,
}

impl ShortcutModifiers {
    pub const fn new(ctrl: bool, meta: bool) -> Self {
        Self { ctrl, meta }
    }

    const fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputContext {
    pub label_dialog_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    DeleteSelection,
    /// Cancel an in-progress draw and clear the selection.
    Cancel,
    Save,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    NavigatePrevious,
    NavigateNext,
    CancelLabel,
}

fn resolve_label_dialog_shortcut(key: ShortcutKey) -> Option<ShortcutAction> {
    match key {
        ShortcutKey::Escape => Some(ShortcutAction::CancelLabel),
        _ => None,
    }
}

fn resolve_canvas_shortcut(key: ShortcutKey, modifiers: ShortcutModifiers) -> Option<ShortcutAction> {
    match (key, modifiers.command()) {
        (ShortcutKey::Character('s'), true) => Some(ShortcutAction::Save),
        (ShortcutKey::Delete, _) => Some(ShortcutAction::DeleteSelection),
        (ShortcutKey::Escape, _) => Some(ShortcutAction::Cancel),
        (ShortcutKey::ArrowLeft, _) => Some(ShortcutAction::NavigatePrevious),
        (ShortcutKey::ArrowRight, _) => Some(ShortcutAction::NavigateNext),
        (ShortcutKey::Character('+' | '='), false) => Some(ShortcutAction::ZoomIn),
        (ShortcutKey::Character('-' | '_'), false) => Some(ShortcutAction::ZoomOut),
        (ShortcutKey::Character('0'), false) => Some(ShortcutAction::ResetZoom),
        _ => None,
    }
}

pub fn resolve_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
    context: InputContext,
) -> Option<ShortcutAction> {
    if context.label_dialog_open {
        return resolve_label_dialog_shortcut(key);
    }

    resolve_canvas_shortcut(key, modifiers)
}
