//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Everything
//! except `ToggleMode` is meaningful only while manipulation mode is
//! enabled — that gate lives in the session, not here.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Toggle manipulation mode (⌘/Ctrl+M).
    ToggleMode,

    // ── Clipboard ──
    Copy,
    Cut,
    Paste,

    // ── Layer switching (F1–F3 → the three default layers) ──
    SwitchDocument,
    SwitchTemplate,
    SwitchPage,
}

/// Resolves key events into shortcut actions.
///
/// Platform-aware modifier detection: on macOS `meta` is ⌘, on other
/// platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the host `KeyboardEvent.key` value (e.g. `"m"`, `"F2"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        _shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd {
            return match key {
                "m" | "M" => Some(ShortcutAction::ToggleMode),
                "c" | "C" => Some(ShortcutAction::Copy),
                "x" | "X" => Some(ShortcutAction::Cut),
                "v" | "V" => Some(ShortcutAction::Paste),
                _ => None,
            };
        }

        match key {
            "F1" => Some(ShortcutAction::SwitchDocument),
            "F2" => Some(ShortcutAction::SwitchTemplate),
            "F3" => Some(ShortcutAction::SwitchPage),
            _ => None,
        }
    }
}
