//! The manipulation session.
//!
//! One explicit application-state struct owns everything the original kept
//! as ambient globals: the stage, the handler registry, the selection/drag
//! controller, the clipboard, and the mode flag. All operations run
//! synchronously on the host's event loop; the only dynamic resource is
//! the drag session itself, which lives strictly between pointer-down and
//! pointer-up inside the controller.

use crate::clipboard::Clipboard;
use crate::controller::DragController;
use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use lk_core::dispatch;
use lk_core::{Event, HandlerRegistry, Ident, Stage, StageError};

/// Top-level framework state: mode flag plus every mutable subsystem.
pub struct Session {
    pub stage: Stage,
    pub registry: HandlerRegistry,
    pub controller: DragController,
    pub clipboard: Clipboard,
    /// Manipulation mode. While on, pointer events drive the controller
    /// and layered dispatch is suppressed; while off, the reverse.
    enabled: bool,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stage: Stage::new(),
            registry: HandlerRegistry::new(),
            controller: DragController::new(),
            clipboard: Clipboard::new(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // ─── Mode & layers ───────────────────────────────────────────────────

    /// Toggle manipulation mode. Enabling shows only the active layer;
    /// disabling clears the selection and restores every layer's
    /// visibility.
    pub fn toggle_mode(&mut self) {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.controller.clear();
        }
        self.apply_visibility();
        log::debug!("manipulation mode {}", if self.enabled { "on" } else { "off" });
    }

    /// Switch the active layer. Unknown names are ignored. The selection
    /// is cleared either way; while the mode is on, only the new active
    /// layer stays visible.
    pub fn switch_layer(&mut self, name: Ident) {
        if self.stage.layer(name).is_none() {
            log::debug!("ignoring switch to unknown layer {name}");
            return;
        }
        self.stage.active_layer = name;
        self.controller.clear();
        self.apply_visibility();
    }

    /// Mirror mode/active-layer state into each element's `display` style,
    /// the way the host would show or hide whole layers.
    fn apply_visibility(&mut self) {
        let active = self.stage.active_layer;
        let hidden_members: Vec<(Ident, bool)> = self
            .stage
            .layer_names()
            .iter()
            .flat_map(|layer| {
                let hide = self.enabled && *layer != active;
                self.stage
                    .members(*layer)
                    .iter()
                    .map(move |uid| (*uid, hide))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (uid, hide) in hidden_members {
            if let Some(el) = self.stage.element_mut(uid) {
                if hide {
                    el.styles.insert("display".into(), "none".into());
                } else {
                    el.styles.remove("display");
                }
            }
        }
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed a normalized input event. `hit` is the host's pointer-target
    /// resolution (the identified element under the pointer, if any).
    /// Returns true when the framework consumed the event.
    pub fn handle_input(&mut self, event: &InputEvent, hit: Option<Ident>) -> bool {
        match event {
            InputEvent::Key { key, modifiers } => self.handle_key(key, *modifiers),
            _ if !self.enabled => false,
            InputEvent::PointerDown { x, y, modifiers } => {
                self.controller
                    .pointer_down(&mut self.stage, hit, *x, *y, *modifiers);
                true
            }
            InputEvent::PointerMove { x, y, .. } => {
                self.controller.pointer_move(&mut self.stage, *x, *y);
                true
            }
            InputEvent::PointerUp { .. } => {
                self.controller.pointer_up();
                true
            }
        }
    }

    /// Keyboard entry point. Mode toggle works anywhere; every other
    /// shortcut only while manipulation mode is enabled.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> bool {
        let Some(action) = ShortcutMap::resolve(
            key,
            modifiers.ctrl,
            modifiers.shift,
            modifiers.alt,
            modifiers.meta,
        ) else {
            return false;
        };

        if action == ShortcutAction::ToggleMode {
            self.toggle_mode();
            return true;
        }
        if !self.enabled {
            return false;
        }

        match action {
            ShortcutAction::Copy => self.copy(),
            ShortcutAction::Cut => self.cut(),
            ShortcutAction::Paste => {
                if let Err(err) = self.paste(None) {
                    log::warn!("paste failed: {err}");
                }
            }
            ShortcutAction::SwitchDocument => self.switch_layer(Ident::intern("document")),
            ShortcutAction::SwitchTemplate => self.switch_layer(Ident::intern("template")),
            ShortcutAction::SwitchPage => self.switch_layer(Ident::intern("page")),
            ShortcutAction::ToggleMode => unreachable!("handled above"),
        }
        true
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    pub fn copy(&mut self) {
        self.clipboard.copy(&self.stage, &self.controller.selected);
    }

    pub fn cut(&mut self) {
        let selection: Vec<Ident> = self.controller.selected.to_vec();
        if selection.is_empty() {
            return;
        }
        self.clipboard.cut(&mut self.stage, &selection);
        self.controller.clear();
    }

    /// Paste into `target` (default: the active layer), replacing the
    /// selection with the pasted elements. Empty clipboard is a no-op.
    pub fn paste(&mut self, target: Option<Ident>) -> Result<Vec<Ident>, StageError> {
        let pasted = self
            .clipboard
            .paste(&mut self.stage, &self.registry, target)?;
        if !pasted.is_empty() {
            self.controller.select_all(pasted.iter().copied());
        }
        Ok(pasted)
    }

    // ─── Dispatch ────────────────────────────────────────────────────────

    /// Run layered event resolution — only while manipulation mode is off.
    /// While the mode is on the framework owns pointer input and every
    /// event is reported unhandled.
    pub fn dispatch_event(&self, event: &Event) -> bool {
        if self.enabled {
            return false;
        }
        dispatch::dispatch(&self.stage, &self.registry, event)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> Ident {
        Ident::intern(s)
    }

    fn session_with_elements() -> (Session, Ident, Ident) {
        let mut session = Session::new();
        let a = session.stage.insert("div", ident("page")).unwrap();
        let b = session.stage.insert("div", ident("template")).unwrap();
        (session, a, b)
    }

    #[test]
    fn toggle_on_hides_inactive_layers() {
        let (mut session, a, b) = session_with_elements();
        session.switch_layer(ident("page"));
        session.toggle_mode();

        assert!(session.is_enabled());
        assert!(session.stage.element(a).unwrap().styles.get("display").is_none());
        assert_eq!(
            session.stage.element(b).unwrap().styles.get("display"),
            Some(&"none".to_string())
        );
    }

    #[test]
    fn toggle_off_clears_selection_and_restores_visibility() {
        let (mut session, a, b) = session_with_elements();
        session.switch_layer(ident("page"));
        session.toggle_mode();
        session
            .controller
            .pointer_down(&mut session.stage, Some(a), 0.0, 0.0, Modifiers::NONE);
        session.controller.pointer_up();
        assert!(!session.controller.selected.is_empty());

        session.toggle_mode();
        assert!(session.controller.selected.is_empty());
        assert!(session.stage.element(b).unwrap().styles.get("display").is_none());
    }

    #[test]
    fn switch_layer_clears_selection() {
        let (mut session, a, _) = session_with_elements();
        session.switch_layer(ident("page"));
        session.toggle_mode();
        session.handle_input(
            &InputEvent::PointerDown {
                x: 0.0,
                y: 0.0,
                modifiers: Modifiers::NONE,
            },
            Some(a),
        );
        assert!(!session.controller.selected.is_empty());

        session.switch_layer(ident("template"));
        assert!(session.controller.selected.is_empty());
        assert_eq!(session.stage.active_layer, ident("template"));
    }

    #[test]
    fn switch_to_unknown_layer_is_ignored() {
        let (mut session, ..) = session_with_elements();
        session.switch_layer(ident("page"));
        session.switch_layer(ident("missing"));
        assert_eq!(session.stage.active_layer, ident("page"));
    }

    #[test]
    fn pointer_input_ignored_while_mode_off() {
        let (mut session, a, _) = session_with_elements();
        let consumed = session.handle_input(
            &InputEvent::PointerDown {
                x: 0.0,
                y: 0.0,
                modifiers: Modifiers::NONE,
            },
            Some(a),
        );
        assert!(!consumed);
        assert!(session.controller.selected.is_empty());
    }

    #[test]
    fn dispatch_suppressed_while_mode_on() {
        let (mut session, a, _) = session_with_elements();
        session
            .stage
            .element_mut(a)
            .unwrap()
            .bind_handler(ident("click"), ident("on_click"));
        session.registry.register(ident("on_click"), |_| {});

        let event = Event::new(ident("click"), Some(a));
        assert!(session.dispatch_event(&event));

        session.toggle_mode();
        assert!(!session.dispatch_event(&event));
    }

    #[test]
    fn clipboard_shortcuts_gated_by_mode() {
        let (mut session, a, _) = session_with_elements();
        session.switch_layer(ident("page"));
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };

        // Mode off: Ctrl+C not handled.
        assert!(!session.handle_key("c", ctrl));

        // Ctrl+M toggles, then the rest works.
        assert!(session.handle_key("m", ctrl));
        session
            .controller
            .pointer_down(&mut session.stage, Some(a), 0.0, 0.0, Modifiers::NONE);
        session.controller.pointer_up();
        assert!(session.handle_key("c", ctrl));
        assert_eq!(session.clipboard.entries.len(), 1);
    }

    #[test]
    fn function_keys_switch_default_layers() {
        let (mut session, ..) = session_with_elements();
        session.toggle_mode();
        session.handle_key("F3", Modifiers::NONE);
        assert_eq!(session.stage.active_layer, ident("page"));
        session.handle_key("F2", Modifiers::NONE);
        assert_eq!(session.stage.active_layer, ident("template"));
        session.handle_key("F1", Modifiers::NONE);
        assert_eq!(session.stage.active_layer, ident("document"));
    }

    #[test]
    fn paste_replaces_selection_with_pasted() {
        let (mut session, a, _) = session_with_elements();
        session.switch_layer(ident("page"));
        session.toggle_mode();
        session
            .controller
            .pointer_down(&mut session.stage, Some(a), 0.0, 0.0, Modifiers::NONE);
        session.controller.pointer_up();
        session.copy();

        let pasted = session.paste(None).unwrap();
        assert_eq!(session.controller.selected.as_slice(), pasted.as_slice());
        assert!(!session.controller.is_selected(a));
    }
}
