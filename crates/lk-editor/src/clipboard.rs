//! In-memory clipboard: serialize selected elements, reconstruct on paste.
//!
//! Snapshots carry everything needed to rebuild a functionally equivalent
//! element: tag, external attributes (the framework `data-*` mirror is
//! excluded and regenerated), inline styles, markup, geometry, handler
//! *ids* (never code — rebinding consults the `HandlerRegistry`), and
//! JSON-serializable custom properties. Each copy overwrites the clipboard
//! wholesale; contents are read-only until paste.

use lk_core::{Element, Geometry, HandlerRegistry, Ident, Placement, Stage, StageError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::SystemTime;

/// Offset applied per pasted entry so repeated pastes of absolutely placed
/// elements never overlap exactly.
pub const PASTE_STEP: f32 = 20.0;

/// A serialized element, detached from any layer or uid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub tag: String,
    pub name: Ident,
    pub ordinal: u32,
    pub layer: Ident,
    pub placement: Placement,
    pub geometry: Geometry,
    pub attributes: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    pub markup: String,
    /// Event-type → handler-id bindings to re-establish on paste.
    pub handlers: HashMap<Ident, Ident>,
    pub custom: BTreeMap<String, serde_json::Value>,
}

impl ElementSnapshot {
    pub fn capture(el: &Element) -> Self {
        Self {
            tag: el.tag.clone(),
            name: el.name,
            ordinal: el.ordinal,
            layer: el.layer,
            placement: el.placement,
            geometry: el.geometry,
            attributes: el.external_attributes(),
            styles: el.styles.clone(),
            markup: el.markup.clone(),
            handlers: el.handlers.clone(),
            custom: el.custom.clone(),
        }
    }
}

/// The clipboard: an ordered snapshot sequence plus provenance.
#[derive(Debug, Default)]
pub struct Clipboard {
    pub entries: Vec<ElementSnapshot>,
    pub source_layer: Option<Ident>,
    pub timestamp: Option<SystemTime>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot `selection` in order, replacing any prior contents.
    /// No-op when the selection is empty (prior contents survive).
    pub fn copy(&mut self, stage: &Stage, selection: &[Ident]) {
        if selection.is_empty() {
            return;
        }
        self.entries = selection
            .iter()
            .filter_map(|uid| stage.element(*uid))
            .map(ElementSnapshot::capture)
            .collect();
        self.source_layer = Some(stage.active_layer);
        self.timestamp = Some(SystemTime::now());
    }

    /// Copy, then remove every selected element from its layer and the
    /// stage. The caller is responsible for clearing the selection.
    pub fn cut(&mut self, stage: &mut Stage, selection: &[Ident]) {
        if selection.is_empty() {
            return;
        }
        self.copy(stage, selection);
        for uid in selection {
            stage.remove(*uid);
        }
    }

    /// Reconstruct every entry in order into `target` (default: the active
    /// layer). Names are collision-avoided; handler ids unknown to the
    /// registry are logged and skipped without aborting the element or the
    /// rest of the paste. Returns the new uids so the session can select
    /// them. No-op (empty result) when the clipboard is empty.
    pub fn paste(
        &self,
        stage: &mut Stage,
        registry: &HandlerRegistry,
        target: Option<Ident>,
    ) -> Result<Vec<Ident>, StageError> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        let target = target.unwrap_or(stage.active_layer);
        let mut pasted = Vec::with_capacity(self.entries.len());

        for (index, entry) in self.entries.iter().enumerate() {
            let uid = stage.insert(entry.tag.clone(), target)?;
            let name = stage.vacant_element_name(entry.name.as_str(), target);
            stage.rename(uid, name)?;

            let Some(el) = stage.element_mut(uid) else {
                continue;
            };
            for (key, value) in &entry.attributes {
                el.attributes.insert(key.clone(), value.clone());
            }
            el.styles = entry.styles.clone();
            el.markup = entry.markup.clone();
            el.placement = entry.placement;
            el.geometry = entry.geometry;
            el.custom = entry.custom.clone();

            for (event_type, handler) in &entry.handlers {
                if registry.contains(*handler) {
                    el.handlers.insert(*event_type, *handler);
                } else {
                    log::warn!(
                        "skipping unknown handler {handler} for {event_type} on pasted {name}"
                    );
                }
            }

            if el.placement == Placement::Absolute {
                let offset = (index + 1) as f32 * PASTE_STEP;
                el.geometry.left += offset;
                el.geometry.top += offset;
            }

            pasted.push(uid);
        }
        Ok(pasted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> Ident {
        Ident::intern(s)
    }

    fn sample_stage() -> (Stage, Ident) {
        let mut stage = Stage::new();
        stage.active_layer = ident("page");
        let uid = stage.insert("button", ident("page")).unwrap();
        stage.rename(uid, ident("btn1")).unwrap();
        let el = stage.element_mut(uid).unwrap();
        el.attributes.insert("role".into(), "button".into());
        el.styles.insert("color".into(), "blue".into());
        el.markup = "<span>Go</span>".into();
        el.placement = Placement::Absolute;
        el.geometry = Geometry::new(10.0, 20.0, 80.0, 30.0);
        el.custom.insert("badge".into(), serde_json::json!(7));
        el.bind_handler(ident("click"), ident("on_go"));
        (stage, uid)
    }

    #[test]
    fn copy_with_empty_selection_keeps_prior_contents() {
        let (stage, uid) = sample_stage();
        let mut clipboard = Clipboard::new();
        clipboard.copy(&stage, &[uid]);
        assert_eq!(clipboard.entries.len(), 1);

        clipboard.copy(&stage, &[]);
        assert_eq!(clipboard.entries.len(), 1);
    }

    #[test]
    fn copy_records_source_layer_and_timestamp() {
        let (stage, uid) = sample_stage();
        let mut clipboard = Clipboard::new();
        clipboard.copy(&stage, &[uid]);
        assert_eq!(clipboard.source_layer, Some(ident("page")));
        assert!(clipboard.timestamp.is_some());
    }

    #[test]
    fn snapshot_excludes_framework_attributes() {
        let (stage, uid) = sample_stage();
        let entry = ElementSnapshot::capture(stage.element(uid).unwrap());
        assert_eq!(entry.attributes.get("role"), Some(&"button".to_string()));
        assert!(!entry.attributes.keys().any(|k| k.starts_with("data-")));
    }

    #[test]
    fn paste_into_other_layer_reconstructs_equivalent_element() {
        let (mut stage, uid) = sample_stage();
        let registry = {
            let mut r = HandlerRegistry::new();
            r.register(ident("on_go"), |_| {});
            r
        };
        let mut clipboard = Clipboard::new();
        clipboard.copy(&stage, &[uid]);

        let pasted = clipboard
            .paste(&mut stage, &registry, Some(ident("template")))
            .unwrap();
        assert_eq!(pasted.len(), 1);
        let copy = stage.element(pasted[0]).unwrap();
        let original = stage.element(uid).unwrap();

        assert_ne!(copy.uid, original.uid);
        // No collision in the empty target layer: base name kept.
        assert_eq!(copy.name, ident("btn1"));
        assert_eq!(copy.layer, ident("template"));
        assert_eq!(copy.styles, original.styles);
        assert_eq!(copy.markup, original.markup);
        assert_eq!(copy.custom, original.custom);
        assert_eq!(copy.attributes.get("role"), original.attributes.get("role"));
        assert_eq!(copy.handlers.get(&ident("click")), Some(&ident("on_go")));
        // Original untouched in its own layer.
        assert_eq!(stage.members(ident("page")), [uid]);
    }

    #[test]
    fn paste_suffixes_name_on_collision() {
        let (mut stage, uid) = sample_stage();
        let registry = HandlerRegistry::new();
        let mut clipboard = Clipboard::new();
        clipboard.copy(&stage, &[uid]);

        let first = clipboard.paste(&mut stage, &registry, None).unwrap();
        let second = clipboard.paste(&mut stage, &registry, None).unwrap();
        assert_eq!(stage.element(first[0]).unwrap().name, ident("btn1_1"));
        assert_eq!(stage.element(second[0]).unwrap().name, ident("btn1_2"));
    }

    #[test]
    fn paste_offsets_absolute_entries() {
        let (mut stage, uid) = sample_stage();
        let registry = HandlerRegistry::new();
        let mut clipboard = Clipboard::new();
        clipboard.copy(&stage, &[uid]);

        let pasted = clipboard
            .paste(&mut stage, &registry, Some(ident("template")))
            .unwrap();
        let g = stage.element(pasted[0]).unwrap().geometry;
        assert_eq!((g.left, g.top), (30.0, 40.0));
    }

    #[test]
    fn paste_does_not_offset_static_entries() {
        let (mut stage, uid) = sample_stage();
        stage.element_mut(uid).unwrap().placement = Placement::Static;
        let registry = HandlerRegistry::new();
        let mut clipboard = Clipboard::new();
        clipboard.copy(&stage, &[uid]);

        let pasted = clipboard
            .paste(&mut stage, &registry, Some(ident("template")))
            .unwrap();
        let g = stage.element(pasted[0]).unwrap().geometry;
        assert_eq!((g.left, g.top), (10.0, 20.0));
    }

    #[test]
    fn unknown_handler_is_skipped_not_fatal() {
        let (mut stage, uid) = sample_stage();
        let registry = HandlerRegistry::new(); // "on_go" never registered
        let mut clipboard = Clipboard::new();
        clipboard.copy(&stage, &[uid]);

        let pasted = clipboard
            .paste(&mut stage, &registry, Some(ident("template")))
            .unwrap();
        let copy = stage.element(pasted[0]).unwrap();
        assert!(copy.handlers.is_empty());
        // The rest of the element still came through.
        assert_eq!(copy.markup, "<span>Go</span>");
    }

    #[test]
    fn cut_then_paste_restores_equivalent_elements() {
        let (mut stage, uid) = sample_stage();
        let registry = HandlerRegistry::new();
        let mut clipboard = Clipboard::new();

        clipboard.cut(&mut stage, &[uid]);
        assert!(stage.element(uid).is_none());
        assert!(stage.members(ident("page")).is_empty());

        let pasted = clipboard.paste(&mut stage, &registry, None).unwrap();
        let restored = stage.element(pasted[0]).unwrap();
        assert_eq!(restored.name, ident("btn1"));
        assert_eq!(restored.markup, "<span>Go</span>");
        assert_eq!(stage.members(ident("page")), [pasted[0]]);
    }

    #[test]
    fn paste_empty_clipboard_is_noop() {
        let mut stage = Stage::new();
        let registry = HandlerRegistry::new();
        let clipboard = Clipboard::new();
        let pasted = clipboard.paste(&mut stage, &registry, None).unwrap();
        assert!(pasted.is_empty());
    }

    #[test]
    fn snapshot_json_roundtrip() {
        let (stage, uid) = sample_stage();
        let entry = ElementSnapshot::capture(stage.element(uid).unwrap());
        let json = serde_json::to_string(&entry).unwrap();
        let back: ElementSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, entry.name);
        assert_eq!(back.styles, entry.styles);
        assert_eq!(back.handlers, entry.handlers);
    }
}
