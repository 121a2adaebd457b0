//! Element data model.
//!
//! The original design attached framework metadata directly to host visual
//! nodes. Here the element *is* the record: one `Element` entry in the
//! stage's side table owns both the framework metadata (uid, name, layer,
//! ordinal) and the visual data (tag, attributes, inline styles, markup,
//! geometry). The metadata is mirrored into the attribute map as `data-*`
//! pairs so hosts can inspect it the same way they would on a live node.

use crate::id::Ident;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};

/// Attribute keys reserved for the framework metadata mirror.
pub const DATA_ATTRIBUTES: [&str; 4] = ["data-uid", "data-name", "data-layer", "data-ordinal"];

/// Box geometry in host units. `left`/`top` only take effect for
/// absolutely placed elements; `width`/`height` always apply.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Geometry {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// How the element participates in host layout. Drags force `Absolute`;
/// paste offsetting applies only to `Absolute` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Placement {
    #[default]
    Static,
    Absolute,
}

/// A single manipulable element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Immutable, globally unique. Assigned exactly once at insertion.
    pub uid: Ident,

    /// Display name, unique within the element's current layer.
    /// Mutate through `Stage::rename` so uniqueness is enforced.
    pub name: Ident,

    /// Host tag this element renders as (e.g. `div`, `button`).
    pub tag: String,

    /// Position hint within the layer. Mutate through `Stage::set_ordinal`
    /// so the attribute mirror stays in sync.
    pub ordinal: u32,

    /// Name of the owning layer. Mutate through `Stage::set_layer` so
    /// membership migrates with it.
    pub layer: Ident,

    pub placement: Placement,
    pub geometry: Geometry,

    /// Structural attributes, including the `data-*` metadata mirror.
    pub attributes: BTreeMap<String, String>,

    /// Inline style properties (e.g. `display`, `background-color`).
    pub styles: BTreeMap<String, String>,

    /// Markup content (the original's `innerHTML`).
    pub markup: String,

    /// Event-type → handler-id bindings, resolved through the
    /// `HandlerRegistry` at dispatch time.
    pub handlers: HashMap<Ident, Ident>,

    /// Enumerable JSON-serializable custom properties.
    pub custom: BTreeMap<String, serde_json::Value>,
}

impl Element {
    /// Build a fresh element record. The default name reuses the uid's
    /// serial so `uid_7` pairs with `element_7`.
    pub fn new(tag: impl Into<String>, layer: Ident, ordinal: u32) -> Self {
        let uid = Ident::fresh("uid");
        let name = match uid.serial() {
            Some(n) => Ident::intern(&format!("element_{n}")),
            None => Ident::fresh("element"),
        };
        let mut el = Self {
            uid,
            name,
            tag: tag.into(),
            ordinal,
            layer,
            placement: Placement::default(),
            geometry: Geometry::default(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            markup: String::new(),
            handlers: HashMap::new(),
            custom: BTreeMap::new(),
        };
        el.refresh_data_attributes();
        el
    }

    /// The framework metadata as `data-*` pairs, in mirror order.
    pub fn data_attributes(&self) -> SmallVec<[(String, String); 4]> {
        let mut out = SmallVec::new();
        out.push(("data-uid".to_string(), self.uid.to_string()));
        out.push(("data-name".to_string(), self.name.to_string()));
        out.push(("data-layer".to_string(), self.layer.to_string()));
        out.push(("data-ordinal".to_string(), self.ordinal.to_string()));
        out
    }

    /// Rewrite the `data-*` mirror into the attribute map. Called after
    /// every metadata change.
    pub fn refresh_data_attributes(&mut self) {
        for (key, value) in self.data_attributes() {
            self.attributes.insert(key, value);
        }
    }

    /// Structural attributes with the framework mirror filtered out —
    /// what the clipboard snapshots.
    pub fn external_attributes(&self) -> BTreeMap<String, String> {
        self.attributes
            .iter()
            .filter(|(k, _)| !DATA_ATTRIBUTES.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Bind an event type to a registered handler id.
    pub fn bind_handler(&mut self, event_type: Ident, handler: Ident) {
        self.handlers.insert(event_type, handler);
    }
}
