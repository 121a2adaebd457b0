//! Layer registry and element side table.
//!
//! The `Stage` is the authoritative store: a map of named, ordered layers
//! and a uid → `Element` side table. Every operation that touches element
//! metadata goes through the stage so layer membership, name uniqueness,
//! and the `data-*` attribute mirror stay synchronized.

use crate::error::StageError;
use crate::id::Ident;
use crate::model::Element;
use std::collections::HashMap;

/// The protected default layer. Always present, never removable.
pub const DEFAULT_LAYER: &str = "document";

/// A named, ordered group of elements with a per-event fallback table.
#[derive(Debug, Clone)]
pub struct Layer {
    pub uid: Ident,
    pub name: Ident,
    /// Hierarchy rank. Event fallthrough walks layers by descending ordinal.
    pub ordinal: u32,
    /// Member uids in insertion order.
    pub members: Vec<Ident>,
    /// Event-type → handler-id fallbacks, consulted when an element has no
    /// binding of its own.
    pub fallbacks: HashMap<Ident, Ident>,
}

impl Layer {
    fn new(name: Ident, ordinal: u32) -> Self {
        Self {
            uid: Ident::fresh("layer"),
            name,
            ordinal,
            members: Vec::new(),
            fallbacks: HashMap::new(),
        }
    }

    /// Register a layer-level fallback handler for an event type.
    pub fn set_fallback(&mut self, event_type: Ident, handler: Ident) {
        self.fallbacks.insert(event_type, handler);
    }
}

/// The whole manipulable document: layers plus the element side table.
#[derive(Debug, Clone)]
pub struct Stage {
    layers: HashMap<Ident, Layer>,
    elements: HashMap<Ident, Element>,
    /// The layer new insertions and pastes default to.
    pub active_layer: Ident,
}

impl Stage {
    /// Create a stage with the three default layers:
    /// `document`(1) < `template`(2) < `page`(3).
    #[must_use]
    pub fn new() -> Self {
        let mut layers = HashMap::new();
        for (i, name) in [DEFAULT_LAYER, "template", "page"].iter().enumerate() {
            let name = Ident::intern(name);
            layers.insert(name, Layer::new(name, i as u32 + 1));
        }
        Self {
            layers,
            elements: HashMap::new(),
            active_layer: Ident::intern(DEFAULT_LAYER),
        }
    }

    // ─── Layer management ────────────────────────────────────────────────

    pub fn layer(&self, name: Ident) -> Option<&Layer> {
        self.layers.get(&name)
    }

    pub fn layer_mut(&mut self, name: Ident) -> Option<&mut Layer> {
        self.layers.get_mut(&name)
    }

    /// Layer names sorted by ascending ordinal (document first by default).
    pub fn layer_names(&self) -> Vec<Ident> {
        let mut names: Vec<Ident> = self.layers.keys().copied().collect();
        names.sort_by(|a, b| {
            (self.layers[a].ordinal, a.as_str()).cmp(&(self.layers[b].ordinal, b.as_str()))
        });
        names
    }

    /// The event fallthrough chain: layer names by *descending* ordinal
    /// (page → template → document for the defaults).
    pub fn hierarchy(&self) -> Vec<Ident> {
        let mut names = self.layer_names();
        names.reverse();
        names
    }

    /// Add a new empty layer. Default ordinal is one past the layer count.
    pub fn add_layer(&mut self, name: Ident, ordinal: Option<u32>) -> Result<Ident, StageError> {
        if self.layers.contains_key(&name) {
            return Err(StageError::LayerExists(name));
        }
        let ordinal = ordinal.unwrap_or(self.layers.len() as u32 + 1);
        self.layers.insert(name, Layer::new(name, ordinal));
        Ok(name)
    }

    /// Remove a layer, detaching and destroying all member elements.
    /// The `document` layer is protected. If the removed layer was active,
    /// the active layer falls back to `document`.
    pub fn remove_layer(&mut self, name: Ident) -> Result<(), StageError> {
        if name.as_str() == DEFAULT_LAYER {
            return Err(StageError::ProtectedLayer(name));
        }
        let layer = self
            .layers
            .remove(&name)
            .ok_or(StageError::UnknownLayer(name))?;
        log::debug!(
            "removing layer {name} with {} member(s)",
            layer.members.len()
        );
        for uid in layer.members {
            self.elements.remove(&uid);
        }
        if self.active_layer == name {
            self.active_layer = Ident::intern(DEFAULT_LAYER);
        }
        Ok(())
    }

    /// Deep-copy every member of `name` into a freshly named layer.
    /// Copies get new uids; names carry over (the target layer starts
    /// empty, so source names cannot collide there). Returns the new
    /// layer's name.
    pub fn duplicate_layer(&mut self, name: Ident) -> Result<Ident, StageError> {
        let source = self
            .layers
            .get(&name)
            .ok_or(StageError::UnknownLayer(name))?;
        let members = source.members.clone();

        let new_name = self.vacant_layer_name(&format!("{name}_copy"));
        self.add_layer(new_name, None)?;

        for uid in members {
            let Some(source_el) = self.elements.get(&uid) else {
                continue;
            };
            let mut clone = source_el.clone();
            clone.uid = Ident::fresh("uid");
            clone.layer = new_name;
            clone.name = self.vacant_element_name(source_el.name.as_str(), new_name);
            self.register(clone);
        }
        Ok(new_name)
    }

    // ─── Element adapter ─────────────────────────────────────────────────

    pub fn element(&self, uid: Ident) -> Option<&Element> {
        self.elements.get(&uid)
    }

    pub fn element_mut(&mut self, uid: Ident) -> Option<&mut Element> {
        self.elements.get_mut(&uid)
    }

    /// Member uids of a layer, in insertion order.
    pub fn members(&self, layer: Ident) -> &[Ident] {
        self.layers
            .get(&layer)
            .map(|l| l.members.as_slice())
            .unwrap_or(&[])
    }

    /// Create and register a fresh element in `layer`. This is the adapter
    /// `initialize`: fresh uid, generated default name, ordinal equal to
    /// 1 + current layer size.
    pub fn insert(&mut self, tag: impl Into<String>, layer: Ident) -> Result<Ident, StageError> {
        let size = self
            .layers
            .get(&layer)
            .ok_or(StageError::UnknownLayer(layer))?
            .members
            .len();
        let element = Element::new(tag, layer, size as u32 + 1);
        Ok(self.register(element))
    }

    /// Register an already-built element record, appending it to its
    /// layer's member list. The layer must exist.
    fn register(&mut self, mut element: Element) -> Ident {
        let uid = element.uid;
        element.refresh_data_attributes();
        if let Some(layer) = self.layers.get_mut(&element.layer) {
            layer.members.push(uid);
        }
        self.elements.insert(uid, element);
        uid
    }

    /// Rename an element. Fails if another element in the same layer
    /// already carries `name`; the prior name is retained on failure.
    /// Renaming to the element's own current name is a no-op.
    pub fn rename(&mut self, uid: Ident, name: Ident) -> Result<(), StageError> {
        let layer = self
            .elements
            .get(&uid)
            .ok_or(StageError::UnknownElement(uid))?
            .layer;
        if !self.name_is_vacant(name, layer, Some(uid)) {
            return Err(StageError::NameTaken { name, layer });
        }
        if let Some(element) = self.elements.get_mut(&uid) {
            element.name = name;
            element.refresh_data_attributes();
        }
        Ok(())
    }

    /// Move an element to another layer: removed from the old layer's
    /// member list and appended to the new one's.
    ///
    /// Name uniqueness in the destination layer is deliberately not
    /// re-validated here; creation paths (insert, paste, duplicate_layer)
    /// always collision-avoid, and callers that move elements between
    /// populated layers can `rename` afterwards.
    pub fn set_layer(&mut self, uid: Ident, layer: Ident) -> Result<(), StageError> {
        if !self.layers.contains_key(&layer) {
            return Err(StageError::UnknownLayer(layer));
        }
        let old = self
            .elements
            .get(&uid)
            .ok_or(StageError::UnknownElement(uid))?
            .layer;
        if old == layer {
            return Ok(());
        }
        if let Some(old_layer) = self.layers.get_mut(&old) {
            old_layer.members.retain(|m| *m != uid);
        }
        if let Some(new_layer) = self.layers.get_mut(&layer) {
            new_layer.members.push(uid);
        }
        if let Some(element) = self.elements.get_mut(&uid) {
            element.layer = layer;
            element.refresh_data_attributes();
        }
        Ok(())
    }

    /// Update an element's ordinal position hint.
    pub fn set_ordinal(&mut self, uid: Ident, ordinal: u32) -> Result<(), StageError> {
        let element = self
            .elements
            .get_mut(&uid)
            .ok_or(StageError::UnknownElement(uid))?;
        element.ordinal = ordinal;
        element.refresh_data_attributes();
        Ok(())
    }

    /// Remove an element from the stage and its layer's member list.
    pub fn remove(&mut self, uid: Ident) -> Option<Element> {
        let element = self.elements.remove(&uid)?;
        if let Some(layer) = self.layers.get_mut(&element.layer) {
            layer.members.retain(|m| *m != uid);
        }
        Some(element)
    }

    /// Clone an element into its own layer with a fresh identity.
    /// Used by shift-drag duplication. The clone keeps all visual data;
    /// its name is the source name suffixed to avoid the collision.
    pub fn clone_element(&mut self, uid: Ident) -> Result<Ident, StageError> {
        let source = self
            .elements
            .get(&uid)
            .ok_or(StageError::UnknownElement(uid))?;
        let layer = source.layer;
        let mut clone = source.clone();
        clone.uid = Ident::fresh("uid");
        clone.name = self.vacant_element_name(source.name.as_str(), layer);
        clone.ordinal = self.members(layer).len() as u32 + 1;
        Ok(self.register(clone))
    }

    // ─── Naming ──────────────────────────────────────────────────────────

    /// Whether `name` is unused in `layer`, ignoring `exclude` (the element
    /// being renamed).
    pub fn name_is_vacant(&self, name: Ident, layer: Ident, exclude: Option<Ident>) -> bool {
        self.members(layer).iter().all(|uid| {
            Some(*uid) == exclude || self.elements.get(uid).map(|e| e.name) != Some(name)
        })
    }

    /// First free name in `layer` derived from `base`: `base`, `base_1`,
    /// `base_2`, …
    pub fn vacant_element_name(&self, base: &str, layer: Ident) -> Ident {
        let mut candidate = Ident::intern(base);
        let mut counter = 1;
        while !self.name_is_vacant(candidate, layer, None) {
            candidate = Ident::intern(&format!("{base}_{counter}"));
            counter += 1;
        }
        candidate
    }

    /// First free *layer* name derived from `base`.
    fn vacant_layer_name(&self, base: &str) -> Ident {
        let mut candidate = Ident::intern(base);
        let mut counter = 1;
        while self.layers.contains_key(&candidate) {
            candidate = Ident::intern(&format!("{base}_{counter}"));
            counter += 1;
        }
        candidate
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}
