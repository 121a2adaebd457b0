//! Layered event dispatch.
//!
//! Handlers are statically registered callables addressed by stable ids;
//! elements and layer fallback tables bind event types to those ids only.
//! Resolution is an explicit prioritized chain: the element's own binding,
//! then its layer's fallback table, then each next layer in the hierarchy
//! chain (page → template → document for the defaults), first match wins.
//! Unresolved events are left unhandled.
//!
//! The manipulation-mode gate lives in the editor session — while the mode
//! is on, this resolver is never consulted.

use crate::id::Ident;
use crate::stage::Stage;
use std::collections::HashMap;
use std::fmt;

/// An event delivered to the dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    pub event_type: Ident,
    /// The element the event targets, if any.
    pub target: Option<Ident>,
}

impl Event {
    pub fn new(event_type: Ident, target: Option<Ident>) -> Self {
        Self { event_type, target }
    }
}

type Handler = Box<dyn Fn(&Event)>;

/// Registry of handler callables, addressed by stable ids.
///
/// Replaces stored handler source text: clipboard and layer tables carry
/// only ids, and rebinding succeeds exactly when the id is still
/// registered here.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<Ident, Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callable under `id`, replacing any previous one.
    pub fn register<F: Fn(&Event) + 'static>(&mut self, id: Ident, handler: F) {
        self.handlers.insert(id, Box::new(handler));
    }

    pub fn unregister(&mut self, id: Ident) -> bool {
        self.handlers.remove(&id).is_some()
    }

    pub fn contains(&self, id: Ident) -> bool {
        self.handlers.contains_key(&id)
    }

    /// Invoke the handler registered under `id`. Returns false (and logs)
    /// when the id is unknown.
    pub fn invoke(&self, id: Ident, event: &Event) -> bool {
        match self.handlers.get(&id) {
            Some(handler) => {
                handler(event);
                true
            }
            None => {
                log::warn!("no handler registered for id {id}");
                false
            }
        }
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Resolve the handler id for `event_type` on `element` without invoking it.
///
/// Chain: element binding → own layer fallback → each next layer in the
/// hierarchy chain, starting just past the element's own layer.
pub fn resolve(stage: &Stage, element: Ident, event_type: Ident) -> Option<Ident> {
    let el = stage.element(element)?;

    if let Some(id) = el.handlers.get(&event_type) {
        return Some(*id);
    }

    let chain = stage.hierarchy();
    let own = chain.iter().position(|name| *name == el.layer)?;
    for name in &chain[own..] {
        if let Some(layer) = stage.layer(*name)
            && let Some(id) = layer.fallbacks.get(&event_type)
        {
            return Some(*id);
        }
    }
    None
}

/// Resolve and invoke. Returns whether any handler ran.
pub fn dispatch(stage: &Stage, registry: &HandlerRegistry, event: &Event) -> bool {
    let Some(target) = event.target else {
        return false;
    };
    match resolve(stage, target, event.event_type) {
        Some(id) => registry.invoke(id, event),
        None => false,
    }
}
