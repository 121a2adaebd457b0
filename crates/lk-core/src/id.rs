use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for identifiers — fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned identifier.
///
/// One symbol type covers every identifier space in the framework: element
/// uids, element names, layer names, event types, and handler ids.
/// Internally a `Spur` index — 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident(Spur);

impl Ident {
    /// Intern a new string as an Ident, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        Ident(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a unique id with a prefix (e.g. `uid_1`, `layer_2`).
    pub fn fresh(prefix: &str) -> Self {
        Self::intern(&format!("{prefix}_{}", next_serial()))
    }

    /// The numeric suffix of a `fresh` id, if present.
    pub fn serial(&self) -> Option<u64> {
        self.as_str().rsplit('_').next()?.parse().ok()
    }
}

/// Process-wide monotonic counter backing `Ident::fresh`.
fn next_serial() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.as_str())
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Ident {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Ident {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Ident::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = Ident::intern("page");
        let b = Ident::intern("page");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "page");
    }

    #[test]
    fn fresh_ids_are_unique() {
        let a = Ident::fresh("uid");
        let b = Ident::fresh("uid");
        assert_ne!(a, b);
    }

    #[test]
    fn serial_parses_suffix() {
        let a = Ident::fresh("uid");
        let n = a.serial().unwrap();
        assert_eq!(a.as_str(), format!("uid_{n}"));
        assert_eq!(Ident::intern("document").serial(), None);
    }
}
