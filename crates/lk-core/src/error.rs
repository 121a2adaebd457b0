use crate::id::Ident;
use thiserror::Error;

/// Errors surfaced by stage operations.
///
/// Configuration errors (unknown/duplicate/protected layer) and uniqueness
/// violations are signaled synchronously to the caller and never handled
/// inside the core. No variant is fatal to the process — each failure is
/// scoped to the operation that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("layer {0} does not exist")]
    UnknownLayer(Ident),

    #[error("layer {0} already exists")]
    LayerExists(Ident),

    #[error("cannot remove protected layer {0}")]
    ProtectedLayer(Ident),

    #[error("name \"{name}\" is not unique in layer {layer}")]
    NameTaken { name: Ident, layer: Ident },

    #[error("no element with uid {0}")]
    UnknownElement(Ident),
}
