pub mod dispatch;
pub mod error;
pub mod id;
pub mod model;
pub mod stage;

pub use dispatch::{Event, HandlerRegistry};
pub use error::StageError;
pub use id::Ident;
pub use model::{Element, Geometry, Placement};
pub use stage::{DEFAULT_LAYER, Layer, Stage};
