pub mod clipboard;
pub mod controller;
pub mod input;
pub mod session;
pub mod shortcuts;

pub use clipboard::{Clipboard, ElementSnapshot, PASTE_STEP};
pub use controller::{DragAction, DragController, RESIZE_FLOOR};
pub use input::{InputEvent, Modifiers};
pub use session::Session;
pub use shortcuts::{ShortcutAction, ShortcutMap};
