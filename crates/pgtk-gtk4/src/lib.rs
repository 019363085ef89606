//! pgtk GTK4 - binds the pgtk-core input-method session to GTK4
//!
//! `GtkDisplay` owns the core `DisplayInfo` behind an `Rc<RefCell<_>>` and
//! registers `DrawingArea`s as frames. Each frame gets focus and key
//! controllers that drive a shared `IMMulticontext`; the context's signals are
//! routed back into the core handler table, and the host drains committed text
//! and preedit images from the display's queue.

mod context;
mod display;
mod texture;

pub use context::{preedit_from_pango, GtkImContext, GtkToolkit, SharedDisplay};
pub use display::GtkDisplay;
pub use texture::to_surface;

// Re-export pgtk-core types for convenience
pub use pgtk_core::*;
