//! pgtk - input-method plumbing for an editor's GTK windowing backend
//!
//! This crate ties the pieces together:
//! - `pgtk_core`: frame table, input-method session, preedit rendering
//! - `pgtk_gtk4`: the GTK4 context, display and cairo surface conversion
//! - `editor`: a minimal host buffer that consumes the input queue

pub mod editor;

// Re-export main types for convenience
pub use editor::EditorBuffer;
pub use pgtk_gtk4::{to_surface, GtkDisplay, GtkToolkit};
pub use pgtk_core::{FrameId, InputEvent, PgtkConfig, PgtkError, PgtkResult, PreeditImage};
