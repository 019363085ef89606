//! pgtk core - toolkit-agnostic half of the editor's GTK windowing backend
//!
//! Holds the per-frame table of toolkit handles and the per-display
//! input-method session that turns composition signals into committed text
//! and preedit images on the focused frame's input queue. The toolkit itself
//! is reached only through the traits in `traits`.

pub mod color;
pub mod config;
pub mod constants;
pub mod display;
pub mod dummy_backend;
pub mod error;
pub mod event;
pub mod frame;
pub mod preedit;
pub mod session;
pub mod signals;
pub mod traits;

// Re-export main types
pub use color::Rgba;
pub use config::PgtkConfig;
pub use display::DisplayInfo;
pub use error::{PgtkError, PgtkResult};
pub use event::{EventQueue, InputEvent};
pub use frame::{CursorKind, CursorSet, FontSpec, FrameColors, FrameId, FrameOutput, FrameTable,
                ScrollBar, ToolbarGeometry};
pub use preedit::{FontdueGlyphs, GlyphRenderer, Preedit, PreeditAttr, PreeditImage,
                  PreeditRenderer, PreeditString, PreeditStyle, UnderlineStyle};
pub use session::{Host, ImSession, SessionState};
pub use signals::{HandlerTable, ImEvent, ImSignal, SignalResponse};

// Re-export traits
pub use traits::*;
