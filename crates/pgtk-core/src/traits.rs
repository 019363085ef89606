use crate::error::PgtkResult;
use crate::frame::FrameId;
use crate::preedit::{PreeditImage, PreeditString};
use crate::signals::ImSignal;

/// Rectangle in frame pixel coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// The windowing toolkit a display is connected through.
///
/// Handles are opaque to the core: it stores and hands them back, nothing else.
pub trait Toolkit {
    /// Native window (or widget) an input-method context can be bound to
    type Window: Clone;
    type Cursor: Clone;
    type Context: ImContext<Window = Self::Window>;

    fn create_im_context(&mut self) -> PgtkResult<Self::Context>;
}

/// Toolkit input-method context.
///
/// Owned by exactly one session. Dropping the value releases the toolkit
/// object, so implementations put their teardown in `Drop`.
pub trait ImContext {
    type Window;

    /// Discard any composition in progress.
    fn reset(&mut self);
    fn focus_in(&mut self);
    fn focus_out(&mut self);
    fn set_client_window(&mut self, window: Option<&Self::Window>);
    /// Current preedit text, attributes and cursor.
    fn preedit_string(&self) -> PreeditString;
    /// Answer a surrounding-text request.
    fn set_surrounding(&mut self, text: &str, cursor_index: usize);
    fn set_cursor_location(&mut self, rect: CursorRect);
    /// Route the named signals of this context back into the session.
    fn connect_signals(&mut self, signals: &[ImSignal]);
}

/// The host editor's per-frame input queue
pub trait FrameEventSink {
    /// Append finalized composed text as ordinary typed input.
    fn enqueue_committed_text(&mut self, frame: FrameId, text: &str);
    /// Replace the on-screen preedit with `image`, or clear it on `None`.
    fn enqueue_preedit_image(&mut self, frame: FrameId, image: Option<PreeditImage>);
}
