//! One toolkit display connection: its frames, input-method session and queue

use tracing::{debug, info};

use crate::config::PgtkConfig;
use crate::error::{PgtkError, PgtkResult};
use crate::event::{EventQueue, InputEvent};
use crate::frame::{FrameId, FrameOutput, FrameTable};
use crate::preedit::PreeditRenderer;
use crate::session::{Host, ImSession, SessionState};
use crate::signals::{ImEvent, SignalResponse};
use crate::traits::{CursorRect, Toolkit};

pub struct DisplayInfo<T: Toolkit> {
    toolkit: T,
    frames: FrameTable<T>,
    session: ImSession<T>,
    queue: EventQueue,
    renderer: Box<dyn PreeditRenderer>,
    config: PgtkConfig,
}

impl<T: Toolkit> DisplayInfo<T> {
    /// Connect a display. Enables the input method right away when the config
    /// asks for native input.
    pub fn new(toolkit: T, renderer: Box<dyn PreeditRenderer>, config: PgtkConfig) -> PgtkResult<Self> {
        config.validate()?;
        debug!("Creating display: native input={}, preedit font={} {}px",
               config.use_native_input, config.preedit_font_family, config.preedit_font_size);

        let mut display = Self {
            toolkit,
            frames: FrameTable::new(),
            session: ImSession::new(),
            queue: EventQueue::new(),
            renderer,
            config,
        };
        if display.config.use_native_input {
            display.session.enable(&mut display.toolkit, &display.frames)?;
        }
        Ok(display)
    }

    pub fn config(&self) -> &PgtkConfig {
        &self.config
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn toolkit_mut(&mut self) -> &mut T {
        &mut self.toolkit
    }

    pub fn frames(&self) -> &FrameTable<T> {
        &self.frames
    }

    pub fn frame(&self, frame: FrameId) -> PgtkResult<&FrameOutput<T>> {
        self.frames.get(frame).ok_or(PgtkError::UnknownFrame(frame))
    }

    pub fn frame_mut(&mut self, frame: FrameId) -> PgtkResult<&mut FrameOutput<T>> {
        self.frames.get_mut(frame).ok_or(PgtkError::UnknownFrame(frame))
    }

    pub fn session(&self) -> &ImSession<T> {
        &self.session
    }

    pub fn im_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn add_frame(&mut self, frame: FrameId, output: FrameOutput<T>) {
        debug!("Realised {}", frame);
        self.frames.insert(frame, output);
    }

    /// Drop a frame's handles, taking input-method focus away from it first.
    pub fn remove_frame(&mut self, frame: FrameId) -> Option<FrameOutput<T>> {
        self.session.focus_out(frame);
        self.frames.remove(frame)
    }

    /// Toggle use of the toolkit's input-method context.
    pub fn set_use_native_im(&mut self, enable: bool) -> PgtkResult<()> {
        self.config.use_native_input = enable;
        if enable {
            self.session.enable(&mut self.toolkit, &self.frames)
        } else {
            self.session.disable(&mut self.queue);
            Ok(())
        }
    }

    pub fn focus_in(&mut self, frame: FrameId) {
        self.session.focus_in(frame, &self.frames);
    }

    pub fn focus_out(&mut self, frame: FrameId) {
        self.session.focus_out(frame);
    }

    pub fn set_cursor_location(&mut self, rect: CursorRect) {
        self.session.set_cursor_location(rect);
    }

    pub fn filter_keypress(&self, frame: FrameId) -> bool {
        self.session.filter_keypress(frame)
    }

    /// Deliver one signal emission from the toolkit.
    pub fn dispatch(&mut self, event: &ImEvent) -> SignalResponse {
        let mut host = Host {
            events: &mut self.queue,
            renderer: self.renderer.as_ref(),
        };
        self.session.dispatch(event, &mut host)
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn drain_events(&mut self) -> Vec<InputEvent> {
        self.queue.drain().collect()
    }

    /// Tear the display down, handing back events the host has not read yet.
    pub fn finish(self) -> EventQueue {
        self.session.finish();
        info!("Display finished with {} pending input events", self.queue.len());
        self.queue
    }
}
