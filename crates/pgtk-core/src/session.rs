//! Per-display input-method session
//!
//! Owns the toolkit input-method context of one display and routes its
//! signals to the focused frame. All entry points run on the toolkit's
//! dispatch thread and never block. Events that arrive without a context or
//! without a focused frame are dropped; the next focus-in or enable brings
//! toolkit and session back in line.

use tracing::{debug, info, trace, warn};

use crate::error::PgtkResult;
use crate::frame::{FrameId, FrameTable};
use crate::preedit::{Preedit, PreeditRenderer};
use crate::signals::{HandlerTable, ImEvent, ImSignal, SignalResponse};
use crate::traits::{CursorRect, FrameEventSink, ImContext, Toolkit};

/// Where handlers deliver their output
pub struct Host<'a> {
    pub events: &'a mut dyn FrameEventSink,
    pub renderer: &'a dyn PreeditRenderer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Disabled,
    EnabledUnfocused,
    EnabledFocused,
    /// Focused, with a preedit run in progress
    Composing,
}

pub struct ImSession<T: Toolkit> {
    context: Option<T::Context>,
    handlers: Option<HandlerTable<T>>,
    focused: Option<FrameId>,
    preedit: Option<Preedit>,
}

impl<T: Toolkit> Default for ImSession<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Toolkit> ImSession<T> {
    /// Session with no context, no focused frame and no preedit.
    pub fn new() -> Self {
        Self {
            context: None,
            handlers: None,
            focused: None,
            preedit: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.context.is_some()
    }

    pub fn context(&self) -> Option<&T::Context> {
        self.context.as_ref()
    }

    pub fn focused_frame(&self) -> Option<FrameId> {
        self.focused
    }

    pub fn preedit(&self) -> Option<&Preedit> {
        self.preedit.as_ref()
    }

    pub fn state(&self) -> SessionState {
        match (&self.context, self.focused, &self.preedit) {
            (None, _, _) => SessionState::Disabled,
            (Some(_), None, _) => SessionState::EnabledUnfocused,
            (Some(_), Some(_), None) => SessionState::EnabledFocused,
            (Some(_), Some(_), Some(_)) => SessionState::Composing,
        }
    }

    /// Create the context and install the handler table. No-op when enabled.
    pub fn enable(&mut self, toolkit: &mut T, frames: &FrameTable<T>) -> PgtkResult<()> {
        if self.context.is_some() {
            trace!("Input-method context already enabled");
            return Ok(());
        }

        let mut context = toolkit.create_im_context()?;
        let handlers = HandlerTable::standard();
        context.connect_signals(&handlers.signals());

        self.context = Some(context);
        self.handlers = Some(handlers);
        info!("Input-method context enabled");

        if let Some(frame) = self.focused {
            self.focus_in(frame, frames);
        }
        Ok(())
    }

    /// Tear the context down and forget any composition. No-op when disabled.
    ///
    /// A preedit shown on the focused frame is cleared through `events`; the
    /// toolkit's own preedit-end from `reset` cannot reach the handlers here.
    pub fn disable(&mut self, events: &mut dyn FrameEventSink) {
        let Some(mut context) = self.context.take() else {
            trace!("Input-method context already disabled");
            return;
        };

        context.reset();
        context.focus_out();
        context.set_client_window(None);
        drop(context);

        if let (Some(frame), Some(_)) = (self.focused, self.preedit.take()) {
            events.enqueue_preedit_image(frame, None);
        }
        self.handlers = None;
        info!("Input-method context disabled");
    }

    /// Record `frame` as focused and, with a context, bind it to the frame.
    pub fn focus_in(&mut self, frame: FrameId, frames: &FrameTable<T>) {
        if let Some(context) = self.context.as_mut() {
            context.reset();
            self.preedit = None;

            let window = frames.window_of(frame);
            if window.is_none() {
                debug!("Focused {} has no native window yet", frame);
            }
            context.set_client_window(window);
            context.focus_in();
        }
        self.focused = Some(frame);
        debug!("Input-method focus in: {}", frame);
    }

    /// Forget the focused frame, but only if it is `frame`.
    pub fn focus_out(&mut self, frame: FrameId) {
        if self.focused != Some(frame) {
            trace!("Ignoring focus out of unfocused {}", frame);
            return;
        }

        if let Some(context) = self.context.as_mut() {
            context.focus_out();
            context.set_client_window(None);
        }
        self.focused = None;
        debug!("Input-method focus out: {}", frame);
    }

    /// Tell the toolkit where the text cursor of the focused frame is.
    pub fn set_cursor_location(&mut self, rect: CursorRect) {
        if self.focused.is_none() {
            return;
        }
        if let Some(context) = self.context.as_mut() {
            context.set_cursor_location(rect);
        }
    }

    /// Whether key events for `frame` should go through the context first.
    pub fn filter_keypress(&self, frame: FrameId) -> bool {
        self.context.is_some() && self.focused == Some(frame)
    }

    /// Route one signal emission through the installed handler table.
    pub fn dispatch(&mut self, event: &ImEvent, host: &mut Host<'_>) -> SignalResponse {
        let handler = self
            .handlers
            .as_ref()
            .and_then(|table| table.get(event.signal()));

        match handler {
            Some(handler) => handler(self, event, host),
            None => {
                trace!("Dropping {} without an input-method context", event.signal());
                SignalResponse::Ignored
            }
        }
    }

    /// Release everything. The session cannot be used afterwards.
    pub fn finish(mut self) {
        if self.context.take().is_some() {
            debug!("Released input-method context at display teardown");
        }
        self.handlers = None;
        self.preedit = None;
    }

    /// Focused frame, when there is also a context to take input from.
    fn target(&self) -> Option<FrameId> {
        self.context.as_ref().and(self.focused)
    }
}

impl<T: Toolkit> HandlerTable<T> {
    /// The handlers every session installs.
    pub fn standard() -> Self {
        HandlerTable::new([
            (ImSignal::Commit, on_commit::<T>),
            (ImSignal::RetrieveSurrounding, on_retrieve_surrounding::<T>),
            (ImSignal::DeleteSurrounding, on_delete_surrounding::<T>),
            (ImSignal::PreeditChanged, on_preedit_changed::<T>),
            (ImSignal::PreeditStart, on_preedit_start::<T>),
            (ImSignal::PreeditEnd, on_preedit_end::<T>),
        ])
    }
}

fn on_commit<T: Toolkit>(session: &mut ImSession<T>, event: &ImEvent, host: &mut Host<'_>) -> SignalResponse {
    let ImEvent::Commit(text) = event else {
        return SignalResponse::Ignored;
    };
    let Some(frame) = session.target() else {
        trace!("Dropping commit {:?}: no focused frame", text);
        return SignalResponse::Ignored;
    };

    host.events.enqueue_committed_text(frame, text);
    SignalResponse::Done
}

fn on_preedit_changed<T: Toolkit>(session: &mut ImSession<T>, _event: &ImEvent, host: &mut Host<'_>) -> SignalResponse {
    let Some(frame) = session.target() else {
        return SignalResponse::Ignored;
    };
    let Some(context) = session.context.as_ref() else {
        return SignalResponse::Ignored;
    };

    let preedit = context.preedit_string().normalized();
    if preedit.is_empty() {
        host.events.enqueue_preedit_image(frame, None);
        session.preedit = None;
        return SignalResponse::Done;
    }

    match host.renderer.render(&preedit) {
        Ok(image) => host.events.enqueue_preedit_image(frame, image),
        Err(e) => warn!("Failed to render preedit {:?}: {}", preedit.text, e),
    }
    session.preedit = Some(Preedit::from(preedit));
    SignalResponse::Done
}

fn on_preedit_start<T: Toolkit>(session: &mut ImSession<T>, _event: &ImEvent, _host: &mut Host<'_>) -> SignalResponse {
    match session.target() {
        Some(_) => SignalResponse::Done,
        None => SignalResponse::Ignored,
    }
}

fn on_preedit_end<T: Toolkit>(session: &mut ImSession<T>, _event: &ImEvent, host: &mut Host<'_>) -> SignalResponse {
    session.preedit = None;
    let Some(frame) = session.target() else {
        return SignalResponse::Ignored;
    };

    host.events.enqueue_preedit_image(frame, None);
    SignalResponse::Done
}

fn on_retrieve_surrounding<T: Toolkit>(session: &mut ImSession<T>, _event: &ImEvent, _host: &mut Host<'_>) -> SignalResponse {
    // Buffer contents are not exposed to the input method
    if let Some(context) = session.context.as_mut() {
        context.set_surrounding("", 0);
    }
    SignalResponse::Handled(true)
}

fn on_delete_surrounding<T: Toolkit>(_session: &mut ImSession<T>, event: &ImEvent, _host: &mut Host<'_>) -> SignalResponse {
    if let ImEvent::DeleteSurrounding { offset, n_chars } = event {
        debug!("delete-surrounding offset={} n_chars={} not supported, reporting success", offset, n_chars);
    }
    SignalResponse::Handled(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PgtkConfig;
    use crate::error::PgtkError;
    use crate::dummy_backend::{BoxGlyphs, ContextCall, DummyToolkit};
    use crate::event::{EventQueue, InputEvent};
    use crate::frame::FrameOutput;
    use crate::preedit::{GlyphRenderer, PreeditImage, PreeditString, PreeditStyle, UnderlineStyle};

    struct Fixture {
        toolkit: DummyToolkit,
        frames: FrameTable<DummyToolkit>,
        session: ImSession<DummyToolkit>,
        queue: EventQueue,
        renderer: GlyphRenderer<BoxGlyphs>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut frames = FrameTable::new();
            frames.insert(FrameId(1), FrameOutput::with_window(101));
            frames.insert(FrameId(2), FrameOutput::with_window(102));
            Self {
                toolkit: DummyToolkit::new(),
                frames,
                session: ImSession::new(),
                queue: EventQueue::new(),
                renderer: GlyphRenderer::new(BoxGlyphs::default(), &PgtkConfig::default()),
            }
        }

        fn enable(&mut self) {
            self.session.enable(&mut self.toolkit, &self.frames).unwrap();
        }

        fn dispatch(&mut self, event: ImEvent) -> SignalResponse {
            let mut host = Host { events: &mut self.queue, renderer: &self.renderer };
            self.session.dispatch(&event, &mut host)
        }
    }

    #[test]
    fn test_new_session_is_empty() {
        let session: ImSession<DummyToolkit> = ImSession::new();
        assert!(!session.is_enabled());
        assert_eq!(session.focused_frame(), None);
        assert!(session.preedit().is_none());
        assert_eq!(session.state(), SessionState::Disabled);
    }

    #[test]
    fn test_enable_is_idempotent() {
        let mut fx = Fixture::new();
        fx.enable();
        fx.enable();
        assert!(fx.session.is_enabled());
        assert_eq!(fx.toolkit.log().created, 1);
        assert_eq!(fx.session.state(), SessionState::EnabledUnfocused);

        let connected = fx.toolkit.log().connected.clone();
        assert_eq!(connected, ImSignal::ALL.to_vec());
    }

    #[test]
    fn test_disable_is_idempotent_and_releases_once() {
        let mut fx = Fixture::new();
        fx.enable();
        fx.session.disable(&mut fx.queue);
        fx.session.disable(&mut fx.queue);
        assert!(!fx.session.is_enabled());
        assert_eq!(fx.toolkit.log().released, 1);

        let calls = fx.toolkit.log().calls.clone();
        assert_eq!(
            calls,
            vec![ContextCall::Reset, ContextCall::FocusOut, ContextCall::SetClientWindow(None)]
        );
    }

    #[test]
    fn test_enable_failure_leaves_session_disabled() {
        let mut fx = Fixture::new();
        fx.toolkit.fail_next_create();
        assert!(fx.session.enable(&mut fx.toolkit, &fx.frames).is_err());
        assert_eq!(fx.session.state(), SessionState::Disabled);

        fx.enable();
        assert!(fx.session.is_enabled());
    }

    #[test]
    fn test_enable_with_focused_frame_binds_it() {
        let mut fx = Fixture::new();
        fx.session.focus_in(FrameId(2), &fx.frames);
        fx.enable();

        assert_eq!(fx.session.state(), SessionState::EnabledFocused);
        let calls = fx.toolkit.log().calls.clone();
        assert_eq!(
            calls,
            vec![ContextCall::Reset, ContextCall::SetClientWindow(Some(102)), ContextCall::FocusIn]
        );
    }

    #[test]
    fn test_focus_in_without_context_still_records_frame() {
        let mut fx = Fixture::new();
        fx.session.focus_in(FrameId(1), &fx.frames);
        assert_eq!(fx.session.focused_frame(), Some(FrameId(1)));
        assert_eq!(fx.session.state(), SessionState::Disabled);
    }

    #[test]
    fn test_focus_out_only_for_focused_frame() {
        let mut fx = Fixture::new();
        fx.enable();
        fx.session.focus_in(FrameId(1), &fx.frames);
        fx.toolkit.clear_calls();

        fx.session.focus_out(FrameId(2));
        assert_eq!(fx.session.focused_frame(), Some(FrameId(1)));
        assert!(fx.toolkit.log().calls.is_empty());

        fx.session.focus_out(FrameId(1));
        assert_eq!(fx.session.focused_frame(), None);
        assert_eq!(
            fx.toolkit.log().calls.clone(),
            vec![ContextCall::FocusOut, ContextCall::SetClientWindow(None)]
        );
    }

    #[test]
    fn test_focus_out_without_context() {
        let mut fx = Fixture::new();
        fx.session.focus_in(FrameId(1), &fx.frames);
        fx.session.focus_out(FrameId(1));
        assert_eq!(fx.session.focused_frame(), None);
    }

    #[test]
    fn test_commit_requires_context_and_focus() {
        let mut fx = Fixture::new();

        // No context
        fx.session.focus_in(FrameId(1), &fx.frames);
        assert_eq!(fx.dispatch(ImEvent::Commit("a".into())), SignalResponse::Ignored);

        // Context, no focus
        fx.session.focus_out(FrameId(1));
        fx.enable();
        assert_eq!(fx.dispatch(ImEvent::Commit("b".into())), SignalResponse::Ignored);
        assert!(fx.queue.is_empty());

        fx.session.focus_in(FrameId(1), &fx.frames);
        assert_eq!(fx.dispatch(ImEvent::Commit("日本語".into())), SignalResponse::Done);
        assert_eq!(
            fx.queue.pop(),
            Some(InputEvent::CommittedText { frame: FrameId(1), text: "日本語".into() })
        );
    }

    #[test]
    fn test_empty_preedit_enqueues_clear() {
        let mut fx = Fixture::new();
        fx.enable();
        fx.session.focus_in(FrameId(1), &fx.frames);

        fx.toolkit.set_preedit(PreeditString::new("k"));
        fx.dispatch(ImEvent::PreeditChanged);
        assert!(fx.session.preedit().is_some());

        fx.toolkit.set_preedit(PreeditString::new(""));
        assert_eq!(fx.dispatch(ImEvent::PreeditChanged), SignalResponse::Done);
        assert!(fx.session.preedit().is_none());

        let events: Vec<_> = fx.queue.drain().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], InputEvent::Preedit { frame: FrameId(1), image: None });
    }

    #[test]
    fn test_preedit_changed_renders_and_caches() {
        let mut fx = Fixture::new();
        fx.enable();
        fx.session.focus_in(FrameId(1), &fx.frames);

        let preedit = PreeditString::new("かな")
            .with_attr(0, 6, PreeditStyle::Underline(UnderlineStyle::Single));
        fx.toolkit.set_preedit(preedit);
        fx.dispatch(ImEvent::PreeditChanged);

        assert_eq!(fx.session.state(), SessionState::Composing);
        let cached = fx.session.preedit().unwrap();
        assert_eq!(cached.text(), "かな");
        assert_eq!(cached.attrs().len(), 1);

        match fx.queue.pop() {
            Some(InputEvent::Preedit { frame, image: Some(image) }) => {
                assert_eq!(frame, FrameId(1));
                assert_eq!((image.width(), image.height()), fx.renderer.measure("かな"));
            }
            other => panic!("unexpected: {:?}", other),
        }

        // Replaced wholesale by the next update
        fx.toolkit.set_preedit(PreeditString::new("漢"));
        fx.dispatch(ImEvent::PreeditChanged);
        let cached = fx.session.preedit().unwrap();
        assert_eq!(cached.text(), "漢");
        assert!(cached.attrs().is_empty());
    }

    #[test]
    fn test_preedit_end_clears() {
        let mut fx = Fixture::new();
        fx.enable();
        fx.session.focus_in(FrameId(1), &fx.frames);
        fx.toolkit.set_preedit(PreeditString::new("x"));
        fx.dispatch(ImEvent::PreeditStart);
        fx.dispatch(ImEvent::PreeditChanged);
        fx.queue.clear();

        assert_eq!(fx.dispatch(ImEvent::PreeditEnd), SignalResponse::Done);
        assert!(fx.session.preedit().is_none());
        assert_eq!(fx.session.state(), SessionState::EnabledFocused);
        assert_eq!(fx.queue.pop(), Some(InputEvent::Preedit { frame: FrameId(1), image: None }));
    }

    struct FailingRenderer;

    impl PreeditRenderer for FailingRenderer {
        fn measure(&self, _text: &str) -> (u32, u32) {
            (0, 0)
        }

        fn render(&self, _preedit: &PreeditString) -> PgtkResult<Option<PreeditImage>> {
            Err(PgtkError::Render { message: "no glyphs".to_string() })
        }
    }

    #[test]
    fn test_render_failure_enqueues_nothing() {
        let mut fx = Fixture::new();
        fx.enable();
        fx.session.focus_in(FrameId(1), &fx.frames);
        fx.toolkit.set_preedit(PreeditString::new("ㄇ"));

        let mut host = Host { events: &mut fx.queue, renderer: &FailingRenderer };
        assert_eq!(fx.session.dispatch(&ImEvent::PreeditChanged, &mut host), SignalResponse::Done);
        assert!(fx.queue.is_empty());
        assert_eq!(fx.session.preedit().map(|p| p.text()), Some("ㄇ"));
        assert_eq!(fx.session.state(), SessionState::Composing);
    }

    #[test]
    fn test_disable_mid_composition() {
        let mut fx = Fixture::new();
        fx.enable();
        fx.session.focus_in(FrameId(1), &fx.frames);
        fx.toolkit.set_preedit(PreeditString::new("zh"));
        fx.dispatch(ImEvent::PreeditChanged);
        assert_eq!(fx.session.state(), SessionState::Composing);

        fx.queue.clear();

        fx.session.disable(&mut fx.queue);
        assert_eq!(fx.session.state(), SessionState::Disabled);
        assert!(fx.session.preedit().is_none());
        assert!(fx.session.context().is_none());
        assert_eq!(fx.queue.pop(), Some(InputEvent::Preedit { frame: FrameId(1), image: None }));
        assert!(fx.queue.is_empty());

        // Handlers are gone with the context
        assert_eq!(fx.dispatch(ImEvent::PreeditChanged), SignalResponse::Ignored);
    }

    #[test]
    fn test_disable_without_preedit_enqueues_nothing() {
        let mut fx = Fixture::new();
        fx.enable();
        fx.session.focus_in(FrameId(1), &fx.frames);
        fx.session.disable(&mut fx.queue);
        assert!(fx.queue.is_empty());
    }

    #[test]
    fn test_surrounding_text() {
        let mut fx = Fixture::new();
        fx.enable();
        fx.toolkit.clear_calls();

        assert_eq!(fx.dispatch(ImEvent::RetrieveSurrounding), SignalResponse::Handled(true));
        assert_eq!(
            fx.toolkit.log().calls.clone(),
            vec![ContextCall::SetSurrounding(String::new(), 0)]
        );

        let response = fx.dispatch(ImEvent::DeleteSurrounding { offset: -2, n_chars: 2 });
        assert_eq!(response, SignalResponse::Handled(true));
        assert!(fx.queue.is_empty());
    }

    #[test]
    fn test_cursor_location_needs_focus() {
        let mut fx = Fixture::new();
        fx.enable();
        let rect = CursorRect { x: 10, y: 20, width: 2, height: 16 };

        fx.session.set_cursor_location(rect);
        assert!(fx.toolkit.log().calls.is_empty());

        fx.session.focus_in(FrameId(1), &fx.frames);
        fx.toolkit.clear_calls();
        fx.session.set_cursor_location(rect);
        assert_eq!(fx.toolkit.log().calls.clone(), vec![ContextCall::SetCursorLocation(rect)]);
    }

    #[test]
    fn test_filter_keypress() {
        let mut fx = Fixture::new();
        fx.session.focus_in(FrameId(1), &fx.frames);
        assert!(!fx.session.filter_keypress(FrameId(1)));

        fx.enable();
        assert!(fx.session.filter_keypress(FrameId(1)));
        assert!(!fx.session.filter_keypress(FrameId(2)));
    }

    #[test]
    fn test_finish_releases_context() {
        let mut fx = Fixture::new();
        fx.enable();
        fx.session.finish();
        assert_eq!(fx.toolkit.log().released, 1);
    }
}
