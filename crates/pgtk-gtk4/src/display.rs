//! GTK display connection: frames are drawing areas, input goes through an
//! `IMMulticontext`

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{gdk, DrawingArea, EventController, EventControllerFocus, EventControllerKey, Widget};
use tracing::{debug, warn};

use pgtk_core::{CursorKind, CursorRect, DisplayInfo, FontdueGlyphs, FrameId, FrameOutput,
                GlyphRenderer, InputEvent, PgtkConfig, PgtkError, PgtkResult, PreeditRenderer,
                SessionState};

use crate::context::{GtkToolkit, SharedDisplay, WeakDisplay};

pub struct GtkDisplay {
    inner: SharedDisplay,
    controllers: HashMap<FrameId, Vec<EventController>>,
}

impl GtkDisplay {
    /// Open a display whose preedit is drawn with the configured font.
    pub fn new(config: PgtkConfig) -> PgtkResult<Self> {
        let glyphs = FontdueGlyphs::from_config(&config)?;
        let renderer = Box::new(GlyphRenderer::new(glyphs, &config));
        Self::with_renderer(config, renderer)
    }

    pub fn with_renderer(config: PgtkConfig, renderer: Box<dyn PreeditRenderer>) -> PgtkResult<Self> {
        let native = config.use_native_input;

        // Contexts must be able to reach the display before the first one is created
        let info = DisplayInfo::new(GtkToolkit::detached(), renderer, config.with_native_input(false))?;
        let inner = Rc::new(RefCell::new(info));
        inner.borrow_mut().toolkit_mut().attach(Rc::downgrade(&inner));
        if native {
            inner.borrow_mut().set_use_native_im(true)?;
        }

        Ok(Self {
            inner,
            controllers: HashMap::new(),
        })
    }

    /// Shared handle to the underlying display state.
    pub fn shared(&self) -> SharedDisplay {
        Rc::clone(&self.inner)
    }

    pub fn im_state(&self) -> SessionState {
        self.inner.borrow().im_state()
    }

    /// Run `waker` whenever an input-method signal queued something.
    pub fn set_waker(&self, waker: impl Fn() + 'static) {
        self.inner.borrow_mut().toolkit_mut().set_waker(waker);
    }

    /// Register `area` as the window of `frame` and route its focus and key
    /// events to the input method.
    pub fn add_frame(&mut self, frame: FrameId, area: &DrawingArea) {
        let widget: Widget = area.clone().upcast();
        let mut output = FrameOutput::with_window(widget.clone());
        output.set_edit_widget(Some(widget.clone()));
        output.set_outer_widget(area.root().map(|root| root.upcast::<Widget>()));
        for kind in CursorKind::ALL {
            if let Some(cursor) = gdk::Cursor::from_name(kind.css_name(), None) {
                output.cursors_mut().set(kind, cursor);
            }
        }
        self.inner.borrow_mut().add_frame(frame, output);

        area.set_focusable(true);
        let focus = focus_controller(frame, Rc::downgrade(&self.inner));
        let keys = key_controller(frame, Rc::downgrade(&self.inner));
        area.add_controller(focus.clone());
        area.add_controller(keys.clone());
        self.controllers.insert(frame, vec![focus.upcast(), keys.upcast()]);
    }

    pub fn remove_frame(&mut self, frame: FrameId) -> PgtkResult<()> {
        let output = self.inner.borrow_mut().remove_frame(frame).ok_or(PgtkError::UnknownFrame(frame))?;
        if let (Some(widget), Some(controllers)) = (output.edit_widget(), self.controllers.remove(&frame)) {
            for controller in &controllers {
                widget.remove_controller(controller);
            }
        }
        debug!("Removed {}", frame);
        Ok(())
    }

    /// Show one of the frame's pointer shapes.
    pub fn set_cursor(&self, frame: FrameId, kind: CursorKind) -> PgtkResult<()> {
        let mut display = self.inner.borrow_mut();
        let output = display.frame_mut(frame)?;
        if let Some(widget) = output.edit_widget() {
            widget.set_cursor(output.cursors().get(kind));
        }
        output.cursors_mut().set_current(kind);
        Ok(())
    }

    pub fn set_use_native_im(&self, enable: bool) -> PgtkResult<()> {
        self.inner.borrow_mut().set_use_native_im(enable)
    }

    pub fn set_cursor_location(&self, rect: CursorRect) {
        self.inner.borrow_mut().set_cursor_location(rect);
    }

    pub fn drain_events(&self) -> Vec<InputEvent> {
        self.inner.borrow_mut().drain_events()
    }

    /// Release the input method and hand back events nobody read.
    pub fn finish(self) -> Vec<InputEvent> {
        for (frame, controllers) in &self.controllers {
            if let Ok(output) = self.inner.borrow().frame(*frame) {
                if let Some(widget) = output.edit_widget() {
                    for controller in controllers {
                        widget.remove_controller(controller);
                    }
                }
            }
        }

        match Rc::try_unwrap(self.inner) {
            Ok(cell) => cell.into_inner().finish().drain().collect(),
            Err(shared) => {
                warn!("Display still shared at finish; releasing input method only");
                let mut display = shared.borrow_mut();
                display.set_use_native_im(false).ok();
                display.drain_events()
            }
        }
    }
}

/// Run `f` on the display unless it is gone or already borrowed further up
/// the stack.
fn with_display(display: &WeakDisplay, f: impl FnOnce(&mut DisplayInfo<GtkToolkit>)) {
    let Some(display) = display.upgrade() else {
        return;
    };
    match display.try_borrow_mut() {
        Ok(mut d) => f(&mut d),
        Err(_) => debug!("Display busy, dropping re-entrant event"),
    };
}

fn focus_controller(frame: FrameId, display: WeakDisplay) -> EventControllerFocus {
    let focus = EventControllerFocus::new();

    let weak = display.clone();
    focus.connect_enter(move |_| with_display(&weak, |d| d.focus_in(frame)));
    focus.connect_leave(move |_| with_display(&display, |d| d.focus_out(frame)));

    focus
}

fn key_controller(frame: FrameId, display: WeakDisplay) -> EventControllerKey {
    let keys = EventControllerKey::new();

    let weak = display.clone();
    keys.connect_key_pressed(move |ctrl, _keyval, _keycode, _state| {
        if filter(&weak, frame, ctrl) {
            glib::Propagation::Stop
        } else {
            glib::Propagation::Proceed
        }
    });
    keys.connect_key_released(move |ctrl, _keyval, _keycode, _state| {
        filter(&display, frame, ctrl);
    });

    keys
}

/// Offer the controller's current key event to the input method.
fn filter(display: &WeakDisplay, frame: FrameId, ctrl: &EventControllerKey) -> bool {
    // The context commits synchronously from inside filter_keypress, so the
    // display borrow has to end before the call
    let mut im = None;
    with_display(display, |d| {
        if d.filter_keypress(frame) {
            im = d.session().context().map(|c| c.im().clone());
        }
    });

    match (im, ctrl.current_event()) {
        (Some(im), Some(event)) => im.filter_keypress(&event),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgtk_core::dummy_backend::BoxGlyphs;

    // Native input stays off so no GTK context is ever created
    fn shared_display() -> SharedDisplay {
        let config = PgtkConfig::default().with_native_input(false);
        let renderer = Box::new(GlyphRenderer::new(BoxGlyphs::default(), &config));
        let info = DisplayInfo::new(GtkToolkit::detached(), renderer, config).unwrap();
        Rc::new(RefCell::new(info))
    }

    #[test]
    fn test_with_display_runs_when_free() {
        let display = shared_display();
        let mut ran = false;
        with_display(&Rc::downgrade(&display), |d| {
            d.focus_in(FrameId(1));
            ran = true;
        });
        assert!(ran);
        assert_eq!(display.borrow().session().focused_frame(), Some(FrameId(1)));
    }

    #[test]
    fn test_with_display_drops_reentrant_event() {
        let display = shared_display();
        let weak = Rc::downgrade(&display);
        let held = display.borrow_mut();

        let mut ran = false;
        with_display(&weak, |_| ran = true);
        assert!(!ran);

        drop(held);
        assert_eq!(display.borrow().session().focused_frame(), None);
    }

    #[test]
    fn test_with_display_after_drop() {
        let display = shared_display();
        let weak = Rc::downgrade(&display);
        drop(display);

        let mut ran = false;
        with_display(&weak, |_| ran = true);
        assert!(!ran);
    }
}
