//! GTK4 input-method context behind the core `ImContext` trait

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gtk4::prelude::*;
use gtk4::{gdk, IMMulticontext, Widget};
use tracing::{debug, trace};

use pgtk_core::{CursorRect, DisplayInfo, ImContext, ImEvent, ImSignal, PgtkResult, PreeditAttr,
                PreeditString, PreeditStyle, Rgba, SignalResponse, Toolkit, UnderlineStyle};

pub type SharedDisplay = Rc<RefCell<DisplayInfo<GtkToolkit>>>;
pub(crate) type WeakDisplay = Weak<RefCell<DisplayInfo<GtkToolkit>>>;

/// GTK4 as seen by the core: widgets are windows, cursors are `gdk::Cursor`.
pub struct GtkToolkit {
    display: WeakDisplay,
    waker: Option<Rc<dyn Fn()>>,
}

impl GtkToolkit {
    /// Toolkit not yet attached to its display; contexts it creates route nowhere.
    pub(crate) fn detached() -> Self {
        Self {
            display: Weak::new(),
            waker: None,
        }
    }

    pub(crate) fn attach(&mut self, display: WeakDisplay) {
        self.display = display;
    }

    /// Called after a signal queued something for the host.
    pub fn set_waker(&mut self, waker: impl Fn() + 'static) {
        self.waker = Some(Rc::new(waker));
    }

    fn waker(&self) -> Option<Rc<dyn Fn()>> {
        self.waker.clone()
    }
}

impl Toolkit for GtkToolkit {
    type Window = Widget;
    type Cursor = gdk::Cursor;
    type Context = GtkImContext;

    fn create_im_context(&mut self) -> PgtkResult<GtkImContext> {
        debug!("Creating GTK input-method context");
        let im = IMMulticontext::new();
        // Preedit is drawn by the host, not in a popup
        im.set_use_preedit(true);
        Ok(GtkImContext {
            im,
            display: self.display.clone(),
            handlers: Vec::new(),
        })
    }
}

pub struct GtkImContext {
    im: IMMulticontext,
    display: WeakDisplay,
    handlers: Vec<glib::SignalHandlerId>,
}

impl GtkImContext {
    /// The underlying GTK object, for key-event filtering.
    pub fn im(&self) -> &IMMulticontext {
        &self.im
    }
}

impl ImContext for GtkImContext {
    type Window = Widget;

    fn reset(&mut self) {
        self.im.reset();
    }

    fn focus_in(&mut self) {
        self.im.focus_in();
    }

    fn focus_out(&mut self) {
        self.im.focus_out();
    }

    fn set_client_window(&mut self, window: Option<&Widget>) {
        self.im.set_client_widget(window);
    }

    fn preedit_string(&self) -> PreeditString {
        let (text, attrs, cursor) = self.im.preedit_string();
        preedit_from_pango(text.as_str(), &attrs, cursor)
    }

    #[allow(deprecated)]
    fn set_surrounding(&mut self, text: &str, cursor_index: usize) {
        self.im.set_surrounding(text, cursor_index as i32);
    }

    fn set_cursor_location(&mut self, rect: CursorRect) {
        self.im.set_cursor_location(&gdk::Rectangle::new(rect.x, rect.y, rect.width, rect.height));
    }

    fn connect_signals(&mut self, signals: &[ImSignal]) {
        for &signal in signals {
            let display = self.display.clone();
            let id = match signal {
                ImSignal::Commit => self.im.connect_commit(move |_, text| {
                    route(&display, ImEvent::Commit(text.to_string()));
                }),
                ImSignal::RetrieveSurrounding => self.im.connect_retrieve_surrounding(move |_| {
                    route(&display, ImEvent::RetrieveSurrounding).as_bool()
                }),
                ImSignal::DeleteSurrounding => self.im.connect_delete_surrounding(move |_, offset, n_chars| {
                    route(&display, ImEvent::DeleteSurrounding { offset, n_chars }).as_bool()
                }),
                ImSignal::PreeditChanged => self.im.connect_preedit_changed(move |_| {
                    route(&display, ImEvent::PreeditChanged);
                }),
                ImSignal::PreeditStart => self.im.connect_preedit_start(move |_| {
                    route(&display, ImEvent::PreeditStart);
                }),
                ImSignal::PreeditEnd => self.im.connect_preedit_end(move |_| {
                    route(&display, ImEvent::PreeditEnd);
                }),
            };
            trace!("Connected {}", signal);
            self.handlers.push(id);
        }
    }
}

impl Drop for GtkImContext {
    fn drop(&mut self) {
        for id in self.handlers.drain(..) {
            self.im.disconnect(id);
        }
        debug!("Released GTK input-method context");
    }
}

/// Deliver a signal to the display, then wake the host if anything was queued.
///
/// GTK emits some signals synchronously from inside calls the display makes
/// (`reset` emitting preedit-end, for one). Those find the display borrowed
/// and are dropped.
fn route(display: &WeakDisplay, event: ImEvent) -> SignalResponse {
    let Some(display) = display.upgrade() else {
        return SignalResponse::Ignored;
    };

    let (response, waker) = match display.try_borrow_mut() {
        Ok(mut d) => {
            let response = d.dispatch(&event);
            (response, d.toolkit().waker())
        }
        Err(_) => {
            debug!("Dropping re-entrant {} signal", event.signal());
            return SignalResponse::Ignored;
        }
    };

    if response != SignalResponse::Ignored {
        if let Some(waker) = waker {
            waker();
        }
    }
    response
}

fn underline_from_pango(value: i32) -> UnderlineStyle {
    // PangoUnderline
    match value {
        1 | 5 => UnderlineStyle::Single,
        2 | 6 => UnderlineStyle::Double,
        3 => UnderlineStyle::Low,
        4 | 7 => UnderlineStyle::Error,
        _ => UnderlineStyle::None,
    }
}

fn color_from_pango(color: &pango::Color) -> Rgba {
    Rgba::from_u16(color.red(), color.green(), color.blue())
}

/// Flatten a pango attribute list into preedit attributes.
pub fn preedit_from_pango(text: &str, attrs: &pango::AttrList, cursor: i32) -> PreeditString {
    let mut preedit = PreeditString::new(text).with_cursor(cursor.max(0) as usize);

    let mut iter = attrs.iterator();
    loop {
        let (start, end) = iter.range();
        for attr in iter.attrs() {
            let style = match attr.type_() {
                pango::AttrType::Underline => attr
                    .downcast_ref::<pango::AttrInt>()
                    .map(|a| PreeditStyle::Underline(underline_from_pango(a.value()))),
                pango::AttrType::Foreground => attr
                    .downcast_ref::<pango::AttrColor>()
                    .map(|a| PreeditStyle::Foreground(color_from_pango(&a.color()))),
                pango::AttrType::Background => attr
                    .downcast_ref::<pango::AttrColor>()
                    .map(|a| PreeditStyle::Background(color_from_pango(&a.color()))),
                _ => None,
            };
            if let Some(style) = style {
                preedit.attrs.push(PreeditAttr::new(start.max(0) as usize, end.max(0) as usize, style));
            }
        }
        if !iter.next_style_change() {
            break;
        }
    }

    preedit.normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgtk_core::dummy_backend::BoxGlyphs;

    #[test]
    fn test_underline_mapping() {
        assert_eq!(underline_from_pango(0), UnderlineStyle::None);
        assert_eq!(underline_from_pango(1), UnderlineStyle::Single);
        assert_eq!(underline_from_pango(6), UnderlineStyle::Double);
        assert_eq!(underline_from_pango(3), UnderlineStyle::Low);
        assert_eq!(underline_from_pango(7), UnderlineStyle::Error);
    }

    fn shared_display() -> SharedDisplay {
        let config = pgtk_core::PgtkConfig::default().with_native_input(false);
        let renderer = Box::new(pgtk_core::GlyphRenderer::new(BoxGlyphs::default(), &config));
        let info = DisplayInfo::new(GtkToolkit::detached(), renderer, config).unwrap();
        Rc::new(RefCell::new(info))
    }

    #[test]
    fn test_route_drops_reentrant_signal() {
        let display = shared_display();
        let woken = Rc::new(std::cell::Cell::new(0));
        let counter = Rc::clone(&woken);
        display.borrow_mut().toolkit_mut().set_waker(move || counter.set(counter.get() + 1));

        let weak = Rc::downgrade(&display);
        let held = display.borrow_mut();
        assert_eq!(route(&weak, ImEvent::PreeditEnd), SignalResponse::Ignored);
        drop(held);

        assert_eq!(woken.get(), 0);
        assert!(display.borrow().queue().is_empty());
    }

    #[test]
    fn test_route_to_dropped_display() {
        let display = shared_display();
        let weak = Rc::downgrade(&display);
        drop(display);
        assert_eq!(route(&weak, ImEvent::Commit("x".into())), SignalResponse::Ignored);
    }

    #[test]
    fn test_preedit_from_pango() {
        let attrs = pango::AttrList::new();
        let mut underline = pango::AttrInt::new_underline(pango::Underline::Single);
        underline.set_start_index(0);
        underline.set_end_index(3);
        attrs.insert(underline);

        let mut bg = pango::AttrColor::new_background(0, 0, 65535);
        bg.set_start_index(3);
        bg.set_end_index(u32::MAX);
        attrs.insert(bg);

        let preedit = preedit_from_pango("かな", &attrs, 1);
        assert_eq!(preedit.cursor, 1);
        assert!(preedit.attrs.contains(&PreeditAttr::new(
            0,
            3,
            PreeditStyle::Underline(UnderlineStyle::Single)
        )));
        assert!(preedit.attrs.contains(&PreeditAttr::new(
            3,
            6,
            PreeditStyle::Background(Rgba::rgb(0.0, 0.0, 1.0))
        )));
    }
}
