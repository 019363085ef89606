//! Dummy toolkit for exercising the session without GTK

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::error::{PgtkError, PgtkResult};
use crate::preedit::{Glyph, GlyphSource, LineMetrics, PreeditString};
use crate::signals::ImSignal;
use crate::traits::{CursorRect, ImContext, Toolkit};

/// Calls made on a dummy context, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContextCall {
    Reset,
    FocusIn,
    FocusOut,
    SetClientWindow(Option<u64>),
    SetSurrounding(String, usize),
    SetCursorLocation(CursorRect),
}

/// What happened to the contexts a `DummyToolkit` handed out
#[derive(Debug, Default)]
pub struct ContextLog {
    pub created: usize,
    pub released: usize,
    pub calls: Vec<ContextCall>,
    pub connected: Vec<ImSignal>,
}

/// Toolkit whose windows are plain ids and whose cursors are names
#[derive(Default)]
pub struct DummyToolkit {
    log: Rc<RefCell<ContextLog>>,
    preedit: Rc<RefCell<PreeditString>>,
    fail_next: bool,
}

impl DummyToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Ref<'_, ContextLog> {
        self.log.borrow()
    }

    pub fn clear_calls(&self) {
        self.log.borrow_mut().calls.clear();
    }

    /// Preedit every context of this toolkit reports from now on.
    pub fn set_preedit(&self, preedit: PreeditString) {
        *self.preedit.borrow_mut() = preedit;
    }

    /// Make the next `create_im_context` fail.
    pub fn fail_next_create(&mut self) {
        self.fail_next = true;
    }
}

impl Toolkit for DummyToolkit {
    type Window = u64;
    type Cursor = String;
    type Context = DummyImContext;

    fn create_im_context(&mut self) -> PgtkResult<DummyImContext> {
        if std::mem::take(&mut self.fail_next) {
            return Err(PgtkError::ContextCreation {
                message: "dummy toolkit told to fail".to_string(),
            });
        }
        self.log.borrow_mut().created += 1;
        Ok(DummyImContext {
            log: Rc::clone(&self.log),
            preedit: Rc::clone(&self.preedit),
        })
    }
}

/// Context that records every call into the shared `ContextLog`
pub struct DummyImContext {
    log: Rc<RefCell<ContextLog>>,
    preedit: Rc<RefCell<PreeditString>>,
}

impl DummyImContext {
    fn record(&self, call: ContextCall) {
        self.log.borrow_mut().calls.push(call);
    }
}

impl ImContext for DummyImContext {
    type Window = u64;

    fn reset(&mut self) {
        self.record(ContextCall::Reset);
    }

    fn focus_in(&mut self) {
        self.record(ContextCall::FocusIn);
    }

    fn focus_out(&mut self) {
        self.record(ContextCall::FocusOut);
    }

    fn set_client_window(&mut self, window: Option<&u64>) {
        self.record(ContextCall::SetClientWindow(window.copied()));
    }

    fn preedit_string(&self) -> PreeditString {
        self.preedit.borrow().clone()
    }

    fn set_surrounding(&mut self, text: &str, cursor_index: usize) {
        self.record(ContextCall::SetSurrounding(text.to_string(), cursor_index));
    }

    fn set_cursor_location(&mut self, rect: CursorRect) {
        self.record(ContextCall::SetCursorLocation(rect));
    }

    fn connect_signals(&mut self, signals: &[ImSignal]) {
        self.log.borrow_mut().connected.extend_from_slice(signals);
    }
}

impl Drop for DummyImContext {
    fn drop(&mut self) {
        self.log.borrow_mut().released += 1;
    }
}

/// Fixed-metrics glyphs: every char is a solid box in an 8x16 cell
#[derive(Clone, Copy, Debug)]
pub struct BoxGlyphs {
    pub advance: f32,
    pub ascent: f32,
    pub descent: f32,
}

impl Default for BoxGlyphs {
    fn default() -> Self {
        Self {
            advance: 8.0,
            ascent: 12.0,
            descent: 4.0,
        }
    }
}

impl GlyphSource for BoxGlyphs {
    fn line_metrics(&self) -> LineMetrics {
        LineMetrics {
            ascent: self.ascent,
            descent: self.descent,
        }
    }

    fn glyph(&self, ch: char) -> Glyph {
        if ch.is_whitespace() {
            return Glyph {
                advance: self.advance,
                ..Default::default()
            };
        }
        // One pixel of side bearing each way, ten pixels tall on the baseline
        let width = (self.advance as usize).saturating_sub(2);
        let height = 10;
        Glyph {
            advance: self.advance,
            width,
            height,
            xmin: 1,
            ymin: 0,
            coverage: vec![255; width * height],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_context_records_calls() {
        let mut toolkit = DummyToolkit::new();
        let mut context = toolkit.create_im_context().unwrap();
        context.reset();
        context.set_client_window(Some(&7));
        context.focus_in();
        context.connect_signals(&ImSignal::ALL);

        assert_eq!(
            toolkit.log().calls.clone(),
            vec![ContextCall::Reset, ContextCall::SetClientWindow(Some(7)), ContextCall::FocusIn]
        );
        assert_eq!(toolkit.log().connected.len(), 6);

        drop(context);
        assert_eq!(toolkit.log().created, 1);
        assert_eq!(toolkit.log().released, 1);
    }

    #[test]
    fn test_dummy_preedit_is_shared() {
        let mut toolkit = DummyToolkit::new();
        let context = toolkit.create_im_context().unwrap();
        toolkit.set_preedit(PreeditString::new("ㄅ").with_cursor(1));
        assert_eq!(context.preedit_string().text, "ㄅ");
        assert_eq!(context.preedit_string().cursor, 1);
    }

    #[test]
    fn test_box_glyphs() {
        let glyphs = BoxGlyphs::default();
        let g = glyphs.glyph('A');
        assert_eq!((g.width, g.height, g.xmin), (6, 10, 1));
        assert_eq!(g.coverage.len(), 60);
        assert!(glyphs.glyph(' ').coverage.is_empty());
    }
}
