// src/main.rs
use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context as _;
use cairo::{FontSlant, FontWeight};
use gtk4::prelude::*;
use gtk4::{gdk, Application, ApplicationWindow, DrawingArea, EventControllerKey};
use tracing::{error, info, warn};

use pgtk::{to_surface, EditorBuffer, FrameId, GtkDisplay, PgtkConfig};
use pgtk_core::{CursorKind, CursorRect, FrameColors, Rgba, SessionState};

const FRAME: FrameId = FrameId(1);
const TEXT_SIZE: f64 = 16.0;
const MARGIN: f64 = 8.0;

fn main() -> glib::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let app = Application::builder()
        .application_id("com.example.pgtk")
        .build();

    app.connect_activate(|app| {
        if let Err(e) = build_ui(app) {
            error!("Failed to start: {:#}", e);
            app.quit();
        }
    });

    app.run()
}

/// `PGTK_PREEDIT_FONT` is a font file; `PGTK_PREEDIT_FG`/`PGTK_PREEDIT_BG`
/// are `#rrggbb` colours.
fn config_from_env() -> PgtkConfig {
    let mut config = PgtkConfig::default();
    if let Ok(path) = std::env::var("PGTK_PREEDIT_FONT") {
        config = config.with_preedit_font_path(path);
    }
    let color = |var: &str| std::env::var(var).ok().and_then(|hex| Rgba::from_hex(&hex));
    let fg = color("PGTK_PREEDIT_FG").unwrap_or(config.preedit_fg);
    let bg = color("PGTK_PREEDIT_BG").unwrap_or(config.preedit_bg);
    config.with_preedit_colors(fg, bg)
}

fn build_ui(app: &Application) -> anyhow::Result<()> {
    let window = ApplicationWindow::builder()
        .application(app)
        .title("pgtk")
        .default_width(640)
        .default_height(400)
        .build();

    let area = DrawingArea::new();
    area.set_vexpand(true);
    area.set_hexpand(true);
    window.set_child(Some(&area));

    let mut display = GtkDisplay::new(config_from_env()).context("opening display")?;
    display.add_frame(FRAME, &area);
    display.set_cursor(FRAME, CursorKind::Text)?;

    let redraw = area.clone();
    display.set_waker(move || redraw.queue_draw());

    let buffer = Rc::new(RefCell::new(EditorBuffer::new(FRAME)));
    let shared = Rc::downgrade(&display.shared());
    let draw_buffer = Rc::clone(&buffer);
    area.set_draw_func(move |_, cr, _w, _h| {
        let Some(shared) = shared.upgrade() else {
            return;
        };
        let Ok(mut d) = shared.try_borrow_mut() else {
            return;
        };
        let mut buffer = draw_buffer.borrow_mut();
        for event in d.drain_events() {
            buffer.apply(event);
        }

        let colors = d.frame(FRAME).map(|f| *f.colors()).unwrap_or_default();
        match paint(cr, &buffer, &colors) {
            Ok(caret) => d.set_cursor_location(caret),
            Err(e) => warn!("Paint failed: {:#}", e),
        }
    });

    let display = Rc::new(RefCell::new(Some(display)));
    area.add_controller(editing_keys(&area, &buffer, &display));

    window.connect_close_request(move |_| {
        if let Some(display) = display.borrow_mut().take() {
            let pending = display.finish();
            info!("Closed with {} unread input events", pending.len());
        }
        glib::Propagation::Proceed
    });

    window.present();
    area.grab_focus();
    Ok(())
}

/// Keys the input method let through: plain typing, editing and F2 to
/// toggle the input method.
fn editing_keys(
    area: &DrawingArea,
    buffer: &Rc<RefCell<EditorBuffer>>,
    display: &Rc<RefCell<Option<GtkDisplay>>>,
) -> EventControllerKey {
    let keys = EventControllerKey::new();
    let area = area.clone();
    let buffer = Rc::clone(buffer);
    let display = Rc::clone(display);

    keys.connect_key_pressed(move |_, keyval, _keycode, state| {
        if state.intersects(gdk::ModifierType::CONTROL_MASK | gdk::ModifierType::ALT_MASK) {
            return glib::Propagation::Proceed;
        }
        match keyval {
            gdk::Key::F2 => {
                if let Some(display) = display.borrow().as_ref() {
                    let enable = display.im_state() == SessionState::Disabled;
                    if let Err(e) = display.set_use_native_im(enable) {
                        warn!("Toggling input method failed: {}", e);
                    }
                    info!("Native input method {}", if enable { "on" } else { "off" });
                }
            }
            gdk::Key::BackSpace => buffer.borrow_mut().backspace(),
            gdk::Key::Return | gdk::Key::KP_Enter => buffer.borrow_mut().insert('\n'),
            _ => match keyval.to_unicode() {
                Some(ch) if !ch.is_control() => buffer.borrow_mut().insert(ch),
                _ => return glib::Propagation::Proceed,
            },
        }
        area.queue_draw();
        glib::Propagation::Stop
    });

    keys
}

/// Paint the buffer with the preedit at the caret. Returns the caret
/// rectangle for the input method's candidate window.
fn paint(cr: &cairo::Context, buffer: &EditorBuffer, colors: &FrameColors) -> anyhow::Result<CursorRect> {
    let bg = colors.background;
    cr.set_source_rgba(bg.r, bg.g, bg.b, bg.a);
    cr.paint()?;

    cr.select_font_face("Monospace", FontSlant::Normal, FontWeight::Normal);
    cr.set_font_size(TEXT_SIZE);
    let extents = cr.font_extents()?;
    let line_height = extents.height();

    let fg = colors.foreground;
    cr.set_source_rgba(fg.r, fg.g, fg.b, fg.a);
    for (row, line) in buffer.text().split('\n').enumerate() {
        cr.move_to(MARGIN, MARGIN + extents.ascent() + row as f64 * line_height);
        cr.show_text(line)?;
    }

    let row = buffer.line_count().saturating_sub(1) as f64;
    let caret_x = MARGIN + cr.text_extents(buffer.current_line())?.x_advance();
    let caret_y = MARGIN + row * line_height;

    if let Some(image) = buffer.preedit() {
        let surface = to_surface(image).context("preedit surface")?;
        cr.set_source_surface(&surface, caret_x, caret_y)?;
        cr.paint()?;
    } else {
        let cursor = colors.cursor;
        cr.set_source_rgba(cursor.r, cursor.g, cursor.b, cursor.a);
        cr.rectangle(caret_x, caret_y, 2.0, line_height);
        cr.fill()?;
    }

    Ok(CursorRect {
        x: caret_x as i32,
        y: caret_y as i32,
        width: 1,
        height: line_height.ceil() as i32,
    })
}
