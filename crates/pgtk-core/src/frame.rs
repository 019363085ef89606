//! Per-frame side-table of toolkit handles
//!
//! Each editor frame realised on a display gets a `FrameOutput` holding the
//! toolkit objects behind it: windows, widgets, cursors, chrome geometry and
//! scroll bars. The table only stores and returns them. Whether a handle is
//! valid is up to the toolkit and the frame lifecycle code.

use std::collections::HashMap;

use crate::color::Rgba;
use crate::constants::{DEFAULT_BORDER_WIDTH, DEFAULT_CURSOR_COLOR, DEFAULT_FRAME_BG,
                       DEFAULT_FRAME_FG, DEFAULT_INTERNAL_BORDER_WIDTH,
                       DEFAULT_PREEDIT_FONT_FAMILY, DEFAULT_PREEDIT_FONT_SIZE};
use crate::traits::Toolkit;

/// Opaque identity of an editor frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u64);

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// Pointer shapes a frame switches between
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CursorKind {
    Text,
    Nontext,
    Modeline,
    Hand,
    Hourglass,
    HorizontalDrag,
    VerticalDrag,
    LeftEdge,
    RightEdge,
    TopEdge,
    BottomEdge,
    TopLeftCorner,
    TopRightCorner,
    BottomLeftCorner,
    BottomRightCorner,
}

impl CursorKind {
    pub const ALL: [CursorKind; 15] = [
        CursorKind::Text,
        CursorKind::Nontext,
        CursorKind::Modeline,
        CursorKind::Hand,
        CursorKind::Hourglass,
        CursorKind::HorizontalDrag,
        CursorKind::VerticalDrag,
        CursorKind::LeftEdge,
        CursorKind::RightEdge,
        CursorKind::TopEdge,
        CursorKind::BottomEdge,
        CursorKind::TopLeftCorner,
        CursorKind::TopRightCorner,
        CursorKind::BottomLeftCorner,
        CursorKind::BottomRightCorner,
    ];

    /// CSS cursor name, which is what GTK looks cursors up by.
    pub fn css_name(self) -> &'static str {
        match self {
            CursorKind::Text => "text",
            CursorKind::Nontext => "default",
            CursorKind::Modeline => "pointer",
            CursorKind::Hand => "pointer",
            CursorKind::Hourglass => "wait",
            CursorKind::HorizontalDrag => "col-resize",
            CursorKind::VerticalDrag => "row-resize",
            CursorKind::LeftEdge => "w-resize",
            CursorKind::RightEdge => "e-resize",
            CursorKind::TopEdge => "n-resize",
            CursorKind::BottomEdge => "s-resize",
            CursorKind::TopLeftCorner => "nw-resize",
            CursorKind::TopRightCorner => "ne-resize",
            CursorKind::BottomLeftCorner => "sw-resize",
            CursorKind::BottomRightCorner => "se-resize",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One cursor handle per `CursorKind`, plus the one currently shown.
#[derive(Clone, Debug)]
pub struct CursorSet<C> {
    cursors: [Option<C>; 15],
    current: Option<CursorKind>,
}

impl<C> Default for CursorSet<C> {
    fn default() -> Self {
        Self {
            cursors: Default::default(),
            current: None,
        }
    }
}

impl<C> CursorSet<C> {
    pub fn get(&self, kind: CursorKind) -> Option<&C> {
        self.cursors[kind.index()].as_ref()
    }

    pub fn set(&mut self, kind: CursorKind, cursor: C) {
        self.cursors[kind.index()] = Some(cursor);
    }

    pub fn current(&self) -> Option<CursorKind> {
        self.current
    }

    pub fn set_current(&mut self, kind: CursorKind) {
        self.current = Some(kind);
    }
}

/// Tool-bar geometry; only the side it is docked on is non-zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ToolbarGeometry {
    pub top_height: u32,
    pub bottom_height: u32,
    pub left_width: u32,
    pub right_width: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameColors {
    pub foreground: Rgba,
    pub background: Rgba,
    pub cursor: Rgba,
    pub cursor_foreground: Rgba,
    pub mouse: Rgba,
    pub border: Rgba,
}

impl Default for FrameColors {
    fn default() -> Self {
        Self {
            foreground: DEFAULT_FRAME_FG,
            background: DEFAULT_FRAME_BG,
            cursor: DEFAULT_CURSOR_COLOR,
            cursor_foreground: DEFAULT_FRAME_BG,
            mouse: DEFAULT_FRAME_FG,
            border: DEFAULT_FRAME_FG,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub pixel_size: f32,
    pub baseline_offset: i32,
    pub fontset: i32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: DEFAULT_PREEDIT_FONT_FAMILY.to_string(),
            pixel_size: DEFAULT_PREEDIT_FONT_SIZE,
            baseline_offset: 0,
            fontset: -1,
        }
    }
}

/// Vertical scroll bar belonging to one editor window
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScrollBar {
    /// Editor window the bar scrolls
    pub window: u64,
    pub top: i32,
    pub left: i32,
    pub width: u32,
    pub height: u32,
    /// Thumb extent in bar pixels
    pub start: u32,
    pub end: u32,
    /// Pointer offset into the thumb while dragging
    pub dragging: Option<i32>,
    pub horizontal: bool,
}

/// Toolkit binding of one editor frame
pub struct FrameOutput<T: Toolkit> {
    window_desc: Option<T::Window>,
    parent_desc: Option<T::Window>,
    edit_widget: Option<T::Window>,
    outer_widget: Option<T::Window>,
    cursors: CursorSet<T::Cursor>,
    menubar_height: u32,
    toolbar: ToolbarGeometry,
    colors: FrameColors,
    font: FontSpec,
    border_width: u32,
    internal_border_width: u32,
    scroll_bars: HashMap<u64, ScrollBar>,
}

impl<T: Toolkit> Default for FrameOutput<T> {
    fn default() -> Self {
        Self {
            window_desc: None,
            parent_desc: None,
            edit_widget: None,
            outer_widget: None,
            cursors: CursorSet::default(),
            menubar_height: 0,
            toolbar: ToolbarGeometry::default(),
            colors: FrameColors::default(),
            font: FontSpec::default(),
            border_width: DEFAULT_BORDER_WIDTH,
            internal_border_width: DEFAULT_INTERNAL_BORDER_WIDTH,
            scroll_bars: HashMap::new(),
        }
    }
}

impl<T: Toolkit> FrameOutput<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame realised on `window`, which is also its edit widget.
    pub fn with_window(window: T::Window) -> Self {
        Self {
            edit_widget: Some(window.clone()),
            window_desc: Some(window),
            ..Self::default()
        }
    }

    pub fn window_desc(&self) -> Option<&T::Window> {
        self.window_desc.as_ref()
    }

    pub fn set_window_desc(&mut self, window: Option<T::Window>) {
        self.window_desc = window;
    }

    pub fn parent_desc(&self) -> Option<&T::Window> {
        self.parent_desc.as_ref()
    }

    pub fn set_parent_desc(&mut self, window: Option<T::Window>) {
        self.parent_desc = window;
    }

    pub fn edit_widget(&self) -> Option<&T::Window> {
        self.edit_widget.as_ref()
    }

    pub fn set_edit_widget(&mut self, widget: Option<T::Window>) {
        self.edit_widget = widget;
    }

    pub fn outer_widget(&self) -> Option<&T::Window> {
        self.outer_widget.as_ref()
    }

    pub fn set_outer_widget(&mut self, widget: Option<T::Window>) {
        self.outer_widget = widget;
    }

    pub fn cursors(&self) -> &CursorSet<T::Cursor> {
        &self.cursors
    }

    pub fn cursors_mut(&mut self) -> &mut CursorSet<T::Cursor> {
        &mut self.cursors
    }

    pub fn menubar_height(&self) -> u32 {
        self.menubar_height
    }

    pub fn set_menubar_height(&mut self, height: u32) {
        self.menubar_height = height;
    }

    pub fn toolbar(&self) -> ToolbarGeometry {
        self.toolbar
    }

    pub fn set_toolbar(&mut self, toolbar: ToolbarGeometry) {
        self.toolbar = toolbar;
    }

    pub fn colors(&self) -> &FrameColors {
        &self.colors
    }

    pub fn colors_mut(&mut self) -> &mut FrameColors {
        &mut self.colors
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn set_font(&mut self, font: FontSpec) {
        self.font = font;
    }

    pub fn border_width(&self) -> u32 {
        self.border_width
    }

    pub fn set_border_width(&mut self, width: u32) {
        self.border_width = width;
    }

    pub fn internal_border_width(&self) -> u32 {
        self.internal_border_width
    }

    pub fn set_internal_border_width(&mut self, width: u32) {
        self.internal_border_width = width;
    }

    pub fn scroll_bar(&self, window: u64) -> Option<&ScrollBar> {
        self.scroll_bars.get(&window)
    }

    pub fn scroll_bar_mut(&mut self, window: u64) -> Option<&mut ScrollBar> {
        self.scroll_bars.get_mut(&window)
    }

    pub fn set_scroll_bar(&mut self, bar: ScrollBar) {
        self.scroll_bars.insert(bar.window, bar);
    }

    pub fn remove_scroll_bar(&mut self, window: u64) -> Option<ScrollBar> {
        self.scroll_bars.remove(&window)
    }

    pub fn scroll_bars(&self) -> impl Iterator<Item = &ScrollBar> {
        self.scroll_bars.values()
    }
}

/// All frames realised on one display
pub struct FrameTable<T: Toolkit> {
    frames: HashMap<FrameId, FrameOutput<T>>,
}

impl<T: Toolkit> Default for FrameTable<T> {
    fn default() -> Self {
        Self { frames: HashMap::new() }
    }
}

impl<T: Toolkit> FrameTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, frame: FrameId, output: FrameOutput<T>) -> Option<FrameOutput<T>> {
        self.frames.insert(frame, output)
    }

    pub fn remove(&mut self, frame: FrameId) -> Option<FrameOutput<T>> {
        self.frames.remove(&frame)
    }

    pub fn get(&self, frame: FrameId) -> Option<&FrameOutput<T>> {
        self.frames.get(&frame)
    }

    pub fn get_mut(&mut self, frame: FrameId) -> Option<&mut FrameOutput<T>> {
        self.frames.get_mut(&frame)
    }

    pub fn contains(&self, frame: FrameId) -> bool {
        self.frames.contains_key(&frame)
    }

    /// Native window the frame is realised on, if any.
    pub fn window_of(&self, frame: FrameId) -> Option<&T::Window> {
        self.frames.get(&frame).and_then(FrameOutput::window_desc)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
