// src/constants.rs
use crate::color::Rgba;

// Preedit font
pub const DEFAULT_PREEDIT_FONT_FAMILY: &str = "Monospace";
pub const DEFAULT_PREEDIT_FONT_SIZE: f32 = 16.0;

// Preedit colors
pub const DEFAULT_PREEDIT_FG: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
pub const DEFAULT_PREEDIT_BG: Rgba = Rgba::rgb(1.0, 1.0, 1.0);

pub const UNDERLINE_THICKNESS: u32 = 1;
/// Gap between the baseline and a `Low` underline.
pub const LOW_UNDERLINE_OFFSET: u32 = 2;
pub const CURSOR_WIDTH: u32 = 1;

/// Bytes per pixel in a preedit image (premultiplied BGRA).
pub const PREEDIT_BYTES_PER_PIXEL: u32 = 4;

// Frame chrome defaults
pub const DEFAULT_BORDER_WIDTH: u32 = 0;
pub const DEFAULT_INTERNAL_BORDER_WIDTH: u32 = 2;
pub const DEFAULT_FRAME_FG: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
pub const DEFAULT_FRAME_BG: Rgba = Rgba::rgb(1.0, 1.0, 1.0);
pub const DEFAULT_CURSOR_COLOR: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
