//! Preedit text, its styling, and the image it is rendered into

pub mod font;
pub mod render;

pub use font::FontdueGlyphs;
pub use render::{Glyph, GlyphRenderer, GlyphSource, LineMetrics, PreeditRenderer};

use crate::color::Rgba;
use crate::constants::PREEDIT_BYTES_PER_PIXEL;
use crate::error::{PgtkError, PgtkResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnderlineStyle {
    None,
    Single,
    Double,
    Low,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PreeditStyle {
    Underline(UnderlineStyle),
    Foreground(Rgba),
    Background(Rgba),
}

/// Style applied to the byte range `start..end` of the preedit text
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreeditAttr {
    pub start: usize,
    pub end: usize,
    pub style: PreeditStyle,
}

impl PreeditAttr {
    pub fn new(start: usize, end: usize, style: PreeditStyle) -> Self {
        Self { start, end, style }
    }

    pub fn covers(&self, byte: usize) -> bool {
        self.start <= byte && byte < self.end
    }
}

/// Preedit as reported by the input-method context
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreeditString {
    pub text: String,
    pub attrs: Vec<PreeditAttr>,
    /// Cursor position in chars
    pub cursor: usize,
}

impl PreeditString {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attrs: Vec::new(),
            cursor: 0,
        }
    }

    pub fn with_attr(mut self, start: usize, end: usize, style: PreeditStyle) -> Self {
        self.attrs.push(PreeditAttr::new(start, end, style));
        self
    }

    pub fn with_cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Clamp attribute ranges to the text and to char boundaries, drop empty
    /// ranges, and clamp the cursor to the char count.
    ///
    /// Toolkits report open-ended ranges (`end == i32::MAX`) and byte offsets
    /// that may split a multibyte char.
    pub fn normalized(mut self) -> Self {
        let len = self.text.len();
        let text = &self.text;
        let floor = |mut i: usize| {
            i = i.min(len);
            while !text.is_char_boundary(i) {
                i -= 1;
            }
            i
        };
        let ceil = |mut i: usize| {
            i = i.min(len);
            while !text.is_char_boundary(i) {
                i += 1;
            }
            i
        };

        let attrs = self
            .attrs
            .iter()
            .filter(|a| a.start < a.end)
            .map(|a| PreeditAttr::new(floor(a.start), ceil(a.end), a.style))
            .filter(|a| a.start < a.end)
            .collect();
        self.attrs = attrs;
        self.cursor = self.cursor.min(self.text.chars().count());
        self
    }
}

/// Cached preedit of a session.
///
/// Text and attributes live in one value so they are replaced and cleared
/// together.
#[derive(Clone, Debug, PartialEq)]
pub struct Preedit {
    text: String,
    attrs: Vec<PreeditAttr>,
}

impl Preedit {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attrs(&self) -> &[PreeditAttr] {
        &self.attrs
    }
}

impl From<PreeditString> for Preedit {
    fn from(preedit: PreeditString) -> Self {
        Self {
            text: preedit.text,
            attrs: preedit.attrs,
        }
    }
}

/// Rendered preedit: premultiplied BGRA, `stride` bytes per row
#[derive(Clone, PartialEq, Eq)]
pub struct PreeditImage {
    width: u32,
    height: u32,
    stride: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for PreeditImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreeditImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .finish_non_exhaustive()
    }
}

impl PreeditImage {
    /// Transparent image of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        let stride = width * PREEDIT_BYTES_PER_PIXEL;
        Self {
            width,
            height,
            stride,
            data: vec![0; (stride * height) as usize],
        }
    }

    pub fn from_raw(width: u32, height: u32, stride: u32, data: Vec<u8>) -> PgtkResult<Self> {
        let valid = stride >= width * PREEDIT_BYTES_PER_PIXEL
            && data.len() >= (stride as usize) * (height as usize);
        if !valid {
            return Err(PgtkError::InvalidImage { width, height, stride, len: data.len() });
        }
        Ok(Self { width, height, stride, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.stride + x * PREEDIT_BYTES_PER_PIXEL) as usize;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Source-over composite of a solid color at `coverage` (0..=255).
    pub fn blend(&mut self, x: u32, y: u32, color: Rgba, coverage: u8) {
        if x >= self.width || y >= self.height || coverage == 0 {
            return;
        }
        let src = color.to_bgra_premul(coverage as f64 / 255.0);
        let inv = 255 - src[3] as u32;
        let i = (y * self.stride + x * PREEDIT_BYTES_PER_PIXEL) as usize;
        for c in 0..4 {
            let dst = self.data[i + c] as u32;
            self.data[i + c] = (src[c] as u32 + (dst * inv + 127) / 255) as u8;
        }
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                self.blend(px, py, color, 255);
            }
        }
    }
}
