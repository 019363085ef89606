//! Rasterising preedit text into a `PreeditImage`

use crate::color::Rgba;
use crate::config::PgtkConfig;
use crate::constants::{CURSOR_WIDTH, LOW_UNDERLINE_OFFSET};
use crate::error::PgtkResult;
use crate::preedit::{PreeditImage, PreeditString, PreeditStyle, UnderlineStyle};

/// Vertical metrics of a line, both measured away from the baseline
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineMetrics {
    pub ascent: f32,
    pub descent: f32,
}

/// Coverage bitmap of one glyph.
///
/// `xmin` is the offset from the pen position to the left edge of the bitmap,
/// `ymin` the offset from the baseline up to its bottom edge.
#[derive(Clone, Debug, Default)]
pub struct Glyph {
    pub advance: f32,
    pub width: usize,
    pub height: usize,
    pub xmin: i32,
    pub ymin: i32,
    pub coverage: Vec<u8>,
}

/// Where glyph shapes come from
pub trait GlyphSource {
    fn line_metrics(&self) -> LineMetrics;
    fn glyph(&self, ch: char) -> Glyph;
}

/// Turns a preedit string into an image the frame's display layer can show.
pub trait PreeditRenderer {
    /// Pixel size the text occupies.
    fn measure(&self, text: &str) -> (u32, u32);
    /// `Ok(None)` for empty text.
    fn render(&self, preedit: &PreeditString) -> PgtkResult<Option<PreeditImage>>;
}

#[derive(Clone, Copy, Debug)]
struct CharStyle {
    fg: Rgba,
    bg: Option<Rgba>,
    underline: UnderlineStyle,
}

/// Single-line preedit renderer over any `GlyphSource`
pub struct GlyphRenderer<G> {
    glyphs: G,
    fg: Rgba,
    bg: Rgba,
    underline_thickness: u32,
    draw_cursor: bool,
}

impl<G: GlyphSource> GlyphRenderer<G> {
    pub fn new(glyphs: G, config: &PgtkConfig) -> Self {
        Self {
            glyphs,
            fg: config.preedit_fg,
            bg: config.preedit_bg,
            underline_thickness: config.underline_thickness.max(1),
            draw_cursor: config.preedit_draw_cursor,
        }
    }

    fn style_at(&self, preedit: &PreeditString, byte: usize) -> CharStyle {
        let mut style = CharStyle {
            fg: self.fg,
            bg: None,
            underline: UnderlineStyle::None,
        };
        // Later attributes win
        for attr in preedit.attrs.iter().filter(|a| a.covers(byte)) {
            match attr.style {
                PreeditStyle::Foreground(c) => style.fg = c,
                PreeditStyle::Background(c) => style.bg = Some(c),
                PreeditStyle::Underline(u) => style.underline = u,
            }
        }
        style
    }

    fn draw_glyph(image: &mut PreeditImage, glyph: &Glyph, left: i32, baseline: i32, color: Rgba) {
        let top = baseline - (glyph.ymin + glyph.height as i32);
        for row in 0..glyph.height {
            let y = top + row as i32;
            if y < 0 {
                continue;
            }
            for col in 0..glyph.width {
                let x = left + col as i32;
                if x < 0 {
                    continue;
                }
                let coverage = glyph.coverage[row * glyph.width + col];
                image.blend(x as u32, y as u32, color, coverage);
            }
        }
    }

    fn draw_underline(&self, image: &mut PreeditImage, x: u32, width: u32, baseline: u32, style: &CharStyle) {
        let t = self.underline_thickness;
        let max_y = image.height().saturating_sub(t);
        let clamp_y = |y: u32| y.min(max_y);
        match style.underline {
            UnderlineStyle::None => {}
            UnderlineStyle::Single => {
                let y = clamp_y(baseline + 1);
                image.fill_rect(x, y, width, t, style.fg);
            }
            UnderlineStyle::Double => {
                let y = clamp_y(baseline + 1);
                image.fill_rect(x, y, width, t, style.fg);
                let y2 = clamp_y(y + 2 * t);
                image.fill_rect(x, y2, width, t, style.fg);
            }
            UnderlineStyle::Low => {
                let y = clamp_y(baseline + LOW_UNDERLINE_OFFSET + 1);
                image.fill_rect(x, y, width, t, style.fg);
            }
            UnderlineStyle::Error => {
                let y = clamp_y(baseline + 1);
                // Dotted, two on two off
                let mut px = x;
                while px < x + width {
                    image.fill_rect(px, y, 2u32.min(x + width - px), t, style.fg);
                    px += 4;
                }
            }
        }
    }
}

impl<G: GlyphSource> PreeditRenderer for GlyphRenderer<G> {
    fn measure(&self, text: &str) -> (u32, u32) {
        let line = self.glyphs.line_metrics();
        let advance: f32 = text.chars().map(|ch| self.glyphs.glyph(ch).advance).sum();
        let width = advance.ceil().max(1.0) as u32;
        let height = (line.ascent + line.descent).ceil().max(1.0) as u32;
        (width, height)
    }

    fn render(&self, preedit: &PreeditString) -> PgtkResult<Option<PreeditImage>> {
        if preedit.is_empty() {
            return Ok(None);
        }

        let line = self.glyphs.line_metrics();
        let (width, height) = self.measure(&preedit.text);
        let baseline = line.ascent.ceil() as u32;

        let mut image = PreeditImage::new(width, height);
        image.fill_rect(0, 0, width, height, self.bg);

        let mut pen = 0.0f32;
        let mut cursor_x = None;
        for (n, (byte, ch)) in preedit.text.char_indices().enumerate() {
            if n == preedit.cursor {
                cursor_x = Some(pen.round() as u32);
            }

            let glyph = self.glyphs.glyph(ch);
            let style = self.style_at(preedit, byte);
            let x0 = pen.round() as u32;
            let x1 = (pen + glyph.advance).round() as u32;

            if let Some(bg) = style.bg {
                image.fill_rect(x0, 0, x1.saturating_sub(x0), height, bg);
            }
            Self::draw_glyph(&mut image, &glyph, x0 as i32 + glyph.xmin, baseline as i32, style.fg);
            self.draw_underline(&mut image, x0, x1.saturating_sub(x0), baseline, &style);

            pen += glyph.advance;
        }

        if self.draw_cursor {
            let x = cursor_x.unwrap_or(pen.round() as u32).min(width - CURSOR_WIDTH.min(width));
            image.fill_rect(x, 0, CURSOR_WIDTH, height, self.fg);
        }

        Ok(Some(image))
    }
}
