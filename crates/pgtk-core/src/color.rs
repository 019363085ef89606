/// Color in 0.0..=1.0 space with alpha channel
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba {
            r: 0.0,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        }
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rgba({:.2}, {:.2}, {:.2}, {:.2})",
            self.r, self.g, self.b, self.a
        )
    }
}

impl Rgba {
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build from 16-bit channels, the way toolkit attribute lists carry colors.
    pub fn from_u16(r: u16, g: u16, b: u16) -> Self {
        Self::rgb(
            r as f64 / 65535.0,
            g as f64 / 65535.0,
            b as f64 / 65535.0,
        )
    }

    /// Parse `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }

        let rgb = u32::from_str_radix(hex, 16).ok()?;
        Some(Self::rgb(
            ((rgb >> 16) & 0xff) as f64 / 255.0,
            ((rgb >> 8) & 0xff) as f64 / 255.0,
            (rgb & 0xff) as f64 / 255.0,
        ))
    }

    /// Premultiplied BGRA bytes, scaled by an extra coverage factor.
    pub fn to_bgra_premul(self, coverage: f64) -> [u8; 4] {
        let a = (self.a * coverage).clamp(0.0, 1.0);
        let ch = |c: f64| (c.clamp(0.0, 1.0) * a * 255.0).round() as u8;
        [ch(self.b), ch(self.g), ch(self.r), (a * 255.0).round() as u8]
    }
}
