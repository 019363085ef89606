// src/config.rs
use std::path::PathBuf;

use crate::color::Rgba;
use crate::constants::{DEFAULT_PREEDIT_BG, DEFAULT_PREEDIT_FG, DEFAULT_PREEDIT_FONT_FAMILY,
                       DEFAULT_PREEDIT_FONT_SIZE, UNDERLINE_THICKNESS};
use crate::error::{PgtkError, PgtkResult};

#[derive(Clone, Debug)]
pub struct PgtkConfig {
    /// Route key input through the toolkit's input-method context.
    pub use_native_input: bool,
    pub preedit_font_family: String,
    pub preedit_font_size: f32,
    /// Explicit font file; wins over family lookup when set.
    pub preedit_font_path: Option<PathBuf>,
    pub preedit_fg: Rgba,
    pub preedit_bg: Rgba,
    pub underline_thickness: u32,
    pub preedit_draw_cursor: bool,
}

impl Default for PgtkConfig {
    fn default() -> Self {
        Self {
            use_native_input: true,
            preedit_font_family: DEFAULT_PREEDIT_FONT_FAMILY.to_string(),
            preedit_font_size: DEFAULT_PREEDIT_FONT_SIZE,
            preedit_font_path: None,
            preedit_fg: DEFAULT_PREEDIT_FG,
            preedit_bg: DEFAULT_PREEDIT_BG,
            underline_thickness: UNDERLINE_THICKNESS,
            preedit_draw_cursor: false,
        }
    }
}

impl PgtkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_native_input(mut self, enabled: bool) -> Self {
        self.use_native_input = enabled;
        self
    }

    pub fn with_preedit_font(mut self, family: &str, size: f32) -> Self {
        self.preedit_font_family = family.to_string();
        self.preedit_font_size = size;
        self
    }

    pub fn with_preedit_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.preedit_font_path = Some(path.into());
        self
    }

    pub fn with_preedit_colors(mut self, fg: Rgba, bg: Rgba) -> Self {
        self.preedit_fg = fg;
        self.preedit_bg = bg;
        self
    }

    pub fn with_underline_thickness(mut self, px: u32) -> Self {
        self.underline_thickness = px.max(1);
        self
    }

    pub fn with_preedit_cursor(mut self, draw: bool) -> Self {
        self.preedit_draw_cursor = draw;
        self
    }

    pub fn validate(&self) -> PgtkResult<()> {
        if !self.preedit_font_size.is_finite() || self.preedit_font_size <= 0.0 {
            return Err(PgtkError::ConfigurationError {
                field: "preedit_font_size".to_string(),
                value: self.preedit_font_size.to_string(),
            });
        }
        if self.preedit_font_family.trim().is_empty() && self.preedit_font_path.is_none() {
            return Err(PgtkError::ConfigurationError {
                field: "preedit_font_family".to_string(),
                value: String::new(),
            });
        }
        if self.underline_thickness == 0 {
            return Err(PgtkError::ConfigurationError {
                field: "underline_thickness".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PgtkConfig::default();
        assert!(config.use_native_input);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = PgtkConfig::new()
            .with_native_input(false)
            .with_preedit_font("Noto Sans CJK JP", 20.0)
            .with_underline_thickness(0)
            .with_preedit_cursor(true);

        assert!(!config.use_native_input);
        assert_eq!(config.preedit_font_family, "Noto Sans CJK JP");
        assert_eq!(config.preedit_font_size, 20.0);
        // Clamped to one pixel
        assert_eq!(config.underline_thickness, 1);
        assert!(config.preedit_draw_cursor);
    }

    #[test]
    fn test_validate_rejects_bad_font_size() {
        let config = PgtkConfig::new().with_preedit_font("Monospace", 0.0);
        match config.validate() {
            Err(PgtkError::ConfigurationError { field, .. }) => assert_eq!(field, "preedit_font_size"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_validate_empty_family_needs_path() {
        let config = PgtkConfig::new().with_preedit_font("  ", 12.0);
        assert!(config.validate().is_err());

        let config = config.with_preedit_font_path("/usr/share/fonts/x.ttf");
        assert!(config.validate().is_ok());
    }
}
