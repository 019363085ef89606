//! fontdue-backed glyph source and font file lookup

use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};

use crate::config::PgtkConfig;
use crate::error::{PgtkError, PgtkResult};
use crate::preedit::render::{Glyph, GlyphSource, LineMetrics};

/// Glyphs rasterised by fontdue at a fixed pixel size
pub struct FontdueGlyphs {
    font: Font,
    px: f32,
}

impl FontdueGlyphs {
    pub fn from_bytes(data: Vec<u8>, px: f32) -> PgtkResult<Self> {
        let settings = FontSettings {
            scale: px,
            ..Default::default()
        };
        let font = Font::from_bytes(data, settings)
            .map_err(|e| PgtkError::FontLoad { message: e.to_string() })?;
        Ok(Self { font, px })
    }

    pub fn from_path(path: &Path, px: f32) -> PgtkResult<Self> {
        let data = std::fs::read(path)?;
        tracing::debug!("Loaded preedit font {} ({} bytes)", path.display(), data.len());
        Self::from_bytes(data, px)
    }

    /// Explicit font path from the config, else a lookup of the family.
    pub fn from_config(config: &PgtkConfig) -> PgtkResult<Self> {
        let path = match &config.preedit_font_path {
            Some(path) => path.clone(),
            None => find_font_file(&config.preedit_font_family)?,
        };
        Self::from_path(&path, config.preedit_font_size)
    }
}

impl GlyphSource for FontdueGlyphs {
    fn line_metrics(&self) -> LineMetrics {
        match self.font.horizontal_line_metrics(self.px) {
            Some(m) => LineMetrics {
                ascent: m.ascent,
                descent: -m.descent,
            },
            None => LineMetrics {
                ascent: self.px * 0.8,
                descent: self.px * 0.2,
            },
        }
    }

    fn glyph(&self, ch: char) -> Glyph {
        let (metrics, coverage) = self.font.rasterize(ch, self.px);
        Glyph {
            advance: metrics.advance_width,
            width: metrics.width,
            height: metrics.height,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            coverage,
        }
    }
}

/// Resolve a font family to a file.
pub fn find_font_file(family: &str) -> PgtkResult<PathBuf> {
    #[cfg(all(target_os = "linux", feature = "font-discovery"))]
    {
        if let Some(fc) = fontconfig::Fontconfig::new() {
            if let Some(font) = fc.find(family, None) {
                tracing::debug!("fontconfig matched {} -> {}", family, font.path.display());
                return Ok(font.path);
            }
        }
        tracing::warn!("fontconfig lookup failed for {}, scanning font directories", family);
    }

    scan_font_dirs(family, &default_search_paths())
        .ok_or_else(|| PgtkError::FontNotFound { family: family.to_string() })
}

fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("/System/Library/Fonts"),
    ];
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        paths.push(home.join(".fonts"));
        paths.push(home.join(".local/share/fonts"));
    }
    paths
}

fn is_font_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
        Some("ttf") | Some("otf")
    )
}

fn squash(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Depth-first search for a font file whose name contains the family.
pub(crate) fn scan_font_dirs(family: &str, search_paths: &[PathBuf]) -> Option<PathBuf> {
    let wanted = squash(family);
    let mut stack: Vec<PathBuf> = search_paths.to_vec();
    let mut fallback = None;

    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else { continue };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if !is_font_file(&path) {
                continue;
            }
            let stem = path.file_stem().and_then(|s| s.to_str()).map(squash).unwrap_or_default();
            if !wanted.is_empty() && stem.contains(&wanted) {
                return Some(path);
            }
            if fallback.is_none() {
                fallback = Some(path);
            }
        }
    }

    // Any font beats no preedit at all
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pgtk-font-test-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("truetype/dejavu")).unwrap();
        dir
    }

    #[test]
    fn test_scan_prefers_matching_family() {
        let dir = temp_dir("match");
        std::fs::write(dir.join("truetype/Other-Regular.ttf"), b"").unwrap();
        std::fs::write(dir.join("truetype/dejavu/DejaVuSansMono.ttf"), b"").unwrap();
        std::fs::write(dir.join("README.txt"), b"").unwrap();

        let found = scan_font_dirs("DejaVu Sans Mono", &[dir.clone()]).unwrap();
        assert!(found.ends_with("DejaVuSansMono.ttf"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_scan_falls_back_to_any_font() {
        let dir = temp_dir("fallback");
        std::fs::write(dir.join("truetype/Other-Regular.otf"), b"").unwrap();

        let found = scan_font_dirs("Noto Sans CJK", &[dir.clone()]).unwrap();
        assert!(found.ends_with("Other-Regular.otf"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_scan_nothing_found() {
        let dir = temp_dir("empty");
        assert!(scan_font_dirs("Monospace", &[dir.clone()]).is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_font_bytes() {
        match FontdueGlyphs::from_bytes(vec![0, 1, 2, 3], 16.0) {
            Err(PgtkError::FontLoad { .. }) => {}
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_missing_font_path() {
        let config = PgtkConfig::default().with_preedit_font_path("/nonexistent/pgtk/font.ttf");
        assert!(matches!(FontdueGlyphs::from_config(&config), Err(PgtkError::Io { .. })));
    }
}
