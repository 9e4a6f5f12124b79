//! Font resources and the process-wide font registry.
//!
//! A font is read and parsed at most once per process per canonical path.
//! Registration happens under a mutex so concurrent first use from several
//! chunk tasks cannot race; afterwards the parsed font is shared read-only
//! through an `Arc`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use serde::{Deserialize, Serialize};
use ttf_parser::{Face, GlyphId};

use crate::error::{Error, Result};

/// Where to find the TrueType/OpenType font used for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontLocator(PathBuf);

impl FontLocator {
    /// Create a locator for a font file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Get the font path.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Resolve through the global registry, registering on first use.
    pub fn load(&self) -> Result<Arc<RegisteredFont>> {
        FontRegistry::global().load(self)
    }
}

impl Default for FontLocator {
    fn default() -> Self {
        Self::new("./font/Vazirmatn-Regular.ttf")
    }
}

impl From<&str> for FontLocator {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for FontLocator {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for FontLocator {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<PathBuf> for FontLocator {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

/// Glyph id and horizontal advance in font units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    /// Glyph index in the font
    pub id: u16,
    /// Advance width in font units
    pub advance: u16,
}

/// A parsed font with the metrics needed for layout and embedding.
#[derive(Debug)]
pub struct RegisteredFont {
    name: String,
    path: PathBuf,
    data: Vec<u8>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    line_gap: i16,
    glyphs: HashMap<char, Glyph>,
    notdef: Glyph,
}

impl RegisteredFont {
    /// Parse font bytes read from `path`.
    pub fn parse(path: &Path, data: Vec<u8>) -> Result<Self> {
        let invalid = |reason: String| Error::FontInvalid {
            path: path.to_path_buf(),
            reason,
        };

        let face = Face::parse(&data, 0).map_err(|e| invalid(e.to_string()))?;

        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code| {
                    let (Some(ch), Some(gid)) = (char::from_u32(code), subtable.glyph_index(code))
                    else {
                        return;
                    };
                    let advance = face.glyph_hor_advance(gid).unwrap_or(0);
                    glyphs.entry(ch).or_insert(Glyph { id: gid.0, advance });
                });
            }
        }
        if glyphs.is_empty() {
            return Err(invalid("no Unicode character map".into()));
        }

        let units_per_em = face.units_per_em();
        let notdef = Glyph {
            id: 0,
            advance: face.glyph_hor_advance(GlyphId(0)).unwrap_or(units_per_em / 2),
        };

        Ok(Self {
            name: pdf_font_name(path),
            path: path.to_path_buf(),
            units_per_em,
            ascender: face.ascender(),
            descender: face.descender(),
            line_gap: face.line_gap(),
            glyphs,
            notdef,
            data,
        })
    }

    /// Sanitized name derived from the file stem.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path the font was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw font program bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Font units per em.
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Typographic ascender in font units.
    pub fn ascender(&self) -> i16 {
        self.ascender
    }

    /// Typographic descender in font units (negative).
    pub fn descender(&self) -> i16 {
        self.descender
    }

    /// Line gap in font units.
    pub fn line_gap(&self) -> i16 {
        self.line_gap
    }

    /// Natural line height in points at `size`: ascender to descender plus
    /// the line gap.
    pub fn line_height(&self, size: f32) -> f32 {
        let units = i32::from(self.ascender) - i32::from(self.descender) + i32::from(self.line_gap);
        units.max(1) as f32 * size / f32::from(self.units_per_em)
    }

    /// Check if the font maps `ch` to a real glyph.
    pub fn has_glyph(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }

    /// Glyph for `ch`, or `.notdef` when unmapped.
    pub fn glyph(&self, ch: char) -> Glyph {
        self.glyphs.get(&ch).copied().unwrap_or(self.notdef)
    }

    /// Advance of `ch` in points at `size`.
    pub fn char_width(&self, ch: char, size: f32) -> f32 {
        self.to_points(self.glyph(ch).advance, size)
    }

    /// Advance of `text` in points at `size`.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.glyph(c).advance)).sum();
        units as f32 * size / f32::from(self.units_per_em)
    }

    /// Scale a font-unit value to points at `size`.
    pub fn to_points(&self, units: u16, size: f32) -> f32 {
        f32::from(units) * size / f32::from(self.units_per_em)
    }
}

/// Derive a PDF base font name from the file stem.
fn pdf_font_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut out = String::with_capacity(stem.len());
    for ch in stem.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            out.push(ch);
        } else if ch.is_whitespace() {
            out.push('-');
        }
    }
    if out.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        out
    }
}

/// Registry of parsed fonts keyed by canonical path.
#[derive(Debug, Default)]
pub struct FontRegistry {
    fonts: Mutex<HashMap<PathBuf, Arc<RegisteredFont>>>,
    registrations: AtomicUsize,
}

impl FontRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, created on first use.
    pub fn global() -> &'static FontRegistry {
        static REGISTRY: OnceLock<FontRegistry> = OnceLock::new();
        REGISTRY.get_or_init(FontRegistry::new)
    }

    /// Return the font for `locator`, registering it on first use.
    pub fn load(&self, locator: &FontLocator) -> Result<Arc<RegisteredFont>> {
        let path = locator.path();
        let key = fs::canonicalize(path).map_err(|_| Error::FontNotFound(path.to_path_buf()))?;

        let mut fonts = self.fonts.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(font) = fonts.get(&key) {
            log::debug!("Font already registered: {}", font.name());
            return Ok(Arc::clone(font));
        }

        if !key.is_file() {
            return Err(Error::FontNotFound(path.to_path_buf()));
        }
        let data = fs::read(&key).map_err(|e| Error::FontInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let font = Arc::new(RegisteredFont::parse(path, data)?);

        fonts.insert(key, Arc::clone(&font));
        self.registrations.fetch_add(1, Ordering::SeqCst);
        log::info!("Font registered: {} ({})", font.name(), path.display());
        Ok(font)
    }

    /// Check if `locator` has been registered.
    pub fn is_registered(&self, locator: &FontLocator) -> bool {
        let Ok(key) = fs::canonicalize(locator.path()) else {
            return false;
        };
        self.fonts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key)
    }

    /// Number of successful registrations so far.
    pub fn registration_count(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::thread;

    pub(crate) fn fixture_font() -> FontLocator {
        FontLocator::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/DejaVuSans.ttf"
        ))
    }

    #[test]
    fn test_missing_font() {
        let registry = FontRegistry::new();
        let err = registry
            .load(&FontLocator::new("/definitely/not/here.ttf"))
            .unwrap_err();
        assert!(matches!(err, Error::FontNotFound(_)));
        assert_eq!(registry.registration_count(), 0);
    }

    #[test]
    fn test_directory_is_not_a_font() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FontRegistry::new();
        let err = registry.load(&FontLocator::new(dir.path())).unwrap_err();
        assert!(matches!(err, Error::FontNotFound(_)));
    }

    #[test]
    fn test_invalid_font() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        fs::write(&path, b"this is not a font").unwrap();

        let registry = FontRegistry::new();
        let err = registry.load(&FontLocator::new(&path)).unwrap_err();
        assert!(matches!(err, Error::FontInvalid { .. }));
        assert!(!registry.is_registered(&FontLocator::new(&path)));
    }

    #[test]
    fn test_fixture_metrics() {
        let registry = FontRegistry::new();
        let font = registry.load(&fixture_font()).unwrap();
        assert_eq!(font.name(), "DejaVuSans");
        assert!(font.units_per_em() > 0);
        assert!(font.has_glyph('A'));
        assert!(font.has_glyph('\u{0628}'));
        assert!(font.text_width("AA", 10.0) > font.text_width("A", 10.0));
        assert_eq!(font.glyph('\u{E000}').id, 0);
        assert!(font.line_height(10.0) > 10.0);
    }

    #[test]
    fn test_concurrent_first_use_registers_once() {
        let registry = FontRegistry::new();
        let locator = fixture_font();

        let fonts: Vec<Arc<RegisteredFont>> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| registry.load(&locator).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(registry.registration_count(), 1);
        assert!(fonts.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert!(registry.is_registered(&locator));
    }

    #[test]
    fn test_pdf_font_name_sanitized() {
        assert_eq!(pdf_font_name(Path::new("fonts/Vazirmatn Regular.ttf")), "Vazirmatn-Regular");
        assert_eq!(pdf_font_name(Path::new("فونت.ttf")), "EmbeddedFont");
    }
}
