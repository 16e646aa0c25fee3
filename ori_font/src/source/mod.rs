//! Font introspection and rendering capability consumed by faces and atlases.
//!
//! `FontSource` is the narrow seam between matching/caching logic and the
//! font-parsing library. `FileSource` implements it on top of swash (rendering)
//! and the `ttf_parser` re-exported by rustybuzz (tables, names, cmap).

mod file;
pub mod os2;

pub use file::{FileSource, face_count};
pub use os2::{Os2Table, Selection};

use crate::error::RasterizeError;

/// Synthetic rendering transforms requested for an atlas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Synthesis {
    /// Outline thickening.
    pub bold: bool,
    /// Horizontal shear.
    pub oblique: bool,
}

/// Rasterized glyph coverage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    /// X bearing (positive = right of origin).
    pub left: i32,
    /// Y bearing (positive = above baseline).
    pub top: i32,
    /// Horizontal advance in pixels.
    pub advance: f32,
    /// Row-major 8-bit coverage, `width * height` bytes.
    pub data: Vec<u8>,
}

impl GlyphBitmap {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Vertical metrics in font design units, always available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesignMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    /// Negative below the baseline.
    pub descender: i16,
    pub line_gap: i16,
    pub underline_position: i16,
    pub underline_thickness: i16,
}

impl Default for DesignMetrics {
    fn default() -> Self {
        Self {
            units_per_em: 1000,
            ascender: 800,
            descender: -200,
            line_gap: 0,
            underline_position: -100,
            underline_thickness: 50,
        }
    }
}

/// Capability interface over one face of a font file.
pub trait FontSource {
    /// Family names. The first entry is the primary name; the rest are
    /// aliases from platform-specific name records. May contain duplicates
    /// differing only in case.
    fn family_names(&self) -> Vec<String>;

    /// The OS/2 style, weight, and classification table, if present.
    fn os2(&self) -> Option<Os2Table>;

    fn design_metrics(&self) -> DesignMetrics;

    /// Whether the face declares itself fixed-pitch.
    fn is_fixed_pitch(&self) -> bool {
        false
    }

    /// Every code point mapped to a real glyph, in any order.
    fn codepoints(&self) -> Vec<u32>;

    /// Render one code point at `pixel_size` with optional synthesis.
    fn rasterize(
        &self,
        codepoint: u32,
        pixel_size: f32,
        synthesis: Synthesis,
    ) -> Result<GlyphBitmap, RasterizeError>;
}
