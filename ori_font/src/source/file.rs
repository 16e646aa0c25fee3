//! File-backed font source: raw bytes shared with swash and `ttf_parser`.

use std::cell::RefCell;
use std::path::Path;
use std::sync::Arc;

use rustybuzz::ttf_parser::{self, PlatformId, Tag, name_id};
use swash::scale::image::Image;
use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::{Angle, Format, Transform};
use swash::{CacheKey, FontRef, StringId};

use super::{DesignMetrics, FontSource, GlyphBitmap, Os2Table, Synthesis};
use crate::error::{FontLoadError, RasterizeError};

/// Shear applied for synthetic oblique, in degrees.
const OBLIQUE_SKEW_DEGREES: f32 = 14.0;

/// Emboldening strength per pixel of glyph size.
const EMBOLDEN_PER_PX: f32 = 1.0 / 24.0;

/// One face of a font file.
///
/// Bytes live in an `Arc<Vec<u8>>` so every face of a collection shares one
/// buffer. Swash `FontRef`s and `ttf_parser` faces borrow it transiently.
pub struct FileSource {
    bytes: Arc<Vec<u8>>,
    face_index: u32,
    /// Byte offset to the table directory (from `FontRef::from_index`).
    offset: u32,
    /// Cache key for `ScaleContext` reuse.
    cache_key: CacheKey,
    scale_context: RefCell<ScaleContext>,
}

impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSource")
            .field("len", &self.bytes.len())
            .field("face_index", &self.face_index)
            .finish_non_exhaustive()
    }
}

impl FileSource {
    /// Read `path` and open the face at `face_index`.
    pub fn open(path: &Path, face_index: u32) -> Result<Self, FontLoadError> {
        let bytes = std::fs::read(path).map_err(|source| FontLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(Arc::new(bytes), face_index, path)
    }

    /// Open a face from bytes already in memory. `path` is used for errors.
    pub fn from_bytes(
        bytes: Arc<Vec<u8>>,
        face_index: u32,
        path: &Path,
    ) -> Result<Self, FontLoadError> {
        let count = face_count(&bytes);
        if count == 0 {
            return Err(FontLoadError::Parse {
                path: path.to_path_buf(),
            });
        }
        if face_index >= count {
            return Err(FontLoadError::NoSuchFace {
                path: path.to_path_buf(),
                index: face_index,
            });
        }
        let Some((offset, cache_key)) = validate_font(&bytes, face_index) else {
            return Err(FontLoadError::Parse {
                path: path.to_path_buf(),
            });
        };
        Ok(Self {
            bytes,
            face_index,
            offset,
            cache_key,
            scale_context: RefCell::new(ScaleContext::new()),
        })
    }

    /// Shared font bytes, for opening sibling faces of a collection.
    pub fn bytes(&self) -> &Arc<Vec<u8>> {
        &self.bytes
    }

    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    fn font_ref(&self) -> FontRef<'_> {
        FontRef {
            data: &self.bytes,
            offset: self.offset,
            key: self.cache_key,
        }
    }

    /// Parsed `ttf_parser` face. Validated at construction, so `None` only for
    /// a table directory swash accepts and `ttf_parser` rejects.
    fn ttf_face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.bytes, self.face_index).ok()
    }
}

/// Number of faces in a font file or collection. Zero for unreadable data.
pub fn face_count(bytes: &[u8]) -> u32 {
    match ttf_parser::fonts_in_collection(bytes) {
        Some(n) => n,
        None if ttf_parser::Face::parse(bytes, 0).is_ok() => 1,
        None => 0,
    }
}

/// Validate font bytes with both parsers and extract swash identifiers.
fn validate_font(bytes: &[u8], face_index: u32) -> Option<(u32, CacheKey)> {
    ttf_parser::Face::parse(bytes, face_index).ok()?;
    let fr = FontRef::from_index(bytes, face_index as usize)?;
    Some((fr.offset, fr.key))
}

impl FontSource for FileSource {
    fn family_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(primary) = self
            .font_ref()
            .localized_strings()
            .find_by_id(StringId::Family, Some("en"))
        {
            names.push(primary.to_string());
        }

        if let Some(face) = self.ttf_face() {
            for record in face.names() {
                if record.name_id != name_id::FAMILY || !record.is_unicode() {
                    continue;
                }
                if !matches!(record.platform_id, PlatformId::Windows | PlatformId::Unicode) {
                    continue;
                }
                if let Some(name) = record.to_string() {
                    names.push(name);
                }
            }
        }

        names.retain(|n| !n.trim().is_empty());
        names
    }

    fn os2(&self) -> Option<Os2Table> {
        let face = self.ttf_face()?;
        let data = face.raw_face().table(Tag::from_bytes(b"OS/2"))?;
        Os2Table::parse(data)
    }

    fn design_metrics(&self) -> DesignMetrics {
        let m = self.font_ref().metrics(&[]);
        DesignMetrics {
            units_per_em: m.units_per_em.max(1),
            ascender: m.ascent.round() as i16,
            descender: -(m.descent.round() as i16),
            line_gap: m.leading.round() as i16,
            underline_position: m.underline_offset.round() as i16,
            underline_thickness: m.stroke_size.round() as i16,
        }
    }

    fn is_fixed_pitch(&self) -> bool {
        self.font_ref().metrics(&[]).is_monospace
    }

    fn codepoints(&self) -> Vec<u32> {
        let Some(face) = self.ttf_face() else {
            return Vec::new();
        };
        let Some(cmap) = face.tables().cmap else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for subtable in cmap.subtables {
            if !subtable.is_unicode() {
                continue;
            }
            subtable.codepoints(|cp| {
                if subtable.glyph_index(cp).is_some_and(|g| g.0 != 0) {
                    out.push(cp);
                }
            });
        }
        out
    }

    fn rasterize(
        &self,
        codepoint: u32,
        pixel_size: f32,
        synthesis: Synthesis,
    ) -> Result<GlyphBitmap, RasterizeError> {
        let fr = self.font_ref();
        // Code point 0 renders .notdef as the missing-glyph box.
        let glyph_id = fr.charmap().map(codepoint);
        if glyph_id == 0 && codepoint != 0 {
            return Err(RasterizeError::NoOutline(codepoint));
        }
        let advance = fr
            .glyph_metrics(&[])
            .scale(pixel_size)
            .advance_width(glyph_id);

        let embolden = if synthesis.bold {
            (pixel_size * EMBOLDEN_PER_PX).max(0.5)
        } else {
            0.0
        };
        let skew = synthesis.oblique.then(|| {
            Transform::skew(
                Angle::from_degrees(OBLIQUE_SKEW_DEGREES),
                Angle::from_degrees(0.0),
            )
        });

        let mut ctx = self.scale_context.borrow_mut();
        let mut scaler = ctx.builder(fr).size(pixel_size).hint(true).build();
        let image = Render::new(&[Source::Outline])
            .format(Format::Alpha)
            .embolden(embolden)
            .transform(skew)
            .render(&mut scaler, glyph_id);

        glyph_bitmap(image, codepoint, advance)
    }
}

/// Convert a swash render result. Blank glyphs (spaces) come back as a 0x0
/// image; `None` means rendering failed.
fn glyph_bitmap(image: Option<Image>, codepoint: u32, advance: f32) -> Result<GlyphBitmap, RasterizeError> {
    let image = image.ok_or(RasterizeError::NoOutline(codepoint))?;
    Ok(GlyphBitmap {
        width: image.placement.width,
        height: image.placement.height,
        left: image.placement.left,
        top: image.placement.top,
        advance,
        data: image.data,
    })
}
