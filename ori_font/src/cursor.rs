//! Per-run font selection state carried by the caller.
//!
//! A cursor remembers the request and its primary face, and finds a face for
//! each code point by walking alternates when the primary lacks the glyph.

use crate::atlas::{AtlasKey, GlyphRecord};
use crate::backend::PlaneBackend;
use crate::error::NoMatchFound;
use crate::manager::{FaceId, FontManager, FontRequest};
use crate::style::{FontStyle, FontWeight, GenericFamily};

/// A glyph resolved through a cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorGlyph {
    pub face: FaceId,
    /// Atlas within `face` holding the glyph.
    pub atlas: AtlasKey,
    pub record: GlyphRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontCursor {
    generic: GenericFamily,
    style: FontStyle,
    weight: FontWeight,
    pixel_size: u32,
    primary: FaceId,
}

impl FontCursor {
    pub fn new<B: PlaneBackend>(
        manager: &FontManager<B>,
        request: &FontRequest,
        pixel_size: u32,
    ) -> Result<Self, NoMatchFound> {
        let primary = manager.resolve(request)?;
        Ok(Self {
            generic: request.generic,
            style: request.style,
            weight: request.weight,
            pixel_size,
            primary,
        })
    }

    pub fn primary(&self) -> FaceId {
        self.primary
    }

    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    /// Face to render `codepoint` with.
    ///
    /// Each alternate is tried at most once; when none has the glyph the
    /// primary face is returned and its atlas yields the sentinel.
    pub fn face_for<B: PlaneBackend>(&self, manager: &FontManager<B>, codepoint: u32) -> FaceId {
        let has = |id: FaceId| manager.face(id).is_some_and(|f| f.has_glyph(codepoint));
        if has(self.primary) {
            return self.primary;
        }

        let mut tried = vec![self.primary];
        let mut current = self.primary;
        while let Some(next) =
            manager.resolve_alternate(self.generic, self.style, self.weight, current, codepoint)
        {
            if tried.contains(&next) {
                break;
            }
            if has(next) {
                return next;
            }
            tried.push(next);
            current = next;
        }
        self.primary
    }

    /// Resolve and rasterize `codepoint`.
    pub fn glyph<B: PlaneBackend>(&self, manager: &mut FontManager<B>, codepoint: u32) -> Option<CursorGlyph> {
        let face = self.face_for(manager, codepoint);
        let atlas = manager.atlas(face, self.pixel_size, self.style, self.weight)?;
        let record = atlas.glyph(codepoint);
        Some(CursorGlyph {
            face,
            atlas: atlas.key(),
            record,
        })
    }
}
