//! Glyph atlas: lazily rasterized glyphs packed into mipmapped planes.
//!
//! One atlas serves one face at one pixel size and synthesis pair. Glyph
//! records form an array parallel to the face's presence index, so lookup is
//! a binary search followed by an index. Records are append-only: once a slot
//! is initialized its placement never changes, and nothing is evicted.
//!
//! The first `LOD_LEVELS` mip levels are rendered independently at halved
//! pixel sizes, which keeps hinting legible at small scales. Deeper levels
//! are box filtered from the last rendered one.

mod glyph;
mod metrics;
mod packer;
mod plane;

use std::rc::Rc;

use log::{debug, trace, warn};

pub use glyph::GlyphRecord;
pub use metrics::{AtlasMetrics, LineMetrics};
pub use plane::{Plane, PlaneId, PlaneRegion};

use packer::RowPacker;

use crate::backend::PlaneBackend;
use crate::config::AtlasConfig;
use crate::error::RasterizeError;
use crate::face::FaceData;
use crate::source::Synthesis;

/// Number of independently rendered mip levels.
pub const LOD_LEVELS: usize = 3;

/// Cell alignment so every rendered level lands on whole texels.
pub const CELL_ALIGN: u32 = 1 << (LOD_LEVELS - 1);

/// Empty texels added right and below each glyph before alignment.
pub const CELL_PADDING: u32 = 1;

/// Cache key of an atlas within its face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtlasKey {
    pub pixel_size: u32,
    pub bold: bool,
    pub oblique: bool,
}

impl AtlasKey {
    pub fn synthesis(self) -> Synthesis {
        Synthesis {
            bold: self.bold,
            oblique: self.oblique,
        }
    }
}

pub struct GlyphAtlas<B: PlaneBackend> {
    face: Rc<FaceData>,
    backend: Rc<B>,
    key: AtlasKey,
    /// DPI-scaled level 0 pixel size.
    nominal_size: f32,
    /// Render size of each rendered level (full, half, quarter).
    lod_sizes: [f32; LOD_LEVELS],
    plane_size: u32,
    max_planes: u32,
    planes: Vec<Plane>,
    /// Parallel to the face's presence index.
    glyphs: Vec<GlyphRecord>,
    packer: RowPacker,
    metrics: AtlasMetrics,
    /// Slots bound to the sentinel after a failed rasterization.
    failed: usize,
}

impl<B: PlaneBackend> GlyphAtlas<B> {
    /// Build an atlas with one plane and the missing-glyph sentinel in slot 0.
    pub(crate) fn new(face: Rc<FaceData>, backend: Rc<B>, key: AtlasKey, config: &AtlasConfig) -> Self {
        let plane_size = config.effective_plane_size();
        let nominal_size = key.pixel_size as f32 * config.effective_dpi_scale();
        let lod_sizes = std::array::from_fn(|level| nominal_size / (1u32 << level) as f32);
        let metrics = AtlasMetrics::new(&face.design, face.os2.as_ref(), nominal_size);
        let glyphs = vec![GlyphRecord::default(); face.presence.len()];

        let mut atlas = Self {
            face,
            backend,
            key,
            nominal_size,
            lod_sizes,
            plane_size,
            max_planes: config.effective_max_planes(),
            planes: Vec::new(),
            glyphs,
            packer: RowPacker::new(plane_size),
            metrics,
            failed: 0,
        };
        atlas.push_plane();

        let sentinel = match atlas.rasterize_slot(0) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "atlas: missing-glyph sentinel failed for {}: {e}",
                    atlas.face.filename.display()
                );
                GlyphRecord {
                    initialized: true,
                    ..GlyphRecord::default()
                }
            }
        };
        atlas.glyphs[0] = sentinel;
        debug!(
            "atlas: {} at {}px (bold={}, oblique={}), {} slots",
            atlas.face.filename.display(),
            atlas.nominal_size,
            key.bold,
            key.oblique,
            atlas.glyphs.len(),
        );
        atlas
    }

    /// Record for `codepoint`, rasterizing it on first use.
    ///
    /// Code points the face does not map, and glyphs that fail to render or
    /// place, return the slot 0 sentinel.
    pub fn glyph(&mut self, codepoint: u32) -> GlyphRecord {
        let Some(slot) = self.face.presence.slot(codepoint) else {
            return self.glyphs[0];
        };
        if self.glyphs[slot].initialized {
            return self.glyphs[slot];
        }
        let record = match self.rasterize_slot(slot) {
            Ok(record) => record,
            Err(e) => {
                match e {
                    RasterizeError::PlanesExhausted(_) => warn!("atlas: U+{codepoint:04X}: {e}"),
                    _ => trace!("atlas: U+{codepoint:04X}: {e}"),
                }
                self.failed += 1;
                self.glyphs[0]
            }
        };
        self.glyphs[slot] = record;
        record
    }

    /// Cached record for `codepoint` without rasterizing.
    pub fn cached(&self, codepoint: u32) -> Option<GlyphRecord> {
        let slot = self.face.presence.slot(codepoint)?;
        let record = self.glyphs[slot];
        record.initialized.then_some(record)
    }

    pub fn key(&self) -> AtlasKey {
        self.key
    }

    pub fn nominal_size(&self) -> f32 {
        self.nominal_size
    }

    pub fn lod_sizes(&self) -> [f32; LOD_LEVELS] {
        self.lod_sizes
    }

    pub fn metrics(&self) -> &AtlasMetrics {
        &self.metrics
    }

    /// Metrics for drawing this atlas at `target` pixels.
    pub fn line_metrics(&self, target: f32) -> LineMetrics {
        self.metrics.line_metrics(self.nominal_size, target)
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn plane_size(&self) -> u32 {
        self.plane_size
    }

    /// Number of slots (the face's presence index length).
    pub fn slot_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Number of slots resolved so far: the sentinel, rendered glyphs, and
    /// failed glyphs bound to the sentinel.
    pub fn initialized_count(&self) -> usize {
        self.glyphs.iter().filter(|g| g.initialized).count()
    }

    /// Slots that hold their own rendering, the sentinel included.
    pub fn rasterized_count(&self) -> usize {
        self.initialized_count() - self.failed
    }

    /// Slots that failed to render and show the sentinel instead.
    pub fn failed_count(&self) -> usize {
        self.failed
    }

    /// Plane-local `[u0, v0, u1, v1]` of a record from this atlas.
    pub fn uv(&self, record: &GlyphRecord) -> [f32; 4] {
        record.uv(self.plane_size)
    }

    fn push_plane(&mut self) {
        let plane = Plane::new(self.planes.len() as u32, self.plane_size);
        debug!(
            "atlas: plane {} ({}px, {} levels) for {}",
            plane.index(),
            plane.size(),
            plane.level_count(),
            self.face.filename.display(),
        );
        self.backend.add_plane(&plane);
        self.planes.push(plane);
    }

    /// Render every level of one glyph and place it.
    fn rasterize_slot(&mut self, slot: usize) -> Result<GlyphRecord, RasterizeError> {
        let codepoint = self.face.presence.codepoint(slot);
        let synthesis = self.key.synthesis();
        let full = self
            .face
            .source
            .rasterize(codepoint, self.lod_sizes[0], synthesis)?;

        let mut record = GlyphRecord {
            advance: full.advance,
            left: full.left,
            top: full.top,
            width: full.width,
            height: full.height,
            x: 0,
            y: 0,
            initialized: true,
        };
        if full.is_empty() {
            return Ok(record);
        }

        let cell_w = (full.width + CELL_PADDING).next_multiple_of(CELL_ALIGN);
        let cell_h = (full.height + CELL_PADDING).next_multiple_of(CELL_ALIGN);
        let placed = self.packer.pack(cell_w, cell_h, self.max_planes)?;
        if placed.new_plane {
            self.push_plane();
        }

        let cell = PlaneRegion {
            x: placed.x,
            y: placed.y,
            width: cell_w,
            height: cell_h,
        };
        let Some(plane) = self.planes.get_mut(placed.plane as usize) else {
            return Err(RasterizeError::PlanesExhausted(self.max_planes));
        };
        plane.blit(0, cell, 0, 0, &full);

        for level in 1..LOD_LEVELS {
            let scale = (1u32 << level) as f32;
            match self
                .face
                .source
                .rasterize(codepoint, self.lod_sizes[level], synthesis)
            {
                Ok(lod) if !lod.is_empty() => {
                    // Keep the pen origin of the reduced render on the scaled
                    // origin of the full-resolution one.
                    let dx = lod.left - (full.left as f32 / scale).round() as i32;
                    let dy = (full.top as f32 / scale).round() as i32 - lod.top;
                    plane.blit(level, cell.at_level(level), dx, dy, &lod);
                }
                Ok(_) => {}
                Err(e) => trace!("atlas: U+{codepoint:04X} level {level}: {e}"),
            }
        }
        plane.downsample_from(LOD_LEVELS, cell);
        self.backend.update_plane(plane, cell);

        record.x = placed.x;
        record.y = placed.plane * self.plane_size + placed.y;
        trace!(
            "atlas: U+{codepoint:04X} -> plane {} ({}, {}) {}x{}",
            placed.plane,
            placed.x,
            placed.y,
            full.width,
            full.height,
        );
        Ok(record)
    }
}

impl<B: PlaneBackend> Drop for GlyphAtlas<B> {
    fn drop(&mut self) {
        for plane in &self.planes {
            self.backend.delete_plane(plane);
        }
    }
}

impl<B: PlaneBackend> std::fmt::Debug for GlyphAtlas<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphAtlas")
            .field("key", &self.key)
            .field("nominal_size", &self.nominal_size)
            .field("planes", &self.planes.len())
            .field("slots", &self.glyphs.len())
            .finish_non_exhaustive()
    }
}
