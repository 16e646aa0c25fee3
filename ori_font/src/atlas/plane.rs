//! Square single-channel bitmap planes with a complete mip chain.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::source::GlyphBitmap;

static NEXT_PLANE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique plane identity, stable for the plane's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneId(u64);

/// Axis-aligned rectangle in plane-local texels of one level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaneRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PlaneRegion {
    /// The texels covering this region at mip `level`.
    pub fn at_level(self, level: usize) -> Self {
        let shift = level as u32;
        let x0 = self.x >> shift;
        let y0 = self.y >> shift;
        let x1 = (self.x + self.width).div_ceil(1 << shift);
        let y1 = (self.y + self.height).div_ceil(1 << shift);
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// One atlas texture: `levels[0]` is `size` x `size`, each following level
/// halves both dimensions down to 1 x 1.
pub struct Plane {
    id: PlaneId,
    index: u32,
    size: u32,
    levels: Vec<Vec<u8>>,
}

impl std::fmt::Debug for Plane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plane")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("size", &self.size)
            .field("levels", &self.levels.len())
            .finish()
    }
}

impl Plane {
    /// Allocate a zeroed plane. `size` must be a power of two.
    pub(crate) fn new(index: u32, size: u32) -> Self {
        let count = size.ilog2() as usize + 1;
        let levels = (0..count)
            .map(|l| {
                let s = (size >> l) as usize;
                vec![0u8; s * s]
            })
            .collect();
        Self {
            id: PlaneId(NEXT_PLANE_ID.fetch_add(1, Ordering::Relaxed)),
            index,
            size,
            levels,
        }
    }

    pub fn id(&self) -> PlaneId {
        self.id
    }

    /// Position in the owning atlas's plane sequence.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Level 0 edge length.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Edge length of mip `level`.
    pub fn level_size(&self, level: usize) -> u32 {
        (self.size >> level).max(1)
    }

    /// Row-major texels of mip `level`.
    pub fn level(&self, level: usize) -> &[u8] {
        self.levels.get(level).map_or(&[], Vec::as_slice)
    }

    /// Copy `bitmap` into `level` with its top-left at `clip` origin offset by
    /// `(dx, dy)`. Texels outside `clip` are discarded.
    pub(crate) fn blit(&mut self, level: usize, clip: PlaneRegion, dx: i32, dy: i32, bitmap: &GlyphBitmap) {
        let stride = self.level_size(level) as i64;
        let Some(dst) = self.levels.get_mut(level) else {
            return;
        };
        let clip_x1 = (i64::from(clip.x) + i64::from(clip.width)).min(stride);
        let clip_y1 = (i64::from(clip.y) + i64::from(clip.height)).min(stride);
        let ox = i64::from(clip.x) + i64::from(dx);
        let oy = i64::from(clip.y) + i64::from(dy);
        let w = i64::from(bitmap.width);

        // Visible column span of the bitmap, relative to its left edge.
        let col0 = (i64::from(clip.x) - ox).max(0);
        let col1 = (clip_x1 - ox).min(w);
        if col0 >= col1 {
            return;
        }

        for row in 0..i64::from(bitmap.height) {
            let ty = oy + row;
            if ty < i64::from(clip.y) || ty >= clip_y1 {
                continue;
            }
            let src_start = (row * w + col0) as usize;
            let src_end = (row * w + col1) as usize;
            let Some(src) = bitmap.data.get(src_start..src_end) else {
                return;
            };
            let dst_start = (ty * stride + ox + col0) as usize;
            dst[dst_start..dst_start + src.len()].copy_from_slice(src);
        }
    }

    /// Regenerate levels `first..` inside `region` (level 0 coordinates) by
    /// 2x2 box filtering the level above.
    pub(crate) fn downsample_from(&mut self, first: usize, region: PlaneRegion) {
        for level in first.max(1)..self.levels.len() {
            let src_size = self.level_size(level - 1) as usize;
            let dst_size = self.level_size(level) as usize;
            let r = region.at_level(level);
            let (upper, lower) = self.levels.split_at_mut(level);
            let src = &upper[level - 1];
            let dst = &mut lower[0];

            for y in r.y as usize..(r.y + r.height) as usize {
                for x in r.x as usize..(r.x + r.width) as usize {
                    let sx = (x * 2).min(src_size - 1);
                    let sy = (y * 2).min(src_size - 1);
                    let sx1 = (sx + 1).min(src_size - 1);
                    let sy1 = (sy + 1).min(src_size - 1);
                    let sum = u32::from(src[sy * src_size + sx])
                        + u32::from(src[sy * src_size + sx1])
                        + u32::from(src[sy1 * src_size + sx])
                        + u32::from(src[sy1 * src_size + sx1]);
                    dst[y * dst_size + x] = ((sum + 2) / 4) as u8;
                }
            }
        }
    }
}
