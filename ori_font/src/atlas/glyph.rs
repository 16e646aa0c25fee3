/// Cached placement and metrics of one glyph in an atlas.
///
/// `y` is global across the plane sequence: the plane index is
/// `y / plane_size`. Bearings and size are in level 0 pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlyphRecord {
    /// Horizontal advance in pixels.
    pub advance: f32,
    /// X bearing (positive = right of origin).
    pub left: i32,
    /// Y bearing (positive = above baseline).
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
    pub initialized: bool,
}

impl GlyphRecord {
    /// Whether the glyph occupies atlas space.
    pub fn has_bitmap(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Index of the plane holding the bitmap.
    pub fn plane(&self, plane_size: u32) -> u32 {
        self.y / plane_size
    }

    /// Plane-local `[u0, v0, u1, v1]` texture coordinates.
    pub fn uv(&self, plane_size: u32) -> [f32; 4] {
        let ps = plane_size as f32;
        let x = self.x as f32;
        let y = (self.y % plane_size) as f32;
        [
            x / ps,
            y / ps,
            (x + self.width as f32) / ps,
            (y + self.height as f32) / ps,
        ]
    }
}
