//! Row packer scoped to the current plane.
//!
//! Cells are placed left to right; a cell that would overflow the plane width
//! wraps to a new row at the tallest cell of the finished row, and a row that
//! would cross the plane bottom starts the next plane at its origin.

use crate::error::RasterizeError;

/// Where a packed cell landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Plane-local position.
    pub x: u32,
    pub y: u32,
    pub plane: u32,
    /// The cell is the first on a plane that does not exist yet.
    pub new_plane: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPacker {
    plane_size: u32,
    plane: u32,
    x: u32,
    y: u32,
    row_height: u32,
}

impl RowPacker {
    pub fn new(plane_size: u32) -> Self {
        Self {
            plane_size,
            plane: 0,
            x: 0,
            y: 0,
            row_height: 0,
        }
    }

    /// Reserve a `width` x `height` cell.
    ///
    /// The cursor only advances on success, so a failed request can be
    /// followed by smaller ones that still fit.
    pub fn pack(&mut self, width: u32, height: u32, max_planes: u32) -> Result<Slot, RasterizeError> {
        let size = self.plane_size;
        if width > size || height > size {
            return Err(RasterizeError::TooLarge {
                width,
                height,
                plane_size: size,
            });
        }

        let mut next = *self;
        if next.x + width > size {
            next.x = 0;
            next.y += next.row_height;
            next.row_height = 0;
        }

        let mut new_plane = false;
        if next.y + height > size {
            if next.plane + 1 >= max_planes {
                return Err(RasterizeError::PlanesExhausted(max_planes));
            }
            next.plane += 1;
            next.x = 0;
            next.y = 0;
            next.row_height = 0;
            new_plane = true;
        }

        let slot = Slot {
            x: next.x,
            y: next.y,
            plane: next.plane,
            new_plane,
        };
        next.x += width;
        next.row_height = next.row_height.max(height);
        *self = next;
        Ok(slot)
    }
}
