//! Render-backend capability consumed by glyph atlases.
//!
//! Atlases notify the backend when a plane is created, when a rectangle of
//! it changes, and when it is released. Every created plane receives exactly
//! one delete notification, issued from the atlas destructor.

mod gpu;

pub use gpu::WgpuBackend;

use log::trace;

use crate::atlas::{Plane, PlaneRegion};

/// Receiver of plane lifecycle notifications.
///
/// Methods take `&self` because one backend is shared by every atlas; an
/// implementation that tracks state uses interior mutability. Calls always
/// arrive on the thread that owns the atlases.
pub trait PlaneBackend {
    /// A new plane (with its full mip chain) exists.
    fn add_plane(&self, plane: &Plane);

    /// `region` (level 0 coordinates, plane-local) changed in every level.
    fn update_plane(&self, plane: &Plane, region: PlaneRegion);

    /// The plane is about to be dropped.
    fn delete_plane(&self, plane: &Plane);
}

/// Backend for CPU-only use: keeps nothing, logs every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessBackend;

impl PlaneBackend for HeadlessBackend {
    fn add_plane(&self, plane: &Plane) {
        trace!("backend: add plane {:?} ({}px)", plane.id(), plane.size());
    }

    fn update_plane(&self, plane: &Plane, region: PlaneRegion) {
        trace!(
            "backend: update plane {:?} at ({}, {}) {}x{}",
            plane.id(),
            region.x,
            region.y,
            region.width,
            region.height,
        );
    }

    fn delete_plane(&self, plane: &Plane) {
        trace!("backend: delete plane {:?}", plane.id());
    }
}
