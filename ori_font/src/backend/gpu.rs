//! wgpu backend: one mipmapped `R8Unorm` texture per plane.

use std::cell::RefCell;
use std::collections::HashMap;

use log::debug;

use super::PlaneBackend;
use crate::atlas::{Plane, PlaneId, PlaneRegion};

struct PlaneTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Uploads atlas planes to GPU textures.
///
/// Sub-rectangle updates write every mip level of the touched region
/// straight from the plane's CPU copy.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    textures: RefCell<HashMap<PlaneId, PlaneTexture>>,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            textures: RefCell::new(HashMap::new()),
        }
    }

    /// Run `f` with the texture view of a live plane.
    pub fn with_view<R>(&self, plane: PlaneId, f: impl FnOnce(&wgpu::TextureView) -> R) -> Option<R> {
        self.textures.borrow().get(&plane).map(|t| f(&t.view))
    }

    /// Number of live plane textures.
    pub fn texture_count(&self) -> usize {
        self.textures.borrow().len()
    }

    fn write_region(&self, texture: &wgpu::Texture, plane: &Plane, region: PlaneRegion) {
        for level in 0..plane.level_count() {
            let r = region.at_level(level);
            let stride = plane.level_size(level);
            let Some(layout) = copy_layout(r, stride) else {
                continue;
            };
            self.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d { x: r.x, y: r.y, z: 0 },
                    aspect: wgpu::TextureAspect::All,
                },
                plane.level(level),
                wgpu::TexelCopyBufferLayout {
                    offset: layout.offset,
                    bytes_per_row: Some(layout.bytes_per_row),
                    rows_per_image: Some(r.height),
                },
                wgpu::Extent3d {
                    width: r.width,
                    height: r.height,
                    depth_or_array_layers: 1,
                },
            );
        }
    }
}

impl PlaneBackend for WgpuBackend {
    fn add_plane(&self, plane: &Plane) {
        let size = plane.size();
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glyph_atlas_plane"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: plane.level_count() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let full = PlaneRegion {
            x: 0,
            y: 0,
            width: size,
            height: size,
        };
        self.write_region(&texture, plane, full);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        debug!("wgpu: plane {:?} texture {size}px", plane.id());
        self.textures
            .borrow_mut()
            .insert(plane.id(), PlaneTexture { texture, view });
    }

    fn update_plane(&self, plane: &Plane, region: PlaneRegion) {
        let textures = self.textures.borrow();
        if let Some(t) = textures.get(&plane.id()) {
            self.write_region(&t.texture, plane, region);
        }
    }

    fn delete_plane(&self, plane: &Plane) {
        if let Some(t) = self.textures.borrow_mut().remove(&plane.id()) {
            t.texture.destroy();
        }
    }
}

/// Buffer layout of a sub-rectangle inside a tightly packed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CopyLayout {
    offset: u64,
    bytes_per_row: u32,
}

fn copy_layout(region: PlaneRegion, stride: u32) -> Option<CopyLayout> {
    if region.is_empty() || region.x + region.width > stride || region.y + region.height > stride {
        return None;
    }
    Some(CopyLayout {
        offset: u64::from(region.y) * u64::from(stride) + u64::from(region.x),
        bytes_per_row: stride,
    })
}
