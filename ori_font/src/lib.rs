//! Font matching and glyph atlas caching.
//!
//! This crate resolves font requests (explicit families, generic family,
//! style, weight) to loaded faces with CSS-style scoring and generic-bucket
//! fallback, and turns code points into cached glyph bitmaps packed into
//! mipmapped atlas planes. Planes are handed to a render backend through the
//! `PlaneBackend` trait; a wgpu implementation is included.
//!
//! Everything here is single-threaded: atlases rasterize on the caller's
//! thread and notify the backend from it.

#![deny(unsafe_code)]

pub mod atlas;
pub mod backend;
pub mod config;
pub mod cursor;
pub mod error;
pub mod face;
pub mod manager;
pub mod source;
pub mod style;

#[cfg(test)]
mod test_util;

pub use atlas::{AtlasKey, AtlasMetrics, GlyphAtlas, GlyphRecord, LineMetrics, Plane, PlaneId, PlaneRegion};
pub use backend::{HeadlessBackend, PlaneBackend, WgpuBackend};
pub use config::{AtlasConfig, Config};
pub use cursor::{CursorGlyph, FontCursor};
pub use error::{ConfigError, FontLoadError, NoMatchFound, RasterizeError};
pub use face::{FontFace, PresenceIndex};
pub use manager::{FaceId, FontManager, FontRequest};
pub use source::{FileSource, FontSource, GlyphBitmap, Os2Table, Synthesis};
pub use style::{FontStyle, FontWeight, GenericFamily, GenericMask, score};
