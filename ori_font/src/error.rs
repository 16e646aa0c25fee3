//! Error types shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// A font file could not be turned into a face.
///
/// Bulk loaders log and skip these; single-file loads propagate them.
#[derive(Debug, Error)]
pub enum FontLoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported or corrupt font data in {}", path.display())]
    Parse { path: PathBuf },

    #[error("{} has no face at index {index}", path.display())]
    NoSuchFace { path: PathBuf, index: u32 },
}

/// A single glyph could not be placed in an atlas.
///
/// Never escapes the atlas: the glyph degrades to the missing-glyph sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterizeError {
    #[error("no renderable outline for U+{0:04X}")]
    NoOutline(u32),

    #[error("{width}x{height} glyph cell does not fit a {plane_size}px plane")]
    TooLarge {
        width: u32,
        height: u32,
        plane_size: u32,
    },

    #[error("atlas plane limit of {0} reached")]
    PlanesExhausted(u32),
}

/// Every matching and fallback path was exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no font face matches the request")]
pub struct NoMatchFound;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
