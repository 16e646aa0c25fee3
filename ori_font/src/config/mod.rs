//! Configuration: font locations, atlas geometry, and generic fallback order.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::style::{GenericFamily, GenericMask};

const MIN_PLANE_SIZE: u32 = 64;
const MAX_PLANE_SIZE: u32 = 4096;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fonts: FontsConfig,
    pub atlas: AtlasConfig,
    pub matching: MatchConfig,
}

/// Where fonts come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsConfig {
    /// Directories scanned recursively. Empty means the platform defaults.
    pub dirs: Vec<PathBuf>,
    /// Extra font files loaded after the directory scan.
    pub files: Vec<PathBuf>,
}

/// Plane geometry and rendering scale of new atlases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub plane_size: u32,
    /// Upper bound on planes per atlas. Glyphs that would need more degrade
    /// to the missing-glyph sentinel.
    pub max_planes: u32,
    pub dpi_scale: f32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            plane_size: 512,
            max_planes: 8,
            dpi_scale: 1.0,
        }
    }
}

impl AtlasConfig {
    /// Plane size clamped to [64, 4096] and rounded up to a power of two.
    pub fn effective_plane_size(&self) -> u32 {
        self.plane_size
            .clamp(MIN_PLANE_SIZE, MAX_PLANE_SIZE)
            .next_power_of_two()
    }

    /// At least one plane.
    pub fn effective_max_planes(&self) -> u32 {
        self.max_planes.max(1)
    }

    /// DPI scale clamped to [0.5, 4.0]; non-finite values mean 1.0.
    pub fn effective_dpi_scale(&self) -> f32 {
        if self.dpi_scale.is_finite() {
            self.dpi_scale.clamp(0.5, 4.0)
        } else {
            1.0
        }
    }
}

/// Generic buckets eligible when the requested one is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub fallback: Vec<GenericFamily>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            fallback: GenericFamily::ALL.to_vec(),
        }
    }
}

impl Config {
    /// Fallback buckets as a mask. The bucket order is fixed; this list only
    /// selects which buckets may be visited.
    pub fn fallback_mask(&self) -> GenericMask {
        GenericMask::from_families(self.matching.fallback.iter().copied())
    }

    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load from `path`, falling back to defaults on any failure (logged).
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(cfg) => {
                debug!("config: loaded from {}", path.display());
                cfg
            }
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                debug!("config: {} not found, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("config: {e}");
                Self::default()
            }
        }
    }

    /// Load from `path`, preserving the distinction between a missing file
    /// and a parse error.
    pub fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Platform configuration directory for `ori_font`.
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("ori_font");
        }
        PathBuf::from(".").join("ori_font")
    }
    #[cfg(not(target_os = "windows"))]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("ori_font");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".config").join("ori_font");
        }
        PathBuf::from(".").join("ori_font")
    }
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}
