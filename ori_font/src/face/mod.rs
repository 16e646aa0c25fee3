//! A loaded font face: classification, presence index, and atlas cache.
//!
//! Classification and the presence index are computed once at construction;
//! atlases are created on first request per (pixel size, bold, oblique) and
//! live as long as the face.

mod presence;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::debug;

pub use presence::PresenceIndex;

use crate::atlas::{AtlasKey, GlyphAtlas};
use crate::backend::PlaneBackend;
use crate::config::AtlasConfig;
use crate::error::FontLoadError;
use crate::source::{DesignMetrics, FileSource, FontSource, Os2Table, Synthesis};
use crate::style::{FontStyle, FontWeight, GenericFamily};

/// Immutable face state shared with every atlas of the face.
pub(crate) struct FaceData {
    pub(crate) filename: PathBuf,
    pub(crate) source: Box<dyn FontSource>,
    pub(crate) presence: PresenceIndex,
    pub(crate) design: DesignMetrics,
    pub(crate) os2: Option<Os2Table>,
}

pub struct FontFace<B: PlaneBackend> {
    data: Rc<FaceData>,
    /// Primary family name.
    family: String,
    /// Primary name first, then aliases, deduplicated ignoring case.
    family_names: Vec<String>,
    generic: GenericFamily,
    style: FontStyle,
    weight: FontWeight,
    fixed_pitch: bool,
    atlases: HashMap<AtlasKey, GlyphAtlas<B>>,
    backend: Rc<B>,
    atlas_config: AtlasConfig,
}

impl<B: PlaneBackend> FontFace<B> {
    /// Open face `face_index` of the font file at `path`.
    pub fn open(
        path: &Path,
        face_index: u32,
        backend: Rc<B>,
        atlas_config: AtlasConfig,
    ) -> Result<Self, FontLoadError> {
        let source = FileSource::open(path, face_index)?;
        Ok(Self::from_source(path, Box::new(source), backend, atlas_config))
    }

    /// Build a face over any font source. `filename` names the face in logs
    /// and supplies the family name when the source has none.
    pub fn from_source(
        filename: impl Into<PathBuf>,
        source: Box<dyn FontSource>,
        backend: Rc<B>,
        atlas_config: AtlasConfig,
    ) -> Self {
        let filename = filename.into();
        let family_names = collect_family_names(source.family_names(), &filename);
        let family = family_names.first().cloned().unwrap_or_default();

        let os2 = source.os2();
        let fixed_pitch = source.is_fixed_pitch();
        let (style, weight, mut generic) = match &os2 {
            Some(t) => (t.style(), t.weight(), t.generic_family()),
            None => (FontStyle::Normal, FontWeight::NORMAL, GenericFamily::Unspecified),
        };
        if generic == GenericFamily::Unspecified && fixed_pitch {
            generic = GenericFamily::Monospace;
        }

        let presence = PresenceIndex::new(source.codepoints());
        let design = source.design_metrics();
        debug!(
            "face: {} family={family:?} generic={generic:?} style={style:?} weight={} glyphs={}",
            filename.display(),
            weight.value(),
            presence.len() - 1,
        );

        Self {
            data: Rc::new(FaceData {
                filename,
                source,
                presence,
                design,
                os2,
            }),
            family,
            family_names,
            generic,
            style,
            weight,
            fixed_pitch,
            atlases: HashMap::new(),
            backend,
            atlas_config,
        }
    }

    pub fn filename(&self) -> &Path {
        &self.data.filename
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn family_names(&self) -> &[String] {
        &self.family_names
    }

    pub fn generic(&self) -> GenericFamily {
        self.generic
    }

    pub fn style(&self) -> FontStyle {
        self.style
    }

    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    pub fn is_fixed_pitch(&self) -> bool {
        self.fixed_pitch
    }

    pub fn presence(&self) -> &PresenceIndex {
        &self.data.presence
    }

    pub fn os2(&self) -> Option<&Os2Table> {
        self.data.os2.as_ref()
    }

    pub fn has_glyph(&self, codepoint: u32) -> bool {
        self.data.presence.contains(codepoint)
    }

    /// Atlas for `(pixel_size, bold, oblique)`, created on first request.
    pub fn atlas(&mut self, pixel_size: u32, bold: bool, oblique: bool) -> &mut GlyphAtlas<B> {
        let key = AtlasKey {
            pixel_size,
            bold,
            oblique,
        };
        let data = &self.data;
        let backend = &self.backend;
        let config = &self.atlas_config;
        self.atlases
            .entry(key)
            .or_insert_with(|| GlyphAtlas::new(Rc::clone(data), Rc::clone(backend), key, config))
    }

    /// Atlas for rendering this face at a requested style and weight,
    /// synthesizing what the face lacks.
    pub fn atlas_for(
        &mut self,
        pixel_size: u32,
        style: FontStyle,
        weight: FontWeight,
    ) -> &mut GlyphAtlas<B> {
        let synthesis = self.synthesis_for(style, weight);
        self.atlas(pixel_size, synthesis.bold, synthesis.oblique)
    }

    /// Bold when a heavy weight is requested from a regular-or-lighter face;
    /// oblique when a slant is requested from an upright face.
    pub fn synthesis_for(&self, style: FontStyle, weight: FontWeight) -> Synthesis {
        Synthesis {
            bold: weight.value() >= 700 && self.weight.value() <= 400,
            oblique: style.is_slanted() && !self.style.is_slanted(),
        }
    }

    /// Cached atlas, if one exists for `key`.
    pub fn cached_atlas(&self, key: AtlasKey) -> Option<&GlyphAtlas<B>> {
        self.atlases.get(&key)
    }

    /// Cached atlases in key order.
    pub fn atlases(&self) -> impl Iterator<Item = &GlyphAtlas<B>> {
        let mut atlases: Vec<_> = self.atlases.values().collect();
        atlases.sort_by_key(|a| a.key());
        atlases.into_iter()
    }
}

impl<B: PlaneBackend> std::fmt::Debug for FontFace<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("filename", &self.data.filename)
            .field("family", &self.family)
            .field("generic", &self.generic)
            .field("style", &self.style)
            .field("weight", &self.weight)
            .field("atlases", &self.atlases.len())
            .finish_non_exhaustive()
    }
}

/// Trim, drop empties and case-insensitive duplicates, and fall back to the
/// file stem when nothing is left.
fn collect_family_names(raw: Vec<String>, filename: &Path) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(raw.len());
    for name in raw {
        let name = name.trim();
        if name.is_empty() || names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            continue;
        }
        names.push(name.to_owned());
    }
    if names.is_empty() {
        let stem = filename
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        names.push(stem);
    }
    names
}
