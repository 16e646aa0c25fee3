//! Registry of loaded faces and the matching/fallback algorithm.
//!
//! Faces are bucketed by generic family in load order and indexed by their
//! lowercased family names. Matching within a bucket assumes the variants of
//! a family sit contiguously (font sets are grouped by family on load): only
//! the first family group of a bucket is considered, and the best-scoring
//! variant of that group wins.

mod discovery;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use log::{debug, info, warn};

pub use discovery::{default_font_dirs, is_font_file, scan_font_dirs};

use crate::atlas::GlyphAtlas;
use crate::backend::PlaneBackend;
use crate::config::Config;
use crate::error::{FontLoadError, NoMatchFound};
use crate::face::FontFace;
use crate::source::{FileSource, FontSource, face_count};
use crate::style::{FontStyle, FontWeight, GenericFamily, GenericMask, score};

/// Handle to a face owned by a `FontManager`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(usize);

impl FaceId {
    /// Load-order position of the face.
    pub fn index(self) -> usize {
        self.0
    }
}

/// What the caller wants to render with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRequest {
    /// Family names tried in order. CSS generic keywords are allowed.
    pub families: Vec<String>,
    /// Bucket searched when no named family matches.
    pub generic: GenericFamily,
    pub style: FontStyle,
    pub weight: FontWeight,
}

impl FontRequest {
    pub fn new(generic: GenericFamily) -> Self {
        Self {
            families: Vec::new(),
            generic,
            style: FontStyle::Normal,
            weight: FontWeight::NORMAL,
        }
    }

    #[must_use]
    pub fn family(mut self, name: impl Into<String>) -> Self {
        self.families.push(name.into());
        self
    }

    #[must_use]
    pub fn style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }
}

impl Default for FontRequest {
    fn default() -> Self {
        Self::new(GenericFamily::Serif)
    }
}

pub struct FontManager<B: PlaneBackend> {
    faces: Vec<FontFace<B>>,
    /// Bucket per generic family, in load order.
    generics: [Vec<FaceId>; GenericFamily::COUNT],
    /// Lowercased family name (primary and aliases) to faces.
    names: BTreeMap<String, Vec<FaceId>>,
    backend: Rc<B>,
    config: Config,
}

impl<B: PlaneBackend> FontManager<B> {
    pub fn new(backend: B, config: Config) -> Self {
        Self {
            faces: Vec::new(),
            generics: Default::default(),
            names: BTreeMap::new(),
            backend: Rc::new(backend),
            config,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // -- Loading --

    /// Load face 0 of a font file.
    pub fn load(&mut self, path: &Path) -> Result<FaceId, FontLoadError> {
        self.load_face(path, 0)
    }

    /// Load face `face_index` of a font file or collection.
    pub fn load_face(&mut self, path: &Path, face_index: u32) -> Result<FaceId, FontLoadError> {
        let source = FileSource::open(path, face_index)?;
        Ok(self.add_source(path, Box::new(source)))
    }

    /// Load every face of a font file (one for plain fonts, all of a
    /// `.ttc`/`.otc` collection). The file is read once.
    ///
    /// Faces of a collection that fail to open are logged and skipped; the
    /// call fails only when no face loads.
    pub fn load_collection(&mut self, path: &Path) -> Result<Vec<FaceId>, FontLoadError> {
        let faces = self.open_collection(path)?;
        Ok(faces.into_iter().map(|face| self.add_face(face)).collect())
    }

    /// Load a set of font files, skipping (and logging) the ones that fail.
    ///
    /// Faces are registered grouped by family, families in order of first
    /// appearance, so variants spread across the file list still form one
    /// group per bucket. Returns the number of faces loaded.
    pub fn load_font_set<P: AsRef<Path>>(&mut self, paths: impl IntoIterator<Item = P>) -> usize {
        let mut faces = Vec::new();
        for path in paths {
            match self.open_collection(path.as_ref()) {
                Ok(opened) => faces.extend(opened),
                Err(e) => warn!("fonts: skipping {e}"),
            }
        }
        self.add_faces(faces).len()
    }

    /// Scan the configured font directories (platform defaults when none are
    /// configured), then load the configured extra files.
    pub fn load_system_fonts(&mut self) -> usize {
        let dirs = if self.config.fonts.dirs.is_empty() {
            default_font_dirs()
        } else {
            self.config.fonts.dirs.clone()
        };
        let mut files = scan_font_dirs(&dirs);
        files.extend(self.config.fonts.files.iter().cloned());
        let loaded = self.load_font_set(&files);
        info!(
            "fonts: loaded {loaded} faces from {} files in {} dirs",
            files.len(),
            dirs.len()
        );
        loaded
    }

    /// Register a face built over any font source.
    pub fn add_source(&mut self, filename: &Path, source: Box<dyn FontSource>) -> FaceId {
        let face = self.new_face(filename, source);
        self.add_face(face)
    }

    /// Build an unregistered face sharing this manager's backend and atlas
    /// configuration, for use with `add_faces`.
    pub fn new_face(&self, filename: &Path, source: Box<dyn FontSource>) -> FontFace<B> {
        FontFace::from_source(filename, source, Rc::clone(&self.backend), self.config.atlas)
    }

    /// Register faces as one font set. Faces sharing a family name (ignoring
    /// case) are appended contiguously, in their relative order, at the
    /// position of the family's first face.
    pub fn add_faces(&mut self, faces: impl IntoIterator<Item = FontFace<B>>) -> Vec<FaceId> {
        let mut order: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<Vec<FontFace<B>>> = Vec::new();
        for face in faces {
            let key = group_key(&face);
            let next = groups.len();
            let index = *order.entry(key).or_insert(next);
            if index == next {
                groups.push(Vec::new());
            }
            groups[index].push(face);
        }
        groups
            .into_iter()
            .flatten()
            .map(|face| self.add_face(face))
            .collect()
    }

    /// Take ownership of a face: append it to its generic bucket and register
    /// every family name it carries.
    pub fn add_face(&mut self, face: FontFace<B>) -> FaceId {
        let id = FaceId(self.faces.len());
        self.generics[face.generic().index()].push(id);
        let names = face.family_names().to_vec();
        self.faces.push(face);
        for name in &names {
            self.register(name, id);
        }
        debug!("fonts: {:?} registered as {names:?}", id);
        id
    }

    /// Add `family_name` as an alias of `face`.
    pub fn register(&mut self, family_name: &str, face: FaceId) {
        let ids = self.names.entry(family_name.to_lowercase()).or_default();
        if !ids.contains(&face) {
            ids.push(face);
        }
    }

    // -- Access --

    pub fn face(&self, id: FaceId) -> Option<&FontFace<B>> {
        self.faces.get(id.0)
    }

    pub fn face_mut(&mut self, id: FaceId) -> Option<&mut FontFace<B>> {
        self.faces.get_mut(id.0)
    }

    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &FontFace<B>)> {
        self.faces.iter().enumerate().map(|(i, f)| (FaceId(i), f))
    }

    /// Faces of one generic bucket in load order.
    pub fn faces_in(&self, generic: GenericFamily) -> &[FaceId] {
        &self.generics[generic.index()]
    }

    /// Registered family names, lowercased, in sorted order.
    pub fn family_names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Atlas of `face` for rendering at a requested style and weight.
    pub fn atlas(
        &mut self,
        face: FaceId,
        pixel_size: u32,
        style: FontStyle,
        weight: FontWeight,
    ) -> Option<&mut GlyphAtlas<B>> {
        Some(self.face_mut(face)?.atlas_for(pixel_size, style, weight))
    }

    // -- Matching --

    /// Resolve a full request: named families in order, then the generic
    /// bucket with the configured fallback mask.
    pub fn resolve(&self, request: &FontRequest) -> Result<FaceId, NoMatchFound> {
        let mask = self.config.fallback_mask();
        for family in &request.families {
            let found = match GenericFamily::from_css(family) {
                Some(generic) => self.resolve_by_generic(generic, request.style, request.weight, mask),
                None => self.resolve_by_name(family, request.style, request.weight),
            };
            if let Some(id) = found {
                return Ok(id);
            }
        }
        self.resolve_by_generic(request.generic, request.style, request.weight, mask)
            .ok_or(NoMatchFound)
    }

    /// Best variant of the first family group in `generic`'s bucket, moving
    /// through the lowest remaining buckets of `mask` while buckets are empty.
    ///
    /// The requested bucket is always searched first, even when `mask` does
    /// not contain it.
    pub fn resolve_by_generic(
        &self,
        generic: GenericFamily,
        style: FontStyle,
        weight: FontWeight,
        mask: GenericMask,
    ) -> Option<FaceId> {
        let mut mask = mask;
        let mut current = Some(generic);
        while let Some(g) = current {
            if let Some(id) = self.best_in_first_group(&self.generics[g.index()], style, weight) {
                return Some(id);
            }
            mask.remove(g.mask());
            current = mask.lowest();
        }
        None
    }

    /// Best variant among faces carrying `family_name`, ignoring case.
    pub fn resolve_by_name(&self, family_name: &str, style: FontStyle, weight: FontWeight) -> Option<FaceId> {
        let ids = self.names.get(&family_name.to_lowercase())?;
        self.best_of(ids.iter().copied(), style, weight)
    }

    /// A face to try when `current` lacks `codepoint`.
    ///
    /// Later variants of the current face's family are preferred when they
    /// have the glyph. Otherwise matching moves to other buckets: the current
    /// face's bucket is excluded, and when that bucket is not the requested
    /// one every bucket up to it is excluded too.
    pub fn resolve_alternate(
        &self,
        generic: GenericFamily,
        style: FontStyle,
        weight: FontWeight,
        current: FaceId,
        codepoint: u32,
    ) -> Option<FaceId> {
        let cur = self.face(current)?;
        let bucket = &self.generics[cur.generic().index()];
        if let Some(pos) = bucket.iter().position(|&id| id == current) {
            let family = group_key(cur);
            let same_family = bucket[pos + 1..]
                .iter()
                .copied()
                .take_while(|&id| self.faces[id.0].family().to_lowercase() == family)
                .filter(|&id| id != current && self.faces[id.0].has_glyph(codepoint));
            if let Some(id) = self.best_of(same_family, style, weight) {
                return Some(id);
            }
        }

        let mut mask = GenericMask::all() - cur.generic().mask();
        if cur.generic() != generic {
            mask -= GenericMask::through(cur.generic());
        }
        let start = mask.lowest()?;
        self.resolve_by_generic(start, style, weight, mask)
    }

    /// Open every face of a font file without registering them.
    fn open_collection(&self, path: &Path) -> Result<Vec<FontFace<B>>, FontLoadError> {
        let bytes = std::fs::read(path).map_err(|source| FontLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bytes = Arc::new(bytes);
        let count = face_count(&bytes);
        if count == 0 {
            return Err(FontLoadError::Parse {
                path: path.to_path_buf(),
            });
        }

        let mut faces = Vec::with_capacity(count as usize);
        let mut first_error = None;
        for index in 0..count {
            match FileSource::from_bytes(Arc::clone(&bytes), index, path) {
                Ok(source) => faces.push(self.new_face(path, Box::new(source))),
                Err(e) => {
                    warn!("fonts: skipping face {index} of {}: {e}", path.display());
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) if faces.is_empty() => Err(e),
            _ => Ok(faces),
        }
    }

    fn best_in_first_group(&self, bucket: &[FaceId], style: FontStyle, weight: FontWeight) -> Option<FaceId> {
        let first = self.faces.get(bucket.first()?.0)?;
        let family = group_key(first);
        let group = bucket
            .iter()
            .copied()
            .take_while(|&id| self.faces[id.0].family().to_lowercase() == family);
        self.best_of(group, style, weight)
    }

    /// First candidate reaching the maximum score.
    fn best_of(
        &self,
        candidates: impl Iterator<Item = FaceId>,
        style: FontStyle,
        weight: FontWeight,
    ) -> Option<FaceId> {
        let mut best: Option<(FaceId, u32)> = None;
        for id in candidates {
            let face = &self.faces[id.0];
            let s = score(face.style(), face.weight(), style, weight);
            if best.is_none_or(|(_, b)| s > b) {
                best = Some((id, s));
            }
        }
        best.map(|(id, _)| id)
    }
}

impl<B: PlaneBackend> std::fmt::Debug for FontManager<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontManager")
            .field("faces", &self.faces.len())
            .field("families", &self.names.len())
            .finish_non_exhaustive()
    }
}

/// Family group identity within a bucket.
fn group_key<B: PlaneBackend>(face: &FontFace<B>) -> String {
    face.family().to_lowercase()
}

#[cfg(test)]
mod tests;
