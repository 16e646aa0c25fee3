//! Test doubles: a scriptable font source and a recording backend.

use std::cell::RefCell;
use std::rc::Rc;

use crate::atlas::{Plane, PlaneId, PlaneRegion};
use crate::backend::PlaneBackend;
use crate::error::RasterizeError;
use crate::source::{DesignMetrics, FontSource, GlyphBitmap, Os2Table, Selection, Synthesis};
use crate::style::{FontStyle, FontWeight, GenericFamily};

/// One `rasterize` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterCall {
    pub codepoint: u32,
    pub size: f32,
    pub synthesis: Synthesis,
}

/// Font source with scripted metadata and solid box glyphs.
///
/// Glyphs are `ceil(size / 2)` x `ceil(size)` boxes filled with a byte derived
/// from the code point. U+0020 renders empty with an advance.
#[derive(Debug, Clone)]
pub struct FakeSource {
    names: Vec<String>,
    os2: Option<Os2Table>,
    fixed_pitch: bool,
    codepoints: Vec<u32>,
    failing: Vec<u32>,
    box_size: Option<(u32, u32)>,
    calls: Rc<RefCell<Vec<RasterCall>>>,
}

impl FakeSource {
    pub fn new(family: &str) -> Self {
        Self {
            names: vec![family.to_owned()],
            os2: Some(os2_for(GenericFamily::Serif, FontStyle::Normal, FontWeight::NORMAL)),
            fixed_pitch: false,
            codepoints: ('A'..='Z').map(u32::from).chain([0x20]).collect(),
            failing: Vec::new(),
            box_size: None,
            calls: Rc::default(),
        }
    }

    /// Classification through a synthesized OS/2 table.
    pub fn class(mut self, generic: GenericFamily, style: FontStyle, weight: u16) -> Self {
        self.os2 = Some(os2_for(generic, style, FontWeight(weight)));
        self
    }

    pub fn no_os2(mut self) -> Self {
        self.os2 = None;
        self
    }

    pub fn fixed_pitch(mut self) -> Self {
        self.fixed_pitch = true;
        self
    }

    pub fn alias(mut self, name: &str) -> Self {
        self.names.push(name.to_owned());
        self
    }

    pub fn nameless(mut self) -> Self {
        self.names.clear();
        self
    }

    pub fn codepoints(mut self, cps: impl IntoIterator<Item = u32>) -> Self {
        self.codepoints = cps.into_iter().collect();
        self
    }

    pub fn with_codepoint(mut self, cp: u32) -> Self {
        self.codepoints.push(cp);
        self
    }

    /// `rasterize(cp)` returns an error.
    pub fn failing(mut self, cp: u32) -> Self {
        self.failing.push(cp);
        self
    }

    /// Every non-empty glyph renders at this fixed size.
    pub fn box_size(mut self, width: u32, height: u32) -> Self {
        self.box_size = Some((width, height));
        self
    }

    /// Shared log of `rasterize` calls.
    pub fn calls(&self) -> Rc<RefCell<Vec<RasterCall>>> {
        Rc::clone(&self.calls)
    }

    pub fn boxed(self) -> Box<dyn FontSource> {
        Box::new(self)
    }
}

/// Fill byte of a fake glyph.
pub fn fill_for(codepoint: u32) -> u8 {
    (codepoint % 200 + 50) as u8
}

fn os2_for(generic: GenericFamily, style: FontStyle, weight: FontWeight) -> Os2Table {
    let panose = match generic {
        GenericFamily::Serif => [2, 2, 6, 3, 0, 0, 0, 0, 0, 0],
        GenericFamily::SansSerif => [2, 11, 6, 3, 0, 0, 0, 0, 0, 0],
        GenericFamily::Monospace => [2, 11, 6, 9, 0, 0, 0, 0, 0, 0],
        GenericFamily::Cursive => [3, 1, 0, 0, 0, 0, 0, 0, 0, 0],
        GenericFamily::Fantasy => [4, 1, 0, 0, 0, 0, 0, 0, 0, 0],
        GenericFamily::Unspecified => [0; 10],
    };
    let selection = match style {
        FontStyle::Normal => Selection::REGULAR,
        FontStyle::Italic => Selection::ITALIC,
        FontStyle::Oblique => Selection::OBLIQUE,
    };
    Os2Table {
        version: 4,
        weight_class: weight.value(),
        strikeout_size: 50,
        strikeout_position: 250,
        family_class: 0,
        panose,
        selection,
        typo_ascender: 800,
        typo_descender: -200,
        typo_line_gap: 100,
        x_height: Some(500),
    }
}

impl FontSource for FakeSource {
    fn family_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn os2(&self) -> Option<Os2Table> {
        self.os2
    }

    fn design_metrics(&self) -> DesignMetrics {
        DesignMetrics::default()
    }

    fn is_fixed_pitch(&self) -> bool {
        self.fixed_pitch
    }

    fn codepoints(&self) -> Vec<u32> {
        self.codepoints.clone()
    }

    fn rasterize(
        &self,
        codepoint: u32,
        pixel_size: f32,
        synthesis: Synthesis,
    ) -> Result<GlyphBitmap, RasterizeError> {
        self.calls.borrow_mut().push(RasterCall {
            codepoint,
            size: pixel_size,
            synthesis,
        });
        if self.failing.contains(&codepoint) {
            return Err(RasterizeError::NoOutline(codepoint));
        }
        let advance = pixel_size * 0.6;
        if codepoint == 0x20 {
            return Ok(GlyphBitmap {
                advance,
                ..GlyphBitmap::default()
            });
        }
        let (width, height) = self.box_size.unwrap_or_else(|| {
            let h = pixel_size.ceil().max(1.0) as u32;
            (h.div_ceil(2), h)
        });
        Ok(GlyphBitmap {
            width,
            height,
            left: 1,
            top: (height as f32 * 0.8).round() as i32,
            advance,
            data: vec![fill_for(codepoint); (width * height) as usize],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneEvent {
    Add { id: PlaneId, index: u32 },
    Update { id: PlaneId, region: PlaneRegion },
    Delete { id: PlaneId },
}

/// Backend that records every notification.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    events: RefCell<Vec<PlaneEvent>>,
}

impl RecordingBackend {
    pub fn events(&self) -> Vec<PlaneEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&PlaneEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }

    pub fn adds(&self) -> usize {
        self.count(|e| matches!(e, PlaneEvent::Add { .. }))
    }

    pub fn deletes(&self) -> usize {
        self.count(|e| matches!(e, PlaneEvent::Delete { .. }))
    }
}

impl PlaneBackend for RecordingBackend {
    fn add_plane(&self, plane: &Plane) {
        self.events.borrow_mut().push(PlaneEvent::Add {
            id: plane.id(),
            index: plane.index(),
        });
    }

    fn update_plane(&self, plane: &Plane, region: PlaneRegion) {
        self.events.borrow_mut().push(PlaneEvent::Update {
            id: plane.id(),
            region,
        });
    }

    fn delete_plane(&self, plane: &Plane) {
        self.events.borrow_mut().push(PlaneEvent::Delete { id: plane.id() });
    }
}
