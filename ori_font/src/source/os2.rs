//! Raw OS/2 table reader and the style/weight/generic classification built on it.
//!
//! Offsets follow the OpenType OS/2 layout. Version 0 tables are 78 bytes;
//! `sxHeight` arrives with version 2.

use bitflags::bitflags;

use crate::style::{FontStyle, FontWeight, GenericFamily};

/// Minimum length of a version 0 table.
const MIN_LEN: usize = 78;

const PANOSE_LATIN_TEXT: u8 = 2;
const PANOSE_LATIN_HAND_WRITTEN: u8 = 3;
const PANOSE_LATIN_DECORATIVE: u8 = 4;
const PANOSE_MONOSPACED: u8 = 9;

bitflags! {
    /// `fsSelection` bits.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Selection: u16 {
        const ITALIC = 1 << 0;
        const UNDERSCORE = 1 << 1;
        const NEGATIVE = 1 << 2;
        const OUTLINED = 1 << 3;
        const STRIKEOUT = 1 << 4;
        const BOLD = 1 << 5;
        const REGULAR = 1 << 6;
        const USE_TYPO_METRICS = 1 << 7;
        const WWS = 1 << 8;
        const OBLIQUE = 1 << 9;
    }
}

/// Fields of the OS/2 table this crate consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Os2Table {
    pub version: u16,
    pub weight_class: u16,
    pub strikeout_size: i16,
    pub strikeout_position: i16,
    /// IBM font class (high byte) and subclass (low byte).
    pub family_class: i16,
    pub panose: [u8; 10],
    pub selection: Selection,
    pub typo_ascender: i16,
    pub typo_descender: i16,
    pub typo_line_gap: i16,
    pub x_height: Option<i16>,
}

impl Os2Table {
    /// Parse the table from its raw bytes. Returns `None` if truncated.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < MIN_LEN {
            return None;
        }
        let version = read_u16(data, 0)?;
        let mut panose = [0u8; 10];
        panose.copy_from_slice(data.get(32..42)?);
        let x_height = if version >= 2 {
            read_i16(data, 86)
        } else {
            None
        };

        Some(Self {
            version,
            weight_class: read_u16(data, 4)?,
            strikeout_size: read_i16(data, 26)?,
            strikeout_position: read_i16(data, 28)?,
            family_class: read_i16(data, 30)?,
            panose,
            selection: Selection::from_bits_retain(read_u16(data, 62)?),
            typo_ascender: read_i16(data, 68)?,
            typo_descender: read_i16(data, 70)?,
            typo_line_gap: read_i16(data, 72)?,
            x_height,
        })
    }

    pub fn style(&self) -> FontStyle {
        if self.selection.contains(Selection::OBLIQUE) {
            FontStyle::Oblique
        } else if self.selection.contains(Selection::ITALIC) {
            FontStyle::Italic
        } else {
            FontStyle::Normal
        }
    }

    pub fn weight(&self) -> FontWeight {
        if self.weight_class == 0 && self.selection.contains(Selection::BOLD) {
            return FontWeight::BOLD;
        }
        FontWeight::from_class(self.weight_class)
    }

    /// Classify into one of the six generic buckets.
    ///
    /// PANOSE proportion wins, then PANOSE family kind and serif style, then
    /// the IBM family class.
    pub fn generic_family(&self) -> GenericFamily {
        let [family_kind, serif_style, _, proportion, ..] = self.panose;
        if proportion == PANOSE_MONOSPACED {
            return GenericFamily::Monospace;
        }
        match family_kind {
            PANOSE_LATIN_TEXT => match serif_style {
                11..=13 => GenericFamily::SansSerif,
                2..=10 | 14 | 15 => GenericFamily::Serif,
                _ => self.ibm_generic(),
            },
            PANOSE_LATIN_HAND_WRITTEN => GenericFamily::Cursive,
            PANOSE_LATIN_DECORATIVE => GenericFamily::Fantasy,
            _ => self.ibm_generic(),
        }
    }

    fn ibm_generic(&self) -> GenericFamily {
        match self.family_class >> 8 {
            1..=5 | 7 => GenericFamily::Serif,
            8 => GenericFamily::SansSerif,
            9 => GenericFamily::Fantasy,
            10 => GenericFamily::Cursive,
            _ => GenericFamily::Unspecified,
        }
    }
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn read_i16(data: &[u8], offset: usize) -> Option<i16> {
    read_u16(data, offset).map(|v| v as i16)
}
