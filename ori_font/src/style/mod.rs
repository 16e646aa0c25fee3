//! Font request vocabulary: generic families, styles, weights, and the
//! CSS-style candidate scoring used by every matching path.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Coarse font category. The discriminant is the bucket index used by the
/// font manager and by `GenericMask` bit positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenericFamily {
    Serif = 0,
    SansSerif = 1,
    Monospace = 2,
    Cursive = 3,
    Fantasy = 4,
    /// No classification available.
    #[serde(rename = "none")]
    Unspecified = 5,
}

impl GenericFamily {
    /// Number of generic buckets.
    pub const COUNT: usize = 6;

    /// All generic families in bucket order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Serif,
        Self::SansSerif,
        Self::Monospace,
        Self::Cursive,
        Self::Fantasy,
        Self::Unspecified,
    ];

    /// Bucket index (0–5).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Single-bit mask for this bucket.
    pub fn mask(self) -> GenericMask {
        GenericMask::from_bits_truncate(1 << self as u8)
    }

    /// Parse a CSS generic family keyword. Returns `None` for anything that
    /// is a concrete family name.
    pub fn from_css(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "serif" => Some(Self::Serif),
            "sans-serif" => Some(Self::SansSerif),
            "monospace" => Some(Self::Monospace),
            "cursive" => Some(Self::Cursive),
            "fantasy" => Some(Self::Fantasy),
            _ => None,
        }
    }
}

bitflags! {
    /// Set of generic buckets still eligible during fallback.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GenericMask: u8 {
        const SERIF = 1 << 0;
        const SANS_SERIF = 1 << 1;
        const MONOSPACE = 1 << 2;
        const CURSIVE = 1 << 3;
        const FANTASY = 1 << 4;
        const UNSPECIFIED = 1 << 5;
    }
}

impl GenericMask {
    /// Lowest set bucket (bit-scan-forward order).
    pub fn lowest(self) -> Option<GenericFamily> {
        if self.is_empty() {
            return None;
        }
        GenericFamily::from_index(self.bits().trailing_zeros() as usize)
    }

    /// Every bucket with an index up to and including `generic`.
    pub fn through(generic: GenericFamily) -> Self {
        let bits = (1u16 << (generic.index() + 1)) - 1;
        Self::from_bits_truncate(bits as u8)
    }

    pub fn from_families(families: impl IntoIterator<Item = GenericFamily>) -> Self {
        families
            .into_iter()
            .fold(Self::empty(), |mask, g| mask | g.mask())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    /// Italic or oblique.
    pub fn is_slanted(self) -> bool {
        self != Self::Normal
    }
}

/// CSS numeric font weight (100–900 in steps of 100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const THIN: Self = Self(100);
    pub const EXTRA_LIGHT: Self = Self(200);
    pub const LIGHT: Self = Self(300);
    pub const NORMAL: Self = Self(400);
    pub const MEDIUM: Self = Self(500);
    pub const SEMI_BOLD: Self = Self(600);
    pub const BOLD: Self = Self(700);
    pub const EXTRA_BOLD: Self = Self(800);
    pub const BLACK: Self = Self(900);

    /// Map an OS/2 `usWeightClass` value onto the nine CSS weights.
    ///
    /// Legacy fonts store 1–9 instead of 100–900.
    pub fn from_class(class: u16) -> Self {
        const LEGACY: [u16; 10] = [400, 100, 200, 300, 400, 500, 600, 700, 800, 900];
        match class {
            0..=9 => Self(LEGACY[class as usize]),
            c => Self(((c.saturating_add(50)) / 100 * 100).clamp(100, 900)),
        }
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Rank a candidate face against a requested style and weight.
///
/// Higher is better; callers keep the first candidate reaching the maximum.
/// The two weight branches are intentionally not mirror images.
pub fn score(
    candidate_style: FontStyle,
    candidate_weight: FontWeight,
    requested_style: FontStyle,
    requested_weight: FontWeight,
) -> u32 {
    let style_score = if candidate_style == requested_style {
        200
    } else if requested_style == FontStyle::Italic && candidate_style == FontStyle::Oblique {
        100
    } else {
        0
    };

    let cand = u32::from(candidate_weight.0);
    let req = u32::from(requested_weight.0);
    let weight_score = if cand == req {
        10
    } else if req <= 400 {
        if req == 400 && cand == 500 {
            9
        } else if cand < req {
            9u32.saturating_sub((req - cand) / 100)
        } else {
            1000u32.saturating_sub(cand) / 100
        }
    } else if req == 500 && cand == 400 {
        9
    } else if req < cand {
        9u32.saturating_sub((cand - req) / 100)
    } else {
        cand / 100
    };

    style_score + weight_score
}
