//! Vertical metrics of an atlas at its nominal size, and their scaling to a
//! render size.

use crate::source::{DesignMetrics, Os2Table};

/// Pixel metrics at the atlas's nominal size. Offsets are relative to the
/// baseline with positive values above it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasMetrics {
    pub ascender: f32,
    /// Negative below the baseline.
    pub descender: f32,
    pub line_gap: f32,
    pub x_height: f32,
    pub strikeout_position: f32,
    pub strikeout_size: f32,
    pub underline_position: f32,
    pub underline_thickness: f32,
    /// Correction that puts the baseline on a whole pixel at full
    /// resolution. The line height is rounded to whole pixels and the
    /// ascender takes its share by the ascender/descender ratio.
    pub bearing_gap: f32,
}

/// Metrics scaled from the nominal size to a render size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// `target / nominal`.
    pub scale: f32,
    /// Ascender to descender span.
    pub line_height: f32,
    /// Extra leading between lines, not part of `line_height`.
    pub line_gap: f32,
    /// Distance from the top of the line to the baseline.
    pub baseline: f32,
    pub underline_position: f32,
    pub underline_thickness: f32,
    pub strikeout_position: f32,
    pub strikeout_thickness: f32,
}

impl AtlasMetrics {
    /// Derive metrics for `nominal_size` pixels per em.
    ///
    /// The OS/2 table supplies typographic ascender/descender/line gap,
    /// x-height and strikeout when present. Without it the line gap is 0,
    /// the x-height is half the ascender, and the strikeout sits at half the
    /// x-height with a twentieth of an em thickness.
    pub fn new(design: &DesignMetrics, os2: Option<&Os2Table>, nominal_size: f32) -> Self {
        let upem = f32::from(design.units_per_em.max(1));
        let px = |units: f32| units * nominal_size / upem;

        let (ascender, descender, line_gap, x_height, strikeout_position, strikeout_size) =
            match os2 {
                Some(t) => {
                    let (asc, desc, gap) = if t.typo_ascender > t.typo_descender {
                        (
                            f32::from(t.typo_ascender),
                            f32::from(t.typo_descender),
                            f32::from(t.typo_line_gap),
                        )
                    } else {
                        (f32::from(design.ascender), f32::from(design.descender), 0.0)
                    };
                    let x = t.x_height.filter(|&x| x > 0).map_or(asc / 2.0, f32::from);
                    let strike_pos = if t.strikeout_position > 0 {
                        f32::from(t.strikeout_position)
                    } else {
                        x / 2.0
                    };
                    let strike_size = if t.strikeout_size > 0 {
                        f32::from(t.strikeout_size)
                    } else {
                        upem / 20.0
                    };
                    (asc, desc, gap, x, strike_pos, strike_size)
                }
                None => {
                    let asc = f32::from(design.ascender);
                    (asc, f32::from(design.descender), 0.0, asc / 2.0, asc / 4.0, upem / 20.0)
                }
            };

        let underline_thickness = if design.underline_thickness > 0 {
            f32::from(design.underline_thickness)
        } else {
            upem / 20.0
        };

        let ascender = px(ascender);
        let descender = px(descender);
        Self {
            ascender,
            descender,
            line_gap: px(line_gap.max(0.0)),
            x_height: px(x_height),
            strikeout_position: px(strikeout_position),
            strikeout_size: px(strikeout_size),
            underline_position: px(f32::from(design.underline_position)),
            underline_thickness: px(underline_thickness),
            bearing_gap: bearing_gap(ascender, descender),
        }
    }

    /// Ascender to descender distance.
    pub fn height(&self) -> f32 {
        self.ascender - self.descender
    }

    /// Scale to a `target` pixel size for an atlas built at `nominal`.
    pub fn line_metrics(&self, nominal: f32, target: f32) -> LineMetrics {
        let scale = if nominal > 0.0 { target / nominal } else { 1.0 };
        LineMetrics {
            scale,
            line_height: self.height() * scale,
            line_gap: self.line_gap * scale,
            baseline: (self.ascender + self.bearing_gap) * scale,
            underline_position: self.underline_position * scale,
            underline_thickness: (self.underline_thickness * scale).max(1.0),
            strikeout_position: self.strikeout_position * scale,
            strikeout_thickness: (self.strikeout_size * scale).max(1.0),
        }
    }
}

fn bearing_gap(ascender: f32, descender: f32) -> f32 {
    let height = ascender - descender;
    if height <= 0.0 {
        return ascender.round() - ascender;
    }
    (height.round() * ascender / height).round() - ascender
}
