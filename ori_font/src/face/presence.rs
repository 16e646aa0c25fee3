/// Sorted code points a face can render.
///
/// Slot 0 is always code point 0, the missing-glyph sentinel. The remaining
/// entries are strictly ascending, so the slot of a code point is its binary
/// search position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceIndex {
    codepoints: Vec<u32>,
}

impl PresenceIndex {
    /// Build from code points in any order. Duplicates and 0 are dropped
    /// before the sentinel is prepended.
    pub fn new(mut codepoints: Vec<u32>) -> Self {
        codepoints.retain(|&cp| cp != 0);
        codepoints.sort_unstable();
        codepoints.dedup();
        codepoints.insert(0, 0);
        Self { codepoints }
    }

    /// Slot of `codepoint`, if present. Code point 0 maps to slot 0.
    pub fn slot(&self, codepoint: u32) -> Option<usize> {
        self.codepoints.binary_search(&codepoint).ok()
    }

    pub fn contains(&self, codepoint: u32) -> bool {
        self.slot(codepoint).is_some()
    }

    /// Code point held in `slot`.
    pub fn codepoint(&self, slot: usize) -> u32 {
        self.codepoints.get(slot).copied().unwrap_or(0)
    }

    /// Number of slots, the sentinel included.
    pub fn len(&self) -> usize {
        self.codepoints.len()
    }

    /// Always false: the sentinel is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.codepoints
    }
}
