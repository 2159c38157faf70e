// Glyph sequence: the mutable glyph run a compiled automaton operates on.

use crate::direction::ProcessingDirection;
use crate::glyph::{GlyphId, ShapedGlyph};

/// A run of shaped glyphs with bidirectional, boundary-checked navigation.
///
/// Positions are plain indices in logical order. Navigation never wraps:
/// stepping past either end yields `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphSequence {
    glyphs: Vec<ShapedGlyph>,
}

impl GlyphSequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self { glyphs: Vec::new() }
    }

    /// Create an unpositioned sequence from glyph ids.
    pub fn from_ids(ids: &[GlyphId]) -> Self {
        Self {
            glyphs: ids.iter().copied().map(ShapedGlyph::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ShapedGlyph> {
        self.glyphs.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ShapedGlyph> {
        self.glyphs.get_mut(index)
    }

    /// All glyphs in logical order.
    pub fn glyphs(&self) -> &[ShapedGlyph] {
        &self.glyphs
    }

    /// Glyph ids in logical order.
    pub fn ids(&self) -> Vec<GlyphId> {
        self.glyphs.iter().map(|g| g.id).collect()
    }

    /// The position processing starts from: the head for `Forward`, the tail
    /// for `Backward`. `None` for an empty sequence.
    pub fn start(&self, direction: ProcessingDirection) -> Option<usize> {
        if self.glyphs.is_empty() {
            return None;
        }
        match direction {
            ProcessingDirection::Forward => Some(0),
            ProcessingDirection::Backward => Some(self.glyphs.len() - 1),
        }
    }

    /// Move `count` positions from `index` in `direction`.
    ///
    /// Returns `None` if `index` is out of bounds or the step would leave the
    /// sequence. A step of zero returns `index` itself.
    pub fn step(&self, index: usize, direction: ProcessingDirection, count: usize) -> Option<usize> {
        if index >= self.glyphs.len() {
            return None;
        }
        let target = match direction {
            ProcessingDirection::Forward => index.checked_add(count)?,
            ProcessingDirection::Backward => index.checked_sub(count)?,
        };
        (target < self.glyphs.len()).then_some(target)
    }

    /// Move `count` positions from `index`, counting only glyphs for which
    /// `skip` returns `false`. Skipped glyphs are passed over silently.
    ///
    /// The glyph at `index` itself is never tested.
    pub fn step_filtered<F>(
        &self,
        index: usize,
        direction: ProcessingDirection,
        count: usize,
        mut skip: F,
    ) -> Option<usize>
    where
        F: FnMut(&ShapedGlyph) -> bool,
    {
        let mut pos = self.step(index, direction, 0)?;
        let mut remaining = count;
        while remaining > 0 {
            pos = self.step(pos, direction, 1)?;
            if !skip(&self.glyphs[pos]) {
                remaining -= 1;
            }
        }
        Some(pos)
    }

    /// Replace the glyph at `index` with `replacement`, which may be empty
    /// (deletion) or longer than one glyph (expansion).
    ///
    /// Returns the signed change in sequence length.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn splice(&mut self, index: usize, replacement: &[ShapedGlyph]) -> isize {
        // The replaced glyph is not needed; dropping the iterator finishes the splice.
        drop(self.glyphs.splice(index..=index, replacement.iter().copied()));
        replacement.len() as isize - 1
    }

    /// Remove the glyph at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> ShapedGlyph {
        self.glyphs.remove(index)
    }
}

impl From<Vec<ShapedGlyph>> for GlyphSequence {
    fn from(glyphs: Vec<ShapedGlyph>) -> Self {
        Self { glyphs }
    }
}

impl FromIterator<GlyphId> for GlyphSequence {
    fn from_iter<I: IntoIterator<Item = GlyphId>>(iter: I) -> Self {
        Self {
            glyphs: iter.into_iter().map(ShapedGlyph::new).collect(),
        }
    }
}
