// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bidirectional level resolution and visual reordering.
//!
//! [`Bidi`] resolves a paragraph in four passes: explicit embeddings, weak types,
//! neutral types and implicit levels. The weak and neutral passes work one level run
//! at a time. The free functions in this module derive visual orders from the resulting
//! levels.

mod class;
mod explicit;
mod reorder;
mod resolve;

use core::ops::Range;

use layout_primitives::BaseDirection;

use crate::{LayoutError, Result};

pub use class::{Direction, direction_codes};
pub use explicit::{EmbeddingStack, MAX_LEVELS, embedding_levels};
pub use reorder::{
    contiguous_order, inverse_order, logical_to_visual, normalized_order, reorder_visually,
    visual_to_logical,
};

use explicit::OVERRIDE_FLAG;
use resolve::{apply_rules, level_runs, trim_trailing_whitespace};

/// A run of characters sharing one embedding level.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LevelRun {
    /// Character range of the run.
    pub range: Range<usize>,
    /// Embedding level of the run.
    pub level: u8,
}

/// Resolved bidi information for a paragraph or a line of one.
#[derive(Clone, Debug)]
pub struct Bidi {
    ltr: bool,
    codes: Vec<Direction>,
    resolved: Vec<Direction>,
    levels: Vec<u8>,
}

impl Bidi {
    /// Resolves a paragraph, processing its explicit embedding controls.
    ///
    /// [`BaseDirection::Auto`] picks the direction of the first strong character.
    pub fn new(text: &[char], direction: BaseDirection) -> Self {
        let ltr = match direction {
            BaseDirection::Ltr => true,
            BaseDirection::Rtl => false,
            _ => default_is_ltr(text),
        };
        let embeddings = embedding_levels(text, ltr);
        Self::from_embeddings(text, embeddings, ltr)
    }

    /// Resolves a paragraph with precomputed embeddings.
    ///
    /// Values `0..=15` are embedding levels; values `16..=31` are overrides at the level
    /// in their low four bits. Explicit controls in `text` are not processed. Missing
    /// embeddings take the base level.
    pub fn from_embeddings(text: &[char], mut embeddings: Vec<u8>, ltr: bool) -> Self {
        let mut codes = direction_codes(text);
        embeddings.resize(codes.len(), u8::from(!ltr));
        for (level, code) in embeddings.iter_mut().zip(codes.iter_mut()) {
            if *level & OVERRIDE_FLAG != 0 {
                *level &= 0x0f;
                *code = if *level & 1 == 0 {
                    Direction::L
                } else {
                    Direction::R
                };
            }
        }
        Self::from_codes(codes, embeddings, ltr)
    }

    /// Resolves precomputed direction codes with embedding levels in `0..=15`.
    ///
    /// Overrides must already be applied to `codes`.
    pub fn from_codes(codes: Vec<Direction>, mut levels: Vec<u8>, ltr: bool) -> Self {
        levels.resize(codes.len(), u8::from(!ltr));
        for level in &mut levels {
            *level &= 0x0f;
        }
        let resolved = apply_rules(&codes, &mut levels, ltr);
        tracing::trace!(
            target: "flowbox.bidi",
            len = codes.len(),
            ltr,
            "resolved paragraph levels"
        );
        Self {
            ltr,
            codes,
            resolved,
            levels,
        }
    }

    /// Derives the bidi of the line `start..limit`.
    ///
    /// Trailing whitespace is returned to the base level relative to the line's own end.
    pub fn line(&self, start: usize, limit: usize) -> Result<Self> {
        if start > limit || limit > self.len() {
            return Err(LayoutError::PositionOutOfRange {
                position: limit,
                start: 0,
                end: self.len(),
            });
        }
        let codes = self.codes[start..limit].to_vec();
        let mut levels = self.levels[start..limit].to_vec();
        trim_trailing_whitespace(&codes, &mut levels, self.base_level());
        Ok(Self {
            ltr: self.ltr,
            resolved: self.resolved[start..limit].to_vec(),
            codes,
            levels,
        })
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns `true` if there are no characters.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Returns `true` if the base direction is left-to-right.
    pub fn base_is_ltr(&self) -> bool {
        self.ltr
    }

    /// The paragraph base level, `0` or `1`.
    pub fn base_level(&self) -> u8 {
        u8::from(!self.ltr)
    }

    /// Returns `true` if all text is left-to-right at the base level.
    pub fn is_left_to_right(&self) -> bool {
        self.ltr && self.levels.iter().all(|&level| level == 0)
    }

    /// Returns `true` if all text is right-to-left at the base level.
    pub fn is_right_to_left(&self) -> bool {
        !self.ltr && self.levels.iter().all(|&level| level == 1)
    }

    /// Returns `true` if the text needs reordering.
    pub fn is_mixed(&self) -> bool {
        !self.is_left_to_right() && !self.is_right_to_left()
    }

    /// Resolved levels, one per character.
    pub fn levels(&self) -> &[u8] {
        &self.levels
    }

    /// Level at `index`, or the base level past the end.
    pub fn level_at(&self, index: usize) -> u8 {
        self.levels
            .get(index)
            .copied()
            .unwrap_or_else(|| self.base_level())
    }

    /// Direction codes after overrides, before resolution.
    pub fn codes(&self) -> &[Direction] {
        &self.codes
    }

    /// Direction codes after the weak and neutral passes.
    pub fn resolved(&self) -> &[Direction] {
        &self.resolved
    }

    /// Maximal runs of equal level.
    pub fn runs(&self) -> Vec<LevelRun> {
        level_runs(&self.levels)
            .map(|(range, level)| LevelRun { range, level })
            .collect()
    }

    /// Number of level runs.
    pub fn run_count(&self) -> usize {
        level_runs(&self.levels).count()
    }

    /// End of the level run containing `index`, or `index` itself past the end.
    pub fn run_limit(&self, index: usize) -> usize {
        let Some(&level) = self.levels.get(index) else {
            return index;
        };
        self.levels[index..]
            .iter()
            .position(|&l| l != level)
            .map_or(self.levels.len(), |n| index + n)
    }

    /// Logical index shown at each visual position.
    pub fn visual_to_logical(&self) -> Vec<usize> {
        visual_to_logical(&self.levels)
    }

    /// Visual position of each logical index.
    pub fn logical_to_visual(&self) -> Vec<usize> {
        logical_to_visual(&self.levels)
    }
}

/// Returns `true` unless the first strong character is right-to-left.
pub fn default_is_ltr(text: &[char]) -> bool {
    text.iter()
        .map(|&ch| Direction::of(ch))
        .find(|dir| dir.is_strong())
        .is_none_or(|dir| dir == Direction::L)
}

/// Fast check for characters that can introduce right-to-left text.
pub fn requires_bidi(ch: char) -> bool {
    let c = u32::from(ch);
    if c < 0x0591 || c > 0x202E {
        false
    } else if c > 0x2019 {
        true
    } else {
        matches!(Direction::of(ch), Direction::R | Direction::AR)
    }
}
