// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use smallvec::SmallVec;

/// Number of embedding levels; levels run from `0` to `MAX_LEVELS - 1`.
pub const MAX_LEVELS: u8 = 16;

/// Flag set on an embedding value when the level is an override.
pub(crate) const OVERRIDE_FLAG: u8 = 0x10;

const LRE: char = '\u{202A}';
const RLE: char = '\u{202B}';
const PDF: char = '\u{202C}';
const LRO: char = '\u{202D}';
const RLO: char = '\u{202E}';

/// Stack machine over explicit embedding controls.
///
/// Each call to [`EmbeddingStack::advance`] consumes one character and yields its
/// embedding value: the level in the low four bits plus [`OVERRIDE_FLAG`] inside an
/// override. A push control receives the level that was current before it, and a pop
/// receives the level it restores. Pushes that would exceed the deepest level are
/// counted and cancelled by the matching pops without touching the stack.
#[derive(Clone, Debug)]
pub struct EmbeddingStack {
    level: u8,
    saved: SmallVec<[u8; MAX_LEVELS as usize]>,
    overflow: usize,
}

impl EmbeddingStack {
    /// Creates a stack at the paragraph base level.
    pub fn new(ltr: bool) -> Self {
        Self {
            level: if ltr { 0 } else { 1 },
            saved: SmallVec::new(),
            overflow: 0,
        }
    }

    /// Number of open embeddings or overrides.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// The current embedding level, without the override flag.
    pub fn level(&self) -> u8 {
        self.level & 0x0f
    }

    /// Returns `true` inside an override.
    pub fn is_override(&self) -> bool {
        self.level & OVERRIDE_FLAG != 0
    }

    /// Consumes one character and returns its embedding value.
    pub fn advance(&mut self, ch: char) -> u8 {
        match ch {
            LRE | LRO => {
                let next = (self.level & 0x0e) + 2;
                if let Some(before) = self.open(next, ch == LRO) {
                    return before;
                }
            }
            RLE | RLO => {
                let next = ((self.level & 0x0f) + 1) | 0x01;
                if let Some(before) = self.open(next, ch == RLO) {
                    return before;
                }
            }
            PDF => {
                if self.overflow > 0 {
                    self.overflow -= 1;
                } else if let Some(level) = self.saved.pop() {
                    self.level = level;
                }
            }
            _ => {}
        }
        self.level
    }

    fn open(&mut self, next: u8, is_override: bool) -> Option<u8> {
        if self.overflow > 0 || next >= MAX_LEVELS {
            self.overflow += 1;
            return None;
        }
        let before = self.level;
        self.saved.push(before);
        self.level = if is_override {
            next + OVERRIDE_FLAG
        } else {
            next
        };
        Some(before)
    }
}

/// Computes embedding values for a paragraph by processing its explicit controls.
pub fn embedding_levels(text: &[char], ltr: bool) -> Vec<u8> {
    let mut stack = EmbeddingStack::new(ltr);
    text.iter().map(|&ch| stack.advance(ch)).collect()
}
