// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use layout_primitives::Rect;

/// A paint destination.
///
/// Rendering backends are out of scope; views describe what to draw through this trait.
pub trait Canvas {
    /// The area that needs painting, or `None` for everything.
    fn clip_bounds(&self) -> Option<Rect>;

    /// Draws a run of text inside `bounds` with its baseline at `baseline`.
    fn draw_text(&mut self, text: &str, bounds: Rect, baseline: i32);
}

/// One recorded text draw.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DisplayItem {
    /// The drawn text.
    pub text: String,
    /// Where it was drawn.
    pub bounds: Rect,
    /// Baseline position.
    pub baseline: i32,
}

/// A [`Canvas`] that records draws in order.
#[derive(Clone, Debug, Default)]
pub struct DisplayList {
    clip: Option<Rect>,
    items: Vec<DisplayItem>,
}

impl DisplayList {
    /// Creates an unclipped list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list that reports `clip` as its paint area.
    pub fn with_clip(clip: Rect) -> Self {
        Self {
            clip: Some(clip),
            items: Vec::new(),
        }
    }

    /// Recorded draws.
    pub fn items(&self) -> &[DisplayItem] {
        &self.items
    }

    /// Recorded text, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.text.as_str()).collect()
    }

    /// Forgets recorded draws.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Canvas for DisplayList {
    fn clip_bounds(&self) -> Option<Rect> {
        self.clip
    }

    fn draw_text(&mut self, text: &str, bounds: Rect, baseline: i32) {
        self.items.push(DisplayItem {
            text: text.to_owned(),
            bounds,
            baseline,
        });
    }
}
