// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf views over runs of paragraph text.

use core::ops::Range;
use std::fmt::Debug;
use std::sync::Arc;

use layout_primitives::{Axis, Bias, BreakWeight, Rect};

use crate::document::RunStyle;
use crate::paint::Canvas;
use crate::view::{Breakable, Measurable, Paintable, TabExpander, TabStops, View, ViewRef};
use crate::{LayoutError, Result};

/// Line separator; always ends a row.
pub const LINE_SEPARATOR: char = '\u{2028}';

/// Glyph measurement for text runs.
///
/// Shaping is out of scope; implementations report per-character advances.
pub trait TextMetrics: Send + Sync + Debug {
    /// Horizontal advance of `ch`.
    fn advance(&self, ch: char, style: &RunStyle) -> f32;

    /// Distance from the top of a line to the baseline.
    fn ascent(&self, style: &RunStyle) -> f32;

    /// Distance from the baseline to the bottom of a line.
    fn descent(&self, style: &RunStyle) -> f32;
}

/// Fixed-advance metrics scaled by the run style.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MonospaceMetrics {
    /// Advance of every visible character.
    pub advance: f32,
    /// Line ascent.
    pub ascent: f32,
    /// Line descent.
    pub descent: f32,
}

impl MonospaceMetrics {
    /// Creates metrics with the given advance and vertical extents.
    pub fn new(advance: f32, ascent: f32, descent: f32) -> Self {
        Self {
            advance,
            ascent,
            descent,
        }
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self::new(8.0, 12.0, 4.0)
    }
}

impl TextMetrics for MonospaceMetrics {
    fn advance(&self, ch: char, style: &RunStyle) -> f32 {
        // Newlines, separators and bidi controls take no room.
        if ch.is_control() || ch == LINE_SEPARATOR || ('\u{202A}'..='\u{202E}').contains(&ch) {
            0.0
        } else {
            self.advance * style.scale
        }
    }

    fn ascent(&self, style: &RunStyle) -> f32 {
        self.ascent * style.scale
    }

    fn descent(&self, style: &RunStyle) -> f32 {
        self.descent * style.scale
    }
}

/// A view over a range of paragraph text drawn in one style.
///
/// Offsets are relative to the start of the paragraph whose text the view shares.
#[derive(Clone, Debug)]
pub struct TextRunView {
    text: Arc<[char]>,
    range: Range<usize>,
    style: RunStyle,
    metrics: Arc<dyn TextMetrics>,
    tabs: TabStops,
}

impl TextRunView {
    /// Creates a view over `range` of `text`.
    ///
    /// The range is clamped to the text.
    pub fn new(
        text: Arc<[char]>,
        range: Range<usize>,
        style: RunStyle,
        metrics: Arc<dyn TextMetrics>,
        tabs: TabStops,
    ) -> Self {
        let end = range.end.min(text.len());
        let start = range.start.min(end);
        Self {
            text,
            range: start..end,
            style,
            metrics,
            tabs,
        }
    }

    /// The characters covered by this view.
    pub fn chars(&self) -> &[char] {
        &self.text[self.range.clone()]
    }

    /// The covered range.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// The style the run is drawn in.
    pub fn style(&self) -> RunStyle {
        self.style
    }

    fn advance(&self, ch: char) -> f32 {
        self.metrics.advance(ch, &self.style)
    }

    fn height(&self) -> f32 {
        self.metrics.ascent(&self.style) + self.metrics.descent(&self.style)
    }

    /// Width of `range` when it starts at `x`.
    fn measure(&self, range: Range<usize>, x: f32, tabs: &dyn TabExpander) -> f32 {
        let mut pos = x;
        for index in range {
            let ch = self.text[index];
            if ch == '\t' {
                pos = tabs.next_tab_stop(pos, index);
            } else {
                pos += self.advance(ch);
            }
        }
        pos - x
    }

    /// Number of characters from `from` that fit in `len` when starting at `x`.
    fn fit(&self, from: usize, x: f32, len: f32) -> usize {
        let mut pos = x;
        let limit = x + len;
        for (count, index) in (from..self.range.end).enumerate() {
            let ch = self.text[index];
            let next = if ch == '\t' {
                self.tabs.next_tab_stop(pos, index)
            } else {
                pos + self.advance(ch)
            };
            if next > limit {
                return count;
            }
            pos = next;
        }
        self.range.end - from
    }

    fn separator_within(&self, from: usize, count: usize) -> Option<usize> {
        self.text[from..from + count]
            .iter()
            .position(|&ch| ch == LINE_SEPARATOR)
            .map(|n| from + n)
    }

    fn fragment(&self, start: usize, end: usize) -> Option<ViewRef> {
        let start = start.clamp(self.range.start, self.range.end);
        let end = end.clamp(start, self.range.end);
        if start == self.range.start && end == self.range.end {
            return None;
        }
        Some(Arc::new(Self {
            range: start..end,
            ..self.clone()
        }))
    }
}

fn is_break_space(ch: char) -> bool {
    ch.is_whitespace() && ch != '\u{00A0}'
}

impl Measurable for TextRunView {
    fn preferred_span(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.measure(self.range.clone(), 0.0, &self.tabs),
            Axis::Y => self.height(),
        }
    }

    fn alignment(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => 0.5,
            Axis::Y => {
                let height = self.height();
                if height > 0.0 {
                    (height - self.metrics.descent(&self.style)) / height
                } else {
                    0.0
                }
            }
        }
    }
}

impl Breakable for TextRunView {
    fn start_offset(&self) -> usize {
        self.range.start
    }

    fn end_offset(&self) -> usize {
        self.range.end
    }

    fn break_weight(&self, axis: Axis, pos: f32, len: f32) -> BreakWeight {
        if axis == Axis::Y {
            return if len > self.preferred_span(axis) {
                BreakWeight::GOOD
            } else {
                BreakWeight::BAD
            };
        }
        if len < 0.0 {
            return BreakWeight::BAD;
        }
        let start = self.range.start;
        let count = self.fit(start, pos, len);
        if self.separator_within(start, count).is_some() {
            return BreakWeight::FORCED;
        }
        if count == 0 {
            return BreakWeight::BAD;
        }
        let last = count.min(self.range.len() - 1);
        if self.text[start..=start + last]
            .iter()
            .rev()
            .any(|&ch| is_break_space(ch))
        {
            BreakWeight::EXCELLENT
        } else {
            BreakWeight::GOOD
        }
    }

    fn break_view(&self, axis: Axis, offset: usize, pos: f32, len: f32) -> Option<ViewRef> {
        if axis == Axis::Y {
            return None;
        }
        let start = offset.clamp(self.range.start, self.range.end);
        let remaining = self.range.end - start;
        if remaining == 0 {
            return None;
        }
        let count = self.fit(start, pos, len.max(0.0));
        let end = if let Some(sep) = self.separator_within(start, count) {
            sep + 1
        } else {
            let last = count.min(remaining - 1);
            let space = self.text[start..=start + last]
                .iter()
                .rposition(|&ch| is_break_space(ch));
            match space {
                Some(n) => start + n + 1,
                None => start + count.max(1),
            }
        };
        self.fragment(start, end)
    }

    fn create_fragment(&self, start: usize, end: usize) -> Option<ViewRef> {
        self.fragment(start, end)
    }

    fn tabbed_span(&self, x: f32, tabs: &dyn TabExpander) -> Option<f32> {
        Some(self.measure(self.range.clone(), x, tabs))
    }
}

impl Paintable for TextRunView {
    fn paint(&self, canvas: &mut dyn Canvas, alloc: Rect) {
        let text: String = self
            .chars()
            .iter()
            .filter(|ch| !ch.is_control())
            .collect();
        if text.is_empty() {
            return;
        }
        let ascent = self.metrics.ascent(&self.style);
        #[expect(clippy::cast_possible_truncation, reason = "pixel positions are whole")]
        let baseline = alloc.y + ascent as i32;
        canvas.draw_text(&text, alloc, baseline);
    }

    fn model_to_view(&self, pos: usize, alloc: Rect, _bias: Bias) -> Result<Rect> {
        if pos < self.range.start || pos > self.range.end {
            return Err(LayoutError::PositionOutOfRange {
                position: pos,
                start: self.range.start,
                end: self.range.end,
            });
        }
        let width = self.measure(self.range.start..pos, 0.0, &self.tabs);
        #[expect(clippy::cast_possible_truncation, reason = "pixel positions are whole")]
        let x = alloc.x + width as i32;
        Ok(Rect::new(x, alloc.y, 0, alloc.height))
    }

    fn view_to_model(&self, x: i32, _y: i32, alloc: Rect) -> (usize, Bias) {
        let target = x as f32;
        let mut pos = alloc.x as f32;
        for index in self.range.clone() {
            let ch = self.text[index];
            let next = if ch == '\t' {
                self.tabs.next_tab_stop(pos, index)
            } else {
                pos + self.advance(ch)
            };
            if target < (pos + next) / 2.0 {
                return (index, Bias::Forward);
            }
            pos = next;
        }
        (self.range.end, Bias::Backward)
    }
}

impl View for TextRunView {}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> TextRunView {
        let chars: Arc<[char]> = text.chars().collect();
        let len = chars.len();
        TextRunView::new(
            chars,
            0..len,
            RunStyle::default(),
            Arc::new(MonospaceMetrics::new(10.0, 8.0, 2.0)),
            TabStops::new(40.0),
        )
    }

    #[test]
    fn spans_follow_metrics() {
        let view = run("abc\n");
        assert_eq!(view.preferred_span(Axis::X), 30.0);
        assert_eq!(view.preferred_span(Axis::Y), 10.0);
        assert_eq!(view.alignment(Axis::Y), 0.8);
    }

    #[test]
    fn tabs_advance_to_stops() {
        let view = run("a\tb");
        assert_eq!(view.tabbed_span(0.0, &TabStops::new(40.0)), Some(50.0));
        assert_eq!(view.tabbed_span(45.0, &TabStops::new(40.0)), Some(45.0));
    }

    #[test]
    fn break_weight_prefers_whitespace() {
        let view = run("ab cd");
        assert_eq!(view.break_weight(Axis::X, 0.0, 35.0), BreakWeight::EXCELLENT);
        assert_eq!(run("abcd").break_weight(Axis::X, 0.0, 35.0), BreakWeight::GOOD);
        assert_eq!(view.break_weight(Axis::X, 0.0, 5.0), BreakWeight::BAD);
        assert_eq!(view.break_weight(Axis::X, 0.0, -1.0), BreakWeight::BAD);
    }

    #[test]
    fn separator_forces_break() {
        let view = run("ab\u{2028}cd");
        assert_eq!(view.break_weight(Axis::X, 0.0, 100.0), BreakWeight::FORCED);
        let head = view.break_view(Axis::X, 0, 0.0, 100.0).unwrap();
        assert_eq!(head.end_offset(), 3);
    }

    #[test]
    fn break_view_splits_after_space() {
        let view = run("ab cd");
        let head = view.break_view(Axis::X, 0, 0.0, 35.0).unwrap();
        assert_eq!((head.start_offset(), head.end_offset()), (0, 3));
        let forced = run("abcd").break_view(Axis::X, 0, 0.0, 5.0).unwrap();
        assert_eq!(forced.end_offset(), 1);
    }

    #[test]
    fn fragments_of_whole_range_are_none() {
        let view = run("abcd");
        assert!(view.create_fragment(0, 4).is_none());
        let tail = view.create_fragment(2, 9).unwrap();
        assert_eq!((tail.start_offset(), tail.end_offset()), (2, 4));
    }

    #[test]
    fn positions_map_both_ways() {
        let view = run("abcd");
        let alloc = Rect::new(100, 0, 40, 10);
        let caret = view.model_to_view(2, alloc, Bias::Forward).unwrap();
        assert_eq!(caret.x, 120);
        assert_eq!(view.view_to_model(121, 5, alloc), (2, Bias::Forward));
        assert_eq!(view.view_to_model(200, 5, alloc), (4, Bias::Backward));
        assert!(view.model_to_view(5, alloc, Bias::Forward).is_err());
    }
}
