// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capabilities of content views and the contracts with their collaborators.

use std::fmt::Debug;
use std::sync::Arc;

use layout_primitives::{Axis, Bias, BreakWeight, Rect};

use crate::document::{DocumentState, ElementChange};
use crate::paint::Canvas;
use crate::{LayoutError, Result};

/// A shared handle to a content view.
pub type ViewRef = Arc<dyn View>;

/// Which preferred spans of a view changed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct PreferenceChange {
    /// The preferred width changed.
    pub width: bool,
    /// The preferred height changed.
    pub height: bool,
}

impl PreferenceChange {
    /// Nothing changed.
    pub const NONE: Self = Self::new(false, false);

    /// Both spans changed.
    pub const BOTH: Self = Self::new(true, true);

    /// Creates a change record.
    pub const fn new(width: bool, height: bool) -> Self {
        Self { width, height }
    }

    /// A change along one axis only.
    pub fn along(axis: Axis) -> Self {
        Self::new(axis == Axis::X, axis == Axis::Y)
    }

    /// Returns `true` if the span along `axis` changed.
    pub fn changed(self, axis: Axis) -> bool {
        axis.select(self.width, self.height)
    }

    /// Returns `true` if neither span changed.
    pub fn is_empty(self) -> bool {
        !self.width && !self.height
    }

    /// Combines two change records.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self::new(self.width || other.width, self.height || other.height)
    }
}

/// Size preferences along both axes.
pub trait Measurable {
    /// The natural span along `axis`.
    fn preferred_span(&self, axis: Axis) -> f32;

    /// How willing the view is to be resized along `axis`; `0` means rigid.
    fn resize_weight(&self, axis: Axis) -> i32 {
        let _ = axis;
        0
    }

    /// The smallest usable span along `axis`.
    fn minimum_span(&self, axis: Axis) -> f32 {
        if self.resize_weight(axis) == 0 {
            self.preferred_span(axis)
        } else {
            0.0
        }
    }

    /// The largest usable span along `axis`.
    fn maximum_span(&self, axis: Axis) -> f32 {
        if self.resize_weight(axis) == 0 {
            self.preferred_span(axis)
        } else {
            i32::MAX as f32
        }
    }

    /// Alignment point along `axis` as a fraction of the span.
    fn alignment(&self, axis: Axis) -> f32 {
        let _ = axis;
        0.5
    }
}

/// Content that covers a model range and can be split for flowing.
pub trait Breakable: Measurable {
    /// First model offset covered.
    fn start_offset(&self) -> usize;

    /// Model offset just past the covered range.
    fn end_offset(&self) -> usize;

    /// How attractive a break is when the view starts at `pos` with `len` room left.
    ///
    /// By default a view is unbreakable unless the whole view already fits.
    fn break_weight(&self, axis: Axis, pos: f32, len: f32) -> BreakWeight {
        let _ = pos;
        if len > self.preferred_span(axis) {
            BreakWeight::GOOD
        } else {
            BreakWeight::BAD
        }
    }

    /// Breaks off the part starting at `offset` that fits in `len`.
    ///
    /// `None` means the view itself is the result.
    fn break_view(&self, axis: Axis, offset: usize, pos: f32, len: f32) -> Option<ViewRef> {
        let _ = (axis, offset, pos, len);
        None
    }

    /// Creates a view over `start..end` of this view's range.
    ///
    /// `None` means the view itself covers the request.
    fn create_fragment(&self, start: usize, end: usize) -> Option<ViewRef> {
        let _ = (start, end);
        None
    }

    /// Span when placed at horizontal position `x`, for views whose width depends on
    /// tab stops. `None` for views that are not tab-aware.
    fn tabbed_span(&self, x: f32, tabs: &dyn TabExpander) -> Option<f32> {
        let _ = (x, tabs);
        None
    }
}

/// Rendering and coordinate translation.
pub trait Paintable: Breakable {
    /// Renders into `alloc`.
    fn paint(&self, canvas: &mut dyn Canvas, alloc: Rect);

    /// The caret rectangle for model position `pos`.
    fn model_to_view(&self, pos: usize, alloc: Rect, bias: Bias) -> Result<Rect> {
        let _ = bias;
        let (start, end) = (self.start_offset(), self.end_offset());
        if pos < start || pos > end {
            return Err(LayoutError::PositionOutOfRange {
                position: pos,
                start,
                end,
            });
        }
        let x = if pos == start { alloc.x } else { alloc.max_x() };
        Ok(Rect::new(x, alloc.y, 0, alloc.height))
    }

    /// The model position closest to the point.
    fn view_to_model(&self, x: i32, y: i32, alloc: Rect) -> (usize, Bias) {
        let _ = y;
        if x < alloc.x + alloc.width / 2 {
            (self.start_offset(), Bias::Forward)
        } else {
            (self.end_offset(), Bias::Backward)
        }
    }
}

/// A content view as held by layout containers.
pub trait View: Paintable + Send + Sync + Debug {
    /// Informs the view of its allocated size.
    ///
    /// Returns the preferences that changed as a consequence; the caller forwards them.
    fn set_size(&self, width: f32, height: f32) -> PreferenceChange {
        let _ = (width, height);
        PreferenceChange::NONE
    }

    /// Informs a paragraph-level view that its paragraph changed.
    ///
    /// `runs` describes runs replaced inside the paragraph, when any were.
    fn paragraph_changed(
        &self,
        doc: &DocumentState,
        paragraph: usize,
        runs: Option<&ElementChange>,
    ) -> PreferenceChange {
        let _ = (doc, paragraph, runs);
        PreferenceChange::NONE
    }
}

/// Positions of tab stops.
pub trait TabExpander {
    /// The first tab stop after `x`, for a tab at model offset `offset`.
    fn next_tab_stop(&self, x: f32, offset: usize) -> f32;
}

/// Tab stops at a fixed interval.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TabStops {
    interval: f32,
}

impl TabStops {
    /// Creates stops every `interval` units.
    pub fn new(interval: f32) -> Self {
        Self { interval }
    }

    /// Distance between stops.
    pub fn interval(&self) -> f32 {
        self.interval
    }
}

impl Default for TabStops {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TAB_INTERVAL)
    }
}

impl TabExpander for TabStops {
    fn next_tab_stop(&self, x: f32, _offset: usize) -> f32 {
        if self.interval <= 0.0 {
            return x;
        }
        ((x / self.interval).floor() + 1.0) * self.interval
    }
}

/// Receives preference changes that leave a layout container.
pub trait PreferenceSink: Send + Sync + Debug {
    /// The container's preferred spans changed.
    fn preference_changed(&self, change: PreferenceChange);

    /// The container's content needs repainting.
    fn repaint(&self) {}
}

/// Creates views for the paragraphs of a document.
pub trait ViewFactory: Send + Sync + Debug {
    /// Creates the view for paragraph `paragraph` of `doc`.
    fn create(&self, doc: &DocumentState, paragraph: usize) -> ViewRef;
}
