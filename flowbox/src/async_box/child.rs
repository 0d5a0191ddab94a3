// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use layout_primitives::Axis;

use crate::view::{PreferenceChange, ViewRef};

/// Cached measurements of one child, guarded by the child's lock.
#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) struct ChildLayout {
    pub(crate) minimum: f32,
    pub(crate) preferred: f32,
    pub(crate) maximum: f32,
    pub(crate) alignment: f32,
    pub(crate) minor_valid: bool,
    /// Span along the major axis.
    pub(crate) span: f32,
    /// Offset along the major axis, valid up to the locator's last valid child.
    pub(crate) offset: f32,
    pub(crate) major_valid: bool,
    pub(crate) size_valid: bool,
    /// Part of `span` already added to the owner's total; changed under the owner's
    /// children lock.
    pub(crate) counted: f32,
}

impl Default for ChildLayout {
    fn default() -> Self {
        Self {
            minimum: 0.0,
            preferred: 0.0,
            maximum: 0.0,
            alignment: 0.5,
            minor_valid: false,
            span: 0.0,
            offset: 0.0,
            major_valid: false,
            size_valid: false,
            counted: 0.0,
        }
    }
}

impl ChildLayout {
    pub(crate) fn is_valid(&self) -> bool {
        self.minor_valid && self.major_valid && self.size_valid
    }

    /// Span across the box when the box is `target` wide.
    pub(crate) fn minor_span(&self, target: f32) -> f32 {
        if self.maximum < target {
            self.maximum
        } else {
            self.minimum.max(target)
        }
    }

    /// Offset across the box when the box is `target` wide.
    pub(crate) fn minor_offset(&self, target: f32) -> f32 {
        if self.maximum < target {
            (target - self.maximum) * self.alignment
        } else {
            0.0
        }
    }

    /// Marks the measurements affected by a change in the child's preferences.
    pub(crate) fn preference_changed(&mut self, axis: Axis, change: PreferenceChange) {
        if change.changed(axis) {
            self.major_valid = false;
        }
        if change.changed(axis.other()) {
            self.minor_valid = false;
        }
        self.size_valid = false;
    }
}

/// What a measuring pass changed, for the owner to fold into its totals.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub(crate) struct Measurement {
    pub(crate) minor_changed: bool,
    pub(crate) major_changed: bool,
}

impl Measurement {
    pub(crate) fn merge(&mut self, other: Self) {
        self.minor_changed |= other.minor_changed;
        self.major_changed |= other.major_changed;
    }

    pub(crate) fn is_empty(self) -> bool {
        !self.minor_changed && !self.major_changed
    }
}

/// A child of an asynchronous box: a view plus its cached measurements.
#[derive(Debug)]
pub(crate) struct ChildState {
    view: ViewRef,
    attached: AtomicBool,
    layout: Mutex<ChildLayout>,
}

impl ChildState {
    pub(crate) fn new(view: ViewRef) -> Self {
        Self {
            view,
            attached: AtomicBool::new(true),
            layout: Mutex::new(ChildLayout::default()),
        }
    }

    pub(crate) fn view(&self) -> &ViewRef {
        &self.view
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ChildLayout> {
        self.layout.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    pub(crate) fn detach(&self) {
        self.attached.store(false, Ordering::Release);
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.lock().is_valid()
    }

    /// Brings invalid measurements up to date in one pass.
    ///
    /// Minor-axis requirements are read first, then the major span, then the view is
    /// given its size. A size change that alters the view's preferences leaves the
    /// affected measurements invalid for the next pass.
    pub(crate) fn update(&self, axis: Axis, minor_target: f32) -> Measurement {
        let mut layout = self.lock();
        let mut measurement = Measurement::default();
        let minor = axis.other();
        if !layout.minor_valid {
            let before = (layout.minimum, layout.preferred, layout.maximum, layout.alignment);
            layout.minimum = self.view.minimum_span(minor);
            layout.preferred = self.view.preferred_span(minor);
            layout.maximum = self.view.maximum_span(minor);
            layout.alignment = self.view.alignment(minor);
            layout.minor_valid = true;
            measurement.minor_changed =
                before != (layout.minimum, layout.preferred, layout.maximum, layout.alignment);
        }
        if !layout.major_valid {
            let old = layout.span;
            layout.span = self.view.preferred_span(axis);
            layout.major_valid = true;
            measurement.major_changed = layout.span != old;
        }
        if !layout.size_valid {
            let across = layout.minor_span(minor_target);
            let (width, height) = match axis {
                Axis::X => (layout.span, across),
                Axis::Y => (across, layout.span),
            };
            layout.size_valid = true;
            let change = self.view.set_size(width, height);
            if !change.is_empty() {
                layout.preference_changed(axis, change);
            }
        }
        measurement
    }

    /// Moves the uncounted part of the span into the owner's total, returning it.
    pub(crate) fn settle_span(&self) -> f32 {
        let mut layout = self.lock();
        let delta = layout.span - layout.counted;
        layout.counted = layout.span;
        delta
    }

    /// The part of the span the owner's total includes.
    pub(crate) fn counted_span(&self) -> f32 {
        self.lock().counted
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use layout_primitives::Rect;

    use super::*;
    use crate::paint::Canvas;
    use crate::view::{Breakable, Measurable, Paintable, View};

    /// A view that becomes taller when made narrower.
    #[derive(Debug)]
    struct Wrapping {
        length: f32,
        height: Mutex<f32>,
    }

    impl Measurable for Wrapping {
        fn preferred_span(&self, axis: Axis) -> f32 {
            match axis {
                Axis::X => self.length,
                Axis::Y => *self.height.lock().unwrap(),
            }
        }

        fn resize_weight(&self, axis: Axis) -> i32 {
            i32::from(axis == Axis::X)
        }
    }

    impl Breakable for Wrapping {
        fn start_offset(&self) -> usize {
            0
        }

        fn end_offset(&self) -> usize {
            1
        }
    }

    impl Paintable for Wrapping {
        fn paint(&self, _: &mut dyn Canvas, _: Rect) {}
    }

    impl View for Wrapping {
        fn set_size(&self, width: f32, _: f32) -> PreferenceChange {
            let lines = (self.length / width.max(1.0)).ceil();
            let mut height = self.height.lock().unwrap();
            let old = *height;
            *height = lines * 10.0;
            PreferenceChange::new(false, old != *height)
        }
    }

    fn wrapping(length: f32) -> ChildState {
        ChildState::new(Arc::new(Wrapping {
            length,
            height: Mutex::new(10.0),
        }))
    }

    #[test]
    fn minor_span_fills_or_aligns() {
        let layout = ChildLayout {
            minimum: 10.0,
            maximum: 40.0,
            alignment: 0.5,
            ..ChildLayout::default()
        };
        assert_eq!(layout.minor_span(100.0), 40.0);
        assert_eq!(layout.minor_offset(100.0), 30.0);
        assert_eq!(layout.minor_span(20.0), 20.0);
        assert_eq!(layout.minor_offset(20.0), 0.0);
        assert_eq!(layout.minor_span(5.0), 10.0);
    }

    #[test]
    fn sizing_that_changes_height_needs_second_pass() {
        let child = wrapping(100.0);
        let first = child.update(Axis::Y, 30.0);
        assert!(first.minor_changed);
        assert!(first.major_changed);
        assert!(!child.is_valid());
        assert_eq!(child.lock().span, 10.0);

        let second = child.update(Axis::Y, 30.0);
        assert!(second.major_changed);
        assert!(child.is_valid());
        assert_eq!(child.lock().span, 40.0);
    }

    #[test]
    fn settled_span_is_counted_once() {
        let child = wrapping(10.0);
        child.update(Axis::Y, 30.0);
        assert_eq!(child.settle_span(), 10.0);
        assert_eq!(child.settle_span(), 0.0);
        assert_eq!(child.counted_span(), 10.0);
    }

    #[test]
    fn preference_change_invalidates_by_axis() {
        let child = wrapping(10.0);
        child.update(Axis::Y, 30.0);
        assert!(child.is_valid());
        child
            .lock()
            .preference_changed(Axis::Y, PreferenceChange::along(Axis::Y));
        let layout = *child.lock();
        assert!(layout.minor_valid);
        assert!(!layout.major_valid);
        assert!(!layout.size_valid);
    }
}
