// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(
    clippy::cast_possible_truncation,
    reason = "Child offsets and spans are snapped to whole units when turned into rectangles."
)]

use std::sync::Arc;

use layout_primitives::{Axis, Insets, Rect};

use super::child::{ChildLayout, ChildState};

/// Finds children by major-axis offset without rescanning from the start.
///
/// The cursor is the last child whose major offset is known to be correct; every
/// child before it has a correct offset as well. Queries past the cursor advance it,
/// and a change to an earlier child moves it back.
#[derive(Debug, Default)]
pub(crate) struct ChildLocator {
    last_valid: Option<Arc<ChildState>>,
    alloc: Rect,
}

impl ChildLocator {
    pub(crate) fn set_allocation(&mut self, alloc: Rect) {
        self.alloc = alloc;
    }

    /// Moves the cursor back to `index` if it is ahead of it.
    ///
    /// The offset of the child at `index` itself must still be correct, which holds
    /// when only its span changed.
    pub(crate) fn child_changed(&mut self, children: &[Arc<ChildState>], index: usize) {
        let Some(child) = children.get(index) else {
            return;
        };
        // Without a cursor the next query starts from the first child anyway.
        if self.cursor(children).is_some_and(|current| current > index) {
            tracing::trace!(target: "flowbox.async", index, "locator rewound");
            if index == 0 {
                child.lock().offset = 0.0;
            }
            self.last_valid = Some(child.clone());
        }
    }

    /// Rewinds the cursor for a structural change of the children starting at `index`.
    pub(crate) fn children_replaced(&mut self, children: &[Arc<ChildState>], index: usize) {
        self.child_changed(children, index.saturating_sub(1));
    }

    fn cursor(&self, children: &[Arc<ChildState>]) -> Option<usize> {
        let last = self.last_valid.as_ref()?;
        children.iter().position(|child| Arc::ptr_eq(child, last))
    }

    /// Index of the cursor, starting it at the first child when it is unset or its
    /// child was removed.
    fn last_valid_index(&mut self, children: &[Arc<ChildState>]) -> usize {
        if let Some(index) = self.cursor(children) {
            return index;
        }
        if let Some(first) = children.first() {
            first.lock().offset = 0.0;
            self.last_valid = Some(first.clone());
        }
        0
    }

    /// Index of the child covering `target` along the major axis.
    ///
    /// `major_span` is the measured total; targets beyond it resolve to the cursor, the
    /// furthest child with a known position.
    pub(crate) fn view_index_at_visual_offset(
        &mut self,
        children: &[Arc<ChildState>],
        major_span: f32,
        target: f32,
    ) -> Option<usize> {
        if children.is_empty() {
            return None;
        }
        let had_cursor = self.cursor(children).is_some();
        let cursor = self.last_valid_index(children);
        if target > major_span {
            return Some(if had_cursor { cursor } else { 0 });
        }
        let cursor_offset = children[cursor].lock().offset;
        if target > cursor_offset {
            return Some(self.update_child_offsets(children, target));
        }
        let mut offset = 0.0;
        for (index, child) in children.iter().enumerate() {
            let next = offset + child.lock().span;
            if target < next {
                return Some(index);
            }
            offset = next;
        }
        Some(children.len() - 1)
    }

    /// Lays out offsets from the cursor until one covers `target`, advancing the
    /// cursor to that child.
    pub(crate) fn update_child_offsets(&mut self, children: &[Arc<ChildState>], target: f32) -> usize {
        let start = self.last_valid_index(children);
        let mut offset = children[start].lock().offset;
        for (index, child) in children.iter().enumerate().skip(start) {
            let mut layout = child.lock();
            layout.offset = offset;
            offset += layout.span;
            if target < offset {
                drop(layout);
                self.last_valid = Some(child.clone());
                return index;
            }
        }
        children.len() - 1
    }

    /// Makes the offsets up to and including `index` correct.
    pub(crate) fn update_child_offsets_to_index(
        &mut self,
        children: &[Arc<ChildState>],
        index: usize,
    ) {
        let start = self.last_valid_index(children);
        if index <= start {
            return;
        }
        let mut offset = children[start].lock().offset;
        for child in children.iter().take(index + 1).skip(start) {
            let mut layout = child.lock();
            layout.offset = offset;
            offset += layout.span;
        }
    }

    /// The rectangle of a child inside the current allocation.
    pub(crate) fn child_rect(
        &self,
        axis: Axis,
        layout: &ChildLayout,
        minor_target: f32,
        insets: Insets,
    ) -> Rect {
        let minor = axis.other();
        let major_origin = self.alloc.origin(axis) + insets.leading(axis) + layout.offset as i32;
        let minor_origin = self.alloc.origin(minor)
            + insets.leading(minor)
            + layout.minor_offset(minor_target) as i32;
        let major_span = layout.span as i32;
        let minor_span = layout.minor_span(minor_target) as i32;
        match axis {
            Axis::X => Rect::new(major_origin, minor_origin, major_span, minor_span),
            Axis::Y => Rect::new(minor_origin, major_origin, minor_span, major_span),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Canvas;
    use crate::view::{Breakable, Measurable, Paintable, View};

    #[derive(Debug)]
    struct Block;

    impl Measurable for Block {
        fn preferred_span(&self, _: Axis) -> f32 {
            10.0
        }
    }

    impl Breakable for Block {
        fn start_offset(&self) -> usize {
            0
        }

        fn end_offset(&self) -> usize {
            1
        }
    }

    impl Paintable for Block {
        fn paint(&self, _: &mut dyn Canvas, _: Rect) {}
    }

    impl View for Block {}

    fn children(spans: &[f32]) -> Vec<Arc<ChildState>> {
        spans
            .iter()
            .map(|&span| {
                let child = Arc::new(ChildState::new(Arc::new(Block)));
                child.lock().span = span;
                child
            })
            .collect()
    }

    fn offsets(children: &[Arc<ChildState>]) -> Vec<f32> {
        children.iter().map(|child| child.lock().offset).collect()
    }

    #[test]
    fn cursor_advances_to_target() {
        let children = children(&[10.0, 20.0, 30.0, 40.0]);
        let mut locator = ChildLocator::default();
        assert_eq!(
            locator.view_index_at_visual_offset(&children, 100.0, 35.0),
            Some(2)
        );
        assert_eq!(offsets(&children)[..3], [0.0, 10.0, 30.0]);
        assert_eq!(locator.cursor(&children), Some(2));

        // Earlier targets scan without moving the cursor.
        assert_eq!(
            locator.view_index_at_visual_offset(&children, 100.0, 12.0),
            Some(1)
        );
        assert_eq!(locator.cursor(&children), Some(2));
    }

    #[test]
    fn targets_past_the_total_resolve_to_cursor() {
        let children = children(&[10.0, 10.0, 10.0]);
        let mut locator = ChildLocator::default();
        assert_eq!(
            locator.view_index_at_visual_offset(&children, 30.0, 50.0),
            Some(0)
        );
        locator.update_child_offsets_to_index(&children, 2);
        locator.view_index_at_visual_offset(&children, 30.0, 15.0);
        assert_eq!(
            locator.view_index_at_visual_offset(&children, 30.0, 50.0),
            Some(1)
        );
    }

    #[test]
    fn earlier_change_rewinds_cursor() {
        let children = children(&[10.0, 10.0, 10.0]);
        let mut locator = ChildLocator::default();
        locator.view_index_at_visual_offset(&children, 30.0, 25.0);
        assert_eq!(locator.cursor(&children), Some(2));

        children[0].lock().span = 30.0;
        locator.child_changed(&children, 0);
        assert_eq!(locator.cursor(&children), Some(0));
        locator.update_child_offsets_to_index(&children, 2);
        assert_eq!(offsets(&children), [0.0, 30.0, 40.0]);

        // A later change leaves the cursor alone.
        locator.child_changed(&children, 2);
        assert_eq!(locator.cursor(&children), Some(0));
    }

    #[test]
    fn removed_cursor_restarts_at_first_child() {
        let mut children = children(&[10.0, 10.0, 10.0]);
        let mut locator = ChildLocator::default();
        locator.view_index_at_visual_offset(&children, 30.0, 25.0);
        children.remove(2);
        assert_eq!(locator.cursor(&children), None);
        assert_eq!(
            locator.view_index_at_visual_offset(&children, 20.0, 15.0),
            Some(1)
        );
    }

    #[test]
    fn child_rect_applies_insets_and_alignment() {
        let children = children(&[20.0]);
        {
            let mut layout = children[0].lock();
            layout.offset = 5.0;
            layout.minimum = 10.0;
            layout.maximum = 40.0;
            layout.alignment = 0.0;
        }
        let mut locator = ChildLocator::default();
        locator.set_allocation(Rect::new(100, 200, 50, 300));
        let layout = *children[0].lock();
        let rect = locator.child_rect(Axis::Y, &layout, 46.0, Insets::new(1, 2, 3, 4));
        assert_eq!(rect, Rect::new(102, 206, 40, 20));
    }
}
