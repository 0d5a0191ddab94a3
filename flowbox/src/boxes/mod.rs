// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box layout: children tiled along a major axis and aligned across it.
//!
//! The allocation and requirement functions are pure and work on [`ChildMetrics`]
//! slices. [`BoxNode`] caches their results per axis inside a [`ViewTree`] until a
//! child's preferences or the box's own size change.

mod allocate;
mod requirements;

use layout_primitives::{Axis, Insets, Justification, Rect, SizeRequirements};

use crate::tree::{NodeKind, ViewId, ViewTree};
use crate::view::PreferenceChange;
use crate::{LayoutError, Result};

pub use allocate::{Allocation, baseline_layout, layout_major_axis, layout_minor_axis};
pub use requirements::{
    ChildMetrics, aligned_requirements, baseline_requirements, tiled_requirements,
};

/// How a box places children across its major axis.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MinorLayout {
    /// Each child is aligned within the box on its own.
    #[default]
    Aligned,
    /// Children share a baseline.
    Baseline,
}

/// Cached layout state of a box-like container.
#[derive(Clone, Debug)]
pub(crate) struct BoxNode {
    pub(crate) axis: Axis,
    pub(crate) minor: MinorLayout,
    /// Set on rows; overrides the reported alignment along X.
    pub(crate) justification: Option<Justification>,
    pub(crate) insets: Insets,
    pub(crate) children: Vec<ViewId>,
    pub(crate) requests: [Option<SizeRequirements>; 2],
    allocations: [Allocation; 2],
    alloc_valid: [bool; 2],
    size: [i32; 2],
}

impl BoxNode {
    pub(crate) fn new(axis: Axis, minor: MinorLayout) -> Self {
        Self {
            axis,
            minor,
            justification: None,
            insets: Insets::ZERO,
            children: Vec::new(),
            requests: [None, None],
            allocations: [Allocation::default(), Allocation::default()],
            alloc_valid: [false, false],
            size: [0, 0],
        }
    }

    pub(crate) fn invalidate(&mut self, axis: Axis) {
        self.requests[axis.index()] = None;
        self.alloc_valid[axis.index()] = false;
    }

    pub(crate) fn invalidate_all(&mut self) {
        for axis in Axis::ALL {
            self.invalidate(axis);
        }
    }

    /// Inner span last laid out along `axis`.
    pub(crate) fn size(&self, axis: Axis) -> i32 {
        self.size[axis.index()]
    }

    fn child_size(&self, index: usize) -> Option<(i32, i32)> {
        let width = *self.allocations[0].spans.get(index)?;
        let height = *self.allocations[1].spans.get(index)?;
        Some((width, height))
    }

    /// Allocation of child `index` when the box occupies `alloc`.
    pub(crate) fn child_rect(&self, index: usize, alloc: Rect) -> Option<Rect> {
        let inner = alloc.inset(self.insets);
        let x = *self.allocations[0].offsets.get(index)?;
        let y = *self.allocations[1].offsets.get(index)?;
        let (width, height) = self.child_size(index)?;
        Some(Rect::new(inner.x + x, inner.y + y, width, height))
    }
}

impl ViewTree {
    /// Adds an empty box tiling its children along `axis`.
    pub fn insert_box(&mut self, axis: Axis, minor: MinorLayout) -> ViewId {
        self.insert(NodeKind::Box(BoxNode::new(axis, minor)))
    }

    /// Sets the insets of a container.
    pub fn set_insets(&mut self, id: ViewId, insets: Insets) -> Result<()> {
        let frame = self
            .frame_mut(id)
            .ok_or(LayoutError::MissingView { id: id.index() })?;
        frame.insets = insets;
        frame.invalidate_all();
        self.preference_changed(id, PreferenceChange::BOTH);
        Ok(())
    }

    /// Appends `child` to the container `parent`.
    pub fn append(&mut self, parent: ViewId, child: ViewId) -> Result<()> {
        let len = self.children(parent).len();
        self.replace_children(parent, len, 0, &[child]).map(|_| ())
    }

    /// Replaces `removed` children of `parent` at `index` with `added`.
    ///
    /// Returns the detached children; they stay in the tree without a parent.
    pub fn replace_children(
        &mut self,
        parent: ViewId,
        index: usize,
        removed: usize,
        added: &[ViewId],
    ) -> Result<Vec<ViewId>> {
        for &child in added {
            self.node(child)?;
        }
        let frame = self
            .frame_mut(parent)
            .ok_or(LayoutError::MissingView { id: parent.index() })?;
        let index = index.min(frame.children.len());
        let end = (index + removed).min(frame.children.len());
        let detached: Vec<ViewId> = frame
            .children
            .splice(index..end, added.iter().copied())
            .collect();
        frame.invalidate_all();
        for &child in &detached {
            self.set_parent(child, None);
        }
        for &child in added {
            self.set_parent(child, Some(parent));
        }
        self.preference_changed(parent, PreferenceChange::BOTH);
        Ok(detached)
    }

    /// Requirements of a container along `axis`, cached until invalidated.
    pub(crate) fn frame_requirements(&mut self, id: ViewId, axis: Axis) -> SizeRequirements {
        let Some(frame) = self.frame(id) else {
            return SizeRequirements::default();
        };
        if let Some(cached) = frame.requests[axis.index()] {
            return cached;
        }
        let (major, minor) = (frame.axis, frame.minor);
        let children = frame.children.clone();
        let requirements = if axis != major && self.flow(id).is_ok() {
            self.pool_requirements(id)
        } else {
            let metrics: Vec<ChildMetrics> = children
                .iter()
                .map(|&child| self.child_metrics(child, axis))
                .collect();
            if axis == major {
                tiled_requirements(&metrics)
            } else {
                match minor {
                    MinorLayout::Aligned => aligned_requirements(&metrics),
                    MinorLayout::Baseline => baseline_requirements(&metrics),
                }
            }
        };
        if let Some(frame) = self.frame_mut(id) {
            frame.requests[axis.index()] = Some(requirements);
        }
        requirements
    }

    /// Lays out a container at `width` by `height` and sizes its children.
    pub(crate) fn layout_box(&mut self, id: ViewId, width: i32, height: i32) -> Result<()> {
        let frame = self
            .frame_mut(id)
            .ok_or(LayoutError::MissingView { id: id.index() })?;
        let inner = [
            width.saturating_sub(frame.insets.span(Axis::X)).max(0),
            height.saturating_sub(frame.insets.span(Axis::Y)).max(0),
        ];
        let mut dirty = false;
        for axis in Axis::ALL {
            let i = axis.index();
            if frame.size[i] != inner[i] {
                frame.size[i] = inner[i];
                frame.alloc_valid[i] = false;
            }
            dirty |= !frame.alloc_valid[i];
        }
        if !dirty {
            return Ok(());
        }
        tracing::trace!(target: "flowbox.box", id = id.index(), width, height, "box allocated");
        let (major, minor) = (frame.axis, frame.minor);
        let children = frame.children.clone();

        for axis in Axis::ALL {
            let i = axis.index();
            if self.frame(id).is_some_and(|frame| frame.alloc_valid[i]) {
                continue;
            }
            let metrics: Vec<ChildMetrics> = children
                .iter()
                .map(|&child| self.child_metrics(child, axis))
                .collect();
            let allocation = if axis == major {
                layout_major_axis(inner[i], &metrics)
            } else {
                match minor {
                    MinorLayout::Aligned => layout_minor_axis(inner[i], &metrics),
                    MinorLayout::Baseline => {
                        let alignment = self.frame_requirements(id, axis).alignment;
                        baseline_layout(inner[i], alignment, &metrics)
                    }
                }
            };
            if let Some(frame) = self.frame_mut(id) {
                frame.allocations[i] = allocation;
                frame.alloc_valid[i] = true;
            }
        }

        for (index, &child) in children.iter().enumerate() {
            let Some((w, h)) = self.frame(id).and_then(|frame| frame.child_size(index)) else {
                continue;
            };
            self.set_size(child, w as f32, h as f32)?;
        }
        Ok(())
    }
}
