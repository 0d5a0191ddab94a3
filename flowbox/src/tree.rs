// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena of layout nodes.
//!
//! Containers (boxes, rows and flows) live in a [`ViewTree`] and refer to each other by
//! [`ViewId`]. Every node records its parent, so preference changes travel upward by
//! index instead of through back-references. Leaf content is held as [`ViewRef`]s.

#![allow(
    clippy::cast_possible_truncation,
    reason = "view spans are floats; allocations are whole pixels"
)]

use layout_primitives::{Axis, Bias, BreakWeight, Rect, SizeRequirements};

use crate::boxes::{BoxNode, ChildMetrics};
use crate::flow::FlowNode;
use crate::paint::Canvas;
use crate::view::{PreferenceChange, TabExpander, ViewRef};
use crate::{LayoutError, Result};

/// Handle to a node in a [`ViewTree`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ViewId(usize);

impl ViewId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    Vacant,
    Content(ViewRef),
    Box(BoxNode),
    Flow(FlowNode),
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) parent: Option<ViewId>,
    pub(crate) kind: NodeKind,
}

/// Arena owning a hierarchy of layout nodes.
#[derive(Debug, Default)]
pub struct ViewTree {
    nodes: Vec<Node>,
    free: Vec<ViewId>,
    pending: PreferenceChange,
}

impl ViewTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Returns `true` if no nodes are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `id` refers to a live node.
    pub fn contains(&self, id: ViewId) -> bool {
        self.node(id).is_ok()
    }

    pub(crate) fn insert(&mut self, kind: NodeKind) -> ViewId {
        let node = Node { parent: None, kind };
        if let Some(id) = self.free.pop() {
            self.nodes[id.0] = node;
            id
        } else {
            self.nodes.push(node);
            ViewId(self.nodes.len() - 1)
        }
    }

    /// Adds a leaf node holding `view`.
    pub fn insert_view(&mut self, view: ViewRef) -> ViewId {
        self.insert(NodeKind::Content(view))
    }

    pub(crate) fn node(&self, id: ViewId) -> Result<&Node> {
        match self.nodes.get(id.0) {
            Some(node) if !matches!(node.kind, NodeKind::Vacant) => Ok(node),
            _ => Err(LayoutError::MissingView { id: id.0 }),
        }
    }

    pub(crate) fn node_mut(&mut self, id: ViewId) -> Result<&mut Node> {
        match self.nodes.get_mut(id.0) {
            Some(node) if !matches!(node.kind, NodeKind::Vacant) => Ok(node),
            _ => Err(LayoutError::MissingView { id: id.0 }),
        }
    }

    /// Releases `id` and every box beneath it. Leaf views are dropped with their nodes.
    pub fn remove(&mut self, id: ViewId) -> Result<()> {
        let node = self.node_mut(id)?;
        let kind = core::mem::replace(&mut node.kind, NodeKind::Vacant);
        node.parent = None;
        self.free.push(id);
        let children = match kind {
            NodeKind::Box(frame) => frame.children,
            NodeKind::Flow(flow) => {
                let mut children = flow.frame.children;
                children.extend(flow.pool);
                children
            }
            NodeKind::Content(_) | NodeKind::Vacant => Vec::new(),
        };
        for child in children {
            // Pool members may already have been released along with a row.
            if self.contains(child) {
                self.remove(child)?;
            }
        }
        Ok(())
    }

    /// The parent of `id`, if it has one.
    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.node(id).ok().and_then(|node| node.parent)
    }

    pub(crate) fn set_parent(&mut self, id: ViewId, parent: Option<ViewId>) {
        if let Ok(node) = self.node_mut(id) {
            node.parent = parent;
        }
    }

    /// Children of a container, in layout order. Leaves have none.
    pub fn children(&self, id: ViewId) -> &[ViewId] {
        self.frame(id).map_or(&[], |frame| frame.children.as_slice())
    }

    /// The leaf view held by `id`.
    pub fn view(&self, id: ViewId) -> Option<&ViewRef> {
        match &self.node(id).ok()?.kind {
            NodeKind::Content(view) => Some(view),
            _ => None,
        }
    }

    pub(crate) fn frame(&self, id: ViewId) -> Option<&BoxNode> {
        match &self.node(id).ok()?.kind {
            NodeKind::Box(frame) => Some(frame),
            NodeKind::Flow(flow) => Some(&flow.frame),
            _ => None,
        }
    }

    pub(crate) fn frame_mut(&mut self, id: ViewId) -> Option<&mut BoxNode> {
        match &mut self.node_mut(id).ok()?.kind {
            NodeKind::Box(frame) => Some(frame),
            NodeKind::Flow(flow) => Some(&mut flow.frame),
            _ => None,
        }
    }

    pub(crate) fn flow(&self, id: ViewId) -> Result<&FlowNode> {
        match &self.node(id)?.kind {
            NodeKind::Flow(flow) => Ok(flow),
            _ => Err(LayoutError::MissingView { id: id.0 }),
        }
    }

    pub(crate) fn flow_mut(&mut self, id: ViewId) -> Result<&mut FlowNode> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Flow(flow) => Ok(flow),
            _ => Err(LayoutError::MissingView { id: id.0 }),
        }
    }

    /// First model offset covered by `id`.
    pub fn start_offset(&self, id: ViewId) -> usize {
        match self.node(id).map(|node| &node.kind) {
            Ok(NodeKind::Content(view)) => view.start_offset(),
            Ok(NodeKind::Flow(flow)) => flow.range.start,
            Ok(NodeKind::Box(frame)) => frame
                .children
                .iter()
                .map(|&child| self.start_offset(child))
                .min()
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// Model offset just past the range covered by `id`.
    pub fn end_offset(&self, id: ViewId) -> usize {
        match self.node(id).map(|node| &node.kind) {
            Ok(NodeKind::Content(view)) => view.end_offset(),
            Ok(NodeKind::Flow(flow)) => flow.range.end,
            Ok(NodeKind::Box(frame)) => frame
                .children
                .iter()
                .map(|&child| self.end_offset(child))
                .max()
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// Size requirements of `id` along `axis`, excluding insets.
    pub fn requirements(&mut self, id: ViewId, axis: Axis) -> SizeRequirements {
        if let Some(view) = self.view(id) {
            return SizeRequirements::new(
                view.minimum_span(axis) as i32,
                view.preferred_span(axis) as i32,
                view.maximum_span(axis) as i32,
                view.alignment(axis),
            );
        }
        self.frame_requirements(id, axis)
    }

    /// Smallest usable span of `id` along `axis`.
    pub fn minimum_span(&mut self, id: ViewId, axis: Axis) -> f32 {
        if let Some(view) = self.view(id) {
            return view.minimum_span(axis);
        }
        let r = self.frame_requirements(id, axis);
        self.with_insets(id, axis, r.minimum)
    }

    /// Natural span of `id` along `axis`.
    pub fn preferred_span(&mut self, id: ViewId, axis: Axis) -> f32 {
        if let Some(view) = self.view(id) {
            return view.preferred_span(axis);
        }
        let r = self.frame_requirements(id, axis);
        self.with_insets(id, axis, r.preferred)
    }

    /// Largest usable span of `id` along `axis`.
    pub fn maximum_span(&mut self, id: ViewId, axis: Axis) -> f32 {
        if let Some(view) = self.view(id) {
            return view.maximum_span(axis);
        }
        let r = self.frame_requirements(id, axis);
        self.with_insets(id, axis, r.maximum)
    }

    /// Alignment of `id` along `axis`.
    pub fn alignment(&mut self, id: ViewId, axis: Axis) -> f32 {
        if let Some(view) = self.view(id) {
            return view.alignment(axis);
        }
        if axis == Axis::X {
            if let Some(justification) = self.frame(id).and_then(|frame| frame.justification) {
                return justification.alignment();
            }
        }
        self.frame_requirements(id, axis).alignment
    }

    /// Resize weight of `id` along `axis`.
    pub fn resize_weight(&mut self, id: ViewId, axis: Axis) -> i32 {
        if let Some(view) = self.view(id) {
            return view.resize_weight(axis);
        }
        i32::from(self.frame_requirements(id, axis).is_flexible())
    }

    fn with_insets(&self, id: ViewId, axis: Axis, span: i32) -> f32 {
        let insets = self.frame(id).map_or(0, |frame| frame.insets.span(axis));
        (i64::from(span) + i64::from(insets)) as f32
    }

    pub(crate) fn child_metrics(&mut self, id: ViewId, axis: Axis) -> ChildMetrics {
        if let Some(view) = self.view(id) {
            return ChildMetrics::of(view.as_ref(), axis);
        }
        ChildMetrics {
            minimum: self.minimum_span(id, axis),
            preferred: self.preferred_span(id, axis),
            maximum: self.maximum_span(id, axis),
            alignment: self.alignment(id, axis),
            resize_weight: self.resize_weight(id, axis),
        }
    }

    /// How attractive a break in `id` is at `pos` with `len` room left.
    pub fn break_weight(&mut self, id: ViewId, axis: Axis, pos: f32, len: f32) -> BreakWeight {
        if let Some(view) = self.view(id) {
            return view.break_weight(axis, pos, len);
        }
        if len > self.preferred_span(id, axis) {
            BreakWeight::GOOD
        } else {
            BreakWeight::BAD
        }
    }

    /// Width of `id` when placed at `x`, honoring tab stops for tab-aware leaves.
    pub(crate) fn chunk_span(&mut self, id: ViewId, x: f32, tabs: &dyn TabExpander) -> f32 {
        if let Some(span) = self.view(id).and_then(|view| view.tabbed_span(x, tabs)) {
            return span;
        }
        self.preferred_span(id, Axis::X)
    }

    /// Gives `id` a size, laying out containers and forwarding any resulting preference
    /// changes upward.
    pub fn set_size(&mut self, id: ViewId, width: f32, height: f32) -> Result<()> {
        match &self.node(id)?.kind {
            NodeKind::Content(view) => {
                let change = view.set_size(width, height);
                if !change.is_empty() {
                    self.preference_changed(id, change);
                }
                Ok(())
            }
            NodeKind::Box(_) => self.layout_box(id, width as i32, height as i32),
            NodeKind::Flow(_) => self.layout_flow_to(id, width as i32, height as i32),
            NodeKind::Vacant => Err(LayoutError::MissingView { id: id.0 }),
        }
    }

    /// Records that the preferences of `id` changed and invalidates every ancestor.
    ///
    /// Changes that leave the root are kept until [`ViewTree::take_preference_change`].
    pub fn preference_changed(&mut self, id: ViewId, change: PreferenceChange) {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if let Ok(flow) = self.flow_mut(parent) {
                flow.layout_valid = false;
                flow.frame.invalidate_all();
            } else if let Some(frame) = self.frame_mut(parent) {
                for axis in Axis::ALL {
                    if change.changed(axis) {
                        frame.invalidate(axis);
                    }
                }
            }
            current = self.parent(parent);
        }
        self.pending = self.pending.merge(change);
    }

    /// Takes the preference changes that reached a root since the last call.
    pub fn take_preference_change(&mut self) -> PreferenceChange {
        core::mem::take(&mut self.pending)
    }

    /// Allocation of child `index` of `id` inside `alloc`.
    pub fn child_allocation(&mut self, id: ViewId, index: usize, alloc: Rect) -> Result<Option<Rect>> {
        self.set_size(id, alloc.width as f32, alloc.height as f32)?;
        Ok(self.frame(id).and_then(|frame| frame.child_rect(index, alloc)))
    }

    /// Paints `id` and the descendants that intersect the canvas clip.
    pub fn paint(&mut self, id: ViewId, canvas: &mut dyn Canvas, alloc: Rect) -> Result<()> {
        if let Some(view) = self.view(id) {
            view.paint(canvas, alloc);
            return Ok(());
        }
        self.set_size(id, alloc.width as f32, alloc.height as f32)?;
        let clip = canvas.clip_bounds();
        let children = self.children(id).to_vec();
        for (index, child) in children.into_iter().enumerate() {
            let Some(rect) = self.frame(id).and_then(|frame| frame.child_rect(index, alloc)) else {
                continue;
            };
            if clip.is_none_or(|clip| clip.intersects(&rect)) {
                self.paint(child, canvas, rect)?;
            }
        }
        Ok(())
    }

    /// Caret rectangle for model position `pos` inside `id` allocated at `alloc`.
    pub fn model_to_view(&mut self, id: ViewId, pos: usize, alloc: Rect, bias: Bias) -> Result<Rect> {
        if let Some(view) = self.view(id) {
            return view.model_to_view(pos, alloc, bias);
        }
        self.set_size(id, alloc.width as f32, alloc.height as f32)?;
        let (start, end) = (self.start_offset(id), self.end_offset(id));
        let out_of_range = LayoutError::PositionOutOfRange {
            position: pos,
            start,
            end,
        };
        let index = self.child_index_at(id, pos, bias).ok_or(out_of_range)?;
        let (child, rect, is_row) = {
            let frame = self.frame(id).ok_or(LayoutError::MissingView { id: id.0 })?;
            let rect = frame
                .child_rect(index, alloc)
                .ok_or(LayoutError::MissingView { id: id.0 })?;
            (frame.children[index], rect, frame.justification.is_some())
        };
        let mut caret = self.model_to_view(child, pos, rect, bias)?;
        if is_row {
            caret.y = alloc.y;
            caret.height = alloc.height;
        }
        Ok(caret)
    }

    /// Model position closest to the point `(x, y)` inside `id` allocated at `alloc`.
    pub fn view_to_model(&mut self, id: ViewId, x: i32, y: i32, alloc: Rect) -> Result<(usize, Bias)> {
        if let Some(view) = self.view(id) {
            return Ok(view.view_to_model(x, y, alloc));
        }
        self.set_size(id, alloc.width as f32, alloc.height as f32)?;
        let frame = self.frame(id).ok_or(LayoutError::MissingView { id: id.0 })?;
        let Some(last) = frame.children.len().checked_sub(1) else {
            return Ok((self.start_offset(id), Bias::Forward));
        };
        let axis = frame.axis;
        let coordinate = axis.select(x, y);
        let index = (0..last)
            .find(|&i| {
                frame
                    .child_rect(i, alloc)
                    .is_some_and(|rect| coordinate < rect.origin(axis) + rect.span(axis))
            })
            .unwrap_or(last);
        let child = frame.children[index];
        let rect = frame
            .child_rect(index, alloc)
            .ok_or(LayoutError::MissingView { id: id.0 })?;
        self.view_to_model(child, x, y, rect)
    }

    /// Index of the child of `id` covering `pos`.
    fn child_index_at(&self, id: ViewId, pos: usize, bias: Bias) -> Option<usize> {
        let pos = if bias == Bias::Backward && pos > 0 {
            pos - 1
        } else {
            pos
        };
        let children = self.children(id);
        children
            .iter()
            .position(|&child| self.start_offset(child) <= pos && pos < self.end_offset(child))
            .or_else(|| {
                // The end of the last child still has a caret position.
                let end = self.end_offset(id);
                (pos + 1 >= end && !children.is_empty())
                    .then(|| {
                        children
                            .iter()
                            .enumerate()
                            .max_by_key(|(_, child)| self.end_offset(**child))
                            .map(|(index, _)| index)
                    })
                    .flatten()
            })
    }
}
