// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flowing content into rows.
//!
//! A flow is a vertical box whose children are rows. Its content lives in a logical
//! pool of views that is never painted directly; each layout pass fills rows from the
//! pool, breaking views where a row runs out of room. Pool members placed whole are
//! reparented into a row and returned to the pool when the rows are rebuilt.

mod paragraph;
mod strategy;

use core::ops::Range;

use hashbrown::HashSet;
use layout_primitives::{Axis, BreakWeight, Justification, SizeRequirements};

use crate::LayoutConfig;
use crate::bidi::Bidi;
use crate::boxes::{BoxNode, MinorLayout};
use crate::tree::{NodeKind, ViewId, ViewTree};
use crate::view::{PreferenceChange, TabStops, ViewRef};
use crate::Result;

pub use paragraph::{ParagraphFactory, ParagraphView};

/// Paragraph formatting applied while flowing rows.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct FlowFormat {
    /// Left inset of the first row.
    pub first_line_indent: f32,
    /// Extra space below each row as a fraction of its height.
    pub line_spacing: f32,
    /// Row alignment.
    pub justification: Justification,
    /// Tab stops for tab-aware views.
    pub tabs: TabStops,
    /// Largest span reported along the flow axis.
    pub span_limit: i32,
}

impl From<&LayoutConfig> for FlowFormat {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            first_line_indent: config.first_line_indent,
            line_spacing: config.line_spacing,
            justification: config.justification,
            tabs: TabStops::new(config.tab_interval),
            span_limit: config.flow_span_limit,
        }
    }
}

impl Default for FlowFormat {
    fn default() -> Self {
        Self::from(&LayoutConfig::default())
    }
}

#[derive(Debug)]
pub(crate) struct FlowNode {
    /// Vertical box of rows.
    pub(crate) frame: BoxNode,
    pub(crate) pool: Vec<ViewId>,
    pub(crate) pooled: HashSet<ViewId>,
    pub(crate) range: Range<usize>,
    pub(crate) format: FlowFormat,
    pub(crate) bidi: Option<Bidi>,
    /// Span the rows were last flowed to.
    pub(crate) layout_span: i32,
    pub(crate) layout_valid: bool,
}

impl ViewTree {
    /// Adds an empty flow covering the model range `range`.
    pub fn insert_flow(&mut self, range: Range<usize>, format: FlowFormat) -> ViewId {
        self.insert(NodeKind::Flow(FlowNode {
            frame: BoxNode::new(Axis::Y, MinorLayout::Aligned),
            pool: Vec::new(),
            pooled: HashSet::new(),
            range,
            format,
            bidi: None,
            layout_span: i32::MAX,
            layout_valid: false,
        }))
    }

    /// The rows of `flow` from the last layout pass.
    pub fn rows(&self, flow: ViewId) -> &[ViewId] {
        self.children(flow)
    }

    /// The logical pool of `flow`.
    pub fn pool(&self, flow: ViewId) -> &[ViewId] {
        self.flow(flow).map_or(&[], |flow| flow.pool.as_slice())
    }

    /// Replaces `removed` pool views at `index` with `views`.
    ///
    /// Rows are dropped and rebuilt on the next layout.
    pub fn replace_pool(
        &mut self,
        flow: ViewId,
        index: usize,
        removed: usize,
        views: Vec<ViewRef>,
    ) -> Result<()> {
        self.clear_rows(flow)?;
        let added: Vec<ViewId> = views.into_iter().map(|view| self.insert_view(view)).collect();
        let node = self.flow_mut(flow)?;
        let index = index.min(node.pool.len());
        let end = (index + removed).min(node.pool.len());
        let old: Vec<ViewId> = node.pool.splice(index..end, added.iter().copied()).collect();
        for id in &old {
            node.pooled.remove(id);
        }
        node.pooled.extend(added.iter().copied());
        for id in old {
            self.remove(id)?;
        }
        for &id in &added {
            self.set_parent(id, Some(flow));
        }
        self.invalidate_flow(flow)
    }

    /// Replaces the whole pool of `flow`.
    pub fn set_pool(&mut self, flow: ViewId, views: Vec<ViewRef>) -> Result<()> {
        let len = self.pool(flow).len();
        self.replace_pool(flow, 0, len, views)
    }

    /// Sets the model range covered by `flow`.
    pub fn set_flow_range(&mut self, flow: ViewId, range: Range<usize>) -> Result<()> {
        self.flow_mut(flow)?.range = range;
        self.invalidate_flow(flow)
    }

    /// Sets the bidi levels used to clip views to level runs and order rows.
    ///
    /// Levels are indexed from the start of the flow's range.
    pub fn set_bidi(&mut self, flow: ViewId, bidi: Option<Bidi>) -> Result<()> {
        self.flow_mut(flow)?.bidi = bidi;
        self.invalidate_flow(flow)
    }

    /// Replaces the formatting of `flow`.
    pub fn set_format(&mut self, flow: ViewId, format: FlowFormat) -> Result<()> {
        self.flow_mut(flow)?.format = format;
        self.invalidate_flow(flow)
    }

    /// Forces the rows of `flow` to be rebuilt on the next layout.
    pub fn invalidate_flow(&mut self, flow: ViewId) -> Result<()> {
        let node = self.flow_mut(flow)?;
        node.layout_valid = false;
        node.frame.invalidate_all();
        self.preference_changed(flow, PreferenceChange::BOTH);
        Ok(())
    }

    /// Requirements of `flow` along its flow axis, derived from the pool.
    ///
    /// The minimum is the widest stretch of views that cannot break; the preference is
    /// the widest stretch between forced breaks.
    pub(crate) fn pool_requirements(&mut self, flow: ViewId) -> SizeRequirements {
        let Ok(node) = self.flow(flow) else {
            return SizeRequirements::default();
        };
        let limit = node.format.span_limit;
        let pool = node.pool.clone();
        let (mut stretch, mut min) = (0.0_f32, 0.0_f32);
        let (mut segment, mut widest) = (0.0_f32, 0.0_f32);
        for view in pool {
            let span = self.preferred_span(view, Axis::X);
            let weight = self.break_weight(view, Axis::X, 0.0, f32::MAX);
            if weight == BreakWeight::BAD {
                stretch += span;
            } else {
                min = min.max(stretch);
                stretch = 0.0;
            }
            segment += span;
            if weight.is_forced() {
                widest = widest.max(segment);
                segment = 0.0;
            }
        }
        min = min.max(stretch);
        widest = widest.max(segment);
        #[expect(clippy::cast_possible_truncation, reason = "spans are whole pixels")]
        let (min, pref) = (min as i32, widest as i32);
        SizeRequirements::new(min, pref.max(min), limit, 0.5)
    }

    /// Sizes `flow`, reflowing its rows first when the span changed or the rows are stale.
    pub(crate) fn layout_flow_to(&mut self, flow: ViewId, width: i32, height: i32) -> Result<()> {
        let node = self.flow_mut(flow)?;
        let span = width.saturating_sub(node.frame.insets.span(Axis::X));
        if node.layout_span != span {
            node.layout_span = span;
            node.layout_valid = false;
        }
        if !node.layout_valid {
            #[expect(clippy::cast_possible_truncation, reason = "spans are whole pixels")]
            let before = self.preferred_span(flow, Axis::Y) as i32;
            self.layout_flow(flow)?;
            #[expect(clippy::cast_possible_truncation, reason = "spans are whole pixels")]
            let after = self.preferred_span(flow, Axis::Y) as i32;
            if before != after {
                self.preference_changed(flow, PreferenceChange::along(Axis::Y));
            }
        }
        self.layout_box(flow, width, height)
    }

    pub(crate) fn is_pooled(&self, flow: ViewId, id: ViewId) -> bool {
        self.flow(flow).is_ok_and(|node| node.pooled.contains(&id))
    }

    /// Hands a view that left a row back to the pool, or drops it if it was a fragment.
    pub(crate) fn release(&mut self, flow: ViewId, id: ViewId) -> Result<()> {
        if self.is_pooled(flow, id) {
            self.set_parent(id, Some(flow));
            Ok(())
        } else {
            self.remove(id)
        }
    }

    /// Drops every row, returning pool members to the pool.
    pub(crate) fn clear_rows(&mut self, flow: ViewId) -> Result<()> {
        let node = self.flow_mut(flow)?;
        let rows = core::mem::take(&mut node.frame.children);
        node.frame.invalidate_all();
        for row in rows {
            let children = self
                .frame_mut(row)
                .map(|frame| core::mem::take(&mut frame.children))
                .unwrap_or_default();
            for child in children {
                self.release(flow, child)?;
            }
            self.remove(row)?;
        }
        Ok(())
    }
}
