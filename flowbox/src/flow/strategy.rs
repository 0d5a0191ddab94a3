// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(
    clippy::cast_possible_truncation,
    reason = "row positions are whole pixels"
)]

use layout_primitives::{Axis, BreakWeight};

use crate::bidi::reorder_visually;
use crate::boxes::{BoxNode, MinorLayout};
use crate::tree::{NodeKind, ViewId, ViewTree};
use crate::{LayoutError, Result};

impl ViewTree {
    /// Rebuilds the rows of `flow` from its pool at the current flow span.
    ///
    /// Fails with [`LayoutError::Invariant`] if a row makes no progress through the
    /// model; the rows built so far are kept and the flow stays invalid.
    pub fn layout_flow(&mut self, flow: ViewId) -> Result<()> {
        self.clear_rows(flow)?;
        let (range, span) = {
            let node = self.flow(flow)?;
            (node.range.clone(), node.layout_span)
        };
        let mut pos = range.start;
        let mut rows = 0_usize;
        while pos < range.end {
            let row = self.new_row(flow, rows == 0)?;
            let next = self.layout_row(flow, row, pos)?;
            if next <= pos {
                tracing::error!(target: "flowbox.flow", position = pos, rows, "row made no progress");
                return Err(LayoutError::Invariant {
                    message: "infinite loop in formatting",
                });
            }
            self.finish_row(flow, row)?;
            pos = next;
            rows += 1;
        }
        let node = self.flow_mut(flow)?;
        node.layout_valid = true;
        node.frame.invalidate_all();
        tracing::debug!(target: "flowbox.flow", rows, span, "flowed rows");
        Ok(())
    }

    fn new_row(&mut self, flow: ViewId, first: bool) -> Result<ViewId> {
        let node = self.flow(flow)?;
        let format = node.format;
        let mut frame = BoxNode::new(Axis::X, MinorLayout::Baseline);
        frame.justification = Some(format.justification);
        if first {
            let indent = format.first_line_indent as i32;
            frame.insets.left = indent.min(node.layout_span.saturating_sub(5)).max(0);
        }
        let row = self.insert(NodeKind::Box(frame));
        self.set_parent(row, Some(flow));
        self.flow_mut(flow)?.frame.children.push(row);
        Ok(row)
    }

    fn push_child(&mut self, row: ViewId, child: ViewId) {
        if let Some(frame) = self.frame_mut(row) {
            frame.children.push(child);
            frame.invalidate_all();
        }
        self.set_parent(child, Some(row));
    }

    /// Fills `row` starting at model offset `pos` and returns the offset after it.
    fn layout_row(&mut self, flow: ViewId, row: ViewId, pos: usize) -> Result<usize> {
        let (end, tabs, flow_span) = {
            let node = self.flow(flow)?;
            (node.range.end, node.format.tabs, node.layout_span)
        };
        let insets = self.frame(row).map(|frame| frame.insets).unwrap_or_default();
        let x0 = insets.left;
        let available = flow_span.saturating_sub(insets.span(Axis::X));

        let mut x = x0;
        let mut span_left = available;
        let mut pos = pos;
        while pos < end && span_left > 0 {
            let Some(mut view) = self.create_view(flow, pos)? else {
                break;
            };
            let mut chunk = self.chunk_span(view, x as f32, &tabs) as i32;
            let forced = self
                .break_weight(view, Axis::X, x as f32, span_left as f32)
                .is_forced();
            if forced {
                view = self.break_node(flow, view, pos, x as f32, span_left as f32)?;
                chunk = self.chunk_span(view, x as f32, &tabs) as i32;
            }
            span_left = span_left.saturating_sub(chunk);
            x = x.saturating_add(chunk);
            self.push_child(row, view);
            pos = self.end_offset(view);
            if forced {
                break;
            }
        }

        if span_left < 0 {
            self.adjust_row(flow, row, available, x0)?;
        } else if self.children(row).is_empty() {
            if let Some(view) = self.create_view(flow, pos)? {
                self.push_child(row, view);
            }
        }
        Ok(self.end_offset(row))
    }

    /// Breaks an overfull row at its best break opportunity.
    ///
    /// The last child with the highest weight wins; a forced break ends the search.
    fn adjust_row(&mut self, flow: ViewId, row: ViewId, desired: i32, x0: i32) -> Result<()> {
        let children = self.children(row).to_vec();
        let mut span = 0_i32;
        let mut best_weight = BreakWeight::BAD;
        let mut best = None;
        for (index, &child) in children.iter().enumerate() {
            let left = desired.saturating_sub(span);
            let weight = self.break_weight(child, Axis::X, x0.saturating_add(span) as f32, left as f32);
            if weight >= best_weight && weight > BreakWeight::BAD {
                best_weight = weight;
                best = Some((index, span));
                if weight.is_forced() {
                    break;
                }
            }
            span = span.saturating_add(self.preferred_span(child, Axis::X) as i32);
        }
        let Some((index, best_span)) = best else {
            return Ok(());
        };

        let child = children[index];
        let start = self.start_offset(child);
        let piece = self.view(child).and_then(|view| {
            view.break_view(
                Axis::X,
                start,
                x0.saturating_add(best_span) as f32,
                desired.saturating_sub(best_span) as f32,
            )
        });
        let kept = match piece {
            Some(piece) => self.insert_view(piece),
            None => child,
        };
        if let Some(frame) = self.frame_mut(row) {
            frame.children.truncate(index);
            frame.invalidate_all();
        }
        for &old in &children[index..] {
            if old != kept {
                self.release(flow, old)?;
            }
        }
        self.push_child(row, kept);
        Ok(())
    }

    /// Breaks `id` at `offset` to fit `len`, replacing it with the broken piece.
    fn break_node(&mut self, flow: ViewId, id: ViewId, offset: usize, pos: f32, len: f32) -> Result<ViewId> {
        let piece = self
            .view(id)
            .and_then(|view| view.break_view(Axis::X, offset, pos, len));
        match piece {
            Some(piece) => {
                self.release(flow, id)?;
                Ok(self.insert_view(piece))
            }
            None => Ok(id),
        }
    }

    /// The pool view covering `offset`, clipped to start there and to end with its
    /// bidi level run.
    fn create_view(&mut self, flow: ViewId, offset: usize) -> Result<Option<ViewId>> {
        let node = self.flow(flow)?;
        let found = node
            .pool
            .iter()
            .copied()
            .find(|&id| self.start_offset(id) <= offset && offset < self.end_offset(id));
        let Some(id) = found else {
            return Ok(None);
        };
        let Some(view) = self.view(id).cloned() else {
            return Ok(Some(id));
        };
        let mut limit = view.end_offset();
        if let Some(bidi) = &node.bidi {
            let run_end = node.range.start + bidi.run_limit(offset - node.range.start);
            if run_end > offset {
                limit = limit.min(run_end);
            }
        }
        if offset == view.start_offset() && limit == view.end_offset() {
            return Ok(Some(id));
        }
        Ok(Some(match view.create_fragment(offset, limit) {
            Some(fragment) => self.insert_view(fragment),
            None => id,
        }))
    }

    /// Applies line spacing and puts the children of a finished row in visual order.
    fn finish_row(&mut self, flow: ViewId, row: ViewId) -> Result<()> {
        let spacing = self.flow(flow)?.format.line_spacing;
        if spacing > 0.0 {
            let height = self.preferred_span(row, Axis::Y);
            if let Some(frame) = self.frame_mut(row) {
                frame.insets.bottom = (height * spacing) as i32;
                frame.invalidate(Axis::Y);
            }
        }

        let children = self.children(row).to_vec();
        if children.len() < 2 {
            return Ok(());
        }
        let node = self.flow(flow)?;
        let Some(bidi) = &node.bidi else {
            return Ok(());
        };
        let base = node.range.start;
        let row_start = self.start_offset(row).saturating_sub(base);
        let row_end = self.end_offset(row).saturating_sub(base);
        let Ok(line) = bidi.line(row_start, row_end) else {
            return Ok(());
        };
        if line.is_left_to_right() {
            return Ok(());
        }
        let levels: Vec<u8> = children
            .iter()
            .map(|&child| line.level_at(self.start_offset(child).saturating_sub(base + row_start)))
            .collect();
        let mut ordered = children;
        reorder_visually(&levels, &mut ordered);
        if let Some(frame) = self.frame_mut(row) {
            frame.children = ordered;
            frame.invalidate(Axis::X);
        }
        Ok(())
    }
}
