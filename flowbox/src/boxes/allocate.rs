// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(
    clippy::cast_possible_truncation,
    reason = "child spans and offsets are whole pixels"
)]

use super::ChildMetrics;

/// Offsets and spans assigned to a box's children along one axis.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Allocation {
    /// Offset of each child from the box's inner origin.
    pub offsets: Vec<i32>,
    /// Span of each child.
    pub spans: Vec<i32>,
}

impl Allocation {
    /// Number of allocated children.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` when there are no children.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Sum of the allocated spans.
    pub fn total(&self) -> i64 {
        self.spans.iter().map(|&s| i64::from(s)).sum()
    }
}

/// Tiles children end to end, distributing `target - preferred` in proportion to each
/// child's room to grow or shrink.
pub fn layout_major_axis(target: i32, children: &[ChildMetrics]) -> Allocation {
    let mut spans: Vec<i32> = children.iter().map(|c| c.preferred as i32).collect();
    let preferred: i64 = spans.iter().map(|&s| i64::from(s)).sum();
    let desired = i64::from(target) - preferred;

    let mut factor = 0.0_f32;
    if desired != 0 {
        let limit: i64 = children
            .iter()
            .map(|c| {
                if desired > 0 {
                    i64::from(c.maximum as i32)
                } else {
                    i64::from(c.minimum as i32)
                }
            })
            .sum();
        let room = (limit - preferred).abs();
        if room != 0 {
            factor = (desired as f32 / room as f32).clamp(-1.0, 1.0);
        }
    }

    let mut offsets = Vec::with_capacity(children.len());
    let mut total = 0_i32;
    for (child, span) in children.iter().zip(spans.iter_mut()) {
        offsets.push(total);
        if factor != 0.0 {
            let room = if factor > 0.0 {
                (child.maximum as i32).saturating_sub(*span)
            } else {
                span.saturating_sub(child.minimum as i32)
            };
            let adjust = factor * room as f32;
            let rounded = if adjust < 0.0 { adjust - 0.5 } else { adjust + 0.5 };
            *span = span.saturating_add(rounded as i32);
        }
        total = total.saturating_add(*span);
    }
    Allocation { offsets, spans }
}

/// Places each child across the box: rigid children narrower than the box are aligned
/// inside it, the rest are stretched to the box.
pub fn layout_minor_axis(target: i32, children: &[ChildMetrics]) -> Allocation {
    let mut allocation = Allocation::default();
    for child in children {
        let max = child.maximum as i32;
        if max < target {
            allocation
                .offsets
                .push(((target - max) as f32 * child.alignment) as i32);
            allocation.spans.push(max);
        } else {
            let min = child.minimum as i32;
            allocation.offsets.push(0);
            allocation.spans.push(min.max(target));
        }
    }
    allocation
}

/// Aligns children on a shared baseline placed at `alignment` of the box.
///
/// Each child keeps its preferred span split at its own alignment, unless it is too
/// large and can shrink or too small and can grow. Those children take the box's
/// whole split around the baseline instead.
pub fn baseline_layout(target: i32, alignment: f32, children: &[ChildMetrics]) -> Allocation {
    let total_before = (target as f32 * alignment) as i32;
    let total_after = target - total_before;
    let mut allocation = Allocation::default();
    for child in children {
        let span = child.preferred as i32;
        let mut before = (span as f32 * child.alignment) as i32;
        let mut after = span - before;
        let compress = span > target && (child.minimum as i32) < span;
        let expand = span < target && (child.maximum as i32) > span;
        if compress || expand {
            before = total_before;
            after = total_after;
        }
        allocation.offsets.push(total_before - before);
        allocation.spans.push(before + after);
    }
    allocation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flexible(min: f32, pref: f32, max: f32) -> ChildMetrics {
        ChildMetrics::new(min, pref, max, 0.5)
    }

    #[test]
    fn exact_fit_keeps_preferences() {
        let children = [ChildMetrics::fixed(30.0), ChildMetrics::fixed(70.0)];
        let a = layout_major_axis(100, &children);
        assert_eq!(a.spans, [30, 70]);
        assert_eq!(a.offsets, [0, 30]);
    }

    #[test]
    fn growth_is_proportional_to_room() {
        let children = [flexible(0.0, 10.0, 30.0), flexible(0.0, 10.0, 70.0)];
        let a = layout_major_axis(60, &children);
        // 40 to distribute over 80 of room: factor 0.5.
        assert_eq!(a.spans, [20, 40]);
        assert_eq!(a.offsets, [0, 20]);
        assert_eq!(a.total(), 60);
    }

    #[test]
    fn shrinking_stops_at_minimum() {
        let children = [flexible(5.0, 20.0, 40.0), flexible(5.0, 20.0, 40.0)];
        let a = layout_major_axis(0, &children);
        assert_eq!(a.spans, [5, 5]);
    }

    #[test]
    fn rigid_children_ignore_target() {
        let children = [ChildMetrics::fixed(10.0), ChildMetrics::fixed(10.0)];
        let a = layout_major_axis(100, &children);
        assert_eq!(a.spans, [10, 10]);
    }

    #[test]
    fn offsets_saturate() {
        let children = [ChildMetrics::fixed(i32::MAX as f32), ChildMetrics::fixed(10.0)];
        let a = layout_major_axis(i32::MAX, &children);
        assert_eq!(a.offsets[1], i32::MAX);
    }

    #[test]
    fn minor_axis_aligns_narrow_children() {
        let children = [
            ChildMetrics::new(20.0, 20.0, 20.0, 1.0),
            ChildMetrics::new(10.0, 50.0, i32::MAX as f32, 0.5),
            ChildMetrics::new(150.0, 150.0, 150.0, 0.5),
        ];
        let a = layout_minor_axis(100, &children);
        assert_eq!(a.offsets, [80, 0, 0]);
        assert_eq!(a.spans, [20, 100, 150]);
    }

    #[test]
    fn baseline_aligns_rigid_children() {
        let children = [
            ChildMetrics::new(10.0, 10.0, 10.0, 0.8),
            ChildMetrics::new(20.0, 20.0, 20.0, 0.5),
        ];
        let a = baseline_layout(20, 0.5, &children);
        assert_eq!(a.spans, [10, 20]);
        assert_eq!(a.offsets, [2, 0]);
    }

    #[test]
    fn baseline_stretches_growable_children_to_the_box() {
        let a = baseline_layout(20, 0.5, &[ChildMetrics::new(0.0, 10.0, 40.0, 0.2)]);
        assert_eq!((a.offsets[0], a.spans[0]), (0, 20));
    }

    #[test]
    fn baseline_compresses_oversized_children() {
        let a = baseline_layout(20, 0.5, &[ChildMetrics::new(5.0, 30.0, 30.0, 0.5)]);
        assert_eq!((a.offsets[0], a.spans[0]), (0, 20));
    }

    #[test]
    fn baseline_leaves_oversized_rigid_children() {
        let a = baseline_layout(20, 0.5, &[ChildMetrics::new(30.0, 30.0, 30.0, 0.5)]);
        assert_eq!((a.offsets[0], a.spans[0]), (-5, 30));
    }
}
