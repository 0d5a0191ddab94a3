// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(
    clippy::cast_possible_truncation,
    reason = "spans are whole pixels; fractional parts are dropped as they are summed"
)]

use layout_primitives::{Axis, SizeRequirements};

use crate::view::Measurable;

/// A child's preferences along one axis, as seen by a box.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ChildMetrics {
    /// Smallest usable span.
    pub minimum: f32,
    /// Natural span.
    pub preferred: f32,
    /// Largest usable span.
    pub maximum: f32,
    /// Alignment fraction.
    pub alignment: f32,
    /// Resize weight; `0` is rigid.
    pub resize_weight: i32,
}

impl ChildMetrics {
    /// Reads the metrics of `view` along `axis`.
    pub fn of(view: &dyn Measurable, axis: Axis) -> Self {
        Self {
            minimum: view.minimum_span(axis),
            preferred: view.preferred_span(axis),
            maximum: view.maximum_span(axis),
            alignment: view.alignment(axis),
            resize_weight: view.resize_weight(axis),
        }
    }

    /// A rigid child of the given span, centered.
    pub fn fixed(span: f32) -> Self {
        Self {
            minimum: span,
            preferred: span,
            maximum: span,
            alignment: 0.5,
            resize_weight: 0,
        }
    }

    /// A child with independent spans and alignment.
    pub fn new(minimum: f32, preferred: f32, maximum: f32, alignment: f32) -> Self {
        let flexible = preferred != minimum && preferred != maximum;
        Self {
            minimum,
            preferred,
            maximum,
            alignment,
            resize_weight: i32::from(flexible),
        }
    }
}

/// Requirements of children laid end to end.
///
/// Spans are summed as floats and truncated once.
pub fn tiled_requirements(children: &[ChildMetrics]) -> SizeRequirements {
    let (mut min, mut pref, mut max) = (0_f64, 0_f64, 0_f64);
    for child in children {
        min += f64::from(child.minimum);
        pref += f64::from(child.preferred);
        max += f64::from(child.maximum);
    }
    SizeRequirements::new(
        clamp_span(min),
        clamp_span(pref),
        clamp_span(max),
        0.5,
    )
}

/// Requirements of children stacked across the box, each aligned independently.
///
/// The maximum is left unbounded so that rows can be widened to the box.
pub fn aligned_requirements(children: &[ChildMetrics]) -> SizeRequirements {
    let mut min = 0_i32;
    let mut pref = 0_i64;
    let max = i32::MAX;
    for child in children {
        min = min.max(child.minimum as i32);
        pref = pref.max(child.preferred as i64);
    }
    SizeRequirements::new(min, clamp_span(pref as f64), max, 0.5)
}

/// Requirements of children aligned on a shared baseline.
pub fn baseline_requirements(children: &[ChildMetrics]) -> SizeRequirements {
    let mut above = 0_i32;
    let mut below = 0_i32;
    let mut weight = 0_i32;
    for child in children {
        let span = child.preferred as i32;
        let child_below = (child.alignment * span as f32) as i32;
        let child_above = span - child_below;
        above = above.max(child_above);
        below = below.max(child_below);
        weight = weight.saturating_add(child.resize_weight);
    }
    let preferred = above.saturating_add(below);
    let (minimum, maximum) = if weight != 0 {
        (0, i32::MAX)
    } else {
        (preferred, preferred)
    };
    let alignment = if preferred > 0 {
        below as f32 / preferred as f32
    } else {
        0.5
    };
    SizeRequirements::new(minimum, preferred, maximum, alignment)
}

fn clamp_span(span: f64) -> i32 {
    span.clamp(0.0, f64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiled_sums_before_truncating() {
        let children = [ChildMetrics::fixed(10.4), ChildMetrics::fixed(10.4), ChildMetrics::fixed(10.4)];
        let r = tiled_requirements(&children);
        assert_eq!(r.preferred, 31);
        assert_eq!(r.minimum, 31);
        assert_eq!(r.alignment, 0.5);
    }

    #[test]
    fn tiled_maximum_saturates() {
        let children = [
            ChildMetrics::new(0.0, 10.0, i32::MAX as f32, 0.5),
            ChildMetrics::new(0.0, 10.0, i32::MAX as f32, 0.5),
        ];
        assert_eq!(tiled_requirements(&children).maximum, i32::MAX);
    }

    #[test]
    fn aligned_takes_largest_child() {
        let children = [
            ChildMetrics::new(5.0, 20.0, 30.0, 0.0),
            ChildMetrics::new(8.0, 12.0, 12.0, 0.5),
        ];
        let r = aligned_requirements(&children);
        assert_eq!((r.minimum, r.preferred, r.maximum), (8, 20, i32::MAX));
    }

    #[test]
    fn baseline_stacks_above_and_below() {
        // A: 10 tall, 8 above the baseline. B: 20 tall, 10 above.
        let children = [ChildMetrics::new(10.0, 10.0, 10.0, 0.2), ChildMetrics::new(20.0, 20.0, 20.0, 0.5)];
        let r = baseline_requirements(&children);
        assert_eq!(r.preferred, 20);
        assert_eq!(r.minimum, 20);
        assert_eq!(r.alignment, 0.5);

        let flexible = [ChildMetrics::new(0.0, 10.0, 40.0, 0.5)];
        let r = baseline_requirements(&flexible);
        assert_eq!((r.minimum, r.maximum), (0, i32::MAX));
    }
}
