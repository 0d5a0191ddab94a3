// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Size constraints of a view along one axis.
///
/// `alignment` is the fraction of the span that lies before the alignment point,
/// in `0.0..=1.0`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SizeRequirements {
    /// The smallest usable span.
    pub minimum: i32,
    /// The natural span.
    pub preferred: i32,
    /// The largest usable span.
    pub maximum: i32,
    /// Alignment point as a fraction of the span.
    pub alignment: f32,
}

impl SizeRequirements {
    /// Creates requirements from their parts.
    pub const fn new(minimum: i32, preferred: i32, maximum: i32, alignment: f32) -> Self {
        Self {
            minimum,
            preferred,
            maximum,
            alignment,
        }
    }

    /// Requirements for a rigid span, centered.
    pub const fn fixed(span: i32) -> Self {
        Self::new(span, span, span, 0.5)
    }

    /// Returns `true` if the span can both grow and shrink.
    ///
    /// A flexible view reports a resize weight of `1`, a rigid one `0`.
    pub fn is_flexible(&self) -> bool {
        self.preferred != self.minimum && self.preferred != self.maximum
    }
}

impl Default for SizeRequirements {
    fn default() -> Self {
        Self::new(0, 0, 0, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::SizeRequirements;

    #[test]
    fn flexibility_needs_room_both_ways() {
        assert!(SizeRequirements::new(0, 10, 20, 0.5).is_flexible());
        assert!(!SizeRequirements::new(10, 10, 20, 0.5).is_flexible());
        assert!(!SizeRequirements::fixed(10).is_flexible());
    }
}
