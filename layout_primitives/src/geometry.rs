// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::Axis;

/// An integer rectangle in view coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Horizontal extent.
    pub width: i32,
    /// Vertical extent.
    pub height: i32,
}

impl Rect {
    /// Creates a rectangle from its origin and size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    pub const fn max_x(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    pub const fn max_y(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Origin along `axis`.
    pub fn origin(&self, axis: Axis) -> i32 {
        axis.select(self.x, self.y)
    }

    /// Extent along `axis`.
    pub fn span(&self, axis: Axis) -> i32 {
        axis.select(self.width, self.height)
    }

    /// Returns `true` if the rectangles overlap with a non-empty area.
    ///
    /// Empty rectangles never intersect anything.
    pub fn intersects(&self, other: &Self) -> bool {
        if self.width <= 0 || self.height <= 0 || other.width <= 0 || other.height <= 0 {
            return false;
        }
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    /// Returns `true` if the point lies inside the rectangle.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.max_x() && y >= self.y && y < self.max_y()
    }

    /// Shrinks the rectangle by the given insets.
    pub fn inset(&self, insets: Insets) -> Self {
        Self {
            x: self.x + insets.left,
            y: self.y + insets.top,
            width: self.width - insets.left - insets.right,
            height: self.height - insets.top - insets.bottom,
        }
    }
}

/// Margins around the content of a box.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Insets {
    /// Space above the content.
    pub top: i32,
    /// Space before the content on the horizontal axis.
    pub left: i32,
    /// Space below the content.
    pub bottom: i32,
    /// Space after the content on the horizontal axis.
    pub right: i32,
}

impl Insets {
    /// Insets with no space on any side.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Creates insets in top, left, bottom, right order.
    pub const fn new(top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// The leading inset along `axis` (left or top).
    pub fn leading(&self, axis: Axis) -> i32 {
        axis.select(self.left, self.top)
    }

    /// The sum of both insets along `axis`.
    pub fn span(&self, axis: Axis) -> i32 {
        axis.select(self.left + self.right, self.top + self.bottom)
    }
}

/// Affinity of a model position that sits on the boundary between two runs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Bias {
    /// The position belongs to the following character.
    #[default]
    Forward,
    /// The position belongs to the preceding character.
    Backward,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rects_never_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.intersects(&Rect::new(5, 5, 10, 10)));
        assert!(!a.intersects(&Rect::new(10, 0, 10, 10)));
        assert!(!a.intersects(&Rect::new(2, 2, 0, 4)));
    }

    #[test]
    fn inset_shrinks_both_sides() {
        let r = Rect::new(0, 0, 100, 50).inset(Insets::new(1, 2, 3, 4));
        assert_eq!(r, Rect::new(2, 1, 94, 46));
        assert_eq!(Insets::new(1, 2, 3, 4).span(Axis::Y), 4);
    }
}
