// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// How attractive a candidate position is for splitting a view.
///
/// Weights are ordered; the flow strategy prefers the highest weight and treats
/// anything at or above [`BreakWeight::FORCED`] as a mandatory break.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(transparent)]
pub struct BreakWeight(i32);

impl BreakWeight {
    /// The view cannot be broken.
    pub const BAD: Self = Self(0);

    /// A break is possible but not at a natural boundary.
    pub const GOOD: Self = Self(1000);

    /// A break falls on a natural boundary such as whitespace.
    pub const EXCELLENT: Self = Self(2000);

    /// The view must be broken here.
    pub const FORCED: Self = Self(3000);

    /// Creates a weight from a raw value.
    pub const fn new(weight: i32) -> Self {
        Self(weight)
    }

    /// Returns the raw weight value.
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Returns `true` if this weight requires a break.
    pub const fn is_forced(self) -> bool {
        self.0 >= Self::FORCED.0
    }
}
