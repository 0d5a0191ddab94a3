// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// The paragraph's base direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum BaseDirection {
    /// Choose direction from the first strong character.
    #[default]
    Auto,
    /// Left-to-right.
    Ltr,
    /// Right-to-left.
    Rtl,
}

/// Placement of a row's content along the flow axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Justification {
    /// Flush with the leading edge.
    #[default]
    Left,
    /// Flush with the trailing edge.
    Right,
    /// Centered.
    Center,
    /// Distributed across the row; rows without stretchable content are centered.
    Justified,
}

impl Justification {
    /// The row alignment fraction this justification maps to.
    pub fn alignment(self) -> f32 {
        match self {
            Self::Left => 0.0,
            Self::Right => 1.0,
            Self::Center | Self::Justified => 0.5,
        }
    }
}
