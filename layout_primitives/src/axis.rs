// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// One of the two perpendicular layout directions.
///
/// A box tiles its children along its *major* axis and aligns them along the
/// other (*minor*) axis.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Axis {
    /// The horizontal axis.
    X,
    /// The vertical axis.
    Y,
}

impl Axis {
    /// Both axes, in index order.
    pub const ALL: [Self; 2] = [Self::X, Self::Y];

    /// Resolves a numeric axis index, where `0` is [`Axis::X`] and `1` is [`Axis::Y`].
    ///
    /// Any other value is a programmer error and is reported rather than defaulted.
    ///
    /// ```
    /// use layout_primitives::Axis;
    ///
    /// assert_eq!(Axis::from_index(0), Ok(Axis::X));
    /// assert!(Axis::from_index(2).is_err());
    /// ```
    pub const fn from_index(index: usize) -> Result<Self, InvalidAxis> {
        match index {
            0 => Ok(Self::X),
            1 => Ok(Self::Y),
            _ => Err(InvalidAxis { index }),
        }
    }

    /// Returns the numeric index of this axis.
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
        }
    }

    /// Returns the perpendicular axis.
    pub const fn other(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }

    /// Picks the component of a `(width, height)` pair that lies along this axis.
    pub fn select<T>(self, width: T, height: T) -> T {
        match self {
            Self::X => width,
            Self::Y => height,
        }
    }
}

/// Error returned by [`Axis::from_index`] for an index outside `{0, 1}`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InvalidAxis {
    index: usize,
}

impl InvalidAxis {
    /// The rejected axis index.
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for InvalidAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid axis index {}", self.index)
    }
}

impl core::error::Error for InvalidAxis {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_index() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_index(axis.index()), Ok(axis));
        }
    }

    #[test]
    fn rejects_unknown_index() {
        let err = Axis::from_index(7).unwrap_err();
        assert_eq!(err.index(), 7);
    }

    #[test]
    fn select_follows_axis() {
        assert_eq!(Axis::X.select(3, 4), 3);
        assert_eq!(Axis::Y.select(3, 4), 4);
        assert_eq!(Axis::Y.other(), Axis::X);
    }
}
