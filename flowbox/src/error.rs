// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use layout_primitives::InvalidAxis;

/// Errors raised by layout operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum LayoutError {
    /// An axis index outside `{0, 1}`.
    #[error("invalid axis index {index}")]
    InvalidAxis {
        /// The rejected index.
        index: usize,
    },
    /// Internal state that layout cannot recover from, such as a row that makes no
    /// progress. The current pass is abandoned and its caches stay invalid.
    #[error("layout invariant violated: {message}")]
    Invariant {
        /// What went wrong.
        message: &'static str,
    },
    /// A model position outside the range covered by the queried view.
    #[error("position {position} is outside {start}..{end}")]
    PositionOutOfRange {
        /// The requested position.
        position: usize,
        /// Start of the covered range.
        start: usize,
        /// End of the covered range.
        end: usize,
    },
    /// A view handle that no longer refers to a live node.
    #[error("view {id} is not in the tree")]
    MissingView {
        /// Raw index of the handle.
        id: usize,
    },
}

impl LayoutError {
    /// Returns `true` for outcomes a caller can handle by trying elsewhere.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PositionOutOfRange { .. })
    }
}

impl From<InvalidAxis> for LayoutError {
    fn from(err: InvalidAxis) -> Self {
        Self::InvalidAxis { index: err.index() }
    }
}

/// Result type for layout operations.
pub type Result<T, E = LayoutError> = core::result::Result<T, E>;
