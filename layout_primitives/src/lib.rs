// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fundamental layout vocabulary types.
//!
//! This crate is a lightweight, `no_std` vocabulary layer shared by the box, flow and
//! bidi machinery in `flowbox`. It focuses on small, typed representations of the
//! "leaf" concepts of view layout: axes, break weights, size requirements, integer
//! rectangles and paragraph direction.
//!
//! ## Features
//!
//! - `std` (enabled by default): This is currently unused and is provided for forward compatibility.
//!
//! ## Example
//!
//! ```
//! use layout_primitives::{Axis, BreakWeight, SizeRequirements};
//!
//! let axis = Axis::from_index(1).unwrap();
//! assert_eq!(axis, Axis::Y);
//! assert_eq!(axis.other(), Axis::X);
//!
//! assert!(BreakWeight::FORCED > BreakWeight::EXCELLENT);
//!
//! let fixed = SizeRequirements::fixed(40);
//! assert_eq!(fixed.minimum, fixed.maximum);
//! ```
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

mod axis;
mod bidi;
mod break_weight;
mod geometry;
mod requirements;
mod text;

pub use axis::{Axis, InvalidAxis};
pub use bidi::BidiOverride;
pub use break_weight::BreakWeight;
pub use geometry::{Bias, Insets, Rect};
pub use requirements::SizeRequirements;
pub use text::{BaseDirection, Justification};
