// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the integration test suite for `flowbox`.
//!
//! - The `util` module holds fixtures shared by the topic modules.
//! - We do not use the default Rust test harness, but instead use this `mod.rs` file as the
//!   entry point to run all other tests, so that fixtures are compiled once.
//! - Put new tests in the module for their component, and start test names with the topic
//!   (`flow_rows_cover_range` rather than `rows_cover_range_in_flow`).

#![allow(missing_docs, reason = "we don't need docs for testing")]
#![allow(clippy::cast_possible_truncation, reason = "not critical for testing")]

mod bidi;
mod document;
mod flow;
#[macro_use]
mod util;
