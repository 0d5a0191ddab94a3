// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View layout core for rich text.
//!
//! Flowbox lays out a paragraph-structured [`Document`] in four layers:
//!
//! - [`bidi`] resolves embedding levels and visual order for mixed-direction text.
//! - [`boxes`] tiles children along a major axis and aligns them across it.
//! - [`flow`] breaks a paragraph's runs into rows of a fixed span.
//! - [`async_box`] measures paragraphs on background threads and keeps a locator for
//!   painting and hit testing the part that is already measured.
//!
//! Containers live in a [`ViewTree`] arena; leaf content implements [`View`].
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use flowbox::{Document, LayoutConfig, Measurable, MonospaceMetrics, ParagraphView, View};
//! use layout_primitives::Axis;
//!
//! let doc = Document::new("the quick brown fox\n");
//! let metrics = Arc::new(MonospaceMetrics::new(10.0, 8.0, 2.0));
//! let paragraph = ParagraphView::new(&doc.read(), 0, metrics, LayoutConfig::default());
//!
//! paragraph.layout(100.0).unwrap();
//! assert_eq!(paragraph.row_count(), 2);
//! assert_eq!(paragraph.preferred_span(Axis::Y), 20.0);
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

pub mod async_box;
pub mod bidi;
pub mod boxes;
pub mod flow;

mod config;
mod document;
mod error;
mod paint;
mod text_view;
mod tree;
mod view;

pub use async_box::{AsyncBox, ChildSpans, LayoutQueue, LayoutTask, Priority};
pub use config::{DEFAULT_TAB_INTERVAL, LayoutConfig};
pub use document::{
    Document, DocumentEvent, DocumentState, ElementChange, EventKind, Paragraph, Run,
    RunChange, RunStyle,
};
pub use error::{LayoutError, Result};
pub use flow::{FlowFormat, ParagraphFactory, ParagraphView};
pub use paint::{Canvas, DisplayItem, DisplayList};
pub use text_view::{LINE_SEPARATOR, MonospaceMetrics, TextMetrics, TextRunView};
pub use tree::{ViewId, ViewTree};
pub use view::{
    Breakable, Measurable, Paintable, PreferenceChange, PreferenceSink, TabExpander, TabStops,
    View, ViewFactory, ViewRef,
};
