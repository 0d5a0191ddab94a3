// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use layout_primitives::{BaseDirection, Justification};

/// Default distance between tab stops.
pub const DEFAULT_TAB_INTERVAL: f32 = 72.0;

/// Paragraph formatting and scheduling options.
///
/// Passed explicitly to the views that need it; there is no global configuration.
///
/// ```
/// use flowbox::LayoutConfig;
/// use layout_primitives::Justification;
///
/// let config = LayoutConfig::default()
///     .with_first_line_indent(24.0)
///     .with_justification(Justification::Center);
/// assert_eq!(config.tab_interval, 72.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Distance between default tab stops.
    pub tab_interval: f32,
    /// Largest span a flow reports along its flow axis.
    pub flow_span_limit: i32,
    /// Inset of the first row of a paragraph.
    pub first_line_indent: f32,
    /// Extra space below each row, as a fraction of the row height.
    pub line_spacing: f32,
    /// Placement of rows that do not fill the flow span.
    pub justification: Justification,
    /// Paragraph direction.
    pub base_direction: BaseDirection,
    /// Background layout threads; `0` means tasks only run when drained explicitly.
    pub worker_threads: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            tab_interval: DEFAULT_TAB_INTERVAL,
            flow_span_limit: i32::from(i16::MAX),
            first_line_indent: 0.0,
            line_spacing: 0.0,
            justification: Justification::Left,
            base_direction: BaseDirection::Auto,
            worker_threads: 1,
        }
    }
}

impl LayoutConfig {
    /// Sets the tab interval.
    pub fn with_tab_interval(mut self, interval: f32) -> Self {
        self.tab_interval = interval;
        self
    }

    /// Sets the first-line indent.
    pub fn with_first_line_indent(mut self, indent: f32) -> Self {
        self.first_line_indent = indent;
        self
    }

    /// Sets the line spacing fraction.
    pub fn with_line_spacing(mut self, spacing: f32) -> Self {
        self.line_spacing = spacing;
        self
    }

    /// Sets the row justification.
    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }

    /// Sets the paragraph direction.
    pub fn with_base_direction(mut self, direction: BaseDirection) -> Self {
        self.base_direction = direction;
        self
    }

    /// Sets the number of background layout threads.
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }
}
