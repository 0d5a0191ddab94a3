// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixtures shared across tests.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use flowbox::{
    Breakable, Canvas, Measurable, MonospaceMetrics, Paintable, PreferenceChange, PreferenceSink,
    RunStyle, TabStops, TextMetrics, TextRunView, View, ViewRef,
};
use layout_primitives::{Axis, Rect};

/// Returns the current function name (for use in assertion messages).
#[macro_export]
macro_rules! test_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            core::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let name = &name[..name.len() - 3];
        let name = &name[name.rfind(':').map(|x| x + 1).unwrap_or(0)..];

        name
    }};
}

pub(crate) fn chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

/// Ten units per character, rows ten units tall.
pub(crate) fn metrics() -> Arc<dyn TextMetrics> {
    Arc::new(MonospaceMetrics::new(10.0, 8.0, 2.0))
}

/// Text run views over `text`, split before each offset in `cuts`.
pub(crate) fn run_views(text: &str, cuts: &[usize]) -> (Arc<[char]>, Vec<ViewRef>) {
    let text: Arc<[char]> = text.chars().collect();
    let metrics = metrics();
    let mut bounds = vec![0];
    bounds.extend_from_slice(cuts);
    bounds.push(text.len());
    let views = bounds
        .windows(2)
        .map(|w| {
            Arc::new(TextRunView::new(
                text.clone(),
                w[0]..w[1],
                RunStyle::default(),
                metrics.clone(),
                TabStops::default(),
            )) as ViewRef
        })
        .collect();
    (text, views)
}

/// A rigid rectangle covering one model position.
#[derive(Debug)]
pub(crate) struct Block {
    width: f32,
    height: f32,
}

impl Block {
    pub(crate) fn view(width: f32, height: f32) -> ViewRef {
        Arc::new(Self { width, height })
    }
}

impl Measurable for Block {
    fn preferred_span(&self, axis: Axis) -> f32 {
        axis.select(self.width, self.height)
    }
}

impl Breakable for Block {
    fn start_offset(&self) -> usize {
        0
    }

    fn end_offset(&self) -> usize {
        1
    }
}

impl Paintable for Block {
    fn paint(&self, canvas: &mut dyn Canvas, alloc: Rect) {
        canvas.draw_text("#", alloc, alloc.max_y());
    }
}

impl View for Block {}

/// Records the notifications leaving a box.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    changes: Mutex<Vec<PreferenceChange>>,
    repaints: Mutex<usize>,
}

impl RecordingSink {
    pub(crate) fn changes(&self) -> Vec<PreferenceChange> {
        self.changes.lock().unwrap().clone()
    }

    pub(crate) fn repaints(&self) -> usize {
        *self.repaints.lock().unwrap()
    }
}

impl PreferenceSink for RecordingSink {
    fn preference_changed(&self, change: PreferenceChange) {
        self.changes.lock().unwrap().push(change);
    }

    fn repaint(&self) {
        *self.repaints.lock().unwrap() += 1;
    }
}

/// Polls `done` until it holds, failing after a few seconds.
pub(crate) fn wait_for(name: &str, mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !done() {
        assert!(Instant::now() < deadline, "{name}: timed out");
        std::thread::sleep(Duration::from_millis(5));
    }
}
