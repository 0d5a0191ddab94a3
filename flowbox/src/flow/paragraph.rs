// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use layout_primitives::{Axis, Bias, BidiOverride, Rect};

use super::FlowFormat;
use crate::LayoutConfig;
use crate::bidi::{Bidi, EmbeddingStack, default_is_ltr};
use crate::document::{DocumentState, ElementChange, Run};
use crate::paint::Canvas;
use crate::text_view::{TextMetrics, TextRunView};
use crate::tree::{ViewId, ViewTree};
use crate::view::{
    Breakable, Measurable, Paintable, PreferenceChange, TabStops, View, ViewFactory, ViewRef,
};
use crate::Result;

const LRO: char = '\u{202D}';
const RLO: char = '\u{202E}';
const PDF: char = '\u{202C}';

/// A paragraph flowed into rows of text runs.
///
/// Offsets are relative to the start of the paragraph. The view owns a private
/// [`ViewTree`] holding its flow, rows and run views behind a mutex, so it can be shared
/// with a background layout worker.
#[derive(Debug)]
pub struct ParagraphView {
    state: Mutex<ParagraphState>,
}

#[derive(Debug)]
struct ParagraphState {
    tree: ViewTree,
    flow: ViewId,
    text: Arc<[char]>,
    runs: Vec<Run>,
    start: usize,
    metrics: Arc<dyn TextMetrics>,
    config: LayoutConfig,
}

impl ParagraphState {
    fn run_view(&self, run: &Run) -> ViewRef {
        let range = run.range();
        let local = range.start - self.start..range.end - self.start;
        Arc::new(TextRunView::new(
            self.text.clone(),
            local,
            run.style(),
            self.metrics.clone(),
            TabStops::new(self.config.tab_interval),
        ))
    }

    fn bidi(&self) -> Bidi {
        let ltr = match self.config.base_direction {
            layout_primitives::BaseDirection::Ltr => true,
            layout_primitives::BaseDirection::Rtl => false,
            _ => default_is_ltr(&self.text),
        };
        // Run overrides behave like override controls around the run.
        let mut stack = EmbeddingStack::new(ltr);
        let mut embeddings = Vec::with_capacity(self.text.len());
        for run in &self.runs {
            let range = run.range();
            let opened = match run.style().bidi_override {
                Some(BidiOverride::Ltr) => Some(LRO),
                Some(BidiOverride::Rtl) => Some(RLO),
                None => None,
            };
            if let Some(control) = opened {
                stack.advance(control);
            }
            for &ch in &self.text[range.start - self.start..range.end - self.start] {
                embeddings.push(stack.advance(ch));
            }
            if opened.is_some() {
                stack.advance(PDF);
            }
        }
        Bidi::from_embeddings(&self.text, embeddings, ltr)
    }

    fn load(&mut self, doc: &DocumentState, paragraph: usize) {
        let Some(element) = doc.paragraph(paragraph) else {
            self.text = Arc::from([]);
            self.runs.clear();
            return;
        };
        self.text = doc.paragraph_text(paragraph);
        self.runs = element.runs().to_vec();
        self.start = element.range().start;
    }

    fn rebuild(&mut self, change: Option<&ElementChange>, text_changed: bool) -> Result<()> {
        let range: Range<usize> = 0..self.text.len();
        self.tree.set_flow_range(self.flow, range)?;
        match change {
            Some(change)
                if !text_changed
                    && change.index + change.added <= self.runs.len()
                    && self.tree.pool(self.flow).len() + change.added
                        == self.runs.len() + change.removed =>
            {
                let views = self.runs[change.index..change.index + change.added]
                    .iter()
                    .map(|run| self.run_view(run))
                    .collect();
                self.tree
                    .replace_pool(self.flow, change.index, change.removed, views)?;
            }
            _ => {
                let views = self.runs.iter().map(|run| self.run_view(run)).collect();
                self.tree.set_pool(self.flow, views)?;
            }
        }
        let bidi = self.bidi();
        let bidi = (!bidi.is_left_to_right()).then_some(bidi);
        self.tree.set_bidi(self.flow, bidi)
    }
}

impl ParagraphView {
    /// Creates the view for paragraph `paragraph` of `doc`.
    pub fn new(
        doc: &DocumentState,
        paragraph: usize,
        metrics: Arc<dyn TextMetrics>,
        config: LayoutConfig,
    ) -> Self {
        let mut tree = ViewTree::new();
        let flow = tree.insert_flow(0..0, FlowFormat::from(&config));
        let mut state = ParagraphState {
            tree,
            flow,
            text: Arc::from([]),
            runs: Vec::new(),
            start: 0,
            metrics,
            config,
        };
        state.load(doc, paragraph);
        if let Err(err) = state.rebuild(None, true) {
            tracing::error!(target: "flowbox.flow", paragraph, %err, "failed to build paragraph");
        }
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ParagraphState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of rows from the last layout.
    pub fn row_count(&self) -> usize {
        let state = self.lock();
        state.tree.rows(state.flow).len()
    }

    /// Paragraph-relative ranges of the rows from the last layout.
    pub fn row_ranges(&self) -> Vec<Range<usize>> {
        let state = self.lock();
        state
            .tree
            .rows(state.flow)
            .iter()
            .map(|&row| state.tree.start_offset(row)..state.tree.end_offset(row))
            .collect()
    }

    /// Paragraph text at the last update.
    pub fn text(&self) -> Arc<[char]> {
        self.lock().text.clone()
    }

    /// Flows the paragraph into `width`, returning the preferences that changed.
    pub fn layout(&self, width: f32) -> Result<PreferenceChange> {
        let mut state = self.lock();
        let flow = state.flow;
        let height = state.tree.preferred_span(flow, Axis::Y);
        state.tree.set_size(flow, width, height)?;
        Ok(state.tree.take_preference_change())
    }
}

impl Measurable for ParagraphView {
    fn preferred_span(&self, axis: Axis) -> f32 {
        let mut state = self.lock();
        let flow = state.flow;
        state.tree.preferred_span(flow, axis)
    }

    fn minimum_span(&self, axis: Axis) -> f32 {
        let mut state = self.lock();
        let flow = state.flow;
        state.tree.minimum_span(flow, axis)
    }

    fn maximum_span(&self, axis: Axis) -> f32 {
        let mut state = self.lock();
        let flow = state.flow;
        state.tree.maximum_span(flow, axis)
    }

    fn alignment(&self, axis: Axis) -> f32 {
        let mut state = self.lock();
        let flow = state.flow;
        state.tree.alignment(flow, axis)
    }

    fn resize_weight(&self, axis: Axis) -> i32 {
        let mut state = self.lock();
        let flow = state.flow;
        state.tree.resize_weight(flow, axis)
    }
}

impl Breakable for ParagraphView {
    fn start_offset(&self) -> usize {
        0
    }

    fn end_offset(&self) -> usize {
        self.lock().text.len()
    }
}

impl Paintable for ParagraphView {
    fn paint(&self, canvas: &mut dyn Canvas, alloc: Rect) {
        let mut state = self.lock();
        let flow = state.flow;
        if let Err(err) = state.tree.paint(flow, canvas, alloc) {
            tracing::error!(target: "flowbox.flow", %err, "paint skipped");
        }
    }

    fn model_to_view(&self, pos: usize, alloc: Rect, bias: Bias) -> Result<Rect> {
        let mut state = self.lock();
        let flow = state.flow;
        state.tree.model_to_view(flow, pos, alloc, bias)
    }

    fn view_to_model(&self, x: i32, y: i32, alloc: Rect) -> (usize, Bias) {
        let mut state = self.lock();
        let flow = state.flow;
        state
            .tree
            .view_to_model(flow, x, y, alloc)
            .unwrap_or_else(|err| {
                tracing::error!(target: "flowbox.flow", %err, "hit test failed");
                (0, Bias::Forward)
            })
    }
}

impl View for ParagraphView {
    fn set_size(&self, width: f32, height: f32) -> PreferenceChange {
        let mut state = self.lock();
        let flow = state.flow;
        if let Err(err) = state.tree.set_size(flow, width, height) {
            tracing::error!(target: "flowbox.flow", %err, width, "layout failed");
        }
        state.tree.take_preference_change()
    }

    fn paragraph_changed(
        &self,
        doc: &DocumentState,
        paragraph: usize,
        runs: Option<&ElementChange>,
    ) -> PreferenceChange {
        let mut state = self.lock();
        let before = state.text.clone();
        state.load(doc, paragraph);
        let text_changed = before != state.text;
        if let Err(err) = state.rebuild(runs, text_changed) {
            tracing::error!(target: "flowbox.flow", paragraph, %err, "failed to rebuild paragraph");
        }
        state.tree.take_preference_change();
        PreferenceChange::BOTH
    }
}

/// Creates a [`ParagraphView`] per paragraph, sharing metrics and configuration.
#[derive(Clone, Debug)]
pub struct ParagraphFactory {
    metrics: Arc<dyn TextMetrics>,
    config: LayoutConfig,
}

impl ParagraphFactory {
    /// Creates a factory.
    pub fn new(metrics: Arc<dyn TextMetrics>, config: LayoutConfig) -> Self {
        Self { metrics, config }
    }
}

impl ViewFactory for ParagraphFactory {
    fn create(&self, doc: &DocumentState, paragraph: usize) -> ViewRef {
        Arc::new(ParagraphView::new(
            doc,
            paragraph,
            self.metrics.clone(),
            self.config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, RunStyle};
    use crate::paint::DisplayList;
    use crate::text_view::MonospaceMetrics;

    fn metrics() -> Arc<dyn TextMetrics> {
        Arc::new(MonospaceMetrics::new(10.0, 8.0, 2.0))
    }

    #[test]
    fn paragraph_flows_to_width() {
        let doc = Document::new("aaa bbb ccc\n");
        let view = ParagraphView::new(&doc.read(), 0, metrics(), LayoutConfig::default());
        assert_eq!(view.preferred_span(Axis::X), 110.0);

        let change = view.layout(60.0).unwrap();
        assert!(change.height);
        assert_eq!(view.row_ranges(), [0..4, 4..8, 8..12]);
        assert_eq!(view.preferred_span(Axis::Y), 30.0);
    }

    #[test]
    fn paint_draws_each_row() {
        let doc = Document::new("aaa bbb\n");
        let view = ParagraphView::new(&doc.read(), 0, metrics(), LayoutConfig::default());
        let mut list = DisplayList::new();
        view.paint(&mut list, Rect::new(0, 0, 45, 20));
        assert_eq!(list.texts(), ["aaa ", "bbb"]);
        assert_eq!(list.items()[1].bounds.y, 10);
    }

    #[test]
    fn edits_reflow_the_paragraph() {
        let doc = Document::new("ab\n");
        let view = ParagraphView::new(&doc.read(), 0, metrics(), LayoutConfig::default());
        view.layout(1000.0).unwrap();
        assert_eq!(view.preferred_span(Axis::X), 20.0);

        doc.insert_string(2, "cd").unwrap();
        let change = view.paragraph_changed(&doc.read(), 0, None);
        assert_eq!(change, PreferenceChange::BOTH);
        assert_eq!(view.preferred_span(Axis::X), 40.0);
        assert_eq!(view.end_offset(), 5);
    }

    #[test]
    fn restyled_runs_replace_pool_views() {
        let doc = Document::new("abcdef\n");
        let view = ParagraphView::new(&doc.read(), 0, metrics(), LayoutConfig::default());
        let style = RunStyle {
            scale: 2.0,
            bidi_override: None,
        };
        let event = doc.set_run_style(0, 2, style).unwrap();
        view.paragraph_changed(&doc.read(), 0, event.run_change(0));
        assert_eq!(view.preferred_span(Axis::X), 80.0);
        view.layout(1000.0).unwrap();
        assert_eq!(view.preferred_span(Axis::Y), 20.0);
    }

    #[test]
    fn override_runs_are_reordered() {
        let doc = Document::new("ab cd\n");
        let style = RunStyle {
            scale: 1.0,
            bidi_override: Some(BidiOverride::Rtl),
        };
        doc.set_run_style(0, 2, style).unwrap();
        doc.set_run_style(2, 3, style).unwrap();
        let view = ParagraphView::new(&doc.read(), 0, metrics(), LayoutConfig::default());
        let mut list = DisplayList::new();
        view.paint(&mut list, Rect::new(0, 0, 1000, 20));
        assert_eq!(list.texts(), [" cd", "ab"]);
        let caret = view
            .model_to_view(0, Rect::new(0, 0, 1000, 20), Bias::Forward)
            .unwrap();
        assert_eq!(caret.x, 30);
    }
}
