// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boxes whose children are measured on background threads.
//!
//! An [`AsyncBox`] tiles one view per paragraph along its axis. Each child carries a
//! record of cached measurements and three validity flags; invalid children are
//! measured by tasks on a [`LayoutQueue`] while holding the document's read lock.
//! Measurements change the box's totals, and a flush task turns a batch of changes into
//! a single notification to the box's [`PreferenceSink`].
//!
//! Locks are always taken in this order: document, locator, children, a child's
//! record, the child's view, totals. The slot naming the child being measured is only
//! held on its own.

mod child;
mod locator;
mod queue;

use std::ops::Range;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};

use layout_primitives::{Axis, Bias, Insets, Rect};

pub use queue::{LayoutQueue, LayoutTask, Priority};

use self::child::{ChildState, Measurement};
use self::locator::ChildLocator;
use crate::document::{Document, DocumentEvent, DocumentState};
use crate::paint::Canvas;
use crate::view::{
    Breakable, Measurable, Paintable, PreferenceChange, PreferenceSink, View, ViewFactory,
    ViewRef,
};
use crate::{LayoutError, Result};

/// Minor-axis span reported before any child has been measured.
const UNMEASURED_PREFERRED: f32 = 30.0;
const UNMEASURED_MINIMUM: f32 = 5.0;

/// Cached measurements of one child, as seen by [`AsyncBox::child_spans`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ChildSpans {
    /// Minimum span across the box.
    pub minimum: f32,
    /// Preferred span across the box.
    pub preferred: f32,
    /// Maximum span across the box.
    pub maximum: f32,
    /// Span along the box.
    pub span: f32,
    /// Offset along the box; only meaningful once the child has been located.
    pub offset: f32,
    /// All measurements are current.
    pub valid: bool,
}

/// A box that lays out its children asynchronously.
///
/// The box is cheap to clone; clones share the same children. It is itself a [`View`],
/// so it can be placed in a [`ViewTree`](crate::ViewTree) or another box.
#[derive(Clone, Debug)]
pub struct AsyncBox {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    axis: Axis,
    document: Arc<Document>,
    factory: Arc<dyn ViewFactory>,
    queue: Arc<LayoutQueue>,
    sink: Arc<dyn PreferenceSink>,
    children: Mutex<Vec<Arc<ChildState>>>,
    locator: Mutex<ChildLocator>,
    totals: Mutex<Totals>,
    changing: Mutex<Option<Changing>>,
}

/// The child being measured, and notifications it raised on the measuring thread.
#[derive(Debug)]
struct Changing {
    thread: ThreadId,
    child: Arc<ChildState>,
    pending: PreferenceChange,
}

#[derive(Clone, Debug, Default)]
struct Totals {
    /// Sum of the counted child spans along the axis.
    major_span: f32,
    /// Span across the box available to children.
    minor_span: f32,
    major_changed: bool,
    min_request: Option<f32>,
    pref_request: Option<f32>,
    insets: Insets,
    /// Children painted last, measured first.
    visible: Range<usize>,
    flush_queued: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn children(&self) -> MutexGuard<'_, Vec<Arc<ChildState>>> {
        lock(&self.children)
    }

    fn locator(&self) -> MutexGuard<'_, ChildLocator> {
        lock(&self.locator)
    }

    fn totals(&self) -> MutexGuard<'_, Totals> {
        lock(&self.totals)
    }

    fn changing(&self) -> MutexGuard<'_, Option<Changing>> {
        lock(&self.changing)
    }

    fn snapshot(&self) -> Vec<Arc<ChildState>> {
        self.children().clone()
    }

    fn child(&self, index: usize) -> Option<Arc<ChildState>> {
        self.children().get(index).cloned()
    }

    fn queue_child(self: &Arc<Self>, index: usize, child: Arc<ChildState>) {
        let priority = if self.totals().visible.contains(&index) {
            Priority::Visible
        } else {
            Priority::Background
        };
        let shared = Arc::downgrade(self);
        self.queue.submit(
            priority,
            Box::new(move || {
                if let Some(shared) = shared.upgrade() {
                    shared.child_task(&child);
                }
            }),
        );
    }

    /// Queues a task that applies `change` to `child` before measuring it.
    fn requeue(self: &Arc<Self>, child: Arc<ChildState>, change: PreferenceChange) {
        let shared: Weak<Self> = Arc::downgrade(self);
        self.queue.add_task(Box::new(move || {
            if let Some(shared) = shared.upgrade() {
                child.lock().preference_changed(shared.axis, change);
                shared.child_task(&child);
            }
        }));
    }

    fn queue_flush(self: &Arc<Self>) {
        {
            let mut totals = self.totals();
            if totals.flush_queued {
                return;
            }
            totals.flush_queued = true;
        }
        let shared = Arc::downgrade(self);
        self.queue.add_task(Box::new(move || {
            if let Some(shared) = shared.upgrade() {
                shared.flush();
            }
        }));
    }

    fn child_task(self: &Arc<Self>, child: &Arc<ChildState>) {
        let doc = self.document.read();
        self.run_child(&doc, child);
    }

    /// Measures `child`; the caller holds the document's read lock.
    fn run_child(self: &Arc<Self>, _doc: &DocumentState, child: &Arc<ChildState>) {
        if child.is_valid() {
            tracing::trace!(target: "flowbox.async", "child already valid");
            return;
        }
        if !child.is_attached() {
            tracing::trace!(target: "flowbox.async", "skipping detached child");
            return;
        }
        let displaced = self.changing().replace(Changing {
            thread: thread::current().id(),
            child: child.clone(),
            pending: PreferenceChange::NONE,
        });
        if let Some(displaced) = displaced.filter(|old| !old.pending.is_empty()) {
            self.requeue(displaced.child, displaced.pending);
        }

        let target = self.totals().minor_span;
        let mut measurement = child.update(self.axis, target);
        let pending = {
            let mut slot = self.changing();
            if slot
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(&current.child, child))
            {
                slot.take().map_or(PreferenceChange::NONE, |current| current.pending)
            } else {
                PreferenceChange::NONE
            }
        };
        if !pending.is_empty() {
            child.lock().preference_changed(self.axis, pending);
        }
        measurement.merge(child.update(self.axis, target));
        self.apply(child, measurement);
    }

    /// Folds a measurement into the totals and the locator.
    fn apply(self: &Arc<Self>, child: &Arc<ChildState>, measurement: Measurement) {
        if measurement.is_empty() {
            return;
        }
        let (index, delta) = {
            let mut locator = self.locator();
            let children = self.children();
            if !child.is_attached() {
                return;
            }
            let Some(index) = children.iter().position(|c| Arc::ptr_eq(c, child)) else {
                return;
            };
            let delta = child.settle_span();
            if delta != 0.0 {
                locator.child_changed(&children, index);
                let mut totals = self.totals();
                totals.major_span += delta;
                totals.major_changed = true;
            }
            (index, delta)
        };
        tracing::trace!(
            target: "flowbox.async",
            index,
            delta,
            minor = measurement.minor_changed,
            "child measured"
        );
        self.queue_flush();
    }

    /// Publishes the changes gathered since the last flush.
    fn flush(self: &Arc<Self>) {
        let _doc = self.document.read();
        self.totals().flush_queued = false;
        let requests = {
            let children = self.children();
            children.iter().fold(None, |acc: Option<(f32, f32)>, child| {
                let layout = child.lock();
                Some(acc.map_or((layout.minimum, layout.preferred), |(min, pref)| {
                    (min.max(layout.minimum), pref.max(layout.preferred))
                }))
            })
        };
        let change = {
            let mut totals = self.totals();
            let minor = (totals.min_request, totals.pref_request)
                != (requests.map(|r| r.0), requests.map(|r| r.1));
            totals.min_request = requests.map(|r| r.0);
            totals.pref_request = requests.map(|r| r.1);
            let major = std::mem::take(&mut totals.major_changed);
            let mut change = PreferenceChange::NONE;
            if major {
                change = change.merge(PreferenceChange::along(self.axis));
            }
            if minor {
                change = change.merge(PreferenceChange::along(self.axis.other()));
            }
            change
        };
        if change.is_empty() {
            return;
        }
        tracing::debug!(
            target: "flowbox.async",
            width = change.width,
            height = change.height,
            "preferences flushed"
        );
        self.sink.preference_changed(change);
        self.sink.repaint();
    }

    fn replace(self: &Arc<Self>, index: usize, removed: usize, views: Vec<ViewRef>) -> Result<()> {
        let added: Vec<Arc<ChildState>> = views
            .into_iter()
            .map(|view| Arc::new(ChildState::new(view)))
            .collect();
        let count = added.len();
        {
            let mut locator = self.locator();
            let mut children = self.children();
            let len = children.len();
            if index > len || removed > len - index {
                return Err(LayoutError::PositionOutOfRange {
                    position: index + removed,
                    start: 0,
                    end: len,
                });
            }
            let gone: Vec<_> = children
                .splice(index..index + removed, added.iter().cloned())
                .collect();
            let mut lost = 0.0;
            for child in &gone {
                child.detach();
                lost += child.counted_span();
            }
            locator.children_replaced(&children, index);
            drop(locator);
            if lost != 0.0 {
                let mut totals = self.totals();
                totals.major_span -= lost;
                totals.major_changed = true;
            }
            for (offset, child) in added.into_iter().enumerate() {
                self.queue_child(index + offset, child);
            }
        }
        tracing::debug!(target: "flowbox.async", index, removed, added = count, "children replaced");
        self.queue_flush();
        Ok(())
    }

    fn child_changed(self: &Arc<Self>, index: usize, child: Arc<ChildState>, change: PreferenceChange) {
        child.lock().preference_changed(self.axis, change);
        self.queue_child(index, child);
    }

    fn set_size(self: &Arc<Self>, width: f32, height: f32) {
        let minor = self.axis.other();
        {
            let mut totals = self.totals();
            let target = minor.select(width, height) - totals.insets.span(minor) as f32;
            if target == totals.minor_span {
                return;
            }
            totals.minor_span = target;
        }
        let children = self.children();
        if children.is_empty() {
            return;
        }
        for (index, child) in children.iter().enumerate() {
            child.lock().size_valid = false;
            self.queue_child(index, child.clone());
        }
        drop(children);
        self.queue_flush();
    }

    fn set_allocation(self: &Arc<Self>, locator: &mut ChildLocator, alloc: Rect) {
        locator.set_allocation(alloc);
        self.set_size(alloc.width as f32, alloc.height as f32);
    }

    /// Offset of `target` along the axis, relative to the content area.
    fn content_offset(&self, target: i32, alloc: Rect, insets: Insets) -> f32 {
        (target - alloc.origin(self.axis) - insets.leading(self.axis)) as f32
    }

    fn index_at_point(self: &Arc<Self>, x: i32, y: i32, alloc: Rect) -> Option<usize> {
        let mut locator = self.locator();
        self.set_allocation(&mut locator, alloc);
        let children = self.snapshot();
        let (major_span, insets) = {
            let totals = self.totals();
            (totals.major_span, totals.insets)
        };
        let target = self.content_offset(self.axis.select(x, y), alloc, insets);
        locator.view_index_at_visual_offset(&children, major_span, target)
    }

    /// The allocation of child `index`, measuring it first if needed.
    fn allocation_of(self: &Arc<Self>, doc: &DocumentState, index: usize, alloc: Rect) -> Option<Rect> {
        let child = self.child(index)?;
        {
            let mut locator = self.locator();
            self.set_allocation(&mut locator, alloc);
        }
        if !child.is_valid() {
            self.run_child(doc, &child);
        }
        let mut locator = self.locator();
        let children = self.snapshot();
        locator.update_child_offsets_to_index(&children, index);
        let (minor_target, insets) = {
            let totals = self.totals();
            (totals.minor_span, totals.insets)
        };
        let layout = *child.lock();
        Some(locator.child_rect(self.axis, &layout, minor_target, insets))
    }
}

impl AsyncBox {
    /// Creates an empty box tiling along `axis`.
    ///
    /// Call [`AsyncBox::load_children`] to create a child per paragraph of `document`.
    pub fn new(
        axis: Axis,
        document: Arc<Document>,
        factory: Arc<dyn ViewFactory>,
        queue: Arc<LayoutQueue>,
        sink: Arc<dyn PreferenceSink>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                axis,
                document,
                factory,
                queue,
                sink,
                children: Mutex::new(Vec::new()),
                locator: Mutex::new(ChildLocator::default()),
                totals: Mutex::new(Totals::default()),
                changing: Mutex::new(None),
            }),
        }
    }

    /// The tiling axis.
    pub fn axis(&self) -> Axis {
        self.shared.axis
    }

    /// Replaces all children with one view per paragraph.
    pub fn load_children(&self) -> Result<()> {
        let shared = &self.shared;
        let doc = shared.document.read();
        let views = (0..doc.paragraph_count())
            .map(|paragraph| shared.factory.create(&doc, paragraph))
            .collect();
        let removed = shared.children().len();
        shared.replace(0, removed, views)
    }

    /// Replaces `removed` children at `index` with `views`, queueing their measurement.
    pub fn replace(&self, index: usize, removed: usize, views: Vec<ViewRef>) -> Result<()> {
        self.shared.replace(index, removed, views)
    }

    /// Inserts a child at `index`.
    pub fn insert(&self, index: usize, view: ViewRef) -> Result<()> {
        self.replace(index, 0, vec![view])
    }

    /// Removes the child at `index`.
    pub fn remove(&self, index: usize) -> Result<()> {
        self.replace(index, 1, Vec::new())
    }

    /// Number of children.
    pub fn view_count(&self) -> usize {
        self.shared.children().len()
    }

    /// The view of child `index`.
    pub fn view(&self, index: usize) -> Option<ViewRef> {
        self.shared.child(index).map(|child| child.view().clone())
    }

    /// The cached measurements of child `index`.
    pub fn child_spans(&self, index: usize) -> Option<ChildSpans> {
        let child = self.shared.child(index)?;
        let layout = *child.lock();
        Some(ChildSpans {
            minimum: layout.minimum,
            preferred: layout.preferred,
            maximum: layout.maximum,
            span: layout.span,
            offset: layout.offset,
            valid: layout.is_valid(),
        })
    }

    /// Space around the children.
    pub fn insets(&self) -> Insets {
        self.shared.totals().insets
    }

    /// Sets the space around the children; takes effect with the next size.
    pub fn set_insets(&self, insets: Insets) {
        self.shared.totals().insets = insets;
    }

    /// Handles a preference change raised by one of the children.
    ///
    /// A change raised by the child being measured, on the thread measuring it, is
    /// folded into that measurement. Anything else marks the child and queues it.
    pub fn child_preference_changed(&self, view: &ViewRef, change: PreferenceChange) {
        let shared = &self.shared;
        {
            let mut slot = shared.changing();
            if let Some(current) = slot.as_mut() {
                if current.thread == thread::current().id()
                    && Arc::ptr_eq(current.child.view(), view)
                {
                    current.pending = current.pending.merge(change);
                    return;
                }
            }
        }
        let found = shared
            .children()
            .iter()
            .enumerate()
            .find(|(_, child)| Arc::ptr_eq(child.view(), view))
            .map(|(index, child)| (index, child.clone()));
        match found {
            Some((index, child)) => shared.child_changed(index, child, change),
            None => tracing::trace!(target: "flowbox.async", "change from a view that is not a child"),
        }
    }

    /// Forwards a document edit: replaced paragraphs get new views, the others are
    /// told their paragraph changed.
    pub fn document_update(&self, event: &DocumentEvent) -> Result<()> {
        let shared = &self.shared;
        let doc = shared.document.read();
        let mut created = 0..0;
        if let Some(change) = &event.paragraph_change {
            created = change.index..change.index + change.added;
            let views = created
                .clone()
                .map(|paragraph| shared.factory.create(&doc, paragraph))
                .collect();
            shared.replace(change.index, change.removed, views)?;
        }
        for paragraph in event.paragraphs.clone() {
            if created.contains(&paragraph) {
                continue;
            }
            let Some(child) = shared.child(paragraph) else {
                continue;
            };
            let change = child
                .view()
                .paragraph_changed(&doc, paragraph, event.run_change(paragraph));
            if !change.is_empty() {
                shared.child_changed(paragraph, child, change);
            }
        }
        Ok(())
    }

    /// The allocation of child `index` when the box is at `alloc`.
    ///
    /// An unmeasured child is measured on the calling thread.
    pub fn child_allocation(&self, index: usize, alloc: Rect) -> Option<Rect> {
        let doc = self.shared.document.read();
        self.shared.allocation_of(&doc, index, alloc)
    }

    /// Index of the child at the point, along the tiling axis.
    pub fn view_index_at_point(&self, x: i32, y: i32, alloc: Rect) -> Option<usize> {
        self.shared.index_at_point(x, y, alloc)
    }
}

impl Measurable for AsyncBox {
    fn preferred_span(&self, axis: Axis) -> f32 {
        let totals = self.shared.totals();
        let margin = totals.insets.span(axis) as f32;
        if axis == self.shared.axis {
            totals.major_span + margin
        } else {
            totals
                .pref_request
                .map_or(margin + UNMEASURED_PREFERRED, |pref| pref + margin)
        }
    }

    fn minimum_span(&self, axis: Axis) -> f32 {
        if axis == self.shared.axis {
            return self.preferred_span(axis);
        }
        let totals = self.shared.totals();
        let margin = totals.insets.span(axis) as f32;
        totals
            .min_request
            .map_or(margin + UNMEASURED_MINIMUM, |min| min + margin)
    }

    fn maximum_span(&self, axis: Axis) -> f32 {
        if axis == self.shared.axis {
            self.preferred_span(axis)
        } else {
            i32::MAX as f32
        }
    }

    fn resize_weight(&self, axis: Axis) -> i32 {
        i32::from(axis != self.shared.axis)
    }
}

impl Breakable for AsyncBox {
    fn start_offset(&self) -> usize {
        0
    }

    fn end_offset(&self) -> usize {
        self.shared.document.read().len()
    }
}

impl Paintable for AsyncBox {
    /// Paints the children that intersect the canvas clip, starting at the first one
    /// the clip reaches and stopping at the first one past it.
    fn paint(&self, canvas: &mut dyn Canvas, alloc: Rect) {
        let shared = &self.shared;
        let mut locator = shared.locator();
        shared.set_allocation(&mut locator, alloc);
        let children = shared.snapshot();
        let (major_span, minor_target, insets) = {
            let totals = shared.totals();
            (totals.major_span, totals.minor_span, totals.insets)
        };
        let clip = canvas.clip_bounds().unwrap_or(alloc);
        let target = shared.content_offset(clip.origin(shared.axis), alloc, insets);
        let Some(first) = locator.view_index_at_visual_offset(&children, major_span, target)
        else {
            return;
        };
        let mut offset = children[first].lock().offset;
        let mut end = first;
        for child in &children[first..] {
            end += 1;
            let mut layout = child.lock();
            layout.offset = offset;
            let rect = locator.child_rect(shared.axis, &layout, minor_target, insets);
            if !rect.intersects(&clip) {
                break;
            }
            child.view().paint(canvas, rect);
            offset += layout.span;
        }
        drop(locator);
        tracing::trace!(target: "flowbox.async", first, end, "painted");
        shared.totals().visible = first..end;
    }

    fn model_to_view(&self, pos: usize, alloc: Rect, bias: Bias) -> Result<Rect> {
        let shared = &self.shared;
        let doc = shared.document.read();
        let out_of_range = LayoutError::PositionOutOfRange {
            position: pos,
            start: 0,
            end: doc.len(),
        };
        if pos > doc.len() {
            return Err(out_of_range);
        }
        let lookup = if bias == Bias::Backward && pos > 0 {
            pos - 1
        } else {
            pos
        };
        let index = doc.paragraph_index(lookup);
        let start = doc.paragraph(index).map_or(0, |p| p.range().start);
        let (Some(rect), Some(child)) = (shared.allocation_of(&doc, index, alloc), shared.child(index))
        else {
            return Err(out_of_range);
        };
        let _layout = child.lock();
        child.view().model_to_view(pos - start, rect, bias)
    }

    fn view_to_model(&self, x: i32, y: i32, alloc: Rect) -> (usize, Bias) {
        let shared = &self.shared;
        let doc = shared.document.read();
        let Some(index) = shared.index_at_point(x, y, alloc) else {
            return (0, Bias::Forward);
        };
        let (Some(rect), Some(child)) = (shared.allocation_of(&doc, index, alloc), shared.child(index))
        else {
            return (0, Bias::Forward);
        };
        let start = doc.paragraph(index).map_or(0, |p| p.range().start);
        let _layout = child.lock();
        let (pos, bias) = child.view().view_to_model(x, y, rect);
        (start + pos, bias)
    }
}

impl View for AsyncBox {
    /// Sizes the box; preference changes that follow arrive through the sink.
    fn set_size(&self, width: f32, height: f32) -> PreferenceChange {
        self.shared.set_size(width, height);
        PreferenceChange::NONE
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::sync::Mutex;

    use tracing::dispatcher::{Dispatch, with_default};
    use tracing::field::{Field, Visit};
    use tracing::subscriber::Interest;
    use tracing::{Event, Metadata, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::Registry;

    use super::*;
    use crate::config::LayoutConfig;
    use crate::flow::ParagraphFactory;
    use crate::text_view::MonospaceMetrics;

    #[derive(Debug, Default)]
    struct Sink {
        changes: Mutex<Vec<PreferenceChange>>,
    }

    impl PreferenceSink for Sink {
        fn preference_changed(&self, change: PreferenceChange) {
            self.changes.lock().unwrap().push(change);
        }
    }

    #[derive(Clone, Default)]
    struct Capture {
        messages: Arc<Mutex<Vec<String>>>,
    }

    struct Message<'a>(&'a mut String);

    impl Visit for Message<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                *self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for Capture {
        fn register_callsite(&self, _: &'static Metadata<'static>) -> Interest {
            Interest::always()
        }

        fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
            let mut message = String::new();
            event.record(&mut Message(&mut message));
            self.messages
                .lock()
                .unwrap()
                .push(format!("{} {message}", event.metadata().target()));
        }
    }

    fn setup(text: &str) -> (AsyncBox, Arc<LayoutQueue>, Arc<Sink>) {
        let doc = Arc::new(Document::new(text));
        let factory = Arc::new(ParagraphFactory::new(
            Arc::new(MonospaceMetrics::new(10.0, 8.0, 2.0)),
            LayoutConfig::default(),
        ));
        let queue = LayoutQueue::manual();
        let sink = Arc::new(Sink::default());
        let boxed = AsyncBox::new(Axis::Y, doc, factory, queue.clone(), sink.clone());
        (boxed, queue, sink)
    }

    #[test]
    fn second_run_is_a_no_op() {
        let (boxed, queue, _) = setup("alpha beta\ngamma\n");
        boxed.load_children().unwrap();
        boxed.set_size(60.0, 100.0);
        queue.run_pending();
        let before = boxed.child_spans(0).unwrap();
        assert!(before.valid);

        let child = boxed.shared.child(0).unwrap();
        boxed.shared.child_task(&child);
        assert_eq!(boxed.child_spans(0).unwrap(), before);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn detached_child_is_skipped() {
        let (boxed, queue, _) = setup("one\ntwo\n");
        boxed.load_children().unwrap();
        boxed.set_size(100.0, 100.0);
        boxed.remove(1).unwrap();

        let capture = Capture::default();
        let messages = capture.messages.clone();
        let dispatch = Dispatch::new(Registry::default().with(capture));
        with_default(&dispatch, || {
            queue.run_pending();
        });

        let messages = messages.lock().unwrap();
        assert!(
            messages
                .iter()
                .any(|m| m == "flowbox.async skipping detached child"),
            "no skip event in {messages:?}"
        );
        assert_eq!(boxed.view_count(), 1);
        assert!(boxed.child_spans(0).unwrap().valid);
    }

    #[test]
    fn flush_notifies_once_per_batch() {
        let (boxed, queue, sink) = setup("aa\nbb\ncc\n");
        boxed.load_children().unwrap();
        boxed.set_size(100.0, 100.0);
        queue.run_pending();
        assert_eq!(*sink.changes.lock().unwrap(), [PreferenceChange::BOTH]);
        assert_eq!(boxed.preferred_span(Axis::Y), 30.0);
        assert_eq!(boxed.preferred_span(Axis::X), 20.0);
    }
}
