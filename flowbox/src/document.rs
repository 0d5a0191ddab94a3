// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A minimal paragraph-structured text model.
//!
//! The document is a sequence of characters split into paragraphs, each ending with
//! `'\n'`, and each paragraph split into styled runs. Readers take a shared lock for
//! the duration of a layout step; edits take the exclusive lock and describe what they
//! changed with a [`DocumentEvent`].

use core::ops::Range;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use layout_primitives::BidiOverride;

use crate::{LayoutError, Result};

/// Styling of a run of text.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RunStyle {
    /// Multiplier applied to glyph metrics.
    pub scale: f32,
    /// Forces the direction of every character in the run.
    pub bidi_override: Option<BidiOverride>,
}

impl Default for RunStyle {
    fn default() -> Self {
        Self {
            scale: 1.0,
            bidi_override: None,
        }
    }
}

/// A styled run inside a paragraph.
#[derive(Clone, PartialEq, Debug)]
pub struct Run {
    range: Range<usize>,
    style: RunStyle,
}

impl Run {
    /// Document range of the run.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// The run's style.
    pub fn style(&self) -> RunStyle {
        self.style
    }
}

/// A paragraph: a range ending with `'\n'` and its runs.
#[derive(Clone, PartialEq, Debug)]
pub struct Paragraph {
    range: Range<usize>,
    runs: Vec<Run>,
}

impl Paragraph {
    /// Document range of the paragraph, including its newline.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// The paragraph's runs in order.
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    fn shift(&mut self, delta: isize) {
        self.range = shift_range(&self.range, delta);
        for run in &mut self.runs {
            run.range = shift_range(&run.range, delta);
        }
    }
}

fn shift_range(range: &Range<usize>, delta: isize) -> Range<usize> {
    range.start.saturating_add_signed(delta)..range.end.saturating_add_signed(delta)
}

/// Children replaced inside an element: `removed` old children at `index` became `added` new ones.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ElementChange {
    /// First replaced child.
    pub index: usize,
    /// Number of children removed.
    pub removed: usize,
    /// Number of children added in their place.
    pub added: usize,
}

/// Runs replaced inside one paragraph.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RunChange {
    /// Paragraph index after the edit.
    pub paragraph: usize,
    /// The replaced runs.
    pub change: ElementChange,
}

/// Kind of edit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EventKind {
    /// Text was inserted.
    Insert,
    /// Text was removed.
    Remove,
    /// Styles changed without touching text.
    Change,
}

/// Description of one edit.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DocumentEvent {
    /// Kind of edit.
    pub kind: EventKind,
    /// Document offset of the edit.
    pub offset: usize,
    /// Number of characters inserted, removed or restyled.
    pub length: usize,
    /// Paragraphs replaced, when the paragraph structure changed.
    pub paragraph_change: Option<ElementChange>,
    /// Runs replaced inside surviving paragraphs.
    pub run_changes: Vec<RunChange>,
    /// Paragraphs, after the edit, whose content changed.
    pub paragraphs: Range<usize>,
}

impl DocumentEvent {
    /// The run change recorded for `paragraph`, if any.
    pub fn run_change(&self, paragraph: usize) -> Option<&ElementChange> {
        self.run_changes
            .iter()
            .find(|change| change.paragraph == paragraph)
            .map(|change| &change.change)
    }
}

/// Document contents as seen under a lock.
#[derive(Clone, Debug)]
pub struct DocumentState {
    text: Vec<char>,
    paragraphs: Vec<Paragraph>,
}

#[derive(Clone, Copy, Debug)]
struct Segment {
    len: usize,
    style: RunStyle,
}

impl DocumentState {
    fn new(text: &str) -> Self {
        let mut text: Vec<char> = text.chars().collect();
        if text.last() != Some(&'\n') {
            text.push('\n');
        }
        let mut state = Self {
            text,
            paragraphs: Vec::new(),
        };
        let segments = vec![Segment {
            len: state.text.len(),
            style: RunStyle::default(),
        }];
        state.paragraphs = state.split(0, &segments);
        state
    }

    /// Number of characters, including the final newline.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Always `false`; a document holds at least its final newline.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The whole text.
    pub fn text(&self) -> &[char] {
        &self.text
    }

    /// The characters in `range`, clamped to the text.
    pub fn slice(&self, range: Range<usize>) -> &[char] {
        let end = range.end.min(self.text.len());
        &self.text[range.start.min(end)..end]
    }

    /// Number of paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// All paragraphs.
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// The paragraph at `index`.
    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    /// Text of paragraph `index` as a shareable snapshot.
    pub fn paragraph_text(&self, index: usize) -> Arc<[char]> {
        self.paragraphs
            .get(index)
            .map_or_else(|| Arc::from([]), |p| Arc::from(self.slice(p.range())))
    }

    /// Index of the paragraph containing `offset`; offsets past the end map to the last one.
    pub fn paragraph_index(&self, offset: usize) -> usize {
        self.paragraphs
            .partition_point(|p| p.range.end <= offset)
            .min(self.paragraphs.len().saturating_sub(1))
    }

    fn check(&self, offset: usize, end: usize) -> Result<()> {
        // The final newline cannot be edited away or written past.
        let limit = self.text.len() - 1;
        if offset > limit || end > limit {
            return Err(LayoutError::PositionOutOfRange {
                position: offset.max(end),
                start: 0,
                end: limit,
            });
        }
        Ok(())
    }

    /// Splits `segments`, laid over the text from `start`, into paragraphs.
    fn split(&self, start: usize, segments: &[Segment]) -> Vec<Paragraph> {
        let mut built = Vec::new();
        let mut runs = Vec::new();
        let mut paragraph_start = start;
        let mut cursor = start;
        for segment in segments {
            let mut remaining = segment.len;
            while remaining > 0 {
                let chunk = &self.text[cursor..cursor + remaining];
                match chunk.iter().position(|&ch| ch == '\n') {
                    Some(n) => {
                        let end = cursor + n + 1;
                        runs.push(Run {
                            range: cursor..end,
                            style: segment.style,
                        });
                        built.push(Paragraph {
                            range: paragraph_start..end,
                            runs: core::mem::take(&mut runs),
                        });
                        remaining -= end - cursor;
                        paragraph_start = end;
                        cursor = end;
                    }
                    None => {
                        runs.push(Run {
                            range: cursor..cursor + remaining,
                            style: segment.style,
                        });
                        cursor += remaining;
                        remaining = 0;
                    }
                }
            }
        }
        if !runs.is_empty() {
            built.push(Paragraph {
                range: paragraph_start..cursor,
                runs,
            });
        }
        built
    }

    /// Replaces paragraphs `first..=last` with ones rebuilt from `segments` and shifts
    /// the paragraphs after them by `delta`. Returns the new paragraph indices.
    fn rebuild(
        &mut self,
        first: usize,
        last: usize,
        segments: &[Segment],
        delta: isize,
    ) -> Range<usize> {
        let start = self.paragraphs[first].range.start;
        let built = self.split(start, segments);
        let count = built.len();
        self.paragraphs.splice(first..=last, built);
        for paragraph in &mut self.paragraphs[first + count..] {
            paragraph.shift(delta);
        }
        first..first + count
    }

    fn insert(&mut self, offset: usize, text: &str) -> Result<DocumentEvent> {
        self.check(offset, offset)?;
        let inserted: Vec<char> = text.chars().collect();
        let length = inserted.len();
        let index = self.paragraph_index(offset);
        let mut segments: Vec<Segment> = self.paragraphs[index]
            .runs
            .iter()
            .map(|run| Segment {
                len: run.range.len(),
                style: run.style,
            })
            .collect();
        let run = self.paragraphs[index]
            .runs
            .partition_point(|run| run.range.end <= offset);
        if let Some(segment) = segments.get_mut(run) {
            segment.len += length;
        }
        self.text.splice(offset..offset, inserted);
        let delta = isize::try_from(length).unwrap_or(isize::MAX);
        let old_runs = segments.len();
        let paragraphs = self.rebuild(index, index, &segments, delta);
        Ok(self.event(EventKind::Insert, offset, length, index, 1, paragraphs, old_runs))
    }

    fn remove(&mut self, offset: usize, length: usize) -> Result<DocumentEvent> {
        let end = offset.saturating_add(length);
        self.check(offset, end)?;
        let first = self.paragraph_index(offset);
        let last = self.paragraph_index(end);
        let mut segments = Vec::new();
        let mut old_runs = 0;
        for paragraph in &self.paragraphs[first..=last] {
            old_runs += paragraph.runs.len();
            for run in &paragraph.runs {
                let overlap = run.range.end.min(end).saturating_sub(run.range.start.max(offset));
                let len = run.range.len() - overlap;
                if len > 0 {
                    segments.push(Segment {
                        len,
                        style: run.style,
                    });
                }
            }
        }
        self.text.drain(offset..end);
        let delta = -isize::try_from(length).unwrap_or(isize::MAX);
        let removed = last - first + 1;
        let paragraphs = self.rebuild(first, last, &segments, delta);
        Ok(self.event(EventKind::Remove, offset, length, first, removed, paragraphs, old_runs))
    }

    fn restyle(&mut self, offset: usize, length: usize, style: RunStyle) -> Result<DocumentEvent> {
        let end = offset.saturating_add(length);
        self.check(offset, end)?;
        let first = self.paragraph_index(offset);
        if length == 0 {
            return Ok(DocumentEvent {
                kind: EventKind::Change,
                offset,
                length,
                paragraph_change: None,
                run_changes: Vec::new(),
                paragraphs: first..first,
            });
        }
        let last = self.paragraph_index(end.saturating_sub(1).max(offset));
        let mut run_changes = Vec::new();
        for index in first..=last {
            let paragraph = &mut self.paragraphs[index];
            let touched = paragraph
                .runs
                .iter()
                .enumerate()
                .filter(|(_, run)| run.range.start < end && run.range.end > offset)
                .map(|(i, _)| i)
                .collect::<Vec<_>>();
            let (Some(&lo), Some(&hi)) = (touched.first(), touched.last()) else {
                continue;
            };
            let mut replacement = Vec::new();
            for run in &paragraph.runs[lo..=hi] {
                let cut_start = run.range.start.max(offset);
                let cut_end = run.range.end.min(end);
                if run.range.start < cut_start {
                    replacement.push(Run {
                        range: run.range.start..cut_start,
                        style: run.style,
                    });
                }
                replacement.push(Run {
                    range: cut_start..cut_end,
                    style,
                });
                if cut_end < run.range.end {
                    replacement.push(Run {
                        range: cut_end..run.range.end,
                        style: run.style,
                    });
                }
            }
            let added = replacement.len();
            paragraph.runs.splice(lo..=hi, replacement);
            run_changes.push(RunChange {
                paragraph: index,
                change: ElementChange {
                    index: lo,
                    removed: hi - lo + 1,
                    added,
                },
            });
        }
        Ok(DocumentEvent {
            kind: EventKind::Change,
            offset,
            length,
            paragraph_change: None,
            run_changes,
            paragraphs: first..last + 1,
        })
    }

    fn event(
        &self,
        kind: EventKind,
        offset: usize,
        length: usize,
        first: usize,
        removed: usize,
        paragraphs: Range<usize>,
        old_runs: usize,
    ) -> DocumentEvent {
        let added = paragraphs.len();
        let (paragraph_change, run_changes) = if removed == 1 && added == 1 {
            let new_runs = self.paragraphs[first].runs.len();
            let runs = (new_runs != old_runs).then_some(RunChange {
                paragraph: first,
                change: ElementChange {
                    index: 0,
                    removed: old_runs,
                    added: new_runs,
                },
            });
            (None, runs.into_iter().collect())
        } else {
            let change = ElementChange {
                index: first,
                removed,
                added,
            };
            (Some(change), Vec::new())
        };
        DocumentEvent {
            kind,
            offset,
            length,
            paragraph_change,
            run_changes,
            paragraphs,
        }
    }
}

/// A lockable document shared between the edit thread and layout workers.
#[derive(Debug)]
pub struct Document {
    state: RwLock<DocumentState>,
}

impl Document {
    /// Creates a document; a final newline is appended when `text` lacks one.
    ///
    /// ```
    /// use flowbox::Document;
    ///
    /// let doc = Document::new("one\ntwo");
    /// let state = doc.read();
    /// assert_eq!(state.paragraph_count(), 2);
    /// assert_eq!(state.len(), 8);
    /// ```
    pub fn new(text: &str) -> Self {
        Self {
            state: RwLock::new(DocumentState::new(text)),
        }
    }

    /// Takes the shared lock.
    pub fn read(&self) -> RwLockReadGuard<'_, DocumentState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DocumentState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts `text` at `offset` in the style of the run there.
    pub fn insert_string(&self, offset: usize, text: &str) -> Result<DocumentEvent> {
        let event = self.write().insert(offset, text)?;
        tracing::debug!(target: "flowbox.document", offset, length = event.length, "insert");
        Ok(event)
    }

    /// Removes `length` characters at `offset`.
    pub fn remove(&self, offset: usize, length: usize) -> Result<DocumentEvent> {
        let event = self.write().remove(offset, length)?;
        tracing::debug!(target: "flowbox.document", offset, length, "remove");
        Ok(event)
    }

    /// Applies `style` to `length` characters at `offset`, splitting runs as needed.
    pub fn set_run_style(&self, offset: usize, length: usize, style: RunStyle) -> Result<DocumentEvent> {
        let event = self.write().restyle(offset, length, style)?;
        tracing::debug!(target: "flowbox.document", offset, length, "restyle");
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(state: &DocumentState, index: usize) -> String {
        state.paragraph_text(index).iter().collect()
    }

    #[test]
    fn paragraphs_end_with_newline() {
        let doc = Document::new("ab\ncd");
        let state = doc.read();
        assert_eq!(state.paragraph_count(), 2);
        assert_eq!(text_of(&state, 0), "ab\n");
        assert_eq!(text_of(&state, 1), "cd\n");
        assert_eq!(state.paragraph_index(4), 1);
        assert_eq!(state.paragraph_index(99), 1);
    }

    #[test]
    fn insert_inside_paragraph_keeps_structure() {
        let doc = Document::new("ab\ncd\n");
        let event = doc.insert_string(4, "xy").unwrap();
        assert_eq!(event.paragraph_change, None);
        assert_eq!(event.paragraphs, 1..2);
        let state = doc.read();
        assert_eq!(text_of(&state, 1), "cxyd\n");
        assert_eq!(state.paragraph(1).unwrap().range(), 3..8);
    }

    #[test]
    fn insert_newline_splits_paragraph() {
        let doc = Document::new("abcd\nef\n");
        let event = doc.insert_string(2, "\n").unwrap();
        assert_eq!(
            event.paragraph_change,
            Some(ElementChange {
                index: 0,
                removed: 1,
                added: 2
            })
        );
        let state = doc.read();
        assert_eq!(state.paragraph_count(), 3);
        assert_eq!(text_of(&state, 1), "cd\n");
        assert_eq!(state.paragraph(2).unwrap().range(), 6..9);
    }

    #[test]
    fn removing_newline_merges_paragraphs() {
        let doc = Document::new("ab\ncd\nef\n");
        let event = doc.remove(2, 1).unwrap();
        assert_eq!(
            event.paragraph_change,
            Some(ElementChange {
                index: 0,
                removed: 2,
                added: 1
            })
        );
        let state = doc.read();
        assert_eq!(text_of(&state, 0), "abcd\n");
        assert_eq!(state.paragraph(1).unwrap().range(), 5..8);
    }

    #[test]
    fn restyle_splits_runs() {
        let doc = Document::new("abcdef\n");
        let style = RunStyle {
            scale: 2.0,
            bidi_override: None,
        };
        let event = doc.set_run_style(2, 2, style).unwrap();
        assert_eq!(
            event.run_change(0),
            Some(&ElementChange {
                index: 0,
                removed: 1,
                added: 3
            })
        );
        let state = doc.read();
        let runs = state.paragraph(0).unwrap().runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].range(), 2..4);
        assert_eq!(runs[1].style().scale, 2.0);
    }

    #[test]
    fn empty_restyle_keeps_runs() {
        let doc = Document::new("abcdef\n");
        let style = RunStyle {
            scale: 2.0,
            bidi_override: None,
        };
        let event = doc.set_run_style(3, 0, style).unwrap();
        assert!(event.run_changes.is_empty());
        assert!(event.paragraphs.is_empty());
        let state = doc.read();
        let runs = state.paragraph(0).unwrap().runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].range(), 0..7);
    }

    #[test]
    fn edits_past_final_newline_fail() {
        let doc = Document::new("ab");
        assert!(doc.insert_string(3, "x").is_err());
        assert!(doc.remove(1, 2).is_err());
        assert!(doc.insert_string(2, "x").is_ok());
    }
}
