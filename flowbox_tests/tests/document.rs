// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document edit events.

use flowbox::{Document, ElementChange, EventKind, RunChange, RunStyle};

fn texts(doc: &Document) -> Vec<String> {
    let state = doc.read();
    (0..state.paragraph_count())
        .map(|i| state.paragraph_text(i).iter().collect())
        .collect()
}

#[test]
fn document_insert_reports_split_paragraphs() {
    let doc = Document::new("one\ntwo\nthree\n");
    let event = doc.insert_string(1, "x\ny").unwrap();
    assert_eq!(event.kind, EventKind::Insert);
    assert_eq!((event.offset, event.length), (1, 3));
    assert_eq!(
        event.paragraph_change,
        Some(ElementChange {
            index: 0,
            removed: 1,
            added: 2
        })
    );
    assert_eq!(event.paragraphs, 0..2);
    assert_eq!(texts(&doc), ["ox\n", "yne\n", "two\n", "three\n"]);
}

#[test]
fn document_remove_across_paragraphs_merges_them() {
    let doc = Document::new("ab\ncd\nef\n");
    let event = doc.remove(1, 4).unwrap();
    assert_eq!(event.kind, EventKind::Remove);
    assert_eq!(
        event.paragraph_change,
        Some(ElementChange {
            index: 0,
            removed: 2,
            added: 1
        })
    );
    assert_eq!(texts(&doc), ["a\n", "ef\n"]);
    assert_eq!(doc.read().paragraph(1).unwrap().range(), 2..5);
}

#[test]
fn document_restyle_reports_runs_per_paragraph() {
    let doc = Document::new("ab\ncd\n");
    let style = RunStyle {
        scale: 2.0,
        ..RunStyle::default()
    };
    let event = doc.set_run_style(1, 3, style).unwrap();
    assert_eq!(event.kind, EventKind::Change);
    assert_eq!(event.paragraph_change, None);
    assert_eq!(event.paragraphs, 0..2);
    assert_eq!(
        event.run_changes,
        [
            RunChange {
                paragraph: 0,
                change: ElementChange {
                    index: 0,
                    removed: 1,
                    added: 2
                }
            },
            RunChange {
                paragraph: 1,
                change: ElementChange {
                    index: 0,
                    removed: 1,
                    added: 2
                }
            },
        ]
    );
    let state = doc.read();
    assert_eq!(state.paragraph(1).unwrap().runs()[0].range(), 3..4);
    assert_eq!(state.paragraph(1).unwrap().runs()[0].style().scale, 2.0);
}

#[test]
fn document_paragraph_lookup_clamps_to_the_last() {
    let doc = Document::new("ab\ncd");
    let state = doc.read();
    assert_eq!(state.len(), 6);
    assert_eq!(state.paragraph_index(0), 0);
    assert_eq!(state.paragraph_index(2), 0);
    assert_eq!(state.paragraph_index(3), 1);
    assert_eq!(state.paragraph_index(50), 1);
}
