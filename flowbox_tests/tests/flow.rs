// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flow layout tests.

use flowbox::{FlowFormat, LayoutError, ViewId, ViewTree};
use layout_primitives::Axis;

use crate::test_name;
use crate::util::run_views;

fn row_ranges(tree: &ViewTree, flow: ViewId) -> Vec<(usize, usize)> {
    tree.rows(flow)
        .iter()
        .map(|&row| (tree.start_offset(row), tree.end_offset(row)))
        .collect()
}

#[test]
fn flow_unbroken_text_fills_rows() {
    let text = format!("{}\n", "a".repeat(100));
    let (chars, views) = run_views(&text, &[45, 77]);
    let mut tree = ViewTree::new();
    let flow = tree.insert_flow(0..chars.len(), FlowFormat::default());
    tree.set_pool(flow, views).unwrap();
    tree.set_size(flow, 300.0, 1000.0).unwrap();

    let rows = row_ranges(&tree, flow);
    assert_eq!(rows, [(0, 30), (30, 60), (60, 90), (90, 101)]);
    assert_eq!(rows.first().map(|r| r.0), Some(0));
    assert_eq!(rows.last().map(|r| r.1), Some(chars.len()));
    for pair in rows.windows(2) {
        assert_eq!(pair[0].1, pair[1].0, "{}: rows must be contiguous", test_name!());
    }
    assert_eq!(tree.preferred_span(flow, Axis::Y), 40.0);
}

#[test]
fn flow_pool_views_belong_to_the_flow_or_a_row() {
    let text = format!("{}\n", "a".repeat(100));
    let (chars, views) = run_views(&text, &[45, 77]);
    let mut tree = ViewTree::new();
    let flow = tree.insert_flow(0..chars.len(), FlowFormat::default());
    tree.set_pool(flow, views).unwrap();
    let pool = tree.pool(flow).to_vec();

    for width in [300.0, 1000.0, 120.0] {
        tree.set_size(flow, width, 1000.0).unwrap();
        let rows = tree.rows(flow).to_vec();
        for &id in &pool {
            let parent = tree.parent(id).unwrap();
            assert!(
                parent == flow || rows.contains(&parent),
                "{}: width {width}",
                test_name!()
            );
        }
    }
    assert_eq!(row_ranges(&tree, flow).len(), 9);
}

#[test]
fn flow_rows_widen_with_the_flow() {
    let (chars, views) = run_views("one two three four\n", &[4, 8]);
    let mut tree = ViewTree::new();
    let flow = tree.insert_flow(0..chars.len(), FlowFormat::default());
    tree.set_pool(flow, views).unwrap();
    tree.set_size(flow, 85.0, 100.0).unwrap();
    assert_eq!(row_ranges(&tree, flow), [(0, 8), (8, 14), (14, 19)]);

    tree.set_size(flow, 1000.0, 100.0).unwrap();
    assert_eq!(row_ranges(&tree, flow), [(0, 19)]);
    assert_eq!(tree.preferred_span(flow, Axis::Y), 10.0);
}

#[test]
fn flow_without_views_fails() {
    let mut tree = ViewTree::new();
    let flow = tree.insert_flow(0..3, FlowFormat::default());
    let err = tree.set_size(flow, 100.0, 100.0).unwrap_err();
    assert!(matches!(err, LayoutError::Invariant { .. }));
    assert!(!err.is_recoverable());
    assert_eq!(
        err.to_string(),
        "layout invariant violated: infinite loop in formatting"
    );
}
