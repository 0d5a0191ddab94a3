// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bidi resolution and reordering tests.

use flowbox::bidi::{
    Bidi, Direction, EmbeddingStack, inverse_order, logical_to_visual, reorder_visually,
    visual_to_logical,
};
use layout_primitives::BaseDirection;
use unicode_bidi::{BidiInfo, Level};

use crate::test_name;
use crate::util::chars;

/// Paragraphs without explicit controls, numbers, brackets or trailing whitespace.
const PLAIN: &[(&str, BaseDirection)] = &[
    ("hello world", BaseDirection::Ltr),
    ("abc \u{05D0}\u{05D1}\u{05D2} def", BaseDirection::Ltr),
    ("abc \u{05D0}\u{05D1}, \u{05D2}! def", BaseDirection::Ltr),
    ("\u{05D0}\u{05D1} abc \u{05D2}", BaseDirection::Rtl),
    ("\u{0627}\u{0644} xyz \u{0645}", BaseDirection::Rtl),
    ("\u{05D0} - abc - \u{05D1}", BaseDirection::Ltr),
];

const EMBEDDED: &[&str] = &[
    "a\u{202B}b\u{05D0}c\u{202C}d",
    "\u{05D0}\u{202A}xy\u{202B}z\u{202C}w\u{202C}\u{05D1}",
    "ab\u{202E}cd\u{202C}ef",
    "\u{202D}\u{05D0}\u{05D1}\u{202C} tail",
];

#[test]
fn bidi_plain_text_matches_unicode_bidi() {
    for &(text, direction) in PLAIN {
        let ours = Bidi::new(&chars(text), direction);
        let level = match direction {
            BaseDirection::Rtl => Level::rtl(),
            _ => Level::ltr(),
        };
        let info = BidiInfo::new(text, Some(level));
        let theirs: Vec<u8> = text
            .char_indices()
            .map(|(byte, _)| info.levels[byte].number())
            .collect();
        assert_eq!(ours.levels(), theirs, "{}: {text:?}", test_name!());
    }
}

#[test]
fn bidi_visual_order_round_trips() {
    for text in EMBEDDED.iter().chain(PLAIN.iter().map(|(text, _)| text)) {
        for direction in [BaseDirection::Ltr, BaseDirection::Rtl] {
            let bidi = Bidi::new(&chars(text), direction);
            let to_visual = bidi.logical_to_visual();
            let to_logical = bidi.visual_to_logical();
            for (logical, &visual) in to_visual.iter().enumerate() {
                assert_eq!(to_logical[visual], logical, "{}: {text:?}", test_name!());
            }
            assert_eq!(inverse_order(&to_visual), to_logical);
        }
    }
}

#[test]
fn bidi_resolution_is_idempotent() {
    for &(text, direction) in PLAIN {
        let text = chars(text);
        let first = Bidi::new(&text, direction);
        let again = Bidi::from_embeddings(&text, first.levels().to_vec(), first.base_is_ltr());
        assert_eq!(again.levels(), first.levels(), "{}: {text:?}", test_name!());
    }
}

#[test]
fn bidi_levels_match_resolved_directions() {
    for &(text, direction) in PLAIN {
        let bidi = Bidi::new(&chars(text), direction);
        let base = bidi.base_level();
        for (i, (&level, &dir)) in bidi.levels().iter().zip(bidi.resolved()).enumerate() {
            assert!(level >= base, "{text:?}: level {level} at {i} below base");
            match dir {
                Direction::L => assert_eq!(level % 2, 0, "{text:?}: L at {i} on odd level"),
                Direction::R | Direction::AR => {
                    assert_eq!(level % 2, 1, "{text:?}: R at {i} on even level");
                }
                _ => {}
            }
        }
    }
}

#[test]
fn bidi_reorders_embedded_run() {
    let levels = [0, 0, 1, 1, 0, 0];
    assert_eq!(visual_to_logical(&levels), [0, 1, 3, 2, 4, 5]);
    assert_eq!(logical_to_visual(&levels), [0, 1, 3, 2, 4, 5]);

    let mut items = ['a', 'b', 'c', 'd', 'e', 'f'];
    reorder_visually(&levels, &mut items);
    assert_eq!(items, ['a', 'b', 'd', 'c', 'e', 'f']);
}

#[test]
fn bidi_nested_runs_reverse_from_highest_level() {
    let levels = [0, 1, 1, 2, 2, 1, 0];
    assert_eq!(visual_to_logical(&levels), [0, 5, 3, 4, 2, 1, 6]);
}

#[test]
fn bidi_embedding_pair_folds() {
    let text = chars("A\u{202A}B\u{202C}C");
    let bidi = Bidi::new(&text, BaseDirection::Ltr);
    assert_eq!(bidi.levels()[0], 0);
    assert_eq!(bidi.levels()[2], 2);
    assert_eq!(bidi.levels()[4], 0);

    let mut stack = EmbeddingStack::new(true);
    let depths: Vec<usize> = text
        .iter()
        .map(|&ch| {
            stack.advance(ch);
            stack.depth()
        })
        .collect();
    assert_eq!(depths, [0, 1, 1, 0, 0]);
}

#[test]
fn bidi_unmatched_pops_are_ignored() {
    let mut stack = EmbeddingStack::new(false);
    assert_eq!(stack.advance('\u{202C}'), 1);
    assert_eq!(stack.depth(), 0);
    assert_eq!(stack.advance('\u{202B}'), 1);
    assert_eq!(stack.level(), 3);
}

#[test]
fn bidi_overflowing_embeddings_are_cancelled_by_their_pops() {
    let mut text: Vec<char> = core::iter::repeat_n('\u{202B}', 10).collect();
    text.push('x');
    let mut stack = EmbeddingStack::new(true);
    for &ch in &text {
        stack.advance(ch);
    }
    // Odd levels 1 to 15 fit; the last two pushes overflow.
    assert_eq!(stack.depth(), 8);
    assert_eq!(stack.level(), 15);
    stack.advance('\u{202C}');
    stack.advance('\u{202C}');
    assert_eq!(stack.level(), 15);
    stack.advance('\u{202C}');
    assert_eq!(stack.level(), 13);
}

#[test]
fn bidi_line_levels_are_independent_of_the_paragraph_end() {
    let text = chars("abc \u{05D0}\u{05D1} def");
    let bidi = Bidi::new(&text, BaseDirection::Ltr);
    let line = bidi.line(4, 7).unwrap();
    assert_eq!(line.levels(), [1, 1, 0]);
    assert_eq!(line.visual_to_logical(), [1, 0, 2]);
}
