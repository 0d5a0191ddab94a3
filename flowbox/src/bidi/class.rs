// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use icu_properties::CodePointMapData;
use icu_properties::props::{BidiClass, GeneralCategory};

/// Bidi direction code of a single character.
///
/// After resolution only [`Direction::L`], [`Direction::R`], [`Direction::AR`] and the
/// number codes remain.
#[allow(
    clippy::upper_case_acronyms,
    reason = "Direction codes keep their UAX #9 abbreviations."
)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Direction {
    /// Strong left-to-right.
    L = 0,
    /// Strong right-to-left.
    R,
    /// European number.
    EN,
    /// European number separator.
    ES,
    /// European number terminator.
    ET,
    /// Arabic number.
    AN,
    /// Common number separator.
    CS,
    /// Paragraph separator.
    B,
    /// Segment separator.
    S,
    /// Whitespace.
    WS,
    /// Other neutral.
    ON,
    /// Strong right-to-left Arabic letter.
    AR,
    /// Combining mark, takes the direction of the preceding character.
    CM,
    /// Explicit embedding or override control.
    F,
}

impl Direction {
    /// Classifies a single character, without context.
    pub fn of(ch: char) -> Self {
        match CodePointMapData::<BidiClass>::new().get(ch) {
            BidiClass::LeftToRight => Self::L,
            BidiClass::RightToLeft => Self::R,
            BidiClass::ArabicLetter => Self::AR,
            BidiClass::EuropeanNumber => Self::EN,
            BidiClass::EuropeanSeparator => Self::ES,
            BidiClass::EuropeanTerminator => Self::ET,
            BidiClass::ArabicNumber => Self::AN,
            BidiClass::CommonSeparator => Self::CS,
            BidiClass::ParagraphSeparator => Self::B,
            BidiClass::SegmentSeparator => Self::S,
            BidiClass::WhiteSpace => Self::WS,
            BidiClass::NonspacingMark => Self::CM,
            BidiClass::LeftToRightEmbedding
            | BidiClass::RightToLeftEmbedding
            | BidiClass::LeftToRightOverride
            | BidiClass::RightToLeftOverride
            | BidiClass::PopDirectionalFormat => Self::F,
            // Isolates and boundary neutrals are not modeled.
            _ => Self::ON,
        }
    }

    /// Returns `true` for the strong codes `L`, `R` and `AR`.
    pub const fn is_strong(self) -> bool {
        matches!(self, Self::L | Self::R | Self::AR)
    }

    /// Returns `true` for codes resolved by the neutral pass.
    pub const fn is_neutral(self) -> bool {
        matches!(self, Self::B | Self::S | Self::WS | Self::ON | Self::F)
    }

    const fn sets_mark_context(self) -> bool {
        matches!(self, Self::L | Self::R | Self::AR | Self::B)
    }
}

fn is_combining_mark(ch: char) -> bool {
    matches!(
        CodePointMapData::<GeneralCategory>::new().get(ch),
        GeneralCategory::NonspacingMark
            | GeneralCategory::EnclosingMark
            | GeneralCategory::SpacingMark
    )
}

/// Classifies every character of a paragraph.
///
/// Combining marks take the code of the nearest preceding strong character or
/// paragraph separator; a mark with no such predecessor is `ON`.
pub fn direction_codes(text: &[char]) -> Vec<Direction> {
    let mut context = Direction::ON;
    text.iter()
        .map(|&ch| {
            let dir = Direction::of(ch);
            if dir.sets_mark_context() {
                context = dir;
                dir
            } else if dir == Direction::CM || (dir == Direction::ON && is_combining_mark(ch)) {
                context
            } else {
                dir
            }
        })
        .collect()
}
