// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The weak, neutral and implicit resolution passes.

use core::ops::Range;

use super::Direction::{self, AN, AR, B, CM, CS, EN, ES, ET, L, ON, R, S, WS};
use super::explicit::MAX_LEVELS;

/// Iterates the maximal runs of equal level.
pub(crate) fn level_runs(levels: &[u8]) -> impl Iterator<Item = (Range<usize>, u8)> + '_ {
    let mut start = 0;
    core::iter::from_fn(move || {
        let level = *levels.get(start)?;
        let end = levels[start..]
            .iter()
            .position(|&l| l != level)
            .map_or(levels.len(), |n| start + n);
        let run = start..end;
        start = end;
        Some((run, level))
    })
}

fn direction_of_level(level: u8) -> Direction {
    if level & 1 == 0 { L } else { R }
}

/// Resolves separators, terminators and marks within one level run.
pub(crate) fn resolve_weak(dirs: &mut [Direction], level: u8) {
    let limit = dirs.len();
    if limit == 0 {
        return;
    }
    let mut prev: Option<Direction> = None;
    let mut cur = dirs[0];
    let mut last_strong_was_arabic = cur == AR;
    let mut i = 0;
    while i < limit {
        let mut ii = i + 1;
        let mut next = dirs.get(ii).copied();
        if next == Some(EN) && last_strong_was_arabic {
            next = Some(AN);
        }
        let mut ncur = cur;
        match cur {
            L | R => last_strong_was_arabic = false,
            AR => last_strong_was_arabic = true,
            ES => {
                ncur = if prev == Some(EN) && next == Some(EN) {
                    EN
                } else {
                    ON
                };
            }
            CS => {
                ncur = if prev == Some(EN) && next == Some(EN) {
                    EN
                } else if prev == Some(AN) && next == Some(AN) {
                    AN
                } else {
                    ON
                };
            }
            ET => {
                if prev == Some(EN) || next == Some(EN) {
                    ncur = EN;
                } else if next == Some(ET) && !last_strong_was_arabic {
                    let terminator_end = dirs[ii..]
                        .iter()
                        .position(|&d| d != ET)
                        .map_or(limit, |n| ii + n);
                    if dirs.get(terminator_end) == Some(&EN) {
                        dirs[ii..terminator_end].fill(EN);
                        ii = terminator_end;
                        ncur = EN;
                        next = Some(EN);
                    }
                } else {
                    ncur = ON;
                }
            }
            CM => ncur = prev.unwrap_or_else(|| direction_of_level(level)),
            _ => {}
        }
        dirs[i] = ncur;
        i = ii;
        prev = Some(ncur);
        if let Some(next) = next {
            cur = next;
        }
    }
}

/// Resolves neutrals within one level run from the surrounding strong codes.
///
/// The forward scan for the next strong code is shared by every neutral before it;
/// its cursor lives in this call only.
pub(crate) fn resolve_neutral(dirs: &mut [Direction], level: u8) {
    let base = direction_of_level(level);
    let mut last = base;
    let mut value = base;
    let mut scanned_to: Option<usize> = None;
    for i in 0..dirs.len() {
        match dirs[i] {
            L => last = L,
            R | AR => last = R,
            dir if dir.is_neutral() => {
                if scanned_to.is_none_or(|n| i > n) {
                    value = base;
                    let mut n = i + 1;
                    while n < dirs.len() {
                        match dirs[n] {
                            L => {
                                value = if last == L { L } else { base };
                                break;
                            }
                            R | AR => {
                                value = if last == L { base } else { R };
                                break;
                            }
                            _ => n += 1,
                        }
                    }
                    scanned_to = Some(n);
                }
                dirs[i] = value;
            }
            _ => {}
        }
    }
}

/// Applies the implicit level rules.
///
/// `resolved` holds the output of the weak and neutral passes, `original` the codes
/// before them; separators and trailing whitespace are recognized from the latter.
pub(crate) fn resolve_implicit(
    resolved: &[Direction],
    original: &[Direction],
    levels: &mut [u8],
    base: u8,
) {
    for i in 0..levels.len() {
        let level = levels[i];
        let mut new_level = level;
        if matches!(original[i], B | S) {
            new_level = base;
            for j in (0..i).rev() {
                if original[j] != WS {
                    break;
                }
                levels[j] = base;
            }
        } else {
            match resolved[i] {
                L => new_level = (level + 1) & 0x0e,
                R | AR => new_level = level | 0x01,
                AN => new_level = (level + 2) & 0x0e,
                EN => {
                    if level & 1 != 0 {
                        new_level += 1;
                    } else if i == 0 || levels[i - 1] != level {
                        new_level += 2;
                    } else if resolved[i - 1] == EN {
                        new_level = levels[i - 1];
                    } else if resolved[i - 1] != L {
                        new_level += 2;
                    }
                }
                _ => {}
            }
        }
        if new_level < MAX_LEVELS && new_level != level {
            levels[i] = new_level;
        }
    }
    trim_trailing_whitespace(original, levels, base);
}

/// Returns trailing whitespace to the base level.
pub(crate) fn trim_trailing_whitespace(original: &[Direction], levels: &mut [u8], base: u8) {
    for (level, dir) in levels.iter_mut().zip(original).rev() {
        if *dir != WS {
            break;
        }
        *level = base;
    }
}

/// Runs every resolution pass over `levels`, which holds embedding levels on entry.
pub(crate) fn apply_rules(original: &[Direction], levels: &mut [u8], ltr: bool) -> Vec<Direction> {
    let mut dirs = original.to_vec();
    let runs: Vec<_> = level_runs(levels).collect();
    for (run, level) in &runs {
        resolve_weak(&mut dirs[run.clone()], *level);
    }
    for (run, level) in &runs {
        resolve_neutral(&mut dirs[run.clone()], *level);
    }
    resolve_implicit(&dirs, original, levels, u8::from(!ltr));
    dirs
}
