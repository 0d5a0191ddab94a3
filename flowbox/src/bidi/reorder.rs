// Copyright 2025 the Flowbox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::explicit::MAX_LEVELS;

/// Reorders `items` from logical to visual order according to `levels`.
///
/// Starting at the highest level, every maximal run at or above the current level is
/// reversed, down to the lowest odd level present. Only the first
/// `min(levels.len(), items.len())` items take part.
pub fn reorder_visually<T>(levels: &[u8], items: &mut [T]) {
    let len = levels.len().min(items.len());
    let levels = &levels[..len];
    let mut highest = 0_u8;
    let mut lowest_odd = MAX_LEVELS + 1;
    for &level in levels {
        highest = highest.max(level);
        if level & 1 != 0 {
            lowest_odd = lowest_odd.min(level);
        }
    }
    while highest >= lowest_odd {
        let mut i = 0;
        loop {
            while i < len && levels[i] < highest {
                i += 1;
            }
            let start = i;
            if start == len {
                break;
            }
            while i < len && levels[i] >= highest {
                i += 1;
            }
            items[start..i].reverse();
        }
        highest -= 1;
    }
}

/// Returns the logical index shown at each visual position.
pub fn visual_to_logical(levels: &[u8]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..levels.len()).collect();
    reorder_visually(levels, &mut order);
    order
}

/// Returns the visual position of each logical index.
pub fn logical_to_visual(levels: &[u8]) -> Vec<usize> {
    inverse_order(&visual_to_logical(levels))
}

/// Inverts a permutation.
///
/// Entries that are not valid indices of `order` are skipped.
pub fn inverse_order(order: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; order.len()];
    for (index, &target) in order.iter().enumerate() {
        if let Some(slot) = inverse.get_mut(target) {
            *slot = index;
        }
    }
    inverse
}

/// Ranks arbitrary values into a contiguous order `0..n`.
///
/// Equal values are ranked by their position.
pub fn contiguous_order(values: &[i32]) -> Vec<usize> {
    let mut by_value: Vec<usize> = (0..values.len()).collect();
    by_value.sort_by_key(|&index| (values[index], index));
    inverse_order(&by_value)
}

/// Like [`contiguous_order`], but returns `None` when the order is already canonical.
pub fn normalized_order(values: &[i32]) -> Option<Vec<usize>> {
    let order = contiguous_order(values);
    if order.iter().enumerate().all(|(index, &rank)| index == rank) {
        None
    } else {
        Some(order)
    }
}
