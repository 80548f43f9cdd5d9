//! Permutation-based reordering shared by the document and range lists

use std::collections::HashMap;
use std::hash::Hash;

/// Reorder `items` so their keys follow `order`.
///
/// `order` must be a permutation of the current keys: same length, every key
/// present exactly once. Keys within `items` are assumed unique. Returns
/// false and leaves `items` untouched when `order` is not a permutation.
pub(crate) fn reorder_by_key<T, K, F>(items: &mut Vec<T>, order: &[K], key: F) -> bool
where
    K: Eq + Hash + Copy,
    F: Fn(&T) -> K,
{
    if order.len() != items.len() {
        return false;
    }

    let mut positions: HashMap<K, usize> = items
        .iter()
        .enumerate()
        .map(|(index, item)| (key(item), index))
        .collect();

    let mut picks = Vec::with_capacity(order.len());
    for k in order {
        // Removing as we go rejects repeated keys as well as unknown ones
        match positions.remove(k) {
            Some(index) => picks.push(index),
            None => return false,
        }
    }

    let mut slots: Vec<Option<T>> = items.drain(..).map(Some).collect();
    items.extend(picks.into_iter().filter_map(|index| slots[index].take()));
    true
}
