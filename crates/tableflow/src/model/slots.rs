//! Keeping pending insert positions valid while committed entries leave or
//! come back.
//!
//! Pending inserts are keyed by final position. When a committed entry
//! leaves, every final position behind it drops by one; when a pending
//! delete is cancelled, the entry takes a final slot again.

use std::collections::BTreeMap;

/// Final position of the committed entry with `rank` surviving committed
/// entries before it, given the pending inserts.
pub(super) fn final_position<E>(inserts: &BTreeMap<usize, E>, rank: usize) -> usize {
    let mut survivors = 0;
    let mut position = 0;
    loop {
        if !inserts.contains_key(&position) {
            if survivors == rank {
                return position;
            }
            survivors += 1;
        }
        position += 1;
    }
}

/// Removes the final slot at `position`: inserts behind it move one down.
pub(super) fn close<E>(inserts: &mut BTreeMap<usize, E>, position: usize) {
    let shifted = inserts.split_off(&(position + 1));
    inserts.extend(shifted.into_iter().map(|(key, entry)| (key - 1, entry)));
}

/// Opens a final slot at `position`: inserts at or behind it move one up.
pub(super) fn open<E>(inserts: &mut BTreeMap<usize, E>, position: usize) {
    let shifted = inserts.split_off(&position);
    inserts.extend(shifted.into_iter().map(|(key, entry)| (key + 1, entry)));
}
