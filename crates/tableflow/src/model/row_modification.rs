//! Pending row-level changes of one section.
//!
//! A [`RowModification`] records inserts, deletes, reloads and moves that have
//! been requested on a section but not yet committed. Indices follow list
//! widget batch semantics:
//!
//! - delete, reload and move sources address the committed rows
//! - insert positions address the rows as they will look after the commit
//!
//! The tracker keeps itself consistent while edits pile up:
//!
//! - inserting at `i` re-keys every pending insert at `>= i` one step up
//! - deleting an index with a pending insert cancels that insert and re-keys
//!   the pending inserts above it one step down
//! - deleting or moving a committed row moves the pending inserts behind its
//!   final position one step down; cancelling that delete moves them back
//! - inserting at an index with a pending delete turns both into a reload
//! - reloading an index with a pending insert is suppressed
//! - moving an index drops any pending reload or delete on it
//! - a row moved in takes its target slot only when the commit receives it
//!
//! Indices are not bounds-checked here. [`Section`](super::Section) validates
//! them against its rows before calling in.

use std::collections::BTreeMap;

use tableflow_core::logging::targets;

use super::animation::Animation;
use super::index::IndexPath;
use super::item::Item;
use super::slots;

/// A row carried from one position to another by a committed move.
#[derive(Debug, Clone, PartialEq)]
pub struct MovedRow {
    /// Where the row was before the commit.
    pub from: IndexPath,
    /// Where the row should end up.
    pub to: IndexPath,
    /// The row content.
    pub content: Item,
    /// Requested animation.
    pub animation: Animation,
}

/// A row waiting for its final slot: a plain insert, or a row arriving by
/// move when `from` is set.
#[derive(Debug, Clone)]
struct Pending {
    content: Item,
    animation: Animation,
    from: Option<IndexPath>,
}

/// Pending row-level changes of a single section.
#[derive(Debug, Clone, Default)]
pub struct RowModification {
    insert: BTreeMap<usize, Pending>,
    delete: BTreeMap<usize, Animation>,
    reload: BTreeMap<usize, (Option<Item>, Animation)>,
    moves: BTreeMap<usize, (IndexPath, Animation)>,
}

impl RowModification {
    /// Creates an empty modification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an insert of `content` at final position `index`.
    pub fn insert(&mut self, content: Item, index: usize, animation: Animation) {
        if self.delete.remove(&index).is_some() {
            tracing::trace!(
                target: targets::MODIFICATION,
                index,
                "insert over pending delete becomes reload"
            );
            self.stay(index);
            self.reload.insert(index, (Some(content), animation));
            return;
        }

        slots::open(&mut self.insert, index);
        self.insert.insert(
            index,
            Pending {
                content,
                animation,
                from: None,
            },
        );
    }

    /// Records a reload at `index`, optionally replacing its content.
    ///
    /// If an insert is pending at `index` nothing is reloaded; a replacement
    /// content updates the pending insert instead. Callers that know `index`
    /// is a committed row use [`reload_committed`](Self::reload_committed).
    pub fn reload(&mut self, content: Option<Item>, index: usize, animation: Animation) {
        if let Some(pending) = self.insert.get_mut(&index) {
            tracing::trace!(
                target: targets::MODIFICATION,
                index,
                "reload of pending insert suppressed"
            );
            if let Some(content) = content {
                pending.content = content;
            }
            return;
        }
        self.reload_committed(content, index, animation);
    }

    /// Records a reload of the committed row at `index`, leaving pending
    /// inserts untouched.
    ///
    /// A pending delete of the row is cancelled. Rows leaving by move are not
    /// reloaded.
    pub fn reload_committed(&mut self, content: Option<Item>, index: usize, animation: Animation) {
        if self.moves.contains_key(&index) {
            tracing::trace!(target: targets::MODIFICATION, index, "reload of moved row ignored");
            return;
        }
        if self.delete.remove(&index).is_some() {
            self.stay(index);
        }
        let previous = self.reload.remove(&index).and_then(|(content, _)| content);
        self.reload.insert(index, (content.or(previous), animation));
    }

    /// Records a delete of the row at `index`.
    ///
    /// A pending insert at `index` is cancelled instead; no delete is
    /// recorded in that case.
    pub fn delete(&mut self, index: usize, animation: Animation) {
        if self.cancel_insert(index).is_some() {
            tracing::trace!(target: targets::MODIFICATION, index, "delete cancels pending insert");
            return;
        }
        self.delete_committed(index, animation);
    }

    /// Records a delete of the committed row at `index`, leaving pending
    /// inserts untouched.
    pub fn delete_committed(&mut self, index: usize, animation: Animation) {
        self.reload.remove(&index);
        self.leave(index);
        self.moves.remove(&index);
        self.delete.insert(index, animation);
    }

    /// Removes the pending insert at `index` and returns its content.
    ///
    /// Pending inserts above `index` move one step down.
    pub fn cancel_insert(&mut self, index: usize) -> Option<Item> {
        let pending = self.insert.remove(&index)?;
        slots::close(&mut self.insert, index);
        Some(pending.content)
    }

    /// Records a move of the row at `index` to `to`.
    ///
    /// If the row is a pending insert it has never been shown; the insert is
    /// cancelled and its content returned so the caller can insert it at the
    /// target instead. Otherwise `None` is returned.
    pub fn move_row(&mut self, index: usize, to: IndexPath, animation: Animation) -> Option<Item> {
        if let Some(content) = self.cancel_insert(index) {
            return Some(content);
        }
        self.move_committed(index, to, animation);
        None
    }

    /// Records a move of the committed row at `index` to `to`.
    ///
    /// The row's pending reload or delete is dropped. It takes no final slot
    /// here until the move is cancelled.
    pub fn move_committed(&mut self, index: usize, to: IndexPath, animation: Animation) {
        self.reload.remove(&index);
        self.leave(index);
        self.delete.remove(&index);
        self.moves.insert(index, (to, animation));
    }

    /// Cancels the pending move of the committed row at `index`; the row
    /// stays where it is.
    pub fn cancel_move(&mut self, index: usize) -> bool {
        if self.moves.remove(&index).is_none() {
            return false;
        }
        self.stay(index);
        true
    }

    /// Places a row arriving by move from `from` at final position `index`.
    ///
    /// Pending inserts at or behind `index` move one step up.
    pub fn receive(&mut self, content: Item, index: usize, from: IndexPath, animation: Animation) {
        slots::open(&mut self.insert, index);
        self.insert.insert(
            index,
            Pending {
                content,
                animation,
                from: Some(from),
            },
        );
    }

    /// Closes the final slot of the committed row at `index` unless it is
    /// already leaving.
    fn leave(&mut self, index: usize) {
        if !self.is_leaving(index) {
            let position = slots::final_position(&self.insert, self.rank(index));
            slots::close(&mut self.insert, position);
        }
    }

    /// Reopens the final slot of the committed row at `index` after its
    /// delete was cancelled.
    fn stay(&mut self, index: usize) {
        let position = slots::final_position(&self.insert, self.rank(index));
        slots::open(&mut self.insert, position);
    }

    /// Number of committed rows before `index` that stay.
    fn rank(&self, index: usize) -> usize {
        index
            - self
                .delete
                .keys()
                .chain(self.moves.keys())
                .filter(|leaving| **leaving < index)
                .count()
    }

    /// Discards every pending change.
    pub fn clear(&mut self) {
        self.insert.clear();
        self.delete.clear();
        self.reload.clear();
        self.moves.clear();
    }

    /// Returns the animation requested for `index`, if any.
    ///
    /// Inserts are consulted first, then reloads, deletes and moves.
    pub fn animation(&self, index: usize) -> Option<Animation> {
        self.insert
            .get(&index)
            .map(|pending| pending.animation)
            .or_else(|| self.reload.get(&index).map(|(_, animation)| *animation))
            .or_else(|| self.delete.get(&index).copied())
            .or_else(|| self.moves.get(&index).map(|(_, animation)| *animation))
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.insert.is_empty()
            && self.delete.is_empty()
            && self.reload.is_empty()
            && self.moves.is_empty()
    }

    /// Pending inserts by final position.
    ///
    /// Rows arriving by move are not included; see [`arrivals`](Self::arrivals).
    pub fn inserts(&self) -> impl Iterator<Item = (usize, &Item, Animation)> + '_ {
        self.insert
            .iter()
            .filter(|(_, pending)| pending.from.is_none())
            .map(|(index, pending)| (*index, &pending.content, pending.animation))
    }

    /// Rows arriving by move, as `(final position, source, content, animation)`.
    pub fn arrivals(&self) -> impl Iterator<Item = (usize, IndexPath, &Item, Animation)> + '_ {
        self.insert.iter().filter_map(|(index, pending)| {
            pending
                .from
                .map(|from| (*index, from, &pending.content, pending.animation))
        })
    }

    /// Pending deletes by committed index.
    pub fn deletes(&self) -> impl Iterator<Item = (usize, Animation)> + '_ {
        self.delete.iter().map(|(index, animation)| (*index, *animation))
    }

    /// Pending reloads by committed index, with optional replacement content.
    pub fn reloads(&self) -> impl Iterator<Item = (usize, Option<&Item>, Animation)> + '_ {
        self.reload
            .iter()
            .map(|(index, (content, animation))| (*index, content.as_ref(), *animation))
    }

    /// Pending moves by committed source index.
    pub fn moves(&self) -> impl Iterator<Item = (usize, IndexPath, Animation)> + '_ {
        self.moves
            .iter()
            .map(|(index, (to, animation))| (*index, *to, *animation))
    }

    /// Returns `true` if an insert is pending at `index`.
    pub fn has_insert(&self, index: usize) -> bool {
        self.insert.contains_key(&index)
    }

    /// Returns `true` if a delete is pending at `index`.
    pub fn has_delete(&self, index: usize) -> bool {
        self.delete.contains_key(&index)
    }

    /// Returns `true` if the committed row at `index` leaves by delete or move.
    pub fn is_leaving(&self, index: usize) -> bool {
        self.delete.contains_key(&index) || self.moves.contains_key(&index)
    }

    /// Number of rows the section will hold once this modification is
    /// applied to `committed` rows.
    ///
    /// Rows moved out count as gone; rows moved in count once received.
    pub fn resolved_len(&self, committed: usize) -> usize {
        let leaving = self
            .delete
            .keys()
            .chain(self.moves.keys())
            .filter(|index| **index < committed)
            .count();
        committed - leaving + self.insert.len()
    }

    /// Applies the pending changes to `rows` in commit order: replacements,
    /// then deletes and moves by descending index, then inserts and received
    /// rows by ascending index.
    ///
    /// Out-of-range entries are skipped and inserts past the end are
    /// appended.
    pub fn apply(&self, rows: &mut Vec<Item>) {
        for (index, (content, _)) in &self.reload {
            if let (Some(content), Some(row)) = (content, rows.get_mut(*index)) {
                *row = content.clone();
            }
        }

        let mut leaving: Vec<usize> =
            self.delete.keys().chain(self.moves.keys()).copied().collect();
        leaving.sort_unstable_by(|a, b| b.cmp(a));
        leaving.dedup();
        for index in leaving {
            if index < rows.len() {
                rows.remove(index);
            }
        }

        for (index, pending) in &self.insert {
            let at = (*index).min(rows.len());
            rows.insert(at, pending.content.clone());
        }
    }
}
