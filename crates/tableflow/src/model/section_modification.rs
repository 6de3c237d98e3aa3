//! Pending section-level changes of a content adapter.
//!
//! [`SectionModification`] mirrors [`RowModification`](super::RowModification)
//! one level up: deletes, reloads and move sources address committed
//! sections, inserts address the final section list. An insert landing on an
//! index with a pending delete becomes a reload that replaces the committed
//! section with the new one. Deleting a committed section moves the pending
//! inserts behind its final position one step down.

use std::collections::BTreeMap;

use tableflow_core::logging::targets;

use super::animation::Animation;
use super::section::{Section, SectionId};
use super::slots;

/// Pending section-level changes.
#[derive(Debug, Clone, Default)]
pub struct SectionModification {
    insert: BTreeMap<usize, (Section, Animation)>,
    delete: BTreeMap<usize, Animation>,
    reload: BTreeMap<usize, (Option<Section>, Animation)>,
    moves: BTreeMap<usize, (usize, Animation)>,
}

impl SectionModification {
    /// Creates an empty modification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an insert of `section` at final index `index`.
    ///
    /// Pending inserts at `>= index` move one step up. A pending delete at
    /// `index` is turned into a reload carrying `section` as replacement.
    pub fn insert_section(&mut self, section: Section, index: usize, animation: Animation) {
        if self.delete.remove(&index).is_some() {
            tracing::trace!(
                target: targets::MODIFICATION,
                index,
                "section insert over pending delete becomes reload"
            );
            self.stay(index);
            self.reload.insert(index, (Some(section), animation));
            return;
        }

        let shifted = self.insert.split_off(&index);
        self.insert
            .extend(shifted.into_iter().map(|(key, entry)| (key + 1, entry)));
        self.insert.insert(index, (section, animation));
    }

    /// Records a delete of the section at `index`.
    ///
    /// A pending insert at `index` is cancelled instead. Returns the section
    /// that will no longer be committed because of this call: the cancelled
    /// insert or a dropped replacement.
    pub fn delete_section(&mut self, index: usize, animation: Animation) -> Option<Section> {
        if let Some(section) = self.cancel_insert(index) {
            tracing::trace!(
                target: targets::MODIFICATION,
                index,
                "section delete cancels pending insert"
            );
            return Some(section);
        }
        self.delete_committed(index, animation)
    }

    /// Records a delete of the committed section at `index`, leaving pending
    /// inserts untouched. Returns a dropped replacement section, if any.
    pub fn delete_committed(&mut self, index: usize, animation: Animation) -> Option<Section> {
        if !self.delete.contains_key(&index) {
            let position = slots::final_position(&self.insert, self.rank(index));
            slots::close(&mut self.insert, position);
        }
        self.moves.remove(&index);
        let replaced = self.reload.remove(&index).and_then(|(section, _)| section);
        self.delete.insert(index, animation);
        replaced
    }

    /// Removes the pending insert at `index` and returns its section.
    ///
    /// Pending inserts above `index` move one step down.
    pub fn cancel_insert(&mut self, index: usize) -> Option<Section> {
        let (section, _) = self.insert.remove(&index)?;
        let shifted = self.insert.split_off(&index);
        self.insert
            .extend(shifted.into_iter().map(|(key, entry)| (key - 1, entry)));
        Some(section)
    }

    /// Records a reload of the committed section at `index`.
    ///
    /// Suppressed if an insert is pending at `index`. Cancels a pending
    /// delete at `index`.
    pub fn reload_section(&mut self, index: usize, animation: Animation) {
        if self.insert.contains_key(&index) {
            tracing::trace!(
                target: targets::MODIFICATION,
                index,
                "reload of pending section insert suppressed"
            );
            return;
        }
        if self.delete.remove(&index).is_some() {
            self.stay(index);
        }
        let replacement = self.reload.remove(&index).and_then(|(section, _)| section);
        self.reload.insert(index, (replacement, animation));
    }

    /// Records a reload of the committed section at `index`, leaving pending
    /// inserts untouched. Ignored while a delete of `index` is pending.
    pub fn reload_committed(&mut self, index: usize, animation: Animation) {
        if self.delete.contains_key(&index) {
            return;
        }
        let replacement = self.reload.remove(&index).and_then(|(section, _)| section);
        self.reload.insert(index, (replacement, animation));
    }

    /// Drops a pending plain reload at `index`.
    ///
    /// Reloads that carry a replacement section stay in place.
    pub fn undo_reload_section(&mut self, index: usize) {
        if matches!(self.reload.get(&index), Some((None, _))) {
            self.reload.remove(&index);
        }
    }

    /// Records a move of the committed section at `index` to `to`.
    ///
    /// A `to` of `None` records a delete instead. A move of a section whose
    /// delete is already pending is ignored.
    pub fn move_section(&mut self, index: usize, to: Option<usize>, animation: Animation) {
        let Some(to) = to else {
            self.delete_section(index, animation);
            return;
        };
        if self.delete.contains_key(&index) {
            tracing::trace!(
                target: targets::MODIFICATION,
                index,
                "move of deleted section ignored"
            );
            return;
        }
        self.undo_reload_section(index);
        self.moves.insert(index, (to, animation));
    }

    /// Reopens the final slot of the committed section at `index` after its
    /// delete was cancelled.
    fn stay(&mut self, index: usize) {
        let position = slots::final_position(&self.insert, self.rank(index));
        slots::open(&mut self.insert, position);
    }

    fn rank(&self, index: usize) -> usize {
        index - self.delete.keys().filter(|deleted| **deleted < index).count()
    }

    /// Discards every pending change.
    pub fn clear(&mut self) {
        self.insert.clear();
        self.delete.clear();
        self.reload.clear();
        self.moves.clear();
    }

    /// Returns the animation requested for section `index`, if any.
    pub fn animation(&self, index: usize) -> Option<Animation> {
        self.insert
            .get(&index)
            .map(|(_, animation)| *animation)
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

    /// Pending inserts by final index.
    pub fn inserts(&self) -> impl Iterator<Item = (usize, &Section, Animation)> + '_ {
        self.insert
            .iter()
            .map(|(index, (section, animation))| (*index, section, *animation))
    }

    /// Pending deletes by committed index.
    pub fn deletes(&self) -> impl Iterator<Item = (usize, Animation)> + '_ {
        self.delete.iter().map(|(index, animation)| (*index, *animation))
    }

    /// Pending reloads by committed index, with optional replacement.
    pub fn reloads(&self) -> impl Iterator<Item = (usize, Option<&Section>, Animation)> + '_ {
        self.reload
            .iter()
            .map(|(index, (section, animation))| (*index, section.as_ref(), *animation))
    }

    /// Pending moves by committed source index.
    pub fn moves(&self) -> impl Iterator<Item = (usize, usize, Animation)> + '_ {
        self.moves
            .iter()
            .map(|(index, (to, animation))| (*index, *to, *animation))
    }

    /// Returns `true` if a delete is pending at `index`.
    pub fn has_delete(&self, index: usize) -> bool {
        self.delete.contains_key(&index)
    }

    /// Returns the final index of a pending insert of `id`.
    pub fn pending_insert_index(&self, id: SectionId) -> Option<usize> {
        self.insert
            .iter()
            .find(|(_, (section, _))| section.id() == id)
            .map(|(index, _)| *index)
    }

    /// Returns the committed index a pending replacement `id` will take over.
    pub fn replacement_index(&self, id: SectionId) -> Option<usize> {
        self.reload
            .iter()
            .find(|(_, (section, _))| section.as_ref().is_some_and(|s| s.id() == id))
            .map(|(index, _)| *index)
    }

    /// Every section this modification would bring in: inserts and
    /// replacements.
    pub fn incoming_sections(&self) -> impl Iterator<Item = &Section> + '_ {
        self.insert
            .values()
            .map(|(section, _)| section)
            .chain(self.reload.values().filter_map(|(section, _)| section.as_ref()))
    }

    /// Number of sections once this modification is applied to `committed`
    /// sections.
    pub fn resolved_len(&self, committed: usize) -> usize {
        let deleted = self.delete.keys().filter(|index| **index < committed).count();
        committed - deleted + self.insert.len()
    }
}
