//! Committed batches handed to views.

use std::collections::BTreeMap;

use super::animation::Animation;
use super::index::IndexPath;
use super::row_modification::MovedRow;

/// One committed batch of section and row changes.
///
/// Row deletes, reloads and move sources use the row the view shows before
/// the batch; inserts and move targets use the row after it. The section
/// component of every row entry, sources included, is the section index
/// after the batch's section deletes, inserts and moves. Every entry carries
/// the animation that was requested for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellModifications {
    insert_rows: BTreeMap<IndexPath, Animation>,
    delete_rows: BTreeMap<IndexPath, Animation>,
    reload_rows: BTreeMap<IndexPath, Animation>,
    moved_rows: BTreeMap<IndexPath, (IndexPath, Animation)>,
    insert_sections: BTreeMap<usize, Animation>,
    delete_sections: BTreeMap<usize, Animation>,
    reload_sections: BTreeMap<usize, Animation>,
    moved_sections: BTreeMap<usize, (usize, Animation)>,
}

/// The rows one section reported while being resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedRows {
    pub(crate) insert: BTreeMap<IndexPath, Animation>,
    pub(crate) delete: BTreeMap<IndexPath, Animation>,
    pub(crate) reload: BTreeMap<IndexPath, Animation>,
    pub(crate) moved: Vec<MovedRow>,
}

/// A single step of a batch, in the order views should apply it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Delete whole sections.
    DeleteSections {
        sections: Vec<usize>,
        animation: Animation,
    },
    /// Insert whole sections.
    InsertSections {
        sections: Vec<usize>,
        animation: Animation,
    },
    /// Move one section.
    MoveSection {
        from: usize,
        to: usize,
        animation: Animation,
    },
    /// Reload whole sections.
    ReloadSections {
        sections: Vec<usize>,
        animation: Animation,
    },
    /// Delete rows.
    DeleteRows {
        rows: Vec<IndexPath>,
        animation: Animation,
    },
    /// Insert rows.
    InsertRows {
        rows: Vec<IndexPath>,
        animation: Animation,
    },
    /// Move one row.
    MoveRow {
        from: IndexPath,
        to: IndexPath,
        animation: Animation,
    },
    /// Reload rows.
    ReloadRows {
        rows: Vec<IndexPath>,
        animation: Animation,
    },
}

impl BatchOperation {
    /// Returns the animation of this step.
    pub fn animation(&self) -> Animation {
        match self {
            BatchOperation::DeleteSections { animation, .. }
            | BatchOperation::InsertSections { animation, .. }
            | BatchOperation::MoveSection { animation, .. }
            | BatchOperation::ReloadSections { animation, .. }
            | BatchOperation::DeleteRows { animation, .. }
            | BatchOperation::InsertRows { animation, .. }
            | BatchOperation::MoveRow { animation, .. }
            | BatchOperation::ReloadRows { animation, .. } => *animation,
        }
    }
}

/// Groups keys by animation; groups and keys come out in ascending order.
pub fn group_by_animation<K: Copy + Ord>(
    entries: &BTreeMap<K, Animation>,
) -> BTreeMap<Animation, Vec<K>> {
    let mut grouped: BTreeMap<Animation, Vec<K>> = BTreeMap::new();
    for (key, animation) in entries {
        grouped.entry(*animation).or_default().push(*key);
    }
    grouped
}

impl CellModifications {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows to insert, keyed by their index after the batch.
    pub fn insert_rows(&self) -> &BTreeMap<IndexPath, Animation> {
        &self.insert_rows
    }

    /// Rows to delete, keyed by their index before the batch.
    pub fn delete_rows(&self) -> &BTreeMap<IndexPath, Animation> {
        &self.delete_rows
    }

    /// Rows to reload, keyed by their index before the batch.
    pub fn reload_rows(&self) -> &BTreeMap<IndexPath, Animation> {
        &self.reload_rows
    }

    /// Moved rows: source index mapped to target index.
    pub fn moved_rows(&self) -> &BTreeMap<IndexPath, (IndexPath, Animation)> {
        &self.moved_rows
    }

    /// Sections to insert.
    pub fn insert_sections(&self) -> &BTreeMap<usize, Animation> {
        &self.insert_sections
    }

    /// Sections to delete.
    pub fn delete_sections(&self) -> &BTreeMap<usize, Animation> {
        &self.delete_sections
    }

    /// Sections to reload.
    pub fn reload_sections(&self) -> &BTreeMap<usize, Animation> {
        &self.reload_sections
    }

    /// Moved sections: source index mapped to target index.
    pub fn moved_sections(&self) -> &BTreeMap<usize, (usize, Animation)> {
        &self.moved_sections
    }

    /// Returns `true` if the batch contains no change at all.
    pub fn is_empty(&self) -> bool {
        self.row_change_count() == 0 && self.section_change_count() == 0
    }

    /// Number of row-level entries.
    pub fn row_change_count(&self) -> usize {
        self.insert_rows.len()
            + self.delete_rows.len()
            + self.reload_rows.len()
            + self.moved_rows.len()
    }

    /// Number of section-level entries.
    pub fn section_change_count(&self) -> usize {
        self.insert_sections.len()
            + self.delete_sections.len()
            + self.reload_sections.len()
            + self.moved_sections.len()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn record_insert_section(&mut self, index: usize, animation: Animation) {
        self.insert_sections.insert(index, animation);
    }

    pub(crate) fn record_delete_section(&mut self, index: usize, animation: Animation) {
        self.delete_sections.insert(index, animation);
    }

    pub(crate) fn record_reload_section(&mut self, index: usize, animation: Animation) {
        self.reload_sections.insert(index, animation);
    }

    pub(crate) fn record_move_section(&mut self, from: usize, to: usize, animation: Animation) {
        self.moved_sections.insert(from, (to, animation));
    }

    pub(crate) fn record_insert_row(&mut self, path: IndexPath, animation: Animation) {
        self.insert_rows.insert(path, animation);
    }

    pub(crate) fn record_delete_row(&mut self, path: IndexPath, animation: Animation) {
        self.delete_rows.insert(path, animation);
    }

    pub(crate) fn record_move_row(&mut self, from: IndexPath, to: IndexPath, animation: Animation) {
        self.moved_rows.insert(from, (to, animation));
    }

    /// Folds the rows a section reported into this batch.
    pub(crate) fn merge_rows(&mut self, rows: &ResolvedRows) {
        self.insert_rows.extend(&rows.insert);
        self.delete_rows.extend(&rows.delete);
        self.reload_rows.extend(&rows.reload);
    }

    /// Flattens the batch into the steps a view applies, in order: section
    /// deletes, inserts, moves and reloads, then row deletes, inserts, moves
    /// and reloads. Indices sharing an animation are grouped into one step.
    pub fn operations(&self) -> Vec<BatchOperation> {
        let mut operations = Vec::new();

        for (animation, sections) in group_by_animation(&self.delete_sections) {
            operations.push(BatchOperation::DeleteSections { sections, animation });
        }
        for (animation, sections) in group_by_animation(&self.insert_sections) {
            operations.push(BatchOperation::InsertSections { sections, animation });
        }
        for (from, (to, animation)) in &self.moved_sections {
            operations.push(BatchOperation::MoveSection {
                from: *from,
                to: *to,
                animation: *animation,
            });
        }
        for (animation, sections) in group_by_animation(&self.reload_sections) {
            operations.push(BatchOperation::ReloadSections { sections, animation });
        }

        for (animation, rows) in group_by_animation(&self.delete_rows) {
            operations.push(BatchOperation::DeleteRows { rows, animation });
        }
        for (animation, rows) in group_by_animation(&self.insert_rows) {
            operations.push(BatchOperation::InsertRows { rows, animation });
        }
        for (from, (to, animation)) in &self.moved_rows {
            operations.push(BatchOperation::MoveRow {
                from: *from,
                to: *to,
                animation: *animation,
            });
        }
        for (animation, rows) in group_by_animation(&self.reload_rows) {
            operations.push(BatchOperation::ReloadRows { rows, animation });
        }

        operations
    }
}

impl ResolvedRows {
    /// Returns `true` if the section reported nothing.
    pub fn is_empty(&self) -> bool {
        self.insert.is_empty()
            && self.delete.is_empty()
            && self.reload.is_empty()
            && self.moved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch() {
        let batch = CellModifications::new();
        assert!(batch.is_empty());
        assert!(batch.operations().is_empty());
    }

    #[test]
    fn test_operation_order_and_grouping() {
        let mut batch = CellModifications::new();
        let mut rows = ResolvedRows::default();
        rows.insert.insert(IndexPath::new(0, 1), Animation::Fade);
        rows.insert.insert(IndexPath::new(0, 0), Animation::Automatic);
        rows.insert.insert(IndexPath::new(1, 0), Animation::Fade);
        rows.reload.insert(IndexPath::new(0, 3), Animation::Automatic);
        rows.delete.insert(IndexPath::new(2, 2), Animation::SlideLeft);
        batch.merge_rows(&rows);
        batch.record_insert_section(4, Animation::Automatic);
        batch.record_reload_section(2, Animation::Middle);
        batch.record_delete_section(1, Animation::Fade);
        batch.record_move_row(IndexPath::new(0, 5), IndexPath::new(3, 0), Animation::None);

        assert_eq!(batch.row_change_count(), 6);
        assert_eq!(batch.section_change_count(), 3);

        let operations = batch.operations();
        assert_eq!(
            operations,
            vec![
                BatchOperation::DeleteSections { sections: vec![1], animation: Animation::Fade },
                BatchOperation::InsertSections {
                    sections: vec![4],
                    animation: Animation::Automatic,
                },
                BatchOperation::ReloadSections { sections: vec![2], animation: Animation::Middle },
                BatchOperation::DeleteRows {
                    rows: vec![IndexPath::new(2, 2)],
                    animation: Animation::SlideLeft,
                },
                BatchOperation::InsertRows {
                    rows: vec![IndexPath::new(0, 1), IndexPath::new(1, 0)],
                    animation: Animation::Fade,
                },
                BatchOperation::InsertRows {
                    rows: vec![IndexPath::new(0, 0)],
                    animation: Animation::Automatic,
                },
                BatchOperation::MoveRow {
                    from: IndexPath::new(0, 5),
                    to: IndexPath::new(3, 0),
                    animation: Animation::None,
                },
                BatchOperation::ReloadRows {
                    rows: vec![IndexPath::new(0, 3)],
                    animation: Animation::Automatic,
                },
            ]
        );
        assert_eq!(operations[0].animation(), Animation::Fade);

        batch.clear();
        assert!(batch.is_empty());
    }
}
