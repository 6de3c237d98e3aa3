//! Property-based tests for pending row modifications.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use proptest::prelude::*;
use tableflow::model::{
    Animation, CellModifications, ContentAdapter, IndexPath, Item, RowModification, Section,
};

// =============================================================================
// Test helpers
// =============================================================================

#[derive(Clone, Debug)]
enum RowOp {
    Add,
    Insert { pos_pct: f64 },
    DeleteAt { pos_pct: f64 },
    DeleteValue { pos_pct: f64 },
    ReloadAt { pos_pct: f64 },
    ReplaceAt { pos_pct: f64 },
    Clear,
}

#[derive(Clone, Debug)]
enum Op {
    Row { section: usize, op: RowOp },
    Move { from_section: usize, from_pct: f64, to_section: usize, to_pct: f64 },
}

fn arbitrary_row_op() -> impl Strategy<Value = RowOp> {
    prop_oneof![
        3 => Just(RowOp::Add),
        3 => (0.0..=1.0f64).prop_map(|pos_pct| RowOp::Insert { pos_pct }),
        3 => (0.0..1.0f64).prop_map(|pos_pct| RowOp::DeleteAt { pos_pct }),
        1 => (0.0..1.0f64).prop_map(|pos_pct| RowOp::DeleteValue { pos_pct }),
        2 => (0.0..1.0f64).prop_map(|pos_pct| RowOp::ReloadAt { pos_pct }),
        2 => (0.0..1.0f64).prop_map(|pos_pct| RowOp::ReplaceAt { pos_pct }),
        1 => Just(RowOp::Clear),
    ]
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..2, arbitrary_row_op()).prop_map(|(section, op)| Op::Row { section, op }),
        1 => (0usize..2, 0.0..1.0f64, 0usize..2, 0.0..=1.0f64).prop_map(
            |(from_section, from_pct, to_section, to_pct)| Op::Move {
                from_section,
                from_pct,
                to_section,
                to_pct,
            }
        ),
    ]
}

fn scaled(pos_pct: f64, len: usize) -> usize {
    ((pos_pct * len as f64) as usize).min(len)
}

/// Hands out row values that were never used before.
struct Fresh(u32);

impl Fresh {
    fn next(&mut self) -> u32 {
        self.0 += 1;
        self.0
    }
}

fn apply_row_op(section: &Section, op: &RowOp, fresh: &mut Fresh) {
    let animation = Animation::Automatic;
    let span = section.row_count().max(section.resolved_row_count());
    match op {
        RowOp::Add => section.add(fresh.next(), animation),
        RowOp::Insert { pos_pct } => {
            let index = scaled(*pos_pct, section.resolved_row_count());
            section.insert(fresh.next(), index, animation)
        }
        RowOp::DeleteAt { pos_pct } => section.delete_at(scaled(*pos_pct, span), animation),
        RowOp::DeleteValue { pos_pct } => {
            let rows = section.resolved_rows();
            if let Some(row) = rows.get(scaled(*pos_pct, rows.len())) {
                section.delete(row, animation);
            }
        }
        RowOp::ReloadAt { pos_pct } => section.reload_at(scaled(*pos_pct, span), animation),
        RowOp::ReplaceAt { pos_pct } => {
            section.replace_at(fresh.next(), scaled(*pos_pct, span), animation)
        }
        RowOp::Clear => section.clear(animation),
    }
}

/// Applies `op`; returns `true` if it asked for a row move.
fn apply_op(adapter: &ContentAdapter, sections: &[Section], op: &Op, fresh: &mut Fresh) -> bool {
    match op {
        Op::Row { section, op } => {
            apply_row_op(&sections[*section], op, fresh);
            false
        }
        Op::Move { from_section, from_pct, to_section, to_pct } => {
            let source = &sections[*from_section];
            let span = source.row_count().max(source.resolved_row_count());
            let from = IndexPath::new(*from_section, scaled(*from_pct, span));
            let to_row = scaled(*to_pct, sections[*to_section].resolved_row_count());
            adapter.move_row(from, IndexPath::new(*to_section, to_row), Animation::Automatic);
            true
        }
    }
}

/// Replays the row entries of `batch` on `old` the way a list view does.
///
/// Returns, per final row, the row the view keeps on screen; `None` marks
/// rows the view asks the data source for (inserts and reloads).
fn replay(old: &[Vec<Item>], batch: &CellModifications) -> Vec<Vec<Option<Item>>> {
    let mut replayed = Vec::new();
    for (section, rows) in old.iter().enumerate() {
        let leaving = |row: usize| {
            let path = IndexPath::new(section, row);
            batch.delete_rows().contains_key(&path) || batch.moved_rows().contains_key(&path)
        };
        let survivors: Vec<Option<Item>> = rows
            .iter()
            .enumerate()
            .filter(|(row, _)| !leaving(*row))
            .map(|(row, content)| {
                let reloaded = batch.reload_rows().contains_key(&IndexPath::new(section, row));
                (!reloaded).then(|| content.clone())
            })
            .collect();

        let mut arrivals: BTreeMap<usize, Option<Item>> = BTreeMap::new();
        for path in batch.insert_rows().keys().filter(|path| path.section == section) {
            arrivals.insert(path.row, None);
        }
        for (from, (to, _)) in batch.moved_rows() {
            if to.section == section {
                let previous = arrivals.insert(to.row, Some(old[from.section][from.row].clone()));
                assert!(previous.is_none(), "two rows arrive at {to}");
            }
        }

        let mut survivors = survivors.into_iter();
        let mut shown = Vec::new();
        loop {
            let next = match arrivals.remove(&shown.len()) {
                Some(arrival) => arrival,
                None => match survivors.next() {
                    Some(survivor) => survivor,
                    None => break,
                },
            };
            shown.push(next);
        }
        assert!(arrivals.is_empty(), "rows arrive past the end: {arrivals:?}");
        replayed.push(shown);
    }
    replayed
}

fn recorder(adapter: &ContentAdapter) -> Arc<Mutex<Vec<CellModifications>>> {
    let batches = Arc::new(Mutex::new(Vec::new()));
    let sink = batches.clone();
    adapter
        .signals()
        .committed
        .connect(move |batch| sink.lock().push(batch.clone()));
    batches
}

// =============================================================================
// Tracker properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Inserts resolved in ascending order rebuild the exact insertion order.
    #[test]
    fn inserts_replay_insertion_order(positions in prop::collection::vec(0.0..=1.0f64, 0..40)) {
        let mut modification = RowModification::new();
        let mut expected: Vec<Item> = Vec::new();

        for (call, pos_pct) in positions.iter().enumerate() {
            let index = scaled(*pos_pct, expected.len());
            let content = Item::new(call as u32);
            modification.insert(content.clone(), index, Animation::Automatic);
            expected.insert(index, content);
        }

        let mut rows = Vec::new();
        modification.apply(&mut rows);
        prop_assert_eq!(modification.inserts().count(), positions.len());
        prop_assert_eq!(rows, expected);
    }

    /// An insert immediately deleted again leaves the tracker as it was.
    #[test]
    fn insert_then_delete_is_noop(
        prior in prop::collection::vec(0.0..=1.0f64, 0..20),
        pos_pct in 0.0..=1.0f64,
    ) {
        let mut modification = RowModification::new();
        for (call, pct) in prior.iter().enumerate() {
            let index = scaled(*pct, modification.inserts().count());
            modification.insert(Item::new(call as u32), index, Animation::Automatic);
        }
        let before: Vec<(usize, Item)> = modification
            .inserts()
            .map(|(index, content, _)| (index, content.clone()))
            .collect();

        let index = scaled(pos_pct, before.len());
        modification.insert(Item::new("transient"), index, Animation::Fade);
        modification.delete(index, Animation::Fade);

        let after: Vec<(usize, Item)> = modification
            .inserts()
            .map(|(index, content, _)| (index, content.clone()))
            .collect();
        prop_assert_eq!(after, before);
        prop_assert_eq!(modification.deletes().count(), 0);
    }

    /// A delete followed by an insert at the same index is a reload.
    #[test]
    fn delete_then_insert_is_reload(index in 0usize..50) {
        let mut modification = RowModification::new();
        modification.delete(index, Animation::Automatic);
        modification.insert(Item::new("x"), index, Animation::Automatic);

        prop_assert_eq!(modification.deletes().count(), 0);
        prop_assert_eq!(modification.inserts().count(), 0);
        let reloaded: Vec<usize> = modification.reloads().map(|(index, _, _)| index).collect();
        prop_assert_eq!(reloaded, vec![index]);
    }
}

// =============================================================================
// Commit properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Replaying every batch on the rows the view showed before the commit
    /// lands each surviving row exactly where the sections store it.
    #[test]
    fn committed_batches_are_consistent(
        initial in (0usize..6, 0usize..6),
        rounds in prop::collection::vec(prop::collection::vec(arbitrary_op(), 0..12), 1..4),
    ) {
        let mut fresh = Fresh(0);
        let sections: Vec<Section> = [initial.0, initial.1]
            .into_iter()
            .map(|count| Section::with_rows((0..count).map(|_| fresh.next())))
            .collect();
        let adapter = ContentAdapter::with_sections(sections.clone());
        let batches = recorder(&adapter);

        for ops in &rounds {
            let mut moved = false;
            for op in ops {
                moved |= apply_op(&adapter, &sections, op, &mut fresh);
            }
            let old: Vec<Vec<Item>> = sections.iter().map(Section::rows).collect();
            let predicted: Vec<Vec<Item>> = sections.iter().map(Section::resolved_rows).collect();
            adapter.commit();
            let stored: Vec<Vec<Item>> = sections.iter().map(Section::rows).collect();
            if !moved {
                prop_assert_eq!(&stored, &predicted);
            }

            let batch = batches.lock().last().cloned().unwrap_or_default();
            for path in batch.delete_rows().keys() {
                prop_assert!(path.row < old[path.section].len(), "delete {}", path);
                prop_assert!(!batch.moved_rows().contains_key(path), "delete of moved {}", path);
            }
            for path in batch.reload_rows().keys() {
                prop_assert!(path.row < old[path.section].len(), "reload {}", path);
                prop_assert!(!batch.delete_rows().contains_key(path), "reload of deleted {}", path);
                prop_assert!(!batch.moved_rows().contains_key(path), "reload of moved {}", path);
            }
            for (from, (to, _)) in batch.moved_rows() {
                prop_assert!(from.row < old[from.section].len(), "move from {}", from);
                prop_assert!(!batch.insert_rows().contains_key(to), "move onto insert {}", to);
            }
            for path in batch.insert_rows().keys() {
                prop_assert!(path.row < stored[path.section].len(), "insert {}", path);
            }

            let replayed = replay(&old, &batch);
            for (section, (shown, stored)) in replayed.iter().zip(&stored).enumerate() {
                prop_assert_eq!(shown.len(), stored.len(), "row count of section {}", section);
                for (row, (shown, stored)) in shown.iter().zip(stored).enumerate() {
                    if let Some(shown) = shown {
                        prop_assert_eq!(shown, stored, "row {} of section {}", row, section);
                    }
                }
            }
        }
    }
}
