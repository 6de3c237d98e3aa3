//! Integration tests replaying committed batches on a recycling view.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tableflow::binding::{DataSource, ListBinding, RecyclerView};
use tableflow::model::{Animation, BatchOperation, ContentAdapter, IndexPath, Section};

/// A view that only tracks row counts, the way a table view validates
/// batch updates against its data source.
#[derive(Default)]
struct ShadowTable {
    model: Mutex<Option<ContentAdapter>>,
    counts: Mutex<Vec<usize>>,
    violations: Mutex<Vec<String>>,
    batches: AtomicUsize,
}

impl ShadowTable {
    fn attach(&self, adapter: &ContentAdapter) {
        *self.counts.lock() = (0..adapter.number_of_sections())
            .map(|section| adapter.number_of_rows(section))
            .collect();
        *self.model.lock() = Some(adapter.clone());
    }

    fn rows_in_model(&self, section: usize) -> usize {
        self.model
            .lock()
            .as_ref()
            .map_or(0, |model| model.number_of_rows(section))
    }

    fn violation(&self, message: String) {
        self.violations.lock().push(message);
    }
}

impl RecyclerView for ShadowTable {
    type Cell = String;
    type HeaderFooter = String;

    fn dequeue_reusable_cell(&self, reuse_identifier: &str) -> Option<String> {
        Some(format!("{reuse_identifier}|"))
    }

    fn dequeue_reusable_header_footer(&self, _reuse_identifier: &str) -> Option<String> {
        Some(String::new())
    }

    fn perform_batch_updates(&self, operations: &[BatchOperation]) {
        self.batches.fetch_add(1, Ordering::SeqCst);
        let mut inserted = Vec::new();
        for operation in operations {
            let mut counts = self.counts.lock();
            match operation {
                BatchOperation::DeleteSections { sections, .. } => {
                    for section in sections.iter().rev() {
                        counts.remove(*section);
                    }
                }
                BatchOperation::InsertSections { sections, .. } => {
                    for section in sections {
                        let rows = self.rows_in_model(*section);
                        counts.insert(*section, rows);
                    }
                }
                BatchOperation::MoveSection { from, to, .. } => {
                    let rows = counts.remove(*from);
                    counts.insert(*to, rows);
                }
                BatchOperation::ReloadSections { sections, .. } => {
                    for section in sections {
                        counts[*section] = self.rows_in_model(*section);
                    }
                }
                BatchOperation::DeleteRows { rows, .. } => {
                    for path in rows.iter().rev() {
                        if path.row >= counts[path.section] {
                            self.violation(format!("delete of missing row {path}"));
                        }
                        counts[path.section] -= 1;
                    }
                }
                BatchOperation::InsertRows { rows, .. } => {
                    for path in rows {
                        counts[path.section] += 1;
                    }
                    inserted.extend(rows.iter().copied());
                }
                BatchOperation::MoveRow { from, to, .. } => {
                    counts[from.section] -= 1;
                    counts[to.section] += 1;
                }
                BatchOperation::ReloadRows { rows, .. } => {
                    for path in rows {
                        if path.row >= counts[path.section] {
                            self.violation(format!("reload of missing row {path}"));
                        }
                    }
                }
            }
        }

        let counts = self.counts.lock();
        for path in inserted {
            if path.row >= counts[path.section] {
                self.violation(format!("insert past the end at {path}"));
            }
        }
    }
}

fn assert_in_sync(view: &ShadowTable, adapter: &ContentAdapter) {
    let expected: Vec<usize> = (0..adapter.number_of_sections())
        .map(|section| adapter.number_of_rows(section))
        .collect();
    assert_eq!(*view.counts.lock(), expected);
    assert!(view.violations.lock().is_empty(), "{:?}", view.violations.lock());
}

#[test]
fn test_view_stays_in_sync_across_commits() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("tableflow=debug")
        .try_init();

    let s0 = Section::with_rows(["a", "b", "c"]);
    let s1 = Section::with_rows(["x"]);
    let adapter = ContentAdapter::with_sections([s0.clone(), s1.clone()]);
    let view = Arc::new(ShadowTable::default());
    view.attach(&adapter);
    let binding = ListBinding::new(view.clone());
    binding.set_content_adapter(Some(adapter.clone()));

    s0.add("d", Animation::Fade);
    s0.delete_at(0, Animation::Fade);
    s0.replace_at("B", 1, Animation::Automatic);
    s0.add("e", Animation::Fade);
    adapter.remove(&s1, Animation::Fade);
    adapter.insert(Section::with_rows(["z"]), 0);
    let tail = Section::with_rows(["n1", "n2"]);
    adapter.add(tail.clone());
    adapter.commit();

    assert_eq!(view.batches.load(Ordering::SeqCst), 2);
    assert_in_sync(&view, &adapter);
    assert_eq!(binding.number_of_rows(1), 4);

    adapter.move_row(IndexPath::new(1, 0), IndexPath::new(2, 0), Animation::Automatic);
    tail.add("n3", Animation::Automatic);
    adapter.commit();
    assert_in_sync(&view, &adapter);
    assert_eq!(binding.number_of_rows(2), 4);
}

#[test]
fn test_cells_are_built_from_committed_rows() {
    let section = Section::with_rows(["first"]);
    section.set_header(String::from("Greetings"));
    let adapter = ContentAdapter::with_sections([section.clone()]);
    let binding = ListBinding::new(Arc::new(ShadowTable::default()));
    binding.set_content_adapter(Some(adapter.clone()));
    binding.register_cell_as::<&'static str, _>("text", |cell, text| cell.push_str(text));
    binding.register_header_footer::<String, _>(|view, title| view.push_str(title));

    section.add("second", Animation::Automatic);
    assert_eq!(binding.number_of_rows(0), 1);
    assert_eq!(binding.cell_for_row(IndexPath::new(0, 1)), None);

    adapter.commit();
    let cells: Vec<String> = (0..binding.number_of_rows(0))
        .filter_map(|row| binding.cell_for_row(IndexPath::new(0, row)))
        .collect();
    assert_eq!(cells, vec!["text|first".to_owned(), "text|second".to_owned()]);
    assert_eq!(binding.header_view(0).as_deref(), Some("Greetings"));
    assert_eq!(binding.title_for_header(0).as_deref(), Some("Greetings"));
}

#[test]
fn test_detached_view_receives_nothing() {
    let adapter = ContentAdapter::new();
    let view = Arc::new(ShadowTable::default());
    let binding = ListBinding::new(view.clone());
    binding.set_content_adapter(Some(adapter.clone()));
    binding.set_content_adapter(None);

    adapter.add(Section::new());
    adapter.commit();
    assert_eq!(view.batches.load(Ordering::SeqCst), 0);
    assert_eq!(binding.number_of_sections(), 0);
    assert!(binding.content_adapter().is_none());
}
