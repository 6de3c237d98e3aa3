//! Time picker example: a section that shows or hides an inline picker row.
//!
//! The adapter commits automatically; every mutation call produces one
//! batch, and `batch_updates` folds a group of calls into a single one.
//!
//! Run with: cargo run -p tableflow --example time_picker

use std::sync::Arc;

use parking_lot::Mutex;
use tableflow::binding::{DataSource, ListBinding, RecyclerView};
use tableflow::model::{
    AdapterConfig, Animation, BatchOperation, ContentAdapter, IndexPath, Section,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq)]
struct SelectedTime {
    hour: u8,
    minute: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Picker {
    initial: SelectedTime,
}

/// Keeps a running total of batches and operations.
#[derive(Default)]
struct CountingTable {
    batches: Mutex<Vec<usize>>,
}

impl RecyclerView for CountingTable {
    type Cell = String;
    type HeaderFooter = String;

    fn dequeue_reusable_cell(&self, _reuse_identifier: &str) -> Option<String> {
        Some(String::new())
    }

    fn perform_batch_updates(&self, operations: &[BatchOperation]) {
        tracing::info!(operations = operations.len(), "animating");
        self.batches.lock().push(operations.len());
    }
}

struct TimePicker {
    adapter: ContentAdapter,
    section: Section,
    selected: Option<SelectedTime>,
    picker_shown: bool,
}

impl TimePicker {
    fn new() -> Self {
        let adapter = ContentAdapter::with_config(AdapterConfig::new().with_auto_commit(true));
        let section = Section::new();
        adapter.add(section.clone());
        Self {
            adapter,
            section,
            selected: None,
            picker_shown: false,
        }
    }

    fn toggle(&mut self) {
        self.picker_shown = !self.picker_shown;
        let shown = self.picker_shown;
        let selected = self.selected;
        let section = &self.section;
        self.adapter.batch_updates(|| {
            section.clear(Animation::Fade);
            section.add("Departure", Animation::None);
            match (shown, selected) {
                (true, selected) => section.add(
                    Picker {
                        initial: selected.unwrap_or(SelectedTime { hour: 9, minute: 0 }),
                    },
                    Animation::Fade,
                ),
                (false, Some(time)) => section.add(time, Animation::Fade),
                (false, None) => section.add("No time selected", Animation::Fade),
            }
        });
    }

    fn select(&mut self, time: SelectedTime) {
        self.selected = Some(time);
        if self.picker_shown {
            self.section.replace_at(Picker { initial: time }, 1, Animation::None);
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut picker = TimePicker::new();
    let view = Arc::new(CountingTable::default());
    let binding = ListBinding::new(view.clone());
    binding.register_cell::<&'static str, _>(|cell, text| cell.push_str(text));
    binding.register_cell::<Picker, _>(|cell, picker| {
        let SelectedTime { hour, minute } = picker.initial;
        cell.push_str(&format!("picker at {hour:02}:{minute:02}"));
    });
    binding.register_cell::<SelectedTime, _>(|cell, time| {
        cell.push_str(&format!("{:02}:{:02}", time.hour, time.minute));
    });
    binding.set_content_adapter(Some(picker.adapter.clone()));

    picker.toggle();
    picker.select(SelectedTime { hour: 14, minute: 30 });
    picker.toggle();

    for row in 0..binding.number_of_rows(0) {
        if let Some(cell) = binding.cell_for_row(IndexPath::new(0, row)) {
            println!("{cell}");
        }
    }
    println!("operations per batch: {:?}", view.batches.lock());
}
