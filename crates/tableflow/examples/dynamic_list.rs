//! Dynamic list example: time entries routed into one-minute buckets.
//!
//! A new bucket opens whenever an entry is more than a minute later than the
//! first entry of the last bucket. Rows stay sorted, and every bucket keeps
//! an "N Items" header up to date through the content-update hook.
//!
//! Run with: cargo run -p tableflow --example dynamic_list

use std::sync::Arc;

use tableflow::binding::{DataSource, ListBinding, RecyclerView};
use tableflow::model::{
    BatchOperation, DynamicContentAdapter, IndexPath, RoutingDecision, SectionContext,
    SectionOperation,
};
use tracing_subscriber::EnvFilter;

const BUCKET_SECONDS: u64 = 60;

/// A point in time, in seconds since the start of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct TimeEntry {
    seconds: u64,
}

impl TimeEntry {
    fn at(seconds: u64) -> Self {
        Self { seconds }
    }
}

struct ConsoleTable;

impl RecyclerView for ConsoleTable {
    type Cell = String;
    type HeaderFooter = String;

    fn dequeue_reusable_cell(&self, _reuse_identifier: &str) -> Option<String> {
        Some(String::from("    "))
    }

    fn perform_batch_updates(&self, operations: &[BatchOperation]) {
        for operation in operations {
            println!("~ {operation:?}");
        }
    }
}

fn print_sections(binding: &ListBinding<ConsoleTable>) {
    for section in 0..binding.number_of_sections() {
        println!("{}", binding.title_for_header(section).unwrap_or_default());
        for row in 0..binding.number_of_rows(section) {
            if let Some(cell) = binding.cell_for_row(IndexPath::new(section, row)) {
                println!("{cell}");
            }
        }
    }
    println!();
}

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tableflow=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let adapter = DynamicContentAdapter::<TimeEntry>::new();
    adapter.set_sort(|a, b| a.cmp(b));
    adapter.set_section_initializer(|section, _, _| {
        section.set_header(format!("{} Items", section.resolved_row_count()));
    });
    adapter.set_section_content_update(|section| {
        section.set_header(format!("{} Items", section.resolved_row_count()));
        SectionOperation::Nothing
    });
    adapter.set_classifier(|entry, sections| {
        let Some(last) = sections.len().checked_sub(1) else {
            return RoutingDecision::AppendNewSection(SectionContext::new());
        };
        let opened_at = sections[last]
            .resolved_rows()
            .first()
            .and_then(|row| row.downcast_ref::<TimeEntry>().copied());
        match opened_at {
            Some(first) if entry.seconds <= first.seconds + BUCKET_SECONDS => {
                RoutingDecision::UseExistingSection(last)
            }
            _ => RoutingDecision::AppendNewSection(SectionContext::new()),
        }
    });

    let binding = ListBinding::new(Arc::new(ConsoleTable));
    binding.register_cell::<TimeEntry, _>(|cell, entry| {
        cell.push_str(&format!("{:02}:{:02}", entry.seconds / 60, entry.seconds % 60));
    });
    binding.set_content_adapter(Some(adapter.adapter().clone()));

    for seconds in [5, 42, 20, 75, 130, 64] {
        adapter.add_content(TimeEntry::at(seconds));
    }
    adapter.commit();
    print_sections(&binding);

    adapter.remove_content(&TimeEntry::at(20));
    adapter.add_content(TimeEntry::at(150));
    adapter.commit();
    print_sections(&binding);
}
