//! Integration tests for content routing.

use std::sync::Arc;

use parking_lot::Mutex;
use tableflow::model::{
    AdapterConfig, CellModifications, DynamicContentAdapter, RoutingDecision, Section,
    SectionContext,
};

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    key: char,
    value: u32,
}

fn entry(key: char, value: u32) -> Entry {
    Entry { key, value }
}

fn by_key(entry: &Entry, sections: &[Section]) -> RoutingDecision {
    sections
        .iter()
        .position(|section| section.context().tag_as::<char>() == Some(&entry.key))
        .map(RoutingDecision::UseExistingSection)
        .unwrap_or_else(|| {
            let context = SectionContext::new().with_tag(entry.key).with_title(entry.key);
            RoutingDecision::AppendNewSection(context)
        })
}

fn contents(section: &Section) -> Vec<Entry> {
    section
        .rows()
        .iter()
        .filter_map(|row| row.downcast_ref::<Entry>().cloned())
        .collect()
}

fn keyed_adapter() -> DynamicContentAdapter<Entry> {
    let adapter = DynamicContentAdapter::new();
    adapter.set_classifier(by_key);
    adapter
}

#[test]
fn test_equal_keys_share_a_section() {
    let orders = [
        vec![entry('A', 1), entry('B', 2), entry('A', 3)],
        vec![entry('B', 2), entry('A', 1), entry('A', 3)],
        vec![entry('A', 1), entry('A', 3), entry('B', 2)],
    ];

    for order in orders {
        let adapter = keyed_adapter();
        for content in order.clone() {
            assert!(adapter.add_content(content));
        }
        assert_eq!(adapter.section_count(), 0);
        adapter.commit();

        let sections = adapter.sections();
        assert_eq!(sections.len(), 2, "{order:?}");
        let a = sections
            .iter()
            .find(|section| section.context().tag_as::<char>() == Some(&'A'))
            .expect("section for A");
        let b = sections
            .iter()
            .find(|section| section.context().tag_as::<char>() == Some(&'B'))
            .expect("section for B");
        assert_eq!(a.row_count(), 2);
        assert!(contents(a).contains(&entry('A', 1)));
        assert!(contents(a).contains(&entry('A', 3)));
        assert_eq!(contents(b), vec![entry('B', 2)]);
    }
}

#[test]
fn test_routing_across_commits() {
    let adapter = DynamicContentAdapter::with_config(AdapterConfig::new().with_auto_commit(true));
    adapter.set_classifier(by_key);
    let batches: Arc<Mutex<Vec<CellModifications>>> = Arc::default();
    let sink = batches.clone();
    adapter
        .signals()
        .committed
        .connect(move |batch| sink.lock().push(batch.clone()));

    adapter.add_content(entry('A', 1));
    adapter.add_content(entry('B', 2));
    adapter.add_content(entry('A', 3));

    assert_eq!(adapter.section_count(), 2);
    assert_eq!(contents(&adapter.sections()[0]), vec![entry('A', 1), entry('A', 3)]);

    let batches = batches.lock();
    assert_eq!(batches.len(), 3);
    assert!(batches[0].insert_sections().contains_key(&0));
    assert!(batches[1].insert_sections().contains_key(&1));
    assert_eq!(batches[2].insert_rows().len(), 1);
    assert!(batches[2].insert_sections().is_empty());
}

#[test]
fn test_sorted_rows_and_ordered_sections() {
    let adapter = keyed_adapter();
    adapter.set_sort(|a, b| b.value.cmp(&a.value));
    adapter.set_section_order(|a, b| a.context().title.cmp(&b.context().title));

    for content in [entry('C', 1), entry('A', 5), entry('C', 9), entry('B', 2), entry('A', 7)] {
        adapter.add_content(content);
    }
    adapter.commit();

    let titles: Vec<Option<String>> = adapter
        .sections()
        .iter()
        .map(|section| section.context().title)
        .collect();
    assert_eq!(
        titles,
        vec![Some("A".into()), Some("B".into()), Some("C".into())]
    );
    assert_eq!(contents(&adapter.sections()[0]), vec![entry('A', 7), entry('A', 5)]);
    assert_eq!(contents(&adapter.sections()[2]), vec![entry('C', 9), entry('C', 1)]);
}

#[test]
fn test_removing_last_entry_drops_section() {
    let adapter = keyed_adapter();
    for content in [entry('A', 1), entry('B', 2), entry('A', 3)] {
        adapter.add_content(content);
    }
    adapter.commit();

    assert!(adapter.remove_content(&entry('B', 2)));
    assert!(adapter.remove_content(&entry('A', 1)));
    assert!(!adapter.remove_content(&entry('Z', 0)));
    adapter.commit();

    assert_eq!(adapter.section_count(), 1);
    assert_eq!(contents(&adapter.sections()[0]), vec![entry('A', 3)]);
    assert_eq!(adapter.contents(), vec![entry('A', 3)]);
}

#[test]
fn test_classifier_may_insert_sections_first() {
    let adapter = DynamicContentAdapter::<Entry>::new();
    adapter.set_classifier(|entry, sections| {
        match sections
            .iter()
            .position(|section| section.context().tag_as::<char>() == Some(&entry.key))
        {
            Some(index) => RoutingDecision::UseExistingSection(index),
            None => RoutingDecision::InsertNewSection {
                index: 0,
                context: SectionContext::new().with_tag(entry.key),
            },
        }
    });

    adapter.add_content(entry('A', 1));
    adapter.add_content(entry('B', 2));
    adapter.add_content(entry('A', 3));
    adapter.commit();

    let keys: Vec<char> = adapter
        .sections()
        .iter()
        .filter_map(|section| section.context().tag_as::<char>().copied())
        .collect();
    assert_eq!(keys, vec!['B', 'A']);
    assert_eq!(adapter.sections()[1].row_count(), 2);
}
