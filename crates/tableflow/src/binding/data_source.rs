//! Read access to committed content.

use crate::model::{ContentAdapter, IndexPath, Item};

/// What a list widget asks of its model while drawing.
///
/// Everything here reads committed state only; pending changes are invisible
/// until the next commit.
pub trait DataSource {
    /// Number of sections.
    fn number_of_sections(&self) -> usize;

    /// Number of rows in `section`, or 0 for a missing section.
    fn number_of_rows(&self, section: usize) -> usize;

    /// The row content at `path`.
    fn item(&self, path: IndexPath) -> Option<Item>;

    /// The header content of `section`.
    fn section_header(&self, section: usize) -> Option<Item>;

    /// The footer content of `section`.
    fn section_footer(&self, section: usize) -> Option<Item>;

    /// The header as text, if it is a string.
    fn title_for_header(&self, section: usize) -> Option<String> {
        self.section_header(section)
            .and_then(|header| header.as_str().map(str::to_owned))
    }

    /// The footer as text, if it is a string.
    fn title_for_footer(&self, section: usize) -> Option<String> {
        self.section_footer(section)
            .and_then(|footer| footer.as_str().map(str::to_owned))
    }
}

impl DataSource for ContentAdapter {
    fn number_of_sections(&self) -> usize {
        self.section_count()
    }

    fn number_of_rows(&self, section: usize) -> usize {
        self.section(section).map_or(0, |section| section.row_count())
    }

    fn item(&self, path: IndexPath) -> Option<Item> {
        self.section(path.section).and_then(|section| section.row(path.row))
    }

    fn section_header(&self, section: usize) -> Option<Item> {
        self.section(section).and_then(|section| section.header())
    }

    fn section_footer(&self, section: usize) -> Option<Item> {
        self.section(section).and_then(|section| section.footer())
    }
}

/// Returns the committed position of the first row equal to `item`.
pub fn index_path_of(adapter: &ContentAdapter, item: &Item) -> Option<IndexPath> {
    adapter
        .sections()
        .iter()
        .enumerate()
        .find_map(|(index, section)| {
            section
                .rows()
                .iter()
                .position(|row| row == item)
                .map(|row| IndexPath::new(index, row))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Section;

    #[test]
    fn test_adapter_reads_committed_state() {
        let section = Section::with_rows(["a", "b"]);
        section.set_header("Title");
        section.set_footer(3u8);
        let adapter = ContentAdapter::with_sections([section.clone()]);
        section.add("c", crate::model::Animation::Automatic);

        assert_eq!(adapter.number_of_sections(), 1);
        assert_eq!(adapter.number_of_rows(0), 2);
        assert_eq!(adapter.number_of_rows(4), 0);
        assert_eq!(adapter.item(IndexPath::new(0, 1)), Some(Item::new("b")));
        assert_eq!(adapter.item(IndexPath::new(0, 2)), None);
        assert_eq!(adapter.title_for_header(0).as_deref(), Some("Title"));
        assert_eq!(adapter.title_for_footer(0), None);
        assert_eq!(adapter.section_footer(0), Some(Item::new(3u8)));
    }

    #[test]
    fn test_index_path_of() {
        let sections = [Section::with_rows(["a"]), Section::with_rows(["b", "c"])];
        let adapter = ContentAdapter::with_sections(sections);
        assert_eq!(index_path_of(&adapter, &Item::new("c")), Some(IndexPath::new(1, 1)));
        assert_eq!(index_path_of(&adapter, &Item::new("z")), None);
    }
}
