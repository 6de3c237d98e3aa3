//! Content-addressed sectioning.
//!
//! [`DynamicContentAdapter`] places content into sections on its own. A
//! caller-supplied classifier looks at each new piece of content and the
//! sections the adapter will hold after the next commit, and decides whether
//! the content opens a new section or joins an existing one. Rows stay sorted
//! by an optional comparator, and new sections can be kept in order by an
//! optional section comparator.
//!
//! The adapter dereferences to its [`ContentAdapter`], so commits, hooks and
//! signals are used exactly as with a plain adapter.
//!
//! # Example
//!
//! ```
//! use tableflow::model::{DynamicContentAdapter, RoutingDecision, SectionContext};
//!
//! let adapter = DynamicContentAdapter::<u32>::new();
//! // Bucket numbers by their tens digit.
//! adapter.set_classifier(|value, sections| {
//!     let bucket = value / 10;
//!     sections
//!         .iter()
//!         .position(|section| section.context().tag_as::<u32>() == Some(&bucket))
//!         .map(RoutingDecision::UseExistingSection)
//!         .unwrap_or_else(|| {
//!             RoutingDecision::AppendNewSection(SectionContext::new().with_tag(bucket))
//!         })
//! });
//! adapter.set_sort(|a, b| a.cmp(b));
//!
//! for value in [12, 31, 15, 10] {
//!     adapter.add_content(value);
//! }
//! adapter.commit();
//!
//! assert_eq!(adapter.section_count(), 2);
//! let first: Vec<u32> = adapter.sections()[0]
//!     .rows()
//!     .iter()
//!     .filter_map(|row| row.downcast_ref::<u32>().copied())
//!     .collect();
//! assert_eq!(first, vec![10, 12, 15]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tableflow_core::logging::targets;

use super::adapter::ContentAdapter;
use super::config::AdapterConfig;
use super::item::{Content, Item};
use super::section::{Section, SectionContext};

/// Where a classifier wants new content to go.
#[derive(Debug, Clone)]
pub enum RoutingDecision {
    /// Open a new section carrying `context` and append it (or place it by
    /// the section comparator, if one is set).
    AppendNewSection(SectionContext),
    /// Open a new section carrying `context` at `index`.
    InsertNewSection { index: usize, context: SectionContext },
    /// Add to the section at this index of the sections passed to the
    /// classifier.
    UseExistingSection(usize),
}

/// Decides where content goes, given the sections the adapter will hold
/// after the next commit.
pub type Classifier<T> = Arc<dyn Fn(&T, &[Section]) -> RoutingDecision + Send + Sync>;

/// Orders content within a section.
pub type RowOrder<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Orders sections created by routing.
pub type SectionOrder = Arc<dyn Fn(&Section, &Section) -> Ordering + Send + Sync>;

struct Routing<T> {
    classifier: Option<Classifier<T>>,
    sort: Option<RowOrder<T>>,
    section_order: Option<SectionOrder>,
}

impl<T> Default for Routing<T> {
    fn default() -> Self {
        Self {
            classifier: None,
            sort: None,
            section_order: None,
        }
    }
}

impl<T> Clone for Routing<T> {
    fn clone(&self) -> Self {
        Self {
            classifier: self.classifier.clone(),
            sort: self.sort.clone(),
            section_order: self.section_order.clone(),
        }
    }
}

/// A content adapter that routes content of type `T` into sections.
pub struct DynamicContentAdapter<T> {
    adapter: ContentAdapter,
    routing: RwLock<Routing<T>>,
    contents: Mutex<Vec<T>>,
    default_section: Mutex<Option<Section>>,
}

impl<T> Deref for DynamicContentAdapter<T> {
    type Target = ContentAdapter;

    fn deref(&self) -> &Self::Target {
        &self.adapter
    }
}

impl<T: Content + PartialEq + Clone> Default for DynamicContentAdapter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Content + PartialEq + Clone> DynamicContentAdapter<T> {
    /// Creates an adapter with the default configuration.
    pub fn new() -> Self {
        Self::with_config(AdapterConfig::default())
    }

    /// Creates an adapter with `config`.
    pub fn with_config(config: AdapterConfig) -> Self {
        Self {
            adapter: ContentAdapter::with_config(config),
            routing: RwLock::new(Routing::default()),
            contents: Mutex::new(Vec::new()),
            default_section: Mutex::new(None),
        }
    }

    /// Returns the underlying content adapter.
    pub fn adapter(&self) -> &ContentAdapter {
        &self.adapter
    }

    /// Sets the classifier.
    ///
    /// Without one, all content goes into a single section created on
    /// demand.
    pub fn set_classifier<F>(&self, classifier: F)
    where
        F: Fn(&T, &[Section]) -> RoutingDecision + Send + Sync + 'static,
    {
        self.routing.write().classifier = Some(Arc::new(classifier));
    }

    /// Sets the comparator keeping rows of type `T` sorted within a section.
    pub fn set_sort<F>(&self, sort: F)
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.routing.write().sort = Some(Arc::new(sort));
    }

    /// Sets the comparator placing new sections among existing ones.
    ///
    /// Existing sections must already be in this order; new sections are
    /// placed by binary search.
    pub fn set_section_order<F>(&self, order: F)
    where
        F: Fn(&Section, &Section) -> Ordering + Send + Sync + 'static,
    {
        self.routing.write().section_order = Some(Arc::new(order));
    }

    /// Returns every content added and not removed, in insertion order.
    pub fn contents(&self) -> Vec<T> {
        self.contents.lock().clone()
    }

    /// Returns `true` if `content` was added and not removed.
    pub fn contains(&self, content: &T) -> bool {
        self.contents.lock().contains(content)
    }

    /// Routes `content` into a section.
    ///
    /// Returns `false` if the content was not placed: the classifier pointed
    /// at a missing section or the section's predicate rejected it.
    pub fn add_content(&self, content: T) -> bool {
        let routing = self.routing.read().clone();
        self.adapter.batch_updates(|| {
            let item = Item::new(content.clone());
            let added = match &routing.classifier {
                None => {
                    let section = self.default_section();
                    self.insert_sorted(&section, item, &content, &routing)
                }
                Some(classify) => {
                    let sections = self.adapter.total_sections();
                    let decision = classify(&content, &sections);
                    tracing::trace!(
                        target: targets::ROUTING,
                        ?content,
                        ?decision,
                        "routing content"
                    );
                    match decision {
                        RoutingDecision::AppendNewSection(context) => {
                            self.open_section(item, &content, context, None, &sections, &routing)
                        }
                        RoutingDecision::InsertNewSection { index, context } => self.open_section(
                            item,
                            &content,
                            context,
                            Some(index),
                            &sections,
                            &routing,
                        ),
                        RoutingDecision::UseExistingSection(index) => match sections.get(index) {
                            Some(section) => self.insert_sorted(section, item, &content, &routing),
                            None => {
                                tracing::debug!(
                                    target: targets::ROUTING,
                                    index,
                                    count = sections.len(),
                                    "classifier chose a missing section"
                                );
                                false
                            }
                        },
                    }
                }
            };
            if added {
                self.contents.lock().push(content);
            }
            added
        })
    }

    /// Removes `content` from the section holding it.
    ///
    /// A section left without rows is removed as well. Returns `false` if the
    /// content was never added or no section holds it any more; it stays
    /// tracked in that case.
    pub fn remove_content(&self, content: &T) -> bool {
        if !self.contains(content) {
            tracing::trace!(target: targets::ROUTING, ?content, "remove of unknown content");
            return false;
        }
        let item = Item::new(content.clone());
        let holder = self
            .adapter
            .total_sections()
            .into_iter()
            .find(|section| section.resolved_rows().contains(&item));
        let Some(section) = holder else {
            tracing::debug!(target: targets::ROUTING, ?content, "content not found in any section");
            return false;
        };
        {
            let mut contents = self.contents.lock();
            if let Some(position) = contents.iter().position(|candidate| candidate == content) {
                contents.remove(position);
            }
        }

        let config = self.adapter.config();
        self.adapter.batch_updates(|| {
            section.delete(&item, config.default_row_animation);
            if section.resolved_row_count() == 0 {
                tracing::trace!(
                    target: targets::ROUTING,
                    section = %section.id(),
                    "removing emptied section"
                );
                self.adapter.remove(&section, config.default_section_animation);
                let mut default_section = self.default_section.lock();
                if default_section.as_ref() == Some(&section) {
                    *default_section = None;
                }
            }
        });
        true
    }

    fn default_section(&self) -> Section {
        let mut slot = self.default_section.lock();
        if let Some(section) = slot.as_ref()
            && self.adapter.total_sections().contains(section)
        {
            return section.clone();
        }
        let section = Section::new();
        *slot = Some(section.clone());
        drop(slot);
        self.adapter.add(section.clone());
        section
    }

    fn open_section(
        &self,
        item: Item,
        content: &T,
        context: SectionContext,
        index: Option<usize>,
        sections: &[Section],
        routing: &Routing<T>,
    ) -> bool {
        let section = Section::with_context(context);
        if !section.accepts(&item) {
            tracing::debug!(
                target: targets::ROUTING,
                ?content,
                "new section rejects its own content"
            );
            return false;
        }

        let index = index.or_else(|| {
            routing.section_order.as_ref().map(|order| {
                sections.partition_point(|existing| order(existing, &section) != Ordering::Greater)
            })
        });
        match index {
            Some(index) => self.adapter.insert(section.clone(), index),
            None => self.adapter.add(section.clone()),
        }
        self.insert_sorted(&section, item, content, routing)
    }

    fn insert_sorted(
        &self,
        section: &Section,
        item: Item,
        content: &T,
        routing: &Routing<T>,
    ) -> bool {
        if !section.accepts(&item) {
            tracing::trace!(
                target: targets::ROUTING,
                section = %section.id(),
                ?content,
                "section rejects content"
            );
            return false;
        }
        let rows = section.resolved_rows();
        let position = routing
            .sort
            .as_ref()
            .and_then(|order| {
                rows.iter().position(|row| {
                    row.downcast_ref::<T>()
                        .is_some_and(|row| order(row, content) == Ordering::Greater)
                })
            })
            .unwrap_or(rows.len());
        section.insert(item, position, self.adapter.config().default_row_animation);
        true
    }
}

impl<T> fmt::Debug for DynamicContentAdapter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicContentAdapter")
            .field("adapter", &self.adapter)
            .field("contents", &self.contents.lock().len())
            .finish()
    }
}
