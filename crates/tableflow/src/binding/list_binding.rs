//! Binds a content adapter to a list widget.
//!
//! A [`ListBinding`] answers the widget's data-source questions from the
//! adapter's committed state, builds row and header/footer views through
//! render registries, and replays every committed batch on the widget.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use tableflow::binding::{DataSource, ListBinding, RecyclerView};
//! use tableflow::model::{Animation, BatchOperation, ContentAdapter, IndexPath, Section};
//!
//! #[derive(Default)]
//! struct Log(Mutex<Vec<usize>>);
//!
//! impl RecyclerView for Log {
//!     type Cell = String;
//!     type HeaderFooter = String;
//!
//!     fn dequeue_reusable_cell(&self, _reuse_identifier: &str) -> Option<String> {
//!         Some(String::new())
//!     }
//!
//!     fn perform_batch_updates(&self, operations: &[BatchOperation]) {
//!         self.0.lock().push(operations.len());
//!     }
//! }
//!
//! let view = Arc::new(Log::default());
//! let binding = ListBinding::new(view.clone());
//! binding.register_cell::<&'static str, _>(|cell, text| cell.push_str(text));
//!
//! let adapter = ContentAdapter::with_sections([Section::with_rows(["hello"])]);
//! binding.set_content_adapter(Some(adapter.clone()));
//!
//! assert_eq!(binding.number_of_rows(0), 1);
//! assert_eq!(binding.cell_for_row(IndexPath::new(0, 0)).as_deref(), Some("hello"));
//!
//! adapter.section(0).unwrap().add("world", Animation::Fade);
//! adapter.commit();
//! assert_eq!(*view.0.lock(), vec![1]);
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tableflow_core::ConnectionId;
use tableflow_core::logging::{PerfSpan, span_names, targets};

use super::data_source::{DataSource, index_path_of};
use super::recycler::RecyclerView;
use super::registry::RenderRegistry;
use crate::error::BindingError;
use crate::model::{CellModifications, ContentAdapter, IndexPath, Item};

struct Bound {
    adapter: ContentAdapter,
    connection: ConnectionId,
}

/// Connects one [`ContentAdapter`] to one [`RecyclerView`].
pub struct ListBinding<V: RecyclerView> {
    view: Arc<V>,
    bound: RwLock<Option<Bound>>,
    cells: RwLock<RenderRegistry<V::Cell>>,
    header_footers: RwLock<RenderRegistry<V::HeaderFooter>>,
}

impl<V: RecyclerView> ListBinding<V> {
    /// Creates a binding for `view` with no adapter.
    pub fn new(view: Arc<V>) -> Self {
        Self {
            view,
            bound: RwLock::new(None),
            cells: RwLock::new(RenderRegistry::new()),
            header_footers: RwLock::new(RenderRegistry::new()),
        }
    }

    /// The bound widget.
    pub fn view(&self) -> &Arc<V> {
        &self.view
    }

    /// The bound adapter, if any.
    pub fn content_adapter(&self) -> Option<ContentAdapter> {
        self.bound.read().as_ref().map(|bound| bound.adapter.clone())
    }

    /// Binds `adapter`, replacing the previous one.
    ///
    /// The widget stops receiving batches from the previous adapter and
    /// receives every batch the new one commits from now on. The widget is
    /// expected to reload itself after a swap; nothing is replayed for the
    /// content the new adapter already holds.
    pub fn set_content_adapter(&self, adapter: Option<ContentAdapter>) {
        let mut bound = self.bound.write();
        if let Some(previous) = bound.take() {
            previous.adapter.signals().committed.disconnect(previous.connection);
        }

        *bound = adapter.map(|adapter| {
            let view: Weak<V> = Arc::downgrade(&self.view);
            let connection = adapter.signals().committed.connect(move |batch| {
                if let Some(view) = view.upgrade() {
                    replay(view.as_ref(), batch);
                }
            });
            tracing::debug!(
                target: targets::BINDING,
                sections = adapter.section_count(),
                "bound content adapter"
            );
            Bound { adapter, connection }
        });
    }

    /// Registers a row recipe for content of type `T`, reused under the
    /// type's short name.
    pub fn register_cell<T, F>(&self, assemble: F)
    where
        T: 'static,
        F: Fn(&mut V::Cell, &T) + Send + Sync + 'static,
    {
        self.cells.write().register::<T, F>(assemble);
    }

    /// Registers a row recipe for content of type `T` under
    /// `reuse_identifier`.
    pub fn register_cell_as<T, F>(&self, reuse_identifier: impl Into<String>, assemble: F)
    where
        T: 'static,
        F: Fn(&mut V::Cell, &T) + Send + Sync + 'static,
    {
        self.cells.write().register_as::<T, F>(reuse_identifier, assemble);
    }

    /// Registers a header/footer recipe for content of type `T`.
    pub fn register_header_footer<T, F>(&self, assemble: F)
    where
        T: 'static,
        F: Fn(&mut V::HeaderFooter, &T) + Send + Sync + 'static,
    {
        self.header_footers.write().register::<T, F>(assemble);
    }

    /// Registers a header/footer recipe for content of type `T` under
    /// `reuse_identifier`.
    pub fn register_header_footer_as<T, F>(&self, reuse_identifier: impl Into<String>, assemble: F)
    where
        T: 'static,
        F: Fn(&mut V::HeaderFooter, &T) + Send + Sync + 'static,
    {
        self.header_footers
            .write()
            .register_as::<T, F>(reuse_identifier, assemble);
    }

    /// Builds the row view for `path`.
    ///
    /// Returns `None` on any failure; see [`try_cell_for_row`](Self::try_cell_for_row)
    /// for the reason.
    pub fn cell_for_row(&self, path: IndexPath) -> Option<V::Cell> {
        match self.try_cell_for_row(path) {
            Ok(cell) => Some(cell),
            Err(error) => {
                tracing::warn!(target: targets::BINDING, %path, %error, "cannot build cell");
                None
            }
        }
    }

    /// Builds the row view for `path`.
    pub fn try_cell_for_row(&self, path: IndexPath) -> Result<V::Cell, BindingError> {
        let item = self.committed_item(path)?;
        let cells = self.cells.read();
        let reuse_identifier =
            cells
                .reuse_identifier_for(&item)
                .ok_or_else(|| BindingError::UnregisteredContent {
                    type_name: item.content_type().name(),
                })?;
        let mut cell = self
            .view
            .dequeue_reusable_cell(reuse_identifier)
            .ok_or_else(|| BindingError::NoReusableView {
                reuse_identifier: reuse_identifier.to_owned(),
            })?;
        cells.assemble(&mut cell, &item);
        Ok(cell)
    }

    /// Builds the header view of `section`, if it has header content with
    /// a registered recipe.
    pub fn header_view(&self, section: usize) -> Option<V::HeaderFooter> {
        self.section_header(section)
            .and_then(|header| self.header_footer_for(&header))
    }

    /// Builds the footer view of `section`, if it has footer content with
    /// a registered recipe.
    pub fn footer_view(&self, section: usize) -> Option<V::HeaderFooter> {
        self.section_footer(section)
            .and_then(|footer| self.header_footer_for(&footer))
    }

    /// Committed position of the first row equal to `item`.
    pub fn index_path_of(&self, item: &Item) -> Option<IndexPath> {
        self.content_adapter()
            .and_then(|adapter| index_path_of(&adapter, item))
    }

    /// Asks the widget to re-measure row heights.
    pub fn update_heights(&self) {
        self.view.update_heights();
    }

    fn committed_item(&self, path: IndexPath) -> Result<Item, BindingError> {
        let adapter = self
            .content_adapter()
            .ok_or(BindingError::SectionOutOfRange {
                section: path.section,
                count: 0,
            })?;
        let section = adapter
            .section(path.section)
            .ok_or_else(|| BindingError::SectionOutOfRange {
                section: path.section,
                count: adapter.section_count(),
            })?;
        section.row(path.row).ok_or_else(|| BindingError::RowOutOfRange {
            path,
            count: section.row_count(),
        })
    }

    fn header_footer_for(&self, item: &Item) -> Option<V::HeaderFooter> {
        let registry = self.header_footers.read();
        let reuse_identifier = registry.reuse_identifier_for(item)?;
        let mut view = self.view.dequeue_reusable_header_footer(reuse_identifier)?;
        registry.assemble(&mut view, item);
        Some(view)
    }
}

fn replay<V: RecyclerView>(view: &V, batch: &CellModifications) {
    let _span = PerfSpan::new(span_names::REPLAY);
    let operations = batch.operations();
    tracing::debug!(
        target: targets::BINDING,
        operations = operations.len(),
        rows = batch.row_change_count(),
        sections = batch.section_change_count(),
        "replaying batch"
    );
    view.perform_batch_updates(&operations);
}

impl<V: RecyclerView> DataSource for ListBinding<V> {
    fn number_of_sections(&self) -> usize {
        self.content_adapter()
            .map_or(0, |adapter| adapter.number_of_sections())
    }

    fn number_of_rows(&self, section: usize) -> usize {
        self.content_adapter()
            .map_or(0, |adapter| adapter.number_of_rows(section))
    }

    fn item(&self, path: IndexPath) -> Option<Item> {
        self.content_adapter().and_then(|adapter| adapter.item(path))
    }

    fn section_header(&self, section: usize) -> Option<Item> {
        self.content_adapter()
            .and_then(|adapter| adapter.section_header(section))
    }

    fn section_footer(&self, section: usize) -> Option<Item> {
        self.content_adapter()
            .and_then(|adapter| adapter.section_footer(section))
    }
}

impl<V: RecyclerView> Drop for ListBinding<V> {
    fn drop(&mut self) {
        if let Some(bound) = self.bound.get_mut().take() {
            bound.adapter.signals().committed.disconnect(bound.connection);
        }
    }
}

impl<V: RecyclerView> fmt::Debug for ListBinding<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListBinding")
            .field("content_adapter", &self.content_adapter())
            .field("cells", &*self.cells.read())
            .field("header_footers", &*self.header_footers.read())
            .finish()
    }
}
