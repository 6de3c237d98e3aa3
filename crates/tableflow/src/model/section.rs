//! Sections: ordered rows plus pending row changes.
//!
//! A [`Section`] holds the committed rows a view currently displays together
//! with a [`RowModification`] describing what should change on the next
//! commit. Every mutation only records intent; the rows themselves change
//! when the owning [`ContentAdapter`](super::ContentAdapter) commits.
//!
//! Sections are shared handles. Cloning a section clones the handle, and two
//! handles compare equal when they refer to the same section.
//!
//! # Example
//!
//! ```
//! use tableflow::model::{Animation, Item, Section};
//!
//! let section = Section::new();
//! section.add(Item::new("first"), Animation::Fade);
//! section.add(Item::new("second"), Animation::Fade);
//!
//! // Nothing is committed yet.
//! assert_eq!(section.row_count(), 0);
//! assert_eq!(section.resolved_row_count(), 2);
//! assert!(section.has_pending_changes());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tableflow_core::Signal;
use tableflow_core::logging::{PerfSpan, span_names, targets};

use super::animation::Animation;
use super::cell_modifications::ResolvedRows;
use super::index::IndexPath;
use super::item::{Content, Item};
use super::row_modification::{MovedRow, RowModification};

static NEXT_SECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(u64);

impl SectionId {
    fn next() -> Self {
        Self(NEXT_SECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "section#{}", self.0)
    }
}

/// Decides whether a row may join a section.
pub type RowPredicate = Arc<dyn Fn(&Item) -> bool + Send + Sync>;

/// Routing data attached to a section.
///
/// The adapter hands the context to its section initializer, and the routing
/// adapter stores whatever a classifier decided when it created the section.
#[derive(Clone, Default)]
pub struct SectionContext {
    /// Optional title, e.g. for a header.
    pub title: Option<String>,
    /// Optional caller-defined tag identifying the section.
    pub tag: Option<Item>,
    /// Optional membership predicate for rows added with [`Section::add`].
    pub predicate: Option<RowPredicate>,
}

impl SectionContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the tag.
    pub fn with_tag(mut self, tag: impl Content) -> Self {
        self.tag = Some(Item::new(tag));
        self
    }

    /// Sets the membership predicate.
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Item) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Returns the tag downcast to `T`.
    pub fn tag_as<T: Any>(&self) -> Option<&T> {
        self.tag.as_ref().and_then(Item::downcast_ref)
    }
}

impl fmt::Debug for SectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionContext")
            .field("title", &self.title)
            .field("tag", &self.tag)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Signals emitted by a section.
pub struct SectionSignals {
    /// Emitted after any row mutation was recorded.
    pub rows_changed: Signal<()>,
    /// Emitted by [`Section::set_needs_update`] with the requested flag.
    pub needs_reload: Signal<bool>,
    /// Emitted after a commit applied this section's pending rows, with the
    /// new row count.
    pub rows_resolved: Signal<usize>,
}

impl SectionSignals {
    fn new() -> Self {
        Self {
            rows_changed: Signal::new(),
            needs_reload: Signal::new(),
            rows_resolved: Signal::new(),
        }
    }
}

#[derive(Default)]
struct SectionState {
    rows: Vec<Item>,
    header: Option<Item>,
    footer: Option<Item>,
    modification: RowModification,
    context: SectionContext,
}

struct SectionInner {
    id: SectionId,
    state: RwLock<SectionState>,
    signals: SectionSignals,
}

/// An ordered list of rows with pending modifications.
#[derive(Clone)]
pub struct Section {
    inner: Arc<SectionInner>,
}

/// A weak handle to a [`Section`].
#[derive(Clone)]
pub struct WeakSection {
    inner: Weak<SectionInner>,
}

impl WeakSection {
    /// Returns the section if it is still alive.
    pub fn upgrade(&self) -> Option<Section> {
        self.inner.upgrade().map(|inner| Section { inner })
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::new()
    }
}

impl Section {
    /// Creates an empty section.
    pub fn new() -> Self {
        Self::from_state(SectionState::default())
    }

    /// Creates an empty section carrying `context`.
    pub fn with_context(context: SectionContext) -> Self {
        Self::from_state(SectionState {
            context,
            ..SectionState::default()
        })
    }

    /// Creates a section whose committed rows are `rows`.
    ///
    /// The rows count as already displayed; no insert is recorded for them.
    pub fn with_rows<I>(rows: I) -> Self
    where
        I: IntoIterator,
        I::Item: Content,
    {
        Self::from_state(SectionState {
            rows: rows.into_iter().map(Item::new).collect(),
            ..SectionState::default()
        })
    }

    fn from_state(state: SectionState) -> Self {
        Self {
            inner: Arc::new(SectionInner {
                id: SectionId::next(),
                state: RwLock::new(state),
                signals: SectionSignals::new(),
            }),
        }
    }

    /// Returns this section's identity.
    pub fn id(&self) -> SectionId {
        self.inner.id
    }

    /// Returns the section's signals.
    pub fn signals(&self) -> &SectionSignals {
        &self.inner.signals
    }

    /// Creates a weak handle.
    pub fn downgrade(&self) -> WeakSection {
        WeakSection {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// Returns the committed rows.
    pub fn rows(&self) -> Vec<Item> {
        self.inner.state.read().rows.clone()
    }

    /// Returns the committed row at `index`.
    pub fn row(&self, index: usize) -> Option<Item> {
        self.inner.state.read().rows.get(index).cloned()
    }

    /// Returns the number of committed rows.
    pub fn row_count(&self) -> usize {
        self.inner.state.read().rows.len()
    }

    /// Returns `true` if no rows are committed.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Returns the rows as they will be after the next commit.
    pub fn resolved_rows(&self) -> Vec<Item> {
        let state = self.inner.state.read();
        let mut rows = state.rows.clone();
        state.modification.apply(&mut rows);
        rows
    }

    /// Returns the number of rows after the next commit.
    pub fn resolved_row_count(&self) -> usize {
        let state = self.inner.state.read();
        state.modification.resolved_len(state.rows.len())
    }

    /// Returns `true` if row changes are waiting for a commit.
    pub fn has_pending_changes(&self) -> bool {
        !self.inner.state.read().modification.is_empty()
    }

    /// Returns a snapshot of the pending row changes.
    pub fn pending(&self) -> RowModification {
        self.inner.state.read().modification.clone()
    }

    /// Returns the header content.
    pub fn header(&self) -> Option<Item> {
        self.inner.state.read().header.clone()
    }

    /// Returns the footer content.
    pub fn footer(&self) -> Option<Item> {
        self.inner.state.read().footer.clone()
    }

    /// Sets the header content.
    pub fn set_header(&self, header: impl Content) {
        self.inner.state.write().header = Some(Item::new(header));
    }

    /// Sets the footer content.
    pub fn set_footer(&self, footer: impl Content) {
        self.inner.state.write().footer = Some(Item::new(footer));
    }

    /// Removes the header.
    pub fn clear_header(&self) {
        self.inner.state.write().header = None;
    }

    /// Removes the footer.
    pub fn clear_footer(&self) {
        self.inner.state.write().footer = None;
    }

    /// Returns the routing context.
    pub fn context(&self) -> SectionContext {
        self.inner.state.read().context.clone()
    }

    /// Replaces the routing context.
    pub fn set_context(&self, context: SectionContext) {
        self.inner.state.write().context = context;
    }

    /// Sets the membership predicate used by [`add`](Self::add) and
    /// [`insert`](Self::insert).
    pub fn set_predicate<F>(&self, predicate: F)
    where
        F: Fn(&Item) -> bool + Send + Sync + 'static,
    {
        self.inner.state.write().context.predicate = Some(Arc::new(predicate));
    }

    /// Returns `true` if `row` passes the membership predicate.
    ///
    /// Sections without a predicate accept everything.
    pub fn accepts(&self, row: &Item) -> bool {
        let predicate = self.inner.state.read().context.predicate.clone();
        predicate.is_none_or(|predicate| predicate(row))
    }

    /// Returns the first committed row of type `T` matching `predicate`.
    pub fn content_where<T, F>(&self, predicate: F) -> Option<T>
    where
        T: Any + Clone,
        F: Fn(&T) -> bool,
    {
        self.inner
            .state
            .read()
            .rows
            .iter()
            .filter_map(Item::downcast_ref::<T>)
            .find(|content| predicate(content))
            .cloned()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Appends `row` after every row the section will hold.
    ///
    /// Rows rejected by the membership predicate are ignored.
    pub fn add(&self, row: impl Content, animation: Animation) {
        let row = Item::new(row);
        if !self.accepts(&row) {
            tracing::trace!(
                target: targets::SECTION,
                section = %self.id(),
                ?row,
                "row rejected by predicate"
            );
            return;
        }
        {
            let mut state = self.inner.state.write();
            let index = state.modification.resolved_len(state.rows.len());
            state.modification.insert(row, index, animation);
        }
        self.rows_changed();
    }

    /// Inserts `row` at final position `index`.
    ///
    /// Ignored if the predicate rejects the row or `index` is past the end of
    /// the resolved rows.
    pub fn insert(&self, row: impl Content, index: usize, animation: Animation) {
        let row = Item::new(row);
        if !self.accepts(&row) {
            tracing::trace!(
                target: targets::SECTION,
                section = %self.id(),
                ?row,
                "row rejected by predicate"
            );
            return;
        }
        {
            let mut state = self.inner.state.write();
            let len = state.modification.resolved_len(state.rows.len());
            if index > len {
                tracing::trace!(
                    target: targets::SECTION,
                    section = %self.id(),
                    index,
                    len,
                    "insert out of range"
                );
                return;
            }
            state.modification.insert(row, index, animation);
        }
        self.rows_changed();
    }

    /// Deletes the first row equal to `row`.
    ///
    /// Committed rows are searched first, skipping rows already leaving; a
    /// matching pending insert is cancelled otherwise.
    pub fn delete(&self, row: &Item, animation: Animation) {
        {
            let mut state = self.inner.state.write();
            let SectionState { rows, modification, .. } = &mut *state;
            let committed = rows
                .iter()
                .enumerate()
                .position(|(index, candidate)| candidate == row && !modification.is_leaving(index));
            let pending = modification
                .inserts()
                .find(|(_, content, _)| *content == row)
                .map(|(index, _, _)| index);
            if let Some(index) = committed {
                modification.delete_committed(index, animation);
            } else if let Some(index) = pending {
                modification.cancel_insert(index);
            } else {
                tracing::trace!(
                    target: targets::SECTION,
                    section = %self.id(),
                    ?row,
                    "delete of unknown row"
                );
                return;
            }
        }
        self.rows_changed();
    }

    /// Deletes the row at `index`.
    ///
    /// A pending insert at `index` is cancelled instead. Ignored if `index`
    /// is neither a committed row nor a pending insert.
    pub fn delete_at(&self, index: usize, animation: Animation) {
        {
            let mut state = self.inner.state.write();
            if index >= state.rows.len() && !state.modification.has_insert(index) {
                tracing::trace!(
                    target: targets::SECTION,
                    section = %self.id(),
                    index,
                    "delete out of range"
                );
                return;
            }
            state.modification.delete(index, animation);
        }
        self.rows_changed();
    }

    /// Reloads the first committed row equal to `row`.
    pub fn reload(&self, row: &Item, animation: Animation) {
        let index = self.inner.state.read().rows.iter().position(|candidate| candidate == row);
        match index {
            Some(index) => self.reload_at(index, animation),
            None => tracing::trace!(
                target: targets::SECTION,
                section = %self.id(),
                ?row,
                "reload of unknown row"
            ),
        }
    }

    /// Reloads the row at `index`.
    ///
    /// A committed row at `index` is reloaded even if an insert is pending
    /// at the same position. Past the committed rows, a reload of a pending
    /// insert is suppressed.
    pub fn reload_at(&self, index: usize, animation: Animation) {
        self.record_reload(None, index, animation);
    }

    /// Replaces the content of the row at `index` and reloads it.
    ///
    /// Past the committed rows, the content of the pending insert at `index`
    /// is replaced instead.
    pub fn replace_at(&self, row: impl Content, index: usize, animation: Animation) {
        self.record_reload(Some(Item::new(row)), index, animation);
    }

    fn record_reload(&self, row: Option<Item>, index: usize, animation: Animation) {
        {
            let mut state = self.inner.state.write();
            if index < state.rows.len() {
                state.modification.reload_committed(row, index, animation);
            } else if state.modification.has_insert(index) {
                state.modification.reload(row, index, animation);
            } else {
                tracing::trace!(
                    target: targets::SECTION,
                    section = %self.id(),
                    index,
                    "reload out of range"
                );
                return;
            }
        }
        self.rows_changed();
    }

    /// Deletes every row.
    ///
    /// Pending changes are discarded first, then every committed row is
    /// deleted with `animation`.
    pub fn clear(&self, animation: Animation) {
        {
            let mut state = self.inner.state.write();
            let count = state.rows.len();
            state.modification.clear();
            for index in 0..count {
                state.modification.delete_committed(index, animation);
            }
        }
        self.rows_changed();
    }

    /// Asks the owning adapter to reload (or stop reloading) this whole
    /// section on the next commit.
    pub fn set_needs_update(&self, needs_update: bool) {
        self.inner.signals.needs_reload.emit(needs_update);
    }

    fn rows_changed(&self) {
        self.inner.signals.rows_changed.emit(());
    }

    // =========================================================================
    // Commit support
    // =========================================================================

    /// Returns `true` if `index` is a committed row or a pending insert.
    pub(crate) fn contains_index(&self, index: usize) -> bool {
        let state = self.inner.state.read();
        index < state.rows.len() || state.modification.has_insert(index)
    }

    /// Records a move of the row at `index` to `to`.
    ///
    /// A committed row at `index` leaves on the next commit. Past the
    /// committed rows, the pending insert at `index` is cancelled and its
    /// content returned for the caller to insert at the target.
    pub(crate) fn take_for_move(
        &self,
        index: usize,
        to: IndexPath,
        animation: Animation,
    ) -> Option<Item> {
        let taken = {
            let mut state = self.inner.state.write();
            if index < state.rows.len() {
                state.modification.move_committed(index, to, animation);
                None
            } else {
                state.modification.cancel_insert(index)
            }
        };
        self.rows_changed();
        taken
    }

    /// Committed rows leaving by move, with `from.section` set to
    /// `section_index`.
    pub(crate) fn outgoing_moves(&self, section_index: usize) -> Vec<MovedRow> {
        let state = self.inner.state.read();
        state
            .modification
            .moves()
            .filter_map(|(index, to, animation)| {
                state.rows.get(index).map(|content| MovedRow {
                    from: IndexPath::new(section_index, index),
                    to,
                    content: content.clone(),
                    animation,
                })
            })
            .collect()
    }

    /// Keeps the committed row at `index` in place instead of moving it.
    pub(crate) fn cancel_move(&self, index: usize) {
        self.inner.state.write().modification.cancel_move(index);
    }

    /// Applies the pending rows as section `section_index` together with the
    /// rows `arrivals` moved into it, and clears them.
    ///
    /// Arrivals are placed after every other pending change, by ascending
    /// target row clamped to the resolved rows. Returns what changed, or
    /// `None` if nothing was pending or arriving. Emits nothing; the caller
    /// reports the resolution once its own state is consistent.
    pub(crate) fn resolve(
        &self,
        section_index: usize,
        mut arrivals: Vec<MovedRow>,
    ) -> Option<ResolvedRows> {
        let mut state = self.inner.state.write();
        if state.modification.is_empty() && arrivals.is_empty() {
            return None;
        }
        let _span = PerfSpan::new(span_names::RESOLVE);

        let mut pending = std::mem::take(&mut state.modification);
        arrivals.sort_by_key(|moved| (moved.to.row, moved.from));
        for moved in arrivals {
            let at = moved.to.row.min(pending.resolved_len(state.rows.len()));
            pending.receive(moved.content, at, moved.from, moved.animation);
        }

        let path = |index: usize| IndexPath::new(section_index, index);
        let resolved = ResolvedRows {
            insert: pending
                .inserts()
                .map(|(index, _, animation)| (path(index), animation))
                .collect(),
            delete: pending
                .deletes()
                .map(|(index, animation)| (path(index), animation))
                .collect(),
            reload: pending
                .reloads()
                .filter(|(index, _, _)| *index < state.rows.len())
                .map(|(index, _, animation)| (path(index), animation))
                .collect(),
            moved: pending
                .arrivals()
                .map(|(index, from, content, animation)| MovedRow {
                    from,
                    to: path(index),
                    content: content.clone(),
                    animation,
                })
                .collect(),
        };
        pending.apply(&mut state.rows);

        tracing::trace!(
            target: targets::SECTION,
            section = %self.id(),
            section_index,
            rows = state.rows.len(),
            arrived = resolved.moved.len(),
            "resolved pending rows"
        );
        Some(resolved)
    }

    /// Drops every pending row change without applying it.
    pub(crate) fn discard_pending(&self) {
        self.inner.state.write().modification.clear();
    }
}

impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Section {}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("Section")
            .field("id", &self.inner.id)
            .field("rows", &state.rows.len())
            .field("pending", &!state.modification.is_empty())
            .field("title", &state.context.title)
            .finish()
    }
}

static_assertions::assert_impl_all!(Section: Send, Sync);
