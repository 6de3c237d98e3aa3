//! The content adapter: an ordered list of sections with two-phase commits.
//!
//! A [`ContentAdapter`] owns the committed list of [`Section`]s a view shows
//! and a [`SectionModification`] with pending section changes. Sections
//! report row mutations through their signals; the adapter connects to them
//! when it adopts a section and disconnects when the section leaves.
//!
//! Nothing a view can observe changes until [`ContentAdapter::commit`]. A
//! commit applies every pending change in a fixed order and emits the result
//! on [`AdapterSignals::committed`]:
//!
//! 1. Section deletions are applied and, if there were any, emitted alone as
//!    a deletion-only batch.
//! 2. Section reloads and replacements, moves and insertions are applied.
//! 3. Every section resolves its pending rows. Rows of sections that arrived
//!    in this commit are not reported; the view draws them with the section.
//! 4. The main batch is emitted, even when it is empty.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use tableflow::model::{Animation, ContentAdapter, Section};
//!
//! let adapter = ContentAdapter::new();
//! let batches = Arc::new(Mutex::new(Vec::new()));
//! let recorder = batches.clone();
//! adapter.signals().committed.connect(move |batch| recorder.lock().push(batch.clone()));
//!
//! let section = Section::new();
//! adapter.add(section.clone());
//! section.add("row", Animation::Fade);
//! adapter.commit();
//!
//! assert_eq!(adapter.section_count(), 1);
//! assert_eq!(section.row_count(), 1);
//! let batches = batches.lock();
//! assert_eq!(batches.len(), 1);
//! assert!(batches[0].insert_sections().contains_key(&0));
//! // Rows of a freshly inserted section are drawn with it.
//! assert!(batches[0].insert_rows().is_empty());
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use tableflow_core::logging::{PerfSpan, span_names, targets};
use tableflow_core::{ConnectionId, Signal};

use super::animation::Animation;
use super::cell_modifications::CellModifications;
use super::config::AdapterConfig;
use super::index::IndexPath;
use super::row_modification::MovedRow;
use super::section::{Section, SectionContext, SectionId};
use super::section_modification::SectionModification;

/// What the content-update hook wants done with a section whose rows changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionOperation {
    /// Leave the section alone.
    #[default]
    Nothing,
    /// Reload the whole section on the next commit.
    Reload,
}

/// Hook run when a section joins the adapter, with its prospective index and
/// routing context.
pub type SectionInitializer = Arc<dyn Fn(&Section, usize, &SectionContext) + Send + Sync>;

/// Hook run after a section recorded a row mutation.
pub type ContentUpdateHook = Arc<dyn Fn(&Section) -> SectionOperation + Send + Sync>;

/// Signals emitted by a [`ContentAdapter`].
pub struct AdapterSignals {
    /// Emitted for every batch a commit produces.
    pub committed: Signal<CellModifications>,
}

#[derive(Default)]
struct AdapterHooks {
    initializer: Option<SectionInitializer>,
    content_update: Option<ContentUpdateHook>,
}

struct SectionConnections {
    rows_changed: ConnectionId,
    needs_reload: ConnectionId,
}

#[derive(Default)]
struct AdapterState {
    sections: Vec<Section>,
    modification: SectionModification,
    /// Connections of every adopted section, committed or pending.
    connections: HashMap<SectionId, SectionConnections>,
}

impl AdapterState {
    fn committed_index(&self, id: SectionId) -> Option<usize> {
        self.sections.iter().position(|section| section.id() == id)
    }

    fn knows(&self, id: SectionId) -> bool {
        self.connections.contains_key(&id)
    }

    fn resolved_len(&self) -> usize {
        self.modification.resolved_len(self.sections.len())
    }

    fn release(&mut self, section: &Section) {
        if let Some(connections) = self.connections.remove(&section.id()) {
            section.signals().rows_changed.disconnect(connections.rows_changed);
            section.signals().needs_reload.disconnect(connections.needs_reload);
        }
    }

    /// The section list as it will be after the next commit, ignoring moves.
    fn total_sections(&self) -> Vec<Section> {
        let mut sections: Vec<Section> = self
            .sections
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.modification.has_delete(*index))
            .map(|(index, section)| {
                self.modification
                    .reloads()
                    .find(|(reloaded, _, _)| *reloaded == index)
                    .and_then(|(_, replacement, _)| replacement.cloned())
                    .unwrap_or_else(|| section.clone())
            })
            .collect();
        for (index, section, _) in self.modification.inserts() {
            let at = index.min(sections.len());
            sections.insert(at, section.clone());
        }
        sections
    }
}

struct AdapterShared {
    state: Mutex<AdapterState>,
    hooks: RwLock<AdapterHooks>,
    config: RwLock<AdapterConfig>,
    auto_commit_suspended: AtomicUsize,
    signals: AdapterSignals,
}

impl Drop for AdapterShared {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        let adopted: Vec<Section> = state
            .sections
            .iter()
            .chain(state.modification.incoming_sections())
            .cloned()
            .collect();
        for section in &adopted {
            state.release(section);
        }
    }
}

/// An ordered list of sections with pending section and row changes.
///
/// `ContentAdapter` is a shared handle; clones refer to the same adapter.
#[derive(Clone)]
pub struct ContentAdapter {
    shared: Arc<AdapterShared>,
}

struct SuspendAutoCommit<'a>(&'a AtomicUsize);

impl<'a> SuspendAutoCommit<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for SuspendAutoCommit<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for ContentAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentAdapter {
    /// Creates an empty adapter with the default configuration.
    pub fn new() -> Self {
        Self::with_config(AdapterConfig::default())
    }

    /// Creates an empty adapter with `config`.
    pub fn with_config(config: AdapterConfig) -> Self {
        Self {
            shared: Arc::new(AdapterShared {
                state: Mutex::new(AdapterState::default()),
                hooks: RwLock::new(AdapterHooks::default()),
                config: RwLock::new(config),
                auto_commit_suspended: AtomicUsize::new(0),
                signals: AdapterSignals {
                    committed: Signal::new(),
                },
            }),
        }
    }

    /// Creates an adapter whose committed sections are `sections`.
    ///
    /// Pending rows of the sections are applied immediately and nothing is
    /// emitted.
    pub fn with_sections<I>(sections: I) -> Self
    where
        I: IntoIterator<Item = Section>,
    {
        let adapter = Self::new();
        {
            let mut state = adapter.shared.state.lock();
            for section in sections {
                if state.knows(section.id()) {
                    continue;
                }
                section.resolve(state.sections.len(), Vec::new());
                adapter.adopt(&mut state, &section);
                state.sections.push(section);
            }
        }
        adapter
    }

    /// Returns the adapter's signals.
    pub fn signals(&self) -> &AdapterSignals {
        &self.shared.signals
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Returns the current configuration.
    pub fn config(&self) -> AdapterConfig {
        *self.shared.config.read()
    }

    /// Replaces the configuration.
    pub fn set_config(&self, config: AdapterConfig) {
        *self.shared.config.write() = config;
    }

    /// Sets whether every mutation commits implicitly.
    pub fn set_auto_commit(&self, auto_commit: bool) {
        self.shared.config.write().auto_commit = auto_commit;
    }

    /// Sets the hook run when a section joins the adapter.
    pub fn set_section_initializer<F>(&self, initializer: F)
    where
        F: Fn(&Section, usize, &SectionContext) + Send + Sync + 'static,
    {
        self.shared.hooks.write().initializer = Some(Arc::new(initializer));
    }

    /// Sets the hook run after a section recorded a row mutation.
    pub fn set_section_content_update<F>(&self, hook: F)
    where
        F: Fn(&Section) -> SectionOperation + Send + Sync + 'static,
    {
        self.shared.hooks.write().content_update = Some(Arc::new(hook));
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// Returns the committed sections.
    pub fn sections(&self) -> Vec<Section> {
        self.shared.state.lock().sections.clone()
    }

    /// Returns the committed section at `index`.
    pub fn section(&self, index: usize) -> Option<Section> {
        self.shared.state.lock().sections.get(index).cloned()
    }

    /// Returns the number of committed sections.
    pub fn section_count(&self) -> usize {
        self.shared.state.lock().sections.len()
    }

    /// Returns the committed index of `section`.
    pub fn index_of(&self, section: &Section) -> Option<usize> {
        self.shared.state.lock().committed_index(section.id())
    }

    /// Returns the sections as they will be after the next commit: committed
    /// sections without pending deletes, with replacements applied, and
    /// pending inserts at their target positions.
    pub fn total_sections(&self) -> Vec<Section> {
        self.shared.state.lock().total_sections()
    }

    /// Returns the pending section changes.
    pub fn pending(&self) -> SectionModification {
        self.shared.state.lock().modification.clone()
    }

    /// Returns `true` if any section or row change waits for a commit.
    pub fn has_pending_changes(&self) -> bool {
        let state = self.shared.state.lock();
        !state.modification.is_empty()
            || state
                .sections
                .iter()
                .chain(state.modification.incoming_sections())
                .any(Section::has_pending_changes)
    }

    // =========================================================================
    // Section mutations
    // =========================================================================

    /// Appends `section` after every section the adapter will hold.
    ///
    /// Sections already owned by this adapter are ignored.
    pub fn add(&self, section: Section) {
        let index = {
            let mut state = self.shared.state.lock();
            if state.knows(section.id()) {
                tracing::trace!(
                    target: targets::ADAPTER,
                    section = %section.id(),
                    "section already adopted"
                );
                return;
            }
            let index = state.resolved_len();
            let animation = self.config().default_section_animation;
            state.modification.insert_section(section.clone(), index, animation);
            self.adopt(&mut state, &section);
            index
        };
        self.initialize(&section, index);
        self.commit_if_auto();
    }

    /// Stores `context` on `section`, then [`add`](Self::add)s it.
    pub fn add_with_context(&self, section: Section, context: SectionContext) {
        section.set_context(context);
        self.add(section);
    }

    /// Inserts `section` at final index `index`, clamped to the number of
    /// sections the adapter will hold.
    pub fn insert(&self, section: Section, index: usize) {
        let index = {
            let mut state = self.shared.state.lock();
            if state.knows(section.id()) {
                tracing::trace!(
                    target: targets::ADAPTER,
                    section = %section.id(),
                    "section already adopted"
                );
                return;
            }
            let index = index.min(state.resolved_len());
            let animation = self.config().default_section_animation;
            state.modification.insert_section(section.clone(), index, animation);
            self.adopt(&mut state, &section);
            index
        };
        self.initialize(&section, index);
        self.commit_if_auto();
    }

    /// Stores `context` on `section`, then [`insert`](Self::insert)s it.
    pub fn insert_with_context(&self, section: Section, index: usize, context: SectionContext) {
        section.set_context(context);
        self.insert(section, index);
    }

    /// Reloads the committed `section` on the next commit.
    pub fn reload(&self, section: &Section) {
        self.queue_reload(section.id(), true);
        self.commit_if_auto();
    }

    /// Removes `section`.
    ///
    /// Removing a section that is only pending cancels its insert.
    pub fn remove(&self, section: &Section, animation: Animation) {
        {
            let mut state = self.shared.state.lock();
            let id = section.id();
            if let Some(index) = state.committed_index(id) {
                if let Some(replacement) = state.modification.delete_committed(index, animation) {
                    state.release(&replacement);
                }
            } else if let Some(index) = state.modification.pending_insert_index(id) {
                state.modification.cancel_insert(index);
                state.release(section);
            } else if let Some(index) = state.modification.replacement_index(id) {
                state.modification.delete_committed(index, animation);
                state.release(section);
            } else {
                tracing::trace!(
                    target: targets::ADAPTER,
                    section = %id,
                    "remove of unknown section"
                );
                return;
            }
        }
        self.commit_if_auto();
    }

    /// Moves `section` to final index `to`.
    pub fn move_section(&self, section: &Section, to: usize, animation: Animation) {
        {
            let mut state = self.shared.state.lock();
            let id = section.id();
            if let Some(index) = state.committed_index(id) {
                state.modification.move_section(index, Some(to), animation);
            } else if let Some(index) = state.modification.pending_insert_index(id) {
                if let Some(section) = state.modification.cancel_insert(index) {
                    let to = to.min(state.resolved_len());
                    state.modification.insert_section(section, to, animation);
                }
            } else {
                tracing::trace!(target: targets::ADAPTER, section = %id, "move of unknown section");
                return;
            }
        }
        self.commit_if_auto();
    }

    /// Moves the committed row at `from` to `to`.
    ///
    /// `from` addresses the committed sections and rows; `to` addresses the
    /// sections and rows as they will be after the commit. The row takes its
    /// target slot at commit, after the target's other pending changes, so
    /// pending inserts at or behind `to.row` end up one row later. A row that
    /// is still a pending insert is simply inserted at the target instead.
    pub fn move_row(&self, from: IndexPath, to: IndexPath, animation: Animation) {
        let (source, target) = {
            let state = self.shared.state.lock();
            (
                state.sections.get(from.section).cloned(),
                state.total_sections().get(to.section).cloned(),
            )
        };
        let (Some(source), Some(target)) = (source, target) else {
            tracing::trace!(
                target: targets::ADAPTER,
                %from,
                %to,
                "move of row between unknown sections"
            );
            return;
        };
        if !source.contains_index(from.row) {
            tracing::trace!(target: targets::ADAPTER, %from, "move of unknown row");
            return;
        }

        {
            let _suspended = SuspendAutoCommit::new(&self.shared.auto_commit_suspended);
            if let Some(content) = source.take_for_move(from.row, to, animation) {
                let row = to.row.min(target.resolved_row_count());
                target.insert(content, row, animation);
            }
        }
        self.commit_if_auto();
    }

    /// Runs `f` with auto-commit suspended, then commits once if auto-commit
    /// is enabled.
    pub fn batch_updates<R>(&self, f: impl FnOnce() -> R) -> R {
        let result = {
            let _suspended = SuspendAutoCommit::new(&self.shared.auto_commit_suspended);
            f()
        };
        self.commit_if_auto();
        result
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Applies every pending change and emits the resulting batches.
    pub fn commit(&self) {
        let _span = PerfSpan::new(span_names::COMMIT);

        let (deletions, batch, resolved) = {
            let mut state = self.shared.state.lock();
            let pending = std::mem::take(&mut state.modification);
            let mut deletions = CellModifications::new();
            let mut batch = CellModifications::new();
            let mut incoming: HashSet<SectionId> = HashSet::new();

            let deleted: Vec<(usize, Animation)> = pending.deletes().collect();
            for &(index, animation) in deleted.iter().rev() {
                if index < state.sections.len() {
                    let section = state.sections.remove(index);
                    section.discard_pending();
                    state.release(&section);
                    deletions.record_delete_section(index, animation);
                }
            }
            let shift = |index: usize| {
                index - deleted.iter().filter(|(deleted, _)| *deleted < index).count()
            };

            for (index, replacement, animation) in pending.reloads() {
                let index = shift(index);
                if index >= state.sections.len() {
                    continue;
                }
                if let Some(replacement) = replacement {
                    let previous =
                        std::mem::replace(&mut state.sections[index], replacement.clone());
                    previous.discard_pending();
                    state.release(&previous);
                    incoming.insert(replacement.id());
                }
                batch.record_reload_section(index, animation);
            }

            let mut moving: Vec<(usize, usize, Animation)> =
                pending.moves().map(|(from, to, animation)| (shift(from), to, animation)).collect();
            moving.sort_by(|a, b| b.0.cmp(&a.0));
            let mut lifted = Vec::with_capacity(moving.len());
            for (from, to, animation) in moving {
                if from < state.sections.len() {
                    lifted.push((to, from, state.sections.remove(from), animation));
                }
            }
            lifted.sort_by_key(|(to, ..)| *to);
            for (to, from, section, animation) in lifted {
                let at = to.min(state.sections.len());
                state.sections.insert(at, section);
                batch.record_move_section(from, at, animation);
            }

            for (index, section, animation) in pending.inserts() {
                let at = index.min(state.sections.len());
                state.sections.insert(at, section.clone());
                incoming.insert(section.id());
                batch.record_insert_section(at, animation);
            }

            // Every moved row is collected before any section resolves.
            let mut arrivals: HashMap<SectionId, Vec<MovedRow>> = HashMap::new();
            for (index, section) in state.sections.iter().enumerate() {
                for moved in section.outgoing_moves(index) {
                    let Some(target) = state.sections.get(moved.to.section) else {
                        tracing::debug!(
                            target: targets::ADAPTER,
                            from = %moved.from,
                            to = %moved.to,
                            "move target missing, row kept in place"
                        );
                        section.cancel_move(moved.from.row);
                        continue;
                    };
                    if incoming.contains(&target.id()) && !incoming.contains(&section.id()) {
                        batch.record_delete_row(moved.from, moved.animation);
                    }
                    arrivals.entry(target.id()).or_default().push(moved);
                }
            }

            let mut resolved: Vec<Section> = Vec::new();
            for (index, section) in state.sections.iter().enumerate() {
                let arriving = arrivals.remove(&section.id()).unwrap_or_default();
                let Some(rows) = section.resolve(index, arriving) else {
                    continue;
                };
                if !incoming.contains(&section.id()) {
                    batch.merge_rows(&rows);
                    for moved in &rows.moved {
                        let source_shown = state
                            .sections
                            .get(moved.from.section)
                            .is_some_and(|source| !incoming.contains(&source.id()));
                        if source_shown {
                            batch.record_move_row(moved.from, moved.to, moved.animation);
                        } else {
                            batch.record_insert_row(moved.to, moved.animation);
                        }
                    }
                }
                resolved.push(section.clone());
            }

            (deletions, batch, resolved)
        };

        tracing::debug!(
            target: targets::ADAPTER,
            deleted_sections = deletions.section_change_count(),
            section_changes = batch.section_change_count(),
            row_changes = batch.row_change_count(),
            "committed"
        );

        if !deletions.is_empty() {
            self.shared.signals.committed.emit(deletions);
        }
        self.shared.signals.committed.emit(batch);
        for section in resolved {
            section.signals().rows_resolved.emit(section.row_count());
        }
    }

    /// Discards every pending section and row change without emitting.
    pub fn rollback(&self) {
        let mut state = self.shared.state.lock();
        let pending = std::mem::take(&mut state.modification);
        for section in pending.incoming_sections() {
            section.discard_pending();
            state.release(section);
        }
        for section in &state.sections {
            section.discard_pending();
        }
        tracing::debug!(target: targets::ADAPTER, "rolled back pending changes");
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn adopt(&self, state: &mut AdapterState, section: &Section) {
        let id = section.id();
        let adapter = Arc::downgrade(&self.shared);
        let weak_section = section.downgrade();
        let rows_changed = section.signals().rows_changed.connect({
            let adapter = adapter.clone();
            move |_| {
                if let (Some(shared), Some(section)) = (adapter.upgrade(), weak_section.upgrade()) {
                    ContentAdapter { shared }.on_rows_changed(&section);
                }
            }
        });
        let needs_reload = section.signals().needs_reload.connect(move |&flag| {
            if let Some(shared) = adapter.upgrade() {
                let adapter = ContentAdapter { shared };
                adapter.queue_reload(id, flag);
                adapter.commit_if_auto();
            }
        });
        state.connections.insert(
            id,
            SectionConnections {
                rows_changed,
                needs_reload,
            },
        );
    }

    fn initialize(&self, section: &Section, index: usize) {
        let initializer = self.shared.hooks.read().initializer.clone();
        if let Some(initializer) = initializer {
            initializer(section, index, &section.context());
        }
    }

    fn on_rows_changed(&self, section: &Section) {
        let hook = self.shared.hooks.read().content_update.clone();
        if let Some(hook) = hook
            && hook(section) == SectionOperation::Reload
        {
            self.queue_reload(section.id(), true);
        }
        self.commit_if_auto();
    }

    fn queue_reload(&self, id: SectionId, reload: bool) {
        let animation = self.config().default_section_animation;
        let mut state = self.shared.state.lock();
        match state.committed_index(id) {
            Some(index) if reload => state.modification.reload_committed(index, animation),
            Some(index) => state.modification.undo_reload_section(index),
            None => tracing::trace!(
                target: targets::ADAPTER,
                section = %id,
                "reload of uncommitted section ignored"
            ),
        }
    }

    fn commit_if_auto(&self) {
        let suspended = self.shared.auto_commit_suspended.load(Ordering::SeqCst) > 0;
        if self.config().auto_commit && !suspended {
            self.commit();
        }
    }
}

impl fmt::Debug for ContentAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("ContentAdapter")
            .field("sections", &state.sections.len())
            .field("pending", &!state.modification.is_empty())
            .field("config", &*self.shared.config.read())
            .finish()
    }
}

static_assertions::assert_impl_all!(ContentAdapter: Send, Sync);
