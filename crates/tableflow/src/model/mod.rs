//! The incremental modification engine.
//!
//! This module holds the sectioned list model and the bookkeeping that turns
//! many small edits into one consistent batch for a list widget.
//!
//! # Core Types
//!
//! - `Item`: Type-erased, shared row content
//! - `Section`: Committed rows plus a `RowModification` with pending changes
//! - `ContentAdapter`: Committed sections plus a `SectionModification`;
//!   `commit` applies everything and emits `CellModifications`
//! - `DynamicContentAdapter`: A content adapter that routes content into
//!   sections by itself
//!
//! # Index Spaces
//!
//! Pending deletes, reloads and move sources address what the view currently
//! shows. Pending inserts and move targets address what the view will show
//! after the commit. The trackers keep both consistent while edits pile up,
//! so callers can issue edits in any order.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐  rows_changed   ┌────────────────┐  committed   ┌─────────────┐
//! │   Section   │────────────────>│ ContentAdapter │─────────────>│    View     │
//! │ (rows +     │  needs_reload   │ (sections +    │ Cell-        │ (Recycler-  │
//! │  pending)   │────────────────>│  pending)      │ Modifications│  View)      │
//! └─────────────┘                 └────────────────┘              └─────────────┘
//! ```

mod adapter;
mod animation;
mod cell_modifications;
mod config;
mod dynamic;
mod index;
mod item;
mod row_modification;
mod section;
mod section_modification;
mod slots;

pub use adapter::{
    AdapterSignals, ContentAdapter, ContentUpdateHook, SectionInitializer, SectionOperation,
};
pub use animation::Animation;
pub use cell_modifications::{BatchOperation, CellModifications, ResolvedRows, group_by_animation};
pub use config::AdapterConfig;
pub use dynamic::{Classifier, DynamicContentAdapter, RoutingDecision, RowOrder, SectionOrder};
pub use index::IndexPath;
pub use item::{Content, ContentType, Item};
pub use row_modification::{MovedRow, RowModification};
pub use section::{RowPredicate, Section, SectionContext, SectionId, SectionSignals, WeakSection};
pub use section_modification::SectionModification;
