//! Tableflow - An incremental diff engine for sectioned list views.
//!
//! Application code edits a model made of [`Section`](model::Section)s owned
//! by a [`ContentAdapter`](model::ContentAdapter) in any order; every edit is
//! tracked as pending until a commit. A commit applies the pending edits and
//! hands the view one [`CellModifications`](model::CellModifications) batch
//! whose indices are valid for animating from the old state to the new one.
//!
//! # Example
//!
//! ```
//! use tableflow::prelude::*;
//!
//! let adapter = ContentAdapter::new();
//! let section = Section::with_rows(["a", "b"]);
//! adapter.add(section.clone());
//! adapter.commit();
//!
//! section.delete_at(0, Animation::Fade);
//! section.add("c", Animation::Fade);
//! assert_eq!(section.rows(), vec![Item::new("a"), Item::new("b")]);
//!
//! adapter.commit();
//! assert_eq!(section.rows(), vec![Item::new("b"), Item::new("c")]);
//! ```
//!
//! # Modules
//!
//! - [`model`]: sections, adapters and the modification trackers
//! - [`binding`]: the bridge to a recycling list widget
//! - [`error`]: errors raised by the binding and configuration loading
//! - [`signal`] and [`logging`]: re-exported from `tableflow-core`

pub mod binding;
pub mod error;
pub mod model;
pub mod prelude;

pub use error::{BindingError, ConfigError, Error, Result};

/// Signal/slot system.
pub mod signal {
    pub use tableflow_core::signal::*;
}

/// Tracing targets, span names and performance spans.
pub mod logging {
    pub use tableflow_core::logging::*;
}
