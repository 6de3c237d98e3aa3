//! Core systems for Tableflow.
//!
//! This crate provides the foundational pieces shared by the Tableflow engine:
//!
//! - **Signal/Slot System**: the event channel sections use to report changes
//!   to the adapter that owns them, and adapters use to hand batches to views
//! - **Logging**: `tracing` targets, span names and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use tableflow_core::Signal;
//!
//! let needs_reload = Signal::<bool>::new();
//! let reloads = Arc::new(AtomicUsize::new(0));
//!
//! let counter = reloads.clone();
//! let conn_id = needs_reload.connect(move |&flag| {
//!     if flag {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     }
//! });
//!
//! needs_reload.emit(true);
//! needs_reload.emit(false);
//! assert_eq!(reloads.load(Ordering::SeqCst), 1);
//!
//! needs_reload.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
