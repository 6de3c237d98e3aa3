//! Logging facilities for Tableflow.
//!
//! This module provides:
//! - Target and span names for filtering `tracing` output per subsystem
//! - Performance tracing hooks for profiling commits
//!
//! # Tracing Integration
//!
//! Tableflow uses the `tracing` crate for instrumentation and never installs a
//! subscriber itself. To see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("tableflow=debug")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Commits log the size of every batch they hand to the view at `debug`;
//! individual mutations and silent no-ops log at `trace`.

/// Span names used throughout Tableflow for tracing.
pub mod span_names {
    /// Span wrapping a full adapter commit.
    pub const COMMIT: &str = "tableflow::commit";
    /// Span wrapping the resolution of one section's pending rows.
    pub const RESOLVE: &str = "tableflow::resolve";
    /// Span wrapping the replay of a batch on a view.
    pub const REPLAY: &str = "tableflow::replay";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "tableflow_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "tableflow_core::signal";
    /// Pending row/section modification trackers.
    pub const MODIFICATION: &str = "tableflow::modification";
    /// Section mutations and resolution.
    pub const SECTION: &str = "tableflow::section";
    /// Content adapter commits and section bookkeeping.
    pub const ADAPTER: &str = "tableflow::adapter";
    /// Content-to-section routing.
    pub const ROUTING: &str = "tableflow::routing";
    /// List binding and view replay.
    pub const BINDING: &str = "tableflow::binding";
    /// Performance spans.
    pub const PERF: &str = "tableflow::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations such as commits.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "tableflow::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
