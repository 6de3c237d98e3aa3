//! Prelude module for Tableflow.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use tableflow::prelude::*;
//! ```
//!
//! This provides access to:
//! - The model (`Section`, `ContentAdapter`, `DynamicContentAdapter`)
//! - Row content (`Item`, `Content`, `IndexPath`, `Animation`)
//! - Batches (`CellModifications`, `BatchOperation`)
//! - The view binding (`ListBinding`, `RecyclerView`, `DataSource`)

// ============================================================================
// Model
// ============================================================================

pub use crate::model::{
    AdapterConfig, ContentAdapter, DynamicContentAdapter, RoutingDecision, Section, SectionContext,
    SectionOperation,
};

// ============================================================================
// Content
// ============================================================================

pub use crate::model::{Animation, Content, ContentType, IndexPath, Item};

// ============================================================================
// Batches
// ============================================================================

pub use crate::model::{BatchOperation, CellModifications};

// ============================================================================
// Binding
// ============================================================================

pub use crate::binding::{DataSource, ListBinding, RecyclerView, RenderRegistry};

// ============================================================================
// Signals and Errors
// ============================================================================

pub use crate::error::{BindingError, ConfigError, Error, Result};
pub use tableflow_core::{ConnectionId, Signal};
