//! The list widget side of a binding.

use crate::model::BatchOperation;

/// A list widget that recycles row and header/footer views.
///
/// Implement this for the concrete widget. The binding never creates views
/// itself; it asks the widget for a reusable one by identifier and fills it
/// through a [`RenderRegistry`](super::RenderRegistry) recipe.
pub trait RecyclerView: Send + Sync + 'static {
    /// The row view type.
    type Cell: 'static;
    /// The header/footer view type.
    type HeaderFooter: 'static;

    /// Returns a reusable row view for `reuse_identifier`.
    fn dequeue_reusable_cell(&self, reuse_identifier: &str) -> Option<Self::Cell>;

    /// Returns a reusable header/footer view for `reuse_identifier`.
    fn dequeue_reusable_header_footer(&self, reuse_identifier: &str) -> Option<Self::HeaderFooter> {
        let _ = reuse_identifier;
        None
    }

    /// Applies one committed batch, in the given order, as a single animated
    /// update.
    fn perform_batch_updates(&self, operations: &[BatchOperation]);

    /// Re-measures row heights without changing content.
    fn update_heights(&self) {}
}
