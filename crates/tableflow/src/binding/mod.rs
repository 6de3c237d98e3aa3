//! Binding a content adapter to a list widget.
//!
//! The widget side is abstracted by [`RecyclerView`]: it hands out reusable
//! views by identifier and applies batches. A [`ListBinding`] owns the
//! widget, answers [`DataSource`] queries from the adapter's committed state
//! and replays every committed batch through
//! [`RecyclerView::perform_batch_updates`].
//!
//! Row and header/footer views are filled by recipes from a
//! [`RenderRegistry`], keyed by the content's type.

mod data_source;
mod list_binding;
mod recycler;
mod registry;

pub use data_source::{DataSource, index_path_of};
pub use list_binding::ListBinding;
pub use recycler::RecyclerView;
pub use registry::RenderRegistry;
