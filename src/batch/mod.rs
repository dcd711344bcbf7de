//! Batch Generation Pipeline.
//!
//! A [`pipeline::BatchPipeline`] binds each row of a [`binding::DataTable`] to its own copy of
//! the template, renders rows on a rayon pool and collects a [`report::BatchOutcome`] with
//! 1-based row indices. Rendered images can be published through a [`store::ObjectStore`].

/// Row-to-layer binding.
pub mod binding;
/// Worker pool and row rendering.
pub mod pipeline;
/// Outcome collection and report rows.
pub mod report;
/// Image publishing.
pub mod store;

pub use binding::{BoundTemplate, DataTable, bind_row, column_index};
pub use pipeline::{BatchPipeline, build_thread_pool};
pub use report::{BatchOutcome, BatchSummary, RowFailure, RowSuccess, report_rows};
pub use store::{DirObjectStore, ObjectStore, image_key, publish_images};
