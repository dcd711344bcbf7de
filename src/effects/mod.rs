//! Filter Pipeline and pixel compositing.
//!
//! Image layers carry declarative filter descriptors. [`filters::FilterStack`] turns them into
//! pixel operations, [`backend::FilterBackend`] sizes the processing, and [`composite`] holds
//! the premultiplied kernels the renderer composites with.

/// Filter processing capacity policy.
pub mod backend;
/// Premultiplied RGBA8 kernels.
pub mod composite;
/// Filter descriptors and pixel operations.
pub mod filters;

pub use backend::{FilterBackend, ProcessingPlan};
pub use filters::{FilterDescriptor, FilterOp, FilterStack};
