//! Shared primitives used by every other module.

/// Re-exported geometry types and pixel helpers.
pub mod core;
/// Crate error taxonomy.
pub mod error;
pub(crate) mod math;
