//! nidscope-core
//!
//! Core library for resolving PSP function NIDs across firmware releases.
//!
//! This crate defines the record model, the NID hash, the per-library
//! classification and randomization-detection pipeline, corpus-wide
//! aggregation, source file loaders, and the SQLite entry store.
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! reusable from multiple frontends.

pub mod analysis;
pub mod db;
pub mod libdoc;
pub mod model;
pub mod nid;
pub mod services;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
