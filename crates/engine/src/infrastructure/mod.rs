//! Infrastructure implementations.
//!
//! Contains adapters for external dependencies (the filesystem).

pub mod importers;
