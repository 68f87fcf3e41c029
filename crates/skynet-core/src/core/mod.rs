//! Internal implementation modules for `skynet-core`.
//!
//! Callers should use the re-exports at the crate root rather than importing
//! these modules directly.

pub mod config;
pub mod runtime;
pub mod targets;
pub mod tooling;
