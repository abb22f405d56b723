//! Shared data model for the vigil agent.
//!
//! The types in [`types`] define the wire schema: a [`types::Snapshot`]
//! serialized to JSON is exactly what the collection endpoint receives.

pub mod types;
