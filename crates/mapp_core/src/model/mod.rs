//! Domain model for the managed record.
//!
//! # Responsibility
//! - Define the record, its identity and list/page envelopes.
//!
//! # Invariants
//! - Deletion removes records; there are no tombstones.

pub mod single_model;
