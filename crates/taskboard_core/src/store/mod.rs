//! Entity storage layer.
//!
//! # Responsibility
//! - Keep the in-memory record maps and their mutation contract.
//! - Isolate timestamp assignment and batch atomicity from callers.
//!
//! # Invariants
//! - Store writes go through `EntityStore` methods only.
//! - Every successful mutation is observable exactly once by subscribers.

pub mod clock;
pub mod entity_store;
pub mod error;

pub(crate) use entity_store::{StagedWrite, StoreState, WriteBatch};
