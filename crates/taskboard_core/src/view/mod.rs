//! Derived views and change subscriptions.
//!
//! # Responsibility
//! - Project ordered children and the active selection out of store state.
//! - Push snapshots to UI subscribers whenever the store changes.
//!
//! # Invariants
//! - Projections are pure and idempotent; repeated calls at the same store
//!   revision return the same shared result.

pub(crate) mod derived;
pub mod subscription;

pub use subscription::{SubscriptionId, ViewQuery, ViewSnapshot};
