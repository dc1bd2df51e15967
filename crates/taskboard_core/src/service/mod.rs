//! Core use-case services.
//!
//! # Responsibility
//! - Enforce cross-record policies (selection exclusivity) above the store.
//! - Bundle store, selection and drag sessions into one application
//!   instance for the UI layer.

pub mod board;
pub mod selection_service;
