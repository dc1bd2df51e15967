//! Manual sibling reordering.
//!
//! # Responsibility
//! - Resolve pointer positions into insertion points (`geometry`).
//! - Hold the per-gesture drag state machine (`drag_session`).
//! - Rewrite sibling orders atomically (`order_assignment`).

pub mod drag_session;
pub mod geometry;
pub mod order_assignment;
