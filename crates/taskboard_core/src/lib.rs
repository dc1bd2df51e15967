//! Core domain logic for the task board.
//! This crate is the single source of truth for workspace/task/item
//! invariants: selection exclusivity, sibling order and drag reordering.

pub mod dispatch;
pub mod logging;
pub mod model;
pub mod reorder;
pub mod service;
pub mod store;
pub mod view;

pub use dispatch::{dispatch, dispatch_tagged, BlockKind, BlockVisitor, PlainTextRenderer};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::block::{
    Block, BlockContent, BlockPatch, BlockType, NewBlock, NoteFields, NotePatch, ParentLevel,
    SectionFields, SectionPatch, TaskFields, TaskPatch, TodoFields, TodoPatch,
};
pub use model::text::FieldError;
pub use model::workspace::{NewWorkspace, Workspace, WorkspacePatch};
pub use model::{Entity, EntityId, EntityKind, Timestamp};
pub use reorder::drag_session::{DragError, DragHost, DragSession, DropOutcome, NoopDragHost};
pub use reorder::geometry::{
    insertion_index, nearest_sibling, DropHint, ElementBox, InsertSide, NearestSibling,
    SiblingLayout, StackedLayout,
};
pub use reorder::order_assignment::{
    reorder, reorder_within, InvalidReorder, ReorderError, ReorderOutcome, ReorderResult,
};
pub use service::board::{BoardError, BoardResult, TaskBoard};
pub use service::selection_service::{SelectionError, SelectionPolicy, SelectionResult};
pub use store::clock::{Clock, SystemClock};
pub use store::entity_store::EntityStore;
pub use store::error::{StoreError, StoreResult};
pub use view::{SubscriptionId, ViewQuery, ViewSnapshot};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
