//! Domain model for the workspace → task → item hierarchy.
//!
//! # Responsibility
//! - Define the records held by `EntityStore` (`Workspace`, `Block`).
//! - Define creation drafts and partial-update patches for each record.
//! - Normalize user-provided text fields before they reach the store.
//!
//! # Invariants
//! - Every record is identified by a stable `EntityId` assigned by the store.
//! - Tree depth is fixed: Workspace → Task → {Section, Note, Todo}.
//! - Patches cannot express `id`, `order`, `parent_id` or selection flags.

pub mod block;
pub mod text;
pub mod workspace;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for workspaces and blocks.
pub type EntityId = Uuid;

/// Unix epoch milliseconds.
pub type Timestamp = i64;

/// Record family stored in `EntityStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Workspace,
    Block,
}

/// Owned lookup result for an arbitrary id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Workspace(workspace::Workspace),
    Block(block::Block),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Self::Workspace(workspace) => workspace.id,
            Self::Block(block) => block.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Workspace(_) => EntityKind::Workspace,
            Self::Block(_) => EntityKind::Block,
        }
    }

    pub fn created_at(&self) -> Timestamp {
        match self {
            Self::Workspace(workspace) => workspace.created_at,
            Self::Block(block) => block.created_at,
        }
    }

    pub fn updated_at(&self) -> Timestamp {
        match self {
            Self::Workspace(workspace) => workspace.updated_at,
            Self::Block(block) => block.updated_at,
        }
    }

    pub fn into_block(self) -> Option<block::Block> {
        match self {
            Self::Block(block) => Some(block),
            Self::Workspace(_) => None,
        }
    }

    pub fn into_workspace(self) -> Option<workspace::Workspace> {
        match self {
            Self::Workspace(workspace) => Some(workspace),
            Self::Block(_) => None,
        }
    }
}
