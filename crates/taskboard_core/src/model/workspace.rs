//! Workspace record, draft and patch.

use crate::model::text::{normalize_description, normalize_title};
use crate::model::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

pub const UNTITLED_WORKSPACE: &str = "Untitled workspace";

/// Top-level container for tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    /// Owned by `SelectionPolicy`; at most one workspace has it set.
    pub is_selected: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Caller-provided fields for a new workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewWorkspace {
    pub title: String,
    pub description: String,
}

impl NewWorkspace {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub(crate) fn into_record(self, id: EntityId, now: Timestamp) -> Workspace {
        Workspace {
            id,
            title: normalize_title(&self.title, UNTITLED_WORKSPACE),
            description: normalize_description(&self.description),
            is_selected: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a workspace. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspacePatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl WorkspacePatch {
    pub fn title(value: impl Into<String>) -> Self {
        Self {
            title: Some(value.into()),
            ..Self::default()
        }
    }

    pub(crate) fn apply_to(self, workspace: &mut Workspace) {
        if let Some(title) = self.title {
            workspace.title = normalize_title(&title, UNTITLED_WORKSPACE);
        }
        if let Some(description) = self.description {
            workspace.description = normalize_description(&description);
        }
    }
}
