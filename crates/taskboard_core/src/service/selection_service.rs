//! Selection exclusivity policy.
//!
//! # Responsibility
//! - Move the single selection flag between workspaces, and between tasks of
//!   one workspace, in one atomic store batch.
//!
//! # Invariants
//! - At most one workspace is selected.
//! - At most one task per workspace is selected.
//! - Re-selecting the current selection writes nothing and notifies nobody.

use crate::model::block::BlockType;
use crate::model::EntityId;
use crate::store::entity_store::EntityStore;
use crate::store::error::StoreError;
use crate::store::{StagedWrite, WriteBatch};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SelectionResult<T> = Result<T, SelectionError>;

/// Errors from selection operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Target does not exist or is not selectable at this level.
    InvalidSelection(EntityId),
    /// Store rejected the staged batch.
    Store(StoreError),
}

impl Display for SelectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSelection(id) => write!(f, "invalid selection target: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SelectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InvalidSelection(_) => None,
        }
    }
}

impl From<StoreError> for SelectionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Selection use-case service over a borrowed store.
pub struct SelectionPolicy<'store> {
    store: &'store mut EntityStore,
}

impl<'store> SelectionPolicy<'store> {
    pub fn new(store: &'store mut EntityStore) -> Self {
        Self { store }
    }

    /// Selects `id` and deselects any other workspace.
    ///
    /// Returns `true` when the store changed.
    pub fn select_workspace(&mut self, id: EntityId) -> SelectionResult<bool> {
        let target = self
            .store
            .workspace(id)
            .ok_or(SelectionError::InvalidSelection(id))?;
        let mut batch = WriteBatch::new();
        if !target.is_selected {
            batch.push(StagedWrite::WorkspaceSelected { id, selected: true });
        }
        for workspace in self.store.workspaces() {
            if workspace.id != id && workspace.is_selected {
                batch.push(StagedWrite::WorkspaceSelected {
                    id: workspace.id,
                    selected: false,
                });
            }
        }
        let changed = self.store.commit(batch, "select_workspace")? > 0;
        debug!("event=select_workspace module=selection status=ok changed={changed}");
        Ok(changed)
    }

    /// Selects task `id` and deselects its siblings.
    ///
    /// The scope is the task's parent workspace; other workspaces keep their
    /// own task selection.
    pub fn select_task(&mut self, id: EntityId) -> SelectionResult<bool> {
        let task = self
            .store
            .block(id)
            .filter(|block| block.kind() == BlockType::Task)
            .ok_or(SelectionError::InvalidSelection(id))?;
        let mut batch = WriteBatch::new();
        if !task.is_selected_task() {
            batch.push(StagedWrite::TaskSelected { id, selected: true });
        }
        for sibling in self.store.children_of(task.parent_id).iter() {
            if sibling.id != id && sibling.is_selected_task() {
                batch.push(StagedWrite::TaskSelected {
                    id: sibling.id,
                    selected: false,
                });
            }
        }
        let changed = self.store.commit(batch, "select_task")? > 0;
        debug!("event=select_task module=selection status=ok changed={changed}");
        Ok(changed)
    }

    /// Deselects every workspace.
    pub fn clear_workspace_selection(&mut self) -> SelectionResult<bool> {
        let mut batch = WriteBatch::new();
        for workspace in self.store.workspaces() {
            if workspace.is_selected {
                batch.push(StagedWrite::WorkspaceSelected {
                    id: workspace.id,
                    selected: false,
                });
            }
        }
        Ok(self.store.commit(batch, "clear_workspace_selection")? > 0)
    }

    /// Deselects every task under `workspace_id`.
    pub fn clear_task_selection(&mut self, workspace_id: EntityId) -> SelectionResult<bool> {
        if self.store.workspace(workspace_id).is_none() {
            return Err(SelectionError::InvalidSelection(workspace_id));
        }
        let mut batch = WriteBatch::new();
        for task in self.store.children_of(workspace_id).iter() {
            if task.is_selected_task() {
                batch.push(StagedWrite::TaskSelected {
                    id: task.id,
                    selected: false,
                });
            }
        }
        Ok(self.store.commit(batch, "clear_task_selection")? > 0)
    }
}
