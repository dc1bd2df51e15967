//! In-memory entity store.
//!
//! # Responsibility
//! - Own every workspace and block record.
//! - Assign ids, timestamps and initial sibling order on create.
//! - Apply multi-record writes as one all-or-nothing batch.
//! - Notify subscribers once per successful logical mutation.
//!
//! # Invariants
//! - Only methods of this type mutate the record maps.
//! - `updated_at` strictly increases per record; `created_at` never changes.
//! - Sibling orders stay dense `0..N-1` after create, reorder and delete.
//! - Delete never cascades; children of a deleted parent keep their
//!   `parent_id`.

use crate::model::block::{Block, BlockPatch, BlockPatchError, BlockType, NewBlock, ParentLevel};
use crate::model::workspace::{NewWorkspace, Workspace, WorkspacePatch};
use crate::model::{Entity, EntityId, Timestamp};
use crate::store::clock::{Clock, SystemClock, TimestampSequence};
use crate::store::error::{StoreError, StoreResult};
use crate::view::derived::{sibling_cmp, DerivedViews};
use crate::view::subscription::{SubscriberRegistry, SubscriptionId, ViewQuery, ViewSnapshot};
use log::debug;
use std::collections::HashMap;
use std::rc::Rc;
use uuid::Uuid;

/// Raw record maps plus the mutation counter.
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) workspaces: HashMap<EntityId, Workspace>,
    pub(crate) blocks: HashMap<EntityId, Block>,
    pub(crate) revision: u64,
}

impl StoreState {
    fn next_order(&self, parent_id: EntityId) -> i64 {
        self.blocks
            .values()
            .filter(|block| block.parent_id == parent_id)
            .map(|block| block.order)
            .max()
            .map_or(0, |max| max + 1)
    }

    fn ensure_parent(&self, parent_id: EntityId, level: ParentLevel) -> StoreResult<()> {
        let found_level = if self.workspaces.contains_key(&parent_id) {
            Some(ParentLevel::Workspace)
        } else {
            match self.blocks.get(&parent_id).map(Block::kind) {
                Some(BlockType::Task) => Some(ParentLevel::Task),
                Some(_) => None,
                None => return Err(StoreError::NotFound(parent_id)),
            }
        };
        if found_level != Some(level) {
            return Err(StoreError::InvalidParent {
                parent_id,
                expected: level,
            });
        }
        Ok(())
    }

    fn validate(&self, write: &StagedWrite) -> StoreResult<()> {
        let exists = match *write {
            StagedWrite::WorkspaceSelected { id, .. } => self.workspaces.contains_key(&id),
            StagedWrite::TaskSelected { id, .. } => self
                .blocks
                .get(&id)
                .is_some_and(|block| block.kind() == BlockType::Task),
            StagedWrite::BlockOrder { id, .. } => self.blocks.contains_key(&id),
        };
        if exists {
            Ok(())
        } else {
            Err(StoreError::NotFound(write.target()))
        }
    }

    fn changes(&self, write: &StagedWrite) -> bool {
        match *write {
            StagedWrite::WorkspaceSelected { id, selected } => self
                .workspaces
                .get(&id)
                .is_some_and(|workspace| workspace.is_selected != selected),
            StagedWrite::TaskSelected { id, selected } => self
                .blocks
                .get(&id)
                .is_some_and(|block| block.is_selected_task() != selected),
            StagedWrite::BlockOrder { id, order } => self
                .blocks
                .get(&id)
                .is_some_and(|block| block.order != order),
        }
    }

    fn apply(&mut self, write: StagedWrite, now: Timestamp) {
        match write {
            StagedWrite::WorkspaceSelected { id, selected } => {
                if let Some(workspace) = self.workspaces.get_mut(&id) {
                    workspace.is_selected = selected;
                    workspace.updated_at = now;
                }
            }
            StagedWrite::TaskSelected { id, selected } => {
                if let Some(block) = self.blocks.get_mut(&id) {
                    block.set_task_selected(selected);
                    block.updated_at = now;
                }
            }
            StagedWrite::BlockOrder { id, order } => {
                if let Some(block) = self.blocks.get_mut(&id) {
                    block.order = order;
                    block.updated_at = now;
                }
            }
        }
    }

    /// Dense re-numbering of one parent's children.
    fn compaction_writes(&self, parent_id: EntityId) -> Vec<StagedWrite> {
        let mut siblings: Vec<&Block> = self
            .blocks
            .values()
            .filter(|block| block.parent_id == parent_id)
            .collect();
        siblings.sort_by(|a, b| sibling_cmp(a, b));
        siblings
            .into_iter()
            .enumerate()
            .map(|(index, block)| StagedWrite::BlockOrder {
                id: block.id,
                order: index as i64,
            })
            .collect()
    }
}

/// One staged field write inside a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StagedWrite {
    WorkspaceSelected { id: EntityId, selected: bool },
    TaskSelected { id: EntityId, selected: bool },
    BlockOrder { id: EntityId, order: i64 },
}

impl StagedWrite {
    fn target(&self) -> EntityId {
        match *self {
            Self::WorkspaceSelected { id, .. } => id,
            Self::TaskSelected { id, .. } => id,
            Self::BlockOrder { id, .. } => id,
        }
    }
}

/// Writes committed together: all land or none do.
#[derive(Debug, Default)]
pub(crate) struct WriteBatch {
    writes: Vec<StagedWrite>,
}

impl WriteBatch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, write: StagedWrite) {
        self.writes.push(write);
    }
}

/// Single source of truth for workspaces and blocks.
pub struct EntityStore {
    state: StoreState,
    views: DerivedViews,
    subscribers: SubscriberRegistry,
    clock: Box<dyn Clock>,
    timestamps: TimestampSequence,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Creates an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// Creates an empty store reading time from `clock`.
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            state: StoreState::default(),
            views: DerivedViews::default(),
            subscribers: SubscriberRegistry::default(),
            clock,
            timestamps: TimestampSequence::default(),
        }
    }

    /// Mutation counter; bumps exactly once per successful mutation.
    pub fn revision(&self) -> u64 {
        self.state.revision
    }

    pub fn create_workspace(&mut self, draft: NewWorkspace) -> EntityId {
        let id = Uuid::new_v4();
        let now = self.now();
        self.state.workspaces.insert(id, draft.into_record(id, now));
        self.finish_mutation("workspace_create");
        id
    }

    /// Creates a block as the last child of its parent.
    ///
    /// # Errors
    /// - `NotFound` when the parent id is unknown.
    /// - `InvalidParent` when the parent is at the wrong level for the kind.
    /// - `InvalidField` when a reference id is blank.
    pub fn create_block(&mut self, draft: NewBlock) -> StoreResult<EntityId> {
        let kind = draft.kind();
        self.state.ensure_parent(draft.parent_id, kind.parent_level())?;
        let id = Uuid::new_v4();
        let order = self.state.next_order(draft.parent_id);
        let now = self.now();
        let block = draft.into_record(id, order, now)?;
        self.state.blocks.insert(id, block);
        debug!("event=block_create module=store status=ok kind={kind} order={order}");
        self.finish_mutation("block_create");
        Ok(id)
    }

    pub fn update_workspace(&mut self, id: EntityId, patch: WorkspacePatch) -> StoreResult<()> {
        if !self.state.workspaces.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        let now = self.now();
        if let Some(workspace) = self.state.workspaces.get_mut(&id) {
            patch.apply_to(workspace);
            workspace.updated_at = now;
        }
        self.finish_mutation("workspace_update");
        Ok(())
    }

    /// Merges `patch` into the block; untouched fields keep their values.
    pub fn update_block(&mut self, id: EntityId, patch: BlockPatch) -> StoreResult<()> {
        let block = self
            .state
            .blocks
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        block.apply_patch(patch).map_err(|err| match err {
            BlockPatchError::KindMismatch { stored, patch } => {
                StoreError::KindMismatch { id, stored, patch }
            }
            BlockPatchError::Field(err) => StoreError::InvalidField(err),
        })?;
        let now = self.now();
        if let Some(block) = self.state.blocks.get_mut(&id) {
            block.updated_at = now;
        }
        self.finish_mutation("block_update");
        Ok(())
    }

    /// Removes a workspace or block by id.
    pub fn delete(&mut self, id: EntityId) -> StoreResult<()> {
        if self.state.workspaces.contains_key(&id) {
            self.delete_workspace(id)
        } else {
            self.delete_block(id)
        }
    }

    /// Removes a workspace. Its tasks stay in place with a dangling parent.
    pub fn delete_workspace(&mut self, id: EntityId) -> StoreResult<()> {
        self.state
            .workspaces
            .remove(&id)
            .ok_or(StoreError::NotFound(id))?;
        self.finish_mutation("workspace_delete");
        Ok(())
    }

    /// Removes a block and compacts the orders of its former siblings.
    ///
    /// Children of the removed block are left orphaned.
    pub fn delete_block(&mut self, id: EntityId) -> StoreResult<()> {
        let removed = self
            .state
            .blocks
            .remove(&id)
            .ok_or(StoreError::NotFound(id))?;
        let compaction: Vec<StagedWrite> = self
            .state
            .compaction_writes(removed.parent_id)
            .into_iter()
            .filter(|write| self.state.changes(write))
            .collect();
        if !compaction.is_empty() {
            let now = self.now();
            for write in compaction {
                self.state.apply(write, now);
            }
        }
        self.finish_mutation("block_delete");
        Ok(())
    }

    /// Owned copy of any record.
    pub fn get(&self, id: EntityId) -> StoreResult<Entity> {
        if let Some(workspace) = self.state.workspaces.get(&id) {
            return Ok(Entity::Workspace(workspace.clone()));
        }
        self.state
            .blocks
            .get(&id)
            .map(|block| Entity::Block(block.clone()))
            .ok_or(StoreError::NotFound(id))
    }

    pub fn workspace(&self, id: EntityId) -> Option<&Workspace> {
        self.state.workspaces.get(&id)
    }

    pub fn block(&self, id: EntityId) -> Option<&Block> {
        self.state.blocks.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.state.workspaces.contains_key(&id) || self.state.blocks.contains_key(&id)
    }

    /// All workspaces ordered by `created_at ASC, id ASC`.
    pub fn workspaces(&self) -> Vec<Workspace> {
        let mut items: Vec<Workspace> = self.state.workspaces.values().cloned().collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        items
    }

    /// Unordered view over every block, orphans included.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.state.blocks.values()
    }

    pub fn len(&self) -> usize {
        self.state.workspaces.len() + self.state.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Children of `parent_id` sorted by `order`; shared while unchanged.
    pub fn children_of(&self, parent_id: EntityId) -> Rc<[Block]> {
        self.views.children_of(&self.state, parent_id)
    }

    pub fn selected_workspace(&self) -> Option<Workspace> {
        self.views.selected_workspace(&self.state)
    }

    /// Selected task of the selected workspace.
    pub fn selected_task(&self) -> Option<Block> {
        self.views.selected_task(&self.state)
    }

    /// Registers `callback` and immediately delivers the current snapshot.
    pub fn subscribe(
        &mut self,
        query: ViewQuery,
        callback: impl FnMut(&ViewSnapshot) + 'static,
    ) -> SubscriptionId {
        let id = self.subscribers.insert(query, callback);
        self.subscribers.deliver(id, &self.state, &self.views);
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Validates every staged write, then applies the ones that change state
    /// under one timestamp and one notification.
    ///
    /// Returns how many writes changed a record; zero means nothing was
    /// written and nobody was notified.
    pub(crate) fn commit(&mut self, batch: WriteBatch, event: &'static str) -> StoreResult<usize> {
        for write in &batch.writes {
            self.state.validate(write)?;
        }
        let effective: Vec<StagedWrite> = batch
            .writes
            .into_iter()
            .filter(|write| self.state.changes(write))
            .collect();
        if effective.is_empty() {
            debug!("event={event} module=store status=noop");
            return Ok(0);
        }

        let now = self.now();
        let applied = effective.len();
        for write in effective {
            self.state.apply(write, now);
        }
        self.finish_mutation(event);
        Ok(applied)
    }

    fn now(&mut self) -> Timestamp {
        self.timestamps.next(self.clock.as_ref())
    }

    fn finish_mutation(&mut self, event: &'static str) {
        self.state.revision += 1;
        debug!(
            "event={event} module=store status=ok revision={} subscribers={}",
            self.state.revision,
            self.subscribers.len()
        );
        self.subscribers.notify(&self.state, &self.views);
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityStore, StagedWrite, WriteBatch};
    use crate::model::block::NewBlock;
    use crate::model::workspace::NewWorkspace;
    use crate::store::error::StoreError;
    use uuid::Uuid;

    #[test]
    fn batch_with_unknown_target_writes_nothing() {
        let mut store = EntityStore::new();
        let workspace = store.create_workspace(NewWorkspace::new("w"));
        let task = store.create_block(NewBlock::task(workspace, "t")).unwrap();
        let revision = store.revision();
        let missing = Uuid::new_v4();

        let mut batch = WriteBatch::new();
        batch.push(StagedWrite::BlockOrder { id: task, order: 7 });
        batch.push(StagedWrite::BlockOrder {
            id: missing,
            order: 0,
        });

        let err = store.commit(batch, "test_batch").unwrap_err();
        assert_eq!(err, StoreError::NotFound(missing));
        assert_eq!(store.block(task).unwrap().order, 0);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn batch_without_effective_changes_is_silent() {
        let mut store = EntityStore::new();
        let workspace = store.create_workspace(NewWorkspace::new("w"));
        let revision = store.revision();

        let mut batch = WriteBatch::new();
        batch.push(StagedWrite::WorkspaceSelected {
            id: workspace,
            selected: false,
        });
        assert_eq!(store.commit(batch, "test_batch").unwrap(), 0);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn task_selection_write_rejects_non_task_block() {
        let mut store = EntityStore::new();
        let workspace = store.create_workspace(NewWorkspace::new("w"));
        let task = store.create_block(NewBlock::task(workspace, "t")).unwrap();
        let note = store.create_block(NewBlock::note(task, "n")).unwrap();

        let mut batch = WriteBatch::new();
        batch.push(StagedWrite::TaskSelected {
            id: note,
            selected: true,
        });
        assert_eq!(
            store.commit(batch, "test_batch").unwrap_err(),
            StoreError::NotFound(note)
        );
    }
}
