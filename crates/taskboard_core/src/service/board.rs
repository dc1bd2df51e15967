//! Application instance facade.
//!
//! # Responsibility
//! - Expose the inbound UI calls (create/update/delete, select, drag
//!   lifecycle) over one owned `EntityStore`.
//! - Own at most one live `DragSession` and end it on every exit path.
//!
//! # Invariants
//! - Selection and reorder failures are returned, never swallowed.
//! - Deleting a missing id is an idempotent no-op.
//! - Dropping the board mid-drag releases the pointer listener.

use crate::model::block::{Block, BlockPatch, NewBlock};
use crate::model::workspace::{NewWorkspace, Workspace, WorkspacePatch};
use crate::model::{Entity, EntityId};
use crate::reorder::drag_session::{DragError, DragHost, DragSession, DropOutcome, NoopDragHost};
use crate::reorder::geometry::{DropHint, SiblingLayout};
use crate::reorder::order_assignment::{reorder, ReorderError, ReorderOutcome};
use crate::service::selection_service::{SelectionError, SelectionPolicy};
use crate::store::entity_store::EntityStore;
use crate::store::error::StoreError;
use crate::view::subscription::{SubscriptionId, ViewQuery, ViewSnapshot};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type BoardResult<T> = Result<T, BoardError>;

/// Errors surfaced to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    Store(StoreError),
    Selection(SelectionError),
    Reorder(ReorderError),
    Drag(DragError),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Selection(err) => write!(f, "{err}"),
            Self::Reorder(err) => write!(f, "{err}"),
            Self::Drag(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Selection(err) => Some(err),
            Self::Reorder(err) => Some(err),
            Self::Drag(err) => Some(err),
        }
    }
}

impl From<StoreError> for BoardError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<SelectionError> for BoardError {
    fn from(value: SelectionError) -> Self {
        Self::Selection(value)
    }
}

impl From<ReorderError> for BoardError {
    fn from(value: ReorderError) -> Self {
        Self::Reorder(value)
    }
}

impl From<DragError> for BoardError {
    fn from(value: DragError) -> Self {
        Self::Drag(value)
    }
}

/// One to-do board instance: store, selection policy and drag state.
pub struct TaskBoard {
    store: EntityStore,
    drag_host: Rc<dyn DragHost>,
    drag: Option<DragSession>,
}

impl Default for TaskBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::with_store(EntityStore::new(), Rc::new(NoopDragHost))
    }

    pub fn with_drag_host(drag_host: Rc<dyn DragHost>) -> Self {
        Self::with_store(EntityStore::new(), drag_host)
    }

    pub fn with_store(store: EntityStore, drag_host: Rc<dyn DragHost>) -> Self {
        Self {
            store,
            drag_host,
            drag: None,
        }
    }

    /// Read-only access for queries.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn create_workspace(&mut self, draft: NewWorkspace) -> EntityId {
        self.store.create_workspace(draft)
    }

    pub fn update_workspace(&mut self, id: EntityId, patch: WorkspacePatch) -> BoardResult<()> {
        Ok(self.store.update_workspace(id, patch)?)
    }

    /// Deletes a workspace; a missing id is a no-op.
    pub fn delete_workspace(&mut self, id: EntityId) -> BoardResult<()> {
        ignore_missing(self.store.delete_workspace(id))
    }

    pub fn create_block(&mut self, draft: NewBlock) -> BoardResult<EntityId> {
        Ok(self.store.create_block(draft)?)
    }

    pub fn update_block(&mut self, id: EntityId, patch: BlockPatch) -> BoardResult<()> {
        Ok(self.store.update_block(id, patch)?)
    }

    /// Deletes a block; a missing id is a no-op.
    ///
    /// Deleting the block being dragged cancels the drag first.
    pub fn delete_block(&mut self, id: EntityId) -> BoardResult<()> {
        if self
            .drag
            .as_ref()
            .is_some_and(|session| session.dragged_id() == id)
        {
            self.cancel_drag();
        }
        ignore_missing(self.store.delete_block(id))
    }

    pub fn get(&self, id: EntityId) -> BoardResult<Entity> {
        Ok(self.store.get(id)?)
    }

    pub fn select_workspace(&mut self, id: EntityId) -> BoardResult<bool> {
        Ok(SelectionPolicy::new(&mut self.store).select_workspace(id)?)
    }

    pub fn select_task(&mut self, id: EntityId) -> BoardResult<bool> {
        Ok(SelectionPolicy::new(&mut self.store).select_task(id)?)
    }

    pub fn clear_workspace_selection(&mut self) -> BoardResult<bool> {
        Ok(SelectionPolicy::new(&mut self.store).clear_workspace_selection()?)
    }

    pub fn clear_task_selection(&mut self, workspace_id: EntityId) -> BoardResult<bool> {
        Ok(SelectionPolicy::new(&mut self.store).clear_task_selection(workspace_id)?)
    }

    pub fn children_of(&self, parent_id: EntityId) -> Rc<[Block]> {
        self.store.children_of(parent_id)
    }

    pub fn selected_workspace(&self) -> Option<Workspace> {
        self.store.selected_workspace()
    }

    pub fn selected_task(&self) -> Option<Block> {
        self.store.selected_task()
    }

    pub fn subscribe(
        &mut self,
        query: ViewQuery,
        callback: impl FnMut(&ViewSnapshot) + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(query, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Moves a block directly, bypassing pointer tracking.
    pub fn reorder(&mut self, id: EntityId, target_index: i64) -> BoardResult<ReorderOutcome> {
        Ok(reorder(&mut self.store, id, target_index)?)
    }

    /// Starts a drag gesture. An active gesture is cancelled first.
    pub fn begin_drag(&mut self, id: EntityId) -> BoardResult<()> {
        if self.cancel_drag() {
            debug!("event=drag_restart module=board status=ok");
        }
        let session = DragSession::begin(&self.store, id, Rc::clone(&self.drag_host))?;
        self.drag = Some(session);
        Ok(())
    }

    /// Feeds one pointer-move event into the active gesture.
    pub fn track_pointer(
        &mut self,
        pointer_y: f64,
        layout: &dyn SiblingLayout,
    ) -> BoardResult<DropHint> {
        let session = self.drag.as_mut().ok_or(DragError::NotDragging)?;
        Ok(session.track(&self.store, pointer_y, layout))
    }

    /// Drops the dragged block at the last tracked position.
    pub fn commit_drop(&mut self) -> BoardResult<DropOutcome> {
        let session = self.drag.take().ok_or(DragError::NotDragging)?;
        Ok(session.commit(&mut self.store)?)
    }

    /// Abandons the active gesture. Returns `false` when none was active.
    pub fn cancel_drag(&mut self) -> bool {
        match self.drag.take() {
            Some(session) => {
                session.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Current insertion hint; `DropHint::None` when idle.
    pub fn drag_hint(&self) -> DropHint {
        self.drag
            .as_ref()
            .map_or(DropHint::None, |session| session.hint())
    }
}

fn ignore_missing(result: Result<(), StoreError>) -> BoardResult<()> {
    match result {
        Ok(()) => Ok(()),
        Err(StoreError::NotFound(_)) => {
            debug!("event=delete module=board status=noop reason=not_found");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
