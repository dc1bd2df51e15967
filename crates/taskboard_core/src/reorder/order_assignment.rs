//! Sibling order reassignment.
//!
//! # Responsibility
//! - Move one block to a new index among its siblings.
//! - Rewrite sibling orders to dense `0..N-1` as one store batch.
//!
//! # Invariants
//! - Reordering never changes a block's parent.
//! - Out-of-range target indexes are clamped, never rejected.
//! - Only blocks whose order actually changes are written.

use crate::model::EntityId;
use crate::store::entity_store::EntityStore;
use crate::store::error::StoreError;
use crate::store::{StagedWrite, WriteBatch};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ReorderResult<T> = Result<T, ReorderError>;

/// Why a reorder request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReorder {
    /// Target id names a workspace; workspaces carry no sibling order.
    NotABlock(EntityId),
    /// Block lives under a different parent than the requested list.
    CrossParent {
        block_id: EntityId,
        block_parent: EntityId,
        target_parent: EntityId,
    },
}

/// Errors from reorder operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    /// Dragged id does not exist.
    NotFound(EntityId),
    InvalidReorder(InvalidReorder),
    Store(StoreError),
}

impl Display for ReorderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "reorder target not found: {id}"),
            Self::InvalidReorder(InvalidReorder::NotABlock(id)) => {
                write!(f, "invalid reorder: {id} is not a block")
            }
            Self::InvalidReorder(InvalidReorder::CrossParent {
                block_id,
                block_parent,
                target_parent,
            }) => write!(
                f,
                "invalid reorder: block {block_id} belongs to {block_parent}, not {target_parent}"
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReorderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidReorder(_) => None,
        }
    }
}

impl From<StoreError> for ReorderError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Result of a reorder that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    Moved { from: usize, to: usize },
    Unchanged,
}

/// Moves `dragged_id` to `target_index` within its current parent.
pub fn reorder(
    store: &mut EntityStore,
    dragged_id: EntityId,
    target_index: i64,
) -> ReorderResult<ReorderOutcome> {
    let parent_id = parent_of(store, dragged_id)?;
    reorder_within(store, parent_id, dragged_id, target_index)
}

/// Moves `dragged_id` to `target_index` inside `parent_id`'s child list.
///
/// # Errors
/// - `NotFound` when `dragged_id` is unknown.
/// - `InvalidReorder` when `dragged_id` is a workspace or lives under a
///   different parent.
pub fn reorder_within(
    store: &mut EntityStore,
    parent_id: EntityId,
    dragged_id: EntityId,
    target_index: i64,
) -> ReorderResult<ReorderOutcome> {
    let block_parent = parent_of(store, dragged_id)?;
    if block_parent != parent_id {
        return Err(ReorderError::InvalidReorder(InvalidReorder::CrossParent {
            block_id: dragged_id,
            block_parent,
            target_parent: parent_id,
        }));
    }

    let siblings: Vec<EntityId> = store
        .children_of(parent_id)
        .iter()
        .map(|block| block.id)
        .collect();
    let Some((from, sequence)) = plan_sequence(&siblings, dragged_id, target_index) else {
        return Err(ReorderError::NotFound(dragged_id));
    };
    let to = clamp_index(target_index, siblings.len());
    if from == to {
        debug!("event=reorder module=reorder status=noop index={from}");
        return Ok(ReorderOutcome::Unchanged);
    }

    let mut batch = WriteBatch::new();
    for (index, id) in sequence.into_iter().enumerate() {
        batch.push(StagedWrite::BlockOrder {
            id,
            order: index as i64,
        });
    }
    let written = store.commit(batch, "reorder")?;
    debug!("event=reorder module=reorder status=ok from={from} to={to} written={written}");
    Ok(ReorderOutcome::Moved { from, to })
}

/// Clamps `target_index` into `[0, len - 1]`.
pub fn clamp_index(target_index: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    target_index.clamp(0, len as i64 - 1) as usize
}

/// Returns the origin index and the sibling sequence after the move, or
/// `None` when `dragged_id` is not among `siblings`.
pub(crate) fn plan_sequence(
    siblings: &[EntityId],
    dragged_id: EntityId,
    target_index: i64,
) -> Option<(usize, Vec<EntityId>)> {
    let from = siblings.iter().position(|id| *id == dragged_id)?;
    let to = clamp_index(target_index, siblings.len());
    let mut sequence = siblings.to_vec();
    let moved = sequence.remove(from);
    sequence.insert(to, moved);
    Some((from, sequence))
}

fn parent_of(store: &EntityStore, id: EntityId) -> ReorderResult<EntityId> {
    if let Some(block) = store.block(id) {
        return Ok(block.parent_id);
    }
    if store.workspace(id).is_some() {
        return Err(ReorderError::InvalidReorder(InvalidReorder::NotABlock(id)));
    }
    Err(ReorderError::NotFound(id))
}

#[cfg(test)]
mod tests {
    use super::{clamp_index, plan_sequence};
    use uuid::Uuid;

    #[test]
    fn clamp_bounds_target_index() {
        assert_eq!(clamp_index(-3, 4), 0);
        assert_eq!(clamp_index(2, 4), 2);
        assert_eq!(clamp_index(99, 4), 3);
        assert_eq!(clamp_index(5, 0), 0);
    }

    #[test]
    fn plan_moves_first_to_last() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let (from, sequence) = plan_sequence(&ids, ids[0], 2).unwrap();
        assert_eq!(from, 0);
        assert_eq!(sequence, vec![ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn plan_moves_last_to_middle() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let (from, sequence) = plan_sequence(&ids, ids[3], 1).unwrap();
        assert_eq!(from, 3);
        assert_eq!(sequence, vec![ids[0], ids[3], ids[1], ids[2]]);
    }

    #[test]
    fn plan_rejects_unknown_id() {
        let ids: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();
        assert!(plan_sequence(&ids, Uuid::new_v4(), 0).is_none());
    }
}
