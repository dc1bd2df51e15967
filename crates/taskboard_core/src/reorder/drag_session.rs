//! Drag gesture session.
//!
//! # Responsibility
//! - Track pointer movement against the dragged block's siblings.
//! - Publish insertion hints to the host while dragging.
//! - Turn the last hint into one `reorder_within` call on drop.
//!
//! # Invariants
//! - A session holds the host's pointer listener from `begin` until it is
//!   committed, cancelled or dropped; release happens exactly once.
//! - Cancelling never touches the store.
//! - The host only hears about a hint when it changes.

use crate::model::EntityId;
use crate::reorder::geometry::{
    insertion_index, nearest_sibling, DropHint, InsertSide, SiblingLayout,
};
use crate::reorder::order_assignment::{reorder_within, InvalidReorder, ReorderError};
use crate::store::entity_store::EntityStore;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Rendering-side hooks for one drag gesture.
pub trait DragHost {
    /// Starts forwarding pointer-move events for the dragged element.
    fn attach_pointer(&self, dragged_id: EntityId);
    /// Shows (or clears, for `DropHint::None`) the insertion indicator.
    fn show_hint(&self, hint: DropHint);
    /// Stops forwarding pointer-move events.
    fn detach_pointer(&self, dragged_id: EntityId);
}

/// Host for callers that render no indicator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDragHost;

impl DragHost for NoopDragHost {
    fn attach_pointer(&self, _dragged_id: EntityId) {}

    fn show_hint(&self, _hint: DropHint) {}

    fn detach_pointer(&self, _dragged_id: EntityId) {}
}

/// Errors from drag lifecycle calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragError {
    /// Lifecycle call arrived with no active session.
    NotDragging,
    /// Drag source is missing or is not a reorderable block.
    InvalidSource(ReorderError),
    /// Drop failed while writing the new order.
    Reorder(ReorderError),
}

impl Display for DragError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotDragging => write!(f, "no drag session is active"),
            Self::InvalidSource(err) => write!(f, "cannot start drag: {err}"),
            Self::Reorder(err) => write!(f, "drop failed: {err}"),
        }
    }
}

impl Error for DragError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotDragging => None,
            Self::InvalidSource(err) => Some(err),
            Self::Reorder(err) => Some(err),
        }
    }
}

/// How a drop was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Order was rewritten.
    Moved { from: usize, to: usize },
    /// Dropped at its own position; store untouched.
    Unchanged,
    /// No valid target; store untouched.
    Cancelled,
}

/// Last resolved drop position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropTarget {
    /// Pointer is nearest to the dragged element itself.
    Origin,
    Anchor(DropHint),
}

/// One live drag gesture. Dropping the value cancels it.
pub struct DragSession {
    dragged_id: EntityId,
    parent_id: EntityId,
    origin_index: usize,
    target: Option<DropTarget>,
    hint: DropHint,
    host: Rc<dyn DragHost>,
    released: bool,
}

impl DragSession {
    /// Starts dragging `dragged_id` and attaches the pointer listener.
    pub fn begin(
        store: &EntityStore,
        dragged_id: EntityId,
        host: Rc<dyn DragHost>,
    ) -> Result<Self, DragError> {
        let parent_id = match store.block(dragged_id) {
            Some(block) => block.parent_id,
            None if store.workspace(dragged_id).is_some() => {
                return Err(DragError::InvalidSource(ReorderError::InvalidReorder(
                    InvalidReorder::NotABlock(dragged_id),
                )));
            }
            None => {
                return Err(DragError::InvalidSource(ReorderError::NotFound(
                    dragged_id,
                )));
            }
        };
        let origin_index = store
            .children_of(parent_id)
            .iter()
            .position(|block| block.id == dragged_id)
            .unwrap_or_default();

        host.attach_pointer(dragged_id);
        debug!("event=drag_begin module=drag status=ok origin={origin_index}");
        Ok(Self {
            dragged_id,
            parent_id,
            origin_index,
            target: None,
            hint: DropHint::None,
            host,
            released: false,
        })
    }

    pub fn dragged_id(&self) -> EntityId {
        self.dragged_id
    }

    pub fn parent_id(&self) -> EntityId {
        self.parent_id
    }

    pub fn origin_index(&self) -> usize {
        self.origin_index
    }

    pub fn hint(&self) -> DropHint {
        self.hint
    }

    /// Recomputes the insertion point for pointer position `pointer_y`.
    pub fn track(
        &mut self,
        store: &EntityStore,
        pointer_y: f64,
        layout: &dyn SiblingLayout,
    ) -> DropHint {
        let siblings = store.children_of(self.parent_id);
        let ids: Vec<EntityId> = siblings.iter().map(|block| block.id).collect();
        let nearest = if ids.contains(&self.dragged_id) {
            nearest_sibling(&ids, layout, pointer_y)
        } else {
            None
        };

        let (target, hint) = match nearest {
            None => (None, DropHint::None),
            Some(nearest) if nearest.id == self.dragged_id => {
                (Some(DropTarget::Origin), DropHint::None)
            }
            Some(nearest) => {
                let hint = match nearest.side {
                    InsertSide::Before => DropHint::InsertBefore(nearest.id),
                    InsertSide::After => DropHint::InsertAfter(nearest.id),
                };
                (Some(DropTarget::Anchor(hint)), hint)
            }
        };

        self.target = target;
        if hint != self.hint {
            self.hint = hint;
            self.host.show_hint(hint);
        }
        hint
    }

    /// Applies the last computed drop target.
    ///
    /// The listener is released on every path, including errors.
    pub fn commit(mut self, store: &mut EntityStore) -> Result<DropOutcome, DragError> {
        let outcome = self.resolve(store);
        self.release();
        match &outcome {
            Ok(resolved) => debug!("event=drag_commit module=drag status=ok outcome={resolved:?}"),
            Err(err) => warn!("event=drag_commit module=drag status=error error={err}"),
        }
        outcome
    }

    /// Abandons the gesture without touching the store.
    pub fn cancel(mut self) {
        self.release();
        debug!("event=drag_cancel module=drag status=ok");
    }

    fn resolve(&self, store: &mut EntityStore) -> Result<DropOutcome, DragError> {
        let (anchor_id, side) = match self.target {
            None => return Ok(DropOutcome::Cancelled),
            Some(DropTarget::Origin) => return Ok(DropOutcome::Unchanged),
            Some(DropTarget::Anchor(hint)) => match hint.anchor() {
                Some(anchor) => anchor,
                None => return Ok(DropOutcome::Cancelled),
            },
        };

        let siblings: Vec<EntityId> = store
            .children_of(self.parent_id)
            .iter()
            .map(|block| block.id)
            .collect();
        let Some(from) = siblings.iter().position(|id| *id == self.dragged_id) else {
            return match store.block(self.dragged_id) {
                Some(block) => Err(DragError::Reorder(ReorderError::InvalidReorder(
                    InvalidReorder::CrossParent {
                        block_id: self.dragged_id,
                        block_parent: block.parent_id,
                        target_parent: self.parent_id,
                    },
                ))),
                None => Err(DragError::Reorder(ReorderError::NotFound(self.dragged_id))),
            };
        };
        let Some(anchor) = siblings.iter().position(|id| *id == anchor_id) else {
            return Ok(DropOutcome::Cancelled);
        };

        let to = insertion_index(from, anchor, side);
        if to == from {
            return Ok(DropOutcome::Unchanged);
        }
        reorder_within(store, self.parent_id, self.dragged_id, to as i64)
            .map_err(DragError::Reorder)?;
        Ok(DropOutcome::Moved { from, to })
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if self.hint != DropHint::None {
            self.hint = DropHint::None;
            self.host.show_hint(DropHint::None);
        }
        self.host.detach_pointer(self.dragged_id);
    }
}

impl Drop for DragSession {
    fn drop(&mut self) {
        if !self.released {
            debug!("event=drag_dropped module=drag status=ok");
        }
        self.release();
    }
}
