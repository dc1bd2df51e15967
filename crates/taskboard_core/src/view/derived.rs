//! Memoized read projections over store state.
//!
//! # Invariants
//! - Projections never mutate store state.
//! - Cached results are keyed by store revision; any mutation invalidates
//!   every cached entry at once.
//! - Child listing is deterministic: `order ASC, created_at ASC, id ASC`.

use crate::model::block::Block;
use crate::model::workspace::Workspace;
use crate::model::EntityId;
use crate::store::StoreState;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

/// Total order used for every sibling listing.
pub(crate) fn sibling_cmp(a: &Block, b: &Block) -> Ordering {
    a.order
        .cmp(&b.order)
        .then(a.created_at.cmp(&b.created_at))
        .then(a.id.cmp(&b.id))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct SelectionIds {
    workspace: Option<EntityId>,
    task: Option<EntityId>,
}

#[derive(Debug, Default)]
struct ViewCache {
    revision: Option<u64>,
    children: HashMap<EntityId, Rc<[Block]>>,
    selection: Option<SelectionIds>,
}

impl ViewCache {
    fn sync(&mut self, revision: u64) {
        if self.revision != Some(revision) {
            self.children.clear();
            self.selection = None;
            self.revision = Some(revision);
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct DerivedViews {
    cache: RefCell<ViewCache>,
}

impl DerivedViews {
    pub(crate) fn children_of(&self, state: &StoreState, parent_id: EntityId) -> Rc<[Block]> {
        let mut cache = self.cache.borrow_mut();
        cache.sync(state.revision);
        cache
            .children
            .entry(parent_id)
            .or_insert_with(|| compute_children(state, parent_id))
            .clone()
    }

    pub(crate) fn selected_workspace(&self, state: &StoreState) -> Option<Workspace> {
        let id = self.selection(state).workspace?;
        state.workspaces.get(&id).cloned()
    }

    pub(crate) fn selected_task(&self, state: &StoreState) -> Option<Block> {
        let id = self.selection(state).task?;
        state.blocks.get(&id).cloned()
    }

    fn selection(&self, state: &StoreState) -> SelectionIds {
        let mut cache = self.cache.borrow_mut();
        cache.sync(state.revision);
        *cache
            .selection
            .get_or_insert_with(|| compute_selection(state))
    }
}

fn compute_children(state: &StoreState, parent_id: EntityId) -> Rc<[Block]> {
    let mut children: Vec<Block> = state
        .blocks
        .values()
        .filter(|block| block.parent_id == parent_id)
        .cloned()
        .collect();
    children.sort_by(sibling_cmp);
    children.into()
}

fn compute_selection(state: &StoreState) -> SelectionIds {
    let workspace = state
        .workspaces
        .values()
        .filter(|workspace| workspace.is_selected)
        .min_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
        .map(|workspace| workspace.id);

    let task = workspace.and_then(|workspace_id| {
        state
            .blocks
            .values()
            .filter(|block| block.parent_id == workspace_id && block.is_selected_task())
            .min_by(|a, b| sibling_cmp(a, b))
            .map(|block| block.id)
    });

    SelectionIds { workspace, task }
}
