//! Subscriber registry for derived view snapshots.
//!
//! # Responsibility
//! - Hold UI callbacks keyed by `SubscriptionId`.
//! - Build one immutable `ViewSnapshot` per subscriber and deliver it
//!   synchronously after each store mutation.
//!
//! # Invariants
//! - Callbacks only ever see `&ViewSnapshot`; they cannot reach the store.
//! - Delivery order follows subscription order.

use crate::model::block::Block;
use crate::model::workspace::Workspace;
use crate::model::EntityId;
use crate::store::StoreState;
use crate::view::derived::DerivedViews;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Which child list a subscriber follows besides the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewQuery {
    /// Selected workspace/task only; `children` stays empty.
    SelectionOnly,
    /// Children of a fixed parent.
    ChildrenOf(EntityId),
    /// Tasks of whichever workspace is currently selected.
    SelectedWorkspaceTasks,
    /// Items of whichever task is currently selected.
    SelectedTaskItems,
}

/// Immutable projection handed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub revision: u64,
    /// Parent whose children are listed, if the query resolved to one.
    pub parent_id: Option<EntityId>,
    pub children: Rc<[Block]>,
    pub selected_workspace: Option<Workspace>,
    pub selected_task: Option<Block>,
}

impl ViewSnapshot {
    pub fn child_ids(&self) -> Vec<EntityId> {
        self.children.iter().map(|block| block.id).collect()
    }
}

pub(crate) fn build_snapshot(
    query: ViewQuery,
    state: &StoreState,
    views: &DerivedViews,
) -> ViewSnapshot {
    let selected_workspace = views.selected_workspace(state);
    let selected_task = views.selected_task(state);
    let parent_id = match query {
        ViewQuery::SelectionOnly => None,
        ViewQuery::ChildrenOf(parent_id) => Some(parent_id),
        ViewQuery::SelectedWorkspaceTasks => selected_workspace.as_ref().map(|ws| ws.id),
        ViewQuery::SelectedTaskItems => selected_task.as_ref().map(|task| task.id),
    };
    let children = match parent_id {
        Some(parent_id) => views.children_of(state, parent_id),
        None => Rc::from(Vec::new()),
    };

    ViewSnapshot {
        revision: state.revision,
        parent_id,
        children,
        selected_workspace,
        selected_task,
    }
}

type SnapshotCallback = Box<dyn FnMut(&ViewSnapshot)>;

struct Subscriber {
    query: ViewQuery,
    callback: SnapshotCallback,
}

#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    next_id: u64,
    entries: BTreeMap<SubscriptionId, Subscriber>,
}

impl SubscriberRegistry {
    pub(crate) fn insert(
        &mut self,
        query: ViewQuery,
        callback: impl FnMut(&ViewSnapshot) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            Subscriber {
                query,
                callback: Box::new(callback),
            },
        );
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Delivers the current snapshot to one subscriber.
    pub(crate) fn deliver(&mut self, id: SubscriptionId, state: &StoreState, views: &DerivedViews) {
        if let Some(subscriber) = self.entries.get_mut(&id) {
            let snapshot = build_snapshot(subscriber.query, state, views);
            (subscriber.callback)(&snapshot);
        }
    }

    /// Delivers fresh snapshots to every subscriber.
    pub(crate) fn notify(&mut self, state: &StoreState, views: &DerivedViews) {
        for subscriber in self.entries.values_mut() {
            let snapshot = build_snapshot(subscriber.query, state, views);
            (subscriber.callback)(&snapshot);
        }
    }
}
