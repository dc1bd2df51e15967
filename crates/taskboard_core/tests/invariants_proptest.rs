//! Property-based checks for store-wide invariants under random edits.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use taskboard_core::{BlockType, EntityId, NewBlock, NewWorkspace, StackedLayout, TaskBoard};

#[derive(Debug, Clone)]
enum Op {
    CreateWorkspace,
    CreateTask(usize),
    CreateItem(usize, usize),
    SelectWorkspace(usize),
    SelectTask(usize),
    Reorder(usize, i64),
    Drag(usize, usize),
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::CreateWorkspace),
        any::<usize>().prop_map(Op::CreateTask),
        (any::<usize>(), 0usize..3).prop_map(|(task, kind)| Op::CreateItem(task, kind)),
        any::<usize>().prop_map(Op::SelectWorkspace),
        any::<usize>().prop_map(Op::SelectTask),
        (any::<usize>(), -3i64..12).prop_map(|(block, target)| Op::Reorder(block, target)),
        (any::<usize>(), 0usize..12).prop_map(|(block, row)| Op::Drag(block, row)),
        any::<usize>().prop_map(Op::Delete),
    ]
}

#[derive(Default)]
struct Pools {
    workspaces: Vec<EntityId>,
    tasks: Vec<EntityId>,
    blocks: Vec<EntityId>,
}

fn pick(pool: &[EntityId], index: usize) -> Option<EntityId> {
    if pool.is_empty() {
        None
    } else {
        Some(pool[index % pool.len()])
    }
}

fn apply(board: &mut TaskBoard, pools: &mut Pools, op: Op) {
    match op {
        Op::CreateWorkspace => {
            pools
                .workspaces
                .push(board.create_workspace(NewWorkspace::new("w")));
        }
        Op::CreateTask(index) => {
            if let Some(workspace) = pick(&pools.workspaces, index) {
                if let Ok(id) = board.create_block(NewBlock::task(workspace, "t")) {
                    pools.tasks.push(id);
                    pools.blocks.push(id);
                }
            }
        }
        Op::CreateItem(index, kind) => {
            if let Some(task) = pick(&pools.tasks, index) {
                let draft = match kind {
                    0 => NewBlock::section(task, "s"),
                    1 => NewBlock::note(task, "n"),
                    _ => NewBlock::todo(task, "x"),
                };
                if let Ok(id) = board.create_block(draft) {
                    pools.blocks.push(id);
                }
            }
        }
        Op::SelectWorkspace(index) => {
            if let Some(id) = pick(&pools.workspaces, index) {
                let _ = board.select_workspace(id);
            }
        }
        Op::SelectTask(index) => {
            if let Some(id) = pick(&pools.tasks, index) {
                let _ = board.select_task(id);
            }
        }
        Op::Reorder(index, target) => {
            if let Some(id) = pick(&pools.blocks, index) {
                let _ = board.reorder(id, target);
            }
        }
        Op::Drag(index, row) => {
            let Some(id) = pick(&pools.blocks, index) else {
                return;
            };
            let Some(parent_id) = board.store().block(id).map(|block| block.parent_id) else {
                return;
            };
            let ids: Vec<EntityId> = board
                .children_of(parent_id)
                .iter()
                .map(|block| block.id)
                .collect();
            let layout = StackedLayout::new(ids, 0.0, 10.0);
            if board.begin_drag(id).is_ok() {
                let _ = board.track_pointer(layout.row_center(row) + 1.0, &layout);
                let _ = board.commit_drop();
            }
        }
        Op::Delete(index) => {
            let all: Vec<EntityId> = pools
                .workspaces
                .iter()
                .chain(pools.blocks.iter())
                .copied()
                .collect();
            if let Some(id) = pick(&all, index) {
                board.delete_block(id).ok();
                board.delete_workspace(id).ok();
            }
        }
    }
}

fn check_invariants(board: &TaskBoard) -> Result<(), TestCaseError> {
    let store = board.store();
    let workspaces = store.workspaces();

    let selected_workspaces = workspaces.iter().filter(|ws| ws.is_selected).count();
    prop_assert!(selected_workspaces <= 1);

    for workspace in &workspaces {
        let selected_tasks = store
            .children_of(workspace.id)
            .iter()
            .filter(|task| task.is_selected_task())
            .count();
        prop_assert!(selected_tasks <= 1);
    }

    let mut parents: HashMap<EntityId, usize> = HashMap::new();
    for block in store.blocks() {
        *parents.entry(block.parent_id).or_default() += 1;
        if store.contains(block.parent_id) {
            let parent_kind = store.block(block.parent_id).map(|parent| parent.kind());
            match block.kind() {
                BlockType::Task => prop_assert!(parent_kind.is_none()),
                _ => prop_assert_eq!(parent_kind, Some(BlockType::Task)),
            }
        }
    }

    let mut listed = HashSet::new();
    for (parent_id, count) in parents {
        let children = store.children_of(parent_id);
        prop_assert_eq!(children.len(), count);
        let orders: Vec<i64> = children.iter().map(|block| block.order).collect();
        let dense: Vec<i64> = (0..count as i64).collect();
        prop_assert_eq!(orders, dense);
        for block in children.iter() {
            prop_assert!(listed.insert(block.id));
        }
    }
    prop_assert_eq!(listed.len(), store.blocks().count());
    prop_assert!(!board.is_dragging());
    Ok(())
}

proptest! {
    #[test]
    fn invariants_hold_under_random_edits(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut board = TaskBoard::new();
        let mut pools = Pools::default();
        for op in ops {
            apply(&mut board, &mut pools, op);
            check_invariants(&board)?;
        }
    }

    #[test]
    fn reorder_preserves_membership(count in 1usize..8, from in 0usize..8, target in -4i64..12) {
        let mut board = TaskBoard::new();
        let workspace = board.create_workspace(NewWorkspace::new("w"));
        let task = board.create_block(NewBlock::task(workspace, "t")).unwrap();
        let items: Vec<EntityId> = (0..count)
            .map(|_| board.create_block(NewBlock::todo(task, "x")).unwrap())
            .collect();

        board.reorder(items[from % count], target).unwrap();

        let mut after: Vec<EntityId> = board.children_of(task).iter().map(|block| block.id).collect();
        let expected_index = target.clamp(0, count as i64 - 1) as usize;
        prop_assert_eq!(after[expected_index], items[from % count]);
        after.sort();
        let mut before = items.clone();
        before.sort();
        prop_assert_eq!(after, before);
    }
}
