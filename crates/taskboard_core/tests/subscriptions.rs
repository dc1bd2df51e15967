use std::cell::RefCell;
use std::rc::Rc;
use taskboard_core::{
    BlockPatch, BlockType, EntityStore, NewBlock, NewWorkspace, SelectionPolicy, ViewQuery,
    ViewSnapshot,
};

fn recorder() -> (
    Rc<RefCell<Vec<ViewSnapshot>>>,
    impl FnMut(&ViewSnapshot) + 'static,
) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    (seen, move |snapshot: &ViewSnapshot| {
        sink.borrow_mut().push(snapshot.clone())
    })
}

#[test]
fn subscribe_delivers_current_snapshot_immediately() {
    let mut store = EntityStore::new();
    let workspace = store.create_workspace(NewWorkspace::new("w"));
    let task = store.create_block(NewBlock::task(workspace, "t")).unwrap();

    let (seen, callback) = recorder();
    store.subscribe(ViewQuery::ChildrenOf(workspace), callback);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].revision, store.revision());
    assert_eq!(seen[0].parent_id, Some(workspace));
    assert_eq!(seen[0].child_ids(), vec![task]);
}

#[test]
fn every_mutation_notifies_once() {
    let mut store = EntityStore::new();
    let workspace = store.create_workspace(NewWorkspace::new("w"));
    let (seen, callback) = recorder();
    store.subscribe(ViewQuery::ChildrenOf(workspace), callback);

    let task = store.create_block(NewBlock::task(workspace, "t")).unwrap();
    store
        .update_block(task, BlockPatch::title(BlockType::Task, "renamed"))
        .unwrap();
    store.delete(task).unwrap();

    let seen = seen.borrow();
    let sizes: Vec<usize> = seen.iter().map(|snapshot| snapshot.children.len()).collect();
    assert_eq!(sizes, vec![0, 1, 1, 0]);
    assert_eq!(seen[2].children[0].title(), "renamed");
    let revisions: Vec<u64> = seen.iter().map(|snapshot| snapshot.revision).collect();
    assert!(revisions.windows(2).all(|pair| pair[1] == pair[0] + 1));
}

#[test]
fn failed_mutation_notifies_nobody() {
    let mut store = EntityStore::new();
    let workspace = store.create_workspace(NewWorkspace::new("w"));
    let (seen, callback) = recorder();
    store.subscribe(ViewQuery::SelectionOnly, callback);

    assert!(store.create_block(NewBlock::todo(workspace, "x")).is_err());
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn unsubscribe_stops_delivery() {
    let mut store = EntityStore::new();
    let (seen, callback) = recorder();
    let id = store.subscribe(ViewQuery::SelectionOnly, callback);
    assert_eq!(store.subscriber_count(), 1);

    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    store.create_workspace(NewWorkspace::new("w"));

    assert_eq!(store.subscriber_count(), 0);
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn selected_task_items_follow_selection_changes() {
    let mut store = EntityStore::new();
    let workspace = store.create_workspace(NewWorkspace::new("w"));
    let first = store.create_block(NewBlock::task(workspace, "first")).unwrap();
    let second = store.create_block(NewBlock::task(workspace, "second")).unwrap();
    let first_item = store.create_block(NewBlock::note(first, "a")).unwrap();
    let second_item = store.create_block(NewBlock::note(second, "b")).unwrap();

    let (seen, callback) = recorder();
    store.subscribe(ViewQuery::SelectedTaskItems, callback);

    let mut policy = SelectionPolicy::new(&mut store);
    policy.select_workspace(workspace).unwrap();
    policy.select_task(first).unwrap();
    policy.select_task(second).unwrap();

    let seen = seen.borrow();
    let parents: Vec<_> = seen.iter().map(|snapshot| snapshot.parent_id).collect();
    assert_eq!(parents, vec![None, None, Some(first), Some(second)]);
    assert_eq!(seen[2].child_ids(), vec![first_item]);
    assert_eq!(seen[3].child_ids(), vec![second_item]);
    assert_eq!(seen[3].selected_workspace.as_ref().unwrap().id, workspace);
}

#[test]
fn children_view_is_shared_until_the_store_changes() {
    let mut store = EntityStore::new();
    let workspace = store.create_workspace(NewWorkspace::new("w"));
    store.create_block(NewBlock::task(workspace, "t")).unwrap();

    let first = store.children_of(workspace);
    let second = store.children_of(workspace);
    assert!(Rc::ptr_eq(&first, &second));

    store.create_block(NewBlock::task(workspace, "u")).unwrap();
    let third = store.children_of(workspace);
    assert!(!Rc::ptr_eq(&first, &third));
    assert_eq!(first.len(), 1);
    assert_eq!(third.len(), 2);
}

#[test]
fn snapshots_share_the_memoized_child_list() {
    let mut store = EntityStore::new();
    let workspace = store.create_workspace(NewWorkspace::new("w"));
    store.create_block(NewBlock::task(workspace, "t")).unwrap();

    let (seen, callback) = recorder();
    store.subscribe(ViewQuery::ChildrenOf(workspace), callback);

    let direct = store.children_of(workspace);
    assert!(Rc::ptr_eq(&seen.borrow()[0].children, &direct));
}
