mod support;

use pretty_assertions::assert_eq;
use support::{loaded_store, task, Call};
use taskflow_client::model::{Status, TaskId, TaskPatch};
use taskflow_client::{DragState, DropOutcome, KanbanDrag, StoreError};

#[tokio::test]
async fn valid_drop_commits_one_status_update() {
    let store = loaded_store(vec![task("t", 1, Status::Todo)]).await;
    let id = TaskId::new("t");
    let mut drag = KanbanDrag::new();

    assert!(drag.start(&store, &id));
    drag.hover(Some(Status::Doing));
    let outcome = drag.release(&store).unwrap();

    let DropOutcome::Committed(pending) = outcome else {
        panic!("expected a committed move");
    };
    assert_eq!(store.task(&id).unwrap().status, Status::Doing);
    pending.await.unwrap();

    assert_eq!(
        store.repository().mutation_calls(),
        vec![Call::Patch(id.clone(), TaskPatch::new().status(Status::Doing))]
    );
    assert_eq!(drag.state(), &DragState::Idle);
}

#[tokio::test]
async fn hovering_does_not_persist() {
    let store = loaded_store(vec![task("t", 1, Status::Todo)]).await;
    let id = TaskId::new("t");
    let mut drag = KanbanDrag::new();

    drag.start(&store, &id);
    drag.hover(Some(Status::Done));
    drag.hover(Some(Status::Doing));

    {
        let tasks = store.tasks();
        let columns = drag.columns(&tasks);
        assert_eq!(columns[1].tasks[0].id, id);
        assert_eq!(tasks[0].status, Status::Todo);
    }
    assert!(store.repository().mutation_calls().is_empty());
}

#[tokio::test]
async fn drop_outside_the_board_reverts() {
    let store = loaded_store(vec![task("t", 1, Status::Todo)]).await;
    let id = TaskId::new("t");
    let mut drag = KanbanDrag::new();

    drag.start(&store, &id);
    drag.hover(Some(Status::Doing));
    drag.hover_target("sidebar");

    assert!(matches!(drag.release(&store), Ok(DropOutcome::Reverted)));
    assert_eq!(store.task(&id).unwrap().status, Status::Todo);
    assert!(store.repository().mutation_calls().is_empty());
}

#[tokio::test]
async fn drop_on_origin_column_is_a_no_op() {
    let store = loaded_store(vec![task("t", 1, Status::Doing)]).await;
    let mut drag = KanbanDrag::new();

    drag.start(&store, &TaskId::new("t"));
    drag.hover(Some(Status::Done));
    drag.hover(Some(Status::Doing));

    assert!(matches!(drag.release(&store), Ok(DropOutcome::Unchanged)));
    assert!(store.repository().mutation_calls().is_empty());
}

#[tokio::test]
async fn cancel_restores_origin_without_persisting() {
    let store = loaded_store(vec![task("t", 1, Status::Todo)]).await;
    let mut drag = KanbanDrag::new();

    drag.start(&store, &TaskId::new("t"));
    drag.hover(Some(Status::Done));
    drag.cancel();

    assert_eq!(drag.columns(&store.tasks())[0].tasks.len(), 1);
    assert!(matches!(drag.release(&store), Ok(DropOutcome::Ignored)));
    assert!(store.repository().mutation_calls().is_empty());
}

#[tokio::test]
async fn unknown_card_cannot_be_picked_up() {
    let store = loaded_store(vec![task("t", 1, Status::Todo)]).await;
    let mut drag = KanbanDrag::new();

    assert!(!drag.start(&store, &TaskId::new("ghost")));
    assert!(!drag.is_dragging());
}

#[tokio::test]
async fn failed_move_is_rolled_back_by_the_store() {
    let store = loaded_store(vec![task("t", 1, Status::Todo)]).await;
    let id = TaskId::new("t");
    let mut drag = KanbanDrag::new();

    drag.start(&store, &id);
    drag.hover(Some(Status::Done));
    let Ok(DropOutcome::Committed(pending)) = drag.release(&store) else {
        panic!("expected a committed move");
    };
    store.repository().fail_next();

    assert!(matches!(pending.await, Err(StoreError::Sync(_))));
    assert_eq!(store.task(&id).unwrap().status, Status::Todo);
    assert!(store.last_error().is_some());
}

#[tokio::test]
async fn card_deleted_mid_drag_reports_not_found() {
    let store = loaded_store(vec![task("t", 1, Status::Todo)]).await;
    let id = TaskId::new("t");
    let mut drag = KanbanDrag::new();

    drag.start(&store, &id);
    store.remove(&id).unwrap().await.unwrap();
    drag.hover(Some(Status::Doing));

    assert!(matches!(drag.release(&store), Err(StoreError::NotFound(_))));
    assert_eq!(drag.state(), &DragState::Idle);
}
