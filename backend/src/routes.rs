use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskflow_shared::{Clock, CreatedTask, NewTask, Task, TaskId, TaskPatch, UserId};
use tracing::info;

use crate::error::ApiError;
use crate::storage::TaskStorage;

#[derive(Clone)]
pub struct AppState {
    storage: Arc<dyn TaskStorage>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl AppState {
    pub fn new(storage: Arc<dyn TaskStorage>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { storage, clock }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    user_id: Option<String>,
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let user = params
        .user_id
        .filter(|u| !u.trim().is_empty())
        .map(UserId::new)
        .ok_or_else(|| ApiError::BadRequest("userId is required".into()))?;

    let tasks = state.storage.list(&user).await?;
    info!(%user, count = tasks.len(), "listed tasks");
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<NewTask>,
) -> Result<(StatusCode, Json<CreatedTask>), ApiError> {
    payload.validate()?;

    let now = state.clock.now();
    let created = CreatedTask {
        id: TaskId::generate(),
        created_at: now,
        updated_at: now,
    };
    let task = payload.into_task(created.clone());
    state.storage.put(&task).await?;

    info!(id = %task.id, user = %task.user_id, "task created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = TaskId::new(id);
    match state.storage.get(&id).await? {
        Some(task) => Ok(Json(task)),
        None => Err(ApiError::NotFound(id)),
    }
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    patch.validate()?;

    let id = TaskId::new(id);
    let mut task = state
        .storage
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(id.clone()))?;
    task.apply(&patch, state.clock.now());
    state.storage.put(&task).await?;

    info!(%id, "task updated");
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = TaskId::new(id);
    if !state.storage.delete(&id).await? {
        return Err(ApiError::NotFound(id));
    }
    info!(%id, "task deleted");
    Ok(Json(json!({ "message": "Task deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use taskflow_shared::{FixedClock, Status};
    use tower::ServiceExt;

    fn app_at(storage: Arc<MemoryStorage>, minutes: i64) -> Router {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
            + Duration::minutes(minutes);
        router(AppState::new(storage, Arc::new(FixedClock(now))))
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn new_task(user: &str, title: &str) -> Value {
        json!({
            "userId": user,
            "title": title,
            "description": "",
            "dueDate": "2026-10-30",
            "priority": "high",
            "subtasks": [
                { "id": "s1", "title": "one", "completed": true },
                { "id": "s2", "title": "two", "completed": false },
                { "id": "s3", "title": "three", "completed": false }
            ],
            "progress": 99
        })
    }

    async fn create(storage: &Arc<MemoryStorage>, at: i64, body: Value) -> (StatusCode, Value) {
        send(app_at(storage.clone(), at), "POST", "/api/tasks", Some(body)).await
    }

    #[tokio::test]
    async fn create_assigns_identity_and_recomputes_progress() {
        let storage = Arc::new(MemoryStorage::default());
        let (status, created) = create(&storage, 0, new_task("u1", "Write")).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["createdAt"], created["updatedAt"]);

        let uri = format!("/api/tasks/{id}");
        let (status, task) = send(app_at(storage, 0), "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(task["progress"], 33);
        assert_eq!(task["status"], "todo");
        assert_eq!(task["userId"], "u1");
    }

    #[tokio::test]
    async fn list_is_per_user_and_newest_first() {
        let storage = Arc::new(MemoryStorage::default());
        create(&storage, 0, new_task("u1", "first")).await;
        create(&storage, 5, new_task("u1", "second")).await;
        create(&storage, 9, new_task("u2", "other")).await;

        let (status, tasks) = send(app_at(storage, 10), "GET", "/api/tasks?userId=u1", None).await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<&str> = tasks
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn list_requires_user() {
        let (status, body) =
            send(app_at(Arc::default(), 0), "GET", "/api/tasks", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "userId is required");
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let (status, body) = send(
            app_at(Arc::default(), 0),
            "POST",
            "/api/tasks",
            Some(new_task("u1", "  ")),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "title must not be empty");
    }

    #[tokio::test]
    async fn update_applies_patch_and_refreshes_timestamp() {
        let storage = Arc::new(MemoryStorage::default());
        let (_, created) = create(&storage, 0, new_task("u1", "Write")).await;
        let uri = format!("/api/tasks/{}", created["id"].as_str().unwrap());

        let (status, task) = send(
            app_at(storage.clone(), 30),
            "PUT",
            &uri,
            Some(json!({ "status": "doing", "subtasks": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(task["status"], "doing");
        assert_eq!(task["progress"], 0);
        assert_eq!(task["title"], "Write");

        let id = TaskId::new(task["id"].as_str().unwrap());
        let stored = storage.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, Status::Doing);
        assert_eq!(stored.updated_at - stored.created_at, Duration::minutes(30));
    }

    #[tokio::test]
    async fn update_rejects_unknown_status() {
        let storage = Arc::new(MemoryStorage::default());
        let (_, created) = create(&storage, 0, new_task("u1", "Write")).await;
        let uri = format!("/api/tasks/{}", created["id"].as_str().unwrap());

        let body = json!({ "status": "blocked" });
        let (status, _) = send(app_at(storage, 1), "PUT", &uri, Some(body)).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn repeated_subtask_ids_are_unprocessable() {
        let storage = Arc::new(MemoryStorage::default());
        let mut body = new_task("u1", "Write");
        body["subtasks"][1]["id"] = json!("s1");
        let (status, error) = create(&storage, 0, body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error["error"], r#"duplicate subtask id: "s1""#);

        let (_, created) = create(&storage, 0, new_task("u1", "Write")).await;
        let uri = format!("/api/tasks/{}", created["id"].as_str().unwrap());
        let twice = json!({ "subtasks": [
            { "id": "x", "title": "one", "completed": false },
            { "id": "x", "title": "two", "completed": true }
        ] });
        let (status, _) = send(app_at(storage, 1), "PUT", &uri, Some(twice)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn missing_tasks_are_404() {
        let storage: Arc<MemoryStorage> = Arc::default();
        let (status, _) = send(
            app_at(storage.clone(), 0),
            "PUT",
            "/api/tasks/nope",
            Some(json!({ "title": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(app_at(storage, 0), "DELETE", "/api/tasks/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "task not found: nope");
    }

    #[tokio::test]
    async fn delete_removes_task() {
        let storage = Arc::new(MemoryStorage::default());
        let (_, created) = create(&storage, 0, new_task("u1", "Write")).await;
        let uri = format!("/api/tasks/{}", created["id"].as_str().unwrap());

        let (status, _) = send(app_at(storage.clone(), 1), "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(app_at(storage, 2), "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
