use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use planboard_shared::{
    api::{BulkUpdateTasksRequest, CreateTaskRequest, Page, TaskFilter, UpdateTaskRequest},
    Task,
};
use uuid::Uuid;

use super::{data, ApiResult};
use crate::identity::CurrentUser;
use crate::routes::AppState;

/// GET /api/tasks?workspaceId=&projectId=&assigneeId=&status=&dueDate=&search=
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Page<Task>> {
    let tasks = state.store.read().await.list_tasks(&user, &filter)?;
    data(Page::new(tasks))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Task> {
    let task = state.store.write().await.create_task(&user, req)?;
    tracing::debug!(task_id = %task.id, "task created");
    data(task)
}

/// GET /api/tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Task> {
    data(state.store.read().await.get_task(&user, task_id)?)
}

/// PATCH /api/tasks/:id
pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Task> {
    data(state.store.write().await.update_task(&user, task_id, req)?)
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Task> {
    data(state.store.write().await.delete_task(&user, task_id)?)
}

/// POST /api/tasks/bulk-update
pub async fn bulk_update_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<BulkUpdateTasksRequest>,
) -> ApiResult<Page<Task>> {
    let tasks = state
        .store
        .write()
        .await
        .bulk_update_tasks(&user, &req.tasks)?;
    data(Page::new(tasks))
}
