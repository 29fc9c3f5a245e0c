use planboard_shared::{
    api::{CreateTaskRequest, Page, TaskPosition, UpdateTaskRequest},
    Task,
};
use uuid::Uuid;

use super::api_mutation;
use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::invalidation;
use crate::mutation::Mutation;

pub fn create_task(api: &ApiClient, cache: &QueryCache) -> Mutation<CreateTaskRequest, Task> {
    api_mutation(
        api,
        cache,
        "Create task",
        "Failed to create task",
        |api, req: CreateTaskRequest| async move { api.create_task(&req).await },
    )
    .invalidating(invalidation::task_changed)
}

/// Input for [`update_task`]: the task as last read, and what to change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEdit {
    pub task: Task,
    pub changes: UpdateTaskRequest,
}

impl TaskEdit {
    pub fn new(task: Task, changes: UpdateTaskRequest) -> Self {
        Self { task, changes }
    }
}

pub fn update_task(api: &ApiClient, cache: &QueryCache) -> Mutation<TaskEdit, Task> {
    api_mutation(
        api,
        cache,
        "Update task",
        "Failed to update task",
        |api, edit: TaskEdit| async move { api.update_task(edit.task.id, &edit.changes).await },
    )
    .invalidating_with(|edit: &TaskEdit, updated: &Task| {
        invalidation::task_edited(&edit.task, updated)
    })
}

pub fn delete_task(api: &ApiClient, cache: &QueryCache) -> Mutation<Uuid, Task> {
    api_mutation(
        api,
        cache,
        "Delete task",
        "Failed to delete task",
        |api, task_id: Uuid| async move { api.delete_task(task_id).await },
    )
    .invalidating(invalidation::task_changed)
}

/// Kanban drag: new status and position for a batch of cards.
pub fn bulk_update_tasks(api: &ApiClient, cache: &QueryCache) -> Mutation<Vec<TaskPosition>, Page<Task>> {
    api_mutation(
        api,
        cache,
        "Update tasks",
        "Failed to update tasks",
        |api, positions: Vec<TaskPosition>| async move { api.bulk_update_tasks(positions).await },
    )
    .invalidating(|page: &Page<Task>| invalidation::tasks_changed(&page.documents))
}
