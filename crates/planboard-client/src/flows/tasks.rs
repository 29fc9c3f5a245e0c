use planboard_shared::{
    api::{CreateTaskRequest, Page, TaskPosition, UpdateTaskRequest},
    schema::TaskForm,
    Task, TaskStatus,
};
use uuid::Uuid;

use super::{failed, Outcome};
use crate::confirm::{ConfirmGate, ConfirmPrompt};
use crate::context::ClientContext;
use crate::feedback::Route;
use crate::hooks::{self, TaskEdit};
use crate::mutation::Mutation;

/// Gap between neighbouring cards in a column.
pub const POSITION_STEP: i64 = 1000;

fn form_for(task: &Task) -> TaskForm {
    TaskForm {
        name: task.name.clone(),
        status: task.status.as_str().to_string(),
        workspace_id: task.workspace_id.to_string(),
        project_id: task.project_id.to_string(),
        due_date: task
            .due_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        assignee_id: task.assignee_id.to_string(),
        description: task.description.clone().unwrap_or_default(),
    }
}

pub struct CreateTask {
    ctx: ClientContext,
    pub form: TaskForm,
    create: Mutation<CreateTaskRequest, Task>,
}

impl CreateTask {
    /// `project_id` pre-selects the project when opened from a project page.
    pub fn new(ctx: &ClientContext, workspace_id: Uuid, project_id: Option<Uuid>) -> Self {
        let form = TaskForm {
            workspace_id: workspace_id.to_string(),
            project_id: project_id.map(|id| id.to_string()).unwrap_or_default(),
            status: TaskStatus::Todo.as_str().to_string(),
            ..TaskForm::default()
        };
        Self {
            create: hooks::create_task(&ctx.api, &ctx.cache),
            ctx: ctx.clone(),
            form,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.create.is_pending()
    }

    pub async fn submit(&mut self) -> Outcome<Task> {
        let req = match self.form.validate_create().into_result() {
            Ok(req) => req,
            Err(errors) => return Outcome::Rejected(errors),
        };

        match self.create.mutate(req).await {
            Ok(task) => {
                self.form.name.clear();
                self.form.description.clear();
                self.form.due_date.clear();
                self.ctx.feedback.success("Task created");
                Outcome::Completed(task)
            }
            Err(err) => failed(&self.ctx.feedback, err),
        }
    }
}

pub struct EditTask {
    ctx: ClientContext,
    task: Task,
    pub form: TaskForm,
    update: Mutation<TaskEdit, Task>,
}

impl EditTask {
    pub fn new(ctx: &ClientContext, task: Task) -> Self {
        Self {
            update: hooks::update_task(&ctx.api, &ctx.cache),
            form: form_for(&task),
            task,
            ctx: ctx.clone(),
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn is_pending(&self) -> bool {
        self.update.is_pending()
    }

    pub async fn submit(&mut self) -> Outcome<Task> {
        let changes = match self.form.validate_update().into_result() {
            Ok(changes) => changes,
            Err(errors) => return Outcome::Rejected(errors),
        };

        match self.update.mutate(TaskEdit::new(self.task.clone(), changes)).await {
            Ok(task) => {
                self.form = form_for(&task);
                self.task = task.clone();
                self.ctx.feedback.success("Task updated");
                Outcome::Completed(task)
            }
            Err(err) => failed(&self.ctx.feedback, err),
        }
    }
}

/// Row actions on a task: change status, delete.
pub struct TaskActions {
    ctx: ClientContext,
    update: Mutation<TaskEdit, Task>,
    delete: Mutation<Uuid, Task>,
    delete_gate: ConfirmGate,
}

impl TaskActions {
    pub fn new(ctx: &ClientContext) -> Self {
        Self {
            update: hooks::update_task(&ctx.api, &ctx.cache),
            delete: hooks::delete_task(&ctx.api, &ctx.cache),
            delete_gate: ConfirmGate::new(ConfirmPrompt::destructive(
                "Delete task",
                "This action cannot be undone.",
            )),
            ctx: ctx.clone(),
        }
    }

    pub fn delete_gate(&self) -> &ConfirmGate {
        &self.delete_gate
    }

    pub fn is_pending(&self) -> bool {
        self.update.is_pending() || self.delete.is_pending()
    }

    pub async fn set_status(&self, task: &Task, status: TaskStatus) -> Outcome<Task> {
        match self
            .update
            .mutate(TaskEdit::new(task.clone(), UpdateTaskRequest::status(status)))
            .await
        {
            Ok(task) => {
                self.ctx.feedback.success("Task updated");
                Outcome::Completed(task)
            }
            Err(err) => failed(&self.ctx.feedback, err),
        }
    }

    pub async fn delete(&self, task_id: Uuid) -> Outcome<Task> {
        if !self.delete_gate.confirm().await {
            return Outcome::Cancelled;
        }

        match self.delete.mutate(task_id).await {
            Ok(task) => {
                self.ctx.feedback.success("Task deleted");
                self.ctx.feedback.navigate(Route::Tasks(task.workspace_id));
                Outcome::Completed(task)
            }
            Err(err) => failed(&self.ctx.feedback, err),
        }
    }
}

/// Kanban board. Dragging a card renumbers its destination column.
pub struct TaskBoard {
    ctx: ClientContext,
    bulk: Mutation<Vec<TaskPosition>, Page<Task>>,
}

impl TaskBoard {
    pub fn new(ctx: &ClientContext) -> Self {
        Self {
            bulk: hooks::bulk_update_tasks(&ctx.api, &ctx.cache),
            ctx: ctx.clone(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.bulk.is_pending()
    }

    /// Positions that change when `task_id` is dropped into column `to` at
    /// `index`. Unchanged cards are left out.
    pub fn plan_move(tasks: &[Task], task_id: Uuid, to: TaskStatus, index: usize) -> Vec<TaskPosition> {
        let mut column: Vec<&Task> = tasks
            .iter()
            .filter(|task| task.status == to && task.id != task_id)
            .collect();
        column.sort_by_key(|task| task.position);

        let Some(moved) = tasks.iter().find(|task| task.id == task_id) else {
            return Vec::new();
        };
        column.insert(index.min(column.len()), moved);

        column
            .iter()
            .enumerate()
            .map(|(i, task)| TaskPosition {
                id: task.id,
                status: to,
                position: (i as i64 + 1) * POSITION_STEP,
            })
            .filter(|planned| {
                tasks
                    .iter()
                    .find(|task| task.id == planned.id)
                    .is_some_and(|task| task.status != planned.status || task.position != planned.position)
            })
            .collect()
    }

    pub async fn move_card(
        &self,
        tasks: &[Task],
        task_id: Uuid,
        to: TaskStatus,
        index: usize,
    ) -> Outcome<Vec<Task>> {
        let positions = Self::plan_move(tasks, task_id, to, index);
        if positions.is_empty() {
            return Outcome::Completed(Vec::new());
        }

        match self.bulk.mutate(positions).await {
            Ok(page) => Outcome::Completed(page.documents),
            Err(err) => failed(&self.ctx.feedback, err),
        }
    }
}
