//! Process-memory records behind the development backend.
//!
//! Every rule the hosted backend enforces on the client's behalf lives here:
//! membership checks, invite codes, the last-member and last-admin guards.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use planboard_shared::{
    api::{CreateTaskRequest, TaskFilter, TaskPosition, UpdateTaskRequest},
    Analytics, Member, MemberRole, Project, Task, TaskStatus, Workspace, WorkspaceInfo,
    INVITE_CODE_LEN,
};
use rand::{distributions::Alphanumeric, Rng};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::error::AppError;
use crate::identity::CurrentUser;

/// Gap between neighbouring cards in one board column.
const POSITION_STEP: i64 = 1000;

pub fn generate_invite_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(INVITE_CODE_LEN)
        .map(char::from)
        .collect()
}

/// What an update request does to a stored image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageUpdate {
    Keep,
    Set(String),
    Clear,
}

impl ImageUpdate {
    fn apply(self, image_url: &mut Option<String>) {
        match self {
            Self::Keep => {}
            Self::Set(url) => *image_url = Some(url),
            Self::Clear => *image_url = None,
        }
    }
}

fn required_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    Ok(name.to_string())
}

#[derive(Clone, Default)]
pub struct Store {
    records: Arc<RwLock<Records>>,
}

impl Store {
    pub async fn read(&self) -> RwLockReadGuard<'_, Records> {
        self.records.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Records> {
        self.records.write().await
    }
}

#[derive(Debug, Default)]
pub struct Records {
    workspaces: HashMap<Uuid, Workspace>,
    projects: HashMap<Uuid, Project>,
    tasks: HashMap<Uuid, Task>,
    members: HashMap<Uuid, Member>,
}

impl Records {
    fn members_of(&self, workspace_id: Uuid) -> impl Iterator<Item = &Member> {
        self.members
            .values()
            .filter(move |member| member.workspace_id == workspace_id)
    }

    fn membership(&self, workspace_id: Uuid, user_id: Uuid) -> Option<&Member> {
        self.members_of(workspace_id)
            .find(|member| member.user_id == user_id)
    }

    fn require_member(&self, workspace_id: Uuid, user: &CurrentUser) -> Result<&Member, AppError> {
        self.membership(workspace_id, user.id)
            .ok_or(AppError::Unauthorized)
    }

    fn require_admin(&self, workspace_id: Uuid, user: &CurrentUser) -> Result<&Member, AppError> {
        let member = self.require_member(workspace_id, user)?;
        if !member.role.is_admin() {
            return Err(AppError::Unauthorized);
        }
        Ok(member)
    }

    fn workspace(&self, id: Uuid) -> Result<&Workspace, AppError> {
        self.workspaces.get(&id).ok_or(AppError::NotFound)
    }

    fn project(&self, id: Uuid) -> Result<&Project, AppError> {
        self.projects.get(&id).ok_or(AppError::NotFound)
    }

    fn task(&self, id: Uuid) -> Result<&Task, AppError> {
        self.tasks.get(&id).ok_or(AppError::NotFound)
    }

    fn add_member(&mut self, workspace_id: Uuid, user: &CurrentUser, role: MemberRole) -> Member {
        let member = Member {
            id: Uuid::new_v4(),
            user_id: user.id,
            workspace_id,
            name: user.name.clone(),
            email: user.email.clone(),
            role,
        };
        self.members.insert(member.id, member.clone());
        member
    }

    // ============ Workspaces ============

    pub fn list_workspaces(&self, user: &CurrentUser) -> Vec<Workspace> {
        let mut workspaces: Vec<Workspace> = self
            .members
            .values()
            .filter(|member| member.user_id == user.id)
            .filter_map(|member| self.workspaces.get(&member.workspace_id))
            .cloned()
            .collect();
        workspaces.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        workspaces
    }

    pub fn create_workspace(
        &mut self,
        user: &CurrentUser,
        name: &str,
        image_url: Option<String>,
    ) -> Result<Workspace, AppError> {
        let workspace = Workspace {
            id: Uuid::new_v4(),
            name: required_name(name)?,
            image_url,
            invite_code: generate_invite_code(),
            user_id: user.id,
            created_at: Utc::now(),
        };

        self.workspaces.insert(workspace.id, workspace.clone());
        self.add_member(workspace.id, user, MemberRole::Admin);

        Ok(workspace)
    }

    pub fn get_workspace(&self, user: &CurrentUser, id: Uuid) -> Result<Workspace, AppError> {
        let workspace = self.workspace(id)?;
        self.require_member(id, user)?;
        Ok(workspace.clone())
    }

    pub fn workspace_info(&self, id: Uuid) -> Result<WorkspaceInfo, AppError> {
        self.workspace(id).map(WorkspaceInfo::from)
    }

    pub fn update_workspace(
        &mut self,
        user: &CurrentUser,
        id: Uuid,
        name: Option<&str>,
        image: ImageUpdate,
    ) -> Result<Workspace, AppError> {
        self.workspace(id)?;
        self.require_admin(id, user)?;
        let name = name.map(required_name).transpose()?;

        let workspace = self.workspaces.get_mut(&id).ok_or(AppError::NotFound)?;
        if let Some(name) = name {
            workspace.name = name;
        }
        image.apply(&mut workspace.image_url);

        Ok(workspace.clone())
    }

    pub fn delete_workspace(&mut self, user: &CurrentUser, id: Uuid) -> Result<Workspace, AppError> {
        self.workspace(id)?;
        self.require_admin(id, user)?;

        self.members.retain(|_, member| member.workspace_id != id);
        self.projects.retain(|_, project| project.workspace_id != id);
        self.tasks.retain(|_, task| task.workspace_id != id);

        self.workspaces.remove(&id).ok_or(AppError::NotFound)
    }

    /// Replace the invite code. The previous code stops working at once.
    pub fn reset_invite_code(&mut self, user: &CurrentUser, id: Uuid) -> Result<Workspace, AppError> {
        self.workspace(id)?;
        self.require_admin(id, user)?;

        let workspace = self.workspaces.get_mut(&id).ok_or(AppError::NotFound)?;
        let previous = std::mem::take(&mut workspace.invite_code);
        let mut code = generate_invite_code();
        while code == previous {
            code = generate_invite_code();
        }
        workspace.invite_code = code;

        Ok(workspace.clone())
    }

    /// Seed a known invite code.
    #[cfg(any(test, feature = "fixtures"))]
    pub fn set_invite_code(&mut self, id: Uuid, code: &str) -> Result<Workspace, AppError> {
        let workspace = self.workspaces.get_mut(&id).ok_or(AppError::NotFound)?;
        workspace.invite_code = code.to_string();
        Ok(workspace.clone())
    }

    pub fn join_workspace(
        &mut self,
        user: &CurrentUser,
        id: Uuid,
        code: &str,
    ) -> Result<Workspace, AppError> {
        let workspace = self.workspace(id)?.clone();

        if self.membership(id, user.id).is_some() {
            return Err(AppError::domain("Already a member"));
        }
        if workspace.invite_code != code {
            return Err(AppError::domain("Invalid invite code"));
        }

        self.add_member(id, user, MemberRole::Member);
        Ok(workspace)
    }

    pub fn workspace_analytics(&self, user: &CurrentUser, workspace_id: Uuid) -> Result<Analytics, AppError> {
        self.workspace(workspace_id)?;
        let member = self.require_member(workspace_id, user)?;
        let tasks = self
            .tasks
            .values()
            .filter(|task| task.workspace_id == workspace_id);
        Ok(analytics(tasks, member.id, Utc::now().date_naive()))
    }

    // ============ Projects ============

    pub fn list_projects(&self, user: &CurrentUser, workspace_id: Uuid) -> Result<Vec<Project>, AppError> {
        self.require_member(workspace_id, user)?;
        let mut projects: Vec<Project> = self
            .projects
            .values()
            .filter(|project| project.workspace_id == workspace_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    pub fn create_project(
        &mut self,
        user: &CurrentUser,
        workspace_id: Uuid,
        name: &str,
        image_url: Option<String>,
    ) -> Result<Project, AppError> {
        self.workspace(workspace_id)?;
        self.require_member(workspace_id, user)?;

        let project = Project {
            id: Uuid::new_v4(),
            name: required_name(name)?,
            image_url,
            workspace_id,
            created_at: Utc::now(),
        };
        self.projects.insert(project.id, project.clone());
        Ok(project)
    }

    pub fn get_project(&self, user: &CurrentUser, id: Uuid) -> Result<Project, AppError> {
        let project = self.project(id)?;
        self.require_member(project.workspace_id, user)?;
        Ok(project.clone())
    }

    pub fn update_project(
        &mut self,
        user: &CurrentUser,
        id: Uuid,
        name: Option<&str>,
        image: ImageUpdate,
    ) -> Result<Project, AppError> {
        let workspace_id = self.project(id)?.workspace_id;
        self.require_member(workspace_id, user)?;
        let name = name.map(required_name).transpose()?;

        let project = self.projects.get_mut(&id).ok_or(AppError::NotFound)?;
        if let Some(name) = name {
            project.name = name;
        }
        image.apply(&mut project.image_url);

        Ok(project.clone())
    }

    pub fn delete_project(&mut self, user: &CurrentUser, id: Uuid) -> Result<Project, AppError> {
        let workspace_id = self.project(id)?.workspace_id;
        self.require_member(workspace_id, user)?;

        self.tasks.retain(|_, task| task.project_id != id);
        self.projects.remove(&id).ok_or(AppError::NotFound)
    }

    pub fn project_analytics(&self, user: &CurrentUser, id: Uuid) -> Result<Analytics, AppError> {
        let project = self.project(id)?;
        let member = self.require_member(project.workspace_id, user)?;
        let tasks = self.tasks.values().filter(|task| task.project_id == id);
        Ok(analytics(tasks, member.id, Utc::now().date_naive()))
    }

    // ============ Tasks ============

    fn check_task_refs(&self, workspace_id: Uuid, project_id: Uuid, assignee_id: Uuid) -> Result<(), AppError> {
        match self.projects.get(&project_id) {
            Some(project) if project.workspace_id == workspace_id => {}
            _ => {
                return Err(AppError::Validation(
                    "Project does not belong to this workspace".to_string(),
                ))
            }
        }
        match self.members.get(&assignee_id) {
            Some(member) if member.workspace_id == workspace_id => Ok(()),
            _ => Err(AppError::Validation(
                "Assignee is not a member of this workspace".to_string(),
            )),
        }
    }

    fn next_position(&self, workspace_id: Uuid, status: TaskStatus) -> i64 {
        self.tasks
            .values()
            .filter(|task| task.workspace_id == workspace_id && task.status == status)
            .map(|task| task.position)
            .max()
            .map_or(POSITION_STEP, |highest| highest + POSITION_STEP)
    }

    pub fn list_tasks(&self, user: &CurrentUser, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        self.require_member(filter.workspace_id, user)?;
        let search = filter.search.as_deref().map(str::to_lowercase);

        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|task| task.workspace_id == filter.workspace_id)
            .filter(|task| filter.project_id.map_or(true, |id| task.project_id == id))
            .filter(|task| filter.assignee_id.map_or(true, |id| task.assignee_id == id))
            .filter(|task| filter.status.map_or(true, |status| task.status == status))
            .filter(|task| filter.due_date.map_or(true, |due| task.due_date == Some(due)))
            .filter(|task| {
                search
                    .as_deref()
                    .map_or(true, |q| task.name.to_lowercase().contains(q))
            })
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    pub fn create_task(&mut self, user: &CurrentUser, req: CreateTaskRequest) -> Result<Task, AppError> {
        self.workspace(req.workspace_id)?;
        self.require_member(req.workspace_id, user)?;
        self.check_task_refs(req.workspace_id, req.project_id, req.assignee_id)?;

        let task = Task {
            id: Uuid::new_v4(),
            name: required_name(&req.name)?,
            status: req.status,
            due_date: req.due_date,
            assignee_id: req.assignee_id,
            project_id: req.project_id,
            workspace_id: req.workspace_id,
            description: req.description,
            position: self.next_position(req.workspace_id, req.status),
            created_at: Utc::now(),
        };
        self.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    pub fn get_task(&self, user: &CurrentUser, id: Uuid) -> Result<Task, AppError> {
        let task = self.task(id)?;
        self.require_member(task.workspace_id, user)?;
        Ok(task.clone())
    }

    pub fn update_task(
        &mut self,
        user: &CurrentUser,
        id: Uuid,
        req: UpdateTaskRequest,
    ) -> Result<Task, AppError> {
        let mut task = self.task(id)?.clone();
        self.require_member(task.workspace_id, user)?;

        let project_id = req.project_id.unwrap_or(task.project_id);
        let assignee_id = req.assignee_id.unwrap_or(task.assignee_id);
        self.check_task_refs(task.workspace_id, project_id, assignee_id)?;

        if let Some(name) = req.name {
            task.name = required_name(&name)?;
        }
        if let Some(status) = req.status {
            task.status = status;
        }
        if req.due_date.is_some() {
            task.due_date = req.due_date;
        }
        if req.description.is_some() {
            task.description = req.description;
        }
        task.project_id = project_id;
        task.assignee_id = assignee_id;

        self.tasks.insert(id, task.clone());
        Ok(task)
    }

    pub fn delete_task(&mut self, user: &CurrentUser, id: Uuid) -> Result<Task, AppError> {
        let workspace_id = self.task(id)?.workspace_id;
        self.require_member(workspace_id, user)?;
        self.tasks.remove(&id).ok_or(AppError::NotFound)
    }

    /// Apply a kanban drag: new column and position for each listed card.
    pub fn bulk_update_tasks(
        &mut self,
        user: &CurrentUser,
        updates: &[TaskPosition],
    ) -> Result<Vec<Task>, AppError> {
        let mut workspace_id = None;
        for update in updates {
            let task = self.task(update.id)?;
            match workspace_id {
                None => workspace_id = Some(task.workspace_id),
                Some(id) if id != task.workspace_id => {
                    return Err(AppError::Validation(
                        "All tasks must belong to the same workspace".to_string(),
                    ))
                }
                Some(_) => {}
            }
        }
        if let Some(id) = workspace_id {
            self.require_member(id, user)?;
        }

        let mut updated = Vec::with_capacity(updates.len());
        for update in updates {
            if let Some(task) = self.tasks.get_mut(&update.id) {
                task.status = update.status;
                task.position = update.position;
                updated.push(task.clone());
            }
        }
        Ok(updated)
    }

    // ============ Members ============

    pub fn list_members(&self, user: &CurrentUser, workspace_id: Uuid) -> Result<Vec<Member>, AppError> {
        self.require_member(workspace_id, user)?;
        let mut members: Vec<Member> = self.members_of(workspace_id).cloned().collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(members)
    }

    pub fn update_member(
        &mut self,
        user: &CurrentUser,
        member_id: Uuid,
        role: MemberRole,
    ) -> Result<Member, AppError> {
        let target = self.members.get(&member_id).ok_or(AppError::NotFound)?.clone();
        self.require_admin(target.workspace_id, user)?;

        let total = self.members_of(target.workspace_id).count();
        if total == 1 {
            return Err(AppError::domain("Cannot downgrade the only member"));
        }
        let admins = self
            .members_of(target.workspace_id)
            .filter(|member| member.role.is_admin())
            .count();
        if target.role.is_admin() && !role.is_admin() && admins == 1 {
            return Err(AppError::domain("Cannot downgrade the last admin"));
        }

        let member = self.members.get_mut(&member_id).ok_or(AppError::NotFound)?;
        member.role = role;
        Ok(member.clone())
    }

    /// Admins may remove anyone; members may remove themselves.
    pub fn delete_member(&mut self, user: &CurrentUser, member_id: Uuid) -> Result<Member, AppError> {
        let target = self.members.get(&member_id).ok_or(AppError::NotFound)?.clone();
        let caller = self.require_member(target.workspace_id, user)?;
        if caller.id != target.id && !caller.role.is_admin() {
            return Err(AppError::Unauthorized);
        }

        let total = self.members_of(target.workspace_id).count();
        if total == 1 {
            return Err(AppError::domain("Cannot delete the only member"));
        }
        let admins = self
            .members_of(target.workspace_id)
            .filter(|member| member.role.is_admin())
            .count();
        if target.role.is_admin() && admins == 1 {
            return Err(AppError::domain("Cannot remove the last admin"));
        }

        self.members.remove(&member_id).ok_or(AppError::NotFound)
    }
}

/// First day of this month and of the previous one.
fn month_starts(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let this_month = today.with_day(1).unwrap_or(today);
    let last_month = this_month
        .pred_opt()
        .and_then(|day| day.with_day(1))
        .unwrap_or(this_month);
    (this_month, last_month)
}

fn analytics<'a>(tasks: impl Iterator<Item = &'a Task>, member_id: Uuid, today: NaiveDate) -> Analytics {
    let (this_month, last_month) = month_starts(today);
    // total, assigned, completed, incomplete, overdue
    let mut current = [0i64; 5];
    let mut previous = [0i64; 5];

    for task in tasks {
        let created = task.created_at.date_naive();
        let bucket = if created >= this_month {
            &mut current
        } else if created >= last_month {
            &mut previous
        } else {
            continue;
        };

        bucket[0] += 1;
        if task.assignee_id == member_id {
            bucket[1] += 1;
        }
        if task.status.is_done() {
            bucket[2] += 1;
        } else {
            bucket[3] += 1;
        }
        if task.is_overdue(today) {
            bucket[4] += 1;
        }
    }

    Analytics {
        task_count: current[0],
        task_difference: current[0] - previous[0],
        assigned_task_count: current[1],
        assigned_task_difference: current[1] - previous[1],
        completed_task_count: current[2],
        completed_task_difference: current[2] - previous[2],
        incomplete_task_count: current[3],
        incomplete_task_difference: current[3] - previous[3],
        overdue_task_count: current[4],
        overdue_task_difference: current[4] - previous[4],
    }
}
