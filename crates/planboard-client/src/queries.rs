//! Cached reads. Each method is keyed so that the matching mutation's
//! invalidation policy reaches it.

use std::sync::Arc;

use planboard_shared::{
    api::{Page, TaskFilter},
    Analytics, Member, Project, Task, Workspace, WorkspaceInfo,
};
use uuid::Uuid;

use crate::api::{ApiClient, ApiError};
use crate::cache::{QueryCache, QueryKey};

#[derive(Debug, Clone)]
pub struct Queries {
    api: ApiClient,
    cache: QueryCache,
}

impl Queries {
    pub fn new(api: ApiClient, cache: QueryCache) -> Self {
        Self { api, cache }
    }

    pub async fn workspaces(&self) -> Result<Arc<Page<Workspace>>, ApiError> {
        self.cache
            .fetch(QueryKey::Workspaces, || self.api.list_workspaces())
            .await
    }

    pub async fn workspace(&self, workspace_id: Uuid) -> Result<Arc<Workspace>, ApiError> {
        self.cache
            .fetch(QueryKey::Workspace(workspace_id), || {
                self.api.get_workspace(workspace_id)
            })
            .await
    }

    pub async fn workspace_info(&self, workspace_id: Uuid) -> Result<Arc<WorkspaceInfo>, ApiError> {
        self.cache
            .fetch(QueryKey::WorkspaceInfo(workspace_id), || {
                self.api.get_workspace_info(workspace_id)
            })
            .await
    }

    pub async fn workspace_analytics(&self, workspace_id: Uuid) -> Result<Arc<Analytics>, ApiError> {
        self.cache
            .fetch(QueryKey::WorkspaceAnalytics(workspace_id), || {
                self.api.workspace_analytics(workspace_id)
            })
            .await
    }

    pub async fn projects(&self, workspace_id: Uuid) -> Result<Arc<Page<Project>>, ApiError> {
        self.cache
            .fetch(QueryKey::Projects { workspace_id }, || {
                self.api.list_projects(workspace_id)
            })
            .await
    }

    pub async fn project(&self, project_id: Uuid) -> Result<Arc<Project>, ApiError> {
        self.cache
            .fetch(QueryKey::Project(project_id), || self.api.get_project(project_id))
            .await
    }

    pub async fn project_analytics(&self, project_id: Uuid) -> Result<Arc<Analytics>, ApiError> {
        self.cache
            .fetch(QueryKey::ProjectAnalytics(project_id), || {
                self.api.project_analytics(project_id)
            })
            .await
    }

    pub async fn tasks(&self, filter: TaskFilter) -> Result<Arc<Page<Task>>, ApiError> {
        let key = QueryKey::Tasks(filter.clone());
        self.cache
            .fetch(key, || async move { self.api.list_tasks(&filter).await })
            .await
    }

    pub async fn task(&self, task_id: Uuid) -> Result<Arc<Task>, ApiError> {
        self.cache
            .fetch(QueryKey::Task(task_id), || self.api.get_task(task_id))
            .await
    }

    pub async fn members(&self, workspace_id: Uuid) -> Result<Arc<Page<Member>>, ApiError> {
        self.cache
            .fetch(QueryKey::Members { workspace_id }, || {
                self.api.list_members(workspace_id)
            })
            .await
    }

    /// The caller's membership in a workspace, if any.
    pub async fn current_member(&self, workspace_id: Uuid) -> Result<Option<Member>, ApiError> {
        let Some(identity) = self.api.identity() else {
            return Ok(None);
        };
        let members = self.members(workspace_id).await?;
        Ok(members
            .documents
            .iter()
            .find(|member| member.user_id == identity.user_id)
            .cloned())
    }
}
