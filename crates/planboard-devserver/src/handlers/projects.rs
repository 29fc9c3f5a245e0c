use axum::{
    extract::{Multipart, Path, Query, State},
    Extension,
};
use planboard_shared::{
    api::{Page, WorkspaceQuery},
    Analytics, Project,
};
use uuid::Uuid;

use super::{data, read_form, ApiResult};
use crate::error::AppError;
use crate::identity::CurrentUser;
use crate::routes::AppState;

/// GET /api/projects?workspaceId=
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<WorkspaceQuery>,
) -> ApiResult<Page<Project>> {
    let projects = state
        .store
        .read()
        .await
        .list_projects(&user, query.workspace_id)?;
    data(Page::new(projects))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<Project> {
    let form = read_form(multipart).await?;
    let workspace_id = form
        .workspace_id
        .ok_or_else(|| AppError::Validation("workspaceId is required".to_string()))?;
    let name = form
        .name
        .as_deref()
        .ok_or_else(|| AppError::Validation("Name is required".to_string()))?;

    let project = state.store.write().await.create_project(
        &user,
        workspace_id,
        name,
        form.initial_image(),
    )?;
    data(project)
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Project> {
    data(state.store.read().await.get_project(&user, project_id)?)
}

/// PATCH /api/projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Project> {
    let form = read_form(multipart).await?;
    let project = state.store.write().await.update_project(
        &user,
        project_id,
        form.name.as_deref(),
        form.image,
    )?;
    data(project)
}

/// DELETE /api/projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Project> {
    data(state.store.write().await.delete_project(&user, project_id)?)
}

/// GET /api/projects/:id/analytics
pub async fn project_analytics(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Analytics> {
    data(state.store.read().await.project_analytics(&user, project_id)?)
}
