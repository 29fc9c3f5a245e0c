use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};
use planboard_shared::{
    api::{JoinWorkspaceRequest, Page},
    Analytics, Workspace, WorkspaceInfo,
};
use uuid::Uuid;

use super::{data, read_form, ApiResult};
use crate::error::AppError;
use crate::identity::CurrentUser;
use crate::routes::AppState;

/// GET /api/workspaces
pub async fn list_workspaces(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Page<Workspace>> {
    let workspaces = state.store.read().await.list_workspaces(&user);
    data(Page::new(workspaces))
}

/// POST /api/workspaces
pub async fn create_workspace(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<Workspace> {
    let form = read_form(multipart).await?;
    let name = form
        .name
        .as_deref()
        .ok_or_else(|| AppError::Validation("Name is required".to_string()))?;

    let workspace = state
        .store
        .write()
        .await
        .create_workspace(&user, name, form.initial_image())?;
    tracing::info!(workspace_id = %workspace.id, "workspace created");
    data(workspace)
}

/// GET /api/workspaces/:id
pub async fn get_workspace(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(workspace_id): Path<Uuid>,
) -> ApiResult<Workspace> {
    data(state.store.read().await.get_workspace(&user, workspace_id)?)
}

/// GET /api/workspaces/:id/info
pub async fn get_workspace_info(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
) -> ApiResult<WorkspaceInfo> {
    data(state.store.read().await.workspace_info(workspace_id)?)
}

/// PATCH /api/workspaces/:id
pub async fn update_workspace(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(workspace_id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Workspace> {
    let form = read_form(multipart).await?;
    let workspace = state.store.write().await.update_workspace(
        &user,
        workspace_id,
        form.name.as_deref(),
        form.image,
    )?;
    data(workspace)
}

/// DELETE /api/workspaces/:id
pub async fn delete_workspace(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(workspace_id): Path<Uuid>,
) -> ApiResult<Workspace> {
    let workspace = state
        .store
        .write()
        .await
        .delete_workspace(&user, workspace_id)?;
    tracing::info!(workspace_id = %workspace.id, "workspace deleted");
    data(workspace)
}

/// POST /api/workspaces/:id/reset-invite-code
pub async fn reset_invite_code(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(workspace_id): Path<Uuid>,
) -> ApiResult<Workspace> {
    let workspace = state
        .store
        .write()
        .await
        .reset_invite_code(&user, workspace_id)?;
    tracing::info!(workspace_id = %workspace.id, "invite code reset");
    data(workspace)
}

/// POST /api/workspaces/:id/join
pub async fn join_workspace(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(workspace_id): Path<Uuid>,
    Json(req): Json<JoinWorkspaceRequest>,
) -> ApiResult<Workspace> {
    let workspace = state
        .store
        .write()
        .await
        .join_workspace(&user, workspace_id, &req.code)?;
    tracing::info!(workspace_id = %workspace.id, user_id = %user.id, "member joined");
    data(workspace)
}

/// GET /api/workspaces/:id/analytics
pub async fn workspace_analytics(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(workspace_id): Path<Uuid>,
) -> ApiResult<Analytics> {
    data(state.store.read().await.workspace_analytics(&user, workspace_id)?)
}
