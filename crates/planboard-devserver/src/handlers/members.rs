use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use planboard_shared::{
    api::{Page, UpdateMemberRequest, WorkspaceQuery},
    Member,
};
use uuid::Uuid;

use super::{data, ApiResult};
use crate::identity::CurrentUser;
use crate::routes::AppState;

/// GET /api/members?workspaceId=
pub async fn list_members(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<WorkspaceQuery>,
) -> ApiResult<Page<Member>> {
    let members = state
        .store
        .read()
        .await
        .list_members(&user, query.workspace_id)?;
    data(Page::new(members))
}

/// PATCH /api/members/:id
pub async fn update_member(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(member_id): Path<Uuid>,
    Json(req): Json<UpdateMemberRequest>,
) -> ApiResult<Member> {
    data(
        state
            .store
            .write()
            .await
            .update_member(&user, member_id, req.role)?,
    )
}

/// DELETE /api/members/:id
pub async fn delete_member(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(member_id): Path<Uuid>,
) -> ApiResult<Member> {
    data(state.store.write().await.delete_member(&user, member_id)?)
}
