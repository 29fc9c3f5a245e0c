use planboard_shared::{
    api::{CreateWorkspaceRequest, UpdateWorkspaceRequest},
    Workspace,
};
use uuid::Uuid;

use super::{api_mutation, Patch};
use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::invalidation;
use crate::invite::Invite;
use crate::mutation::Mutation;

pub fn create_workspace(api: &ApiClient, cache: &QueryCache) -> Mutation<CreateWorkspaceRequest, Workspace> {
    api_mutation(
        api,
        cache,
        "Create workspace",
        "Failed to create workspace. Please try again.",
        |api, req: CreateWorkspaceRequest| async move { api.create_workspace(&req).await },
    )
    .invalidating(invalidation::workspace_changed)
}

pub fn update_workspace(
    api: &ApiClient,
    cache: &QueryCache,
) -> Mutation<Patch<UpdateWorkspaceRequest>, Workspace> {
    api_mutation(
        api,
        cache,
        "Update workspace",
        "Failed to update workspace. Please try again.",
        |api, patch: Patch<UpdateWorkspaceRequest>| async move {
            api.update_workspace(patch.id, &patch.changes).await
        },
    )
    .invalidating(invalidation::workspace_changed)
}

pub fn delete_workspace(api: &ApiClient, cache: &QueryCache) -> Mutation<Uuid, Workspace> {
    api_mutation(
        api,
        cache,
        "Delete workspace",
        "Failed to delete workspace. Please try again.",
        |api, workspace_id: Uuid| async move { api.delete_workspace(workspace_id).await },
    )
    .invalidating(invalidation::workspace_changed)
}

pub fn reset_invite_code(api: &ApiClient, cache: &QueryCache) -> Mutation<Uuid, Workspace> {
    api_mutation(
        api,
        cache,
        "Reset invite link",
        "Failed to reset invite link. Please try again.",
        |api, workspace_id: Uuid| async move { api.reset_invite_code(workspace_id).await },
    )
    .invalidating(invalidation::workspace_changed)
}

pub fn join_workspace(api: &ApiClient, cache: &QueryCache) -> Mutation<Invite, Workspace> {
    api_mutation(
        api,
        cache,
        "Join workspace",
        "Failed to join workspace",
        |api, invite: Invite| async move {
            api.join_workspace(invite.workspace_id, &invite.code).await
        },
    )
    .invalidating(invalidation::workspace_joined)
}
