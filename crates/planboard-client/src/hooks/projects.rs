use planboard_shared::{
    api::{CreateProjectRequest, UpdateProjectRequest},
    Project,
};
use uuid::Uuid;

use super::{api_mutation, Patch};
use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::invalidation;
use crate::mutation::Mutation;

pub fn create_project(api: &ApiClient, cache: &QueryCache) -> Mutation<CreateProjectRequest, Project> {
    api_mutation(
        api,
        cache,
        "Create project",
        "Failed to create project. Please try again.",
        |api, req: CreateProjectRequest| async move { api.create_project(&req).await },
    )
    .invalidating(invalidation::project_changed)
}

pub fn update_project(
    api: &ApiClient,
    cache: &QueryCache,
) -> Mutation<Patch<UpdateProjectRequest>, Project> {
    api_mutation(
        api,
        cache,
        "Update project",
        "Failed to update project. Please try again.",
        |api, patch: Patch<UpdateProjectRequest>| async move {
            api.update_project(patch.id, &patch.changes).await
        },
    )
    .invalidating(invalidation::project_changed)
}

pub fn delete_project(api: &ApiClient, cache: &QueryCache) -> Mutation<Uuid, Project> {
    api_mutation(
        api,
        cache,
        "Delete project",
        "Failed to delete project. Please try again.",
        |api, project_id: Uuid| async move { api.delete_project(project_id).await },
    )
    .invalidating(invalidation::project_deleted)
}
