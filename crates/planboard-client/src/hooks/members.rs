use planboard_shared::{Member, MemberRole};
use uuid::Uuid;

use super::{api_mutation, Patch};
use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::invalidation;
use crate::mutation::Mutation;

pub fn update_member(api: &ApiClient, cache: &QueryCache) -> Mutation<Patch<MemberRole>, Member> {
    api_mutation(
        api,
        cache,
        "Update member",
        "Failed to update member",
        |api, patch: Patch<MemberRole>| async move { api.update_member(patch.id, patch.changes).await },
    )
    .invalidating(invalidation::member_changed)
}

pub fn delete_member(api: &ApiClient, cache: &QueryCache) -> Mutation<Uuid, Member> {
    let caller = api.identity().map(|identity| identity.user_id);
    api_mutation(
        api,
        cache,
        "Remove member",
        "Failed to remove member",
        |api, member_id: Uuid| async move { api.delete_member(member_id).await },
    )
    .invalidating(move |member: &Member| invalidation::member_removed(member, caller))
}
