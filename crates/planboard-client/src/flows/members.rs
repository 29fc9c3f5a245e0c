use std::sync::Arc;

use planboard_shared::{api::Page, Member, MemberRole};
use uuid::Uuid;

use super::{failed, Outcome};
use crate::api::ApiError;
use crate::confirm::{ConfirmGate, ConfirmPrompt};
use crate::context::ClientContext;
use crate::feedback::Route;
use crate::hooks::{self, Patch};
use crate::mutation::Mutation;

pub struct MemberList {
    ctx: ClientContext,
    workspace_id: Uuid,
    update: Mutation<Patch<MemberRole>, Member>,
    remove: Mutation<Uuid, Member>,
    remove_gate: ConfirmGate,
}

impl MemberList {
    pub fn new(ctx: &ClientContext, workspace_id: Uuid) -> Self {
        Self {
            update: hooks::update_member(&ctx.api, &ctx.cache),
            remove: hooks::delete_member(&ctx.api, &ctx.cache),
            remove_gate: ConfirmGate::new(ConfirmPrompt::destructive(
                "Remove member",
                "This member will be removed from the workspace",
            )),
            ctx: ctx.clone(),
            workspace_id,
        }
    }

    pub fn remove_gate(&self) -> &ConfirmGate {
        &self.remove_gate
    }

    pub fn is_pending(&self) -> bool {
        self.update.is_pending() || self.remove.is_pending()
    }

    pub async fn members(&self) -> Result<Arc<Page<Member>>, ApiError> {
        self.ctx.queries().members(self.workspace_id).await
    }

    pub async fn set_role(&self, member_id: Uuid, role: MemberRole) -> Outcome<Member> {
        match self.update.mutate(Patch::new(member_id, role)).await {
            Ok(member) => {
                self.ctx.feedback.success("Member updated");
                Outcome::Completed(member)
            }
            Err(err) => failed(&self.ctx.feedback, err),
        }
    }

    pub async fn remove(&self, member_id: Uuid) -> Outcome<Member> {
        if !self.remove_gate.confirm().await {
            return Outcome::Cancelled;
        }

        match self.remove.mutate(member_id).await {
            Ok(member) => {
                self.ctx.feedback.success("Member removed");
                let left = self
                    .ctx
                    .api
                    .identity()
                    .is_some_and(|identity| identity.user_id == member.user_id);
                if left {
                    self.ctx.feedback.navigate(Route::Home);
                }
                Outcome::Completed(member)
            }
            Err(err) => failed(&self.ctx.feedback, err),
        }
    }
}
