use std::sync::Arc;

use planboard_shared::{schema::validate_invite_code, Workspace, WorkspaceInfo};

use super::{failed, Outcome};
use crate::api::ApiError;
use crate::context::ClientContext;
use crate::feedback::Route;
use crate::hooks;
use crate::invite::Invite;
use crate::mutation::Mutation;

/// The page an invite link opens.
pub struct JoinWorkspace {
    ctx: ClientContext,
    invite: Invite,
    join: Mutation<Invite, Workspace>,
}

impl JoinWorkspace {
    pub fn new(ctx: &ClientContext, invite: Invite) -> Self {
        Self {
            join: hooks::join_workspace(&ctx.api, &ctx.cache),
            ctx: ctx.clone(),
            invite,
        }
    }

    pub fn invite(&self) -> &Invite {
        &self.invite
    }

    pub fn is_pending(&self) -> bool {
        self.join.is_pending()
    }

    /// Name and image shown as "Join {name}".
    pub async fn info(&self) -> Result<Arc<WorkspaceInfo>, ApiError> {
        self.ctx.queries().workspace_info(self.invite.workspace_id).await
    }

    pub async fn join(&self) -> Outcome<Workspace> {
        let code = match validate_invite_code(&self.invite.code).into_result() {
            Ok(code) => code,
            Err(errors) => return Outcome::Rejected(errors),
        };
        let invite = Invite {
            workspace_id: self.invite.workspace_id,
            code,
        };

        match self.join.mutate(invite).await {
            Ok(workspace) => {
                self.ctx.feedback.success("Joined workspace");
                self.ctx.feedback.navigate(Route::Workspace(workspace.id));
                Outcome::Completed(workspace)
            }
            Err(err) => failed(&self.ctx.feedback, err),
        }
    }
}
