use planboard_shared::{
    api::{CreateWorkspaceRequest, UpdateWorkspaceRequest},
    schema::WorkspaceForm,
    upload::ImageChange,
    Workspace,
};
use uuid::Uuid;

use super::{failed, Outcome};
use crate::confirm::{ConfirmGate, ConfirmPrompt};
use crate::context::ClientContext;
use crate::feedback::Route;
use crate::hooks::{self, Patch};
use crate::invite::invite_link;
use crate::mutation::Mutation;
use crate::upload::ImageStager;

pub struct CreateWorkspace {
    ctx: ClientContext,
    pub name: String,
    pub image: ImageStager,
    create: Mutation<CreateWorkspaceRequest, Workspace>,
}

impl CreateWorkspace {
    pub fn new(ctx: &ClientContext) -> Self {
        Self {
            create: hooks::create_workspace(&ctx.api, &ctx.cache),
            ctx: ctx.clone(),
            name: String::new(),
            image: ImageStager::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.create.is_pending()
    }

    pub async fn submit(&mut self) -> Outcome<Workspace> {
        let form = WorkspaceForm {
            name: self.name.clone(),
            image: self.image.change(),
        };
        let req = match form.validate_create().into_result() {
            Ok(req) => req,
            Err(errors) => return Outcome::Rejected(errors),
        };

        match self.create.mutate(req).await {
            Ok(workspace) => {
                self.name.clear();
                self.image = ImageStager::new();
                self.ctx.feedback.success("Workspace created");
                self.ctx.feedback.navigate(Route::Workspace(workspace.id));
                Outcome::Completed(workspace)
            }
            Err(err) => failed(&self.ctx.feedback, err),
        }
    }
}

/// The workspace settings page: rename, change image, reset the invite link,
/// delete.
pub struct WorkspaceSettings {
    ctx: ClientContext,
    workspace: Workspace,
    pub name: String,
    pub image: ImageStager,
    update: Mutation<Patch<UpdateWorkspaceRequest>, Workspace>,
    delete: Mutation<Uuid, Workspace>,
    reset: Mutation<Uuid, Workspace>,
    delete_gate: ConfirmGate,
    reset_gate: ConfirmGate,
}

impl WorkspaceSettings {
    pub fn new(ctx: &ClientContext, workspace: Workspace) -> Self {
        Self {
            update: hooks::update_workspace(&ctx.api, &ctx.cache),
            delete: hooks::delete_workspace(&ctx.api, &ctx.cache),
            reset: hooks::reset_invite_code(&ctx.api, &ctx.cache),
            delete_gate: ConfirmGate::new(ConfirmPrompt::destructive(
                "Delete Workspace",
                "This action cannot be undone.",
            )),
            reset_gate: ConfirmGate::new(ConfirmPrompt::destructive(
                "Reset invite link",
                "This will invalidate the current invite link",
            )),
            name: workspace.name.clone(),
            image: ImageStager::with_existing(workspace.image_url.clone()),
            workspace,
            ctx: ctx.clone(),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn delete_gate(&self) -> &ConfirmGate {
        &self.delete_gate
    }

    pub fn reset_gate(&self) -> &ConfirmGate {
        &self.reset_gate
    }

    pub fn is_pending(&self) -> bool {
        self.update.is_pending() || self.delete.is_pending() || self.reset.is_pending()
    }

    pub fn invite_link(&self) -> String {
        invite_link(&self.ctx.origin, self.workspace.id, &self.workspace.invite_code)
    }

    pub async fn save(&mut self) -> Outcome<Workspace> {
        let form = WorkspaceForm {
            name: self.name.clone(),
            image: self.image.change(),
        };
        let changes = match form.validate_update().into_result() {
            Ok(changes) => changes,
            Err(errors) => return Outcome::Rejected(errors),
        };

        match self.update.mutate(Patch::new(self.workspace.id, changes)).await {
            Ok(workspace) => {
                self.reload(workspace.clone());
                self.ctx.feedback.success("Workspace updated");
                Outcome::Completed(workspace)
            }
            Err(err) => failed(&self.ctx.feedback, err),
        }
    }

    /// Drop the image from the form and save straight away.
    pub async fn remove_image(&mut self) -> Outcome<Workspace> {
        self.image.remove();
        if self.image.change() == ImageChange::Keep {
            return Outcome::Completed(self.workspace.clone());
        }
        self.save().await
    }

    pub async fn delete(&self) -> Outcome<Workspace> {
        if !self.delete_gate.confirm().await {
            return Outcome::Cancelled;
        }

        match self.delete.mutate(self.workspace.id).await {
            Ok(workspace) => {
                self.ctx.feedback.success("Workspace deleted successfully");
                self.ctx.feedback.navigate(Route::Home);
                Outcome::Completed(workspace)
            }
            Err(err) => failed(&self.ctx.feedback, err),
        }
    }

    pub async fn reset_invite_code(&mut self) -> Outcome<Workspace> {
        if !self.reset_gate.confirm().await {
            return Outcome::Cancelled;
        }

        match self.reset.mutate(self.workspace.id).await {
            Ok(workspace) => {
                self.workspace = workspace.clone();
                self.ctx.feedback.success("Invite link reset successfully");
                Outcome::Completed(workspace)
            }
            Err(err) => failed(&self.ctx.feedback, err),
        }
    }

    fn reload(&mut self, workspace: Workspace) {
        self.name = workspace.name.clone();
        self.image = ImageStager::with_existing(workspace.image_url.clone());
        self.workspace = workspace;
    }
}
