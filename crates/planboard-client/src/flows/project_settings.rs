use planboard_shared::{
    api::{CreateProjectRequest, UpdateProjectRequest},
    schema::ProjectForm,
    Project,
};
use uuid::Uuid;

use super::{failed, Outcome};
use crate::confirm::{ConfirmGate, ConfirmPrompt};
use crate::context::ClientContext;
use crate::feedback::Route;
use crate::hooks::{self, Patch};
use crate::mutation::Mutation;
use crate::upload::ImageStager;

pub struct CreateProject {
    ctx: ClientContext,
    workspace_id: Uuid,
    pub name: String,
    pub image: ImageStager,
    create: Mutation<CreateProjectRequest, Project>,
}

impl CreateProject {
    pub fn new(ctx: &ClientContext, workspace_id: Uuid) -> Self {
        Self {
            create: hooks::create_project(&ctx.api, &ctx.cache),
            ctx: ctx.clone(),
            workspace_id,
            name: String::new(),
            image: ImageStager::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.create.is_pending()
    }

    pub async fn submit(&mut self) -> Outcome<Project> {
        let form = ProjectForm {
            workspace_id: self.workspace_id,
            name: self.name.clone(),
            image: self.image.change(),
        };
        let req = match form.validate_create().into_result() {
            Ok(req) => req,
            Err(errors) => return Outcome::Rejected(errors),
        };

        match self.create.mutate(req).await {
            Ok(project) => {
                self.name.clear();
                self.image = ImageStager::new();
                self.ctx.feedback.success("Project created");
                self.ctx.feedback.navigate(Route::Project {
                    workspace_id: project.workspace_id,
                    project_id: project.id,
                });
                Outcome::Completed(project)
            }
            Err(err) => failed(&self.ctx.feedback, err),
        }
    }
}

pub struct ProjectSettings {
    ctx: ClientContext,
    project: Project,
    pub name: String,
    pub image: ImageStager,
    update: Mutation<Patch<UpdateProjectRequest>, Project>,
    delete: Mutation<Uuid, Project>,
    delete_gate: ConfirmGate,
}

impl ProjectSettings {
    pub fn new(ctx: &ClientContext, project: Project) -> Self {
        Self {
            update: hooks::update_project(&ctx.api, &ctx.cache),
            delete: hooks::delete_project(&ctx.api, &ctx.cache),
            delete_gate: ConfirmGate::new(ConfirmPrompt::destructive(
                "Delete Project",
                "This action cannot be undone.",
            )),
            name: project.name.clone(),
            image: ImageStager::with_existing(project.image_url.clone()),
            project,
            ctx: ctx.clone(),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn delete_gate(&self) -> &ConfirmGate {
        &self.delete_gate
    }

    pub fn is_pending(&self) -> bool {
        self.update.is_pending() || self.delete.is_pending()
    }

    /// Where the "Back" button goes.
    pub fn back(&self) -> Route {
        Route::Project {
            workspace_id: self.project.workspace_id,
            project_id: self.project.id,
        }
    }

    pub async fn save(&mut self) -> Outcome<Project> {
        let form = ProjectForm {
            workspace_id: self.project.workspace_id,
            name: self.name.clone(),
            image: self.image.change(),
        };
        let changes = match form.validate_update().into_result() {
            Ok(changes) => changes,
            Err(errors) => return Outcome::Rejected(errors),
        };

        match self.update.mutate(Patch::new(self.project.id, changes)).await {
            Ok(project) => {
                self.name = project.name.clone();
                self.image = ImageStager::with_existing(project.image_url.clone());
                self.project = project.clone();
                self.ctx.feedback.success("Project updated");
                Outcome::Completed(project)
            }
            Err(err) => failed(&self.ctx.feedback, err),
        }
    }

    pub async fn delete(&self) -> Outcome<Project> {
        if !self.delete_gate.confirm().await {
            return Outcome::Cancelled;
        }

        match self.delete.mutate(self.project.id).await {
            Ok(project) => {
                self.ctx.feedback.success("Project deleted");
                self.ctx.feedback.navigate(Route::Home);
                Outcome::Completed(project)
            }
            Err(err) => failed(&self.ctx.feedback, err),
        }
    }
}
