use uuid::Uuid;

use crate::upload::{ImageChange, UploadFile};

/// Multipart form: `name`, `workspaceId` and an optional `image` file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    pub workspace_id: Uuid,
    pub name: String,
    pub image: Option<UploadFile>,
}

/// Multipart form with the same `image` conventions as workspace updates.
/// There is no way to move a project to another workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub image: ImageChange,
}
