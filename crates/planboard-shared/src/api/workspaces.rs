use serde::{Deserialize, Serialize};

use crate::upload::{ImageChange, UploadFile};

/// Sent as a multipart form: `name` plus an optional `image` file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub image: Option<UploadFile>,
}

/// Sent as a multipart form. `image` is a file part for a replacement, an
/// empty text part for removal, and absent when unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    pub image: ImageChange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinWorkspaceRequest {
    pub code: String,
}
