use planboard_shared::{
    api::{
        BulkUpdateTasksRequest, CreateProjectRequest, CreateTaskRequest, CreateWorkspaceRequest,
        Envelope, ErrorBody, JoinWorkspaceRequest, Page, TaskFilter, TaskPosition,
        UpdateMemberRequest, UpdateProjectRequest, UpdateTaskRequest, UpdateWorkspaceRequest,
        WorkspaceQuery, USER_EMAIL_HEADER, USER_ID_HEADER, USER_NAME_HEADER,
    },
    upload::{ImageChange, UploadFile},
    Analytics, Member, MemberRole, Project, Task, Workspace, WorkspaceInfo,
};
use reqwest::{
    multipart::{Form, Part},
    Client, Method, RequestBuilder,
};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request failed ({status}): {message}")]
    Status { status: u16, message: String },
    /// The backend accepted the request but refused it, with a message meant
    /// for the user.
    #[error("{0}")]
    Domain(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text for a toast. Domain messages are shown verbatim; anything else
    /// collapses into `fallback` so transport detail never reaches the user.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Domain(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, Self::Domain(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Who the client acts as. The hosted backend establishes this through its
/// own session; the development backend reads it from headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(user_id: Uuid, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Typed RPC client with one method per backend endpoint. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    identity: Option<Identity>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            identity: None,
        }
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build URL for endpoint
    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.identity {
            Some(identity) => builder
                .header(USER_ID_HEADER, identity.user_id.to_string())
                .header(USER_NAME_HEADER, identity.name.as_str())
                .header(USER_EMAIL_HEADER, identity.email.as_str()),
            None => builder,
        }
    }

    async fn send<T: serde::de::DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        Self::handle_response(response).await
    }

    /// Unwrap the `{data}` / `{error}` envelope. A 2xx `{error}` body is a
    /// domain refusal; a non-2xx status is a transport failure.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Request failed").to_string());
            tracing::debug!(status = status.as_u16(), %message, "request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        match serde_json::from_str::<Envelope<T>>(&text) {
            Ok(Envelope::Data { data }) => Ok(data),
            Ok(Envelope::Error { error }) => Err(ApiError::Domain(error)),
            Err(err) => Err(ApiError::Decode(err.to_string())),
        }
    }

    fn image_part(file: &UploadFile) -> Result<Part, ApiError> {
        Ok(Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?)
    }

    /// Attach an image change to a multipart form. `Keep` sends nothing, so
    /// the stored image is left alone.
    fn with_image(form: Form, image: &ImageChange) -> Result<Form, ApiError> {
        Ok(match image {
            ImageChange::Keep => form,
            ImageChange::Replace(file) => form.part("image", Self::image_part(file)?),
            ImageChange::Remove => form.text("image", ""),
        })
    }

    // ============ Workspaces ============

    pub async fn list_workspaces(&self) -> Result<Page<Workspace>, ApiError> {
        self.send(self.request(Method::GET, "/workspaces")).await
    }

    pub async fn get_workspace(&self, workspace_id: Uuid) -> Result<Workspace, ApiError> {
        self.send(self.request(Method::GET, &format!("/workspaces/{}", workspace_id)))
            .await
    }

    pub async fn get_workspace_info(&self, workspace_id: Uuid) -> Result<WorkspaceInfo, ApiError> {
        self.send(self.request(Method::GET, &format!("/workspaces/{}/info", workspace_id)))
            .await
    }

    pub async fn create_workspace(&self, req: &CreateWorkspaceRequest) -> Result<Workspace, ApiError> {
        let mut form = Form::new().text("name", req.name.clone());
        if let Some(file) = &req.image {
            form = form.part("image", Self::image_part(file)?);
        }
        self.send(self.request(Method::POST, "/workspaces").multipart(form))
            .await
    }

    pub async fn update_workspace(
        &self,
        workspace_id: Uuid,
        req: &UpdateWorkspaceRequest,
    ) -> Result<Workspace, ApiError> {
        let mut form = Form::new();
        if let Some(name) = &req.name {
            form = form.text("name", name.clone());
        }
        let form = Self::with_image(form, &req.image)?;
        self.send(
            self.request(Method::PATCH, &format!("/workspaces/{}", workspace_id))
                .multipart(form),
        )
        .await
    }

    pub async fn delete_workspace(&self, workspace_id: Uuid) -> Result<Workspace, ApiError> {
        self.send(self.request(Method::DELETE, &format!("/workspaces/{}", workspace_id)))
            .await
    }

    pub async fn reset_invite_code(&self, workspace_id: Uuid) -> Result<Workspace, ApiError> {
        self.send(self.request(
            Method::POST,
            &format!("/workspaces/{}/reset-invite-code", workspace_id),
        ))
        .await
    }

    pub async fn join_workspace(&self, workspace_id: Uuid, code: &str) -> Result<Workspace, ApiError> {
        let body = JoinWorkspaceRequest {
            code: code.to_string(),
        };
        self.send(
            self.request(Method::POST, &format!("/workspaces/{}/join", workspace_id))
                .json(&body),
        )
        .await
    }

    pub async fn workspace_analytics(&self, workspace_id: Uuid) -> Result<Analytics, ApiError> {
        self.send(self.request(
            Method::GET,
            &format!("/workspaces/{}/analytics", workspace_id),
        ))
        .await
    }

    // ============ Projects ============

    pub async fn list_projects(&self, workspace_id: Uuid) -> Result<Page<Project>, ApiError> {
        self.send(
            self.request(Method::GET, "/projects")
                .query(&WorkspaceQuery { workspace_id }),
        )
        .await
    }

    pub async fn get_project(&self, project_id: Uuid) -> Result<Project, ApiError> {
        self.send(self.request(Method::GET, &format!("/projects/{}", project_id)))
            .await
    }

    pub async fn create_project(&self, req: &CreateProjectRequest) -> Result<Project, ApiError> {
        let mut form = Form::new()
            .text("name", req.name.clone())
            .text("workspaceId", req.workspace_id.to_string());
        if let Some(file) = &req.image {
            form = form.part("image", Self::image_part(file)?);
        }
        self.send(self.request(Method::POST, "/projects").multipart(form))
            .await
    }

    pub async fn update_project(
        &self,
        project_id: Uuid,
        req: &UpdateProjectRequest,
    ) -> Result<Project, ApiError> {
        let mut form = Form::new();
        if let Some(name) = &req.name {
            form = form.text("name", name.clone());
        }
        let form = Self::with_image(form, &req.image)?;
        self.send(
            self.request(Method::PATCH, &format!("/projects/{}", project_id))
                .multipart(form),
        )
        .await
    }

    pub async fn delete_project(&self, project_id: Uuid) -> Result<Project, ApiError> {
        self.send(self.request(Method::DELETE, &format!("/projects/{}", project_id)))
            .await
    }

    pub async fn project_analytics(&self, project_id: Uuid) -> Result<Analytics, ApiError> {
        self.send(self.request(
            Method::GET,
            &format!("/projects/{}/analytics", project_id),
        ))
        .await
    }

    // ============ Tasks ============

    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Page<Task>, ApiError> {
        self.send(self.request(Method::GET, "/tasks").query(filter))
            .await
    }

    pub async fn get_task(&self, task_id: Uuid) -> Result<Task, ApiError> {
        self.send(self.request(Method::GET, &format!("/tasks/{}", task_id)))
            .await
    }

    pub async fn create_task(&self, req: &CreateTaskRequest) -> Result<Task, ApiError> {
        self.send(self.request(Method::POST, "/tasks").json(req))
            .await
    }

    pub async fn update_task(&self, task_id: Uuid, req: &UpdateTaskRequest) -> Result<Task, ApiError> {
        self.send(
            self.request(Method::PATCH, &format!("/tasks/{}", task_id))
                .json(req),
        )
        .await
    }

    pub async fn delete_task(&self, task_id: Uuid) -> Result<Task, ApiError> {
        self.send(self.request(Method::DELETE, &format!("/tasks/{}", task_id)))
            .await
    }

    pub async fn bulk_update_tasks(&self, tasks: Vec<TaskPosition>) -> Result<Page<Task>, ApiError> {
        let body = BulkUpdateTasksRequest { tasks };
        self.send(self.request(Method::POST, "/tasks/bulk-update").json(&body))
            .await
    }

    // ============ Members ============

    pub async fn list_members(&self, workspace_id: Uuid) -> Result<Page<Member>, ApiError> {
        self.send(
            self.request(Method::GET, "/members")
                .query(&WorkspaceQuery { workspace_id }),
        )
        .await
    }

    pub async fn update_member(&self, member_id: Uuid, role: MemberRole) -> Result<Member, ApiError> {
        self.send(
            self.request(Method::PATCH, &format!("/members/{}", member_id))
                .json(&UpdateMemberRequest { role }),
        )
        .await
    }

    pub async fn delete_member(&self, member_id: Uuid) -> Result<Member, ApiError> {
        self.send(self.request(Method::DELETE, &format!("/members/{}", member_id)))
            .await
    }
}
