//! Form schemas.
//!
//! Each form holds raw user input and validates into the request body the
//! client sends. Validation failures stay local: an [`Validated::Invalid`]
//! result carries per-field messages and never reaches the network.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::api::{
    CreateProjectRequest, CreateTaskRequest, CreateWorkspaceRequest, UpdateProjectRequest,
    UpdateTaskRequest, UpdateWorkspaceRequest,
};
use crate::models::TaskStatus;
use crate::upload::ImageChange;

const REQUIRED: &str = "Required";
const TOO_SHORT: &str = "Must be 1 or more characters";

/// Field name to message. Only the first message per field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated<T> {
    Valid(T),
    Invalid(FieldErrors),
}

impl<T> Validated<T> {
    fn finish(errors: FieldErrors, build: impl FnOnce() -> Option<T>) -> Self {
        if !errors.is_empty() {
            return Self::Invalid(errors);
        }
        match build() {
            Some(value) => Self::Valid(value),
            None => Self::Invalid(errors),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(errors) => Some(errors),
        }
    }

    pub fn into_result(self) -> Result<T, FieldErrors> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(errors) => Err(errors),
        }
    }
}

fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn required_text(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) -> Option<String> {
    let value = trimmed(value);
    if value.is_none() {
        errors.add(field, message);
    }
    value
}

fn required_id(errors: &mut FieldErrors, field: &'static str, value: &str) -> Option<Uuid> {
    let Some(raw) = trimmed(value) else {
        errors.add(field, REQUIRED);
        return None;
    };
    match Uuid::parse_str(&raw) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(field, "Invalid id");
            None
        }
    }
}

fn optional_date(errors: &mut FieldErrors, field: &'static str, value: &str) -> Option<NaiveDate> {
    let raw = trimmed(value)?;
    // Accept a bare date or the date part of a timestamp.
    let date_part = raw.get(..10).unwrap_or(&raw);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "Invalid date");
            None
        }
    }
}

fn checked_image(errors: &mut FieldErrors, image: &ImageChange) {
    if let ImageChange::Replace(file) = image {
        if let Err(err) = file.validate() {
            errors.add("image", err.to_string());
        }
    }
}

/// Create or edit workspace form.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceForm {
    pub name: String,
    pub image: ImageChange,
}

impl WorkspaceForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: ImageChange::Keep,
        }
    }

    pub fn validate_create(self) -> Validated<CreateWorkspaceRequest> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name, REQUIRED);
        checked_image(&mut errors, &self.image);

        Validated::finish(errors, || {
            Some(CreateWorkspaceRequest {
                name: name?,
                image: match self.image {
                    ImageChange::Replace(file) => Some(file),
                    ImageChange::Keep | ImageChange::Remove => None,
                },
            })
        })
    }

    pub fn validate_update(self) -> Validated<UpdateWorkspaceRequest> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name, TOO_SHORT);
        checked_image(&mut errors, &self.image);

        Validated::finish(errors, || {
            Some(UpdateWorkspaceRequest {
                name: Some(name?),
                image: self.image,
            })
        })
    }
}

/// Create or edit project form.
#[derive(Debug, Clone)]
pub struct ProjectForm {
    pub workspace_id: Uuid,
    pub name: String,
    pub image: ImageChange,
}

impl ProjectForm {
    pub fn new(workspace_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            workspace_id,
            name: name.into(),
            image: ImageChange::Keep,
        }
    }

    pub fn validate_create(self) -> Validated<CreateProjectRequest> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name, REQUIRED);
        checked_image(&mut errors, &self.image);

        Validated::finish(errors, || {
            Some(CreateProjectRequest {
                workspace_id: self.workspace_id,
                name: name?,
                image: match self.image {
                    ImageChange::Replace(file) => Some(file),
                    ImageChange::Keep | ImageChange::Remove => None,
                },
            })
        })
    }

    pub fn validate_update(self) -> Validated<UpdateProjectRequest> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name, TOO_SHORT);
        checked_image(&mut errors, &self.image);

        Validated::finish(errors, || {
            Some(UpdateProjectRequest {
                name: Some(name?),
                image: self.image,
            })
        })
    }
}

/// Create or edit task form, exactly as typed.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub name: String,
    pub status: String,
    pub workspace_id: String,
    pub project_id: String,
    pub due_date: String,
    pub assignee_id: String,
    pub description: String,
}

struct TaskFields {
    name: Option<String>,
    status: Option<TaskStatus>,
    project_id: Option<Uuid>,
    assignee_id: Option<Uuid>,
    due_date: Option<NaiveDate>,
    description: Option<String>,
}

impl TaskForm {
    fn common_fields(&self, errors: &mut FieldErrors) -> TaskFields {
        let name = required_text(errors, "name", &self.name, REQUIRED);
        let status = match self.status.parse::<TaskStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                errors.add("status", REQUIRED);
                None
            }
        };
        let project_id = required_id(errors, "projectId", &self.project_id);
        let assignee_id = required_id(errors, "assigneeId", &self.assignee_id);
        let due_date = optional_date(errors, "dueDate", &self.due_date);
        let description = (!self.description.is_empty()).then(|| self.description.clone());

        TaskFields {
            name,
            status,
            project_id,
            assignee_id,
            due_date,
            description,
        }
    }

    pub fn validate_create(&self) -> Validated<CreateTaskRequest> {
        let mut errors = FieldErrors::new();
        let fields = self.common_fields(&mut errors);
        let workspace_id = required_id(&mut errors, "workspaceId", &self.workspace_id);

        Validated::finish(errors, || {
            Some(CreateTaskRequest {
                name: fields.name?,
                status: fields.status?,
                workspace_id: workspace_id?,
                project_id: fields.project_id?,
                due_date: fields.due_date,
                assignee_id: fields.assignee_id?,
                description: fields.description,
            })
        })
    }

    /// The edit form never moves a task between workspaces, so the
    /// workspace field is ignored here.
    pub fn validate_update(&self) -> Validated<UpdateTaskRequest> {
        let mut errors = FieldErrors::new();
        let fields = self.common_fields(&mut errors);

        Validated::finish(errors, || {
            Some(UpdateTaskRequest {
                name: Some(fields.name?),
                status: Some(fields.status?),
                project_id: Some(fields.project_id?),
                due_date: fields.due_date,
                assignee_id: Some(fields.assignee_id?),
                description: fields.description,
            })
        })
    }
}

/// The invite code taken from a join link.
pub fn validate_invite_code(code: &str) -> Validated<String> {
    let mut errors = FieldErrors::new();
    let code = required_text(&mut errors, "code", code, REQUIRED);
    Validated::finish(errors, || code)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::upload::UploadFile;

    fn task_form() -> TaskForm {
        TaskForm {
            name: "  Ship it ".to_string(),
            status: "TODO".to_string(),
            workspace_id: Uuid::new_v4().to_string(),
            project_id: Uuid::new_v4().to_string(),
            due_date: "2026-11-02".to_string(),
            assignee_id: Uuid::new_v4().to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn workspace_name_is_trimmed_and_required() {
        let invalid = WorkspaceForm::new("   ").validate_create();
        assert_eq!(invalid.errors().and_then(|e| e.get("name")), Some("Required"));

        let valid = WorkspaceForm::new(" Acme ").validate_create().into_result().unwrap();
        assert_eq!(valid.name, "Acme");
        assert_eq!(valid.image, None);
    }

    #[test]
    fn rejected_image_blocks_workspace_form() {
        let form = WorkspaceForm {
            name: "Acme".to_string(),
            image: ImageChange::Replace(UploadFile::new("a.txt", "text/plain", b"hi".to_vec())),
        };
        let errors = form.validate_create().into_result().unwrap_err();
        assert_eq!(errors.get("image"), Some("Only JPG, PNG, SVG, and JPEG files are allowed"));
    }

    #[test]
    fn update_keeps_removal_distinct_from_no_change() {
        let form = WorkspaceForm {
            name: "Acme".to_string(),
            image: ImageChange::Remove,
        };
        let request = form.validate_update().into_result().unwrap();
        assert_eq!(request.image, ImageChange::Remove);

        let errors = WorkspaceForm::new("").validate_update().into_result().unwrap_err();
        assert_eq!(errors.get("name"), Some("Must be 1 or more characters"));
    }

    #[test]
    fn task_form_collects_every_missing_field() {
        let errors = TaskForm::default().validate_create().into_result().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec!["assigneeId", "name", "projectId", "status", "workspaceId"]);
        assert!(errors.get("dueDate").is_none());
    }

    #[test]
    fn task_form_produces_typed_request() {
        let form = task_form();
        let request = form.validate_create().into_result().unwrap();
        assert_eq!(request.name, "Ship it");
        assert_eq!(request.status, TaskStatus::Todo);
        assert_eq!(request.due_date, NaiveDate::from_ymd_opt(2026, 11, 2));
        assert_eq!(request.description, None);
    }

    #[test]
    fn task_form_rejects_malformed_values() {
        let form = TaskForm {
            due_date: "next tuesday".to_string(),
            assignee_id: "not-a-uuid".to_string(),
            ..task_form()
        };
        let errors = form.validate_create().into_result().unwrap_err();
        assert_eq!(errors.get("dueDate"), Some("Invalid date"));
        assert_eq!(errors.get("assigneeId"), Some("Invalid id"));
    }

    #[test]
    fn task_update_does_not_need_workspace() {
        let form = TaskForm {
            workspace_id: String::new(),
            due_date: "2026-11-02T00:00:00.000Z".to_string(),
            ..task_form()
        };
        let request = form.validate_update().into_result().unwrap();
        assert_eq!(request.status, Some(TaskStatus::Todo));
        assert_eq!(request.due_date, NaiveDate::from_ymd_opt(2026, 11, 2));
    }

    #[test]
    fn invite_code_must_not_be_blank() {
        assert!(!validate_invite_code("  ").is_valid());
        assert_eq!(validate_invite_code(" ABC123 ").into_result(), Ok("ABC123".to_string()));
    }
}
