//! Screen controllers: form → validate → mutation → feedback.
//!
//! Each controller owns its mutations and confirmation gates. Toasts and
//! navigation happen here, never inside the mutations themselves.

mod join;
mod members;
mod project_settings;
mod tasks;
mod workspace_settings;

use planboard_shared::schema::FieldErrors;

use crate::feedback::Feedback;
use crate::mutation::MutationError;

pub use join::JoinWorkspace;
pub use members::MemberList;
pub use project_settings::{CreateProject, ProjectSettings};
pub use tasks::{CreateTask, EditTask, TaskActions, TaskBoard};
pub use workspace_settings::{CreateWorkspace, WorkspaceSettings};

#[derive(Debug)]
pub enum Outcome<T> {
    Completed(T),
    /// The user declined the confirmation prompt. Nothing was sent.
    Cancelled,
    /// The form did not validate. Nothing was sent.
    Rejected(FieldErrors),
    Failed(MutationError),
}

impl<T> Outcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            _ => None,
        }
    }
}

/// Toast a failed mutation. A duplicate submission is not the user's
/// problem, so it is only logged.
fn failed<T>(feedback: &Feedback, err: MutationError) -> Outcome<T> {
    match &err {
        MutationError::Failed { message, .. } => feedback.error(message.clone()),
        MutationError::AlreadyPending { action } => {
            tracing::debug!(action, "ignored duplicate submission");
        }
    }
    Outcome::Failed(err)
}
