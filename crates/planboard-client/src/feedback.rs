//! Transient notifications and navigation requested by flows.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

/// Pages a flow may send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Workspace(Uuid),
    WorkspaceSettings(Uuid),
    WorkspaceMembers(Uuid),
    Tasks(Uuid),
    Task { workspace_id: Uuid, task_id: Uuid },
    Project { workspace_id: Uuid, project_id: Uuid },
    ProjectSettings { workspace_id: Uuid, project_id: Uuid },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Workspace(id) => format!("/workspaces/{}", id),
            Self::WorkspaceSettings(id) => format!("/workspaces/{}/settings", id),
            Self::WorkspaceMembers(id) => format!("/workspaces/{}/members", id),
            Self::Tasks(id) => format!("/workspaces/{}/tasks", id),
            Self::Task {
                workspace_id,
                task_id,
            } => format!("/workspaces/{}/tasks/{}", workspace_id, task_id),
            Self::Project {
                workspace_id,
                project_id,
            } => format!("/workspaces/{}/projects/{}", workspace_id, project_id),
            Self::ProjectSettings {
                workspace_id,
                project_id,
            } => format!("/workspaces/{}/projects/{}/settings", workspace_id, project_id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Logs toasts and navigation instead of rendering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFeedback;

impl Notifier for TracingFeedback {
    fn notify(&self, toast: Toast) {
        match toast.kind {
            ToastKind::Success => tracing::info!(message = %toast.message, "toast"),
            ToastKind::Error => tracing::warn!(message = %toast.message, "toast"),
        }
    }
}

impl Navigator for TracingFeedback {
    fn navigate(&self, route: Route) {
        tracing::info!(route = %route, "navigate");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackEvent {
    Toast(Toast),
    Navigate(Route),
}

/// Keeps every toast and navigation in order. Used by tests and by the
/// terminal front-end to print what happened.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<FeedbackEvent>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.events.lock().clone()
    }

    pub fn take(&self) -> Vec<FeedbackEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                FeedbackEvent::Toast(toast) => Some(toast.clone()),
                FeedbackEvent::Navigate(_) => None,
            })
            .collect()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                FeedbackEvent::Navigate(route) => Some(*route),
                FeedbackEvent::Toast(_) => None,
            })
            .collect()
    }
}

impl Notifier for Recorder {
    fn notify(&self, toast: Toast) {
        self.events.lock().push(FeedbackEvent::Toast(toast));
    }
}

impl Navigator for Recorder {
    fn navigate(&self, route: Route) {
        self.events.lock().push(FeedbackEvent::Navigate(route));
    }
}

/// The pair of collaborators every flow reports through.
#[derive(Clone)]
pub struct Feedback {
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl Feedback {
    pub fn new(notifier: Arc<dyn Notifier>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            notifier,
            navigator,
        }
    }

    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingFeedback), Arc::new(TracingFeedback))
    }

    pub fn recording(recorder: &Recorder) -> Self {
        Self::new(Arc::new(recorder.clone()), Arc::new(recorder.clone()))
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notifier.notify(Toast::success(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notifier.notify(Toast::error(message));
    }

    pub fn navigate(&self, route: Route) {
        self.navigator.navigate(route);
    }
}

impl fmt::Debug for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feedback").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn routes_render_app_paths() {
        let workspace_id = Uuid::nil();
        let project_id = Uuid::from_u128(1);

        assert_eq!(Route::Home.path(), "/");
        assert_eq!(
            Route::ProjectSettings {
                workspace_id,
                project_id
            }
            .path(),
            format!("/workspaces/{}/projects/{}/settings", workspace_id, project_id)
        );
        assert_eq!(
            Route::WorkspaceMembers(workspace_id).to_string(),
            format!("/workspaces/{}/members", workspace_id)
        );
    }

    #[test]
    fn recorder_keeps_order() {
        let recorder = Recorder::new();
        let feedback = Feedback::recording(&recorder);

        feedback.success("Workspace deleted successfully");
        feedback.navigate(Route::Home);

        assert_eq!(
            recorder.take(),
            vec![
                FeedbackEvent::Toast(Toast::success("Workspace deleted successfully")),
                FeedbackEvent::Navigate(Route::Home),
            ]
        );
        assert!(recorder.events().is_empty());
    }
}
