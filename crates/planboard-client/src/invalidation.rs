//! Which cached queries each successful mutation makes stale.

use planboard_shared::{Member, Project, Task, Workspace};
use uuid::Uuid;

use crate::cache::{Invalidation, QueryKey};

/// Create, update, delete or reset-invite of a workspace.
pub fn workspace_changed(workspace: &Workspace) -> Vec<Invalidation> {
    vec![
        QueryKey::Workspaces.into(),
        QueryKey::Workspace(workspace.id).into(),
        QueryKey::WorkspaceInfo(workspace.id).into(),
    ]
}

/// The caller is now a member, so the member list changed too.
pub fn workspace_joined(workspace: &Workspace) -> Vec<Invalidation> {
    let mut keys = workspace_changed(workspace);
    keys.push(
        QueryKey::Members {
            workspace_id: workspace.id,
        }
        .into(),
    );
    keys
}

pub fn project_changed(project: &Project) -> Vec<Invalidation> {
    vec![
        QueryKey::Projects {
            workspace_id: project.workspace_id,
        }
        .into(),
        QueryKey::Project(project.id).into(),
        QueryKey::ProjectAnalytics(project.id).into(),
    ]
}

/// Deleting a project also deletes its tasks.
pub fn project_deleted(project: &Project) -> Vec<Invalidation> {
    let mut keys = project_changed(project);
    keys.push(Invalidation::TaskLists {
        workspace_id: project.workspace_id,
    });
    keys.push(QueryKey::WorkspaceAnalytics(project.workspace_id).into());
    keys
}

pub fn task_changed(task: &Task) -> Vec<Invalidation> {
    vec![
        Invalidation::TaskLists {
            workspace_id: task.workspace_id,
        },
        QueryKey::Task(task.id).into(),
        QueryKey::WorkspaceAnalytics(task.workspace_id).into(),
        QueryKey::ProjectAnalytics(task.project_id).into(),
    ]
}

/// An edit can move a task to another project, so both the old and the new
/// project's analytics go stale.
pub fn task_edited(before: &Task, after: &Task) -> Vec<Invalidation> {
    unique(task_changed(before).into_iter().chain(task_changed(after)))
}

/// Union of [`task_changed`] over a batch, without duplicates.
pub fn tasks_changed(tasks: &[Task]) -> Vec<Invalidation> {
    unique(tasks.iter().flat_map(task_changed))
}

pub fn member_changed(member: &Member) -> Vec<Invalidation> {
    vec![QueryKey::Members {
        workspace_id: member.workspace_id,
    }
    .into()]
}

/// A caller who removed themselves has left the workspace, which drops it
/// from their workspace list.
pub fn member_removed(member: &Member, caller: Option<Uuid>) -> Vec<Invalidation> {
    let mut keys = member_changed(member);
    if caller == Some(member.user_id) {
        keys.push(QueryKey::Workspaces.into());
        keys.push(QueryKey::Workspace(member.workspace_id).into());
    }
    keys
}

fn unique(invalidations: impl Iterator<Item = Invalidation>) -> Vec<Invalidation> {
    let mut keys: Vec<Invalidation> = Vec::new();
    for invalidation in invalidations {
        if !keys.contains(&invalidation) {
            keys.push(invalidation);
        }
    }
    keys
}
