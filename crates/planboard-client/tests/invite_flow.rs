mod common;

use planboard_client::{
    feedback::Route,
    flows::{CreateWorkspace, JoinWorkspace, Outcome, WorkspaceSettings},
    invite::{invite_link, parse_invite_link, Invite},
    ApiError, MutationError, Toast,
};
use planboard_shared::{MemberRole, Workspace};
use pretty_assertions::assert_eq;

use common::{answer, spawn_server, TestUser, ORIGIN};

async fn create_workspace(owner: &TestUser, name: &str) -> Workspace {
    let mut flow = CreateWorkspace::new(&owner.ctx);
    flow.name = name.to_string();
    flow.submit().await.completed().unwrap()
}

#[tokio::test]
async fn join_requires_the_current_invite_code() {
    let server = spawn_server().await;
    let owner = server.user("Ada");
    let guest = server.user("Grace");

    let workspace = create_workspace(&owner, "Acme").await;
    server
        .state
        .store
        .write()
        .await
        .set_invite_code(workspace.id, "ABC123")
        .unwrap();

    let wrong = JoinWorkspace::new(
        &guest.ctx,
        Invite {
            workspace_id: workspace.id,
            code: "WRONG1".to_string(),
        },
    );
    let outcome = wrong.join().await;
    assert!(matches!(
        &outcome,
        Outcome::Failed(MutationError::Failed { source: ApiError::Domain(message), .. })
            if message == "Invalid invite code"
    ));
    assert_eq!(guest.recorder.toasts(), vec![Toast::error("Invalid invite code")]);
    assert!(guest.recorder.routes().is_empty());

    let guest_workspaces = guest.ctx.api.list_workspaces().await.unwrap();
    assert_eq!(guest_workspaces.total, 0);
    let members = owner.ctx.api.list_members(workspace.id).await.unwrap();
    assert_eq!(members.total, 1);

    guest.recorder.take();
    let right = JoinWorkspace::new(
        &guest.ctx,
        Invite {
            workspace_id: workspace.id,
            code: "ABC123".to_string(),
        },
    );
    let info = right.info().await.unwrap();
    assert_eq!(info.name, "Acme");

    let joined = right.join().await.completed().unwrap();
    assert_eq!(joined.id, workspace.id);
    assert_eq!(guest.recorder.toasts(), vec![Toast::success("Joined workspace")]);
    assert_eq!(guest.recorder.routes(), vec![Route::Workspace(workspace.id)]);

    let members = owner.ctx.api.list_members(workspace.id).await.unwrap();
    assert_eq!(members.total, 2);
    let guest_member = members
        .documents
        .iter()
        .find(|member| member.user_id == guest.identity.user_id)
        .unwrap();
    assert_eq!(guest_member.role, MemberRole::Member);
}

#[tokio::test]
async fn reset_invalidates_the_previous_link() {
    let server = spawn_server().await;
    let owner = server.user("Ada");
    let guest = server.user("Grace");

    let workspace = create_workspace(&owner, "Acme").await;
    owner.recorder.take();
    let mut settings = WorkspaceSettings::new(&owner.ctx, workspace.clone());
    let old_link = settings.invite_link();
    assert_eq!(
        old_link,
        invite_link(ORIGIN, workspace.id, &workspace.invite_code)
    );

    let responder = answer(settings.reset_gate(), true);
    let reset = settings.reset_invite_code().await.completed().unwrap();
    assert!(responder.await.unwrap());
    assert_ne!(reset.invite_code, workspace.invite_code);
    assert_eq!(
        owner.recorder.toasts(),
        vec![Toast::success("Invite link reset successfully")]
    );

    let stale = JoinWorkspace::new(&guest.ctx, parse_invite_link(&old_link).unwrap());
    assert!(matches!(stale.join().await, Outcome::Failed(_)));
    assert_eq!(guest.recorder.toasts(), vec![Toast::error("Invalid invite code")]);

    let fresh = JoinWorkspace::new(&guest.ctx, parse_invite_link(&settings.invite_link()).unwrap());
    assert!(fresh.join().await.is_completed());
}

#[tokio::test]
async fn cancelled_reset_keeps_the_code() {
    let server = spawn_server().await;
    let owner = server.user("Ada");
    let workspace = create_workspace(&owner, "Acme").await;
    let mut settings = WorkspaceSettings::new(&owner.ctx, workspace.clone());

    let responder = answer(settings.reset_gate(), false);
    assert!(matches!(settings.reset_invite_code().await, Outcome::Cancelled));
    assert!(responder.await.unwrap());

    let current = owner.ctx.api.get_workspace(workspace.id).await.unwrap();
    assert_eq!(current.invite_code, workspace.invite_code);
    assert_eq!(owner.recorder.toasts(), vec![Toast::success("Workspace created")]);
}

#[tokio::test]
async fn joining_twice_is_rejected() {
    let server = spawn_server().await;
    let owner = server.user("Ada");
    let workspace = create_workspace(&owner, "Acme").await;

    let again = JoinWorkspace::new(
        &owner.ctx,
        Invite {
            workspace_id: workspace.id,
            code: workspace.invite_code.clone(),
        },
    );
    assert!(matches!(again.join().await, Outcome::Failed(_)));
    assert_eq!(
        owner.recorder.toasts().last(),
        Some(&Toast::error("Already a member"))
    );
}

#[tokio::test]
async fn empty_code_never_reaches_the_server() {
    let server = spawn_server().await;
    let guest = server.user("Grace");

    let flow = JoinWorkspace::new(
        &guest.ctx,
        Invite {
            workspace_id: uuid::Uuid::new_v4(),
            code: "  ".to_string(),
        },
    );
    match flow.join().await {
        Outcome::Rejected(errors) => assert_eq!(errors.get("code"), Some("Required")),
        other => panic!("expected rejection, got {:?}", other),
    }
    assert!(guest.recorder.events().is_empty());
}

#[tokio::test]
async fn pasted_code_is_trimmed_before_joining() {
    let server = spawn_server().await;
    let owner = server.user("Ada");
    let guest = server.user("Grace");

    let workspace = create_workspace(&owner, "Acme").await;
    let flow = JoinWorkspace::new(
        &guest.ctx,
        Invite {
            workspace_id: workspace.id,
            code: format!("  {} ", workspace.invite_code),
        },
    );

    let joined = flow.join().await.completed().unwrap();
    assert_eq!(joined.id, workspace.id);
    assert_eq!(guest.recorder.toasts(), vec![Toast::success("Joined workspace")]);
}
