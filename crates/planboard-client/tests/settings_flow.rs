mod common;

use planboard_client::{
    feedback::Route,
    flows::{CreateWorkspace, JoinWorkspace, MemberList, Outcome, WorkspaceSettings},
    invite::Invite,
    QueryKey, Toast,
};
use planboard_shared::{
    upload::{UploadError, UploadFile, MAX_FILE_SIZE},
    MemberRole, Workspace,
};
use pretty_assertions::assert_eq;

use common::{answer, spawn_server, TestUser};

fn png(bytes: usize) -> UploadFile {
    UploadFile::new("logo.png", "image/png", vec![0x89; bytes])
}

async fn create_workspace(owner: &TestUser, image: Option<UploadFile>) -> Workspace {
    let mut flow = CreateWorkspace::new(&owner.ctx);
    flow.name = "Acme".to_string();
    if let Some(file) = image {
        flow.image.offer(file).unwrap();
    }
    let workspace = flow.submit().await.completed().unwrap();
    owner.recorder.take();
    workspace
}

#[tokio::test]
async fn delete_only_fires_after_confirmation() {
    let server = spawn_server().await;
    let owner = server.user("Ada");
    let workspace = create_workspace(&owner, None).await;
    let settings = WorkspaceSettings::new(&owner.ctx, workspace.clone());

    let responder = answer(settings.delete_gate(), false);
    assert!(matches!(settings.delete().await, Outcome::Cancelled));
    responder.await.unwrap();
    assert!(owner.ctx.api.get_workspace(workspace.id).await.is_ok());
    assert!(owner.recorder.events().is_empty());

    let responder = answer(settings.delete_gate(), true);
    assert!(settings.delete().await.is_completed());
    responder.await.unwrap();

    assert_eq!(
        owner.recorder.toasts(),
        vec![Toast::success("Workspace deleted successfully")]
    );
    assert_eq!(owner.recorder.routes(), vec![Route::Home]);
    let err = owner.ctx.api.get_workspace(workspace.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn settings_gates_do_not_cross_resolve() {
    let server = spawn_server().await;
    let owner = server.user("Ada");
    let workspace = create_workspace(&owner, None).await;
    let mut settings = WorkspaceSettings::new(&owner.ctx, workspace.clone());

    // Accepting the delete gate must not answer the reset prompt.
    let delete_gate = settings.delete_gate().clone();
    let reset_gate = settings.reset_gate().clone();
    let responder = tokio::spawn(async move {
        let cycle = reset_gate.prompted().await;
        let crossed = delete_gate.accept();
        reset_gate.respond(cycle, false);
        crossed
    });

    let outcome = settings.reset_invite_code().await;

    assert!(!responder.await.unwrap());
    assert!(matches!(outcome, Outcome::Cancelled));
    let current = owner.ctx.api.get_workspace(workspace.id).await.unwrap();
    assert_eq!(current.invite_code, workspace.invite_code);
}

#[tokio::test]
async fn uploaded_image_can_be_removed() {
    let server = spawn_server().await;
    let owner = server.user("Ada");
    let workspace = create_workspace(&owner, Some(png(64))).await;
    let image_url = workspace.image_url.clone().unwrap();
    assert!(image_url.starts_with("data:image/png;base64,"));

    let mut settings = WorkspaceSettings::new(&owner.ctx, workspace.clone());
    assert_eq!(settings.image.preview(), Some(image_url.as_str()));

    let updated = settings.remove_image().await.completed().unwrap();
    assert_eq!(updated.image_url, None);
    assert_eq!(owner.recorder.toasts(), vec![Toast::success("Workspace updated")]);

    let stored = owner.ctx.api.get_workspace(workspace.id).await.unwrap();
    assert_eq!(stored.image_url, None);
}

#[tokio::test]
async fn rename_keeps_the_image() {
    let server = spawn_server().await;
    let owner = server.user("Ada");
    let workspace = create_workspace(&owner, Some(png(8))).await;
    let queries = owner.ctx.queries();
    queries.workspaces().await.unwrap();

    let mut settings = WorkspaceSettings::new(&owner.ctx, workspace.clone());
    settings.name = "Acme Labs".to_string();
    let updated = settings.save().await.completed().unwrap();

    assert_eq!(updated.name, "Acme Labs");
    assert_eq!(updated.image_url, workspace.image_url);
    assert!(owner.ctx.cache.is_stale(&QueryKey::Workspaces));
    assert_eq!(queries.workspaces().await.unwrap().documents[0].name, "Acme Labs");
}

#[tokio::test]
async fn invalid_forms_never_reach_the_server() {
    let server = spawn_server().await;
    let owner = server.user("Ada");
    let workspace = create_workspace(&owner, None).await;
    let mut settings = WorkspaceSettings::new(&owner.ctx, workspace);

    let oversized = png(MAX_FILE_SIZE as usize + 1);
    assert!(matches!(
        settings.image.offer(oversized),
        Err(UploadError::TooLarge { .. })
    ));
    assert_eq!(settings.image.staged(), None);

    settings.name = "   ".to_string();
    match settings.save().await {
        Outcome::Rejected(errors) => assert!(errors.get("name").is_some()),
        other => panic!("expected rejection, got {:?}", other),
    }
    assert!(owner.recorder.events().is_empty());
}

#[tokio::test]
async fn member_roles_and_removal() {
    let server = spawn_server().await;
    let owner = server.user("Ada");
    let guest = server.user("Grace");
    let workspace = create_workspace(&owner, None).await;

    let list = MemberList::new(&owner.ctx, workspace.id);
    let members = list.members().await.unwrap();
    let owner_member = members.documents[0].clone();

    // The only member can be neither removed nor demoted.
    let responder = answer(list.remove_gate(), true);
    assert!(matches!(list.remove(owner_member.id).await, Outcome::Failed(_)));
    responder.await.unwrap();
    assert!(matches!(
        list.set_role(owner_member.id, MemberRole::Member).await,
        Outcome::Failed(_)
    ));
    assert_eq!(
        owner.recorder.toasts(),
        vec![
            Toast::error("Cannot delete the only member"),
            Toast::error("Cannot downgrade the only member"),
        ]
    );

    let join = JoinWorkspace::new(
        &guest.ctx,
        Invite {
            workspace_id: workspace.id,
            code: workspace.invite_code.clone(),
        },
    );
    assert!(join.join().await.is_completed());

    let members_key = QueryKey::Members {
        workspace_id: workspace.id,
    };
    owner.ctx.cache.invalidate(&members_key);
    let members = list.members().await.unwrap();
    let guest_member = members
        .documents
        .iter()
        .find(|member| member.user_id == guest.identity.user_id)
        .cloned()
        .unwrap();

    let promoted = list
        .set_role(guest_member.id, MemberRole::Admin)
        .await
        .completed()
        .unwrap();
    assert_eq!(promoted.role, MemberRole::Admin);
    assert!(owner.ctx.cache.is_stale(&members_key));

    let responder = answer(list.remove_gate(), true);
    assert!(list.remove(guest_member.id).await.is_completed());
    responder.await.unwrap();
    assert_eq!(list.members().await.unwrap().total, 1);
}

#[tokio::test]
async fn leaving_a_workspace_drops_it_from_the_list() {
    let server = spawn_server().await;
    let owner = server.user("Ada");
    let guest = server.user("Grace");
    let workspace = create_workspace(&owner, None).await;

    let join = JoinWorkspace::new(
        &guest.ctx,
        Invite {
            workspace_id: workspace.id,
            code: workspace.invite_code.clone(),
        },
    );
    assert!(join.join().await.is_completed());
    guest.recorder.take();

    let queries = guest.ctx.queries();
    assert_eq!(queries.workspaces().await.unwrap().total, 1);
    let me = queries.current_member(workspace.id).await.unwrap().unwrap();

    let list = MemberList::new(&guest.ctx, workspace.id);
    let responder = answer(list.remove_gate(), true);
    let removed = list.remove(me.id).await.completed().unwrap();
    responder.await.unwrap();
    assert_eq!(removed.user_id, guest.identity.user_id);

    assert!(guest.ctx.cache.is_stale(&QueryKey::Workspaces));
    assert_eq!(queries.workspaces().await.unwrap().total, 0);
    assert_eq!(guest.recorder.routes(), vec![Route::Home]);
    assert_eq!(guest.recorder.toasts(), vec![Toast::success("Member removed")]);
}
