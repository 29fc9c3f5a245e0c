use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    members as member_handlers, projects as project_handlers, tasks as task_handlers,
    workspaces as workspace_handlers,
};
use crate::identity::identity_middleware;
use crate::store::Store;

#[derive(Clone, Default)]
pub struct AppState {
    pub store: Store,
}

pub fn create_router(state: AppState) -> Router {
    let workspace_routes = Router::new()
        .route(
            "/",
            get(workspace_handlers::list_workspaces).post(workspace_handlers::create_workspace),
        )
        .route(
            "/:id",
            get(workspace_handlers::get_workspace)
                .patch(workspace_handlers::update_workspace)
                .delete(workspace_handlers::delete_workspace),
        )
        .route("/:id/info", get(workspace_handlers::get_workspace_info))
        .route(
            "/:id/reset-invite-code",
            post(workspace_handlers::reset_invite_code),
        )
        .route("/:id/join", post(workspace_handlers::join_workspace))
        .route("/:id/analytics", get(workspace_handlers::workspace_analytics));

    let project_routes = Router::new()
        .route(
            "/",
            get(project_handlers::list_projects).post(project_handlers::create_project),
        )
        .route(
            "/:id",
            get(project_handlers::get_project)
                .patch(project_handlers::update_project)
                .delete(project_handlers::delete_project),
        )
        .route("/:id/analytics", get(project_handlers::project_analytics));

    let task_routes = Router::new()
        .route(
            "/",
            get(task_handlers::list_tasks).post(task_handlers::create_task),
        )
        .route("/bulk-update", post(task_handlers::bulk_update_tasks))
        .route(
            "/:id",
            get(task_handlers::get_task)
                .patch(task_handlers::update_task)
                .delete(task_handlers::delete_task),
        );

    let member_routes = Router::new()
        .route("/", get(member_handlers::list_members))
        .route(
            "/:id",
            patch(member_handlers::update_member).delete(member_handlers::delete_member),
        );

    let api_routes = Router::new()
        .nest("/workspaces", workspace_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .nest("/members", member_routes)
        .layer(middleware::from_fn(identity_middleware));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use planboard_shared::{
        api::{Envelope, USER_ID_HEADER, USER_NAME_HEADER},
        Workspace,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::identity::CurrentUser;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn api_requires_identity() {
        let app = create_router(AppState::default());
        let response = app
            .oneshot(Request::get("/api/workspaces").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn wrong_invite_code_is_a_domain_error() {
        let state = AppState::default();
        let owner = CurrentUser {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };
        let workspace = state
            .store
            .write()
            .await
            .create_workspace(&owner, "Acme", None)
            .unwrap();

        let request = Request::post(format!("/api/workspaces/{}/join", workspace.id))
            .header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .header(USER_NAME_HEADER, "Grace")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"code":"nope00"}"#))
            .unwrap();
        let response = create_router(state.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Envelope<Workspace> = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(body, Envelope::error("Invalid invite code"));
    }

    #[tokio::test]
    async fn unknown_workspace_is_not_found() {
        let request = Request::get(format!("/api/workspaces/{}", Uuid::new_v4()))
            .header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .body(Body::empty())
            .unwrap();
        let response = create_router(AppState::default())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
