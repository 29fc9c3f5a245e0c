#![allow(dead_code)]

use planboard_client::{
    feedback::Recorder, ApiClient, ClientContext, ConfirmGate, Feedback, Identity,
};
use planboard_devserver::AppState;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub const ORIGIN: &str = "https://planboard.test";

/// A devserver on an ephemeral port, alive for as long as this value.
pub struct TestServer {
    pub state: AppState,
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::default();

    let server_state = state.clone();
    let handle = tokio::spawn(async move {
        planboard_devserver::serve(listener, server_state).await.unwrap();
    });

    TestServer {
        state,
        base_url: format!("http://{}", addr),
        handle,
    }
}

/// One signed-in user with their own cache and recorded feedback.
pub struct TestUser {
    pub identity: Identity,
    pub ctx: ClientContext,
    pub recorder: Recorder,
}

impl TestServer {
    pub fn user(&self, name: &str) -> TestUser {
        let identity = Identity::new(
            Uuid::new_v4(),
            name,
            format!("{}@example.com", name.to_lowercase()),
        );
        let api = ApiClient::new(&self.base_url).with_identity(identity.clone());
        let recorder = Recorder::new();
        let ctx = ClientContext::new(api, Feedback::recording(&recorder), ORIGIN);

        TestUser {
            identity,
            ctx,
            recorder,
        }
    }
}

/// Answer the gate's next prompt from a separate task.
pub fn answer(gate: &ConfirmGate, confirmed: bool) -> JoinHandle<bool> {
    let gate = gate.clone();
    tokio::spawn(async move {
        let cycle = gate.prompted().await;
        gate.respond(cycle, confirmed)
    })
}
