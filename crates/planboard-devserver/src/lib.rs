//! In-memory stand-in for the hosted backend that the planboard client talks
//! to. It implements every endpoint the client calls, with the same response
//! envelope and the same join and invite-code rules, but keeps all records in
//! process memory and trusts the identity headers it is sent.

pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod routes;
pub mod store;

pub use config::Config;
pub use routes::{create_router, AppState};

use tokio::net::TcpListener;

/// Serve the API on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, create_router(state)).await
}
