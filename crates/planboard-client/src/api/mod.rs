mod client;
mod workspace_state;

pub use client::{ApiClient, ApiError, Identity};
pub use workspace_state::WorkspaceState;
