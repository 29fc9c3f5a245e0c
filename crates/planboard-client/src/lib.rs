//! Client side of planboard.
//!
//! [`api::ApiClient`] talks to the backend. Reads go through the shared
//! [`cache::QueryCache`]; writes go through [`mutation::Mutation`]s built in
//! [`hooks`], which mark stale whatever [`invalidation`] says they touched.
//! The [`flows`] tie forms, confirmation gates and feedback together for each
//! screen.

pub mod api;
pub mod cache;
pub mod config;
pub mod confirm;
pub mod context;
pub mod feedback;
pub mod flows;
pub mod hooks;
pub mod invalidation;
pub mod invite;
pub mod mutation;
pub mod queries;
pub mod upload;

pub use api::{ApiClient, ApiError, Identity};
pub use cache::{Invalidation, QueryCache, QueryKey};
pub use config::ClientConfig;
pub use confirm::{ConfirmGate, ConfirmPrompt, GateState, Tone};
pub use context::ClientContext;
pub use feedback::{Feedback, Route, Toast, ToastKind};
pub use mutation::{Mutation, MutationError, MutationStatus};
pub use queries::Queries;
