//! Mutation constructors, one per backend action, each wired to its
//! invalidation policy.

mod members;
mod projects;
mod tasks;
mod workspaces;

use std::future::Future;

use uuid::Uuid;

use crate::api::{ApiClient, ApiError};
use crate::cache::QueryCache;
use crate::mutation::Mutation;

pub use members::*;
pub use projects::*;
pub use tasks::*;
pub use workspaces::*;

/// Input for update mutations: which entity, and what to change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch<T> {
    pub id: Uuid,
    pub changes: T,
}

impl<T> Patch<T> {
    pub fn new(id: Uuid, changes: T) -> Self {
        Self { id, changes }
    }
}

fn api_mutation<I, O, F, Fut>(
    api: &ApiClient,
    cache: &QueryCache,
    action: &'static str,
    failure_message: &'static str,
    call: F,
) -> Mutation<I, O>
where
    I: Clone + Send + 'static,
    O: Send + 'static,
    F: Fn(ApiClient, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, ApiError>> + Send + 'static,
{
    let api = api.clone();
    Mutation::new(cache.clone(), action, failure_message, move |input| {
        call(api.clone(), input)
    })
}
