//! One network mutation and its lifecycle.
//!
//! A [`Mutation`] runs at most one request at a time, reports
//! [`MutationStatus`] through a watch channel, and on success marks every
//! query its invalidation policy names as stale. The policy sees both the
//! input and the server's result, so an edit can reach what it moved away from. Failures leave the cache
//! alone and never navigate or notify; that is left to the caller.

use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::ApiError;
use crate::cache::{Invalidation, QueryCache};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    /// Failed, with the message a user should see.
    Error(String),
}

impl MutationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("{action} is already in progress")]
    AlreadyPending { action: &'static str },
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl MutationError {
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Failed { source, .. } => Some(source),
            Self::AlreadyPending { .. } => None,
        }
    }
}

type RunFn<I, O> = dyn Fn(I) -> BoxFuture<'static, Result<O, ApiError>> + Send + Sync;
type InvalidateFn<I, O> = dyn Fn(&I, &O) -> Vec<Invalidation> + Send + Sync;

pub struct Mutation<I, O> {
    action: &'static str,
    failure_message: &'static str,
    run: Arc<RunFn<I, O>>,
    invalidate: Arc<InvalidateFn<I, O>>,
    cache: QueryCache,
    status: Arc<watch::Sender<MutationStatus>>,
}

impl<I, O> Clone for Mutation<I, O> {
    fn clone(&self) -> Self {
        Self {
            action: self.action,
            failure_message: self.failure_message,
            run: self.run.clone(),
            invalidate: self.invalidate.clone(),
            cache: self.cache.clone(),
            status: self.status.clone(),
        }
    }
}

impl<I, O> std::fmt::Debug for Mutation<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutation")
            .field("action", &self.action)
            .field("status", &*self.status.borrow())
            .finish()
    }
}

impl<I, O> Mutation<I, O>
where
    I: Clone + Send + 'static,
    O: Send + 'static,
{
    /// `failure_message` is what the user sees when the request fails for
    /// any reason other than a domain error.
    pub fn new<F, Fut>(
        cache: QueryCache,
        action: &'static str,
        failure_message: &'static str,
        run: F,
    ) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ApiError>> + Send + 'static,
    {
        let (status, _) = watch::channel(MutationStatus::Idle);
        Self {
            action,
            failure_message,
            run: Arc::new(move |input| run(input).boxed()),
            invalidate: Arc::new(|_: &I, _: &O| Vec::new()),
            cache,
            status: Arc::new(status),
        }
    }

    pub fn invalidating<F>(mut self, policy: F) -> Self
    where
        F: Fn(&O) -> Vec<Invalidation> + Send + Sync + 'static,
    {
        self.invalidate = Arc::new(move |_: &I, output: &O| policy(output));
        self
    }

    /// Like [`Mutation::invalidating`], for policies that also need the input.
    pub fn invalidating_with<F>(mut self, policy: F) -> Self
    where
        F: Fn(&I, &O) -> Vec<Invalidation> + Send + Sync + 'static,
    {
        self.invalidate = Arc::new(policy);
        self
    }

    pub fn action(&self) -> &'static str {
        self.action
    }

    pub fn status(&self) -> MutationStatus {
        self.status.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.status.borrow().is_pending()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationStatus> {
        self.status.subscribe()
    }

    /// Run the mutation. Returns `AlreadyPending` without sending anything
    /// if this instance already has a request in flight.
    ///
    /// Dropping the returned future before it completes puts the status
    /// back to `Idle`.
    pub async fn mutate(&self, input: I) -> Result<O, MutationError> {
        let claimed = self.status.send_if_modified(|status| {
            if status.is_pending() {
                false
            } else {
                *status = MutationStatus::Pending;
                true
            }
        });
        if !claimed {
            return Err(MutationError::AlreadyPending {
                action: self.action,
            });
        }

        let guard = PendingGuard {
            status: &self.status,
            armed: true,
        };

        match (self.run)(input.clone()).await {
            Ok(output) => {
                let invalidated = self.cache.apply(&(self.invalidate)(&input, &output));
                tracing::debug!(
                    action = self.action,
                    invalidated = invalidated.len(),
                    "mutation succeeded"
                );
                guard.finish(MutationStatus::Success);
                Ok(output)
            }
            Err(source) => {
                tracing::warn!(action = self.action, error = %source, "mutation failed");
                let message = source.user_message(self.failure_message);
                guard.finish(MutationStatus::Error(message.clone()));
                Err(MutationError::Failed { message, source })
            }
        }
    }

    /// Run on a separate task. The result is discarded if the handle is
    /// dropped.
    pub fn spawn(&self, input: I) -> JoinHandle<Result<O, MutationError>> {
        let this = self.clone();
        tokio::spawn(async move { this.mutate(input).await })
    }

    /// Clear a finished status. Has no effect while pending.
    pub fn reset(&self) {
        self.status.send_if_modified(|status| {
            if status.is_pending() || *status == MutationStatus::Idle {
                false
            } else {
                *status = MutationStatus::Idle;
                true
            }
        });
    }
}

struct PendingGuard<'a> {
    status: &'a watch::Sender<MutationStatus>,
    armed: bool,
}

impl PendingGuard<'_> {
    fn finish(mut self, status: MutationStatus) {
        self.armed = false;
        self.status.send_replace(status);
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.status.send_replace(MutationStatus::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;
    use uuid::Uuid;

    use super::*;
    use crate::cache::QueryKey;

    fn key() -> QueryKey {
        QueryKey::Workspace(Uuid::nil())
    }

    #[tokio::test]
    async fn success_invalidates_and_reports_success() {
        let cache = QueryCache::new();
        cache.set(key(), 1u32);
        let mutation = Mutation::new(cache.clone(), "Rename", "Failed to rename", |n: u32| async move {
            Ok(n + 1)
        })
        .invalidating(|_| vec![key().into()]);

        assert_eq!(mutation.mutate(1).await.unwrap(), 2);
        assert_eq!(mutation.status(), MutationStatus::Success);
        assert!(cache.is_stale(&key()));

        mutation.reset();
        assert_eq!(mutation.status(), MutationStatus::Idle);
    }

    #[tokio::test]
    async fn policy_can_read_the_input() {
        let cache = QueryCache::new();
        let before = QueryKey::Project(Uuid::from_u128(1));
        let after = QueryKey::Project(Uuid::from_u128(2));
        cache.set(before.clone(), ());
        cache.set(after.clone(), ());

        let mutation = Mutation::new(cache.clone(), "Move", "Failed to move", |_: u128| async {
            Ok::<_, ApiError>(2u128)
        })
        .invalidating_with(|from: &u128, to: &u128| {
            vec![
                QueryKey::Project(Uuid::from_u128(*from)).into(),
                QueryKey::Project(Uuid::from_u128(*to)).into(),
            ]
        });

        mutation.mutate(1).await.unwrap();
        assert!(cache.is_stale(&before));
        assert!(cache.is_stale(&after));
    }

    #[tokio::test]
    async fn failure_leaves_cache_fresh() {
        let cache = QueryCache::new();
        cache.set(key(), 1u32);
        let mutation = Mutation::new(cache.clone(), "Delete", "Failed to delete", |_: ()| async {
            Err::<u32, _>(ApiError::Status {
                status: 500,
                message: "boom".to_string(),
            })
        })
        .invalidating(|_| vec![key().into()]);

        let err = mutation.mutate(()).await.unwrap_err();

        assert_eq!(err.user_message(), "Failed to delete");
        assert_eq!(mutation.status(), MutationStatus::Error("Failed to delete".to_string()));
        assert!(!cache.is_stale(&key()));
    }

    #[tokio::test]
    async fn domain_errors_are_shown_verbatim() {
        let mutation = Mutation::new(QueryCache::new(), "Join", "Failed to join workspace", |_: ()| async {
            Err::<(), _>(ApiError::Domain("Invalid invite code".to_string()))
        });

        let err = mutation.mutate(()).await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid invite code");
        assert!(err.api_error().is_some_and(ApiError::is_domain));
    }

    #[tokio::test]
    async fn second_call_while_pending_sends_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(Notify::new());
        let mutation = {
            let calls = calls.clone();
            let release = release.clone();
            Mutation::new(QueryCache::new(), "Create task", "Failed to create task", move |_: ()| {
                let calls = calls.clone();
                let release = release.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    release.notified().await;
                    Ok(())
                }
            })
        };

        let (first, second) = tokio::join!(mutation.mutate(()), async {
            let second = mutation.mutate(()).await;
            release.notify_one();
            second
        });

        assert!(first.is_ok());
        assert!(matches!(
            second,
            Err(MutationError::AlreadyPending { action: "Create task" })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropping_a_pending_call_resets_to_idle() {
        let mutation = Mutation::new(QueryCache::new(), "Update", "Failed to update", |_: ()| {
            futures::future::pending::<Result<(), ApiError>>()
        });

        {
            let call = mutation.mutate(());
            tokio::pin!(call);
            assert!(futures::poll!(call.as_mut()).is_pending());
            assert!(mutation.is_pending());
        }

        assert_eq!(mutation.status(), MutationStatus::Idle);
        assert!(!mutation.is_pending());
    }

    #[tokio::test]
    async fn status_changes_are_observable() {
        let mutation = Mutation::new(QueryCache::new(), "Update", "Failed to update", |_: ()| async {
            Ok::<_, ApiError>(())
        });
        let mut rx = mutation.subscribe();

        mutation.spawn(()).await.unwrap().unwrap();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), MutationStatus::Success);
    }
}
