//! Process-wide query cache.
//!
//! Entries are keyed by [`QueryKey`] and hold type-erased values. Invalidation
//! only marks entries stale; the next [`QueryCache::fetch`] of a stale key
//! refetches, and concurrent readers of that key share a single fetch.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use planboard_shared::api::TaskFilter;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Identity of one cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Workspaces,
    Workspace(Uuid),
    WorkspaceInfo(Uuid),
    WorkspaceAnalytics(Uuid),
    Projects { workspace_id: Uuid },
    Project(Uuid),
    ProjectAnalytics(Uuid),
    Tasks(TaskFilter),
    Task(Uuid),
    Members { workspace_id: Uuid },
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workspaces => write!(f, "[workspaces]"),
            Self::Workspace(id) => write!(f, "[workspace, {}]", id),
            Self::WorkspaceInfo(id) => write!(f, "[workspace-info, {}]", id),
            Self::WorkspaceAnalytics(id) => write!(f, "[workspace-analytics, {}]", id),
            Self::Projects { workspace_id } => write!(f, "[projects, {}]", workspace_id),
            Self::Project(id) => write!(f, "[project, {}]", id),
            Self::ProjectAnalytics(id) => write!(f, "[project-analytics, {}]", id),
            Self::Tasks(filter) => match filter.project_id {
                Some(project_id) => write!(f, "[tasks, {}, {}]", filter.workspace_id, project_id),
                None => write!(f, "[tasks, {}]", filter.workspace_id),
            },
            Self::Task(id) => write!(f, "[task, {}]", id),
            Self::Members { workspace_id } => write!(f, "[members, {}]", workspace_id),
        }
    }
}

/// A set of keys to mark stale after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Key(QueryKey),
    /// Every cached task list of a workspace, whatever its filter.
    TaskLists { workspace_id: Uuid },
}

impl Invalidation {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match (self, key) {
            (Self::Key(expected), key) => expected == key,
            (Self::TaskLists { workspace_id }, QueryKey::Tasks(filter)) => {
                filter.workspace_id == *workspace_id
            }
            _ => false,
        }
    }
}

impl From<QueryKey> for Invalidation {
    fn from(key: QueryKey) -> Self {
        Self::Key(key)
    }
}

type Value = Arc<dyn Any + Send + Sync>;

struct Entry {
    value: Option<Value>,
    stale: bool,
    generation: u64,
    fetches: u64,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Entry {
    fn empty() -> Self {
        Self {
            value: None,
            stale: true,
            generation: 0,
            fetches: 0,
            lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

struct Inner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    invalidated: broadcast::Sender<QueryKey>,
}

/// Shared, cloneable handle to the query cache.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.inner.entries.lock().len())
            .finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let (invalidated, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                invalidated,
            }),
        }
    }

    /// Return the cached value for `key` while it is fresh, otherwise run
    /// `fetcher` and cache its result. Only one fetch per key runs at a time;
    /// callers that queued behind it reuse its result.
    ///
    /// A failed fetch leaves the entry as it was.
    pub async fn fetch<T, E, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, E>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.fresh::<T>(&key) {
            return Ok(value);
        }

        let lock = self.key_lock(&key);
        let _guard = lock.lock().await;

        if let Some(value) = self.fresh::<T>(&key) {
            return Ok(value);
        }

        let generation = self.begin_fetch(&key);
        tracing::debug!(%key, "fetching query");
        let value = Arc::new(fetcher().await?);
        self.store(&key, generation, value.clone());
        Ok(value)
    }

    /// Cached value regardless of freshness.
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let entries = self.inner.entries.lock();
        let value = entries.get(key)?.value.clone()?;
        value.downcast::<T>().ok()
    }

    /// Seed or overwrite an entry with a fresh value.
    pub fn set<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        let mut entries = self.inner.entries.lock();
        let entry = entries.entry(key).or_insert_with(Entry::empty);
        entry.value = Some(Arc::new(value));
        entry.stale = false;
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner
            .entries
            .lock()
            .get(key)
            .is_some_and(|entry| entry.value.is_some())
    }

    /// Whether a cached entry has been invalidated since it was fetched.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.inner
            .entries
            .lock()
            .get(key)
            .is_some_and(|entry| entry.value.is_some() && entry.stale)
    }

    /// How many fetches have started for `key`.
    pub fn fetch_count(&self, key: &QueryKey) -> u64 {
        self.inner
            .entries
            .lock()
            .get(key)
            .map_or(0, |entry| entry.fetches)
    }

    /// Mark one key stale. Returns whether the key was cached.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        let found = {
            let mut entries = self.inner.entries.lock();
            match entries.get_mut(key) {
                Some(entry) => {
                    entry.stale = true;
                    entry.generation += 1;
                    true
                }
                None => false,
            }
        };

        if found {
            tracing::debug!(%key, "query invalidated");
            let _ = self.inner.invalidated.send(key.clone());
        }
        found
    }

    /// Mark every key matched by `invalidations` stale and return those keys.
    pub fn apply(&self, invalidations: &[Invalidation]) -> Vec<QueryKey> {
        let keys: Vec<QueryKey> = {
            let entries = self.inner.entries.lock();
            entries
                .keys()
                .filter(|key| invalidations.iter().any(|inv| inv.matches(key)))
                .cloned()
                .collect()
        };

        for key in &keys {
            self.invalidate(key);
        }
        keys
    }

    /// Keys are broadcast as they are invalidated so views know to re-read.
    pub fn subscribe(&self) -> broadcast::Receiver<QueryKey> {
        self.inner.invalidated.subscribe()
    }

    pub fn remove(&self, key: &QueryKey) {
        self.inner.entries.lock().remove(key);
    }

    pub fn clear(&self) {
        self.inner.entries.lock().clear();
    }

    fn fresh<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let entries = self.inner.entries.lock();
        let entry = entries.get(key)?;
        if entry.stale {
            return None;
        }
        entry.value.clone()?.downcast::<T>().ok()
    }

    fn key_lock(&self, key: &QueryKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut entries = self.inner.entries.lock();
        entries
            .entry(key.clone())
            .or_insert_with(Entry::empty)
            .lock
            .clone()
    }

    fn begin_fetch(&self, key: &QueryKey) -> u64 {
        let mut entries = self.inner.entries.lock();
        let entry = entries.entry(key.clone()).or_insert_with(Entry::empty);
        entry.fetches += 1;
        entry.generation
    }

    /// A value whose fetch overlapped an invalidation is kept but stays stale.
    fn store(&self, key: &QueryKey, generation: u64, value: Value) {
        let mut entries = self.inner.entries.lock();
        let entry = entries.entry(key.clone()).or_insert_with(Entry::empty);
        entry.stale = entry.generation != generation;
        entry.value = Some(value);
    }
}
