use crate::core::tree::LocationTree;
use crate::domain::model::{Agency, Location};
use crate::domain::ports::LocationStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Serves location lookups from an in-memory [`LocationTree`] snapshot of
/// `inner`, so resolving a path costs no round trips once loaded.
///
/// Agency listings always go to `inner`. Until [`refresh`](Self::refresh)
/// succeeds every call is delegated.
pub struct CachedLocationStore<S: LocationStore> {
    inner: S,
    snapshot: RwLock<Option<Arc<LocationTree>>>,
}

impl<S: LocationStore> CachedLocationStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            snapshot: RwLock::new(None),
        }
    }

    /// Reloads the whole location table. On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<usize> {
        let locations = self.inner.list_locations().await?;
        let tree = Arc::new(LocationTree::from_locations(locations));
        let count = tree.len();
        *self.snapshot.write().await = Some(tree);
        tracing::info!("Location cache refreshed with {} locations", count);
        Ok(count)
    }

    /// Loads the snapshot if the backend allows it.
    ///
    /// Returns `Ok(false)` after a transient failure, leaving reads to fall
    /// through to the backend. Other failures are returned, since per-level
    /// queries would fail the same way.
    pub async fn warm(&self) -> Result<bool> {
        match self.refresh().await {
            Ok(_) => Ok(true),
            Err(e) if e.is_transient() => {
                tracing::warn!("Location cache unavailable, querying per level: {}", e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn snapshot(&self) -> Option<Arc<LocationTree>> {
        self.snapshot.read().await.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        self.snapshot.read().await.is_some()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: LocationStore> LocationStore for CachedLocationStore<S> {
    async fn get_location_by_slug_or_id(&self, key: &str) -> Result<Option<Location>> {
        match self.snapshot().await {
            Some(tree) => Ok(tree.find(key).cloned()),
            None => self.inner.get_location_by_slug_or_id(key).await,
        }
    }

    async fn get_child_locations(&self, parent_id: &str) -> Result<Vec<Location>> {
        match self.snapshot().await {
            Some(tree) => Ok(tree.children(parent_id).into_iter().cloned().collect()),
            None => self.inner.get_child_locations(parent_id).await,
        }
    }

    async fn get_agencies_by_location(&self, location_id: &str, limit: usize) -> Result<Vec<Agency>> {
        self.inner.get_agencies_by_location(location_id, limit).await
    }

    async fn list_locations(&self) -> Result<Vec<Location>> {
        match self.snapshot().await {
            Some(tree) => Ok(tree.locations().cloned().collect()),
            None => self.inner.list_locations().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::InMemoryLocationStore;
    use crate::core::fixtures::england_locations;
    use crate::core::resolver::PathResolver;
    use crate::utils::error::DirectoryError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct CountingStore {
        inner: InMemoryLocationStore,
        lookups: AtomicUsize,
        offline: AtomicBool,
    }

    #[async_trait]
    impl LocationStore for CountingStore {
        async fn get_location_by_slug_or_id(&self, key: &str) -> Result<Option<Location>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.get_location_by_slug_or_id(key).await
        }

        async fn get_child_locations(&self, parent_id: &str) -> Result<Vec<Location>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.get_child_locations(parent_id).await
        }

        async fn get_agencies_by_location(&self, location_id: &str, limit: usize) -> Result<Vec<Agency>> {
            self.inner.get_agencies_by_location(location_id, limit).await
        }

        async fn list_locations(&self) -> Result<Vec<Location>> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(DirectoryError::BackendError {
                    status: 503,
                    message: "offline".to_string(),
                });
            }
            self.inner.list_locations().await
        }
    }

    fn counting() -> CountingStore {
        CountingStore {
            inner: InMemoryLocationStore::from_locations(england_locations()),
            lookups: AtomicUsize::new(0),
            offline: AtomicBool::new(false),
        }
    }

    #[tokio::test]
    async fn test_delegates_until_refreshed() {
        let cached = CachedLocationStore::new(counting());

        assert!(!cached.is_loaded().await);
        let path = PathResolver::new(&cached).resolve_path("guildford").await;

        assert_eq!(path.len(), 4);
        assert_eq!(cached.inner().lookups.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_snapshot_serves_resolution_without_round_trips() {
        let cached = CachedLocationStore::new(counting());
        assert_eq!(cached.refresh().await.unwrap(), 8);

        let path = PathResolver::new(&cached).resolve_path("guildford").await;
        let children = cached.get_child_locations("loc-surrey").await.unwrap();

        assert_eq!(path.len(), 4);
        assert_eq!(children.len(), 2);
        assert_eq!(cached.inner().lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let cached = CachedLocationStore::new(counting());
        cached.refresh().await.unwrap();
        let before = cached.snapshot().await.unwrap().loaded_at();

        cached.inner().offline.store(true, Ordering::SeqCst);

        assert!(cached.refresh().await.is_err());
        assert_eq!(cached.snapshot().await.unwrap().loaded_at(), before);
    }
}
