use crate::core::deadline::with_deadline;
use crate::domain::model::{Location, PathResolution, TruncationReason};
use crate::domain::ports::LocationStore;
use crate::utils::error::DirectoryError;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

/// Upper bound on parent hops. Real trees are at most five levels deep
/// (country, region, county, city, area).
pub const DEFAULT_MAX_DEPTH: usize = 10;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

enum Lookup {
    Found(Location),
    Missing,
    Failed(TruncationReason),
}

/// Walks parent references from a location up to its root.
///
/// One store round trip per level, issued sequentially. Store failures and
/// timeouts never surface as errors: resolution stops at the last location
/// that could be read and reports why through [`PathResolution`].
pub struct PathResolver<'a, S: LocationStore + ?Sized> {
    store: &'a S,
    max_depth: usize,
    timeout: Duration,
}

impl<'a, S: LocationStore + ?Sized> PathResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            max_depth: DEFAULT_MAX_DEPTH,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Root-first path ending at the location named by `key`; empty when `key` does not resolve.
    pub async fn resolve_path(&self, key: &str) -> Vec<Location> {
        self.resolve(key).await.into_path()
    }

    pub async fn resolve(&self, key: &str) -> PathResolution {
        match self.lookup(key).await {
            Lookup::Found(leaf) => self.resolve_from(leaf).await,
            Lookup::Missing => {
                tracing::debug!("Location '{}' not found", key);
                PathResolution::NotFound
            }
            Lookup::Failed(reason) => {
                tracing::warn!("Lookup of location '{}' failed ({:?})", key, reason);
                PathResolution::NotFound
            }
        }
    }

    /// Resolves the ancestors of an already fetched location.
    pub async fn resolve_from(&self, leaf: Location) -> PathResolution {
        let mut path = VecDeque::new();
        let mut visited = HashSet::new();
        visited.insert(leaf.id.clone());
        let mut next_parent = leaf.parent_id.clone();
        path.push_front(leaf);

        while let Some(parent_id) = next_parent {
            if path.len() >= self.max_depth {
                return self.truncated(path, parent_id, TruncationReason::DepthExceeded);
            }
            if visited.contains(&parent_id) {
                return self.truncated(path, parent_id, TruncationReason::Cycle);
            }

            match self.lookup(&parent_id).await {
                Lookup::Found(parent) => {
                    visited.insert(parent.id.clone());
                    next_parent = parent.parent_id.clone();
                    path.push_front(parent);
                }
                Lookup::Missing => {
                    return self.truncated(path, parent_id, TruncationReason::MissingParent);
                }
                Lookup::Failed(reason) => return self.truncated(path, parent_id, reason),
            }
        }

        PathResolution::Complete {
            path: path.into(),
        }
    }

    /// Resolves a request path such as `["england", "south-east", "surrey"]`.
    ///
    /// Slugs are only unique among siblings, so each segment after the first
    /// is matched against the children of the previous one. The returned path
    /// is the canonical chain of the leaf, which differs from the request when
    /// the first segment is not a root.
    pub async fn resolve_segments<T: AsRef<str>>(&self, segments: &[T]) -> PathResolution {
        let Some((first, rest)) = segments.split_first() else {
            return PathResolution::NotFound;
        };
        if segments.len() > self.max_depth {
            tracing::debug!("Request path has {} segments, over the depth limit", segments.len());
            return PathResolution::NotFound;
        }

        let mut current = match self.lookup(first.as_ref()).await {
            Lookup::Found(location) => location,
            _ => return PathResolution::NotFound,
        };

        for segment in rest {
            let segment = segment.as_ref();
            let children = match with_deadline(
                "get_child_locations",
                self.timeout,
                self.store.get_child_locations(&current.id),
            )
            .await
            {
                Ok(children) => children,
                Err(e) => {
                    tracing::warn!("Listing children of '{}' failed: {}", current.id, e);
                    return PathResolution::NotFound;
                }
            };

            match children.into_iter().find(|child| child.slug == segment) {
                Some(child) => current = child,
                None => {
                    tracing::debug!("No child '{}' under '{}'", segment, current.slug);
                    return PathResolution::NotFound;
                }
            }
        }

        self.resolve_from(current).await
    }

    async fn lookup(&self, key: &str) -> Lookup {
        let result = with_deadline(
            "get_location_by_slug_or_id",
            self.timeout,
            self.store.get_location_by_slug_or_id(key),
        )
        .await;

        match result {
            Ok(Some(location)) => Lookup::Found(location),
            Ok(None) => Lookup::Missing,
            Err(DirectoryError::Timeout { timeout_ms, .. }) => {
                tracing::warn!("Lookup of '{}' timed out after {}ms", key, timeout_ms);
                Lookup::Failed(TruncationReason::Timeout)
            }
            Err(e) => {
                tracing::warn!("Lookup of '{}' failed: {}", key, e);
                Lookup::Failed(TruncationReason::StoreError)
            }
        }
    }

    fn truncated(
        &self,
        path: VecDeque<Location>,
        broken_at: String,
        reason: TruncationReason,
    ) -> PathResolution {
        tracing::warn!(
            "Location chain truncated at '{}' ({:?}) after {} levels",
            broken_at,
            reason,
            path.len()
        );
        PathResolution::Truncated {
            path: path.into(),
            broken_at,
            reason,
        }
    }
}
