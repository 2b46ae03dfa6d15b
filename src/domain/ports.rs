use crate::domain::model::{Agency, Location};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Read access to the hosted location/agency tables.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Point lookup by identifier, falling back to slug.
    async fn get_location_by_slug_or_id(&self, key: &str) -> Result<Option<Location>>;

    /// Direct children of `parent_id`, ordered by name.
    async fn get_child_locations(&self, parent_id: &str) -> Result<Vec<Location>>;

    async fn get_agencies_by_location(&self, location_id: &str, limit: usize)
        -> Result<Vec<Agency>>;

    /// Every location row, used to build an in-memory tree.
    async fn list_locations(&self) -> Result<Vec<Location>>;
}

pub trait ConfigProvider: Send + Sync {
    fn backend_url(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn request_timeout(&self) -> Duration;
    fn max_depth(&self) -> usize;
    fn url_prefix(&self) -> &str;
    fn agency_limit(&self) -> usize;
}
