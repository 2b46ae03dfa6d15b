use crate::core::resolver::DEFAULT_MAX_DEPTH;
use crate::domain::model::{Agency, Location};
use crate::domain::ports::{ConfigProvider, LocationStore};
use crate::utils::error::{DirectoryError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

const REST_PATH: &str = "rest/v1/";
const AGENCY_ORDER: &str = "is_featured.desc,is_verified.desc,rating.desc.nullslast,name.asc";

fn uuid_pattern() -> &'static Regex {
    static UUID: OnceLock<Regex> = OnceLock::new();
    UUID.get_or_init(|| {
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
            .expect("uuid pattern is valid")
    })
}

/// Store over a PostgREST-style HTTP API (`/rest/v1/<table>`).
///
/// Identifiers are UUIDs, so a UUID-shaped key is looked up by `id` and
/// anything else by `slug`. When a slug repeats, the location with the
/// fewest ancestors is returned, as the in-memory tree does.
#[derive(Debug, Clone)]
pub struct RestLocationStore {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl RestLocationStore {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let mut url = Url::parse(base_url).map_err(|e| DirectoryError::InvalidConfigValueError {
            field: "backend.url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: url,
            api_key,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.backend_url(),
            config.api_key().map(str::to_string),
            config.request_timeout(),
        )
    }

    fn table_url(&self, table: &str) -> Result<Url> {
        self.base_url
            .join(REST_PATH)
            .and_then(|rest| rest.join(table))
            .map_err(|e| DirectoryError::ConfigError {
                message: format!("Cannot build URL for table '{}': {}", table, e),
            })
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));

        tracing::debug!("GET {}", url);
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Backend response status: {}", status);

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DirectoryError::BackendError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<Vec<T>>(&body).map_err(|e| {
            tracing::warn!("Rows from '{}' could not be decoded: {}", table, e);
            DirectoryError::SerializationError(e)
        })
    }

    /// Number of parent hops above `location`, bounded by [`DEFAULT_MAX_DEPTH`].
    async fn ancestor_count(&self, location: &Location) -> Result<usize> {
        let mut count = 0;
        let mut next = location.parent_id.clone();
        while let Some(parent_id) = next {
            if count >= DEFAULT_MAX_DEPTH {
                break;
            }
            count += 1;
            next = self
                .fetch_location("id", &parent_id)
                .await?
                .and_then(|parent| parent.parent_id);
        }
        Ok(count)
    }

    async fn fetch_location(&self, column: &str, value: &str) -> Result<Option<Location>> {
        let rows: Vec<Location> = self
            .fetch_rows(
                "locations",
                &[
                    ("select", "*".to_string()),
                    (column, format!("eq.{}", value)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl LocationStore for RestLocationStore {
    async fn get_location_by_slug_or_id(&self, key: &str) -> Result<Option<Location>> {
        if uuid_pattern().is_match(key) {
            return self.fetch_location("id", key).await;
        }

        // Slugs repeat across branches; the shallowest match wins, ties by name.
        let mut candidates: Vec<Location> = self
            .fetch_rows(
                "locations",
                &[
                    ("select", "*".to_string()),
                    ("slug", format!("eq.{}", key)),
                    ("order", "name.asc".to_string()),
                ],
            )
            .await?;
        if candidates.len() <= 1 {
            return Ok(candidates.pop());
        }

        tracing::debug!("Slug '{}' matches {} locations", key, candidates.len());
        let mut best: Option<(usize, Location)> = None;
        for candidate in candidates {
            let depth = self.ancestor_count(&candidate).await?;
            if best.as_ref().map_or(true, |(best_depth, _)| depth < *best_depth) {
                best = Some((depth, candidate));
            }
        }
        Ok(best.map(|(_, location)| location))
    }

    async fn get_child_locations(&self, parent_id: &str) -> Result<Vec<Location>> {
        self.fetch_rows(
            "locations",
            &[
                ("select", "*".to_string()),
                ("parent_id", format!("eq.{}", parent_id)),
                ("order", "name.asc".to_string()),
            ],
        )
        .await
    }

    async fn get_agencies_by_location(&self, location_id: &str, limit: usize) -> Result<Vec<Agency>> {
        self.fetch_rows(
            "agencies",
            &[
                ("select", "*,agency_locations!inner(location_id)".to_string()),
                ("agency_locations.location_id", format!("eq.{}", location_id)),
                ("order", AGENCY_ORDER.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn list_locations(&self) -> Result<Vec<Location>> {
        self.fetch_rows(
            "locations",
            &[
                ("select", "*".to_string()),
                ("order", "name.asc".to_string()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_keeps_base_path() {
        let store = RestLocationStore::new("https://example.test/api", None, Duration::from_secs(1)).unwrap();

        assert_eq!(
            store.table_url("locations").unwrap().as_str(),
            "https://example.test/api/rest/v1/locations"
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let result = RestLocationStore::new("not a url", None, Duration::from_secs(1));
        assert!(matches!(
            result,
            Err(DirectoryError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_uuid_keys_detected() {
        assert!(uuid_pattern().is_match("3f2b8c1e-9a4d-4e2b-8f6a-1c2d3e4f5a6b"));
        assert!(!uuid_pattern().is_match("south-east"));
    }
}
