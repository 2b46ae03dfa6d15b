use crate::core::aggregator::rank_agencies;
use crate::core::tree::LocationTree;
use crate::domain::model::{Agency, AgencyLocation, Location};
use crate::domain::ports::LocationStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// On-disk export of the three tables the resolver reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationSnapshot {
    pub locations: Vec<Location>,
    #[serde(default)]
    pub agencies: Vec<Agency>,
    #[serde(default)]
    pub agency_locations: Vec<AgencyLocation>,
}

/// Store backed by a snapshot held in memory. Used for fixtures and tests.
#[derive(Debug, Clone)]
pub struct InMemoryLocationStore {
    tree: LocationTree,
    agencies: HashMap<String, Agency>,
    links: Vec<AgencyLocation>,
}

impl InMemoryLocationStore {
    pub fn new(locations: Vec<Location>, agencies: Vec<Agency>, links: Vec<AgencyLocation>) -> Self {
        Self {
            tree: LocationTree::from_locations(locations),
            agencies: agencies
                .into_iter()
                .map(|agency| (agency.id.clone(), agency))
                .collect(),
            links,
        }
    }

    pub fn from_locations(locations: Vec<Location>) -> Self {
        Self::new(locations, Vec::new(), Vec::new())
    }

    pub fn from_snapshot(snapshot: LocationSnapshot) -> Self {
        Self::new(snapshot.locations, snapshot.agencies, snapshot.agency_locations)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let snapshot: LocationSnapshot = serde_json::from_str(content)?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let store = Self::from_json_str(&content)?;
        tracing::debug!(
            "Loaded {} locations from {}",
            store.tree.len(),
            path.as_ref().display()
        );
        Ok(store)
    }
}

#[async_trait]
impl LocationStore for InMemoryLocationStore {
    async fn get_location_by_slug_or_id(&self, key: &str) -> Result<Option<Location>> {
        Ok(self.tree.find(key).cloned())
    }

    async fn get_child_locations(&self, parent_id: &str) -> Result<Vec<Location>> {
        Ok(self.tree.children(parent_id).into_iter().cloned().collect())
    }

    async fn get_agencies_by_location(&self, location_id: &str, limit: usize) -> Result<Vec<Agency>> {
        let linked: Vec<Agency> = self
            .links
            .iter()
            .filter(|link| link.location_id == location_id)
            .filter_map(|link| self.agencies.get(&link.agency_id).cloned())
            .collect();

        let mut ranked = rank_agencies(linked);
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn list_locations(&self) -> Result<Vec<Location>> {
        Ok(self.tree.locations().cloned().collect())
    }
}
