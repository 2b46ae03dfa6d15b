use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// Hosted tables send `null` for unset nullable columns; treat it like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Level of a node in the geographic hierarchy, broadest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Country,
    Region,
    County,
    City,
    Area,
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LocationType::Country => "country",
            LocationType::Region => "region",
            LocationType::County => "county",
            LocationType::City => "city",
            LocationType::Area => "area",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub agency_count: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub seo_description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Location {
    pub fn new(id: &str, name: &str, slug: &str, location_type: LocationType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            location_type,
            parent_id: None,
            agency_count: None,
            description: None,
            seo_title: None,
            seo_description: None,
            updated_at: None,
        }
    }

    pub fn with_parent(mut self, parent_id: &str) -> Self {
        self.parent_id = Some(parent_id.to_string());
        self
    }

    pub fn with_agency_count(mut self, count: u32) -> Self {
        self.agency_count = Some(count);
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agency {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_verified: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_featured: bool,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub specialisms: Vec<String>,
}

impl Agency {
    pub fn new(id: &str, name: &str, slug: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            rating: None,
            is_verified: false,
            is_featured: false,
            phone: None,
            email: None,
            website: None,
            specialisms: Vec::new(),
        }
    }
}

/// Row of the agency/location association table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyLocation {
    pub agency_id: String,
    pub location_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Breadcrumb {
    pub fn link(label: &str, url: String) -> Self {
        Self {
            label: label.to_string(),
            url: Some(url),
        }
    }

    pub fn is_link(&self) -> bool {
        self.url.is_some()
    }
}

/// Outcome of walking a location's parent chain, root-first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PathResolution {
    Complete {
        path: Vec<Location>,
    },
    /// The walk stopped early; `broken_at` is the parent reference that could not be followed.
    #[serde(rename_all = "camelCase")]
    Truncated {
        path: Vec<Location>,
        broken_at: String,
        reason: TruncationReason,
    },
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TruncationReason {
    MissingParent,
    StoreError,
    Timeout,
    DepthExceeded,
    Cycle,
}

impl PathResolution {
    pub fn path(&self) -> &[Location] {
        match self {
            PathResolution::Complete { path } | PathResolution::Truncated { path, .. } => path,
            PathResolution::NotFound => &[],
        }
    }

    pub fn into_path(self) -> Vec<Location> {
        match self {
            PathResolution::Complete { path } | PathResolution::Truncated { path, .. } => path,
            PathResolution::NotFound => Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, PathResolution::Complete { .. })
    }

    pub fn leaf(&self) -> Option<&Location> {
        self.path().last()
    }
}

/// Everything the rendering layer needs for one location page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationView {
    pub path: Vec<Location>,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub url: String,
    pub aggregate_count: u64,
    pub children: Vec<Location>,
    pub agencies: Vec<Agency>,
    pub resolution: PathResolution,
    /// False when the request reached the leaf through a non-canonical path.
    pub canonical: bool,
}

impl LocationView {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn leaf(&self) -> Option<&Location> {
        self.path.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_deserializes_backend_row() {
        let row = serde_json::json!({
            "id": "7b1c",
            "name": "South East",
            "slug": "south-east",
            "type": "region",
            "parent_id": "e1",
            "agency_count": null,
            "updated_at": "2024-03-01T10:00:00Z",
            "created_by": "admin"
        });

        let location: Location = serde_json::from_value(row).unwrap();

        assert_eq!(location.location_type, LocationType::Region);
        assert_eq!(location.parent_id.as_deref(), Some("e1"));
        assert_eq!(location.agency_count, None);
        assert!(location.seo_title.is_none());
        assert!(location.updated_at.is_some());
    }

    #[test]
    fn test_agency_null_flags_default() {
        let rows = serde_json::json!([
            {"id": "a1", "name": "Hearth Fostering", "slug": "hearth-fostering",
             "is_verified": null, "is_featured": null, "specialisms": null, "rating": null},
            {"id": "a2", "name": "Beacon Family Care", "slug": "beacon-family-care"}
        ]);

        let agencies: Vec<Agency> = serde_json::from_value(rows).unwrap();

        assert_eq!(agencies.len(), 2);
        assert!(!agencies[0].is_verified);
        assert!(!agencies[0].is_featured);
        assert!(agencies[0].specialisms.is_empty());
        assert!(!agencies[1].is_featured);
    }

    #[test]
    fn test_breadcrumb_without_url_omits_field() {
        let crumb = Breadcrumb {
            label: "Guildford".to_string(),
            url: None,
        };

        let json = serde_json::to_value(&crumb).unwrap();
        assert_eq!(json, serde_json::json!({"label": "Guildford"}));
    }

    #[test]
    fn test_truncated_resolution_exposes_partial_path() {
        let leaf = Location::new("g", "Guildford", "guildford", LocationType::City).with_parent("gone");
        let resolution = PathResolution::Truncated {
            path: vec![leaf.clone()],
            broken_at: "gone".to_string(),
            reason: TruncationReason::MissingParent,
        };

        assert!(!resolution.is_complete());
        assert_eq!(resolution.leaf(), Some(&leaf));

        let json = serde_json::to_value(&resolution).unwrap();
        assert_eq!(json["status"], "truncated");
        assert_eq!(json["brokenAt"], "gone");
        assert_eq!(json["reason"], "missingParent");
    }
}
