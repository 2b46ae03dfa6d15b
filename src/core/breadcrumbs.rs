use crate::domain::model::{Breadcrumb, Location};

pub const DEFAULT_URL_PREFIX: &str = "/locations";
pub const HOME_LABEL: &str = "Home";
pub const LOCATIONS_LABEL: &str = "Locations";

/// Turns a root-first path into the page URL and breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbComposer {
    prefix: String,
}

impl Default for BreadcrumbComposer {
    fn default() -> Self {
        Self::new(DEFAULT_URL_PREFIX)
    }
}

impl BreadcrumbComposer {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        Self {
            prefix: trimmed.to_string(),
        }
    }

    /// Listing index URL, `/locations` by default.
    pub fn index_url(&self) -> String {
        if self.prefix.is_empty() {
            "/".to_string()
        } else {
            self.prefix.clone()
        }
    }

    pub fn compose_url(&self, path: &[Location]) -> String {
        self.url_for(path.iter().map(|location| location.slug.as_str()))
    }

    /// `Home`, `Locations`, then one crumb per location with a cumulative
    /// URL. The final crumb is the current page and never carries a link.
    pub fn compose_breadcrumbs(&self, path: &[Location]) -> Vec<Breadcrumb> {
        let mut crumbs = Vec::with_capacity(path.len() + 2);
        crumbs.push(Breadcrumb::link(HOME_LABEL, "/".to_string()));
        crumbs.push(Breadcrumb::link(LOCATIONS_LABEL, self.index_url()));

        let mut slugs = Vec::with_capacity(path.len());
        for location in path {
            slugs.push(location.slug.as_str());
            crumbs.push(Breadcrumb::link(&location.name, self.url_for(slugs.iter().copied())));
        }

        if let Some(current) = crumbs.last_mut() {
            current.url = None;
        }
        crumbs
    }

    /// Splits a URL under the prefix into its slug segments.
    ///
    /// Query strings and fragments are ignored. Returns `None` for URLs
    /// outside the prefix.
    pub fn parse_location_url(&self, url: &str) -> Option<Vec<String>> {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let rest = if self.prefix.is_empty() {
            path
        } else {
            let rest = path.strip_prefix(self.prefix.as_str())?;
            if !rest.is_empty() && !rest.starts_with('/') {
                return None;
            }
            rest
        };

        Some(
            rest.split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    fn url_for<'s>(&self, slugs: impl Iterator<Item = &'s str>) -> String {
        let mut url = self.prefix.clone();
        for slug in slugs {
            url.push('/');
            url.push_str(slug);
        }
        if url.is_empty() {
            url.push('/');
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::england_locations;

    fn guildford_path() -> Vec<Location> {
        let all = england_locations();
        ["loc-england", "loc-south-east", "loc-surrey", "loc-guildford"]
            .iter()
            .map(|id| all.iter().find(|l| l.id == *id).cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_compose_url() {
        let composer = BreadcrumbComposer::default();
        assert_eq!(
            composer.compose_url(&guildford_path()),
            "/locations/england/south-east/surrey/guildford"
        );
        assert_eq!(composer.compose_url(&[]), "/locations");
    }

    #[test]
    fn test_compose_breadcrumbs() {
        let crumbs = BreadcrumbComposer::default().compose_breadcrumbs(&guildford_path());

        assert_eq!(crumbs.len(), 6);
        assert_eq!(crumbs[0], Breadcrumb::link("Home", "/".to_string()));
        assert_eq!(crumbs[1], Breadcrumb::link("Locations", "/locations".to_string()));
        assert_eq!(crumbs[2].url.as_deref(), Some("/locations/england"));
        assert_eq!(crumbs[4].url.as_deref(), Some("/locations/england/south-east/surrey"));
        assert_eq!(crumbs[5].label, "Guildford");
        assert!(crumbs[5].url.is_none());
        assert_eq!(crumbs.iter().filter(|c| !c.is_link()).count(), 1);
    }

    #[test]
    fn test_empty_path_leaves_locations_unlinked() {
        let crumbs = BreadcrumbComposer::default().compose_breadcrumbs(&[]);

        assert_eq!(crumbs.len(), 2);
        assert!(crumbs[0].is_link());
        assert!(!crumbs[1].is_link());
    }

    #[test]
    fn test_custom_prefix() {
        let composer = BreadcrumbComposer::new("/fostering/");
        let path = guildford_path();

        assert_eq!(composer.compose_url(&path[..1]), "/fostering/england");

        let root = BreadcrumbComposer::new("/");
        assert_eq!(root.compose_url(&path[..2]), "/england/south-east");
        assert_eq!(root.index_url(), "/");
    }

    #[test]
    fn test_parse_location_url() {
        let composer = BreadcrumbComposer::default();

        assert_eq!(
            composer.parse_location_url("/locations/england/south-east?page=2#agencies"),
            Some(vec!["england".to_string(), "south-east".to_string()])
        );
        assert_eq!(composer.parse_location_url("/locations"), Some(vec![]));
        assert_eq!(composer.parse_location_url("/locationsx/england"), None);
        assert_eq!(composer.parse_location_url("/agencies/hearth"), None);
    }

    #[test]
    fn test_url_segments_round_trip() {
        let composer = BreadcrumbComposer::default();
        let path = guildford_path();

        let segments = composer.parse_location_url(&composer.compose_url(&path)).unwrap();
        let slugs: Vec<String> = path.iter().map(|l| l.slug.clone()).collect();

        assert_eq!(segments, slugs);
    }
}
