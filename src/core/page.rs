use crate::core::aggregator::{aggregate_agency_count, rank_agencies};
use crate::core::breadcrumbs::BreadcrumbComposer;
use crate::core::deadline::with_deadline;
use crate::core::resolver::{PathResolver, DEFAULT_MAX_DEPTH, DEFAULT_REQUEST_TIMEOUT};
use crate::domain::model::{LocationView, PathResolution};
use crate::domain::ports::{ConfigProvider, LocationStore};
use crate::utils::error::{DirectoryError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_slug, Validate};
use std::time::Duration;

pub const DEFAULT_AGENCY_LIMIT: usize = 20;

/// What a page request names: a bare slug/id, or the URL's slug segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationRequest {
    Key(String),
    Segments(Vec<String>),
}

impl LocationRequest {
    /// `surrey` becomes a key lookup, `england/south-east` a segment walk.
    pub fn parse(input: &str) -> Self {
        let segments: Vec<String> = input
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        if segments.len() == 1 {
            LocationRequest::Key(segments.into_iter().next().unwrap_or_default())
        } else {
            LocationRequest::Segments(segments)
        }
    }

    pub fn from_url(composer: &BreadcrumbComposer, url: &str) -> Option<Self> {
        composer.parse_location_url(url).map(LocationRequest::Segments)
    }
}

impl Validate for LocationRequest {
    /// Keys may be ids, so only path segments are held to the slug format.
    fn validate(&self) -> Result<()> {
        match self {
            LocationRequest::Key(key) => validate_non_empty_string("location", key),
            LocationRequest::Segments(segments) if segments.is_empty() => {
                Err(DirectoryError::ValidationError {
                    message: "Location path is empty".to_string(),
                })
            }
            LocationRequest::Segments(segments) => segments
                .iter()
                .try_for_each(|segment| validate_slug("location", segment)),
        }
    }
}

/// Builds the view for one location page from a [`LocationStore`].
pub struct LocationPageService<S: LocationStore> {
    store: S,
    composer: BreadcrumbComposer,
    max_depth: usize,
    timeout: Duration,
    agency_limit: usize,
}

impl<S: LocationStore> LocationPageService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            composer: BreadcrumbComposer::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            agency_limit: DEFAULT_AGENCY_LIMIT,
        }
    }

    pub fn from_config<C: ConfigProvider>(store: S, config: &C) -> Self {
        Self {
            store,
            composer: BreadcrumbComposer::new(config.url_prefix()),
            max_depth: config.max_depth(),
            timeout: config.request_timeout(),
            agency_limit: config.agency_limit(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_agency_limit(mut self, limit: usize) -> Self {
        self.agency_limit = limit;
        self
    }

    pub fn resolver(&self) -> PathResolver<'_, S> {
        PathResolver::new(&self.store)
            .with_max_depth(self.max_depth)
            .with_timeout(self.timeout)
    }

    /// Resolves the request and gathers everything the page renders.
    ///
    /// Never fails: an unresolvable request yields an empty view, and child
    /// or agency fetch failures yield empty lists. With no children to sum,
    /// `aggregate_count` is the leaf's own stored count, so a failed child
    /// fetch reports that count rather than zero.
    pub async fn load(&self, request: &LocationRequest) -> LocationView {
        let resolver = self.resolver();
        let resolution = match request {
            LocationRequest::Key(key) => resolver.resolve(key).await,
            LocationRequest::Segments(segments) => {
                resolver.resolve_segments(segments.as_slice()).await
            }
        };

        let Some(leaf) = resolution.leaf().cloned() else {
            return self.empty_view();
        };

        let (children, agencies) = tokio::join!(
            with_deadline(
                "get_child_locations",
                self.timeout,
                self.store.get_child_locations(&leaf.id),
            ),
            with_deadline(
                "get_agencies_by_location",
                self.timeout,
                self.store.get_agencies_by_location(&leaf.id, self.agency_limit),
            ),
        );

        let children = children.unwrap_or_else(|e| {
            tracing::warn!("Children of '{}' unavailable: {}", leaf.id, e);
            Vec::new()
        });
        let agencies = agencies.unwrap_or_else(|e| {
            tracing::warn!("Agencies for '{}' unavailable: {}", leaf.id, e);
            Vec::new()
        });

        let path = resolution.path().to_vec();
        let canonical = match request {
            LocationRequest::Key(_) => true,
            LocationRequest::Segments(segments) => {
                resolution.is_complete()
                    && segments.len() == path.len()
                    && segments.iter().zip(&path).all(|(s, l)| *s == l.slug)
            }
        };

        LocationView {
            breadcrumbs: self.composer.compose_breadcrumbs(&path),
            url: self.composer.compose_url(&path),
            aggregate_count: aggregate_agency_count(&leaf, &children),
            children,
            agencies: rank_agencies(agencies),
            path,
            resolution,
            canonical,
        }
    }

    fn empty_view(&self) -> LocationView {
        LocationView {
            path: Vec::new(),
            breadcrumbs: Vec::new(),
            url: self.composer.index_url(),
            aggregate_count: 0,
            children: Vec::new(),
            agencies: Vec::new(),
            resolution: PathResolution::NotFound,
            canonical: false,
        }
    }
}
