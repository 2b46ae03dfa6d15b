pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, OutputFormat};
pub use config::TomlConfig;

pub use adapters::{CachedLocationStore, InMemoryLocationStore, LocationSnapshot, RestLocationStore};
pub use core::{
    aggregator::{aggregate_agency_count, rank_agencies},
    breadcrumbs::BreadcrumbComposer,
    page::{LocationPageService, LocationRequest},
    resolver::PathResolver,
    tree::LocationTree,
};
pub use domain::model::{
    Agency, AgencyLocation, Breadcrumb, Location, LocationType, LocationView, PathResolution,
    TruncationReason,
};
pub use domain::ports::{ConfigProvider, LocationStore};
pub use utils::error::{DirectoryError, Result};
