pub mod aggregator;
pub mod breadcrumbs;
pub mod deadline;
pub mod export;
pub mod page;
pub mod resolver;
pub mod tree;

#[cfg(test)]
pub(crate) mod fixtures;

pub use crate::domain::model::{
    Agency, AgencyLocation, Breadcrumb, Location, LocationType, LocationView, PathResolution,
    TruncationReason,
};
pub use crate::domain::ports::{ConfigProvider, LocationStore};
pub use crate::utils::error::Result;
