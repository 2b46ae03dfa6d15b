// Adapters layer: concrete LocationStore implementations (http backend, snapshot, cache).

pub mod cached_store;
pub mod memory_store;
pub mod rest_store;

pub use cached_store::CachedLocationStore;
pub use memory_store::{InMemoryLocationStore, LocationSnapshot};
pub use rest_store::RestLocationStore;
