/// Fancast catalog - metadata caching and refresh engine
///
/// Crawls the Fancast listing pages, keeps a persistent store of show and
/// asset metadata fresh through probabilistic refetching, and builds
/// browsable menus from whatever the store currently holds.

pub mod browse;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod refresh;
pub mod site;
pub mod store;

// Re-export main types for easy access
pub use crate::browse::{Browse, CatalogBuilder, Menu, MenuEntry, MenuTarget};
pub use crate::catalog::{AssetRecord, Identifier, Record, RecordKind, ShowRecord};
pub use crate::config::Config;
pub use crate::error::{CatalogError, Result};
pub use crate::fetch::{Document, Fetcher, HttpFetcher, PageCache};
pub use crate::refresh::{CatalogRefresher, RandomSource, RefreshEngine, RefreshSummary};
pub use crate::site::{MediaType, Site};
pub use crate::store::MetadataStore;
