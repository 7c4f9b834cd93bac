/// Cached page retrieval
///
/// Everything that talks to the remote site goes through [`Fetcher`]. The
/// HTTP implementation keeps an on-disk page cache so repeated requests for
/// the same URL inside its TTL never reach the network.

pub mod document;
pub mod http;
pub mod page_cache;

pub use document::{Document, Node};
pub use http::HttpFetcher;
pub use page_cache::{PageCache, PageCacheStats};

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Source of page bodies
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Body of `url`, served from cache when the cached copy is younger than `cache_ttl`
    async fn fetch_raw(&self, url: &str, cache_ttl: Duration) -> Result<String>;

    /// Fetch and parse `url` as markup.
    ///
    /// The returned document is not `Send`; parse and drop it before the next await.
    async fn fetch_page(&self, url: &str, cache_ttl: Duration) -> Result<Document> {
        let body = self.fetch_raw(url, cache_ttl).await?;
        Ok(Document::parse(&body))
    }
}
