/// reqwest-backed fetcher with the on-disk page cache in front
use super::{Fetcher, PageCache};
use crate::config::Config;
use crate::error::{CatalogError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    cache: PageCache,
}

impl HttpFetcher {
    pub fn new(cache: PageCache, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, cache })
    }

    /// Build a fetcher and create its cache directory
    pub async fn from_config(config: &Config) -> Result<Self> {
        let cache = PageCache::new(config.cache.page_cache_dir.clone());
        cache.initialize().await?;
        Self::new(cache, config.performance.request_timeout_seconds)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_raw(&self, url: &str, cache_ttl: Duration) -> Result<String> {
        if let Some(body) = self.cache.load(url, cache_ttl).await {
            return Ok(body);
        }

        debug!("🌐 Fetching {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        debug!("📄 Downloaded {} characters from {}", body.len(), url);

        if let Err(e) = self.cache.store(url, &body).await {
            warn!("Failed to cache page {}: {}", url, e);
        }

        Ok(body)
    }
}
