/// On-disk TTL cache of fetched page bodies
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::Result;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Cached body of one URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedPage {
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub body: String,
}

impl CachedPage {
    fn age(&self) -> Duration {
        (Utc::now() - self.fetched_at).to_std().unwrap_or_default()
    }
}

/// Manages page cache files, one JSON file per URL
#[derive(Debug, Clone)]
pub struct PageCache {
    cache_dir: PathBuf,
}

impl PageCache {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Initialize cache directory
    pub async fn initialize(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.cache_dir).await?;
        debug!("📁 Page cache directory initialized: {}", self.cache_dir.display());
        Ok(())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, url: &str) -> PathBuf {
        let digest = md5::compute(url.as_bytes());
        self.cache_dir.join(format!("{:x}.json", digest))
    }

    /// Cached body for `url` if it is younger than `ttl`
    pub async fn load(&self, url: &str, ttl: Duration) -> Option<String> {
        let cache_path = self.cache_path(url);

        let content = match tokio::fs::read_to_string(&cache_path).await {
            Ok(content) => content,
            Err(_) => {
                debug!("Page cache miss: {}", url);
                return None;
            }
        };

        match serde_json::from_str::<CachedPage>(&content) {
            Ok(page) if page.url == url && page.age() < ttl => {
                debug!("Page cache hit: {}", url);
                Some(page.body)
            }
            Ok(_) => {
                debug!("Page cache stale: {}", url);
                None
            }
            Err(e) => {
                warn!("Failed to parse page cache file {}: {}", cache_path.display(), e);
                None
            }
        }
    }

    /// Replace the cached body for `url`
    pub async fn store(&self, url: &str, body: &str) -> Result<()> {
        let page = CachedPage {
            url: url.to_string(),
            fetched_at: Utc::now(),
            body: body.to_string(),
        };

        let cache_path = self.cache_path(url);
        let temp_path = cache_path.with_extension(format!(
            "tmp{}-{}",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        tokio::fs::write(&temp_path, serde_json::to_vec(&page)?).await?;
        if let Err(e) = tokio::fs::rename(&temp_path, &cache_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!("💾 Cached {} bytes for {}", body.len(), url);
        Ok(())
    }

    fn cache_files(&self) -> impl Iterator<Item = PathBuf> {
        WalkDir::new(&self.cache_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
    }

    fn read_page(path: &Path) -> Option<CachedPage> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Summarise the cache, counting entries older than `max_age` as expired
    pub fn stats(&self, max_age: Duration) -> PageCacheStats {
        let mut stats = PageCacheStats::default();

        for path in self.cache_files() {
            stats.total_files += 1;
            stats.total_bytes += std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

            match Self::read_page(&path) {
                Some(page) if page.age() < max_age => stats.fresh_files += 1,
                Some(_) => stats.expired_files += 1,
                None => stats.unreadable_files += 1,
            }
        }

        stats
    }

    /// Delete entries older than `max_age` along with unreadable files
    pub fn purge_expired(&self, max_age: Duration) -> Result<usize> {
        let mut removed = 0;

        for path in self.cache_files() {
            let expired = match Self::read_page(&path) {
                Some(page) => page.age() >= max_age,
                None => true,
            };

            if expired {
                std::fs::remove_file(&path)?;
                debug!("🗑️ Removed cached page: {}", path.display());
                removed += 1;
            }
        }

        if removed > 0 {
            info!("🧹 Purged {} cached pages", removed);
        }

        Ok(removed)
    }
}

/// Page cache statistics
#[derive(Debug, Default)]
pub struct PageCacheStats {
    pub total_files: usize,
    pub fresh_files: usize,
    pub expired_files: usize,
    pub unreadable_files: usize,
    pub total_bytes: u64,
}
