/// Metadata refresh engine
///
/// Decides which identifiers need their metadata fetched, fetches them on a
/// bounded pool of tokio tasks and writes the parsed records to the store.
/// A failure for one identifier never affects its siblings.

pub mod orchestrator;
pub mod random;

pub use orchestrator::CatalogRefresher;
pub use random::{FixedRandom, RandomSource, RefreshPolicy, SeededRandom, ThreadRandom};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::catalog::{Identifier, Record, RecordKind};
use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::fetch::Fetcher;
use crate::site::pages::{parse_asset_page, parse_show_page};
use crate::site::Site;
use crate::store::MetadataStore;

/// Counts from one refresh batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSummary {
    /// Identifiers passed in, duplicates included
    pub requested: usize,
    /// Already stored and not picked for refresh
    pub skipped: usize,
    /// Already being fetched by another task
    pub coalesced: usize,
    pub dispatched: usize,
    pub stored: usize,
    pub failed: usize,
}

impl RefreshSummary {
    pub fn merge(&mut self, other: &RefreshSummary) {
        self.requested += other.requested;
        self.skipped += other.skipped;
        self.coalesced += other.coalesced;
        self.dispatched += other.dispatched;
        self.stored += other.stored;
        self.failed += other.failed;
    }
}

/// Store keys with a fetch task currently running
#[derive(Debug, Default)]
struct InFlight {
    keys: Mutex<HashSet<String>>,
}

/// Releases an in-flight key when the owning task ends
struct InFlightGuard {
    in_flight: Arc<InFlight>,
    key: String,
}

impl InFlightGuard {
    fn claim(in_flight: &Arc<InFlight>, key: &str) -> Option<Self> {
        let mut keys = in_flight
            .keys
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !keys.insert(key.to_string()) {
            return None;
        }
        Some(Self {
            in_flight: Arc::clone(in_flight),
            key: key.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .keys
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.key);
    }
}

/// Probabilistic metadata refresher
#[derive(Clone)]
pub struct RefreshEngine {
    fetcher: Arc<dyn Fetcher>,
    store: MetadataStore,
    site: Arc<Site>,
    policy: RefreshPolicy,
    random: Arc<dyn RandomSource>,
    worker_semaphore: Arc<Semaphore>,
    in_flight: Arc<InFlight>,
    show_ttl: Duration,
    asset_ttl: Duration,
}

impl RefreshEngine {
    pub fn new(config: &Config, fetcher: Arc<dyn Fetcher>, store: MetadataStore) -> Result<Self> {
        let max_workers = config.performance.max_workers;
        if max_workers == 0 {
            return Err(CatalogError::Config("max_workers must be greater than 0".to_string()));
        }

        info!(
            "🔧 Initializing RefreshEngine with {} workers, refresh probability {}",
            max_workers, config.cache.refresh_probability
        );

        Ok(Self {
            fetcher,
            store,
            site: Arc::new(Site::new(&config.site)?),
            policy: RefreshPolicy::new(config.cache.refresh_probability),
            random: Arc::new(ThreadRandom),
            worker_semaphore: Arc::new(Semaphore::new(max_workers)),
            in_flight: Arc::new(InFlight::default()),
            show_ttl: config.cache.show_metadata(),
            asset_ttl: config.cache.asset_metadata(),
        })
    }

    /// Replace the random source, e.g. with a fixed value in tests
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Fetch metadata for every identifier that is absent from the store or
    /// drawn for refresh, then wait for all fetches to finish.
    pub async fn refresh_metadata(&self, ids: &[Identifier], kind: RecordKind) -> RefreshSummary {
        let mut summary = RefreshSummary {
            requested: ids.len(),
            ..RefreshSummary::default()
        };

        if ids.is_empty() {
            return summary;
        }

        let mut tasks = Vec::new();

        for id in ids {
            let key = kind.key(id);

            if !self.policy.should_fetch(self.store.has(&key), self.random.as_ref()) {
                summary.skipped += 1;
                continue;
            }

            let Some(guard) = InFlightGuard::claim(&self.in_flight, &key) else {
                debug!("{} is already being fetched", key);
                summary.coalesced += 1;
                continue;
            };

            let task = FetchTask {
                id: id.clone(),
                key: key.clone(),
                kind,
                fetcher: Arc::clone(&self.fetcher),
                store: self.store.clone(),
                site: Arc::clone(&self.site),
                ttl: match kind {
                    RecordKind::Show => self.show_ttl,
                    RecordKind::Asset => self.asset_ttl,
                },
            };
            let semaphore = Arc::clone(&self.worker_semaphore);
            summary.dispatched += 1;

            let handle = tokio::spawn(async move {
                let _guard = guard;
                match semaphore.acquire().await {
                    Ok(_permit) => task.run().await,
                    Err(_) => Err(CatalogError::Config("worker pool closed".to_string())),
                }
            });
            tasks.push((key, handle));
        }

        for (key, handle) in tasks {
            match handle.await {
                Ok(Ok(())) => summary.stored += 1,
                Ok(Err(e)) if e.is_transient() => {
                    warn!("Metadata fetch failed for {}: {}", key, e);
                    summary.failed += 1;
                }
                Ok(Err(e)) => {
                    debug!("Metadata parse failed for {}: {}", key, e);
                    summary.failed += 1;
                }
                Err(e) => {
                    error!("Metadata task for {} did not finish: {}", key, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "📚 {} refresh: {} requested, {} skipped, {} stored, {} failed",
            kind, summary.requested, summary.skipped, summary.stored, summary.failed
        );

        summary
    }
}

/// One identifier's fetch, parse and store
struct FetchTask {
    id: Identifier,
    key: String,
    kind: RecordKind,
    fetcher: Arc<dyn Fetcher>,
    store: MetadataStore,
    site: Arc<Site>,
    ttl: Duration,
}

impl FetchTask {
    async fn run(self) -> Result<()> {
        let url = match self.kind {
            RecordKind::Show => self.site.show_photos_url(&self.id),
            RecordKind::Asset => self.site.asset_page_url(&self.id),
        };

        debug!("Fetching metadata for {} {}", self.kind, self.id);
        let body = self.fetcher.fetch_raw(&url, self.ttl).await?;

        let record: Record = match self.kind {
            RecordKind::Show => parse_show_page(&body, &url)?.into(),
            RecordKind::Asset => parse_asset_page(&body, &url)?.into(),
        };

        self.store.set(self.key, record).await
    }
}
