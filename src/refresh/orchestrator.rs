/// Full catalog refresh across all listing sources
use std::time::{Duration, Instant};
use tracing::{error, info};

use super::{RefreshEngine, RefreshSummary};
use crate::catalog::RecordKind;
use crate::config::Config;
use crate::error::Result;
use crate::fetch::Document;
use crate::site::IdentifierExtractor;

/// Walks the TV, movie and trailer listings and refreshes every show found
#[derive(Clone)]
pub struct CatalogRefresher {
    engine: RefreshEngine,
    extractor: IdentifierExtractor,
    listing_ttl: Duration,
}

impl CatalogRefresher {
    pub fn new(config: &Config, engine: RefreshEngine) -> Self {
        let extractor = IdentifierExtractor::new(engine.site().base().clone(), &config.exclusions);
        Self {
            engine,
            extractor,
            listing_ttl: config.cache.show_list(),
        }
    }

    pub fn engine(&self) -> &RefreshEngine {
        &self.engine
    }

    /// One pass over all listing sources, in order. The store is marked
    /// initialized only after every source has been processed; a listing
    /// that cannot be fetched aborts the pass.
    pub async fn full_refresh(&self) -> Result<RefreshSummary> {
        let start = Instant::now();
        let mut total = RefreshSummary::default();

        for source in self.engine.site().refresh_sources() {
            info!("📺 Refreshing listing {}", source.url);

            let body = self
                .engine
                .fetcher()
                .fetch_raw(&source.url, self.listing_ttl)
                .await?;

            let ids = {
                let page = Document::parse(&body);
                self.extractor.show_ids(&page, source.layout)
            };
            info!("Found {} shows on {}", ids.len(), source.url);

            let summary = self.engine.refresh_metadata(&ids, RecordKind::Show).await;
            total.merge(&summary);
        }

        self.engine.store().mark_initialized().await?;

        info!(
            "✅ Full refresh complete in {:.1}s: {} shows requested, {} stored, {} failed",
            start.elapsed().as_secs_f64(),
            total.requested,
            total.stored,
            total.failed
        );

        Ok(total)
    }

    /// Run full refreshes forever, one per interval. A failed pass is logged
    /// and retried on the next tick.
    pub async fn run_periodic(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.full_refresh().await {
                error!("❌ Catalog refresh failed: {}", e);
            }
        }
    }
}
