#![allow(dead_code)]

use async_trait::async_trait;
use fancast_catalog::config::{Config, ConfigBuilder, ExclusionConfig};
use fancast_catalog::error::{CatalogError, Result};
use fancast_catalog::fetch::Fetcher;
use fancast_catalog::refresh::FixedRandom;
use fancast_catalog::{MetadataStore, RefreshEngine};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const BASE: &str = "http://fancast.test";

/// Holds one URL's fetch until released
pub struct Stall {
    pub entered: Notify,
    pub release: Notify,
}

/// In-memory site: canned bodies, per-URL call counts and optional stalls
#[derive(Default)]
pub struct MockFetcher {
    pages: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
    stalls: Mutex<HashMap<String, Arc<Stall>>>,
    panics: Mutex<HashSet<String>>,
    delay: Option<Duration>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch sleeps for `delay` before answering
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn page(&self, url: impl Into<String>, body: impl Into<String>) {
        self.pages.lock().unwrap().insert(url.into(), body.into());
    }

    pub fn remove(&self, url: &str) {
        self.pages.lock().unwrap().remove(url);
    }

    pub fn stall(&self, url: impl Into<String>) -> Arc<Stall> {
        let stall = Arc::new(Stall {
            entered: Notify::new(),
            release: Notify::new(),
        });
        self.stalls.lock().unwrap().insert(url.into(), Arc::clone(&stall));
        stall
    }

    /// Fetching `url` panics instead of answering
    pub fn panic_on(&self, url: impl Into<String>) {
        self.panics.lock().unwrap().insert(url.into());
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Most fetches seen running at the same time
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch_raw(&self, url: &str, _cache_ttl: Duration) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());

        let panics = self.panics.lock().unwrap().contains(url);
        if panics {
            panic!("fetcher blew up on {}", url);
        }

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(active, Ordering::SeqCst);

        let stall = self.stalls.lock().unwrap().get(url).cloned();
        if let Some(stall) = stall {
            stall.entered.notify_one();
            stall.release.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.active.fetch_sub(1, Ordering::SeqCst);

        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| CatalogError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

pub fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

pub fn tv_listing_url() -> String {
    url("/full_episodes_fragment.widget")
}

pub fn movies_listing_url() -> String {
    url("/movies_fragment.widget")
}

pub fn trailers_url() -> String {
    url("/trailers")
}

pub fn test_config(probability: f64) -> Config {
    ConfigBuilder::new()
        .with_base_url(BASE)
        .with_workers(4)
        .with_refresh_probability(probability)
        .build()
}

pub fn config_showing_everything() -> Config {
    ConfigBuilder::new()
        .with_base_url(BASE)
        .with_workers(4)
        .with_exclusions(ExclusionConfig {
            hide_abc: false,
            hide_cw: false,
            hide_protected_providers: false,
        })
        .build()
}

/// Engine over an in-memory store; the fixed draw of 0.5 makes p=0 and p=1 decisive
pub fn engine(config: &Config, fetcher: &Arc<MockFetcher>) -> RefreshEngine {
    let fetcher: Arc<dyn Fetcher> = fetcher.clone();
    RefreshEngine::new(config, fetcher, MetadataStore::in_memory())
        .unwrap()
        .with_random(Arc::new(FixedRandom(0.5)))
}

pub fn show_page(title: &str, network: Option<&str>) -> String {
    let swoosh = network
        .map(|n| format!(r#"<div id="swoosh"><a href="/tv-networks/{}/1/">{}</a></div>"#, n, n))
        .unwrap_or_default();
    format!(
        r#"<html><body>
          <div id="pageHeadline"><h1><span class="title">{title}</span></h1></div>
          <div id="listHolder"><ul id="viewTable">
            <li><a href="/photo/1"><img src="http://img.test/{title}_121_87.jpg"></a></li>
          </ul></div>
          {swoosh}
        </body></html>"#,
        title = title,
        swoosh = swoosh
    )
}

pub fn asset_page(show: &str, episode: &str, season: &str, number: &str) -> String {
    format!(
        r#"<html><head><script>
        video.playerData = "<entity><imageUrl>http:\/\/img.test\/asset.jpg</imageUrl><metadata><entityName>{}</entityName><videoTitle>{}</videoTitle><description>Something happens.</description><duration>22:00</duration><airDate>01/02/2009</airDate><season>{}</season><episode>{}</episode></metadata></entity>";
        </script></head><body></body></html>"#,
        show, episode, season, number
    )
}

/// A listing widget linking to each show path in order
pub fn listing(paths: &[&str]) -> String {
    let items: String = paths
        .iter()
        .map(|p| format!(r#"<li><a href="{}full-episodes">show</a></li>"#, p))
        .collect();
    format!(
        r#"<html><body><div class="fullEpisodeList"><div><ul>{}</ul></div></div></body></html>"#,
        items
    )
}

pub fn trailer_listing(paths: &[&str]) -> String {
    let items: String = paths
        .iter()
        .map(|p| format!(r#"<li><a href="{}trailers">trailer</a></li>"#, p))
        .collect();
    format!(
        r#"<html><body><div id="episodeList"><ul class="fullEpisodeList"><li class="head">Trailers</li>{}</ul></div></body></html>"#,
        items
    )
}
