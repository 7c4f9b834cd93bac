use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the Fancast catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote site locations
    pub site: SiteConfig,

    /// Page cache and metadata store settings
    pub cache: CacheConfig,

    /// Content providers hidden from the catalog
    pub exclusions: ExclusionConfig,

    /// Performance and resource settings
    pub performance: PerformanceConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site root, prefixed to every identifier path
    pub base_url: String,

    /// Full-episodes widget listing every TV show
    pub tv_listing_url: String,

    /// Movies widget listing every movie
    pub movies_listing_url: String,

    /// Trailers page
    pub trailers_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Front page TTL, used for the top 5 (seconds)
    pub front_page_ttl: u64,

    /// Listing page TTL (seconds)
    pub show_list_ttl: u64,

    /// Show photos page TTL (seconds)
    pub show_metadata_ttl: u64,

    /// Per-show episode/movie listing TTL (seconds)
    pub show_assets_ttl: u64,

    /// Asset video page TTL (seconds)
    pub asset_metadata_ttl: u64,

    /// Chance that an already stored record is refetched on a pass
    pub refresh_probability: f64,

    /// Metadata store snapshot
    pub store_path: PathBuf,

    /// Directory holding cached page bodies
    pub page_cache_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionConfig {
    /// ABC shows use a player we cannot drive
    pub hide_abc: bool,

    /// The CW has the same player problem as ABC
    pub hide_cw: bool,

    /// Paid providers such as Starz
    pub hide_protected_providers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Maximum number of concurrent metadata fetches
    pub max_workers: usize,

    /// HTTP request timeout (seconds)
    pub request_timeout_seconds: u64,

    /// Delay between refresh passes in watch mode (seconds)
    pub refresh_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing-subscriber filter directive, overridden by RUST_LOG
    pub filter: String,
}

impl CacheConfig {
    pub fn front_page(&self) -> Duration {
        Duration::from_secs(self.front_page_ttl)
    }

    pub fn show_list(&self) -> Duration {
        Duration::from_secs(self.show_list_ttl)
    }

    pub fn show_metadata(&self) -> Duration {
        Duration::from_secs(self.show_metadata_ttl)
    }

    pub fn show_assets(&self) -> Duration {
        Duration::from_secs(self.show_assets_ttl)
    }

    pub fn asset_metadata(&self) -> Duration {
        Duration::from_secs(self.asset_metadata_ttl)
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "fancast-catalog.toml",
            "config/fancast-catalog.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config {}: {}", path, e))?;
        Ok(toml::from_str(&config_str)?)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("FANCAST_BASE_URL") {
            config.site.base_url = base_url;
        }

        if let Ok(workers) = std::env::var("FANCAST_WORKERS") {
            config.performance.max_workers = workers.parse().unwrap_or(8);
        }

        if let Ok(probability) = std::env::var("FANCAST_REFRESH_PROBABILITY") {
            config.cache.refresh_probability = probability.parse().unwrap_or(0.02);
        }

        if let Ok(store_path) = std::env::var("FANCAST_STORE_PATH") {
            config.cache.store_path = PathBuf::from(store_path);
        }

        if let Ok(cache_dir) = std::env::var("FANCAST_PAGE_CACHE_DIR") {
            config.cache.page_cache_dir = PathBuf::from(cache_dir);
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.performance.max_workers == 0 {
            return Err(anyhow!("max_workers must be greater than 0"));
        }

        if !(0.0..=1.0).contains(&self.cache.refresh_probability) {
            return Err(anyhow!(
                "refresh_probability must be within [0, 1], got {}",
                self.cache.refresh_probability
            ));
        }

        if self.site.base_url.trim().is_empty() {
            return Err(anyhow!("site.base_url must not be empty"));
        }

        url::Url::parse(&self.site.base_url)
            .map_err(|e| anyhow!("site.base_url is not a valid URL: {}", e))?;

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Fancast Catalog Configuration:\n\
            - Site: {}\n\
            - Workers: {}\n\
            - Refresh probability: {}\n\
            - Store: {}\n\
            - Page cache: {}",
            self.site.base_url,
            self.performance.max_workers,
            self.cache.refresh_probability,
            self.cache.store_path.display(),
            self.cache.page_cache_dir.display(),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig {
                base_url: "http://www.fancast.com".to_string(),
                tv_listing_url: "http://www.fancast.com/full_episodes_fragment.widget".to_string(),
                movies_listing_url: "http://www.fancast.com/movies_fragment.widget".to_string(),
                trailers_url: "http://www.fancast.com/trailers".to_string(),
            },
            cache: CacheConfig {
                front_page_ttl: 3600,
                show_list_ttl: 18000,
                show_metadata_ttl: 2_419_200, // 4 weeks
                show_assets_ttl: 18000,
                asset_metadata_ttl: 2_419_200, // 4 weeks
                refresh_probability: 0.02,
                store_path: PathBuf::from("./fancast_store.json"),
                page_cache_dir: PathBuf::from("./page_cache"),
            },
            exclusions: ExclusionConfig {
                hide_abc: true,
                hide_cw: true,
                hide_protected_providers: true,
            },
            performance: PerformanceConfig {
                max_workers: num_cpus::get().clamp(8, 16),
                request_timeout_seconds: 30,
                refresh_interval_seconds: 3600,
            },
            logging: LoggingConfig {
                filter: "fancast_catalog=info".to_string(),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let root = base_url.trim_end_matches('/');
        self.config.site.tv_listing_url = format!("{}/full_episodes_fragment.widget", root);
        self.config.site.movies_listing_url = format!("{}/movies_fragment.widget", root);
        self.config.site.trailers_url = format!("{}/trailers", root);
        self.config.site.base_url = root.to_string();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.performance.max_workers = workers;
        self
    }

    pub fn with_refresh_probability(mut self, probability: f64) -> Self {
        self.config.cache.refresh_probability = probability;
        self
    }

    pub fn with_store_path(mut self, path: PathBuf) -> Self {
        self.config.cache.store_path = path;
        self
    }

    pub fn with_page_cache_dir(mut self, dir: PathBuf) -> Self {
        self.config.cache.page_cache_dir = dir;
        self
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionConfig) -> Self {
        self.config.exclusions = exclusions;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
