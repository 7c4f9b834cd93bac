use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use fancast_catalog::fetch::PageCache;
use fancast_catalog::{Config, MetadataStore, Record};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "store-manager")]
#[command(about = "Metadata store and page cache management utility")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Metadata store snapshot (defaults to cache.store_path)
    #[arg(long)]
    store_path: Option<PathBuf>,

    /// Page cache directory (defaults to cache.page_cache_dir)
    #[arg(long)]
    page_cache_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all stored record keys
    List {
        /// Only keys with this prefix, e.g. "show-" or "asset-"
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Get store and page cache statistics
    Stats,
    /// Print one stored record as JSON
    Show {
        /// Record key, e.g. "show-/tv/South-Park/62926/"
        key: String,
    },
    /// Delete cached pages older than the given age
    PurgePages {
        /// Maximum age in hours
        #[arg(long, default_value_t = 24 * 28)]
        max_age_hours: u64,
    },
}

/// Purge age for `--max-age-hours`, capped instead of overflowing
fn purge_age(max_age_hours: u64) -> Duration {
    Duration::from_secs(max_age_hours.saturating_mul(3600))
}

fn describe(record: &Record) -> String {
    match record {
        Record::Show(show) => {
            let network = if show.network.is_empty() { "-" } else { show.network.as_str() };
            format!("{} [{}]", show.title, network)
        }
        Record::Asset(asset) => format!(
            "{} : {} ({} | {})",
            asset.show_title, asset.episode_title, asset.season, asset.episode_number
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    let store_path = cli.store_path.unwrap_or_else(|| config.cache.store_path.clone());
    let page_cache = PageCache::new(
        cli.page_cache_dir
            .unwrap_or_else(|| config.cache.page_cache_dir.clone()),
    );

    match cli.command {
        Commands::List { prefix } => {
            let store = MetadataStore::open_read_only(&store_path).await?;
            let keys: Vec<String> = store
                .keys()
                .into_iter()
                .filter(|key| prefix.as_deref().map_or(true, |p| key.starts_with(p)))
                .collect();

            if keys.is_empty() {
                info!("📭 No stored records found");
                return Ok(());
            }

            info!("📚 Found {} records:", keys.len());
            for key in keys {
                if let Some(record) = store.get(&key) {
                    info!("  {} - {}", key, describe(&record));
                }
            }
        }

        Commands::Stats => {
            let store = MetadataStore::open_read_only(&store_path).await?;
            let stats = store.stats();
            info!("📊 Store Statistics:");
            info!("  Shows: {}", stats.shows);
            info!("  Assets: {}", stats.assets);
            info!("  Initialized: {}", stats.initialized);

            let pages = page_cache.stats(config.cache.show_list());
            info!("📊 Page Cache Statistics (fresh = younger than {}s):", config.cache.show_list_ttl);
            info!("  Total files: {}", pages.total_files);
            info!("  Fresh files: {}", pages.fresh_files);
            info!("  Expired files: {}", pages.expired_files);
            info!("  Unreadable files: {}", pages.unreadable_files);
            info!("  Total size: {} KB", pages.total_bytes / 1024);
        }

        Commands::Show { key } => {
            let store = MetadataStore::open_read_only(&store_path).await?;
            let record = store
                .get(&key)
                .ok_or_else(|| anyhow!("No record stored under {}", key))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::PurgePages { max_age_hours } => {
            let count = page_cache.purge_expired(purge_age(max_age_hours))?;
            info!("🗑️ Removed {} expired cached pages", count);
        }
    }

    Ok(())
}
