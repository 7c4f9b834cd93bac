use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fancast_catalog::browse::{Browse, CatalogBuilder, MenuTarget, SeasonChoice, ShowFilter};
use fancast_catalog::site::{FilterKind, MediaType};
use fancast_catalog::{CatalogRefresher, Config, HttpFetcher, Identifier, MetadataStore, RefreshEngine};

#[derive(Parser)]
#[command(name = "fancast-catalog")]
#[command(version, about = "Fancast catalog crawler and metadata cache")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to fancast-catalog.toml or FANCAST_* variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Number of parallel metadata fetches
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one full refresh over the TV, movie and trailer listings
    Refresh,
    /// Refresh repeatedly until interrupted
    Watch {
        /// Seconds between passes (defaults to performance.refresh_interval_seconds)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Print a catalog menu
    Browse {
        #[command(subcommand)]
        menu: Option<BrowseCommand>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MediaArg {
    Tv,
    Movies,
    Trailers,
}

impl From<MediaArg> for MediaType {
    fn from(arg: MediaArg) -> Self {
        match arg {
            MediaArg::Tv => MediaType::Tv,
            MediaArg::Movies => MediaType::Movies,
            MediaArg::Trailers => MediaType::Trailers,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    Genre,
    Network,
}

impl From<FilterArg> for FilterKind {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Genre => FilterKind::Genre,
            FilterArg::Network => FilterKind::Network,
        }
    }
}

#[derive(Subcommand)]
enum BrowseCommand {
    /// Top level menu
    Main,
    /// Menu for one media type
    Media { media: MediaArg },
    /// Genre or network filters
    Filters { media: MediaArg, kind: FilterArg },
    /// Shows on a listing
    Shows {
        media: MediaArg,
        /// Only shows with new episodes
        #[arg(long, conflicts_with = "url")]
        new: bool,
        /// Filter listing URL from the filters menu
        #[arg(long, requires = "name")]
        url: Option<String>,
        /// Display name of the filter
        #[arg(long)]
        name: Option<String>,
    },
    /// Seasons or episodes of a TV show
    Show {
        /// Show identifier, e.g. /tv/South-Park/62926/
        id: String,
        #[arg(long, default_value = "")]
        name: String,
        /// Season id from the season list
        #[arg(long)]
        season: Option<String>,
    },
    /// A movie
    Movie {
        id: String,
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Front page top 5
    Top5 { media: MediaArg },
    /// Resolve the player redirect for a video page
    Play { url: String },
}

impl BrowseCommand {
    fn target(self) -> Option<MenuTarget> {
        let target = match self {
            BrowseCommand::Main => return None,
            BrowseCommand::Media { media } => MenuTarget::MediaMenu(media.into()),
            BrowseCommand::Filters { media, kind } => MenuTarget::FilterSelector {
                media: media.into(),
                kind: kind.into(),
            },
            BrowseCommand::Shows { media, new, url, name } => {
                let filter = match (new, url) {
                    (true, _) => ShowFilter::NewEpisodes,
                    (false, Some(url)) => ShowFilter::Listing {
                        name: name.unwrap_or_default(),
                        url,
                    },
                    (false, None) => ShowFilter::All,
                };
                MenuTarget::ShowList {
                    media: media.into(),
                    filter,
                }
            }
            BrowseCommand::Show { id, name, season } => MenuTarget::TvShow {
                id: Identifier::new(id),
                name,
                season: season.map(|id| SeasonChoice {
                    name: id.clone(),
                    id,
                }),
            },
            BrowseCommand::Movie { id, name } => MenuTarget::Movie {
                id: Identifier::new(id),
                name,
            },
            BrowseCommand::Top5 { media } => MenuTarget::Top5(media.into()),
            BrowseCommand::Play { url } => MenuTarget::Play { url },
        };
        Some(target)
    }
}

/// The config plus the load error when defaults had to be used
fn load_config(cli: &Cli) -> Result<(Config, Option<anyhow::Error>)> {
    let (mut config, fallback) = match &cli.config {
        Some(path) => (Config::load_from(&path.to_string_lossy())?, None),
        None => match Config::load() {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        },
    };

    if let Some(workers) = cli.workers {
        config.performance.max_workers = workers;
    }

    config.validate()?;
    Ok((config, fallback))
}

fn init_logging(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("fancast_catalog=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, fallback) = load_config(&cli)?;
    init_logging(&config, cli.verbose);

    if let Some(e) = fallback {
        warn!("Failed to load config, using defaults: {}", e);
    }

    if cli.verbose {
        info!("Verbose logging enabled");
        info!("{}", config.summary());
    }

    let fetcher = HttpFetcher::from_config(&config).await?;
    let store = MetadataStore::open(config.cache.store_path.clone()).await?;
    let engine = RefreshEngine::new(&config, Arc::new(fetcher), store)?;

    match cli.command {
        Commands::Refresh => {
            info!("🚀 Fancast catalog refresh starting...");
            let refresher = CatalogRefresher::new(&config, engine);
            let summary = refresher.full_refresh().await?;
            info!("✅ Stored: {}", summary.stored);
            info!("⏭️ Skipped: {}", summary.skipped);
            info!("❌ Failed: {}", summary.failed);
        }

        Commands::Watch { interval } => {
            let interval = Duration::from_secs(
                interval.unwrap_or(config.performance.refresh_interval_seconds),
            );
            if interval.is_zero() {
                return Err(anyhow!("refresh interval must be greater than 0"));
            }

            info!("👀 Refreshing the catalog every {}s", interval.as_secs());
            let refresher = CatalogRefresher::new(&config, engine);
            tokio::select! {
                _ = refresher.run_periodic(interval) => {}
                _ = tokio::signal::ctrl_c() => info!("🛑 Stopping"),
            }
        }

        Commands::Browse { menu } => {
            let builder = CatalogBuilder::new(&config, engine);
            let result = match menu.and_then(BrowseCommand::target) {
                Some(target) => builder.open(&target).await?,
                None => builder.main_menu(),
            };

            match result {
                Browse::Menu(menu) => print!("{}", menu),
                Browse::Unavailable { message } => println!("{}", message),
                Browse::Redirect(playback) => println!("{}", playback.redirect_url),
            }
        }
    }

    Ok(())
}
