/// Read-side menu construction
///
/// Every entry point first checks that the store has been initialized and
/// answers [`Browse::Unavailable`] otherwise. Identifiers without a stored
/// record are left out of the menus until a later refresh picks them up.
use std::time::Duration;
use tracing::debug;

use super::menu::{Browse, Menu, MenuEntry, MenuTarget, SeasonChoice, ShowFilter};
use super::playback::{resolve_playback, DEFAULT_PREFIX};
use crate::catalog::{Identifier, RecordKind, ShowRecord};
use crate::config::{CacheConfig, Config, ExclusionConfig};
use crate::error::Result;
use crate::fetch::Document;
use crate::refresh::RefreshEngine;
use crate::site::pages::{parse_movie_pages, parse_tv_show_page, TvShowPage};
use crate::site::{FilterKind, IdentifierExtractor, ListingLayout, MediaType};

const ABC_NETWORK: &str = "ABC-Entertainment";
const CW_NETWORK: &str = "CW-Television-Network";

fn filter_label(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Genre => "By Genre",
        FilterKind::Network => "By Network",
    }
}

pub struct CatalogBuilder {
    engine: RefreshEngine,
    extractor: IdentifierExtractor,
    exclusions: ExclusionConfig,
    cache: CacheConfig,
    prefix: String,
}

impl CatalogBuilder {
    pub fn new(config: &Config, engine: RefreshEngine) -> Self {
        let extractor = IdentifierExtractor::new(engine.site().base().clone(), &config.exclusions);
        Self {
            engine,
            extractor,
            exclusions: config.exclusions.clone(),
            cache: config.cache.clone(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn ready(&self) -> bool {
        self.engine.store().is_initialized()
    }

    async fn fetch(&self, url: &str, ttl: Duration) -> Result<String> {
        self.engine.fetcher().fetch_raw(url, ttl).await
    }

    /// Open whatever a menu entry points at
    pub async fn open(&self, target: &MenuTarget) -> Result<Browse> {
        match target {
            MenuTarget::MediaMenu(media) => Ok(self.media_menu(*media)),
            MenuTarget::FilterSelector { media, kind } => self.filter_selector(*media, *kind).await,
            MenuTarget::ShowList { media, filter } => self.show_list(*media, filter).await,
            MenuTarget::Top5(media) => self.top5(*media).await,
            MenuTarget::TvShow { id, name, season } => self.tv_show(id, name, season.as_ref()).await,
            MenuTarget::Movie { id, name } => self.movie(id, name).await,
            MenuTarget::Play { url } => self.play(url).await,
        }
    }

    pub fn main_menu(&self) -> Browse {
        if !self.ready() {
            return Browse::unavailable();
        }

        let mut menu = Menu::new("Fancast");
        for media in [MediaType::Tv, MediaType::Movies] {
            menu.push(MenuEntry::new(media.label(), MenuTarget::MediaMenu(media)));
        }
        Browse::Menu(menu)
    }

    /// All, Top 5 and genre filters; TV also gets networks and new episodes
    pub fn media_menu(&self, media: MediaType) -> Browse {
        if !self.ready() {
            return Browse::unavailable();
        }

        let mut menu = Menu::new(media.label());
        menu.push(MenuEntry::new(
            "All",
            MenuTarget::ShowList {
                media,
                filter: ShowFilter::All,
            },
        ));
        menu.push(MenuEntry::new("Top 5", MenuTarget::Top5(media)));
        menu.push(MenuEntry::new(
            filter_label(FilterKind::Genre),
            MenuTarget::FilterSelector {
                media,
                kind: FilterKind::Genre,
            },
        ));

        if media == MediaType::Tv {
            menu.push(MenuEntry::new(
                filter_label(FilterKind::Network),
                MenuTarget::FilterSelector {
                    media,
                    kind: FilterKind::Network,
                },
            ));
            menu.push(MenuEntry::new(
                "New Episodes",
                MenuTarget::ShowList {
                    media,
                    filter: ShowFilter::NewEpisodes,
                },
            ));
        }

        Browse::Menu(menu)
    }

    pub async fn filter_selector(&self, media: MediaType, kind: FilterKind) -> Result<Browse> {
        if !self.ready() {
            return Ok(Browse::unavailable());
        }

        let url = self.engine.site().listing_url(media).to_string();
        let body = self.fetch(&url, self.cache.show_list()).await?;
        let options = self.extractor.filters(&Document::parse(&body), kind);

        let mut menu = Menu::new(filter_label(kind)).with_title1(media.label());
        for option in options {
            if self.hides_filter(&option.name) {
                debug!("Hiding filter {}", option.name);
                continue;
            }
            menu.push(
                MenuEntry::new(
                    option.name.clone(),
                    MenuTarget::ShowList {
                        media,
                        filter: ShowFilter::Listing {
                            name: option.name,
                            url: option.url,
                        },
                    },
                )
                .summary(filter_label(kind)),
            );
        }

        Ok(Browse::Menu(menu))
    }

    fn hides_filter(&self, name: &str) -> bool {
        (self.exclusions.hide_abc && name == "ABC") || (self.exclusions.hide_cw && name == "CW")
    }

    /// True when the show's network is one the player cannot handle
    pub fn hides_show(&self, show: &ShowRecord) -> bool {
        (self.exclusions.hide_abc && show.network.contains(ABC_NETWORK))
            || (self.exclusions.hide_cw && show.network.contains(CW_NETWORK))
    }

    /// Shows on a listing, rendered from their stored records
    pub async fn show_list(&self, media: MediaType, filter: &ShowFilter) -> Result<Browse> {
        if !self.ready() {
            return Ok(Browse::unavailable());
        }

        let site = self.engine.site();
        let (url, layout, title) = match filter {
            ShowFilter::All => {
                let source = site.listing(media);
                (source.url, source.layout, "All".to_string())
            }
            ShowFilter::NewEpisodes => (
                site.listing_url(media).to_string(),
                ListingLayout::NewEpisodes,
                "New Episodes".to_string(),
            ),
            ShowFilter::Listing { name, url } => (url.clone(), ListingLayout::Standard, name.clone()),
        };

        debug!("Fetching show listing {}", url);
        let body = self.fetch(&url, self.cache.show_list()).await?;
        let ids = self.extractor.show_ids(&Document::parse(&body), layout);
        debug!("Found {} shows", ids.len());

        let mut menu = Menu::new(title).with_title1(media.label());
        for id in ids {
            let Some(show) = self.engine.store().get_show(&id) else {
                debug!("No show metadata was found for {}", id);
                continue;
            };
            if self.hides_show(&show) {
                continue;
            }

            let target = match media {
                MediaType::Tv => MenuTarget::TvShow {
                    id,
                    name: show.title.clone(),
                    season: None,
                },
                MediaType::Movies | MediaType::Trailers => MenuTarget::Movie {
                    id,
                    name: show.title.clone(),
                },
            };
            menu.push(MenuEntry::new(show.title, target).thumbnail(show.thumbnail_url));
        }

        Ok(Browse::Menu(menu))
    }

    /// Season picker for multi-season shows, otherwise the episode list
    pub async fn tv_show(
        &self,
        id: &Identifier,
        name: &str,
        season: Option<&SeasonChoice>,
    ) -> Result<Browse> {
        if !self.ready() {
            return Ok(Browse::unavailable());
        }

        let site = self.engine.site();
        let body = self
            .fetch(&site.show_episodes_url(id), self.cache.show_assets())
            .await?;

        let mut menu = Menu::new(name);
        match parse_tv_show_page(&body, season.map(|s| s.id.as_str()), site) {
            TvShowPage::Seasons(seasons) => {
                for found in seasons {
                    let mut entry = MenuEntry::new(
                        found.name.clone(),
                        MenuTarget::TvShow {
                            id: id.clone(),
                            name: name.to_string(),
                            season: Some(SeasonChoice {
                                id: found.id,
                                name: found.name,
                            }),
                        },
                    );
                    if let Some(thumbnail) = found.thumbnail_url {
                        entry = entry.thumbnail(thumbnail);
                    }
                    menu.push(entry);
                }
            }
            TvShowPage::Episodes(episodes) => {
                menu = menu.details();
                if let Some(season) = season {
                    menu = menu.with_title1(season.name.clone());
                }
                for episode in episodes {
                    let mut entry = MenuEntry::new(episode.title, MenuTarget::Play { url: episode.play_url })
                        .subtitle(episode.subtitle)
                        .summary(episode.summary)
                        .duration_ms(episode.duration_ms);
                    if let Some(thumbnail) = episode.thumbnail_url {
                        entry = entry.thumbnail(thumbnail);
                    }
                    menu.push(entry);
                }
            }
        }

        Ok(Browse::Menu(menu))
    }

    pub async fn movie(&self, id: &Identifier, name: &str) -> Result<Browse> {
        if !self.ready() {
            return Ok(Browse::unavailable());
        }

        let site = self.engine.site();
        let listing_url = site.movie_listing_url(id);
        let about_url = site.movie_about_url(id);
        let ttl = self.cache.show_assets();
        let (listing, about) =
            futures::try_join!(self.fetch(&listing_url, ttl), self.fetch(&about_url, ttl))?;

        let movie = parse_movie_pages(&listing, &about, &listing_url, site)?;

        let mut menu = Menu::new(name).details();
        let mut entry = MenuEntry::new(movie.title, MenuTarget::Play { url: movie.play_url })
            .subtitle(movie.year_and_rating)
            .summary(movie.summary)
            .duration_ms(movie.duration_ms);
        if let Some(thumbnail) = movie.thumbnail_url {
            entry = entry.thumbnail(thumbnail);
        }
        menu.push(entry);

        Ok(Browse::Menu(menu))
    }

    /// The front page's top 5 for a media type. Asset metadata is refreshed
    /// first; assets that still have no record are left out.
    pub async fn top5(&self, media: MediaType) -> Result<Browse> {
        if !self.ready() {
            return Ok(Browse::unavailable());
        }

        let site = self.engine.site();
        let body = self
            .fetch(site.front_page_url(), self.cache.front_page())
            .await?;
        let ids = self
            .extractor
            .top5_asset_ids(&Document::parse(&body), media);

        self.engine.refresh_metadata(&ids, RecordKind::Asset).await;

        let mut menu = Menu::new("Top 5").with_title1(media.label()).details();
        for id in &ids {
            let Some(asset) = self.engine.store().get_asset(id) else {
                debug!("No asset metadata was found for {}", id);
                continue;
            };
            menu.push(
                MenuEntry::new(
                    format!("{} : {}", asset.show_title, asset.episode_title),
                    MenuTarget::Play {
                        url: asset.play_url.clone(),
                    },
                )
                .subtitle(format!("{} | {}", asset.season, asset.episode_number))
                .summary(asset.description)
                .duration_ms(Some(asset.duration_ms))
                .thumbnail(asset.thumbnail_url),
            );
        }

        Ok(Browse::Menu(menu))
    }

    pub async fn play(&self, url: &str) -> Result<Browse> {
        if !self.ready() {
            return Ok(Browse::unavailable());
        }

        let playback = resolve_playback(
            self.engine.fetcher().as_ref(),
            url,
            self.cache.asset_metadata(),
            &self.prefix,
        )
        .await?;
        Ok(Browse::Redirect(playback))
    }
}
