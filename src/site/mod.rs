/// Fancast site layout
///
/// URL construction and page parsing for fancast.com. Selector strings are
/// confined to this module; callers only see extracted values.

pub mod listing;
pub mod pages;
pub mod text;

pub use listing::{FilterKind, FilterOption, IdentifierExtractor};

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::catalog::Identifier;
use crate::config::SiteConfig;
use crate::error::Result;

/// Top-level content sections of the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    Tv,
    Movies,
    Trailers,
}

impl MediaType {
    pub fn label(self) -> &'static str {
        match self {
            MediaType::Tv => "TV",
            MediaType::Movies => "Movies",
            MediaType::Trailers => "Trailers",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How shows are laid out on a listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingLayout {
    /// The TV and movie widgets, including filtered variants
    Standard,
    /// The trailers page
    Trailers,
    /// The "new episode" boxes of the TV widget
    NewEpisodes,
}

/// A listing page to crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSource {
    pub url: String,
    pub layout: ListingLayout,
}

/// URL builder for one site root
#[derive(Debug, Clone)]
pub struct Site {
    base: Url,
    root: String,
    config: SiteConfig,
}

impl Site {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let root = config.base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&root)?;
        Ok(Self {
            base,
            root,
            config: config.clone(),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Site root followed by a site-relative path
    pub fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.root, path)
    }

    /// Resolve a link found on a page against the site root
    pub fn resolve(&self, href: &str) -> Option<String> {
        self.base.join(href.trim()).ok().map(String::from)
    }

    pub fn front_page_url(&self) -> &str {
        &self.root
    }

    /// Photos page, the source of a show's title, thumbnail and network
    pub fn show_photos_url(&self, id: &Identifier) -> String {
        format!("{}{}photos", self.root, id)
    }

    pub fn show_episodes_url(&self, id: &Identifier) -> String {
        format!("{}{}full-episodes", self.root, id)
    }

    pub fn movie_listing_url(&self, id: &Identifier) -> String {
        format!("{}{}full-movie", self.root, id)
    }

    pub fn movie_about_url(&self, id: &Identifier) -> String {
        format!("{}{}about", self.root, id)
    }

    /// Video page of an asset, also its play URL
    pub fn asset_page_url(&self, id: &Identifier) -> String {
        format!("{}{}/videos", self.root, id)
    }

    pub fn listing_url(&self, media: MediaType) -> &str {
        match media {
            MediaType::Tv => &self.config.tv_listing_url,
            MediaType::Movies => &self.config.movies_listing_url,
            MediaType::Trailers => &self.config.trailers_url,
        }
    }

    pub fn listing(&self, media: MediaType) -> ListingSource {
        let layout = match media {
            MediaType::Trailers => ListingLayout::Trailers,
            MediaType::Tv | MediaType::Movies => ListingLayout::Standard,
        };
        ListingSource {
            url: self.listing_url(media).to_string(),
            layout,
        }
    }

    /// The listings walked by a full refresh, in crawl order
    pub fn refresh_sources(&self) -> [ListingSource; 3] {
        [
            self.listing(MediaType::Tv),
            self.listing(MediaType::Movies),
            self.listing(MediaType::Trailers),
        ]
    }
}
