/// Identifier extraction from listing pages
///
/// Upstream markup changes are outside our control, so a page that lacks the
/// expected structure yields no identifiers rather than an error.
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

use super::{ListingLayout, MediaType};
use crate::catalog::Identifier;
use crate::config::ExclusionConfig;
use crate::fetch::{Document, Node};

const STANDARD_ITEMS: &str = r#"div[class="fullEpisodeList"] div > ul > li"#;
const STANDARD_OPEN_ITEMS: &str =
    r#"div[class="fullEpisodeList"] div > ul > li:not([class^="protected"])"#;
const NEW_EPISODE_ITEMS: &str = r#"div[class="fullEpisodeList"] div > ul > li > div"#;
const TRAILER_ITEMS: &str =
    r#"div#episodeList > ul[class="fullEpisodeList"] > li:not([class="head"])"#;

fn onclick_target_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"'([^']+)'").expect("valid onclick regex"))
}

/// Pulls show and asset identifiers out of listing pages
#[derive(Debug, Clone)]
pub struct IdentifierExtractor {
    base: Url,
    hide_protected_providers: bool,
}

impl IdentifierExtractor {
    pub fn new(base: Url, exclusions: &ExclusionConfig) -> Self {
        Self {
            base,
            hide_protected_providers: exclusions.hide_protected_providers,
        }
    }

    /// Show identifiers in page order. Duplicates are kept.
    pub fn show_ids(&self, page: &Document, layout: ListingLayout) -> Vec<Identifier> {
        let selector = match layout {
            ListingLayout::Standard if self.hide_protected_providers => STANDARD_OPEN_ITEMS,
            ListingLayout::Standard => STANDARD_ITEMS,
            ListingLayout::NewEpisodes => NEW_EPISODE_ITEMS,
            ListingLayout::Trailers => TRAILER_ITEMS,
        };

        let items = page.query(selector);
        if items.is_empty() {
            debug!("No listing items found for layout {:?}", layout);
        }

        items
            .into_iter()
            .filter_map(|item| {
                // The link may sit inside a "new episode" box, so search all descendants
                let href = item.first("a").and_then(|a| a.attr("href"))?;
                let id = Identifier::show_from_href(href, &self.base);
                if id.is_none() {
                    debug!("Skipping unrecognised show link {}", href);
                }
                id
            })
            .collect()
    }

    /// Asset identifiers from one of the front page "top 5" tabs
    pub fn top5_asset_ids(&self, front_page: &Document, media: MediaType) -> Vec<Identifier> {
        let tab = match media {
            MediaType::Tv => 0,
            MediaType::Movies => 1,
            MediaType::Trailers => 2,
        };

        front_page
            .query(&format!("div#playlistTabBody{} > ol > li", tab))
            .into_iter()
            .filter_map(|item| {
                let link = item.children_named("a").into_iter().next()?;
                Identifier::asset_from_href(link.attr("href")?, &self.base)
            })
            .collect()
    }

    /// Genre or network filters offered by a listing widget, minus the selected one
    pub fn filters(&self, page: &Document, kind: FilterKind) -> Vec<FilterOption> {
        let container = match kind {
            FilterKind::Genre => "FilterbyGenre",
            FilterKind::Network => "FilterbyNetwork",
        };
        let selector = format!(
            r#"div#filters > div[class="{}"] > ul > li:not([class="selected"])"#,
            container
        );

        page.query(&selector)
            .into_iter()
            .filter_map(|item| self.filter_option(item))
            .collect()
    }

    fn filter_option(&self, item: Node<'_>) -> Option<FilterOption> {
        let link = item.children_named("a").into_iter().next()?;
        let onclick = link.attr("onclick")?;
        let target = onclick_target_pattern().captures(onclick)?.get(1)?.as_str();
        let name = link.own_text();
        if name.is_empty() {
            return None;
        }

        Some(FilterOption {
            name,
            url: self.base.join(target).ok()?.to_string(),
        })
    }
}

/// Kinds of listing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FilterKind {
    Genre,
    Network,
}

/// One selectable filter and the listing it leads to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub name: String,
    pub url: String,
}
