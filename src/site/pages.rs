/// Parsers for individual show, asset and movie pages
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use super::text::{convert_duration, tidy_string};
use super::Site;
use crate::catalog::{AssetRecord, ShowRecord, UNKNOWN};
use crate::error::{CatalogError, Result};
use crate::fetch::{Document, Node};

fn network_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/tv-networks/([^/]+)/").expect("valid network regex"))
}

fn player_data_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"video\.playerData = "(.*</entity>)"#).expect("valid player data regex")
    })
}

fn season_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\bS(\d+)").expect("valid season regex"))
}

fn episode_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\bEp(\d+)").expect("valid episode regex"))
}

fn bracketed_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(([^(]+)\)").expect("valid bracket regex"))
}

/// Show metadata from its photos page
pub fn parse_show_page(body: &str, page_url: &str) -> Result<ShowRecord> {
    let page = Document::parse(body);

    let title = page
        .first_text(r#"div#pageHeadline span[class="title"]"#)
        .ok_or_else(|| CatalogError::parse("show title", page_url))?;

    // Gallery thumbnails are all published in the larger size too
    let thumbnail_url = page
        .first_attr("div#listHolder > ul#viewTable > li > a > img", "src")
        .map(|src| src.replace("121_87", "640_320"))
        .unwrap_or_default();

    let network = page
        .first_attr("div#swoosh > a", "href")
        .and_then(|href| {
            network_pattern()
                .captures(&href)
                .and_then(|captures| captures.get(1))
                .map(|m| m.as_str().to_string())
        })
        .unwrap_or_default();

    debug!("Show page {}: thumb={:?} network={:?}", page_url, thumbnail_url, network);

    Ok(ShowRecord {
        title,
        thumbnail_url,
        network,
    })
}

/// Asset metadata from the player data embedded in its video page
pub fn parse_asset_page(body: &str, page_url: &str) -> Result<AssetRecord> {
    let blob = player_data_pattern()
        .captures(body)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| CatalogError::parse("video.playerData", page_url))?
        .as_str()
        .replace("\\\"", "\"")
        .replace("\\/", "/");

    let data = Document::parse_fragment(&blob);
    let field = |selector: &str, what: &str| -> Result<String> {
        data.first(selector)
            .map(|node| node.own_text())
            .ok_or_else(|| CatalogError::parse(what, page_url))
    };
    let or_unknown = |value: String| {
        if value.is_empty() {
            UNKNOWN.to_string()
        } else {
            value
        }
    };

    let duration = field("metadata duration", "duration")?;

    Ok(AssetRecord {
        show_title: field("metadata entityname", "entityName")?,
        episode_title: field("metadata videotitle", "videoTitle")?,
        thumbnail_url: field("entity imageurl", "imageUrl")?,
        description: field("metadata description", "description")?,
        duration_ms: convert_duration(&duration)?,
        air_date: field("metadata airdate", "airDate")?,
        season: or_unknown(field("metadata season", "season")?),
        episode_number: or_unknown(field("metadata episode", "episode")?),
        play_url: page_url.to_string(),
    })
}

/// A season offered by a show's episode page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Season {
    pub id: String,
    pub name: String,
    pub thumbnail_url: Option<String>,
}

/// One playable episode row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub title: String,
    /// "Season N Episode M" on the first line, air date on the second
    pub subtitle: String,
    pub summary: String,
    pub duration_ms: Option<u64>,
    pub thumbnail_url: Option<String>,
    pub play_url: String,
}

/// What a show's episode page presents for the current selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TvShowPage {
    /// Several seasons and none chosen yet
    Seasons(Vec<Season>),
    Episodes(Vec<Episode>),
}

/// Parse a show's `full-episodes` page
pub fn parse_tv_show_page(body: &str, selected_season: Option<&str>, site: &Site) -> TvShowPage {
    let page = Document::parse(body);

    let seasons: Vec<Season> = page
        .query(r#"div#listHolder > ul:first-of-type > li[class="seasonsMenu"] > select[name="seasons"] > option:not([value="all"])"#)
        .into_iter()
        .filter_map(|option| {
            let id = option.attr("value")?.to_string();
            let thumbnail_url =
                page.first_attr(&format!(r#"div[id="{}"] td.first > a > img"#, id), "src");
            Some(Season {
                name: option.own_text(),
                id,
                thumbnail_url,
            })
        })
        .collect();

    if seasons.len() > 1 && selected_season.is_none() {
        return TvShowPage::Seasons(seasons);
    }

    let rows = match selected_season {
        Some(season) => page.query(&format!(
            r#"div[id="{}"] > table[class="videoList fourColumn"] tr:not([class="newEpHeader"])"#,
            season
        )),
        None => page.query(r#"div#listHolder tr:not([class="newEpHeader"])"#),
    };

    TvShowPage::Episodes(rows.into_iter().filter_map(|row| parse_episode_row(row, site)).collect())
}

fn parse_episode_row(row: Node<'_>, site: &Site) -> Option<Episode> {
    let cells = row.children_named("td");
    let first = cells.first()?;
    let links = first.children_named("a");

    let play_url = site.resolve(links.first()?.attr("href")?)?;
    let title = links.get(1).map(|a| a.own_text()).unwrap_or_default();

    let cell_text = |class: &str| {
        cells
            .iter()
            .find(|cell| cell.attr("class") == Some(class))
            .map(|cell| cell.own_text())
            .unwrap_or_default()
    };

    let label = episode_label(&cell_text("two"));
    let air_date = cell_text("three");

    let duration_ms = first
        .first("span")
        .and_then(|span| convert_duration(&span.text()).ok());

    Some(Episode {
        title,
        subtitle: format!("{}\nAirdate: {}", label, air_date),
        summary: row.first("p").map(|p| p.own_text()).unwrap_or_default(),
        duration_ms,
        thumbnail_url: row.first("img").and_then(|img| img.attr("src")).map(str::to_string),
        play_url,
    })
}

/// Expand the terse "S3 | Ep5" episode code
pub fn episode_label(code: &str) -> String {
    let label = season_code_pattern().replace_all(code, "Season $1");
    let label = episode_code_pattern().replace_all(&label, "Episode $1");
    let label = label.replace('|', " ").replace("Unknown", "Season: Unknown");
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Everything shown for a movie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieDetails {
    pub title: String,
    pub play_url: String,
    pub duration_ms: Option<u64>,
    pub year_and_rating: String,
    pub summary: String,
    pub thumbnail_url: Option<String>,
}

/// Combine a movie's `full-movie` listing and its `about` page
pub fn parse_movie_pages(
    listing_body: &str,
    about_body: &str,
    listing_url: &str,
    site: &Site,
) -> Result<MovieDetails> {
    let listing = Document::parse(listing_body);
    let about = Document::parse(about_body);
    let cell = r#"table[class="videoList twoColumn"] td[class="first"]"#;

    let links = listing.query(&format!("{} > a", cell));
    let play_url = links
        .first()
        .and_then(|a| a.attr("href"))
        .and_then(|href| site.resolve(href))
        .ok_or_else(|| CatalogError::parse("movie link", listing_url))?;
    let title = links
        .get(1)
        .map(|a| a.own_text())
        .ok_or_else(|| CatalogError::parse("movie title", listing_url))?;

    let duration_ms = listing
        .first(&format!("{} > a > span", cell))
        .and_then(|span| convert_duration(&span.text()).ok());

    let meta = listing
        .first_text(r#"div#pageHeadline span[class="meta"]"#)
        .unwrap_or_default();
    let year_and_rating = tidy_string(Some(&bracketed_pattern().replace_all(&meta, "$1")));

    Ok(MovieDetails {
        title,
        play_url,
        duration_ms,
        year_and_rating,
        summary: about
            .first_text(r#"div#leftcontent > div[class="clearfix"] > p"#)
            .unwrap_or_default(),
        thumbnail_url: about.first_attr("div#thumbNail img", "src"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const SHOW_PAGE: &str = r#"
      <div id="pageHeadline"><h1><span class="title">
        South Park
      </span></h1></div>
      <div id="swoosh"><a href="/tv-networks/Comedy-Central/123/">Comedy Central</a></div>
      <div id="listHolder"><ul id="viewTable">
        <li><a href="/p/1"><img src="http://img.fancast.com/southpark_121_87.jpg"></a></li>
        <li><a href="/p/2"><img src="http://img.fancast.com/other_121_87.jpg"></a></li>
      </ul></div>"#;

    const ASSET_PAGE: &str = r#"<script>
      var video = {};
      video.playerData = "<entity><imageUrl>http:\/\/img.fancast.com\/pandemic.jpg</imageUrl><metadata><entityName>South Park</entityName><videoTitle>Pandemic 2</videoTitle><description>Craig &amp; co.</description><duration>22:15</duration><airDate>03/09/2008</airDate><season></season><episode>12</episode></metadata></entity>";
    </script>"#;

    fn site() -> Site {
        Site::new(&Config::default().site).unwrap()
    }

    #[test]
    fn test_show_page() {
        let show = parse_show_page(SHOW_PAGE, "http://x/photos").unwrap();
        assert_eq!(show.title, "South Park");
        assert_eq!(show.thumbnail_url, "http://img.fancast.com/southpark_640_320.jpg");
        assert_eq!(show.network, "Comedy-Central");
    }

    #[test]
    fn test_show_page_without_optional_fields() {
        let show = parse_show_page(
            r#"<div id="pageHeadline"><span class="title">Indie</span></div>"#,
            "http://x/photos",
        )
        .unwrap();
        assert_eq!(show.title, "Indie");
        assert_eq!(show.thumbnail_url, "");
        assert_eq!(show.network, "");
    }

    #[test]
    fn test_show_page_without_title_fails() {
        let err = parse_show_page("<html></html>", "http://x/photos").unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_asset_page() {
        let asset = parse_asset_page(ASSET_PAGE, "http://www.fancast.com/a/videos").unwrap();
        assert_eq!(asset.show_title, "South Park");
        assert_eq!(asset.episode_title, "Pandemic 2");
        assert_eq!(asset.thumbnail_url, "http://img.fancast.com/pandemic.jpg");
        assert_eq!(asset.description, "Craig & co.");
        assert_eq!(asset.duration_ms, 1_335_000);
        assert_eq!(asset.air_date, "03/09/2008");
        assert_eq!(asset.season, UNKNOWN);
        assert_eq!(asset.episode_number, "12");
        assert_eq!(asset.play_url, "http://www.fancast.com/a/videos");
    }

    #[test]
    fn test_asset_page_missing_field_fails() {
        let body = ASSET_PAGE.replace("<airDate>03/09/2008</airDate>", "");
        assert!(parse_asset_page(&body, "http://x/videos").is_err());
        assert!(parse_asset_page("<html></html>", "http://x/videos").is_err());
    }

    #[test]
    fn test_episode_label() {
        assert_eq!(episode_label("S12 | Ep4"), "Season 12 Episode 4");
        assert_eq!(episode_label("Unknown"), "Season: Unknown");
    }

    #[test]
    fn test_tv_show_page_with_seasons() {
        let body = r##"
          <div id="listHolder">
            <ul><li class="seasonsMenu"><select name="seasons">
              <option value="all">All</option>
              <option value="season12"> Season 12 </option>
              <option value="season11">Season 11</option>
            </select></li></ul>
            <div id="season12"><table class="videoList fourColumn">
              <tr class="newEpHeader"><td>New</td></tr>
              <tr>
                <td class="first"><a href="/tv/South-Park/62926/1/Pandemic/videos"><img src="http://img/s12e1.jpg"><span>(22:15)</span></a><a href="#">Pandemic</a><p>Guinea pigs</p></td>
                <td class="two">S12 | Ep1</td>
                <td class="three">03/09/2008</td>
              </tr>
            </table></div>
            <div id="season11"><table class="videoList fourColumn"></table></div>
          </div>"##;

        match parse_tv_show_page(body, None, &site()) {
            TvShowPage::Seasons(seasons) => {
                assert_eq!(seasons.len(), 2);
                assert_eq!(seasons[0].name, "Season 12");
                assert_eq!(seasons[0].thumbnail_url.as_deref(), Some("http://img/s12e1.jpg"));
                assert_eq!(seasons[1].thumbnail_url, None);
            }
            other => panic!("expected seasons, got {:?}", other),
        }

        match parse_tv_show_page(body, Some("season12"), &site()) {
            TvShowPage::Episodes(episodes) => {
                assert_eq!(episodes.len(), 1);
                let episode = &episodes[0];
                assert_eq!(episode.title, "Pandemic");
                assert_eq!(episode.subtitle, "Season 12 Episode 1\nAirdate: 03/09/2008");
                assert_eq!(episode.summary, "Guinea pigs");
                assert_eq!(episode.duration_ms, Some(1_335_000));
                assert_eq!(
                    episode.play_url,
                    "http://www.fancast.com/tv/South-Park/62926/1/Pandemic/videos"
                );
            }
            other => panic!("expected episodes, got {:?}", other),
        }
    }

    #[test]
    fn test_movie_pages() {
        let listing = r##"
          <div id="pageHeadline"><span class="meta">(2009) PG</span></div>
          <table class="videoList twoColumn"><tr><td class="first">
            <a href="/movies/Up/4455/9/Up/videos"><span>(1:36:00)</span></a><a href="#"> Up </a>
          </td></tr></table>"##;
        let about = r#"
          <div id="leftcontent"><div class="clearfix"><p>A balloon adventure.</p></div></div>"#;

        let movie = parse_movie_pages(listing, about, "http://x/full-movie", &site()).unwrap();
        assert_eq!(movie.title, "Up");
        assert_eq!(movie.play_url, "http://www.fancast.com/movies/Up/4455/9/Up/videos");
        assert_eq!(movie.duration_ms, Some(5_760_000));
        assert_eq!(movie.year_and_rating, "2009 PG");
        assert_eq!(movie.summary, "A balloon adventure.");
        assert_eq!(movie.thumbnail_url, None);
    }
}
