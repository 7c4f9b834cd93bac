/// Turns an asset page into a player redirect
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::fetch::{Document, Fetcher};

/// Handler prefix the host uses for this catalog
pub const DEFAULT_PREFIX: &str = "/video/fancast";

const REDIRECT_BASE: &str = "plex://localhost/video/:/webkit";

/// Player frame shape, chosen from the video's dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    FourByThree,
    SixteenByNine,
    Widescreen,
}

impl AspectRatio {
    /// A zero height means the page gave no size; assume 640x360
    pub fn from_dimensions(width: f64, height: f64) -> Self {
        let (width, height) = if height == 0.0 { (640.0, 360.0) } else { (width, height) };
        let ratio = width / height;

        if ratio < 1.55 {
            AspectRatio::FourByThree
        } else if ratio < 2.2 {
            AspectRatio::SixteenByNine
        } else {
            AspectRatio::Widescreen
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::FourByThree => "4x3",
            AspectRatio::SixteenByNine => "16x9",
            AspectRatio::Widescreen => "2.35x1",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playback {
    pub aspect: AspectRatio,
    /// The page URL with the aspect fragment appended
    pub video_url: String,
    pub redirect_url: String,
}

impl Playback {
    pub fn new(page_url: &str, aspect: AspectRatio, prefix: &str) -> Self {
        let video_url = format!("{}#{}", page_url, aspect.as_str());
        let quoted = urlencoding::encode(&video_url).replace("%20", "+");
        let redirect_url = format!("{}?url={}&prefix={}", REDIRECT_BASE, quoted, prefix);
        Self {
            aspect,
            video_url,
            redirect_url,
        }
    }
}

fn dimension(page: &Document, name: &str, url: &str) -> Result<f64> {
    let raw = page
        .first_attr(&format!(r#"meta[name="{}"]"#, name), "content")
        .ok_or_else(|| CatalogError::parse(name, url))?;
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '"').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .map_err(|_| CatalogError::parse(name, url))
}

/// Read the video dimensions from the asset page and build the redirect
pub fn playback_from_page(body: &str, page_url: &str, prefix: &str) -> Result<Playback> {
    let page = Document::parse(body);
    let width = dimension(&page, "video_width", page_url)?;
    let height = dimension(&page, "video_height", page_url)?;
    debug!("Video at {} is {}x{}", page_url, width, height);

    Ok(Playback::new(page_url, AspectRatio::from_dimensions(width, height), prefix))
}

pub async fn resolve_playback(
    fetcher: &dyn Fetcher,
    page_url: &str,
    ttl: Duration,
    prefix: &str,
) -> Result<Playback> {
    let body = fetcher.fetch_raw(page_url, ttl).await?;
    let playback = playback_from_page(&body, page_url, prefix)?;
    debug!("Redirecting to {}", playback.redirect_url);
    Ok(playback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_boundaries() {
        assert_eq!(AspectRatio::from_dimensions(640.0, 480.0), AspectRatio::FourByThree);
        assert_eq!(AspectRatio::from_dimensions(155.0, 100.0), AspectRatio::SixteenByNine);
        assert_eq!(AspectRatio::from_dimensions(1280.0, 720.0), AspectRatio::SixteenByNine);
        assert_eq!(AspectRatio::from_dimensions(220.0, 100.0), AspectRatio::Widescreen);
        assert_eq!(AspectRatio::from_dimensions(0.0, 0.0), AspectRatio::SixteenByNine);
    }

    #[test]
    fn test_playback_from_meta_tags() {
        let body = r#"<html><head>
            <meta name="video_width" content="1,280">
            <meta name="video_height" content="&quot;544&quot;">
          </head><body></body></html>"#;
        let url = "http://www.fancast.com/movies/Watchmen/1/2/Trailer/videos";
        let playback = playback_from_page(body, url, DEFAULT_PREFIX).unwrap();

        assert_eq!(playback.aspect, AspectRatio::Widescreen);
        assert_eq!(playback.video_url, format!("{}#2.35x1", url));
        assert_eq!(
            playback.redirect_url,
            "plex://localhost/video/:/webkit?url=http%3A%2F%2Fwww.fancast.com%2Fmovies%2FWatchmen%2F1%2F2%2FTrailer%2Fvideos%232.35x1&prefix=/video/fancast"
        );
    }

    #[test]
    fn test_missing_dimensions_is_parse_error() {
        let err = playback_from_page("<html></html>", "http://x/videos", DEFAULT_PREFIX).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }
}
