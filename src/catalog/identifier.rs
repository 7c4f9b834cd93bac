/// Stable catalog identifiers derived from site URLs
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use url::Url;

fn show_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(.*/(?:movies|tv)/[^/]+/\d+/)").expect("valid show path regex")
    })
}

/// Canonical path naming a show or asset, e.g. `/tv/South-Park/62926/`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Show identifier from a listing link, which may point deeper into the show
    /// (`/tv/South-Park/62926/full-episodes`) or be absolute.
    pub fn show_from_href(href: &str, base: &Url) -> Option<Self> {
        let path = canonical_path(href, base)?;
        show_path_pattern()
            .captures(&path)
            .and_then(|captures| captures.get(1))
            .map(|m| Self(m.as_str().to_string()))
    }

    /// Asset identifier from a `.../videos` link
    pub fn asset_from_href(href: &str, base: &Url) -> Option<Self> {
        let path = canonical_path(href, base)?;
        let end = path.rfind("/videos")?;
        let id = &path[..end];
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }
}

fn canonical_path(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(|url| url.path().to_string())
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which namespace of the store an identifier lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Show,
    Asset,
}

impl RecordKind {
    pub fn prefix(self) -> &'static str {
        match self {
            RecordKind::Show => "show",
            RecordKind::Asset => "asset",
        }
    }

    /// Store key for `id`: `show-<id>` or `asset-<id>`
    pub fn key(self, id: &Identifier) -> String {
        format!("{}-{}", self.prefix(), id)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}
