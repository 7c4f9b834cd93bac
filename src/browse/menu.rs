/// Menu data handed to the presentation layer
use serde::{Deserialize, Serialize};
use std::fmt;

use super::playback::Playback;
use crate::catalog::Identifier;
use crate::site::{FilterKind, MediaType};

/// Thumbnail used when a show has no photo of its own
pub const DEFAULT_THUMBNAIL: &str = "icon-default.png";

/// Shown while no full refresh has completed yet
pub const UNAVAILABLE_MESSAGE: &str =
    "The catalog is still being built. Please try again later.";

/// Result of opening any menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Browse {
    Menu(Menu),
    /// The store has not been initialized
    Unavailable { message: String },
    Redirect(Playback),
}

impl Browse {
    pub fn unavailable() -> Self {
        Browse::Unavailable {
            message: UNAVAILABLE_MESSAGE.to_string(),
        }
    }

    pub fn menu(&self) -> Option<&Menu> {
        match self {
            Browse::Menu(menu) => Some(menu),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Browse::Unavailable { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewGroup {
    List,
    Details,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub title1: Option<String>,
    pub title2: Option<String>,
    pub view: ViewGroup,
    pub entries: Vec<MenuEntry>,
}

impl Menu {
    pub fn new(title2: impl Into<String>) -> Self {
        Self {
            title1: None,
            title2: Some(title2.into()),
            view: ViewGroup::List,
            entries: Vec::new(),
        }
    }

    pub fn with_title1(mut self, title1: impl Into<String>) -> Self {
        self.title1 = Some(title1.into());
        self
    }

    pub fn details(mut self) -> Self {
        self.view = ViewGroup::Details;
        self
    }

    pub fn push(&mut self, entry: MenuEntry) {
        self.entries.push(entry);
    }

    pub fn titles(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.title.as_str()).collect()
    }
}

impl fmt::Display for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heading: Vec<&str> = [self.title1.as_deref(), self.title2.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        writeln!(f, "== {} ==", heading.join(" / "))?;

        for (index, entry) in self.entries.iter().enumerate() {
            write!(f, "{:>3}. {}", index + 1, entry.title)?;
            if !entry.subtitle.is_empty() {
                write!(f, " ({})", entry.subtitle.replace('\n', ", "))?;
            }
            if let Some(ms) = entry.duration_ms {
                write!(f, " [{}m]", ms / 60_000)?;
            }
            writeln!(f)?;
            if self.view == ViewGroup::Details && !entry.summary.is_empty() {
                writeln!(f, "     {}", entry.summary)?;
            }
        }
        Ok(())
    }
}

/// One selectable line of a menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub title: String,
    pub subtitle: String,
    pub summary: String,
    pub thumbnail: String,
    pub duration_ms: Option<u64>,
    pub target: MenuTarget,
}

impl MenuEntry {
    pub fn new(title: impl Into<String>, target: MenuTarget) -> Self {
        Self {
            title: title.into(),
            subtitle: String::new(),
            summary: String::new(),
            thumbnail: DEFAULT_THUMBNAIL.to_string(),
            duration_ms: None,
            target,
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        let thumbnail = thumbnail.into();
        if !thumbnail.is_empty() {
            self.thumbnail = thumbnail;
        }
        self
    }

    pub fn duration_ms(mut self, duration_ms: Option<u64>) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Which shows a show list presents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShowFilter {
    All,
    NewEpisodes,
    /// A genre or network listing picked from the filter selector
    Listing { name: String, url: String },
}

/// A season picked from a show's season list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonChoice {
    pub id: String,
    pub name: String,
}

/// What selecting an entry opens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuTarget {
    MediaMenu(MediaType),
    FilterSelector { media: MediaType, kind: FilterKind },
    ShowList { media: MediaType, filter: ShowFilter },
    Top5(MediaType),
    TvShow {
        id: Identifier,
        name: String,
        season: Option<SeasonChoice>,
    },
    Movie { id: Identifier, name: String },
    Play { url: String },
}
