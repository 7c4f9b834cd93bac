use serde::{Deserialize, Serialize};

use super::RecordKind;

/// Placeholder for an absent season or episode number
pub const UNKNOWN: &str = "Unknown";

/// Metadata shown for a TV series or movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowRecord {
    pub title: String,
    /// Empty when the show has no photos
    pub thumbnail_url: String,
    /// Network slug, empty when the page names none
    pub network: String,
}

/// Metadata for one playable video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub show_title: String,
    pub episode_title: String,
    pub thumbnail_url: String,
    pub description: String,
    pub duration_ms: u64,
    pub air_date: String,
    pub season: String,
    pub episode_number: String,
    pub play_url: String,
}

/// A stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    Show(ShowRecord),
    Asset(AssetRecord),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Show(_) => RecordKind::Show,
            Record::Asset(_) => RecordKind::Asset,
        }
    }

    pub fn as_show(&self) -> Option<&ShowRecord> {
        match self {
            Record::Show(show) => Some(show),
            Record::Asset(_) => None,
        }
    }

    pub fn as_asset(&self) -> Option<&AssetRecord> {
        match self {
            Record::Asset(asset) => Some(asset),
            Record::Show(_) => None,
        }
    }
}

impl From<ShowRecord> for Record {
    fn from(show: ShowRecord) -> Self {
        Record::Show(show)
    }
}

impl From<AssetRecord> for Record {
    fn from(asset: AssetRecord) -> Self {
        Record::Asset(asset)
    }
}
