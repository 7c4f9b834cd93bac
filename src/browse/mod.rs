/// Catalog browsing: menus built from the metadata store

pub mod builder;
pub mod menu;
pub mod playback;

pub use builder::CatalogBuilder;
pub use menu::{Browse, Menu, MenuEntry, MenuTarget, SeasonChoice, ShowFilter, ViewGroup, DEFAULT_THUMBNAIL};
pub use playback::{resolve_playback, AspectRatio, Playback};
