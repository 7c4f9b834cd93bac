mod common;

use common::*;
use fancast_catalog::browse::{Browse, CatalogBuilder, MenuTarget, SeasonChoice, ShowFilter, DEFAULT_THUMBNAIL};
use fancast_catalog::catalog::{Identifier, Record, RecordKind, ShowRecord};
use fancast_catalog::site::{FilterKind, MediaType};
use std::sync::Arc;

const SOUTH_PARK: &str = "/tv/South-Park/62926/";
const LOST: &str = "/tv/Lost/100/";
const SMALLVILLE: &str = "/tv/Smallville/200/";
const UNFETCHED: &str = "/tv/Brand-New/300/";

fn show(title: &str, thumbnail_url: &str, network: &str) -> Record {
    Record::Show(ShowRecord {
        title: title.to_string(),
        thumbnail_url: thumbnail_url.to_string(),
        network: network.to_string(),
    })
}

async fn seeded_builder(config: &fancast_catalog::Config, fetcher: &Arc<MockFetcher>) -> CatalogBuilder {
    let engine = engine(config, fetcher);
    let store = engine.store();
    let key = |path: &str| RecordKind::Show.key(&Identifier::new(path));

    store.set(key(SOUTH_PARK), show("South Park", "", "")).await.unwrap();
    store
        .set(key(LOST), show("Lost", "http://img.test/lost.jpg", "ABC-Entertainment-Group"))
        .await
        .unwrap();
    store
        .set(key(SMALLVILLE), show("Smallville", "", "CW-Television-Network"))
        .await
        .unwrap();
    store.mark_initialized().await.unwrap();

    fetcher.page(tv_listing_url(), listing(&[SOUTH_PARK, LOST, SMALLVILLE, UNFETCHED]));
    CatalogBuilder::new(config, engine)
}

fn menu(browse: Browse) -> fancast_catalog::browse::Menu {
    match browse {
        Browse::Menu(menu) => menu,
        other => panic!("expected a menu, got {:?}", other),
    }
}

#[tokio::test]
async fn test_everything_unavailable_before_first_refresh() {
    let fetcher = Arc::new(MockFetcher::new());
    let config = test_config(0.0);
    let builder = CatalogBuilder::new(&config, engine(&config, &fetcher));

    assert!(builder.main_menu().is_unavailable());
    assert!(builder.media_menu(MediaType::Tv).is_unavailable());
    let shows = builder.show_list(MediaType::Tv, &ShowFilter::All).await.unwrap();
    assert!(shows.is_unavailable());
    let top5 = builder.top5(MediaType::Tv).await.unwrap();
    assert!(top5.is_unavailable());

    let page = url("/tv/Lost/100/1/Pilot/videos");
    assert!(builder.play(&page).await.unwrap().is_unavailable());
    let targets = [
        MenuTarget::MediaMenu(MediaType::Movies),
        MenuTarget::FilterSelector {
            media: MediaType::Tv,
            kind: FilterKind::Genre,
        },
        MenuTarget::Movie {
            id: Identifier::new("/movies/Up/4455/"),
            name: "Up".to_string(),
        },
        MenuTarget::TvShow {
            id: Identifier::new(SOUTH_PARK),
            name: "South Park".to_string(),
            season: None,
        },
        MenuTarget::Play { url: page },
    ];
    for target in &targets {
        assert!(builder.open(target).await.unwrap().is_unavailable());
    }
    assert_eq!(fetcher.total_calls(), 0);
}

#[tokio::test]
async fn test_main_and_media_menus() {
    let fetcher = Arc::new(MockFetcher::new());
    let config = test_config(0.0);
    let builder = seeded_builder(&config, &fetcher).await;

    assert_eq!(menu(builder.main_menu()).titles(), vec!["TV", "Movies"]);
    assert_eq!(
        menu(builder.media_menu(MediaType::Tv)).titles(),
        vec!["All", "Top 5", "By Genre", "By Network", "New Episodes"]
    );
    assert_eq!(
        menu(builder.media_menu(MediaType::Movies)).titles(),
        vec!["All", "Top 5", "By Genre"]
    );
}

#[tokio::test]
async fn test_show_list_skips_unknown_and_excluded_networks() {
    let fetcher = Arc::new(MockFetcher::new());
    let config = test_config(0.0);
    let builder = seeded_builder(&config, &fetcher).await;

    let shows = menu(builder.show_list(MediaType::Tv, &ShowFilter::All).await.unwrap());

    // A show with no network renders and is never caught by a network exclusion
    assert_eq!(shows.titles(), vec!["South Park"]);
    assert_eq!(shows.entries[0].thumbnail, DEFAULT_THUMBNAIL);
    assert_eq!(
        shows.entries[0].target,
        MenuTarget::TvShow {
            id: Identifier::new(SOUTH_PARK),
            name: "South Park".to_string(),
            season: None,
        }
    );
}

#[tokio::test]
async fn test_show_list_without_exclusions() {
    let fetcher = Arc::new(MockFetcher::new());
    let config = config_showing_everything();
    let builder = seeded_builder(&config, &fetcher).await;

    let shows = menu(builder.show_list(MediaType::Tv, &ShowFilter::All).await.unwrap());

    assert_eq!(shows.titles(), vec!["South Park", "Lost", "Smallville"]);
    assert_eq!(shows.entries[1].thumbnail, "http://img.test/lost.jpg");
}

#[tokio::test]
async fn test_filter_selector_hides_abc_and_cw() {
    let fetcher = Arc::new(MockFetcher::new());
    let config = test_config(0.0);
    let builder = seeded_builder(&config, &fetcher).await;
    fetcher.page(
        tv_listing_url(),
        r#"<div id="filters"><div class="FilterbyNetwork"><ul>
             <li class="selected"><a onclick="filterEpList('/all.widget')">All</a></li>
             <li><a onclick="filterEpList('/net.widget?n=ABC')">ABC</a></li>
             <li><a onclick="filterEpList('/net.widget?n=CW')">CW</a></li>
             <li><a onclick="filterEpList('/net.widget?n=FOX')">FOX</a></li>
           </ul></div></div>"#,
    );

    let filters = menu(builder.filter_selector(MediaType::Tv, FilterKind::Network).await.unwrap());

    assert_eq!(filters.titles(), vec!["FOX"]);
    assert_eq!(
        filters.entries[0].target,
        MenuTarget::ShowList {
            media: MediaType::Tv,
            filter: ShowFilter::Listing {
                name: "FOX".to_string(),
                url: url("/net.widget?n=FOX"),
            },
        }
    );
}

#[tokio::test]
async fn test_filtered_listing_is_fetched_from_its_url() {
    let fetcher = Arc::new(MockFetcher::new());
    let config = test_config(0.0);
    let builder = seeded_builder(&config, &fetcher).await;
    let filter_url = url("/net.widget?n=Comedy-Central");
    fetcher.page(filter_url.clone(), listing(&[SOUTH_PARK]));

    let filter = ShowFilter::Listing {
        name: "Comedy Central".to_string(),
        url: filter_url.clone(),
    };
    let shows = menu(builder.show_list(MediaType::Tv, &filter).await.unwrap());

    assert_eq!(shows.title2.as_deref(), Some("Comedy Central"));
    assert_eq!(shows.titles(), vec!["South Park"]);
    assert_eq!(fetcher.calls(&filter_url), 1);
}

#[tokio::test]
async fn test_top5_refreshes_assets_then_renders_known_ones() {
    let fetcher = Arc::new(MockFetcher::new());
    let config = test_config(0.0);
    let builder = seeded_builder(&config, &fetcher).await;
    fetcher.page(
        url(""),
        r#"<div id="playlistTabBody0"><ol>
             <li><a href="http://fancast.test/tv/Lost/100/1/Pilot/videos">Lost</a></li>
             <li><a href="http://fancast.test/tv/Lost/100/2/Gone/videos">Gone</a></li>
           </ol></div>"#,
    );
    fetcher.page(url("/tv/Lost/100/1/Pilot/videos"), asset_page("Lost", "Pilot", "1", ""));

    let top5 = menu(builder.top5(MediaType::Tv).await.unwrap());

    assert_eq!(top5.titles(), vec!["Lost : Pilot"]);
    assert_eq!(top5.entries[0].subtitle, "1 | Unknown");
    assert_eq!(top5.entries[0].duration_ms, Some(1_320_000));
    assert_eq!(fetcher.calls(&url("/tv/Lost/100/2/Gone/videos")), 1);

    // Cached assets are not fetched again at p=0
    builder.top5(MediaType::Tv).await.unwrap();
    assert_eq!(fetcher.calls(&url("/tv/Lost/100/1/Pilot/videos")), 1);
}

#[tokio::test]
async fn test_tv_show_lists_seasons_then_episodes() {
    let fetcher = Arc::new(MockFetcher::new());
    let config = test_config(0.0);
    let builder = seeded_builder(&config, &fetcher).await;
    fetcher.page(
        url(&format!("{}full-episodes", SOUTH_PARK)),
        r##"<div id="listHolder">
             <ul><li class="seasonsMenu"><select name="seasons">
               <option value="all">All</option>
               <option value="season12"> Season 12 </option>
               <option value="season11"> Season 11 </option>
             </select></li></ul>
             <div id="season12"><table class="videoList fourColumn">
               <tr><td class="first"><a href="/tv/South-Park/62926/1/Pandemic/videos"><img src="http://img.test/e1.jpg"><span>(22:15)</span></a><a href="#">Pandemic</a><p>Guinea pigs</p></td>
                   <td class="two">S12 | Ep1</td><td class="three">03/09/2008</td></tr>
             </table></div>
             <div id="season11"><table class="videoList fourColumn"></table></div>
           </div>"##,
    );
    let id = Identifier::new(SOUTH_PARK);

    let seasons = menu(builder.tv_show(&id, "South Park", None).await.unwrap());
    assert_eq!(seasons.titles(), vec!["Season 12", "Season 11"]);
    assert_eq!(seasons.entries[0].thumbnail, "http://img.test/e1.jpg");
    assert_eq!(seasons.entries[1].thumbnail, DEFAULT_THUMBNAIL);

    let season = SeasonChoice {
        id: "season12".to_string(),
        name: "Season 12".to_string(),
    };
    let episodes = menu(builder.tv_show(&id, "South Park", Some(&season)).await.unwrap());
    assert_eq!(episodes.titles(), vec!["Pandemic"]);
    assert_eq!(episodes.entries[0].subtitle, "Season 12 Episode 1\nAirdate: 03/09/2008");
    assert_eq!(
        episodes.entries[0].target,
        MenuTarget::Play {
            url: url("/tv/South-Park/62926/1/Pandemic/videos")
        }
    );
}

#[tokio::test]
async fn test_movie_combines_listing_and_about_pages() {
    let fetcher = Arc::new(MockFetcher::new());
    let config = test_config(0.0);
    let builder = seeded_builder(&config, &fetcher).await;
    let up = "/movies/Up/4455/";
    fetcher.page(
        url(&format!("{}full-movie", up)),
        r##"<div id="pageHeadline"><span class="meta">(2009) PG</span></div>
           <table class="videoList twoColumn"><tr><td class="first">
             <a href="/movies/Up/4455/9/Up/videos"><span>(1:36:00)</span></a><a href="#"> Up </a>
           </td></tr></table>"##,
    );
    fetcher.page(
        url(&format!("{}about", up)),
        r#"<div id="thumbNail"><img src="http://img.test/up.jpg"></div>
           <div id="leftcontent"><div class="clearfix"><p>A balloon adventure.</p></div></div>"#,
    );

    let movie = menu(
        builder
            .open(&MenuTarget::Movie {
                id: Identifier::new(up),
                name: "Up".to_string(),
            })
            .await
            .unwrap(),
    );

    assert_eq!(movie.title2.as_deref(), Some("Up"));
    assert_eq!(movie.titles(), vec!["Up"]);
    let entry = &movie.entries[0];
    assert_eq!(entry.subtitle, "2009 PG");
    assert_eq!(entry.summary, "A balloon adventure.");
    assert_eq!(entry.thumbnail, "http://img.test/up.jpg");
    assert_eq!(entry.duration_ms, Some(5_760_000));
    assert_eq!(
        entry.target,
        MenuTarget::Play {
            url: url("/movies/Up/4455/9/Up/videos")
        }
    );
    assert_eq!(fetcher.calls(&url(&format!("{}full-movie", up))), 1);
    assert_eq!(fetcher.calls(&url(&format!("{}about", up))), 1);
}

#[tokio::test]
async fn test_movie_fails_when_a_page_is_missing() {
    let fetcher = Arc::new(MockFetcher::new());
    let config = test_config(0.0);
    let builder = seeded_builder(&config, &fetcher).await;

    let result = builder.movie(&Identifier::new("/movies/Gone/1/"), "Gone").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_play_resolves_redirect() {
    let fetcher = Arc::new(MockFetcher::new());
    let config = test_config(0.0);
    let builder = seeded_builder(&config, &fetcher).await;
    let page = url("/tv/Lost/100/1/Pilot/videos");
    fetcher.page(
        page.clone(),
        r#"<html><head><meta name="video_width" content="640"><meta name="video_height" content="480"></head></html>"#,
    );

    match builder.open(&MenuTarget::Play { url: page.clone() }).await.unwrap() {
        Browse::Redirect(playback) => {
            assert_eq!(playback.video_url, format!("{}#4x3", page));
            assert!(playback.redirect_url.ends_with("&prefix=/video/fancast"));
        }
        other => panic!("expected a redirect, got {:?}", other),
    }
}
