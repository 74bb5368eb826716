//! Read-only pages: home, videos, tags, channels, feeds and files.

use mint::model::Member;

use crate::support::{decoded, Site};

#[test]
fn home_page_features_default_video() {
    let site = Site::new();
    let response = site.get("/");
    assert_eq!(response.status, 200);
    assert_eq!(response.header("content-type"), Some("text/html; charset=utf-8"));

    let body = response.text();
    assert!(body.contains("home"));
    assert!(body.contains("<div class=\"videoplayer\" id=\"intro\">"));
    assert!(body.contains("id=\"intro-description\""));
    assert!(body.contains("<a href=\"/videos/toxic_sperm\">Toxic Sperm</a>"));
    assert!(body.contains("id=\"ad-section\""));
    assert!(body.contains("/login.html"));
}

#[test]
fn index_html_matches_root() {
    let site = Site::new();
    assert_eq!(site.get("/index.html").body, site.get("/").body);
}

#[test]
fn video_page_links_tags() {
    let site = Site::new();
    let response = site.get("/videos/oil_on_ice");
    assert_eq!(response.status, 200);

    let body = response.text();
    assert!(body.contains("<div class=\"videoplayer\" id=\"oil_on_ice\">"));
    assert!(body.contains("id=\"oil_on_ice-description\""));
    for tag in ["feature", "arctic", "water"] {
        assert!(body.contains(&format!("<a href=\"/tags/{0}\">{0}</a>", tag)));
    }
    // Upload link is for logged-in users only.
    assert!(!body.contains("upload.html"));
}

#[test]
fn video_list() {
    let site = Site::new();
    let body = site.get("/videos/").text().into_owned();
    assert!(body.contains("<a href=\"/videos/intro\">Intro</a>"));
    assert!(body.contains("<a href=\"/videos/oil_on_ice\">Oil on Ice</a>"));
}

#[test]
fn unknown_video_is_not_found() {
    let site = Site::new();
    assert_eq!(site.get("/videos/flibble").status, 404);
    assert_eq!(site.get("/videos/intro/flibble.html").status, 404);
}

#[test]
fn tag_page_lists_tagged_videos() {
    let site = Site::new();
    let response = site.get("/tags/arctic");
    assert_eq!(response.status, 200);
    let body = response.text();
    assert!(body.contains("<a href=\"/videos/oil_on_ice\">Oil on Ice</a>"));
    assert!(!body.contains("Toxic Sperm"));

    let empty = site.get("/tags/nothing");
    assert_eq!(empty.status, 200);
    assert!(!empty.text().contains("/videos/intro\">"));
}

#[test]
fn legacy_video_urls_redirect() {
    let site = Site::new();
    let response = site.get("/intro");
    assert_eq!(response.status, 301);
    assert_eq!(response.header("location"), Some("/videos/intro"));

    assert_eq!(site.get("/flibble").status, 404);
    assert_eq!(site.get("/intro/extra").status, 404);
}

#[test]
fn virtual_channel_renders_without_being_stored() {
    let site = Site::new();
    let response = site.get("/channels/feature");
    assert_eq!(response.status, 200);
    let body = response.text();
    assert!(body.contains("<a href=\"/videos/intro\">Intro</a>"));
    assert!(body.contains("<a href=\"/videos/oil_on_ice\">Oil on Ice</a>"));

    let root = site.root();
    assert!(!root.channels.is_stored("feature"));
    assert!(root.channels.is_empty());
}

#[test]
fn channel_list_shows_stored_channels_only() {
    let site = Site::new();
    site.get("/channels/feature");
    let body = site.get("/channels/").text().into_owned();
    assert!(!body.contains("/channels/feature"));
}

#[test]
fn static_files_by_route_and_by_view() {
    let site = Site::new();
    for path in ["/static/css/screen.css", "/@@static/css/screen.css"] {
        let response = site.get(path);
        assert_eq!(response.status, 200, "{}", path);
        assert_eq!(response.header("content-type"), Some("text/css"));
        assert_eq!(response.text(), "body { margin: 0; }\n");
    }
    assert_eq!(site.get("/static/css/missing.css").status, 404);
    assert_eq!(site.get("/static/../Cargo.toml").status, 404);
}

#[test]
fn podcast_feed_lists_videos() {
    let site = Site::new();
    let response = site.handle(mint::Request::get("/podcast.xml").with_header("host", "mint.test"));
    assert_eq!(response.status, 200);
    assert_eq!(
        response.header("content-type"),
        Some("application/rss+xml; charset=utf-8")
    );

    let feed = decoded(&response.text());
    assert!(feed.contains("<rss version=\"2.0\">"));
    assert!(feed.contains("<title>Oil on Ice</title>"));
    assert!(feed.contains("<link>http://mint.test/videos/oil_on_ice</link>"));
    assert!(feed.contains("<category>arctic</category>"));
    assert!(!feed.contains("<enclosure"));
}

#[test]
fn banners_list_is_public() {
    let site = Site::new();
    let response = site.get("/banners/");
    assert_eq!(response.status, 200);
    assert!(response.text().contains("class=\"banners\""));
}

#[test]
fn reads_leave_the_database_alone() {
    let site = Site::new();
    let version = site.db.version(crate::support::BASE).unwrap();
    for path in ["/", "/videos/intro", "/tags/feature", "/channels/feature", "/podcast.xml"] {
        site.get(path);
    }
    assert_eq!(site.db.version(crate::support::BASE).unwrap(), version);
    assert_eq!(site.db.open_connections(), 0);
    assert_eq!(site.root().videos.get("intro").unwrap().title(), "Intro");
}
