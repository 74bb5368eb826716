//! Form views: adding videos, uploads, registration, login and editing.

use std::fs;

use mint::model::Member;
use mint::Request;

use crate::support::{as_admin, decoded, media_files, upload, Site, BASE};

#[test]
fn add_video_then_feature_it() {
    let site = Site::new();
    let form = site.handle(as_admin(Request::get("/videos/add_video.html")));
    assert_eq!(form.status, 200);
    assert!(form.text().contains("name=\"video.name\""));

    let response = site.handle(as_admin(Request::post(
        "/videos/add_video.html",
        [
            ("video.name", "testvid1"),
            ("video.description", "A test"),
            ("video.tags", "foo, bar"),
        ],
    )));
    assert_eq!(response.status, 200);
    assert!(response.text().contains("successful"));
    assert!(response.text().contains("<a href=\"/videos/testvid1\">testvid1</a>"));

    assert_eq!(site.get("/videos/testvid1").status, 200);
    assert!(site
        .get("/tags/foo")
        .text()
        .contains("<a href=\"/videos/testvid1\">testvid1</a>"));

    let current = site.handle(as_admin(Request::get("/set_default_video.html")));
    assert!(current
        .text()
        .contains("name=\"video.name.current\" value=\"intro\""));

    let response = site.handle(as_admin(Request::post(
        "/set_default_video.html",
        [("video.name", "testvid1")],
    )));
    assert_eq!(response.status, 200);
    assert!(response.text().contains("Default video set to testvid1"));
    assert!(site
        .get("/")
        .text()
        .contains("<div class=\"videoplayer\" id=\"testvid1\">"));
}

#[test]
fn colliding_titles_get_suffixed_keys() {
    let site = Site::new();
    for _ in 0..2 {
        let response = site.handle(as_admin(Request::post(
            "/videos/add_video.html",
            [("video.name", "My Video")],
        )));
        assert!(response.text().contains("successful"));
    }
    let root = site.root();
    assert!(root.videos.contains("my_video"));
    assert!(root.videos.contains("my_video_001"));
    assert_eq!(root.videos.get("my_video_001").unwrap().title(), "My Video");
}

#[test]
fn add_video_requires_a_name() {
    let site = Site::new();
    let version = site.db.version(BASE).unwrap();
    let response = site.handle(as_admin(Request::post(
        "/videos/add_video.html",
        [("video.description", "nameless")],
    )));
    assert_eq!(response.status, 200);
    assert!(response.text().contains("video.name is required"));
    assert!(response.text().contains("value=\"nameless\""));
    assert_eq!(site.db.version(BASE).unwrap(), version);
}

#[test]
fn unknown_default_video_is_reported() {
    let site = Site::new();
    let response = site.handle(as_admin(Request::post(
        "/set_default_video.html",
        [("video.name", "flibble")],
    )));
    assert_eq!(response.status, 200);
    assert!(response.text().contains("No video named flibble"));
    assert_eq!(site.root().default_video_key(), None);
}

#[test]
fn uploaded_encode_is_served_and_syndicated() {
    let site = Site::new();
    let request = as_admin(Request::post(
        "/videos/intro/upload.html",
        [("encode.format", "mp4"), ("encode.width", "640"), ("encode.height", "360")],
    ))
    .with_file("encode.file", upload("intro.mp4", "video/mp4", b"not really a movie"));
    let response = site.handle(request);
    assert_eq!(response.status, 200, "{}", response.text());
    assert!(response.text().contains("Upload successful"));

    let stored = site.media_path().join("intro").join("mp4.mp4");
    assert_eq!(fs::read(stored).unwrap(), b"not really a movie");

    let root = site.root();
    let encode = root.videos.get("intro").unwrap().encode("mp4").unwrap();
    assert_eq!(encode.path, "intro/mp4.mp4");
    assert_eq!(encode.meta.size, 18);
    assert_eq!(encode.meta.width, Some(640));

    let page = decoded(&site.get("/videos/intro").text());
    assert!(page.contains("<a href=\"/encodes/intro/mp4.mp4\" type=\"video/mp4\">mp4</a>"));

    let file = site.get("/encodes/intro/mp4.mp4");
    assert_eq!(file.status, 200);
    assert_eq!(file.header("content-type"), Some("video/mp4"));
    assert_eq!(file.body, b"not really a movie");

    let feed = decoded(
        &site
            .handle(Request::get("/podcast.xml").with_header("host", "mint.test"))
            .text(),
    );
    assert!(feed.contains(
        "<enclosure url=\"http://mint.test/encodes/intro/mp4.mp4\" length=\"18\" type=\"video/mp4\"/>"
    ));
}

#[test]
fn upload_without_file_redisplays_form() {
    let site = Site::new();
    let response = site.handle(as_admin(Request::post(
        "/videos/intro/upload.html",
        [("encode.format", "mp4")],
    )));
    assert_eq!(response.status, 200);
    assert!(response.text().contains("encode.file is required"));
    assert_eq!(site.root().videos.get("intro").unwrap().encodes().count(), 0);
}

#[test]
fn register_then_login_and_out() {
    let site = Site::new();
    site.register("bob", "secret");
    assert!(site.root().users.contains("bob"));

    let failed = site.handle(Request::post(
        "/login.html",
        [("login", "bob"), ("password", "wrong")],
    ));
    assert_eq!(failed.status, 200);
    assert!(failed.text().contains("Login failed"));
    assert!(failed.header("set-cookie").is_none());

    let cookie = site.login("bob", "secret");
    let home = site.handle(Request::get("/").with_header("cookie", cookie.as_str()));
    let body = home.text();
    assert!(body.contains("logged in as"));
    assert!(body.contains(">bob</a>"));
    assert!(body.contains("logout"));

    let logout = site.handle(Request::get("/logout.html").with_header("cookie", cookie.as_str()));
    assert_eq!(logout.status, 302);
    assert_eq!(logout.header("location"), Some("/"));
    assert!(logout.header("set-cookie").unwrap().contains("Max-Age=0"));

    let after = site.handle(Request::get("/").with_header("cookie", cookie.as_str()));
    assert!(!after.text().contains("logout"));
}

#[test]
fn register_rejects_taken_ids() {
    let site = Site::new();
    let response = site.handle(Request::post(
        "/users/register.html",
        [
            ("user.id", "admin"),
            ("user.email", "other@mint.com"),
            ("user.password", "x"),
        ],
    ));
    assert_eq!(response.status, 200);
    assert!(response.text().contains("The id admin is already taken"));
    assert_eq!(site.root().users.get("admin").unwrap().email(), "admin@mint.com");
}

#[test]
fn register_requires_every_field() {
    let site = Site::new();
    let response = site.handle(Request::post("/users/register.html", [("user.id", "carol")]));
    assert_eq!(response.status, 200);
    assert!(response.text().contains("are required"));
    assert!(!site.root().users.contains("carol"));
}

#[test]
fn users_edit_their_own_profile() {
    let site = Site::new();
    site.register("bob", "secret");
    let cookie = site.login("bob", "secret");

    let response = site.handle(
        Request::post("/users/bob/edit.html", [("user.email", "bob@mint.com")])
            .with_header("cookie", cookie.as_str()),
    );
    assert_eq!(response.status, 200);
    assert!(response.text().contains("Profile saved"));
    assert_eq!(site.root().users.get("bob").unwrap().email(), "bob@mint.com");

    let bad = site.handle(
        Request::post("/users/bob/edit.html", [("user.email", "nope")])
            .with_header("cookie", cookie.as_str()),
    );
    assert!(bad.text().contains("not an email address"));
    assert_eq!(site.root().users.get("bob").unwrap().email(), "bob@mint.com");
}

#[test]
fn editing_a_virtual_channel_stores_it() {
    let site = Site::new();
    let response = site.handle(as_admin(Request::post(
        "/channels/feature/edit.html",
        [
            ("channel.title", "Features"),
            ("channel.description", "The best of mint"),
            ("channel.pre_roll", "intro"),
            ("channel.post_roll", ""),
        ],
    )));
    assert_eq!(response.status, 200);
    assert!(response.text().contains("Channel saved"));

    let root = site.root();
    assert!(root.channels.is_stored("feature"));
    let channel = root.channels.lookup("feature");
    assert_eq!(channel.title(), "Features");
    assert_eq!(channel.pre_roll(), Some("intro"));
    assert_eq!(channel.post_roll(), None);

    let page = site.get("/channels/feature").text().into_owned();
    assert!(page.contains("pre-roll: <a href=\"/videos/intro\">Intro</a>"));
    assert!(page.contains("The best of mint"));
    assert!(site.get("/channels/").text().contains("/channels/feature"));
}

#[test]
fn channel_stings_must_name_videos() {
    let site = Site::new();
    let response = site.handle(as_admin(Request::post(
        "/channels/feature/edit.html",
        [("channel.pre_roll", "flibble")],
    )));
    assert_eq!(response.status, 200);
    assert!(response.text().contains("channel.pre_roll names no video"));
    assert!(!site.root().channels.is_stored("feature"));
}

#[test]
fn banners_carry_adverts_onto_the_home_page() {
    let site = Site::new();
    let response = site.handle(as_admin(Request::post(
        "/banners/add.html",
        [
            ("adspace.title", "Sidebar"),
            ("adspace.width", "120"),
            ("adspace.height", "600"),
            ("adspace.formats", "image/png, image/gif"),
        ],
    )));
    assert_eq!(response.status, 200);
    assert!(response.text().contains("<a href=\"/banners/sidebar\">sidebar</a>"));

    let request = as_admin(Request::post(
        "/banners/sidebar/edit.html",
        [("advert.title", "Donate"), ("advert.link", "http://example.org")],
    ))
    .with_file("advert.file", upload("donate.png", "image/png", b"\x89PNG"));
    let response = site.handle(request);
    assert_eq!(response.status, 200);
    assert!(response.text().contains("Advert donate added"));

    let space = decoded(&site.get("/banners/sidebar").text());
    assert!(space.contains("120x600, formats: image/png, image/gif"));
    assert!(space.contains("<a href=\"/banners/sidebar/donate\">Donate</a> (image/png)"));

    let advert = site.get("/banners/sidebar/donate");
    assert_eq!(advert.status, 200);
    assert_eq!(advert.header("content-type"), Some("image/png"));
    assert_eq!(advert.body, b"\x89PNG");

    let home = decoded(&site.get("/").text());
    assert!(home.contains("<a href=\"http://example.org\"><img src=\"/banners/sidebar/donate\""));
}

#[test]
fn adverts_of_the_wrong_format_are_refused() {
    let site = Site::new();
    site.handle(as_admin(Request::post(
        "/banners/add.html",
        [("adspace.title", "Top"), ("adspace.formats", "image/png")],
    )));
    let request = as_admin(Request::post("/banners/top/edit.html", [("advert.title", "Flash")]))
        .with_file(
            "advert.file",
            upload("ad.swf", "application/x-shockwave-flash", b"FWS"),
        );
    let response = site.handle(request);
    assert_eq!(response.status, 200);
    assert!(response.text().contains("is not accepted"));
    assert!(site.root().banners.get("top").unwrap().adverts().is_empty());
}

#[test]
fn titles_with_url_punctuation_get_reachable_keys() {
    let site = Site::new();
    for title in ["Café Crème", "What? Now"] {
        let response = site.handle(as_admin(Request::post(
            "/videos/add_video.html",
            [("video.name", title)],
        )));
        assert!(response.text().contains("successful"), "{}", response.text());
    }
    let root = site.root();
    assert!(root.videos.contains("café_crème"));
    assert!(root.videos.contains("what_now"));

    let listing = site.get("/videos/").text().into_owned();
    assert!(listing.contains("<a href=\"/videos/caf%C3%A9_cr%C3%A8me\">Café Crème</a>"));
    assert!(listing.contains("<a href=\"/videos/what_now\">What? Now</a>"));

    let page = site.get("/videos/caf%C3%A9_cr%C3%A8me");
    assert_eq!(page.status, 200);
    assert!(page.text().contains("Café Crème"));
    assert_eq!(site.get("/videos/what_now").status, 200);
}

#[test]
fn encodes_are_stored_by_format() {
    let site = Site::new();
    let post = |format: &str, file_name: &str, bytes: &[u8]| {
        let request = as_admin(Request::post(
            "/videos/intro/upload.html",
            [("encode.format", format)],
        ))
        .with_file("encode.file", upload(file_name, "application/octet-stream", bytes));
        let response = site.handle(request);
        assert!(response.text().contains("Upload successful"), "{}", response.text());
    };
    post("mp4", "clip.bin", b"mp4 bytes");
    post("ogv", "clip.bin", b"ogv bytes");
    assert_eq!(
        media_files(&site.media_path()),
        vec!["intro/mp4.bin".to_string(), "intro/ogv.bin".to_string()]
    );
    assert_eq!(site.get("/encodes/intro/mp4.bin").body, b"mp4 bytes");
    assert_eq!(site.get("/encodes/intro/ogv.bin").body, b"ogv bytes");

    post("mp4", "new.mp4", b"better mp4");
    assert_eq!(
        media_files(&site.media_path()),
        vec!["intro/mp4.mp4".to_string(), "intro/ogv.bin".to_string()]
    );
    assert_eq!(site.get("/encodes/intro/mp4.bin").status, 404);
    let root = site.root();
    let intro = root.videos.get("intro").unwrap();
    assert_eq!(intro.encode("mp4").unwrap().path, "intro/mp4.mp4");
    assert_eq!(intro.encodes().count(), 2);
}

#[test]
fn upload_refuses_formats_that_are_not_plain_tokens() {
    let site = Site::new();
    let request = as_admin(Request::post(
        "/videos/intro/upload.html",
        [("encode.format", "../mp4")],
    ))
    .with_file("encode.file", upload("intro.mp4", "video/mp4", b"movie"));
    let response = site.handle(request);
    assert_eq!(response.status, 200);
    assert!(response.text().contains("encode.format may only contain"));
    assert_eq!(site.root().videos.get("intro").unwrap().encodes().count(), 0);
    assert!(media_files(&site.media_path()).is_empty());
}

#[test]
fn rejected_adverts_leave_the_ad_space_untouched() {
    let site = Site::new();
    site.handle(as_admin(Request::post(
        "/banners/add.html",
        [
            ("adspace.title", "Top"),
            ("adspace.width", "468"),
            ("adspace.height", "60"),
            ("adspace.formats", "image/png"),
        ],
    )));
    let version = site.db.version(BASE).unwrap();

    let request = as_admin(Request::post(
        "/banners/top/edit.html",
        [
            ("adspace.width", "728"),
            ("adspace.formats", "image/png, image/gif"),
            ("advert.title", "Flash"),
        ],
    ))
    .with_file("advert.file", upload("ad.swf", "application/x-shockwave-flash", b"FWS"));
    let response = site.handle(request);
    assert_eq!(response.status, 200);
    assert!(response.text().contains("nothing was saved"));

    assert_eq!(site.db.version(BASE).unwrap(), version);
    let root = site.root();
    let space = root.banners.get("top").unwrap();
    assert_eq!(space.dimensions(), (468, 60));
    assert_eq!(space.formats().to_vec(), vec!["image/png".to_string()]);
    assert!(space.adverts().is_empty());
}
