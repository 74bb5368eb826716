//! HTTP transport integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

use std::sync::Arc;

use reqwest::header::{COOKIE, LOCATION, SET_COOKIE, WWW_AUTHENTICATE};
use reqwest::multipart;
use reqwest::redirect::Policy;

use crate::support::Site;

/// Bind to port 0 and return the actual address.
async fn start_server(site: &Site) -> String {
    let app = Arc::clone(&site.app);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, mint::http::router(app)).await.unwrap();
    });
    format!("http://{addr}")
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn home_page() {
    let site = Site::new();
    let base = start_server(&site).await;

    let resp = client().get(format!("{base}/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "text/html; charset=utf-8"
    );
    let body = resp.text().await.unwrap();
    assert!(body.contains("home"));
    assert!(body.contains("id=\"ad-section\""));
}

#[tokio::test]
async fn legacy_redirect_and_missing_pages() {
    let site = Site::new();
    let base = start_server(&site).await;
    let client = client();

    let resp = client.get(format!("{base}/intro")).send().await.unwrap();
    assert_eq!(resp.status(), 301);
    assert_eq!(resp.headers()[LOCATION], "/videos/intro");

    let resp = client.get(format!("{base}/flibble")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn tag_route_from_query_free_get() {
    let site = Site::new();
    let base = start_server(&site).await;

    let body = client()
        .get(format!("{base}/tags/feature"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("<a href=\"/videos/oil_on_ice\">Oil on Ice</a>"));
}

#[tokio::test]
async fn anonymous_post_is_challenged() {
    let site = Site::new();
    let base = start_server(&site).await;

    let resp = client()
        .post(format!("{base}/videos/add_video.html"))
        .form(&[("video.name", "testvid1")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    assert_eq!(resp.headers()[WWW_AUTHENTICATE], "Basic realm=\"Mint\"");
}

#[tokio::test]
async fn form_post_with_basic_auth() {
    let site = Site::new();
    let base = start_server(&site).await;
    let client = client();

    let resp = client
        .post(format!("{base}/videos/add_video.html"))
        .basic_auth("admin", Some("test"))
        .form(&[("video.name", "testvid1"), ("video.tags", "foo")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.text().await.unwrap().contains("successful"));

    let resp = client.get(format!("{base}/videos/testvid1")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(site.root().videos.contains("testvid1"));
}

#[tokio::test]
async fn encoded_paths_reach_their_video() {
    let site = Site::new();
    let base = start_server(&site).await;
    let client = client();

    let resp = client
        .post(format!("{base}/videos/add_video.html"))
        .basic_auth("admin", Some("test"))
        .form(&[("video.name", "Café Crème")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(site.root().videos.contains("café_crème"));

    // The client sends this as /videos/caf%C3%A9_cr%C3%A8me.
    let resp = client.get(format!("{base}/videos/café_crème")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.text().await.unwrap().contains("Café Crème"));
}

#[tokio::test]
async fn login_cookie_round_trip() {
    let site = Site::new();
    let base = start_server(&site).await;
    let client = client();

    let resp = client
        .post(format!("{base}/login.html"))
        .form(&[("login", "admin"), ("password", "test")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 302);
    let cookie = resp.headers()[SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let body = client
        .get(format!("{base}/"))
        .header(COOKIE, cookie.as_str())
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("logged in as"));
    assert!(body.contains("logout"));
}

#[tokio::test]
async fn multipart_upload_is_served_back() {
    let site = Site::new();
    let base = start_server(&site).await;
    let client = client();

    let file = multipart::Part::bytes(b"fake ogg".to_vec())
        .file_name("intro.ogv")
        .mime_str("video/ogg")
        .unwrap();
    let form = multipart::Form::new()
        .text("encode.format", "ogv")
        .part("encode.file", file);
    let resp = client
        .post(format!("{base}/videos/intro/upload.html"))
        .basic_auth("admin", Some("test"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .get(format!("{base}/encodes/intro/ogv.ogv"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "video/ogg");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"fake ogg");
}

#[tokio::test]
async fn unsupported_methods_are_rejected() {
    let site = Site::new();
    let base = start_server(&site).await;

    let resp = client().put(format!("{base}/")).send().await.unwrap();
    assert_eq!(resp.status(), 405);
}
