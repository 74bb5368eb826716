//! Authentication challenges and ACL decisions.

use mint::auth::{challenge, REALM};
use mint::Request;

use crate::support::{as_admin, basic, Site};

#[test]
fn anonymous_add_is_challenged() {
    let site = Site::new();
    let response = site.handle(Request::post(
        "/videos/add_video.html",
        [("video.name", "sneaky")],
    ));
    assert_eq!(response.status, 401);
    assert_eq!(response.header("www-authenticate"), Some(challenge().as_str()));
    assert!(challenge().contains(REALM));
    assert!(!site.root().videos.contains("sneaky"));
}

#[test]
fn basic_credentials_are_accepted() {
    let site = Site::new();
    let response = site.handle(as_admin(Request::post(
        "/videos/add_video.html",
        [("video.name", "testvid1")],
    )));
    assert_eq!(response.status, 200);
    assert!(response.text().contains("successful"));
    assert!(response.text().contains("logged in as"));
}

#[test]
fn wrong_password_stays_anonymous() {
    let site = Site::new();
    let response = site.handle(
        Request::get("/videos/add_video.html").with_header("authorization", basic("admin", "nope")),
    );
    assert_eq!(response.status, 401);

    let malformed = site.handle(
        Request::get("/videos/add_video.html").with_header("authorization", "Basic !!!"),
    );
    assert_eq!(malformed.status, 401);
}

#[test]
fn ticket_login_grants_admin_views() {
    let site = Site::new();
    let cookie = site.login("admin", "test");
    let response = site.handle(
        Request::get("/set_default_video.html").with_header("cookie", cookie.as_str()),
    );
    assert_eq!(response.status, 200);

    let stale = site.handle(
        Request::get("/set_default_video.html").with_header("cookie", "auth_tkt=forged"),
    );
    assert_eq!(stale.status, 401);
}

#[test]
fn plain_users_are_forbidden_admin_work() {
    let site = Site::new();
    site.register("bob", "secret");
    let as_bob = |request: Request| request.with_header("authorization", basic("bob", "secret"));

    let add = site.handle(as_bob(Request::post(
        "/videos/add_video.html",
        [("video.name", "bobs")],
    )));
    assert_eq!(add.status, 403);
    assert!(add.header("www-authenticate").is_none());
    assert!(!site.root().videos.contains("bobs"));

    assert_eq!(site.handle(as_bob(Request::get("/set_default_video.html"))).status, 403);
    assert_eq!(site.handle(as_bob(Request::get("/channels/feature/edit.html"))).status, 403);

    // Viewing stays open.
    assert_eq!(site.handle(as_bob(Request::get("/videos/intro"))).status, 200);
}

#[test]
fn profiles_are_private() {
    let site = Site::new();
    site.register("bob", "secret");

    assert_eq!(site.get("/users/admin/profile.html").status, 401);

    let as_bob = |path: &str| {
        site.handle(Request::get(path).with_header("authorization", basic("bob", "secret")))
    };
    assert_eq!(as_bob("/users/admin/profile.html").status, 403);
    assert_eq!(as_bob("/users/admin/edit.html").status, 403);

    let own = as_bob("/users/bob/profile.html");
    assert_eq!(own.status, 200);
    assert!(own.text().contains("bob@example.org"));

    let admin = site.handle(as_admin(Request::get("/users/bob/profile.html")));
    assert_eq!(admin.status, 200);
}

#[test]
fn registration_is_open_to_anyone() {
    let site = Site::new();
    let form = site.get("/users/register.html");
    assert_eq!(form.status, 200);
    assert!(form.text().contains("name=\"user.id\""));
}

#[test]
fn denied_requests_do_not_commit() {
    let site = Site::new();
    let version = site.db.version(crate::support::BASE).unwrap();
    site.handle(Request::post("/set_default_video.html", [("video.name", "oil_on_ice")]));
    assert_eq!(site.db.version(crate::support::BASE).unwrap(), version);
    assert_eq!(site.root().default_video_key(), None);
    assert_eq!(site.db.open_connections(), 0);
}
