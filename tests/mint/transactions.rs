//! Commit behaviour of the request pipeline.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mint::security::Permission;
use mint::traversal::NodeKind;
use mint::views::{ViewContext, ViewError, ViewFor, ViewRegistry};
use mint::{bootstrap, App, Database, Request, Response, Seed, Services};
use tempfile::TempDir;

use crate::support::{as_admin, media_files, upload, Site, BASE};

/// A view that changes the title after a rival commit lands on its
/// first `rivals` calls.
fn contested(calls: Arc<AtomicUsize>, rivals: usize) -> ViewRegistry {
    ViewRegistry::standard().view(
        ViewFor::Kind(NodeKind::Root),
        "retitle.html",
        Permission::View,
        move |ctx: &mut ViewContext<'_>| -> Result<Response, ViewError> {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            if call < rivals {
                let services = ctx.services();
                let mut rival = services.db.connect(&services.base)?;
                rival
                    .root_mut()
                    .videos
                    .add_video(&format!("Rival {}", call), "", ["rival"])?;
                rival.commit()?;
            }
            ctx.root_mut().title = "Retitled".to_string();
            Ok(Response::html("Retitled"))
        },
    )
}

#[test]
fn conflicting_commit_reruns_the_request() {
    let calls = Arc::new(AtomicUsize::new(0));
    let views = contested(calls.clone(), 1);
    let site = Site::with(|app| app.with_views(views));

    let response = site.get("/retitle.html");
    assert_eq!(response.status, 200);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let root = site.root();
    assert_eq!(root.title, "Retitled");
    assert!(root.videos.contains("rival_0"));
    assert_eq!(site.db.open_connections(), 0);
}

#[test]
fn exhausted_retries_report_the_conflict() {
    let calls = Arc::new(AtomicUsize::new(0));
    let views = contested(calls.clone(), usize::MAX);
    let site = Site::with(|app| app.with_retry_attempts(2).with_views(views));

    let response = site.get("/retitle.html");
    assert_eq!(response.status, 409);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let root = site.root();
    assert_eq!(root.title, "mint");
    assert!(root.videos.contains("rival_0"));
    assert!(root.videos.contains("rival_1"));
    assert_eq!(site.db.open_connections(), 0);
}

/// The standard upload view, run after a rival commit on its first
/// `rivals` calls.
fn contested_upload(rivals: usize) -> ViewRegistry {
    let standard = ViewRegistry::standard();
    let calls = AtomicUsize::new(0);
    ViewRegistry::standard().view(
        ViewFor::Kind(NodeKind::Video),
        "upload.html",
        Permission::Edit,
        move |ctx: &mut ViewContext<'_>| -> Result<Response, ViewError> {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            if call < rivals {
                let services = ctx.services();
                let mut rival = services.db.connect(&services.base)?;
                rival.root_mut().title = format!("Rival {}", call);
                rival.commit()?;
            }
            let upload = standard
                .lookup(NodeKind::Video, "upload.html")
                .ok_or_else(|| ViewError::NotFound("upload.html".to_string()))?;
            upload.call(ctx)
        },
    )
}

fn upload_request() -> Request {
    as_admin(Request::post(
        "/videos/intro/upload.html",
        [("encode.format", "mp4")],
    ))
    .with_file("encode.file", upload("intro.mp4", "video/mp4", b"movie"))
}

#[test]
fn aborted_uploads_leave_no_files() {
    let site = Site::with(|app| app.with_retry_attempts(2).with_views(contested_upload(usize::MAX)));

    let response = site.handle(upload_request());
    assert_eq!(response.status, 409);
    assert!(media_files(&site.media_path()).is_empty());
    assert_eq!(site.root().videos.get("intro").unwrap().encodes().count(), 0);
}

#[test]
fn retried_uploads_publish_one_file() {
    let site = Site::with(|app| app.with_views(contested_upload(1)));

    let response = site.handle(upload_request());
    assert_eq!(response.status, 200, "{}", response.text());
    assert_eq!(media_files(&site.media_path()), vec!["intro/mp4.mp4".to_string()]);
    let root = site.root();
    assert_eq!(root.title, "Rival 0");
    assert_eq!(root.videos.get("intro").unwrap().encode("mp4").unwrap().path, "intro/mp4.mp4");
}

#[test]
fn only_changed_requests_commit() {
    let site = Site::new();
    let before = site.db.version(BASE).unwrap();

    site.get("/videos/intro");
    site.handle(as_admin(Request::get("/videos/add_video.html")));
    assert_eq!(site.db.version(BASE).unwrap(), before);

    site.handle(as_admin(Request::post(
        "/videos/add_video.html",
        [("video.name", "New One")],
    )));
    assert_eq!(site.db.version(BASE).unwrap(), before + 1);
}

#[test]
fn failed_views_roll_back() {
    let views = ViewRegistry::standard().view(
        ViewFor::Kind(NodeKind::Root),
        "half.html",
        Permission::View,
        |ctx: &mut ViewContext<'_>| -> Result<Response, ViewError> {
            ctx.root_mut().title = "Half done".to_string();
            Err(ViewError::BadRequest("gave up".to_string()))
        },
    );
    let site = Site::with(|app| app.with_views(views));
    let before = site.db.version(BASE).unwrap();

    let response = site.get("/half.html");
    assert_eq!(response.status, 400);
    assert!(response.text().contains("gave up"));
    assert_eq!(site.db.version(BASE).unwrap(), before);
    assert_eq!(site.root().title, "mint");
}

#[test]
fn file_database_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mint.db");
    let media = dir.path().join("media");
    let statics = dir.path().join("static");

    {
        let db = Database::open_file(&path).unwrap();
        assert!(bootstrap(&db, BASE, &Seed::sample(), "mint", false).unwrap());
        let app = App::new(Services::new(db, BASE, &media, &statics)).unwrap();
        let response = app.handle(&as_admin(Request::post(
            "/videos/add_video.html",
            [("video.name", "Persisted")],
        )));
        assert_eq!(response.status, 200);
    }

    let db = Database::open_file(&path).unwrap();
    assert!(!bootstrap(&db, BASE, &Seed::sample(), "mint", false).unwrap());
    let app = App::new(Services::new(db, BASE, &media, &statics)).unwrap();
    let response = app.handle(&Request::get("/videos/persisted"));
    assert_eq!(response.status, 200);
    assert!(response.text().contains("Persisted"));
}
