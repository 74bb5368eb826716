//! Shared fixtures: an app over an in-memory database seeded with the
//! sample catalogue.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mint::auth::{basic_header, TICKET_COOKIE};
use mint::views::Upload;
use mint::{bootstrap, App, Credentials, Database, Request, Response, Seed, Services};
use tempfile::TempDir;

pub const BASE: &str = "test_mint";

/// An app plus the directories it serves files from.
pub struct Site {
    pub app: Arc<App>,
    pub db: Database,
    media: TempDir,
    _statics: TempDir,
}

impl Site {
    pub fn new() -> Self {
        Self::with(|app| app)
    }

    /// Build a site, letting the caller adjust the app before use.
    pub fn with(configure: impl FnOnce(App) -> App) -> Self {
        let db = Database::in_memory();
        bootstrap(&db, BASE, &Seed::sample(), "mint", false).unwrap();

        let media = TempDir::new().unwrap();
        let statics = TempDir::new().unwrap();
        fs::create_dir_all(statics.path().join("css")).unwrap();
        fs::write(statics.path().join("css/screen.css"), "body { margin: 0; }\n").unwrap();

        let services = Services::new(db.clone(), BASE, media.path(), statics.path());
        let app = configure(App::new(services).unwrap());
        Self {
            app: Arc::new(app),
            db,
            media,
            _statics: statics,
        }
    }

    pub fn media_path(&self) -> PathBuf {
        self.media.path().to_path_buf()
    }

    pub fn handle(&self, request: Request) -> Response {
        self.app.handle(&request)
    }

    pub fn get(&self, path: &str) -> Response {
        self.handle(Request::get(path))
    }

    /// Read the committed root.
    pub fn root(&self) -> mint::Root {
        let conn = self.db.connect(BASE).unwrap();
        let root = conn.root().clone();
        conn.abort();
        root
    }

    /// Log in through the form and return the cookie header to send back.
    pub fn login(&self, login: &str, password: &str) -> String {
        let response = self.handle(Request::post(
            "/login.html",
            [("login", login), ("password", password)],
        ));
        assert_eq!(response.status, 302, "login failed: {}", response.text());
        let set_cookie = response.header("set-cookie").unwrap();
        let pair = set_cookie.split(';').next().unwrap().trim().to_string();
        assert!(pair.starts_with(TICKET_COOKIE));
        pair
    }

    /// Register a plain user through the form.
    pub fn register(&self, id: &str, password: &str) {
        let email = format!("{}@example.org", id);
        let response = self.handle(Request::post(
            "/users/register.html",
            [
                ("user.id", id),
                ("user.email", email.as_str()),
                ("user.password", password),
            ],
        ));
        assert_eq!(response.status, 200);
        assert!(response.text().contains("Registered"), "{}", response.text());
    }
}

pub fn basic(login: &str, password: &str) -> String {
    basic_header(&Credentials::new(login, password))
}

/// A request authenticated as the sample admin.
pub fn as_admin(request: Request) -> Request {
    request.with_header("authorization", basic("admin", "test"))
}

pub fn upload(file_name: &str, content_type: &str, bytes: &[u8]) -> Upload {
    Upload {
        file_name: file_name.to_string(),
        content_type: Some(content_type.to_string()),
        bytes: bytes.to_vec(),
    }
}

/// Page text with the `/` entity the escaper emits turned back into a slash.
pub fn decoded(text: &str) -> String {
    text.replace("&#x2f;", "/")
}

/// Every file under `dir`, as sorted `/`-separated relative paths.
pub fn media_files(dir: &Path) -> Vec<String> {
    fn walk(dir: &Path, prefix: &str, found: &mut Vec<String>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let relative = if prefix.is_empty() {
                name
            } else {
                format!("{}/{}", prefix, name)
            };
            if entry.path().is_dir() {
                walk(&entry.path(), &relative, found);
            } else {
                found.push(relative);
            }
        }
    }
    let mut found = Vec::new();
    walk(dir, "", &mut found);
    found.sort();
    found
}
