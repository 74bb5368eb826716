use std::borrow::Cow;
use std::collections::HashMap;

use crate::auth::{parse_cookies, TICKET_COOKIE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A file sent in a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A transport-independent request.
///
/// Query parameters (GET) or the urlencoded/multipart body (POST) are
/// flattened into `form`; uploaded files are kept in `files` by field
/// name. Header names are lower-case.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub form: HashMap<String, String>,
    pub files: HashMap<String, Upload>,
    pub headers: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            form: HashMap::new(),
            files: HashMap::new(),
            headers: HashMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post<I, K, V>(path: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut request = Self::new(Method::Post, path);
        request.form = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        request
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_file(mut self, field: &str, upload: Upload) -> Self {
        self.files.insert(field.to_string(), upload);
        self
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::Post
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|value| value.as_str())
    }

    /// A trimmed, non-empty form field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn file(&self, name: &str) -> Option<&Upload> {
        self.files.get(name)
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.header("cookie")
            .and_then(|header| parse_cookies(header).remove(name))
    }

    /// The login ticket cookie, if present and non-empty.
    pub fn ticket(&self) -> Option<String> {
        self.cookie(TICKET_COOKIE).filter(|ticket| !ticket.is_empty())
    }
}

/// A transport-independent response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body: body.into(),
        }
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self::new(200, "text/html; charset=utf-8", body.into())
    }

    pub fn redirect(status: u16, location: &str) -> Self {
        Self::new(status, "text/plain; charset=utf-8", format!("see {}", location))
            .with_header("location", location)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
