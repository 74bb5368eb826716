//! HTTP transport for mint - maps HTTP requests onto `App::handle`.
//!
//! Requires the `http` feature. Uses axum; every path goes to a single
//! fallback handler because resolution happens in the app itself. Paths
//! are passed on still percent-encoded; the app decodes each segment.
//!
//! GET query strings and urlencoded POST bodies become `Request::form`.
//! Multipart bodies are split into text fields and uploaded files.
//!
//! ## Example
//!
//! ```ignore
//! let app = Arc::new(App::from_config(&config, db)?);
//!
//! // Compose with other axum routes
//! let router = mint::http::router(app.clone());
//!
//! // Or serve directly
//! mint::http::serve(app, "127.0.0.1:6543").await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRequest, Multipart, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::{Form, Router};

use crate::app::App;
use crate::views::{Method, Request, Response, Upload};

/// Build an axum `Router` that hands every request to `app`.
pub fn router(app: Arc<App>) -> Router {
    Router::new().fallback(handle).with_state(app)
}

/// Serve the app over HTTP at the given address (e.g. `"127.0.0.1:6543"`).
pub async fn serve(app: Arc<App>, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "serving mint");
    axum::serve(listener, router(app)).await
}

async fn handle(State(app): State<Arc<App>>, request: axum::extract::Request) -> axum::response::Response {
    let request = match into_request(request).await {
        Ok(request) => request,
        Err(response) => return response,
    };
    match tokio::task::spawn_blocking(move || app.handle(&request)).await {
        Ok(response) => response.into_response(),
        Err(err) => {
            tracing::error!(%err, "request handler panicked");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn into_request(
    request: axum::extract::Request,
) -> Result<Request, axum::response::Response> {
    let method = request.method();
    let method = if *method == axum::http::Method::GET || *method == axum::http::Method::HEAD {
        Method::Get
    } else if *method == axum::http::Method::POST {
        Method::Post
    } else {
        return Err(StatusCode::METHOD_NOT_ALLOWED.into_response());
    };
    let path = request.uri().path().to_string();
    let headers = header_map(request.headers());
    let mut converted = Request::new(method, path);
    converted.headers = headers;

    let multipart = converted
        .header("content-type")
        .is_some_and(|value| value.starts_with("multipart/form-data"));
    if multipart {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(IntoResponse::into_response)?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(IntoResponse::into_response)?
        {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(IntoResponse::into_response)?;
            match file_name {
                Some(file_name) if !file_name.is_empty() => {
                    converted.files.insert(
                        name,
                        Upload {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
                Some(_) => {}
                None => {
                    converted
                        .form
                        .insert(name, String::from_utf8_lossy(&bytes).into_owned());
                }
            }
        }
    } else {
        let has_body_form = method == Method::Get
            || converted
                .header("content-type")
                .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));
        if has_body_form {
            let Form(form) = Form::<HashMap<String, String>>::from_request(request, &())
                .await
                .map_err(IntoResponse::into_response)?;
            converted.form = form;
        }
    }
    Ok(converted)
}

fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (name, value) in headers.iter() {
        if let Ok(value) = value.to_str() {
            map.entry(name.as_str().to_string())
                .and_modify(|existing: &mut String| {
                    existing.push_str("; ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
    }
    map
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = axum::response::Response::new(Body::from(self.body));
        *response.status_mut() = status;
        let headers = response.headers_mut();
        for (name, value) in self.headers {
            match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => tracing::warn!("dropping invalid response header"),
            }
        }
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        }
        response
    }
}
