//! Static file serving over a [`FileSystem`].
//!
//! Serves raw file bytes with a guessed content type, `index.html` for
//! directories that have one, and a plain listing for directories that
//! don't. Directory URLs are normalized to end with a slash first.

use std::fmt::Write;
use std::io::Read;
use std::sync::Arc;
use std::time::SystemTime;

use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use mdserve_renderer::escape_html;
use mdserve_storage::{File, FileInfo, FileSystem, StorageErrorKind};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::resolver::strip_prefix;

/// Characters escaped in listing links.
const LINK: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Static file handler.
#[derive(Clone)]
pub struct StaticFiles {
    fs: Arc<dyn FileSystem>,
    prefix: String,
}

impl StaticFiles {
    /// Serve `fs` under the URL `prefix`.
    pub fn new(fs: Arc<dyn FileSystem>, prefix: impl Into<String>) -> Self {
        Self {
            fs,
            prefix: prefix.into(),
        }
    }

    /// Handle a request.
    pub fn serve<B>(&self, req: &Request<B>) -> Response {
        let uri_path = req.uri().path();
        let Some(path) = strip_prefix(uri_path, &self.prefix) else {
            return not_found();
        };

        let mut handle = match self.fs.open(&path) {
            Ok(handle) => handle,
            Err(err) => {
                return match err.kind {
                    StorageErrorKind::NotFound | StorageErrorKind::InvalidPath => not_found(),
                    StorageErrorKind::PermissionDenied => {
                        (StatusCode::FORBIDDEN, "403 Forbidden").into_response()
                    }
                    _ => {
                        tracing::warn!(path = %path, error = %err, "Failed to open static file");
                        internal_error()
                    }
                };
            }
        };

        let info = match handle.stat() {
            Ok(info) => info,
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "Failed to stat static file");
                return internal_error();
            }
        };

        if info.is_dir {
            if !uri_path.ends_with('/') {
                return redirect(&format!("{uri_path}/"), req.uri().query());
            }
            return self.serve_dir(&path, handle.as_mut());
        }

        if uri_path.ends_with('/') {
            return redirect(uri_path.trim_end_matches('/'), req.uri().query());
        }

        serve_file(&path, &info, handle.as_mut())
    }

    fn serve_dir(&self, path: &str, dir: &mut dyn File) -> Response {
        let index = format!("{}/index.html", path.trim_end_matches('/'));
        if let Ok(mut handle) = self.fs.open(&index)
            && let Ok(info) = handle.stat()
            && !info.is_dir
        {
            return serve_file(&index, &info, handle.as_mut());
        }

        match dir.read_dir() {
            Ok(entries) => listing(&entries),
            Err(err) => {
                tracing::warn!(path, error = %err, "Failed to list directory");
                internal_error()
            }
        }
    }
}

impl std::fmt::Debug for StaticFiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticFiles")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

fn serve_file(path: &str, info: &FileInfo, file: &mut dyn File) -> Response {
    let mut content = Vec::with_capacity(usize::try_from(info.size).unwrap_or_default());
    if let Err(err) = file.read_to_end(&mut content) {
        tracing::warn!(path, error = %err, "Failed to read static file");
        return internal_error();
    }

    let mime = mime_guess::from_path(&info.name).first_or_octet_stream();
    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .body(Body::from(content))
        .unwrap();

    if let Ok(value) = HeaderValue::from_str(&http_date(info.modified)) {
        response.headers_mut().insert(header::LAST_MODIFIED, value);
    }
    response
}

/// Directory listing in the same minimal shape browsers are used to.
fn listing(entries: &[FileInfo]) -> Response {
    let mut html = String::from("<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n");
    for entry in entries {
        let name = if entry.is_dir {
            format!("{}/", entry.name)
        } else {
            entry.name.clone()
        };
        let _ = writeln!(
            html,
            "<a href=\"{}\">{}</a>",
            utf8_percent_encode(&name, LINK),
            escape_html(&name)
        );
    }
    html.push_str("</pre>\n");

    (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
        .into_response()
}

fn redirect(location: &str, query: Option<&str>) -> Response {
    let location = match query {
        Some(q) => format!("{location}?{q}"),
        None => location.to_owned(),
    };
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(header::LOCATION, location)
        .body(Body::empty())
        .unwrap()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 page not found").into_response()
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error").into_response()
}

fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}
