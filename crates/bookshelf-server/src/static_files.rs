//! Static file serving.
//!
//! Serves files from a directory with support for:
//!
//! - Index file fallback (`index.html`)
//! - `Last-Modified` / `If-Modified-Since`
//! - Single byte ranges
//! - `HEAD` requests
//! - MIME type detection
//!
//! # Example
//!
//! ```rust
//! use bookshelf_server::static_files::StaticFiles;
//!
//! let static_files = StaticFiles::new("./static").index("index.html");
//! ```
//!
//! # Security
//!
//! - Path traversal prevention (rejects `..` in paths)
//! - Resolved paths must stay inside the root directory
//! - Hidden file filtering (files starting with `.`)

use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use bytes::Bytes;
use http::header::{self, HeaderValue};
use http::{HeaderMap, Method, Response, StatusCode};
use http_body_util::Full;
use thiserror::Error;

use crate::response::{self, HttpResponse};

/// Errors that can occur when serving static files.
#[derive(Debug, Error)]
pub enum StaticFileError {
    /// The requested file was not found.
    #[error("File not found: {0}")]
    NotFound(String),

    /// The path is forbidden (e.g., directory traversal attempt).
    #[error("Forbidden path: {0}")]
    Forbidden(String),

    /// Method other than GET or HEAD.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// I/O error while reading file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid or unsatisfiable range header.
    #[error("Invalid range: {0}")]
    InvalidRange(String),
}

impl StaticFileError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidRange(_) => StatusCode::RANGE_NOT_SATISFIABLE,
        }
    }

    /// Converts the error into the response sent to the client.
    ///
    /// Details stay in the logs; the body only names the status.
    #[must_use]
    pub fn into_response(self) -> HttpResponse {
        match self {
            Self::NotFound(_) => response::not_found(),
            Self::MethodNotAllowed => response::method_not_allowed(&[Method::GET, Method::HEAD]),
            other => {
                let status = other.status_code();
                if status.is_server_error() {
                    tracing::error!(error = %other, "Failed to serve file");
                }
                response::text_error(
                    status,
                    &format!("{} {}", status.as_u16(), status.canonical_reason().unwrap_or("")),
                )
            }
        }
    }
}

/// Static file server configuration and handler.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    /// Root directory for static files
    root: PathBuf,

    /// Index file name (e.g., "index.html")
    index_file: Option<String>,
}

impl StaticFiles {
    /// Creates a static file server for the given root directory.
    #[must_use]
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            index_file: None,
        }
    }

    /// Sets the index file to serve for directory requests.
    #[must_use]
    pub fn index<S: Into<String>>(mut self, index: S) -> Self {
        self.index_file = Some(index.into());
        self
    }

    /// Handles a request for `request_path`, relative to the mount point.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The method is not GET or HEAD
    /// - The path contains directory traversal attempts
    /// - The file is not found
    /// - An I/O error occurs
    /// - The range header is invalid
    pub fn handle(
        &self,
        request_path: &str,
        headers: &HeaderMap,
        method: &Method,
    ) -> Result<HttpResponse, StaticFileError> {
        if method != Method::GET && method != Method::HEAD {
            return Err(StaticFileError::MethodNotAllowed);
        }

        let file_path = self.resolve_path(request_path)?;

        if file_path.is_dir() {
            if let Some(ref index) = self.index_file {
                let index_path = file_path.join(index);
                if index_path.is_file() {
                    return serve_file(&index_path, headers, method);
                }
            }
            return Err(StaticFileError::NotFound(request_path.to_string()));
        }

        serve_file(&file_path, headers, method)
    }

    /// Serves one named file, independent of any root directory.
    ///
    /// # Errors
    ///
    /// Returns `StaticFileError::NotFound` if `path` is not a regular file,
    /// otherwise the same errors as [`StaticFiles::handle`].
    pub fn serve_single(
        path: &Path,
        headers: &HeaderMap,
        method: &Method,
    ) -> Result<HttpResponse, StaticFileError> {
        if !path.is_file() {
            return Err(StaticFileError::NotFound(path.display().to_string()));
        }
        serve_file(path, headers, method)
    }

    /// Resolves a request path to a file path under the root.
    fn resolve_path(&self, request_path: &str) -> Result<PathBuf, StaticFileError> {
        let path = request_path.trim_start_matches('/');

        for component in Path::new(path).components() {
            match component {
                Component::ParentDir => {
                    return Err(StaticFileError::Forbidden(
                        "Directory traversal not allowed".to_string(),
                    ));
                }
                Component::Normal(name) => {
                    let hidden = name.to_str().is_some_and(|name| name.starts_with('.'));
                    if hidden {
                        return Err(StaticFileError::Forbidden(
                            "Hidden files not allowed".to_string(),
                        ));
                    }
                }
                _ => {}
            }
        }

        let canonical = self
            .root
            .join(path)
            .canonicalize()
            .map_err(|_| StaticFileError::NotFound(request_path.to_string()))?;

        let canonical_root = self.root.canonicalize()?;
        if !canonical.starts_with(&canonical_root) {
            return Err(StaticFileError::Forbidden(
                "Path escapes root directory".to_string(),
            ));
        }

        Ok(canonical)
    }
}

fn serve_file(
    path: &Path,
    headers: &HeaderMap,
    method: &Method,
) -> Result<HttpResponse, StaticFileError> {
    let metadata = std::fs::metadata(path)?;
    let file_size = metadata.len();
    let modified = metadata.modified().ok();

    if let Some(last_mod) = modified {
        if not_modified_since(last_mod, headers) {
            return Ok(response::empty(StatusCode::NOT_MODIFIED));
        }
    }

    let mime_type = detect_mime_type(path);

    if method == Method::HEAD {
        return Ok(build_response(
            StatusCode::OK,
            Bytes::new(),
            file_size,
            mime_type,
            modified,
            None,
        ));
    }

    if let Some((start, end)) = parse_range_header(headers, file_size)? {
        let content = read_file_range(path, start, end)?;
        return Ok(build_response(
            StatusCode::PARTIAL_CONTENT,
            content,
            end - start + 1,
            mime_type,
            modified,
            Some((start, end, file_size)),
        ));
    }

    let content = Bytes::from(std::fs::read(path)?);
    let length = content.len() as u64;
    Ok(build_response(StatusCode::OK, content, length, mime_type, modified, None))
}

fn build_response(
    status: StatusCode,
    body: Bytes,
    content_length: u64,
    mime_type: &'static str,
    modified: Option<SystemTime>,
    range: Option<(u64, u64, u64)>,
) -> HttpResponse {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(mime_type));
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(content_length));

    if let Some(modified) = modified {
        if let Ok(value) = HeaderValue::from_str(&httpdate::fmt_http_date(modified)) {
            headers.insert(header::LAST_MODIFIED, value);
        }
    }

    if let Some((start, end, total)) = range {
        if let Ok(value) = HeaderValue::from_str(&format!("bytes {start}-{end}/{total}")) {
            headers.insert(header::CONTENT_RANGE, value);
        }
    }

    response
}

/// `true` if `If-Modified-Since` is at or after `last_mod`, to the second.
fn not_modified_since(last_mod: SystemTime, headers: &HeaderMap) -> bool {
    let Some(since) = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| httpdate::parse_http_date(value).ok())
    else {
        return false;
    };

    match (
        last_mod.duration_since(SystemTime::UNIX_EPOCH),
        since.duration_since(SystemTime::UNIX_EPOCH),
    ) {
        (Ok(modified), Ok(since)) => modified.as_secs() <= since.as_secs(),
        _ => false,
    }
}

/// Parses a single `bytes=start-end` range.
fn parse_range_header(
    headers: &HeaderMap,
    file_size: u64,
) -> Result<Option<(u64, u64)>, StaticFileError> {
    let Some(range_header) = headers.get(header::RANGE) else {
        return Ok(None);
    };

    let range_str = range_header
        .to_str()
        .map_err(|_| StaticFileError::InvalidRange("Invalid range header encoding".to_string()))?;

    let range_spec = range_str
        .strip_prefix("bytes=")
        .ok_or_else(|| StaticFileError::InvalidRange("Only byte ranges supported".to_string()))?;

    let (first, last) = range_spec
        .split_once('-')
        .ok_or_else(|| StaticFileError::InvalidRange("Invalid range format".to_string()))?;

    if file_size == 0 {
        return Err(StaticFileError::InvalidRange("Empty file".to_string()));
    }

    let (start, end) = if first.is_empty() {
        // Suffix range: "-500" means the last 500 bytes
        let suffix_len: u64 = last
            .parse()
            .map_err(|_| StaticFileError::InvalidRange("Invalid suffix length".to_string()))?;
        if suffix_len == 0 {
            return Err(StaticFileError::InvalidRange("Empty suffix range".to_string()));
        }
        (file_size.saturating_sub(suffix_len), file_size - 1)
    } else {
        let start: u64 = first
            .parse()
            .map_err(|_| StaticFileError::InvalidRange("Invalid start".to_string()))?;
        let end = if last.is_empty() {
            file_size - 1
        } else {
            last.parse()
                .map_err(|_| StaticFileError::InvalidRange("Invalid end".to_string()))?
        };
        (start, end)
    };

    if start > end || start >= file_size {
        return Err(StaticFileError::InvalidRange(format!(
            "Range {start}-{end} not satisfiable for file size {file_size}"
        )));
    }

    Ok(Some((start, end.min(file_size - 1))))
}

fn read_file_range(path: &Path, start: u64, end: u64) -> Result<Bytes, StaticFileError> {
    use std::io::{Read, Seek, SeekFrom};

    let mut file = std::fs::File::open(path)?;
    file.seek(SeekFrom::Start(start))?;

    let length = usize::try_from(end - start + 1)
        .map_err(|_| StaticFileError::InvalidRange("Range too large".to_string()))?;
    let mut buffer = vec![0u8; length];
    file.read_exact(&mut buffer)?;

    Ok(Bytes::from(buffer))
}

fn detect_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",

        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",

        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        "pdf" => "application/pdf",
        "wasm" => "application/wasm",

        _ => "application/octet-stream",
    }
}
