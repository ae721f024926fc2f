//! Path-segment dispatch for the read-only HTTP API.
//!
//! | Path                              | Response                               |
//! |-----------------------------------|----------------------------------------|
//! | `/api/servers/list`               | every server record                    |
//! | `/api/servers/{index}`            | one server record                      |
//! | `/api/servers/{index}/databases`  | live database names, sorted            |
//! | `/api/files/list`                 | every file share                       |
//! | `/api/files/{index}`              | one file share                         |
//! | `/api/releases`                   | release table used for backup lookups  |
//!
//! Anything else is a 404. A failing request answers 500 with the failure
//! text and leaves every other request unaffected.

use crate::catalog::Catalog;
use crate::config::FileShare;
use crate::directory::{Directory, ServerRecord};
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared, read-only state behind every request
pub struct Service {
    directory: Directory,
    catalog: Arc<dyn Catalog>,
}

impl Service {
    /// Wrap an enriched directory and the catalog used for live listings
    pub fn new(directory: Directory, catalog: Arc<dyn Catalog>) -> Self {
        Self { directory, catalog }
    }

    /// Resolve a request path to a reply
    pub async fn route(&self, path: &str) -> Reply {
        let segments = split_path(path);

        match segments.as_slice() {
            ["api", "servers", "list"] => Reply::json(self.directory.servers()),
            ["api", "servers", index] => self.server(index).map_or(Reply::NotFound, Reply::json),
            ["api", "servers", index, "databases"] => match self.server(index) {
                Some(record) => self.databases(record).await,
                None => Reply::NotFound,
            },
            ["api", "files", "list"] => Reply::json(self.directory.files()),
            ["api", "files", index] => self.file(index).map_or(Reply::NotFound, Reply::json),
            ["api", "releases"] => Reply::json(bakprobe_core::releases()),
            _ => Reply::NotFound,
        }
    }

    fn server(&self, segment: &str) -> Option<&ServerRecord> {
        parse_index(segment).and_then(|i| self.directory.server(i))
    }

    fn file(&self, segment: &str) -> Option<&FileShare> {
        parse_index(segment).and_then(|i| self.directory.file(i))
    }

    async fn databases(&self, record: &ServerRecord) -> Reply {
        match self.catalog.databases(&record.config).await {
            Ok(mut databases) => {
                databases.sort();
                Reply::json(&databases)
            }
            Err(e) => {
                warn!(
                    "Listing databases on {} failed: {}",
                    record.config.display_name(),
                    e
                );
                Reply::Failed(e.to_string())
            }
        }
    }
}

/// Outcome of routing a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Serialized JSON body
    Json(String),
    /// No resource at this path
    NotFound,
    /// Internal failure, with its description
    Failed(String),
}

impl Reply {
    fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Reply::Json(body),
            Err(e) => Reply::Failed(e.to_string()),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Json(body) => {
                ([(header::CONTENT_TYPE, "application/json")], body).into_response()
            }
            Reply::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            Reply::Failed(detail) => {
                let code = StatusCode::INTERNAL_SERVER_ERROR;
                let reason = code.canonical_reason().unwrap_or_default();
                (code, format!("{reason}\n\n{detail}")).into_response()
            }
        }
    }
}

/// Build the HTTP router for a service
pub fn router(service: Arc<Service>) -> Router {
    Router::new().fallback(dispatch).with_state(service)
}

async fn dispatch(State(service): State<Arc<Service>>, method: Method, uri: Uri) -> Response {
    debug!("{} {}", method, uri.path());

    if method != Method::GET {
        return (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
    }
    service.route(uri.path()).await.into_response()
}

/// Split a path into clean segments, resolving `.` and `..`
fn split_path(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments
}

fn parse_index(segment: &str) -> Option<usize> {
    if segment.bytes().all(|b| b.is_ascii_digit()) {
        segment.parse().ok()
    } else {
        None
    }
}
