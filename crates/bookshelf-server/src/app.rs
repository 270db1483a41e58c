//! Application: routes plus the state the handlers need.
//!
//! An [`App`] is one of two configurations of the same component:
//!
//! | Mode | Routes |
//! |------|--------|
//! | CRUD | `GET /`, `POST /books`, `GET /books`, `PUT /books/{id}`, `DELETE /books/{id}` |
//! | Demo | `/static/*`, `/books` and every other path (templated page), any method |
//!
//! Requests are resolved through a [`Router`] to an operation id, then
//! dispatched to the matching handler.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use bookshelf_core::BookCatalog;
use bookshelf_router::{MethodRouter, Params, RouteLookup, Router};
use bytes::Bytes;
use http::request::Parts;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Body;
use tracing::{info, warn};

use crate::handlers::{self, FormFields};
use crate::page::{PageData, PageTemplate};
use crate::response::{self, HttpResponse};
use crate::static_files::StaticFiles;

/// Operation ids used in the route table.
pub mod operations {
    /// Landing page.
    pub const SERVE_PAGE: &str = "servePage";
    /// Files below the static directory.
    pub const SERVE_STATIC: &str = "serveStatic";
    /// Book listing.
    pub const LIST_BOOKS: &str = "listBooks";
    /// Book creation.
    pub const CREATE_BOOK: &str = "createBook";
    /// Book replacement.
    pub const UPDATE_BOOK: &str = "updateBook";
    /// Book removal.
    pub const DELETE_BOOK: &str = "deleteBook";
}

/// How the landing page is produced.
#[derive(Debug, Clone)]
pub enum PageSource {
    /// Serve an HTML file as is.
    File(PathBuf),
    /// Render a template with fixed page data.
    Template {
        /// The parsed template.
        template: PageTemplate,
        /// Values for its placeholders.
        data: PageData,
    },
}

/// Routes and handler state.
pub struct App {
    router: Router,
    catalog: Arc<dyn BookCatalog>,
    page: PageSource,
    static_files: Option<StaticFiles>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("catalog", &self.catalog.name())
            .field("routes", &self.router.len())
            .field("page", &self.page)
            .field("static_files", &self.static_files)
            .finish()
    }
}

impl App {
    /// The CRUD service over `catalog`, serving `page_path` at `GET /`.
    ///
    /// The page file is read on every request, so a missing file is a
    /// per-request 404 rather than a startup error.
    pub fn crud(catalog: Arc<dyn BookCatalog>, page_path: impl Into<PathBuf>) -> Self {
        let mut router = Router::new();
        router.insert("/", MethodRouter::new().get(operations::SERVE_PAGE));
        router.insert("/books", MethodRouter::new().post(operations::CREATE_BOOK));
        router.insert("/books/{id}", MethodRouter::new().put(operations::UPDATE_BOOK));
        router.insert("/books/{id}", MethodRouter::new().delete(operations::DELETE_BOOK));
        router.insert("/books", MethodRouter::new().get(operations::LIST_BOOKS));

        Self {
            router,
            catalog,
            page: PageSource::File(page_path.into()),
            static_files: None,
        }
    }

    /// The demo service: a rendered page on every unmatched path, static
    /// files under `/static/` and the listing of `catalog` at `/books`.
    pub fn demo(
        catalog: Arc<dyn BookCatalog>,
        template: PageTemplate,
        data: PageData,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        let mut router = Router::new();
        router.insert("/", MethodRouter::new().any(operations::SERVE_PAGE));
        router.insert("/*path", MethodRouter::new().any(operations::SERVE_PAGE));
        router.insert("/static/*path", MethodRouter::new().any(operations::SERVE_STATIC));
        router.insert("/books", MethodRouter::new().any(operations::LIST_BOOKS));

        Self {
            router,
            catalog,
            page: PageSource::Template { template, data },
            static_files: Some(StaticFiles::new(static_dir.into()).index("index.html")),
        }
    }

    /// The catalog behind the book routes.
    pub fn catalog(&self) -> &Arc<dyn BookCatalog> {
        &self.catalog
    }

    /// The route table.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Reads the request body, then answers the request.
    ///
    /// A body that fails mid-read is answered with `400`.
    pub async fn handle<B>(&self, request: Request<B>) -> HttpResponse
    where
        B: Body,
        B::Error: fmt::Display,
    {
        let (parts, body) = request.into_parts();
        match body.collect().await {
            Ok(collected) => self.respond(Request::from_parts(parts, collected.to_bytes())).await,
            Err(e) => {
                warn!(error = %e, method = %parts.method, path = parts.uri.path(), "Failed to read request body");
                response::text_error(StatusCode::BAD_REQUEST, "Bad Request")
            }
        }
    }

    /// Answers a request whose body has already been read.
    pub async fn respond(&self, request: Request<Bytes>) -> HttpResponse {
        let (parts, body) = request.into_parts();
        let path = parts.uri.path();
        info!(method = %parts.method, path, "Received request");

        match self.router.lookup(&parts.method, path) {
            RouteLookup::Found(route) => {
                self.dispatch(route.operation_id, &route.params, &parts, &body)
                    .await
            }
            RouteLookup::MethodNotAllowed(allowed) => response::method_not_allowed(&allowed),
            RouteLookup::NotFound => response::not_found(),
        }
    }

    async fn dispatch(&self, operation_id: &str, params: &Params, parts: &Parts, body: &Bytes) -> HttpResponse {
        let catalog = self.catalog.as_ref();
        let id = params.get("id").unwrap_or_default();

        match operation_id {
            operations::SERVE_PAGE => match &self.page {
                PageSource::File(path) => handlers::serve_page_file(path, parts),
                PageSource::Template { template, data } => handlers::render_page(template, data),
            },
            operations::SERVE_STATIC => match &self.static_files {
                Some(files) => handlers::serve_static(files, params.get("path").unwrap_or_default(), parts),
                None => response::not_found(),
            },
            operations::LIST_BOOKS => handlers::list_books(catalog),
            operations::CREATE_BOOK => {
                let form = FormFields::from_request(parts, body).await;
                handlers::create_book(catalog, &form)
            }
            operations::UPDATE_BOOK => handlers::update_book(catalog, id, body),
            operations::DELETE_BOOK => handlers::delete_book(catalog, id),
            _ => response::not_found(),
        }
    }
}
