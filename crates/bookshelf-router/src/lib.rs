//! Radix tree router for Bookshelf.
//!
//! Routes map a path pattern plus an HTTP method to an operation id. The
//! server dispatches on the operation id, so this crate knows nothing about
//! handlers or bodies.
//!
//! # Features
//!
//! - **Path Parameters**: `/books/{id}` binds `id`
//! - **Wildcards**: `/static/*path` binds the rest of the path, possibly empty
//! - **Method Routing**: per-method operations with an optional any-method fallback
//! - **405 Detection**: a path that matches with the wrong method is reported
//!   separately from a path that matches nothing
//!
//! # Example
//!
//! ```rust
//! use bookshelf_router::{MethodRouter, RouteLookup, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert("/books", MethodRouter::new().get("listBooks").post("createBook"));
//! router.insert("/books/{id}", MethodRouter::new().put("updateBook").delete("deleteBook"));
//!
//! match router.lookup(&Method::PUT, "/books/7") {
//!     RouteLookup::Found(m) => {
//!         assert_eq!(m.operation_id, "updateBook");
//!         assert_eq!(m.params.get("id"), Some("7"));
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//!
//! assert!(matches!(
//!     router.lookup(&Method::GET, "/books/7"),
//!     RouteLookup::MethodNotAllowed(_)
//! ));
//! assert!(matches!(router.lookup(&Method::GET, "/authors"), RouteLookup::NotFound));
//! ```
//!
//! # Architecture
//!
//! ```text
//!            (root) [GET /]
//!              │
//!       ┌──────┴──────┐
//!       │             │
//!    "books"       "static"
//!  [GET,POST]         │
//!       │          "*path"
//!     "{id}"        [GET]
//!  [PUT,DELETE]
//! ```

#![doc(html_root_url = "https://docs.rs/bookshelf-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod method_router;
mod node;
mod params;
mod router;

pub use method_router::MethodRouter;
pub use node::{Node, SegmentKind};
pub use params::Params;
pub use router::Router;

use http::Method;

/// A matched route with its operation ID and extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// The operation ID for the matched route
    pub operation_id: &'a str,
    /// Extracted path parameters
    pub params: Params,
}

impl<'a> RouteMatch<'a> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(operation_id: &'a str, params: Params) -> Self {
        Self {
            operation_id,
            params,
        }
    }
}

/// Outcome of [`Router::lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteLookup<'a> {
    /// Path and method matched.
    Found(RouteMatch<'a>),
    /// Path matched but the method is not registered; carries the methods
    /// that are.
    MethodNotAllowed(Vec<Method>),
    /// No route matches the path.
    NotFound,
}

impl RouteLookup<'_> {
    /// Returns `true` if the lookup found an operation.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crud_router() -> Router {
        let mut router = Router::new();
        router.insert("/", MethodRouter::new().get("servePage"));
        router.insert("/books", MethodRouter::new().post("createBook"));
        router.insert("/books/{id}", MethodRouter::new().put("updateBook"));
        router.insert("/books/{id}", MethodRouter::new().delete("deleteBook"));
        router.insert("/books", MethodRouter::new().get("listBooks"));
        router
    }

    #[test]
    fn test_crud_routes() {
        let router = crud_router();

        let cases = [
            (Method::GET, "/", "servePage"),
            (Method::POST, "/books", "createBook"),
            (Method::GET, "/books", "listBooks"),
            (Method::PUT, "/books/1", "updateBook"),
            (Method::DELETE, "/books/1", "deleteBook"),
        ];
        for (method, path, expected) in cases {
            match router.lookup(&method, path) {
                RouteLookup::Found(m) => assert_eq!(m.operation_id, expected, "{method} {path}"),
                other => panic!("{method} {path}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_wrong_method_reports_allowed() {
        let router = crud_router();
        let lookup = router.lookup(&Method::PATCH, "/books/3");
        assert_eq!(
            lookup,
            RouteLookup::MethodNotAllowed(vec![Method::PUT, Method::DELETE])
        );
    }

    #[test]
    fn test_unknown_path() {
        let router = crud_router();
        assert_eq!(router.lookup(&Method::GET, "/authors"), RouteLookup::NotFound);
        assert_eq!(
            router.lookup(&Method::GET, "/books/1/extra"),
            RouteLookup::NotFound
        );
    }

    #[test]
    fn test_catch_all_with_specific_routes() {
        let mut router = Router::new();
        router.insert("/", MethodRouter::new().any("servePage"));
        router.insert("/*rest", MethodRouter::new().any("servePage"));
        router.insert("/books", MethodRouter::new().any("listBooks"));
        router.insert("/static/*path", MethodRouter::new().any("serveStatic"));

        let found = |method: Method, path: &str| match router.lookup(&method, path) {
            RouteLookup::Found(m) => m.operation_id.to_string(),
            other => panic!("{path}: {other:?}"),
        };

        assert_eq!(found(Method::GET, "/"), "servePage");
        assert_eq!(found(Method::POST, "/anything/at/all"), "servePage");
        assert_eq!(found(Method::DELETE, "/books"), "listBooks");
        assert_eq!(found(Method::GET, "/static/css/site.css"), "serveStatic");
        assert_eq!(found(Method::GET, "/static/"), "serveStatic");
    }
}
