//! High-level router API.

use http::Method;

use crate::method_router::MethodRouter;
use crate::node::Node;
use crate::{RouteLookup, RouteMatch};

/// A radix tree router mapping (method, path) to operation ids.
///
/// # Route Priority
///
/// When several routes could match a path:
///
/// 1. **Static segments** (e.g., `/books`)
/// 2. **Parameter segments** (e.g., `/books/{id}`)
/// 3. **Wildcard segments** (e.g., `/*rest`)
///
/// A root wildcard therefore acts as a catch-all that never shadows a more
/// specific route.
///
/// # Example
///
/// ```rust
/// use bookshelf_router::{MethodRouter, RouteLookup, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert("/books/{id}", MethodRouter::new().put("updateBook"));
///
/// let RouteLookup::Found(route_match) = router.lookup(&Method::PUT, "/books/3") else {
///     panic!("no route");
/// };
/// assert_eq!(route_match.operation_id, "updateBook");
/// assert_eq!(route_match.params.get("id"), Some("3"));
/// ```
#[derive(Debug, Clone)]
pub struct Router {
    root: Node,
    route_count: usize,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Inserts a route into the router.
    ///
    /// Registering the same path again merges the methods.
    pub fn insert(&mut self, path: &str, methods: MethodRouter) {
        self.root.insert(path, methods);
        self.route_count += 1;
    }

    /// Resolves a request to an operation, a 405 or a 404.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> RouteLookup<'_> {
        let Some((methods, params)) = self.root.match_path(path) else {
            return RouteLookup::NotFound;
        };
        match methods.get_operation(method) {
            Some(operation_id) => RouteLookup::Found(RouteMatch::new(operation_id, params)),
            None => RouteLookup::MethodNotAllowed(methods.allowed_methods()),
        }
    }

    /// Returns the number of `insert` calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}
