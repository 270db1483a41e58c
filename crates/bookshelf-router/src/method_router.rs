//! HTTP method-based routing.
//!
//! [`MethodRouter`] maps HTTP methods to operation ids for a single path,
//! with an optional fallback that accepts any method.

use http::Method;
use smallvec::SmallVec;

/// Maps HTTP methods to operation IDs for a single route.
///
/// # Example
///
/// ```rust
/// use bookshelf_router::MethodRouter;
/// use http::Method;
///
/// let router = MethodRouter::new().get("listBooks").post("createBook");
///
/// assert_eq!(router.get_operation(&Method::GET), Some("listBooks"));
/// assert_eq!(router.get_operation(&Method::POST), Some("createBook"));
/// assert_eq!(router.get_operation(&Method::DELETE), None);
///
/// let page = MethodRouter::new().any("servePage");
/// assert_eq!(page.get_operation(&Method::PATCH), Some("servePage"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MethodRouter {
    /// Explicit (method, operation) pairs in registration order
    routes: SmallVec<[(Method, String); 4]>,
    /// Operation used when no explicit method matches
    fallback: Option<String>,
}

impl MethodRouter {
    /// Creates a new empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a GET handler.
    #[must_use]
    pub fn get(self, operation_id: impl Into<String>) -> Self {
        self.method(&Method::GET, operation_id)
    }

    /// Registers a POST handler.
    #[must_use]
    pub fn post(self, operation_id: impl Into<String>) -> Self {
        self.method(&Method::POST, operation_id)
    }

    /// Registers a PUT handler.
    #[must_use]
    pub fn put(self, operation_id: impl Into<String>) -> Self {
        self.method(&Method::PUT, operation_id)
    }

    /// Registers a DELETE handler.
    #[must_use]
    pub fn delete(self, operation_id: impl Into<String>) -> Self {
        self.method(&Method::DELETE, operation_id)
    }

    /// Registers an operation for every method not registered explicitly.
    #[must_use]
    pub fn any(mut self, operation_id: impl Into<String>) -> Self {
        self.fallback = Some(operation_id.into());
        self
    }

    /// Registers a handler for a specific method, replacing any previous one.
    #[must_use]
    pub fn method(mut self, method: &Method, operation_id: impl Into<String>) -> Self {
        let operation_id = operation_id.into();
        if let Some(slot) = self.routes.iter_mut().find(|(m, _)| m == method) {
            slot.1 = operation_id;
        } else {
            self.routes.push((method.clone(), operation_id));
        }
        self
    }

    /// Returns the operation ID for a given HTTP method.
    #[must_use]
    pub fn get_operation(&self, method: &Method) -> Option<&str> {
        self.routes
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, op)| op.as_str())
            .or(self.fallback.as_deref())
    }

    /// Merges another method router into this one.
    ///
    /// Methods already registered here are NOT overwritten.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bookshelf_router::MethodRouter;
    /// use http::Method;
    ///
    /// let mut router = MethodRouter::new().put("updateBook");
    /// router.merge(MethodRouter::new().delete("deleteBook").put("ignored"));
    ///
    /// assert_eq!(router.get_operation(&Method::PUT), Some("updateBook"));
    /// assert_eq!(router.get_operation(&Method::DELETE), Some("deleteBook"));
    /// ```
    pub fn merge(&mut self, other: MethodRouter) {
        for (method, op) in other.routes {
            if !self.routes.iter().any(|(m, _)| *m == method) {
                self.routes.push((method, op));
            }
        }
        if self.fallback.is_none() {
            self.fallback = other.fallback;
        }
    }

    /// Returns the explicitly registered methods, in registration order.
    ///
    /// Used to build the `Allow` header of a 405 response.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.routes.iter().map(|(m, _)| m.clone()).collect()
    }
}
