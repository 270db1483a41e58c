//! Radix tree node implementation.
//!
//! Each node owns one path segment. Matching tries static children first,
//! then the parameter child, then the wildcard child, backtracking when a
//! branch fails deeper down.
//!
//! Request paths are split on `/` before percent-decoding, so `%2F` stays
//! inside its segment. A trailing slash is an empty last segment: it matches
//! neither a static segment nor a parameter, only a wildcard.

use std::borrow::Cow;

use crate::method_router::MethodRouter;
use crate::params::Params;

/// Type of path segment in the radix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Static path segment (e.g., "books")
    Static,
    /// Named parameter (e.g., "{id}")
    Param(String),
    /// Catch-all wildcard (e.g., "*path")
    Wildcard(String),
}

/// A node in the radix tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// The path segment this node represents
    pub segment: String,

    /// The kind of segment (static, param, or wildcard)
    pub kind: SegmentKind,

    /// Method router for this node (if it's a route endpoint)
    pub methods: Option<MethodRouter>,

    /// Static children, sorted by segment for binary search
    pub static_children: Vec<Node>,

    /// Parameter child (at most one per node)
    pub param_child: Option<Box<Node>>,

    /// Wildcard child (at most one per node, always a leaf)
    pub wildcard_child: Option<Box<Node>>,
}

impl Node {
    fn with_kind(segment: String, kind: SegmentKind) -> Self {
        Self {
            segment,
            kind,
            methods: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::with_kind(String::new(), SegmentKind::Static)
    }

    /// Inserts a route into the tree.
    ///
    /// Inserting the same path twice merges the method routers.
    ///
    /// # Panics
    ///
    /// Panics if a wildcard segment is not the last segment of `path`.
    pub fn insert(&mut self, path: &str, methods: MethodRouter) {
        let segments = Self::parse_path(path);
        self.insert_segments(&segments, methods);
    }

    fn parse_path(path: &str) -> Vec<(String, SegmentKind)> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                let kind = if let Some(name) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}'))
                {
                    SegmentKind::Param(name.to_string())
                } else if let Some(name) = s.strip_prefix('*') {
                    SegmentKind::Wildcard(name.to_string())
                } else {
                    SegmentKind::Static
                };
                (s.to_string(), kind)
            })
            .collect()
    }

    fn attach(&mut self, methods: MethodRouter) {
        match &mut self.methods {
            Some(existing) => existing.merge(methods),
            None => self.methods = Some(methods),
        }
    }

    fn insert_segments(&mut self, segments: &[(String, SegmentKind)], methods: MethodRouter) {
        let Some(((segment, kind), remaining)) = segments.split_first() else {
            self.attach(methods);
            return;
        };

        let child = match kind {
            SegmentKind::Static => {
                match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(index) => &mut self.static_children[index],
                    Err(index) => {
                        self.static_children.insert(
                            index,
                            Self::with_kind(segment.clone(), SegmentKind::Static),
                        );
                        &mut self.static_children[index]
                    }
                }
            }
            SegmentKind::Param(_) => &mut **self
                .param_child
                .get_or_insert_with(|| Box::new(Self::with_kind(segment.clone(), kind.clone()))),
            SegmentKind::Wildcard(_) => {
                assert!(
                    remaining.is_empty(),
                    "wildcard must be the last segment in path"
                );
                &mut **self
                    .wildcard_child
                    .get_or_insert_with(|| Box::new(Self::with_kind(segment.clone(), kind.clone())))
            }
        };
        child.insert_segments(remaining, methods);
    }

    /// Matches a path against the tree.
    ///
    /// Returns the method router and extracted parameters if found.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter, Params)> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let segments: Vec<Cow<'_, str>> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').map(decode_segment).collect()
        };
        let mut params = Params::new();
        let methods = self.match_segments(&segments, &mut params)?;
        Some((methods, params))
    }

    fn match_segments<'a>(
        &'a self,
        segments: &[Cow<'_, str>],
        params: &mut Params,
    ) -> Option<&'a MethodRouter> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.methods.as_ref();
        };

        if let Some(child) = self.find_static_child(segment) {
            if let Some(found) = child.match_segments(remaining, params) {
                return Some(found);
            }
        }

        if let Some(child) = self.param_child.as_ref().filter(|_| !segment.is_empty()) {
            if let SegmentKind::Param(name) = &child.kind {
                let mark = params.len();
                params.push(name.clone(), &**segment);
                if let Some(found) = child.match_segments(remaining, params) {
                    return Some(found);
                }
                params.truncate(mark);
            }
        }

        self.match_wildcard(segments, params)
    }

    fn match_wildcard<'a>(
        &'a self,
        segments: &[Cow<'_, str>],
        params: &mut Params,
    ) -> Option<&'a MethodRouter> {
        let child = self.wildcard_child.as_ref()?;
        let methods = child.methods.as_ref()?;
        if let SegmentKind::Wildcard(name) = &child.kind {
            params.push(name.clone(), segments.join("/"));
        }
        Some(methods)
    }

    fn find_static_child(&self, segment: &str) -> Option<&Node> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}

/// Percent-decodes one path segment; a segment that does not decode to UTF-8
/// is kept as written.
fn decode_segment(segment: &str) -> Cow<'_, str> {
    urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_parse_path() {
        let segments = Node::parse_path("/books/{id}/*rest");
        assert_eq!(
            segments,
            vec![
                ("books".to_string(), SegmentKind::Static),
                ("{id}".to_string(), SegmentKind::Param("id".to_string())),
                ("*rest".to_string(), SegmentKind::Wildcard("rest".to_string())),
            ]
        );
    }

    #[test]
    fn test_root_route() {
        let mut root = Node::root();
        root.insert("/", MethodRouter::new().get("servePage"));

        let (methods, params) = root.match_path("/").unwrap();
        assert_eq!(methods.get_operation(&Method::GET), Some("servePage"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_param_route() {
        let mut root = Node::root();
        root.insert("/books/{id}", MethodRouter::new().put("updateBook"));

        let (methods, params) = root.match_path("/books/17").unwrap();
        assert_eq!(methods.get_operation(&Method::PUT), Some("updateBook"));
        assert_eq!(params.get("id"), Some("17"));
    }

    #[test]
    fn test_static_children_stay_sorted() {
        let mut root = Node::root();
        for path in ["/static/x", "/books", "/about"] {
            root.insert(path, MethodRouter::new().get(path));
        }
        let order: Vec<_> = root.static_children.iter().map(|c| c.segment.as_str()).collect();
        assert_eq!(order, vec!["about", "books", "static"]);
    }

    #[test]
    fn test_failed_param_branch_is_unwound() {
        let mut root = Node::root();
        root.insert("/books/{id}/reviews", MethodRouter::new().get("listReviews"));
        root.insert("/books/*rest", MethodRouter::new().get("bookFiles"));

        let (methods, params) = root.match_path("/books/7/cover.png").unwrap();
        assert_eq!(methods.get_operation(&Method::GET), Some("bookFiles"));
        assert_eq!(params.get("id"), None);
        assert_eq!(params.get("rest"), Some("7/cover.png"));
    }

    #[test]
    fn test_wildcard_empty_tail() {
        let mut root = Node::root();
        root.insert("/static/*path", MethodRouter::new().get("serveStatic"));

        let (_, params) = root.match_path("/static/").unwrap();
        assert_eq!(params.get("path"), Some(""));
    }

    #[test]
    fn test_wildcard_needs_trailing_slash() {
        let mut root = Node::root();
        root.insert("/static/*path", MethodRouter::new().get("serveStatic"));

        assert!(root.match_path("/static").is_none());
    }

    #[test]
    fn test_trailing_slash_is_significant() {
        let mut root = Node::root();
        root.insert("/books", MethodRouter::new().get("listBooks"));
        root.insert("/books/{id}", MethodRouter::new().put("updateBook"));

        assert!(root.match_path("/books").is_some());
        assert!(root.match_path("/books/").is_none());
        assert!(root.match_path("/books/1/").is_none());
    }

    #[test]
    fn test_params_are_percent_decoded() {
        let mut root = Node::root();
        root.insert("/books/{id}", MethodRouter::new().delete("deleteBook"));

        let (_, params) = root.match_path("/books/%31").unwrap();
        assert_eq!(params.get("id"), Some("1"));

        let (_, params) = root.match_path("/books/a%2Fb").unwrap();
        assert_eq!(params.get("id"), Some("a/b"));

        let (_, params) = root.match_path("/books/%FF").unwrap();
        assert_eq!(params.get("id"), Some("%FF"));
    }

    #[test]
    fn test_static_segments_are_percent_decoded() {
        let mut root = Node::root();
        root.insert("/books", MethodRouter::new().get("listBooks"));

        assert!(root.match_path("/b%6Foks").is_some());
    }

    #[test]
    fn test_duplicate_insert_merges() {
        let mut root = Node::root();
        root.insert("/books/{id}", MethodRouter::new().put("updateBook"));
        root.insert("/books/{id}", MethodRouter::new().delete("deleteBook"));

        let (methods, _) = root.match_path("/books/1").unwrap();
        assert_eq!(methods.allowed_methods(), vec![Method::PUT, Method::DELETE]);
    }

    #[test]
    fn test_no_match() {
        let mut root = Node::root();
        root.insert("/books", MethodRouter::new().get("listBooks"));
        assert!(root.match_path("/shelves").is_none());
    }

    #[test]
    #[should_panic(expected = "wildcard must be the last segment")]
    fn test_wildcard_must_be_last() {
        let mut root = Node::root();
        root.insert("/files/*path/meta", MethodRouter::new().get("x"));
    }
}
