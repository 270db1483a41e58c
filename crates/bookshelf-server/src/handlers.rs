//! Request handlers.
//!
//! Each handler turns one request into at most one catalog call and one
//! response. Handlers never fail: client mistakes become 4xx responses and
//! are logged.

use std::path::Path;

use bookshelf_core::{Book, BookCatalog, CatalogError, NewBook};
use bytes::Bytes;
use http::request::Parts;
use http::{header, StatusCode};
use serde::de::{DeserializeOwned, Error as _};
use tracing::{debug, error, info, warn};

use crate::page::{PageData, PageTemplate};
use crate::response::{self, HttpResponse};
use crate::static_files::StaticFiles;

/// `GET /books`: the whole catalog as a JSON array.
pub fn list_books(catalog: &dyn BookCatalog) -> HttpResponse {
    let books = catalog.list();
    debug!(count = books.len(), catalog = catalog.name(), "Listing books");
    response::json(StatusCode::OK, &books).unwrap_or_else(|e| {
        error!(error = %e, "JSON encoding error");
        response::text_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode books data")
    })
}

/// `POST /books`: creates a book from the `title` and `author` form fields.
///
/// Missing fields are stored as empty strings.
pub fn create_book(catalog: &dyn BookCatalog, form: &FormFields) -> HttpResponse {
    let new_book = NewBook::new(form.value("title"), form.value("author"));
    match catalog.create(new_book) {
        Ok(book) => {
            info!(id = %book.id, title = %book.title, author = %book.author, "Created a new book");
            book_response(StatusCode::CREATED, &book)
        }
        Err(e) => catalog_error(&e),
    }
}

/// `PUT /books/{id}`: replaces the book with `id` by the JSON body.
///
/// The stored id is always the path id, whatever the body says.
pub fn update_book(catalog: &dyn BookCatalog, id: &str, body: &[u8]) -> HttpResponse {
    // A JSON `null` replaces every field with an empty value.
    let replacement: Book = match decode_json::<Option<Book>>(body) {
        Ok(book) => book.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "Error decoding JSON");
            return response::text_error(StatusCode::BAD_REQUEST, "Invalid JSON payload");
        }
    };

    match catalog.update(id, replacement) {
        Ok(book) => {
            info!(id = %book.id, title = %book.title, author = %book.author, "Updated book");
            book_response(StatusCode::OK, &book)
        }
        Err(e) => catalog_error(&e),
    }
}

/// `DELETE /books/{id}`: removes the book, answering `204` with no body.
pub fn delete_book(catalog: &dyn BookCatalog, id: &str) -> HttpResponse {
    match catalog.delete(id) {
        Ok(()) => {
            info!(id, "Deleted book");
            response::empty(StatusCode::NO_CONTENT)
        }
        Err(e) => catalog_error(&e),
    }
}

/// Renders the landing page template.
pub fn render_page(template: &PageTemplate, data: &PageData) -> HttpResponse {
    match template.render(data) {
        Ok(html) => response::html(StatusCode::OK, html),
        Err(e) => {
            error!(error = %e, "Template execution error");
            response::text_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not execute template",
            )
        }
    }
}

/// Serves the landing page file as is.
pub fn serve_page_file(path: &Path, parts: &Parts) -> HttpResponse {
    StaticFiles::serve_single(path, &parts.headers, &parts.method)
        .unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Failed to serve page");
            e.into_response()
        })
}

/// Serves a file below the static directory.
pub fn serve_static(files: &StaticFiles, rest: &str, parts: &Parts) -> HttpResponse {
    files
        .handle(rest, &parts.headers, &parts.method)
        .unwrap_or_else(|e| {
            debug!(path = rest, error = %e, "Static file not served");
            e.into_response()
        })
}

fn book_response(status: StatusCode, book: &Book) -> HttpResponse {
    response::json(status, book).unwrap_or_else(|e| {
        error!(error = %e, "JSON encoding error");
        response::text_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode book")
    })
}

fn catalog_error(err: &CatalogError) -> HttpResponse {
    match err {
        CatalogError::NotFound { id } => info!(id = %id, "Book not found"),
        CatalogError::ReadOnly { operation } => warn!(operation, "Write rejected by read-only catalog"),
    }
    response::text_error(err.status_code(), err.client_message())
}

/// Decodes the first JSON value of `body`; anything after it is ignored.
fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::Deserializer::from_slice(body)
        .into_iter::<T>()
        .next()
        .unwrap_or_else(|| Err(serde_json::Error::custom("empty request body")))
}

/// Form fields of a request.
///
/// URL-encoded body fields come first, then query-string fields, so a body
/// value wins over a query value with the same name. Multipart fields are
/// appended after the query, so there the query wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    fields: Vec<(String, String)>,
}

impl FormFields {
    /// Collects the form fields of a request.
    ///
    /// The body is read as a form when its content type is
    /// `application/x-www-form-urlencoded` or `multipart/form-data`; file
    /// parts of a multipart body are skipped. Malformed input is skipped.
    pub async fn from_request(parts: &Parts, body: &Bytes) -> Self {
        let mut fields = Vec::new();

        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());

        let urlencoded = content_type
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));
        if urlencoded {
            match serde_urlencoded::from_bytes::<Vec<(String, String)>>(body) {
                Ok(body_fields) => fields.extend(body_fields),
                Err(e) => debug!(error = %e, "Ignoring malformed form body"),
            }
        }

        if let Some(query) = parts.uri.query() {
            match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
                Ok(query_fields) => fields.extend(query_fields),
                Err(e) => debug!(error = %e, "Ignoring malformed query string"),
            }
        }

        if let Some(boundary) = content_type.and_then(|value| multer::parse_boundary(value).ok()) {
            match read_multipart(body.clone(), boundary).await {
                Ok(body_fields) => fields.extend(body_fields),
                Err(e) => debug!(error = %e, "Ignoring malformed multipart body"),
            }
        }

        Self { fields }
    }

    /// The first value of `name`, or an empty string.
    pub fn value(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }
}

/// Reads the text parts of a `multipart/form-data` body.
async fn read_multipart(
    body: Bytes,
    boundary: String,
) -> Result<Vec<(String, String)>, multer::Error> {
    let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        fields.push((name, field.text().await?));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_core::{BookStore, FixedCatalog};
    use http::Request;
    use http_body_util::BodyExt;

    async fn body_string(response: HttpResponse) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn parts(uri: &str, content_type: Option<&str>) -> Parts {
        let mut builder = Request::post(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(()).unwrap().into_parts().0
    }

    const FORM: Option<&str> = Some("application/x-www-form-urlencoded");

    async fn form(uri: &str, content_type: Option<&str>, body: impl Into<Bytes>) -> FormFields {
        FormFields::from_request(&parts(uri, content_type), &body.into()).await
    }

    fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
        let mut body = String::new();
        for (name, filename, value) in parts {
            body.push_str(&format!("--{boundary}\r\n"));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{boundary}--\r\n"));
        body.into_bytes()
    }

    #[tokio::test]
    async fn test_form_fields_from_body() {
        let form = form("/books", FORM, &b"title=Dune&author=Frank+Herbert"[..]).await;
        assert_eq!(form.value("title"), "Dune");
        assert_eq!(form.value("author"), "Frank Herbert");
        assert_eq!(form.value("isbn"), "");
    }

    #[tokio::test]
    async fn test_form_fields_body_wins_over_query() {
        let form = form("/books?title=Query&author=Q", FORM, &b"title=Body"[..]).await;
        assert_eq!(form.value("title"), "Body");
        assert_eq!(form.value("author"), "Q");
    }

    #[tokio::test]
    async fn test_form_fields_ignore_non_form_body() {
        let form = form("/books?author=Herbert", Some("application/json"), &b"title=Dune"[..]).await;
        assert_eq!(form.value("title"), "");
        assert_eq!(form.value("author"), "Herbert");
    }

    #[tokio::test]
    async fn test_form_fields_from_multipart() {
        let body = multipart_body(
            "shelf-boundary",
            &[
                ("title", None, "Emma"),
                ("cover", Some("cover.png"), "PNG"),
                ("author", None, "Austen"),
            ],
        );
        let form = form(
            "/books",
            Some("multipart/form-data; boundary=shelf-boundary"),
            body,
        )
        .await;

        assert_eq!(form.value("title"), "Emma");
        assert_eq!(form.value("author"), "Austen");
        assert_eq!(form.value("cover"), "");
    }

    #[tokio::test]
    async fn test_form_fields_query_wins_over_multipart() {
        let body = multipart_body("b", &[("title", None, "Body"), ("author", None, "Austen")]);
        let form = form("/books?title=Query", Some("multipart/form-data; boundary=b"), body).await;

        assert_eq!(form.value("title"), "Query");
        assert_eq!(form.value("author"), "Austen");
    }

    #[tokio::test]
    async fn test_form_fields_malformed_multipart_is_skipped() {
        let form = form(
            "/books?author=Herbert",
            Some("multipart/form-data; boundary=b"),
            &b"no boundary here"[..],
        )
        .await;

        assert_eq!(form.value("title"), "");
        assert_eq!(form.value("author"), "Herbert");
    }

    #[tokio::test]
    async fn test_create_from_multipart() {
        let store = BookStore::new();
        let body = multipart_body("b", &[("title", None, "Emma"), ("author", None, "Austen")]);
        let fields = form("/books", Some("multipart/form-data; boundary=b"), body).await;

        let response = create_book(&store, &fields);
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(store.list(), vec![Book::new("1", "Emma", "Austen")]);
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let store = BookStore::new();
        let fields = form("/books", FORM, &b"title=Dune&author=Herbert"[..]).await;

        let response = create_book(&store, &fields);
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_string(response).await,
            "{\"id\":\"1\",\"title\":\"Dune\",\"author\":\"Herbert\"}\n"
        );

        let response = list_books(&store);
        assert_eq!(
            body_string(response).await,
            "[{\"id\":\"1\",\"title\":\"Dune\",\"author\":\"Herbert\"}]\n"
        );
    }

    #[tokio::test]
    async fn test_list_empty_is_array() {
        let response = list_books(&BookStore::new());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "[]\n");
    }

    #[tokio::test]
    async fn test_update_forces_path_id() {
        let store = BookStore::new();
        store.create(NewBook::new("Dune", "Herbert")).unwrap();

        let response = update_book(
            &store,
            "1",
            br#"{"id":"99","title":"Dune Messiah","author":"Frank Herbert"}"#,
        );
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            "{\"id\":\"1\",\"title\":\"Dune Messiah\",\"author\":\"Frank Herbert\"}\n"
        );
        assert_eq!(store.list()[0].id, "1");
    }

    #[tokio::test]
    async fn test_update_invalid_json() {
        let store = BookStore::new();
        store.create(NewBook::new("Dune", "Herbert")).unwrap();

        for body in [&b"not json"[..], b"", b"{\"title\": 5}"] {
            let response = update_book(&store, "1", body);
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_string(response).await, "Invalid JSON payload\n");
        }
        assert_eq!(store.list()[0].title, "Dune");
    }

    #[tokio::test]
    async fn test_update_null_body_clears_fields() {
        let store = BookStore::new();
        store.create(NewBook::new("Dune", "Herbert")).unwrap();

        let response = update_book(&store, "1", b"null");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            "{\"id\":\"1\",\"title\":\"\",\"author\":\"\"}\n"
        );
    }

    #[tokio::test]
    async fn test_update_matches_keys_case_insensitively() {
        let store = BookStore::new();
        store.create(NewBook::new("Dune", "Herbert")).unwrap();

        let response = update_book(&store, "1", br#"{"Title":"Emma","AUTHOR":"Austen"}"#);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.list(), vec![Book::new("1", "Emma", "Austen")]);
    }

    #[tokio::test]
    async fn test_update_ignores_trailing_data() {
        let store = BookStore::new();
        store.create(NewBook::new("Dune", "Herbert")).unwrap();

        let response = update_book(&store, "1", br#"{"title":"Emma"} trailing"#);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.list()[0].title, "Emma");
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = BookStore::new();
        let response = update_book(&store, "7", br#"{"title":"Emma"}"#);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "Book not found\n");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let store = BookStore::new();
        store.create(NewBook::new("Dune", "Herbert")).unwrap();

        let response = delete_book(&store, "1");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(body_string(response).await, "");

        let response = delete_book(&store, "1");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "Book not found\n");
    }

    #[test]
    fn test_read_only_catalog_rejects_writes() {
        let catalog = FixedCatalog::demo();
        let response = delete_book(&catalog, "1");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(catalog.list().len(), 1);
    }

    #[tokio::test]
    async fn test_render_page_error() {
        let template = PageTemplate::parse("{{.Author}}").unwrap();
        let response = render_page(&template, &PageData::new("t", "h", "c"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "Could not execute template\n");
    }

    #[test]
    fn test_serve_missing_page_file() {
        let dir = tempfile::tempdir().unwrap();
        let parts = Request::get("/").body(Bytes::new()).unwrap().into_parts().0;

        let response = serve_page_file(&dir.path().join("template.html"), &parts);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
