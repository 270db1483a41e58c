//! The landing page template.
//!
//! Templates are HTML with `{{.Field}}` placeholders. A template is parsed
//! once at startup, so syntax errors are reported before the server binds.
//! Field values are HTML-escaped at render time; a placeholder naming a
//! field that [`PageData`] does not have is a render error.
//!
//! ```rust
//! use bookshelf_server::page::{PageData, PageTemplate};
//!
//! let template = PageTemplate::parse("<h1>{{.Heading}}</h1>").unwrap();
//! let data = PageData::new("Title", "Fish & Chips", "Body");
//! assert_eq!(template.render(&data).unwrap(), "<h1>Fish &amp; Chips</h1>");
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while loading or rendering a page template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template file could not be read.
    #[error("Failed to read template {path}: {source}")]
    Io {
        /// Path of the template file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A `{{` without a matching `}}`.
    #[error("Unclosed action at byte {offset}")]
    UnclosedAction {
        /// Byte offset of the opening braces.
        offset: usize,
    },

    /// An action that is not a `.Field` reference.
    #[error("Unsupported action '{action}' at byte {offset}")]
    BadAction {
        /// The action text between the braces.
        action: String,
        /// Byte offset of the opening braces.
        offset: usize,
    },

    /// A placeholder names a field the page data does not have.
    #[error("Can't evaluate field {name}")]
    UnknownField {
        /// The field name.
        name: String,
    },
}

/// Values substituted into the page template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageData {
    /// `{{.Title}}`
    pub title: String,
    /// `{{.Heading}}`
    pub heading: String,
    /// `{{.Content}}`
    pub content: String,
}

impl PageData {
    /// Creates page data.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        heading: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            heading: heading.into(),
            content: content.into(),
        }
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "Title" => Some(&self.title),
            "Heading" => Some(&self.heading),
            "Content" => Some(&self.content),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(String),
}

/// A parsed page template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTemplate {
    segments: Vec<Segment>,
}

impl PageTemplate {
    /// Parses template source.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::UnclosedAction` or `TemplateError::BadAction`
    /// for malformed placeholders.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut consumed = 0;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Text(rest[..open].to_string()));
            }
            let offset = consumed + open;
            let after_open = &rest[open + 2..];
            let close = after_open
                .find("}}")
                .ok_or(TemplateError::UnclosedAction { offset })?;

            let action = after_open[..close].trim();
            segments.push(Segment::Field(parse_field(action, offset)?));

            let advance = open + 2 + close + 2;
            rest = &rest[advance..];
            consumed += advance;
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// Reads and parses a template file.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Io` if the file cannot be read, or a parse
    /// error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }

    /// Renders the template with `data`.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::UnknownField` if a placeholder names a field
    /// `data` does not have.
    pub fn render(&self, data: &PageData) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(name) => {
                    let value = data
                        .field(name)
                        .ok_or_else(|| TemplateError::UnknownField { name: name.clone() })?;
                    push_escaped(&mut out, value);
                }
            }
        }
        Ok(out)
    }

    /// Names of the fields referenced by the template, in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }
}

fn parse_field(action: &str, offset: usize) -> Result<String, TemplateError> {
    let bad = || TemplateError::BadAction {
        action: action.to_string(),
        offset,
    };
    let name = action.strip_prefix('.').ok_or_else(bad)?;
    let valid = name.chars().next().is_some_and(char::is_alphabetic)
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if valid {
        Ok(name.to_string())
    } else {
        Err(bad())
    }
}

/// HTML escape for text content.
fn push_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            '\0' => out.push('\u{FFFD}'),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> PageData {
        PageData::new("Library", "Welcome", "All the books.")
    }

    #[test]
    fn test_render_all_fields() {
        let template = PageTemplate::parse(
            "<title>{{.Title}}</title><h1>{{ .Heading }}</h1><p>{{.Content}}</p>",
        )
        .unwrap();

        assert_eq!(
            template.render(&data()).unwrap(),
            "<title>Library</title><h1>Welcome</h1><p>All the books.</p>"
        );
    }

    #[test]
    fn test_render_without_placeholders() {
        let template = PageTemplate::parse("<p>static</p>").unwrap();
        assert_eq!(template.render(&data()).unwrap(), "<p>static</p>");
        assert_eq!(template.fields().count(), 0);
    }

    #[test]
    fn test_values_are_escaped() {
        let template = PageTemplate::parse("{{.Content}}").unwrap();
        let data = PageData::new("", "", "<script>alert('x') & \"y\"</script>");

        assert_eq!(
            template.render(&data).unwrap(),
            "&lt;script&gt;alert(&#39;x&#39;) &amp; &#34;y&#34;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_unclosed_action() {
        let err = PageTemplate::parse("<p>{{.Title</p>").unwrap_err();
        assert!(matches!(err, TemplateError::UnclosedAction { offset: 3 }));
    }

    #[test]
    fn test_bad_action() {
        let err = PageTemplate::parse("{{range .Books}}").unwrap_err();
        assert!(matches!(err, TemplateError::BadAction { .. }));

        let err = PageTemplate::parse("{{.}}").unwrap_err();
        assert!(matches!(err, TemplateError::BadAction { .. }));
    }

    #[test]
    fn test_unknown_field_fails_at_render() {
        let template = PageTemplate::parse("{{.Author}}").unwrap();
        let err = template.render(&data()).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownField { ref name } if name == "Author"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.html");
        std::fs::write(&path, "<h1>{{.Heading}}</h1>\n").unwrap();

        let template = PageTemplate::from_file(&path).unwrap();
        assert_eq!(template.render(&data()).unwrap(), "<h1>Welcome</h1>\n");
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PageTemplate::from_file(dir.path().join("missing.html")).unwrap_err();
        assert!(matches!(err, TemplateError::Io { .. }));
    }
}
