//! Data types for DLsite work metadata.
//!
//! [`Work`] is the record produced by parsing a product page. Its canonical
//! directory path and filename depend only on its own fields, which keeps
//! organizing a library deterministic.

use crate::ProductCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Age rating of a work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeRating {
    AllAges,
    R15,
    R18,
}

/// One entry of a work's tracklist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    /// Track name, usually including its number
    pub name: String,
    /// Descriptive text shown next to the name
    pub text: String,
}

impl Track {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.text)
    }
}

/// Metadata for a single DLsite work.
///
/// `code`, `title` and `maker` are always present. Every other field is
/// filled in only if it could be found on the product page; `None` means
/// "not determined", which is different from a determined empty value.
///
/// # Examples
///
/// ```rust
/// use dlsite_org::Work;
/// use std::path::PathBuf;
///
/// let mut work = Work::new("RJ123".parse().unwrap(), "name", "group");
/// work.series = Some("series".to_string());
///
/// assert_eq!(work.path(), PathBuf::from("group/series/RJ123 name"));
/// assert_eq!(work.filename(), "RJ123 [group] name");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    pub code: ProductCode,
    pub title: String,
    pub maker: String,
    pub series: Option<String>,
    /// Description text, terminated by a single newline
    pub description: Option<String>,
    pub age: Option<AgeRating>,
    pub genres: Option<Vec<String>>,
    pub tracklist: Option<Vec<Track>>,
    /// Absolute URLs of the product images, main image first
    #[serde(default)]
    pub images: Vec<String>,
}

impl Work {
    pub fn new(code: ProductCode, title: impl Into<String>, maker: impl Into<String>) -> Self {
        Self {
            code,
            title: title.into(),
            maker: maker.into(),
            series: None,
            description: None,
            age: None,
            genres: None,
            tracklist: None,
            images: Vec::new(),
        }
    }

    /// Relative path this work's directory should live at.
    ///
    /// The layout is `maker/[series/]code title`. Every segment has path
    /// separators replaced, so the result always has two or three
    /// components.
    pub fn path(&self) -> PathBuf {
        let mut path = PathBuf::from(escape_filename(&self.maker));
        if let Some(series) = self.series.as_deref().filter(|s| !s.is_empty()) {
            path.push(escape_filename(series));
        }
        path.push(escape_filename(&format!("{} {}", self.code, self.title)));
        path
    }

    /// Standalone filename for this work, used when renaming in place.
    pub fn filename(&self) -> String {
        escape_filename(&self.to_string())
    }
}

impl fmt::Display for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.code, self.maker, self.title)
    }
}

/// Make `name` usable as a single path segment.
///
/// Path separators become `_`. An empty name becomes `_`, and the special
/// segments `.` and `..` have their dots replaced, so a segment never escapes
/// or collapses into its parent.
pub fn escape_filename(name: &str) -> String {
    let escaped = name.replace('/', "_");
    match escaped.as_str() {
        "" => "_".to_string(),
        "." | ".." => escaped.replace('.', "_"),
        _ => escaped,
    }
}
