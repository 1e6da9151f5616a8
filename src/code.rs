//! DLsite product codes ("RJ codes").
//!
//! Codes appear in directory names, file names and free text. The functions
//! here search text for codes; [`ProductCode::from_str`] is the strict form
//! used when a string has to be a code and nothing else.

use crate::{DlsiteError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RJ[0-9]+").expect("product code pattern is valid"));

static EXACT_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^RJ[0-9]+$").expect("product code pattern is valid"));

/// A validated DLsite product code such as `RJ123456`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductCode(String);

impl ProductCode {
    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProductCode {
    type Err = DlsiteError;

    fn from_str(s: &str) -> Result<Self> {
        if EXACT_CODE_PATTERN.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(DlsiteError::InvalidCode(s.to_string()))
        }
    }
}

impl TryFrom<String> for ProductCode {
    type Error = DlsiteError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ProductCode> for String {
    fn from(code: ProductCode) -> Self {
        code.0
    }
}

impl AsRef<str> for ProductCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Iterator over every product code in a string, left to right.
///
/// Produced by [`extract_all`]. Cloning the iterator restarts from the
/// clone's current position.
#[derive(Debug, Clone)]
pub struct Codes<'a> {
    text: &'a str,
    pos: usize,
}

impl Iterator for Codes<'_> {
    type Item = ProductCode;

    fn next(&mut self) -> Option<ProductCode> {
        if self.pos > self.text.len() {
            return None;
        }
        let found = CODE_PATTERN.find_at(self.text, self.pos)?;
        self.pos = found.end();
        Some(ProductCode(found.as_str().to_string()))
    }
}

/// Find the first product code in `text`.
pub fn extract(text: &str) -> Result<ProductCode> {
    extract_all(text)
        .next()
        .ok_or_else(|| DlsiteError::CodeNotFound(text.to_string()))
}

/// Lazily find all non-overlapping product codes in `text`.
pub fn extract_all(text: &str) -> Codes<'_> {
    Codes { text, pos: 0 }
}

/// Return true if `text` contains at least one product code.
pub fn contains(text: &str) -> bool {
    CODE_PATTERN.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract() {
        assert_eq!(extract("asdf RJ123 asdf").unwrap().as_str(), "RJ123");
    }

    #[test]
    fn test_extract_missing() {
        assert!(matches!(
            extract("asdf"),
            Err(DlsiteError::CodeNotFound(text)) if text == "asdf"
        ));
    }

    #[test]
    fn test_extract_all() {
        let codes: Vec<String> = extract_all("RJ1 RJ2 RJ3").map(String::from).collect();
        assert_eq!(codes, vec!["RJ1", "RJ2", "RJ3"]);
    }

    #[test]
    fn test_extract_all_adjacent_codes_do_not_overlap() {
        let codes: Vec<String> = extract_all("RJ12RJ34xRJ5").map(String::from).collect();
        assert_eq!(codes, vec!["RJ12", "RJ34", "RJ5"]);
    }

    #[test]
    fn test_extract_all_missing() {
        assert_eq!(extract_all("asdf").count(), 0);
        assert_eq!(extract_all("").count(), 0);
    }

    #[test]
    fn test_extract_all_is_restartable() {
        let mut codes = extract_all("RJ1 RJ2");
        let restarted = codes.clone();
        assert_eq!(codes.next().unwrap().as_str(), "RJ1");
        assert_eq!(restarted.count(), 2);
        assert_eq!(codes.count(), 1);
    }

    #[test]
    fn test_extract_is_first_of_extract_all() {
        for text in ["x RJ9 RJ8", "RJ0", "[RJ01234] title RJ5", "none"] {
            assert_eq!(extract(text).ok(), extract_all(text).next());
        }
    }

    #[test]
    fn test_contains() {
        assert!(contains("asdf RJ123 asdf"));
        assert!(!contains("asdf"));
        assert!(!contains("RJ"));
        assert!(!contains("rj123"));
    }

    #[test]
    fn test_strict_parse() {
        assert_eq!("RJ123".parse::<ProductCode>().unwrap().as_str(), "RJ123");
        for bad in ["", "RJ", " RJ123", "RJ123 ", "RJ123x", "xRJ123", "RJ1 RJ2"] {
            assert!(
                matches!(bad.parse::<ProductCode>(), Err(DlsiteError::InvalidCode(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_serde_validates() {
        let code: ProductCode = serde_json::from_str("\"RJ42\"").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"RJ42\"");
        assert!(serde_json::from_str::<ProductCode>("\"RJ42 \"").is_err());
    }
}
