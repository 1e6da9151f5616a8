use crate::{DlsiteError, Locale, Result};
use std::env;
use std::path::PathBuf;

/// Default DLsite section the product pages are fetched from.
pub const DEFAULT_BASE_URL: &str = "https://www.dlsite.com/maniax";

pub const BASE_URL_VAR: &str = "DLSITE_ORG_BASE_URL";
pub const LOCALE_VAR: &str = "DLSITE_ORG_LOCALE";
pub const CACHE_VAR: &str = "DLSITE_ORG_CACHE";
pub const DEBUG_SAVE_RESPONSES_VAR: &str = "DLSITE_ORG_DEBUG_SAVE_RESPONSES";

/// Runtime configuration, read from the environment.
///
/// * `DLSITE_ORG_BASE_URL` - site section to fetch from
/// * `DLSITE_ORG_LOCALE` - page locale tag such as `ja_JP` or `en_US`
/// * `DLSITE_ORG_CACHE` - path of the work cache store
/// * `DLSITE_ORG_DEBUG_SAVE_RESPONSES` - if set, fetched pages are saved to
///   `debug_responses/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub locale: Locale,
    pub cache_path: PathBuf,
    pub debug_save_responses: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let base_url = env::var(BASE_URL_VAR)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let locale = match env::var(LOCALE_VAR) {
            Ok(tag) => tag.parse()?,
            Err(_) => Locale::default(),
        };

        let cache_path = match env::var_os(CACHE_VAR) {
            Some(path) => PathBuf::from(path),
            None => Self::default_cache_path()?,
        };

        Ok(Self {
            base_url,
            locale,
            cache_path,
            debug_save_responses: env::var_os(DEBUG_SAVE_RESPONSES_VAR).is_some(),
        })
    }

    /// Get the cache store path using XDG directories.
    ///
    /// Returns a path like: `~/.cache/dlsite-org/works.db`
    pub fn default_cache_path() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir().ok_or_else(|| {
            DlsiteError::Config("Cannot determine XDG cache directory".to_string())
        })?;
        Ok(cache_dir.join("dlsite-org").join("works.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_path() {
        let path = Config::default_cache_path().unwrap();
        assert!(path.ends_with("dlsite-org/works.db"));
    }
}
