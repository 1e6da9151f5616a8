//! Persistent cache of fetched work metadata.

use crate::fetcher::WorkFetcher;
use crate::{DlsiteError, ProductCode, Result, Work};
use async_trait::async_trait;
use pickledb::{PickleDb, PickleDbDumpPolicy};
use std::fs;
use std::path::{Path, PathBuf};

/// Work fetcher that remembers results in an on-disk store.
///
/// `CachedFetcher` does not fetch anything itself; it wraps another
/// [`WorkFetcher`] and only calls it for codes that are not cached yet. The
/// store has to be opened with [`open`](Self::open) before use and should be
/// closed with [`close`](Self::close) afterwards.
///
/// The store is a `pickledb` JSON file that is rewritten on every insert, so
/// records fetched before an interruption are kept. Only one process may use
/// a store file at a time.
///
/// ```rust,no_run
/// use dlsite_org::{CachedFetcher, DlsiteClient, Result};
///
/// # async fn run() -> Result<()> {
/// let client = DlsiteClient::new(Box::new(http_client::native::NativeClient::new()));
/// let mut fetcher = CachedFetcher::new("/tmp/works.db", client);
/// fetcher.open()?;
/// let work = fetcher.get_or_fetch(&"RJ123456".parse()?).await?;
/// fetcher.close()?;
/// # Ok(())
/// # }
/// ```
pub struct CachedFetcher<F> {
    inner: F,
    path: PathBuf,
    db: Option<PickleDb>,
}

impl<F: WorkFetcher> CachedFetcher<F> {
    pub fn new(path: impl Into<PathBuf>, inner: F) -> Self {
        Self {
            inner,
            path: path.into(),
            db: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.db.is_some()
    }

    /// Open the store, loading it if the file exists and creating it otherwise.
    pub fn open(&mut self) -> Result<()> {
        if self.db.is_some() {
            return Err(DlsiteError::InvalidState(format!(
                "cache {} is already open",
                self.path.display()
            )));
        }

        let db = if self.path.exists() {
            PickleDb::load_json(&self.path, PickleDbDumpPolicy::AutoDump).map_err(|e| {
                DlsiteError::Cache(format!("Failed to load {}: {e}", self.path.display()))
            })?
        } else {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            PickleDb::new_json(&self.path, PickleDbDumpPolicy::AutoDump)
        };

        log::debug!(
            "Opened cache {} with {} entries",
            self.path.display(),
            db.total_keys()
        );
        self.db = Some(db);
        Ok(())
    }

    /// Flush and close the store. Closing a closed cache does nothing.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut db) = self.db.take() {
            db.dump().map_err(|e| {
                DlsiteError::Cache(format!("Failed to write {}: {e}", self.path.display()))
            })?;
            log::debug!("Closed cache {}", self.path.display());
        }
        Ok(())
    }

    /// Return the cached work for `code`, fetching and storing it if needed.
    pub async fn get_or_fetch(&mut self, code: &ProductCode) -> Result<Work> {
        let key = self.inner.cache_key(code);
        let db = self.db.as_ref().ok_or_else(|| self.closed_error())?;

        // Entries in an older format fail to deserialize and are refetched
        if db.exists(&key) {
            match db.get::<Work>(&key) {
                Some(work) => {
                    log::debug!("Cache hit for {key}");
                    return Ok(work);
                }
                None => log::warn!("Discarding unreadable cache entry for {key}"),
            }
        }

        log::debug!("Cache miss for {key}");
        let work = self.inner.fetch_work(code).await?;

        // AutoDump writes the store file on every set
        let db = self.db.as_mut().ok_or_else(|| {
            DlsiteError::InvalidState("cache was closed during fetch".to_string())
        })?;
        db.set(&key, &work)
            .map_err(|e| DlsiteError::Cache(format!("Failed to store {key}: {e}")))?;
        Ok(work)
    }

    fn closed_error(&self) -> DlsiteError {
        DlsiteError::InvalidState(format!(
            "cache {} used before open()",
            self.path.display()
        ))
    }
}

#[async_trait(?Send)]
impl<F: WorkFetcher> WorkFetcher for CachedFetcher<F> {
    async fn fetch_work(&mut self, code: &ProductCode) -> Result<Work> {
        self.get_or_fetch(code).await
    }

    fn cache_key(&self, code: &ProductCode) -> String {
        self.inner.cache_key(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::MockWorkFetcher;
    use crate::types::{AgeRating, Track};
    use tempfile::TempDir;

    fn code() -> ProductCode {
        "RJ189758".parse().unwrap()
    }

    fn full_work(code: &ProductCode) -> Work {
        let mut work = Work::new(code.clone(), "name", "group");
        work.series = Some("series".to_string());
        work.description = Some("Some text\n\nOther text\n".to_string());
        work.age = Some(AgeRating::R15);
        work.genres = Some(vec!["b".to_string(), "a".to_string()]);
        work.tracklist = Some(vec![Track::new("1. foo", "bar"), Track::new("2. spam", "eggs")]);
        work.images = vec!["https://img.example/1.jpg".to_string()];
        work
    }

    fn mock_once(work: Work) -> MockWorkFetcher {
        let mut mock = MockWorkFetcher::new();
        mock.expect_cache_key().returning(|code| code.to_string());
        mock.expect_fetch_work()
            .times(1)
            .returning(move |_| Ok(work.clone()));
        mock
    }

    #[tokio::test]
    async fn test_used_without_open() {
        let dir = TempDir::new().unwrap();
        let mut mock = MockWorkFetcher::new();
        mock.expect_cache_key().returning(|code| code.to_string());
        mock.expect_fetch_work().never();
        let mut fetcher = CachedFetcher::new(dir.path().join("cache"), mock);

        let err = fetcher.get_or_fetch(&code()).await.unwrap_err();
        assert!(matches!(err, DlsiteError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_used_after_close() {
        let dir = TempDir::new().unwrap();
        let mut fetcher = CachedFetcher::new(dir.path().join("cache"), mock_once(full_work(&code())));
        fetcher.open().unwrap();
        fetcher.get_or_fetch(&code()).await.unwrap();
        fetcher.close().unwrap();

        let err = fetcher.get_or_fetch(&code()).await.unwrap_err();
        assert!(matches!(err, DlsiteError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let dir = TempDir::new().unwrap();
        let expected = full_work(&code());
        let mut fetcher = CachedFetcher::new(dir.path().join("cache"), mock_once(expected.clone()));
        fetcher.open().unwrap();

        let first = fetcher.get_or_fetch(&code()).await.unwrap();
        let second = fetcher.get_or_fetch(&code()).await.unwrap();
        fetcher.close().unwrap();

        assert_eq!(first, expected);
        assert_eq!(second, expected);
    }

    #[tokio::test]
    async fn test_round_trip_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("works.db");

        for work in [full_work(&code()), Work::new(code(), "bare", "maker")] {
            std::fs::remove_file(&path).ok();

            let mut writer = CachedFetcher::new(&path, mock_once(work.clone()));
            writer.open().unwrap();
            writer.get_or_fetch(&code()).await.unwrap();
            writer.close().unwrap();

            let mut reader_mock = MockWorkFetcher::new();
            reader_mock.expect_cache_key().returning(|code| code.to_string());
            reader_mock.expect_fetch_work().never();
            let mut reader = CachedFetcher::new(&path, reader_mock);
            reader.open().unwrap();
            let restored = reader.get_or_fetch(&code()).await.unwrap();
            reader.close().unwrap();

            assert_eq!(restored, work);
        }
    }

    #[tokio::test]
    async fn test_fetch_errors_are_not_cached() {
        let dir = TempDir::new().unwrap();
        let mut mock = MockWorkFetcher::new();
        mock.expect_cache_key().returning(|code| code.to_string());
        let mut calls = 0;
        mock.expect_fetch_work().times(2).returning(move |code| {
            calls += 1;
            if calls == 1 {
                Err(DlsiteError::Http("connection reset".to_string()))
            } else {
                Ok(Work::new(code.clone(), "name", "group"))
            }
        });
        let mut fetcher = CachedFetcher::new(dir.path().join("cache"), mock);
        fetcher.open().unwrap();

        assert!(fetcher.get_or_fetch(&code()).await.is_err());
        assert_eq!(fetcher.get_or_fetch(&code()).await.unwrap().title, "name");
    }

    #[tokio::test]
    async fn test_cache_key_includes_discriminator() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache");
        let mut mock = MockWorkFetcher::new();
        mock.expect_cache_key()
            .returning(|code| format!("{code}@en_US"));
        mock.expect_fetch_work()
            .times(1)
            .returning(|code| Ok(Work::new(code.clone(), "name", "group")));
        let mut fetcher = CachedFetcher::new(&path, mock);
        fetcher.open().unwrap();
        fetcher.get_or_fetch(&code()).await.unwrap();
        fetcher.close().unwrap();

        let db = PickleDb::load_json(&path, PickleDbDumpPolicy::NeverDump).unwrap();
        assert!(db.exists("RJ189758@en_US"));
        assert!(!db.exists("RJ189758"));
    }

    #[test]
    fn test_open_twice_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut fetcher = CachedFetcher::new(dir.path().join("cache"), MockWorkFetcher::new());
        fetcher.open().unwrap();
        assert!(matches!(fetcher.open(), Err(DlsiteError::InvalidState(_))));
        assert!(fetcher.is_open());
        fetcher.close().unwrap();
        assert!(!fetcher.is_open());
    }
}
