use dlsite_org::{CachedFetcher, Config, DlsiteClient};

pub type Fetcher = CachedFetcher<DlsiteClient>;

/// Create a cached fetcher for `config` and open its store.
///
/// Callers must close the returned fetcher when done so the store is flushed.
pub fn open_fetcher(config: &Config) -> Result<Fetcher, Box<dyn std::error::Error>> {
    let http_client = http_client::native::NativeClient::new();
    let client = DlsiteClient::from_config(Box::new(http_client), config);
    let mut fetcher = CachedFetcher::new(&config.cache_path, client);
    fetcher.open()?;
    log::debug!("Using cache {}", fetcher.path().display());
    Ok(fetcher)
}
