use crate::config::{Config, DEFAULT_BASE_URL};
use crate::fetcher::WorkFetcher;
use crate::parsing::WorkParser;
use crate::{DlsiteError, Locale, ProductCode, Result, Work};
use async_trait::async_trait;
use http_client::{HttpClient, Request, Response};
use http_types::{Method, StatusCode, Url};
use std::fs;
use std::path::Path;

const MAX_REDIRECTS: u32 = 5;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

/// Client for DLsite product pages.
///
/// Fetches the work page for a product code, falling back to the announce
/// page when the work page does not exist (works that are announced but not
/// yet on sale), and parses the result into a [`Work`].
///
/// # Examples
///
/// ```rust,no_run
/// use dlsite_org::{DlsiteClient, Result};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<()> {
///     let http_client = http_client::native::NativeClient::new();
///     let client = DlsiteClient::new(Box::new(http_client));
///
///     let work = client.get_work(&"RJ123456".parse()?).await?;
///     println!("{}", work.path().display());
///     Ok(())
/// }
/// ```
pub struct DlsiteClient {
    client: Box<dyn HttpClient>,
    base_url: String,
    locale: Locale,
    parser: WorkParser,
    debug_save_responses: bool,
}

impl DlsiteClient {
    /// Create a new [`DlsiteClient`] for the default DLsite section.
    pub fn new(client: Box<dyn HttpClient>) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL.to_string())
    }

    /// Create a new [`DlsiteClient`] with a custom base URL.
    ///
    /// This is useful for testing or for other DLsite sections.
    pub fn with_base_url(client: Box<dyn HttpClient>, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            locale: Locale::default(),
            parser: WorkParser::new(Locale::default()),
            debug_save_responses: false,
        }
    }

    /// Create a client from runtime configuration.
    pub fn from_config(client: Box<dyn HttpClient>, config: &Config) -> Self {
        let mut dlsite = Self::with_base_url(client, config.base_url.clone()).with_locale(config.locale);
        dlsite.debug_save_responses = config.debug_save_responses;
        dlsite
    }

    /// Request pages in `locale` and parse them with that locale's labels.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self.parser = WorkParser::new(locale);
        self
    }

    /// URL of the regular product page for a code.
    pub fn work_url(&self, code: &ProductCode) -> String {
        format!(
            "{}/work/=/product_id/{code}.html{}",
            self.base_url,
            self.locale_query()
        )
    }

    /// URL of the announce page for a code.
    pub fn announce_url(&self, code: &ProductCode) -> String {
        format!(
            "{}/announce/=/product_id/{code}.html{}",
            self.base_url,
            self.locale_query()
        )
    }

    fn locale_query(&self) -> String {
        if self.locale.is_site_default() {
            String::new()
        } else {
            format!("?locale={}", self.locale.tag())
        }
    }

    /// Fetch and parse the metadata for `code`.
    pub async fn get_work(&self, code: &ProductCode) -> Result<Work> {
        log::debug!("Fetching work {code}");
        let page = self.fetch_page(code).await?;
        self.parser.parse(code, &page)
    }

    /// Fetch the page text for `code`.
    ///
    /// A 404 from the work page triggers exactly one request for the announce
    /// page. Every other failure is returned as is.
    pub async fn fetch_page(&self, code: &ProductCode) -> Result<String> {
        let work_url = self.work_url(code);
        let response = self.get(&work_url).await?;

        // Announced works only have the announce page
        let (url, mut response) = if response.status() == StatusCode::NotFound {
            let announce_url = self.announce_url(code);
            log::info!("{code} has no work page, trying {announce_url}");
            let response = self.get(&announce_url).await?;
            (announce_url, response)
        } else {
            (work_url, response)
        };

        let status = response.status();
        if !status.is_success() {
            return Err(DlsiteError::Status {
                status: status.into(),
                url,
            });
        }

        let body = response
            .body_string()
            .await
            .map_err(|e| DlsiteError::Http(e.to_string()))?;
        log::debug!("Fetched {url}: {status}, {} chars", body.len());

        if self.debug_save_responses {
            self.save_debug_response(&url, status.into(), &body);
        }
        Ok(body)
    }

    /// Make an HTTP GET request, following redirects.
    async fn get(&self, url: &str) -> Result<Response> {
        let mut current = url.to_string();
        // One initial request plus up to MAX_REDIRECTS hops
        for _ in 0..=MAX_REDIRECTS {
            let response = self.send_get(&current).await?;
            if !is_redirect(response.status()) {
                return Ok(response);
            }

            // A redirect without a Location is handed back as is and fails
            // the status check in fetch_page
            let Some(location) = response.header("location").and_then(|values| values.get(0))
            else {
                return Ok(response);
            };

            // Location may be relative to the current URL
            let next = resolve_redirect(&current, location.as_str())?;
            log::debug!("Following redirect from {current} to {next}");
            current = next;
        }
        Err(DlsiteError::Http(format!("Too many redirects fetching {url}")))
    }

    async fn send_get(&self, url: &str) -> Result<Response> {
        let parsed = url
            .parse::<Url>()
            .map_err(|e| DlsiteError::Http(format!("Invalid URL {url}: {e}")))?;
        let mut request = Request::new(Method::Get, parsed);
        request.insert_header("User-Agent", USER_AGENT);
        request.insert_header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        );
        // ja_JP -> ja-JP
        let language = self.locale.tag().replace('_', "-");
        request.insert_header("Accept-Language", language.as_str());

        self.client
            .send(request)
            .await
            .map_err(|e| DlsiteError::Http(e.to_string()))
    }

    /// Save response to debug directory (optional debug feature)
    fn save_debug_response(&self, url: &str, status_code: u16, body: &str) {
        if let Err(e) = self.try_save_debug_response(url, status_code, body) {
            log::warn!("Failed to save debug response: {e}");
        }
    }

    fn try_save_debug_response(&self, url: &str, status_code: u16, body: &str) -> Result<()> {
        let debug_dir = Path::new("debug_responses");
        fs::create_dir_all(debug_dir)?;

        let url_path = url.strip_prefix(self.base_url.as_str()).unwrap_or(url);
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%3f");
        let safe_path = url_path.replace(['/', '?', '&', '=', '%', '+'], "_");

        let file_path = debug_dir.join(format!("{timestamp}_{safe_path}_status{status_code}.html"));
        fs::write(&file_path, body)?;

        log::debug!("Saved HTTP response to {file_path:?} (status: {status_code}, url: {url_path})");
        Ok(())
    }
}

#[async_trait(?Send)]
impl WorkFetcher for DlsiteClient {
    async fn fetch_work(&mut self, code: &ProductCode) -> Result<Work> {
        self.get_work(code).await
    }

    fn cache_key(&self, code: &ProductCode) -> String {
        if self.locale.is_site_default() {
            code.to_string()
        } else {
            format!("{code}@{}", self.locale.tag())
        }
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MovedPermanently
            | StatusCode::Found
            | StatusCode::SeeOther
            | StatusCode::TemporaryRedirect
            | StatusCode::PermanentRedirect
    )
}

fn resolve_redirect(current: &str, location: &str) -> Result<String> {
    let base = current
        .parse::<Url>()
        .map_err(|e| DlsiteError::Http(format!("Invalid URL {current}: {e}")))?;
    base.join(location)
        .map(String::from)
        .map_err(|e| DlsiteError::Http(format!("Invalid redirect location {location:?}: {e}")))
}
