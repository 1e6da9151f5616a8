#![allow(dead_code)]
use async_trait::async_trait;
use dlsite_org::DlsiteClient;
use http_client::{HttpClient, Request, Response};
use http_types::StatusCode;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "http://dlsite.test/maniax";

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// In-memory HTTP client serving product pages from `tests/fixtures/`.
///
/// `{base}/work/=/product_id/CODE.html` is answered with
/// `fixtures/work/CODE.html` and the announce URL with
/// `fixtures/announce/CODE.html`. Anything else is a 404. Requested URLs are
/// recorded so tests can check which pages were fetched.
#[derive(Debug, Clone, Default)]
pub struct FixtureClient {
    requests: Arc<Mutex<Vec<String>>>,
    statuses: HashMap<String, StatusCode>,
    redirects: HashMap<String, String>,
}

impl FixtureClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for `path` with `status` and an empty body.
    pub fn with_status(mut self, path: &str, status: StatusCode) -> Self {
        self.statuses.insert(path.to_string(), status);
        self
    }

    /// Answer requests for `path` with a redirect to `location`.
    pub fn with_redirect(mut self, path: &str, location: &str) -> Self {
        self.redirects.insert(path.to_string(), location.to_string());
        self
    }

    /// Handle to the URLs requested so far, usable after the client is boxed.
    pub fn requests(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.requests)
    }

    pub fn into_dlsite_client(self) -> DlsiteClient {
        DlsiteClient::with_base_url(Box::new(self), BASE_URL.to_string())
    }

    fn fixture_for(path: &str) -> Option<PathBuf> {
        let (kind, name) = path.rsplit_once("/=/product_id/")?;
        let kind = kind.rsplit('/').next()?;
        if kind != "work" && kind != "announce" {
            return None;
        }
        Some(fixtures_dir().join(kind).join(name))
    }
}

#[async_trait]
impl HttpClient for FixtureClient {
    async fn send(&self, req: Request) -> Result<Response, http_types::Error> {
        let url = req.url().to_string();
        let path = req.url().path().to_string();
        self.requests.lock().unwrap().push(url);

        if let Some(status) = self.statuses.get(&path) {
            return Ok(Response::new(*status));
        }

        if let Some(location) = self.redirects.get(&path) {
            let mut response = Response::new(StatusCode::Found);
            response.insert_header("Location", location.as_str());
            return Ok(response);
        }

        match Self::fixture_for(&path).and_then(|file| fs::read_to_string(file).ok()) {
            Some(body) => {
                let mut response = Response::new(StatusCode::Ok);
                response.insert_header("Content-Type", "text/html; charset=utf-8");
                response.set_body(body);
                Ok(response)
            }
            None => Ok(Response::new(StatusCode::NotFound)),
        }
    }
}

/// Client over the fixtures together with its request log.
pub fn fixture_client() -> (DlsiteClient, Arc<Mutex<Vec<String>>>) {
    let fixtures = FixtureClient::new();
    let requests = fixtures.requests();
    (fixtures.into_dlsite_client(), requests)
}
