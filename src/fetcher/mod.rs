/// HTTP boundary: the `HttpClient` trait and the profile page fetcher.
///
/// Every network failure stops here. `ResourceFetcher` turns transport
/// errors, timeouts and non-2xx statuses into `FetchResult::Absent`.
pub mod mock;
pub mod reqwest_client;

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

pub use reqwest_client::ReqwestClient;

use crate::models::FetchResult;

/// Errors that can occur while performing a single GET request.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Trait for blocking HTTP GET implementations.
///
/// Implementations carry the request timeout and identifying User-Agent
/// themselves, so every call made through the trait has both. Must be
/// `Send + Sync` so one client can serve the locale worker pool.
pub trait HttpClient: Send + Sync {
    /// GET `url` and return the body of a 2xx response.
    fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches athlete profile pages by slug.
#[derive(Clone)]
pub struct ResourceFetcher {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl ResourceFetcher {
    pub fn new(http: Arc<dyn HttpClient>, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Canonical profile URL for `slug`, optionally under a locale prefix.
    #[must_use]
    pub fn profile_url(&self, locale_prefix: &str, slug: &str) -> String {
        let prefix = locale_prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{}/athletes/{slug}/", self.base_url)
        } else {
            format!("{}/{prefix}/athletes/{slug}/", self.base_url)
        }
    }

    /// Fetch the default-locale profile page of `slug`. Issues exactly one
    /// request, except for an empty slug which is absent without a request.
    pub fn fetch(&self, slug: &str) -> FetchResult {
        if slug.trim().is_empty() {
            return FetchResult::Absent;
        }
        let url = self.profile_url("", slug);
        match self.get_document(&url) {
            Some(body) => FetchResult::Found {
                slug: slug.to_string(),
                body,
            },
            None => FetchResult::Absent,
        }
    }

    /// GET an arbitrary URL, collapsing every failure into `None`.
    pub fn get_document(&self, url: &str) -> Option<String> {
        match self.http.get(url) {
            Ok(body) => Some(body),
            Err(e) => {
                debug!("{url} absent: {e}");
                None
            }
        }
    }
}
