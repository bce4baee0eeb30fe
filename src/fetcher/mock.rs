/// In-memory `HttpClient` for tests.
///
/// Serves canned responses keyed by exact URL and records every request,
/// so tests can assert on how many network calls a resolution made.
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{FetchError, HttpClient};

#[derive(Clone)]
enum Canned {
    Body(String),
    Status(u16),
}

/// A mock client. Unregistered URLs answer 404.
#[derive(Default)]
pub struct MockHttp {
    routes: Mutex<HashMap<String, Canned>>,
    requests: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl MockHttp {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before answering each request.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer `url` with a 200 and `body`.
    pub fn respond(&self, url: &str, body: &str) {
        self.insert(url, Canned::Body(body.to_string()));
    }

    /// Answer `url` with a bare status code.
    pub fn respond_status(&self, url: &str, status: u16) {
        self.insert(url, Canned::Status(status));
    }

    /// Total requests served so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Requests served for URLs starting with `prefix`.
    #[must_use]
    pub fn requests_matching(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .map(|r| r.iter().filter(|u| u.starts_with(prefix)).count())
            .unwrap_or(0)
    }

    fn insert(&self, url: &str, canned: Canned) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.insert(url.to_string(), canned);
        }
    }
}

impl HttpClient for MockHttp {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        if let Ok(mut reqs) = self.requests.lock() {
            reqs.push(url.to_string());
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let canned = self
            .routes
            .lock()
            .map_err(|e| FetchError::Transport(e.to_string()))?
            .get(url)
            .cloned();

        match canned {
            Some(Canned::Body(body)) => Ok(body),
            Some(Canned::Status(code)) => Err(FetchError::Status(code)),
            None => Err(FetchError::Status(404)),
        }
    }
}
