/// Blocking `reqwest` implementation of `HttpClient`.
use std::time::Duration;

use anyhow::{Context, Result};

use super::{FetchError, HttpClient};

/// HTTP client with a fixed User-Agent and a per-request timeout.
///
/// Error text never carries the request URL, which may hold credentials.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Build a client. The timeout bounds the whole request, body included.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(user_agent.to_string())
            .build()
            .context("HTTP client build failed")?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        resp.text()
            .map_err(|e| FetchError::Body(e.without_url().to_string()))
    }
}
