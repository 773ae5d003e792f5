//! Image retrieval seam. The pipeline only sees [`ImageFetcher`]; the
//! blocking HTTP implementation lives here so tests can substitute their
//! own.

use std::time::Duration;

use crate::error::PreprocessError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("pandoc-preprocess/", env!("CARGO_PKG_VERSION"));

pub trait ImageFetcher {
    /// Retrieve the bytes behind `uri`. Any failure, including a non-2xx
    /// response, is fatal for the whole run.
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, PreprocessError>;
}

/// Synchronous HTTP fetcher with a per-request timeout.
#[derive(Debug, Default)]
pub struct HttpFetcher;

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, PreprocessError> {
        let fetch_err = |reason: String| PreprocessError::Fetch {
            uri: uri.to_string(),
            reason,
        };

        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| fetch_err(e.to_string()))?;

        let response = client.get(uri).send().map_err(|e| fetch_err(e.to_string()))?;
        if !response.status().is_success() {
            return Err(fetch_err(format!("unexpected status {}", response.status())));
        }

        let bytes = response.bytes().map_err(|e| fetch_err(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
