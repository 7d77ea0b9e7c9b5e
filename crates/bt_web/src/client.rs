use std::time::Duration;

use bt_core::{ApiResponse, Result};
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::view::Snapshot;

pub const SCRAPE_PATH: &str = "api/scrape";
const FETCH_FAILED: &str = "Failed to fetch data";

/// Talks to the scrape endpoint on behalf of the display page.
#[derive(Debug, Clone)]
pub struct EndpointClient {
    client: Client,
    endpoint: Url,
}

impl EndpointClient {
    /// `base` is the server root; the endpoint path is joined onto it, so a
    /// base with a path prefix needs a trailing slash.
    pub fn new(base: &Url, timeout: Duration) -> Result<Self> {
        let endpoint = base
            .join(SCRAPE_PATH)
            .map_err(|e| bt_core::Error::InvalidUrl(format!("{}: {}", base, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Calls the endpoint once. The body is decoded whatever the status
    /// code, since failures carry their message in the JSON.
    pub async fn fetch(&self) -> std::result::Result<Snapshot, String> {
        let response = match self.client.get(self.endpoint.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, endpoint = %self.endpoint, "Scrape endpoint unreachable");
                return Err(FETCH_FAILED.to_string());
            }
        };

        let status = response.status();
        let body: ApiResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, %status, "Scrape endpoint returned an unreadable body");
                return Err(FETCH_FAILED.to_string());
            }
        };
        debug!(%status, "Scrape endpoint answered");

        body.into_outcome()
            .map(|(timestamp, articles)| Snapshot { timestamp, articles })
    }
}
