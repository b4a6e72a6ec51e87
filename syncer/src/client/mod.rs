//! Page fetchers for the upstream CVE sources.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use url::Url;

use nvd_mirror_model::api2::CveResponse;

mod vulncheck;

pub use vulncheck::{VulnCheckClient, VULNCHECK_API_URL};

pub const NVD_API_URL: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";

const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_RETRY_ATTEMPTS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("fetch cancelled")]
    Cancelled,
}

/// Client for the NVD CVE API 2.0, fetching one page at a time.
pub struct NvdClient {
    client: reqwest::Client,
    url: Url,
    api_key: Option<String>,
    /// Wait between attempts for the same page.
    pub retry_wait: Duration,
    /// Retries after the initial attempt. The budget applies per page: every
    /// `fetch_page` call starts with a fresh counter.
    pub max_retry_attempts: usize,
}

impl NvdClient {
    pub fn new(client: reqwest::Client, url: Url, api_key: Option<String>) -> Self {
        Self {
            client,
            url,
            api_key,
            retry_wait: DEFAULT_RETRY_WAIT,
            max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
        }
    }

    /// Fetch the page at `start_index`, retrying transient failures until the
    /// attempt budget is spent. The window bounds are passed through verbatim
    /// when present; an unbounded fetch walks the complete corpus.
    pub async fn fetch_page(
        &self,
        cancel: &CancellationToken,
        start_index: usize,
        last_mod_start_date: Option<&str>,
        last_mod_end_date: Option<&str>,
    ) -> Result<CveResponse, FetchError> {
        let mut attempt = 0;
        loop {
            match self
                .get_page(cancel, start_index, last_mod_start_date, last_mod_end_date)
                .await
            {
                Ok(page) => return Ok(page),
                Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
                Err(err) => {
                    attempt += 1;
                    if attempt > self.max_retry_attempts {
                        return Err(err);
                    }
                    log::warn!(
                        "Fetching CVEs at start index {start_index} failed (retry {attempt}/{}): {err}",
                        self.max_retry_attempts
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(self.retry_wait) => {}
                        _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                    }
                }
            }
        }
    }

    async fn get_page(
        &self,
        cancel: &CancellationToken,
        start_index: usize,
        last_mod_start_date: Option<&str>,
        last_mod_end_date: Option<&str>,
    ) -> Result<CveResponse, FetchError> {
        let mut request = self
            .client
            .get(self.url.clone())
            .query(&[("startIndex", start_index.to_string())]);

        if let (Some(start), Some(end)) = (last_mod_start_date, last_mod_end_date) {
            request = request.query(&[("lastModStartDate", start), ("lastModEndDate", end)]);
        }

        if let Some(api_key) = &self.api_key {
            request = request.header("apiKey", api_key);
        }

        let response = tokio::select! {
            result = request.send() => result?,
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
        };
        let response = response.error_for_status()?;

        let page = tokio::select! {
            result = response.json::<CveResponse>() => result?,
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
        };

        Ok(page)
    }
}
