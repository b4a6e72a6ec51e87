use std::time::Duration;

use tokio_util::sync::CancellationToken;
use url::Url;

use nvd_mirror_model::vulncheck::VulnCheckResponse;

use super::FetchError;

pub const VULNCHECK_API_URL: &str = "https://api.vulncheck.com/v3/index/nist-nvd2";

/// Client for the VulnCheck NIST-NVD2 index. This is a fetch primitive only:
/// pagination is cursor based (start with `None`, continue while the response
/// carries a `next_cursor`) and nothing here feeds the sync pipeline.
pub struct VulnCheckClient {
    client: reqwest::Client,
    url: Url,
    /// API token, typically taken from `VULNCHECK_API_KEY`.
    api_key: String,
    pub retry_wait: Duration,
    pub max_retry_attempts: usize,
}

impl VulnCheckClient {
    pub fn new(client: reqwest::Client, url: Url, api_key: impl Into<String>) -> Self {
        Self {
            client,
            url,
            api_key: api_key.into(),
            retry_wait: super::DEFAULT_RETRY_WAIT,
            max_retry_attempts: super::DEFAULT_MAX_RETRY_ATTEMPTS,
        }
    }

    /// Fetch one page of the index. `cursor` continues a walk; the lower
    /// bound restricts it to records modified since that timestamp.
    pub async fn fetch_page(
        &self,
        cancel: &CancellationToken,
        cursor: Option<&str>,
        last_mod_start_date: Option<&str>,
    ) -> Result<VulnCheckResponse, FetchError> {
        let mut attempt = 0;
        loop {
            match self.get_page(cancel, cursor, last_mod_start_date).await {
                Ok(page) => return Ok(page),
                Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
                Err(err) => {
                    attempt += 1;
                    if attempt > self.max_retry_attempts {
                        return Err(err);
                    }
                    log::warn!(
                        "Fetching VulnCheck index failed (retry {attempt}/{}): {err}",
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
        cursor: Option<&str>,
        last_mod_start_date: Option<&str>,
    ) -> Result<VulnCheckResponse, FetchError> {
        let mut request = self.client.get(self.url.clone()).bearer_auth(&self.api_key);

        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }
        if let Some(start) = last_mod_start_date {
            request = request.query(&[("lastModStartDate", start)]);
        }

        let response = tokio::select! {
            result = request.send() => result?,
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
        };
        let response = response.error_for_status()?;

        let page = tokio::select! {
            result = response.json::<VulnCheckResponse>() => result?,
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
        };

        Ok(page)
    }
}
