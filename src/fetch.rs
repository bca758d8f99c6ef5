//! Page fetching from the source site

use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use tracing::warn;

use crate::config::FETCH_TIMEOUT_SECS;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(reqwest::StatusCode),
}

/// Source of the page text a check cycle runs against
///
/// The production implementation is [`HttpPageSource`]; tests and the
/// simulator substitute in-process sources.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches the current page text, or fails on transport error or
    /// non-success status
    async fn fetch_page(&self) -> Result<String, FetchError>;
}

/// [`PageSource`] backed by an HTTP GET against the source URL
pub struct HttpPageSource {
    client: reqwest::Client,
    url: String,
}

impl HttpPageSource {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("vanced-watch/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            url: url.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self) -> Result<String, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Source returned status {}: {}", status, self.url);
            return Err(FetchError::Status(status));
        }

        Ok(response.text().await?)
    }
}
