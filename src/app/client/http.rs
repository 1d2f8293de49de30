//! Upstream catalog over HTTP
//!
//! A single GET returns the whole catalog as a JSON array. There is no retry:
//! a failed fetch fails the request that triggered it.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::app::models::RawListing;
use crate::errors::{UpstreamError, UpstreamResult};

use super::config::ClientConfig;
use super::ListingSource;

/// Fetches the listing catalog from an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpListingSource {
    client: Client,
    url: Url,
}

impl HttpListingSource {
    /// Creates a source for the given catalog URL
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::ClientBuild` if the HTTP client cannot be built
    pub fn new(url: Url, config: &ClientConfig) -> UpstreamResult<Self> {
        let client = config.build_http_client()?;
        Ok(Self::with_client(client, url))
    }

    /// Creates a source sharing an existing client
    pub fn with_client(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch_listings(&self) -> UpstreamResult<Vec<RawListing>> {
        let response = self
            .client
            .get(self.url.as_str())
            .send()
            .await
            .map_err(|e| UpstreamError::request(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::request(&e))?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), self.url);

        serde_json::from_slice::<Vec<RawListing>>(&body).map_err(UpstreamError::decode)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}
