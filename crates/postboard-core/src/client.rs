use std::time::Duration;

use anyhow::Context;
use postboard_state::{Endpoint, FetchError, PostSource};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: String,
}

impl HttpSource {
    pub fn new(base: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("postboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed building HTTP client")?;

        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl PostSource for HttpSource {
    #[tracing::instrument(skip(self), fields(path = %endpoint.path()))]
    async fn get(&self, endpoint: &Endpoint) -> Result<String, FetchError> {
        let mut request = self
            .client
            .get(endpoint.url(&self.base))
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(pair) = endpoint.query() {
            request = request.query(&[pair]);
        }

        let response = request.send().await.map_err(|error| {
            warn!(%error, "request failed");
            FetchError::Network(error.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "non-success response");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|error| FetchError::Network(error.to_string()))?;
        debug!(bytes = body.len(), "response received");
        Ok(body)
    }
}
