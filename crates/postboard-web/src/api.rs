use gloo::net::http::Request;
use postboard_state::{DEFAULT_API_BASE, Endpoint, FetchError, PostSource};

/// Fetch-backed post source for the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserSource {
    base: String,
}

impl Default for BrowserSource {
    fn default() -> Self {
        Self {
            base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl PostSource for BrowserSource {
    async fn get(&self, endpoint: &Endpoint) -> Result<String, FetchError> {
        let url = endpoint.url(&self.base);
        let request = match endpoint.query() {
            Some(pair) => Request::get(&url).query([pair]),
            None => Request::get(&url),
        };

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.ok() {
            tracing::warn!(status = response.status(), url = %url, "non-success response");
            return Err(FetchError::Status(response.status()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))
    }
}
