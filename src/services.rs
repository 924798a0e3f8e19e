use crate::config::ProviderEndpoint;
use crate::normalizers::{FetchError, ProfileFetcher};
use crate::signals::Source;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// HTTP client for one network's profile provider.
///
/// Issues `GET {base_url}/profiles/{identifier}` with an optional bearer
/// token and hands back the raw JSON profile.
#[derive(Clone)]
pub struct ProfileApiClient {
    client: Client,
    source: Source,
    base_url: Url,
    token: Option<String>,
}

impl ProfileApiClient {
    /// Creates a new `ProfileApiClient`.
    ///
    /// # Arguments
    ///
    /// * `source` - The network this provider serves.
    /// * `endpoint` - Base URL and optional token of the provider.
    /// * `timeout` - Request timeout applied by the HTTP client itself.
    pub fn new(
        source: Source,
        endpoint: &ProviderEndpoint,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            anyhow::anyhow!("Failed to create {} profile client: {}", source, e)
        })?;

        let base_url = Url::parse(&endpoint.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid {} provider URL: {}", source, e))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("{} provider URL cannot be used as a base", source);
        }

        Ok(Self {
            client,
            source,
            base_url,
            token: endpoint.token.clone(),
        })
    }

    fn profile_url(&self, identifier: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Transport("provider URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("profiles")
            .push(identifier);
        Ok(url)
    }
}

#[async_trait]
impl ProfileFetcher for ProfileApiClient {
    async fn fetch(&self, identifier: &str) -> Result<Value, FetchError> {
        let url = self.profile_url(identifier)?;
        tracing::debug!("Fetching {} profile: {}", self.source, url);

        let mut request = self.client.get(url);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            FetchError::Transport(format!("{} request failed: {}", self.source, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!(
                "{} provider returned {}: {}",
                self.source,
                status,
                error_text
            );
            return Err(match status {
                StatusCode::NOT_FOUND => FetchError::NotFound(identifier.to_string()),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Unauthorized,
                StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited,
                _ => FetchError::Upstream {
                    status: status.as_u16(),
                    body: error_text,
                },
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Malformed(format!("invalid JSON body: {}", e)))
    }
}
