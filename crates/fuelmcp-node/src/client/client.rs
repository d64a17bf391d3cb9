//! Reqwest-based HTTP client for the correction service.

use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::{ClientConfig, TRACING_TARGET};
use crate::{Error, ResolvedQuery, Result, ServiceHealth};

/// Path segment of the status endpoint, sibling of the query endpoint.
const STATUS_SEGMENT: &str = "status";

/// Inner client that holds the HTTP client and configuration.
struct CorrectionClientInner {
    http: Client,
    config: ClientConfig,
}

/// Reqwest-based HTTP client for the correction service.
///
/// Cloning is cheap: clones share the same connection pool. The client holds
/// no per-request state, so one instance can serve any number of concurrent
/// invocations.
///
/// # Examples
///
/// ```rust,ignore
/// use fuelmcp_node::client::{ClientConfig, CorrectionClient};
///
/// let client = CorrectionClient::new(ClientConfig::default().with_timeout(10));
/// let result = client.query(&resolved).await?;
/// ```
#[derive(Clone)]
pub struct CorrectionClient {
    inner: Arc<CorrectionClientInner>,
}

impl std::fmt::Debug for CorrectionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorrectionClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl CorrectionClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized. Use
    /// [`CorrectionClient::try_new`] to handle that case.
    pub fn new(config: ClientConfig) -> Self {
        Self::try_new(config).expect("failed to create HTTP client")
    }

    /// Creates a new client, reporting HTTP client construction failures.
    pub fn try_new(config: ClientConfig) -> Result<Self> {
        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            timeout_ms = timeout.as_millis(),
            user_agent = %user_agent,
            "Creating correction client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .build()?;

        let inner = CorrectionClientInner { http, config };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Sends one query to the correction service and returns its JSON reply.
    ///
    /// Non-2xx replies fail with [`Error::UpstreamStatus`] without reading the
    /// body; 2xx replies that are not JSON fail with [`Error::MalformedBody`].
    pub async fn query(&self, resolved: &ResolvedQuery) -> Result<Value> {
        let url = resolved.request_url();

        tracing::debug!(
            target: TRACING_TARGET,
            url = %url,
            timeout_ms = resolved.timeout.map(|t| t.as_millis()),
            "Sending correction query"
        );

        let mut request = self.inner.http.get(url);
        if let Some(timeout) = resolved.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(
                target: TRACING_TARGET,
                status_code = status.as_u16(),
                "Correction service rejected query"
            );
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        tracing::trace!(
            target: TRACING_TARGET,
            status_code = status.as_u16(),
            body_len = body.len(),
            "Received correction reply"
        );

        serde_json::from_slice(&body).map_err(Error::MalformedBody)
    }

    /// Probes the status endpoint that sits next to `api_url`.
    ///
    /// Never fails: unreachable or misbehaving services are reported as
    /// unhealthy or degraded.
    pub async fn status(&self, api_url: &Url) -> ServiceHealth {
        let Some(url) = status_url(api_url) else {
            return ServiceHealth::unhealthy(format!("cannot derive status endpoint from {api_url}"));
        };

        tracing::debug!(
            target: TRACING_TARGET,
            url = %url,
            "Checking correction service status"
        );

        let started_at = Instant::now();
        let response = match self.inner.http.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                return ServiceHealth::unhealthy(err.to_string())
                    .with_response_time(started_at.elapsed());
            }
        };

        let status = response.status();
        if !status.is_success() {
            return ServiceHealth::unhealthy(format!("status endpoint returned {status}"))
                .with_response_time(started_at.elapsed());
        }

        let payload = response
            .bytes()
            .await
            .ok()
            .and_then(|body| serde_json::from_slice::<Value>(&body).ok());
        let elapsed = started_at.elapsed();

        match payload {
            Some(payload) if payload["status"] == "ok" => ServiceHealth::healthy()
                .with_response_time(elapsed)
                .with_details(payload),
            Some(payload) => ServiceHealth::degraded("unexpected status payload")
                .with_response_time(elapsed)
                .with_details(payload),
            None => ServiceHealth::degraded("status payload is not JSON").with_response_time(elapsed),
        }
    }
}

impl Default for CorrectionClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

/// Derives the status endpoint by replacing the last path segment of
/// `api_url` with `status` and dropping its query.
pub fn status_url(api_url: &Url) -> Option<Url> {
    let mut url = api_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut().ok()?.pop().push(STATUS_SEGMENT);
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CorrectionClient::new(ClientConfig::default());
        assert!(client.config().user_agent.is_none());
        assert!(format!("{client:?}").contains("CorrectionClient"));
    }

    #[test]
    fn test_status_url() {
        let url = Url::parse("http://127.0.0.1:8000/query").unwrap();
        assert_eq!(status_url(&url).unwrap().as_str(), "http://127.0.0.1:8000/status");

        let url = Url::parse("http://fuel.local/api/v1/query?mode=offline").unwrap();
        assert_eq!(status_url(&url).unwrap().as_str(), "http://fuel.local/api/v1/status");

        let url = Url::parse("http://fuel.local/").unwrap();
        assert_eq!(status_url(&url).unwrap().as_str(), "http://fuel.local/status");
    }

    #[test]
    fn test_status_url_rejects_cannot_be_a_base() {
        let url = Url::parse("mailto:ops@fuel.local").unwrap();
        assert!(status_url(&url).is_none());
    }
}
