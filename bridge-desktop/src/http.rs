//! HTTP client backed by reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// User agent sent with every request
const USER_AGENT: &str = concat!("drive-share-guard/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reqwest-based [`HttpClient`].
///
/// Connection errors, timeouts, 429 and 5xx responses are retried according
/// to the active [`RetryPolicy`]. A `Retry-After` header on a 429 replaces
/// the computed backoff, capped at `max_delay`.
pub struct ReqwestHttpClient {
    client: Client,
    default_policy: RetryPolicy,
}

/// What a single attempt produced
enum Attempt {
    Done(HttpResponse),
    /// Retryable status; kept so it can be returned once attempts run out
    Retryable(HttpResponse),
    Failed(BridgeError),
}

impl ReqwestHttpClient {
    /// Client with a 30 second request timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                BridgeError::OperationFailed(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            default_policy: RetryPolicy::default(),
        }
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn build_request(&self, request: &HttpRequest) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(Self::method(request.method), &request.url);

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder
    }

    async fn attempt(&self, request: &HttpRequest) -> Attempt {
        let response = match self.build_request(request).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Attempt::Failed(BridgeError::OperationFailed(
                    "Request timed out".to_string(),
                ))
            }
            Err(e) if e.is_connect() => {
                return Attempt::Failed(BridgeError::OperationFailed(format!(
                    "Connection failed: {}",
                    e
                )))
            }
            Err(e) => return Attempt::Failed(BridgeError::OperationFailed(e.to_string())),
        };

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return Attempt::Failed(BridgeError::OperationFailed(e.to_string())),
        };

        let response = HttpResponse {
            status,
            headers,
            body,
        };
        if response.is_retryable() {
            Attempt::Retryable(response)
        } else {
            Attempt::Done(response)
        }
    }

    async fn send_with_policy(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!(attempt, max_attempts, url = %request.url, "Executing HTTP request");

            let (outcome, server_delay) = match self.attempt(&request).await {
                Attempt::Done(response) => return Ok(response),
                Attempt::Retryable(response) => {
                    warn!(status = response.status, attempt, "Retryable HTTP status");
                    let delay = retry_after(&response);
                    (Ok(response), delay)
                }
                Attempt::Failed(e) => {
                    warn!(error = %e, attempt, "HTTP request failed");
                    (Err(e), None)
                }
            };

            if attempt >= max_attempts {
                return outcome;
            }

            let delay = server_delay
                .unwrap_or_else(|| policy.delay_after(attempt))
                .min(policy.max_delay);
            debug!(delay_ms = delay.as_millis() as u64, "Retrying after delay");
            sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Server-requested delay from a `Retry-After` header in whole seconds
fn retry_after(response: &HttpResponse) -> Option<Duration> {
    response
        .header("retry-after")
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.send_with_policy(request, self.default_policy.clone())
            .await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        self.send_with_policy(request, policy).await
    }
}
