//! HTTP client for the Micetro REST API

use crate::error::{ApiError, Result};
use async_trait::async_trait;
use ipamflow_config::Credentials;
use ipamflow_core::{ApiResponse, Transport, TransportError, Verb};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy for idempotent calls
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, the first one included
    pub max_attempts: u32,

    /// Delay before the second attempt
    pub initial_delay: Duration,

    /// Upper bound for any delay
    pub max_delay: Duration,

    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// No retries at all
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

/// Micetro API client
///
/// Calls `{url}/mmws/api/{path}` with basic authentication. A 2xx answer
/// yields the `result` member of the body; anything else is turned into a
/// warning carrying `error.message` or the HTTP status text.
pub struct MicetroClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    retry: RetryConfig,
}

impl MicetroClient {
    pub fn new(credentials: Credentials, options: ClientOptions) -> Result<Self> {
        let base_url = credentials.url.trim_end_matches('/').to_string();
        let parsed =
            Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            credentials,
            retry: options.retry,
        })
    }

    /// Full URL of an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/mmws/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, verb: Verb, path: &str, body: &Value) -> Result<(StatusCode, ApiResponse)> {
        let method = match verb {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
        };
        let url = self.url(path);
        debug!(%verb, %url, "Calling Micetro API");

        let mut request = self
            .client
            .request(method, &url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.password));
        if verb.is_mutation() {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            let payload: Value = if text.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text)?
            };
            let result = payload.get("result").cloned().unwrap_or(Value::Null);
            return Ok((status, ApiResponse::ok(result)));
        }

        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|payload| {
                payload
                    .pointer("/error/message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.to_string())
            });
        debug!(%verb, %url, status = status.as_u16(), %message, "Micetro API reported an error");

        Ok((status, ApiResponse::warning(message)))
    }
}

#[async_trait]
impl Transport for MicetroClient {
    async fn call(
        &self,
        verb: Verb,
        path: &str,
        body: &Value,
    ) -> std::result::Result<ApiResponse, TransportError> {
        // Only reads are repeated; a mutation may already have been applied.
        let attempts = if verb.is_mutation() {
            1
        } else {
            self.retry.max_attempts.max(1)
        };

        let mut attempt = 1;
        loop {
            let outcome = self.send(verb, path, body).await;
            let retryable = match &outcome {
                Ok((status, _)) => status.is_server_error(),
                Err(e) => e.is_retryable(),
            };

            if !retryable || attempt >= attempts {
                return outcome.map(|(_, response)| response).map_err(Into::into);
            }

            let delay = self.retry.delay_for(attempt);
            match &outcome {
                Ok((status, _)) => {
                    warn!(path, status = status.as_u16(), attempt, ?delay, "Retrying GET after server error")
                }
                Err(e) => warn!(path, error = %e, attempt, ?delay, "Retrying GET after transport error"),
            }
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
