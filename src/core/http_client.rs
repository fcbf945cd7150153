//! Request dispatch.
//!
//! This module provides [`BaseService`], the shared dispatcher every service
//! client holds. It owns the HTTP transport, the service URL, the
//! authenticator, the default headers and the [`RetryPolicy`].
//!
//! Dispatch never retries on its own unless a retry policy was configured,
//! and never retries transport failures.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::auth::Authenticator;
use crate::config::{ServiceConfig, ServiceUrl};
use crate::core::envelope::{message_rows, Envelope, EnvelopeDecoder, ResultKind};
use crate::core::errors::{DecodeError, OperationError};
use crate::core::http_request::RequestDescriptor;
use crate::core::http_response::DetailedResponse;
use crate::core::sdk_headers::user_agent;
use crate::error::ConfigError;

/// Default wait between retries when the service sends no `Retry-After`.
pub const RETRY_WAIT_TIME: Duration = Duration::from_secs(1);

/// Default upper bound for a single retry wait.
pub const DEFAULT_MAX_RETRY_INTERVAL: Duration = Duration::from_secs(30);

/// Opt-in retry behavior for throttled or unavailable responses.
///
/// Only HTTP 429 and 503 are retried. The wait honors `Retry-After` and is
/// capped at `max_interval`. Disabled by default.
///
/// # Example
///
/// ```rust
/// use cis_networking::core::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_secs(10));
/// assert!(policy.is_enabled());
/// assert!(!RetryPolicy::default().is_enabled());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    max_interval: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            max_retries: 0,
            max_interval: DEFAULT_MAX_RETRY_INTERVAL,
        }
    }

    /// A policy that retries up to `max_retries` times.
    #[must_use]
    pub const fn new(max_retries: u32, max_interval: Duration) -> Self {
        Self {
            max_retries,
            max_interval,
        }
    }

    /// Returns `true` if any retry is allowed.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }

    /// Returns the maximum number of retries.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns how long to wait before retrying, or `None` to stop.
    ///
    /// `retries_done` is the number of retries already made for this request.
    #[must_use]
    pub fn delay_for(&self, response: &DetailedResponse, retries_done: u32) -> Option<Duration> {
        if retries_done >= self.max_retries {
            return None;
        }
        if !matches!(response.status_code, 429 | 503) {
            return None;
        }
        let wait = response.retry_after().unwrap_or(RETRY_WAIT_TIME);
        Some(wait.min(self.max_interval))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// The dispatcher shared by all service clients.
///
/// # Thread Safety
///
/// `BaseService` is `Send + Sync`; operations take `&self` and may run
/// concurrently. Changing the service URL requires `&mut self`.
#[derive(Debug)]
pub struct BaseService {
    client: reqwest::Client,
    service_url: Option<ServiceUrl>,
    authenticator: Arc<dyn Authenticator>,
    default_headers: HashMap<String, String>,
    retry_policy: RetryPolicy,
}

// Verify BaseService is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BaseService>();
};

impl BaseService {
    /// Creates a dispatcher from a configuration.
    ///
    /// `default_url` is used when the configuration carries no URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidServiceUrl`] if `default_url` is invalid
    /// and [`ConfigError::Transport`] if the HTTP client cannot be created.
    pub fn new(config: &ServiceConfig, default_url: &str) -> Result<Self, ConfigError> {
        let service_url = match config.url() {
            Some(url) => url.clone(),
            None => ServiceUrl::new(default_url)?,
        };

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ConfigError::Transport {
            reason: e.to_string(),
        })?;

        let mut default_headers = HashMap::new();
        default_headers.insert(
            "user-agent".to_string(),
            user_agent(config.user_agent_prefix()),
        );

        tracing::debug!(
            service_name = config.service_name(),
            service_url = %service_url,
            auth_type = %config.authenticator().auth_type(),
            "created service dispatcher"
        );

        Ok(Self {
            client,
            service_url: Some(service_url),
            authenticator: Arc::clone(config.authenticator()),
            default_headers,
            retry_policy: config.retry_policy(),
        })
    }

    /// Returns the service URL.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::ServiceUrlMissing`] if no URL is set.
    pub fn service_url(&self) -> Result<&str, OperationError> {
        self.service_url
            .as_ref()
            .map(AsRef::as_ref)
            .ok_or(OperationError::ServiceUrlMissing)
    }

    /// Replaces the service URL. An empty string clears it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidServiceUrl`] if `url` is not empty and
    /// not a valid absolute URL. The previous URL is kept in that case.
    pub fn set_service_url(&mut self, url: &str) -> Result<(), ConfigError> {
        self.service_url = if url.is_empty() {
            None
        } else {
            Some(ServiceUrl::new(url)?)
        };
        Ok(())
    }

    /// Returns the authenticator.
    #[must_use]
    pub const fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    /// Returns the headers added to every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// Sends a request and returns the raw response.
    ///
    /// Non-2xx responses are returned as `Ok`; classifying them is up to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Authentication`] if the authenticator fails
    /// and [`OperationError::Transport`] on network errors.
    pub async fn send(&self, request: &RequestDescriptor) -> Result<DetailedResponse, OperationError> {
        let mut retries: u32 = 0;
        loop {
            let mut headers = self.default_headers.clone();
            headers.extend(
                request
                    .headers()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
            self.authenticator.authenticate(&mut headers).await?;

            let mut builder = self
                .client
                .request(request.method().to_reqwest(), request.url().clone());
            for (name, value) in &headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body() {
                builder = builder.body(body.to_vec());
            }

            tracing::debug!(method = %request.method(), url = %request.url(), "sending request");
            let res = builder.send().await?;
            let status = res.status().as_u16();
            let response_headers = res.headers().clone();
            let body = res.bytes().await?.to_vec();
            let response = DetailedResponse::from_header_map(status, &response_headers, body);
            tracing::debug!(status, url = %request.url(), "received response");

            if let Some(delay) = self.retry_policy.delay_for(&response, retries) {
                retries += 1;
                tracing::warn!(
                    status,
                    attempt = retries,
                    max_retries = self.retry_policy.max_retries(),
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "retrying {} {}",
                    request.method(),
                    request.url()
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            if !response.is_ok() {
                tracing::warn!(status, url = %request.url(), "service returned an error status");
            }
            return Ok(response);
        }
    }

    /// Sends a request and decodes the envelope.
    ///
    /// # Errors
    ///
    /// Everything [`send`](Self::send) returns, plus [`OperationError::Api`]
    /// for non-2xx responses and [`OperationError::Decode`] when the body
    /// cannot be decoded as `K`.
    pub async fn invoke<K: ResultKind>(
        &self,
        request: &RequestDescriptor,
    ) -> Result<(Envelope<K::Output>, DetailedResponse), OperationError> {
        let response = self.send(request).await?;
        if !response.is_ok() {
            return Err(error_from_response(response));
        }

        let mut envelope = Envelope::default();
        match EnvelopeDecoder::decode_into::<K>(&response.body, &mut envelope) {
            Ok(()) => Ok((envelope, response)),
            Err(error) => Err(OperationError::decode(error, response)),
        }
    }
}

/// Classifies a non-2xx response.
fn error_from_response(response: DetailedResponse) -> OperationError {
    let status = response.status_code;
    let fallback = || {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown error")
            .to_string()
    };

    if response.body.iter().all(u8::is_ascii_whitespace) {
        return OperationError::Api {
            status,
            message: fallback(),
            errors: Vec::new(),
            response: Box::new(response),
        };
    }

    let value: Value = match serde_json::from_slice(&response.body) {
        Ok(value) => value,
        Err(e) => {
            return OperationError::decode(
                DecodeError::Malformed {
                    reason: e.to_string(),
                },
                response,
            )
        }
    };

    let errors = value.get("errors").map(message_rows).unwrap_or_default();
    let message = errors
        .iter()
        .flatten()
        .find(|text| !text.is_empty())
        .cloned()
        .or_else(|| {
            ["message", "error", "errorMessage"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str))
                .map(str::to_string)
        })
        .unwrap_or_else(fallback);

    OperationError::Api {
        status,
        message,
        errors,
        response: Box::new(response),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::NoAuthAuthenticator;

    fn config() -> ServiceConfig {
        ServiceConfig::builder()
            .authenticator(NoAuthAuthenticator)
            .build()
            .unwrap()
    }

    fn response(status: u16, body: &str) -> DetailedResponse {
        DetailedResponse::new(status, HashMap::new(), body.as_bytes().to_vec())
    }

    #[test]
    fn test_default_url_used_when_config_has_none() {
        let service = BaseService::new(&config(), "https://api.cis.cloud.ibm.com").unwrap();
        assert_eq!(service.service_url().unwrap(), "https://api.cis.cloud.ibm.com");
    }

    #[test]
    fn test_set_service_url_empty_clears_it() {
        let mut service = BaseService::new(&config(), "https://api.cis.cloud.ibm.com").unwrap();
        service.set_service_url("").unwrap();
        assert!(matches!(
            service.service_url(),
            Err(OperationError::ServiceUrlMissing)
        ));
    }

    #[test]
    fn test_set_service_url_rejects_invalid_and_keeps_previous() {
        let mut service = BaseService::new(&config(), "https://api.cis.cloud.ibm.com").unwrap();
        assert!(service.set_service_url("{BAD_URL_STRING").is_err());
        assert_eq!(service.service_url().unwrap(), "https://api.cis.cloud.ibm.com");
    }

    #[test]
    fn test_user_agent_default_header() {
        let service = BaseService::new(&config(), "https://api.cis.cloud.ibm.com").unwrap();
        let agent = service.default_headers().get("user-agent").unwrap();
        assert!(agent.starts_with("cis-networking-sdk-rust/"));
    }

    #[test]
    fn test_retry_policy_only_for_throttling_statuses() {
        let policy = RetryPolicy::new(2, Duration::from_secs(5));
        assert_eq!(policy.delay_for(&response(429, ""), 0), Some(RETRY_WAIT_TIME));
        assert_eq!(policy.delay_for(&response(503, ""), 1), Some(RETRY_WAIT_TIME));
        assert_eq!(policy.delay_for(&response(503, ""), 2), None);
        assert_eq!(policy.delay_for(&response(500, ""), 0), None);
        assert_eq!(RetryPolicy::disabled().delay_for(&response(429, ""), 0), None);
    }

    #[test]
    fn test_retry_after_is_capped() {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), vec!["120".to_string()]);
        let throttled = DetailedResponse::new(429, headers, Vec::new());
        let policy = RetryPolicy::new(1, Duration::from_secs(2));
        assert_eq!(policy.delay_for(&throttled, 0), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_huge_retry_after_is_capped_at_max_interval() {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), vec!["1e30".to_string()]);
        let throttled = DetailedResponse::new(503, headers, Vec::new());
        let policy = RetryPolicy::new(1, Duration::from_secs(5));
        assert_eq!(policy.delay_for(&throttled, 0), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_error_from_response_uses_envelope_errors() {
        let error = error_from_response(response(
            400,
            r#"{"success": false, "errors": [{"code": 1004, "message": "Invalid mode"}], "messages": [], "result": null}"#,
        ));
        match error {
            OperationError::Api {
                status,
                message,
                errors,
                ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid mode");
                assert_eq!(errors, vec![vec!["Invalid mode".to_string()]]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_from_response_empty_body_uses_reason_phrase() {
        let error = error_from_response(response(404, ""));
        assert_eq!(error.to_string(), "Not Found");
        assert_eq!(error.status(), Some(404));
    }

    #[test]
    fn test_error_from_response_invalid_json_is_decode_error() {
        let error = error_from_response(response(500, "} this is not valid json {"));
        assert!(matches!(error, OperationError::Decode { .. }));
        assert_eq!(error.status(), Some(500));
    }
}
