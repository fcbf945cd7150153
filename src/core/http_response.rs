//! Raw HTTP response type.
//!
//! This module provides [`DetailedResponse`], the undecoded view of a response:
//! status, headers and body bytes. Every successful operation returns it next
//! to the typed envelope, and every response-side error carries it.

use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Duration;

/// An HTTP response as received from the service.
///
/// Header names are lower-cased; a header may carry several values.
///
/// # Example
///
/// ```rust
/// use cis_networking::core::DetailedResponse;
/// use std::collections::HashMap;
///
/// let mut headers = HashMap::new();
/// headers.insert("retry-after".to_string(), vec!["2".to_string()]);
///
/// let response = DetailedResponse::new(429, headers, Vec::new());
/// assert!(!response.is_ok());
/// assert_eq!(response.retry_after().map(|d| d.as_secs()), Some(2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailedResponse {
    /// The HTTP status code.
    pub status_code: u16,
    /// Response headers keyed by lower-cased name.
    pub headers: HashMap<String, Vec<String>>,
    /// The raw response body.
    pub body: Vec<u8>,
}

impl DetailedResponse {
    /// Creates a new `DetailedResponse`.
    #[must_use]
    pub const fn new(status_code: u16, headers: HashMap<String, Vec<String>>, body: Vec<u8>) -> Self {
        Self {
            status_code,
            headers,
            body,
        }
    }

    /// Returns `true` if the status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status_code >= 200 && self.status_code <= 299
    }

    /// Returns the first value of a header, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Returns the `Retry-After` delay, when the header holds a number of seconds.
    ///
    /// Values too large for a [`Duration`] saturate to [`Duration::MAX`].
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        self.header("retry-after")
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(|secs| Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
    }

    pub(crate) fn from_header_map(
        status_code: u16,
        headers: &reqwest::header::HeaderMap,
        body: Vec<u8>,
    ) -> Self {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        Self::new(status_code, result, body)
    }
}
