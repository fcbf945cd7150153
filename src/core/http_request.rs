//! Request construction.
//!
//! This module provides [`RequestBuilder`], which turns a resolved URL, query
//! parameters, headers and an optional JSON body into an immutable
//! [`RequestDescriptor`] ready for dispatch.
//!
//! Header names are stored lower-cased and the last write wins, so headers
//! added later override earlier ones. Service clients add the SDK headers
//! first and the caller's headers afterwards.

use std::collections::HashMap;
use std::fmt;

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Url;
use serde::Serialize;

use crate::core::errors::InvalidRequestError;

const APPLICATION_JSON: &str = "application/json";

/// HTTP methods used by the services.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PUT method, used by purge actions.
    Put,
    /// HTTP PATCH method for partial updates.
    Patch,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    pub(crate) const fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request, ready to be dispatched.
///
/// Descriptors are immutable: building the same operation twice with the same
/// inputs yields equal descriptors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: HttpMethod,
    url: Url,
    headers: HashMap<String, String>,
    body: Option<Vec<u8>>,
}

impl RequestDescriptor {
    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the resolved URL, query string included.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the headers, keyed by lower-cased name.
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Returns a single header value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the serialized body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// Builder for [`RequestDescriptor`] instances.
///
/// # Example
///
/// ```rust
/// use cis_networking::core::{HttpMethod, RequestBuilder};
/// use reqwest::Url;
/// use serde_json::json;
///
/// let url = Url::parse("https://api.example.com/v1/rules").unwrap();
/// let request = RequestBuilder::new(HttpMethod::Post, url)
///     .query("page", 2)
///     .query_opt("mode", None::<&str>)
///     .header("X-Trace", "abc")
///     .json_body(&json!({"mode": "block"}))
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(request.url().as_str(), "https://api.example.com/v1/rules?page=2");
/// assert_eq!(request.header("content-type"), Some("application/json"));
/// assert_eq!(request.header("x-trace"), Some("abc"));
/// ```
#[derive(Debug)]
pub struct RequestBuilder {
    method: HttpMethod,
    url: Url,
    query: Vec<(String, String)>,
    headers: HashMap<String, String>,
    body: Option<Vec<u8>>,
}

impl RequestBuilder {
    /// Creates a new builder for the given method and resolved URL.
    #[must_use]
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Adds a query parameter when `value` is set; does nothing otherwise.
    #[must_use]
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl fmt::Display>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Sets a header, replacing any previous value for the same name.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Sets several headers in iteration order.
    #[must_use]
    pub fn headers<'a, I>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        headers
            .into_iter()
            .fold(self, |builder, (name, value)| builder.header(name, value.clone()))
    }

    /// Serializes `body` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestError::BodyEncoding`] if serialization fails.
    pub fn json_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, InvalidRequestError> {
        let bytes = serde_json::to_vec(body).map_err(|e| InvalidRequestError::BodyEncoding {
            reason: e.to_string(),
        })?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Builds the descriptor.
    ///
    /// `Accept: application/json` is added unless a caller set it, and
    /// `Content-Type: application/json` is added for requests with a body.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestError::InvalidHeader`] if a header name or value
    /// cannot be sent over HTTP.
    pub fn build(self) -> Result<RequestDescriptor, InvalidRequestError> {
        let Self {
            method,
            mut url,
            query,
            mut headers,
            body,
        } = self;

        headers
            .entry("accept".to_string())
            .or_insert_with(|| APPLICATION_JSON.to_string());
        if body.is_some() {
            headers
                .entry("content-type".to_string())
                .or_insert_with(|| APPLICATION_JSON.to_string());
        }

        for (name, value) in &headers {
            if HeaderName::from_bytes(name.as_bytes()).is_err()
                || HeaderValue::from_str(value).is_err()
            {
                return Err(InvalidRequestError::InvalidHeader { name: name.clone() });
            }
        }

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(RequestDescriptor {
            method,
            url,
            headers,
            body,
        })
    }
}
