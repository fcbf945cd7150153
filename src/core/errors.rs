//! Error types for service operations.
//!
//! Every operation returns `Result<_, OperationError>`. The taxonomy is total:
//! each failure belongs to exactly one variant, and the variants split into
//! two families.
//!
//! - **Request errors** happen before or while sending: validation, URL
//!   construction, body encoding, a missing service URL, authentication and
//!   transport failures. No response is available.
//! - **Response errors** happen after a response arrived: the body could not
//!   be decoded ([`OperationError::Decode`]) or the service answered with a
//!   non-2xx status ([`OperationError::Api`]). The raw
//!   [`DetailedResponse`] is always attached.
//!
//! # Example
//!
//! ```rust,ignore
//! use cis_networking::core::OperationError;
//!
//! match client.get_cache_level(Some(&options)).await {
//!     Ok((envelope, _response)) => println!("{:?}", envelope.result),
//!     Err(OperationError::Validation(e)) => println!("bad options: {e}"),
//!     Err(e) if e.is_response_error() => {
//!         println!("status {:?}: {e}", e.status());
//!     }
//!     Err(e) => println!("request failed: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::auth::AuthError;
use crate::core::http_response::DetailedResponse;

/// Errors raised while checking an operation's options.
///
/// These are always returned before any URL or request is built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The options argument itself was absent.
    #[error("{name} cannot be nil")]
    NilOptions {
        /// The options type name.
        name: &'static str,
    },

    /// A field the operation requires was not set or was empty.
    #[error("{options}: required field '{field}' is missing or empty")]
    MissingRequiredField {
        /// The options type name.
        options: &'static str,
        /// The missing field.
        field: &'static str,
    },
}

/// Errors raised while building a request from valid options.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidRequestError {
    /// The service URL or the resolved request URL could not be parsed.
    #[error("Malformed URL '{url}': {reason}")]
    MalformedUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A positional path parameter was empty.
    #[error("Path parameter '{name}' cannot be empty")]
    EmptyPathParameter {
        /// The template slot that received the empty value.
        name: &'static str,
    },

    /// A path parameter was `.` or `..`, which URL resolution would collapse.
    #[error("Path parameter '{name}' cannot be a dot segment")]
    DotSegmentPathParameter {
        /// The template slot that received the dot segment.
        name: &'static str,
    },

    /// The number of path parameters does not match the template.
    #[error("Path template '{template}' expects {expected} parameters, got {actual}")]
    PathParameterCount {
        /// The template being filled.
        template: &'static str,
        /// Number of slots in the template.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// A header name or value is not valid on the wire.
    #[error("Invalid header '{name}'")]
    InvalidHeader {
        /// The offending header name.
        name: String,
    },

    /// The request body could not be serialized.
    #[error("Failed to encode request body: {reason}")]
    BodyEncoding {
        /// The serializer's message.
        reason: String,
    },
}

/// Errors raised while interpreting a response body.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The body is not valid JSON.
    #[error("Response body is not valid JSON: {reason}")]
    Malformed {
        /// The parser's message.
        reason: String,
    },

    /// The body is JSON but not the expected envelope or result shape.
    #[error("Expected {expected}, found {found}")]
    ShapeMismatch {
        /// What the decoder was looking for.
        expected: &'static str,
        /// What it got instead.
        found: String,
    },

    /// A model field had the wrong JSON type.
    #[error("Invalid value for field '{field}' of {model}: {reason}")]
    Field {
        /// The model being decoded.
        model: &'static str,
        /// The JSON field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Unified error type for service operations.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The options failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request could not be constructed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidRequestError),

    /// No service URL is configured.
    #[error("The service URL is required; set it on the configuration or call set_service_url")]
    ServiceUrlMissing,

    /// The authenticator could not authorize the request.
    #[error(transparent)]
    Authentication(#[from] AuthError),

    /// Network or connection error.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response arrived but its body could not be decoded.
    #[error("Error processing the HTTP response (status {}): {error}", .response.status_code)]
    Decode {
        /// What went wrong while decoding.
        error: DecodeError,
        /// The raw response, kept for diagnosis.
        response: Box<DetailedResponse>,
    },

    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The first error message reported by the service.
        message: String,
        /// All error rows from the envelope.
        errors: Vec<Vec<String>>,
        /// The raw response.
        response: Box<DetailedResponse>,
    },
}

impl OperationError {
    /// Returns `true` for failures that happened before a response was received.
    #[must_use]
    pub const fn is_request_error(&self) -> bool {
        !self.is_response_error()
    }

    /// Returns `true` for failures that carry a response.
    #[must_use]
    pub const fn is_response_error(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::Api { .. })
    }

    /// Returns the HTTP status, when a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.response().map(|r| r.status_code)
    }

    /// Returns the raw response, when one was received.
    #[must_use]
    pub fn response(&self) -> Option<&DetailedResponse> {
        match self {
            Self::Decode { response, .. } | Self::Api { response, .. } => Some(response),
            _ => None,
        }
    }

    pub(crate) fn decode(error: DecodeError, response: DetailedResponse) -> Self {
        Self::Decode {
            error,
            response: Box::new(response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn response(status: u16) -> DetailedResponse {
        DetailedResponse::new(status, HashMap::new(), b"{}".to_vec())
    }

    #[test]
    fn test_nil_options_message() {
        let error = ValidationError::NilOptions {
            name: "GetCacheLevelOptions",
        };
        assert_eq!(error.to_string(), "GetCacheLevelOptions cannot be nil");
    }

    #[test]
    fn test_missing_field_is_distinct_from_nil() {
        let nil = ValidationError::NilOptions { name: "X" };
        let missing = ValidationError::MissingRequiredField {
            options: "X",
            field: "mode",
        };
        assert_ne!(nil, missing);
        assert!(missing.to_string().contains("mode"));
    }

    #[test]
    fn test_service_url_missing_message() {
        let message = OperationError::ServiceUrlMissing.to_string();
        assert!(message.contains("The service URL is required"));
    }

    #[test]
    fn test_request_and_response_families() {
        let validation = OperationError::from(ValidationError::NilOptions { name: "X" });
        assert!(validation.is_request_error());
        assert!(validation.response().is_none());
        assert_eq!(validation.status(), None);

        let decode = OperationError::decode(
            DecodeError::Malformed {
                reason: "expected value".to_string(),
            },
            response(200),
        );
        assert!(decode.is_response_error());
        assert_eq!(decode.status(), Some(200));
        assert!(decode.to_string().contains("status 200"));
    }

    #[test]
    fn test_api_error_uses_service_message() {
        let error = OperationError::Api {
            status: 404,
            message: "Zone not found".to_string(),
            errors: vec![vec!["Zone not found".to_string()]],
            response: Box::new(response(404)),
        };
        assert_eq!(error.to_string(), "Zone not found");
        assert_eq!(error.status(), Some(404));
    }

    #[test]
    fn test_path_parameter_count_message() {
        let error = InvalidRequestError::PathParameterCount {
            template: "v1/{crn}",
            expected: 1,
            actual: 2,
        };
        assert_eq!(
            error.to_string(),
            "Path template 'v1/{crn}' expects 1 parameters, got 2"
        );
    }
}
