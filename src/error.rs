//! Configuration error types for the CIS networking SDK.
//!
//! This module contains the error type returned while constructing service
//! clients and their configuration. Errors raised while *performing* an
//! operation live in [`crate::core::OperationError`].
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use cis_networking::{Crn, ConfigError};
//!
//! let result = Crn::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyCrn)));
//! ```

use thiserror::Error;

/// Errors that can occur during SDK configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// CRN cannot be empty.
    #[error("CRN cannot be empty. Please provide the full CRN of the service instance.")]
    EmptyCrn,

    /// Zone identifier cannot be empty.
    #[error("Zone identifier cannot be empty. Please provide a valid zone ID.")]
    EmptyZoneId,

    /// Service URL is invalid.
    #[error("Invalid service URL '{url}': {reason}")]
    InvalidServiceUrl {
        /// The invalid URL that was provided.
        url: String,
        /// Why the URL was rejected.
        reason: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The authenticator rejected its own settings.
    #[error("Invalid authenticator configuration: {reason}")]
    InvalidAuthenticator {
        /// The reason the authenticator is invalid.
        reason: String,
    },

    /// External configuration named an authentication type this SDK does not know.
    #[error("Unrecognized authentication type '{auth_type}' for service '{service_name}'. Expected one of: noauth, basic, bearerToken, iam.")]
    UnsupportedAuthType {
        /// The service whose configuration was read.
        service_name: String,
        /// The auth type string that was found.
        auth_type: String,
    },

    /// The auth type needs an authenticator supplied by the caller.
    #[error("Authentication type '{auth_type}' for service '{service_name}' requires an explicitly supplied authenticator.")]
    AuthenticatorRequired {
        /// The service whose configuration was read.
        service_name: String,
        /// The auth type string that was found.
        auth_type: String,
    },

    /// The underlying HTTP transport could not be created.
    #[error("Failed to create HTTP transport: {reason}")]
    Transport {
        /// The reason reported by the transport.
        reason: String,
    },
}
