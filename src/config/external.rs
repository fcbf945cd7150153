//! External configuration snapshots.
//!
//! Service settings can come from outside the program: a URL and credentials
//! stored under keys prefixed with the upper-cased service name.
//!
//! | Key | Meaning |
//! |---|---|
//! | `{SERVICE}_URL` | service base URL |
//! | `{SERVICE}_AUTH_TYPE` | `noauth`, `basic`, `bearerToken` or `iam` (any case) |
//! | `{SERVICE}_USERNAME` / `{SERVICE}_PASSWORD` | basic credentials |
//! | `{SERVICE}_BEARER_TOKEN` | bearer token |
//!
//! [`ExternalConfig`] is an explicit, immutable snapshot of those keys.
//! [`ExternalConfig::from_env`] reads the process environment once; tests
//! build one from literal pairs with [`ExternalConfig::from_pairs`].
//!
//! # Example
//!
//! ```rust
//! use cis_networking::ExternalConfig;
//!
//! let external = ExternalConfig::from_pairs([
//!     ("CACHING_API_URL", "https://cachingapiv1/api"),
//!     ("CACHING_API_AUTH_TYPE", "noauth"),
//! ]);
//! assert_eq!(external.service_url("caching_api"), Some("https://cachingapiv1/api"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::{
    AuthType, Authenticator, BasicAuthenticator, BearerTokenAuthenticator, NoAuthAuthenticator,
};
use crate::error::ConfigError;

/// A snapshot of externally supplied service settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExternalConfig {
    values: HashMap<String, String>,
}

impl ExternalConfig {
    /// Captures the current process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars())
    }

    /// Builds a snapshot from key/value pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns `true` if no keys are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a raw property for a service, e.g. `property("caching_api", "URL")`.
    #[must_use]
    pub fn property(&self, service_name: &str, key: &str) -> Option<&str> {
        self.values
            .get(&property_key(service_name, key))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Returns the configured service URL.
    #[must_use]
    pub fn service_url(&self, service_name: &str) -> Option<&str> {
        self.property(service_name, "URL")
    }

    /// Returns the configured authentication scheme, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedAuthType`] for an unknown scheme name.
    pub fn auth_type(&self, service_name: &str) -> Result<Option<AuthType>, ConfigError> {
        self.property(service_name, "AUTH_TYPE")
            .map(|raw| {
                AuthType::parse(raw).ok_or_else(|| ConfigError::UnsupportedAuthType {
                    service_name: service_name.to_string(),
                    auth_type: raw.to_string(),
                })
            })
            .transpose()
    }

    /// Builds the authenticator described by the snapshot.
    ///
    /// Returns `Ok(None)` when no auth type is configured.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnsupportedAuthType`] for an unknown scheme name.
    /// - [`ConfigError::AuthenticatorRequired`] for `iam`, whose tokens this
    ///   crate cannot obtain on its own.
    /// - [`ConfigError::InvalidAuthenticator`] if the credentials are incomplete.
    pub fn authenticator(
        &self,
        service_name: &str,
    ) -> Result<Option<Arc<dyn Authenticator>>, ConfigError> {
        let Some(auth_type) = self.auth_type(service_name)? else {
            return Ok(None);
        };

        let authenticator: Arc<dyn Authenticator> = match auth_type {
            AuthType::NoAuth => Arc::new(NoAuthAuthenticator),
            AuthType::Basic => Arc::new(BasicAuthenticator::new(
                self.property(service_name, "USERNAME").unwrap_or_default(),
                self.property(service_name, "PASSWORD").unwrap_or_default(),
            )),
            AuthType::BearerToken => Arc::new(BearerTokenAuthenticator::new(
                self.property(service_name, "BEARER_TOKEN")
                    .unwrap_or_default(),
            )),
            AuthType::Iam => {
                return Err(ConfigError::AuthenticatorRequired {
                    service_name: service_name.to_string(),
                    auth_type: auth_type.to_string(),
                })
            }
        };

        authenticator
            .validate()
            .map_err(|e| ConfigError::InvalidAuthenticator {
                reason: e.to_string(),
            })?;
        Ok(Some(authenticator))
    }
}

fn property_key(service_name: &str, key: &str) -> String {
    format!(
        "{}_{key}",
        service_name.to_ascii_uppercase().replace('-', "_")
    )
}
