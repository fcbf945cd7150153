//! Configuration types for the CIS networking SDK.
//!
//! This module provides the configuration used to construct service clients.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ServiceConfig`]: transport and authentication settings for one client
//! - [`ServiceConfigBuilder`]: a builder for constructing [`ServiceConfig`] instances
//! - [`ExternalConfig`]: an explicit snapshot of externally supplied settings
//! - [`Crn`], [`ZoneId`], [`ServiceUrl`]: validated newtypes
//!
//! # Example
//!
//! ```rust
//! use cis_networking::ServiceConfig;
//! use cis_networking::auth::BearerTokenAuthenticator;
//! use std::time::Duration;
//!
//! let config = ServiceConfig::builder()
//!     .authenticator(BearerTokenAuthenticator::new("token"))
//!     .url("https://api.cis.cloud.ibm.com")
//!     .timeout(Duration::from_secs(30))
//!     .build()
//!     .unwrap();
//! assert_eq!(config.url().unwrap().as_ref(), "https://api.cis.cloud.ibm.com");
//! ```

mod external;
mod newtypes;

pub use external::ExternalConfig;
pub use newtypes::{Crn, ServiceUrl, ZoneId};

use std::sync::Arc;
use std::time::Duration;

use crate::auth::Authenticator;
use crate::core::RetryPolicy;
use crate::error::ConfigError;

/// Settings for one service client.
///
/// # Thread Safety
///
/// `ServiceConfig` is `Clone`, `Send`, and `Sync`; the authenticator is shared
/// behind an `Arc`.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    service_name: Option<String>,
    url: Option<ServiceUrl>,
    authenticator: Arc<dyn Authenticator>,
    timeout: Option<Duration>,
    retry_policy: RetryPolicy,
    user_agent_prefix: Option<String>,
}

impl ServiceConfig {
    /// Creates a new builder for constructing a `ServiceConfig`.
    #[must_use]
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::new()
    }

    /// Returns the service name used for external configuration lookups.
    #[must_use]
    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    /// Returns the service URL, if one was configured.
    #[must_use]
    pub const fn url(&self) -> Option<&ServiceUrl> {
        self.url.as_ref()
    }

    /// Returns the authenticator.
    #[must_use]
    pub const fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    /// Returns the request timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify ServiceConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ServiceConfig>();
};

/// Builder for constructing [`ServiceConfig`] instances.
///
/// The authenticator is required unless it can be built from an
/// [`ExternalConfig`]. An explicitly set URL or authenticator always wins
/// over the external one.
///
/// # Defaults
///
/// - `url`: `None` (service clients fall back to their default URL)
/// - `timeout`: `None` (no overall request timeout)
/// - `retry_policy`: [`RetryPolicy::disabled`]
/// - `user_agent_prefix`: `None`
///
/// # Example
///
/// ```rust
/// use cis_networking::{ExternalConfig, ServiceConfig};
///
/// let external = ExternalConfig::from_pairs([
///     ("CACHING_API_URL", "https://cachingapiv1/api"),
///     ("CACHING_API_AUTH_TYPE", "noauth"),
/// ]);
///
/// let config = ServiceConfig::builder()
///     .service_name("caching_api")
///     .external(&external)
///     .build()
///     .unwrap();
/// assert_eq!(config.url().unwrap().as_ref(), "https://cachingapiv1/api");
/// ```
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    service_name: Option<String>,
    url: Option<String>,
    authenticator: Option<Arc<dyn Authenticator>>,
    timeout: Option<Duration>,
    retry_policy: Option<RetryPolicy>,
    user_agent_prefix: Option<String>,
    external: Option<ExternalConfig>,
}

impl ServiceConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the authenticator.
    #[must_use]
    pub fn authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.authenticator = Some(Arc::new(authenticator));
        self
    }

    /// Sets an authenticator shared with other clients.
    #[must_use]
    pub fn shared_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Sets the service URL. Validated by [`build`](Self::build).
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the service name used for external configuration lookups.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Sets the overall request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Reads missing settings from an external configuration snapshot.
    ///
    /// Requires [`service_name`](Self::service_name) to be set before
    /// [`build`](Self::build).
    #[must_use]
    pub fn external(mut self, external: &ExternalConfig) -> Self {
        self.external = Some(external.clone());
        self
    }

    /// Builds the [`ServiceConfig`], validating it in the process.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidServiceUrl`] if the URL is invalid.
    /// - [`ConfigError::MissingRequiredField`] if no authenticator is available,
    ///   or if external configuration is used without a service name.
    /// - [`ConfigError::InvalidAuthenticator`] if the authenticator rejects its
    ///   settings.
    /// - Any error from [`ExternalConfig::authenticator`].
    pub fn build(self) -> Result<ServiceConfig, ConfigError> {
        let external = match (&self.external, &self.service_name) {
            (Some(external), Some(name)) => Some((external, name.as_str())),
            (Some(_), None) => {
                return Err(ConfigError::MissingRequiredField {
                    field: "service_name",
                })
            }
            (None, _) => None,
        };

        let url = match (self.url, external) {
            (Some(explicit), ext) => {
                if ext.and_then(|(e, name)| e.service_url(name)).is_some() {
                    tracing::debug!(url = %explicit, "explicit service URL overrides external configuration");
                }
                Some(ServiceUrl::new(explicit)?)
            }
            (None, Some((e, name))) => e.service_url(name).map(ServiceUrl::new).transpose()?,
            (None, None) => None,
        };

        let authenticator = match (self.authenticator, external) {
            (Some(explicit), _) => explicit,
            (None, Some((e, name))) => e
                .authenticator(name)?
                .ok_or(ConfigError::MissingRequiredField {
                    field: "authenticator",
                })?,
            (None, None) => {
                return Err(ConfigError::MissingRequiredField {
                    field: "authenticator",
                })
            }
        };
        authenticator
            .validate()
            .map_err(|e| ConfigError::InvalidAuthenticator {
                reason: e.to_string(),
            })?;

        Ok(ServiceConfig {
            service_name: self.service_name,
            url,
            authenticator,
            timeout: self.timeout,
            retry_policy: self.retry_policy.unwrap_or_default(),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}
