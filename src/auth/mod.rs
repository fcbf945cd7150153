//! Request authentication.
//!
//! An [`Authenticator`] adds credentials to the headers of every outgoing
//! request. The SDK ships four:
//!
//! - [`NoAuthAuthenticator`]: sends no credentials
//! - [`BasicAuthenticator`]: `Authorization: Basic <base64(user:password)>`
//! - [`BearerTokenAuthenticator`]: `Authorization: Bearer <token>`
//! - [`IamAuthenticator`]: `Authorization: Bearer <token>` where the token is
//!   obtained from a caller-supplied [`TokenSource`]
//!
//! Token acquisition itself is outside this crate: implement [`TokenSource`]
//! on top of whatever IAM client the application already uses.
//!
//! # Example
//!
//! ```rust
//! use cis_networking::auth::{Authenticator, BearerTokenAuthenticator};
//! use std::collections::HashMap;
//!
//! # tokio_test::block_on(async {
//! let auth = BearerTokenAuthenticator::new("my-token");
//! let mut headers = HashMap::new();
//! auth.authenticate(&mut headers).await.unwrap();
//! assert_eq!(headers.get("authorization").unwrap(), "Bearer my-token");
//! # });
//! ```

mod authenticators;

pub use authenticators::{
    BasicAuthenticator, BearerTokenAuthenticator, IamAuthenticator, NoAuthAuthenticator,
    TokenSource,
};

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// A boxed future returned by authenticators and token sources.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Name of the header authenticators write.
pub const AUTHORIZATION: &str = "authorization";

/// Errors raised by authenticators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The authenticator's own settings are unusable.
    #[error("Invalid authenticator configuration: {reason}")]
    InvalidConfiguration {
        /// What is wrong.
        reason: String,
    },

    /// The token source could not provide a token.
    #[error("Unable to obtain an access token: {reason}")]
    TokenUnavailable {
        /// The token source's message.
        reason: String,
    },
}

/// The supported authentication schemes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthType {
    /// No credentials.
    NoAuth,
    /// HTTP basic authentication.
    Basic,
    /// A static bearer token.
    BearerToken,
    /// IAM access tokens from a token source.
    Iam,
}

impl AuthType {
    /// Returns the configuration name of this scheme.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoAuth => "noauth",
            Self::Basic => "basic",
            Self::BearerToken => "bearerToken",
            Self::Iam => "iam",
        }
    }

    /// Parses a configuration name, ignoring case.
    ///
    /// ```rust
    /// use cis_networking::auth::AuthType;
    ///
    /// assert_eq!(AuthType::parse("BEARERTOKEN"), Some(AuthType::BearerToken));
    /// assert_eq!(AuthType::parse("kerberos"), None);
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        [Self::NoAuth, Self::Basic, Self::BearerToken, Self::Iam]
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adds credentials to outgoing requests.
///
/// Implementations must be cheap to share: service clients hold them behind
/// an `Arc` and call [`authenticate`](Self::authenticate) once per request,
/// possibly from several tasks at once.
pub trait Authenticator: Send + Sync + fmt::Debug {
    /// Returns the scheme implemented.
    fn auth_type(&self) -> AuthType;

    /// Checks the authenticator's settings.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidConfiguration`] if the settings are unusable.
    fn validate(&self) -> Result<(), AuthError>;

    /// Adds credentials to `headers`. Header names must be lower-case.
    ///
    /// The future may perform I/O, such as fetching a fresh token.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if credentials cannot be produced.
    fn authenticate<'a>(
        &'a self,
        headers: &'a mut HashMap<String, String>,
    ) -> BoxFuture<'a, Result<(), AuthError>>;
}
