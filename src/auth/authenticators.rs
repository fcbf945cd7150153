//! Built-in authenticators.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::{AuthError, AuthType, Authenticator, BoxFuture, AUTHORIZATION};

/// Sends requests without credentials.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoAuthAuthenticator;

impl Authenticator for NoAuthAuthenticator {
    fn auth_type(&self) -> AuthType {
        AuthType::NoAuth
    }

    fn validate(&self) -> Result<(), AuthError> {
        Ok(())
    }

    fn authenticate<'a>(
        &'a self,
        _headers: &'a mut HashMap<String, String>,
    ) -> BoxFuture<'a, Result<(), AuthError>> {
        Box::pin(async { Ok(()) })
    }
}

/// HTTP basic authentication.
///
/// The password is masked in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuthenticator {
    username: String,
    password: String,
}

impl BasicAuthenticator {
    /// Creates a new basic authenticator.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for BasicAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthenticator")
            .field("username", &self.username)
            .field("password", &"*****")
            .finish()
    }
}

impl Authenticator for BasicAuthenticator {
    fn auth_type(&self) -> AuthType {
        AuthType::Basic
    }

    fn validate(&self) -> Result<(), AuthError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(AuthError::InvalidConfiguration {
                reason: "basic authentication requires a username and a password".to_string(),
            });
        }
        if has_bad_first_or_last_char(&self.username) || has_bad_first_or_last_char(&self.password)
        {
            return Err(AuthError::InvalidConfiguration {
                reason: "the username and password must not start or end with a brace or quote"
                    .to_string(),
            });
        }
        Ok(())
    }

    fn authenticate<'a>(
        &'a self,
        headers: &'a mut HashMap<String, String>,
    ) -> BoxFuture<'a, Result<(), AuthError>> {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        headers.insert(AUTHORIZATION.to_string(), format!("Basic {encoded}"));
        Box::pin(async { Ok(()) })
    }
}

/// A static bearer token.
///
/// The token is masked in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerTokenAuthenticator {
    token: String,
}

impl BearerTokenAuthenticator {
    /// Creates a new bearer token authenticator.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for BearerTokenAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerTokenAuthenticator(*****)")
    }
}

impl Authenticator for BearerTokenAuthenticator {
    fn auth_type(&self) -> AuthType {
        AuthType::BearerToken
    }

    fn validate(&self) -> Result<(), AuthError> {
        if self.token.is_empty() {
            return Err(AuthError::InvalidConfiguration {
                reason: "the bearer token cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    fn authenticate<'a>(
        &'a self,
        headers: &'a mut HashMap<String, String>,
    ) -> BoxFuture<'a, Result<(), AuthError>> {
        headers.insert(AUTHORIZATION.to_string(), format!("Bearer {}", self.token));
        Box::pin(async { Ok(()) })
    }
}

/// Provides IAM access tokens.
///
/// Implementations own caching and refresh; [`IamAuthenticator`] awaits
/// [`token`](Self::token) once per request, so a source may call the IAM
/// token endpoint from inside the returned future.
pub trait TokenSource: Send + Sync {
    /// Returns a currently valid access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenUnavailable`] if no token can be produced.
    fn token(&self) -> BoxFuture<'_, Result<String, AuthError>>;
}

/// Bearer authentication with tokens from a [`TokenSource`].
///
/// # Example
///
/// ```rust
/// use cis_networking::auth::{AuthError, Authenticator, BoxFuture, IamAuthenticator, TokenSource};
/// use std::collections::HashMap;
///
/// struct Fixed;
///
/// impl TokenSource for Fixed {
///     fn token(&self) -> BoxFuture<'_, Result<String, AuthError>> {
///         Box::pin(async { Ok("iam-token".to_string()) })
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let auth = IamAuthenticator::new(Fixed);
/// let mut headers = HashMap::new();
/// auth.authenticate(&mut headers).await.unwrap();
/// assert_eq!(headers["authorization"], "Bearer iam-token");
/// # });
/// ```
#[derive(Clone)]
pub struct IamAuthenticator {
    source: Arc<dyn TokenSource>,
}

impl IamAuthenticator {
    /// Creates a new IAM authenticator over `source`.
    pub fn new(source: impl TokenSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }
}

impl fmt::Debug for IamAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IamAuthenticator")
    }
}

impl Authenticator for IamAuthenticator {
    fn auth_type(&self) -> AuthType {
        AuthType::Iam
    }

    fn validate(&self) -> Result<(), AuthError> {
        Ok(())
    }

    fn authenticate<'a>(
        &'a self,
        headers: &'a mut HashMap<String, String>,
    ) -> BoxFuture<'a, Result<(), AuthError>> {
        Box::pin(async move {
            let token = self.source.token().await?;
            if token.is_empty() {
                return Err(AuthError::TokenUnavailable {
                    reason: "the token source returned an empty token".to_string(),
                });
            }
            headers.insert(AUTHORIZATION.to_string(), format!("Bearer {token}"));
            Ok(())
        })
    }
}

fn has_bad_first_or_last_char(value: &str) -> bool {
    const BAD: [char; 4] = ['{', '}', '"', '\''];
    value.starts_with(BAD) || value.ends_with(BAD)
}

// Verify authenticators are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<NoAuthAuthenticator>();
    assert_send_sync::<BasicAuthenticator>();
    assert_send_sync::<BearerTokenAuthenticator>();
    assert_send_sync::<IamAuthenticator>();
};
