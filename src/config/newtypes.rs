//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use reqwest::Url;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The full cloud resource name (CRN) of a CIS service instance.
///
/// Nearly every operation uses the CRN as its first positional path
/// parameter. The value is opaque to the SDK; it only has to be non-empty.
///
/// # Example
///
/// ```rust
/// use cis_networking::Crn;
///
/// let crn = Crn::new("crn:v1:bluemix:public:internet-svcs:global:a/abc::").unwrap();
/// assert!(crn.as_ref().starts_with("crn:v1"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Crn(String);

impl Crn {
    /// Creates a new validated CRN.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCrn`] if the value is empty or whitespace.
    pub fn new(crn: impl Into<String>) -> Result<Self, ConfigError> {
        let crn = crn.into();
        if crn.trim().is_empty() {
            return Err(ConfigError::EmptyCrn);
        }
        Ok(Self(crn))
    }
}

impl AsRef<str> for Crn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Crn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated zone identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ZoneId(String);

impl ZoneId {
    /// Creates a new validated zone identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyZoneId`] if the value is empty or whitespace.
    pub fn new(zone_id: impl Into<String>) -> Result<Self, ConfigError> {
        let zone_id = zone_id.into();
        if zone_id.trim().is_empty() {
            return Err(ConfigError::EmptyZoneId);
        }
        Ok(Self(zone_id))
    }
}

impl AsRef<str> for ZoneId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated service base URL.
///
/// The URL must be absolute and must not start or end with a brace or quote
/// character, which usually means an unrendered template placeholder was
/// passed through.
///
/// # Serialization
///
/// `ServiceUrl` serializes to and deserializes from its string form:
///
/// ```rust
/// use cis_networking::ServiceUrl;
///
/// let url = ServiceUrl::new("https://api.cis.cloud.ibm.com").unwrap();
/// let json = serde_json::to_string(&url).unwrap();
/// assert_eq!(json, r#""https://api.cis.cloud.ibm.com""#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceUrl {
    raw: String,
    parsed: Url,
}

impl ServiceUrl {
    /// Creates a new validated service URL.
    ///
    /// Trailing slashes are removed so that path templates can be appended
    /// with a single separator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidServiceUrl`] if the URL is empty, cannot
    /// be parsed as an absolute URL, or is wrapped in braces or quotes.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim_end_matches('/');

        if trimmed.is_empty() {
            return Err(ConfigError::InvalidServiceUrl {
                url,
                reason: "the URL is empty".to_string(),
            });
        }

        if has_bad_first_or_last_char(trimmed) {
            return Err(ConfigError::InvalidServiceUrl {
                url,
                reason: "the URL starts or ends with a brace or quote".to_string(),
            });
        }

        let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidServiceUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            raw: trimmed.to_string(),
            parsed,
        })
    }

    /// Returns the parsed URL.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.parsed
    }
}

fn has_bad_first_or_last_char(value: &str) -> bool {
    const BAD: [char; 4] = ['{', '}', '"', '\''];
    value.starts_with(BAD) || value.ends_with(BAD)
}

impl AsRef<str> for ServiceUrl {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for ServiceUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for ServiceUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

// Verify newtypes are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Crn>();
    assert_send_sync::<ZoneId>();
    assert_send_sync::<ServiceUrl>();
};
