//! Caching API client.
//!
//! [`CachingApiV1`] purges a zone's cache and reads or updates its cache
//! settings. Every path is scoped by the instance CRN and the zone ID.
//!
//! # Example
//!
//! ```rust,ignore
//! use cis_networking::auth::BearerTokenAuthenticator;
//! use cis_networking::services::caching_api_v1::{CacheLevel, UpdateCacheLevelOptions};
//! use cis_networking::{CachingApiV1, Crn, ServiceConfig, ZoneId};
//!
//! let config = ServiceConfig::builder()
//!     .authenticator(BearerTokenAuthenticator::new("token"))
//!     .build()?;
//! let client = CachingApiV1::new(&config, Crn::new("crn:v1:...")?, ZoneId::new("zone-1")?)?;
//!
//! let options = UpdateCacheLevelOptions::new().value(CacheLevel::Aggressive);
//! let (envelope, _response) = client.update_cache_level(Some(&options)).await?;
//! println!("cache level: {:?}", envelope.result.value);
//! ```

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{Crn, ExternalConfig, ServiceConfig, ZoneId};
use crate::core::{
    validate_options, BaseService, HttpMethod, Model, ModelDecoder, OperationError, PathTemplate,
    Single, Validate, ValidationError,
};
use crate::error::ConfigError;

use super::{start_request, OnOff, OperationResult, DEFAULT_SERVICE_URL};

/// Service name used for external configuration and analytics.
pub const DEFAULT_SERVICE_NAME: &str = "caching_api";

const PURGE_ALL: PathTemplate =
    PathTemplate::new("v1/{crn}/zones/{zone_id}/purge_cache/purge_all");
const PURGE_BY_URLS: PathTemplate =
    PathTemplate::new("v1/{crn}/zones/{zone_id}/purge_cache/purge_by_urls");
const PURGE_BY_CACHE_TAGS: PathTemplate =
    PathTemplate::new("v1/{crn}/zones/{zone_id}/purge_cache/purge_by_cache_tags");
const PURGE_BY_HOSTS: PathTemplate =
    PathTemplate::new("v1/{crn}/zones/{zone_id}/purge_cache/purge_by_hosts");
const BROWSER_CACHE_TTL: PathTemplate =
    PathTemplate::new("v1/{crn}/zones/{zone_id}/settings/browser_cache_ttl");
const DEVELOPMENT_MODE: PathTemplate =
    PathTemplate::new("v1/{crn}/zones/{zone_id}/settings/development_mode");
const QUERY_STRING_SORT: PathTemplate =
    PathTemplate::new("v1/{crn}/zones/{zone_id}/settings/sort_query_string_for_cache");
const CACHE_LEVEL: PathTemplate =
    PathTemplate::new("v1/{crn}/zones/{zone_id}/settings/cache_level");

/// Cache level of a zone.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CacheLevel {
    Basic,
    Simplified,
    Aggressive,
}

impl fmt::Display for CacheLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Basic => "basic",
            Self::Simplified => "simplified",
            Self::Aggressive => "aggressive",
        })
    }
}

// ============================================================================
// Options
// ============================================================================

/// Options for operations that take nothing but headers.
///
/// The type parameter only names the operation in error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderOptions<Op> {
    /// Extra request headers.
    pub headers: HashMap<String, String>,
    op: std::marker::PhantomData<Op>,
}

impl<Op> HeaderOptions<Op> {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            headers: HashMap::new(),
            op: std::marker::PhantomData,
        }
    }

    /// Adds a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

macro_rules! header_only_options {
    ($($(#[$doc:meta])* $marker:ident => $alias:ident;)*) => {
        $(
            #[doc(hidden)]
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $marker;

            $(#[$doc])*
            pub type $alias = HeaderOptions<$marker>;

            impl Validate for HeaderOptions<$marker> {
                const NAME: &'static str = stringify!($alias);

                fn validate(&self) -> Result<(), ValidationError> {
                    Ok(())
                }
            }
        )*
    };
}

header_only_options! {
    /// Options for [`CachingApiV1::purge_all`].
    PurgeAll => PurgeAllOptions;
    /// Options for [`CachingApiV1::get_browser_cache_ttl`].
    GetBrowserCacheTtl => GetBrowserCacheTtlOptions;
    /// Options for [`CachingApiV1::get_development_mode`].
    GetDevelopmentMode => GetDevelopmentModeOptions;
    /// Options for [`CachingApiV1::get_query_string_sort`].
    GetQueryStringSort => GetQueryStringSortOptions;
    /// Options for [`CachingApiV1::get_cache_level`].
    GetCacheLevel => GetCacheLevelOptions;
}

/// Options for the purge operations that take a list of targets.
///
/// `Op` names the operation and the JSON field carrying the list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeListOptions<Op> {
    /// Items to purge: URLs, cache tags or host names.
    pub items: Option<Vec<String>>,
    /// Extra request headers.
    pub headers: HashMap<String, String>,
    op: std::marker::PhantomData<Op>,
}

impl<Op> PurgeListOptions<Op> {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: None,
            headers: HashMap::new(),
            op: std::marker::PhantomData,
        }
    }

    /// Sets the items to purge.
    #[must_use]
    pub fn items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = Some(items.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Names the JSON field a purge list is sent under.
pub trait PurgeListField {
    /// Options type name used in error messages.
    const NAME: &'static str;
    /// JSON field carrying the items.
    const FIELD: &'static str;
    /// Operation ID for the analytics header.
    const OPERATION_ID: &'static str;
}

macro_rules! purge_list_options {
    ($($(#[$doc:meta])* $marker:ident => $alias:ident, $field:literal;)*) => {
        $(
            #[doc(hidden)]
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $marker;

            impl PurgeListField for $marker {
                const NAME: &'static str = stringify!($alias);
                const FIELD: &'static str = $field;
                const OPERATION_ID: &'static str = stringify!($marker);
            }

            $(#[$doc])*
            pub type $alias = PurgeListOptions<$marker>;
        )*
    };
}

purge_list_options! {
    /// Options for [`CachingApiV1::purge_by_urls`]; items are sent as `files`.
    PurgeByUrls => PurgeByUrlsOptions, "files";
    /// Options for [`CachingApiV1::purge_by_cache_tags`]; items are sent as `tags`.
    PurgeByCacheTags => PurgeByCacheTagsOptions, "tags";
    /// Options for [`CachingApiV1::purge_by_hosts`]; items are sent as `hosts`.
    PurgeByHosts => PurgeByHostsOptions, "hosts";
}

impl<Op: PurgeListField> Validate for PurgeListOptions<Op> {
    const NAME: &'static str = Op::NAME;

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Options for the setting update operations.
///
/// `V` is the setting's value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSettingOptions<V, Op> {
    /// New setting value. Omitted from the body when unset.
    pub value: Option<V>,
    /// Extra request headers.
    pub headers: HashMap<String, String>,
    op: std::marker::PhantomData<Op>,
}

impl<V, Op> Default for UpdateSettingOptions<V, Op> {
    fn default() -> Self {
        Self {
            value: None,
            headers: HashMap::new(),
            op: std::marker::PhantomData,
        }
    }
}

impl<V, Op> UpdateSettingOptions<V, Op> {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the new value.
    #[must_use]
    pub fn value(mut self, value: V) -> Self {
        self.value = Some(value);
        self
    }

    /// Adds a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

macro_rules! update_setting_options {
    ($($(#[$doc:meta])* $marker:ident => $alias:ident<$value:ty>;)*) => {
        $(
            #[doc(hidden)]
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $marker;

            $(#[$doc])*
            pub type $alias = UpdateSettingOptions<$value, $marker>;

            impl Validate for UpdateSettingOptions<$value, $marker> {
                const NAME: &'static str = stringify!($alias);

                fn validate(&self) -> Result<(), ValidationError> {
                    Ok(())
                }
            }
        )*
    };
}

update_setting_options! {
    /// Options for [`CachingApiV1::update_browser_cache_ttl`]; the value is in seconds.
    UpdateBrowserCacheTtl => UpdateBrowserCacheTtlOptions<i64>;
    /// Options for [`CachingApiV1::update_development_mode`].
    UpdateDevelopmentMode => UpdateDevelopmentModeOptions<OnOff>;
    /// Options for [`CachingApiV1::update_query_string_sort`].
    UpdateQueryStringSort => UpdateQueryStringSortOptions<OnOff>;
    /// Options for [`CachingApiV1::update_cache_level`].
    UpdateCacheLevel => UpdateCacheLevelOptions<CacheLevel>;
}

#[derive(Serialize)]
struct SettingBody<'a, V> {
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a V>,
}

// ============================================================================
// Models
// ============================================================================

/// Result of a purge operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeResult {
    /// Purge request identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Model for PurgeResult {
    fn decoder() -> ModelDecoder<Self> {
        ModelDecoder::new("PurgeResult").field("id", |r: &mut Self| &mut r.id)
    }
}

/// A zone setting as reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettingResult<V> {
    /// Setting identifier, e.g. `cache_level`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Current value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<V>,
    /// Whether the setting can be changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    /// Last modification time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<DateTime<Utc>>,
}

impl<V: DeserializeOwned + Default + 'static> Model for SettingResult<V> {
    fn decoder() -> ModelDecoder<Self> {
        ModelDecoder::new("SettingResult")
            .field("id", |r: &mut Self| &mut r.id)
            .field("value", |r: &mut Self| &mut r.value)
            .field("editable", |r: &mut Self| &mut r.editable)
            .timestamp("modified_on", |r: &mut Self| &mut r.modified_on)
    }
}

/// Browser cache TTL setting; the value is in seconds.
pub type BrowserTtlSetting = SettingResult<i64>;

/// A string-valued setting (development mode, query string sort, cache level).
pub type StringSetting = SettingResult<String>;

// ============================================================================
// Client
// ============================================================================

/// Client for the caching API of one zone.
///
/// # Thread Safety
///
/// `CachingApiV1` is `Send + Sync`; operations take `&self`.
#[derive(Debug)]
pub struct CachingApiV1 {
    service: BaseService,
    crn: Crn,
    zone_id: ZoneId,
}

// Verify CachingApiV1 is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CachingApiV1>();
};

impl CachingApiV1 {
    /// Creates a client. Uses [`DEFAULT_SERVICE_URL`] when the configuration
    /// has no URL.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the dispatcher cannot be created.
    pub fn new(config: &ServiceConfig, crn: Crn, zone_id: ZoneId) -> Result<Self, ConfigError> {
        Ok(Self {
            service: BaseService::new(config, DEFAULT_SERVICE_URL)?,
            crn,
            zone_id,
        })
    }

    /// Creates a client from external configuration under the
    /// `caching_api` service name.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the external settings are incomplete or
    /// invalid.
    pub fn from_external(
        external: &ExternalConfig,
        crn: Crn,
        zone_id: ZoneId,
    ) -> Result<Self, ConfigError> {
        let config = ServiceConfig::builder()
            .service_name(DEFAULT_SERVICE_NAME)
            .external(external)
            .build()?;
        Self::new(&config, crn, zone_id)
    }

    /// Returns the current service URL.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::ServiceUrlMissing`] if the URL was cleared.
    pub fn service_url(&self) -> Result<&str, OperationError> {
        self.service.service_url()
    }

    /// Replaces the service URL; an empty string clears it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidServiceUrl`] for an invalid URL.
    pub fn set_service_url(&mut self, url: &str) -> Result<(), ConfigError> {
        self.service.set_service_url(url)
    }

    /// Returns the instance CRN.
    #[must_use]
    pub const fn crn(&self) -> &Crn {
        &self.crn
    }

    /// Returns the zone ID.
    #[must_use]
    pub const fn zone_id(&self) -> &ZoneId {
        &self.zone_id
    }

    fn scope(&self) -> [&str; 2] {
        [self.crn.as_ref(), self.zone_id.as_ref()]
    }

    /// Purges everything cached for the zone.
    ///
    /// # Errors
    ///
    /// Returns an [`OperationError`] if the options are invalid, the request
    /// cannot be built or sent, or the response is an error or undecodable.
    pub async fn purge_all(
        &self,
        options: Option<&PurgeAllOptions>,
    ) -> OperationResult<PurgeResult> {
        let options = validate_options(options)?;
        let url = PURGE_ALL.build(self.service.service_url()?, &self.scope())?;
        let request = start_request(
            HttpMethod::Put,
            url,
            DEFAULT_SERVICE_NAME,
            "PurgeAll",
            &options.headers,
        )
        .build()?;
        self.service.invoke::<Single<PurgeResult>>(&request).await
    }

    /// Purges cached files by URL.
    ///
    /// # Errors
    ///
    /// See [`purge_all`](Self::purge_all).
    pub async fn purge_by_urls(
        &self,
        options: Option<&PurgeByUrlsOptions>,
    ) -> OperationResult<PurgeResult> {
        self.purge_list(&PURGE_BY_URLS, options).await
    }

    /// Purges cached content by cache tag.
    ///
    /// # Errors
    ///
    /// See [`purge_all`](Self::purge_all).
    pub async fn purge_by_cache_tags(
        &self,
        options: Option<&PurgeByCacheTagsOptions>,
    ) -> OperationResult<PurgeResult> {
        self.purge_list(&PURGE_BY_CACHE_TAGS, options).await
    }

    /// Purges cached content by host name.
    ///
    /// # Errors
    ///
    /// See [`purge_all`](Self::purge_all).
    pub async fn purge_by_hosts(
        &self,
        options: Option<&PurgeByHostsOptions>,
    ) -> OperationResult<PurgeResult> {
        self.purge_list(&PURGE_BY_HOSTS, options).await
    }

    async fn purge_list<Op: PurgeListField>(
        &self,
        template: &PathTemplate,
        options: Option<&PurgeListOptions<Op>>,
    ) -> OperationResult<PurgeResult> {
        let options = validate_options(options)?;
        let url = template.build(self.service.service_url()?, &self.scope())?;

        let mut body = serde_json::Map::new();
        if let Some(items) = &options.items {
            body.insert(Op::FIELD.to_string(), serde_json::Value::from(items.clone()));
        }

        let request = start_request(
            HttpMethod::Put,
            url,
            DEFAULT_SERVICE_NAME,
            Op::OPERATION_ID,
            &options.headers,
        )
        .json_body(&body)?
        .build()?;
        self.service.invoke::<Single<PurgeResult>>(&request).await
    }

    /// Gets the browser cache TTL.
    ///
    /// # Errors
    ///
    /// See [`purge_all`](Self::purge_all).
    pub async fn get_browser_cache_ttl(
        &self,
        options: Option<&GetBrowserCacheTtlOptions>,
    ) -> OperationResult<BrowserTtlSetting> {
        self.get_setting(&BROWSER_CACHE_TTL, "GetBrowserCacheTtl", options)
            .await
    }

    /// Updates the browser cache TTL.
    ///
    /// # Errors
    ///
    /// See [`purge_all`](Self::purge_all).
    pub async fn update_browser_cache_ttl(
        &self,
        options: Option<&UpdateBrowserCacheTtlOptions>,
    ) -> OperationResult<BrowserTtlSetting> {
        self.update_setting(&BROWSER_CACHE_TTL, "UpdateBrowserCacheTtl", options)
            .await
    }

    /// Gets the development mode setting.
    ///
    /// # Errors
    ///
    /// See [`purge_all`](Self::purge_all).
    pub async fn get_development_mode(
        &self,
        options: Option<&GetDevelopmentModeOptions>,
    ) -> OperationResult<StringSetting> {
        self.get_setting(&DEVELOPMENT_MODE, "GetDevelopmentMode", options)
            .await
    }

    /// Turns development mode on or off.
    ///
    /// # Errors
    ///
    /// See [`purge_all`](Self::purge_all).
    pub async fn update_development_mode(
        &self,
        options: Option<&UpdateDevelopmentModeOptions>,
    ) -> OperationResult<StringSetting> {
        self.update_setting(&DEVELOPMENT_MODE, "UpdateDevelopmentMode", options)
            .await
    }

    /// Gets the query string sort setting.
    ///
    /// # Errors
    ///
    /// See [`purge_all`](Self::purge_all).
    pub async fn get_query_string_sort(
        &self,
        options: Option<&GetQueryStringSortOptions>,
    ) -> OperationResult<StringSetting> {
        self.get_setting(&QUERY_STRING_SORT, "GetQueryStringSort", options)
            .await
    }

    /// Turns query string sorting on or off.
    ///
    /// # Errors
    ///
    /// See [`purge_all`](Self::purge_all).
    pub async fn update_query_string_sort(
        &self,
        options: Option<&UpdateQueryStringSortOptions>,
    ) -> OperationResult<StringSetting> {
        self.update_setting(&QUERY_STRING_SORT, "UpdateQueryStringSort", options)
            .await
    }

    /// Gets the cache level.
    ///
    /// # Errors
    ///
    /// See [`purge_all`](Self::purge_all).
    pub async fn get_cache_level(
        &self,
        options: Option<&GetCacheLevelOptions>,
    ) -> OperationResult<StringSetting> {
        self.get_setting(&CACHE_LEVEL, "GetCacheLevel", options).await
    }

    /// Sets the cache level.
    ///
    /// # Errors
    ///
    /// See [`purge_all`](Self::purge_all).
    pub async fn update_cache_level(
        &self,
        options: Option<&UpdateCacheLevelOptions>,
    ) -> OperationResult<StringSetting> {
        self.update_setting(&CACHE_LEVEL, "UpdateCacheLevel", options)
            .await
    }

    async fn get_setting<Op, R>(
        &self,
        template: &PathTemplate,
        operation_id: &str,
        options: Option<&HeaderOptions<Op>>,
    ) -> OperationResult<R>
    where
        HeaderOptions<Op>: Validate,
        R: Model,
    {
        let options = validate_options(options)?;
        let url = template.build(self.service.service_url()?, &self.scope())?;
        let request = start_request(
            HttpMethod::Get,
            url,
            DEFAULT_SERVICE_NAME,
            operation_id,
            &options.headers,
        )
        .build()?;
        self.service.invoke::<Single<R>>(&request).await
    }

    async fn update_setting<V, Op, R>(
        &self,
        template: &PathTemplate,
        operation_id: &str,
        options: Option<&UpdateSettingOptions<V, Op>>,
    ) -> OperationResult<R>
    where
        V: Serialize,
        UpdateSettingOptions<V, Op>: Validate,
        R: Model,
    {
        let options = validate_options(options)?;
        let url = template.build(self.service.service_url()?, &self.scope())?;
        let body = SettingBody {
            value: options.value.as_ref(),
        };
        let request = start_request(
            HttpMethod::Patch,
            url,
            DEFAULT_SERVICE_NAME,
            operation_id,
            &options.headers,
        )
        .json_body(&body)?
        .build()?;
        self.service.invoke::<Single<R>>(&request).await
    }
}
