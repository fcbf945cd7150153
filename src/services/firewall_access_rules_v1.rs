//! Firewall access rules client.
//!
//! [`FirewallAccessRulesV1`] manages account-level access rules: block,
//! challenge or allow traffic by IP, IP range, ASN or country. Paths are
//! scoped by the instance CRN only.
//!
//! # Example
//!
//! ```rust,ignore
//! use cis_networking::services::firewall_access_rules_v1::{
//!     AccessRuleMode, AccountAccessRuleInputConfiguration, ConfigurationTarget,
//!     CreateAccountAccessRuleOptions,
//! };
//!
//! let options = CreateAccountAccessRuleOptions::new()
//!     .mode(AccessRuleMode::Block)
//!     .notes("blocked after abuse report")
//!     .configuration(AccountAccessRuleInputConfiguration::new(
//!         ConfigurationTarget::Ip,
//!         "198.51.100.4",
//!     ));
//! let (envelope, _) = client.create_account_access_rule(Some(&options)).await?;
//! println!("created rule {:?}", envelope.result.id);
//! ```

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{Crn, ExternalConfig, ServiceConfig};
use crate::core::{
    require_field, require_non_empty, validate_options, BaseService, HttpMethod, List, Model,
    ModelDecoder, OperationError, PathTemplate, Single, Validate, ValidationError,
};
use crate::error::ConfigError;

use super::{start_request, MatchMode, OperationResult, SortDirection, DEFAULT_SERVICE_URL};

/// Service name used for external configuration and analytics.
pub const DEFAULT_SERVICE_NAME: &str = "firewall_access_rules";

const RULES: PathTemplate = PathTemplate::new("v1/{crn}/firewall/access_rules/rules");
const RULE: PathTemplate =
    PathTemplate::new("v1/{crn}/firewall/access_rules/rules/{accessrule_identifier}");

/// What an access rule does with matching traffic.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccessRuleMode {
    Block,
    Challenge,
    JsChallenge,
    Whitelist,
}

impl fmt::Display for AccessRuleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Block => "block",
            Self::Challenge => "challenge",
            Self::JsChallenge => "js_challenge",
            Self::Whitelist => "whitelist",
        })
    }
}

/// What an access rule matches on.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationTarget {
    Asn,
    Country,
    Ip,
    IpRange,
}

impl fmt::Display for ConfigurationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asn => "asn",
            Self::Country => "country",
            Self::Ip => "ip",
            Self::IpRange => "ip_range",
        })
    }
}

/// Field to order listed rules by.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AccessRuleOrder {
    Mode,
    Target,
    Value,
}

impl fmt::Display for AccessRuleOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mode => "mode",
            Self::Target => "target",
            Self::Value => "value",
        })
    }
}

// ============================================================================
// Options
// ============================================================================

/// Options for [`FirewallAccessRulesV1::list_all_account_access_rules`].
///
/// Every filter is optional; unset filters are left out of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAllAccountAccessRulesOptions {
    /// Filter by rule notes.
    pub notes: Option<String>,
    /// Filter by rule mode.
    pub mode: Option<AccessRuleMode>,
    /// Filter by configuration target (`configuration.target`).
    pub configuration_target: Option<ConfigurationTarget>,
    /// Filter by configuration value (`configuration.value`).
    pub configuration_value: Option<String>,
    /// Page number of paginated results.
    pub page: Option<i64>,
    /// Maximum number of rules per page.
    pub per_page: Option<i64>,
    /// Field to order rules by.
    pub order: Option<AccessRuleOrder>,
    /// Sort direction for `order`.
    pub direction: Option<SortDirection>,
    /// Whether all or any filters must match (`match`).
    pub match_mode: Option<MatchMode>,
    /// Extra request headers; these replace SDK headers of the same name.
    pub headers: HashMap<String, String>,
}

impl ListAllAccountAccessRulesOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `notes`.
    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets `mode`.
    #[must_use]
    pub const fn mode(mut self, mode: AccessRuleMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets `configuration.target`.
    #[must_use]
    pub const fn configuration_target(mut self, target: ConfigurationTarget) -> Self {
        self.configuration_target = Some(target);
        self
    }

    /// Sets `configuration.value`.
    #[must_use]
    pub fn configuration_value(mut self, value: impl Into<String>) -> Self {
        self.configuration_value = Some(value.into());
        self
    }

    /// Sets `page`.
    #[must_use]
    pub const fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets `per_page`.
    #[must_use]
    pub const fn per_page(mut self, per_page: i64) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Sets `order`.
    #[must_use]
    pub const fn order(mut self, order: AccessRuleOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets `direction`.
    #[must_use]
    pub const fn direction(mut self, direction: SortDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Sets `match`.
    #[must_use]
    pub const fn match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = Some(match_mode);
        self
    }

    /// Adds a request header, replacing any SDK header of the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl Validate for ListAllAccountAccessRulesOptions {
    const NAME: &'static str = "ListAllAccountAccessRulesOptions";

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// The target and value an access rule matches, as sent on create.
///
/// Both fields are required whenever a configuration is supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountAccessRuleInputConfiguration {
    /// What the rule matches on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ConfigurationTarget>,
    /// The IP, range, ASN or country code to match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl AccountAccessRuleInputConfiguration {
    /// Creates a configuration matching `value` on `target`.
    #[must_use]
    pub fn new(target: ConfigurationTarget, value: impl Into<String>) -> Self {
        Self {
            target: Some(target),
            value: Some(value.into()),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        const NAME: &str = "AccountAccessRuleInputConfiguration";
        require_field(NAME, "target", self.target.as_ref())?;
        require_non_empty(NAME, "value", self.value.as_deref())
    }
}

/// Options for [`FirewallAccessRulesV1::create_account_access_rule`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateAccountAccessRuleOptions {
    /// Action the rule applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<AccessRuleMode>,
    /// Notes attached to the rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Target and value the rule matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<AccountAccessRuleInputConfiguration>,
    /// Extra request headers; these replace SDK headers of the same name.
    #[serde(skip)]
    pub headers: HashMap<String, String>,
}

impl CreateAccountAccessRuleOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `mode`.
    #[must_use]
    pub const fn mode(mut self, mode: AccessRuleMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets `notes`.
    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets `configuration`.
    #[must_use]
    pub fn configuration(mut self, configuration: AccountAccessRuleInputConfiguration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// Adds a request header, replacing any SDK header of the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl Validate for CreateAccountAccessRuleOptions {
    const NAME: &'static str = "CreateAccountAccessRuleOptions";

    fn validate(&self) -> Result<(), ValidationError> {
        self.configuration
            .as_ref()
            .map_or(Ok(()), AccountAccessRuleInputConfiguration::validate)
    }
}

/// Options addressing a single rule, for get and delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRuleIdOptions<Op> {
    /// Identifier of the access rule. Required.
    pub accessrule_identifier: Option<String>,
    /// Extra request headers; these replace SDK headers of the same name.
    pub headers: HashMap<String, String>,
    op: std::marker::PhantomData<Op>,
}

impl<Op> AccessRuleIdOptions<Op> {
    /// Creates options for the rule with the given identifier.
    #[must_use]
    pub fn new(accessrule_identifier: impl Into<String>) -> Self {
        Self {
            accessrule_identifier: Some(accessrule_identifier.into()),
            headers: HashMap::new(),
            op: std::marker::PhantomData,
        }
    }

    /// Adds a request header, replacing any SDK header of the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[doc(hidden)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetRule;

#[doc(hidden)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteRule;

/// Options for [`FirewallAccessRulesV1::get_account_access_rule`].
pub type GetAccountAccessRuleOptions = AccessRuleIdOptions<GetRule>;

/// Options for [`FirewallAccessRulesV1::delete_account_access_rule`].
pub type DeleteAccountAccessRuleOptions = AccessRuleIdOptions<DeleteRule>;

impl Validate for GetAccountAccessRuleOptions {
    const NAME: &'static str = "GetAccountAccessRuleOptions";

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(
            Self::NAME,
            "accessrule_identifier",
            self.accessrule_identifier.as_deref(),
        )
    }
}

impl Validate for DeleteAccountAccessRuleOptions {
    const NAME: &'static str = "DeleteAccountAccessRuleOptions";

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(
            Self::NAME,
            "accessrule_identifier",
            self.accessrule_identifier.as_deref(),
        )
    }
}

/// Options for [`FirewallAccessRulesV1::update_account_access_rule`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateAccountAccessRuleOptions {
    /// Identifier of the access rule. Required.
    #[serde(skip)]
    pub accessrule_identifier: Option<String>,
    /// Action the rule applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<AccessRuleMode>,
    /// Notes attached to the rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Extra request headers; these replace SDK headers of the same name.
    #[serde(skip)]
    pub headers: HashMap<String, String>,
}

impl UpdateAccountAccessRuleOptions {
    /// Creates options updating the rule with the given identifier.
    #[must_use]
    pub fn new(accessrule_identifier: impl Into<String>) -> Self {
        Self {
            accessrule_identifier: Some(accessrule_identifier.into()),
            ..Self::default()
        }
    }

    /// Sets `mode`.
    #[must_use]
    pub const fn mode(mut self, mode: AccessRuleMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets `notes`.
    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Adds a request header, replacing any SDK header of the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl Validate for UpdateAccountAccessRuleOptions {
    const NAME: &'static str = "UpdateAccountAccessRuleOptions";

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(
            Self::NAME,
            "accessrule_identifier",
            self.accessrule_identifier.as_deref(),
        )
    }
}

// ============================================================================
// Models
// ============================================================================

/// An account-level access rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountAccessRuleObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Modes the rule may be switched to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_modes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<AccountAccessRuleObjectScope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<AccountAccessRuleObjectConfiguration>,
}

impl Model for AccountAccessRuleObject {
    fn decoder() -> ModelDecoder<Self> {
        ModelDecoder::new("AccountAccessRuleObject")
            .field("id", |r: &mut Self| &mut r.id)
            .field("notes", |r: &mut Self| &mut r.notes)
            .field("allowed_modes", |r: &mut Self| &mut r.allowed_modes)
            .field("mode", |r: &mut Self| &mut r.mode)
            .model("scope", |r: &mut Self| &mut r.scope)
            .timestamp("created_on", |r: &mut Self| &mut r.created_on)
            .timestamp("modified_on", |r: &mut Self| &mut r.modified_on)
            .model("configuration", |r: &mut Self| &mut r.configuration)
    }
}

/// Who owns an access rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountAccessRuleObjectScope {
    /// `account` or `organization`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub scope_type: Option<String>,
}

impl Model for AccountAccessRuleObjectScope {
    fn decoder() -> ModelDecoder<Self> {
        ModelDecoder::new("AccountAccessRuleObjectScope")
            .field("type", |s: &mut Self| &mut s.scope_type)
    }
}

/// The target and value a stored rule matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountAccessRuleObjectConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Model for AccountAccessRuleObjectConfiguration {
    fn decoder() -> ModelDecoder<Self> {
        ModelDecoder::new("AccountAccessRuleObjectConfiguration")
            .field("target", |c: &mut Self| &mut c.target)
            .field("value", |c: &mut Self| &mut c.value)
    }
}

/// Result of deleting a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteAccountAccessRuleResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Model for DeleteAccountAccessRuleResult {
    fn decoder() -> ModelDecoder<Self> {
        ModelDecoder::new("DeleteAccountAccessRuleResult").field("id", |r: &mut Self| &mut r.id)
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client for account-level firewall access rules.
///
/// # Thread Safety
///
/// `FirewallAccessRulesV1` is `Send + Sync`; operations take `&self`.
#[derive(Debug)]
pub struct FirewallAccessRulesV1 {
    service: BaseService,
    crn: Crn,
}

// Verify FirewallAccessRulesV1 is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FirewallAccessRulesV1>();
};

impl FirewallAccessRulesV1 {
    /// Creates a client. Uses [`DEFAULT_SERVICE_URL`] when the configuration
    /// has no URL.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the dispatcher cannot be created.
    pub fn new(config: &ServiceConfig, crn: Crn) -> Result<Self, ConfigError> {
        Ok(Self {
            service: BaseService::new(config, DEFAULT_SERVICE_URL)?,
            crn,
        })
    }

    /// Creates a client from external configuration under the
    /// `firewall_access_rules` service name.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the external settings are incomplete or
    /// invalid.
    pub fn from_external(external: &ExternalConfig, crn: Crn) -> Result<Self, ConfigError> {
        let config = ServiceConfig::builder()
            .service_name(DEFAULT_SERVICE_NAME)
            .external(external)
            .build()?;
        Self::new(&config, crn)
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

    /// Lists access rules, one page at a time.
    ///
    /// The envelope's `result_info` carries the pagination state.
    ///
    /// # Errors
    ///
    /// Returns an [`OperationError`] if the options are invalid, the request
    /// cannot be built or sent, or the response is an error or undecodable.
    pub async fn list_all_account_access_rules(
        &self,
        options: Option<&ListAllAccountAccessRulesOptions>,
    ) -> OperationResult<Vec<AccountAccessRuleObject>> {
        let options = validate_options(options)?;
        let url = RULES.build(self.service.service_url()?, &[self.crn.as_ref()])?;
        let request = start_request(
            HttpMethod::Get,
            url,
            DEFAULT_SERVICE_NAME,
            "ListAllAccountAccessRules",
            &options.headers,
        )
        .query_opt("notes", options.notes.as_deref())
        .query_opt("mode", options.mode)
        .query_opt("configuration.target", options.configuration_target)
        .query_opt("configuration.value", options.configuration_value.as_deref())
        .query_opt("page", options.page)
        .query_opt("per_page", options.per_page)
        .query_opt("order", options.order)
        .query_opt("direction", options.direction)
        .query_opt("match", options.match_mode)
        .build()?;
        self.service
            .invoke::<List<AccountAccessRuleObject>>(&request)
            .await
    }

    /// Creates an access rule.
    ///
    /// # Errors
    ///
    /// Same as [`list_all_account_access_rules`](Self::list_all_account_access_rules).
    pub async fn create_account_access_rule(
        &self,
        options: Option<&CreateAccountAccessRuleOptions>,
    ) -> OperationResult<AccountAccessRuleObject> {
        let options = validate_options(options)?;
        let url = RULES.build(self.service.service_url()?, &[self.crn.as_ref()])?;
        let request = start_request(
            HttpMethod::Post,
            url,
            DEFAULT_SERVICE_NAME,
            "CreateAccountAccessRule",
            &options.headers,
        )
        .json_body(options)?
        .build()?;
        self.service
            .invoke::<Single<AccountAccessRuleObject>>(&request)
            .await
    }

    /// Gets an access rule.
    ///
    /// # Errors
    ///
    /// Same as [`list_all_account_access_rules`](Self::list_all_account_access_rules).
    pub async fn get_account_access_rule(
        &self,
        options: Option<&GetAccountAccessRuleOptions>,
    ) -> OperationResult<AccountAccessRuleObject> {
        let options = validate_options(options)?;
        let url = self.rule_url(options.accessrule_identifier.as_deref())?;
        let request = start_request(
            HttpMethod::Get,
            url,
            DEFAULT_SERVICE_NAME,
            "GetAccountAccessRule",
            &options.headers,
        )
        .build()?;
        self.service
            .invoke::<Single<AccountAccessRuleObject>>(&request)
            .await
    }

    /// Updates the mode or notes of an access rule.
    ///
    /// # Errors
    ///
    /// Same as [`list_all_account_access_rules`](Self::list_all_account_access_rules).
    pub async fn update_account_access_rule(
        &self,
        options: Option<&UpdateAccountAccessRuleOptions>,
    ) -> OperationResult<AccountAccessRuleObject> {
        let options = validate_options(options)?;
        let url = self.rule_url(options.accessrule_identifier.as_deref())?;
        let request = start_request(
            HttpMethod::Patch,
            url,
            DEFAULT_SERVICE_NAME,
            "UpdateAccountAccessRule",
            &options.headers,
        )
        .json_body(options)?
        .build()?;
        self.service
            .invoke::<Single<AccountAccessRuleObject>>(&request)
            .await
    }

    /// Deletes an access rule.
    ///
    /// # Errors
    ///
    /// Same as [`list_all_account_access_rules`](Self::list_all_account_access_rules).
    pub async fn delete_account_access_rule(
        &self,
        options: Option<&DeleteAccountAccessRuleOptions>,
    ) -> OperationResult<DeleteAccountAccessRuleResult> {
        let options = validate_options(options)?;
        let url = self.rule_url(options.accessrule_identifier.as_deref())?;
        let request = start_request(
            HttpMethod::Delete,
            url,
            DEFAULT_SERVICE_NAME,
            "DeleteAccountAccessRule",
            &options.headers,
        )
        .build()?;
        self.service
            .invoke::<Single<DeleteAccountAccessRuleResult>>(&request)
            .await
    }

    fn rule_url(&self, identifier: Option<&str>) -> Result<reqwest::Url, OperationError> {
        RULE.build(
            self.service.service_url()?,
            &[self.crn.as_ref(), identifier.unwrap_or_default()],
        )
    }
}
