//! WAF rules client.
//!
//! [`WafRulesApiV1`] lists, reads and updates the rules of a zone's WAF
//! packages. CIS packages take a [`CisRuleMode`]; OWASP packages are simply
//! switched on or off.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::config::{Crn, ExternalConfig, ServiceConfig, ZoneId};
use crate::core::{
    require_field, require_non_empty, validate_options, BaseService, HttpMethod, List, Model,
    ModelDecoder, OperationError, PathTemplate, Single, Validate, ValidationError,
};
use crate::error::ConfigError;

use super::{
    start_request, MatchMode, OnOff, OperationResult, SortDirection, DEFAULT_SERVICE_URL,
};

/// Service name used for external configuration and analytics.
pub const DEFAULT_SERVICE_NAME: &str = "waf_rules_api";

const RULES: PathTemplate = PathTemplate::new(
    "v1/{crn}/zones/{zone_identifier}/firewall/waf/packages/{package_id}/rules",
);
const RULE: PathTemplate = PathTemplate::new(
    "v1/{crn}/zones/{zone_identifier}/firewall/waf/packages/{package_id}/rules/{identifier}",
);

/// Action of a rule in a CIS WAF package.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CisRuleMode {
    Block,
    Challenge,
    Default,
    Disable,
    Simulate,
}

impl fmt::Display for CisRuleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Block => "block",
            Self::Challenge => "challenge",
            Self::Default => "default",
            Self::Disable => "disable",
            Self::Simulate => "simulate",
        })
    }
}

/// Options for [`WafRulesApiV1::list_waf_rules`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListWafRulesOptions {
    /// WAF package ID. Required.
    pub package_id: Option<String>,
    /// Filter by rule mode.
    pub mode: Option<OnOff>,
    /// Filter by rule priority.
    pub priority: Option<String>,
    /// Whether all or any filters must match (`match`).
    pub match_mode: Option<MatchMode>,
    /// Field to order rules by.
    pub order: Option<String>,
    /// Filter by rule group ID.
    pub group_id: Option<String>,
    /// Filter by rule description.
    pub description: Option<String>,
    /// Sort direction for `order`.
    pub direction: Option<SortDirection>,
    /// Page number of paginated results.
    pub page: Option<i64>,
    /// Maximum number of rules per page.
    pub per_page: Option<i64>,
    /// Extra request headers; these replace SDK headers of the same name.
    pub headers: HashMap<String, String>,
}

impl ListWafRulesOptions {
    /// Creates options listing the rules of `package_id`.
    #[must_use]
    pub fn new(package_id: impl Into<String>) -> Self {
        Self {
            package_id: Some(package_id.into()),
            ..Self::default()
        }
    }

    /// Sets `mode`.
    #[must_use]
    pub const fn mode(mut self, mode: OnOff) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets `priority`.
    #[must_use]
    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets `match`.
    #[must_use]
    pub const fn match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = Some(match_mode);
        self
    }

    /// Sets `order`.
    #[must_use]
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Sets `group_id`.
    #[must_use]
    pub fn group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Sets `description`.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets `direction`.
    #[must_use]
    pub const fn direction(mut self, direction: SortDirection) -> Self {
        self.direction = Some(direction);
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

    /// Adds a request header, replacing any SDK header of the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl Validate for ListWafRulesOptions {
    const NAME: &'static str = "ListWafRulesOptions";

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(Self::NAME, "package_id", self.package_id.as_deref())
    }
}

/// Options for [`WafRulesApiV1::get_waf_rule`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetWafRuleOptions {
    /// WAF package ID. Required.
    pub package_id: Option<String>,
    /// Rule ID. Required.
    pub identifier: Option<String>,
    /// Extra request headers; these replace SDK headers of the same name.
    pub headers: HashMap<String, String>,
}

impl GetWafRuleOptions {
    /// Creates options for one rule of a package.
    #[must_use]
    pub fn new(package_id: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            package_id: Some(package_id.into()),
            identifier: Some(identifier.into()),
            headers: HashMap::new(),
        }
    }

    /// Adds a request header, replacing any SDK header of the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl Validate for GetWafRuleOptions {
    const NAME: &'static str = "GetWafRuleOptions";

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(Self::NAME, "package_id", self.package_id.as_deref())?;
        require_non_empty(Self::NAME, "identifier", self.identifier.as_deref())
    }
}

/// New mode for a rule in a CIS package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WafRuleBodyCis {
    /// Required when the body is sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<CisRuleMode>,
}

/// New mode for a rule in an OWASP package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WafRuleBodyOwasp {
    /// Required when the body is sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<OnOff>,
}

/// Options for [`WafRulesApiV1::update_waf_rule`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateWafRuleOptions {
    /// WAF package ID. Required.
    #[serde(skip)]
    pub package_id: Option<String>,
    /// Rule ID. Required.
    #[serde(skip)]
    pub identifier: Option<String>,
    /// New mode for a CIS package rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cis: Option<WafRuleBodyCis>,
    /// New mode for an OWASP package rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owasp: Option<WafRuleBodyOwasp>,
    /// Extra request headers; these replace SDK headers of the same name.
    #[serde(skip)]
    pub headers: HashMap<String, String>,
}

impl UpdateWafRuleOptions {
    /// Creates options updating one rule of a package.
    #[must_use]
    pub fn new(package_id: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            package_id: Some(package_id.into()),
            identifier: Some(identifier.into()),
            ..Self::default()
        }
    }

    /// Sets the mode for a CIS package rule.
    #[must_use]
    pub const fn cis(mut self, mode: CisRuleMode) -> Self {
        self.cis = Some(WafRuleBodyCis { mode: Some(mode) });
        self
    }

    /// Sets the mode for an OWASP package rule.
    #[must_use]
    pub const fn owasp(mut self, mode: OnOff) -> Self {
        self.owasp = Some(WafRuleBodyOwasp { mode: Some(mode) });
        self
    }

    /// Adds a request header, replacing any SDK header of the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl Validate for UpdateWafRuleOptions {
    const NAME: &'static str = "UpdateWafRuleOptions";

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(Self::NAME, "package_id", self.package_id.as_deref())?;
        require_non_empty(Self::NAME, "identifier", self.identifier.as_deref())?;
        if let Some(cis) = &self.cis {
            require_field("WafRuleBodyCis", "mode", cis.mode.as_ref())?;
        }
        if let Some(owasp) = &self.owasp {
            require_field("WafRuleBodyOwasp", "mode", owasp.mode.as_ref())?;
        }
        Ok(())
    }
}

/// A WAF rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WafRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<WafRuleGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_modes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl Model for WafRule {
    fn decoder() -> ModelDecoder<Self> {
        ModelDecoder::new("WafRule")
            .field("id", |r: &mut Self| &mut r.id)
            .field("description", |r: &mut Self| &mut r.description)
            .field("priority", |r: &mut Self| &mut r.priority)
            .model("group", |r: &mut Self| &mut r.group)
            .field("package_id", |r: &mut Self| &mut r.package_id)
            .field("allowed_modes", |r: &mut Self| &mut r.allowed_modes)
            .field("mode", |r: &mut Self| &mut r.mode)
    }
}

/// The group a WAF rule belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WafRuleGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Model for WafRuleGroup {
    fn decoder() -> ModelDecoder<Self> {
        ModelDecoder::new("WafRuleGroup")
            .field("id", |g: &mut Self| &mut g.id)
            .field("name", |g: &mut Self| &mut g.name)
    }
}

/// Client for the WAF rules of one zone.
///
/// # Thread Safety
///
/// `WafRulesApiV1` is `Send + Sync`; operations take `&self`.
#[derive(Debug)]
pub struct WafRulesApiV1 {
    service: BaseService,
    crn: Crn,
    zone_id: ZoneId,
}

// Verify WafRulesApiV1 is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<WafRulesApiV1>();
};

impl WafRulesApiV1 {
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
    /// `waf_rules_api` service name.
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

    /// Lists the rules of a WAF package.
    ///
    /// # Errors
    ///
    /// Returns an [`OperationError`] if the options are invalid, the request
    /// cannot be built or sent, or the response is an error or undecodable.
    pub async fn list_waf_rules(
        &self,
        options: Option<&ListWafRulesOptions>,
    ) -> OperationResult<Vec<WafRule>> {
        let options = validate_options(options)?;
        let url = RULES.build(
            self.service.service_url()?,
            &[
                self.crn.as_ref(),
                self.zone_id.as_ref(),
                options.package_id.as_deref().unwrap_or_default(),
            ],
        )?;
        let request = start_request(
            HttpMethod::Get,
            url,
            DEFAULT_SERVICE_NAME,
            "ListWafRules",
            &options.headers,
        )
        .query_opt("mode", options.mode)
        .query_opt("priority", options.priority.as_deref())
        .query_opt("match", options.match_mode)
        .query_opt("order", options.order.as_deref())
        .query_opt("group_id", options.group_id.as_deref())
        .query_opt("description", options.description.as_deref())
        .query_opt("direction", options.direction)
        .query_opt("page", options.page)
        .query_opt("per_page", options.per_page)
        .build()?;
        self.service.invoke::<List<WafRule>>(&request).await
    }

    /// Gets a WAF rule.
    ///
    /// # Errors
    ///
    /// Same as [`list_waf_rules`](Self::list_waf_rules).
    pub async fn get_waf_rule(
        &self,
        options: Option<&GetWafRuleOptions>,
    ) -> OperationResult<WafRule> {
        let options = validate_options(options)?;
        let url = self.rule_url(options.package_id.as_deref(), options.identifier.as_deref())?;
        let request = start_request(
            HttpMethod::Get,
            url,
            DEFAULT_SERVICE_NAME,
            "GetWafRule",
            &options.headers,
        )
        .build()?;
        self.service.invoke::<Single<WafRule>>(&request).await
    }

    /// Changes the mode of a WAF rule.
    ///
    /// # Errors
    ///
    /// Same as [`list_waf_rules`](Self::list_waf_rules).
    pub async fn update_waf_rule(
        &self,
        options: Option<&UpdateWafRuleOptions>,
    ) -> OperationResult<WafRule> {
        let options = validate_options(options)?;
        let url = self.rule_url(options.package_id.as_deref(), options.identifier.as_deref())?;
        let request = start_request(
            HttpMethod::Patch,
            url,
            DEFAULT_SERVICE_NAME,
            "UpdateWafRule",
            &options.headers,
        )
        .json_body(options)?
        .build()?;
        self.service.invoke::<Single<WafRule>>(&request).await
    }

    fn rule_url(
        &self,
        package_id: Option<&str>,
        identifier: Option<&str>,
    ) -> Result<reqwest::Url, OperationError> {
        RULE.build(
            self.service.service_url()?,
            &[
                self.crn.as_ref(),
                self.zone_id.as_ref(),
                package_id.unwrap_or_default(),
                identifier.unwrap_or_default(),
            ],
        )
    }
}
