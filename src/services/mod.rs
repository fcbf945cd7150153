//! Typed clients for the CIS networking services.
//!
//! Every client holds a [`BaseService`](crate::core::BaseService) and the
//! identity its paths need (a CRN, plus a zone ID for zone-scoped services).
//! Each operation validates its options, resolves the path, builds the
//! request, dispatches it and decodes the envelope.
//!
//! | Client | Service name | Identity |
//! |---|---|---|
//! | [`CachingApiV1`] | `caching_api` | CRN + zone ID |
//! | [`FirewallAccessRulesV1`] | `firewall_access_rules` | CRN |
//! | [`WafRulesApiV1`] | `waf_rules_api` | CRN + zone ID |

pub mod caching_api_v1;
pub mod firewall_access_rules_v1;
pub mod waf_rules_api_v1;

pub use caching_api_v1::CachingApiV1;
pub use firewall_access_rules_v1::FirewallAccessRulesV1;
pub use waf_rules_api_v1::WafRulesApiV1;

use std::collections::HashMap;
use std::fmt;

use reqwest::Url;
use serde::Serialize;

use crate::core::sdk_headers::sdk_headers;
use crate::core::{DetailedResponse, Envelope, HttpMethod, OperationError, RequestBuilder};

/// Default base URL shared by the CIS services.
pub const DEFAULT_SERVICE_URL: &str = "https://api.cis.cloud.ibm.com";

/// The outcome of a service operation: the decoded envelope and the raw
/// response it came from.
pub type OperationResult<R> = Result<(Envelope<R>, DetailedResponse), OperationError>;

const SERVICE_VERSION: &str = "V1";

/// Starts a request carrying the SDK analytics header and then the caller's
/// headers, so caller values win on collision.
fn start_request(
    method: HttpMethod,
    url: Url,
    service_name: &str,
    operation_id: &str,
    headers: &HashMap<String, String>,
) -> RequestBuilder {
    RequestBuilder::new(method, url)
        .headers(&sdk_headers(service_name, SERVICE_VERSION, operation_id))
        .headers(headers)
}

/// An `on`/`off` switch.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OnOff {
    On,
    Off,
}

impl OnOff {
    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for OnOff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction for list operations.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

/// Whether list filters must all match or any may match.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    All,
    Any,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Any => "any",
        })
    }
}
