//! # CIS Networking SDK
//!
//! A Rust client for IBM Cloud Internet Services (CIS) networking APIs,
//! providing typed options, typed results and a shared request engine.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`ServiceConfig`] and [`ServiceConfigBuilder`]
//! - Validated newtypes for the instance CRN, zone ID and service URL
//! - Pluggable authentication via the [`auth::Authenticator`] trait
//! - External configuration snapshots via [`ExternalConfig`]
//! - A request engine ([`core`]) doing path templating, request building,
//!   options validation, dispatch and envelope decoding
//! - Typed clients: [`CachingApiV1`], [`FirewallAccessRulesV1`] and
//!   [`WafRulesApiV1`]
//!
//! ## Quick Start
//!
//! ```rust
//! use cis_networking::auth::BearerTokenAuthenticator;
//! use cis_networking::{CachingApiV1, Crn, ServiceConfig, ZoneId};
//!
//! let config = ServiceConfig::builder()
//!     .authenticator(BearerTokenAuthenticator::new("access-token"))
//!     .build()
//!     .unwrap();
//!
//! let client = CachingApiV1::new(
//!     &config,
//!     Crn::new("crn:v1:bluemix:public:internet-svcs:global:a/abc::").unwrap(),
//!     ZoneId::new("9a0c7d51b4ea4d4b8b3b7c8f1e0a2b3c").unwrap(),
//! )
//! .unwrap();
//! assert_eq!(client.service_url().unwrap(), "https://api.cis.cloud.ibm.com");
//! ```
//!
//! ## Making Requests
//!
//! Every operation takes `Option<&XOptions>` and returns the decoded
//! [`Envelope`] together with the raw [`DetailedResponse`]:
//!
//! ```rust,ignore
//! use cis_networking::services::firewall_access_rules_v1::ListAllAccountAccessRulesOptions;
//!
//! let options = ListAllAccountAccessRulesOptions::new().page(1).per_page(50);
//! let (envelope, response) = client.list_all_account_access_rules(Some(&options)).await?;
//! for rule in &envelope.result {
//!     println!("{:?} {:?}", rule.id, rule.mode);
//! }
//! if envelope.result_info.is_some_and(|info| info.has_next_page()) {
//!     // request the next page
//! }
//! ```
//!
//! ## Errors
//!
//! Construction failures are [`ConfigError`]s. Operation failures are
//! [`OperationError`]s; [`OperationError::is_response_error`] tells whether a
//! [`DetailedResponse`] is attached.
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: newtypes and options validate before any I/O
//! - **Thread-safe**: all clients are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime

pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod services;

// Re-export public types at crate root for convenience
pub use config::{Crn, ExternalConfig, ServiceConfig, ServiceConfigBuilder, ServiceUrl, ZoneId};
pub use error::ConfigError;

// Re-export engine types
pub use crate::core::{DetailedResponse, Envelope, OperationError, ResultInfo, RetryPolicy};

// Re-export service clients
pub use services::{CachingApiV1, FirewallAccessRulesV1, WafRulesApiV1};
