//! Headers the SDK adds to every request.

use std::collections::HashMap;

/// SDK name used in the `User-Agent` header.
pub const SDK_NAME: &str = "cis-networking-sdk-rust";

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the analytics header.
pub const ANALYTICS_HEADER: &str = "x-ibmcloud-sdk-analytics";

/// Builds the `User-Agent` value, with an optional caller prefix.
///
/// ```rust
/// use cis_networking::core::sdk_headers::user_agent;
///
/// assert!(user_agent(None).starts_with("cis-networking-sdk-rust/"));
/// assert!(user_agent(Some("my-tool/2.0")).starts_with("my-tool/2.0 | cis-networking-sdk-rust/"));
/// ```
#[must_use]
pub fn user_agent(prefix: Option<&str>) -> String {
    let base = format!(
        "{SDK_NAME}/{SDK_VERSION} (arch={}; os={})",
        std::env::consts::ARCH,
        std::env::consts::OS
    );
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix} | {base}"),
        _ => base,
    }
}

/// Returns the per-operation SDK headers.
#[must_use]
pub fn sdk_headers(
    service_name: &str,
    service_version: &str,
    operation_id: &str,
) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert(
        ANALYTICS_HEADER.to_string(),
        format!("service_name={service_name};service_version={service_version};operation_id={operation_id}"),
    );
    headers
}
