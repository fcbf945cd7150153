//! Integration tests for the caching API client.
//!
//! These tests run every operation against a mock server and verify:
//! - Request method, path, headers and body
//! - Envelope and model decoding
//! - Validation happening before any request is sent
//! - Response-processing errors carrying the raw response

use chrono::Datelike;
use cis_networking::auth::NoAuthAuthenticator;
use cis_networking::core::ValidationError;
use cis_networking::services::caching_api_v1::{
    CacheLevel, GetBrowserCacheTtlOptions, GetCacheLevelOptions, GetDevelopmentModeOptions,
    GetQueryStringSortOptions, PurgeAllOptions, PurgeByCacheTagsOptions, PurgeByHostsOptions,
    PurgeByUrlsOptions, UpdateBrowserCacheTtlOptions, UpdateCacheLevelOptions,
    UpdateDevelopmentModeOptions, UpdateQueryStringSortOptions,
};
use cis_networking::services::OnOff;
use cis_networking::{
    CachingApiV1, ConfigError, Crn, ExternalConfig, OperationError, ServiceConfig, ZoneId,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SETTINGS_PATH: &str = "/v1/testString/zones/testString/settings";
const PURGE_PATH: &str = "/v1/testString/zones/testString/purge_cache";

fn client_for(url: &str) -> CachingApiV1 {
    let config = ServiceConfig::builder()
        .authenticator(NoAuthAuthenticator)
        .url(url)
        .build()
        .unwrap();
    CachingApiV1::new(
        &config,
        Crn::new("testString").unwrap(),
        ZoneId::new("testString").unwrap(),
    )
    .unwrap()
}

fn setting_body(id: &str, value: serde_json::Value) -> serde_json::Value {
    json!({
        "success": true,
        "errors": [["Errors"]],
        "messages": [["Messages"]],
        "result": {
            "id": id,
            "value": value,
            "editable": true,
            "modified_on": "2014-01-01T05:20:00.12345Z"
        }
    })
}

fn purge_body() -> serde_json::Value {
    json!({
        "success": true,
        "errors": [["Errors"]],
        "messages": [["Messages"]],
        "result": {"id": "purge_id"}
    })
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_constructor_rejects_bad_url() {
    let result = ServiceConfig::builder()
        .authenticator(NoAuthAuthenticator)
        .url("{BAD_URL_STRING")
        .build();
    assert!(matches!(result, Err(ConfigError::InvalidServiceUrl { .. })));
}

#[test]
fn test_constructor_from_external_config() {
    let external = ExternalConfig::from_pairs([
        ("CACHING_API_URL", "https://cachingapiv1/api"),
        ("CACHING_API_AUTH_TYPE", "noauth"),
    ]);
    let client = CachingApiV1::from_external(
        &external,
        Crn::new("testString").unwrap(),
        ZoneId::new("testString").unwrap(),
    )
    .unwrap();
    assert_eq!(client.service_url().unwrap(), "https://cachingapiv1/api");
}

#[test]
fn test_constructor_from_external_config_unknown_auth_type() {
    let external = ExternalConfig::from_pairs([
        ("CACHING_API_URL", "https://cachingapiv1/api"),
        ("CACHING_API_AUTH_TYPE", "someOtherAuth"),
    ]);
    let result = CachingApiV1::from_external(
        &external,
        Crn::new("testString").unwrap(),
        ZoneId::new("testString").unwrap(),
    );
    assert!(matches!(
        result,
        Err(ConfigError::UnsupportedAuthType { .. })
    ));
}

#[test]
fn test_constructor_from_empty_external_config_requires_authenticator() {
    let result = CachingApiV1::from_external(
        &ExternalConfig::default(),
        Crn::new("testString").unwrap(),
        ZoneId::new("testString").unwrap(),
    );
    assert!(matches!(
        result,
        Err(ConfigError::MissingRequiredField {
            field: "authenticator"
        })
    ));
}

// ============================================================================
// Settings
// ============================================================================

#[tokio::test]
async fn test_update_cache_level_sends_patch_to_setting_path() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{SETTINGS_PATH}/cache_level")))
        .and(body_json(json!({"value": "aggressive"})))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(setting_body("cache_level", json!("aggressive"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let options = UpdateCacheLevelOptions::new().value(CacheLevel::Aggressive);
    let (envelope, response) = client.update_cache_level(Some(&options)).await.unwrap();

    assert_eq!(response.status_code, 200);
    assert!(envelope.success);
    assert_eq!(envelope.errors, vec![vec!["Errors".to_string()]]);
    assert_eq!(envelope.result.id.as_deref(), Some("cache_level"));
    assert_eq!(envelope.result.value.as_deref(), Some("aggressive"));
    assert!(envelope.result_info.is_none());
}

#[tokio::test]
async fn test_get_browser_cache_ttl_decodes_numeric_value() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{SETTINGS_PATH}/browser_cache_ttl")))
        .and(header("accept", "application/json"))
        .and(header(
            "x-ibmcloud-sdk-analytics",
            "service_name=caching_api;service_version=V1;operation_id=GetBrowserCacheTtl",
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(setting_body("browser_cache_ttl", json!(14400))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let (envelope, _) = client
        .get_browser_cache_ttl(Some(&GetBrowserCacheTtlOptions::new()))
        .await
        .unwrap();

    assert_eq!(envelope.result.value, Some(14400));
    assert_eq!(envelope.result.editable, Some(true));
    let modified_on = envelope.result.modified_on.unwrap();
    assert_eq!(modified_on.year(), 2014);
    assert_eq!(modified_on.timestamp_subsec_micros(), 123_450);
}

#[tokio::test]
async fn test_update_browser_cache_ttl_sends_integer() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{SETTINGS_PATH}/browser_cache_ttl")))
        .and(body_json(json!({"value": 14400})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(setting_body("browser_cache_ttl", json!(14400))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let options = UpdateBrowserCacheTtlOptions::new().value(14400);
    let (envelope, _) = client.update_browser_cache_ttl(Some(&options)).await.unwrap();
    assert_eq!(envelope.result.value, Some(14400));
}

#[tokio::test]
async fn test_development_mode_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{SETTINGS_PATH}/development_mode")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(setting_body("development_mode", json!("off"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{SETTINGS_PATH}/development_mode")))
        .and(body_json(json!({"value": "on"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(setting_body("development_mode", json!("on"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let (current, _) = client
        .get_development_mode(Some(&GetDevelopmentModeOptions::new()))
        .await
        .unwrap();
    assert_eq!(current.result.value.as_deref(), Some("off"));

    let options = UpdateDevelopmentModeOptions::new().value(OnOff::On);
    let (updated, _) = client.update_development_mode(Some(&options)).await.unwrap();
    assert_eq!(updated.result.value.as_deref(), Some("on"));
}

#[tokio::test]
async fn test_query_string_sort_uses_sort_setting_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{SETTINGS_PATH}/sort_query_string_for_cache")))
        .respond_with(ResponseTemplate::new(200).set_body_json(setting_body(
            "sort_query_string_for_cache",
            json!("on"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{SETTINGS_PATH}/sort_query_string_for_cache")))
        .and(body_json(json!({"value": "off"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(setting_body(
            "sort_query_string_for_cache",
            json!("off"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    client
        .get_query_string_sort(Some(&GetQueryStringSortOptions::new()))
        .await
        .unwrap();
    let options = UpdateQueryStringSortOptions::new().value(OnOff::Off);
    let (envelope, _) = client.update_query_string_sort(Some(&options)).await.unwrap();
    assert_eq!(envelope.result.value.as_deref(), Some("off"));
}

#[tokio::test]
async fn test_update_without_value_sends_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{SETTINGS_PATH}/cache_level")))
        .and(body_json(json!({})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(setting_body("cache_level", json!("basic"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    client
        .update_cache_level(Some(&UpdateCacheLevelOptions::new()))
        .await
        .unwrap();
}

// ============================================================================
// Purge
// ============================================================================

#[tokio::test]
async fn test_purge_all_sends_put_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("{PURGE_PATH}/purge_all")))
        .respond_with(ResponseTemplate::new(200).set_body_json(purge_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let (envelope, _) = client.purge_all(Some(&PurgeAllOptions::new())).await.unwrap();
    assert_eq!(envelope.result.id.as_deref(), Some("purge_id"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_purge_lists_use_their_field_names() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("{PURGE_PATH}/purge_by_urls")))
        .and(body_json(json!({"files": ["http://www.example.com/cat_picture.jpg"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(purge_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{PURGE_PATH}/purge_by_cache_tags")))
        .and(body_json(json!({"tags": ["some-tag", "another-tag"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(purge_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{PURGE_PATH}/purge_by_hosts")))
        .and(body_json(json!({"hosts": ["www.example.com", "images.example.com"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(purge_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    client
        .purge_by_urls(Some(
            &PurgeByUrlsOptions::new().items(["http://www.example.com/cat_picture.jpg"]),
        ))
        .await
        .unwrap();
    client
        .purge_by_cache_tags(Some(
            &PurgeByCacheTagsOptions::new().items(["some-tag", "another-tag"]),
        ))
        .await
        .unwrap();
    let (envelope, _) = client
        .purge_by_hosts(Some(
            &PurgeByHostsOptions::new().items(["www.example.com", "images.example.com"]),
        ))
        .await
        .unwrap();
    assert_eq!(envelope.result.id.as_deref(), Some("purge_id"));
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_invalid_json_is_decode_error_with_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{SETTINGS_PATH}/cache_level")))
        .respond_with(ResponseTemplate::new(200).set_body_string("} this is not valid json {"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let error = client
        .get_cache_level(Some(&GetCacheLevelOptions::new()))
        .await
        .unwrap_err();

    assert!(matches!(error, OperationError::Decode { .. }));
    assert!(error.is_response_error());
    let response = error.response().unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body_text(), "} this is not valid json {");
}

#[tokio::test]
async fn test_nil_options_is_validation_error_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let error = client.update_cache_level(None).await.unwrap_err();

    assert!(matches!(
        error,
        OperationError::Validation(ValidationError::NilOptions {
            name: "UpdateCacheLevelOptions"
        })
    ));
    assert!(error.is_request_error());
    assert_eq!(error.to_string(), "UpdateCacheLevelOptions cannot be nil");
}

#[tokio::test]
async fn test_cleared_service_url_fails_without_connecting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = client_for(&server.uri());
    client.set_service_url("").unwrap();
    let error = client
        .get_cache_level(Some(&GetCacheLevelOptions::new()))
        .await
        .unwrap_err();

    assert!(matches!(error, OperationError::ServiceUrlMissing));
    assert!(error.to_string().contains("The service URL is required"));
}

#[tokio::test]
async fn test_error_status_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{SETTINGS_PATH}/cache_level")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "errors": [{"code": 10000, "message": "Authentication error"}],
            "messages": [],
            "result": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let error = client
        .get_cache_level(Some(&GetCacheLevelOptions::new()))
        .await
        .unwrap_err();

    match error {
        OperationError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Authentication error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
