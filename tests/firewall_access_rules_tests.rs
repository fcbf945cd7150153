//! Integration tests for the firewall access rules client.
//!
//! Tests cover:
//! - Exact query rendering for list filters, with unset filters omitted
//! - Pagination information on list results
//! - Nested scope and configuration models
//! - Required identifiers checked before any request is sent
//! - Authorization and caller headers on the wire
//! - Authenticator failures surfacing before any request is sent

use cis_networking::auth::{
    AuthError, BasicAuthenticator, BearerTokenAuthenticator, BoxFuture, IamAuthenticator,
    NoAuthAuthenticator, TokenSource,
};
use cis_networking::core::{InvalidRequestError, ValidationError};
use cis_networking::services::firewall_access_rules_v1::{
    AccessRuleMode, AccessRuleOrder, AccountAccessRuleInputConfiguration, ConfigurationTarget,
    CreateAccountAccessRuleOptions, DeleteAccountAccessRuleOptions, GetAccountAccessRuleOptions,
    ListAllAccountAccessRulesOptions, UpdateAccountAccessRuleOptions,
};
use cis_networking::services::{MatchMode, SortDirection};
use cis_networking::{Crn, FirewallAccessRulesV1, OperationError, ServiceConfig};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RULES_PATH: &str = "/v1/testString/firewall/access_rules/rules";

fn client_with(config: &ServiceConfig) -> FirewallAccessRulesV1 {
    FirewallAccessRulesV1::new(config, Crn::new("testString").unwrap()).unwrap()
}

fn client_for(url: &str) -> FirewallAccessRulesV1 {
    let config = ServiceConfig::builder()
        .authenticator(NoAuthAuthenticator)
        .url(url)
        .build()
        .unwrap();
    client_with(&config)
}

fn rule_json() -> serde_json::Value {
    json!({
        "id": "92f17202ed8bd63d69a66b86a49a8f6b",
        "notes": "This rule is set because of an event that occurred and caused X.",
        "allowed_modes": ["block", "challenge", "js_challenge", "whitelist"],
        "mode": "block",
        "scope": {"type": "account"},
        "created_on": "2019-01-01T12:00:00.000Z",
        "modified_on": "2019-01-01T12:00:00.000Z",
        "configuration": {"target": "ip", "value": "ip example 198.51.100.4"}
    })
}

fn single_body() -> serde_json::Value {
    json!({
        "success": true,
        "errors": [["Errors"]],
        "messages": [["Messages"]],
        "result": rule_json()
    })
}

#[tokio::test]
async fn test_list_renders_exact_query_and_omits_unset_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RULES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [["Errors"]],
            "messages": [["Messages"]],
            "result": [rule_json()],
            "result_info": {"page": 1, "per_page": 2, "count": 1, "total_count": 200}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let options = ListAllAccountAccessRulesOptions::new()
        .page(38)
        .per_page(5)
        .order(AccessRuleOrder::Target)
        .direction(SortDirection::Asc)
        .match_mode(MatchMode::Any);
    let (envelope, _) = client
        .list_all_account_access_rules(Some(&options))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].url.query(),
        Some("page=38&per_page=5&order=target&direction=asc&match=any")
    );

    assert_eq!(envelope.result.len(), 1);
    let info = envelope.result_info.unwrap();
    assert_eq!(info.total_count, Some(200));
    assert!(info.has_next_page());
    assert_eq!(info.next_page(), Some(2));
}

#[tokio::test]
async fn test_list_renders_configuration_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RULES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let options = ListAllAccountAccessRulesOptions::new()
        .notes("testString")
        .mode(AccessRuleMode::JsChallenge)
        .configuration_target(ConfigurationTarget::IpRange)
        .configuration_value("10.0.0.0/24");
    let (envelope, _) = client
        .list_all_account_access_rules(Some(&options))
        .await
        .unwrap();
    assert!(envelope.result.is_empty());

    let requests = server.received_requests().await.unwrap();
    let pairs: Vec<(String, String)> = requests[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("notes".to_string(), "testString".to_string()),
            ("mode".to_string(), "js_challenge".to_string()),
            ("configuration.target".to_string(), "ip_range".to_string()),
            ("configuration.value".to_string(), "10.0.0.0/24".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_create_posts_nested_configuration_and_decodes_rule() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RULES_PATH))
        .and(body_json(json!({
            "mode": "block",
            "notes": "This rule is added because of event X that occurred on date xyz",
            "configuration": {"target": "ip", "value": "ip example 198.51.100.4"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let options = CreateAccountAccessRuleOptions::new()
        .mode(AccessRuleMode::Block)
        .notes("This rule is added because of event X that occurred on date xyz")
        .configuration(AccountAccessRuleInputConfiguration::new(
            ConfigurationTarget::Ip,
            "ip example 198.51.100.4",
        ));
    let (envelope, _) = client
        .create_account_access_rule(Some(&options))
        .await
        .unwrap();

    let rule = envelope.result;
    assert_eq!(rule.id.as_deref(), Some("92f17202ed8bd63d69a66b86a49a8f6b"));
    assert_eq!(rule.scope.unwrap().scope_type.as_deref(), Some("account"));
    let configuration = rule.configuration.unwrap();
    assert_eq!(configuration.target.as_deref(), Some("ip"));
    assert_eq!(configuration.value.as_deref(), Some("ip example 198.51.100.4"));
    assert!(rule.created_on.is_some());
}

#[tokio::test]
async fn test_get_update_delete_address_rule_by_identifier() {
    let server = MockServer::start().await;
    let rule_path = format!("{RULES_PATH}/testString");
    Mock::given(method("GET"))
        .and(path(rule_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(rule_path.as_str()))
        .and(body_json(json!({"mode": "challenge", "notes": "testString"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(rule_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [["Errors"]],
            "messages": [["Messages"]],
            "result": {"id": "f1aba936b94213e5b8dca0c0dbf1f9cc"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    client
        .get_account_access_rule(Some(&GetAccountAccessRuleOptions::new("testString")))
        .await
        .unwrap();
    client
        .update_account_access_rule(Some(
            &UpdateAccountAccessRuleOptions::new("testString")
                .mode(AccessRuleMode::Challenge)
                .notes("testString"),
        ))
        .await
        .unwrap();
    let (deleted, _) = client
        .delete_account_access_rule(Some(&DeleteAccountAccessRuleOptions::new("testString")))
        .await
        .unwrap();
    assert_eq!(
        deleted.result.id.as_deref(),
        Some("f1aba936b94213e5b8dca0c0dbf1f9cc")
    );
}

#[tokio::test]
async fn test_identifier_is_percent_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    client
        .get_account_access_rule(Some(&GetAccountAccessRuleOptions::new("a/b")))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.path(), format!("{RULES_PATH}/a%2Fb"));
}

#[tokio::test]
async fn test_dot_segment_identifier_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_body()))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    for identifier in ["..", "."] {
        let error = client
            .delete_account_access_rule(Some(&DeleteAccountAccessRuleOptions::new(identifier)))
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            OperationError::InvalidRequest(InvalidRequestError::DotSegmentPathParameter {
                name: "accessrule_identifier"
            })
        ));
        assert!(error.is_request_error());
    }
}

#[tokio::test]
async fn test_missing_identifier_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let error = client
        .get_account_access_rule(Some(&GetAccountAccessRuleOptions::default()))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        OperationError::Validation(ValidationError::MissingRequiredField {
            field: "accessrule_identifier",
            ..
        })
    ));
}

#[tokio::test]
async fn test_nil_options_checked_before_required_fields() {
    let client = client_for("https://api.cis.cloud.ibm.com");
    let error = client.delete_account_access_rule(None).await.unwrap_err();
    assert!(matches!(
        error,
        OperationError::Validation(ValidationError::NilOptions { .. })
    ));
}

#[tokio::test]
async fn test_partial_configuration_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let options = CreateAccountAccessRuleOptions::new().configuration(
        AccountAccessRuleInputConfiguration {
            target: None,
            value: Some("198.51.100.4".to_string()),
        },
    );
    let error = client
        .create_account_access_rule(Some(&options))
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        OperationError::Validation(ValidationError::MissingRequiredField {
            options: "AccountAccessRuleInputConfiguration",
            field: "target",
        })
    ));
}

#[tokio::test]
async fn test_bearer_token_and_caller_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{RULES_PATH}/testString")))
        .and(header("authorization", "Bearer abc123"))
        .and(header("x-correlation-id", "req-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_body()))
        .expect(1)
        .mount(&server)
        .await;

    let config = ServiceConfig::builder()
        .authenticator(BearerTokenAuthenticator::new("abc123"))
        .url(server.uri())
        .build()
        .unwrap();
    let client = client_with(&config);
    let options = GetAccountAccessRuleOptions::new("testString").header("X-Correlation-Id", "req-42");
    client.get_account_access_rule(Some(&options)).await.unwrap();
}

#[tokio::test]
async fn test_basic_credentials_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_body()))
        .expect(1)
        .mount(&server)
        .await;

    let config = ServiceConfig::builder()
        .authenticator(BasicAuthenticator::new("user", "pass"))
        .url(server.uri())
        .build()
        .unwrap();
    client_with(&config)
        .get_account_access_rule(Some(&GetAccountAccessRuleOptions::new("testString")))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_repeated_calls_send_identical_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RULES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_body()))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let options = CreateAccountAccessRuleOptions::new()
        .mode(AccessRuleMode::Whitelist)
        .configuration(AccountAccessRuleInputConfiguration::new(
            ConfigurationTarget::Country,
            "US",
        ));
    client.create_account_access_rule(Some(&options)).await.unwrap();
    client.create_account_access_rule(Some(&options)).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, requests[1].method);
    assert_eq!(requests[0].url, requests[1].url);
    assert_eq!(requests[0].body, requests[1].body);
}

#[tokio::test]
async fn test_list_with_object_result_is_shape_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RULES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let error = client
        .list_all_account_access_rules(Some(&ListAllAccountAccessRulesOptions::new()))
        .await
        .unwrap_err();

    assert!(matches!(error, OperationError::Decode { .. }));
    assert_eq!(error.status(), Some(200));
}

struct UnreachableIam;

impl TokenSource for UnreachableIam {
    fn token(&self) -> BoxFuture<'_, Result<String, AuthError>> {
        Box::pin(async {
            Err(AuthError::TokenUnavailable {
                reason: "iam endpoint unreachable".to_string(),
            })
        })
    }
}

#[tokio::test]
async fn test_authenticator_failure_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_body()))
        .expect(0)
        .mount(&server)
        .await;

    let config = ServiceConfig::builder()
        .authenticator(IamAuthenticator::new(UnreachableIam))
        .url(server.uri())
        .build()
        .unwrap();
    let client = client_with(&config);
    let error = client
        .get_account_access_rule(Some(&GetAccountAccessRuleOptions::new("testString")))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        OperationError::Authentication(AuthError::TokenUnavailable { .. })
    ));
    assert!(error.is_request_error());
    assert!(error.response().is_none());
}
