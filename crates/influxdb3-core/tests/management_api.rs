//! Integration tests for the management API client using a mock server

use influxdb3_core::{
    Action, ClientConfig, CreateDatabaseParams, CoreError, InfluxDbClient, PartitionTemplatePart,
    Permission, RetryConfig, TokenParams, UpdateDatabaseParams,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCOUNT: &str = "0b1f6a1e-2c3d-4e5f-8a9b-0c1d2e3f4a5b";
const CLUSTER: &str = "9f8e7d6c-5b4a-4392-8170-6f5e4d3c2b1a";
const TOKEN_ID: &str = "4a5e3c2b-1d0f-4e9a-8b7c-6d5e4f3a2b1c";

fn base() -> String {
    format!("/api/v0/accounts/{ACCOUNT}/clusters/{CLUSTER}")
}

fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        enabled: true,
        max_retries,
        min_wait_ms: 1,
        max_wait_ms: 2,
    }
}

fn client_for(server: &MockServer, retry: RetryConfig) -> InfluxDbClient {
    let config = ClientConfig::new(
        Uuid::parse_str(ACCOUNT).unwrap(),
        Uuid::parse_str(CLUSTER).unwrap(),
        "test-token",
    )
    .with_host(server.uri())
    .with_retry(retry);
    InfluxDbClient::new(config).unwrap()
}

fn database_json(name: &str) -> Value {
    json!({
        "accountId": ACCOUNT,
        "clusterId": CLUSTER,
        "name": name,
        "maxTables": 500,
        "maxColumnsPerTable": 200,
        "retentionPeriod": 0,
        "partitionTemplate": [
            {"type": "tag", "value": "region"},
            {"type": "bucket", "value": {"tagName": "host", "numberOfBuckets": 8}}
        ]
    })
}

fn token_json(with_secret: bool) -> Value {
    let mut token = json!({
        "id": TOKEN_ID,
        "accountId": ACCOUNT,
        "clusterId": CLUSTER,
        "createdAt": "2024-05-01T12:30:00Z",
        "description": "ci writer",
        "permissions": [
            {"action": "write", "resource": "metrics"},
            {"action": "read", "resource": "*"}
        ]
    });
    if with_secret {
        token["accessToken"] = json!("apiv1_secret");
    }
    token
}

// ============================================================================
// Request shape
// ============================================================================

#[tokio::test]
async fn test_requests_carry_auth_and_json_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/databases", base())))
        .and(header("authorization", "Bearer test-token"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let databases = client.databases().list().await.unwrap();
    assert!(databases.is_empty());
}

#[tokio::test]
async fn test_non_200_is_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/tokens", base())))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let err = client.tokens().list().await.unwrap_err();
    assert_eq!(err.to_string(), "unexpected status code: 403");
    assert!(err.is_unauthorized());
    assert_eq!(err.body(), Some("forbidden"));
}

#[tokio::test]
async fn test_invalid_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/databases", base())))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let err = client.databases().list().await.unwrap_err();
    assert!(matches!(err, CoreError::Decode(_)));
    assert!(err.to_string().starts_with("error unmarshalling JSON"));
}

// ============================================================================
// Retries
// ============================================================================

#[tokio::test]
async fn test_server_error_retried_until_budget_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/databases", base())))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, fast_retry(2));
    let err = client.databases().list().await.unwrap_err();
    assert_eq!(err.to_string(), "unexpected status code: 503");
}

#[tokio::test]
async fn test_rate_limit_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/tokens", base())))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/tokens", base())))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([token_json(false)])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, fast_retry(3));
    let tokens = client.tokens().list().await.unwrap();
    assert_eq!(tokens.len(), 1);
}

#[tokio::test]
async fn test_client_errors_and_501_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/databases/metrics", base())))
        .respond_with(ResponseTemplate::new(501))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/tokens/{TOKEN_ID}", base())))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, fast_retry(3));
    let err = client
        .databases()
        .update("metrics", &UpdateDatabaseParams::new().with_max_tables(10))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(501));

    let err = client.tokens().get_by_id(TOKEN_ID).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
}

// ============================================================================
// Databases
// ============================================================================

#[tokio::test]
async fn test_create_database() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/databases", base())))
        .and(body_json(json!({
            "name": "metrics",
            "maxTables": 500,
            "maxColumnsPerTable": 200,
            "retentionPeriod": 0,
            "partitionTemplate": [{"type": "tag", "value": "region"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(database_json("metrics")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let params = CreateDatabaseParams::new("metrics")
        .with_max_tables(500)
        .with_max_columns_per_table(200)
        .with_retention_period(0)
        .with_partition_part(PartitionTemplatePart::Tag("region".to_string()));

    let db = client.databases().create(&params).await.unwrap();
    assert_eq!(db.name, "metrics");
    assert_eq!(db.partition_template.len(), 2);
    assert_eq!(db.partition_template[1].kind(), "bucket");
}

#[tokio::test]
async fn test_create_database_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/databases", base())))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "bad name"})))
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let err = client
        .databases()
        .create(&CreateDatabaseParams::new("bad name"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "bad request, check your input");
    assert!(err.is_bad_request());
    assert!(err.body().unwrap().contains("bad name"));
}

#[tokio::test]
async fn test_get_database_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/databases", base())))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([database_json("logs"), database_json("metrics")])),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let db = client.databases().get_by_name("metrics").await.unwrap();
    assert_eq!(db.name, "metrics");
    assert_eq!(db.max_tables, 500);

    let err = client.databases().get_by_name("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "error getting database: missing not found");
}

#[tokio::test]
async fn test_null_list_bodies_are_empty() {
    let server = MockServer::start().await;
    for resource in ["databases", "tokens"] {
        Mock::given(method("GET"))
            .and(path(format!("{}/{resource}", base())))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;
    }

    let client = client_for(&server, RetryConfig::disabled());
    assert!(client.databases().list().await.unwrap().is_empty());
    assert!(client.tokens().list().await.unwrap().is_empty());

    let err = client.databases().get_by_name("metrics").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_update_database_encodes_name() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/databases/my%20db", base())))
        .and(body_json(json!({"retentionPeriod": 3_600_000_000_000_i64})))
        .respond_with(ResponseTemplate::new(200).set_body_json(database_json("my db")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let db = client
        .databases()
        .update(
            "my db",
            &UpdateDatabaseParams::new().with_retention_period(3_600_000_000_000),
        )
        .await
        .unwrap();
    assert_eq!(db.name, "my db");
}

#[tokio::test]
async fn test_delete_database_accepts_204_and_200() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/databases/metrics", base())))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/databases/logs", base())))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/databases/gone", base())))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    client.databases().delete("metrics").await.unwrap();
    client.databases().delete("logs").await.unwrap();

    let err = client.databases().delete("gone").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "error deleting database: unexpected status code: 404"
    );
}

// ============================================================================
// Tokens
// ============================================================================

#[tokio::test]
async fn test_create_token_round_trips_permissions() {
    let server = MockServer::start().await;
    let params = TokenParams::new("ci writer")
        .with_permission(Permission::new(Action::Write, "metrics"))
        .with_permission(Permission::new(Action::Read, "*"));

    Mock::given(method("POST"))
        .and(path(format!("{}/tokens", base())))
        .and(body_json(json!({
            "description": "ci writer",
            "permissions": [
                {"action": "write", "resource": "metrics"},
                {"action": "read", "resource": "*"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json(true)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let token = client.tokens().create(&params).await.unwrap();
    assert_eq!(token.permissions, params.permissions);
    assert_eq!(token.access_token, "apiv1_secret");
    assert!(token.created_at_time().is_some());
}

#[tokio::test]
async fn test_get_token_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/tokens/{TOKEN_ID}", base())))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let err = client.tokens().get_by_id(TOKEN_ID).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        err.to_string(),
        format!("error getting token: {TOKEN_ID} not found")
    );
}

#[tokio::test]
async fn test_update_token() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/tokens/{TOKEN_ID}", base())))
        .and(body_json(json!({
            "description": "reader",
            "permissions": [{"action": "read", "resource": "*"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json(false)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RetryConfig::disabled());
    let params = TokenParams::new("reader").with_permission(Permission::new(Action::Read, "*"));
    let token = client.tokens().update(TOKEN_ID, &params).await.unwrap();
    assert_eq!(token.id, TOKEN_ID);
    assert!(token.access_token.is_empty());
}

#[tokio::test]
async fn test_delete_missing_token_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/tokens/{TOKEN_ID}", base())))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server, fast_retry(3));
    let err = client.tokens().delete(TOKEN_ID).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().starts_with("error deleting token"));
}
