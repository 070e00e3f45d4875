//! Fetch behaviour of `ReqwestHttp` against a stubbed feed server.

use chrono::NaiveDate;
use congress_roster::app::ports::HttpClientPort;
use congress_roster::config::HttpConfig;
use congress_roster::error::RosterError;
use congress_roster::infra::http_client::ReqwestHttp;
use congress_roster::pipeline::{FeedSource, Pipeline, RunPlan};
use std::path::Path;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry_config() -> HttpConfig {
    HttpConfig {
        timeout_seconds: 5,
        max_attempts: 3,
        retry_delay_ms: 1,
        ..HttpConfig::default()
    }
}

fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name),
    )
    .unwrap()
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/MemberData.xml"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/MemberData.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/xml")
                .insert_header("etag", "\"abc123\"")
                .set_body_bytes(b"<MemberData/>".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ReqwestHttp::new(fast_retry_config()).unwrap();
    let result = client
        .get(&format!("{}/MemberData.xml", server.uri()))
        .await
        .expect("second attempt should succeed");

    assert_eq!(result.status, 200);
    assert_eq!(result.bytes, b"<MemberData/>");
    assert_eq!(result.content_type, "text/xml");
    assert_eq!(result.etag.as_deref(), Some("\"abc123\""));
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReqwestHttp::new(fast_retry_config()).unwrap();
    let result = client.get(&format!("{}/missing.xml", server.uri())).await;

    assert!(matches!(result, Err(RosterError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = ReqwestHttp::new(fast_retry_config()).unwrap();
    let result = client.get(&format!("{}/senators.xml", server.uri())).await;

    assert!(matches!(result, Err(RosterError::Status { status: 500, .. })));
}

#[tokio::test]
async fn test_pipeline_fetches_both_feeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/MemberData.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(fixture("house_member_data.xml")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/senators_cfm.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(fixture("senate_member_data.xml")))
        .mount(&server)
        .await;

    let plan = RunPlan {
        house: Some(FeedSource::Remote(format!("{}/MemberData.xml", server.uri()))),
        senate: Some(FeedSource::Remote(format!("{}/senators_cfm.xml", server.uri()))),
    };
    let client = ReqwestHttp::new(fast_retry_config()).unwrap();
    let out = tempdir().unwrap();
    let retrieved_at = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();

    let results = Pipeline::run(&plan, &client, out.path(), retrieved_at)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].payload_bytes, fixture("house_member_data.xml").len());
    assert_eq!(results[0].source, format!("{}/MemberData.xml", server.uri()));
    assert!(out.path().join("house/house_members.csv").exists());
    assert!(out.path().join("senate/senators_com_assignments.csv").exists());
}
