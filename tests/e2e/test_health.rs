use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ok_for_health_check(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();

    response.assert_status(StatusCode::OK);

    // Health endpoint returns plain text
    let body = String::from_utf8(response.body_bytes.clone()).unwrap();
    assert_eq!(body, "OK");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_ready_with_loaded_voices(ctx: &TestContext) {
    let response = ctx.client.get("/health/ready").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["model_ready"], true);
    assert_eq!(body["voices_loaded"]["female"], true);
    assert_eq!(body["voices_loaded"]["male"], false);
    assert_eq!(body["active_requests"], 0);
    assert_eq!(body["max_workers"], 2);
    assert_eq!(body["supported_languages"].as_array().unwrap().len(), 23);
    assert!(body.get("checked_at").is_some());
}

#[tokio::test]
async fn it_should_report_initializing_until_model_is_installed() {
    let ctx = TestContext::initializing().await;

    let response = ctx.client.get("/health/ready").await.unwrap();

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["status"], "initializing");
    assert_eq!(body["model_ready"], false);

    // Liveness stays green while the model loads
    ctx.client
        .get("/health")
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_supported_languages(ctx: &TestContext) {
    let response = ctx.client.get("/languages").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_eq!(body["count"], 23);
    assert_eq!(body["languages"]["en"], "English");
    assert_eq!(body["languages"]["ja"], "Japanese");
    assert!(body["languages"].get("xx").is_none());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_include_request_id_in_responses(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();
    response.assert_header_exists("x-request-id");

    let response = ctx.client.get("/languages").await.unwrap();
    response.assert_header_exists("x-request-id");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_prepare_configured_voices_on_startup(ctx: &TestContext) {
    let prepared = ctx.model.prepared.lock().clone();

    // The missing male profile is skipped, not prepared
    assert_eq!(prepared.len(), 1);
    assert!(prepared[0].contains("female-"));
}
