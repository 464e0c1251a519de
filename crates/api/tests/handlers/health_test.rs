use serde_json::json;

use crate::test_utils::TestContext;

#[tokio::test]
async fn test_root() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "message": "Mentorunden API" }));
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/health")
        .await
        .assert_json(&json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_version() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/version")
        .await
        .assert_json(&json!({ "version": env!("CARGO_PKG_VERSION") }));
}
