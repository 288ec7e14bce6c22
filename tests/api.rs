//! End-to-end tests of the JSON API.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};

use weekly_report::http::X_REQUEST_ID;
use weekly_report::llm::client::TIMEOUT_MESSAGE;

mod common;

const REPORT_HTML: &str = "<div class=\"report-container\"><h1>测试餐厅 周报</h1></div>";

#[tokio::test]
async fn test_health_and_headers() {
    let upstream = common::start_report_upstream(REPORT_HTML).await;
    let server = common::start_server(common::test_config(&upstream.url())).await;

    let res = common::http_client()
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key(X_REQUEST_ID));
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_generate_report_request_errors() {
    let upstream = common::start_report_upstream(REPORT_HTML).await;
    let server = common::start_server(common::test_config(&upstream.url())).await;
    let client = common::http_client();

    let res = client
        .post(server.url("/api/generate-report"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "success": false, "error": "缺少必要参数" }));

    let res = client
        .post(server.url("/api/generate-report"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("服务器内部错误: "));

    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_generate_report_validation_and_warnings() {
    let upstream = common::start_report_upstream(REPORT_HTML).await;
    let server = common::start_server(common::test_config(&upstream.url())).await;
    let client = common::http_client();

    let mut invalid = common::report_data();
    invalid["shopInfo"]["shopName"] = json!("");
    let res = client
        .post(server.url("/api/generate-report"))
        .json(&json!({ "reportData": invalid }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errors"][0]["path"], "shopInfo.shopName");
    assert_eq!(body["errors"][0]["message"], "店铺名称不能为空");

    let mut suspicious = common::report_data();
    suspicious["operationData"] = common::suspicious_operation_data();
    let res = client
        .post(server.url("/api/generate-report"))
        .json(&json!({ "reportData": suspicious }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    let warnings = body["warnings"].as_array().unwrap();
    assert!(warnings
        .iter()
        .any(|w| w == "本周入店人数不应超过曝光人数"));
    assert_eq!(upstream.calls(), 0);

    let res = client
        .post(server.url("/api/generate-report"))
        .json(&json!({ "reportData": suspicious, "acknowledgeWarnings": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], REPORT_HTML);
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_generate_report_failure_is_in_band() {
    let upstream =
        common::start_programmable_upstream(|_| async { (500, "boom".to_string()) }).await;
    let mut config = common::test_config(&upstream.url());
    config.retries.max_attempts = 1;
    let server = common::start_server(config).await;

    let res = common::http_client()
        .post(server.url("/api/generate-report"))
        .json(&json!({ "reportData": common::report_data() }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "API请求失败 (尝试 1/1): API请求失败 (500): Internal Server Error. 详情: boom"
    );
}

#[tokio::test]
async fn test_validate_and_derive() {
    let upstream = common::start_report_upstream(REPORT_HTML).await;
    let server = common::start_server(common::test_config(&upstream.url())).await;
    let client = common::http_client();

    let mut shop = common::shop_info();
    shop["businessHours"] = json!("早上6点到下午3点");
    let res = client
        .post(server.url("/api/validate"))
        .json(&json!({ "shopInfo": shop, "operationData": common::suspicious_operation_data() }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["valid"], false);
    assert_eq!(body["errors"][0]["path"], "shopInfo.businessHours");
    assert!(!body["warnings"].as_array().unwrap().is_empty());

    let res = client
        .post(server.url("/api/derive-last-week"))
        .json(&json!({
            "thisWeek": common::operation_data()["thisWeek"],
            "growth": { "exposureCount": 200, "visitCount": 30, "orderCount": 50 },
            "lastWeek": { "repurchaseRate": 12 }
        }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["lastWeek"]["exposureCount"], 800.0);
    assert_eq!(body["lastWeek"]["visitCount"], 120.0);
    assert_eq!(body["lastWeek"]["orderCount"], 0.0);
    assert_eq!(body["lastWeek"]["repurchaseRate"], 12.0);
}

#[tokio::test]
async fn test_session_flow() {
    let upstream = common::start_report_upstream(REPORT_HTML).await;
    let server = common::start_server(common::test_config(&upstream.url())).await;
    let client = common::http_client();

    let res = client.post(server.url("/api/sessions")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let session: Value = res.json().await.unwrap();
    assert_eq!(session["step"], "shopInfo");
    assert_eq!(session["stepIndex"], 0);
    let id = session["id"].as_str().unwrap().to_string();

    let res = client
        .post(server.url(&format!("/api/sessions/{}/data", id)))
        .json(&json!({ "operationData": common::operation_data() }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .post(server.url(&format!("/api/sessions/{}/shop-info", id)))
        .json(&common::shop_info())
        .send()
        .await
        .unwrap();
    let session: Value = res.json().await.unwrap();
    assert_eq!(session["step"], "dataInput");
    assert_eq!(session["stepIndex"], 1);

    let res = client
        .post(server.url(&format!("/api/sessions/{}/data", id)))
        .json(&json!({ "operationData": common::operation_data() }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let session: Value = res.json().await.unwrap();
    assert_eq!(session["step"], "report");
    assert_eq!(session["stepIndex"], 2);
    assert_eq!(session["reportHtml"], REPORT_HTML);

    let res = client
        .get(server.url(&format!("/api/sessions/{}/download", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let disposition = res.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename*=UTF-8''"));
    assert!(disposition.contains("_%E5%91%A8%E6%8A%A5_"));
    let document = res.text().await.unwrap();
    assert!(document.starts_with("<!DOCTYPE html>"));
    assert!(document.contains(REPORT_HTML));

    let res = client
        .get(server.url(&format!("/api/sessions/{}/print", id)))
        .send()
        .await
        .unwrap();
    assert!(res.text().await.unwrap().contains("window.print()"));

    let res = client
        .post(server.url(&format!("/api/sessions/{}/back", id)))
        .send()
        .await
        .unwrap();
    let session: Value = res.json().await.unwrap();
    assert_eq!(session["step"], "dataInput");

    let res = client
        .post(server.url(&format!("/api/sessions/{}/restart", id)))
        .send()
        .await
        .unwrap();
    let session: Value = res.json().await.unwrap();
    assert_eq!(session["step"], "shopInfo");
    assert!(session["shopInfo"].is_null());
    assert_eq!(session["id"], id.as_str());
}

#[tokio::test]
async fn test_session_generation_failure_returns_to_data_input() {
    let upstream =
        common::start_programmable_upstream(|_| async { (503, "down".to_string()) }).await;
    let mut config = common::test_config(&upstream.url());
    config.retries.max_attempts = 1;
    let server = common::start_server(config).await;
    let client = common::http_client();

    let session: Value = client
        .post(server.url("/api/sessions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = session["id"].as_str().unwrap().to_string();

    client
        .post(server.url(&format!("/api/sessions/{}/shop-info", id)))
        .json(&common::shop_info())
        .send()
        .await
        .unwrap();

    let res = client
        .post(server.url(&format!("/api/sessions/{}/data", id)))
        .json(&json!({ "operationData": common::operation_data() }))
        .send()
        .await
        .unwrap();
    let session: Value = res.json().await.unwrap();
    assert_eq!(session["step"], "dataInput");
    assert!(session["lastError"].as_str().unwrap().contains("503"));

    let res = client
        .get(server.url(&format!("/api/sessions/{}/download", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .get(server.url("/api/sessions/not-a-uuid"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_leaves_generating_after_request_timeout() {
    let upstream = common::start_programmable_upstream(|_| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        (200, common::chat_completion(REPORT_HTML))
    })
    .await;
    let mut config = common::test_config(&upstream.url());
    config.retries.max_attempts = 1;
    config.timeouts.upstream_request_secs = 2;
    config.timeouts.server_request_secs = 1;
    let server = common::start_server(config).await;
    let client = common::http_client();

    let session: Value = client
        .post(server.url("/api/sessions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = session["id"].as_str().unwrap().to_string();
    client
        .post(server.url(&format!("/api/sessions/{}/shop-info", id)))
        .json(&common::shop_info())
        .send()
        .await
        .unwrap();

    let res = client
        .post(server.url(&format!("/api/sessions/{}/data", id)))
        .json(&json!({ "operationData": common::operation_data() }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);

    let mut session = Value::Null;
    for _ in 0..50 {
        session = client
            .get(server.url(&format!("/api/sessions/{}", id)))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if session["step"] != "generating" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(session["step"], "dataInput");
    assert_eq!(session["lastError"], TIMEOUT_MESSAGE);

    let res = client
        .post(server.url(&format!("/api/sessions/{}/restart", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_drafts_round_trip() {
    let upstream = common::start_report_upstream(REPORT_HTML).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drafts.json");

    let mut config = common::test_config(&upstream.url());
    config.drafts.persistence_path = Some(path.to_string_lossy().into_owned());
    let server = common::start_server(config).await;
    let client = common::http_client();

    let res = client
        .put(server.url("/api/drafts/reportForm_shopInfo"))
        .json(&common::shop_info())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    client
        .put(server.url("/api/drafts/reportForm_currentStep"))
        .json(&json!("data"))
        .send()
        .await
        .unwrap();
    client
        .put(server.url("/api/drafts/unrelated"))
        .json(&json!(1))
        .send()
        .await
        .unwrap();

    let body: Value = client
        .get(server.url("/api/drafts/reportForm_shopInfo"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["value"]["shopName"], "测试餐厅");

    let body: Value = client
        .get(server.url("/api/drafts?prefix=reportForm_"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body["keys"],
        json!(["reportForm_currentStep", "reportForm_shopInfo"])
    );

    let persisted: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(persisted["reportForm_currentStep"], "data");

    let res = client
        .delete(server.url("/api/drafts/reportForm_currentStep"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(server.url("/api/drafts/reportForm_currentStep"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_draft_store_rejects_new_keys_when_full() {
    let upstream = common::start_report_upstream(REPORT_HTML).await;
    let mut config = common::test_config(&upstream.url());
    config.drafts.max_entries = 1;
    let server = common::start_server(config).await;
    let client = common::http_client();

    let res = client
        .put(server.url("/api/drafts/reportForm_shopInfo"))
        .json(&common::shop_info())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(server.url("/api/drafts/reportForm_currentStep"))
        .json(&json!("data"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INSUFFICIENT_STORAGE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);

    let res = client
        .put(server.url("/api/drafts/reportForm_shopInfo"))
        .json(&json!({ "shopName": "新名称" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
