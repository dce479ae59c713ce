/// HTTP API tests
/// Drives the router in-process and checks status codes and JSON shapes
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqli_sentinel::server::{create_router, AppState};
use sqli_sentinel::{MemoryStorage, PayloadCatalog, ProbeEngine, ScanOrchestrator};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app() -> (Router, Arc<ScanOrchestrator>) {
    let engine = ProbeEngine::with_timeout(Duration::from_secs(5)).unwrap();
    let orchestrator = Arc::new(ScanOrchestrator::new(
        Arc::new(MemoryStorage::new()),
        engine,
        PayloadCatalog::builtin(),
    ));
    (create_router(AppState::new(orchestrator.clone())), orchestrator)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn create_and_fetch_target() {
    let (app, _) = app();

    let (status, target) = send(
        &app,
        "POST",
        "/api/scan-targets",
        Some(json!({ "url": "https://shop.test/items", "testParameters": "id=4" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(target["id"], 1);
    assert_eq!(target["url"], "https://shop.test/items");
    assert_eq!(target["testParameters"], "id=4");
    assert!(target["authToken"].is_null());

    let (status, fetched) = send(&app, "GET", "/api/scan-targets/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, target);

    let (status, all) = send(&app, "GET", "/api/scan-targets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (status, missing) = send(&app, "GET", "/api/scan-targets/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["error"], "NOT_FOUND");
}

#[tokio::test]
async fn target_validation_errors_are_400() {
    let (app, _) = app();

    let (status, body) = send(&app, "POST", "/api/scan-targets", Some(json!({ "url": "ftp://files.test" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");

    let (status, _) = send(&app, "POST", "/api/scan-targets", Some(json!({ "authToken": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn start_scan_errors() {
    let (app, _) = app();
    send(&app, "POST", "/api/scan-targets", Some(json!({ "url": "http://127.0.0.1:1/" }))).await;

    let base = json!({
        "targetId": 1,
        "injectionTypes": ["error-based"],
        "intensityLevel": "low",
        "requestDelay": 100
    });

    let mut unknown = base.clone();
    unknown["targetId"] = json!(99);
    let (status, body) = send(&app, "POST", "/api/scans/start", Some(unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let mut slow = base.clone();
    slow["requestDelay"] = json!(20_000);
    let (status, _) = send(&app, "POST", "/api/scans/start", Some(slow)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut empty = base.clone();
    empty["injectionTypes"] = json!([]);
    let (status, _) = send(&app, "POST", "/api/scans/start", Some(empty)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut extreme = base.clone();
    extreme["intensityLevel"] = json!("extreme");
    let (status, _) = send(&app, "POST", "/api/scans/start", Some(extreme)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/scans/results/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "POST", "/api/scans/stop/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn duplicate_start_is_409() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let (app, orchestrator) = app();
    send(&app, "POST", "/api/scan-targets", Some(json!({ "url": server.uri() }))).await;
    let start = json!({
        "targetId": 1,
        "injectionTypes": ["boolean-based"],
        "intensityLevel": "medium",
        "requestDelay": 10000
    });

    let (status, first) = send(&app, "POST", "/api/scans/start", Some(start.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], "running");
    assert_eq!(first["progress"], 0);

    let (status, body) = send(&app, "POST", "/api/scans/start", Some(start)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");

    let (status, stopped) = send(&app, "POST", "/api/scans/stop/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stopped["status"], "stopped");
    assert_eq!(stopped["id"], first["id"]);

    let (_, stats) = send(&app, "GET", "/api/dashboard/stats", None).await;
    assert_eq!(stats["totalScans"], 1);
    assert_eq!(stats["runningScans"], 0);
    assert_eq!(stats["stoppedScans"], 1);

    orchestrator.shutdown().await;
}

#[tokio::test]
async fn full_scan_report_flow() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ERROR: You have an error in your SQL syntax"))
        .mount(&server)
        .await;

    let (app, _) = app();
    send(
        &app,
        "POST",
        "/api/scan-targets",
        Some(json!({ "url": format!("{}/search", server.uri()), "testParameters": "term=shoes" })),
    )
    .await;

    let (status, started) = send(
        &app,
        "POST",
        "/api/scans/start",
        Some(json!({
            "targetId": 1,
            "injectionTypes": ["error-based"],
            "intensityLevel": "high",
            "requestDelay": 100,
            "followRedirects": false
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let scan_id = started["id"].as_u64().unwrap();

    let deadline = Instant::now() + Duration::from_secs(20);
    let results = loop {
        let (status, results) = send(&app, "GET", "/api/scans/results/1", None).await;
        assert_eq!(status, StatusCode::OK);
        if results["status"] != "running" {
            break results;
        }
        assert!(Instant::now() < deadline, "scan did not finish");
        tokio::time::sleep(Duration::from_millis(25)).await;
    };
    assert_eq!(results["status"], "completed");
    assert_eq!(results["progress"], 100);
    assert!(results["completedAt"].is_string());
    let vulns = results["vulnerabilities"].as_array().unwrap();
    assert_eq!(vulns.len(), 5);
    assert_eq!(vulns[0]["parameter"], "term");
    assert_eq!(vulns[0]["type"], "error-based");
    assert_eq!(vulns[0]["cvssScore"], "8.6");

    let (status, scan_vulns) = send(&app, "GET", &format!("/api/vulnerabilities/{}", scan_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scan_vulns.as_array().unwrap().len(), 5);

    let (status, report) = send(&app, "GET", &format!("/api/reports/export/{}", scan_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["scan"]["id"], scan_id);
    assert_eq!(report["target"]["id"], 1);
    assert_eq!(report["configuration"]["intensityLevel"], "high");
    assert_eq!(report["configuration"]["followRedirects"], false);
    assert_eq!(report["summary"], json!({ "total": 5, "critical": 5, "high": 0, "medium": 0, "low": 0, "info": 0 }));
    assert!(report["generatedAt"].is_string());

    let (_, stats) = send(&app, "GET", "/api/dashboard/stats", None).await;
    assert_eq!(stats["completedScans"], 1);
    assert_eq!(stats["criticalVulns"], 5);

    let (status, _) = send(&app, "GET", "/api/reports/export/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn payload_catalog_listing() {
    let (app, _) = app();
    let (status, body) = send(&app, "GET", "/api/payloads", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|e| e["payloads"] == 5));
}

#[tokio::test]
async fn malformed_json_is_400() {
    let (app, _) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/scans/start")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_numeric_ids_get_json_errors() {
    let (app, _) = app();
    for (method, uri) in [
        ("GET", "/api/scans/results/abc"),
        ("GET", "/api/scan-targets/first"),
        ("POST", "/api/scans/stop/-1"),
        ("GET", "/api/vulnerabilities/1.5"),
        ("GET", "/api/reports/export/latest"),
    ] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
        assert_eq!(body["error"], "BAD_REQUEST", "{} {}", method, uri);
        assert!(body["message"].is_string(), "{} {}", method, uri);
    }
}
