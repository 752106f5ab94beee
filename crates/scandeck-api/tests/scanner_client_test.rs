// Integration tests for `ScannerClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scandeck_api::{Error, ResultEntry, ScanParams, ScannerClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ScannerClient) {
    let server = MockServer::start().await;
    let base = server.uri().parse().expect("mock server URI");
    let client = ScannerClient::with_client(reqwest::Client::new(), base);
    (server, client)
}

// ── Status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn scan_status_active_with_progress() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/scan/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": true,
            "progress": { "done": 40, "total": 200 }
        })))
        .mount(&server)
        .await;

    let status = client.scan_status().await.expect("status fetch");
    assert!(status.active);
    assert!(!status.stopping);
    assert_eq!(status.progress.done, 40);
    assert_eq!(status.progress.total, 200);
    assert_eq!(status.progress.percent(), 20);
}

#[tokio::test]
async fn scan_status_carries_in_band_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/scan/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": false,
            "progress": { "done": 0, "total": 0 },
            "error": "GeoIP databases not found"
        })))
        .mount(&server)
        .await;

    let status = client.scan_status().await.expect("status fetch");
    assert!(!status.active);
    assert_eq!(status.error.as_deref(), Some("GeoIP databases not found"));
}

// ── Scan lifecycle ──────────────────────────────────────────────────

#[tokio::test]
async fn start_scan_posts_parameters() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/scan/start"))
        .and(body_json(json!({
            "pings": 3,
            "timeout": 500,
            "workers": 10,
            "vpn_speedtest": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "started" })))
        .mount(&server)
        .await;

    let params = ScanParams {
        pings: 3,
        timeout: 500,
        workers: 10,
        vpn_speedtest: true,
    };
    client.start_scan(&params).await.expect("scan accepted");
}

#[tokio::test]
async fn start_scan_surfaces_server_message_verbatim() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/scan/start"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({ "message": "Scan already in progress" })),
        )
        .mount(&server)
        .await;

    let err = client
        .start_scan(&ScanParams::default())
        .await
        .expect_err("conflict must fail");
    assert_eq!(err.server_message(), Some("Scan already in progress"));
    assert!(!err.is_transient());
    match err {
        Error::Server { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "Scan already in progress");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn unstructured_error_body_falls_back_to_reason() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/scan/stop"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
        .mount(&server)
        .await;

    let err = client.stop_scan().await.expect_err("must fail");
    match err {
        Error::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal Server Error");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

// ── Results ─────────────────────────────────────────────────────────

#[tokio::test]
async fn results_accepts_both_wire_shapes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "a.com": [10.0, "1.1.1.1", "US", "NY"],
            "b.com": {
                "latency_ms": 200.0,
                "ip": "2.2.2.2",
                "country": "DE",
                "city": "Berlin",
                "rx_speed_mbps": 80.5
            }
        })))
        .mount(&server)
        .await;

    let results = client.results().await.expect("results fetch");
    assert_eq!(results.len(), 2);
    assert!(matches!(results["a.com"], ResultEntry::Tuple(_)));
    assert!(matches!(results["b.com"], ResultEntry::Keyed(_)));
}

#[tokio::test]
async fn empty_results_mapping_is_valid() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let results = client.results().await.expect("results fetch");
    assert!(results.is_empty());
}

// ── Speedtest ───────────────────────────────────────────────────────

#[tokio::test]
async fn speedtest_sends_selected_domains() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/vpn-speedtest"))
        .and(body_json(json!({ "domains": ["a.com", "b.com"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "started" })))
        .mount(&server)
        .await;

    let domains = vec!["a.com".to_owned(), "b.com".to_owned()];
    client.run_speedtest(&domains).await.expect("accepted");
}

// ── Logs ────────────────────────────────────────────────────────────

#[tokio::test]
async fn logs_feed_preserves_order() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "timestamp": "2026-08-30 10:00:00", "level": "info", "message": "scan started" },
            { "timestamp": "2026-08-30 10:00:05", "level": "warning", "message": "probe timeout" }
        ])))
        .mount(&server)
        .await;

    let logs = client.logs().await.expect("logs fetch");
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].message, "scan started");
    assert_eq!(logs[1].level, "warning");
}

#[tokio::test]
async fn clear_logs_is_a_bare_post() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/logs/clear"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "cleared" })))
        .mount(&server)
        .await;

    client.clear_logs().await.expect("cleared");
}

#[tokio::test]
async fn malformed_body_is_a_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/results"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.results().await.expect_err("must fail");
    assert!(matches!(err, Error::Deserialization { .. }));
}
