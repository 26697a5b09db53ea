//! HTTP-level tests: the dashboard server on an ephemeral port, and the
//! SerpApi client against a local stand-in for the API.

use axum::{extract::Query, extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::net::TcpListener;

use review_pulse::config::{Config, Credentials};
use review_pulse::dashboard::{DashboardSession, HttpSnapshotSource, SessionState};
use review_pulse::fetch::{self, FetchOutcome, SerpApiSource};
use review_pulse::server;

const CLASSIFIED: &str = r#"{
  "summary": {
    "by_category": {"Bugs": 2, "Praises": 1, "Crashes": 1},
    "by_sentiment": {"negative": 3, "positive": 1},
    "total": 4,
    "product_id": "com.example.app",
    "fetched_at": "2024-02-02T08:00:00.000Z"
  },
  "data": [
    {"id": "1", "rating": 2, "text": "login <b>broken</b>", "date": "2024-01-01", "category": "Bugs", "sentiment": "negative"},
    {"id": "2", "rating": 5, "text": "love it", "date": "2024-01-15", "category": "Praises", "sentiment": "positive"},
    {"id": "3", "rating": 1, "text": "crashes on launch", "date": "2024-01-20", "category": "Crashes", "sentiment": "negative"},
    {"id": "4", "rating": 2, "text": "sync error", "date": "2024-02-01", "category": "Bugs", "sentiment": "negative"}
  ]
}"#;

fn test_config(tmp: &TempDir) -> Config {
    let mut cfg = Config::default();
    cfg.storage.dir = tmp.path().join("reviews");
    cfg
}

fn write_classified(cfg: &Config) {
    fs::create_dir_all(&cfg.storage.dir).unwrap();
    fs::write(cfg.storage.classified_path(), CLASSIFIED).unwrap();
}

/// Start the dashboard on 127.0.0.1:0 and return its base URL.
async fn start_server(cfg: &Config) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cfg = cfg.clone();
    tokio::spawn(async move {
        let _ = server::serve(listener, &cfg).await;
    });
    format!("http://{}", addr)
}

async fn get_json(url: &str) -> (u16, Value) {
    let resp = reqwest::get(url).await.unwrap();
    let status = resp.status().as_u16();
    let body: Value = resp.json().await.unwrap();
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(&test_config(&tmp)).await;

    let (status, body) = get_json(&format!("{}/health", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_classified_reviews_missing_is_404() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(&test_config(&tmp)).await;

    let (status, body) = get_json(&format!("{}/classified-reviews", base)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(
        body["error"]["message"],
        "No classified_reviews.json yet"
    );
}

#[tokio::test]
async fn test_classified_reviews_served_verbatim() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    write_classified(&cfg);
    let base = start_server(&cfg).await;

    let resp = reqwest::get(format!("{}/classified-reviews", base))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let content_type = resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("application/json"));
    assert_eq!(resp.text().await.unwrap(), CLASSIFIED);
}

#[tokio::test]
async fn test_dashboard_placeholder_without_data() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(&test_config(&tmp)).await;

    let resp = reqwest::get(format!("{}/", base)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let html = resp.text().await.unwrap();
    assert!(html.contains("No data yet"));
    assert!(!html.contains("<svg"));
}

#[tokio::test]
async fn test_dashboard_renders_charts_and_escapes_text() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    write_classified(&cfg);
    let base = start_server(&cfg).await;

    let html = reqwest::get(format!("{}/?category=Bugs", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("categoryPie"));
    assert!(html.contains("sentimentBar"));
    assert!(html.contains("App: com.example.app"));
    assert!(html.contains("Total classified: 2"));
    assert!(html.contains("login &lt;b>broken&lt;/b>"));
    assert!(!html.contains("crashes on launch"));
}

#[tokio::test]
async fn test_view_unfiltered_matches_snapshot() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    write_classified(&cfg);
    let base = start_server(&cfg).await;

    let (status, body) = get_json(&format!("{}/api/view", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["summary"]["total"], 4);
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
    assert_eq!(body["data"][0]["rating"].to_string(), "2");
}

#[tokio::test]
async fn test_view_malformed_snapshot_is_500() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    fs::create_dir_all(&cfg.storage.dir).unwrap();
    fs::write(cfg.storage.classified_path(), "{\"summary\": [").unwrap();
    let base = start_server(&cfg).await;

    let (status, body) = get_json(&format!("{}/api/view", base)).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"]["code"], "internal");
    assert!(!body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("yet"));
}

#[tokio::test]
async fn test_dashboard_accepts_passthrough_snippet() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    fs::create_dir_all(&cfg.storage.dir).unwrap();
    fs::write(
        cfg.storage.classified_path(),
        r#"{"summary": {"total": 2, "product_id": "com.example.app"},
            "data": [
              {"id": "a", "rating": 4, "snippet": "raw body", "text": "clean body",
               "date": "2024-01-01", "category": "Bugs", "sentiment": "negative"},
              {"id": "b", "rating": 3, "snippet": "only raw",
               "date": "2024-01-02", "category": "Other", "sentiment": "neutral"}
            ]}"#,
    )
    .unwrap();
    let base = start_server(&cfg).await;

    let html = reqwest::get(format!("{}/", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!html.contains("No data yet"));
    assert!(html.contains("clean body"));
    assert!(html.contains("only raw"));

    let (status, body) = get_json(&format!("{}/api/view?category=Bugs", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"][0]["snippet"], "raw body");
    assert_eq!(body["data"][0]["rating"].to_string(), "4");
}

#[tokio::test]
async fn test_view_filters_by_category_and_date() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    write_classified(&cfg);
    let base = start_server(&cfg).await;

    let (status, body) = get_json(&format!(
        "{}/api/view?category=Bugs&category=Crashes",
        base
    ))
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["summary"]["total"], 3);
    assert_eq!(body["summary"]["by_category"]["Bugs"], 2);
    assert_eq!(body["summary"]["by_category"]["Crashes"], 1);
    assert_eq!(body["summary"]["by_category"]["Praises"], 0);
    assert_eq!(body["summary"]["product_id"], "com.example.app");

    let (status, body) = get_json(&format!(
        "{}/api/view?from=2024-01-10&to=2024-01-31",
        base
    ))
    .await;
    assert_eq!(status, 200);
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["2", "3"]);
    assert_eq!(body["summary"]["by_sentiment"]["positive"], 1);
    assert_eq!(body["summary"]["by_sentiment"]["neutral"], 0);
}

#[tokio::test]
async fn test_view_bad_query_is_400() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    write_classified(&cfg);
    let base = start_server(&cfg).await;

    let (status, body) = get_json(&format!("{}/api/view?from=yesterday", base)).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, _) = get_json(&format!("{}/api/view?category=Rants", base)).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_view_without_data_is_404() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(&test_config(&tmp)).await;

    let (status, body) = get_json(&format!("{}/api/view", base)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_http_snapshot_source_loads_from_running_server() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    write_classified(&cfg);
    let base = start_server(&cfg).await;

    let source = HttpSnapshotSource::new(&format!("{}/", base), 5).unwrap();
    let mut session = DashboardSession::new();
    assert!(session.load(&source).await);
    assert_eq!(session.state(), &SessionState::Loaded);
    assert_eq!(session.view().unwrap().data.len(), 4);
}

#[tokio::test]
async fn test_http_snapshot_source_reports_missing_data() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(&test_config(&tmp)).await;

    let source = HttpSnapshotSource::new(&base, 5).unwrap();
    let mut session = DashboardSession::new();
    assert!(!session.load(&source).await);
    assert!(matches!(session.state(), SessionState::Unavailable(_)));
    assert!(session.render_text().starts_with("No data yet"));
}

// ============ SerpApi stand-in ============

#[derive(Clone, Default)]
struct FakeApi {
    requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn fake_search(
    State(api): State<FakeApi>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let call = {
        let mut requests = api.requests.lock().unwrap();
        requests.push(params);
        requests.len()
    };
    let reviews: Vec<Value> = (0..100)
        .map(|i| {
            json!({
                "id": format!("{}-{}", call, i),
                "rating": 4,
                "snippet": "fine",
                "date": "January 05, 2024"
            })
        })
        .collect();
    Json(json!({
        "reviews": reviews,
        "serpapi_pagination": { "next_page_token": format!("tok{}", call) }
    }))
}

async fn start_fake_api() -> (String, FakeApi) {
    let api = FakeApi::default();
    let app = Router::new()
        .route("/search.json", get(fake_search))
        .with_state(api.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{}/search.json", addr), api)
}

#[tokio::test]
async fn test_fetch_against_fake_api_writes_snapshot() {
    let tmp = TempDir::new().unwrap();
    let (endpoint, api) = start_fake_api().await;

    let mut cfg = test_config(&tmp);
    cfg.fetch.endpoint = endpoint;
    cfg.fetch.max_total = 250;
    let creds = Credentials {
        api_key: "abc123".to_string(),
        product_id: "com.example.app".to_string(),
    };

    let source = SerpApiSource::new(&cfg.fetch, &creds).unwrap();
    let outcome = fetch::run_fetch_with(&source, &cfg, &creds.product_id, true)
        .await
        .unwrap();
    match outcome {
        FetchOutcome::Saved { count, .. } => assert_eq!(count, 250),
        other => panic!("unexpected outcome: {:?}", other),
    }

    let requests = api.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0]["engine"], "google_play_product");
    assert_eq!(requests[0]["product_id"], "com.example.app");
    assert_eq!(requests[0]["sort_by"], "2");
    assert_eq!(requests[0]["num"], "100");
    assert_eq!(requests[0]["api_key"], "abc123");
    assert!(!requests[0].contains_key("next_page_token"));
    assert_eq!(requests[1]["next_page_token"], "tok1");
    assert_eq!(requests[2]["next_page_token"], "tok2");

    let written: Value =
        serde_json::from_str(&fs::read_to_string(cfg.storage.raw_path()).unwrap()).unwrap();
    assert_eq!(written["product_id"], "com.example.app");
    assert_eq!(written["count"], 250);
    assert_eq!(written["reviews"].as_array().unwrap().len(), 250);
    assert!(written["fetched_at"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_fetch_api_error_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let app = Router::new().route(
        "/search.json",
        get(|| async {
            (
                axum::http::StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid API key." })),
            )
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let mut cfg = test_config(&tmp);
    cfg.fetch.endpoint = format!("http://{}/search.json", addr);
    let creds = Credentials {
        api_key: "bad".to_string(),
        product_id: "com.example.app".to_string(),
    };

    let source = SerpApiSource::new(&cfg.fetch, &creds).unwrap();
    let err = fetch::run_fetch_with(&source, &cfg, &creds.product_id, true)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid API key."));
    assert!(!cfg.storage.raw_path().exists());
}
