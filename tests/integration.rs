use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Writes a config whose storage lives under `root` and whose API endpoint
/// points at a closed local port, so any network call fails fast.
fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[fetch]
endpoint = "http://127.0.0.1:9/search.json"
timeout_secs = 2

[storage]
dir = "{}/reviews"

[server]
bind = "127.0.0.1:0"
"#,
        root.display()
    );

    let config_path = config_dir.join("pulse.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn write_classified(root: &Path) {
    let dir = root.join("reviews");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("classified_reviews.json"),
        r#"{
  "summary": {
    "by_category": {"Bugs": 2, "Praises": 1, "Crashes": 1},
    "by_sentiment": {"negative": 3, "positive": 1},
    "total": 4,
    "product_id": "com.example.app",
    "fetched_at": "2024-02-02T08:00:00.000Z"
  },
  "data": [
    {"id": "1", "rating": 2, "text": "login is broken", "date": "2024-01-01", "category": "Bugs", "sentiment": "negative"},
    {"id": "2", "rating": 5, "text": "love the new layout", "date": "2024-01-15", "category": "Praises", "sentiment": "positive"},
    {"id": "3", "rating": 1, "text": "crashes on launch", "date": "2024-01-20", "category": "Crashes", "sentiment": "negative"},
    {"id": "4", "rating": 2, "text": "sync error again", "date": "2024-02-01", "category": "Bugs", "sentiment": "negative"}
  ]
}"#,
    )
    .unwrap();
}

/// Run a binary with credentials scrubbed from the environment.
fn run_bin(bin: &str, config_path: &Path, args: &[&str], env: &[(&str, &str)]) -> (String, String, i32) {
    let mut cmd = Command::new(bin);
    cmd.env_remove("SERPAPI_KEY")
        .env_remove("PRODUCT_ID")
        .env("PULSE_CONFIG", config_path)
        .env("RUST_LOG", "warn");
    for (k, v) in env {
        cmd.env(k, v);
    }
    if bin.ends_with("pulse") || bin.ends_with("pulse.exe") {
        cmd.arg("--config").arg(config_path);
    }
    let output = cmd
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run {}: {}", bin, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code().unwrap_or(-1))
}

fn scrape(config_path: &Path, args: &[&str], env: &[(&str, &str)]) -> (String, String, i32) {
    run_bin(env!("CARGO_BIN_EXE_scrape"), config_path, args, env)
}

fn pulse(config_path: &Path, args: &[&str]) -> (String, String, i32) {
    run_bin(env!("CARGO_BIN_EXE_pulse"), config_path, args, &[])
}

fn raw_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("reviews/fetch.json")
}

#[test]
fn test_scrape_missing_credentials_exits_1_without_output() {
    let (_tmp, config) = setup_test_env();
    let (_, stderr, code) = scrape(&config, &[], &[]);
    assert_eq!(code, 1);
    assert!(stderr.contains("SERPAPI_KEY"), "stderr: {}", stderr);
    assert!(!raw_path(&config).exists());
}

#[test]
fn test_scrape_placeholder_product_exits_1() {
    let (_tmp, config) = setup_test_env();
    let (_, stderr, code) = scrape(
        &config,
        &[],
        &[("SERPAPI_KEY", "abc123"), ("PRODUCT_ID", "YOUR_PRODUCT_ID_HERE")],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("PRODUCT_ID"), "stderr: {}", stderr);
    assert!(!raw_path(&config).exists());
}

#[test]
fn test_scrape_skips_when_snapshot_is_from_today() {
    let (_tmp, config) = setup_test_env();
    let raw = raw_path(&config);
    fs::create_dir_all(raw.parent().unwrap()).unwrap();
    fs::write(&raw, "{\"keep\": true}").unwrap();

    let creds = [("SERPAPI_KEY", "abc123"), ("PRODUCT_ID", "com.example.app")];
    let (stdout, _, code) = scrape(&config, &[], &creds);
    assert_eq!(code, 0);
    assert!(stdout.contains("skipping fetch"), "stdout: {}", stdout);
    assert_eq!(fs::read_to_string(&raw).unwrap(), "{\"keep\": true}");
}

#[test]
fn test_scrape_force_bypasses_freshness_and_fails_on_transport_error() {
    let (_tmp, config) = setup_test_env();
    let raw = raw_path(&config);
    fs::create_dir_all(raw.parent().unwrap()).unwrap();
    fs::write(&raw, "{\"keep\": true}").unwrap();

    let creds = [("SERPAPI_KEY", "abc123"), ("PRODUCT_ID", "com.example.app")];
    let (_, stderr, code) = scrape(&config, &["--force"], &creds);
    assert_eq!(code, 1);
    assert!(stderr.contains("Fetch failed"), "stderr: {}", stderr);
    // The previous snapshot is untouched.
    assert_eq!(fs::read_to_string(&raw).unwrap(), "{\"keep\": true}");
}

#[test]
fn test_pulse_fetch_missing_credentials_exits_1() {
    let (_tmp, config) = setup_test_env();
    let (_, _, code) = pulse(&config, &["fetch"]);
    assert_eq!(code, 1);
}

#[test]
fn test_report_without_classified_data_prints_placeholder() {
    let (_tmp, config) = setup_test_env();
    let (stdout, _, code) = pulse(&config, &["report"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No data yet"), "stdout: {}", stdout);
}

#[test]
fn test_report_full_view() {
    let (tmp, config) = setup_test_env();
    write_classified(tmp.path());

    let (stdout, _, code) = pulse(&config, &["report"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("App: com.example.app"));
    assert!(stdout.contains("Total classified: 4"));
    assert!(stdout.contains(&format!("  {:<12} {:>6}", "Bugs", 2)));
    assert!(stdout.contains(&format!("  {:<12} {:>6}", "Complaints", 0)));
    assert!(stdout.contains("love the new layout"));
}

#[test]
fn test_report_filters_by_date_and_category() {
    let (tmp, config) = setup_test_env();
    write_classified(tmp.path());

    let (stdout, stderr, code) = pulse(
        &config,
        &[
            "report",
            "--from",
            "2024-01-10",
            "--to",
            "2024-01-31",
            "--category",
            "Bugs",
            "--category",
            "Crashes",
        ],
    );
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("Total classified: 1"));
    assert!(stdout.contains("crashes on launch"));
    assert!(!stdout.contains("login is broken"));
    assert!(!stdout.contains("love the new layout"));
}

#[test]
fn test_report_rejects_unknown_category() {
    let (_tmp, config) = setup_test_env();
    let (_, stderr, code) = pulse(&config, &["report", "--category", "Rants"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown category"), "stderr: {}", stderr);
}
