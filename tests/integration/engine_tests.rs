//! Full batch runs against a mock catalog
//!
//! These tests build a config pointing at a wiremock server, write the SKU
//! list and checkpoint into a temp dir, and call `run_batch` directly.

use catalog_alt::config::{
    load_config, AltTextConfig, ApiConfig, Config, EngineConfig, FilesConfig,
};
use catalog_alt::run_batch;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with every file inside `dir`
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    let file = |name: &str| dir.join(name).to_string_lossy().into_owned();
    Config {
        api: ApiConfig {
            account_name: "teststore".to_string(),
            base_url: Some(base_url.to_string()),
            auth_header: "VtexIdclientAutCookie".to_string(),
            credential_env: "VTEX_COOKIE".to_string(),
        },
        engine: EngineConfig {
            max_workers: 2,
            request_timeout_secs: 5,
            max_retries: 0,
            backoff_factor: 0.0,
            rate_limit_delay_ms: 0, // No pacing for tests
            checkpoint_interval: 10,
            max_throttle_retries: 0,
            max_throttle_wait_secs: 0,
            default_retry_after_secs: 0,
            halt_on_auth_expired: false,
        },
        files: FilesConfig {
            sku_list: file("sku_ids.txt"),
            checkpoint: file("checkpoint.json"),
            log: file("execution.log"),
            error_log: file("errors.log"),
        },
        alt_text: AltTextConfig {
            fallback: "produto farmacêutico".to_string(),
        },
    }
}

fn write_list(config: &Config, content: &str) {
    std::fs::write(&config.files.sku_list, content).expect("Failed to write SKU list");
}

fn read_list(config: &Config) -> String {
    std::fs::read_to_string(&config.files.sku_list).expect("Failed to read SKU list")
}

fn checkpointed(config: &Config) -> Vec<i64> {
    let content =
        std::fs::read_to_string(&config.files.checkpoint).expect("Failed to read checkpoint");
    let value: Value = serde_json::from_str(&content).expect("Checkpoint is not JSON");
    value["processed_skus"]
        .as_array()
        .expect("processed_skus is not an array")
        .iter()
        .map(|id| id.as_i64().expect("SKU ID is not an integer"))
        .collect()
}

async fn mount_details(server: &MockServer, sku: i64, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/stockkeepingunit/{}", sku)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ProductName": name,
            "RefId": format!("REF-{}", sku)
        })))
        .mount(server)
        .await;
}

async fn mount_images(server: &MockServer, sku: i64, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/stockkeepingunit/{}/file", sku)))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_run_mixed_outcomes() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    write_list(&config, "100\n200\n300\n");

    mount_details(&server, 100, "Dipirona  Sódica 500mg").await;
    mount_images(
        &server,
        100,
        ResponseTemplate::new(200).set_body_json(json!([
            {"Id": 1, "Label": null, "Name": "front", "IsMain": true},
            {"Id": 2, "Label": "dipirona sódica 500mg", "Text": "dipirona sódica 500mg"}
        ])),
    )
    .await;
    mount_details(&server, 200, "Soro Fisiológico").await;
    mount_images(&server, 200, ResponseTemplate::new(200).set_body_json(json!([]))).await;
    mount_details(&server, 300, "Vitamina C").await;
    mount_images(&server, 300, ResponseTemplate::new(404)).await;

    Mock::given(method("PUT"))
        .and(path("/stockkeepingunit/100/file/1"))
        .and(body_json(json!({
            "Id": 1,
            "Label": "dipirona sódica 500mg",
            "Text": "dipirona sódica 500mg",
            "Name": "front",
            "IsMain": true
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let summary = run_batch(&config, "token", false, std::future::pending())
        .await
        .expect("Run failed");

    assert_eq!(summary.total, 3);
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.checkpointed, 3);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.images_updated, 1);
    assert_eq!(summary.unresolved, 0);
    assert!(!summary.interrupted);

    assert_eq!(checkpointed(&config), vec![100, 200, 300]);
    assert_eq!(read_list(&config), "");
}

#[tokio::test]
async fn test_expired_credential_is_retried_next_run() {
    let dir = TempDir::new().unwrap();

    // First run: the credential expires while updating SKU 100
    {
        let server = MockServer::start().await;
        let config = create_test_config(&server.uri(), dir.path());
        write_list(&config, "100\n200\n");

        mount_details(&server, 100, "Amoxicilina").await;
        mount_images(
            &server,
            100,
            ResponseTemplate::new(200).set_body_json(json!([{"Id": 7}])),
        )
        .await;
        mount_details(&server, 200, "Ibuprofeno").await;
        mount_images(
            &server,
            200,
            ResponseTemplate::new(200).set_body_json(json!([{"Id": 8, "Label": "x"}])),
        )
        .await;
        Mock::given(method("PUT"))
            .and(path("/stockkeepingunit/100/file/7"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let summary = run_batch(&config, "token", false, std::future::pending())
            .await
            .expect("Run failed");

        assert_eq!(summary.unresolved, 1);
        assert!(!summary.halted);
        assert_eq!(checkpointed(&config), vec![200]);
        assert_eq!(read_list(&config), "100\n");
    }

    // Second run: only SKU 100 is requested again
    {
        let server = MockServer::start().await;
        let config = create_test_config(&server.uri(), dir.path());

        mount_details(&server, 100, "Amoxicilina").await;
        mount_images(
            &server,
            100,
            ResponseTemplate::new(200).set_body_json(json!([{"Id": 7}])),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/stockkeepingunit/200"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/stockkeepingunit/100/file/7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let summary = run_batch(&config, "fresh-token", false, std::future::pending())
            .await
            .expect("Run failed");

        assert_eq!(summary.total, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(checkpointed(&config), vec![100, 200]);
        assert_eq!(read_list(&config), "");
    }
}

#[tokio::test]
async fn test_checkpointed_sku_is_never_fetched() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    write_list(&config, "100\n200\n");
    std::fs::write(&config.files.checkpoint, r#"{"processed_skus":[100]}"#).unwrap();

    Mock::given(method("GET"))
        .and(path("/stockkeepingunit/100"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_details(&server, 200, "Losartana").await;
    mount_images(&server, 200, ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let summary = run_batch(&config, "token", false, std::future::pending())
        .await
        .expect("Run failed");

    assert_eq!(summary.already_processed, 1);
    assert_eq!(summary.checkpointed, 1);
    assert_eq!(checkpointed(&config), vec![100, 200]);
}

#[tokio::test]
async fn test_second_run_issues_no_writes() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    write_list(&config, "100\n");

    // Remote state after a previous run already wrote the label
    mount_details(&server, 100, "Omeprazol 20mg").await;
    mount_images(
        &server,
        100,
        ResponseTemplate::new(200).set_body_json(json!([
            {"Id": 1, "Label": "omeprazol 20mg", "Text": "omeprazol 20mg"}
        ])),
    )
    .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let summary = run_batch(&config, "token", false, std::future::pending())
        .await
        .expect("Run failed");

    assert_eq!(summary.updated, 0);
    assert_eq!(summary.checkpointed, 1);
    assert_eq!(checkpointed(&config), vec![100]);
}

#[tokio::test]
async fn test_duplicate_ids_processed_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    write_list(&config, "100\n100\n100\n");

    Mock::given(method("GET"))
        .and(path("/stockkeepingunit/100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ProductName": "Cetirizina"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_images(&server, 100, ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let summary = run_batch(&config, "token", false, std::future::pending())
        .await
        .expect("Run failed");

    assert_eq!(summary.total, 3);
    assert_eq!(summary.duplicates, 2);
    assert_eq!(checkpointed(&config), vec![100]);
    assert_eq!(read_list(&config), "");
}

#[tokio::test]
async fn test_compaction_keeps_comments_and_pending_ids() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    write_list(&config, "# batch 7\n100\n\nabc\n200\n");

    mount_details(&server, 100, "Loratadina").await;
    mount_images(&server, 100, ResponseTemplate::new(200).set_body_json(json!([]))).await;
    Mock::given(method("GET"))
        .and(path("/stockkeepingunit/200"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let summary = run_batch(&config, "token", false, std::future::pending())
        .await
        .expect("Run failed");

    assert_eq!(summary.total, 2);
    assert_eq!(summary.unresolved, 1);
    assert_eq!(read_list(&config), "# batch 7\n\nabc\n200\n");
}

#[tokio::test]
async fn test_halt_on_expired_credential_stops_dispatch() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    config.engine.max_workers = 1;
    config.engine.halt_on_auth_expired = true;
    write_list(&config, "100\n200\n");

    mount_details(&server, 100, "Metformina").await;
    mount_images(
        &server,
        100,
        ResponseTemplate::new(200).set_body_json(json!([{"Id": 3}])),
    )
    .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stockkeepingunit/200"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let summary = run_batch(&config, "token", false, std::future::pending())
        .await
        .expect("Run failed");

    assert!(summary.halted);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.unresolved, 1);
    assert_eq!(read_list(&config), "100\n200\n");
}

#[tokio::test]
async fn test_fresh_run_clears_checkpoint() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    write_list(&config, "100\n");
    std::fs::write(&config.files.checkpoint, r#"{"processed_skus":[100,999]}"#).unwrap();

    Mock::given(method("GET"))
        .and(path("/stockkeepingunit/100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ProductName": "Captopril"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_images(&server, 100, ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let summary = run_batch(&config, "token", true, std::future::pending())
        .await
        .expect("Run failed");

    assert_eq!(summary.already_processed, 0);
    assert_eq!(checkpointed(&config), vec![100]);
}

#[tokio::test]
async fn test_empty_list_makes_no_requests() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    write_list(&config, "# nothing here\n\n");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let summary = run_batch(&config, "token", false, std::future::pending())
        .await
        .expect("Run failed");

    assert_eq!(summary.total, 0);
    assert_eq!(read_list(&config), "# nothing here\n\n");
}

#[tokio::test]
async fn test_missing_list_is_an_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    let result = run_batch(&config, "token", false, std::future::pending()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_run_from_config_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let list_path = dir.path().join("ids.txt");
    let checkpoint_path = dir.path().join("progress.json");
    std::fs::write(&list_path, "42\n").unwrap();

    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[api]
account-name = "teststore"
base-url = "{}/"

[engine]
max-workers = 1
rate-limit-delay-ms = 0
max-retries = 0

[files]
sku-list = "{}"
checkpoint = "{}"
log = "{}"
error-log = "{}"

[alt-text]
fallback = "produto"
"#,
            server.uri(),
            list_path.display(),
            checkpoint_path.display(),
            dir.path().join("run.log").display(),
            dir.path().join("err.log").display()
        ),
    )
    .unwrap();

    let config = load_config(&config_path).expect("Failed to load config");
    assert_eq!(config.api.resolved_base_url(), server.uri());

    mount_details(&server, 42, "").await;

    let summary = run_batch(&config, "token", false, std::future::pending())
        .await
        .expect("Run failed");

    assert_eq!(summary.checkpointed, 1);
    assert_eq!(checkpointed(&config), vec![42]);
}
