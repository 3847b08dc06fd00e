//! Integration tests for run_extract against a mock API.
//!
//! These tests verify the orchestration around the fetch loop:
//! - Token acquisition before any page request
//! - One paced fetch per endpoint, first endpoint as the main table
//! - CSV output and the request log file

use std::time::Duration;

use gamedata_etl::{run_extract, ExtractConfig, TableRef};
use httptest::{matchers::*, responders::*, Expectation, Server};
use serde_json::json;
use tempfile::TempDir;

fn expect_token(server: &Server) {
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/oauth2/token"),
            request::query(url_decoded(contains(("grant_type", "client_credentials")))),
        ])
        .respond_with(json_encoded(json!({"access_token": "tok", "expires_in": 5000}))),
    );
}

fn expect_page(server: &Server, endpoint: &str, offset: usize, body: serde_json::Value) {
    server.expect(
        Expectation::matching(all_of![
            request::method("POST"),
            request::path(eq(format!("/v4/{}", endpoint))),
            request::headers(contains(("authorization", "Bearer tok"))),
            request::body(eq(format!("fields *; limit 2; offset {};", offset).into_bytes())),
        ])
        .respond_with(json_encoded(body)),
    );
}

fn test_config(server: &Server, endpoints: &[&str]) -> ExtractConfig {
    ExtractConfig {
        endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        batch_count: 10,
        batch_size: 2,
        min_interval: Duration::from_millis(1),
        show_logs: false,
        api_base_url: server.url_str("/v4"),
        token_url: server.url_str("/oauth2/token"),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_run_extract_loads_endpoints_in_order() {
    let server = Server::run();
    expect_token(&server);
    expect_page(&server, "games", 0, json!([{"id": 1, "genres": [1]}, {"id": 2, "genres": [1, 2]}]));
    expect_page(&server, "games", 2, json!([{"id": 3}]));
    expect_page(&server, "games", 4, json!([]));
    expect_page(&server, "genres", 0, json!([{"id": 1, "name": "RPG"}, {"id": 2, "name": "FPS"}]));
    expect_page(&server, "genres", 2, json!([]));

    let report = run_extract(test_config(&server, &["games", "genres"]))
        .await
        .unwrap();

    assert_eq!(
        report.records_per_endpoint,
        vec![("games".to_string(), 3), ("genres".to_string(), 2)]
    );
    assert!(report.csv_files.is_empty());

    let main = report.dataset.main().unwrap();
    assert_eq!(main.name(), "games");
    assert_eq!(main.n_rows(), 3);
    assert_eq!(main.cell(2, "genres"), Some(&serde_json::Value::Null));
    assert_eq!(report.dataset.table_names(), vec!["genres"]);
}

#[tokio::test]
async fn test_run_extract_saves_csvs_and_logs() {
    let server = Server::run();
    expect_token(&server);
    expect_page(&server, "genres", 0, json!([{"id": 1, "name": "RPG"}]));
    expect_page(&server, "genres", 2, json!([]));

    let dir = TempDir::new().unwrap();
    let log_file = dir.path().join("logs.txt");
    let config = ExtractConfig {
        keep_logs: true,
        log_file: log_file.clone(),
        save_csv_dir: Some(dir.path().to_path_buf()),
        ..test_config(&server, &["genres"])
    };

    let report = run_extract(config).await.unwrap();

    assert_eq!(report.csv_files, vec![dir.path().join("genres_data.csv")]);
    let csv = std::fs::read_to_string(&report.csv_files[0]).unwrap();
    assert!(csv.starts_with("id,name"));
    assert!(csv.contains("1,RPG"));

    let log = std::fs::read_to_string(&log_file).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("[REQUEST]"));
    assert!(lines[0].contains("Batch 1"));
    assert!(lines[1].contains("Batch 2"));
    assert!(lines[2].starts_with("[FETCH_DATA]"));
    assert!(lines[2].contains("Dataset size 1"));
    assert!(lines[3].starts_with("[EXTRACT]"));
    assert!(lines[3].contains("DATA EXTRACTION FINISHED"));
}

#[tokio::test]
async fn test_run_extract_fails_without_token() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("POST", "/oauth2/token"))
            .respond_with(json_encoded(json!({"status": 403, "message": "invalid client"}))),
    );

    let result = run_extract(test_config(&server, &["games"])).await;

    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to obtain access token"));
}

#[tokio::test]
async fn test_run_extract_aborts_on_error_status() {
    let server = Server::run();
    expect_token(&server);
    server.expect(
        Expectation::matching(request::method_path("POST", "/v4/games"))
            .respond_with(status_code(429)),
    );

    let result = run_extract(test_config(&server, &["games", "genres"])).await;

    let err = result.unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("Failed to fetch endpoint 'games'"));
    assert!(message.contains("HTTP 429"));
}

#[tokio::test]
async fn test_extracted_ids_resolve_against_second_endpoint() {
    let server = Server::run();
    expect_token(&server);
    expect_page(&server, "games", 0, json!([{"id": 1, "genres": [1, 2, null]}]));
    expect_page(&server, "games", 2, json!([]));
    expect_page(&server, "genres", 0, json!([{"id": 1, "name": "RPG"}, {"id": 2, "name": "FPS"}]));
    expect_page(&server, "genres", 2, json!([]));

    let mut report = run_extract(test_config(&server, &["games", "genres"]))
        .await
        .unwrap();
    let plan = gamedata_etl::ReplacePlan::new(["genres"], ["genres"], ["name"]);
    report
        .dataset
        .replace_ids(&plan, TableRef::Main, true)
        .unwrap();

    assert_eq!(
        report.dataset.main().unwrap().cell(0, "genres"),
        Some(&json!(["RPG", "FPS", null]))
    );
}
