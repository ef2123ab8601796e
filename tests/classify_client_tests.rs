// Contract tests for the classification call, against a local mock server.

use doc_renamer::classify_client::ClassifyClient;
use doc_renamer::document_store::InputFile;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_file() -> InputFile {
    InputFile::new(
        "site_report.pdf",
        Some("application/pdf"),
        b"%PDF-1.4 sample payload".to_vec(),
    )
}

#[tokio::test]
async fn test_analyze_returns_proposed_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"newName": "B-A5_Compaction_Test.pdf"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ClassifyClient::new(&server.uri());
    let name = client.analyze(&sample_file()).await.unwrap();
    assert_eq!(name, "B-A5_Compaction_Test.pdf");
}

#[tokio::test]
async fn test_analyze_sends_multipart_file_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("site_report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"newName": "ok.pdf"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ClassifyClient::new(&server.uri());
    client.analyze(&sample_file()).await.unwrap();
}

#[tokio::test]
async fn test_analyze_prefers_server_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": "Failed to extract text from document"})),
        )
        .mount(&server)
        .await;

    let client = ClassifyClient::new(&server.uri());
    let err = client.analyze(&sample_file()).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to extract text from document");
}

#[tokio::test]
async fn test_analyze_falls_back_to_status_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = ClassifyClient::new(&server.uri());
    let err = client.analyze(&sample_file()).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP error! status: 422");
}

#[tokio::test]
async fn test_analyze_rejects_empty_proposed_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"newName": "  "})))
        .mount(&server)
        .await;

    let client = ClassifyClient::new(&server.uri());
    let err = client.analyze(&sample_file()).await.unwrap_err();
    assert!(err.to_string().contains("empty filename"));
}

#[tokio::test]
async fn test_analyze_rejects_malformed_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = ClassifyClient::new(&server.uri());
    let err = client.analyze(&sample_file()).await.unwrap_err();
    assert!(err.to_string().contains("Malformed classification response"));
}
