use std::io::Write;
use std::time::Duration;

use docchat_engine::{
    BackendClient, BackendError, BackendSettings, ChatRequest, HttpBackend, RemoteDocument,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpBackend {
    HttpBackend::new(BackendSettings {
        base_url: server.uri(),
        ..BackendSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn list_documents_parses_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                {"id": 1, "name": "report.pdf", "file": "/media/report.pdf",
                 "created_at": "2024-05-01T10:00:00Z"},
                {"id": 2, "name": "notes.txt", "file": "/media/notes.txt",
                 "created_at": "2024-05-02T11:00:00Z"},
            ]
        })))
        .mount(&server)
        .await;

    let documents = client_for(&server).list_documents().await.expect("list ok");

    assert_eq!(
        documents,
        vec![
            RemoteDocument {
                id: 1,
                name: "report.pdf".to_string(),
            },
            RemoteDocument {
                id: 2,
                name: "notes.txt".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn list_documents_tolerates_missing_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let documents = client_for(&server).list_documents().await.expect("list ok");

    assert!(documents.is_empty());
}

#[tokio::test]
async fn list_documents_rejects_non_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_documents().await.unwrap_err();

    assert!(matches!(err, BackendError::Invalid(_)));
}

#[tokio::test]
async fn upload_sends_multipart_file_and_parses_receipt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "uploaded",
            "id": 9,
            "name": "report.pdf",
            "chunks": 12
        })))
        .mount(&server)
        .await;

    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(b"fake pdf bytes").expect("write");

    let receipt = client_for(&server)
        .upload_document(file.path())
        .await
        .expect("upload ok");

    assert_eq!(receipt.id, 9);
    assert_eq!(receipt.name, "report.pdf");
    assert_eq!(receipt.chunks, 12);

    let requests = server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("fake pdf bytes"));
}

#[tokio::test]
async fn upload_rejection_keeps_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Unsupported file type"})),
        )
        .mount(&server)
        .await;

    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(b"x").expect("write");

    let err = client_for(&server)
        .upload_document(file.path())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BackendError::Rejected {
            message: "Unsupported file type".to_string(),
        }
    );
}

#[tokio::test]
async fn upload_non_json_response_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/"))
        .respond_with(
            ResponseTemplate::new(500).set_body_raw("<html>traceback</html>", "text/html"),
        )
        .mount(&server)
        .await;

    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(b"x").expect("write");

    let err = client_for(&server)
        .upload_document(file.path())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BackendError::NotJson {
            content_type: Some("text/html".to_string()),
        }
    );
}

#[tokio::test]
async fn upload_of_missing_file_never_touches_the_network() {
    let server = MockServer::start().await;

    let err = client_for(&server)
        .upload_document(std::path::Path::new("/nonexistent/nothing.pdf"))
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::File(_)));
    let requests = server.received_requests().await.expect("requests");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn chat_sends_expected_payload_and_parses_reply() {
    let server = MockServer::start().await;
    let expected_body = json!({
        "message": "What changed?",
        "provider": "gemini",
        "model": null,
        "document_ids": [2, 4],
        "k": 5
    });
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Chapter two was rewritten.",
            "sources": [
                {"text": "…", "document_id": 2, "order": 0, "score": 0.91},
                {"text": "…", "document_id": 4, "order": 3, "score": 0.77},
            ],
            "chunks_searched": 40,
            "chunks_used": 2
        })))
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .send_chat(&ChatRequest {
            message: "What changed?".to_string(),
            provider: "gemini".to_string(),
            model: None,
            document_ids: vec![2, 4],
            k: 5,
        })
        .await
        .expect("chat ok");

    assert_eq!(reply.answer.as_deref(), Some("Chapter two was rewritten."));
    assert_eq!(reply.source_count, 2);
    assert!(reply.raw_body.contains("chunks_searched"));
}

#[tokio::test]
async fn chat_error_payload_reports_no_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({
            "error": "provider quota exceeded",
            "answer": null
        })))
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .send_chat(&ChatRequest {
            message: "hi".to_string(),
            provider: "groq".to_string(),
            model: None,
            document_ids: Vec::new(),
            k: 5,
        })
        .await
        .expect("chat still parses");

    assert_eq!(reply.answer, None);
    assert_eq!(reply.source_count, 0);
    assert!(reply.raw_body.contains("provider quota exceeded"));
}

#[tokio::test]
async fn chat_non_json_body_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .send_chat(&ChatRequest {
            message: "hi".to_string(),
            provider: "gemini".to_string(),
            model: None,
            document_ids: Vec::new(),
            k: 5,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Invalid(_)));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"documents": []})),
        )
        .mount(&server)
        .await;

    let client = HttpBackend::new(BackendSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..BackendSettings::default()
    })
    .expect("client");

    let err = client.list_documents().await.unwrap_err();

    assert_eq!(err, BackendError::Timeout);
}

#[tokio::test]
async fn delete_ignores_failure_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/documents/5/delete/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&server)
        .await;

    client_for(&server)
        .delete_document(5)
        .await
        .expect("delete tolerated");
}
