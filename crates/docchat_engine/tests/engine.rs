use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use docchat_engine::{
    BackendClient, BackendError, BackendSettings, ChatReply, ChatRequest, EngineEvent,
    EngineHandle, HttpBackend, RemoteDocument, SpeechError, SpeechRecognizer, SpeechSynthesizer,
    UploadReceipt,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Polls the handle until an event arrives. The sleep must be async so
/// the mock server keeps serving on the test runtime.
async fn wait_event(handle: &EngineHandle) -> EngineEvent {
    for _ in 0..500 {
        if let Some(event) = handle.try_recv() {
            return event;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no engine event within 5s");
}

struct StubBackend;

#[async_trait::async_trait]
impl BackendClient for StubBackend {
    async fn list_documents(&self) -> Result<Vec<RemoteDocument>, BackendError> {
        Ok(Vec::new())
    }

    async fn upload_document(&self, _path: &Path) -> Result<UploadReceipt, BackendError> {
        Err(BackendError::Network("stub".to_string()))
    }

    async fn delete_document(&self, _id: i64) -> Result<(), BackendError> {
        Ok(())
    }

    async fn send_chat(&self, _request: &ChatRequest) -> Result<ChatReply, BackendError> {
        Err(BackendError::Network("stub".to_string()))
    }
}

struct MockRecognizer;

#[async_trait::async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn listen(&self) -> Result<String, SpeechError> {
        Ok("spoken words".to_string())
    }
}

/// Synthesizer whose speak call only returns once it has been cancelled.
struct BlockingSynthesizer {
    cancelled: AtomicBool,
}

#[async_trait::async_trait]
impl SpeechSynthesizer for BlockingSynthesizer {
    async fn speak(&self, _text: &str) -> Result<(), SpeechError> {
        for _ in 0..500 {
            if self.cancelled.load(Ordering::SeqCst) {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Err(SpeechError::Engine("never cancelled".to_string()))
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

struct InstantSynthesizer;

#[async_trait::async_trait]
impl SpeechSynthesizer for InstantSynthesizer {
    async fn speak(&self, _text: &str) -> Result<(), SpeechError> {
        Ok(())
    }

    fn cancel(&self) {}
}

fn http_handle(server: &MockServer) -> EngineHandle {
    let client = HttpBackend::new(BackendSettings {
        base_url: server.uri(),
        ..BackendSettings::default()
    })
    .expect("client");
    EngineHandle::new(Arc::new(client), None, None)
}

#[tokio::test]
async fn fetch_documents_round_trips_through_the_engine_thread() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{"id": 3, "name": "notes.txt"}]
        })))
        .mount(&server)
        .await;

    let handle = http_handle(&server);
    handle.fetch_documents();

    match wait_event(&handle).await {
        EngineEvent::DocumentsFetched(Ok(documents)) => {
            assert_eq!(
                documents,
                vec![RemoteDocument {
                    id: 3,
                    name: "notes.txt".to_string(),
                }]
            );
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn deletes_run_one_by_one_in_selection_order() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/documents/3/delete/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "gone"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/documents/7/delete/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "gone"})))
        .mount(&server)
        .await;

    let handle = http_handle(&server);
    handle.delete_documents(vec![3, 7]);

    match wait_event(&handle).await {
        EngineEvent::DeletesFinished { requested } => assert_eq!(requested, 2),
        other => panic!("unexpected event: {other:?}"),
    }

    let requests = server.received_requests().await.expect("requests");
    let paths: Vec<String> = requests.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(paths, vec!["/documents/3/delete/", "/documents/7/delete/"]);
}

#[tokio::test]
async fn failed_delete_does_not_stop_the_batch() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/documents/1/delete/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/documents/2/delete/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "gone"})))
        .mount(&server)
        .await;

    let handle = http_handle(&server);
    handle.delete_documents(vec![1, 2]);

    match wait_event(&handle).await {
        EngineEvent::DeletesFinished { requested } => assert_eq!(requested, 2),
        other => panic!("unexpected event: {other:?}"),
    }

    let requests = server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn listen_without_a_recognizer_reports_unavailable() {
    let handle = EngineHandle::new(Arc::new(StubBackend), None, None);
    handle.start_recognition();

    match wait_event(&handle).await {
        EngineEvent::RecognitionEnded(Err(SpeechError::Unavailable(_))) => {}
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn listen_returns_the_recognized_transcript() {
    let handle = EngineHandle::new(Arc::new(StubBackend), Some(Arc::new(MockRecognizer)), None);
    handle.start_recognition();

    match wait_event(&handle).await {
        EngineEvent::RecognitionEnded(Ok(transcript)) => assert_eq!(transcript, "spoken words"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn speak_without_a_synthesizer_reports_unavailable() {
    let handle = EngineHandle::new(Arc::new(StubBackend), None, None);
    handle.speak("hello".to_string());

    match wait_event(&handle).await {
        EngineEvent::SpeakingEnded(Err(SpeechError::Unavailable(_))) => {}
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn speak_reports_completion() {
    let handle = EngineHandle::new(Arc::new(StubBackend), None, Some(Arc::new(InstantSynthesizer)));
    handle.speak("hello".to_string());

    match wait_event(&handle).await {
        EngineEvent::SpeakingEnded(Ok(())) => {}
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn cancel_interrupts_an_in_flight_speak() {
    let synthesizer = Arc::new(BlockingSynthesizer {
        cancelled: AtomicBool::new(false),
    });
    let handle = EngineHandle::new(Arc::new(StubBackend), None, Some(synthesizer.clone()));

    handle.speak("a very long sentence".to_string());
    handle.cancel_speech();

    match wait_event(&handle).await {
        EngineEvent::SpeakingEnded(Ok(())) => {}
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(synthesizer.cancelled.load(Ordering::SeqCst));
}
