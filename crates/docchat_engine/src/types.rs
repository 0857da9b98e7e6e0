use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Document row as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteDocument {
    pub id: i64,
    pub name: String,
}

/// Body of `GET /documents/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentListResponse {
    #[serde(default)]
    pub documents: Vec<RemoteDocument>,
}

/// Success body of `POST /upload/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub chunks: u32,
}

/// The upload endpoint answers with a receipt or an `{"error": ...}`
/// payload; rejections keep the JSON shape even on 4xx/5xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UploadOutcome {
    Rejected { error: String },
    Accepted(UploadReceipt),
}

/// Request body for `POST /chat/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub provider: String,
    /// Serialized as `null`; the backend picks its default model.
    pub model: Option<String>,
    pub document_ids: Vec<i64>,
    pub k: usize,
}

/// Chat response, parsed leniently. The raw body is kept so the caller
/// can render it when no usable `answer` field is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub answer: Option<String>,
    pub source_count: usize,
    pub raw_body: String,
}

/// Errors from the HTTP backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("response was not JSON (content type: {content_type:?})")]
    NotJson { content_type: Option<String> },
    #[error("{message}")]
    Rejected { message: String },
    #[error("malformed response body: {0}")]
    Invalid(String),
    #[error("could not read file: {0}")]
    File(String),
}

/// Errors from the speech subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("speech program not available: {0}")]
    Unavailable(String),
    #[error("speech program failed: {0}")]
    Engine(String),
}

/// Events flowing back from the engine thread to the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    DocumentsFetched(Result<Vec<RemoteDocument>, BackendError>),
    UploadFinished(Result<UploadReceipt, BackendError>),
    /// Every delete in the batch has been attempted, in order.
    DeletesFinished { requested: usize },
    ChatFinished(Result<ChatReply, BackendError>),
    RecognitionEnded(Result<String, SpeechError>),
    SpeakingEnded(Result<(), SpeechError>),
}
