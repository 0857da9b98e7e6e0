use std::path::Path;
use std::time::Duration;

use chat_logging::chat_warn;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart;

use crate::{
    BackendError, ChatReply, ChatRequest, DocumentListResponse, RemoteDocument, UploadOutcome,
    UploadReceipt,
};

/// Connection settings for the document backend.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Generous by default: answer generation can take a while.
    pub request_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

#[async_trait::async_trait]
pub trait BackendClient: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<RemoteDocument>, BackendError>;
    async fn upload_document(&self, path: &Path) -> Result<UploadReceipt, BackendError>;
    async fn delete_document(&self, id: i64) -> Result<(), BackendError>;
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError>;
}

/// HTTP client for the document backend's REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::Network(err.to_string()))?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl BackendClient for HttpBackend {
    async fn list_documents(&self) -> Result<Vec<RemoteDocument>, BackendError> {
        let response = self
            .client
            .get(self.endpoint("/documents/"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = response.text().await.map_err(map_reqwest_error)?;
        let parsed: DocumentListResponse =
            serde_json::from_str(&body).map_err(|err| BackendError::Invalid(err.to_string()))?;
        Ok(parsed.documents)
    }

    async fn upload_document(&self, path: &Path) -> Result<UploadReceipt, BackendError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| BackendError::File(err.to_string()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());
        let part = multipart::Part::bytes(bytes).file_name(file_name);
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("/upload/"))
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        // A non-JSON answer here means the backend itself fell over;
        // the status code is useless in that case.
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        let is_json = content_type
            .as_deref()
            .is_some_and(|value| value.contains("application/json"));
        if !is_json {
            return Err(BackendError::NotJson { content_type });
        }

        let body = response.text().await.map_err(map_reqwest_error)?;
        match serde_json::from_str::<UploadOutcome>(&body) {
            Ok(UploadOutcome::Rejected { error }) => Err(BackendError::Rejected { message: error }),
            Ok(UploadOutcome::Accepted(receipt)) => Ok(receipt),
            Err(err) => Err(BackendError::Invalid(err.to_string())),
        }
    }

    async fn delete_document(&self, id: i64) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("/documents/{id}/delete/")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        // Per-item failures are not surfaced to the user; the batch
        // reports its requested count either way.
        if !response.status().is_success() {
            chat_warn!(
                "delete of document {id} answered {}",
                response.status()
            );
        }
        Ok(())
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let response = self
            .client
            .post(self.endpoint("/chat/"))
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = response.text().await.map_err(map_reqwest_error)?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|err| BackendError::Invalid(err.to_string()))?;
        let answer = value
            .get("answer")
            .and_then(|answer| answer.as_str())
            .map(ToOwned::to_owned);
        let source_count = value
            .get("sources")
            .and_then(|sources| sources.as_array())
            .map_or(0, Vec::len);
        Ok(ChatReply {
            answer,
            source_count,
            raw_body: body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::Timeout;
    }
    BackendError::Network(err.to_string())
}
