use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::view_model::{AppViewModel, DocumentRowView, UploadProgressView};
use crate::{
    BackendFailure, ChatExchange, ChatOutcome, Document, DocumentId, ExchangeStatus, Notice,
    NoticeKind, Provider, SessionSettings, Speaker, SpeechCapabilities, SpeechMode,
    TranscriptEntry, UploadReceipt, UploadStage,
};

/// Transcript line appended when a chat request fails outright.
pub const CHAT_FAILURE_TEXT: &str = "Error: Could not get response. Please try again.";

/// All session state, mutated only through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    settings: SessionSettings,
    capabilities: SpeechCapabilities,
    documents: Vec<Document>,
    selection: BTreeSet<DocumentId>,
    staged_file: Option<PathBuf>,
    upload_stage: UploadStage,
    pending_receipt: Option<UploadReceipt>,
    completed_chunks: Option<u32>,
    question_input: String,
    provider: Provider,
    transcript: Vec<TranscriptEntry>,
    exchanges: Vec<ChatExchange>,
    chat_in_flight: bool,
    speech: SpeechMode,
    last_answer: Option<String>,
    notices: Vec<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new(settings: SessionSettings, capabilities: SpeechCapabilities) -> Self {
        Self {
            settings,
            capabilities,
            documents: Vec::new(),
            selection: BTreeSet::new(),
            staged_file: None,
            upload_stage: UploadStage::Idle,
            pending_receipt: None,
            completed_chunks: None,
            question_input: String::new(),
            provider: Provider::default(),
            transcript: Vec::new(),
            exchanges: Vec::new(),
            chat_in_flight: false,
            speech: SpeechMode::Idle,
            last_answer: None,
            notices: Vec::new(),
            dirty: false,
        }
    }

    /// Builds the render snapshot for the shell.
    pub fn view(&self) -> AppViewModel {
        let documents = self
            .documents
            .iter()
            .map(|doc| DocumentRowView {
                id: doc.id,
                name: doc.name.clone(),
                chunk_count: doc.chunk_count,
                selected: self.selection.contains(&doc.id),
            })
            .collect();

        let upload = match self.upload_stage {
            UploadStage::Idle | UploadStage::Failed => None,
            UploadStage::Done => Some(UploadProgressView {
                stage: UploadStage::Done,
                percent: UploadStage::Done.percent(),
                label: format!(
                    "Success! Created {} chunks",
                    self.completed_chunks.unwrap_or(0)
                ),
            }),
            stage => Some(UploadProgressView {
                stage,
                percent: stage.percent(),
                label: stage.progress_label().to_string(),
            }),
        };

        AppViewModel {
            documents,
            upload,
            submit_enabled: !self.upload_locked(),
            send_enabled: !self.chat_in_flight,
            awaiting_answer: self.chat_in_flight,
            question_input: self.question_input.clone(),
            provider: self.provider,
            speech: self.speech,
            mic_available: self.capabilities.recognition,
            speak_available: self.capabilities.synthesis,
            staged_file_name: self.staged_file.as_deref().map(display_name),
            transcript: self.transcript.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns and clears the dirty flag; the shell re-renders when true.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Takes all queued notices for display.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn exchanges(&self) -> &[ChatExchange] {
        &self.exchanges
    }

    /// Selected document ids in document-list order, not selection order.
    pub fn selected_ids(&self) -> Vec<DocumentId> {
        self.documents
            .iter()
            .filter(|doc| self.selection.contains(&doc.id))
            .map(|doc| doc.id)
            .collect()
    }

    /// Most recent answer text as stored for read-aloud; empty after a
    /// fallback rendering.
    pub fn last_answer(&self) -> Option<&str> {
        self.last_answer.as_deref()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn push_notice(&mut self, kind: NoticeKind, text: String) {
        self.notices.push(Notice { kind, text });
        self.mark_dirty();
    }

    pub(crate) fn push_transcript(&mut self, speaker: Speaker, text: String) {
        self.transcript.push(TranscriptEntry { speaker, text });
        self.mark_dirty();
    }

    // --- document registry ---

    pub(crate) fn has_documents(&self) -> bool {
        !self.documents.is_empty()
    }

    /// Replaces the list wholesale; any previous selection is discarded.
    pub(crate) fn apply_documents(&mut self, documents: Vec<Document>) {
        self.documents = documents;
        self.selection.clear();
        self.mark_dirty();
    }

    /// Toggles a known id in the selection; unknown ids are ignored.
    pub(crate) fn toggle_document(&mut self, id: DocumentId) {
        if !self.documents.iter().any(|doc| doc.id == id) {
            return;
        }
        if !self.selection.remove(&id) {
            self.selection.insert(id);
        }
        self.mark_dirty();
    }

    pub(crate) fn record_deletes(&mut self, requested: usize) {
        self.push_transcript(
            Speaker::System,
            format!("Deleted {requested} document(s)"),
        );
    }

    // --- upload pipeline ---

    pub(crate) fn staged_file_path(&self) -> Option<&Path> {
        self.staged_file.as_deref()
    }

    pub(crate) fn stage_file(&mut self, path: PathBuf) {
        self.staged_file = Some(path);
        self.mark_dirty();
    }

    /// True while the submit control is locked: an upload is running or
    /// the success state is still on display.
    pub(crate) fn upload_locked(&self) -> bool {
        self.upload_stage.in_flight() || self.upload_stage == UploadStage::Done
    }

    pub(crate) fn start_upload(&mut self) {
        self.upload_stage = UploadStage::Uploading;
        self.pending_receipt = None;
        self.completed_chunks = None;
        self.mark_dirty();
    }

    /// Moves an in-flight upload into the cascade. Returns false for a
    /// stale completion that no longer matches the current stage.
    pub(crate) fn accept_upload(&mut self, receipt: UploadReceipt) -> bool {
        if self.upload_stage != UploadStage::Uploading {
            return false;
        }
        self.upload_stage = UploadStage::Processing;
        self.pending_receipt = Some(receipt);
        self.mark_dirty();
        true
    }

    pub(crate) fn fail_upload(&mut self, failure: BackendFailure) {
        if self.upload_stage != UploadStage::Uploading {
            return;
        }
        self.upload_stage = UploadStage::Failed;
        self.pending_receipt = None;
        let (kind, text) = match failure {
            BackendFailure::ServerError => (
                NoticeKind::Transport,
                "Server error: please check the logs and restart the server".to_string(),
            ),
            BackendFailure::Rejected { message } => {
                (NoticeKind::Backend, format!("Error: {message}"))
            }
            BackendFailure::Transport { message } => {
                (NoticeKind::Transport, format!("Upload failed: {message}"))
            }
        };
        self.push_notice(kind, text);
    }

    /// Advances the cascade one stage. Reaching `Done` registers the new
    /// document, selects it and clears the staged file.
    pub(crate) fn advance_upload(&mut self) -> Option<UploadStage> {
        let next = self.upload_stage.next_in_cascade()?;
        self.upload_stage = next;
        if next == UploadStage::Done {
            if let Some(receipt) = self.pending_receipt.take() {
                self.completed_chunks = Some(receipt.chunks);
                self.register_document(receipt);
            }
            self.staged_file = None;
        }
        self.mark_dirty();
        Some(next)
    }

    pub(crate) fn release_upload(&mut self) {
        if self.upload_stage == UploadStage::Done {
            self.upload_stage = UploadStage::Idle;
            self.completed_chunks = None;
            self.mark_dirty();
        }
    }

    fn register_document(&mut self, receipt: UploadReceipt) {
        self.documents.retain(|doc| doc.id != receipt.id);
        self.documents.push(Document {
            id: receipt.id,
            name: receipt.name.clone(),
            chunk_count: receipt.chunks,
        });
        self.selection.insert(receipt.id);
        self.push_transcript(
            Speaker::System,
            format!(
                "Document ready: {} processed into {} searchable chunks. \
                 You can now ask questions about it.",
                receipt.name, receipt.chunks
            ),
        );
    }

    // --- chat session ---

    pub(crate) fn question_input(&self) -> &str {
        &self.question_input
    }

    pub(crate) fn set_question(&mut self, text: String) {
        self.question_input = text;
        self.mark_dirty();
    }

    pub(crate) fn provider(&self) -> Provider {
        self.provider
    }

    pub(crate) fn set_provider(&mut self, provider: Provider) {
        self.provider = provider;
        self.mark_dirty();
    }

    pub(crate) fn chat_in_flight(&self) -> bool {
        self.chat_in_flight
    }

    pub(crate) fn begin_exchange(&mut self, question: String) {
        self.push_transcript(Speaker::User, question.clone());
        self.exchanges.push(ChatExchange {
            question,
            answer: None,
            status: ExchangeStatus::Pending,
            source_count: 0,
        });
        self.chat_in_flight = true;
        self.question_input.clear();
        self.mark_dirty();
    }

    /// Applies a chat result to the pending exchange. A success without a
    /// usable answer field renders the raw body and remembers an empty
    /// last answer, so read-aloud falls back to the input text.
    pub(crate) fn resolve_chat(&mut self, result: Result<ChatOutcome, BackendFailure>) {
        if !self.chat_in_flight {
            return;
        }
        self.chat_in_flight = false;
        match result {
            Ok(outcome) => {
                let rendered = match outcome.answer.as_deref() {
                    Some(answer) if !answer.is_empty() => answer.to_string(),
                    _ => outcome.raw_body.clone(),
                };
                self.push_transcript(Speaker::Bot, rendered.clone());
                self.last_answer = Some(outcome.answer.unwrap_or_default());
                if let Some(exchange) = self.exchanges.last_mut() {
                    exchange.answer = Some(rendered);
                    exchange.status = ExchangeStatus::Answered;
                    exchange.source_count = outcome.source_count;
                }
            }
            Err(_) => {
                self.push_transcript(Speaker::Bot, CHAT_FAILURE_TEXT.to_string());
                if let Some(exchange) = self.exchanges.last_mut() {
                    exchange.status = ExchangeStatus::Failed;
                }
            }
        }
        self.mark_dirty();
    }

    // --- speech ---

    pub(crate) fn capabilities(&self) -> SpeechCapabilities {
        self.capabilities
    }

    pub(crate) fn speech(&self) -> SpeechMode {
        self.speech
    }

    pub(crate) fn set_speech(&mut self, mode: SpeechMode) {
        self.speech = mode;
        self.mark_dirty();
    }

    /// Text the read-aloud control would speak right now: the last answer,
    /// falling back to the trimmed input text.
    pub(crate) fn speakable_text(&self) -> Option<String> {
        self.last_answer
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(ToOwned::to_owned)
            .or_else(|| {
                let trimmed = self.question_input.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
    }

    // --- settings ---

    pub(crate) fn upload_stage_delay(&self) -> Duration {
        self.settings.upload_stage_delay
    }

    pub(crate) fn upload_grace_delay(&self) -> Duration {
        self.settings.upload_grace_delay
    }

    pub(crate) fn top_k(&self) -> usize {
        self.settings.top_k
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
