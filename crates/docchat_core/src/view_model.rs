use crate::{DocumentId, Provider, SpeechMode, TranscriptEntry, UploadStage};

/// Snapshot of everything the shell needs to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub documents: Vec<DocumentRowView>,
    /// Present while an upload is running or its success is on display.
    pub upload: Option<UploadProgressView>,
    pub submit_enabled: bool,
    pub send_enabled: bool,
    /// True while a chat request is outstanding.
    pub awaiting_answer: bool,
    pub question_input: String,
    pub provider: Provider,
    pub speech: SpeechMode,
    pub mic_available: bool,
    pub speak_available: bool,
    pub staged_file_name: Option<String>,
    pub transcript: Vec<TranscriptEntry>,
    pub dirty: bool,
}

/// One row in the document selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRowView {
    pub id: DocumentId,
    pub name: String,
    pub chunk_count: u32,
    pub selected: bool,
}

/// Upload progress line shown while a job is running or just finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgressView {
    pub stage: UploadStage,
    pub percent: u8,
    pub label: String,
}
