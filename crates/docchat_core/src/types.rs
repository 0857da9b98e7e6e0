use std::fmt;
use std::time::Duration;

/// Backend-assigned identifier for a stored document.
pub type DocumentId = i64;

/// One document known to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    /// Chunk count reported at upload time; zero when the list endpoint
    /// did not include one.
    pub chunk_count: u32,
}

/// Progress stages for the upload pipeline.
///
/// Only `Idle -> Uploading` and the terminal outcomes reflect real backend
/// transitions. The stages between the upload response and `Done` are a
/// presentation cascade driven by timers so the user can follow what the
/// backend did in one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadStage {
    #[default]
    Idle,
    Uploading,
    Processing,
    Chunking,
    Embedding,
    Storing,
    Done,
    Failed,
}

impl UploadStage {
    /// Progress percentage shown next to the stage label.
    pub fn percent(self) -> u8 {
        match self {
            UploadStage::Idle | UploadStage::Failed => 0,
            UploadStage::Uploading => 10,
            UploadStage::Processing => 30,
            UploadStage::Chunking => 50,
            UploadStage::Embedding => 70,
            UploadStage::Storing => 90,
            UploadStage::Done => 100,
        }
    }

    /// Progress line shown while the stage is current.
    pub fn progress_label(self) -> &'static str {
        match self {
            UploadStage::Idle => "",
            UploadStage::Uploading => "Uploading file...",
            UploadStage::Processing => "Processing document...",
            UploadStage::Chunking => "Creating text chunks...",
            UploadStage::Embedding => "Generating embeddings...",
            UploadStage::Storing => "Storing in vector database...",
            UploadStage::Done => "Success!",
            UploadStage::Failed => "Upload failed",
        }
    }

    /// Next stage in the timed cascade, `None` outside it.
    pub fn next_in_cascade(self) -> Option<UploadStage> {
        match self {
            UploadStage::Processing => Some(UploadStage::Chunking),
            UploadStage::Chunking => Some(UploadStage::Embedding),
            UploadStage::Embedding => Some(UploadStage::Storing),
            UploadStage::Storing => Some(UploadStage::Done),
            _ => None,
        }
    }

    /// True while an upload job is running (request or cascade).
    pub fn in_flight(self) -> bool {
        matches!(
            self,
            UploadStage::Uploading
                | UploadStage::Processing
                | UploadStage::Chunking
                | UploadStage::Embedding
                | UploadStage::Storing
        )
    }
}

/// Answer provider offered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Gemini,
    Groq,
}

impl Provider {
    /// Wire name expected by the chat endpoint.
    pub fn wire_name(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Groq => "groq",
        }
    }

    /// Parses a provider name as written in config files or commands.
    pub fn from_name(name: &str) -> Option<Provider> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gemini" => Some(Provider::Gemini),
            "groq" => Some(Provider::Groq),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Gemini => "Gemini",
            Provider::Groq => "Groq",
        };
        write!(f, "{name}")
    }
}

/// Exclusive speech modes; listening and speaking never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeechMode {
    #[default]
    Idle,
    Listening,
    Speaking,
}

/// Who produced a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
    System,
}

/// One line in the conversation display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

/// Lifecycle of one question/answer pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeStatus {
    Pending,
    Answered,
    Failed,
}

/// One question/answer pair tracked by the chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatExchange {
    pub question: String,
    /// Text rendered for the answer, including the raw-body fallback.
    pub answer: Option<String>,
    pub status: ExchangeStatus,
    /// Number of source chunks reported alongside the answer.
    pub source_count: usize,
}

/// Classification for user-facing notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The user asked for something invalid; fix the input and retry.
    UserInput,
    /// The request never completed (network, timeout, malformed body).
    Transport,
    /// The backend answered with a structured error payload.
    Backend,
    /// The platform lacks a speech capability.
    Platform,
}

/// A one-shot message surfaced to the user outside the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

/// Failure summary for backend calls, as seen by the state machine.
///
/// The app layer maps rich engine errors down to this; the state machine
/// only needs enough to pick wording and classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendFailure {
    /// The call never completed cleanly (network, timeout, bad body).
    Transport { message: String },
    /// The backend returned a structured `{error}` payload.
    Rejected { message: String },
    /// The response was not JSON at all; the backend is likely down.
    ServerError,
}

impl fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendFailure::Transport { message } => write!(f, "{message}"),
            BackendFailure::Rejected { message } => write!(f, "{message}"),
            BackendFailure::ServerError => write!(f, "server returned a non-JSON response"),
        }
    }
}

/// Successful upload summary returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub id: DocumentId,
    pub name: String,
    pub chunks: u32,
}

/// Successful chat response, reduced to what rendering needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutcome {
    /// Answer text; `None` or empty means the payload had no usable
    /// answer field and the raw body is rendered instead.
    pub answer: Option<String>,
    /// Raw response body, used as the fallback rendering.
    pub raw_body: String,
    /// Number of retrieved source chunks reported by the backend.
    pub source_count: usize,
}

/// Pending action waiting on a yes/no answer from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Delete these documents once confirmed.
    DeleteDocuments { ids: Vec<DocumentId> },
    /// Send this question against all documents once confirmed.
    SearchAllDocuments { question: String },
}

/// Tunable knobs for one chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Delay between cosmetic upload stages.
    pub upload_stage_delay: Duration,
    /// How long `Done` stays visible before the upload form unlocks.
    pub upload_grace_delay: Duration,
    /// Number of chunks requested per chat query.
    pub top_k: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            upload_stage_delay: Duration::from_millis(300),
            upload_grace_delay: Duration::from_secs(2),
            top_k: 5,
        }
    }
}

/// Which speech features the platform offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeechCapabilities {
    pub recognition: bool,
    pub synthesis: bool,
}
