use std::path::PathBuf;
use std::time::Duration;

use crate::{ConfirmAction, DocumentId, Provider};

/// Side effects requested by the state machine, executed by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the current document list.
    FetchDocuments,
    /// Upload the staged file.
    UploadFile { path: PathBuf },
    /// Delete these documents one at a time, in order.
    DeleteDocuments { ids: Vec<DocumentId> },
    /// Issue a chat request.
    SendChat {
        question: String,
        provider: Provider,
        document_ids: Vec<DocumentId>,
        top_k: usize,
    },
    /// Fire `Msg::UploadStageElapsed` after `delay`.
    ScheduleUploadAdvance { delay: Duration },
    /// Fire `Msg::UploadGraceElapsed` after `delay`.
    ScheduleUploadRelease { delay: Duration },
    /// Ask the user to confirm `action`; the answer comes back as
    /// `Msg::ConfirmResolved`.
    RequestConfirm {
        prompt: String,
        action: ConfirmAction,
    },
    /// Start a speech capture.
    StartRecognition,
    /// Read this text aloud.
    SpeakText { text: String },
    /// Stop any active speech playback.
    CancelSpeech,
}
