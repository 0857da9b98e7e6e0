//! Docchat core: pure state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod types;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, CHAT_FAILURE_TEXT};
pub use types::{
    BackendFailure, ChatExchange, ChatOutcome, ConfirmAction, Document, DocumentId,
    ExchangeStatus, Notice, NoticeKind, Provider, SessionSettings, Speaker, SpeechCapabilities,
    SpeechMode, TranscriptEntry, UploadReceipt, UploadStage,
};
pub use update::update;
pub use view_model::{AppViewModel, DocumentRowView, UploadProgressView};
