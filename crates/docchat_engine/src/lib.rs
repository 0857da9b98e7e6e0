//! Docchat engine: backend IO and speech effect execution.
mod backend;
mod engine;
mod speech;
mod types;

pub use backend::{BackendClient, BackendSettings, HttpBackend};
pub use engine::EngineHandle;
pub use speech::{
    CommandRecognizer, CommandSynthesizer, SpeechRecognizer, SpeechSettings, SpeechSynthesizer,
};
pub use types::{
    BackendError, ChatReply, ChatRequest, DocumentListResponse, EngineEvent, RemoteDocument,
    SpeechError, UploadOutcome, UploadReceipt,
};
