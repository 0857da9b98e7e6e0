use std::sync::mpsc;
use std::thread;

use chat_logging::{chat_info, chat_warn};
use docchat_core::{BackendFailure, ChatOutcome, ConfirmAction, Document, Effect, Msg};
use docchat_engine::{BackendError, ChatRequest, EngineEvent, EngineHandle};

/// Confirmation returned to the shell loop, which owns the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirm {
    pub prompt: String,
    pub action: ConfirmAction,
}

/// Executes state machine effects against the engine and maps engine
/// events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        Self { engine, msg_tx }
    }

    /// Runs every effect; a confirmation request is handed back instead
    /// of executed, since only the shell can ask the user.
    pub fn run(&self, effects: Vec<Effect>) -> Option<PendingConfirm> {
        let mut confirm = None;
        for effect in effects {
            match effect {
                Effect::FetchDocuments => {
                    chat_info!("FetchDocuments");
                    self.engine.fetch_documents();
                }
                Effect::UploadFile { path } => {
                    chat_info!("UploadFile path={:?}", path);
                    self.engine.upload(path);
                }
                Effect::DeleteDocuments { ids } => {
                    chat_info!("DeleteDocuments count={}", ids.len());
                    self.engine.delete_documents(ids);
                }
                Effect::SendChat {
                    question,
                    provider,
                    document_ids,
                    top_k,
                } => {
                    chat_info!(
                        "SendChat provider={} documents={} len={}",
                        provider,
                        document_ids.len(),
                        question.len()
                    );
                    self.engine.send_chat(ChatRequest {
                        message: question,
                        provider: provider.wire_name().to_string(),
                        model: None,
                        document_ids,
                        k: top_k,
                    });
                }
                Effect::ScheduleUploadAdvance { delay } => {
                    let tx = self.msg_tx.clone();
                    thread::spawn(move || {
                        thread::sleep(delay);
                        let _ = tx.send(Msg::UploadStageElapsed);
                    });
                }
                Effect::ScheduleUploadRelease { delay } => {
                    let tx = self.msg_tx.clone();
                    thread::spawn(move || {
                        thread::sleep(delay);
                        let _ = tx.send(Msg::UploadGraceElapsed);
                    });
                }
                Effect::RequestConfirm { prompt, action } => {
                    confirm = Some(PendingConfirm { prompt, action });
                }
                Effect::StartRecognition => {
                    chat_info!("StartRecognition");
                    self.engine.start_recognition();
                }
                Effect::SpeakText { text } => {
                    chat_info!("SpeakText len={}", text.len());
                    self.engine.speak(text);
                }
                Effect::CancelSpeech => {
                    self.engine.cancel_speech();
                }
            }
        }
        confirm
    }

    /// Polls the engine for one finished command.
    pub fn poll_event(&self) -> Option<Msg> {
        self.engine.try_recv().map(map_event)
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::DocumentsFetched(Ok(remote)) => {
            let documents = remote
                .into_iter()
                .map(|doc| Document {
                    id: doc.id,
                    name: doc.name,
                    chunk_count: 0,
                })
                .collect();
            Msg::DocumentsLoaded(Ok(documents))
        }
        EngineEvent::DocumentsFetched(Err(err)) => {
            chat_warn!("document list failed: {err}");
            Msg::DocumentsLoaded(Err(map_backend_error(err)))
        }
        EngineEvent::UploadFinished(Ok(receipt)) => Msg::UploadFinished(Ok(
            docchat_core::UploadReceipt {
                id: receipt.id,
                name: receipt.name,
                chunks: receipt.chunks,
            },
        )),
        EngineEvent::UploadFinished(Err(err)) => {
            chat_warn!("upload failed: {err}");
            Msg::UploadFinished(Err(map_backend_error(err)))
        }
        EngineEvent::DeletesFinished { requested } => Msg::DeletesFinished { requested },
        EngineEvent::ChatFinished(Ok(reply)) => Msg::ChatFinished(Ok(ChatOutcome {
            answer: reply.answer,
            raw_body: reply.raw_body,
            source_count: reply.source_count,
        })),
        EngineEvent::ChatFinished(Err(err)) => {
            chat_warn!("chat failed: {err}");
            Msg::ChatFinished(Err(map_backend_error(err)))
        }
        EngineEvent::RecognitionEnded(Ok(transcript)) => {
            let trimmed = transcript.trim();
            Msg::RecognitionFinished {
                transcript: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            }
        }
        EngineEvent::RecognitionEnded(Err(err)) => {
            chat_warn!("speech recognition failed: {err}");
            Msg::RecognitionFinished { transcript: None }
        }
        EngineEvent::SpeakingEnded(result) => {
            if let Err(err) = result {
                chat_warn!("speech playback failed: {err}");
            }
            Msg::SpeakingFinished
        }
    }
}

/// Reduces engine errors to the coarse classification the state machine
/// keys its wording on.
fn map_backend_error(err: BackendError) -> BackendFailure {
    match err {
        BackendError::NotJson { .. } => BackendFailure::ServerError,
        BackendError::Rejected { message } => BackendFailure::Rejected { message },
        other => BackendFailure::Transport {
            message: other.to_string(),
        },
    }
}
