use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use chat_logging::chat_warn;

use crate::backend::BackendClient;
use crate::speech::{SpeechRecognizer, SpeechSynthesizer};
use crate::{ChatRequest, EngineEvent, SpeechError};

enum EngineCommand {
    FetchDocuments,
    Upload { path: PathBuf },
    DeleteDocuments { ids: Vec<i64> },
    Chat { request: ChatRequest },
    Listen,
    Speak { text: String },
    CancelSpeech,
}

/// Handle to the engine thread: commands in, events out.
///
/// The engine owns a tokio runtime on a dedicated thread; the UI loop
/// stays synchronous and polls [`EngineHandle::try_recv`].
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(
        backend: Arc<dyn BackendClient>,
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                // Cancellation must land before any queued speak command
                // runs, so it is applied here instead of being spawned.
                if matches!(command, EngineCommand::CancelSpeech) {
                    if let Some(synthesizer) = synthesizer.as_deref() {
                        synthesizer.cancel();
                    }
                    continue;
                }
                let backend = backend.clone();
                let recognizer = recognizer.clone();
                let synthesizer = synthesizer.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(backend.as_ref(), recognizer, synthesizer, command, event_tx)
                        .await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn fetch_documents(&self) {
        let _ = self.cmd_tx.send(EngineCommand::FetchDocuments);
    }

    pub fn upload(&self, path: PathBuf) {
        let _ = self.cmd_tx.send(EngineCommand::Upload { path });
    }

    pub fn delete_documents(&self, ids: Vec<i64>) {
        let _ = self.cmd_tx.send(EngineCommand::DeleteDocuments { ids });
    }

    pub fn send_chat(&self, request: ChatRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Chat { request });
    }

    pub fn start_recognition(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Listen);
    }

    pub fn speak(&self, text: String) {
        let _ = self.cmd_tx.send(EngineCommand::Speak { text });
    }

    pub fn cancel_speech(&self) {
        let _ = self.cmd_tx.send(EngineCommand::CancelSpeech);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

async fn handle_command(
    backend: &dyn BackendClient,
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::FetchDocuments => {
            let result = backend.list_documents().await;
            let _ = event_tx.send(EngineEvent::DocumentsFetched(result));
        }
        EngineCommand::Upload { path } => {
            let result = backend.upload_document(&path).await;
            let _ = event_tx.send(EngineEvent::UploadFinished(result));
        }
        EngineCommand::DeleteDocuments { ids } => {
            let requested = ids.len();
            // One call per id, strictly in order; a failed delete is
            // logged and the batch keeps going.
            for id in ids {
                if let Err(err) = backend.delete_document(id).await {
                    chat_warn!("delete of document {id} failed: {err}");
                }
            }
            let _ = event_tx.send(EngineEvent::DeletesFinished { requested });
        }
        EngineCommand::Chat { request } => {
            let result = backend.send_chat(&request).await;
            let _ = event_tx.send(EngineEvent::ChatFinished(result));
        }
        EngineCommand::Listen => {
            let result = match recognizer {
                Some(recognizer) => recognizer.listen().await,
                None => Err(SpeechError::Unavailable(
                    "no recognizer configured".to_string(),
                )),
            };
            let _ = event_tx.send(EngineEvent::RecognitionEnded(result));
        }
        EngineCommand::Speak { text } => {
            let result = match synthesizer {
                Some(synthesizer) => synthesizer.speak(&text).await,
                None => Err(SpeechError::Unavailable(
                    "no synthesizer configured".to_string(),
                )),
            };
            let _ = event_tx.send(EngineEvent::SpeakingEnded(result));
        }
        // Handled synchronously by the dispatcher loop.
        EngineCommand::CancelSpeech => {}
    }
}
