#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked for the document list to be reloaded.
    RefreshRequested,
    /// Document list arrived, or failed to.
    DocumentsLoaded(Result<Vec<crate::Document>, crate::BackendFailure>),
    /// User toggled one document checkbox.
    DocumentToggled(crate::DocumentId),
    /// User asked to delete the selected documents.
    DeleteRequested,
    /// Every delete call in one batch has been attempted.
    DeletesFinished { requested: usize },
    /// A confirmation prompt was answered.
    ConfirmResolved {
        action: crate::ConfirmAction,
        accepted: bool,
    },
    /// User staged a file for upload.
    FileChosen(std::path::PathBuf),
    /// User submitted the upload form.
    UploadSubmitted,
    /// The upload request finished.
    UploadFinished(Result<crate::UploadReceipt, crate::BackendFailure>),
    /// A cosmetic upload stage timer fired.
    UploadStageElapsed,
    /// The post-success grace timer fired; the upload form unlocks.
    UploadGraceElapsed,
    /// User edited the question input.
    QuestionChanged(String),
    /// User picked a different answer provider.
    ProviderChanged(crate::Provider),
    /// User asked to send the current question.
    SendRequested,
    /// The chat request finished.
    ChatFinished(Result<crate::ChatOutcome, crate::BackendFailure>),
    /// User pressed the microphone control.
    MicPressed,
    /// Speech capture ended; `None` means nothing usable was heard.
    RecognitionFinished { transcript: Option<String> },
    /// User pressed the read-aloud control.
    SpeakPressed,
    /// Speech playback ended, naturally or by cancellation.
    SpeakingFinished,
    /// Fallback for placeholder wiring.
    NoOp,
}
