use crate::{
    AppState, BackendFailure, ConfirmAction, Effect, Msg, NoticeKind, SpeechMode, UploadStage,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RefreshRequested => vec![Effect::FetchDocuments],
        Msg::DocumentsLoaded(Ok(documents)) => {
            state.apply_documents(documents);
            Vec::new()
        }
        Msg::DocumentsLoaded(Err(failure)) => {
            let kind = failure_notice_kind(&failure);
            state.push_notice(kind, format!("Could not load documents: {failure}"));
            Vec::new()
        }
        Msg::DocumentToggled(id) => {
            state.toggle_document(id);
            Vec::new()
        }
        Msg::DeleteRequested => {
            let ids = state.selected_ids();
            if ids.is_empty() {
                state.push_notice(
                    NoticeKind::UserInput,
                    "Please select documents to delete".to_string(),
                );
                Vec::new()
            } else {
                vec![Effect::RequestConfirm {
                    prompt: format!("Delete {} document(s)?", ids.len()),
                    action: ConfirmAction::DeleteDocuments { ids },
                }]
            }
        }
        Msg::ConfirmResolved { action, accepted } => match action {
            ConfirmAction::DeleteDocuments { ids } => {
                if accepted && !ids.is_empty() {
                    vec![Effect::DeleteDocuments { ids }]
                } else {
                    Vec::new()
                }
            }
            ConfirmAction::SearchAllDocuments { question } => {
                if accepted && !state.chat_in_flight() {
                    begin_send(&mut state, question)
                } else if !accepted {
                    state.push_notice(
                        NoticeKind::UserInput,
                        "Please select at least one document".to_string(),
                    );
                    Vec::new()
                } else {
                    Vec::new()
                }
            }
        },
        Msg::DeletesFinished { requested } => {
            state.record_deletes(requested);
            vec![Effect::FetchDocuments]
        }
        Msg::FileChosen(path) => {
            state.stage_file(path);
            Vec::new()
        }
        Msg::UploadSubmitted => {
            if state.upload_locked() {
                Vec::new()
            } else {
                match state.staged_file_path() {
                    None => {
                        state.push_notice(
                            NoticeKind::UserInput,
                            "Please select a file to upload".to_string(),
                        );
                        Vec::new()
                    }
                    Some(path) => {
                        let path = path.to_path_buf();
                        state.start_upload();
                        vec![Effect::UploadFile { path }]
                    }
                }
            }
        }
        Msg::UploadFinished(Ok(receipt)) => {
            if state.accept_upload(receipt) {
                vec![Effect::ScheduleUploadAdvance {
                    delay: state.upload_stage_delay(),
                }]
            } else {
                Vec::new()
            }
        }
        Msg::UploadFinished(Err(failure)) => {
            state.fail_upload(failure);
            Vec::new()
        }
        Msg::UploadStageElapsed => match state.advance_upload() {
            Some(UploadStage::Done) => vec![Effect::ScheduleUploadRelease {
                delay: state.upload_grace_delay(),
            }],
            Some(_) => vec![Effect::ScheduleUploadAdvance {
                delay: state.upload_stage_delay(),
            }],
            None => Vec::new(),
        },
        Msg::UploadGraceElapsed => {
            state.release_upload();
            Vec::new()
        }
        Msg::QuestionChanged(text) => {
            state.set_question(text);
            Vec::new()
        }
        Msg::ProviderChanged(provider) => {
            state.set_provider(provider);
            Vec::new()
        }
        Msg::SendRequested => {
            let question = state.question_input().trim().to_string();
            if question.is_empty() || state.chat_in_flight() {
                Vec::new()
            } else if state.has_documents() && state.selected_ids().is_empty() {
                vec![Effect::RequestConfirm {
                    prompt: "No documents selected. Do you want to search all documents?"
                        .to_string(),
                    action: ConfirmAction::SearchAllDocuments { question },
                }]
            } else {
                begin_send(&mut state, question)
            }
        }
        Msg::ChatFinished(result) => {
            state.resolve_chat(result);
            Vec::new()
        }
        Msg::MicPressed => {
            if !state.capabilities().recognition {
                state.push_notice(
                    NoticeKind::Platform,
                    "Speech recognition is not available on this system".to_string(),
                );
                Vec::new()
            } else {
                match state.speech() {
                    SpeechMode::Listening => Vec::new(),
                    SpeechMode::Speaking => {
                        state.set_speech(SpeechMode::Listening);
                        vec![Effect::CancelSpeech, Effect::StartRecognition]
                    }
                    SpeechMode::Idle => {
                        state.set_speech(SpeechMode::Listening);
                        vec![Effect::StartRecognition]
                    }
                }
            }
        }
        Msg::RecognitionFinished { transcript } => {
            if state.speech() == SpeechMode::Listening {
                state.set_speech(SpeechMode::Idle);
            }
            if let Some(text) = transcript {
                state.set_question(text);
            }
            Vec::new()
        }
        Msg::SpeakPressed => match state.speech() {
            SpeechMode::Speaking => {
                state.set_speech(SpeechMode::Idle);
                vec![Effect::CancelSpeech]
            }
            SpeechMode::Listening => Vec::new(),
            SpeechMode::Idle => match state.speakable_text() {
                None => Vec::new(),
                Some(text) => {
                    if !state.capabilities().synthesis {
                        state.push_notice(
                            NoticeKind::Platform,
                            "Speech synthesis is not available on this system".to_string(),
                        );
                        Vec::new()
                    } else {
                        state.set_speech(SpeechMode::Speaking);
                        vec![Effect::CancelSpeech, Effect::SpeakText { text }]
                    }
                }
            },
        },
        Msg::SpeakingFinished => {
            if state.speech() == SpeechMode::Speaking {
                state.set_speech(SpeechMode::Idle);
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn begin_send(state: &mut AppState, question: String) -> Vec<Effect> {
    let document_ids = state.selected_ids();
    let provider = state.provider();
    let top_k = state.top_k();
    state.begin_exchange(question.clone());
    vec![Effect::SendChat {
        question,
        provider,
        document_ids,
        top_k,
    }]
}

fn failure_notice_kind(failure: &BackendFailure) -> NoticeKind {
    match failure {
        BackendFailure::Rejected { .. } => NoticeKind::Backend,
        BackendFailure::Transport { .. } | BackendFailure::ServerError => NoticeKind::Transport,
    }
}
