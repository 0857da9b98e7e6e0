use std::io::BufRead;
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chat_logging::{chat_info, chat_warn};
use docchat_core::{update, AppState, Msg, SpeechCapabilities};
use docchat_engine::{
    CommandRecognizer, CommandSynthesizer, EngineHandle, HttpBackend, SpeechRecognizer,
    SpeechSettings, SpeechSynthesizer,
};

use crate::commands::{self, ParsedLine};
use crate::config;
use crate::effects::{EffectRunner, PendingConfirm};
use crate::render;

pub fn run_app() -> anyhow::Result<()> {
    let (config, notes) = config::load();
    crate::logging::initialize(config.log.destination);
    for note in &notes {
        chat_warn!("{note}");
    }
    chat_info!("docchat starting; backend at {}", config.backend.base_url);

    let backend = HttpBackend::new(config.backend_settings())?;
    let speech = config.speech_settings();
    let recognizer = build_recognizer(&speech);
    let synthesizer = build_synthesizer(&speech);
    let capabilities = SpeechCapabilities {
        recognition: recognizer.is_some(),
        synthesis: synthesizer.is_some(),
    };
    let engine = EngineHandle::new(Arc::new(backend), recognizer, synthesizer);

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(engine, msg_tx.clone());
    let line_rx = spawn_stdin_reader();

    let mut shell = Shell {
        runner,
        msg_rx,
        line_rx,
        pending_confirm: None,
        printed_transcript: 0,
        last_upload: None,
        last_documents: None,
        last_status: None,
        quit: false,
    };

    println!("docchat: ask questions about your documents (type `help` for commands)");

    let mut state = AppState::new(config.session_settings(), capabilities);
    state = shell.dispatch(state, Msg::ProviderChanged(config.provider()));
    state = shell.dispatch(state, Msg::RefreshRequested);
    shell.run_loop(state)
}

struct Shell {
    runner: EffectRunner,
    msg_rx: mpsc::Receiver<Msg>,
    line_rx: mpsc::Receiver<String>,
    pending_confirm: Option<PendingConfirm>,
    printed_transcript: usize,
    last_upload: Option<String>,
    last_documents: Option<Vec<String>>,
    last_status: Option<String>,
    quit: bool,
}

impl Shell {
    fn run_loop(&mut self, mut state: AppState) -> anyhow::Result<()> {
        loop {
            let mut worked = false;

            while let Ok(msg) = self.msg_rx.try_recv() {
                state = self.dispatch(state, msg);
                worked = true;
            }
            while let Some(msg) = self.runner.poll_event() {
                state = self.dispatch(state, msg);
                worked = true;
            }
            match self.line_rx.try_recv() {
                Ok(line) => {
                    state = self.handle_line(state, &line);
                    worked = true;
                }
                Err(TryRecvError::Empty) => {}
                // stdin closed; leave like `quit`.
                Err(TryRecvError::Disconnected) => self.quit = true,
            }

            self.flush_output(&mut state);

            if self.quit {
                chat_info!("docchat exiting");
                return Ok(());
            }
            if !worked {
                thread::sleep(Duration::from_millis(20));
            }
        }
    }

    fn dispatch(&mut self, state: AppState, msg: Msg) -> AppState {
        let (state, effects) = update(state, msg);
        if let Some(confirm) = self.runner.run(effects) {
            println!("{} [y/N]", confirm.prompt);
            self.pending_confirm = Some(confirm);
        }
        state
    }

    fn handle_line(&mut self, state: AppState, line: &str) -> AppState {
        if let Some(confirm) = self.pending_confirm.take() {
            let accepted = matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes");
            return self.dispatch(
                state,
                Msg::ConfirmResolved {
                    action: confirm.action,
                    accepted,
                },
            );
        }

        match commands::parse_line(line) {
            ParsedLine::Messages(msgs) => {
                let mut state = state;
                for msg in msgs {
                    state = self.dispatch(state, msg);
                }
                state
            }
            ParsedLine::Help => {
                println!("{}", commands::HELP_TEXT);
                state
            }
            ParsedLine::Quit => {
                self.quit = true;
                state
            }
            ParsedLine::Invalid(reason) => {
                println!("! {reason}");
                state
            }
        }
    }

    /// Prints queued notices and, when the state changed, whichever
    /// render sections differ from what is already on screen.
    fn flush_output(&mut self, state: &mut AppState) {
        for notice in state.drain_notices() {
            println!("{}", render::notice_line(&notice));
        }
        if !state.consume_dirty() {
            return;
        }

        let view = state.view();

        for entry in view.transcript.iter().skip(self.printed_transcript) {
            println!("{}", render::transcript_line(entry));
        }
        self.printed_transcript = view.transcript.len();

        match render::upload_line(&view) {
            Some(line) => {
                if self.last_upload.as_deref() != Some(line.as_str()) {
                    println!("{line}");
                    self.last_upload = Some(line);
                }
            }
            None => self.last_upload = None,
        }

        let documents = render::document_lines(&view);
        if self.last_documents.as_ref() != Some(&documents) {
            println!("Documents:");
            for line in &documents {
                println!("{line}");
            }
            if let Some(line) = render::staged_line(&view) {
                println!("{line}");
            }
            self.last_documents = Some(documents);
        }

        let status = render::status_line(&view);
        if self.last_status.as_deref() != Some(status.as_str()) {
            println!("{status}");
            self.last_status = Some(status);
        }
    }
}

fn build_recognizer(settings: &SpeechSettings) -> Option<Arc<dyn SpeechRecognizer>> {
    let program = settings.recognizer_program.as_deref()?;
    match CommandRecognizer::new(program, settings.recognizer_args.clone()) {
        Ok(recognizer) => {
            chat_info!("speech recognition via {program}");
            Some(Arc::new(recognizer))
        }
        Err(err) => {
            chat_warn!("speech recognition disabled: {err}");
            None
        }
    }
}

fn build_synthesizer(settings: &SpeechSettings) -> Option<Arc<dyn SpeechSynthesizer>> {
    let program = settings.synthesizer_program.as_deref()?;
    match CommandSynthesizer::new(program, settings.synthesizer_args.clone()) {
        Ok(synthesizer) => {
            chat_info!("speech synthesis via {program}");
            Some(Arc::new(synthesizer))
        }
        Err(err) => {
            chat_warn!("speech synthesis disabled: {err}");
            None
        }
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}
