use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use tokio::process::{Child, Command};

use crate::SpeechError;

/// External programs used for speech capture and playback.
#[derive(Debug, Clone, Default)]
pub struct SpeechSettings {
    /// Program that records one utterance and prints the transcript to
    /// stdout, e.g. a whisper wrapper script.
    pub recognizer_program: Option<String>,
    pub recognizer_args: Vec<String>,
    /// Program that reads its last argument aloud, e.g. `espeak` or
    /// `say`.
    pub synthesizer_program: Option<String>,
    pub synthesizer_args: Vec<String>,
}

#[async_trait::async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Captures one utterance and returns its transcript.
    async fn listen(&self) -> Result<String, SpeechError>;
}

#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Reads `text` aloud, returning when playback ends.
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;
    /// Stops the active playback, if any.
    fn cancel(&self);
}

/// Recognizer that shells out to a speech-to-text program.
pub struct CommandRecognizer {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandRecognizer {
    /// Resolves `program` on PATH; fails when it is not installed.
    pub fn new(program: &str, args: Vec<String>) -> Result<Self, SpeechError> {
        let program =
            which::which(program).map_err(|_| SpeechError::Unavailable(program.to_string()))?;
        Ok(Self { program, args })
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn listen(&self) -> Result<String, SpeechError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| SpeechError::Engine(err.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::Engine(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Synthesizer that shells out to a text-to-speech program. One child
/// process at most; starting a new playback kills the previous one.
pub struct CommandSynthesizer {
    program: PathBuf,
    args: Vec<String>,
    active: Mutex<Option<Child>>,
}

impl CommandSynthesizer {
    /// Resolves `program` on PATH; fails when it is not installed.
    pub fn new(program: &str, args: Vec<String>) -> Result<Self, SpeechError> {
        let program =
            which::which(program).map_err(|_| SpeechError::Unavailable(program.to_string()))?;
        Ok(Self {
            program,
            args,
            active: Mutex::new(None),
        })
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        self.cancel();
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|err| SpeechError::Engine(err.to_string()))?;
        self.active.lock().expect("synthesizer lock").replace(child);

        // Poll for exit instead of waiting, so the lock is never held
        // across an await and cancel() can reach the child.
        loop {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let mut active = self.active.lock().expect("synthesizer lock");
            let Some(child) = active.as_mut() else {
                return Ok(());
            };
            match child.try_wait() {
                Ok(Some(status)) => {
                    active.take();
                    // A signal-terminated child is a cancelled playback,
                    // not a failure.
                    if status.success() || status.code().is_none() {
                        return Ok(());
                    }
                    return Err(SpeechError::Engine(format!(
                        "{} exited with {status}",
                        self.program.display()
                    )));
                }
                Ok(None) => {}
                Err(err) => {
                    active.take();
                    return Err(SpeechError::Engine(err.to_string()));
                }
            }
        }
    }

    fn cancel(&self) {
        if let Some(child) = self.active.lock().expect("synthesizer lock").as_mut() {
            let _ = child.start_kill();
        }
    }
}
