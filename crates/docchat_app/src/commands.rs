//! Maps typed input lines to state machine messages.
//!
//! The first word selects a command; any line that does not start with
//! a command word is sent as a chat question.

use std::path::PathBuf;

use docchat_core::{Msg, Provider};

/// Outcome of parsing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Dispatch these messages in order.
    Messages(Vec<Msg>),
    /// Print the command reference.
    Help,
    /// Leave the application.
    Quit,
    /// The line looked like a command but its arguments were wrong.
    Invalid(String),
}

pub fn parse_line(line: &str) -> ParsedLine {
    let line = line.trim();
    if line.is_empty() {
        return ParsedLine::Messages(Vec::new());
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "help" | "?" => ParsedLine::Help,
        "quit" | "exit" => ParsedLine::Quit,
        "docs" | "refresh" => ParsedLine::Messages(vec![Msg::RefreshRequested]),
        "delete" => ParsedLine::Messages(vec![Msg::DeleteRequested]),
        "mic" => ParsedLine::Messages(vec![Msg::MicPressed]),
        "speak" => ParsedLine::Messages(vec![Msg::SpeakPressed]),
        "select" => match rest.parse::<i64>() {
            Ok(id) => ParsedLine::Messages(vec![Msg::DocumentToggled(id)]),
            Err(_) => ParsedLine::Invalid("select needs a numeric document id".to_string()),
        },
        "provider" => match Provider::from_name(rest) {
            Some(provider) => ParsedLine::Messages(vec![Msg::ProviderChanged(provider)]),
            None => ParsedLine::Invalid(format!(
                "unknown provider {rest:?}; expected gemini or groq"
            )),
        },
        "upload" => {
            if rest.is_empty() {
                ParsedLine::Messages(vec![Msg::UploadSubmitted])
            } else {
                ParsedLine::Messages(vec![
                    Msg::FileChosen(PathBuf::from(rest)),
                    Msg::UploadSubmitted,
                ])
            }
        }
        "ask" => {
            if rest.is_empty() {
                // Sends whatever the question input already holds, for
                // example a transcript filled in by `mic`.
                ParsedLine::Messages(vec![Msg::SendRequested])
            } else {
                ParsedLine::Messages(vec![
                    Msg::QuestionChanged(rest.to_string()),
                    Msg::SendRequested,
                ])
            }
        }
        _ => ParsedLine::Messages(vec![
            Msg::QuestionChanged(line.to_string()),
            Msg::SendRequested,
        ]),
    }
}

pub const HELP_TEXT: &str = "\
Commands:
  docs                 reload the document list
  select <id>          toggle a document in the question scope
  upload <path>        upload a file (bare `upload` resubmits the staged file)
  delete               delete the selected documents (asks first)
  ask <question>       ask about the selected documents
  provider <name>      switch the answer provider (gemini or groq)
  mic                  capture a spoken question into the input
  speak                read the last answer aloud
  help                 show this text
  quit                 exit
Anything else is sent as a question.";
