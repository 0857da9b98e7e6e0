//! Pure text formatting for the shell.
//!
//! Everything here turns view-model data into printable lines; the
//! loop in `app.rs` decides when to print them.

use docchat_core::{AppViewModel, Notice, Speaker, SpeechMode, TranscriptEntry};

pub fn status_line(view: &AppViewModel) -> String {
    let selected = view.documents.iter().filter(|row| row.selected).count();
    let mut line = format!(
        "Provider: {} | Documents: {} ({} selected)",
        view.provider,
        view.documents.len(),
        selected
    );
    match view.speech {
        SpeechMode::Idle => {}
        SpeechMode::Listening => line.push_str(" | Listening..."),
        SpeechMode::Speaking => line.push_str(" | Speaking..."),
    }
    if view.awaiting_answer {
        line.push_str(" | Thinking...");
    }
    line
}

pub fn document_lines(view: &AppViewModel) -> Vec<String> {
    if view.documents.is_empty() {
        return vec!["  No documents uploaded yet...".to_string()];
    }
    view.documents
        .iter()
        .map(|row| {
            let mark = if row.selected { "x" } else { " " };
            let mut line = format!(
                "  [{mark}] {id:>3}  {tag} {name}",
                id = row.id,
                tag = extension_tag(&row.name),
                name = row.name
            );
            if row.chunk_count > 0 {
                line.push_str(&format!(" ({} chunks)", row.chunk_count));
            }
            line
        })
        .collect()
}

/// Progress line while an upload runs or its success is on display.
pub fn upload_line(view: &AppViewModel) -> Option<String> {
    view.upload
        .as_ref()
        .map(|progress| format!("  [{:>3}%] {}", progress.percent, progress.label))
}

pub fn staged_line(view: &AppViewModel) -> Option<String> {
    view.staged_file_name
        .as_ref()
        .map(|name| format!("  Staged for upload: {name}"))
}

pub fn transcript_line(entry: &TranscriptEntry) -> String {
    match entry.speaker {
        Speaker::User => format!("You: {}", entry.text),
        Speaker::Bot => format!("Bot: {}", entry.text),
        Speaker::System => format!("* {}", entry.text),
    }
}

pub fn notice_line(notice: &Notice) -> String {
    format!("! {}", notice.text)
}

/// Short uppercase tag derived from the file extension, standing in
/// for the per-type icons of a graphical document list.
fn extension_tag(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!("[{}]", ext.to_ascii_uppercase())
        }
        _ => "[FILE]".to_string(),
    }
}
