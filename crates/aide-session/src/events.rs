//! Inbound events and outbound notifications

use crate::context::ContextFile;
use crate::message::Message;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Discriminated inbound events consumed from the host.
///
/// All host interactions funnel through [`crate::Session::handle_event`],
/// keeping the state machine a single dispatch function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The user submitted a chat message
    UserMessage { text: String },
    /// Toggle autonomous action execution
    SetAutoExecute { enabled: bool },
    /// Pin a file into the session context
    PinContextFile { path: PathBuf },
    /// Remove a pinned file
    UnpinContextFile { path: PathBuf },
    /// Drop all pinned files and the analysis snapshot
    ClearContext,
    /// Run the workspace analyzer
    AnalyzeWorkspace,
    /// Wipe the chat history (context is kept)
    ClearChat,
}

/// What changed on disk, as reported by the host's file watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileChangeKind {
    Modified,
    Created,
    Deleted,
}

/// Notifications produced for the host/UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionNotice {
    /// Chat history changed
    HistoryUpdate { messages: Vec<Message> },
    /// Pinned context or analysis availability changed
    ContextUpdate {
        files: Vec<ContextFile>,
        active_file: Option<String>,
        has_analysis: bool,
    },
    /// The session started or finished processing a message
    Busy { busy: bool },
    /// A watched file changed on disk
    FileChange {
        kind: FileChangeKind,
        name: String,
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let event: SessionEvent =
            serde_json::from_str(r#"{"type": "user_message", "text": "hello"}"#).unwrap();
        assert!(matches!(event, SessionEvent::UserMessage { ref text } if text == "hello"));

        let event: SessionEvent =
            serde_json::from_str(r#"{"type": "set_auto_execute", "enabled": true}"#).unwrap();
        assert!(matches!(event, SessionEvent::SetAutoExecute { enabled: true }));
    }

    #[test]
    fn test_notice_wire_format() {
        let notice = SessionNotice::Busy { busy: true };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["type"], "busy");
        assert_eq!(json["busy"], true);
    }
}
