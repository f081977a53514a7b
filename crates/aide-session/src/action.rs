//! Planned side-effecting actions and the response planner

use serde::{Deserialize, Serialize};

/// Kinds of side-effecting actions the backend can plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateFile,
    EditFile,
    Execute,
    TerminalCommand,
}

/// Execution status of a single action.
///
/// Transitions pending -> {success|error} exactly once; an action is never
/// retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Success,
    Error,
}

/// A single planned side-effecting operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    /// Target file path (create_file / edit_file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// File content to write, or the exact text to remove for edit_file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Command text (execute / terminal_command)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default = "default_status")]
    pub status: ActionStatus,
    /// Result detail or failure message, set by the executor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

fn default_status() -> ActionStatus {
    ActionStatus::Pending
}

impl Action {
    /// Create a pending create_file action
    pub fn create_file(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::CreateFile,
            path: Some(path.into()),
            content: Some(content.into()),
            command: None,
            status: ActionStatus::Pending,
            result: None,
        }
    }

    /// Create a pending edit_file action
    pub fn edit_file(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::EditFile,
            path: Some(path.into()),
            content: Some(content.into()),
            command: None,
            status: ActionStatus::Pending,
            result: None,
        }
    }

    /// Create a pending execute action
    pub fn execute(command: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Execute,
            path: None,
            content: None,
            command: Some(command.into()),
            status: ActionStatus::Pending,
            result: None,
        }
    }

    /// Create a pending terminal_command action
    pub fn terminal_command(command: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::TerminalCommand,
            path: None,
            content: None,
            command: Some(command.into()),
            status: ActionStatus::Pending,
            result: None,
        }
    }

    pub(crate) fn succeed(&mut self, detail: impl Into<String>) {
        self.status = ActionStatus::Success;
        self.result = Some(detail.into());
    }

    pub(crate) fn fail(&mut self, detail: impl Into<String>) {
        self.status = ActionStatus::Error;
        self.result = Some(detail.into());
    }
}

/// Structured shape the backend uses when it plans actions
#[derive(Debug, Deserialize)]
struct PlannedResponse {
    actions: Vec<Action>,
}

/// Parse a backend reply into planned actions.
///
/// The reply is free text that may or may not be a JSON object carrying an
/// `actions` field. A reply that does not parse, or parses without the field,
/// yields zero actions; planning never fails the overall request.
pub fn parse_actions(reply: &str) -> Vec<Action> {
    match serde_json::from_str::<PlannedResponse>(reply.trim()) {
        Ok(planned) => planned.actions,
        Err(e) => {
            tracing::debug!("Reply carried no structured actions: {}", e);
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions_valid() {
        let reply = r#"{
            "actions": [
                {"kind": "create_file", "path": "src/lib.rs", "content": "pub fn f() {}"},
                {"kind": "terminal_command", "command": "cargo check"}
            ]
        }"#;
        let actions = parse_actions(reply);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].kind, ActionKind::CreateFile);
        assert_eq!(actions[0].status, ActionStatus::Pending);
        assert_eq!(actions[1].kind, ActionKind::TerminalCommand);
        assert_eq!(actions[1].command.as_deref(), Some("cargo check"));
    }

    #[test]
    fn test_parse_actions_free_text_yields_none() {
        let actions = parse_actions("Here is how you could approach this problem...");
        assert!(actions.is_empty());
    }

    #[test]
    fn test_parse_actions_json_without_field_yields_none() {
        let actions = parse_actions(r#"{"code": "fn main() {}"}"#);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_parse_actions_empty_list() {
        let actions = parse_actions(r#"{"actions": []}"#);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_status_transitions() {
        let mut action = Action::execute("ls");
        assert_eq!(action.status, ActionStatus::Pending);
        action.succeed("dispatched");
        assert_eq!(action.status, ActionStatus::Success);
        assert_eq!(action.result.as_deref(), Some("dispatched"));
    }
}
