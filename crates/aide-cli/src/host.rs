//! Process-backed editor host for running sessions from a terminal

use aide_session::{EditorHost, EditorState, Terminal};
use std::process::{Command, Stdio};
use std::sync::Arc;

/// A terminal that dispatches commands as shell subprocesses.
///
/// Dispatch is fire-and-forget: the child inherits stdio and its exit status
/// is never inspected, matching the session executor's contract.
pub struct ProcessTerminal {
    name: String,
}

impl ProcessTerminal {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Terminal for ProcessTerminal {
    fn send(&self, command: &str) {
        let (shell, shell_arg) = if cfg!(target_os = "windows") {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };

        match Command::new(shell)
            .arg(shell_arg)
            .arg(command)
            .stdin(Stdio::null())
            .spawn()
        {
            Ok(_) => tracing::debug!("[{}] dispatched: {}", self.name, command),
            Err(e) => tracing::warn!("[{}] failed to spawn command: {}", self.name, e),
        }
    }

    fn show(&self) {
        // Nothing to bring into view in a plain console host
    }
}

/// Editor host for the CLI: no active editor, one persistent terminal
pub struct CliHost {
    persistent: Arc<ProcessTerminal>,
}

impl CliHost {
    pub fn new() -> Self {
        Self {
            persistent: Arc::new(ProcessTerminal::new("aide")),
        }
    }
}

impl Default for CliHost {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorHost for CliHost {
    fn active_editor(&self) -> Option<EditorState> {
        None
    }

    fn open_terminal(&self, name: &str) -> Arc<dyn Terminal> {
        Arc::new(ProcessTerminal::new(name))
    }

    fn persistent_terminal(&self) -> Option<Arc<dyn Terminal>> {
        Some(self.persistent.clone())
    }
}
