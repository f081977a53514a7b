//! Sequential action execution

use crate::action::{Action, ActionKind};
use crate::host::EditorHost;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// Executes planned actions against the user's workspace.
///
/// The executor is the only component that mutates on-disk files. Actions
/// run strictly one at a time in input order; a failure is recorded on that
/// action and never blocks the ones after it, and nothing is rolled back.
pub struct ActionExecutor {
    host: Arc<dyn EditorHost>,
    /// Relative action paths are resolved against this root
    workspace_root: PathBuf,
}

impl ActionExecutor {
    pub fn new(host: Arc<dyn EditorHost>, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            host,
            workspace_root: workspace_root.into(),
        }
    }

    /// Run each action to completion before starting the next.
    ///
    /// Every action leaves pending state exactly once, to success or error.
    pub async fn execute_sequentially(&self, actions: &mut [Action]) {
        for action in actions.iter_mut() {
            self.execute_one(action).await;
            tracing::debug!(
                "Action {:?} finished with status {:?}",
                action.kind,
                action.status
            );
        }
    }

    async fn execute_one(&self, action: &mut Action) {
        match action.kind {
            ActionKind::CreateFile => self.create_file(action).await,
            ActionKind::EditFile => self.edit_file(action).await,
            ActionKind::Execute => self.run_in_new_terminal(action),
            ActionKind::TerminalCommand => self.run_in_persistent_terminal(action),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.workspace_root.join(p)
        }
    }

    /// Write content to the target path, creating parent directories.
    /// Overwrites an existing file without checking.
    async fn create_file(&self, action: &mut Action) {
        let Some(path) = action.path.clone() else {
            action.fail("create_file action is missing a path");
            return;
        };
        let content = action.content.clone().unwrap_or_default();
        let target = self.resolve(&path);

        if let Some(parent) = target.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent).await {
                    action.fail(format!("Failed to create directory: {}", e));
                    return;
                }
            }
        }

        match fs::write(&target, &content).await {
            Ok(()) => action.succeed(format!("Wrote {} bytes to {}", content.len(), path)),
            Err(e) => action.fail(format!("Failed to write {}: {}", path, e)),
        }
    }

    /// Remove the first literal occurrence of the action's content from the
    /// file. This is a narrow substring-removal edit, not a patch
    /// application; the planner must supply exact text.
    async fn edit_file(&self, action: &mut Action) {
        let Some(path) = action.path.clone() else {
            action.fail("edit_file action is missing a path");
            return;
        };
        let Some(needle) = action.content.clone() else {
            action.fail("edit_file action is missing content to remove");
            return;
        };
        let target = self.resolve(&path);

        let existing = match fs::read_to_string(&target).await {
            Ok(c) => c,
            Err(e) => {
                action.fail(format!("Failed to read {}: {}", path, e));
                return;
            }
        };

        if !existing.contains(&needle) {
            action.fail(format!(
                "Could not find the exact text in {}. The text must match including whitespace.",
                path
            ));
            return;
        }

        let updated = existing.replacen(&needle, "", 1);
        match fs::write(&target, &updated).await {
            Ok(()) => action.succeed(format!("Removed {} characters from {}", needle.len(), path)),
            Err(e) => action.fail(format!("Failed to write {}: {}", path, e)),
        }
    }

    /// Open a fresh terminal and dispatch the command. Success means
    /// dispatched; exit status is not inspected.
    fn run_in_new_terminal(&self, action: &mut Action) {
        let Some(command) = action.command.clone() else {
            action.fail("execute action is missing a command");
            return;
        };

        let terminal = self.host.open_terminal("aide");
        terminal.send(&command);
        terminal.show();
        action.succeed("Command dispatched");
    }

    /// Dispatch into the session's persistent terminal. With no persistent
    /// terminal the action fails explicitly rather than silently staying
    /// pending.
    fn run_in_persistent_terminal(&self, action: &mut Action) {
        let Some(command) = action.command.clone() else {
            action.fail("terminal_command action is missing a command");
            return;
        };

        match self.host.persistent_terminal() {
            Some(terminal) => {
                terminal.send(&command);
                action.succeed("Command dispatched");
            }
            None => action.fail("No active terminal"),
        }
    }
}
