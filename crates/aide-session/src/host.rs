//! Host seams: the editor and terminal surface the session runs against
//!
//! The session core never talks to a live editor directly. Hosts implement
//! these traits; tests substitute recording fakes.

use crate::context::EditorState;
use std::sync::Arc;

/// A terminal the executor can dispatch commands into.
///
/// Dispatch is fire-and-forget: the executor does not wait for or inspect
/// command exit status.
pub trait Terminal: Send + Sync {
    /// Send a command line to the terminal
    fn send(&self, command: &str);

    /// Bring the terminal into view
    fn show(&self);
}

/// The editor-side surface the session depends on
pub trait EditorHost: Send + Sync {
    /// Snapshot of the active editor, if any
    fn active_editor(&self) -> Option<EditorState>;

    /// Open a fresh terminal with the given title
    fn open_terminal(&self, name: &str) -> Arc<dyn Terminal>;

    /// The session's persistent terminal, if one exists
    fn persistent_terminal(&self) -> Option<Arc<dyn Terminal>>;
}
