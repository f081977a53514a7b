//! aide-session: chat session state machine and action orchestration
//!
//! This crate is the editor-side core: it owns conversational and context
//! state, classifies user intent, routes between assisted replies and the
//! autonomous action-planning path, and executes planned actions in a
//! deterministic, status-tracked sequence.

pub mod action;
pub mod analyzer;
pub mod context;
pub mod error;
pub mod events;
pub mod executor;
pub mod host;
pub mod intent;
pub mod message;
pub mod session;

pub use action::{Action, ActionKind, ActionStatus, parse_actions};
pub use analyzer::WorkspaceAnalysis;
pub use context::{ContextFile, EditorState, build_context};
pub use error::{Error, Result};
pub use events::{FileChangeKind, SessionEvent, SessionNotice};
pub use executor::ActionExecutor;
pub use host::{EditorHost, Terminal};
pub use intent::{Intent, classify, requires_autonomy};
pub use message::{Message, Role};
pub use session::Session;
