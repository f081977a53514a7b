//! Session state and the message loop

use crate::action::parse_actions;
use crate::analyzer::{self, WorkspaceAnalysis};
use crate::context::{self, ContextFile, EditorState};
use crate::events::{FileChangeKind, SessionEvent, SessionNotice};
use crate::executor::ActionExecutor;
use crate::host::EditorHost;
use crate::intent::{self, Intent};
use crate::message::Message;
use aide_client::{GenerateRequest, GenerationService, ReviewRequest};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Language sent to the backend when the editor offers none
const DEFAULT_LANGUAGE: &str = "python";

/// The live state of one chat panel.
///
/// Owns the ordered message history, the pinned context set, at most one
/// workspace analysis snapshot, and the auto-execute flag. All mutation goes
/// through [`Session::handle_event`] and the methods below; handlers for one
/// session never run concurrently. A message submitted while another is in
/// flight is queued and processed afterwards, never interleaved.
pub struct Session {
    workspace_root: PathBuf,
    history: Vec<Message>,
    context_files: Vec<ContextFile>,
    analysis: Option<WorkspaceAnalysis>,
    auto_execute: bool,
    busy: bool,
    pending: VecDeque<String>,
    service: Arc<dyn GenerationService>,
    host: Arc<dyn EditorHost>,
    executor: ActionExecutor,
    notice_tx: broadcast::Sender<SessionNotice>,
}

impl Session {
    /// Create a session over the given backend service and editor host
    pub fn new(
        service: Arc<dyn GenerationService>,
        host: Arc<dyn EditorHost>,
        workspace_root: impl Into<PathBuf>,
    ) -> Self {
        let workspace_root = workspace_root.into();
        let (notice_tx, _) = broadcast::channel(256);
        let executor = ActionExecutor::new(host.clone(), workspace_root.clone());
        Self {
            workspace_root,
            history: vec![],
            context_files: vec![],
            analysis: None,
            auto_execute: false,
            busy: false,
            pending: VecDeque::new(),
            service,
            host,
            executor,
            notice_tx,
        }
    }

    /// Subscribe to session notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotice> {
        self.notice_tx.subscribe()
    }

    /// Ordered chat history
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Pinned context files, in pin order
    pub fn context_files(&self) -> &[ContextFile] {
        &self.context_files
    }

    /// Current workspace analysis snapshot, if one was taken
    pub fn analysis(&self) -> Option<&WorkspaceAnalysis> {
        self.analysis.as_ref()
    }

    /// Whether a user message is currently being processed
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether planned actions execute automatically
    pub fn auto_execute(&self) -> bool {
        self.auto_execute
    }

    /// Single dispatch point for every inbound host event
    pub async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::UserMessage { text } => self.submit_user_message(text).await,
            SessionEvent::SetAutoExecute { enabled } => self.set_auto_execute(enabled),
            SessionEvent::PinContextFile { path } => self.pin_context_file(path),
            SessionEvent::UnpinContextFile { path } => self.unpin_context_file(&path),
            SessionEvent::ClearContext => self.clear_context(),
            SessionEvent::AnalyzeWorkspace => {
                if let Err(e) = self.analyze_workspace() {
                    tracing::warn!("Workspace analysis failed: {}", e);
                }
            }
            SessionEvent::ClearChat => self.clear_chat(),
        }
    }

    /// Submit a user message.
    ///
    /// Appends exactly one user message and exactly one assistant message to
    /// history per submission, whether or not the backend call succeeds. A
    /// submission arriving while busy is queued and handled after the
    /// in-flight one completes.
    pub async fn submit_user_message(&mut self, text: String) {
        self.pending.push_back(text);
        if self.busy {
            return;
        }

        self.set_busy(true);
        while let Some(text) = self.pending.pop_front() {
            self.process_message(text).await;
        }
        self.set_busy(false);
    }

    async fn process_message(&mut self, text: String) {
        self.history.push(Message::user(text.clone()));
        self.notify_history();

        let editor = self.host.active_editor();
        let bundle = context::build_context(
            editor.as_ref(),
            &self.context_files,
            self.analysis.as_ref(),
        )
        .await;
        let language = editor
            .as_ref()
            .and_then(|e| e.language.clone())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        // requires_autonomy is checked first and short-circuits intent
        // dispatch entirely; the two gates are never composed.
        let reply = if intent::requires_autonomy(&text) {
            self.autonomous_reply(&text, &bundle, &language).await
        } else {
            self.intent_reply(&text, &bundle, &language, editor.as_ref())
                .await
        };

        self.history.push(reply);
        self.notify_history();
    }

    /// Autonomous path: plan actions from the reply, execute when enabled
    async fn autonomous_reply(&mut self, text: &str, bundle: &str, language: &str) -> Message {
        let request = GenerateRequest::new(text, language).with_context(bundle);
        match self.service.generate(request).await {
            Ok(reply) => {
                let content = reply.text().to_string();
                let mut actions = parse_actions(&content);
                if !actions.is_empty() && self.auto_execute {
                    self.executor.execute_sequentially(&mut actions).await;
                }
                Message::assistant_with_actions(content, actions)
            }
            Err(e) => {
                tracing::warn!("Generation request failed: {}", e);
                Message::assistant(format!("Request failed: {}", e))
            }
        }
    }

    /// Plain per-intent path
    async fn intent_reply(
        &mut self,
        text: &str,
        bundle: &str,
        language: &str,
        editor: Option<&EditorState>,
    ) -> Message {
        match intent::classify(text) {
            Intent::Review => self.review_reply(language, editor).await,
            Intent::Analyze => self.analyze_reply(),
            intent => {
                let prompt = match intent {
                    Intent::Explain => format!("Explain the following:\n{}", text),
                    Intent::Refactor => format!("Suggest a refactoring for:\n{}", text),
                    _ => text.to_string(),
                };
                let request = GenerateRequest::new(prompt, language).with_context(bundle);
                match self.service.generate(request).await {
                    Ok(reply) => Message::assistant(reply.text().to_string()),
                    Err(e) => {
                        tracing::warn!("Generation request failed: {}", e);
                        Message::assistant(format!("Request failed: {}", e))
                    }
                }
            }
        }
    }

    /// Review the active selection; without one, ask for it locally
    async fn review_reply(&mut self, language: &str, editor: Option<&EditorState>) -> Message {
        let Some(code) = editor.and_then(|e| e.selection.clone()) else {
            return Message::assistant("Select the code you would like reviewed and try again.");
        };

        let request = ReviewRequest {
            code,
            language: language.to_string(),
            file_path: editor.and_then(|e| e.file_name.clone()),
        };
        match self.service.review(request).await {
            Ok(reply) => {
                let content = reply
                    .review
                    .or(reply.message)
                    .unwrap_or_else(|| "No review returned.".to_string());
                Message::assistant(content)
            }
            Err(e) => {
                tracing::warn!("Review request failed: {}", e);
                Message::assistant(format!("Request failed: {}", e))
            }
        }
    }

    /// Analyze intent runs locally, no backend call
    fn analyze_reply(&mut self) -> Message {
        match self.analyze_workspace() {
            Ok(()) => {
                let summary = self
                    .analysis
                    .as_ref()
                    .map(|a| a.summary())
                    .unwrap_or_default();
                Message::assistant(summary)
            }
            Err(e) => Message::assistant(format!("Workspace analysis failed: {}", e)),
        }
    }

    /// Run the analyzer and replace the snapshot wholesale
    pub fn analyze_workspace(&mut self) -> crate::error::Result<()> {
        let analysis = analyzer::analyze(&self.workspace_root)?;
        self.analysis = Some(analysis);
        self.notify_context();
        Ok(())
    }

    /// Pin a file into the context set. Pinning an already-pinned path is a
    /// no-op.
    pub fn pin_context_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if self.context_files.iter().any(|f| f.path == path) {
            return;
        }
        self.context_files.push(ContextFile::new(path));
        self.notify_context();
    }

    /// Remove a pinned file. Removing a path that is not pinned is a no-op.
    pub fn unpin_context_file(&mut self, path: &Path) {
        let before = self.context_files.len();
        self.context_files.retain(|f| f.path != path);
        if self.context_files.len() != before {
            self.notify_context();
        }
    }

    /// Drop all pinned files and the analysis snapshot
    pub fn clear_context(&mut self) {
        if self.context_files.is_empty() && self.analysis.is_none() {
            return;
        }
        self.context_files.clear();
        self.analysis = None;
        self.notify_context();
    }

    /// Wipe the chat history. Pinned context and the analysis snapshot are
    /// kept; only an explicit context clear drops those.
    pub fn clear_chat(&mut self) {
        self.history.clear();
        self.notify_history();
    }

    /// Toggle autonomous execution of planned actions
    pub fn set_auto_execute(&mut self, enabled: bool) {
        self.auto_execute = enabled;
    }

    /// Forward a file-watcher event to subscribers. Read-only with respect
    /// to session state; a change reported for a file an action just wrote
    /// is expected, not an error.
    pub fn notify_file_event(&self, kind: FileChangeKind, path: impl Into<PathBuf>) {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let _ = self.notice_tx.send(SessionNotice::FileChange { kind, name, path });
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        let _ = self.notice_tx.send(SessionNotice::Busy { busy });
    }

    fn notify_history(&self) {
        let _ = self.notice_tx.send(SessionNotice::HistoryUpdate {
            messages: self.history.clone(),
        });
    }

    fn notify_context(&self) {
        let _ = self.notice_tx.send(SessionNotice::ContextUpdate {
            files: self.context_files.clone(),
            active_file: self
                .host
                .active_editor()
                .and_then(|e| e.file_name),
            has_analysis: self.analysis.is_some(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionStatus;
    use crate::host::Terminal;
    use crate::message::Role;
    use aide_client::{GenerateReply, ReviewReply};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Canned backend: pops queued replies, records every request
    struct MockService {
        replies: Mutex<Vec<aide_client::Result<GenerateReply>>>,
        seen: Mutex<Vec<GenerateRequest>>,
        review_reply: Mutex<Option<ReviewReply>>,
    }

    impl MockService {
        fn with_replies(replies: Vec<aide_client::Result<GenerateReply>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(vec![]),
                review_reply: Mutex::new(None),
            })
        }

        fn ok(code: &str) -> aide_client::Result<GenerateReply> {
            Ok(GenerateReply {
                success: true,
                code: Some(code.to_string()),
                message: None,
                model_used: Some("mock".to_string()),
            })
        }
    }

    #[async_trait]
    impl GenerationService for MockService {
        async fn generate(
            &self,
            request: GenerateRequest,
        ) -> aide_client::Result<GenerateReply> {
            self.seen.lock().unwrap().push(request);
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                MockService::ok("default reply")
            } else {
                replies.remove(0)
            }
        }

        async fn review(&self, _request: ReviewRequest) -> aide_client::Result<ReviewReply> {
            Ok(self
                .review_reply
                .lock()
                .unwrap()
                .clone()
                .unwrap_or(ReviewReply {
                    success: true,
                    review: Some("mock review".to_string()),
                    message: None,
                    model_used: None,
                }))
        }
    }

    struct NullTerminal;
    impl Terminal for NullTerminal {
        fn send(&self, _command: &str) {}
        fn show(&self) {}
    }

    struct TestHost {
        editor: Option<EditorState>,
    }

    impl EditorHost for TestHost {
        fn active_editor(&self) -> Option<EditorState> {
            self.editor.clone()
        }
        fn open_terminal(&self, _name: &str) -> Arc<dyn Terminal> {
            Arc::new(NullTerminal)
        }
        fn persistent_terminal(&self) -> Option<Arc<dyn Terminal>> {
            None
        }
    }

    fn make_session(
        service: Arc<MockService>,
        root: &Path,
        editor: Option<EditorState>,
    ) -> Session {
        Session::new(service, Arc::new(TestHost { editor }), root)
    }

    fn roles(session: &Session) -> Vec<Role> {
        session.history().iter().map(|m| m.role).collect()
    }

    #[tokio::test]
    async fn test_submit_appends_user_then_assistant() {
        let dir = TempDir::new().unwrap();
        let service = MockService::with_replies(vec![MockService::ok("hello back")]);
        let mut session = make_session(service, dir.path(), None);

        session.submit_user_message("hello".to_string()).await;

        assert_eq!(roles(&session), [Role::User, Role::Assistant]);
        assert_eq!(session.history()[1].content, "hello back");
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_backend_failure_still_appends_assistant() {
        let dir = TempDir::new().unwrap();
        let service = MockService::with_replies(vec![Err(aide_client::Error::Timeout)]);
        let mut session = make_session(service, dir.path(), None);

        session.submit_user_message("hello".to_string()).await;

        assert_eq!(roles(&session), [Role::User, Role::Assistant]);
        assert!(session.history()[1].content.contains("Request failed"));
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_sequential_submissions_never_interleave() {
        let dir = TempDir::new().unwrap();
        let service = MockService::with_replies(vec![
            MockService::ok("first"),
            MockService::ok("second"),
        ]);
        let mut session = make_session(service, dir.path(), None);

        session.submit_user_message("one".to_string()).await;
        session.submit_user_message("two".to_string()).await;

        assert_eq!(
            roles(&session),
            [Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(session.history()[1].content, "first");
        assert_eq!(session.history()[3].content, "second");
    }

    #[tokio::test]
    async fn test_autonomy_carries_planned_actions() {
        let dir = TempDir::new().unwrap();
        let planned = r#"{"actions": [{"kind": "create_file", "path": "new.rs", "content": "fn f() {}"}]}"#;
        let service = MockService::with_replies(vec![MockService::ok(planned)]);
        let mut session = make_session(service, dir.path(), None);

        session
            .submit_user_message("please create a function".to_string())
            .await;

        let assistant = &session.history()[1];
        assert_eq!(assistant.actions.len(), 1);
        // auto-execute is off: planned but not run
        assert_eq!(assistant.actions[0].status, ActionStatus::Pending);
        assert!(!dir.path().join("new.rs").exists());
    }

    #[tokio::test]
    async fn test_auto_execute_runs_planned_actions() {
        let dir = TempDir::new().unwrap();
        let planned = r#"{"actions": [{"kind": "create_file", "path": "new.rs", "content": "fn f() {}"}]}"#;
        let service = MockService::with_replies(vec![MockService::ok(planned)]);
        let mut session = make_session(service, dir.path(), None);
        session.set_auto_execute(true);

        session
            .submit_user_message("implement the helper".to_string())
            .await;

        let assistant = &session.history()[1];
        assert_eq!(assistant.actions[0].status, ActionStatus::Success);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("new.rs")).unwrap(),
            "fn f() {}"
        );
    }

    #[tokio::test]
    async fn test_malformed_plan_is_zero_actions_not_error() {
        let dir = TempDir::new().unwrap();
        let service =
            MockService::with_replies(vec![MockService::ok("just prose, no JSON here")]);
        let mut session = make_session(service, dir.path(), None);

        session.submit_user_message("fix the bug".to_string()).await;

        let assistant = &session.history()[1];
        assert!(assistant.actions.is_empty());
        assert_eq!(assistant.content, "just prose, no JSON here");
    }

    #[tokio::test]
    async fn test_review_without_selection_stays_local() {
        let dir = TempDir::new().unwrap();
        let service = MockService::with_replies(vec![]);
        let mut session = make_session(service.clone(), dir.path(), None);

        session
            .submit_user_message("review this please".to_string())
            .await;

        assert_eq!(roles(&session), [Role::User, Role::Assistant]);
        // No backend call was made
        assert!(service.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_review_uses_active_selection() {
        let dir = TempDir::new().unwrap();
        let service = MockService::with_replies(vec![]);
        let editor = EditorState {
            file_name: Some("lib.rs".into()),
            language: Some("rust".into()),
            selection: Some("let x = 1;".into()),
        };
        let mut session = make_session(service, dir.path(), Some(editor));

        session.submit_user_message("review this".to_string()).await;

        assert_eq!(session.history()[1].content, "mock review");
    }

    #[tokio::test]
    async fn test_analyze_intent_runs_locally() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.py"), "def entry():\n    pass\n").unwrap();
        let service = MockService::with_replies(vec![]);
        let mut session = make_session(service.clone(), dir.path(), None);

        session
            .submit_user_message("analyze the workspace".to_string())
            .await;

        assert!(session.analysis().is_some());
        assert!(session.history()[1].content.contains("Total files: 1"));
        assert!(service.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pinned_file_content_reaches_backend() {
        let dir = TempDir::new().unwrap();
        let pinned = dir.path().join("helper.rs");
        std::fs::write(&pinned, "pub fn helper() -> u8 { 7 }").unwrap();

        let service = MockService::with_replies(vec![MockService::ok("ok")]);
        let mut session = make_session(service.clone(), dir.path(), None);
        session.pin_context_file(&pinned);

        session.submit_user_message("explain this".to_string()).await;

        let seen = service.seen.lock().unwrap();
        let context = seen[0].context.as_deref().unwrap();
        assert!(context.contains("pub fn helper() -> u8 { 7 }"));
    }

    #[tokio::test]
    async fn test_pin_is_deduplicated_by_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.rs");
        std::fs::write(&path, "x").unwrap();
        let service = MockService::with_replies(vec![]);
        let mut session = make_session(service, dir.path(), None);

        session.pin_context_file(&path);
        session.pin_context_file(&path);

        assert_eq!(session.context_files().len(), 1);
    }

    #[tokio::test]
    async fn test_unpin_missing_and_clear_empty_are_noops() {
        let dir = TempDir::new().unwrap();
        let service = MockService::with_replies(vec![]);
        let mut session = make_session(service, dir.path(), None);

        session.unpin_context_file(Path::new("/nowhere/x.rs"));
        session.clear_context();

        assert!(session.context_files().is_empty());
        assert!(session.analysis().is_none());
    }

    #[tokio::test]
    async fn test_clear_chat_keeps_context() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keep.rs");
        std::fs::write(&path, "x").unwrap();
        std::fs::write(dir.path().join("a.py"), "pass\n").unwrap();

        let service = MockService::with_replies(vec![MockService::ok("hi")]);
        let mut session = make_session(service, dir.path(), None);
        session.pin_context_file(&path);
        session.analyze_workspace().unwrap();
        session.submit_user_message("hello".to_string()).await;

        session.clear_chat();

        assert!(session.history().is_empty());
        assert_eq!(session.context_files().len(), 1);
        assert!(session.analysis().is_some());
    }

    #[tokio::test]
    async fn test_busy_notices_bracket_processing() {
        let dir = TempDir::new().unwrap();
        let service = MockService::with_replies(vec![MockService::ok("done")]);
        let mut session = make_session(service, dir.path(), None);
        let mut rx = session.subscribe();

        session.submit_user_message("hello".to_string()).await;

        let mut busy_states = vec![];
        while let Ok(notice) = rx.try_recv() {
            if let SessionNotice::Busy { busy } = notice {
                busy_states.push(busy);
            }
        }
        assert_eq!(busy_states, [true, false]);
    }

    #[tokio::test]
    async fn test_event_dispatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("e.rs");
        std::fs::write(&path, "x").unwrap();
        let service = MockService::with_replies(vec![]);
        let mut session = make_session(service, dir.path(), None);

        session
            .handle_event(SessionEvent::PinContextFile { path: path.clone() })
            .await;
        assert_eq!(session.context_files().len(), 1);

        session
            .handle_event(SessionEvent::SetAutoExecute { enabled: true })
            .await;
        assert!(session.auto_execute());

        session.handle_event(SessionEvent::ClearContext).await;
        assert!(session.context_files().is_empty());
    }

    #[tokio::test]
    async fn test_file_event_forwarded() {
        let dir = TempDir::new().unwrap();
        let service = MockService::with_replies(vec![]);
        let session = make_session(service, dir.path(), None);
        let mut rx = session.subscribe();

        session.notify_file_event(FileChangeKind::Modified, "/ws/src/main.rs");

        match rx.try_recv().unwrap() {
            SessionNotice::FileChange { kind, name, .. } => {
                assert_eq!(kind, FileChangeKind::Modified);
                assert_eq!(name, "main.rs");
            }
            other => panic!("expected FileChange, got {:?}", other),
        }
    }
}
