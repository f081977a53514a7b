//! Context assembly: active editor state, pinned files, workspace analysis

use crate::analyzer::WorkspaceAnalysis;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Maximum characters of a pinned file included in the context bundle
pub const MAX_FILE_CHARS: usize = 2000;

/// Marker appended when a pinned file exceeds [`MAX_FILE_CHARS`]
pub const TRUNCATION_MARKER: &str = "\n... [truncated]";

/// State of the host's active editor at submit time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorState {
    /// Display name of the active file
    pub file_name: Option<String>,
    /// Language identifier of the active file
    pub language: Option<String>,
    /// Current text selection, if any
    pub selection: Option<String>,
}

/// A file the user pinned into the session context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextFile {
    /// Absolute path
    pub path: PathBuf,
    /// Display name derived from the path
    pub name: String,
    /// Language tag derived from the extension
    pub language: String,
}

impl ContextFile {
    /// Create a context file entry, deriving name and language from the path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let language = language_for_path(&path).to_string();
        Self { path, name, language }
    }
}

/// Map a file extension to the language tag used for code fences
pub fn language_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "js" => "javascript",
        "ts" => "typescript",
        "py" => "python",
        "java" => "java",
        "cpp" | "cc" | "h" | "hpp" => "cpp",
        "go" => "go",
        "rs" => "rust",
        "rb" => "ruby",
        "sh" => "bash",
        "json" => "json",
        "toml" => "toml",
        "md" => "markdown",
        _ => "text",
    }
}

/// Assemble the context bundle sent to the generation backend.
///
/// Deterministic concatenation, always in this order when present: the active
/// editor block, each pinned file's (possibly truncated) content in pin
/// order, then the current workspace analysis. A pinned file that can no
/// longer be read is skipped and logged; context assembly itself never fails.
pub async fn build_context(
    editor: Option<&EditorState>,
    files: &[ContextFile],
    analysis: Option<&WorkspaceAnalysis>,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(editor) = editor {
        if let Some(ref name) = editor.file_name {
            let language = editor.language.as_deref().unwrap_or("text");
            let mut block = format!("Active file: {} ({})", name, language);
            if let Some(ref selection) = editor.selection {
                block.push_str(&format!(
                    "\nSelection:\n```{}\n{}\n```",
                    language, selection
                ));
            }
            parts.push(block);
        }
    }

    for file in files {
        match fs::read_to_string(&file.path).await {
            Ok(content) => {
                parts.push(format!(
                    "File: {}\n```{}\n{}\n```",
                    file.name,
                    file.language,
                    truncate(&content)
                ));
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable context file {}: {}", file.path.display(), e);
            }
        }
    }

    if let Some(analysis) = analysis {
        parts.push(format!("Workspace analysis:\n{}", analysis.summary()));
    }

    parts.join("\n\n")
}

/// Truncate file content to [`MAX_FILE_CHARS`] characters, appending the
/// marker when anything was cut
fn truncate(content: &str) -> String {
    if content.chars().count() <= MAX_FILE_CHARS {
        return content.to_string();
    }
    let mut out: String = content.chars().take(MAX_FILE_CHARS).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}
