//! Request and response types for the generation backend

use serde::{Deserialize, Serialize};

/// Request body for `/generate`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Natural language description of the desired code
    pub prompt: String,
    /// Programming language for the generated code
    pub language: String,
    /// Additional project context (assembled by the session core)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens in the response
    pub max_tokens: u32,
}

impl GenerateRequest {
    /// Create a request with backend-default sampling parameters
    pub fn new(prompt: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            language: language.into(),
            context: None,
            temperature: 0.2,
            max_tokens: 4096,
        }
    }

    /// Attach assembled context to the request
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Request body for `/review`
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequest {
    /// Code to review
    pub code: String,
    /// Programming language of the code
    pub language: String,
    /// File path, for context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// Wire envelope returned by every backend endpoint
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub data: serde_json::Value,
    pub message: Option<String>,
    pub model_used: Option<String>,
}

/// Result of a generation call
#[derive(Debug, Clone)]
pub struct GenerateReply {
    /// Whether the backend reported success
    pub success: bool,
    /// Generated code, when successful
    pub code: Option<String>,
    /// Human-readable status or error message
    pub message: Option<String>,
    /// Which model produced the response
    pub model_used: Option<String>,
}

/// Result of a review call
#[derive(Debug, Clone)]
pub struct ReviewReply {
    /// Whether the backend reported success
    pub success: bool,
    /// Review text, when successful
    pub review: Option<String>,
    /// Human-readable status or error message
    pub message: Option<String>,
    /// Which model produced the response
    pub model_used: Option<String>,
}

impl GenerateReply {
    pub(crate) fn from_envelope(env: Envelope) -> Self {
        let code = env
            .data
            .get("code")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Self {
            success: env.success,
            code,
            message: env.message,
            model_used: env.model_used,
        }
    }

    /// The text to surface in chat: code if present, otherwise the message
    pub fn text(&self) -> &str {
        self.code
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("")
    }
}

impl ReviewReply {
    pub(crate) fn from_envelope(env: Envelope) -> Self {
        let review = env
            .data
            .get("review")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Self {
            success: env.success,
            review,
            message: env.message,
            model_used: env.model_used,
        }
    }
}
