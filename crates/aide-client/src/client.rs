//! HTTP client for the generation backend

use crate::{
    error::{Error, Result},
    types::{Envelope, GenerateReply, GenerateRequest, ReviewReply, ReviewRequest},
};
use async_trait::async_trait;
use std::time::Duration;

/// Fixed per-request timeout. A hung backend must surface as an error,
/// never leave the session waiting.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The two remote operations the session core depends on.
///
/// The session holds an `Arc<dyn GenerationService>` so tests can substitute
/// a mock without a live backend.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate code from a natural language prompt
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateReply>;

    /// Review a piece of code
    async fn review(&self, request: ReviewRequest) -> Result<ReviewReply>;
}

/// Backend API client
pub struct GenerationClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GenerationClient {
    /// Create a new client for the given backend base URL
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn post(&self, path: &str, body: &impl serde::Serialize) -> Result<Envelope> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let mut request = self.client.post(&url).json(body);
        if let Some(ref key) = self.api_key {
            request = request.header("X-API-Key", key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Error bodies may carry a `detail` field (FastAPI convention)
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
                .unwrap_or(text);
            return Err(Error::api(status.as_u16(), message));
        }

        serde_json::from_str(&text)
            .map_err(|_| Error::UnexpectedResponse(truncate_for_error(&text)))
    }
}

#[async_trait]
impl GenerationService for GenerationClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateReply> {
        let env = self.post("/api/v1/generate", &request).await?;
        Ok(GenerateReply::from_envelope(env))
    }

    async fn review(&self, request: ReviewRequest) -> Result<ReviewReply> {
        let env = self.post("/api/v1/review", &request).await?;
        Ok(ReviewReply::from_envelope(env))
    }
}

/// Keep error messages readable when the backend returns something large
fn truncate_for_error(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    }
}
