//! aide-client: HTTP client for the aide generation backend
//!
//! Wraps the remote code generation and review service behind the
//! [`GenerationService`] trait so the session core can be tested offline.

pub mod client;
pub mod error;
pub mod types;

pub use client::{GenerationClient, GenerationService};
pub use error::{Error, Result};
pub use types::{GenerateReply, GenerateRequest, ReviewReply, ReviewRequest};
