//! Error types for aide-session

use thiserror::Error;

/// Result type alias using aide-session Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during session operations.
///
/// None of these are fatal to the session: collaborator failures become
/// assistant error messages, file failures are skipped or recorded on the
/// offending action.
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the generation backend client
    #[error(transparent)]
    Client(#[from] aide_client::Error),

    /// A filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic session error
    #[error("{0}")]
    Other(String),
}
