//! Comment thread error types.

use content_gateway::GatewayError;
use thiserror::Error;

/// Error type for comment thread operations.
#[derive(Error, Debug)]
pub enum ThreadError {
    /// Mutation attempted without a signed-in identity
    #[error("You must be logged in")]
    NotSignedIn,

    /// A comment must carry text or an image
    #[error("Write a comment or add an image.")]
    EmptyComment,

    /// Gateway call failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Result type alias using ThreadError.
pub type ThreadResult<T> = Result<T, ThreadError>;
