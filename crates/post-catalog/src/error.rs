//! Post catalog error types.

use content_gateway::GatewayError;
use thiserror::Error;

/// Error type for post catalog operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Mutation attempted without a signed-in identity
    #[error("You must be logged in")]
    NotSignedIn,

    /// Required fields missing or empty
    #[error("{0}")]
    Validation(&'static str),

    /// Gateway call failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Result type alias using CatalogError.
pub type CatalogResult<T> = Result<T, CatalogError>;
