//! Remote data gateway for the Driftline content platform.
//!
//! This crate provides:
//! - Password-based authentication (sign-in, sign-up, sign-out, token
//!   refresh) and the identity-change stream the session store subscribes to
//! - Row operations over the `posts` and `comments` tables, with mutations
//!   scoped to rows owned by the caller
//! - Blob upload returning a durable public URL
//! - The [`ContentGateway`] trait seam the caches depend on
//!
//! All operations are asynchronous and fail fast with
//! [`GatewayError::NotConfigured`] when the endpoint configuration is absent.

mod auth;
mod config;
mod contract;
mod error;
mod http;
mod rest;
mod storage;
mod types;

pub use auth::{AuthSession, AuthUser, Authenticator};
pub use config::GatewayConfig;
pub use contract::ContentGateway;
pub use error::{GatewayError, GatewayResult};
pub use rest::RestGateway;
pub use storage::{ImageFolder, UploadedImage, IMAGE_BUCKET};
pub use types::{
    CommentChanges, CommentRecord, ImagePatch, NewComment, NewPost, PostChanges, PostPage,
    PostRecord,
};
