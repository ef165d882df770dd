//! The gateway contract consumed by the caches.

use crate::{
    CommentChanges, CommentRecord, GatewayResult, NewComment, NewPost, PostChanges, PostPage,
    PostRecord,
};
use async_trait::async_trait;

/// Row-store operations the caches depend on.
///
/// Implemented by [`crate::RestGateway`]; test code substitutes scripted
/// mocks. Reads are anonymous; mutations carry the caller's access token and
/// are additionally scoped server-side to rows owned by the caller.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Fetch one page of posts, newest first.
    ///
    /// `from`/`to` are inclusive row indexes; the returned total is the full
    /// remote count, independent of the range.
    async fn list_posts(&self, from: u64, to: u64) -> GatewayResult<PostPage>;

    /// Fetch a single post by primary key.
    async fn fetch_post(&self, id: &str) -> GatewayResult<PostRecord>;

    /// Insert a post and return the stored representation.
    async fn insert_post(&self, draft: NewPost, access_token: &str) -> GatewayResult<PostRecord>;

    /// Update a post, scoped by id and owner.
    ///
    /// A zero-row match (id absent, or owned by somebody else) surfaces as
    /// [`crate::GatewayError::NotFound`].
    async fn update_post(
        &self,
        id: &str,
        owner_id: &str,
        changes: PostChanges,
        access_token: &str,
    ) -> GatewayResult<PostRecord>;

    /// Delete a post, scoped by id and owner. Idempotent.
    async fn delete_post(&self, id: &str, owner_id: &str, access_token: &str)
        -> GatewayResult<()>;

    /// Fetch all comments for a post, oldest first.
    async fn list_comments(&self, post_id: &str) -> GatewayResult<Vec<CommentRecord>>;

    /// Insert a comment and return the stored representation.
    async fn insert_comment(
        &self,
        draft: NewComment,
        access_token: &str,
    ) -> GatewayResult<CommentRecord>;

    /// Update a comment, scoped by id and owner.
    async fn update_comment(
        &self,
        id: &str,
        owner_id: &str,
        changes: CommentChanges,
        access_token: &str,
    ) -> GatewayResult<CommentRecord>;

    /// Delete a comment, scoped by id and owner. Idempotent.
    async fn delete_comment(
        &self,
        id: &str,
        owner_id: &str,
        access_token: &str,
    ) -> GatewayResult<()>;
}
