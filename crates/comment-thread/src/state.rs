//! Thread cache state.

use client_core::SlotStatus;
use content_gateway::CommentRecord;

/// Snapshot of the comment thread for the currently viewed post.
///
/// Invariant: every item's `post_id` equals the snapshot's `post_id`.
#[derive(Debug, Clone, Default)]
pub struct ThreadSnapshot {
    /// The post the thread belongs to; `None` until the first fetch.
    pub post_id: Option<String>,
    /// Comments in conversational order, oldest first.
    pub items: Vec<CommentRecord>,
    pub status: SlotStatus,
    /// Message from the most recent failure, if any.
    pub error: Option<String>,
}
