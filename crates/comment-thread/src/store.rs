//! The comment thread cache and its mutation protocols.

use crate::{ThreadError, ThreadResult, ThreadSnapshot};
use client_core::SlotStatus;
use content_gateway::{CommentChanges, CommentRecord, ContentGateway, ImagePatch, NewComment};
use session_store::SessionStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Capacity of the snapshot broadcast channel.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// The comment thread cache.
///
/// The listing carries a generation counter: `clear_thread` and every
/// `list_comments` call bump it, so a response from a previous navigation is
/// discarded instead of resurrecting the old thread. The state mutex is
/// never held across an await.
pub struct CommentThread {
    gateway: Arc<dyn ContentGateway>,
    session: Arc<SessionStore>,
    state: Mutex<ThreadSnapshot>,
    list_generation: AtomicU64,
    changes: broadcast::Sender<ThreadSnapshot>,
}

impl CommentThread {
    pub fn new(gateway: Arc<dyn ContentGateway>, session: Arc<SessionStore>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            gateway,
            session,
            state: Mutex::new(ThreadSnapshot::default()),
            list_generation: AtomicU64::new(0),
            changes,
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> ThreadSnapshot {
        self.state.lock().unwrap().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> broadcast::Receiver<ThreadSnapshot> {
        self.changes.subscribe()
    }

    fn apply(&self, mutate: impl FnOnce(&mut ThreadSnapshot)) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            mutate(&mut state);
            state.clone()
        };
        let _ = self.changes.send(snapshot);
    }

    /// Apply a settled result only if `ticket` is still the latest issued
    /// for the listing. Read under the state lock so a newer request cannot
    /// slip in between the check and the write.
    fn apply_if_current(&self, ticket: u64, mutate: impl FnOnce(&mut ThreadSnapshot)) -> bool {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            if self.list_generation.load(Ordering::SeqCst) != ticket {
                return false;
            }
            mutate(&mut state);
            state.clone()
        };
        let _ = self.changes.send(snapshot);
        true
    }

    fn next_ticket(&self) -> u64 {
        self.list_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Fetch all comments for a post, oldest first.
    pub async fn list_comments(&self, post_id: &str) -> ThreadResult<()> {
        let ticket = self.next_ticket();
        self.apply(|s| {
            s.status = SlotStatus::Loading;
            s.error = None;
        });

        debug!(post_id = %post_id, "Fetching comments");

        match self.gateway.list_comments(post_id).await {
            Ok(items) => {
                let applied = self.apply_if_current(ticket, |s| {
                    s.post_id = Some(post_id.to_string());
                    s.items = items;
                    s.status = SlotStatus::Succeeded;
                });
                if !applied {
                    debug!(post_id = %post_id, "Stale comment list discarded");
                }
                Ok(())
            }
            Err(err) => {
                let applied = self.apply_if_current(ticket, |s| {
                    s.status = SlotStatus::Failed;
                    s.error = Some(err.to_string());
                });
                if !applied {
                    debug!(post_id = %post_id, "Stale comment list failure discarded");
                    return Ok(());
                }
                warn!(error = %err, post_id = %post_id, "Comment fetch failed");
                Err(err.into())
            }
        }
    }

    /// Create a comment on a post.
    ///
    /// Fails before any network call when nobody is signed in or when both
    /// the trimmed content and the image are absent. The stored comment is
    /// appended only while the thread still shows the same post, so a reply
    /// that settles after a navigation does not leak into the new thread.
    pub async fn create_comment(
        &self,
        post_id: &str,
        content: &str,
        image_url: Option<String>,
    ) -> ThreadResult<CommentRecord> {
        self.apply(|s| s.error = None);
        let result = self.try_create_comment(post_id, content, image_url).await;
        if let Err(err) = &result {
            self.apply(|s| s.error = Some(err.to_string()));
        }
        result
    }

    async fn try_create_comment(
        &self,
        post_id: &str,
        content: &str,
        image_url: Option<String>,
    ) -> ThreadResult<CommentRecord> {
        let identity = self.session.snapshot();
        let (user, token) = identity.credentials().ok_or(ThreadError::NotSignedIn)?;

        let content = content.trim();
        if content.is_empty() && image_url.is_none() {
            return Err(ThreadError::EmptyComment);
        }

        let draft = NewComment {
            post_id: post_id.to_string(),
            author_id: user.id.clone(),
            author_name: user.display_name(),
            content: content.to_string(),
            image_url,
        };
        let comment = self.gateway.insert_comment(draft, token).await?;

        debug!(comment_id = %comment.id, post_id = %comment.post_id, "Comment created");
        let mut appended = false;
        self.apply(|s| {
            if s.post_id.as_deref() == Some(comment.post_id.as_str()) {
                s.items.push(comment.clone());
                appended = true;
            }
        });
        if !appended {
            debug!(post_id = %comment.post_id, "Comment for a previous thread not appended");
        }
        Ok(comment)
    }

    /// Update a comment owned by the signed-in identity.
    ///
    /// `image` follows the tri-state contract. Editing a comment into
    /// text-less, image-less emptiness is rejected locally; with `Keep` or
    /// `Set` an empty text is allowed because the row still carries an
    /// image. The stored comment replaces the matching item in place.
    pub async fn update_comment(
        &self,
        id: &str,
        content: &str,
        image: ImagePatch,
    ) -> ThreadResult<CommentRecord> {
        self.apply(|s| s.error = None);
        let result = self.try_update_comment(id, content, image).await;
        if let Err(err) = &result {
            self.apply(|s| s.error = Some(err.to_string()));
        }
        result
    }

    async fn try_update_comment(
        &self,
        id: &str,
        content: &str,
        image: ImagePatch,
    ) -> ThreadResult<CommentRecord> {
        let identity = self.session.snapshot();
        let (user, token) = identity.credentials().ok_or(ThreadError::NotSignedIn)?;

        let content = content.trim();
        if content.is_empty() && image == ImagePatch::Clear {
            return Err(ThreadError::EmptyComment);
        }

        let changes = CommentChanges {
            content: content.to_string(),
            image,
        };
        let comment = self.gateway.update_comment(id, &user.id, changes, token).await?;

        debug!(comment_id = %comment.id, "Comment updated");
        self.apply(|s| {
            if let Some(slot) = s.items.iter_mut().find(|c| c.id == comment.id) {
                *slot = comment.clone();
            }
        });
        Ok(comment)
    }

    /// Delete a comment owned by the signed-in identity.
    ///
    /// Removes the item by id regardless of the current thread; idempotent
    /// when already absent.
    pub async fn delete_comment(&self, id: &str) -> ThreadResult<()> {
        self.apply(|s| s.error = None);
        let result = self.try_delete_comment(id).await;
        if let Err(err) = &result {
            self.apply(|s| s.error = Some(err.to_string()));
        }
        result
    }

    async fn try_delete_comment(&self, id: &str) -> ThreadResult<()> {
        let identity = self.session.snapshot();
        let (user, token) = identity.credentials().ok_or(ThreadError::NotSignedIn)?;

        self.gateway.delete_comment(id, &user.id, token).await?;

        debug!(comment_id = %id, "Comment deleted");
        self.apply(|s| s.items.retain(|c| c.id != id));
        Ok(())
    }

    /// Reset the thread to empty and idle.
    ///
    /// Must be invoked when the viewed post changes, before the next
    /// `list_comments` call resolves; the bumped generation also discards
    /// any response still in flight for the previous post.
    pub fn clear_thread(&self) {
        self.next_ticket();
        self.apply(|s| {
            s.post_id = None;
            s.items.clear();
            s.status = SlotStatus::Idle;
            s.error = None;
        });
    }
}
