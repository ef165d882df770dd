//! The post catalog cache and its mutation protocols.

use crate::{CatalogError, CatalogResult, CatalogSnapshot};
use chrono::Utc;
use client_core::SlotStatus;
use content_gateway::{ContentGateway, ImagePatch, NewPost, PostChanges, PostRecord};
use session_store::SessionStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Capacity of the snapshot broadcast channel.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Validation message for a post missing its required fields.
const EMPTY_POST_FIELDS: &str = "Title and content are required";

/// The post catalog cache.
///
/// Each slot (listing, detail) has exactly one writer path and its own
/// generation counter. A settled response whose generation is no longer
/// current lost the race to a newer request and is discarded instead of
/// overwriting newer data. The state mutex is never held across an await.
pub struct PostCatalog {
    gateway: Arc<dyn ContentGateway>,
    session: Arc<SessionStore>,
    state: Mutex<CatalogSnapshot>,
    list_generation: AtomicU64,
    detail_generation: AtomicU64,
    changes: broadcast::Sender<CatalogSnapshot>,
}

impl PostCatalog {
    pub fn new(gateway: Arc<dyn ContentGateway>, session: Arc<SessionStore>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            gateway,
            session,
            state: Mutex::new(CatalogSnapshot::default()),
            list_generation: AtomicU64::new(0),
            detail_generation: AtomicU64::new(0),
            changes,
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.state.lock().unwrap().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogSnapshot> {
        self.changes.subscribe()
    }

    fn apply(&self, mutate: impl FnOnce(&mut CatalogSnapshot)) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            mutate(&mut state);
            state.clone()
        };
        let _ = self.changes.send(snapshot);
    }

    /// Apply a settled result only if `ticket` is still the latest issued
    /// for the slot. The generation is read under the state lock, so a
    /// newer request cannot slip in between the check and the write.
    fn apply_if_current(
        &self,
        ticket: u64,
        generation: &AtomicU64,
        mutate: impl FnOnce(&mut CatalogSnapshot),
    ) -> bool {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            if generation.load(Ordering::SeqCst) != ticket {
                return false;
            }
            mutate(&mut state);
            state.clone()
        };
        let _ = self.changes.send(snapshot);
        true
    }

    fn next_ticket(generation: &AtomicU64) -> u64 {
        generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Fetch one page of posts, newest first.
    ///
    /// `page` and `page_size` are clamped to 1. On success the page fields
    /// are replaced atomically; on failure the previous items stay visible
    /// and only the status and error change.
    pub async fn list_posts(&self, page: u64, page_size: u64) -> CatalogResult<()> {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let from = (page - 1) * page_size;
        let to = from + page_size - 1;

        let ticket = Self::next_ticket(&self.list_generation);
        self.apply(|s| {
            s.list_status = SlotStatus::Loading;
            s.error = None;
        });

        debug!(page, page_size, "Fetching post page");

        match self.gateway.list_posts(from, to).await {
            Ok(fetched) => {
                let applied = self.apply_if_current(ticket, &self.list_generation, |s| {
                    s.items = fetched.items;
                    s.total = fetched.total;
                    s.page = page;
                    s.page_size = page_size;
                    s.list_status = SlotStatus::Succeeded;
                });
                if !applied {
                    debug!(page, "Stale post page discarded");
                }
                Ok(())
            }
            Err(err) => {
                let applied = self.apply_if_current(ticket, &self.list_generation, |s| {
                    s.list_status = SlotStatus::Failed;
                    s.error = Some(err.to_string());
                });
                if !applied {
                    debug!(page, "Stale post page failure discarded");
                    return Ok(());
                }
                warn!(error = %err, page, "Post page fetch failed");
                Err(err.into())
            }
        }
    }

    /// Fetch a single post into the detail slot.
    pub async fn get_post(&self, id: &str) -> CatalogResult<()> {
        let ticket = Self::next_ticket(&self.detail_generation);
        self.apply(|s| {
            s.current_status = SlotStatus::Loading;
            s.error = None;
        });

        debug!(post_id = %id, "Fetching post");

        match self.gateway.fetch_post(id).await {
            Ok(post) => {
                let applied = self.apply_if_current(ticket, &self.detail_generation, |s| {
                    s.current = Some(post);
                    s.current_status = SlotStatus::Succeeded;
                });
                if !applied {
                    debug!(post_id = %id, "Stale post detail discarded");
                }
                Ok(())
            }
            Err(err) => {
                let applied = self.apply_if_current(ticket, &self.detail_generation, |s| {
                    s.current_status = SlotStatus::Failed;
                    s.error = Some(err.to_string());
                });
                if !applied {
                    debug!(post_id = %id, "Stale post detail failure discarded");
                    return Ok(());
                }
                warn!(error = %err, post_id = %id, "Post detail fetch failed");
                Err(err.into())
            }
        }
    }

    /// Create a post authored by the signed-in identity.
    ///
    /// Fails before any network call when nobody is signed in or when the
    /// trimmed title or body is empty. The new post becomes `current`; the
    /// listing is only refreshed by the next `list_posts` call.
    pub async fn create_post(
        &self,
        title: &str,
        body: &str,
        image_url: Option<String>,
    ) -> CatalogResult<PostRecord> {
        self.apply(|s| s.error = None);
        let result = self.try_create_post(title, body, image_url).await;
        if let Err(err) = &result {
            self.apply(|s| s.error = Some(err.to_string()));
        }
        result
    }

    async fn try_create_post(
        &self,
        title: &str,
        body: &str,
        image_url: Option<String>,
    ) -> CatalogResult<PostRecord> {
        let identity = self.session.snapshot();
        let (user, token) = identity.credentials().ok_or(CatalogError::NotSignedIn)?;

        let title = title.trim();
        let body = body.trim();
        if title.is_empty() || body.is_empty() {
            return Err(CatalogError::Validation(EMPTY_POST_FIELDS));
        }

        let draft = NewPost {
            author_id: user.id.clone(),
            author_name: user.display_name(),
            title: title.to_string(),
            body: body.to_string(),
            image_url,
        };
        let post = self.gateway.insert_post(draft, token).await?;

        debug!(post_id = %post.id, "Post created");
        Self::next_ticket(&self.detail_generation);
        self.apply(|s| {
            s.current = Some(post.clone());
            s.current_status = SlotStatus::Succeeded;
        });
        Ok(post)
    }

    /// Update a post owned by the signed-in identity.
    ///
    /// `image` follows the tri-state contract: keep, replace, or clear.
    /// A post owned by somebody else matches zero rows remotely and surfaces
    /// as a not-found error; `current` is left unchanged.
    pub async fn update_post(
        &self,
        id: &str,
        title: &str,
        body: &str,
        image: ImagePatch,
    ) -> CatalogResult<PostRecord> {
        self.apply(|s| s.error = None);
        let result = self.try_update_post(id, title, body, image).await;
        if let Err(err) = &result {
            self.apply(|s| s.error = Some(err.to_string()));
        }
        result
    }

    async fn try_update_post(
        &self,
        id: &str,
        title: &str,
        body: &str,
        image: ImagePatch,
    ) -> CatalogResult<PostRecord> {
        let identity = self.session.snapshot();
        let (user, token) = identity.credentials().ok_or(CatalogError::NotSignedIn)?;

        let title = title.trim();
        let body = body.trim();
        if title.is_empty() || body.is_empty() {
            return Err(CatalogError::Validation(EMPTY_POST_FIELDS));
        }

        let changes = PostChanges {
            title: title.to_string(),
            body: body.to_string(),
            image,
            updated_at: Utc::now(),
        };
        let post = self.gateway.update_post(id, &user.id, changes, token).await?;

        debug!(post_id = %post.id, "Post updated");
        Self::next_ticket(&self.detail_generation);
        self.apply(|s| {
            s.current = Some(post.clone());
            s.current_status = SlotStatus::Succeeded;
        });
        Ok(post)
    }

    /// Delete a post owned by the signed-in identity.
    ///
    /// Idempotent from the cache's perspective: the remote delete is scoped
    /// by owner and succeeds even when it matches nothing, and removing an
    /// id that is not in the current page leaves `items` alone.
    pub async fn delete_post(&self, id: &str) -> CatalogResult<()> {
        self.apply(|s| s.error = None);
        let result = self.try_delete_post(id).await;
        if let Err(err) = &result {
            self.apply(|s| s.error = Some(err.to_string()));
        }
        result
    }

    async fn try_delete_post(&self, id: &str) -> CatalogResult<()> {
        let identity = self.session.snapshot();
        let (user, token) = identity.credentials().ok_or(CatalogError::NotSignedIn)?;

        self.gateway.delete_post(id, &user.id, token).await?;

        debug!(post_id = %id, "Post deleted");
        Self::next_ticket(&self.detail_generation);
        self.apply(|s| {
            let before = s.items.len();
            s.items.retain(|p| p.id != id);
            if s.items.len() < before {
                s.total = s.total.saturating_sub(1);
            }
            if s.current.as_ref().is_some_and(|p| p.id == id) {
                s.current = None;
            }
        });
        Ok(())
    }

    /// Change the page size locally; takes effect on the next `list_posts`.
    pub fn set_page_size(&self, page_size: u64) {
        self.apply(|s| s.page_size = page_size.max(1));
    }

    /// Reset the detail slot.
    pub fn clear_current(&self) {
        Self::next_ticket(&self.detail_generation);
        self.apply(|s| {
            s.current = None;
            s.current_status = SlotStatus::Idle;
            s.error = None;
        });
    }
}
