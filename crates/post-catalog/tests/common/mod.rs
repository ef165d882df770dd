//! Scripted gateway mock and fixtures shared by the catalog tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use content_gateway::{
    AuthSession, AuthUser, CommentChanges, CommentRecord, ContentGateway, GatewayError,
    GatewayResult, NewComment, NewPost, PostChanges, PostPage, PostRecord,
};
use session_store::SessionStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Build a post row for tests; `age` orders rows (larger = older).
pub fn post(id: &str, author_id: &str, age_seconds: i64) -> PostRecord {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    PostRecord {
        id: id.to_string(),
        author_id: author_id.to_string(),
        author_name: "alice".to_string(),
        title: format!("title {id}"),
        body: format!("body {id}"),
        image_url: None,
        created_at: base - Duration::seconds(age_seconds),
        updated_at: None,
    }
}

/// Build a session for the given user.
pub fn session(user_id: &str, email: Option<&str>) -> AuthSession {
    AuthSession {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        expires_at: Utc::now() + Duration::hours(1),
        user: AuthUser {
            id: user_id.to_string(),
            email: email.map(|e| e.to_string()),
        },
    }
}

/// A session store with a signed-in identity.
pub fn signed_in(user_id: &str, email: Option<&str>) -> Arc<SessionStore> {
    let store = Arc::new(SessionStore::new());
    store.set_identity(Some(session(user_id, email)));
    store
}

/// A session store that has resolved to signed-out.
pub fn anonymous() -> Arc<SessionStore> {
    let store = Arc::new(SessionStore::new());
    store.set_identity(None);
    store
}

/// One scripted reply, optionally delayed to model a slow response.
pub struct Scripted<T> {
    pub delay_ms: u64,
    pub result: GatewayResult<T>,
}

impl<T> Scripted<T> {
    pub fn ok(value: T) -> Self {
        Self {
            delay_ms: 0,
            result: Ok(value),
        }
    }

    pub fn err(err: GatewayError) -> Self {
        Self {
            delay_ms: 0,
            result: Err(err),
        }
    }

    pub fn delayed(value: T, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            result: Ok(value),
        }
    }
}

/// Gateway mock driven by per-operation scripts. Each script plays once.
#[derive(Default)]
pub struct MockGateway {
    /// `list_posts` replies keyed by the `from` row index.
    pub pages: Mutex<HashMap<u64, Scripted<PostPage>>>,
    /// `fetch_post` replies keyed by id.
    pub posts_by_id: Mutex<HashMap<String, Scripted<PostRecord>>>,
    pub insert_reply: Mutex<Option<Scripted<PostRecord>>>,
    pub update_reply: Mutex<Option<Scripted<PostRecord>>>,
    pub delete_reply: Mutex<Option<Scripted<()>>>,
    /// Every gateway call in arrival order.
    pub calls: Mutex<Vec<String>>,
    /// Captured insert drafts, for payload assertions.
    pub inserted: Mutex<Vec<NewPost>>,
    /// Captured updates as (id, owner_id, changes).
    pub updated: Mutex<Vec<(String, String, PostChanges)>>,
    /// Captured deletes as (id, owner_id).
    pub deleted: Mutex<Vec<(String, String)>>,
}

impl MockGateway {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    async fn play<T>(script: Option<Scripted<T>>) -> GatewayResult<T> {
        let scripted = script.expect("gateway call without a script");
        if scripted.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(scripted.delay_ms)).await;
        }
        scripted.result
    }
}

#[async_trait]
impl ContentGateway for MockGateway {
    async fn list_posts(&self, from: u64, to: u64) -> GatewayResult<PostPage> {
        self.record(format!("list_posts {from}-{to}"));
        let script = self.pages.lock().unwrap().remove(&from);
        Self::play(script).await
    }

    async fn fetch_post(&self, id: &str) -> GatewayResult<PostRecord> {
        self.record(format!("fetch_post {id}"));
        let script = self.posts_by_id.lock().unwrap().remove(id);
        Self::play(script).await
    }

    async fn insert_post(&self, draft: NewPost, _access_token: &str) -> GatewayResult<PostRecord> {
        self.record("insert_post");
        self.inserted.lock().unwrap().push(draft);
        let script = self.insert_reply.lock().unwrap().take();
        Self::play(script).await
    }

    async fn update_post(
        &self,
        id: &str,
        owner_id: &str,
        changes: PostChanges,
        _access_token: &str,
    ) -> GatewayResult<PostRecord> {
        self.record(format!("update_post {id}"));
        self.updated
            .lock()
            .unwrap()
            .push((id.to_string(), owner_id.to_string(), changes));
        let script = self.update_reply.lock().unwrap().take();
        Self::play(script).await
    }

    async fn delete_post(
        &self,
        id: &str,
        owner_id: &str,
        _access_token: &str,
    ) -> GatewayResult<()> {
        self.record(format!("delete_post {id}"));
        self.deleted
            .lock()
            .unwrap()
            .push((id.to_string(), owner_id.to_string()));
        let script = self.delete_reply.lock().unwrap().take();
        Self::play(script).await
    }

    async fn list_comments(&self, _post_id: &str) -> GatewayResult<Vec<CommentRecord>> {
        unreachable!("catalog tests never list comments")
    }

    async fn insert_comment(
        &self,
        _draft: NewComment,
        _access_token: &str,
    ) -> GatewayResult<CommentRecord> {
        unreachable!("catalog tests never insert comments")
    }

    async fn update_comment(
        &self,
        _id: &str,
        _owner_id: &str,
        _changes: CommentChanges,
        _access_token: &str,
    ) -> GatewayResult<CommentRecord> {
        unreachable!("catalog tests never update comments")
    }

    async fn delete_comment(
        &self,
        _id: &str,
        _owner_id: &str,
        _access_token: &str,
    ) -> GatewayResult<()> {
        unreachable!("catalog tests never delete comments")
    }
}
