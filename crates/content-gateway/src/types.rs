//! Wire records and mutation payloads for the content tables.
//!
//! Rust field names are domain names; `#[serde(rename)]` maps them onto the
//! remote column names (`user_id`, `username`, `content`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored post row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    /// Owning identity; immutable after creation.
    #[serde(rename = "user_id")]
    pub author_id: String,
    /// Display name frozen at creation time, never recomputed.
    #[serde(rename = "username")]
    pub author_name: String,
    pub title: String,
    #[serde(rename = "content")]
    pub body: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Null until the first edit, then the time of the latest edit.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A stored comment row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub post_id: String,
    #[serde(rename = "user_id")]
    pub author_id: String,
    #[serde(rename = "username")]
    pub author_name: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One page of posts together with the exact remote row count.
#[derive(Debug, Clone, PartialEq)]
pub struct PostPage {
    pub items: Vec<PostRecord>,
    pub total: u64,
}

/// Insert payload for a post row.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    #[serde(rename = "user_id")]
    pub author_id: String,
    #[serde(rename = "username")]
    pub author_name: String,
    pub title: String,
    #[serde(rename = "content")]
    pub body: String,
    pub image_url: Option<String>,
}

/// Insert payload for a comment row.
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub post_id: String,
    #[serde(rename = "user_id")]
    pub author_id: String,
    #[serde(rename = "username")]
    pub author_name: String,
    pub content: String,
    pub image_url: Option<String>,
}

/// Tri-state update for an optional image column.
///
/// `Keep` omits the column from the payload, `Set` writes the URL, `Clear`
/// writes SQL null. This keeps "not provided" and "provided as empty"
/// unambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePatch {
    Keep,
    Set(String),
    Clear,
}

impl ImagePatch {
    /// Fold the patch into a JSON update payload.
    pub fn apply_to(&self, payload: &mut Map<String, Value>) {
        match self {
            ImagePatch::Keep => {}
            ImagePatch::Set(url) => {
                payload.insert("image_url".to_string(), Value::String(url.clone()));
            }
            ImagePatch::Clear => {
                payload.insert("image_url".to_string(), Value::Null);
            }
        }
    }
}

/// Update payload for a post row.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub body: String,
    pub image: ImagePatch,
    /// Edit time, stamped by the caller.
    pub updated_at: DateTime<Utc>,
}

impl PostChanges {
    /// Serialize into the PATCH body.
    pub fn payload(&self) -> Value {
        let mut map = Map::new();
        map.insert("title".to_string(), Value::String(self.title.clone()));
        map.insert("content".to_string(), Value::String(self.body.clone()));
        map.insert(
            "updated_at".to_string(),
            Value::String(self.updated_at.to_rfc3339()),
        );
        self.image.apply_to(&mut map);
        Value::Object(map)
    }
}

/// Update payload for a comment row.
#[derive(Debug, Clone)]
pub struct CommentChanges {
    pub content: String,
    pub image: ImagePatch,
}

impl CommentChanges {
    /// Serialize into the PATCH body.
    pub fn payload(&self) -> Value {
        let mut map = Map::new();
        map.insert("content".to_string(), Value::String(self.content.clone()));
        self.image.apply_to(&mut map);
        Value::Object(map)
    }
}
