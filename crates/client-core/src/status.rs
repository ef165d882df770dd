//! Lifecycle status shared by all asynchronous cache slots.

use serde::{Deserialize, Serialize};

/// State of an asynchronous cache slot (list, detail, thread).
///
/// Every slot starts `Idle`, moves to `Loading` when a request is issued,
/// and settles on `Succeeded` or `Failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// No request has been issued yet.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The last request settled successfully.
    Succeeded,
    /// The last request failed.
    Failed,
}

impl SlotStatus {
    /// Whether a request is currently in flight.
    pub fn is_loading(self) -> bool {
        matches!(self, SlotStatus::Loading)
    }
}
