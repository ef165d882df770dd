//! Catalog cache state.

use client_core::SlotStatus;
use content_gateway::PostRecord;

/// Default page size for the post listing.
pub const DEFAULT_PAGE_SIZE: u64 = 5;

/// Snapshot of the paginated post catalog and its detail slot.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    /// Exactly one page of posts, newest first.
    pub items: Vec<PostRecord>,
    /// Full remote row count, independent of the page size.
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub list_status: SlotStatus,
    /// Detail slot, fetched by id; independent of `items`.
    pub current: Option<PostRecord>,
    pub current_status: SlotStatus,
    /// Message from the most recent failure, if any.
    pub error: Option<String>,
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            list_status: SlotStatus::Idle,
            current: None,
            current_status: SlotStatus::Idle,
            error: None,
        }
    }
}

impl CatalogSnapshot {
    /// Number of pages at the current page size.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.page_size.max(1))
    }
}
