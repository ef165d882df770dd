//! Paginated post catalog cache for the Driftline client.
//!
//! Owns the post listing (one page at a time, newest first), the
//! single-post detail slot, and every post mutation protocol. Reads are
//! cloned snapshots; writes go through the asynchronous operations on
//! [`PostCatalog`].

mod error;
mod state;
mod store;

pub use error::{CatalogError, CatalogResult};
pub use state::{CatalogSnapshot, DEFAULT_PAGE_SIZE};
pub use store::PostCatalog;
