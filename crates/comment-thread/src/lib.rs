//! Comment thread cache for the Driftline client.
//!
//! The thread is scoped to exactly one post at a time; switching posts
//! resets it so comments from a previous thread are never rendered against
//! the new one.

mod error;
mod state;
mod store;

pub use error::{ThreadError, ThreadResult};
pub use state::ThreadSnapshot;
pub use store::CommentThread;
