//! Core types, configuration, and logging for the Driftline client.

mod config;
mod logging;
mod status;

pub use config::{Config, DEFAULT_LOG_LEVEL};
pub use logging::{init_logging, parse_level};
pub use status::SlotStatus;
