//! # pocket-core
//!
//! Shared foundations for the Pocket AI client crates.
//!
//! - [`PocketError`] - Errors for configuration, filesystem and terminal setup
//! - [`logging`] - Tracing setup and the `~/.pocket` path helpers

pub mod error;
pub mod logging;

pub use error::{PocketError, Result};
pub use logging::{LogGuard, init_logging, pocket_home};
