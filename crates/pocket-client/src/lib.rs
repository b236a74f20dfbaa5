//! # pocket-client
//!
//! Client-side core of the Pocket AI assistant.
//!
//! This crate provides:
//! - [`ConversationSession`] - Transcript and the one-in-flight command cycle
//! - [`ConfigStore`] - The backend's reported profile and routing table
//! - [`Navigation`] - Which view is active
//! - [`AssistantBackend`] - The HTTP contract, with [`HttpBackend`] and [`MockBackend`]
//!
//! ## Example
//!
//! ```no_run
//! use pocket_client::{ClientConfig, ConversationSession, HttpBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pocket_client::ClientError> {
//!     let backend = HttpBackend::from_config(&ClientConfig::default())?;
//!     let mut session = ConversationSession::new();
//!
//!     if let Some(reply) = session.submit_and_wait(&backend, "Add task to buy milk").await {
//!         println!("{}", reply.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod config_store;
pub mod error;
pub mod navigation;
pub mod session;
pub mod types;

pub use backend::{AssistantBackend, HttpBackend, MockBackend, MockReply};
pub use config::ClientConfig;
pub use config_store::{ConfigStore, LoadStatus};
pub use error::{ClientError, Result};
pub use navigation::{ActiveView, Navigation};
pub use session::{
    ConversationSession, PendingCommand, SessionState, SessionView, SkipReason, SubmitOutcome,
};
pub use types::{CommandResponse, ConfigSnapshot, Intent, Message, Role};
