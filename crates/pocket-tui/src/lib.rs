//! Terminal UI for the Pocket AI client.
//!
//! A Ratatui shell around the client core: a sidebar with the three views,
//! the chat transcript, and the backend status cards.
//!
//! ## Keys
//!
//! - `F1` / `F2` / `F3` - Chat / Status / Settings
//! - `Tab` / `Shift+Tab` - Cycle views
//! - `Enter` - Send the draft (chat view)
//! - `Up` / `Down` - Scroll the transcript
//! - `Esc` or `Ctrl+C` - Quit

pub mod app;
pub mod event;
pub mod panels;

pub use app::{App, AppResult, BackendEvent};
pub use event::{AppEvent, InputHandler};
