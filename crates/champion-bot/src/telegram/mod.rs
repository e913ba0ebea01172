//! Telegram Bot API transport
//!
//! [`TelegramApi`] implements the outbound [`bot_core::Transport`] seam and
//! the `getUpdates` source the poller drains.

pub mod api;
pub mod poller;

pub use api::TelegramApi;
pub use poller::{PollerConfig, UpdateSource, poll_loop};
