//! Core abstractions for the Champion Trade bot
//!
//! This crate defines the handler contract, the inbound event model and the
//! outbound transport seam shared by every other crate in the workspace.

pub mod error;
pub mod event;
pub mod handler;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{BotError, Result};
pub use event::{CallbackQuery, Chat, Message, Update, UpdateKind, User, UserInfo, WebAppData};
pub use handler::{
    ACTION_ERROR_REPLY, Binding, COMMAND_ERROR_REPLY, Handler, HandlerFamily, Trigger,
    validate_command_name,
};
pub use transport::{
    ButtonAction, InlineKeyboardButton, InlineKeyboardMarkup, LinkPreviewOptions, MenuCommand,
    OutgoingMessage, ParseMode, Transport, WebAppInfo,
};
