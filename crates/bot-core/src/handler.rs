//! Handler contract shared by command and action handlers
//!
//! A handler is constructed once per registered identifier and reused for
//! every matching event, so implementations must not keep per-event state.

use crate::event::{Update, UserInfo};
use crate::transport::{OutgoingMessage, Transport};
use crate::{BotError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::fmt;
use tracing::{debug, error, warn};

/// Generic apology sent when a command fails
pub const COMMAND_ERROR_REPLY: &str =
    "Sorry, there was an error processing your command. Please try again.";

/// Generic apology sent when a callback action fails
pub const ACTION_ERROR_REPLY: &str =
    "Sorry, there was an error processing your request. Please try again.";

/// The family a handler belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerFamily {
    /// Slash commands, bound by exact name
    Command,
    /// Callback queries and web app payloads, bound by string or pattern
    Action,
}

impl HandlerFamily {
    /// Lower-case key used in registry metadata and log records
    pub fn key(self) -> &'static str {
        match self {
            HandlerFamily::Command => "command",
            HandlerFamily::Action => "action",
        }
    }

    /// Fixed reply sent to the user when a handler of this family fails
    pub fn error_reply(self) -> &'static str {
        match self {
            HandlerFamily::Command => COMMAND_ERROR_REPLY,
            HandlerFamily::Action => ACTION_ERROR_REPLY,
        }
    }
}

impl fmt::Display for HandlerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerFamily::Command => write!(f, "Command"),
            HandlerFamily::Action => write!(f, "Action"),
        }
    }
}

/// What a dispatcher matches inbound events against
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Exact string equality
    Exact(String),
    /// Regular expression match
    Pattern(Regex),
}

impl Trigger {
    /// Compile a pattern trigger
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Trigger::Pattern)
            .map_err(|e| BotError::InvalidTrigger {
                trigger: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Whether the input selects this trigger
    pub fn matches(&self, input: &str) -> bool {
        match self {
            Trigger::Exact(s) => s == input,
            Trigger::Pattern(re) => re.is_match(input),
        }
    }

    /// Source text of the trigger
    pub fn as_str(&self) -> &str {
        match self {
            Trigger::Exact(s) => s,
            Trigger::Pattern(re) => re.as_str(),
        }
    }
}

impl From<&str> for Trigger {
    fn from(s: &str) -> Self {
        Trigger::Exact(s.to_string())
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Exact(s) => write!(f, "{s}"),
            Trigger::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Where a handler is attached in the dispatcher's routing table
#[derive(Debug, Clone)]
pub enum Binding {
    /// Slash command with this exact name
    Command(String),
    /// Callback queries whose data matches the trigger
    Callback(Trigger),
    /// Web app data service messages
    WebAppData,
}

/// Check that a command name can be bound
pub fn validate_command_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("command name is empty")
    } else if name.starts_with('/') {
        Some("command name must not include the leading slash")
    } else if name.chars().any(char::is_whitespace) {
        Some("command name must not contain whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(BotError::InvalidTrigger {
            trigger: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Capability every command and action handler implements
///
/// Only `family` and `transport` are required. `handle` defaults to an
/// [`BotError::Unimplemented`] error naming the family, so a handler that
/// forgets to override it fails loudly on its first event.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Family this handler belongs to
    fn family(&self) -> HandlerFamily;

    /// Transport used for replies
    fn transport(&self) -> &dyn Transport;

    /// Resolve the routing binding for the trigger this handler is registered under
    ///
    /// Commands accept exact names only; actions accept exact strings and
    /// patterns.
    fn bind(&self, trigger: Trigger) -> Result<Binding> {
        match (self.family(), trigger) {
            (HandlerFamily::Command, Trigger::Exact(name)) => {
                validate_command_name(&name)?;
                Ok(Binding::Command(name))
            }
            (HandlerFamily::Command, Trigger::Pattern(re)) => Err(BotError::InvalidTrigger {
                trigger: re.as_str().to_string(),
                reason: "commands bind by exact name only".to_string(),
            }),
            (HandlerFamily::Action, trigger) => Ok(Binding::Callback(trigger)),
        }
    }

    /// Handle one event
    async fn handle(&self, update: &Update) -> Result<()> {
        let _ = update;
        Err(BotError::Unimplemented {
            family: self.family(),
        })
    }

    /// Project the originating user
    fn user_info(&self, update: &Update) -> UserInfo {
        UserInfo::from_update(update)
    }

    /// Log a failed event and send the fixed apology for `kind`
    ///
    /// This is the only place error detail meets the user path; the reply
    /// never contains it.
    async fn handle_error(&self, update: &Update, err: &BotError, kind: HandlerFamily) {
        let user = self.user_info(update);
        let chain = err.chain();

        match kind {
            HandlerFamily::Command => error!(
                user = ?user,
                error.message = %err,
                error.chain = ?chain,
                command = update.text().unwrap_or_default(),
                "Command error: {err}"
            ),
            HandlerFamily::Action => error!(
                user = ?user,
                error.message = %err,
                error.chain = ?chain,
                action = update.callback_data().unwrap_or_default(),
                "Action error: {err}"
            ),
        }

        let Some(chat_id) = update.chat_id() else {
            warn!(user_id = user.id, "No chat to send error reply to");
            return;
        };

        if let Err(send_err) = self
            .transport()
            .send_message(chat_id, OutgoingMessage::text(kind.error_reply()))
            .await
        {
            warn!(user_id = user.id, error = %send_err, "Failed to send error reply");
        }
    }

    /// Acknowledge the callback query, best effort
    ///
    /// Failures are logged and swallowed so they never mask the handler result.
    async fn answer_callback(&self, update: &Update) {
        let Some(id) = update.callback_query_id() else {
            debug!("No callback query to acknowledge");
            return;
        };

        if let Err(err) = self.transport().answer_callback_query(id).await {
            error!(
                error = %err,
                user = ?self.user_info(update),
                callback_query = update.callback_data().unwrap_or_default(),
                "Error answering callback query"
            );
        }
    }
}
