//! Handler family markers
//!
//! A registry is parameterized by one of these marker types so a command
//! registry and an action registry are distinct types.

use bot_core::HandlerFamily;

/// Marker trait tying a registry to a handler family
pub trait HandlerKind: Send + Sync + 'static {
    /// Family of every handler stored in the registry
    const FAMILY: HandlerFamily;
}

/// Slash command handlers
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandFamily;

/// Callback and web app handlers
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionFamily;

impl HandlerKind for CommandFamily {
    const FAMILY: HandlerFamily = HandlerFamily::Command;
}

impl HandlerKind for ActionFamily {
    const FAMILY: HandlerFamily = HandlerFamily::Action;
}
