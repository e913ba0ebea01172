//! Handler registration and routing for the Champion Trade bot
//!
//! Registries map identifiers to handler factories and metadata. During
//! `initialize` every registration is instantiated once and bound into the
//! [`Dispatcher`], which routes each inbound update to at most one handler.

pub mod dispatcher;
pub mod family;
pub mod registry;

pub use dispatcher::{DispatchOutcome, Dispatcher, UNHANDLED_ERROR_REPLY};
pub use family::{ActionFamily, CommandFamily, HandlerKind};
pub use registry::{
    ActionRegistry, CommandRegistry, HandlerFactory, HandlerMetadata, HandlerRegistration,
    Registry,
};
