//! Handler registry
//!
//! A [`Registry`] maps identifiers to handler factories plus metadata. It is
//! filled once at startup, then [`Registry::initialize`] builds one handler per
//! entry and binds it into a [`Dispatcher`].

use crate::dispatcher::Dispatcher;
use crate::family::{ActionFamily, CommandFamily, HandlerKind};
use bot_core::{BotError, Handler, MenuCommand, Result, Transport, Trigger};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Constructor reference for a handler
///
/// Receives the transport the handler replies through and the shared
/// application configuration.
pub type HandlerFactory<C> = fn(Arc<dyn Transport>, Arc<C>) -> Result<Arc<dyn Handler>>;

/// Metadata describing a registered handler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerMetadata {
    /// Human readable description, shown in the command menu
    pub description: String,
    /// Optional regex the handler is triggered by instead of its identifier
    pub pattern: Option<String>,
    /// Free-form extra keys (usage, type, ...)
    pub extra: Map<String, Value>,
}

impl HandlerMetadata {
    /// Metadata with a description
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// Trigger on a regex instead of the exact identifier
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Attach an extra key
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// One registry entry
pub struct HandlerRegistration<C> {
    identifier: String,
    factory: HandlerFactory<C>,
    metadata: HandlerMetadata,
    family_key: &'static str,
}

impl<C> HandlerRegistration<C> {
    /// Identifier the handler was registered under
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Handler constructor
    pub fn factory(&self) -> HandlerFactory<C> {
        self.factory
    }

    /// Registered metadata
    pub fn metadata(&self) -> &HandlerMetadata {
        &self.metadata
    }

    /// Metadata as a JSON object, always carrying the family key and description
    pub fn metadata_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(self.family_key.to_string(), Value::from(self.identifier.as_str()));
        map.insert(
            "description".to_string(),
            Value::from(self.metadata.description.as_str()),
        );
        if let Some(pattern) = &self.metadata.pattern {
            map.insert("pattern".to_string(), Value::from(pattern.as_str()));
        }
        for (key, value) in &self.metadata.extra {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }

    /// Trigger the handler is bound under
    pub fn trigger(&self) -> Result<Trigger> {
        match &self.metadata.pattern {
            Some(pattern) => Trigger::pattern(pattern),
            None => Ok(Trigger::Exact(self.identifier.clone())),
        }
    }
}

impl<C> fmt::Debug for HandlerRegistration<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistration")
            .field("identifier", &self.identifier)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Registry of handlers of one family
///
/// Enumeration follows registration order; re-registering an identifier
/// replaces the entry in place and logs a warning.
pub struct Registry<K: HandlerKind, C> {
    entries: Vec<HandlerRegistration<C>>,
    index: HashMap<String, usize>,
    _family: PhantomData<K>,
}

impl<K: HandlerKind, C> Default for Registry<K, C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            _family: PhantomData,
        }
    }
}

impl<K: HandlerKind, C> Registry<K, C>
where
    C: Send + Sync + 'static,
{
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler
    ///
    /// Returns the replaced registration when the identifier was already taken.
    pub fn register(
        &mut self,
        identifier: impl Into<String>,
        factory: HandlerFactory<C>,
        metadata: HandlerMetadata,
    ) -> Option<HandlerRegistration<C>> {
        let identifier = identifier.into();
        let family = K::FAMILY;
        debug!(
            family = family.key(),
            identifier = %identifier,
            metadata = ?metadata,
            "Registered {}: {identifier}",
            family.key()
        );

        let registration = HandlerRegistration {
            identifier: identifier.clone(),
            factory,
            metadata,
            family_key: family.key(),
        };

        if let Some(&slot) = self.index.get(&identifier) {
            warn!("{family} {identifier} is already registered. Overwriting...");
            return Some(std::mem::replace(&mut self.entries[slot], registration));
        }

        self.index.insert(identifier, self.entries.len());
        self.entries.push(registration);
        None
    }

    /// Get a registration by identifier
    pub fn get(&self, identifier: &str) -> Option<&HandlerRegistration<C>> {
        self.index.get(identifier).map(|&slot| &self.entries[slot])
    }

    /// All registrations in registration order
    pub fn get_all(&self) -> &[HandlerRegistration<C>] {
        &self.entries
    }

    /// Registered identifiers in registration order
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|r| r.identifier.as_str())
    }

    /// Number of registrations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build one handler per registration and bind it into the dispatcher
    ///
    /// Must be called exactly once, after every `register` call and before the
    /// transport starts delivering updates. A second call binds every trigger
    /// again. Returns the number of handlers bound.
    pub fn initialize(
        &self,
        dispatcher: &mut Dispatcher,
        transport: &Arc<dyn Transport>,
        config: &Arc<C>,
    ) -> Result<usize> {
        let family = K::FAMILY;

        for registration in &self.entries {
            let identifier = registration.identifier();
            let handler = (registration.factory)(Arc::clone(transport), Arc::clone(config))
                .inspect_err(|e| {
                    error!(
                        family = family.key(),
                        identifier,
                        error = %e,
                        "Failed to construct handler"
                    );
                })?;

            if handler.family() != family {
                return Err(BotError::InvalidTrigger {
                    trigger: identifier.to_string(),
                    reason: format!(
                        "{} handler registered in the {} registry",
                        handler.family(),
                        family.key()
                    ),
                });
            }

            let binding = handler.bind(registration.trigger()?)?;
            dispatcher.bind(binding, handler);

            debug!(
                family = family.key(),
                identifier,
                metadata = %registration.metadata_value(),
                "Initialized {} handler: {identifier}",
                family.key()
            );
        }

        Ok(self.entries.len())
    }
}

/// Registry of slash command handlers
pub type CommandRegistry<C> = Registry<CommandFamily, C>;

/// Registry of callback and web app handlers
pub type ActionRegistry<C> = Registry<ActionFamily, C>;

impl<C> Registry<CommandFamily, C>
where
    C: Send + Sync + 'static,
{
    /// Command menu entries in registration order
    pub fn menu_commands(&self) -> Vec<MenuCommand> {
        self.entries
            .iter()
            .map(|r| MenuCommand {
                command: r.identifier.clone(),
                description: r.metadata.description.clone(),
            })
            .collect()
    }
}
