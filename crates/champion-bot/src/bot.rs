//! Composition root
//!
//! Builds the registries, binds every handler into the dispatcher, then
//! publishes the command menu and runs the poll loop.

use crate::actions::register_actions;
use crate::commands::register_commands;
use crate::config::BotConfig;
use crate::telegram::{PollerConfig, UpdateSource, poll_loop};
use bot_core::{Result, Transport, Update};
use bot_handlers::{ActionRegistry, CommandRegistry, DispatchOutcome, Dispatcher};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// The Champion Trade bot
pub struct ChampionBot {
    config: Arc<BotConfig>,
    transport: Arc<dyn Transport>,
    commands: CommandRegistry<BotConfig>,
    actions: ActionRegistry<BotConfig>,
    dispatcher: Dispatcher,
}

impl ChampionBot {
    /// Register and initialize every handler
    pub fn new(config: BotConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let config = Arc::new(config);

        let mut commands = CommandRegistry::new();
        register_commands(&mut commands);
        let mut actions = ActionRegistry::new();
        register_actions(&mut actions);

        let mut dispatcher = Dispatcher::new(Arc::clone(&transport));
        let command_count = commands.initialize(&mut dispatcher, &transport, &config)?;
        let action_count = actions.initialize(&mut dispatcher, &transport, &config)?;

        info!(
            commands = command_count,
            actions = action_count,
            env = %config.environment,
            "Handlers initialized"
        );

        Ok(Self {
            config,
            transport,
            commands,
            actions,
            dispatcher,
        })
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn commands(&self) -> &CommandRegistry<BotConfig> {
        &self.commands
    }

    pub fn actions(&self) -> &ActionRegistry<BotConfig> {
        &self.actions
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Only answer `/name@botname` commands addressed to `username`
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        let username = username.into();
        debug!(username = %username, "Commands scoped to bot username");
        self.dispatcher.set_bot_username(username);
        self
    }

    /// Route a single update
    pub async fn handle_update(&self, update: &Update) -> DispatchOutcome {
        self.dispatcher.dispatch(update).await
    }

    /// Publish the command menu
    pub async fn configure_menu(&self) -> Result<()> {
        let menu = self.commands.menu_commands();
        if let Err(e) = self.transport.set_my_commands(&menu).await {
            error!(error = %e, commands = ?menu, "Failed to configure bot commands");
            return Err(e);
        }
        debug!(commands = ?menu, "Bot commands configured");
        Ok(())
    }

    /// Publish the menu, then poll until `shutdown` turns true
    ///
    /// A menu failure aborts the launch.
    pub async fn launch<S>(&self, source: &S, shutdown: watch::Receiver<bool>) -> Result<()>
    where
        S: UpdateSource + ?Sized,
    {
        self.configure_menu().await?;

        info!(
            env = %self.config.environment,
            web_app_url = %self.config.web_app_url,
            web_app_host_url = %self.config.web_app_host_url,
            "Champion Bot is running"
        );

        let poller = PollerConfig::new(self.config.poll_timeout);
        let processed = poll_loop(source, &self.dispatcher, poller, shutdown).await;

        warn!(env = %self.config.environment, processed, "Bot stopped");
        Ok(())
    }

    /// Launch and stop on ctrl-c
    pub async fn run_until_ctrl_c<S>(&self, source: &S) -> Result<()>
    where
        S: UpdateSource + ?Sized,
    {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => warn!("Stopping bot due to SIGINT"),
                Err(e) => error!(error = %e, "Failed to listen for ctrl-c"),
            }
            let _ = tx.send(true);
        });
        self.launch(source, rx).await
    }
}
