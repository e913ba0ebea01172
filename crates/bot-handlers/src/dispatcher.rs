//! Update dispatcher
//!
//! Routing table built by the registries during `initialize`. Each update is
//! routed to at most one handler; handler errors go through the handler's
//! own `handle_error`, and anything escaping that (a panic) is caught by the
//! catch-all so one bad event never takes the process down.

use bot_core::{
    Binding, Handler, HandlerFamily, OutgoingMessage, Transport, Trigger, Update, UpdateKind,
    UserInfo,
};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Reply sent by the catch-all
pub const UNHANDLED_ERROR_REPLY: &str = "An error occurred. Please try again later.";

/// Result of dispatching one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler ran to completion
    Handled,
    /// A handler failed and its error handler replied
    Failed,
    /// No route matched the update
    Unrouted,
    /// The update kind is not routed at all
    Ignored,
    /// A handler panicked and the catch-all replied
    Crashed,
}

/// Routing table from triggers to handler instances
pub struct Dispatcher {
    commands: HashMap<String, Arc<dyn Handler>>,
    callbacks: Vec<(Trigger, Arc<dyn Handler>)>,
    web_app: Option<Arc<dyn Handler>>,
    transport: Arc<dyn Transport>,
    bot_username: Option<String>,
}

impl Dispatcher {
    /// Create an empty dispatcher replying through `transport` when no handler can
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            commands: HashMap::new(),
            callbacks: Vec::new(),
            web_app: None,
            transport,
            bot_username: None,
        }
    }

    /// Username commands must be addressed to in the `/name@botname` form
    ///
    /// Until set, any `@botname` suffix is accepted.
    pub fn set_bot_username(&mut self, username: impl Into<String>) {
        self.bot_username = Some(username.into());
    }

    /// Whether a command addressed with `@target` is meant for this bot
    fn addressed_to_me(&self, update: &Update) -> bool {
        match (update.command_target(), &self.bot_username) {
            (Some(target), Some(me)) => target.eq_ignore_ascii_case(me),
            _ => true,
        }
    }

    /// Attach a handler under a binding
    pub fn bind(&mut self, binding: Binding, handler: Arc<dyn Handler>) {
        match binding {
            Binding::Command(name) => {
                if self.commands.insert(name.clone(), handler).is_some() {
                    warn!(command = %name, "Command route bound twice, keeping the latest");
                }
            }
            Binding::Callback(trigger) => {
                if self
                    .callbacks
                    .iter()
                    .any(|(existing, _)| existing.as_str() == trigger.as_str())
                {
                    warn!(trigger = %trigger, "Callback trigger bound twice, first match wins");
                }
                self.callbacks.push((trigger, handler));
            }
            Binding::WebAppData => {
                if self.web_app.replace(handler).is_some() {
                    warn!("Web app data route bound twice, keeping the latest");
                }
            }
        }
    }

    /// Bound command names, sorted
    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of callback routes
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether a web app data route is bound
    pub fn has_web_app_route(&self) -> bool {
        self.web_app.is_some()
    }

    /// Route one update through its handler
    pub async fn dispatch(&self, update: &Update) -> DispatchOutcome {
        match AssertUnwindSafe(self.route(update)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                self.catch_all(update, &panic_message(panic.as_ref())).await;
                if update.kind() == UpdateKind::Callback {
                    self.acknowledge(update).await;
                }
                DispatchOutcome::Crashed
            }
        }
    }

    /// Log an error that escaped every handler and send the generic reply
    pub async fn catch_all(&self, update: &Update, reason: &str) {
        let snapshot = serde_json::to_string(update).unwrap_or_default();
        error!(
            error = reason,
            user = ?UserInfo::from_update(update),
            update_type = ?update.kind(),
            update = %snapshot,
            "Unhandled bot error"
        );

        if let Some(chat_id) = update.chat_id() {
            if let Err(e) = self
                .transport
                .send_message(chat_id, OutgoingMessage::text(UNHANDLED_ERROR_REPLY))
                .await
            {
                warn!(error = %e, "Failed to send unhandled error reply");
            }
        }
    }

    async fn route(&self, update: &Update) -> DispatchOutcome {
        match update.kind() {
            UpdateKind::Command => {
                if !self.addressed_to_me(update) {
                    debug!(
                        text = update.text().unwrap_or_default(),
                        "Command addressed to another bot"
                    );
                    return DispatchOutcome::Unrouted;
                }
                let Some(handler) = update.command_name().and_then(|n| self.commands.get(n))
                else {
                    debug!(text = update.text().unwrap_or_default(), "No command route");
                    return DispatchOutcome::Unrouted;
                };
                run(handler.as_ref(), update, HandlerFamily::Command).await
            }
            UpdateKind::Callback => {
                let data = update.callback_data().unwrap_or_default();
                let Some((_, handler)) = self.callbacks.iter().find(|(t, _)| t.matches(data))
                else {
                    debug!(data, "No callback route");
                    self.acknowledge(update).await;
                    return DispatchOutcome::Unrouted;
                };
                let outcome = run(handler.as_ref(), update, HandlerFamily::Action).await;
                handler.answer_callback(update).await;
                outcome
            }
            UpdateKind::WebAppData => {
                let Some(handler) = &self.web_app else {
                    debug!("No web app data route");
                    return DispatchOutcome::Unrouted;
                };
                run(handler.as_ref(), update, HandlerFamily::Action).await
            }
            UpdateKind::Other => {
                debug!(update_id = update.update_id, "Ignoring update");
                DispatchOutcome::Ignored
            }
        }
    }

    /// Acknowledge a callback no handler answered
    async fn acknowledge(&self, update: &Update) {
        if let Some(id) = update.callback_query_id() {
            if let Err(e) = self.transport.answer_callback_query(id).await {
                debug!(error = %e, "Failed to acknowledge callback");
            }
        }
    }
}

async fn run(handler: &dyn Handler, update: &Update, kind: HandlerFamily) -> DispatchOutcome {
    match handler.handle(update).await {
        Ok(()) => DispatchOutcome::Handled,
        Err(err) => {
            handler.handle_error(update, &err, kind).await;
            DispatchOutcome::Failed
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bot_core::testing::RecordingTransport;
    use bot_core::{
        ACTION_ERROR_REPLY, BotError, COMMAND_ERROR_REPLY, CallbackQuery, Chat, Message, Result,
        User, WebAppData,
    };

    enum Behavior {
        Reply(&'static str),
        Fail,
        Panic,
        Unimplemented,
    }

    struct TestHandler {
        family: HandlerFamily,
        behavior: Behavior,
        transport: Arc<dyn Transport>,
    }

    #[async_trait]
    impl Handler for TestHandler {
        fn family(&self) -> HandlerFamily {
            self.family
        }

        fn transport(&self) -> &dyn Transport {
            self.transport.as_ref()
        }

        async fn handle(&self, update: &Update) -> Result<()> {
            match self.behavior {
                Behavior::Reply(text) => {
                    let chat_id = update.chat_id().unwrap_or_default();
                    self.transport
                        .send_message(chat_id, OutgoingMessage::text(text))
                        .await?;
                    Ok(())
                }
                Behavior::Fail => Err(BotError::Other("boom".to_string())),
                Behavior::Panic => panic!("handler exploded"),
                Behavior::Unimplemented => Err(BotError::Unimplemented {
                    family: self.family,
                }),
            }
        }
    }

    fn handler(
        family: HandlerFamily,
        behavior: Behavior,
        transport: &Arc<RecordingTransport>,
    ) -> Arc<dyn Handler> {
        Arc::new(TestHandler {
            family,
            behavior,
            transport: transport.clone(),
        })
    }

    fn user() -> User {
        User {
            id: 7,
            first_name: Some("Test".to_string()),
            ..Default::default()
        }
    }

    fn command(text: &str) -> Update {
        Update {
            update_id: 1,
            message: Some(Message {
                message_id: 1,
                from: Some(user()),
                chat: Chat {
                    id: 7,
                    chat_type: None,
                },
                text: Some(text.to_string()),
                web_app_data: None,
            }),
            callback_query: None,
        }
    }

    fn callback(data: &str) -> Update {
        Update {
            update_id: 2,
            message: None,
            callback_query: Some(CallbackQuery {
                id: "cb-9".to_string(),
                from: user(),
                message: None,
                data: Some(data.to_string()),
            }),
        }
    }

    fn web_app(data: &str) -> Update {
        Update {
            update_id: 3,
            message: Some(Message {
                message_id: 3,
                from: Some(user()),
                chat: Chat {
                    id: 7,
                    chat_type: None,
                },
                text: None,
                web_app_data: Some(WebAppData {
                    data: data.to_string(),
                    button_text: "Trade".to_string(),
                }),
            }),
            callback_query: None,
        }
    }

    fn dispatcher(transport: &Arc<RecordingTransport>) -> Dispatcher {
        Dispatcher::new(transport.clone())
    }

    #[tokio::test]
    async fn test_command_routes_by_name() {
        let transport = Arc::new(RecordingTransport::new());
        let mut d = dispatcher(&transport);
        d.bind(
            Binding::Command("start".to_string()),
            handler(HandlerFamily::Command, Behavior::Reply("welcome"), &transport),
        );

        assert_eq!(d.dispatch(&command("/start")).await, DispatchOutcome::Handled);
        assert_eq!(
            d.dispatch(&command("/start@ChampionBot payload")).await,
            DispatchOutcome::Handled
        );
        assert_eq!(d.dispatch(&command("/unknown")).await, DispatchOutcome::Unrouted);
        assert_eq!(transport.sent_texts(), vec!["welcome", "welcome"]);
    }

    #[tokio::test]
    async fn test_command_for_another_bot_is_unrouted() {
        let transport = Arc::new(RecordingTransport::new());
        let mut d = dispatcher(&transport);
        d.bind(
            Binding::Command("start".to_string()),
            handler(HandlerFamily::Command, Behavior::Reply("welcome"), &transport),
        );
        d.set_bot_username("ChampionBot");

        assert_eq!(
            d.dispatch(&command("/start@SomeOtherBot")).await,
            DispatchOutcome::Unrouted
        );
        assert!(transport.sent().is_empty());

        assert_eq!(
            d.dispatch(&command("/start@championbot")).await,
            DispatchOutcome::Handled
        );
        assert_eq!(d.dispatch(&command("/start")).await, DispatchOutcome::Handled);
        assert_eq!(transport.sent_texts(), vec!["welcome", "welcome"]);
    }

    #[tokio::test]
    async fn test_command_failure_sends_command_apology() {
        let transport = Arc::new(RecordingTransport::new());
        let mut d = dispatcher(&transport);
        d.bind(
            Binding::Command("trade".to_string()),
            handler(HandlerFamily::Command, Behavior::Fail, &transport),
        );

        assert_eq!(d.dispatch(&command("/trade")).await, DispatchOutcome::Failed);
        assert_eq!(transport.sent_texts(), vec![COMMAND_ERROR_REPLY]);
    }

    #[tokio::test]
    async fn test_unimplemented_handler_is_reported_not_leaked() {
        let transport = Arc::new(RecordingTransport::new());
        let mut d = dispatcher(&transport);
        d.bind(
            Binding::Command("help".to_string()),
            handler(HandlerFamily::Command, Behavior::Unimplemented, &transport),
        );

        assert_eq!(d.dispatch(&command("/help")).await, DispatchOutcome::Failed);
        let texts = transport.sent_texts();
        assert_eq!(texts, vec![COMMAND_ERROR_REPLY]);
        assert!(!texts[0].contains("implement"));
    }

    #[tokio::test]
    async fn test_callback_acknowledged_after_success() {
        let transport = Arc::new(RecordingTransport::new());
        let mut d = dispatcher(&transport);
        d.bind(
            Binding::Callback(Trigger::from("about")),
            handler(HandlerFamily::Action, Behavior::Reply("about us"), &transport),
        );

        assert_eq!(d.dispatch(&callback("about")).await, DispatchOutcome::Handled);
        assert_eq!(transport.sent_texts(), vec!["about us"]);
        assert_eq!(transport.answered(), vec!["cb-9"]);
    }

    #[tokio::test]
    async fn test_callback_acknowledged_after_failure() {
        let transport = Arc::new(RecordingTransport::new());
        let mut d = dispatcher(&transport);
        d.bind(
            Binding::Callback(Trigger::from("about")),
            handler(HandlerFamily::Action, Behavior::Fail, &transport),
        );

        assert_eq!(d.dispatch(&callback("about")).await, DispatchOutcome::Failed);
        assert_eq!(transport.sent_texts(), vec![ACTION_ERROR_REPLY]);
        assert_eq!(transport.answered(), vec!["cb-9"]);
    }

    #[tokio::test]
    async fn test_failed_acknowledgement_does_not_mask_result() {
        let transport = Arc::new(RecordingTransport::new().failing_answers());
        let mut d = dispatcher(&transport);
        d.bind(
            Binding::Callback(Trigger::from("about")),
            handler(HandlerFamily::Action, Behavior::Reply("about us"), &transport),
        );

        assert_eq!(d.dispatch(&callback("about")).await, DispatchOutcome::Handled);
        assert_eq!(transport.sent_texts(), vec!["about us"]);
    }

    #[tokio::test]
    async fn test_pattern_callback_first_match_wins() {
        let transport = Arc::new(RecordingTransport::new());
        let mut d = dispatcher(&transport);
        d.bind(
            Binding::Callback(Trigger::pattern("^trade_.+$").unwrap()),
            handler(HandlerFamily::Action, Behavior::Reply("pattern"), &transport),
        );
        d.bind(
            Binding::Callback(Trigger::from("trade_btc")),
            handler(HandlerFamily::Action, Behavior::Reply("exact"), &transport),
        );

        assert_eq!(d.dispatch(&callback("trade_btc")).await, DispatchOutcome::Handled);
        assert_eq!(transport.sent_texts(), vec!["pattern"]);
        assert_eq!(d.callback_count(), 2);
    }

    #[tokio::test]
    async fn test_unrouted_callback_is_still_acknowledged() {
        let transport = Arc::new(RecordingTransport::new());
        let d = dispatcher(&transport);

        assert_eq!(d.dispatch(&callback("nothing")).await, DispatchOutcome::Unrouted);
        assert_eq!(transport.answered(), vec!["cb-9"]);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_web_app_data_route() {
        let transport = Arc::new(RecordingTransport::new());
        let mut d = dispatcher(&transport);
        assert_eq!(d.dispatch(&web_app("{}")).await, DispatchOutcome::Unrouted);

        d.bind(
            Binding::WebAppData,
            handler(HandlerFamily::Action, Behavior::Reply("got it"), &transport),
        );
        assert!(d.has_web_app_route());
        assert_eq!(d.dispatch(&web_app("{}")).await, DispatchOutcome::Handled);
        assert_eq!(transport.sent_texts(), vec!["got it"]);
        assert!(transport.answered().is_empty());
    }

    #[tokio::test]
    async fn test_panic_is_caught_by_catch_all() {
        let transport = Arc::new(RecordingTransport::new());
        let mut d = dispatcher(&transport);
        d.bind(
            Binding::Command("start".to_string()),
            handler(HandlerFamily::Command, Behavior::Panic, &transport),
        );

        assert_eq!(d.dispatch(&command("/start")).await, DispatchOutcome::Crashed);
        assert_eq!(transport.sent_texts(), vec![UNHANDLED_ERROR_REPLY]);

        // The dispatcher keeps serving afterwards
        assert_eq!(d.dispatch(&command("/start")).await, DispatchOutcome::Crashed);
    }

    #[tokio::test]
    async fn test_panicking_callback_is_still_acknowledged() {
        let transport = Arc::new(RecordingTransport::new());
        let mut d = dispatcher(&transport);
        d.bind(
            Binding::Callback(Trigger::from("about")),
            handler(HandlerFamily::Action, Behavior::Panic, &transport),
        );

        assert_eq!(d.dispatch(&callback("about")).await, DispatchOutcome::Crashed);
        assert_eq!(transport.sent_texts(), vec![UNHANDLED_ERROR_REPLY]);
        assert_eq!(transport.answered(), vec!["cb-9"]);
    }

    #[tokio::test]
    async fn test_plain_text_is_ignored() {
        let transport = Arc::new(RecordingTransport::new());
        let d = dispatcher(&transport);
        assert_eq!(d.dispatch(&command("hello there")).await, DispatchOutcome::Ignored);
        assert!(transport.sent().is_empty());
    }
}
