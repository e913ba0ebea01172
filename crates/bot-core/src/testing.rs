//! Test doubles for the transport seam
//!
//! Enabled for downstream crates through the `testing` feature.

use crate::transport::{MenuCommand, OutgoingMessage, Transport};
use crate::{BotError, Result};
use async_trait::async_trait;
use std::sync::Mutex;

pub use crate::transport::MockTransport;

/// A message captured by [`RecordingTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub photo_url: Option<String>,
    pub message: OutgoingMessage,
}

/// Transport that records every outbound call
///
/// Sends and acknowledgements can be made to fail to exercise best-effort
/// paths.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentMessage>>,
    answered: Mutex<Vec<String>>,
    menus: Mutex<Vec<Vec<MenuCommand>>>,
    fail_sends: bool,
    fail_answers: bool,
}

impl RecordingTransport {
    /// Transport where every call succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send fail
    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    /// Make every callback acknowledgement fail
    pub fn failing_answers(mut self) -> Self {
        self.fail_answers = true;
        self
    }

    /// Messages sent so far
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Texts of the messages sent so far
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|s| s.message.text).collect()
    }

    /// Callback query ids acknowledged so far
    pub fn answered(&self) -> Vec<String> {
        self.answered.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// Menus published so far
    pub fn menus(&self) -> Vec<Vec<MenuCommand>> {
        self.menus.lock().map(|m| m.clone()).unwrap_or_default()
    }

    fn record(&self, sent: SentMessage) -> Result<i64> {
        if self.fail_sends {
            return Err(BotError::Transport("send failed".to_string()));
        }
        let mut log = self
            .sent
            .lock()
            .map_err(|e| BotError::Other(format!("Lock error: {e}")))?;
        log.push(sent);
        Ok(log.len() as i64)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_message(&self, chat_id: i64, message: OutgoingMessage) -> Result<i64> {
        self.record(SentMessage {
            chat_id,
            photo_url: None,
            message,
        })
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        message: OutgoingMessage,
    ) -> Result<i64> {
        self.record(SentMessage {
            chat_id,
            photo_url: Some(photo_url.to_string()),
            message,
        })
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        if self.fail_answers {
            return Err(BotError::Transport("answer failed".to_string()));
        }
        if let Ok(mut answered) = self.answered.lock() {
            answered.push(callback_query_id.to_string());
        }
        Ok(())
    }

    async fn set_my_commands(&self, commands: &[MenuCommand]) -> Result<()> {
        if let Ok(mut menus) = self.menus.lock() {
            menus.push(commands.to_vec());
        }
        Ok(())
    }
}
