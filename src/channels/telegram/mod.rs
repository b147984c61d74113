//! Telegram channel adapter
//!
//! Long-polls `getUpdates` for messages and button presses; sends through
//! the Bot API.

mod api;
pub mod dedup;
pub mod polling;
pub mod retry;
pub mod types;

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;

use super::{ChatChannel, Keyboard, MessageRef};
use crate::Result;
use crate::word::ChatId;

pub use dedup::UpdateDedup;
pub use retry::RetryPolicy;
pub use types::{BotCommand, BotUser};

/// Telegram channel adapter
#[derive(Clone)]
pub struct TelegramChannel {
    token: SecretString,
    client: Client,
    retry: RetryPolicy,
}

impl TelegramChannel {
    /// Create a new Telegram channel adapter
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self {
            token,
            client: Client::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy for outgoing calls
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Verify the token and register the command menu
    ///
    /// # Errors
    ///
    /// Returns error if the token is rejected
    pub async fn connect(&self, commands: &[BotCommand]) -> Result<BotUser> {
        let me = self.get_me().await?;
        tracing::info!(
            bot_id = me.id,
            username = me.username.as_deref().unwrap_or_default(),
            "Telegram channel connected"
        );

        if let Err(e) = self.sync_commands(commands).await {
            tracing::warn!(error = %e, "failed to register Telegram commands");
        }
        Ok(me)
    }
}

#[async_trait]
impl ChatChannel for TelegramChannel {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef> {
        self.send_message(chat_id, text, keyboard)
            .await
            .map(MessageRef)
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        photo_url: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef> {
        self.send_photo_url(chat_id, photo_url, caption, keyboard)
            .await
            .map(MessageRef)
    }

    async fn send_audio(&self, chat_id: ChatId, path: &Path, title: &str) -> Result<MessageRef> {
        self.send_audio_file(chat_id, path, title)
            .await
            .map(MessageRef)
    }

    async fn delete_message(&self, chat_id: ChatId, message: MessageRef) -> Result<()> {
        self.delete_message_by_id(chat_id, message.0).await
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.answer_callback_query(callback_id).await
    }
}
