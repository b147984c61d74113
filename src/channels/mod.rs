//! Chat channel abstraction
//!
//! The controller talks to learners only through `ChatChannel`, so it can run
//! against Telegram in production and a recording mock in tests.

pub mod telegram;

use std::path::Path;

use async_trait::async_trait;

pub use telegram::{BotCommand, TelegramChannel};

use crate::Result;
use crate::word::ChatId;

/// Handle to a message the bot sent, used for later deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef(pub i64);

/// A button on an inline keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    /// Opaque payload returned when pressed
    pub data: String,
}

impl InlineButton {
    #[must_use]
    pub fn new(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: data.into(),
        }
    }
}

/// Keyboard attached to an outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Persistent reply keyboard; pressing a key sends its label as text
    Menu(Vec<String>),
    /// Buttons under the message, laid out in one row
    Inline(Vec<InlineButton>),
}

/// What the learner sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundPayload {
    /// Typed text, a command, or a menu key
    Text(String),
    /// Inline button data
    Button(String),
}

/// An inbound event from a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub chat_id: ChatId,
    pub payload: InboundPayload,
    /// Set for button presses; must be acknowledged
    pub callback_id: Option<String>,
}

/// Trait for chat channel adapters
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Send a text message
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef>;

    /// Send a photo by URL with a caption
    async fn send_photo(
        &self,
        chat_id: ChatId,
        photo_url: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef>;

    /// Upload a local audio file
    async fn send_audio(&self, chat_id: ChatId, path: &Path, title: &str) -> Result<MessageRef>;

    /// Delete a message the bot sent earlier
    async fn delete_message(&self, chat_id: ChatId, message: MessageRef) -> Result<()>;

    /// Acknowledge a button press so the client stops its spinner
    ///
    /// Default implementation is a no-op for channels without callbacks
    async fn answer_callback(&self, _callback_id: &str) -> Result<()> {
        Ok(())
    }
}
