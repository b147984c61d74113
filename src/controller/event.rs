//! Inbound events and button payloads

use serde::{Deserialize, Serialize};

use super::State;
use crate::Result;
use crate::channels::InboundPayload;

/// Main menu label that starts learning
pub const LEARN_LABEL: &str = "📘 Learn";

/// Main menu label that starts a review
pub const REPEAT_LABEL: &str = "🔄 Repeat";

/// Main menu label that clears the lexicon
pub const CLEAR_LABEL: &str = "🗑️ Delete the words";

/// Labels of the main menu keyboard, in display order
pub const MENU_LABELS: [&str; 3] = [LEARN_LABEL, REPEAT_LABEL, CLEAR_LABEL];

/// Telegram limits `callback_data` to this many bytes
pub const MAX_CALLBACK_DATA: usize = 64;

/// Structured payload carried by an inline button
///
/// Serialized compactly so the word fits the callback data limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "a", content = "w")]
pub enum ButtonAction {
    #[serde(rename = "r")]
    Remember(String),
    #[serde(rename = "s")]
    Skip(String),
    #[serde(rename = "n")]
    Next,
    #[serde(rename = "e")]
    EndReview,
}

impl ButtonAction {
    /// Encode as callback data
    ///
    /// # Errors
    ///
    /// Returns error if the encoded payload exceeds the callback data limit
    pub fn encode(&self) -> Result<String> {
        let data = serde_json::to_string(self)?;
        if data.len() > MAX_CALLBACK_DATA {
            return Err(crate::Error::Channel(format!(
                "callback data too long ({} bytes)",
                data.len()
            )));
        }
        Ok(data)
    }

    /// Decode callback data; `None` for anything this bot did not produce
    #[must_use]
    pub fn decode(data: &str) -> Option<Self> {
        serde_json::from_str(data).ok()
    }
}

/// Something that happened to a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `/start`
    Start,
    /// Learn selected from the menu
    Learn,
    /// Repeat selected from the menu
    Repeat,
    /// Delete the words selected from the menu
    ClearHistory,
    Remember { word: String },
    Skip { word: String },
    Next,
    EndReview,

    // Raised by the executor while carrying out effects
    /// No learned word at the review cursor
    ReviewExhausted,
    /// Sourcing, enrichment or delivery failed
    ActionFailed,
    /// The store failed; resume from the state before the event
    StoreFailed { resume: State },
}

impl Event {
    /// Interpret an inbound payload
    ///
    /// Returns `None` for free text that is neither a command nor a menu label.
    #[must_use]
    pub fn from_payload(payload: &InboundPayload) -> Option<Self> {
        match payload {
            InboundPayload::Text(text) => Self::from_text(text),
            InboundPayload::Button(data) => ButtonAction::decode(data).map(Self::from),
        }
    }

    fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(command) = text.strip_prefix('/') {
            // Group chats append the bot name: /learn@vocab_bot
            let command = command.split('@').next().unwrap_or_default();
            return match command {
                "start" | "menu" => Some(Self::Start),
                "learn" => Some(Self::Learn),
                "repeat" => Some(Self::Repeat),
                "clear" => Some(Self::ClearHistory),
                _ => None,
            };
        }

        match text {
            LEARN_LABEL => Some(Self::Learn),
            REPEAT_LABEL => Some(Self::Repeat),
            CLEAR_LABEL => Some(Self::ClearHistory),
            _ => None,
        }
    }
}

impl From<ButtonAction> for Event {
    fn from(action: ButtonAction) -> Self {
        match action {
            ButtonAction::Remember(word) => Self::Remember { word },
            ButtonAction::Skip(word) => Self::Skip { word },
            ButtonAction::Next => Self::Next,
            ButtonAction::EndReview => Self::EndReview,
        }
    }
}
