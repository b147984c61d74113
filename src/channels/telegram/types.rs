//! Telegram Bot API request/response types

use serde::{Deserialize, Serialize};

use crate::channels::Keyboard;

/// Telegram Bot API base URL
pub(crate) const API_BASE: &str = "https://api.telegram.org/bot";

/// Inline keyboard markup for message buttons
#[derive(Debug, Clone, Serialize)]
pub(crate) struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// A button in an inline keyboard row
#[derive(Debug, Clone, Serialize)]
pub(crate) struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

/// Persistent reply keyboard shown in place of the text input
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

/// A key on a reply keyboard; pressing it sends `text`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct KeyboardButton {
    pub text: String,
}

/// Either kind of keyboard accepted by `reply_markup`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub(crate) enum ReplyMarkup {
    Inline(InlineKeyboardMarkup),
    Reply(ReplyKeyboardMarkup),
}

impl From<&Keyboard> for ReplyMarkup {
    fn from(keyboard: &Keyboard) -> Self {
        match keyboard {
            Keyboard::Menu(labels) => Self::Reply(ReplyKeyboardMarkup {
                keyboard: vec![
                    labels
                        .iter()
                        .map(|text| KeyboardButton { text: text.clone() })
                        .collect(),
                ],
                resize_keyboard: true,
            }),
            Keyboard::Inline(buttons) => Self::Inline(InlineKeyboardMarkup {
                inline_keyboard: vec![
                    buttons
                        .iter()
                        .map(|b| InlineKeyboardButton {
                            text: b.text.clone(),
                            callback_data: b.data.clone(),
                        })
                        .collect(),
                ],
            }),
        }
    }
}

/// Telegram sendMessage request
#[derive(Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

/// Telegram sendPhoto request (photo by URL)
#[derive(Serialize)]
pub(crate) struct SendPhotoRequest<'a> {
    pub chat_id: i64,
    pub photo: &'a str,
    pub caption: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

/// Telegram answerCallbackQuery request
#[derive(Serialize)]
pub(crate) struct AnswerCallbackQueryRequest<'a> {
    pub callback_query_id: &'a str,
}

/// Telegram deleteMessage request
#[derive(Serialize)]
pub(crate) struct DeleteMessageRequest {
    pub chat_id: i64,
    pub message_id: i64,
}

/// Telegram setMyCommands request
#[derive(Serialize)]
pub(crate) struct SetMyCommandsRequest<'a> {
    pub commands: &'a [BotCommand],
}

/// A bot command for Telegram's command menu
#[derive(Debug, Clone, Serialize)]
pub struct BotCommand {
    pub command: String,
    pub description: String,
}

impl BotCommand {
    #[must_use]
    pub fn new(command: &str, description: &str) -> Self {
        Self {
            command: command.to_string(),
            description: description.to_string(),
        }
    }
}

/// Response from send* methods containing the sent message
#[derive(Debug, Deserialize)]
pub(crate) struct SentMessage {
    pub message_id: i64,
}

/// The bot's own account, from getMe
#[derive(Debug, Deserialize)]
pub struct BotUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// Extra error details Telegram attaches to failed calls
#[derive(Debug, Default, Deserialize)]
pub struct ResponseParameters {
    /// Seconds to wait before retrying after flood control
    #[serde(default)]
    pub retry_after: Option<u64>,
}

/// Telegram API response wrapper
#[derive(Debug, Deserialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::InlineButton;

    #[test]
    fn menu_keyboard_serializes_as_reply_keyboard() {
        let markup = ReplyMarkup::from(&Keyboard::Menu(vec!["📘 Learn".to_string()]));
        let json = serde_json::to_value(&markup).unwrap();
        assert_eq!(json["keyboard"][0][0]["text"], "📘 Learn");
        assert_eq!(json["resize_keyboard"], true);
    }

    #[test]
    fn inline_keyboard_keeps_buttons_in_one_row() {
        let markup = ReplyMarkup::from(&Keyboard::Inline(vec![
            InlineButton::new("Next", r#"{"a":"n"}"#),
            InlineButton::new("End repetition", r#"{"a":"e"}"#),
        ]));
        let json = serde_json::to_value(&markup).unwrap();
        assert_eq!(json["inline_keyboard"][0].as_array().unwrap().len(), 2);
        assert_eq!(json["inline_keyboard"][0][1]["callback_data"], r#"{"a":"e"}"#);
    }

    #[test]
    fn error_response_carries_retry_after() {
        let body = r#"{"ok":false,"error_code":429,"description":"Too Many Requests: retry after 7","parameters":{"retry_after":7}}"#;
        let parsed: TelegramResponse<SentMessage> = serde_json::from_str(body).unwrap();
        assert!(!parsed.ok);
        assert!(parsed.result.is_none());
        assert_eq!(parsed.parameters.and_then(|p| p.retry_after), Some(7));
    }
}
