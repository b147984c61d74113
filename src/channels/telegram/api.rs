//! Raw Telegram Bot API calls

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::retry::{delay_for_attempt, is_recoverable};
use super::types::{
    API_BASE, AnswerCallbackQueryRequest, BotCommand, BotUser, DeleteMessageRequest, ReplyMarkup,
    SendMessageRequest, SendPhotoRequest, SentMessage, SetMyCommandsRequest, TelegramResponse,
};
use crate::channels::Keyboard;
use crate::{Error, Result};

/// A failed Bot API call and whether trying again could help
#[derive(Debug)]
pub(crate) struct CallFailure {
    pub error: Error,
    pub retryable: bool,
    pub retry_after: Option<Duration>,
}

impl CallFailure {
    fn fatal(error: Error) -> Self {
        Self {
            error,
            retryable: false,
            retry_after: None,
        }
    }
}

impl super::TelegramChannel {
    pub(crate) fn method_url(&self, method: &str) -> String {
        format!("{API_BASE}{}/{method}", self.token.expose_secret())
    }

    /// POST a JSON request, retrying recoverable failures per the channel policy
    pub(crate) async fn call<Req, Res>(&self, method: &str, request: &Req) -> Result<Res>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        let url = self.method_url(method);
        self.execute(method, || Ok(self.client.post(&url).json(request)))
            .await
    }

    /// Send a request built by `build`, rebuilding it for each retry
    async fn execute<Res, F>(&self, method: &str, build: F) -> Result<Res>
    where
        Res: DeserializeOwned,
        F: Fn() -> Result<reqwest::RequestBuilder> + Send + Sync,
    {
        let mut attempt: u32 = 0;
        loop {
            let outcome = build()?.send().await;
            match read_response(method, outcome).await {
                Ok(result) => return Ok(result),
                Err(failure) if failure.retryable && attempt < self.retry.max_retries => {
                    let delay = delay_for_attempt(&self.retry, attempt, failure.retry_after);
                    tracing::warn!(
                        method,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %failure.error,
                        "retrying Telegram call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }

    /// Send a text message
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<i64> {
        let request = SendMessageRequest {
            chat_id,
            text,
            reply_markup: keyboard.map(ReplyMarkup::from),
        };
        let sent: SentMessage = self.call("sendMessage", &request).await?;

        tracing::debug!(chat_id, message_id = sent.message_id, "Telegram message sent");
        Ok(sent.message_id)
    }

    /// Send a photo by URL
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn send_photo_url(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<i64> {
        let request = SendPhotoRequest {
            chat_id,
            photo: photo_url,
            caption,
            reply_markup: keyboard.map(ReplyMarkup::from),
        };
        let sent: SentMessage = self.call("sendPhoto", &request).await?;

        tracing::debug!(chat_id, message_id = sent.message_id, "Telegram photo sent");
        Ok(sent.message_id)
    }

    /// Upload a local audio file as multipart form data
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or the API request fails
    pub async fn send_audio_file(&self, chat_id: i64, path: &Path, title: &str) -> Result<i64> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("clip.mp3")
            .to_string();
        let url = self.method_url("sendAudio");

        let sent: SentMessage = self
            .execute("sendAudio", || {
                let part = Part::bytes(data.clone())
                    .file_name(file_name.clone())
                    .mime_str("audio/mpeg")
                    .map_err(|e| Error::Channel(format!("Telegram sendAudio error: {e}")))?;
                let form = Form::new()
                    .text("chat_id", chat_id.to_string())
                    .text("title", title.to_string())
                    .part("audio", part);
                Ok(self.client.post(&url).multipart(form))
            })
            .await?;

        tracing::debug!(chat_id, message_id = sent.message_id, "Telegram audio sent");
        Ok(sent.message_id)
    }

    /// Delete a message by ID
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails (e.g. message too old)
    pub async fn delete_message_by_id(&self, chat_id: i64, message_id: i64) -> Result<()> {
        let request = DeleteMessageRequest {
            chat_id,
            message_id,
        };
        let _: bool = self.call("deleteMessage", &request).await?;
        Ok(())
    }

    /// Acknowledge a callback query
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let request = AnswerCallbackQueryRequest { callback_query_id };
        let _: bool = self.call("answerCallbackQuery", &request).await?;
        Ok(())
    }

    /// Register the bot's command menu
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn sync_commands(&self, commands: &[BotCommand]) -> Result<()> {
        let request = SetMyCommandsRequest { commands };
        let _: bool = self.call("setMyCommands", &request).await?;

        tracing::info!(count = commands.len(), "Telegram bot commands synced");
        Ok(())
    }

    /// Delete any webhook so `getUpdates` works
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn delete_webhook(&self) -> Result<()> {
        let _: bool = self.call("deleteWebhook", &serde_json::json!({})).await?;
        tracing::debug!("Telegram webhook deleted");
        Ok(())
    }

    /// Verify the token and fetch the bot's own account
    ///
    /// # Errors
    ///
    /// Returns error if the token is invalid or the API is unreachable
    pub async fn get_me(&self) -> Result<BotUser> {
        self.call("getMe", &serde_json::json!({}))
            .await
            .map_err(|e| Error::Channel(format!("Invalid Telegram bot token: {e}")))
    }
}

/// Turn a raw response into the call's result or a classified failure
pub(crate) async fn read_response<Res: DeserializeOwned>(
    method: &str,
    outcome: reqwest::Result<reqwest::Response>,
) -> std::result::Result<Res, CallFailure> {
    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            // Connection-level failures are transient by nature
            return Err(CallFailure {
                error: Error::Channel(format!("Telegram {method} error: {e}")),
                retryable: true,
                retry_after: None,
            });
        }
    };

    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| CallFailure {
        error: Error::Channel(format!("Telegram {method} response read error: {e}")),
        retryable: true,
        retry_after: None,
    })?;

    parse_response(method, status, &body)
}

/// Classify a response body; split out so it can be tested without a server
pub(crate) fn parse_response<Res: DeserializeOwned>(
    method: &str,
    status: u16,
    body: &str,
) -> std::result::Result<Res, CallFailure> {
    let parsed: TelegramResponse<Res> = serde_json::from_str(body).map_err(|e| {
        CallFailure {
            error: Error::Channel(format!("Telegram {method} response parse error: {e}")),
            retryable: is_recoverable(status),
            retry_after: None,
        }
    })?;

    if parsed.ok
        && let Some(result) = parsed.result
    {
        return Ok(result);
    }

    let description = parsed.description.unwrap_or_default();
    let error = Error::Channel(format!("Telegram {method} error: {status} - {description}"));
    if !is_recoverable(status) {
        return Err(CallFailure::fatal(error));
    }

    Err(CallFailure {
        error,
        retryable: true,
        retry_after: parsed
            .parameters
            .and_then(|p| p.retry_after)
            .map(Duration::from_secs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response_yields_result() {
        let sent: SentMessage =
            parse_response("sendMessage", 200, r#"{"ok":true,"result":{"message_id":42}}"#)
                .unwrap();
        assert_eq!(sent.message_id, 42);

        let deleted: bool =
            parse_response("deleteMessage", 200, r#"{"ok":true,"result":true}"#).unwrap();
        assert!(deleted);
    }

    #[test]
    fn flood_control_is_retryable_with_delay() {
        let body = r#"{"ok":false,"error_code":429,"description":"Too Many Requests","parameters":{"retry_after":3}}"#;
        let failure = parse_response::<SentMessage>("sendPhoto", 429, body).unwrap_err();
        assert!(failure.retryable);
        assert_eq!(failure.retry_after, Some(Duration::from_secs(3)));
    }

    #[test]
    fn client_errors_are_fatal() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: message to delete not found"}"#;
        let failure = parse_response::<bool>("deleteMessage", 400, body).unwrap_err();
        assert!(!failure.retryable);
        assert!(failure.error.to_string().contains("message to delete not found"));
    }

    #[test]
    fn gateway_html_is_retryable() {
        let failure =
            parse_response::<SentMessage>("sendMessage", 502, "<html>Bad Gateway</html>")
                .unwrap_err();
        assert!(failure.retryable);
    }
}
