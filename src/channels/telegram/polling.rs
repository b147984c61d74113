//! Telegram polling mode: getUpdates loop and update conversion

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::TelegramChannel;
use super::api::read_response;
use super::dedup::UpdateDedup;
use super::retry::{Backoff, RetryPolicy};
use crate::channels::{InboundEvent, InboundPayload};

/// Telegram getUpdates request
#[derive(Debug, Serialize)]
struct GetUpdatesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

/// A single update from getUpdates
#[derive(Debug, Deserialize)]
struct PollingUpdate {
    update_id: i64,
    message: Option<PollingMessage>,
    callback_query: Option<PollingCallbackQuery>,
}

/// Message from a polling update
#[derive(Debug, Deserialize)]
struct PollingMessage {
    chat: PollingChat,
    from: Option<PollingUser>,
    text: Option<String>,
}

/// Button press from a polling update
#[derive(Debug, Deserialize)]
struct PollingCallbackQuery {
    id: String,
    from: PollingUser,
    /// Message the button was attached to; absent when too old
    message: Option<CallbackMessage>,
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallbackMessage {
    chat: PollingChat,
}

/// Chat info from polling
#[derive(Debug, Deserialize)]
struct PollingChat {
    id: i64,
}

/// User info from polling
#[derive(Debug, Deserialize)]
struct PollingUser {
    id: i64,
    #[serde(default)]
    is_bot: bool,
}

impl TelegramChannel {
    /// Spawn a background task that long-polls Telegram's getUpdates API
    ///
    /// Deletes any existing webhook before starting to avoid conflicts. The
    /// task ends when the receiver side of `tx` is dropped.
    pub fn start_polling(
        &self,
        tx: mpsc::Sender<InboundEvent>,
        timeout_secs: u64,
    ) -> tokio::task::JoinHandle<()> {
        let channel = self.clone();
        tokio::spawn(async move {
            if let Err(e) = channel.delete_webhook().await {
                tracing::warn!(error = %e, "failed to delete Telegram webhook before polling");
            }
            channel.polling_loop(tx, timeout_secs).await;
        })
    }

    async fn polling_loop(&self, tx: mpsc::Sender<InboundEvent>, timeout_secs: u64) {
        let url = self.method_url("getUpdates");
        let mut offset: Option<i64> = None;
        let mut dedup = UpdateDedup::default();
        let mut backoff = Backoff::new(RetryPolicy::polling());

        tracing::info!(timeout_secs, "Telegram polling started");

        loop {
            let request = GetUpdatesRequest {
                offset,
                timeout: timeout_secs,
                allowed_updates: &["message", "callback_query"],
            };
            let outcome = self.client.post(&url).json(&request).send().await;

            let updates: Vec<PollingUpdate> = match read_response("getUpdates", outcome).await {
                Ok(updates) => {
                    backoff.reset();
                    updates
                }
                Err(failure) => {
                    let delay = backoff.next_delay(failure.retry_after);
                    tracing::warn!(
                        error = %failure.error,
                        failures = backoff.failures(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Telegram getUpdates failed"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
            };

            for update in updates {
                // Advance offset past this update
                offset = Some(update.update_id + 1);

                if dedup.is_duplicate(update.update_id) {
                    continue;
                }

                let Some(event) = update_to_inbound(update) else {
                    continue;
                };
                if tx.send(event).await.is_err() {
                    tracing::info!("inbound receiver closed, stopping Telegram polling");
                    return;
                }
            }
        }
    }
}

/// Convert a polling update into an `InboundEvent`
///
/// Returns `None` for updates the bot ignores: bot senders, non-text
/// messages, and button presses whose message has expired.
fn update_to_inbound(update: PollingUpdate) -> Option<InboundEvent> {
    if let Some(query) = update.callback_query {
        if query.from.is_bot {
            return None;
        }
        let Some(message) = query.message else {
            tracing::debug!(user_id = query.from.id, "callback without message, ignoring");
            return None;
        };
        return Some(InboundEvent {
            chat_id: message.chat.id,
            payload: InboundPayload::Button(query.data.unwrap_or_default()),
            callback_id: Some(query.id),
        });
    }

    let message = update.message?;
    if message.from.as_ref().is_some_and(|u| u.is_bot) {
        return None;
    }

    Some(InboundEvent {
        chat_id: message.chat.id,
        payload: InboundPayload::Text(message.text?),
        callback_id: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Option<InboundEvent> {
        let update: PollingUpdate = serde_json::from_str(json).unwrap();
        update_to_inbound(update)
    }

    #[test]
    fn text_message_becomes_text_payload() {
        let event = parse(
            r#"{"update_id": 1, "message": {
                "message_id": 5, "date": 0,
                "chat": {"id": 42, "type": "private"},
                "from": {"id": 7, "is_bot": false, "first_name": "A"},
                "text": "📘 Learn"
            }}"#,
        )
        .unwrap();

        assert_eq!(event.chat_id, 42);
        assert_eq!(event.payload, InboundPayload::Text("📘 Learn".to_string()));
        assert!(event.callback_id.is_none());
    }

    #[test]
    fn callback_query_becomes_button_payload() {
        let event = parse(
            r#"{"update_id": 2, "callback_query": {
                "id": "cb-1",
                "from": {"id": 7, "is_bot": false, "first_name": "A"},
                "message": {"message_id": 9, "chat": {"id": 42, "type": "private"}},
                "data": "{\"a\":\"n\"}"
            }}"#,
        )
        .unwrap();

        assert_eq!(event.chat_id, 42);
        assert_eq!(event.payload, InboundPayload::Button(r#"{"a":"n"}"#.to_string()));
        assert_eq!(event.callback_id.as_deref(), Some("cb-1"));
    }

    #[test]
    fn ignored_updates() {
        // Sticker: no text
        assert!(
            parse(
                r#"{"update_id": 3, "message": {"chat": {"id": 1}, "sticker": {"file_id": "x"}}}"#
            )
            .is_none()
        );
        // From another bot
        assert!(
            parse(
                r#"{"update_id": 4, "message": {"chat": {"id": 1}, "from": {"id": 2, "is_bot": true}, "text": "/start"}}"#
            )
            .is_none()
        );
        // Button on an expired message
        assert!(
            parse(r#"{"update_id": 5, "callback_query": {"id": "c", "from": {"id": 2}, "data": "x"}}"#)
                .is_none()
        );
        // Other update kinds
        assert!(parse(r#"{"update_id": 6, "edited_message": {}}"#).is_none());
    }
}
