//! Sent artifacts: pronunciation clips and their cleanup

use crate::Result;
use crate::channels::{ChatChannel, MessageRef};
use crate::providers::AudioFetcher;
use crate::word::ChatId;

/// Download a clip into a temporary file and send it
///
/// The temporary file is removed when this returns, whether or not the
/// upload succeeded.
///
/// # Errors
///
/// Returns error if the download, the temp file write or the upload fails
pub async fn deliver_clip(
    channel: &dyn ChatChannel,
    fetcher: &dyn AudioFetcher,
    chat_id: ChatId,
    word: &str,
    url: &str,
) -> Result<MessageRef> {
    let data = fetcher.fetch(url).await?;

    let file = tempfile::Builder::new()
        .prefix("vocab-clip-")
        .suffix(".mp3")
        .tempfile()?;
    tokio::fs::write(file.path(), &data).await?;

    let sent = channel.send_audio(chat_id, file.path(), word).await;
    drop(file);

    sent
}

/// Delete a sent message, logging instead of failing
pub async fn delete_quietly(
    channel: &dyn ChatChannel,
    chat_id: ChatId,
    message: MessageRef,
    what: &str,
) {
    if let Err(e) = channel.delete_message(chat_id, message).await {
        tracing::debug!(chat_id, message_id = message.0, what, error = %e, "cleanup failed");
    }
}
