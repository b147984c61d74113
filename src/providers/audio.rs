//! Pronunciation clip download

use async_trait::async_trait;

use super::AudioFetcher;
use crate::{Error, Result};

/// Plain HTTP GET downloader
pub struct HttpAudioFetcher {
    client: reqwest::Client,
}

impl HttpAudioFetcher {
    #[must_use]
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AudioFetcher for HttpAudioFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("audio download failed: {e}")))?;

        let response = response.error_for_status().map_err(Error::Http)?;

        let data = response
            .bytes()
            .await
            .map_err(|e| Error::Provider(format!("audio download read error: {e}")))?;

        tracing::debug!(url, bytes = data.len(), "pronunciation clip downloaded");
        Ok(data.to_vec())
    }
}
