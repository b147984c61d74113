//! `DeepL` translation

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::Translator;
use crate::{Error, Result};

/// Free-tier translate endpoint
pub const DEFAULT_API_URL: &str = "https://api-free.deepl.com/v2/translate";

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

/// Translator backed by the `DeepL` API
pub struct DeeplTranslator {
    client: reqwest::Client,
    api_key: SecretString,
    api_url: String,
    target_lang: String,
}

impl DeeplTranslator {
    /// Create a translator into `target_lang` (e.g. `"UK"`)
    #[must_use]
    pub const fn new(
        client: reqwest::Client,
        api_key: SecretString,
        api_url: String,
        target_lang: String,
    ) -> Self {
        Self {
            client,
            api_key,
            api_url,
            target_lang,
        }
    }
}

#[async_trait]
impl Translator for DeeplTranslator {
    async fn translate(&self, word: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.api_url)
            .header(
                "Authorization",
                format!("DeepL-Auth-Key {}", self.api_key.expose_secret()),
            )
            .form(&[("text", word), ("target_lang", self.target_lang.as_str())])
            .send()
            .await
            .map_err(|e| Error::Provider(format!("DeepL request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Provider(format!("DeepL API error: {status} - {body}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Provider(format!("DeepL response read error: {e}")))?;

        first_translation(&body)
    }
}

fn first_translation(body: &str) -> Result<String> {
    let parsed: TranslateResponse = serde_json::from_str(body)?;

    parsed
        .translations
        .into_iter()
        .next()
        .map(|t| t.text)
        .ok_or_else(|| Error::Provider("DeepL returned no translations".to_string()))
}
