//! Datamuse word source
//!
//! Picks a random word from the "means like" results for a fixed theme.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;

use super::WordSource;
use crate::{Error, Result};

const API_BASE: &str = "https://api.datamuse.com";

/// One result row of `/words`
#[derive(Debug, Deserialize)]
struct DatamuseWord {
    word: String,
}

/// Word source backed by the Datamuse API
pub struct DatamuseWordSource {
    client: reqwest::Client,
    theme: String,
}

impl DatamuseWordSource {
    /// Create a word source for words related to `theme`
    #[must_use]
    pub const fn new(client: reqwest::Client, theme: String) -> Self {
        Self { client, theme }
    }
}

#[async_trait]
impl WordSource for DatamuseWordSource {
    async fn next_word(&self) -> Result<Option<String>> {
        let response = self
            .client
            .get(format!("{API_BASE}/words"))
            .query(&[("ml", self.theme.as_str())])
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Datamuse request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Provider(format!(
                "Datamuse API error: {status} - {body}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Provider(format!("Datamuse response read error: {e}")))?;

        Ok(pick_word(&body))
    }
}

/// Choose one word at random from a `/words` response body
fn pick_word(body: &str) -> Option<String> {
    let words: Vec<DatamuseWord> = match serde_json::from_str(body) {
        Ok(words) => words,
        Err(e) => {
            tracing::debug!(error = %e, "unparseable Datamuse response");
            return None;
        }
    };

    words
        .choose(&mut rand::thread_rng())
        .map(|w| w.word.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_one_of_the_results() {
        let body = r#"[{"word":"affection","score":3012},{"word":"adore","score":2999}]"#;
        let word = pick_word(body).unwrap();
        assert!(word == "affection" || word == "adore");
    }

    #[test]
    fn empty_or_malformed_yields_none() {
        assert!(pick_word("[]").is_none());
        assert!(pick_word("<html>rate limited</html>").is_none());
    }
}
