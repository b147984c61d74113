//! Candidate sourcing
//!
//! Produces one enriched word the chat has never seen. Structural mismatches
//! are retried without limit or backoff; only transport failures and
//! enrichment failures reach the caller.

pub mod checks;

use std::sync::Arc;

use crate::db::LexiconStore;
use crate::providers::Providers;
use crate::word::{Candidate, ChatId};
use crate::{Error, Result};

pub use checks::{Rejection, ValidWord};

/// Sources and enriches vocabulary candidates
#[derive(Clone)]
pub struct Pipeline {
    providers: Providers,
    store: Arc<dyn LexiconStore>,
}

impl Pipeline {
    #[must_use]
    pub fn new(providers: Providers, store: Arc<dyn LexiconStore>) -> Self {
        Self { providers, store }
    }

    /// Lookup services this pipeline uses
    #[must_use]
    pub const fn providers(&self) -> &Providers {
        &self.providers
    }

    /// Produce one enriched, unseen candidate for `chat_id`
    ///
    /// # Errors
    ///
    /// Returns error if a lookup service is unreachable, the store fails, or
    /// the image or translation cannot be fetched for the accepted word
    pub async fn source(&self, chat_id: ChatId) -> Result<Candidate> {
        let valid = self.find_valid_word(chat_id).await?;
        self.enrich(valid).await
    }

    /// Retry until a structurally valid unseen word turns up
    ///
    /// # Errors
    ///
    /// Returns error if a lookup service is unreachable or the store fails
    pub async fn find_valid_word(&self, chat_id: ChatId) -> Result<ValidWord> {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            match self.attempt(chat_id).await? {
                Ok(valid) => {
                    tracing::debug!(chat_id, word = %valid.word, attempt, "word accepted");
                    return Ok(valid);
                }
                Err((word, rejection)) => {
                    tracing::debug!(chat_id, word = %word, attempt, %rejection, "word discarded");
                }
            }
        }
    }

    /// One pass over the checks: token, seen, then dictionary
    async fn attempt(
        &self,
        chat_id: ChatId,
    ) -> Result<std::result::Result<ValidWord, (String, Rejection)>> {
        let Some(raw) = self.providers.words.next_word().await? else {
            return Ok(Err((String::new(), Rejection::NoWord)));
        };

        let word = checks::normalize(&raw);
        if let Err(rejection) = checks::check_token(&word) {
            return Ok(Err((word, rejection)));
        }

        if self.store.is_seen(chat_id, &word)? {
            return Ok(Err((word, Rejection::AlreadySeen)));
        }

        let Some(entry) = self.providers.dictionary.lookup(&word).await? else {
            return Ok(Err((word, Rejection::NoEntry)));
        };

        Ok(checks::validate_entry(&word, &entry).map_err(|rejection| (word, rejection)))
    }

    /// Fetch exactly one image and one translation for an accepted word
    ///
    /// # Errors
    ///
    /// Returns `Error::Enrichment` if either lookup fails or comes back empty
    pub async fn enrich(&self, valid: ValidWord) -> Result<Candidate> {
        let image_url = self
            .providers
            .images
            .first_image(&valid.word)
            .await
            .map_err(|e| Error::enrichment(&valid.word, e))?;
        if image_url.trim().is_empty() {
            return Err(Error::enrichment(&valid.word, "empty image url"));
        }

        let translated_word = self
            .providers
            .translator
            .translate(&valid.word)
            .await
            .map_err(|e| Error::enrichment(&valid.word, e))?;
        if translated_word.trim().is_empty() {
            return Err(Error::enrichment(&valid.word, "empty translation"));
        }

        Ok(Candidate {
            word: valid.word,
            definition: valid.definition,
            transcription: valid.transcription,
            audio_url: valid.audio_url,
            image_url: Some(image_url),
            translated_word,
        })
    }
}
