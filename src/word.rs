//! Word records shared by the pipeline, the store and the controller

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Telegram chat identifier
pub type ChatId = i64;

/// A fully enriched word that has not been committed yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Lowercase alphabetic token
    pub word: String,
    pub definition: String,
    /// Phonetic transcription with delimiters stripped
    pub transcription: String,
    /// Spoken-word pronunciation clip
    pub audio_url: String,
    pub image_url: Option<String>,
    pub translated_word: String,
}

impl Candidate {
    /// Card text shown under the photo
    #[must_use]
    pub fn caption(&self) -> String {
        format_card(
            &self.word,
            &self.transcription,
            &self.translated_word,
            &self.definition,
        )
    }
}

/// A word the learner chose to remember
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedWord {
    pub word: String,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub translated_word: String,
    pub transcription: String,
    pub learned_at: DateTime<Utc>,
}

impl LearnedWord {
    /// Card text for a review entry
    #[must_use]
    pub fn caption(&self) -> String {
        format_card(
            &self.word,
            &self.transcription,
            &self.translated_word,
            &self.definition,
        )
    }
}

fn format_card(word: &str, transcription: &str, translation: &str, definition: &str) -> String {
    format!("{word} [{transcription}] - {translation}\n\n{definition}")
}
