//! Error types for the vocabulary tutor

use thiserror::Error;

/// Result type alias for tutor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the vocabulary tutor
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Chat channel error (Bot API request failed or was rejected)
    #[error("channel error: {0}")]
    Channel(String),

    /// Lookup service error (word source, dictionary, audio download)
    #[error("provider error: {0}")]
    Provider(String),

    /// Image or translation lookup failed for an otherwise valid word
    #[error("enrichment failed for '{word}': {reason}")]
    Enrichment {
        /// Word being enriched
        word: String,
        /// Underlying failure
        reason: String,
    },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    /// Build an enrichment failure for `word`
    pub fn enrichment(word: &str, reason: impl std::fmt::Display) -> Self {
        Self::Enrichment {
            word: word.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error means persistence was unavailable
    #[must_use]
    pub const fn is_store_failure(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Sqlite(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_are_classified() {
        assert!(Error::Database("pool exhausted".to_string()).is_store_failure());
        assert!(Error::Sqlite(rusqlite::Error::QueryReturnedNoRows).is_store_failure());
        assert!(!Error::enrichment("dog", "no images").is_store_failure());
        assert!(!Error::Channel("chat not found".to_string()).is_store_failure());
    }

    #[test]
    fn enrichment_message_names_the_word() {
        let err = Error::enrichment("dog", "unsplash returned no results");
        assert_eq!(
            err.to_string(),
            "enrichment failed for 'dog': unsplash returned no results"
        );
    }
}
