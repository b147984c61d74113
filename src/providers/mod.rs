//! Lookup services that source and enrich vocabulary words
//!
//! Each service sits behind a trait so the sourcing pipeline can run against
//! deterministic stubs in tests and the HTTP clients in production.

pub mod audio;
pub mod datamuse;
pub mod deepl;
pub mod lingua_robot;
pub mod unsplash;

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;

pub use audio::HttpAudioFetcher;
pub use datamuse::DatamuseWordSource;
pub use deepl::DeeplTranslator;
pub use lingua_robot::LinguaRobotDictionary;
pub use unsplash::UnsplashImageSearch;

/// Source of candidate words for a fixed theme
#[async_trait]
pub trait WordSource: Send + Sync {
    /// Fetch one candidate word
    ///
    /// Words may repeat across calls. `None` means the service answered but
    /// offered nothing usable this time.
    ///
    /// # Errors
    ///
    /// Returns error if the service cannot be reached
    async fn next_word(&self) -> Result<Option<String>>;
}

/// Dictionary and pronunciation lookup
#[async_trait]
pub trait Dictionary: Send + Sync {
    /// Look up a word
    ///
    /// Returns `None` when the service has no usable entry for the word.
    ///
    /// # Errors
    ///
    /// Returns error if the service cannot be reached
    async fn lookup(&self, word: &str) -> Result<Option<DictionaryEntry>>;
}

/// Word translation
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a single word into the configured target language
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or yields no translation
    async fn translate(&self, word: &str) -> Result<String>;
}

/// Image search
#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// URL of the first image found for `query`
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or finds nothing
    async fn first_image(&self, query: &str) -> Result<String>;
}

/// Downloads pronunciation audio
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    /// Download the clip at `url`
    ///
    /// # Errors
    ///
    /// Returns error if the download fails
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// One pronunciation variant of a dictionary entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pronunciation {
    pub audio_url: Option<String>,
}

/// Dictionary data for a word; any field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub definition: Option<String>,
    /// Phonetic notation as returned by the service, delimiters included
    pub transcription: Option<String>,
    pub pronunciations: Vec<Pronunciation>,
}

impl DictionaryEntry {
    /// The spoken-word clip
    ///
    /// The first pronunciation is usually another dialect or format; the
    /// second is the clip played to the learner.
    #[must_use]
    pub fn spoken_clip(&self) -> Option<&str> {
        self.pronunciations.get(1)?.audio_url.as_deref()
    }
}

/// The set of lookup services the pipeline and controller use
#[derive(Clone)]
pub struct Providers {
    pub words: Arc<dyn WordSource>,
    pub dictionary: Arc<dyn Dictionary>,
    pub translator: Arc<dyn Translator>,
    pub images: Arc<dyn ImageSearch>,
    pub audio: Arc<dyn AudioFetcher>,
}

impl Providers {
    /// Build the HTTP-backed providers from configuration
    #[must_use]
    pub fn from_config(config: &crate::config::ProvidersConfig) -> Self {
        let client = reqwest::Client::new();

        Self {
            words: Arc::new(DatamuseWordSource::new(
                client.clone(),
                config.word_theme.clone(),
            )),
            dictionary: Arc::new(LinguaRobotDictionary::new(
                client.clone(),
                config.lingua_robot_key.clone(),
            )),
            translator: Arc::new(DeeplTranslator::new(
                client.clone(),
                config.deepl_key.clone(),
                config.deepl_url.clone(),
                config.target_lang.clone(),
            )),
            images: Arc::new(UnsplashImageSearch::new(
                client.clone(),
                config.unsplash_key.clone(),
            )),
            audio: Arc::new(HttpAudioFetcher::new(client)),
        }
    }
}
