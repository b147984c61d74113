//! Configuration management for the vocabulary tutor
//!
//! Values resolve as environment variable, then config file, then default.

pub mod file;

use std::path::PathBuf;

use secrecy::SecretString;

use crate::providers::deepl;
use crate::{Error, Result};

use file::TutorConfigFile;

/// Default word source theme
pub const DEFAULT_THEME: &str = "love";

/// Default translation target language
pub const DEFAULT_TARGET_LANG: &str = "UK";

/// Default `getUpdates` long-poll timeout
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// Vocabulary tutor configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to data directory (lexicon database)
    pub data_dir: PathBuf,

    /// Telegram transport configuration
    pub telegram: TelegramConfig,

    /// Lookup service configuration
    pub providers: ProvidersConfig,
}

/// Telegram transport configuration
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token
    pub token: SecretString,

    /// Long-poll timeout in seconds
    pub poll_timeout_secs: u64,
}

/// Lookup service configuration
#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    /// Theme passed to the word source
    pub word_theme: String,

    /// Lingua Robot `RapidAPI` key
    pub lingua_robot_key: SecretString,

    /// `DeepL` auth key
    pub deepl_key: SecretString,

    /// `DeepL` translate endpoint
    pub deepl_url: String,

    /// `DeepL` target language
    pub target_lang: String,

    /// Unsplash access key
    pub unsplash_key: SecretString,
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// `data_dir_override` (from the CLI) wins over every other source.
    ///
    /// # Errors
    ///
    /// Returns error if a required API key is missing
    pub fn load(data_dir_override: Option<PathBuf>) -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(&fc, |key| std::env::var(key).ok(), data_dir_override)
    }

    /// Resolve configuration from a parsed config file and an env lookup
    ///
    /// # Errors
    ///
    /// Returns error if a required API key is missing
    pub fn from_sources(
        fc: &TutorConfigFile,
        env: impl Fn(&str) -> Option<String>,
        data_dir_override: Option<PathBuf>,
    ) -> Result<Self> {
        let secret = |var: &str, from_file: Option<&String>| -> Result<SecretString> {
            env(var)
                .or_else(|| from_file.cloned())
                .filter(|s| !s.trim().is_empty())
                .map(SecretString::from)
                .ok_or_else(|| Error::Config(format!("{var} not set")))
        };

        let telegram = TelegramConfig {
            token: secret("TELEGRAM_BOT_TOKEN", fc.api_keys.telegram.as_ref())?,
            poll_timeout_secs: env("TUTOR_POLL_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .or(fc.telegram.poll_timeout_secs)
                .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS),
        };

        let providers = ProvidersConfig {
            word_theme: env("TUTOR_WORD_THEME")
                .or_else(|| fc.lexicon.theme.clone())
                .unwrap_or_else(|| DEFAULT_THEME.to_string()),
            lingua_robot_key: secret("LINGUA_ROBOT_API_KEY", fc.api_keys.lingua_robot.as_ref())?,
            deepl_key: secret("DEEPL_API_KEY", fc.api_keys.deepl.as_ref())?,
            deepl_url: env("DEEPL_API_URL")
                .or_else(|| fc.lexicon.deepl_url.clone())
                .unwrap_or_else(|| deepl::DEFAULT_API_URL.to_string()),
            target_lang: env("TUTOR_TARGET_LANG")
                .or_else(|| fc.lexicon.target_lang.clone())
                .unwrap_or_else(|| DEFAULT_TARGET_LANG.to_string()),
            unsplash_key: secret("UNSPLASH_ACCESS_KEY", fc.api_keys.unsplash.as_ref())?,
        };

        Ok(Self {
            data_dir: resolve_data_dir(fc, &env, data_dir_override),
            telegram,
            providers,
        })
    }

    /// Path to the lexicon database
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        db_path(&self.data_dir)
    }
}

/// Resolve the data directory without requiring any API keys
///
/// Used by the administrative subcommands, which never talk to the network.
#[must_use]
pub fn data_dir(data_dir_override: Option<PathBuf>) -> PathBuf {
    let fc = file::load_config_file();
    resolve_data_dir(&fc, &|key| std::env::var(key).ok(), data_dir_override)
}

/// Path to the lexicon database inside `data_dir`
#[must_use]
pub fn db_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("lexicon.db")
}

fn resolve_data_dir(
    fc: &TutorConfigFile,
    env: &impl Fn(&str) -> Option<String>,
    data_dir_override: Option<PathBuf>,
) -> PathBuf {
    data_dir_override
        .or_else(|| env("TUTOR_DATA_DIR").map(PathBuf::from))
        .or_else(|| fc.data_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| {
            directories::BaseDirs::new()
                .map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("vocab-tutor"))
        })
}
