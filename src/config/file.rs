//! TOML configuration file loading
//!
//! Supports `~/.config/vocab-tutor/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct TutorConfigFile {
    /// Directory holding the lexicon database
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Word sourcing and enrichment settings
    #[serde(default)]
    pub lexicon: LexiconFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Telegram transport settings
    #[serde(default)]
    pub telegram: TelegramFileConfig,
}

/// Word sourcing configuration
#[derive(Debug, Default, Deserialize)]
pub struct LexiconFileConfig {
    /// Semantic theme for the word source (e.g. "love")
    pub theme: Option<String>,

    /// `DeepL` target language code (e.g. "UK")
    pub target_lang: Option<String>,

    /// `DeepL` translate endpoint
    pub deepl_url: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub telegram: Option<String>,
    pub unsplash: Option<String>,
    pub deepl: Option<String>,
    pub lingua_robot: Option<String>,
}

/// Telegram polling configuration
#[derive(Debug, Default, Deserialize)]
pub struct TelegramFileConfig {
    /// Long-poll timeout passed to `getUpdates`, in seconds
    pub poll_timeout_secs: Option<u64>,
}

/// Load the TOML config file from the standard path
///
/// Returns `TutorConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> TutorConfigFile {
    let Some(path) = config_file_path() else {
        return TutorConfigFile::default();
    };

    if !path.exists() {
        return TutorConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                TutorConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            TutorConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/vocab-tutor/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("vocab-tutor").join("config.toml"))
}
