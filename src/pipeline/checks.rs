//! Validity checks applied to each sourced word
//!
//! Every check either passes or names the reason the word is discarded. The
//! sourcing loop runs them cheapest first and restarts on the first rejection.

use std::fmt;

use crate::providers::DictionaryEntry;

/// Why a sourced word was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The word source answered with nothing usable
    NoWord,
    /// Not a single alphabetic token (phrases, digits, punctuation)
    NotAlphabetic,
    /// Already learned or skipped in this chat
    AlreadySeen,
    /// Dictionary has no entry for the word
    NoEntry,
    MissingDefinition,
    MissingTranscription,
    /// Fewer than two pronunciations, or the second has no audio
    MissingSpokenClip,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NoWord => "no word offered",
            Self::NotAlphabetic => "not a single alphabetic word",
            Self::AlreadySeen => "already seen in this chat",
            Self::NoEntry => "no dictionary entry",
            Self::MissingDefinition => "no definition",
            Self::MissingTranscription => "no transcription",
            Self::MissingSpokenClip => "no spoken-word clip",
        };
        f.write_str(reason)
    }
}

/// A word whose dictionary entry satisfies every structural check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidWord {
    pub word: String,
    pub definition: String,
    /// Delimiters already stripped
    pub transcription: String,
    pub audio_url: String,
}

/// Check over the word token alone, before any lookup
pub type TokenCheck = fn(&str) -> Result<(), Rejection>;

/// Check over a dictionary entry
pub type EntryCheck = fn(&DictionaryEntry) -> Result<(), Rejection>;

/// Token checks, in the order they run
pub const TOKEN_CHECKS: &[TokenCheck] = &[single_alphabetic_token];

/// Entry checks, in the order they run
pub const ENTRY_CHECKS: &[EntryCheck] = &[has_definition, has_transcription, has_spoken_clip];

/// Lowercase and trim a raw word from the source
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Run the token checks against a normalized word
///
/// # Errors
///
/// Returns the first rejection
pub fn check_token(word: &str) -> Result<(), Rejection> {
    TOKEN_CHECKS.iter().try_for_each(|check| check(word))
}

/// Run the entry checks and extract the fields a candidate needs
///
/// # Errors
///
/// Returns the first rejection
pub fn validate_entry(word: &str, entry: &DictionaryEntry) -> Result<ValidWord, Rejection> {
    ENTRY_CHECKS.iter().try_for_each(|check| check(entry))?;

    // The checks above guarantee every field is present
    let (Some(definition), Some(transcription), Some(audio_url)) = (
        entry.definition.as_deref(),
        entry.transcription.as_deref(),
        entry.spoken_clip(),
    ) else {
        return Err(Rejection::NoEntry);
    };

    Ok(ValidWord {
        word: word.to_string(),
        definition: definition.trim().to_string(),
        transcription: strip_delimiters(transcription),
        audio_url: audio_url.to_string(),
    })
}

/// Remove the slashes that bracket phonetic notation
#[must_use]
pub fn strip_delimiters(transcription: &str) -> String {
    transcription.replace('/', "").trim().to_string()
}

fn single_alphabetic_token(word: &str) -> Result<(), Rejection> {
    if !word.is_empty() && word.chars().all(char::is_alphabetic) {
        Ok(())
    } else {
        Err(Rejection::NotAlphabetic)
    }
}

fn has_definition(entry: &DictionaryEntry) -> Result<(), Rejection> {
    match entry.definition.as_deref() {
        Some(d) if !d.trim().is_empty() => Ok(()),
        _ => Err(Rejection::MissingDefinition),
    }
}

fn has_transcription(entry: &DictionaryEntry) -> Result<(), Rejection> {
    match entry.transcription.as_deref().map(strip_delimiters) {
        Some(t) if !t.is_empty() => Ok(()),
        _ => Err(Rejection::MissingTranscription),
    }
}

fn has_spoken_clip(entry: &DictionaryEntry) -> Result<(), Rejection> {
    match entry.spoken_clip() {
        Some(url) if !url.is_empty() => Ok(()),
        _ => Err(Rejection::MissingSpokenClip),
    }
}
