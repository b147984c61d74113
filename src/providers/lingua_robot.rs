//! Lingua Robot dictionary (via `RapidAPI`)

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{Dictionary, DictionaryEntry, Pronunciation};
use crate::{Error, Result};

const API_HOST: &str = "lingua-robot.p.rapidapi.com";

#[derive(Debug, Default, Deserialize)]
struct EntriesResponse {
    #[serde(default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
struct Entry {
    #[serde(default)]
    lexemes: Vec<Lexeme>,
    #[serde(default)]
    pronunciations: Vec<RawPronunciation>,
}

#[derive(Debug, Default, Deserialize)]
struct Lexeme {
    #[serde(default)]
    senses: Vec<Sense>,
}

#[derive(Debug, Default, Deserialize)]
struct Sense {
    definition: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPronunciation {
    #[serde(default)]
    transcriptions: Vec<Transcription>,
    audio: Option<Audio>,
}

#[derive(Debug, Default, Deserialize)]
struct Transcription {
    transcription: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Audio {
    url: Option<String>,
}

/// Dictionary backed by the Lingua Robot API
pub struct LinguaRobotDictionary {
    client: reqwest::Client,
    api_key: SecretString,
}

impl LinguaRobotDictionary {
    /// Create a dictionary client with a `RapidAPI` key
    #[must_use]
    pub const fn new(client: reqwest::Client, api_key: SecretString) -> Self {
        Self { client, api_key }
    }
}

#[async_trait]
impl Dictionary for LinguaRobotDictionary {
    async fn lookup(&self, word: &str) -> Result<Option<DictionaryEntry>> {
        let url = format!(
            "https://{API_HOST}/language/v1/entries/en/{}",
            urlencoding::encode(word)
        );

        let response = self
            .client
            .get(&url)
            .header("X-RapidAPI-Key", self.api_key.expose_secret())
            .header("X-RapidAPI-Host", API_HOST)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Lingua Robot request failed: {e}")))?;

        if !response.status().is_success() {
            tracing::debug!(word, status = %response.status(), "no dictionary entry");
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Provider(format!("Lingua Robot response read error: {e}")))?;

        Ok(parse_entry(&body))
    }
}

/// Reduce an `/entries` response to the first entry's fields
///
/// Definition is the first sense of the first lexeme; transcription is the
/// first transcription of the first pronunciation.
fn parse_entry(body: &str) -> Option<DictionaryEntry> {
    let response: EntriesResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(error = %e, "unparseable Lingua Robot response");
            return None;
        }
    };

    let entry = response.entries.into_iter().next()?;

    let definition = entry
        .lexemes
        .first()
        .and_then(|lexeme| lexeme.senses.first())
        .and_then(|sense| sense.definition.clone());

    let transcription = entry
        .pronunciations
        .first()
        .and_then(|p| p.transcriptions.first())
        .and_then(|t| t.transcription.clone());

    let pronunciations = entry
        .pronunciations
        .into_iter()
        .map(|p| Pronunciation {
            audio_url: p.audio.and_then(|a| a.url),
        })
        .collect();

    Some(DictionaryEntry {
        definition,
        transcription,
        pronunciations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOG: &str = r#"{
        "entries": [{
            "entry": "dog",
            "lexemes": [{
                "lemma": "dog",
                "partOfSpeech": "noun",
                "senses": [{"definition": "A mammal, Canis familiaris."}]
            }],
            "pronunciations": [
                {
                    "transcriptions": [{"transcription": "/dɒɡ/", "notation": "IPA"}],
                    "context": {"regions": ["United Kingdom"]}
                },
                {
                    "audio": {"url": "https://audio.example/dog-us.mp3"},
                    "context": {"regions": ["United States"]}
                }
            ]
        }]
    }"#;

    #[test]
    fn parses_complete_entry() {
        let entry = parse_entry(DOG).unwrap();
        assert_eq!(entry.definition.as_deref(), Some("A mammal, Canis familiaris."));
        assert_eq!(entry.transcription.as_deref(), Some("/dɒɡ/"));
        assert_eq!(entry.pronunciations.len(), 2);
        assert_eq!(entry.spoken_clip(), Some("https://audio.example/dog-us.mp3"));
    }

    #[test]
    fn missing_fields_stay_empty() {
        let entry = parse_entry(r#"{"entries": [{"lexemes": []}]}"#).unwrap();
        assert!(entry.definition.is_none());
        assert!(entry.transcription.is_none());
        assert!(entry.pronunciations.is_empty());
    }

    #[test]
    fn no_entries_is_none() {
        assert!(parse_entry(r#"{"entries": []}"#).is_none());
        assert!(parse_entry("not json").is_none());
    }
}
