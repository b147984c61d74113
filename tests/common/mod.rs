//! Shared test utilities

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use vocab_tutor::channels::{ChatChannel, Keyboard, MessageRef};
use vocab_tutor::db::{self, LexiconRepo, LexiconStore};
use vocab_tutor::providers::{
    AudioFetcher, Dictionary, DictionaryEntry, ImageSearch, Pronunciation, Providers, Translator,
    WordSource,
};
use vocab_tutor::word::{Candidate, ChatId, LearnedWord};
use vocab_tutor::{Controller, Error, Pipeline, Result};

/// Set up an in-memory lexicon
#[must_use]
pub fn setup_lexicon() -> Arc<LexiconRepo> {
    Arc::new(LexiconRepo::new(
        db::init_memory().expect("failed to init test db"),
    ))
}

/// Word source that replays a fixed script, then errors
#[derive(Default)]
pub struct ScriptedWords {
    script: Mutex<VecDeque<Option<String>>>,
    calls: AtomicUsize,
}

impl ScriptedWords {
    pub fn new(words: &[&str]) -> Self {
        let script = words.iter().map(|w| Some((*w).to_string())).collect();
        Self {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
        }
    }

    /// Append an empty response (source returned nothing)
    pub fn push_empty(&self) {
        self.script.lock().unwrap().push_back(None);
    }

    pub fn push(&self, word: &str) {
        self.script.lock().unwrap().push_back(Some(word.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WordSource for ScriptedWords {
    async fn next_word(&self) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Provider("word script exhausted".to_string()))
    }
}

/// Dictionary with canned entries; unknown words have no entry
#[derive(Default)]
pub struct StubDictionary {
    entries: Mutex<HashMap<String, DictionaryEntry>>,
    lookups: Mutex<Vec<String>>,
}

impl StubDictionary {
    /// Complete entry with two pronunciations
    pub fn with_words(words: &[&str]) -> Self {
        let dictionary = Self::default();
        for word in words {
            dictionary.insert(word, full_entry(word));
        }
        dictionary
    }

    pub fn insert(&self, word: &str, entry: DictionaryEntry) {
        self.entries.lock().unwrap().insert(word.to_string(), entry);
    }

    /// Words looked up, in order
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dictionary for StubDictionary {
    async fn lookup(&self, word: &str) -> Result<Option<DictionaryEntry>> {
        self.lookups.lock().unwrap().push(word.to_string());
        Ok(self.entries.lock().unwrap().get(word).cloned())
    }
}

/// Entry with definition, `/transcription/` and two clips
pub fn full_entry(word: &str) -> DictionaryEntry {
    DictionaryEntry {
        definition: Some(format!("definition of {word}")),
        transcription: Some(format!("/{word}/")),
        pronunciations: vec![
            Pronunciation {
                audio_url: Some(format!("https://audio.test/{word}-uk.mp3")),
            },
            Pronunciation {
                audio_url: Some(format!("https://audio.test/{word}.mp3")),
            },
        ],
    }
}

/// Entry that only has the first pronunciation
pub fn entry_without_spoken_clip(word: &str) -> DictionaryEntry {
    let mut entry = full_entry(word);
    entry.pronunciations.truncate(1);
    entry
}

/// Translator that prefixes the word, or always fails
#[derive(Default)]
pub struct StubTranslator {
    pub fail: AtomicBool,
}

#[async_trait]
impl Translator for StubTranslator {
    async fn translate(&self, word: &str) -> Result<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Provider("translation service down".to_string()));
        }
        Ok(format!("tr-{word}"))
    }
}

/// Image search returning a URL per word, or always failing
#[derive(Default)]
pub struct StubImages {
    pub fail: AtomicBool,
}

#[async_trait]
impl ImageSearch for StubImages {
    async fn first_image(&self, query: &str) -> Result<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Provider("image search down".to_string()));
        }
        Ok(format!("https://img.test/{query}.jpg"))
    }
}

/// Audio fetcher returning fixed bytes
#[derive(Default)]
pub struct StubAudio {
    pub fetched: Mutex<Vec<String>>,
}

#[async_trait]
impl AudioFetcher for StubAudio {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.fetched.lock().unwrap().push(url.to_string());
        Ok(b"ID3 fake mp3".to_vec())
    }
}

/// Everything the channel was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text {
        id: MessageRef,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Photo {
        id: MessageRef,
        url: String,
        caption: String,
        keyboard: Option<Keyboard>,
    },
    Audio {
        id: MessageRef,
        path: PathBuf,
        title: String,
        /// File existed while the upload ran
        existed: bool,
        /// File size while the upload ran
        len: u64,
    },
    Deleted(MessageRef),
}

/// Chat channel that records calls instead of talking to Telegram
pub struct RecordingChannel {
    sent: Mutex<Vec<Sent>>,
    next_id: AtomicI64,
    pub fail_audio: AtomicBool,
    pub fail_photo: AtomicBool,
}

impl Default for RecordingChannel {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(100),
            fail_audio: AtomicBool::new(false),
            fail_photo: AtomicBool::new(false),
        }
    }
}

impl RecordingChannel {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    /// Captions of every photo card, in order
    pub fn photo_captions(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Photo { caption, .. } => Some(caption),
                _ => None,
            })
            .collect()
    }

    /// Text of every plain message, in order
    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn audio_paths(&self) -> Vec<PathBuf> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Audio { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<MessageRef> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Deleted(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn next(&self) -> MessageRef {
        MessageRef(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl ChatChannel for RecordingChannel {
    async fn send_text(
        &self,
        _chat_id: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef> {
        let id = self.next();
        self.sent.lock().unwrap().push(Sent::Text {
            id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(id)
    }

    async fn send_photo(
        &self,
        _chat_id: ChatId,
        photo_url: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef> {
        if self.fail_photo.load(Ordering::SeqCst) {
            return Err(Error::Channel("sendPhoto rejected".to_string()));
        }
        let id = self.next();
        self.sent.lock().unwrap().push(Sent::Photo {
            id,
            url: photo_url.to_string(),
            caption: caption.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(id)
    }

    async fn send_audio(&self, _chat_id: ChatId, path: &Path, title: &str) -> Result<MessageRef> {
        let id = self.next();
        self.sent.lock().unwrap().push(Sent::Audio {
            id,
            path: path.to_path_buf(),
            title: title.to_string(),
            existed: path.exists(),
            len: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
        });
        if self.fail_audio.load(Ordering::SeqCst) {
            return Err(Error::Channel("sendAudio rejected".to_string()));
        }
        Ok(id)
    }

    async fn delete_message(&self, _chat_id: ChatId, message: MessageRef) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Deleted(message));
        Ok(())
    }
}

/// Lexicon wrapper whose reads and writes can be switched off
pub struct FlakyStore {
    inner: Arc<LexiconRepo>,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
    /// Start failing reads as soon as a write succeeds
    pub fail_reads_after_write: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<LexiconRepo>) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            fail_reads_after_write: AtomicBool::new(false),
        }
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Database("disk I/O error".to_string()));
        }
        Ok(())
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Database("database is locked".to_string()));
        }
        Ok(())
    }

    fn after_write(&self) {
        if self.fail_reads_after_write.load(Ordering::SeqCst) {
            self.fail_reads.store(true, Ordering::SeqCst);
        }
    }
}

impl LexiconStore for FlakyStore {
    fn is_seen(&self, chat_id: ChatId, word: &str) -> Result<bool> {
        self.check_read()?;
        self.inner.is_seen(chat_id, word)
    }

    fn commit_learned(&self, chat_id: ChatId, candidate: &Candidate) -> Result<()> {
        self.check_write()?;
        self.inner.commit_learned(chat_id, candidate)?;
        self.after_write();
        Ok(())
    }

    fn commit_skipped(&self, chat_id: ChatId, word: &str) -> Result<()> {
        self.check_write()?;
        self.inner.commit_skipped(chat_id, word)?;
        self.after_write();
        Ok(())
    }

    fn list_learned(&self, chat_id: ChatId) -> Result<Vec<LearnedWord>> {
        self.check_read()?;
        self.inner.list_learned(chat_id)
    }

    fn learned_at(&self, chat_id: ChatId, position: usize) -> Result<Option<LearnedWord>> {
        self.check_read()?;
        self.inner.learned_at(chat_id, position)
    }

    fn clear_all(&self, chat_id: ChatId) -> Result<()> {
        self.check_write()?;
        self.inner.clear_all(chat_id)?;
        self.after_write();
        Ok(())
    }
}

/// Stubs wired into a pipeline and controller
pub struct Harness {
    pub words: Arc<ScriptedWords>,
    pub dictionary: Arc<StubDictionary>,
    pub translator: Arc<StubTranslator>,
    pub images: Arc<StubImages>,
    pub audio: Arc<StubAudio>,
    pub lexicon: Arc<LexiconRepo>,
    pub store: Arc<FlakyStore>,
    pub channel: Arc<RecordingChannel>,
}

impl Harness {
    /// Word source replays `script`; every word in `known` has a full entry
    pub fn new(script: &[&str], known: &[&str]) -> Self {
        let lexicon = setup_lexicon();
        Self {
            words: Arc::new(ScriptedWords::new(script)),
            dictionary: Arc::new(StubDictionary::with_words(known)),
            translator: Arc::new(StubTranslator::default()),
            images: Arc::new(StubImages::default()),
            audio: Arc::new(StubAudio::default()),
            store: Arc::new(FlakyStore::new(Arc::clone(&lexicon))),
            lexicon,
            channel: Arc::new(RecordingChannel::default()),
        }
    }

    pub fn providers(&self) -> Providers {
        Providers {
            words: self.words.clone(),
            dictionary: self.dictionary.clone(),
            translator: self.translator.clone(),
            images: self.images.clone(),
            audio: self.audio.clone(),
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.providers(), self.store.clone())
    }

    pub fn controller(&self) -> Controller {
        Controller::new(self.pipeline(), self.store.clone(), self.channel.clone())
    }
}

/// Enriched candidate for seeding the lexicon directly
pub fn candidate(word: &str) -> Candidate {
    Candidate {
        word: word.to_string(),
        definition: format!("definition of {word}"),
        transcription: word.to_string(),
        audio_url: format!("https://audio.test/{word}.mp3"),
        image_url: Some(format!("https://img.test/{word}.jpg")),
        translated_word: format!("tr-{word}"),
    }
}
