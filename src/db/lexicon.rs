//! Learned and skipped word repository

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::DbPool;
use crate::word::{Candidate, ChatId, LearnedWord};
use crate::{Error, Result};

/// Persistent record of which words each chat has already seen
///
/// Deduplication is per chat: a word seen in one chat may still be offered
/// to another.
pub trait LexiconStore: Send + Sync {
    /// Whether `word` is in the learned or skipped set of `chat_id`
    ///
    /// # Errors
    ///
    /// Returns error if the store is unavailable
    fn is_seen(&self, chat_id: ChatId, word: &str) -> Result<bool>;

    /// Record a remembered candidate
    ///
    /// Not idempotent. Callers must not commit a word that `is_seen`.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unavailable
    fn commit_learned(&self, chat_id: ChatId, candidate: &Candidate) -> Result<()>;

    /// Record a skipped word
    ///
    /// # Errors
    ///
    /// Returns error if the store is unavailable
    fn commit_skipped(&self, chat_id: ChatId, word: &str) -> Result<()>;

    /// Learned words of a chat in the order they were learned
    ///
    /// # Errors
    ///
    /// Returns error if the store is unavailable
    fn list_learned(&self, chat_id: ChatId) -> Result<Vec<LearnedWord>>;

    /// Learned word at `position` in learning order, if any
    ///
    /// # Errors
    ///
    /// Returns error if the store is unavailable
    fn learned_at(&self, chat_id: ChatId, position: usize) -> Result<Option<LearnedWord>> {
        Ok(self.list_learned(chat_id)?.into_iter().nth(position))
    }

    /// Delete every learned and skipped word of a chat
    ///
    /// # Errors
    ///
    /// Returns error if the store is unavailable
    fn clear_all(&self, chat_id: ChatId) -> Result<()>;
}

/// Learned/skipped counts for one chat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LexiconStats {
    pub learned: u64,
    pub skipped: u64,
}

/// `SQLite`-backed lexicon repository
#[derive(Debug, Clone)]
pub struct LexiconRepo {
    pool: DbPool,
}

impl LexiconRepo {
    /// Create a new repository
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Learned/skipped counts for a chat
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn stats(&self, chat_id: ChatId) -> Result<LexiconStats> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        let result = conn.query_row(
            "SELECT learned, skipped FROM chat_lexicon_stats WHERE chat_id = ?1",
            [chat_id],
            |row| {
                Ok(LexiconStats {
                    learned: u64::try_from(row.get::<_, i64>(0)?).unwrap_or(0),
                    skipped: u64::try_from(row.get::<_, i64>(1)?).unwrap_or(0),
                })
            },
        );

        match result {
            Ok(stats) => Ok(stats),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(LexiconStats::default()),
            Err(e) => Err(e.into()),
        }
    }
}

impl LexiconStore for LexiconRepo {
    fn is_seen(&self, chat_id: ChatId, word: &str) -> Result<bool> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        let seen: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM learned_words WHERE chat_id = ?1 AND word = ?2)
                 OR EXISTS(SELECT 1 FROM skipped_words WHERE chat_id = ?1 AND word = ?2)",
            rusqlite::params![chat_id, word],
            |row| row.get(0),
        )?;

        Ok(seen)
    }

    fn commit_learned(&self, chat_id: ChatId, candidate: &Candidate) -> Result<()> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO learned_words (chat_id, word, definition, image_url, translated_word, transcription, learned_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                chat_id,
                candidate.word,
                candidate.definition,
                candidate.image_url,
                candidate.translated_word,
                candidate.transcription,
                Utc::now().to_rfc3339(),
            ],
        )?;

        tracing::debug!(chat_id, word = %candidate.word, "word learned");
        Ok(())
    }

    fn commit_skipped(&self, chat_id: ChatId, word: &str) -> Result<()> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO skipped_words (chat_id, word, skipped_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![chat_id, word, Utc::now().to_rfc3339()],
        )?;

        tracing::debug!(chat_id, word, "word skipped");
        Ok(())
    }

    fn list_learned(&self, chat_id: ChatId) -> Result<Vec<LearnedWord>> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn.prepare(
            "SELECT word, definition, image_url, translated_word, transcription, learned_at
             FROM learned_words WHERE chat_id = ?1 ORDER BY id",
        )?;

        let words = stmt
            .query_map([chat_id], row_to_learned)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(words)
    }

    fn learned_at(&self, chat_id: ChatId, position: usize) -> Result<Option<LearnedWord>> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;
        let offset = i64::try_from(position).map_err(|e| Error::Database(e.to_string()))?;

        let result = conn.query_row(
            "SELECT word, definition, image_url, translated_word, transcription, learned_at
             FROM learned_words WHERE chat_id = ?1 ORDER BY id LIMIT 1 OFFSET ?2",
            rusqlite::params![chat_id, offset],
            row_to_learned,
        );

        match result {
            Ok(word) => Ok(Some(word)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear_all(&self, chat_id: ChatId) -> Result<()> {
        let mut conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        let tx = conn.transaction()?;
        let learned = tx.execute("DELETE FROM learned_words WHERE chat_id = ?1", [chat_id])?;
        let skipped = tx.execute("DELETE FROM skipped_words WHERE chat_id = ?1", [chat_id])?;
        tx.commit()?;

        tracing::info!(chat_id, learned, skipped, "lexicon cleared");
        Ok(())
    }
}

fn row_to_learned(row: &rusqlite::Row<'_>) -> rusqlite::Result<LearnedWord> {
    Ok(LearnedWord {
        word: row.get(0)?,
        definition: row.get(1)?,
        image_url: row.get(2)?,
        translated_word: row.get(3)?,
        transcription: row.get(4)?,
        learned_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
