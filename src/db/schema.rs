//! Database schema and migrations

use rusqlite::Connection;

use crate::Result;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Initialize the database schema
///
/// # Errors
///
/// Returns error if migration fails
pub fn init(conn: &Connection) -> Result<()> {
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        migrate_v1(conn)?;
    }
    if version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r"
        -- Words a learner chose to remember; rowid order is learning order
        CREATE TABLE IF NOT EXISTS learned_words (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chat_id INTEGER NOT NULL,
            word TEXT NOT NULL,
            definition TEXT NOT NULL,
            image_url TEXT,
            translated_word TEXT NOT NULL,
            transcription TEXT NOT NULL,
            learned_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_learned_chat ON learned_words(chat_id, id);
        CREATE INDEX IF NOT EXISTS idx_learned_chat_word ON learned_words(chat_id, word);

        -- Words a learner rejected; never offered again to that chat
        CREATE TABLE IF NOT EXISTS skipped_words (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chat_id INTEGER NOT NULL,
            word TEXT NOT NULL,
            skipped_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_skipped_chat_word ON skipped_words(chat_id, word);

        PRAGMA user_version = 1;
        ",
    )?;

    tracing::info!("migrated to schema v1");
    Ok(())
}

fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r"
        -- Per-chat activity counters for the stats command
        CREATE VIEW IF NOT EXISTS chat_lexicon_stats AS
            SELECT chat_id,
                   SUM(learned) AS learned,
                   SUM(skipped) AS skipped
            FROM (
                SELECT chat_id, 1 AS learned, 0 AS skipped FROM learned_words
                UNION ALL
                SELECT chat_id, 0 AS learned, 1 AS skipped FROM skipped_words
            )
            GROUP BY chat_id;

        PRAGMA user_version = 2;
        ",
    )?;

    tracing::info!("migrated to schema v2");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init(&conn).unwrap();
        init(&conn).unwrap();

        let version: i32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }
}
