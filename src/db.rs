//! Quiz session storage keyed by the front end's session id

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::QuizResult;
use crate::session::QuizSession;

/// Where in-flight quizzes live between requests
pub trait SessionStore {
    fn load(&self, session_id: &str) -> QuizResult<Option<QuizSession>>;
    fn save(&mut self, session_id: &str, session: &QuizSession) -> QuizResult<()>;
    fn remove(&mut self, session_id: &str) -> QuizResult<()>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: HashMap<String, QuizSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, session_id: &str) -> QuizResult<Option<QuizSession>> {
        Ok(self.sessions.get(session_id).cloned())
    }

    fn save(&mut self, session_id: &str, session: &QuizSession) -> QuizResult<()> {
        self.sessions.insert(session_id.to_string(), session.clone());
        Ok(())
    }

    fn remove(&mut self, session_id: &str) -> QuizResult<()> {
        self.sessions.remove(session_id);
        Ok(())
    }
}

/// Sessions persisted in SQLite as JSON, so a restart does not lose running quizzes
pub struct SqliteSessionStore {
    conn: Connection,
}

impl SqliteSessionStore {
    pub fn open<P: AsRef<Path>>(db_path: P) -> QuizResult<Self> {
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> QuizResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> QuizResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS quiz_sessions (
                id TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> QuizResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM quiz_sessions", [], |row| row.get(0))?;
        Ok(n)
    }
}

impl SessionStore for SqliteSessionStore {
    fn load(&self, session_id: &str) -> QuizResult<Option<QuizSession>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM quiz_sessions WHERE id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => match serde_json::from_str(&json) {
                Ok(session) => Ok(Some(session)),
                Err(e) => {
                    // An unreadable session is treated as absent; the user starts over
                    tracing::warn!(session_id, error = %e, "discarding unreadable quiz session");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    fn save(&mut self, session_id: &str, session: &QuizSession) -> QuizResult<()> {
        let payload = serde_json::to_string(session)?;
        self.conn.execute(
            "INSERT INTO quiz_sessions (id, payload, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(id) DO UPDATE SET payload = excluded.payload, updated_at = CURRENT_TIMESTAMP",
            params![session_id, payload],
        )?;
        Ok(())
    }

    fn remove(&mut self, session_id: &str) -> QuizResult<()> {
        self.conn
            .execute("DELETE FROM quiz_sessions WHERE id = ?1", params![session_id])?;
        Ok(())
    }
}
