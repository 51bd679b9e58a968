use crate::app_dirs::AppDirs;
use crate::difficulty::Difficulty;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub streak: u32,
}

/// Values supplied by the caller for a new attempt
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttempt<'a> {
    pub username: &'a str,
    pub wpm: f64,
    pub accuracy: f64,
    pub elapsed_secs: f64,
    pub difficulty: Difficulty,
}

/// A stored attempt. Rows are never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,
    pub username: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub elapsed_secs: f64,
    pub difficulty: Difficulty,
    pub recorded_at: DateTime<Utc>,
}

/// One leaderboard row: a user's best wpm and best accuracy for a tier.
/// The two maxima are taken independently, so they may come from different
/// attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub max_wpm: f64,
    pub max_accuracy: f64,
}

/// Append-only attempt log with per-user aggregation
#[derive(Debug)]
pub struct ScoreStore {
    conn: Connection,
}

impl ScoreStore {
    /// Open the store at the default state location
    pub fn open_default() -> Result<Self> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("accutype_scores.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "opened score store");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY,
                streak INTEGER DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS scores (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT,
                wpm REAL,
                accuracy REAL,
                time_taken REAL,
                difficulty TEXT,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_scores_difficulty_user
                ON scores(difficulty, username);
            "#,
        )?;
        Ok(ScoreStore { conn })
    }

    /// Create the user with a zero streak unless it already exists
    pub fn ensure_user(&self, username: &str) -> Result<()> {
        let created = self.conn.execute(
            "INSERT OR IGNORE INTO users (username) VALUES (?1)",
            params![username],
        )?;
        if created > 0 {
            tracing::info!(username, "created user");
        }
        Ok(())
    }

    pub fn user(&self, username: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT username, streak FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(User {
                        username: row.get(0)?,
                        streak: row.get(1)?,
                    })
                },
            )
            .optional()
    }

    pub fn user_count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
    }

    /// Append one attempt and return the stored row.
    ///
    /// The insert runs in an IMMEDIATE transaction so concurrent writers to the
    /// same database file are serialized and ids stay unique and increasing.
    pub fn record_attempt(&mut self, attempt: &NewAttempt<'_>) -> Result<Attempt> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            r#"
            INSERT INTO scores (username, wpm, accuracy, time_taken, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                attempt.username,
                attempt.wpm,
                attempt.accuracy,
                attempt.elapsed_secs,
                attempt.difficulty,
            ],
        )?;
        let id = tx.last_insert_rowid();

        let stored = tx.query_row(
            r#"
            SELECT id, username, wpm, accuracy, time_taken, difficulty, timestamp
            FROM scores WHERE id = ?1
            "#,
            params![id],
            attempt_from_row,
        )?;

        tx.commit()?;
        tracing::info!(
            id,
            username = attempt.username,
            difficulty = %attempt.difficulty,
            wpm = attempt.wpm,
            accuracy = attempt.accuracy,
            "recorded attempt"
        );
        Ok(stored)
    }

    /// Best wpm and best accuracy per user for one tier, fastest first
    pub fn top_scores(&self, difficulty: Difficulty, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT username, MAX(wpm) AS max_wpm, MAX(accuracy) AS max_accuracy
            FROM scores
            WHERE difficulty = ?1
            GROUP BY username
            ORDER BY max_wpm DESC, MIN(id) ASC
            LIMIT ?2
            "#,
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![difficulty, limit], |row| {
            Ok(LeaderboardEntry {
                username: row.get(0)?,
                max_wpm: row.get(1)?,
                max_accuracy: row.get(2)?,
            })
        })?;

        let entries = rows.collect::<Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Attempts for one user (or everyone), newest first
    pub fn attempts(&self, username: Option<&str>) -> Result<Vec<Attempt>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, username, wpm, accuracy, time_taken, difficulty, timestamp
            FROM scores
            WHERE ?1 IS NULL OR username = ?1
            ORDER BY id DESC
            "#,
        )?;

        let rows = stmt.query_map(params![username], attempt_from_row)?;
        let attempts = rows.collect::<Result<Vec<_>>>()?;
        Ok(attempts)
    }

    pub fn attempt_count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM scores", [], |row| row.get(0))
    }
}

fn attempt_from_row(row: &rusqlite::Row<'_>) -> Result<Attempt> {
    let timestamp: String = row.get(6)?;
    let recorded_at = NaiveDateTime::parse_from_str(&timestamp, SQLITE_TIMESTAMP_FORMAT)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?
        .and_utc();

    Ok(Attempt {
        id: row.get(0)?,
        username: row.get(1)?,
        wpm: row.get(2)?,
        accuracy: row.get(3)?,
        elapsed_secs: row.get(4)?,
        difficulty: row.get(5)?,
        recorded_at,
    })
}
