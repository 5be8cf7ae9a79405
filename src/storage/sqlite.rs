//! SQLite history backend
//!
//! One local database file with a single `history` table. The schema matches
//! history files written by earlier versions of the coach, so existing files
//! can be opened as-is.
//!
//! Each operation opens and closes its own connection on a blocking thread.
//! No pooling and no cross-process locking beyond SQLite's own.

use crate::error::{CoachError, Result};
use crate::imaging;
use crate::storage::HistoryBackend;
use crate::types::{EvaluationMode, EvaluationRecord, RecordId};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use image::DynamicImage;
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const CREATE_HISTORY_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        mode TEXT NOT NULL,
        score INTEGER,
        feedback TEXT,
        image_blob BLOB,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// `created_at` has second resolution, so `id` breaks ties between rows
/// written within the same second.
const SELECT_HISTORY: &str = r#"
    SELECT id, mode, score, feedback, image_blob, created_at
    FROM history
    ORDER BY created_at DESC, id DESC
"#;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Row as stored, before image decoding
struct RawRow {
    id: i64,
    mode: String,
    score: Option<i64>,
    feedback: Option<String>,
    image_blob: Option<Vec<u8>>,
    created_at: String,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            mode: row.get("mode")?,
            score: row.get("score")?,
            feedback: row.get("feedback")?,
            image_blob: row.get("image_blob")?,
            created_at: row.get("created_at")?,
        })
    }

    fn into_record(self) -> Result<EvaluationRecord> {
        let id = RecordId(self.id);

        let mode = EvaluationMode::from_tag(&self.mode).ok_or_else(|| {
            CoachError::StorageUnavailable(format!(
                "history row {} has unknown mode tag '{}'",
                id, self.mode
            ))
        })?;

        let score = self
            .score
            .map(|s| {
                u16::try_from(s).map_err(|_| {
                    CoachError::StorageUnavailable(format!(
                        "history row {} has invalid score {}",
                        id, s
                    ))
                })
            })
            .transpose()?;

        let blob = self.image_blob.ok_or_else(|| {
            CoachError::StorageUnavailable(format!("history row {} has no image", id))
        })?;
        let image = imaging::decode(&blob).map_err(|e| {
            CoachError::StorageUnavailable(format!("history row {} has an unreadable image: {}", id, e))
        })?;

        let created_at = parse_timestamp(&self.created_at).ok_or_else(|| {
            CoachError::StorageUnavailable(format!(
                "history row {} has unreadable timestamp '{}'",
                id, self.created_at
            ))
        })?;

        Ok(EvaluationRecord {
            id,
            mode,
            score,
            feedback: self.feedback.unwrap_or_default(),
            image,
            created_at,
        })
    }
}

/// Parse SQLite `CURRENT_TIMESTAMP` text (optionally with fractional seconds)
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
}

/// SQLite-file history store
#[derive(Debug, Clone)]
pub struct SqliteHistoryStore {
    path: PathBuf,
}

impl SqliteHistoryStore {
    /// Open (creating if absent) the history database at `path`
    ///
    /// The parent directory must already exist. Safe to call repeatedly on the
    /// same file: the schema is created with `IF NOT EXISTS`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };

        // Fail fast on an unusable location and create the table up front
        store.connect()?;
        info!("History store ready at {}", store.path.display());

        Ok(store)
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            CoachError::StorageUnavailable(format!(
                "cannot open history database '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute(CREATE_HISTORY_TABLE, [])?;

        Ok(conn)
    }

    fn append_blocking(
        &self,
        mode: EvaluationMode,
        score: Option<u16>,
        feedback: &str,
        png: &[u8],
    ) -> Result<RecordId> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO history (mode, score, feedback, image_blob) VALUES (?1, ?2, ?3, ?4)",
            params![mode.tag(), score.map(i64::from), feedback, png],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(RecordId(id))
    }

    fn list_all_blocking(&self) -> Result<Vec<EvaluationRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(SELECT_HISTORY)?;

        let rows = stmt
            .query_map([], RawRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(RawRow::into_record).collect()
    }

    fn count_blocking(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn run_blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(SqliteHistoryStore) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || op(store))
            .await
            .map_err(|e| CoachError::StorageUnavailable(format!("storage task failed: {}", e)))?
    }
}

#[async_trait]
impl HistoryBackend for SqliteHistoryStore {
    async fn append(
        &self,
        mode: EvaluationMode,
        score: Option<u16>,
        feedback: &str,
        image: &DynamicImage,
    ) -> Result<RecordId> {
        let png = imaging::encode_png(image)?;
        let feedback = feedback.to_string();

        let id = self
            .run_blocking(move |store| store.append_blocking(mode, score, &feedback, &png))
            .await?;

        debug!("Stored evaluation {} ({}, score: {:?})", id, mode, score);
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<EvaluationRecord>> {
        let records = self.run_blocking(|store| store.list_all_blocking()).await?;
        debug!("Loaded {} history records", records.len());
        Ok(records)
    }

    async fn count(&self) -> Result<usize> {
        self.run_blocking(|store| store.count_blocking()).await
    }
}
