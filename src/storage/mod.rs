//! Storage layer for evaluation history
//!
//! History is append-only: records are written once, right after a successful
//! evaluation, and read back newest first. There is no update or delete path.

pub mod sqlite;

use crate::error::Result;
use crate::types::{EvaluationMode, EvaluationRecord, RecordId};
use async_trait::async_trait;
use image::DynamicImage;

pub use sqlite::SqliteHistoryStore;

/// History backend trait defining all required operations
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Persist one evaluation and return its new identifier
    ///
    /// The image is PNG-encoded before storage. Fails with
    /// `StorageUnavailable` if the backing store cannot be opened or written;
    /// a failed append leaves no partial row behind.
    async fn append(
        &self,
        mode: EvaluationMode,
        score: Option<u16>,
        feedback: &str,
        image: &DynamicImage,
    ) -> Result<RecordId>;

    /// Every record, newest first
    async fn list_all(&self) -> Result<Vec<EvaluationRecord>>;

    /// Number of stored records
    async fn count(&self) -> Result<usize>;
}
