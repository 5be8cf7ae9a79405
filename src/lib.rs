//! Illustcoach - AI illustration coach
//!
//! Submits an illustration (optionally alongside a reference) to a multimodal
//! generative model under one of three rubric modes, extracts the numeric score
//! from the returned critique, and keeps every evaluation in a local SQLite
//! history so progress can be charted over time.
//!
//! # Architecture
//!
//! - **Types**: evaluation modes and persisted records
//! - **Scoring**: score extraction from free-form critique text
//! - **Prompts**: rubric prompts and request assembly
//! - **Services**: the generation API client
//! - **Storage**: append-only evaluation history
//! - **Session**: the evaluate / history pipeline
//! - **API**: HTTP interface over the session
//!
//! # Example
//!
//! ```ignore
//! use illustcoach_core::{CoachConfig, EvaluationMode, EvaluationSession};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CoachConfig::load(None)?;
//!     let store = SqliteHistoryStore::open(&config.db_path)?;
//!     let model = GeminiService::new(config.gemini())?;
//!     let session = EvaluationSession::new(config, Arc::new(model), Arc::new(store));
//!
//!     let image = illustcoach_core::imaging::load("drawing.png".as_ref())?;
//!     let outcome = session.evaluate(EvaluationMode::StandardScoring, None, image).await?;
//!     println!("{}", outcome.feedback);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod imaging;
pub mod prompts;
pub mod scoring;
pub mod services;
pub mod session;
pub mod storage;
pub mod trend;
pub mod types;

// Re-export commonly used types
pub use config::CoachConfig;
pub use error::{CoachError, Result};
pub use prompts::{EvaluationRequest, EvaluationRequestBuilder};
pub use scoring::{extract_any_score, extract_score, ScoreCheck, ScoreExtractor};
pub use services::{GeminiService, GenerativeModel};
pub use session::{EvaluationOutcome, EvaluationSession, HistoryView};
pub use storage::{HistoryBackend, SqliteHistoryStore};
pub use trend::TrendSummary;
pub use types::{EvaluationMode, EvaluationRecord, RecordId, MISSING_SCORE_DISPLAY};
