//! Evaluation session
//!
//! Wires one user action through the pipeline:
//! mode + images → request → model → score extraction → history.
//!
//! Persistence only happens after a successful model call. A storage failure at
//! that point does not discard the critique: it is reported alongside it in the
//! [`EvaluationOutcome`].

use crate::config::CoachConfig;
use crate::error::{CoachError, Result};
use crate::prompts::{self, EvaluationRequestBuilder};
use crate::scoring::{ScoreCheck, ScoreExtractor};
use crate::services::GenerativeModel;
use crate::storage::HistoryBackend;
use crate::trend::TrendSummary;
use crate::types::{EvaluationMode, EvaluationRecord, RecordId};
use image::DynamicImage;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of one evaluation as presented to the user
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationOutcome {
    pub mode: EvaluationMode,
    /// Critique text (markdown)
    pub feedback: String,
    /// Extracted score, if the critique contained one
    pub score: Option<u16>,
    /// Data-quality classification of `score`
    pub score_check: Option<ScoreCheck>,
    /// Id of the stored record; `None` if persisting failed
    pub record_id: Option<RecordId>,
    /// Why persisting failed, if it did
    pub storage_error: Option<String>,
}

impl EvaluationOutcome {
    pub fn is_persisted(&self) -> bool {
        self.record_id.is_some()
    }

    /// Confirmation line shown after a recorded score
    pub fn recorded_message(&self) -> Option<String> {
        match (self.score, self.record_id) {
            (Some(score), Some(_)) => Some(format!(
                "{}: {}点 をデータベースに記録しました！",
                prompts::score_label(self.mode),
                score
            )),
            _ => None,
        }
    }
}

/// History plus its aggregate trend
#[derive(Debug, Clone)]
pub struct HistoryView {
    /// Newest first
    pub records: Vec<EvaluationRecord>,
    pub trend: TrendSummary,
}

impl HistoryView {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Explicit state for evaluations: configuration, model and store
#[derive(Clone)]
pub struct EvaluationSession {
    config: Arc<CoachConfig>,
    model: Arc<dyn GenerativeModel>,
    store: Arc<dyn HistoryBackend>,
}

impl EvaluationSession {
    pub fn new(
        config: CoachConfig,
        model: Arc<dyn GenerativeModel>,
        store: Arc<dyn HistoryBackend>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            model,
            store,
        }
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn HistoryBackend> {
        &self.store
    }

    /// Run one evaluation
    ///
    /// Errors: `MissingCredential` (nothing attempted), `InvalidInput` (wrong
    /// images, nothing attempted), `ExternalCallFailure` (nothing stored).
    pub async fn evaluate(
        &self,
        mode: EvaluationMode,
        reference: Option<DynamicImage>,
        submission: DynamicImage,
    ) -> Result<EvaluationOutcome> {
        self.config.require_api_key()?;

        let mut builder = EvaluationRequestBuilder::new(mode).submission(submission);
        if let Some(reference) = reference {
            builder = builder.reference(reference);
        }
        let request = builder.build()?;

        info!("Evaluating submission ({} mode)", mode);
        let feedback = self.model.generate(&request).await?;

        let score = ScoreExtractor::extract(mode, &feedback);
        let score_check = score.map(ScoreCheck::classify);
        match (score, score_check) {
            (None, _) => debug!("No score found in critique"),
            (Some(s), Some(ScoreCheck::OutOfRange)) => {
                warn!("Critique reported out-of-range score {}; storing as-is", s)
            }
            (Some(s), _) => debug!("Extracted score {}", s),
        }

        let submission = request
            .submission()
            .ok_or_else(|| CoachError::InvalidInput("request has no submission image".into()))?;

        let (record_id, storage_error) = match self
            .store
            .append(mode, score, &feedback, submission)
            .await
        {
            Ok(id) => (Some(id), None),
            Err(e) => {
                warn!("Evaluation not recorded: {}", e);
                (None, Some(e.to_string()))
            }
        };

        Ok(EvaluationOutcome {
            mode,
            feedback,
            score,
            score_check,
            record_id,
            storage_error,
        })
    }

    /// All history, newest first, with trend statistics
    pub async fn history(&self) -> Result<HistoryView> {
        let records = self.store.list_all().await?;
        let trend = TrendSummary::from_records(&records);
        Ok(HistoryView { records, trend })
    }
}
