//! Request handlers
//!
//! Each handler is one user action against the shared [`EvaluationSession`].

use super::error::ApiError;
use crate::error::CoachError;
use crate::imaging;
use crate::scoring::ScoreExtractor;
use crate::session::{EvaluationOutcome, EvaluationSession};
use crate::trend::TrendSummary;
use crate::types::{EvaluationMode, EvaluationRecord, RecordId};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub session: EvaluationSession,
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Stored evaluations; absent when the database cannot be read
    pub records: Option<usize>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, records) = match state.session.store().count().await {
        Ok(n) => ("ok", Some(n)),
        Err(e) => {
            warn!("Health check could not read history: {}", e);
            ("degraded", None)
        }
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        records,
    })
}

#[derive(Debug, Serialize)]
pub struct ModeInfo {
    pub mode: EvaluationMode,
    pub tag: &'static str,
    pub requires_reference: bool,
    pub score_labels: &'static [&'static str],
}

pub async fn modes() -> Json<Vec<ModeInfo>> {
    Json(
        EvaluationMode::ALL
            .iter()
            .map(|&mode| ModeInfo {
                mode,
                tag: mode.tag(),
                requires_reference: mode.requires_reference(),
                score_labels: ScoreExtractor::labels(mode),
            })
            .collect(),
    )
}

/// Body of `POST /evaluate`; images are base64 (data URLs accepted)
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    /// Mode name, alias or Japanese tag
    pub mode: String,
    pub submission: String,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    pub mode: EvaluationMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_in_range: Option<bool>,
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_error: Option<String>,
}

impl From<EvaluationOutcome> for EvaluateResponse {
    fn from(outcome: EvaluationOutcome) -> Self {
        let message = outcome.recorded_message();
        Self {
            record_id: outcome.record_id,
            mode: outcome.mode,
            score: outcome.score,
            score_in_range: outcome.score_check.map(|c| c.is_in_range()),
            feedback: outcome.feedback,
            message,
            storage_error: outcome.storage_error,
        }
    }
}

pub async fn evaluate(
    State(state): State<AppState>,
    body: std::result::Result<Json<EvaluateRequest>, JsonRejection>,
) -> ApiResult<EvaluateResponse> {
    let Json(req) = body.map_err(|e| CoachError::InvalidInput(e.body_text()))?;

    let mode: EvaluationMode = req.mode.parse().map_err(CoachError::InvalidInput)?;
    let submission = imaging::decode_base64(&req.submission)?;
    let reference = req
        .reference
        .as_deref()
        .map(imaging::decode_base64)
        .transpose()?;

    let outcome = state.session.evaluate(mode, reference, submission).await?;
    Ok(Json(outcome.into()))
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Keep only the newest `limit` records
    pub limit: Option<usize>,
    /// Include PNG images (default true)
    pub images: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: RecordId,
    pub mode: EvaluationMode,
    pub tag: &'static str,
    pub score: Option<u16>,
    /// Score, or `N/A` when none was extracted
    pub score_display: String,
    pub feedback: String,
    pub created_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_png_base64: Option<String>,
}

impl HistoryEntry {
    fn from_record(record: EvaluationRecord, with_image: bool) -> crate::error::Result<Self> {
        let image_png_base64 = if with_image {
            Some(imaging::to_base64_png(&record.image).map_err(|e| {
                CoachError::Other(format!("failed to encode record {}: {}", record.id, e))
            })?)
        } else {
            None
        };

        Ok(Self {
            id: record.id,
            mode: record.mode,
            tag: record.mode.tag(),
            score: record.score,
            score_display: record.score_display(),
            feedback: record.feedback,
            created_at: record.created_at,
            image_png_base64,
        })
    }
}

pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<HistoryEntry>> {
    let view = state.session.history().await?;
    let with_images = query.images.unwrap_or(true);
    let limit = query.limit.unwrap_or(usize::MAX);
    debug!("Listing {} of {} records", limit.min(view.records.len()), view.records.len());

    let entries = view
        .records
        .into_iter()
        .take(limit)
        .map(|record| HistoryEntry::from_record(record, with_images))
        .collect::<crate::error::Result<Vec<_>>>()?;

    Ok(Json(entries))
}

pub async fn trend(State(state): State<AppState>) -> ApiResult<TrendSummary> {
    let view = state.session.history().await?;
    Ok(Json(view.trend))
}
