//! Core data types for the illustration coach
//!
//! Defines the evaluation modes, the persisted evaluation record and the
//! identifiers handed out by the history store.

use chrono::NaiveDateTime;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Placeholder shown for records whose critique carried no score
pub const MISSING_SCORE_DISPLAY: &str = "N/A";

/// Surrogate key of a persisted evaluation
///
/// Assigned by the store; ascending in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The rubric a submission is judged against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluationMode {
    /// Single original illustration, scored out of 100 overall
    #[serde(rename = "standard")]
    StandardScoring,

    /// Copy of a reference illustration, scored on reproduction fidelity
    #[serde(rename = "copy")]
    CopyScoring,

    /// Fan work of an official character design, scored on character fidelity
    #[serde(rename = "derivative")]
    DerivativeWorkScoring,
}

impl EvaluationMode {
    /// All modes in menu order
    pub const ALL: [EvaluationMode; 3] = [
        EvaluationMode::StandardScoring,
        EvaluationMode::CopyScoring,
        EvaluationMode::DerivativeWorkScoring,
    ];

    /// Tag written to the `mode` column of the history table
    ///
    /// These are the names used by existing history files and must not change.
    pub fn tag(&self) -> &'static str {
        match self {
            EvaluationMode::StandardScoring => "通常採点",
            EvaluationMode::CopyScoring => "模写採点",
            EvaluationMode::DerivativeWorkScoring => "二次創作評価",
        }
    }

    /// Short machine name used by the API and CLI
    pub fn name(&self) -> &'static str {
        match self {
            EvaluationMode::StandardScoring => "standard",
            EvaluationMode::CopyScoring => "copy",
            EvaluationMode::DerivativeWorkScoring => "derivative",
        }
    }

    /// Resolve a persisted tag back to a mode
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.tag() == tag)
    }

    /// Whether the rubric compares the submission against a reference image
    pub fn requires_reference(&self) -> bool {
        !matches!(self, EvaluationMode::StandardScoring)
    }
}

impl std::fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EvaluationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(mode) = Self::from_tag(s) {
            return Ok(mode);
        }

        match s.trim().to_lowercase().as_str() {
            "standard" | "standard_scoring" | "normal" => Ok(EvaluationMode::StandardScoring),
            "copy" | "copy_scoring" | "mosha" => Ok(EvaluationMode::CopyScoring),
            "derivative" | "derivative_work_scoring" | "fanart" | "fan_art" => {
                Ok(EvaluationMode::DerivativeWorkScoring)
            }
            other => Err(format!(
                "unknown evaluation mode '{}' (expected standard, copy or derivative)",
                other
            )),
        }
    }
}

/// One persisted evaluation
///
/// Records are immutable: the store offers no update or delete path.
#[derive(Debug, Clone)]
pub struct EvaluationRecord {
    pub id: RecordId,
    pub mode: EvaluationMode,
    /// Extracted score; `None` when the critique carried no recognizable score
    pub score: Option<u16>,
    /// Full critique text as returned by the model (markdown)
    pub feedback: String,
    /// The judged submission, decoded from the stored PNG
    pub image: DynamicImage,
    /// Store-assigned insertion time (UTC)
    pub created_at: NaiveDateTime,
}

impl EvaluationRecord {
    /// Score as shown in history listings
    pub fn score_display(&self) -> String {
        self.score
            .map(|s| s.to_string())
            .unwrap_or_else(|| MISSING_SCORE_DISPLAY.to_string())
    }

    /// One-line heading in the style of the history list
    pub fn headline(&self) -> String {
        format!(
            "{} - score: {} ({})",
            self.created_at.format("%Y-%m-%d %H:%M:%S"),
            self.score_display(),
            self.mode.tag()
        )
    }
}
