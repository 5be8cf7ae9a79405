//! Score extraction from free-form critique text
//!
//! The model is asked to report a score in the form `<label>: <n>点`. Its output
//! is untrusted text, so extraction is a bounded pattern search with an explicit
//! "no score" outcome rather than a structured parse:
//!
//! - the first labeled score in document order wins
//! - at most three ASCII digits are read, so `1000点` never matches
//! - values above 100 are returned unchanged; use [`ScoreCheck::classify`] to
//!   surface them as data-quality issues

use crate::types::EvaluationMode;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Upper bound of the rubric scale
pub const MAX_SCORE: u16 = 100;

const STANDARD_LABELS: &[&str] = &["総合評価"];
const COPY_LABELS: &[&str] = &["再現度"];
const DERIVATIVE_LABELS: &[&str] = &["キャラクター再現度", "再現度"];
const ALL_LABELS: &[&str] = &["キャラクター再現度", "総合評価", "再現度"];

/// Builds `<label>[ (note)]: <1-3 digits>点`, tolerating markdown emphasis and
/// a full-width colon.
fn build_pattern(labels: &[&str]) -> Regex {
    let alternatives = labels
        .iter()
        .map(|label| regex::escape(label))
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&format!(
        r"(?:{})\**\s*(?:[（(][^）)\n]{{0,20}}[）)])?\s*\**\s*[:：]\s*\**\s*([0-9]{{1,3}})\s*点",
        alternatives
    ))
    .expect("Valid score regex")
}

/// Pulls a rubric score out of critique text
pub struct ScoreExtractor;

impl ScoreExtractor {
    /// Labels accepted for a mode's score line
    pub fn labels(mode: EvaluationMode) -> &'static [&'static str] {
        match mode {
            EvaluationMode::StandardScoring => STANDARD_LABELS,
            EvaluationMode::CopyScoring => COPY_LABELS,
            EvaluationMode::DerivativeWorkScoring => DERIVATIVE_LABELS,
        }
    }

    fn pattern(mode: EvaluationMode) -> &'static Regex {
        static STANDARD: Lazy<Regex> = Lazy::new(|| build_pattern(STANDARD_LABELS));
        static COPY: Lazy<Regex> = Lazy::new(|| build_pattern(COPY_LABELS));
        static DERIVATIVE: Lazy<Regex> = Lazy::new(|| build_pattern(DERIVATIVE_LABELS));

        match mode {
            EvaluationMode::StandardScoring => &STANDARD,
            EvaluationMode::CopyScoring => &COPY,
            EvaluationMode::DerivativeWorkScoring => &DERIVATIVE,
        }
    }

    /// Pattern accepting every mode's labels
    fn combined_pattern() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| build_pattern(ALL_LABELS));
        &PATTERN
    }

    fn first_score(pattern: &Regex, text: &str) -> Option<u16> {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|digits| digits.as_str().parse::<u16>().ok())
    }

    /// Extract the score for `mode`, or `None` when no labeled score is present
    pub fn extract(mode: EvaluationMode, text: &str) -> Option<u16> {
        Self::first_score(Self::pattern(mode), text)
    }

    /// Extract using any mode's labels
    pub fn extract_any(text: &str) -> Option<u16> {
        Self::first_score(Self::combined_pattern(), text)
    }
}

/// Extract the score for `mode` from critique text
pub fn extract_score(mode: EvaluationMode, text: &str) -> Option<u16> {
    ScoreExtractor::extract(mode, text)
}

/// Extract a score using any mode's labels
pub fn extract_any_score(text: &str) -> Option<u16> {
    ScoreExtractor::extract_any(text)
}

/// Data-quality classification of an extracted score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCheck {
    /// Within 0..=100
    InRange,
    /// Matched the pattern but exceeds the rubric scale
    OutOfRange,
}

impl ScoreCheck {
    pub fn classify(score: u16) -> Self {
        if score <= MAX_SCORE {
            ScoreCheck::InRange
        } else {
            ScoreCheck::OutOfRange
        }
    }

    pub fn is_in_range(&self) -> bool {
        matches!(self, ScoreCheck::InRange)
    }
}
