//! External generation service
//!
//! The evaluation intelligence lives entirely in a hosted multimodal model.
//! [`GenerativeModel`] is the seam the session talks to, so tests can swap in
//! a fake.

pub mod gemini;

use crate::error::Result;
use crate::prompts::EvaluationRequest;
use async_trait::async_trait;

pub use gemini::{GeminiConfig, GeminiService};

/// A model that turns a rubric prompt plus images into critique text
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate the critique, failing with `ExternalCallFailure` on any
    /// unusable outcome
    async fn generate(&self, request: &EvaluationRequest) -> Result<String>;
}
