//! HTTP API over the evaluation session
//!
//! Provides:
//! - Evaluation of base64-encoded submissions
//! - History listing and trend statistics
//! - Mode discovery and health

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use server::{ApiServer, ApiServerConfig};
