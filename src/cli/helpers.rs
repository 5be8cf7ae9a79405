//! Shared helper functions for CLI commands
//!
//! Resolves configuration from the global flags and wires up the store, the
//! model client and the session.

use illustcoach_core::{
    config::{default_db_path, CoachConfig},
    error::Result,
    EvaluationSession, GeminiService, SqliteHistoryStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Global options shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config_file: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub api_key: Option<String>,
}

/// Load configuration and apply command-line overrides
pub fn load_config(opts: &GlobalOptions) -> Result<CoachConfig> {
    let mut config = CoachConfig::load(opts.config_file.as_deref())?;

    if let Some(path) = &opts.db_path {
        config.db_path = path.clone();
    }
    if let Some(key) = &opts.api_key {
        config = config.with_api_key(key.clone());
    }

    debug!("Database path: {}", config.db_path.display());
    Ok(config)
}

/// Open the history store
///
/// The data directory is created only for the default location; an explicit
/// path whose directory is missing is reported as storage unavailable.
pub fn open_store(config: &CoachConfig) -> Result<SqliteHistoryStore> {
    if config.db_path == default_db_path() {
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }
    SqliteHistoryStore::open(&config.db_path)
}

/// Build a session backed by Gemini and the configured store
pub fn build_session(config: CoachConfig) -> Result<EvaluationSession> {
    let store = open_store(&config)?;
    let model = GeminiService::new(config.gemini())?;
    debug!("Using model {}", model.model());
    Ok(EvaluationSession::new(config, Arc::new(model), Arc::new(store)))
}

/// Shorten critique text for one-line listings
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if line.chars().count() <= max_chars {
        line.to_string()
    } else {
        let cut: String = line.chars().take(max_chars).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("\n\n総合評価: 87点\n詳細", 4), "総合評価…");
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("", 10), "");
    }
}
