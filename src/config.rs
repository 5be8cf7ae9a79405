//! Configuration for the illustration coach
//!
//! Settings are resolved once at startup into an explicit [`CoachConfig`] that
//! is handed to the session and the server. Sources, lowest to highest
//! precedence:
//! 1. Built-in defaults
//! 2. TOML file (`--config`, or `<config dir>/illustcoach/config.toml` if present)
//! 3. `ILLUSTCOACH_*` environment variables
//!
//! The API key additionally falls back to `GOOGLE_API_KEY`.

use crate::error::{CoachError, Result};
use crate::services::GeminiConfig;
use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable prefix for all settings
pub const ENV_PREFIX: &str = "ILLUSTCOACH";

/// Fallback variable holding the Google AI key
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// History file name, shared with earlier versions of the coach
pub const DEFAULT_DB_FILE: &str = "illustration_history.db";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8501";

/// Get the default database path using XDG_DATA_HOME standard
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("illustcoach")
        .join(DEFAULT_DB_FILE)
}

/// Default location of the optional config file
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("illustcoach").join("config.toml"))
}

/// Settings as they appear in files and the environment
#[derive(Debug, Deserialize)]
struct RawSettings {
    api_key: Option<String>,
    model: String,
    api_base_url: String,
    request_timeout_secs: u64,
    db_path: Option<PathBuf>,
    listen_addr: String,
    max_upload_bytes: usize,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct CoachConfig {
    /// Google AI API key; `None` means evaluations are refused
    pub api_key: Option<SecretString>,
    /// Gemini model name
    pub model: String,
    /// Base URL of the generation API
    pub api_base_url: String,
    /// HTTP timeout for one generation call
    pub request_timeout: Duration,
    /// History database file
    pub db_path: PathBuf,
    /// HTTP API listen address
    pub listen_addr: SocketAddr,
    /// Maximum accepted request body for `/evaluate`
    pub max_upload_bytes: usize,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(120),
            db_path: default_db_path(),
            listen_addr: DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8501))),
            max_upload_bytes: 32 * 1024 * 1024,
        }
    }
}

impl CoachConfig {
    /// Load from defaults, an optional file and the environment
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("model", defaults.model.clone())?
            .set_default("api_base_url", defaults.api_base_url.clone())?
            .set_default("request_timeout_secs", defaults.request_timeout.as_secs() as i64)?
            .set_default("listen_addr", defaults.listen_addr.to_string())?
            .set_default("max_upload_bytes", defaults.max_upload_bytes as i64)?;

        match config_file {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if let Some(path) = default_config_file() {
                    builder = builder.add_source(File::from(path.as_path()).required(false));
                }
            }
        }

        let raw: RawSettings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        let api_key = raw
            .api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                std::env::var(GOOGLE_API_KEY_VAR)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
            })
            .map(SecretString::from);

        if api_key.is_some() {
            debug!("API key configured");
        } else {
            debug!("No API key configured; evaluations will be refused");
        }

        let listen_addr = raw.listen_addr.parse().map_err(|e| {
            CoachError::Config(config::ConfigError::Message(format!(
                "invalid listen_addr '{}': {}",
                raw.listen_addr, e
            )))
        })?;

        Ok(Self {
            api_key,
            model: raw.model,
            api_base_url: raw.api_base_url,
            request_timeout: Duration::from_secs(raw.request_timeout_secs),
            db_path: raw.db_path.unwrap_or(defaults.db_path),
            listen_addr,
            max_upload_bytes: raw.max_upload_bytes,
        })
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The API key, or `MissingCredential`
    pub fn require_api_key(&self) -> Result<&SecretString> {
        self.api_key.as_ref().ok_or(CoachError::MissingCredential)
    }

    /// Set or replace the API key (e.g. from a CLI flag)
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = if key.trim().is_empty() {
            None
        } else {
            Some(SecretString::from(key))
        };
        self
    }

    /// Settings for the Gemini client
    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: self.api_base_url.clone(),
            timeout: self.request_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    fn clear_env() {
        for var in [
            "ILLUSTCOACH_API_KEY",
            "ILLUSTCOACH_MODEL",
            "ILLUSTCOACH_DB_PATH",
            "ILLUSTCOACH_LISTEN_ADDR",
            GOOGLE_API_KEY_VAR,
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_sources() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("config.toml");
        std::fs::write(&file, "").unwrap();

        let config = CoachConfig::load(Some(&file)).unwrap();
        assert!(!config.has_api_key());
        assert!(matches!(
            config.require_api_key(),
            Err(CoachError::MissingCredential)
        ));
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.listen_addr.port(), 8501);
    }

    #[test]
    #[serial]
    fn test_file_then_env_precedence() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("config.toml");
        std::fs::write(
            &file,
            "model = \"gemini-from-file\"\ndb_path = \"/tmp/coach.db\"\napi_key = \"file-key\"\n",
        )
        .unwrap();

        env::set_var("ILLUSTCOACH_MODEL", "gemini-from-env");
        let config = CoachConfig::load(Some(&file)).unwrap();
        clear_env();

        assert_eq!(config.model, "gemini-from-env");
        assert_eq!(config.db_path, PathBuf::from("/tmp/coach.db"));
        assert_eq!(config.require_api_key().unwrap().expose_secret(), "file-key");
    }

    #[test]
    #[serial]
    fn test_google_api_key_fallback() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("config.toml");
        std::fs::write(&file, "").unwrap();

        env::set_var(GOOGLE_API_KEY_VAR, "google-key");
        let config = CoachConfig::load(Some(&file)).unwrap();
        clear_env();

        assert_eq!(config.require_api_key().unwrap().expose_secret(), "google-key");
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file_fails() {
        clear_env();
        let result = CoachConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(CoachError::Config(_))));
    }

    #[test]
    fn test_with_api_key_ignores_blank() {
        let config = CoachConfig::default().with_api_key("  ");
        assert!(!config.has_api_key());

        let config = CoachConfig::default().with_api_key("abc");
        assert!(config.has_api_key());
    }
}
