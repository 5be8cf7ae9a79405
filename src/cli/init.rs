//! Database initialization command

use illustcoach_core::{error::Result, HistoryBackend, SqliteHistoryStore};
use tracing::debug;

use super::helpers::{load_config, GlobalOptions};

/// Handle database initialization command
pub async fn handle(opts: &GlobalOptions) -> Result<()> {
    let config = load_config(opts)?;
    let db_path = config.db_path;

    // Init always creates the parent directory, default location or not
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
        debug!("Ensured directory: {}", parent.display());
    }

    let store = SqliteHistoryStore::open(&db_path)?;
    let count = store.count().await?;

    println!("✓ Database initialized: {} ({} records)", db_path.display(), count);
    Ok(())
}
