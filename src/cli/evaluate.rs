//! One-shot evaluation command

use illustcoach_core::{error::Result, imaging, EvaluationMode, MISSING_SCORE_DISPLAY};
use std::path::PathBuf;
use tracing::debug;

use super::helpers::{build_session, load_config, GlobalOptions};

/// Handle evaluate command
pub async fn handle(
    opts: &GlobalOptions,
    mode: EvaluationMode,
    image: PathBuf,
    reference: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = load_config(opts)?;
    // Fail before touching any file when there is no key
    config.require_api_key()?;

    debug!("Loading submission {}", image.display());
    let submission = imaging::load(&image)?;
    let reference = reference.as_deref().map(imaging::load).transpose()?;

    let session = build_session(config)?;

    if !json {
        println!("AIが評価中です...");
    }
    let outcome = session.evaluate(mode, reference, submission).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!();
    println!("{}", outcome.feedback);
    println!();
    match outcome.recorded_message() {
        Some(message) => println!("✓ {}", message),
        None => {
            let score = outcome
                .score
                .map(|s| s.to_string())
                .unwrap_or_else(|| MISSING_SCORE_DISPLAY.to_string());
            println!("Score: {}", score);
        }
    }
    if let Some(err) = &outcome.storage_error {
        eprintln!("⚠ Evaluation was not saved: {}", err);
    }

    Ok(())
}
