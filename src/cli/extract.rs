//! Score extraction command
//!
//! Runs the extractor over saved critique text without calling the model.

use illustcoach_core::{
    error::Result, extract_any_score, extract_score, EvaluationMode, ScoreCheck,
    MISSING_SCORE_DISPLAY,
};
use std::io::Read;
use std::path::PathBuf;

/// Handle extract command; `-` reads stdin
pub fn handle(file: PathBuf, mode: Option<EvaluationMode>) -> Result<()> {
    let text = if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&file)?
    };

    let score = match mode {
        Some(mode) => extract_score(mode, &text),
        None => extract_any_score(&text),
    };

    match score {
        Some(s) if ScoreCheck::classify(s) == ScoreCheck::OutOfRange => {
            println!("{} (out of range)", s)
        }
        Some(s) => println!("{}", s),
        None => println!("{}", MISSING_SCORE_DISPLAY),
    }
    Ok(())
}
