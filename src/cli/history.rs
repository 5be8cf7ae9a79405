//! History and trend commands

use illustcoach_core::{error::Result, TrendSummary};
use serde_json::json;

use super::helpers::{build_session, excerpt, load_config, GlobalOptions};

/// Handle history listing command
pub async fn handle(opts: &GlobalOptions, limit: Option<usize>, json: bool) -> Result<()> {
    let session = build_session(load_config(opts)?)?;
    let view = session.history().await?;
    let limit = limit.unwrap_or(usize::MAX);

    if json {
        let entries: Vec<_> = view
            .records
            .iter()
            .take(limit)
            .map(|r| {
                json!({
                    "id": r.id,
                    "mode": r.mode,
                    "tag": r.mode.tag(),
                    "score": r.score,
                    "score_display": r.score_display(),
                    "created_at": r.created_at,
                    "feedback": r.feedback,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if view.is_empty() {
        println!("まだ評価履歴がありません。");
        return Ok(());
    }

    println!("評価履歴 ({} 件)", view.records.len());
    println!();
    for record in view.records.iter().take(limit) {
        println!("{}", record.headline());
        println!("    {}", excerpt(&record.feedback, 60));
    }

    println!();
    print_trend(&view.trend);
    Ok(())
}

/// Handle trend command
pub async fn handle_trend(opts: &GlobalOptions, json: bool) -> Result<()> {
    let session = build_session(load_config(opts)?)?;
    let trend = session.history().await?.trend;

    if json {
        println!("{}", serde_json::to_string_pretty(&trend)?);
    } else {
        print_trend(&trend);
    }
    Ok(())
}

fn print_trend(trend: &TrendSummary) {
    match (trend.display_average(), trend.display_delta()) {
        (Some(avg), Some(delta)) => {
            let series: Vec<String> = trend.scores.iter().map(|s| s.to_string()).collect();
            println!("スコア推移: {}", series.join(" → "));
            println!("平均: {}  /  初回からの変化: {}", avg, delta);
        }
        _ => println!("採点済みの評価がまだありません。"),
    }
}
