//! End-to-end session tests with a scripted model

mod common;

use common::{create_test_session, sample_image, test_config, Reply, ScriptedModel, UnavailableStore};
use illustcoach_core::{
    prompts, CoachConfig, CoachError, EvaluationMode, EvaluationSession, HistoryBackend,
    ScoreCheck, MISSING_SCORE_DISPLAY,
};
use std::path::Path;
use std::sync::Arc;

#[tokio::test]
async fn test_standard_evaluation_is_scored_and_stored() {
    let model = Arc::new(ScriptedModel::answering(&[
        "## 講評\n構図が安定しています。\n\n**総合評価: 87点**",
    ]));
    let (_dir, session, store) = create_test_session(model.clone());

    let outcome = session
        .evaluate(
            EvaluationMode::StandardScoring,
            None,
            sample_image(8, 6, [255, 0, 0]),
        )
        .await
        .unwrap();

    assert_eq!(outcome.score, Some(87));
    assert_eq!(outcome.score_check, Some(ScoreCheck::InRange));
    assert!(outcome.storage_error.is_none());
    assert_eq!(
        outcome.recorded_message().as_deref(),
        Some("スコア: 87点 をデータベースに記録しました！")
    );

    let records = store.list_all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(Some(records[0].id), outcome.record_id);
    assert_eq!(records[0].score, Some(87));
    assert_eq!(records[0].feedback, outcome.feedback);

    let seen = model.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].prompt, prompts::STANDARD_RUBRIC);
    assert_eq!(seen[0].image_sizes, vec![(8, 6)]);
}

#[tokio::test]
async fn test_comparison_mode_sends_reference_first() {
    let model = Arc::new(ScriptedModel::answering(&["キャラクター再現度：91点"]));
    let (_dir, session, store) = create_test_session(model.clone());

    let outcome = session
        .evaluate(
            EvaluationMode::DerivativeWorkScoring,
            Some(sample_image(10, 10, [0, 0, 0])),
            sample_image(5, 5, [255, 255, 255]),
        )
        .await
        .unwrap();

    assert_eq!(outcome.score, Some(91));
    assert_eq!(model.seen()[0].image_sizes, vec![(10, 10), (5, 5)]);

    // Only the submission is persisted
    let records = store.list_all().await.unwrap();
    assert_eq!(records[0].image.width(), 5);
    assert_eq!(records[0].mode, EvaluationMode::DerivativeWorkScoring);
}

#[tokio::test]
async fn test_critique_without_score_is_stored_as_na() {
    let model = Arc::new(ScriptedModel::answering(&["とても良い作品です。"]));
    let (_dir, session, store) = create_test_session(model);

    let outcome = session
        .evaluate(EvaluationMode::StandardScoring, None, sample_image(1, 1, [0, 0, 0]))
        .await
        .unwrap();

    assert_eq!(outcome.score, None);
    assert!(outcome.is_persisted());
    assert!(outcome.recorded_message().is_none());

    let records = store.list_all().await.unwrap();
    assert_eq!(records[0].score_display(), MISSING_SCORE_DISPLAY);
}

#[tokio::test]
async fn test_missing_credential_makes_no_call_and_no_row() {
    let model = Arc::new(ScriptedModel::answering(&["総合評価: 50点"]));
    let (_dir, _session, store) = create_test_session(model.clone());

    let mut config = CoachConfig::default();
    config.db_path = store.path().to_path_buf();
    let session = EvaluationSession::new(config, model.clone(), store.clone());

    let result = session
        .evaluate(EvaluationMode::StandardScoring, None, sample_image(1, 1, [0, 0, 0]))
        .await;

    assert!(matches!(result, Err(CoachError::MissingCredential)));
    assert_eq!(model.call_count(), 0);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_reference_is_rejected_before_call() {
    let model = Arc::new(ScriptedModel::answering(&["再現度: 10点"]));
    let (_dir, session, store) = create_test_session(model.clone());

    let result = session
        .evaluate(EvaluationMode::CopyScoring, None, sample_image(1, 1, [0, 0, 0]))
        .await;

    assert!(matches!(result, Err(CoachError::InvalidInput(_))));
    assert_eq!(model.call_count(), 0);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_external_failure_leaves_history_untouched() {
    let model = Arc::new(ScriptedModel::new([
        Reply::Text("総合評価: 70点".to_string()),
        Reply::Fail("503 Service Unavailable".to_string()),
    ]));
    let (_dir, session, store) = create_test_session(model);

    session
        .evaluate(EvaluationMode::StandardScoring, None, sample_image(1, 1, [0, 0, 0]))
        .await
        .unwrap();

    let result = session
        .evaluate(EvaluationMode::StandardScoring, None, sample_image(1, 1, [0, 0, 0]))
        .await;

    assert!(matches!(result, Err(CoachError::ExternalCallFailure(_))));
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_storage_failure_keeps_feedback() {
    let model = Arc::new(ScriptedModel::answering(&["再現度: 77点"]));
    let session = EvaluationSession::new(
        test_config(Path::new("/unused")),
        model,
        Arc::new(UnavailableStore),
    );

    let outcome = session
        .evaluate(
            EvaluationMode::CopyScoring,
            Some(sample_image(2, 2, [0, 0, 0])),
            sample_image(2, 2, [1, 1, 1]),
        )
        .await
        .unwrap();

    assert_eq!(outcome.feedback, "再現度: 77点");
    assert_eq!(outcome.score, Some(77));
    assert!(!outcome.is_persisted());
    assert!(outcome
        .storage_error
        .as_deref()
        .is_some_and(|e| e.contains("read-only")));
}

#[tokio::test]
async fn test_history_view_trend() {
    let model = Arc::new(ScriptedModel::answering(&[
        "総合評価: 70点",
        "総合評価: 85点",
        "講評のみ",
        "総合評価: 90点",
    ]));
    let (_dir, session, _store) = create_test_session(model);

    for _ in 0..4 {
        session
            .evaluate(EvaluationMode::StandardScoring, None, sample_image(1, 1, [0, 0, 0]))
            .await
            .unwrap();
    }

    let view = session.history().await.unwrap();
    assert_eq!(view.records.len(), 4);
    assert_eq!(view.records[1].score, None);
    assert_eq!(view.trend.scores, vec![70, 85, 90]);
    assert_eq!(view.trend.display_average().as_deref(), Some("81.7"));
    assert_eq!(view.trend.display_delta().as_deref(), Some("+20"));
}
