//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use illustcoach_core::{
    error::{CoachError, Result},
    imaging, CoachConfig, EvaluationMode, EvaluationRecord, EvaluationRequest, EvaluationSession,
    GenerativeModel, HistoryBackend, RecordId, SqliteHistoryStore,
};
use image::{DynamicImage, Rgb, RgbImage};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// One canned answer of [`ScriptedModel`]
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail(String),
}

/// What the model was asked, for assertions
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub mode: EvaluationMode,
    pub prompt: &'static str,
    pub image_sizes: Vec<(u32, u32)>,
}

/// Fake generation model that answers from a script
///
/// Replies are consumed in order; once the script runs out every call fails.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Reply>>,
    seen: Mutex<Vec<SeenRequest>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Model that always answers with `text` (once per scripted call)
    pub fn answering(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Reply::Text(t.to_string())))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, request: &EvaluationRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(SeenRequest {
            mode: request.mode,
            prompt: request.prompt,
            image_sizes: request
                .images
                .iter()
                .map(|img| (img.width(), img.height()))
                .collect(),
        });

        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(reason)) => Err(CoachError::ExternalCallFailure(reason)),
            None => Err(CoachError::ExternalCallFailure("script exhausted".to_string())),
        }
    }
}

/// History backend whose writes always fail; reads return nothing
pub struct UnavailableStore;

#[async_trait]
impl HistoryBackend for UnavailableStore {
    async fn append(
        &self,
        _mode: EvaluationMode,
        _score: Option<u16>,
        _feedback: &str,
        _image: &DynamicImage,
    ) -> Result<RecordId> {
        Err(CoachError::StorageUnavailable("disk is read-only".to_string()))
    }

    async fn list_all(&self) -> Result<Vec<EvaluationRecord>> {
        Ok(Vec::new())
    }

    async fn count(&self) -> Result<usize> {
        Ok(0)
    }
}

/// Solid-colour test image
pub fn sample_image(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
}

/// Base64 PNG of a sample image, as the HTTP API expects
pub fn sample_png_base64(width: u32, height: u32) -> String {
    imaging::to_base64_png(&sample_image(width, height, [200, 120, 40])).unwrap()
}

/// Fresh store in a temporary directory
pub fn create_test_store() -> (TempDir, SqliteHistoryStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = SqliteHistoryStore::open(temp_dir.path().join("illustration_history.db")).unwrap();
    (temp_dir, store)
}

/// Configuration with a dummy key and the given database path
pub fn test_config(db_path: &Path) -> CoachConfig {
    let mut config = CoachConfig::default().with_api_key("test-key");
    config.db_path = db_path.to_path_buf();
    config
}

/// Session over a fresh SQLite store and the given model
pub fn create_test_session(
    model: Arc<dyn GenerativeModel>,
) -> (TempDir, EvaluationSession, Arc<SqliteHistoryStore>) {
    let (temp_dir, store) = create_test_store();
    let store = Arc::new(store);
    let config = test_config(store.path());
    let session = EvaluationSession::new(config, model, store.clone());
    (temp_dir, session, store)
}
