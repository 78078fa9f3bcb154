#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response};
use deepfake_api::build_app;
use deepfake_api::config::ServerConfig;
use deepfake_api::state::AppState;
use deepfake_detector::{Classifier, Detector, Frame, FrameSampler, SamplingPlan};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const BOUNDARY: &str = "deepfake-test-boundary";

/// What the sampler saw on disk while the request was in flight
#[derive(Debug, Clone)]
pub struct SampledUpload {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

/// Stands in for ffmpeg: decodes `source_frames` synthetic 8x8 frames and
/// records the temp file it was pointed at.
pub struct StubSampler {
    source_frames: usize,
    delay: Duration,
    seen: Mutex<Vec<SampledUpload>>,
}

impl StubSampler {
    pub fn new(source_frames: usize) -> Self {
        Self {
            source_frames,
            delay: Duration::ZERO,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn slow(source_frames: usize, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(source_frames)
        }
    }

    pub fn seen(&self) -> Vec<SampledUpload> {
        self.seen.lock().unwrap().clone()
    }
}

impl FrameSampler for StubSampler {
    fn sample(&self, path: &Path, plan: &SamplingPlan) -> Vec<Frame> {
        self.seen.lock().unwrap().push(SampledUpload {
            path: path.to_path_buf(),
            contents: std::fs::read(path).unwrap_or_default(),
        });
        std::thread::sleep(self.delay);

        let decoded = (0..self.source_frames).map(|_| Frame {
            index: 0,
            width: 8,
            height: 8,
            rgb: vec![127; 8 * 8 * 3],
        });
        deepfake_detector::sampler::select_frames(decoded, plan)
    }
}

pub fn test_config(upload_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: 1024 * 1024,
        request_timeout_secs: 30,
        max_concurrent_analyses: 4,
    }
}

/// Build the full router around a stub sampler and the given classifier.
pub fn build_test_app(
    sampler: Arc<StubSampler>,
    classifier: Arc<dyn Classifier>,
    config: &ServerConfig,
) -> Router {
    let detector = Detector::new(sampler, classifier, SamplingPlan::new(16, 10));
    let state = AppState::new(Arc::new(detector), config);
    build_app(state, config).unwrap()
}

/// Single-part multipart body. `filename: None` sends a plain form field.
pub fn multipart_body(field: &str, filename: Option<&str>, data: &[u8]) -> Vec<u8> {
    let disposition = match filename {
        Some(name) => format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: video/mp4\r\n",
            field, name
        ),
        None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", field),
    };

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(disposition.as_bytes());
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn post_multipart(app: Router, body: Vec<u8>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Files left behind in the upload directory
pub fn leftover_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect()
}
