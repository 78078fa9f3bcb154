use deepfake_detector::Detector;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::config::ServerConfig;

/// Shared handler state. The detector (and its model) is loaded once and
/// only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<Detector>,
    pub upload_dir: PathBuf,
    pub request_timeout: Duration,
    /// One permit per running analysis. A permit stays with the blocking
    /// task until it finishes, even after the request has timed out.
    pub analysis_slots: Arc<Semaphore>,
}

impl AppState {
    pub fn new(detector: Arc<Detector>, config: &ServerConfig) -> Self {
        Self {
            detector,
            upload_dir: config.upload_dir.clone(),
            request_timeout: config.request_timeout(),
            analysis_slots: Arc::new(Semaphore::new(
                config.max_concurrent_analyses.min(Semaphore::MAX_PERMITS),
            )),
        }
    }
}
