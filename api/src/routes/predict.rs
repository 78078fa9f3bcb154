//! Video upload and analysis endpoint (/predict)

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    routing::post,
};
use deepfake_detector::{Analysis, PredictionVector, Verdict};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::constants::{DEFAULT_UPLOAD_SUFFIX, UPLOAD_FIELD, UPLOAD_TEMP_PREFIX};
use crate::error::{ApiError, ApiResult, LogErr};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/predict", post(predict))
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub verdict: Verdict,
    pub fake_score: f32,
    pub per_frame: Vec<PredictionVector>,
}

impl From<Analysis> for PredictResponse {
    fn from(analysis: Analysis) -> Self {
        Self {
            verdict: analysis.verdict,
            fake_score: analysis.fake_score,
            per_frame: analysis.per_frame,
        }
    }
}

struct Upload {
    filename: String,
    data: Bytes,
}

/// POST /predict - Classify an uploaded video as REAL or FAKE
/// Accepts multipart form data with a single "file" field holding the video.
async fn predict(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<PredictResponse>> {
    let upload = read_upload(&mut multipart).await?;

    tracing::info!(
        filename = %upload.filename,
        bytes = upload.data.len(),
        "Received video upload"
    );

    // Deleted when dropped, whichever way this handler returns
    let temp = tempfile::Builder::new()
        .prefix(UPLOAD_TEMP_PREFIX)
        .suffix(&upload_suffix(&upload.filename))
        .tempfile_in(&state.upload_dir)
        .log_internal("Failed to create temp upload file")?;

    tokio::fs::write(temp.path(), &upload.data)
        .await
        .log_internal("Failed to write upload to temp file")?;
    drop(upload);

    let detector = Arc::clone(&state.detector);
    let slots = Arc::clone(&state.analysis_slots);
    let path = temp.path().to_path_buf();

    // Waiting for a slot counts against the timeout
    let job = async move {
        let permit = slots
            .acquire_owned()
            .await
            .log_internal("Analysis slots closed")?;

        let joined = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            detector.analyze(&path)
        })
        .await;

        let analysis = joined.log_internal("Analysis task failed")??;
        Ok::<_, ApiError>(analysis)
    };

    let analysis = match tokio::time::timeout(state.request_timeout, job).await {
        Ok(result) => result?,
        Err(_) => return Err(ApiError::Timeout),
    };

    Ok(Json(analysis.into()))
}

/// Pull the first "file" field out of the form. Other fields are ignored.
async fn read_upload(multipart: &mut Multipart) -> ApiResult<Upload> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or(ApiError::MissingInput)?;

        let data = field.bytes().await.map_err(multipart_error)?;

        return Ok(Upload { filename, data });
    }

    Err(ApiError::MissingInput)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::UploadTooLarge
    } else {
        ApiError::BadMultipart(err.body_text())
    }
}

/// Temp file suffix taken from the upload's extension, e.g. `.webm`
fn upload_suffix(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| DEFAULT_UPLOAD_SUFFIX.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_suffix() {
        assert_eq!(upload_suffix("clip.MOV"), ".mov");
        assert_eq!(upload_suffix("my.holiday.webm"), ".webm");
        assert_eq!(upload_suffix("no_extension"), ".mp4");
        assert_eq!(upload_suffix("weird.m p4"), ".mp4");
        assert_eq!(upload_suffix("../../etc/passwd"), ".mp4");
    }

    #[test]
    fn test_response_drops_frame_indices() {
        let analysis = Analysis {
            verdict: Verdict::Fake,
            fake_score: 0.75,
            per_frame: vec![PredictionVector([0.25, 0.75])],
            frame_indices: vec![0],
        };
        let json = serde_json::to_value(PredictResponse::from(analysis)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "verdict": "FAKE",
                "fake_score": 0.75,
                "per_frame": [[0.25, 0.75]],
            })
        );
    }
}
