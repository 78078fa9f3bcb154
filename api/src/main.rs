use anyhow::{Context, Result};
use deepfake_api::config::ServerConfig;
use deepfake_api::state::AppState;
use deepfake_api::{build_app, logging};
use deepfake_detector::{Detector, DetectorConfig, FfmpegSampler, VitClassifier};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let config = ServerConfig::from_env()?;
    let detector_config = DetectorConfig::from_env();
    tracing::info!(
        addr = %config.bind_addr(),
        max_frames = detector_config.max_frames,
        stride = detector_config.frame_stride,
        model = %detector_config.model,
        "Loaded configuration"
    );

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload dir {:?}", config.upload_dir))?;

    // Loaded once here, then only read by request handlers
    let model = detector_config.model.clone();
    let classifier = tokio::task::spawn_blocking(move || VitClassifier::load(&model))
        .await
        .context("Model loading task panicked")??;

    let detector = Detector::new(
        Arc::new(FfmpegSampler::new(detector_config.ffmpeg_threads)),
        Arc::new(classifier),
        detector_config.sampling_plan(),
    );

    let state = AppState::new(Arc::new(detector), &config);
    let app = build_app(state, &config)?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
