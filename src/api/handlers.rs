//! API request handlers

use serde_json::Value;
use tracing::{error, info};

use super::models::{ApiError, HealthResponse, TranscribeResponse};
use crate::error::Result;
use crate::state::AppState;
use crate::transcription::TranscriptResult;
use crate::youtube::{resolve_video_id, VideoId};

pub const SERVICE_NAME: &str = "investigator-backend";

pub const INVALID_URL_DETAIL: &str = "Invalid YouTube URL. Please provide a valid YouTube video link.";

/// Handle health check requests
pub async fn health_check() -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
    }
}

/// Static service banner
pub fn service_banner() -> Value {
    serde_json::json!({
        "message": "Investigator API",
        "docs": "/docs",
        "health": "/api/health"
    })
}

/// Endpoint listing served at `/docs`
pub fn api_docs() -> Value {
    serde_json::json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            {"method": "GET", "path": "/", "description": "Service banner"},
            {"method": "GET", "path": "/docs", "description": "This endpoint listing"},
            {"method": "GET", "path": "/api/health", "description": "Liveness check"},
            {
                "method": "POST",
                "path": "/api/transcribe",
                "description": "Transcript for a YouTube video, from captions or local Whisper",
                "body": {"url": "string"}
            }
        ]
    })
}

/// Resolve, fetch metadata, then transcribe from captions or Whisper
pub async fn transcribe_video(state: &AppState, url: &str) -> std::result::Result<TranscribeResponse, ApiError> {
    let video_id = resolve_video_id(url).ok_or_else(|| ApiError::bad_request(INVALID_URL_DETAIL))?;
    info!("📺 Transcript requested for video {}", video_id);

    let metadata = state.extractor.fetch_metadata(&video_id).await.map_err(|e| {
        ApiError::not_found(format!(
            "Could not fetch video info. The video may be private or unavailable. Error: {}",
            e
        ))
    })?;

    if let Some(result) = state.orchestrator.fetch_captions(&video_id).await {
        return Ok(TranscribeResponse::new(&video_id, metadata, result));
    }

    info!("No YouTube captions found for {}, using Whisper...", video_id);
    let result = transcribe_with_whisper(state, &video_id).await.map_err(|e| {
        error!("❌ Transcription failed for {}: {}", video_id, e);
        ApiError::internal(format!("Failed to transcribe video: {}", e))
    })?;

    Ok(TranscribeResponse::new(&video_id, metadata, result))
}

/// Download audio into a private working directory and run the local model.
/// The directory is removed when this returns, whatever the outcome.
async fn transcribe_with_whisper(state: &AppState, video_id: &VideoId) -> Result<TranscriptResult> {
    let work_dir = state.create_work_dir()?;
    let audio_path = state.extractor.download_audio(video_id, work_dir.path()).await?;
    state.orchestrator.transcribe_audio(&audio_path).await
}
