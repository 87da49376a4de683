//! API data models

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::transcription::{TranscriptResult, TranscriptSegment, TranscriptSource};
use crate::youtube::{VideoId, VideoMetadata};

/// Body of `POST /api/transcribe`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeRequest {
    pub url: String,
}

/// Video metadata flattened together with its transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub duration: u64,
    pub transcript: String,
    pub segments: Vec<TranscriptSegment>,
    pub source: TranscriptSource,
}

impl TranscribeResponse {
    pub fn new(video_id: &VideoId, metadata: VideoMetadata, result: TranscriptResult) -> Self {
        Self {
            video_id: video_id.to_string(),
            title: metadata.title,
            channel: metadata.channel,
            duration: metadata.duration,
            transcript: result.text,
            segments: result.segments,
            source: result.source,
        }
    }
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Error payload, `{"detail": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Failure carrying the HTTP status and a user-visible message
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { detail: self.detail })).into_response()
    }
}
