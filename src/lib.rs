/// Investigator Backend
///
/// YouTube transcript extraction service. Reuses published captions when a video
/// has them and falls back to downloading the audio and running Whisper locally.

pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod transcription;
pub mod youtube;

// Re-export main types for easy access
pub use crate::api::ApiServer;
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::state::AppState;
pub use crate::transcription::{
    LocalTranscriber, TranscriptResult, TranscriptSegment, TranscriptSource, TranscriptionOrchestrator,
};
pub use crate::youtube::{resolve_video_id, MediaExtractor, VideoId, VideoMetadata};
